use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};

/// Fetch the raw text stored under `key`, or `None` if it was never written.
pub fn read_value(conn: &Connection, key: &str) -> Result<Option<String>> {
    conn.query_row(
        "SELECT value FROM kv WHERE key = ?1",
        params![key],
        |row| row.get(0),
    )
    .optional()
    .with_context(|| format!("failed to read '{key}' from store"))
}

/// Overwrite the value under `key`, inserting the row on first write.
pub fn write_value(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO kv (key, value) VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        params![key, value],
    )
    .with_context(|| format!("failed to write '{key}' to store"))?;
    Ok(())
}
