use anyhow::{Context, Result};
use rusqlite::Connection;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::catalogue::Catalogue;

use super::kv::{read_value, write_value};

/// Key under which the book collection is stored.
pub const BOOKS_KEY: &str = "books";
/// Key under which the member collection is stored.
pub const MEMBERS_KEY: &str = "members";

/// Hydrate the catalogue from the store. Absent or unparsable collections
/// start empty; only a failure to read the database itself is an error.
pub fn load_catalogue(conn: &Connection) -> Result<Catalogue> {
    let books = decode_collection(read_value(conn, BOOKS_KEY)?, BOOKS_KEY);
    let members = decode_collection(read_value(conn, MEMBERS_KEY)?, MEMBERS_KEY);
    debug!(
        books = books.len(),
        members = members.len(),
        "loaded catalogue"
    );

    let catalogue = Catalogue::from_parts(books, members);
    if let Err(err) = catalogue.check_consistency() {
        warn!(%err, "catalogue still inconsistent after load");
    }
    Ok(catalogue)
}

/// Write both collections in full. The pair goes out in one transaction so a
/// crash cannot leave books and members from different generations.
pub fn save_catalogue(conn: &Connection, catalogue: &Catalogue) -> Result<()> {
    let books = serde_json::to_string(catalogue.books()).context("failed to encode books")?;
    let members =
        serde_json::to_string(catalogue.members()).context("failed to encode members")?;

    let tx = conn
        .unchecked_transaction()
        .context("failed to begin save transaction")?;
    write_value(&tx, BOOKS_KEY, &books)?;
    write_value(&tx, MEMBERS_KEY, &members)?;
    tx.commit().context("failed to commit catalogue")?;
    debug!("saved catalogue");
    Ok(())
}

fn decode_collection<T: DeserializeOwned>(raw: Option<String>, key: &str) -> Vec<T> {
    let Some(raw) = raw else {
        return Vec::new();
    };
    match serde_json::from_str(&raw) {
        Ok(items) => items,
        Err(err) => {
            warn!(key, %err, "ignoring malformed stored collection");
            Vec::new()
        }
    }
}
