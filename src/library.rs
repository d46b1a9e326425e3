//! The session object handed to the presentation layer: a [`Catalogue`] plus
//! the connection it mirrors to. Every method that changes the catalogue
//! writes both collections back before returning.

use std::path::Path;

use anyhow::Result;
use rusqlite::Connection;

use crate::catalogue::Catalogue;
use crate::db::{load_catalogue, open_in_memory, open_store, save_catalogue};
use crate::error::CatalogueResult;
use crate::models::{Book, BookId, Member, MemberId};

pub struct Library {
    conn: Connection,
    catalogue: Catalogue,
}

impl Library {
    /// Open the store at `path` and load whatever it holds.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = open_store(path)?;
        Self::from_connection(conn)
    }

    /// A library backed by a private in-memory store.
    pub fn in_memory() -> Result<Self> {
        Self::from_connection(open_in_memory()?)
    }

    pub fn from_connection(conn: Connection) -> Result<Self> {
        let catalogue = load_catalogue(&conn)?;
        Ok(Self { conn, catalogue })
    }

    pub fn catalogue(&self) -> &Catalogue {
        &self.catalogue
    }

    /// Validation failures come back as [`crate::CatalogueError`] inside the
    /// `anyhow::Error`, leaving both memory and storage untouched.
    pub fn add_book(&mut self, title: &str, author: &str) -> Result<Book> {
        self.commit(|catalogue| Ok((catalogue.add_book(title, author)?, true)))
    }

    pub fn add_member(&mut self, name: &str) -> Result<Member> {
        self.commit(|catalogue| Ok((catalogue.add_member(name)?, true)))
    }

    pub fn borrow(&mut self, member_id: MemberId, book_id: BookId) -> Result<bool> {
        self.commit(|catalogue| {
            let changed = catalogue.borrow(member_id, book_id);
            Ok((changed, changed))
        })
    }

    pub fn return_book(&mut self, member_id: MemberId, book_id: BookId) -> Result<bool> {
        self.commit(|catalogue| {
            let changed = catalogue.return_book(member_id, book_id);
            Ok((changed, changed))
        })
    }

    pub fn return_all(&mut self, member_id: MemberId) -> Result<usize> {
        self.commit(|catalogue| {
            let returned = catalogue.return_all(member_id);
            Ok((returned, returned > 0))
        })
    }

    pub fn delete_book(&mut self, book_id: BookId) -> Result<Option<Book>> {
        self.commit(|catalogue| {
            let removed = catalogue.delete_book(book_id);
            let changed = removed.is_some();
            Ok((removed, changed))
        })
    }

    pub fn delete_member(&mut self, member_id: MemberId) -> Result<Option<Member>> {
        self.commit(|catalogue| {
            let removed = catalogue.delete_member(member_id);
            let changed = removed.is_some();
            Ok((removed, changed))
        })
    }

    /// Run `change` against a draft copy and adopt the draft only once it has
    /// been written. A failed save leaves the in-memory catalogue as it was.
    fn commit<T>(
        &mut self,
        change: impl FnOnce(&mut Catalogue) -> CatalogueResult<(T, bool)>,
    ) -> Result<T> {
        let mut draft = self.catalogue.clone();
        let (outcome, changed) = change(&mut draft)?;
        if changed {
            save_catalogue(&self.conn, &draft)?;
            self.catalogue = draft;
        }
        Ok(outcome)
    }

    /// Release the catalogue and hand back the connection, e.g. to reopen it.
    pub fn into_connection(self) -> Connection {
        self.conn
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use std::time::Duration;

    use crate::error::CatalogueError;
    use pretty_assertions::assert_eq;

    fn scratch_path(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "library-catalogue-unit-{}-{name}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        dir.join("catalogue.sqlite")
    }

    /// A library whose writes fail fast while another connection holds the
    /// database lock.
    fn lockable_library(path: &PathBuf) -> (Library, Connection) {
        let conn = open_store(path).unwrap();
        conn.busy_timeout(Duration::ZERO).unwrap();
        let library = Library::from_connection(conn).unwrap();
        let other = Connection::open(path).unwrap();
        (library, other)
    }

    #[test]
    fn mutations_survive_a_reload() {
        let mut library = Library::in_memory().unwrap();
        library.add_book("Dune", "Herbert").unwrap();
        library.add_member("Alice").unwrap();
        assert!(library.borrow(1, 1).unwrap());

        let before = library.catalogue().clone();
        let reloaded = Library::from_connection(library.into_connection()).unwrap();
        assert_eq!(reloaded.catalogue(), &before);
    }

    #[test]
    fn rejected_input_surfaces_catalogue_error() {
        let mut library = Library::in_memory().unwrap();
        let err = library.add_book(" ", "Herbert").unwrap_err();
        assert_eq!(
            err.downcast_ref::<CatalogueError>(),
            Some(&CatalogueError::EmptyField("Title"))
        );
        assert!(library.catalogue().books().is_empty());

        let reloaded = Library::from_connection(library.into_connection()).unwrap();
        assert!(reloaded.catalogue().books().is_empty());
    }

    #[test]
    fn delete_member_cascade_is_persisted() {
        let mut library = Library::in_memory().unwrap();
        library.add_book("Dune", "Herbert").unwrap();
        library.add_book("Emma", "Austen").unwrap();
        library.add_member("Alice").unwrap();
        library.borrow(1, 1).unwrap();
        library.borrow(1, 2).unwrap();

        assert!(library.delete_member(1).unwrap().is_some());

        let reloaded = Library::from_connection(library.into_connection()).unwrap();
        assert_eq!(reloaded.catalogue().available_books().count(), 2);
        assert!(reloaded.catalogue().members().is_empty());
    }

    #[test]
    fn failed_save_leaves_catalogue_untouched() {
        let path = scratch_path("locked");
        let (mut library, other) = lockable_library(&path);
        library.add_member("Alice").unwrap();
        let before = library.catalogue().clone();

        other.execute_batch("BEGIN EXCLUSIVE").unwrap();
        assert!(library.add_book("Dune", "Herbert").is_err());
        assert!(library.add_book("Dune", "Herbert").is_err());
        assert!(library.delete_member(1).is_err());
        assert_eq!(library.catalogue(), &before);

        other.execute_batch("COMMIT").unwrap();
        assert_eq!(library.add_book("Dune", "Herbert").unwrap().id, 1);
        assert_eq!(library.catalogue().books().len(), 1);

        drop(other);
        drop(library);
        if let Some(dir) = path.parent() {
            let _ = fs::remove_dir_all(dir);
        }
    }
}
