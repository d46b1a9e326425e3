//! File-backed sessions: what one run writes, the next run reads.

use std::fs;
use std::path::PathBuf;

use library_catalogue::db::{open_store, write_value, BOOKS_KEY};
use library_catalogue::Library;
use pretty_assertions::assert_eq;

fn scratch_path(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "library-catalogue-{}-{name}",
        std::process::id()
    ));
    let _ = fs::remove_dir_all(&dir);
    dir.join("catalogue.sqlite")
}

#[test]
fn state_carries_across_sessions() {
    let path = scratch_path("sessions");

    {
        let mut library = Library::open(&path).unwrap();
        library.add_book("Dune", "Herbert").unwrap();
        library.add_book("Emma", "Austen").unwrap();
        library.add_member("Alice").unwrap();
        library.borrow(1, 2).unwrap();
    }

    let mut library = Library::open(&path).unwrap();
    let catalogue = library.catalogue();
    assert_eq!(catalogue.books().len(), 2);
    assert_eq!(catalogue.book(2).unwrap().borrowed_by, Some(1));
    assert_eq!(catalogue.member(1).unwrap().borrowed_book_ids, vec![2]);

    library.delete_book(2).unwrap();
    assert!(library.catalogue().member(1).unwrap().borrowed_book_ids.is_empty());
    assert_eq!(library.add_book("Beloved", "Morrison").unwrap().id, 3);

    if let Some(dir) = path.parent() {
        let _ = fs::remove_dir_all(dir);
    }
}

#[test]
fn corrupt_books_do_not_block_startup() {
    let path = scratch_path("corrupt");
    {
        let mut library = Library::open(&path).unwrap();
        library.add_member("Alice").unwrap();
    }
    {
        let conn = open_store(&path).unwrap();
        write_value(&conn, BOOKS_KEY, "<<garbage>>").unwrap();
    }

    let library = Library::open(&path).unwrap();
    assert!(library.catalogue().books().is_empty());
    assert_eq!(library.catalogue().members().len(), 1);

    if let Some(dir) = path.parent() {
        let _ = fs::remove_dir_all(dir);
    }
}
