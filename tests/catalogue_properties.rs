//! Randomised operation sequences against the catalogue store.

use library_catalogue::db::{load_catalogue, open_in_memory, save_catalogue};
use library_catalogue::Catalogue;
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    AddBook(String, String),
    AddMember(String),
    Borrow(u64, u64),
    ReturnBook(u64, u64),
    ReturnAll(u64),
    DeleteBook(u64),
    DeleteMember(u64),
}

fn text() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        Just("   ".to_string()),
        "[a-zA-Z ]{1,12}",
    ]
}

fn op() -> impl Strategy<Value = Op> {
    let id = 0u64..8;
    prop_oneof![
        (text(), text()).prop_map(|(title, author)| Op::AddBook(title, author)),
        text().prop_map(Op::AddMember),
        (id.clone(), id.clone()).prop_map(|(m, b)| Op::Borrow(m, b)),
        (id.clone(), id.clone()).prop_map(|(m, b)| Op::ReturnBook(m, b)),
        id.clone().prop_map(Op::ReturnAll),
        id.clone().prop_map(Op::DeleteBook),
        id.prop_map(Op::DeleteMember),
    ]
}

fn apply(catalogue: &mut Catalogue, op: &Op) {
    match op {
        Op::AddBook(title, author) => {
            let _ = catalogue.add_book(title, author);
        }
        Op::AddMember(name) => {
            let _ = catalogue.add_member(name);
        }
        Op::Borrow(member, book) => {
            catalogue.borrow(*member, *book);
        }
        Op::ReturnBook(member, book) => {
            catalogue.return_book(*member, *book);
        }
        Op::ReturnAll(member) => {
            catalogue.return_all(*member);
        }
        Op::DeleteBook(book) => {
            catalogue.delete_book(*book);
        }
        Op::DeleteMember(member) => {
            catalogue.delete_member(*member);
        }
    }
}

proptest! {
    #[test]
    fn borrow_links_stay_bidirectional(ops in prop::collection::vec(op(), 0..60)) {
        let mut catalogue = Catalogue::new();
        for op in &ops {
            apply(&mut catalogue, op);
            prop_assert_eq!(catalogue.check_consistency(), Ok(()));
        }
    }

    #[test]
    fn borrowing_a_lent_book_is_rejected(ops in prop::collection::vec(op(), 0..40)) {
        let mut catalogue = Catalogue::new();
        for op in &ops {
            apply(&mut catalogue, op);
        }
        let lent: Vec<u64> = catalogue
            .books()
            .iter()
            .filter(|book| !book.is_available())
            .map(|book| book.id)
            .collect();
        let member_ids: Vec<u64> = catalogue.members().iter().map(|m| m.id).collect();

        for book_id in lent {
            for member_id in &member_ids {
                let before = catalogue.clone();
                prop_assert!(!catalogue.borrow(*member_id, book_id));
                prop_assert_eq!(&catalogue, &before);
            }
        }
    }

    #[test]
    fn blank_titles_never_add_books(title in "[ \t]{0,4}", author in "[a-z]{1,8}") {
        let mut catalogue = Catalogue::new();
        catalogue.add_book("Dune", "Herbert").unwrap();
        prop_assert!(catalogue.add_book(&title, &author).is_err());
        prop_assert_eq!(catalogue.books().len(), 1);
    }

    #[test]
    fn store_round_trip_preserves_catalogue(ops in prop::collection::vec(op(), 0..40)) {
        let mut catalogue = Catalogue::new();
        for op in &ops {
            apply(&mut catalogue, op);
        }

        let conn = open_in_memory().unwrap();
        save_catalogue(&conn, &catalogue).unwrap();
        let loaded = load_catalogue(&conn).unwrap();

        prop_assert_eq!(loaded.books(), catalogue.books());
        prop_assert_eq!(loaded.members(), catalogue.members());
    }
}
