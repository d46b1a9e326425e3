//! The catalogue store: both collections plus the rules that keep the borrow
//! relationship consistent.
//!
//! `Book::borrowed_by` is authoritative. `Member::borrowed_book_ids` is an
//! index that only the methods in this module touch, so every cascade lives in
//! one place instead of at each call site in the UI.

use std::collections::HashSet;
use std::mem;

use tracing::{debug, warn};

use crate::error::{CatalogueError, CatalogueResult};
use crate::models::{Book, BookId, Member, MemberId};

/// In-memory state for one session. Construct it empty with
/// [`Catalogue::new`] or from stored collections with
/// [`Catalogue::from_parts`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalogue {
    books: Vec<Book>,
    members: Vec<Member>,
    next_book_id: BookId,
    next_member_id: MemberId,
}

impl Default for Catalogue {
    fn default() -> Self {
        Self::new()
    }
}

impl Catalogue {
    pub fn new() -> Self {
        Self {
            books: Vec::new(),
            members: Vec::new(),
            next_book_id: 1,
            next_member_id: 1,
        }
    }

    /// Rebuild a catalogue from collections read out of storage.
    ///
    /// Id counters restart at `max + 1`. Stored data is not trusted: duplicate
    /// ids keep their first occurrence, a borrower that no longer exists is
    /// cleared from the book, and each member's list is rebuilt from the books
    /// that actually point at them.
    pub fn from_parts(books: Vec<Book>, members: Vec<Member>) -> Self {
        let mut seen_books = HashSet::new();
        let mut books: Vec<Book> = books
            .into_iter()
            .filter(|book| {
                if !usable_id(book.id) {
                    warn!(book_id = book.id, "dropping book with out-of-range id");
                    return false;
                }
                let fresh = seen_books.insert(book.id);
                if !fresh {
                    warn!(book_id = book.id, "dropping book with duplicate id");
                }
                fresh
            })
            .collect();

        let mut seen_members = HashSet::new();
        let mut members: Vec<Member> = members
            .into_iter()
            .filter(|member| {
                if !usable_id(member.id) {
                    warn!(member_id = member.id, "dropping member with out-of-range id");
                    return false;
                }
                let fresh = seen_members.insert(member.id);
                if !fresh {
                    warn!(member_id = member.id, "dropping member with duplicate id");
                }
                fresh
            })
            .collect();

        for book in &mut books {
            if let Some(member_id) = book.borrowed_by {
                if !seen_members.contains(&member_id) {
                    warn!(book_id = book.id, member_id, "clearing borrower that no longer exists");
                    book.borrowed_by = None;
                }
            }
        }

        for member in &mut members {
            let member_id = member.id;
            let before = member.borrowed_book_ids.clone();
            let mut listed = HashSet::new();
            member.borrowed_book_ids.retain(|book_id| {
                listed.insert(*book_id)
                    && books
                        .iter()
                        .any(|book| book.id == *book_id && book.borrowed_by == Some(member_id))
            });
            for book in books.iter().filter(|b| b.borrowed_by == Some(member_id)) {
                if !member.borrowed_book_ids.contains(&book.id) {
                    member.borrowed_book_ids.push(book.id);
                }
            }
            if member.borrowed_book_ids != before {
                warn!(member_id, "rebuilt borrowed book list from book records");
            }
        }

        let next_book_id = next_after(books.iter().map(|b| b.id));
        let next_member_id = next_after(members.iter().map(|m| m.id));

        Self {
            books,
            members,
            next_book_id,
            next_member_id,
        }
    }

    pub fn books(&self) -> &[Book] {
        &self.books
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn book(&self, id: BookId) -> Option<&Book> {
        self.books.iter().find(|book| book.id == id)
    }

    pub fn member(&self, id: MemberId) -> Option<&Member> {
        self.members.iter().find(|member| member.id == id)
    }

    /// Books currently on the shelf, in catalogue order. Drives the borrow
    /// picker.
    pub fn available_books(&self) -> impl Iterator<Item = &Book> + '_ {
        self.books.iter().filter(|book| book.is_available())
    }

    /// Books held by a member, in the order they were borrowed.
    pub fn borrowed_books(&self, member_id: MemberId) -> Vec<&Book> {
        self.member(member_id)
            .map(|member| {
                member
                    .borrowed_book_ids
                    .iter()
                    .filter_map(|id| self.book(*id))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Add a book to the shelves. Title and author are stored trimmed.
    pub fn add_book(&mut self, title: &str, author: &str) -> CatalogueResult<Book> {
        let title = required(title, "Title")?;
        let author = required(author, "Author")?;

        let id = self.next_book_id;
        self.next_book_id = id
            .checked_add(1)
            .ok_or(CatalogueError::IdsExhausted("book"))?;
        let book = Book {
            id,
            title,
            author,
            borrowed_by: None,
        };
        self.books.push(book.clone());
        debug!(book_id = book.id, "added book");
        Ok(book)
    }

    /// Register a member with no loans.
    pub fn add_member(&mut self, name: &str) -> CatalogueResult<Member> {
        let name = required(name, "Name")?;

        let id = self.next_member_id;
        self.next_member_id = id
            .checked_add(1)
            .ok_or(CatalogueError::IdsExhausted("member"))?;
        let member = Member {
            id,
            name,
            borrowed_book_ids: Vec::new(),
        };
        self.members.push(member.clone());
        debug!(member_id = member.id, "added member");
        Ok(member)
    }

    /// Lend a book to a member. Unknown ids and books already out are ignored;
    /// the return value says whether anything changed.
    pub fn borrow(&mut self, member_id: MemberId, book_id: BookId) -> bool {
        let Some(member) = self.members.iter_mut().find(|m| m.id == member_id) else {
            debug!(member_id, book_id, "borrow ignored: unknown member");
            return false;
        };
        let Some(book) = self.books.iter_mut().find(|b| b.id == book_id) else {
            debug!(member_id, book_id, "borrow ignored: unknown book");
            return false;
        };
        if !book.is_available() {
            debug!(member_id, book_id, "borrow ignored: book already out");
            return false;
        }

        book.borrowed_by = Some(member_id);
        if !member.holds(book_id) {
            member.borrowed_book_ids.push(book_id);
        }
        debug!(member_id, book_id, "book borrowed");
        true
    }

    /// Return one specific book held by a member.
    pub fn return_book(&mut self, member_id: MemberId, book_id: BookId) -> bool {
        let Some(member) = self.members.iter_mut().find(|m| m.id == member_id) else {
            return false;
        };
        if !member.holds(book_id) {
            return false;
        }
        member.borrowed_book_ids.retain(|id| *id != book_id);
        if let Some(book) = self.books.iter_mut().find(|b| b.id == book_id) {
            book.borrowed_by = None;
        }
        debug!(member_id, book_id, "book returned");
        true
    }

    /// Return everything a member holds. Yields the number of books put back
    /// on the shelf; zero for an unknown member.
    pub fn return_all(&mut self, member_id: MemberId) -> usize {
        let Some(member) = self.members.iter_mut().find(|m| m.id == member_id) else {
            debug!(member_id, "return ignored: unknown member");
            return 0;
        };

        let returned = mem::take(&mut member.borrowed_book_ids);
        for book in self
            .books
            .iter_mut()
            .filter(|book| returned.contains(&book.id))
        {
            book.borrowed_by = None;
        }
        debug!(member_id, count = returned.len(), "returned all books");
        returned.len()
    }

    /// Remove a book and strike it from every member's list.
    pub fn delete_book(&mut self, book_id: BookId) -> Option<Book> {
        let index = self.books.iter().position(|b| b.id == book_id)?;
        let book = self.books.remove(index);
        for member in &mut self.members {
            member.borrowed_book_ids.retain(|id| *id != book_id);
        }
        debug!(book_id, "deleted book");
        Some(book)
    }

    /// Remove a member and put every book they held back on the shelf.
    pub fn delete_member(&mut self, member_id: MemberId) -> Option<Member> {
        let index = self.members.iter().position(|m| m.id == member_id)?;
        let member = self.members.remove(index);
        for book in self
            .books
            .iter_mut()
            .filter(|book| book.borrowed_by == Some(member_id))
        {
            book.borrowed_by = None;
        }
        debug!(member_id, "deleted member");
        Some(member)
    }

    /// Verify every relationship invariant, reporting the first violation.
    pub fn check_consistency(&self) -> CatalogueResult<()> {
        let mut book_ids = HashSet::new();
        for book in &self.books {
            if !book_ids.insert(book.id) {
                return Err(CatalogueError::DuplicateId {
                    kind: "book",
                    id: book.id,
                });
            }
        }
        let mut member_ids = HashSet::new();
        for member in &self.members {
            if !member_ids.insert(member.id) {
                return Err(CatalogueError::DuplicateId {
                    kind: "member",
                    id: member.id,
                });
            }
        }

        for book in &self.books {
            if let Some(member_id) = book.borrowed_by {
                match self.member(member_id) {
                    None => {
                        return Err(CatalogueError::DanglingBorrower {
                            book: book.id,
                            member: member_id,
                        })
                    }
                    Some(member) if !member.holds(book.id) => {
                        return Err(CatalogueError::LinkMismatch {
                            book: book.id,
                            member: member_id,
                        })
                    }
                    Some(_) => {}
                }
            }
        }

        for member in &self.members {
            let mut held = HashSet::new();
            for book_id in &member.borrowed_book_ids {
                if !held.insert(*book_id) {
                    return Err(CatalogueError::DuplicateLoan {
                        book: *book_id,
                        member: member.id,
                    });
                }
                let linked = self
                    .book(*book_id)
                    .is_some_and(|book| book.borrowed_by == Some(member.id));
                if !linked {
                    return Err(CatalogueError::LinkMismatch {
                        book: *book_id,
                        member: member.id,
                    });
                }
            }
        }

        Ok(())
    }
}

/// Stored ids must be positive and leave room for the next counter value.
fn usable_id(id: u64) -> bool {
    id != 0 && id != u64::MAX
}

/// First id after the largest of `ids`, or 1 for an empty collection. Callers
/// filter with [`usable_id`] first, so the addition cannot overflow.
fn next_after(ids: impl Iterator<Item = u64>) -> u64 {
    ids.max().and_then(|max| max.checked_add(1)).unwrap_or(1)
}

fn required(value: &str, field: &'static str) -> CatalogueResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(CatalogueError::EmptyField(field))
    } else {
        Ok(trimmed.to_string())
    }
}
