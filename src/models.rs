//! Domain models for the catalogue. Both types are plain data holders that
//! serialize to the structured-text format kept in the key-value store; the
//! rules that tie a book to its borrower live in [`crate::catalogue`], never
//! here, so these structs can be cloned into the UI freely.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier assigned to a book. Positive and unique within a catalogue.
pub type BookId = u64;
/// Identifier assigned to a member. Positive and unique within a catalogue.
pub type MemberId = u64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// A book on the shelves. `borrowed_by` is the authoritative side of the
/// borrow relationship: the member's list of ids is an index kept in step
/// with it.
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: String,
    /// Member currently holding the book, serialized as `null` when on the
    /// shelf.
    #[serde(default)]
    pub borrowed_by: Option<MemberId>,
}

impl Book {
    /// Whether the book can be handed out right now.
    pub fn is_available(&self) -> bool {
        self.borrowed_by.is_none()
    }

    /// Short availability label shown in the books table.
    pub fn status_label(&self) -> &'static str {
        if self.is_available() {
            "Available"
        } else {
            "Borrowed"
        }
    }

    /// `Title - Author`, used by the borrow picker and member rows.
    pub fn display_title(&self) -> String {
        format!("{} - {}", self.title, self.author)
    }
}

impl fmt::Display for Book {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "MemberRecord")]
/// A library member and the ids of the books they hold. The list behaves as a
/// set (no duplicates, order insignificant) but keeps borrow order so the UI
/// lists titles predictably.
pub struct Member {
    pub id: MemberId,
    pub name: String,
    pub borrowed_book_ids: Vec<BookId>,
}

impl Member {
    /// True when the member holds the given book.
    pub fn holds(&self, book_id: BookId) -> bool {
        self.borrowed_book_ids.contains(&book_id)
    }
}

impl fmt::Display for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// On-disk shape of a member. Records written before members could hold more
/// than one book carry a single nullable `borrowedBookId` instead of the list.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MemberRecord {
    id: MemberId,
    name: String,
    #[serde(default)]
    borrowed_book_ids: Option<Vec<BookId>>,
    #[serde(default)]
    borrowed_book_id: Option<BookId>,
}

impl From<MemberRecord> for Member {
    fn from(record: MemberRecord) -> Self {
        let mut borrowed_book_ids = record
            .borrowed_book_ids
            .unwrap_or_else(|| record.borrowed_book_id.into_iter().collect());
        let mut seen = Vec::with_capacity(borrowed_book_ids.len());
        borrowed_book_ids.retain(|id| {
            if seen.contains(id) {
                false
            } else {
                seen.push(*id);
                true
            }
        });

        Self {
            id: record.id,
            name: record.name,
            borrowed_book_ids,
        }
    }
}
