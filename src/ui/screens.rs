use crate::catalogue::Catalogue;
use crate::models::{Book, MemberId};

/// The two top-level tabs.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub(crate) enum Tab {
    Books,
    Members,
}

impl Tab {
    pub(crate) const TITLES: [&'static str; 2] = ["Books", "Members"];

    pub(crate) fn index(self) -> usize {
        match self {
            Tab::Books => 0,
            Tab::Members => 1,
        }
    }

    pub(crate) fn toggle(self) -> Self {
        match self {
            Tab::Books => Tab::Members,
            Tab::Members => Tab::Books,
        }
    }
}

/// Selection index into a list whose length can change under it.
#[derive(Default, Clone, Copy)]
pub(crate) struct ListCursor {
    pub(crate) selected: usize,
}

impl ListCursor {
    pub(crate) fn move_selection(&mut self, offset: isize, len: usize) {
        if len == 0 {
            self.selected = 0;
            return;
        }
        let last = len as isize - 1;
        self.selected = (self.selected as isize + offset).clamp(0, last) as usize;
    }

    pub(crate) fn select_first(&mut self) {
        self.selected = 0;
    }

    pub(crate) fn select_last(&mut self, len: usize) {
        self.selected = len.saturating_sub(1);
    }

    /// Pull the index back inside `0..len` after a removal.
    pub(crate) fn ensure_in_bounds(&mut self, len: usize) {
        if len == 0 {
            self.selected = 0;
        } else if self.selected >= len {
            self.selected = len - 1;
        }
    }
}

/// Popup listing the books a member can take out right now.
pub(crate) struct BorrowPicker {
    pub(crate) member_id: MemberId,
    pub(crate) member_name: String,
    pub(crate) books: Vec<Book>,
    pub(crate) cursor: ListCursor,
}

impl BorrowPicker {
    /// `None` when the member is unknown or nothing is on the shelf.
    pub(crate) fn load(catalogue: &Catalogue, member_id: MemberId) -> Option<Self> {
        let member = catalogue.member(member_id)?;
        let books: Vec<Book> = catalogue.available_books().cloned().collect();
        if books.is_empty() {
            return None;
        }
        Some(Self {
            member_id,
            member_name: member.name.clone(),
            books,
            cursor: ListCursor::default(),
        })
    }

    pub(crate) fn current_book(&self) -> Option<&Book> {
        self.books.get(self.cursor.selected)
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        self.cursor.move_selection(offset, self.books.len());
    }
}
