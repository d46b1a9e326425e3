use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::models::{Member, MemberId};

/// Internal representation of the "add book" form fields.
#[derive(Default, Clone)]
pub(crate) struct BookForm {
    pub(crate) title: String,
    pub(crate) author: String,
    pub(crate) active: BookField,
    pub(crate) error: Option<String>,
}

/// Fields available within the book form.
#[derive(Copy, Clone, Default, PartialEq, Eq)]
pub(crate) enum BookField {
    #[default]
    Title,
    Author,
}

impl BookForm {
    /// Swap focus between the title and author fields.
    pub(crate) fn toggle_field(&mut self) {
        self.active = match self.active {
            BookField::Title => BookField::Author,
            BookField::Author => BookField::Title,
        };
    }

    /// Append a character to the active field, ignoring control characters.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        match self.active {
            BookField::Title => self.title.push(ch),
            BookField::Author => self.author.push(ch),
        }
        true
    }

    pub(crate) fn backspace(&mut self) {
        match self.active {
            BookField::Title => {
                self.title.pop();
            }
            BookField::Author => {
                self.author.pop();
            }
        }
    }

    /// Render a single line for the form widget.
    pub(crate) fn build_line(&self, field_name: &str, field: BookField) -> Line<'static> {
        let value = match field {
            BookField::Title => &self.title,
            BookField::Author => &self.author,
        };
        field_line(field_name, value, self.active == field)
    }

    pub(crate) fn value_len(&self, field: BookField) -> usize {
        match field {
            BookField::Title => self.title.chars().count(),
            BookField::Author => self.author.chars().count(),
        }
    }
}

/// Single-field form used to register a member.
#[derive(Default, Clone)]
pub(crate) struct MemberForm {
    pub(crate) name: String,
    pub(crate) error: Option<String>,
}

impl MemberForm {
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        self.name.push(ch);
        true
    }

    pub(crate) fn backspace(&mut self) {
        self.name.pop();
    }

    pub(crate) fn build_line(&self) -> Line<'static> {
        field_line("Name", &self.name, true)
    }

    pub(crate) fn value_len(&self) -> usize {
        self.name.chars().count()
    }
}

/// Pending removal of a member, awaiting Y/N.
#[derive(Clone)]
pub(crate) struct ConfirmMemberDelete {
    pub(crate) id: MemberId,
    pub(crate) name: String,
    pub(crate) loans: usize,
}

impl ConfirmMemberDelete {
    pub(crate) fn from(member: &Member) -> Self {
        Self {
            id: member.id,
            name: member.name.clone(),
            loans: member.borrowed_book_ids.len(),
        }
    }
}

fn field_line(field_name: &str, value: &str, is_active: bool) -> Line<'static> {
    let display = if value.is_empty() {
        "<required>".to_string()
    } else {
        value.to_string()
    };

    let style = if is_active {
        Style::default().fg(Color::Yellow)
    } else if value.is_empty() {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default()
    };

    Line::from(vec![
        Span::raw(format!("{field_name}: ")),
        Span::styled(display, style),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typing_goes_to_the_focused_field() {
        let mut form = BookForm::default();
        for ch in "Dune".chars() {
            form.push_char(ch);
        }
        form.toggle_field();
        for ch in "Herbert".chars() {
            form.push_char(ch);
        }
        form.backspace();

        assert_eq!(form.title, "Dune");
        assert_eq!(form.author, "Herber");
        assert_eq!(form.value_len(BookField::Author), 6);
    }

    #[test]
    fn control_characters_are_ignored() {
        let mut form = MemberForm::default();
        assert!(!form.push_char('\n'));
        assert!(form.push_char('A'));
        assert_eq!(form.name, "A");
    }
}
