use std::mem;

use anyhow::Result;
use crossterm::event::KeyCode;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Tabs, Wrap};
use ratatui::Frame;
use tracing::{error, info};

use crate::library::Library;
use crate::models::{Book, Member};

use super::forms::{BookField, BookForm, ConfirmMemberDelete, MemberForm};
use super::helpers::{centered_rect, is_validation, surface_error};
use super::screens::{BorrowPicker, ListCursor, Tab};

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Height of the tab bar across the top.
const HEADER_HEIGHT: u16 = 3;

const BOOK_REJECTED: &str = "Please enter a valid title and author";
const MEMBER_REJECTED: &str = "Please enter a valid name";

/// Fine-grained modes layered over the current tab.
enum Mode {
    Normal,
    AddingBook(BookForm),
    AddingMember(MemberForm),
    Borrowing(BorrowPicker),
    ConfirmMemberDelete(ConfirmMemberDelete),
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Central application state shared across the TUI.
pub struct App {
    library: Library,
    tab: Tab,
    books_cursor: ListCursor,
    members_cursor: ListCursor,
    mode: Mode,
    status: Option<StatusMessage>,
}

impl App {
    pub fn new(library: Library) -> Self {
        Self {
            library,
            tab: Tab::Books,
            books_cursor: ListCursor::default(),
            members_cursor: ListCursor::default(),
            mode: Mode::Normal,
            status: None,
        }
    }

    pub fn library(&self) -> &Library {
        &self.library
    }

    /// Feed one key press through the active mode. Returns `true` when the
    /// user asked to quit.
    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        self.mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit)?,
            Mode::AddingBook(form) => self.handle_add_book(code, form)?,
            Mode::AddingMember(form) => self.handle_add_member(code, form)?,
            Mode::Borrowing(picker) => self.handle_borrow(code, picker)?,
            Mode::ConfirmMemberDelete(confirm) => {
                self.handle_confirm_member_delete(code, confirm)?
            }
        };

        Ok(exit)
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => *exit = true,
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Left | KeyCode::Right => {
                self.tab = self.tab.toggle();
                self.clear_status();
            }
            KeyCode::Up => self.move_cursor(-1),
            KeyCode::Down => self.move_cursor(1),
            KeyCode::PageUp => self.move_cursor(-5),
            KeyCode::PageDown => self.move_cursor(5),
            KeyCode::Home => self.cursor_mut().select_first(),
            KeyCode::End => {
                let len = self.current_len();
                self.cursor_mut().select_last(len);
            }
            _ => {
                return match self.tab {
                    Tab::Books => self.handle_books_key(code),
                    Tab::Members => self.handle_members_key(code),
                }
            }
        }

        Ok(Mode::Normal)
    }

    fn handle_books_key(&mut self, code: KeyCode) -> Result<Mode> {
        match code {
            KeyCode::Char('+') | KeyCode::Char('a') => {
                self.clear_status();
                return Ok(Mode::AddingBook(BookForm::default()));
            }
            KeyCode::Char('-') | KeyCode::Delete => {
                if let Some(book) = self.current_book().cloned() {
                    self.remove_book(&book);
                } else {
                    self.set_status("No book selected to remove.", StatusKind::Error);
                }
            }
            _ => {}
        }
        Ok(Mode::Normal)
    }

    fn handle_members_key(&mut self, code: KeyCode) -> Result<Mode> {
        match code {
            KeyCode::Char('+') | KeyCode::Char('a') => {
                self.clear_status();
                return Ok(Mode::AddingMember(MemberForm::default()));
            }
            KeyCode::Char('b') | KeyCode::Char('B') => {
                let Some(member) = self.current_member().cloned() else {
                    self.set_status("No member selected.", StatusKind::Error);
                    return Ok(Mode::Normal);
                };
                match BorrowPicker::load(self.library.catalogue(), member.id) {
                    Some(picker) => {
                        self.clear_status();
                        return Ok(Mode::Borrowing(picker));
                    }
                    None => self.set_status(
                        "No books available. Add Book first.",
                        StatusKind::Error,
                    ),
                }
            }
            KeyCode::Char('r') | KeyCode::Char('R') => {
                if let Some(member) = self.current_member().cloned() {
                    self.return_books(&member);
                } else {
                    self.set_status("No member selected.", StatusKind::Error);
                }
            }
            KeyCode::Char('-') | KeyCode::Delete => {
                if let Some(member) = self.current_member() {
                    let confirm = ConfirmMemberDelete::from(member);
                    self.clear_status();
                    return Ok(Mode::ConfirmMemberDelete(confirm));
                }
                self.set_status("No member selected to remove.", StatusKind::Error);
            }
            _ => {}
        }
        Ok(Mode::Normal)
    }

    fn handle_add_book(&mut self, code: KeyCode, mut form: BookForm) -> Result<Mode> {
        match code {
            KeyCode::Esc => {
                self.set_status("Add book cancelled.", StatusKind::Info);
                return Ok(Mode::Normal);
            }
            KeyCode::Tab | KeyCode::BackTab => form.toggle_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match self.library.add_book(&form.title, &form.author) {
                Ok(book) => {
                    self.books_cursor
                        .select_last(self.library.catalogue().books().len());
                    self.set_status(format!("Added '{}'.", book.title), StatusKind::Info);
                    return Ok(Mode::Normal);
                }
                Err(err) => {
                    let message = if is_validation(&err) {
                        BOOK_REJECTED.to_string()
                    } else {
                        error!(error = %err, "failed to add book");
                        surface_error(&err)
                    };
                    form.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                }
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }
        Ok(Mode::AddingBook(form))
    }

    fn handle_add_member(&mut self, code: KeyCode, mut form: MemberForm) -> Result<Mode> {
        match code {
            KeyCode::Esc => {
                self.set_status("Add member cancelled.", StatusKind::Info);
                return Ok(Mode::Normal);
            }
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match self.library.add_member(&form.name) {
                Ok(member) => {
                    self.members_cursor
                        .select_last(self.library.catalogue().members().len());
                    self.set_status(format!("Added member {}.", member.name), StatusKind::Info);
                    return Ok(Mode::Normal);
                }
                Err(err) => {
                    let message = if is_validation(&err) {
                        MEMBER_REJECTED.to_string()
                    } else {
                        error!(error = %err, "failed to add member");
                        surface_error(&err)
                    };
                    form.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                }
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }
        Ok(Mode::AddingMember(form))
    }

    fn handle_borrow(&mut self, code: KeyCode, mut picker: BorrowPicker) -> Result<Mode> {
        match code {
            KeyCode::Esc => {
                self.set_status("Borrow cancelled.", StatusKind::Info);
                return Ok(Mode::Normal);
            }
            KeyCode::Up => picker.move_selection(-1),
            KeyCode::Down => picker.move_selection(1),
            KeyCode::PageUp => picker.move_selection(-5),
            KeyCode::PageDown => picker.move_selection(5),
            KeyCode::Enter => {
                if let Some(book) = picker.current_book().cloned() {
                    match self.library.borrow(picker.member_id, book.id) {
                        Ok(true) => {
                            info!(member_id = picker.member_id, book_id = book.id, "loan recorded");
                            self.set_status(
                                format!("{} borrowed '{}'.", picker.member_name, book.title),
                                StatusKind::Info,
                            );
                        }
                        Ok(false) => self.set_status(
                            format!("'{}' is no longer available.", book.title),
                            StatusKind::Error,
                        ),
                        Err(err) => {
                            error!(error = %err, "failed to record loan");
                            self.set_status(surface_error(&err), StatusKind::Error);
                        }
                    }
                }
                return Ok(Mode::Normal);
            }
            _ => {}
        }
        Ok(Mode::Borrowing(picker))
    }

    fn handle_confirm_member_delete(
        &mut self,
        code: KeyCode,
        confirm: ConfirmMemberDelete,
    ) -> Result<Mode> {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Deletion cancelled.", StatusKind::Info);
                Ok(Mode::Normal)
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                match self.library.delete_member(confirm.id) {
                    Ok(_) => {
                        self.members_cursor
                            .ensure_in_bounds(self.library.catalogue().members().len());
                        self.set_status(
                            format!("Deleted member {}.", confirm.name),
                            StatusKind::Info,
                        );
                        Ok(Mode::Normal)
                    }
                    Err(err) => {
                        error!(error = %err, "failed to delete member");
                        self.set_status(surface_error(&err), StatusKind::Error);
                        Ok(Mode::ConfirmMemberDelete(confirm))
                    }
                }
            }
            _ => Ok(Mode::ConfirmMemberDelete(confirm)),
        }
    }

    fn remove_book(&mut self, book: &Book) {
        if let Err(err) = self.library.delete_book(book.id) {
            error!(error = %err, "failed to remove book");
            self.set_status(surface_error(&err), StatusKind::Error);
            return;
        }
        self.books_cursor
            .ensure_in_bounds(self.library.catalogue().books().len());
        self.set_status(format!("Removed '{}'.", book.title), StatusKind::Info);
    }

    fn return_books(&mut self, member: &Member) {
        let returned = match self.library.return_all(member.id) {
            Ok(returned) => returned,
            Err(err) => {
                error!(error = %err, "failed to return books");
                self.set_status(surface_error(&err), StatusKind::Error);
                return;
            }
        };
        if returned == 0 {
            self.set_status(
                format!("{} has no books to return.", member.name),
                StatusKind::Info,
            );
        } else {
            self.set_status(
                format!("{} returned {returned} book(s).", member.name),
                StatusKind::Info,
            );
        }
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(HEADER_HEIGHT),
                Constraint::Min(0),
                Constraint::Length(FOOTER_HEIGHT),
            ])
            .split(area);

        self.draw_tabs(frame, chunks[0]);
        match self.tab {
            Tab::Books => self.draw_books(frame, chunks[1]),
            Tab::Members => self.draw_members(frame, chunks[1]),
        }
        self.draw_footer(frame, chunks[2]);

        match &self.mode {
            Mode::AddingBook(form) => self.draw_book_form(frame, area, form),
            Mode::AddingMember(form) => self.draw_member_form(frame, area, form),
            Mode::Borrowing(picker) => self.draw_borrow_picker(frame, area, picker),
            Mode::ConfirmMemberDelete(confirm) => self.draw_confirm_member(frame, area, confirm),
            Mode::Normal => {}
        }
    }

    fn draw_tabs(&self, frame: &mut Frame, area: Rect) {
        let tabs = Tabs::new(Tab::TITLES)
            .block(Block::default().borders(Borders::ALL).title("Library"))
            .select(self.tab.index())
            .highlight_style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            );
        frame.render_widget(tabs, area);
    }

    fn draw_books(&self, frame: &mut Frame, area: Rect) {
        let catalogue = self.library.catalogue();
        let items: Vec<ListItem> = catalogue
            .books()
            .iter()
            .map(|book| {
                let status_style = if book.is_available() {
                    Style::default().fg(Color::Green)
                } else {
                    Style::default().fg(Color::Red)
                };
                ListItem::new(Line::from(vec![
                    Span::styled(
                        book.title.clone(),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                    Span::raw("  "),
                    Span::styled(book.author.clone(), Style::default().fg(Color::Gray)),
                    Span::raw("  "),
                    Span::styled(book.status_label(), status_style),
                ]))
            })
            .collect();

        if items.is_empty() {
            self.draw_empty(frame, area, "Books", "No books yet. Press + to add one.");
            return;
        }

        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title("Books"))
            .highlight_style(Style::default().fg(Color::Yellow))
            .highlight_symbol("▶ ");
        let mut state = ListState::default().with_selected(Some(self.books_cursor.selected));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_members(&self, frame: &mut Frame, area: Rect) {
        let catalogue = self.library.catalogue();
        let items: Vec<ListItem> = catalogue
            .members()
            .iter()
            .map(|member| {
                let held = catalogue.borrowed_books(member.id);
                let borrowed = if held.is_empty() {
                    Span::styled("No Book", Style::default().fg(Color::DarkGray))
                } else {
                    let titles: Vec<&str> = held.iter().map(|book| book.title.as_str()).collect();
                    Span::styled(titles.join(", "), Style::default().fg(Color::Cyan))
                };
                ListItem::new(Line::from(vec![
                    Span::styled(
                        member.name.clone(),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                    Span::raw("  "),
                    borrowed,
                ]))
            })
            .collect();

        if items.is_empty() {
            self.draw_empty(frame, area, "Members", "No members yet. Press + to add one.");
            return;
        }

        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title("Members"))
            .highlight_style(Style::default().fg(Color::Yellow))
            .highlight_symbol("▶ ");
        let mut state = ListState::default().with_selected(Some(self.members_cursor.selected));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_empty(&self, frame: &mut Frame, area: Rect, title: &str, message: &str) {
        let paragraph = Paragraph::new(Line::from(Span::styled(
            message.to_string(),
            Style::default().fg(Color::DarkGray),
        )))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title(title.to_string()));
        frame.render_widget(paragraph, area);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let paragraph = Paragraph::new(vec![status_line, self.footer_instructions()])
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let mut spans = Vec::new();
        let mut push = |key: &'static str, label: &'static str| {
            spans.push(Span::styled(key, key_style));
            spans.push(Span::raw(label));
        };

        match (&self.mode, self.tab) {
            (Mode::Borrowing(_), _) => {
                push("[↑↓]", " Navigate   ");
                push("[Enter]", " Borrow   ");
                push("[Esc]", " Cancel");
            }
            (Mode::AddingBook(_) | Mode::AddingMember(_), _) => {
                push("[Enter]", " Save   ");
                push("[Tab]", " Next field   ");
                push("[Esc]", " Cancel");
            }
            (Mode::ConfirmMemberDelete(_), _) => {
                push("[Y]", " Delete   ");
                push("[N/Esc]", " Keep");
            }
            (Mode::Normal, Tab::Books) => {
                push("[Tab]", " Members   ");
                push("[+]", " Add   ");
                push("[-]", " Remove   ");
                push("[q]", " Quit");
            }
            (Mode::Normal, Tab::Members) => {
                push("[Tab]", " Books   ");
                push("[+]", " Add   ");
                push("[b]", " Borrow   ");
                push("[r]", " Return   ");
                push("[-]", " Delete   ");
                push("[q]", " Quit");
            }
        }

        Line::from(spans)
    }

    fn draw_book_form(&self, frame: &mut Frame, area: Rect, form: &BookForm) {
        let popup_area = centered_rect(70, 40, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("Add Book").borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines = vec![
            form.build_line("Title", BookField::Title),
            form.build_line("Author", BookField::Author),
            Line::from(""),
        ];
        lines.push(form_hint(form.error.as_deref(), "Enter to save • Tab to switch • Esc to cancel"));

        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);

        let (prefix, row) = match form.active {
            BookField::Title => ("Title: ".len() as u16, 0),
            BookField::Author => ("Author: ".len() as u16, 1),
        };
        frame.set_cursor_position((
            inner.x + prefix + form.value_len(form.active) as u16,
            inner.y + row,
        ));
    }

    fn draw_member_form(&self, frame: &mut Frame, area: Rect, form: &MemberForm) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("Add Member").borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            form.build_line(),
            Line::from(""),
            form_hint(form.error.as_deref(), "Enter to save • Esc to cancel"),
        ];
        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);

        frame.set_cursor_position((
            inner.x + "Name: ".len() as u16 + form.value_len() as u16,
            inner.y,
        ));
    }

    fn draw_borrow_picker(&self, frame: &mut Frame, area: Rect, picker: &BorrowPicker) {
        let popup_area = centered_rect(70, 50, area);
        frame.render_widget(Clear, popup_area);

        let items: Vec<ListItem> = picker
            .books
            .iter()
            .map(|book| ListItem::new(book.display_title()))
            .collect();
        let list = List::new(items)
            .block(
                Block::default()
                    .title(format!("Borrow Book for {}", picker.member_name))
                    .borders(Borders::ALL),
            )
            .highlight_style(Style::default().fg(Color::Yellow))
            .highlight_symbol("▶ ");
        let mut state = ListState::default().with_selected(Some(picker.cursor.selected));
        frame.render_stateful_widget(list, popup_area, &mut state);
    }

    fn draw_confirm_member(&self, frame: &mut Frame, area: Rect, confirm: &ConfirmMemberDelete) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title("Confirm Removal")
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let consequence = if confirm.loans == 0 {
            "They have no books out.".to_string()
        } else {
            format!("Their {} borrowed book(s) will be marked available.", confirm.loans)
        };
        let lines = vec![
            Line::from(format!("Delete member {}?", confirm.name)),
            Line::from(consequence),
            Line::from(""),
            Line::from(Span::styled(
                "Press Y to confirm or N / Esc to cancel.",
                Style::default().fg(Color::Gray),
            )),
        ];

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }

    fn current_len(&self) -> usize {
        let catalogue = self.library.catalogue();
        match self.tab {
            Tab::Books => catalogue.books().len(),
            Tab::Members => catalogue.members().len(),
        }
    }

    fn cursor_mut(&mut self) -> &mut ListCursor {
        match self.tab {
            Tab::Books => &mut self.books_cursor,
            Tab::Members => &mut self.members_cursor,
        }
    }

    fn move_cursor(&mut self, offset: isize) {
        let len = self.current_len();
        self.cursor_mut().move_selection(offset, len);
    }

    fn current_book(&self) -> Option<&Book> {
        self.library
            .catalogue()
            .books()
            .get(self.books_cursor.selected)
    }

    fn current_member(&self) -> Option<&Member> {
        self.library
            .catalogue()
            .members()
            .get(self.members_cursor.selected)
    }
}

fn form_hint(error: Option<&str>, hint: &'static str) -> Line<'static> {
    match error {
        Some(error) => Line::from(Span::styled(
            error.to_string(),
            Style::default().fg(Color::Red),
        )),
        None => Line::from(Span::styled(hint, Style::default().fg(Color::Gray))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::Duration;

    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use rusqlite::Connection;

    use crate::db::open_store;

    fn type_text(app: &mut App, text: &str) {
        for ch in text.chars() {
            app.handle_key(KeyCode::Char(ch)).unwrap();
        }
    }

    fn app() -> App {
        App::new(Library::in_memory().unwrap())
    }

    fn rendered(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|frame| app.draw(frame)).unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn add_book_through_the_form() {
        let mut app = app();
        app.handle_key(KeyCode::Char('+')).unwrap();
        type_text(&mut app, "Dune");
        app.handle_key(KeyCode::Tab).unwrap();
        type_text(&mut app, "Herbert");
        app.handle_key(KeyCode::Enter).unwrap();

        let books = app.library().catalogue().books();
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].title, "Dune");
        assert!(matches!(app.mode, Mode::Normal));
    }

    #[test]
    fn blank_author_keeps_form_open() {
        let mut app = app();
        app.handle_key(KeyCode::Char('+')).unwrap();
        type_text(&mut app, "Dune");
        app.handle_key(KeyCode::Enter).unwrap();

        assert!(app.library().catalogue().books().is_empty());
        match &app.mode {
            Mode::AddingBook(form) => assert_eq!(form.error.as_deref(), Some(BOOK_REJECTED)),
            _ => panic!("form should stay open"),
        }
    }

    #[test]
    fn borrow_then_return_from_members_tab() {
        let mut app = app();
        app.handle_key(KeyCode::Char('+')).unwrap();
        type_text(&mut app, "Dune");
        app.handle_key(KeyCode::Tab).unwrap();
        type_text(&mut app, "Herbert");
        app.handle_key(KeyCode::Enter).unwrap();

        app.handle_key(KeyCode::Tab).unwrap();
        app.handle_key(KeyCode::Char('+')).unwrap();
        type_text(&mut app, "Alice");
        app.handle_key(KeyCode::Enter).unwrap();

        app.handle_key(KeyCode::Char('b')).unwrap();
        assert!(matches!(app.mode, Mode::Borrowing(_)));
        app.handle_key(KeyCode::Enter).unwrap();
        assert_eq!(app.library().catalogue().book(1).unwrap().borrowed_by, Some(1));
        assert!(rendered(&app).contains("Dune"));

        app.handle_key(KeyCode::Char('b')).unwrap();
        assert!(matches!(app.mode, Mode::Normal));

        app.handle_key(KeyCode::Char('r')).unwrap();
        assert!(app.library().catalogue().book(1).unwrap().is_available());
    }

    #[test]
    fn member_delete_requires_confirmation() {
        let mut app = app();
        app.handle_key(KeyCode::Tab).unwrap();
        app.handle_key(KeyCode::Char('+')).unwrap();
        type_text(&mut app, "Alice");
        app.handle_key(KeyCode::Enter).unwrap();

        app.handle_key(KeyCode::Char('-')).unwrap();
        app.handle_key(KeyCode::Char('n')).unwrap();
        assert_eq!(app.library().catalogue().members().len(), 1);

        app.handle_key(KeyCode::Char('-')).unwrap();
        app.handle_key(KeyCode::Char('y')).unwrap();
        assert!(app.library().catalogue().members().is_empty());
    }

    #[test]
    fn empty_tabs_render_hints() {
        let mut app = app();
        assert!(rendered(&app).contains("No books yet"));
        app.handle_key(KeyCode::Tab).unwrap();
        assert!(rendered(&app).contains("No members yet"));
    }

    #[test]
    fn storage_failures_stay_in_the_footer() {
        let dir = std::env::temp_dir().join(format!(
            "library-catalogue-app-{}-locked",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        let path = dir.join("catalogue.sqlite");
        let conn = open_store(&path).unwrap();
        conn.busy_timeout(Duration::ZERO).unwrap();
        let mut app = App::new(Library::from_connection(conn).unwrap());

        app.handle_key(KeyCode::Char('+')).unwrap();
        type_text(&mut app, "Dune");
        app.handle_key(KeyCode::Tab).unwrap();
        type_text(&mut app, "Herbert");
        app.handle_key(KeyCode::Enter).unwrap();
        app.handle_key(KeyCode::Tab).unwrap();
        app.handle_key(KeyCode::Char('+')).unwrap();
        type_text(&mut app, "Alice");
        app.handle_key(KeyCode::Enter).unwrap();

        let other = Connection::open(&path).unwrap();
        other.execute_batch("BEGIN EXCLUSIVE").unwrap();

        app.handle_key(KeyCode::Char('b')).unwrap();
        assert!(!app.handle_key(KeyCode::Enter).unwrap());
        assert!(matches!(app.status, Some(StatusMessage { kind: StatusKind::Error, .. })));
        assert!(app.library().catalogue().book(1).unwrap().is_available());

        app.handle_key(KeyCode::Tab).unwrap();
        app.status = None;
        assert!(!app.handle_key(KeyCode::Char('-')).unwrap());
        assert!(matches!(app.status, Some(StatusMessage { kind: StatusKind::Error, .. })));
        assert_eq!(app.library().catalogue().books().len(), 1);

        other.execute_batch("COMMIT").unwrap();
        app.handle_key(KeyCode::Tab).unwrap();
        app.handle_key(KeyCode::Char('b')).unwrap();
        app.handle_key(KeyCode::Enter).unwrap();
        assert_eq!(app.library().catalogue().book(1).unwrap().borrowed_by, Some(1));

        other.execute_batch("BEGIN EXCLUSIVE").unwrap();
        app.status = None;
        assert!(!app.handle_key(KeyCode::Char('r')).unwrap());
        assert!(matches!(app.status, Some(StatusMessage { kind: StatusKind::Error, .. })));
        assert_eq!(app.library().catalogue().book(1).unwrap().borrowed_by, Some(1));
        other.execute_batch("COMMIT").unwrap();

        drop(other);
        drop(app);
        let _ = fs::remove_dir_all(&dir);
    }
}
