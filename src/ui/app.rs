use std::mem;

use anyhow::Result;
use crossterm::event::KeyCode;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap};
use ratatui::Frame;
use tracing::info;

use crate::error::WorkflowError;
use crate::models::Column;
use crate::workflow::{EditTarget, EditWorkflow};

use super::forms::{ConfirmQuit, QuitChoice, SongField, SongForm};
use super::helpers::{centered_rect, clamp_offset, column_header, surface_error};

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Rows skipped by PageUp/PageDown.
const PAGE_STEP: isize = 10;

/// Fine-grained modes layered over the table screen.
enum Mode {
    Normal,
    Editing { target: EditTarget, form: SongForm },
    Searching(SearchState),
    ConfirmQuit(ConfirmQuit),
    /// Reload was requested while the table had unsaved edits.
    ConfirmReload,
}

/// State for the live search bar.
struct SearchState {
    query: String,
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
    workflow: EditWorkflow,
    /// Selected visible row.
    selected: usize,
    mode: Mode,
    status: Option<StatusMessage>,
}

impl App {
    pub fn new(workflow: EditWorkflow) -> Self {
        Self {
            workflow,
            selected: 0,
            mode: Mode::Normal,
            status: None,
        }
    }

    /// Give the workflow back so the caller can close the store.
    pub fn into_workflow(self) -> EditWorkflow {
        self.workflow
    }

    /// Dispatch one key press. Returns `true` when the app should exit.
    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        self.mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit)?,
            Mode::Editing { target, form } => self.handle_form(code, target, form)?,
            Mode::Searching(state) => self.handle_search(code, state)?,
            Mode::ConfirmQuit(confirm) => self.handle_confirm_quit(code, confirm, &mut exit)?,
            Mode::ConfirmReload => self.handle_confirm_reload(code),
        };

        Ok(exit)
    }

    /// Ctrl+S saves from anywhere except an open form.
    pub(crate) fn handle_ctrl_s(&mut self) -> Result<()> {
        if matches!(self.mode, Mode::Normal | Mode::Searching(_)) {
            self.save();
        }
        Ok(())
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => {
                if self.workflow.is_dirty() {
                    return Ok(Mode::ConfirmQuit(ConfirmQuit::new()));
                }
                *exit = true;
            }
            KeyCode::Up => self.move_selection(-1),
            KeyCode::Down => self.move_selection(1),
            KeyCode::PageUp => self.move_selection(-PAGE_STEP),
            KeyCode::PageDown => self.move_selection(PAGE_STEP),
            KeyCode::Home => self.selected = 0,
            KeyCode::End => self.selected = self.workflow.model().visible_len().saturating_sub(1),
            KeyCode::Char('n') | KeyCode::Char('+') => {
                self.clear_status();
                let session = self.workflow.begin_create();
                return Ok(Mode::Editing {
                    target: session.target,
                    form: SongForm::from_draft(&session.draft, false),
                });
            }
            KeyCode::Char('e') | KeyCode::Enter => {
                if let Some(session) = self.workflow.begin_edit(self.selected) {
                    self.clear_status();
                    let has_preview = match session.target {
                        EditTarget::Existing(index) => self
                            .workflow
                            .model()
                            .get(index)
                            .is_some_and(|record| record.preview.is_some()),
                        EditTarget::Create => false,
                    };
                    return Ok(Mode::Editing {
                        target: session.target,
                        form: SongForm::from_draft(&session.draft, has_preview),
                    });
                }
            }
            KeyCode::Char('d') | KeyCode::Char('-') | KeyCode::Delete => {
                if let Some(removed) = self.workflow.delete(self.selected) {
                    self.clamp_selection();
                    self.set_status(format!("Deleted {removed}."), StatusKind::Info);
                }
            }
            KeyCode::Char('s') => {
                self.save();
            }
            KeyCode::Char('r') => {
                if self.workflow.is_dirty() {
                    return Ok(Mode::ConfirmReload);
                }
                self.reload();
            }
            KeyCode::Char('/') | KeyCode::Char('f') => {
                self.clear_status();
                return Ok(Mode::Searching(SearchState {
                    query: self.workflow.model().filter_keyword().to_string(),
                }));
            }
            KeyCode::Char(ch @ '1'..='4') => {
                let column = Column::ALL[ch as usize - '1' as usize];
                self.toggle_sort(column);
            }
            KeyCode::Char('0') => {
                self.workflow.clear_sort();
                self.set_status("Showing playlist order.", StatusKind::Info);
            }
            _ => {}
        }
        Ok(Mode::Normal)
    }

    fn handle_form(
        &mut self,
        code: KeyCode,
        target: EditTarget,
        mut form: SongForm,
    ) -> Result<Mode> {
        let mut keep_open = true;
        match code {
            KeyCode::Esc => {
                let message = match target {
                    EditTarget::Create => "Add song cancelled.",
                    EditTarget::Existing(_) => "Edit cancelled.",
                };
                self.set_status(message, StatusKind::Info);
                keep_open = false;
            }
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.previous_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match self.workflow.submit(target, &form.to_draft()) {
                Ok(index) => {
                    if let Some(position) = self.workflow.model().visible_position(index) {
                        self.selected = position;
                    }
                    self.clamp_selection();
                    let message = match target {
                        EditTarget::Create => "Song added. Press 's' to save.",
                        EditTarget::Existing(_) => "Song updated. Press 's' to save.",
                    };
                    self.set_status(message, StatusKind::Info);
                    keep_open = false;
                }
                Err(WorkflowError::Table(_)) => {
                    self.clamp_selection();
                    keep_open = false;
                }
                Err(err) => {
                    let message = surface_error(&err);
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

        if keep_open {
            Ok(Mode::Editing { target, form })
        } else {
            Ok(Mode::Normal)
        }
    }

    fn handle_search(&mut self, code: KeyCode, mut state: SearchState) -> Result<Mode> {
        match code {
            KeyCode::Esc => {
                self.workflow.set_filter("");
                self.clamp_selection();
                return Ok(Mode::Normal);
            }
            KeyCode::Enter => return Ok(Mode::Normal),
            KeyCode::Up => {
                self.move_selection(-1);
                return Ok(Mode::Searching(state));
            }
            KeyCode::Down => {
                self.move_selection(1);
                return Ok(Mode::Searching(state));
            }
            KeyCode::Backspace => {
                state.query.pop();
            }
            KeyCode::Char(ch) if !ch.is_control() => state.query.push(ch),
            _ => return Ok(Mode::Searching(state)),
        }

        self.workflow.set_filter(&state.query);
        self.clamp_selection();
        Ok(Mode::Searching(state))
    }

    fn handle_confirm_quit(
        &mut self,
        code: KeyCode,
        mut confirm: ConfirmQuit,
        exit: &mut bool,
    ) -> Result<Mode> {
        match code {
            KeyCode::Esc => Ok(Mode::Normal),
            KeyCode::Left | KeyCode::Up | KeyCode::BackTab => {
                confirm.previous();
                Ok(Mode::ConfirmQuit(confirm))
            }
            KeyCode::Right | KeyCode::Down | KeyCode::Tab => {
                confirm.next();
                Ok(Mode::ConfirmQuit(confirm))
            }
            KeyCode::Enter => match confirm.selection {
                QuitChoice::Save => {
                    if self.save() {
                        *exit = true;
                        Ok(Mode::Normal)
                    } else {
                        Ok(Mode::ConfirmQuit(confirm))
                    }
                }
                QuitChoice::Discard => {
                    info!("quitting without saving");
                    *exit = true;
                    Ok(Mode::Normal)
                }
                QuitChoice::Cancel => Ok(Mode::Normal),
            },
            _ => Ok(Mode::ConfirmQuit(confirm)),
        }
    }

    fn handle_confirm_reload(&mut self, code: KeyCode) -> Mode {
        match code {
            KeyCode::Enter | KeyCode::Char('y') => {
                info!("reloading over unsaved edits");
                self.reload();
                Mode::Normal
            }
            KeyCode::Esc | KeyCode::Char('n') => {
                self.set_status("Reload cancelled.", StatusKind::Info);
                Mode::Normal
            }
            _ => Mode::ConfirmReload,
        }
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let footer_height = FOOTER_HEIGHT.min(area.height);

        let (content_area, footer_area) = if area.height > footer_height {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(footer_height)])
                .split(area);
            (chunks[0], chunks[1])
        } else {
            (area, area)
        };

        self.draw_table(frame, content_area);

        if area.height >= footer_height {
            self.draw_footer(frame, footer_area);
        }

        match &self.mode {
            Mode::Editing { target, form } => {
                let title = match target {
                    EditTarget::Create => "Add Song",
                    EditTarget::Existing(_) => "Edit Song",
                };
                self.draw_song_form(frame, area, title, form);
            }
            Mode::Searching(state) => self.draw_search_bar(frame, area, state),
            Mode::ConfirmQuit(confirm) => self.draw_confirm_quit(frame, area, confirm),
            Mode::ConfirmReload => self.draw_confirm_reload(frame, area),
            Mode::Normal => {}
        }
    }

    fn table_title(&self) -> String {
        let model = self.workflow.model();
        let mut title = String::from("Playlist");
        if self.workflow.is_dirty() {
            title.push_str(" *");
        }
        let keyword = model.filter_keyword();
        if keyword.is_empty() {
            title.push_str(&format!(" ({} songs)", model.len()));
        } else {
            title.push_str(&format!(
                " ({} of {} match \"{keyword}\")",
                model.visible_len(),
                model.len()
            ));
        }
        title
    }

    fn draw_table(&self, frame: &mut Frame, area: Rect) {
        let model = self.workflow.model();
        let block = Block::default()
            .borders(Borders::ALL)
            .title(self.table_title());

        if model.visible_len() == 0 {
            let text = if model.is_empty() {
                "No songs yet. Press 'n' to add one."
            } else {
                "No songs match the current search."
            };
            let message = Paragraph::new(text).alignment(Alignment::Center).block(block);
            frame.render_widget(message, area);
            return;
        }

        let sort = model.sort_order();
        let header_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let mut header_cells = vec![Cell::from("Preview")];
        header_cells.extend(
            Column::ALL
                .iter()
                .map(|column| Cell::from(column_header(*column, sort))),
        );
        let header = Row::new(header_cells).style(header_style);

        let rows = model.visible_rows().map(|record| {
            Row::new(vec![
                Cell::from(record.preview_label()),
                Cell::from(record.title.clone()),
                Cell::from(record.artist.clone()),
                Cell::from(record.duration.clone()),
                Cell::from(record.rating.to_string()),
            ])
        });

        let widths = [
            Constraint::Length(9),
            Constraint::Percentage(35),
            Constraint::Percentage(35),
            Constraint::Length(10),
            Constraint::Length(8),
        ];

        let table = Table::new(rows, widths)
            .header(header)
            .block(block)
            .row_highlight_style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("> ");

        let mut state = TableState::default().with_selected(Some(self.selected));
        frame.render_stateful_widget(table, area, &mut state);
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

        let instructions = self.footer_instructions();

        let paragraph = Paragraph::new(vec![status_line, instructions]).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn draw_search_bar(&self, frame: &mut Frame, area: Rect, state: &SearchState) {
        let height = 3u16.min(area.height);
        let popup_area = Rect {
            x: area.x,
            y: area.y,
            width: area.width,
            height,
        };
        frame.render_widget(Clear, popup_area);

        let block = Block::default().borders(Borders::ALL).title("Search");
        let paragraph = Paragraph::new(Span::raw(format!("Search: {}", state.query)))
            .block(block.clone())
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, popup_area);

        let inner = block.inner(popup_area);
        let cursor_x = inner.x + "Search: ".len() as u16 + state.query.chars().count() as u16;
        frame.set_cursor_position((cursor_x, inner.y));
    }

    fn footer_instructions(&self) -> Line<'static> {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let pairs: &[(&'static str, &'static str)] = match &self.mode {
            Mode::Editing { .. } => &[
                ("[Tab]", " Next field   "),
                ("[Enter]", " Accept   "),
                ("[Esc]", " Cancel"),
            ],
            Mode::Searching(_) => &[
                ("[↑↓]", " Navigate   "),
                ("[Enter]", " Keep filter   "),
                ("[Esc]", " Clear filter"),
            ],
            Mode::ConfirmQuit(_) => &[
                ("[←→]", " Choose   "),
                ("[Enter]", " Confirm   "),
                ("[Esc]", " Back"),
            ],
            Mode::ConfirmReload => &[("[Enter/y]", " Discard & reload   "), ("[Esc/n]", " Back")],
            Mode::Normal => &[
                ("[n]", " New   "),
                ("[e]", " Edit   "),
                ("[d]", " Delete   "),
                ("[s]", " Save   "),
                ("[/]", " Search   "),
                ("[1-4]", " Sort   "),
                ("[0]", " Unsort   "),
                ("[r]", " Reload   "),
                ("[q]", " Quit"),
            ],
        };

        let spans: Vec<Span<'static>> = pairs
            .iter()
            .flat_map(|(key, label)| [Span::styled(*key, key_style), Span::raw(*label)])
            .collect();
        Line::from(spans)
    }

    fn draw_song_form(&self, frame: &mut Frame, area: Rect, title: &str, form: &SongForm) {
        let popup_area = centered_rect(70, 50, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title(title).borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines: Vec<Line> = SongField::ORDER
            .iter()
            .map(|field| form.build_line(*field))
            .collect();
        lines.push(Line::from(""));

        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "Enter to accept • Tab to switch • Esc to cancel",
                Style::default().fg(Color::Gray),
            )));
        }

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);

        let prefix = format!("{}: ", form.active.label()).len() as u16;
        let cursor_x = inner.x + prefix + form.value_len(form.active) as u16;
        let cursor_y = inner.y + form.active_row() as u16;
        frame.set_cursor_position((cursor_x, cursor_y));
    }

    fn draw_confirm_quit(&self, frame: &mut Frame, area: Rect, confirm: &ConfirmQuit) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("Unsaved Changes").borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut option_spans = Vec::new();
        for (idx, label) in confirm.labels().iter().enumerate() {
            if idx > 0 {
                option_spans.push(Span::raw("   "));
            }
            let style = if confirm.selected_index() == idx {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            option_spans.push(Span::styled(*label, style));
        }

        let lines = vec![
            Line::from("The playlist has changes that are not saved yet."),
            Line::from(""),
            Line::from(option_spans),
        ];

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn draw_confirm_reload(&self, frame: &mut Frame, area: Rect) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("Unsaved Changes").borders(Borders::ALL);
        let lines = vec![
            Line::from("Reloading discards the changes that are not saved yet."),
            Line::from(""),
            Line::from(Span::styled(
                "Enter/y to reload • Esc/n to keep editing",
                Style::default().fg(Color::Gray),
            )),
        ];
        let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, popup_area);
    }

    /// Save the whole table. Returns whether the save went through.
    fn save(&mut self) -> bool {
        match self.workflow.save() {
            Ok(count) => {
                let plural = if count == 1 { "" } else { "s" };
                self.set_status(format!("Saved {count} song{plural}."), StatusKind::Info);
                true
            }
            Err(err) => {
                self.set_status(surface_error(&err), StatusKind::Error);
                false
            }
        }
    }

    fn reload(&mut self) {
        match self.workflow.load() {
            Ok(count) => {
                self.clamp_selection();
                let plural = if count == 1 { "" } else { "s" };
                self.set_status(format!("Reloaded {count} song{plural}."), StatusKind::Info);
            }
            Err(err) => self.set_status(surface_error(&err), StatusKind::Error),
        }
    }

    fn toggle_sort(&mut self, column: Column) {
        let ascending = match self.workflow.model().sort_order() {
            Some(order) if order.column == column => !order.ascending,
            _ => true,
        };
        self.workflow.sort(column, ascending);
        let direction = if ascending { "ascending" } else { "descending" };
        self.set_status(
            format!("Sorted by {} ({direction}).", column.header()),
            StatusKind::Info,
        );
    }

    fn move_selection(&mut self, offset: isize) {
        let len = self.workflow.model().visible_len();
        self.selected = clamp_offset(self.selected, offset, len);
    }

    fn clamp_selection(&mut self) {
        self.move_selection(0);
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
}
