//! Text editor
//!
//! Notes are plain files under [`NOTES_DIR`]. The picker lists them below a
//! "New note" entry; ESC in the editor saves the note and returns to the
//! picker. A failed save keeps the editor open so nothing typed is lost.

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use picoware_core::config::Theme;
use picoware_core::hal::storage;
use picoware_core::hal::{Button, DisplayError, DrawSurface, StorageError, Vector};
use picoware_core::ui::{draw_title, text, EditorEvent, LineEditor, Menu, MenuAction, MARGIN};
use picoware_core::{App, AppError, Context};

/// Directory holding the notes
pub const NOTES_DIR: &str = "picoware/notes";
/// Largest note the editor loads or grows to (bytes)
pub const MAX_NOTE_SIZE: usize = 3 * 1024;

const NEW_NOTE: &str = "[New note]";
const TITLE: &str = "Text Editor";
const TAB: &str = "    ";

/// Lines of text with a cursor
///
/// The cursor column counts characters, not bytes. The text never grows
/// past [`MAX_NOTE_SIZE`] bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextBuffer {
    lines: Vec<String>,
    row: usize,
    col: usize,
    modified: bool,
}

impl Default for TextBuffer {
    fn default() -> Self {
        Self::new("")
    }
}

impl TextBuffer {
    pub fn new(text: &str) -> Self {
        let lines = text.split('\n').map(|l| String::from(l.trim_end_matches('\r'))).collect();
        Self {
            lines,
            row: 0,
            col: 0,
            modified: false,
        }
    }

    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Cursor as (line, character)
    pub fn cursor(&self) -> (usize, usize) {
        (self.row, self.col)
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn mark_saved(&mut self) {
        self.modified = false;
    }

    /// Size of [`TextBuffer::text`] in bytes
    pub fn len(&self) -> usize {
        self.lines.iter().map(String::len).sum::<usize>() + self.lines.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn line_chars(&self, row: usize) -> usize {
        self.lines[row].chars().count()
    }

    fn byte_at(&self) -> usize {
        let line = &self.lines[self.row];
        line.char_indices().nth(self.col).map_or(line.len(), |(i, _)| i)
    }

    /// Insert a character at the cursor; false when the note is full
    pub fn insert(&mut self, c: char) -> bool {
        if c == '\n' {
            return self.newline();
        }
        if self.len() + c.len_utf8() > MAX_NOTE_SIZE {
            return false;
        }
        let at = self.byte_at();
        self.lines[self.row].insert(at, c);
        self.col += 1;
        self.modified = true;
        true
    }

    /// Split the line at the cursor
    pub fn newline(&mut self) -> bool {
        if self.len() + 1 > MAX_NOTE_SIZE {
            return false;
        }
        let at = self.byte_at();
        let rest = self.lines[self.row].split_off(at);
        self.row += 1;
        self.col = 0;
        self.lines.insert(self.row, rest);
        self.modified = true;
        true
    }

    /// Delete the character before the cursor, joining lines at column 0
    pub fn backspace(&mut self) -> bool {
        if self.col > 0 {
            self.col -= 1;
            let at = self.byte_at();
            self.lines[self.row].remove(at);
        } else if self.row > 0 {
            let line = self.lines.remove(self.row);
            self.row -= 1;
            self.col = self.line_chars(self.row);
            self.lines[self.row].push_str(&line);
        } else {
            return false;
        }
        self.modified = true;
        true
    }

    /// Move the cursor with an arrow key; false if it did not move
    pub fn move_cursor(&mut self, button: Button) -> bool {
        let before = (self.row, self.col);
        match button {
            Button::Up if self.row > 0 => {
                self.row -= 1;
                self.col = self.col.min(self.line_chars(self.row));
            }
            Button::Down if self.row + 1 < self.lines.len() => {
                self.row += 1;
                self.col = self.col.min(self.line_chars(self.row));
            }
            Button::Left if self.col > 0 => self.col -= 1,
            Button::Left if self.row > 0 => {
                self.row -= 1;
                self.col = self.line_chars(self.row);
            }
            Button::Right if self.col < self.line_chars(self.row) => self.col += 1,
            Button::Right if self.row + 1 < self.lines.len() => {
                self.row += 1;
                self.col = 0;
            }
            _ => {}
        }
        before != (self.row, self.col)
    }

    /// Apply an editing key; returns true if the screen needs a redraw
    pub fn handle(&mut self, button: Button) -> bool {
        match button {
            Button::Char(c) => self.insert(c),
            Button::Center => self.newline(),
            Button::Backspace => self.backspace(),
            Button::Tab => TAB.chars().fold(false, |changed, c| self.insert(c) || changed),
            _ if button.is_direction() => self.move_cursor(button),
            _ => false,
        }
    }

    /// Draw the lines around the cursor with the cursor as a bar
    pub fn draw(&self, display: &mut dyn DrawSurface, title: &str, theme: &Theme) -> Result<(), DisplayError> {
        display.fill_screen(theme.background)?;
        let top = draw_title(display, title, theme)?;

        let size = display.size();
        let ch = display.char_size();
        let line_height = ch.y + 2;
        let rows = ((size.y - top) / line_height).max(1) as usize;
        let cols = text::columns(size.x - 2 * MARGIN, ch.x).max(2);
        let first = (self.row + 1).saturating_sub(rows);

        for (offset, line) in self.lines.iter().skip(first).take(rows).enumerate() {
            let row = first + offset;
            let y = top + offset as i32 * line_height;
            // Only the cursor line scrolls sideways
            let skip = if row == self.row {
                self.col.saturating_sub(cols - 1)
            } else {
                0
            };
            let shown: String = line.chars().skip(skip).take(cols).collect();
            display.text(Vector::new(MARGIN, y), &shown, theme.foreground)?;
            if row == self.row {
                let x = MARGIN + (self.col - skip) as i32 * ch.x;
                display.fill_rect(Vector::new(x, y), Vector::new(2, ch.y), theme.accent)?;
            }
        }

        display.swap()
    }
}

enum Mode {
    Picker,
    Naming(LineEditor),
    Editing { name: String, buffer: TextBuffer },
}

pub struct TextEditor {
    mode: Mode,
    menu: Menu,
}

impl Default for TextEditor {
    fn default() -> Self {
        Self {
            mode: Mode::Picker,
            menu: Menu::new(TITLE, Vec::<String>::new()),
        }
    }
}

fn valid_name(name: &str) -> bool {
    !name.is_empty() && !name.contains('/') && name != "." && name != ".."
}

impl TextEditor {
    /// Re-list the notes directory into the picker
    fn show_picker(&mut self, ctx: &mut Context) -> Result<(), AppError> {
        let entries = ctx.require_storage()?.list(NOTES_DIR)?;
        let notes = entries.into_iter().filter(|e| !e.is_dir).map(|e| e.name);
        let selected = self.menu.selected_index();
        self.menu.set_items(core::iter::once(String::from(NEW_NOTE)).chain(notes));
        self.menu.set_selected(selected.min(self.menu.len() - 1));
        self.mode = Mode::Picker;
        ctx.mark_dirty();
        Ok(())
    }

    fn open(&mut self, ctx: &mut Context, name: &str) -> Result<(), AppError> {
        let path = storage::join(NOTES_DIR, name);
        let buffer = match ctx.require_storage()?.read_to_string(&path) {
            Ok(body) if body.len() > MAX_NOTE_SIZE => {
                ctx.alert(TITLE, "Note is too large to edit");
                return Ok(());
            }
            Ok(body) => TextBuffer::new(&body),
            Err(StorageError::NotFound) => TextBuffer::default(),
            Err(StorageError::Corrupted) => {
                ctx.alert(TITLE, "Not a text file");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };
        info!("Editing {} ({} bytes)", path.as_str(), buffer.len());
        self.mode = Mode::Editing {
            name: String::from(name),
            buffer,
        };
        ctx.mark_dirty();
        Ok(())
    }

    /// Write the open note if it changed
    fn save(&mut self, ctx: &mut Context) -> Result<(), AppError> {
        if let Mode::Editing { name, buffer } = &mut self.mode {
            if buffer.is_modified() {
                let path = storage::join(NOTES_DIR, name);
                ctx.require_storage()?.write(&path, buffer.text().as_bytes())?;
                buffer.mark_saved();
                debug!("Saved {}", path.as_str());
            }
        }
        Ok(())
    }

    /// Report a storage failure and keep going; a missing card still ends the app
    fn recover(&mut self, ctx: &mut Context, err: AppError) -> Result<(), AppError> {
        match err {
            AppError::Storage(e) if e != StorageError::NotMounted => {
                warn!("Text editor: {:?}", e);
                ctx.alert(TITLE, &err.to_string());
                Ok(())
            }
            other => Err(other),
        }
    }

    fn handle(&mut self, ctx: &mut Context, button: Button) -> Result<(), AppError> {
        match &mut self.mode {
            Mode::Picker => match self.menu.handle(button) {
                MenuAction::Moved => ctx.mark_dirty(),
                MenuAction::Selected(0) => {
                    self.mode = Mode::Naming(LineEditor::new("Note name"));
                    ctx.mark_dirty();
                }
                MenuAction::Selected(_) => {
                    let name = self.menu.selected_item().map(String::from).unwrap_or_default();
                    self.open(ctx, &name)?;
                }
                MenuAction::Back => ctx.back(),
                MenuAction::Ignored => {}
            },
            Mode::Naming(editor) => match editor.handle(button) {
                Some(EditorEvent::Submitted(name)) => {
                    let name = name.trim();
                    if valid_name(name) {
                        self.open(ctx, name)?;
                    } else {
                        ctx.alert(TITLE, "Invalid note name");
                    }
                }
                Some(EditorEvent::Cancelled) => self.show_picker(ctx)?,
                None => ctx.mark_dirty(),
            },
            Mode::Editing { buffer, .. } => {
                if button == Button::Back {
                    self.save(ctx)?;
                    self.show_picker(ctx)?;
                } else if buffer.handle(button) {
                    ctx.mark_dirty();
                }
            }
        }
        Ok(())
    }

    fn draw(&mut self, ctx: &mut Context) -> Result<(), DisplayError> {
        let theme = ctx.theme();
        match &self.mode {
            Mode::Picker => self.menu.draw(ctx.display(), &theme),
            Mode::Naming(editor) => editor.draw(ctx.display(), &theme),
            Mode::Editing { name, buffer } => {
                let mut title = name.clone();
                if buffer.is_modified() {
                    title.push('*');
                }
                buffer.draw(ctx.display(), &title, &theme)
            }
        }
    }
}

impl App for TextEditor {
    fn start(&mut self, ctx: &mut Context) -> Result<bool, AppError> {
        ctx.require_storage()?.mkdir(NOTES_DIR)?;
        self.menu.set_selected(0);
        self.show_picker(ctx)?;
        Ok(true)
    }

    fn run(&mut self, ctx: &mut Context) -> Result<(), AppError> {
        if let Some(button) = ctx.take_button() {
            if let Err(e) = self.handle(ctx, button) {
                self.recover(ctx, e)?;
            }
        }

        if !ctx.alert_open() && ctx.take_dirty() {
            self.draw(ctx)?;
        }
        Ok(())
    }

    fn stop(&mut self, ctx: &mut Context) -> Result<(), AppError> {
        if let Err(e) = self.save(ctx) {
            warn!("Unsaved note dropped: {:?}", e);
        }
        self.mode = Mode::Picker;
        self.menu.set_items(Vec::<String>::new());
        ctx.system().reclaim();
        Ok(())
    }
}
