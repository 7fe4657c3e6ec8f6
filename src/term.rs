use crate::config::Settings;
use crate::input::{InputEvent, InputSource};
use crate::render::{Anchor, Point, Renderer, Rgb};
use crate::snake::Position;
use crate::TermInt;
use std::{io::{self, Stdout, Write, stdout}, time::Duration};

use crossterm::{cursor, execute, queue, style, terminal};
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
    PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags, poll, read,
};
use log::{error, info, warn};

/// Terminal columns used to draw one grid cell. Rows are always one.
const COLUMNS_PER_CELL: i32 = 2;

const GRID_CHAR: char = '·';
const SEGMENT_CHARS: (char, char) = ('▐', '▌');

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Glyph {
    pub ch: char,
    pub fg: Rgb,
    pub bg: Rgb,
}

impl Glyph {
    fn blank(bg: Rgb) -> Self {
        Glyph { ch: ' ', fg: bg, bg }
    }
}

/// Off-screen frame in terminal glyphs, addressed with surface pixels.
#[derive(Clone, Debug)]
pub struct Canvas {
    width_px: i32,
    height_px: i32,
    cell_size: i32,
    cols: TermInt,
    rows: TermInt,
    glyphs: Vec<Glyph>,
}

impl Canvas {
    pub fn new(settings: &Settings) -> Self {
        // Settings keeps the grid within terminal range
        let cols = TermInt::try_from(settings.grid.width * COLUMNS_PER_CELL).unwrap_or(TermInt::MAX);
        let rows = TermInt::try_from(settings.grid.height).unwrap_or(TermInt::MAX);
        let glyphs = vec![Glyph::blank(Rgb(0, 0, 0)); cols as usize * rows as usize];

        Canvas {
            width_px: settings.window_width as i32,
            height_px: settings.window_height as i32,
            cell_size: settings.cell_size as i32,
            cols,
            rows,
            glyphs,
        }
    }

    pub fn size(&self) -> (TermInt, TermInt) {
        (self.cols, self.rows)
    }

    pub fn glyph(&self, col: TermInt, row: TermInt) -> Option<Glyph> {
        if col < self.cols && row < self.rows {
            Some(self.glyphs[self.index(col, row)])
        } else {
            None
        }
    }

    #[cfg(test)]
    pub fn row_text(&self, row: TermInt) -> String {
        (0..self.cols).filter_map(|col| self.glyph(col, row)).map(|g| g.ch).collect()
    }

    pub fn fill(&mut self, color: Rgb) {
        self.glyphs.iter_mut().for_each(|g| *g = Glyph::blank(color));
    }

    pub fn grid_marks(&mut self, spacing: i32, color: Rgb) {
        let spacing = spacing.max(1) as usize;

        for y in (0..self.height_px).step_by(spacing) {
            for x in (0..self.width_px).step_by(spacing) {
                let (col, row) = self.to_term(Point::new(x, y));
                self.put_fg(col, row, GRID_CHAR, color);
            }
        }
    }

    /// Paints the two glyphs of the grid cell at `pos`.
    pub fn cell(&mut self, pos: Position, cell_size: i32, chars: (char, char), fg: Rgb, bg: Rgb) {
        let (col, row) = self.to_term(Point::new(pos.x * cell_size, pos.y * cell_size));
        self.put(col, row, Glyph { ch: chars.0, fg, bg });
        self.put(col + 1, row, Glyph { ch: chars.1, fg, bg });
    }

    /// Writes `text` over whatever background is already there.
    pub fn text(&mut self, text: &str, at: Point, anchor: Anchor, color: Rgb) {
        let (col, row) = self.to_term(at);
        let width = text.chars().count() as i32;
        let start = match anchor {
            Anchor::TopLeft => col,
            Anchor::MidTop | Anchor::Center => col - width / 2,
        };

        for (i, ch) in text.chars().enumerate() {
            self.put_fg(start + i as i32, row, ch, color);
        }
    }

    fn to_term(&self, p: Point) -> (i32, i32) {
        (
            (p.x * COLUMNS_PER_CELL).div_euclid(self.cell_size),
            p.y.div_euclid(self.cell_size),
        )
    }

    fn index(&self, col: TermInt, row: TermInt) -> usize {
        self.cols as usize * row as usize + col as usize
    }

    fn slot(&self, col: i32, row: i32) -> Option<usize> {
        if col < 0 || row < 0 || col >= self.cols as i32 || row >= self.rows as i32 {
            return None;
        }
        Some(self.index(col as TermInt, row as TermInt))
    }

    fn put(&mut self, col: i32, row: i32, glyph: Glyph) {
        if let Some(i) = self.slot(col, row) {
            self.glyphs[i] = glyph;
        }
    }

    fn put_fg(&mut self, col: i32, row: i32, ch: char, fg: Rgb) {
        if let Some(i) = self.slot(col, row) {
            let bg = self.glyphs[i].bg;
            self.glyphs[i] = Glyph { ch, fg, bg };
        }
    }
}

/// Owns the terminal for the lifetime of the game and restores it on drop.
pub struct TermManager {
    stdout: Stdout,
    back: Canvas,
    front: Option<Canvas>,
    key_releases: bool,
    active: bool,
}

impl TermManager {
    pub fn begin(settings: &Settings) -> io::Result<Self> {
        let back = Canvas::new(settings);
        let (need_cols, need_rows) = back.size();
        let (cols, rows) = terminal::size()?;

        if cols < need_cols || rows < need_rows {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                format!("terminal is {}x{}, a {}x{} grid needs at least {}x{}",
                        cols, rows, settings.grid.width, settings.grid.height, need_cols, need_rows),
            ));
        }

        let mut term = TermManager { stdout: stdout(), back, front: None, key_releases: false, active: false };
        term.setup()?;
        Ok(term)
    }

    /// Whether the terminal reports key releases on its own.
    pub fn reports_key_releases(&self) -> bool {
        self.key_releases
    }

    pub fn restore(&mut self) -> io::Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;

        if self.key_releases && !cfg!(windows) {
            execute!(self.stdout, PopKeyboardEnhancementFlags)?;
        }
        execute!(self.stdout, style::ResetColor, cursor::Show, cursor::EnableBlinking, LeaveAlternateScreen)?;
        terminal::disable_raw_mode()?;
        info!("Terminal restored");
        Ok(())
    }

    ///////////////////////////////////////////////////////////////////////////

    fn setup(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        self.active = true;
        execute!(self.stdout, EnterAlternateScreen, cursor::Hide, cursor::DisableBlinking)?;

        self.key_releases = if cfg!(windows) {
            true
        } else {
            match terminal::supports_keyboard_enhancement() {
                Ok(true) => {
                    execute!(self.stdout, PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES))?;
                    true
                }
                Ok(false) => false,
                Err(err) => {
                    warn!("Could not query keyboard enhancement support: {}", err);
                    false
                }
            }
        };

        info!("Terminal ready, native key releases: {}", self.key_releases);
        Ok(())
    }
}

impl Drop for TermManager {
    fn drop(&mut self) {
        if let Err(err) = self.restore() {
            error!("Failed to restore terminal: {}", err);
        }
    }
}

impl Renderer for TermManager {
    fn clear(&mut self, color: Rgb) -> io::Result<()> {
        self.back.fill(color);
        Ok(())
    }

    fn draw_grid_lines(&mut self, cell_size: u32, color: Rgb) -> io::Result<()> {
        self.back.grid_marks(cell_size as i32, color);
        Ok(())
    }

    fn draw_worm_segments<'a, I>(&mut self, segments: I, cell_size: u32, outer: Rgb, inner: Rgb) -> io::Result<()>
    where
        I: IntoIterator<Item = &'a Position>,
    {
        for pos in segments {
            self.back.cell(*pos, cell_size as i32, SEGMENT_CHARS, inner, outer);
        }
        Ok(())
    }

    fn draw_apple(&mut self, pos: Position, cell_size: u32, color: Rgb) -> io::Result<()> {
        self.back.cell(pos, cell_size as i32, (' ', ' '), color, color);
        Ok(())
    }

    fn draw_text(&mut self, text: &str, at: Point, anchor: Anchor, color: Rgb) -> io::Result<()> {
        self.back.text(text, at, anchor, color);
        Ok(())
    }

    /// Writes the glyphs that changed since the last frame.
    fn present(&mut self) -> io::Result<()> {
        let (cols, rows) = self.back.size();

        for row in 0..rows {
            for col in 0..cols {
                let glyph = self.back.glyphs[self.back.index(col, row)];
                let unchanged = self.front.as_ref().and_then(|f| f.glyph(col, row)) == Some(glyph);
                if unchanged {
                    continue;
                }

                queue!(
                    self.stdout,
                    cursor::MoveTo(col, row),
                    style::SetForegroundColor(to_color(glyph.fg)),
                    style::SetBackgroundColor(to_color(glyph.bg)),
                    style::Print(glyph.ch)
                )?;
            }
        }

        self.stdout.flush()?;
        self.front = Some(self.back.clone());
        Ok(())
    }
}

/// Reads key events without blocking.
pub struct TermInput {
    native_releases: bool,
}

impl TermInput {
    pub fn new(native_releases: bool) -> Self {
        TermInput { native_releases }
    }
}

impl InputSource for TermInput {
    fn snapshot(&mut self) -> io::Result<Vec<InputEvent>> {
        let mut events = vec![];

        while poll(Duration::from_millis(0))? {
            events.extend(translate(read()?, self.native_releases));
        }

        Ok(events)
    }
}

/// Maps a crossterm event to game input. Without native release reporting
/// every press is followed by a matching release.
pub fn translate(ev: Event, native_releases: bool) -> Vec<InputEvent> {
    let KeyEvent { code, modifiers, kind, .. } = match ev {
        Event::Key(key) => key,
        _ => return vec![],
    };

    if is_ctrl_c(code, modifiers) {
        return match kind {
            KeyEventKind::Release => vec![],
            _ => vec![InputEvent::Close],
        };
    }

    match (kind, native_releases) {
        (KeyEventKind::Press | KeyEventKind::Repeat, true) => vec![InputEvent::press(code)],
        (KeyEventKind::Press | KeyEventKind::Repeat, false) => {
            vec![InputEvent::press(code), InputEvent::release(code)]
        }
        (KeyEventKind::Release, true) => vec![InputEvent::release(code)],
        (KeyEventKind::Release, false) => vec![],
    }
}

fn is_ctrl_c(code: KeyCode, modifiers: KeyModifiers) -> bool {
    matches!(code, KeyCode::Char('c') | KeyCode::Char('C')) && modifiers.contains(KeyModifiers::CONTROL)
}

fn to_color(c: Rgb) -> style::Color {
    style::Color::Rgb { r: c.0, g: c.1, b: c.2 }
}
