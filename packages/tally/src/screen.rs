//! Output sinks and the shared terminal region
//!
//! Every write of a bar goes through a [`Screen`]. A standalone bar owns its
//! screen, while all bars registered to a [`MultiProgress`](crate::MultiProgress)
//! share one. The screen mutex is the only thing that serializes cursor
//! movement, so a sequence like save-cursor, move-up, write, restore-cursor
//! is never interleaved with another bar's.
use std::io::{self, IsTerminal as _, Write};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::Context as _;
use crate::fmt::ansi;

/// Where bars are written
pub enum Output {
    /// Standard output. Bars are only drawn when it is a terminal
    Stdout(io::Stdout),
    /// Standard error. Bars are only drawn when it is a terminal
    Stderr(io::Stderr),
    /// Any writer. Always treated as a terminal
    Writer(Box<dyn Write + Send>),
    /// In-memory sink, see [`Output::capture`]
    Capture(Capture),
}

impl Output {
    pub fn stdout() -> Self {
        Self::Stdout(io::stdout())
    }
    pub fn stderr() -> Self {
        Self::Stderr(io::stderr())
    }
    pub fn writer(w: impl Write + Send + 'static) -> Self {
        Self::Writer(Box::new(w))
    }
    /// Create an in-memory output, and a handle to read what was written to it
    pub fn capture() -> (Self, Capture) {
        let capture = Capture::default();
        (Self::Capture(capture.clone()), capture)
    }
    /// If cursor control should be emitted to this output
    pub fn is_terminal(&self) -> bool {
        match self {
            Self::Stdout(x) => x.is_terminal(),
            Self::Stderr(x) => x.is_terminal(),
            Self::Writer(_) | Self::Capture(_) => true,
        }
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::stdout()
    }
}

impl std::fmt::Debug for Output {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stdout(_) => f.write_str("Stdout"),
            Self::Stderr(_) => f.write_str("Stderr"),
            Self::Writer(_) => f.write_str("Writer"),
            Self::Capture(_) => f.write_str("Capture"),
        }
    }
}

impl Write for Output {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Stdout(x) => x.write(buf),
            Self::Stderr(x) => x.write(buf),
            Self::Writer(x) => x.write(buf),
            Self::Capture(x) => x.write(buf),
        }
    }
    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Stdout(x) => x.flush(),
            Self::Stderr(x) => x.flush(),
            Self::Writer(x) => x.flush(),
            Self::Capture(x) => x.flush(),
        }
    }
}

/// Handle to the bytes written to an [`Output::capture`]
#[derive(Debug, Clone, Default)]
pub struct Capture(Arc<Mutex<Vec<u8>>>);

impl Capture {
    /// Everything written so far, lossily decoded
    pub fn contents(&self) -> String {
        match self.0.lock() {
            Ok(x) => String::from_utf8_lossy(&x).into_owned(),
            Err(_) => String::new(),
        }
    }
    /// Discard everything written so far
    pub fn clear(&self) {
        if let Ok(mut x) = self.0.lock() {
            x.clear();
        }
    }
}

impl Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.0.lock() {
            Ok(mut x) => {
                x.extend_from_slice(buf);
                Ok(buf.len())
            }
            Err(_) => Err(io::Error::other("capture lock poisoned")),
        }
    }
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Prefixes drawn in front of the rows of a coordinated block
///
/// The last registered child gets `bottom`. When another child registers,
/// the row that had `bottom` is redrawn with `middle`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsetStyle {
    /// Prefix of the aggregate bar
    pub top: String,
    /// Prefix of every child but the last
    pub middle: String,
    /// Prefix of the last child
    pub bottom: String,
}

impl Default for InsetStyle {
    fn default() -> Self {
        Self {
            top: "\u{250c} ".to_string(),
            middle: "\u{251c}\u{2500}\u{2500} ".to_string(),
            bottom: "\u{2514}\u{2500}\u{2500} ".to_string(),
        }
    }
}

/// A terminal region shared by one or more bars
#[derive(Debug)]
pub(crate) struct Screen {
    term: Mutex<Terminal>,
    /// Mirror of `Terminal::out.is_terminal()`, readable without the lock
    is_terminal: AtomicBool,
    /// Row assignment counter
    next_row: AtomicUsize,
    /// Insets are only drawn when the block has an aggregate bar
    inset: Option<InsetStyle>,
}

#[derive(Debug)]
struct Terminal {
    out: Output,
    /// Last line written to each claimed row. `lines.len()` is the number of rows
    /// claimed, and the cursor rests on the line below the last one
    lines: Vec<String>,
    /// Number of bars that want the cursor hidden
    hidden: usize,
}

impl Screen {
    pub fn new(out: Output, inset: Option<InsetStyle>) -> Self {
        Self {
            is_terminal: AtomicBool::new(out.is_terminal()),
            term: Mutex::new(Terminal {
                out,
                lines: Vec::new(),
                hidden: 0,
            }),
            next_row: AtomicUsize::new(0),
            inset,
        }
    }

    #[inline(always)]
    pub fn is_terminal(&self) -> bool {
        self.is_terminal.load(Ordering::Acquire)
    }

    pub fn set_output(&self, out: Output) {
        if let Ok(mut term) = self.term.lock() {
            self.is_terminal.store(out.is_terminal(), Ordering::Release);
            term.out = out;
        }
    }

    /// Take the next row index
    ///
    /// The previous row stops being the last child, and is redrawn with the
    /// middle prefix if it is on screen.
    pub fn next_row(&self) -> usize {
        let row = self.next_row.fetch_add(1, Ordering::AcqRel);
        if row > 1 {
            if let Err(e) = self.retag_middle(row - 1) {
                log::debug!("failed to redraw row {}: {e:?}", row - 1);
            }
        }
        row
    }

    fn retag_middle(&self, row: usize) -> crate::Result<()> {
        let Some(style) = &self.inset else {
            return Ok(());
        };
        self.with_terminal(|term| {
            let Some(line) = term
                .lines
                .get(row)
                .and_then(|x| x.strip_prefix(style.bottom.as_str()))
                .map(|rest| format!("{}{rest}", style.middle))
            else {
                return Ok(());
            };
            let mut buf = String::new();
            term.push_row(&mut buf, row, &line);
            term.write(&buf)
        })
    }

    /// Number of rows assigned so far
    pub fn assigned_rows(&self) -> usize {
        self.next_row.load(Ordering::Acquire)
    }

    /// Number of rows claimed on the screen
    pub fn rows(&self) -> usize {
        match self.term.lock() {
            Ok(term) => term.lines.len(),
            Err(_) => 0,
        }
    }

    /// Prefix for the row
    pub fn line_inset(&self, row: Option<usize>) -> &str {
        let (Some(style), Some(row)) = (&self.inset, row) else {
            return "";
        };
        if row == 0 {
            &style.top
        } else if row + 1 >= self.assigned_rows() {
            &style.bottom
        } else {
            &style.middle
        }
    }

    /// Write a rendered bar line, either in place on the current line,
    /// or on the row of a coordinated bar
    pub fn write_line(&self, row: Option<usize>, line: &str) -> crate::Result<()> {
        self.with_terminal(|term| {
            let mut buf = String::new();
            match row {
                None => {
                    buf.push_str(ansi::CLEAR_LINE);
                    buf.push_str(line);
                }
                Some(row) => term.push_row(&mut buf, row, line),
            }
            term.write(&buf)
        })
    }

    /// Finish the line of a bar: erase it or move past it
    pub fn end_line(&self, row: Option<usize>, clear: bool) -> crate::Result<()> {
        self.with_terminal(|term| {
            let mut buf = String::new();
            match (row, clear) {
                (None, true) => buf.push_str(ansi::CLEAR_LINE),
                (None, false) => buf.push('\n'),
                (Some(row), true) => term.push_row(&mut buf, row, ""),
                // the row is already claimed with its own line
                (Some(_), false) => return Ok(()),
            }
            term.write(&buf)
        })
    }

    /// Erase the line of a bar, keeping its row claimed
    pub fn clear_line(&self, row: Option<usize>) -> crate::Result<()> {
        self.with_terminal(|term| {
            let mut buf = String::new();
            match row {
                None => buf.push_str(ansi::CLEAR_LINE),
                Some(row) => term.push_row(&mut buf, row, ""),
            }
            term.write(&buf)
        })
    }

    /// Print a message line so that bars are not corrupted
    ///
    /// Without a row, the message goes over the current line of the bar, which
    /// is re-rendered after it by the caller. With a row, the message is put above
    /// the whole block and every claimed row is drawn again one line lower.
    /// On outputs that are not terminals, the message is just printed.
    pub fn log(&self, row: Option<usize>, message: &str) -> crate::Result<()> {
        let Ok(mut term) = self.term.lock() else {
            return Ok(());
        };
        let mut buf = String::new();
        if !self.is_terminal() {
            buf.push_str(message);
            buf.push('\n');
            return term.write(&buf);
        }
        if row.is_none() || term.lines.is_empty() {
            buf.push_str(ansi::CARRIAGE_RETURN);
            buf.push_str(message);
            buf.push('\n');
            return term.write(&buf);
        }
        ansi::push_up(&mut buf, term.lines.len());
        buf.push_str(ansi::CLEAR_LINE);
        buf.push_str(message);
        buf.push('\n');
        for line in &term.lines {
            buf.push_str(ansi::CLEAR_LINE);
            buf.push_str(line);
            buf.push('\n');
        }
        term.write(&buf)
    }

    /// Print a message on its own line after a bar is done
    pub fn print(&self, row: Option<usize>, message: &str) -> crate::Result<()> {
        if row.is_some() {
            return self.log(row, message);
        }
        let Ok(mut term) = self.term.lock() else {
            return Ok(());
        };
        let mut buf = String::with_capacity(message.len() + 1);
        buf.push_str(message);
        buf.push('\n');
        term.write(&buf)
    }

    pub fn hide_cursor(&self) -> crate::Result<()> {
        self.with_terminal(|term| {
            term.hidden += 1;
            if term.hidden == 1 {
                term.write(ansi::HIDE_CURSOR)
            } else {
                Ok(())
            }
        })
    }

    pub fn show_cursor(&self) -> crate::Result<()> {
        self.with_terminal(|term| {
            if term.hidden == 0 {
                return Ok(());
            }
            term.hidden -= 1;
            if term.hidden == 0 {
                term.write(ansi::SHOW_CURSOR)
            } else {
                Ok(())
            }
        })
    }

    /// Run `f` with the terminal locked, if the output is a terminal
    fn with_terminal(
        &self,
        f: impl FnOnce(&mut Terminal) -> crate::Result<()>,
    ) -> crate::Result<()> {
        if !self.is_terminal() {
            return Ok(());
        }
        let Ok(mut term) = self.term.lock() else {
            return Ok(());
        };
        f(&mut term)
    }
}

impl Terminal {
    /// Format the row protocol for writing `line` on `row` into the buffer
    ///
    /// If the row is not claimed yet, it is claimed by writing the line and a
    /// newline at the resting position, after padding any unclaimed rows before
    /// it with blank lines. Otherwise the cursor is saved, moved up to the row,
    /// and restored after the line is written.
    fn push_row(&mut self, buf: &mut String, row: usize, line: &str) {
        let claimed = self.lines.len();
        if row >= claimed {
            for _ in claimed..row {
                buf.push_str(ansi::CLEAR_LINE);
                buf.push('\n');
                self.lines.push(String::new());
            }
            buf.push_str(ansi::CLEAR_LINE);
            buf.push_str(line);
            buf.push('\n');
            self.lines.push(line.to_string());
            log::trace!("row {row} claimed, {} rows on screen", self.lines.len());
            return;
        }
        buf.push_str(ansi::SAVE);
        ansi::push_up(buf, claimed - row);
        buf.push_str(ansi::CLEAR_LINE);
        buf.push_str(line);
        buf.push_str(ansi::RESTORE);
        line.clone_into(&mut self.lines[row]);
    }

    fn write(&mut self, buf: &str) -> crate::Result<()> {
        self.out
            .write_all(buf.as_bytes())
            .and_then(|_| self.out.flush())
            .context("failed to write progress bar")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn screen() -> (Screen, Capture) {
        let (out, capture) = Output::capture();
        (Screen::new(out, None), capture)
    }

    #[test]
    fn rows_are_claimed_in_order() {
        let (screen, capture) = screen();
        screen.write_line(Some(0), "a").unwrap();
        screen.write_line(Some(1), "b").unwrap();
        assert_eq!(screen.rows(), 2);
        assert_eq!(capture.contents(), "\r\x1b[Ka\n\r\x1b[Kb\n");
    }

    #[test]
    fn claimed_rows_are_rewritten_in_place() {
        let (screen, capture) = screen();
        screen.write_line(Some(0), "a").unwrap();
        screen.write_line(Some(1), "b").unwrap();
        capture.clear();
        screen.write_line(Some(0), "A").unwrap();
        assert_eq!(capture.contents(), "\x1b7\x1b[2A\r\x1b[KA\x1b8");
        capture.clear();
        screen.write_line(Some(1), "B").unwrap();
        assert_eq!(capture.contents(), "\x1b7\x1b[1A\r\x1b[KB\x1b8");
        assert_eq!(screen.rows(), 2);
    }

    #[test]
    fn late_row_pads_earlier_rows() {
        let (screen, capture) = screen();
        screen.write_line(Some(2), "c").unwrap();
        assert_eq!(screen.rows(), 3);
        assert_eq!(capture.contents(), "\r\x1b[K\n\r\x1b[K\n\r\x1b[Kc\n");
        capture.clear();
        screen.write_line(Some(0), "a").unwrap();
        assert_eq!(capture.contents(), "\x1b7\x1b[3A\r\x1b[Ka\x1b8");
    }

    #[test]
    fn log_redraws_block_below_message() {
        let (screen, capture) = screen();
        screen.write_line(Some(0), "a").unwrap();
        screen.write_line(Some(1), "b").unwrap();
        capture.clear();
        screen.log(Some(1), "hello").unwrap();
        assert_eq!(
            capture.contents(),
            "\x1b[2A\r\x1b[Khello\n\r\x1b[Ka\n\r\x1b[Kb\n"
        );
        assert_eq!(screen.rows(), 2);
    }

    #[test]
    fn cursor_hide_is_counted() {
        let (screen, capture) = screen();
        screen.hide_cursor().unwrap();
        screen.hide_cursor().unwrap();
        screen.show_cursor().unwrap();
        assert_eq!(capture.contents(), ansi::HIDE_CURSOR);
        screen.show_cursor().unwrap();
        screen.show_cursor().unwrap();
        assert_eq!(
            capture.contents(),
            format!("{}{}", ansi::HIDE_CURSOR, ansi::SHOW_CURSOR)
        );
    }

    #[test]
    fn inset_only_with_style() {
        let (screen, _) = screen();
        assert_eq!(screen.line_inset(Some(0)), "");
        let (out, _) = Output::capture();
        let screen = Screen::new(out, Some(InsetStyle::default()));
        for _ in 0..3 {
            screen.next_row();
        }
        assert_eq!(screen.line_inset(Some(0)), "\u{250c} ");
        assert_eq!(screen.line_inset(Some(1)), "\u{251c}\u{2500}\u{2500} ");
        assert_eq!(screen.line_inset(Some(2)), "\u{2514}\u{2500}\u{2500} ");
        assert_eq!(screen.line_inset(None), "");
    }
}
