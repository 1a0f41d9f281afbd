//! ECMA-48 cursor control sequences and ANSI-aware display width

/// Move the cursor to column 1 of the current line
pub const CARRIAGE_RETURN: &str = "\r";
/// Erase from the cursor to the end of the line
pub const CLEAR_TO_EOL: &str = "\x1b[K";
/// Move to column 1 and erase the whole line
pub const CLEAR_LINE: &str = "\r\x1b[K";
/// Save the cursor position
pub const SAVE: &str = "\x1b7";
/// Restore the cursor position saved by [`SAVE`]
pub const RESTORE: &str = "\x1b8";
/// Hide the cursor
pub const HIDE_CURSOR: &str = "\x1b[?25l";
/// Show the cursor
pub const SHOW_CURSOR: &str = "\x1b[?25h";

/// Push the sequence that moves the cursor up `lines` lines.
/// Nothing is pushed for 0, since `ESC[0A` moves one line on most terminals
pub fn push_up(out: &mut String, lines: usize) {
    if lines == 0 {
        return;
    }
    use std::fmt::Write as _;
    // _: fmt for string does not fail
    let _ = write!(out, "\x1b[{lines}A");
}

/// Iterator of (char, width)
pub(crate) fn with_width(x: std::str::Chars<'_>) -> AnsiWidthIter<'_> {
    AnsiWidthIter {
        is_escaping: false,
        chars: x,
    }
}

pub(crate) struct AnsiWidthIter<'a> {
    is_escaping: bool,
    chars: std::str::Chars<'a>,
}

impl<'a> Iterator for AnsiWidthIter<'a> {
    type Item = (char, usize);

    fn next(&mut self) -> Option<Self::Item> {
        let c = self.chars.next()?;
        let width = if self.is_escaping {
            if is_ansi_end_char(c) {
                self.is_escaping = false;
            }
            0
        } else if c == '\x1b' {
            self.is_escaping = true;
            0
        } else {
            use unicode_width::UnicodeWidthChar;
            c.width().unwrap_or(0)
        };

        Some((c, width))
    }
}

pub(crate) fn is_ansi_end_char(c: char) -> bool {
    // we only do very basic check right now
    c < u8::MAX as char && b"mAKGJBCDEFHSTfhlin".contains(&(c as u8))
}

/// Number of terminal columns `x` occupies, ignoring escape sequences
pub fn display_width(x: &str) -> usize {
    with_width(x.chars()).map(|(_, w)| w).sum()
}

/// Replace line breaks so the message stays on one line
pub(crate) fn single_line(message: &str) -> String {
    message.replace(['\r', '\n'], " ")
}
