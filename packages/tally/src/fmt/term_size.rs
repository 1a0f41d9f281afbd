/// Columns assumed when the output is not attached to a terminal
pub const DEFAULT_WIDTH: usize = 80;

/// Get the terminal width, or [`DEFAULT_WIDTH`] if cannot get
pub fn term_width_or_default() -> usize {
    term_width().unwrap_or(DEFAULT_WIDTH)
}

/// Get the terminal width, capped as some internal amount
pub fn term_width() -> Option<usize> {
    if cfg!(test) {
        // fix the size in test
        Some(60)
    } else {
        use terminal_size::*;
        terminal_size().map(|(Width(w), _)| (w as usize).min(400))
    }
}
