use std::sync::Arc;
use std::time::Duration;

use crate::format::{BarStyle, BarView, TokenFormatter};
use crate::progress::ProgressBar;
use crate::screen::{Output, Screen};

/// Live configuration of a progress bar
///
/// Can be changed while the bar is running with [`ProgressBar::update`]
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Value at 100%, `None` if not known. Default is 100
    pub total: Option<u64>,
    /// Columns of the `:bar` token. 0 means fill the terminal width. Default is 0
    pub width: usize,
    /// Glyph for the done part of the bar
    pub complete: String,
    /// Glyph for the remaining part of the bar
    pub incomplete: String,
    /// Glyph at the leading edge of the bar while not full
    pub head: Option<String>,
    /// Glyph animated across the bar when the total is unknown
    pub unknown: String,
    /// Hide the cursor while the bar is displayed
    pub hide_cursor: bool,
    /// Erase the bar when done, instead of leaving it with a newline
    pub clear_on_finish: bool,
    /// Max renders per second, 0 means render on every update. Default is 0
    pub frequency: f64,
    /// Width of the window for the live rate. Default is 1 second
    pub interval: Duration,
    /// Columns on the left of the line reserved for something else
    pub inset: usize,
}

impl Default for Config {
    fn default() -> Self {
        let (complete, incomplete, head, unknown) = BarStyle::default().glyphs();
        Self {
            total: Some(100),
            width: 0,
            complete: complete.to_string(),
            incomplete: incomplete.to_string(),
            head: head.map(str::to_string),
            unknown: unknown.to_string(),
            hide_cursor: false,
            clear_on_finish: false,
            frequency: 0f64,
            interval: Duration::from_secs(1),
            inset: 0,
        }
    }
}

impl Config {
    /// Check the values that cannot be used
    pub fn validate(&self) -> crate::Result<()> {
        crate::ensure!(
            self.frequency.is_finite() && self.frequency >= 0f64,
            "frequency must be a finite, non-negative number of renders per second, got {}",
            self.frequency
        );
        Ok(())
    }

    /// Minimum time between renders
    pub(crate) fn render_period(&self) -> Duration {
        if self.frequency > 0f64 {
            // a tiny frequency is a period too long for a Duration
            Duration::try_from_secs_f64(1f64 / self.frequency).unwrap_or(Duration::MAX)
        } else {
            Duration::ZERO
        }
    }

    /// Apply a glyph preset
    pub fn set_style(&mut self, style: BarStyle) {
        let (complete, incomplete, head, unknown) = style.glyphs();
        self.complete = complete.to_string();
        self.incomplete = incomplete.to_string();
        self.head = head.map(str::to_string);
        self.unknown = unknown.to_string();
    }
}

/// Check that a template can be displayed as one line
pub(crate) fn validate_format(format: &str) -> crate::Result<()> {
    crate::ensure!(!format.is_empty(), "progress bar format must not be empty");
    crate::ensure!(
        !format.contains(['\n', '\r']),
        "progress bar format must be a single line: {format:?}"
    );
    Ok(())
}

/// Builder for a progress bar
#[derive(Debug)]
pub struct ProgressBarBuilder {
    /// The template, like `downloading [:bar] :percent`
    format: String,
    config: Config,
    /// Ignored for bars registered to a coordinator
    output: Option<Output>,
    formatter: TokenFormatter,
}

impl ProgressBarBuilder {
    /// Start building a progress bar. Note [`tally::progress`](fn@crate::progress) is the canonical shorthand
    pub fn new(format: String) -> Self {
        Self {
            format,
            config: Config::default(),
            output: None,
            formatter: TokenFormatter::new(),
        }
    }

    /// Set the total steps
    ///
    /// ```rust
    /// tally::progress(":bar").total(10);
    /// ```
    #[inline(always)]
    pub fn total(mut self, total: u64) -> Self {
        self.config.total = Some(total);
        self
    }

    /// Make the total unknown. The bar animates instead of filling up,
    /// and is only done when [`finish`](ProgressBar::finish) is called
    #[inline(always)]
    pub fn no_width(mut self) -> Self {
        self.config.total = None;
        self
    }

    /// Set the columns of the `:bar` token. 0 (the default) fills the terminal
    ///
    /// ```rust
    /// tally::progress("[:bar]").width(40);
    /// ```
    #[inline(always)]
    pub fn width(mut self, width: usize) -> Self {
        self.config.width = width;
        self
    }

    #[inline(always)]
    pub fn complete(mut self, glyph: impl Into<String>) -> Self {
        self.config.complete = glyph.into();
        self
    }

    #[inline(always)]
    pub fn incomplete(mut self, glyph: impl Into<String>) -> Self {
        self.config.incomplete = glyph.into();
        self
    }

    #[inline(always)]
    pub fn head(mut self, glyph: impl Into<String>) -> Self {
        self.config.head = Some(glyph.into());
        self
    }

    #[inline(always)]
    pub fn unknown(mut self, glyph: impl Into<String>) -> Self {
        self.config.unknown = glyph.into();
        self
    }

    /// Use a glyph preset
    ///
    /// ```rust
    /// tally::progress("[:bar]").style(tally::BarStyle::Block);
    /// ```
    #[inline(always)]
    pub fn style(mut self, style: BarStyle) -> Self {
        self.config.set_style(style);
        self
    }

    #[inline(always)]
    pub fn hide_cursor(mut self, hide: bool) -> Self {
        self.config.hide_cursor = hide;
        self
    }

    #[inline(always)]
    pub fn clear_on_finish(mut self, clear: bool) -> Self {
        self.config.clear_on_finish = clear;
        self
    }

    /// Limit renders per second. 0 (the default) renders on every update
    #[inline(always)]
    pub fn frequency(mut self, frequency: f64) -> Self {
        self.config.frequency = frequency;
        self
    }

    /// Window for the `:rate` token
    #[inline(always)]
    pub fn interval(mut self, interval: Duration) -> Self {
        self.config.interval = interval;
        self
    }

    /// Reserve columns on the left of the line
    #[inline(always)]
    pub fn inset(mut self, inset: usize) -> Self {
        self.config.inset = inset;
        self
    }

    /// Set where the bar is drawn. Default is stdout
    ///
    /// Bars registered to a [`MultiProgress`](crate::MultiProgress) use the coordinator's output instead
    pub fn output(mut self, output: Output) -> Self {
        self.output = Some(output);
        self
    }

    /// Register a custom token
    ///
    /// ```rust
    /// let bar = tally::progress(":left left")
    ///     .token("left", |v| (v.total().unwrap_or(0) - v.current()).to_string());
    /// ```
    pub fn token<F>(mut self, name: impl Into<String>, renderer: F) -> Self
    where
        F: Fn(&BarView<'_>) -> String + Send + Sync + 'static,
    {
        self.formatter.use_token(name, renderer);
        self
    }

    /// Replace the whole configuration
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Check the template and configuration
    pub(crate) fn validate(&self) -> crate::Result<()> {
        validate_format(&self.format)?;
        self.config.validate()
    }

    /// Build a standalone bar. The bar is not started
    ///
    /// # Errors
    /// If the template is empty or has line breaks, or the configuration is invalid
    pub fn build(self) -> crate::Result<Arc<ProgressBar>> {
        self.validate()?;
        let output = self.output.unwrap_or_default();
        let screen = Arc::new(Screen::new(output, None));
        Ok(ProgressBar::new(self.format, self.config, self.formatter, screen, None))
    }

    /// Build a bar that draws on a row of a shared screen
    pub(crate) fn build_attached(self, screen: Arc<Screen>, row: usize) -> Arc<ProgressBar> {
        ProgressBar::new(self.format, self.config, self.formatter, screen, Some(row))
    }
}
