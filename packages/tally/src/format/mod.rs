//! # Token templates
//!
//! A bar is displayed by expanding a template such as
//! ```text
//! downloading [:bar] :percent :current/:total ETA :eta
//! ```
//! Each `:name` marker is replaced with the output of the renderer registered
//! under `name` in a [`TokenFormatter`]. Markers without a renderer are kept as-is,
//! so custom tokens passed to [`advance_with_tokens`](crate::ProgressBar::advance_with_tokens)
//! can fill them in.
//!
//! Renderers are evaluated against a [`BarView`] taken at render time,
//! so the output always reflects the live values.
//!
//! ## Built-in tokens
//! | Token | Output |
//! |-|-|
//! | `:bar` | the bar glyphs, see below |
//! | `:current` | current count |
//! | `:total` | total count, `?` when unknown |
//! | `:percent` | `floor(ratio * 100)` followed by `%` |
//! | `:elapsed` | time since start, like ` 1m 5s` |
//! | `:eta` | estimated remaining time, `--s` if there is nothing to estimate from |
//! | `:rate` | units per second in the live window, 2 decimals |
//! | `:mean_rate` | units per second since start, 2 decimals |
//! | `:current_byte`, `:byte` | current count as bytes, like `1.50MB` |
//! | `:total_byte` | total as bytes |
//! | `:byte_rate` | live rate as bytes |
//! | `:mean_byte` | mean rate as bytes |
//!
//! ## Fill tokens
//! `:bar` is a fill token: it is rendered last, with a column budget. The budget is the
//! configured `width`, or if that is 0, whatever is left of the terminal width after the
//! rest of the line. Custom fill tokens can be registered with
//! [`use_fill_token`](TokenFormatter::use_fill_token).
use std::collections::HashMap;
use std::sync::{Arc, LazyLock};
use std::time::Duration;

use regex::Regex;

use crate::Config;
use crate::fmt::{self, ansi};

mod bar;
pub use bar::{BarStyle, render_bar};
mod tokens;

/// Renderer for a token
pub type Renderer = Arc<dyn Fn(&BarView<'_>) -> String + Send + Sync>;
/// Renderer for a token that fills a column budget
pub type FillRenderer = Arc<dyn Fn(&BarView<'_>, usize) -> String + Send + Sync>;

static TOKEN_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    // unwrap: the pattern is valid
    Regex::new(r":([A-Za-z_][A-Za-z0-9_]*)").unwrap()
});

#[derive(Clone)]
enum Token {
    Fixed(Renderer),
    Fill(FillRenderer),
}

/// Registry of token renderers, and the decoration pass over a template
#[derive(Clone, Default)]
pub struct TokenFormatter {
    tokens: HashMap<String, Token>,
}

impl std::fmt::Debug for TokenFormatter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.tokens.keys().collect();
        names.sort();
        f.debug_struct("TokenFormatter").field("tokens", &names).finish()
    }
}

impl TokenFormatter {
    /// Create a formatter with the built-in tokens loaded
    pub fn new() -> Self {
        let mut formatter = Self::default();
        formatter.load();
        formatter
    }

    /// Register the built-in tokens. Overrides registered tokens with the same names
    pub fn load(&mut self) {
        tokens::load(self);
    }

    /// Register or override a token
    pub fn use_token<F>(&mut self, name: impl Into<String>, renderer: F)
    where
        F: Fn(&BarView<'_>) -> String + Send + Sync + 'static,
    {
        self.tokens
            .insert(name.into(), Token::Fixed(Arc::new(renderer)));
    }

    /// Register or override a token that renders into a column budget
    pub fn use_fill_token<F>(&mut self, name: impl Into<String>, renderer: F)
    where
        F: Fn(&BarView<'_>, usize) -> String + Send + Sync + 'static,
    {
        self.tokens.insert(name.into(), Token::Fill(Arc::new(renderer)));
    }

    /// If a renderer is registered for the token
    pub fn contains(&self, name: &str) -> bool {
        self.tokens.contains_key(name)
    }

    /// Expand the template against the view
    ///
    /// `extra` are literal replacements for tokens that don't have a renderer.
    /// Their values are inserted as-is and not scanned for tokens again.
    pub fn decorate(&self, view: &BarView<'_>, template: &str, extra: &[(String, String)]) -> String {
        enum Piece<'a> {
            Text(std::borrow::Cow<'a, str>),
            Fill(&'a FillRenderer),
        }
        let mut pieces = Vec::new();
        let mut last = 0;
        for caps in TOKEN_REGEX.captures_iter(template) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let replacement = match self.tokens.get(name.as_str()) {
                Some(Token::Fixed(renderer)) => Piece::Text(renderer(view).into()),
                Some(Token::Fill(renderer)) => Piece::Fill(renderer),
                None => match extra.iter().find(|(k, _)| k == name.as_str()) {
                    Some((_, value)) => Piece::Text(value.as_str().into()),
                    None => continue,
                },
            };
            pieces.push(Piece::Text(template[last..whole.start()].into()));
            pieces.push(replacement);
            last = whole.end();
        }
        pieces.push(Piece::Text(template[last..].into()));

        let fill_count = pieces.iter().filter(|x| matches!(x, Piece::Fill(_))).count();
        let budget = if fill_count == 0 {
            0
        } else if view.config.width > 0 {
            view.config.width
        } else {
            let text_width: usize = pieces
                .iter()
                .map(|x| match x {
                    Piece::Text(x) => ansi::display_width(x),
                    Piece::Fill(_) => 0,
                })
                .sum();
            fmt::term_width_or_default()
                .saturating_sub(text_width + view.inset)
                / fill_count
        };

        let mut out = String::new();
        for piece in &pieces {
            match piece {
                Piece::Text(x) => out.push_str(x),
                Piece::Fill(renderer) => out.push_str(&renderer(view, budget)),
            }
        }
        out
    }
}

/// Read-only view of a bar's state, taken at render time
#[derive(Debug, Clone)]
pub struct BarView<'a> {
    pub(crate) config: &'a Config,
    pub(crate) current: u64,
    pub(crate) elapsed: Duration,
    pub(crate) rate: f64,
    pub(crate) mean_rate: f64,
    pub(crate) renders: u64,
    pub(crate) inset: usize,
    pub(crate) done: bool,
}

impl<'a> BarView<'a> {
    /// A view of a bar that has not made progress yet. Useful for testing renderers
    pub fn new(config: &'a Config) -> Self {
        Self {
            config,
            current: 0,
            elapsed: Duration::ZERO,
            rate: 0f64,
            mean_rate: 0f64,
            renders: 0,
            inset: config.inset,
            done: false,
        }
    }
    /// Set the current count
    pub fn with_current(mut self, current: u64) -> Self {
        self.current = current;
        self
    }
    /// Set the elapsed time
    pub fn with_elapsed(mut self, elapsed: Duration) -> Self {
        self.elapsed = elapsed;
        self
    }
    /// Set the live and mean rates
    pub fn with_rates(mut self, rate: f64, mean_rate: f64) -> Self {
        self.rate = rate;
        self.mean_rate = mean_rate;
        self
    }

    /// The bar configuration
    #[inline(always)]
    pub fn config(&self) -> &Config {
        self.config
    }
    #[inline(always)]
    pub fn current(&self) -> u64 {
        self.current
    }
    /// Total, or `None` if unknown
    #[inline(always)]
    pub fn total(&self) -> Option<u64> {
        self.config.total
    }
    /// `current / total` clamped to `[0, 1]`, 0 if total is 0 or unknown
    pub fn ratio(&self) -> f64 {
        ratio(self.current, self.config.total)
    }
    #[inline(always)]
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }
    /// Units per second in the live window
    #[inline(always)]
    pub fn rate(&self) -> f64 {
        self.rate
    }
    /// Units per second since start
    #[inline(always)]
    pub fn mean_rate(&self) -> f64 {
        self.mean_rate
    }
    /// Number of renders so far, drives animations
    #[inline(always)]
    pub fn renders(&self) -> u64 {
        self.renders
    }
    /// Columns on the left of the line that are not available to the template
    #[inline(always)]
    pub fn inset(&self) -> usize {
        self.inset
    }
    /// If this is the final render of a finishing bar
    #[inline(always)]
    pub fn is_done(&self) -> bool {
        self.done
    }
}

/// `current / total` clamped to `[0, 1]`. Never divides by zero
pub(crate) fn ratio(current: u64, total: Option<u64>) -> f64 {
    match total {
        None | Some(0) => 0f64,
        Some(total) => (current as f64 / total as f64).clamp(0f64, 1f64),
    }
}
