//! Concurrent terminal progress bars
//!
//! # Progress Bar
//! A bar is built from a template with `:name` tokens, and is redrawn in place
//! on every update. Any number of threads can advance the same bar.
//!
//! ```rust,no_run
//! # fn main() -> tally::Result<()> {
//! let bar = tally::progress("downloading [:bar] :percent :eta")
//!     .total(100)
//!     .build()?;
//! bar.start()?;
//! for _ in 0..100 {
//!     bar.advance(1)?;
//! }
//! # Ok(())
//! # }
//! ```
//!
//! See [`progress`](fn@crate::progress) for the lifecycle of a bar, and
//! [`format`] for the tokens.
//!
//! # Multiple Bars
//! A [`MultiProgress`] gives each registered bar its own row in a shared block,
//! with an optional aggregate bar on top.
//!
//! ```rust,no_run
//! # fn main() -> tally::Result<()> {
//! let multi = tally::MultiProgress::with_top("[:bar] :percent").build()?;
//! let a = multi.register(tally::progress("a [:bar]").total(20))?;
//! let b = multi.register(tally::progress("b [:bar]").total(30))?;
//! multi.start()?;
//! std::thread::scope(|s| {
//!     s.spawn(|| (0..20).try_for_each(|_| a.advance(1)));
//!     s.spawn(|| (0..30).try_for_each(|_| b.advance(1)));
//! });
//! # Ok(())
//! # }
//! ```
//!
//! # Output
//! Bars are drawn to stdout by default, see [`Output`] for other sinks.
//! Cursor movement is only emitted when the output is a terminal,
//! so piping the output to a file only keeps the messages printed
//! with [`ProgressBar::log`].
//!
//! # `log` integration
//! [`log_init`] installs a logger that prints records through the bar set with
//! [`attach_log_target`], so logging does not break the bar. The `RUST_LOG`
//! environment variable is supported in the same way as in
//! [`env_logger`](https://docs.rs/env_logger/latest/env_logger/#enabling-logging).
//!
//! # Errors
//! Operations that write return [`Result`]. Updates to a finished bar are
//! ignored and are not errors.

mod atomic;
pub use atomic::{Atomic, AtomicType};

pub mod fmt;
pub mod format;
pub use format::{BarStyle, BarView, TokenFormatter};

mod meter;
pub use meter::RateMeter;

mod progress;
pub use progress::*;

mod screen;
pub use screen::{Capture, InsetStyle, Output};

mod multi;
pub use multi::{MultiProgress, MultiProgressBuilder};

mod log_init;
pub use log_init::{attach_log_target, detach_log_target, log_init};

// re-exports from libraries
pub use anyhow::{Context, Result, bail, ensure};
pub use log::{debug, error, info, trace, warn};
