/// # Progress Bars
/// A bar is a counter with a template that is drawn on one line of the terminal,
/// and redrawn in place whenever the counter moves.
///
/// ```rust
/// # fn main() -> tally::Result<()> {
/// let (out, capture) = tally::Output::capture();
/// let bar = tally::progress("downloading [:bar] :percent")
///     .total(10)
///     .width(10)
///     .output(out)
///     .build()?;
/// bar.start()?;
/// for _ in 0..10 {
///     bar.advance(1)?;
/// }
/// assert!(bar.is_done());
/// assert!(capture.contents().ends_with("downloading [==========] 100%\n"));
/// # Ok(())
/// # }
/// ```
///
/// ## Template
/// The template is a single line with `:name` tokens in it. See the [`format`](crate::format)
/// module for the built-in tokens. Tokens that are not registered can be filled
/// in with literal values for one update with
/// [`advance_with_tokens`](ProgressBar::advance_with_tokens).
///
/// ## State
/// A bar can be in 4 states:
/// - `Created`: built, but nothing is drawn yet
/// - `Running`: after [`start`](ProgressBar::start), or the first advance
/// - `Done`: reached the total, or [`finish`](ProgressBar::finish) was called.
///   The final line stays on the screen with a newline, unless `clear_on_finish` is set
/// - `Stopped`: [`stop`](ProgressBar::stop) was called before it was done
///
/// `Done` and `Stopped` are final. Updates after that are ignored.
///
/// A running bar can also be paused. It keeps counting but is not drawn until resumed.
///
/// ## Unknown total
/// With [`no_width`](ProgressBarBuilder::no_width), the bar animates instead of
/// filling up, and is only done when [`finish`](ProgressBar::finish) is called.
///
/// ## Output
/// Bars are drawn to stdout by default. Nothing is drawn if the output is not a terminal,
/// but [`log`](ProgressBar::log) still prints. Use [`MultiProgress`](crate::MultiProgress)
/// to display multiple bars at once.
///
/// ## Events
/// Listeners can be registered with [`on`](ProgressBar::on) for each [`Event`].
#[inline(always)]
pub fn progress(format: impl Into<String>) -> ProgressBarBuilder {
    ProgressBarBuilder::new(format.into())
}

mod builder;
pub use builder::{Config, ProgressBarBuilder};
mod event;
pub use event::{Event, Listener};
pub(crate) use event::Listeners;
mod iter;
pub use iter::{ProgressIter, ProgressIteratorExt};
mod state;
pub(crate) use state::holds_bar_lock;
pub use state::{ProgressBar, Status};
