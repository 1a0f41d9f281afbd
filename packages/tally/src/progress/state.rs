use std::cell::Cell;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use crate::format::{self, BarView, TokenFormatter};
use crate::fmt::ansi;
use crate::meter::RateMeter;
use crate::progress::{Config, Event, Listeners, ProgressIter};
use crate::screen::{Output, Screen};
use crate::Atomic;

/// Stored in the hot total when the total is not known
const UNKNOWN_TOTAL: u64 = u64::MAX;

thread_local! {
    /// Number of bar locks held by the current thread
    static LOCKS_HELD: Cell<usize> = const { Cell::new(0) };
}

/// If the current thread is inside a bar operation (for example, running a listener)
pub(crate) fn holds_bar_lock() -> bool {
    LOCKS_HELD.with(Cell::get) > 0
}

/// Lifecycle of a bar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Status {
    /// Built, but not started
    Created,
    /// Counting
    Running,
    /// Reached the total, or finished explicitly
    Done,
    /// Stopped before it was done
    Stopped,
}

impl From<u8> for Status {
    fn from(value: u8) -> Self {
        match value {
            0 => Self::Created,
            1 => Self::Running,
            2 => Self::Done,
            _ => Self::Stopped,
        }
    }
}

impl From<Status> for u8 {
    fn from(value: Status) -> Self {
        value as Self
    }
}

/// Handle for a progress bar (This is the internal state, the handle is `Arc<ProgressBar>`)
///
/// Every operation takes `&self` and can be called from any thread. Mutation
/// and rendering of one bar are serialized by its own lock, and all writes
/// go through the lock of the output it draws on.
///
/// See [`tally::progress`](fn@crate::progress) for how to build one.
#[derive(Debug)]
pub struct ProgressBar {
    pub(crate) state: StateImmut,
    status: Atomic<u8, Status>,
    /// Mirrors of the counter and total, readable without the lock
    hot_current: AtomicU64,
    hot_total: AtomicU64,
    state_mut: Mutex<State>,
    listeners: Mutex<Listeners>,
}

/// Internal, immutable state of progress bar
#[derive(Debug)]
pub(crate) struct StateImmut {
    pub id: usize,
    /// The template
    pub format: String,
    pub screen: Arc<Screen>,
    /// Row in a coordinated block, `None` for a standalone bar
    pub row: Option<usize>,
}

/// Internal mutable state
#[derive(Debug)]
struct State {
    config: Config,
    formatter: TokenFormatter,
    current: u64,
    /// Literal replacements for the current render cycle
    tokens: Vec<(String, String)>,
    meter: RateMeter,
    started_at: Option<Instant>,
    last_render_at: Option<Instant>,
    /// Display width of the last line written
    last_width: usize,
    renders: u64,
    paused: bool,
    cursor_hidden: bool,
}

/// Guard of the bar state that tracks the locks held by this thread
struct Locked<'a>(MutexGuard<'a, State>);

impl<'a> Locked<'a> {
    fn new(guard: MutexGuard<'a, State>) -> Self {
        LOCKS_HELD.with(|x| x.set(x.get() + 1));
        Self(guard)
    }
}

impl Drop for Locked<'_> {
    fn drop(&mut self) {
        LOCKS_HELD.with(|x| x.set(x.get().saturating_sub(1)));
    }
}

impl Deref for Locked<'_> {
    type Target = State;
    fn deref(&self) -> &State {
        &self.0
    }
}

impl DerefMut for Locked<'_> {
    fn deref_mut(&mut self) -> &mut State {
        &mut self.0
    }
}

impl ProgressBar {
    pub(crate) fn new(
        format: String,
        config: Config,
        formatter: TokenFormatter,
        screen: Arc<Screen>,
        row: Option<usize>,
    ) -> Arc<Self> {
        let id = crate::atomic::next_atomic_usize();
        log::trace!("bar {id} created, row {row:?}");
        Arc::new(Self {
            status: Atomic::new_u8(Status::Created.into()),
            hot_current: AtomicU64::new(0),
            hot_total: AtomicU64::new(config.total.unwrap_or(UNKNOWN_TOTAL)),
            state_mut: Mutex::new(State {
                meter: RateMeter::new(config.interval),
                config,
                formatter,
                current: 0,
                tokens: Vec::new(),
                started_at: None,
                last_render_at: None,
                last_width: 0,
                renders: 0,
                paused: false,
                cursor_hidden: false,
            }),
            listeners: Mutex::new(Listeners::default()),
            state: StateImmut {
                id,
                format,
                screen,
                row,
            },
        })
    }

    fn lock(&self) -> Option<Locked<'_>> {
        self.state_mut.lock().ok().map(Locked::new)
    }

    /// Start the bar and render it at its current progress
    ///
    /// Starting a running bar again resets the start time and the rates.
    /// No effect on a finished bar.
    pub fn start(&self) -> crate::Result<()> {
        let Some(mut state) = self.lock() else {
            return Ok(());
        };
        if self.is_finished() {
            return Ok(());
        }
        let now = Instant::now();
        self.start_locked(&mut state, now);
        self.render_locked(&mut state, now, true)
    }

    fn start_locked(&self, state: &mut State, now: Instant) {
        state.started_at = Some(now);
        state.last_render_at = None;
        state.meter.start(now);
        self.status.set(Status::Running);
        log::debug!("bar {} started", self.state.id);
    }

    /// Advance the bar by `amount`
    ///
    /// The bar is finished when it reaches the total. Otherwise it is rendered,
    /// unless the last render was less than `1/frequency` seconds ago.
    /// The first advance of a bar that was not started starts it.
    #[inline(always)]
    pub fn advance(&self, amount: u64) -> crate::Result<()> {
        self.advance_by(amount, Vec::<(String, String)>::new())
    }

    /// Advance the bar by 1, with literal values for custom tokens in the template
    ///
    /// ```rust
    /// # fn main() -> tally::Result<()> {
    /// let (out, capture) = tally::Output::capture();
    /// let bar = tally::progress(":title :current/:total").total(3).output(out).build()?;
    /// bar.advance_with_tokens([("title", "hello")])?;
    /// assert!(capture.contents().ends_with("hello 1/3"));
    /// # Ok(())
    /// # }
    /// ```
    #[inline(always)]
    pub fn advance_with_tokens<I, K, V>(&self, tokens: I) -> crate::Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.advance_by(1, tokens)
    }

    /// Advance the bar by `amount`, with literal values for custom tokens
    ///
    /// The tokens replace the ones of the previous update.
    pub fn advance_by<I, K, V>(&self, amount: u64, tokens: I) -> crate::Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let tokens = collect_tokens(tokens);
        let Some(mut state) = self.lock() else {
            return Ok(());
        };
        let target = state.current.saturating_add(amount);
        self.apply(&mut state, target, tokens)
    }

    /// Set the counter, clamped to the total
    pub fn set_current(&self, value: u64) -> crate::Result<()> {
        let Some(mut state) = self.lock() else {
            return Ok(());
        };
        let target = match state.config.total {
            Some(total) => value.min(total),
            None => value,
        };
        self.apply(&mut state, target, Vec::new())
    }

    /// Set the counter to a fraction of the total. No effect when the total is unknown
    pub fn set_ratio(&self, ratio: f64) -> crate::Result<()> {
        let Some(mut state) = self.lock() else {
            return Ok(());
        };
        let Some(total) = state.config.total else {
            return Ok(());
        };
        let ratio = if ratio.is_nan() { 0f64 } else { ratio.clamp(0f64, 1f64) };
        let target = ((total as f64 * ratio).floor() as u64).min(total);
        self.apply(&mut state, target, Vec::new())
    }

    /// The single mutation path of the counter
    fn apply(
        &self,
        state: &mut State,
        target: u64,
        tokens: Vec<(String, String)>,
    ) -> crate::Result<()> {
        if self.is_finished() {
            return Ok(());
        }
        let now = Instant::now();
        if self.status() == Status::Created {
            self.start_locked(state, now);
        }
        state.tokens = tokens;
        if target > state.current {
            state.meter.sample(now, target - state.current);
        }
        state.current = target;
        self.hot_current.store(target, Ordering::Release);

        if let Some(total) = state.config.total {
            if target >= total {
                return self.finish_locked(state, now);
            }
        }

        let due = match state.last_render_at {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= state.config.render_period(),
        };
        if !due || state.paused {
            return Ok(());
        }
        let result = self.render_locked(state, now, false);
        self.emit(Event::Progress);
        result
    }

    /// `current / total` clamped to `[0, 1]`. 0 if the total is 0 or unknown
    pub fn ratio(&self) -> f64 {
        format::ratio(self.current(), self.total())
    }

    /// Render the bar now, ignoring the frequency limit
    ///
    /// No effect on a finished or paused bar, or when the output is not a terminal.
    pub fn render(&self) -> crate::Result<()> {
        let Some(mut state) = self.lock() else {
            return Ok(());
        };
        if self.is_finished() {
            return Ok(());
        }
        self.render_locked(&mut state, Instant::now(), true)
    }

    /// Render unless paused or finished. `force` also draws a finishing bar
    fn render_locked(&self, state: &mut State, now: Instant, force: bool) -> crate::Result<()> {
        let status = self.status();
        if !force && (status == Status::Done || status == Status::Stopped) {
            return Ok(());
        }
        if state.paused && !matches!(status, Status::Done | Status::Stopped) {
            return Ok(());
        }
        let screen = &self.state.screen;
        if !screen.is_terminal() {
            return Ok(());
        }
        if state.config.hide_cursor && !state.cursor_hidden && !self.is_finished() {
            state.cursor_hidden = true;
            screen.hide_cursor()?;
        }
        let mut line = self.line(state, now);
        let width = ansi::display_width(&line);
        for _ in width..state.last_width {
            line.push(' ');
        }
        state.last_width = width;
        state.last_render_at = Some(now);
        state.renders = state.renders.wrapping_add(1);
        screen.write_line(self.state.row, &line)
    }

    /// Expand the template with the inset prefix of the row
    fn line(&self, state: &State, now: Instant) -> String {
        let prefix = self.state.screen.line_inset(self.state.row);
        let view = BarView {
            config: &state.config,
            current: state.current,
            elapsed: state
                .started_at
                .map(|x| now.saturating_duration_since(x))
                .unwrap_or_default(),
            rate: state.meter.rate(now),
            mean_rate: state.meter.mean_rate(now),
            renders: state.renders,
            inset: state.config.inset + ansi::display_width(prefix),
            done: self.status() == Status::Done,
        };
        let mut line = prefix.to_string();
        line.push_str(&state.formatter.decorate(&view, &self.state.format, &state.tokens));
        line
    }

    /// Render the line to a string without writing it
    pub fn to_line(&self) -> String {
        match self.lock() {
            Some(state) => self.line(&state, Instant::now()),
            None => String::new(),
        }
    }

    /// Clear the line and set a new width for the `:bar` token
    ///
    /// `None` keeps the width. The bar is drawn again on the next update.
    pub fn resize(&self, width: Option<usize>) -> crate::Result<()> {
        let Some(mut state) = self.lock() else {
            return Ok(());
        };
        if self.is_finished() {
            return Ok(());
        }
        if let Some(width) = width {
            state.config.width = width;
        }
        state.last_width = 0;
        self.state.screen.clear_line(self.state.row)
    }

    /// Fill the bar to the total and finish it
    ///
    /// With an unknown total, the total becomes the current count. The final
    /// line is left on the screen with a newline, or erased with
    /// `clear_on_finish`. Finishing a finished bar has no effect.
    ///
    /// # Errors
    /// If the final write fails. The bar is still done in that case
    pub fn finish(&self) -> crate::Result<()> {
        let Some(mut state) = self.lock() else {
            return Ok(());
        };
        self.finish_locked(&mut state, Instant::now())
    }

    fn finish_locked(&self, state: &mut State, now: Instant) -> crate::Result<()> {
        if self.is_finished() {
            return Ok(());
        }
        match state.config.total {
            Some(total) => state.current = total,
            None => {
                state.config.total = Some(state.current);
                self.hot_total.store(state.current, Ordering::Release);
            }
        }
        self.hot_current.store(state.current, Ordering::Release);
        self.status.set(Status::Done);
        log::debug!("bar {} done at {}", self.state.id, state.current);
        let result = self.end_locked(state, now);
        self.emit(Event::Done);
        result
    }

    /// Finish the bar where it is
    ///
    /// The counter is kept. Stopping a finished bar has no effect.
    ///
    /// # Errors
    /// If the final write fails. The bar is still stopped in that case
    pub fn stop(&self) -> crate::Result<()> {
        let Some(mut state) = self.lock() else {
            return Ok(());
        };
        if self.is_finished() {
            return Ok(());
        }
        self.status.set(Status::Stopped);
        log::debug!("bar {} stopped at {}", self.state.id, state.current);
        let result = self.end_locked(&mut state, Instant::now());
        self.emit(Event::Stopped);
        result
    }

    /// Final render and cleanup. Cleanup runs even if writing fails
    fn end_locked(&self, state: &mut State, now: Instant) -> crate::Result<()> {
        let screen = &self.state.screen;
        let mut result = Ok(());
        if state.cursor_hidden {
            state.cursor_hidden = false;
            result = screen.show_cursor();
        }
        result = result.and(self.render_locked(state, now, true));
        result = result.and(screen.end_line(self.state.row, state.config.clear_on_finish));
        state.meter.clear();
        state.tokens.clear();
        state.paused = false;
        result
    }

    /// Stop rendering. The bar still counts while paused
    pub fn pause(&self) {
        let Some(mut state) = self.lock() else {
            return;
        };
        if self.status() != Status::Running || state.paused {
            return;
        }
        state.paused = true;
        self.emit(Event::Paused);
    }

    /// Render again after [`pause`](Self::pause)
    pub fn resume(&self) -> crate::Result<()> {
        let Some(mut state) = self.lock() else {
            return Ok(());
        };
        if !state.paused {
            return Ok(());
        }
        state.paused = false;
        self.render_locked(&mut state, Instant::now(), false)
    }

    /// Print a message line without corrupting the bar
    ///
    /// Line breaks in the message are replaced with spaces. While the bar is
    /// displayed, the message is printed in place of it and the bar is drawn
    /// again below. For a bar in a coordinated block, the message goes above
    /// the whole block.
    pub fn log(&self, message: impl AsRef<str>) -> crate::Result<()> {
        let mut message = ansi::single_line(message.as_ref());
        let Some(mut state) = self.lock() else {
            return Ok(());
        };
        let screen = &self.state.screen;
        if self.is_finished() {
            return screen.print(self.state.row, &message);
        }
        let width = ansi::display_width(&message);
        for _ in width..state.last_width {
            message.push(' ');
        }
        screen.log(self.state.row, &message)?;
        if self.state.row.is_some() || self.status() != Status::Running {
            // rows are redrawn by the screen
            return Ok(());
        }
        state.last_width = 0;
        self.render_locked(&mut state, Instant::now(), false)
    }

    /// Register a listener for an event
    ///
    /// Listeners are called in registration order, on the thread that caused
    /// the event, while the bar is locked. They must not call into the same bar.
    ///
    /// ```rust
    /// # fn main() -> tally::Result<()> {
    /// use std::sync::atomic::{AtomicBool, Ordering};
    /// use std::sync::Arc;
    ///
    /// let (out, _) = tally::Output::capture();
    /// let bar = tally::progress(":bar").total(2).output(out).build()?;
    /// let done = Arc::new(AtomicBool::new(false));
    /// let done2 = Arc::clone(&done);
    /// bar.on(tally::Event::Done, move || done2.store(true, Ordering::SeqCst));
    /// bar.advance(2)?;
    /// assert!(done.load(Ordering::SeqCst));
    /// # Ok(())
    /// # }
    /// ```
    pub fn on<F>(&self, event: Event, listener: F) -> &Self
    where
        F: FnMut() + Send + 'static,
    {
        if let Ok(mut listeners) = self.listeners.lock() {
            listeners.add(event, Box::new(listener));
        }
        self
    }

    fn emit(&self, event: Event) {
        if let Ok(mut listeners) = self.listeners.lock() {
            listeners.emit(event);
        }
    }

    /// Iterate over a collection, advancing by `step` before each element
    ///
    /// The total is set to `len * step`, or unknown if the length is not known.
    /// The counter is not reset.
    ///
    /// ```rust
    /// # fn main() -> tally::Result<()> {
    /// let (out, _) = tally::Output::capture();
    /// let bar = tally::progress(":bar").output(out).build()?;
    /// let sum: i32 = bar.iter(vec![1, 2, 3], 1).sum();
    /// assert_eq!(sum, 6);
    /// assert!(bar.is_done());
    /// # Ok(())
    /// # }
    /// ```
    pub fn iter<I>(self: &Arc<Self>, collection: I, step: u64) -> ProgressIter<I::IntoIter>
    where
        I: IntoIterator,
    {
        let iter = collection.into_iter();
        let total = match iter.size_hint() {
            (lower, Some(upper)) if lower == upper => Some((lower as u64).saturating_mul(step)),
            _ => None,
        };
        if let Some(mut state) = self.lock() {
            if !self.is_finished() {
                state.config.total = total;
                self.hot_total
                    .store(total.unwrap_or(UNKNOWN_TOTAL), Ordering::Release);
            }
        }
        ProgressIter::new(iter, Arc::clone(self), step)
    }

    /// Change the configuration of the bar
    ///
    /// # Errors
    /// If the new configuration is invalid. The old one is kept in that case
    ///
    /// ```rust
    /// # fn main() -> tally::Result<()> {
    /// let (out, _) = tally::Output::capture();
    /// let bar = tally::progress(":bar").output(out).build()?;
    /// bar.update(|config| config.total = Some(50))?;
    /// assert_eq!(bar.total(), Some(50));
    /// assert!(bar.update(|config| config.frequency = -1.0).is_err());
    /// # Ok(())
    /// # }
    /// ```
    pub fn update(&self, f: impl FnOnce(&mut Config)) -> crate::Result<()> {
        let Some(mut state) = self.lock() else {
            return Ok(());
        };
        let mut config = state.config.clone();
        f(&mut config);
        config.validate()?;
        if config.interval != state.config.interval {
            state.meter.set_interval(config.interval);
        }
        if config.total != state.config.total {
            self.hot_total
                .store(config.total.unwrap_or(UNKNOWN_TOTAL), Ordering::Release);
        }
        state.config = config;
        Ok(())
    }

    /// Set the total. Same as updating `total` in the configuration
    pub fn set_total(&self, total: u64) -> crate::Result<()> {
        self.update(|config| config.total = Some(total))
    }

    /// Change where a standalone bar is written
    ///
    /// # Errors
    /// If the bar belongs to a coordinator, which owns the output
    pub fn set_output(&self, output: Output) -> crate::Result<()> {
        crate::ensure!(
            self.state.row.is_none(),
            "cannot change the output of bar {}, it belongs to a coordinator",
            self.state.id
        );
        self.state.screen.set_output(output);
        Ok(())
    }

    /// Register or override a token on this bar
    pub fn use_token<F>(&self, name: impl Into<String>, renderer: F)
    where
        F: Fn(&BarView<'_>) -> String + Send + Sync + 'static,
    {
        if let Some(mut state) = self.lock() {
            state.formatter.use_token(name, renderer);
        }
    }

    /// Set the counter and total of an aggregate bar, without finishing it.
    /// Only drawn if the bar is running and `render` is set
    pub(crate) fn sync(&self, current: u64, total: Option<u64>, render: bool) -> crate::Result<()> {
        let Some(mut state) = self.lock() else {
            return Ok(());
        };
        if self.is_finished() {
            return Ok(());
        }
        let now = Instant::now();
        state.config.total = total;
        self.hot_total
            .store(total.unwrap_or(UNKNOWN_TOTAL), Ordering::Release);
        if current > state.current && self.status() == Status::Running {
            let delta = current - state.current;
            state.meter.sample(now, delta);
        }
        state.current = current;
        self.hot_current.store(current, Ordering::Release);
        if !render || self.status() != Status::Running {
            return Ok(());
        }
        let due = match state.last_render_at {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= state.config.render_period(),
        };
        if due {
            self.render_locked(&mut state, now, false)
        } else {
            Ok(())
        }
    }

    #[inline(always)]
    pub fn id(&self) -> usize {
        self.state.id
    }

    /// Row in the coordinated block, `None` for a standalone bar
    #[inline(always)]
    pub fn row(&self) -> Option<usize> {
        self.state.row
    }

    #[inline(always)]
    pub fn current(&self) -> u64 {
        self.hot_current.load(Ordering::Acquire)
    }

    /// The total, `None` if unknown
    #[inline(always)]
    pub fn total(&self) -> Option<u64> {
        match self.hot_total.load(Ordering::Acquire) {
            UNKNOWN_TOTAL => None,
            x => Some(x),
        }
    }

    #[inline(always)]
    pub fn status(&self) -> Status {
        self.status.get()
    }

    #[inline(always)]
    pub fn is_done(&self) -> bool {
        self.status() == Status::Done
    }

    /// Same as [`is_done`](Self::is_done)
    #[inline(always)]
    pub fn is_complete(&self) -> bool {
        self.is_done()
    }

    #[inline(always)]
    pub fn is_stopped(&self) -> bool {
        self.status() == Status::Stopped
    }

    /// If the bar is done or stopped
    #[inline(always)]
    pub fn is_finished(&self) -> bool {
        matches!(self.status(), Status::Done | Status::Stopped)
    }

    pub fn is_paused(&self) -> bool {
        self.lock().is_some_and(|x| x.paused)
    }

    /// Time since the bar was started
    pub fn elapsed(&self) -> Duration {
        self.lock()
            .and_then(|x| x.started_at)
            .map(|x| x.elapsed())
            .unwrap_or_default()
    }

    /// Units per second in the rate window. 0 once the bar is finished
    pub fn rate(&self) -> f64 {
        self.lock()
            .map(|x| x.meter.rate(Instant::now()))
            .unwrap_or_default()
    }

    /// Units per second since start. 0 once the bar is finished
    pub fn mean_rate(&self) -> f64 {
        self.lock()
            .map(|x| x.meter.mean_rate(Instant::now()))
            .unwrap_or_default()
    }
}

impl Drop for ProgressBar {
    fn drop(&mut self) {
        let hidden = match self.state_mut.get_mut() {
            Ok(state) => state.cursor_hidden,
            Err(_) => false,
        };
        if hidden {
            let _: crate::Result<()> = self.state.screen.show_cursor();
        }
    }
}

fn collect_tokens<I, K, V>(tokens: I) -> Vec<(String, String)>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    tokens
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(format: &str, total: u64) -> (Arc<ProgressBar>, crate::Capture) {
        let (out, capture) = Output::capture();
        let bar = crate::progress(format)
            .total(total)
            .width(10)
            .output(out)
            .build()
            .unwrap();
        (bar, capture)
    }

    #[test]
    fn status_round_trips_through_u8() {
        for status in [Status::Created, Status::Running, Status::Done, Status::Stopped] {
            assert_eq!(Status::from(u8::from(status)), status);
        }
    }

    #[test]
    fn lock_depth_is_tracked() {
        let (bar, _) = bar(":current", 10);
        assert!(!holds_bar_lock());
        {
            let _state = bar.lock().unwrap();
            assert!(holds_bar_lock());
        }
        assert!(!holds_bar_lock());
    }

    #[test]
    fn listener_runs_with_lock_held() {
        let (bar, _) = bar(":current", 10);
        let seen = Arc::new(std::sync::atomic::AtomicBool::new(false));
        let seen2 = Arc::clone(&seen);
        bar.on(Event::Progress, move || {
            seen2.store(holds_bar_lock(), Ordering::SeqCst);
        });
        bar.advance(1).unwrap();
        assert!(seen.load(Ordering::SeqCst));
    }

    #[test]
    fn set_ratio_ignores_nan() {
        let (bar, _) = bar(":current", 10);
        bar.start().unwrap();
        bar.set_ratio(0.55).unwrap();
        assert_eq!(bar.current(), 5);
        bar.set_ratio(f64::NAN).unwrap();
        assert_eq!(bar.current(), 0);
    }

    #[test]
    fn throttled_updates_coalesce() {
        let (out, capture) = Output::capture();
        let bar = crate::progress(":current")
            .total(100)
            .frequency(0.001)
            .output(out)
            .build()
            .unwrap();
        bar.start().unwrap();
        for _ in 0..10 {
            bar.advance(1).unwrap();
        }
        // only the start render got through
        assert_eq!(capture.contents(), "\r\x1b[K0");
        bar.render().unwrap();
        assert!(capture.contents().ends_with("\r\x1b[K10"));
    }
}
