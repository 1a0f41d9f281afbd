//! # Multiple bars
//!
//! A [`MultiProgress`] lets any number of bars advance independently, from any
//! thread, while sharing one block of terminal rows.
//!
//! Each bar registered to the coordinator gets the next row index, in
//! registration order. A row is claimed on screen the first time its bar is
//! drawn, and after that the bar is redrawn in place by moving the cursor up
//! to its row. Rows are never reused or compacted.
//!
//! ```text
//! ┌ [=========           ] 45%
//! ├── a [==========          ] 50%
//! ├── b [===========         ] 55%
//! └── c [======              ] 30%
//! ```
//!
//! When built with a top format, the coordinator draws an aggregate bar on row 0
//! that tracks the sum of every child, and the rows are prefixed with an
//! [`InsetStyle`]. The top bar is done when every child is done.
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};

use crate::fmt::ansi;
use crate::progress::Listeners;
use crate::screen::{InsetStyle, Output, Screen};
use crate::{Event, ProgressBar, ProgressBarBuilder, Status};

/// Coordinator of bars drawn in one block of rows
///
/// This is a cheap handle, clones refer to the same coordinator.
#[derive(Debug, Clone)]
pub struct MultiProgress {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    screen: Arc<Screen>,
    /// Aggregate bar on row 0
    top: Option<Arc<ProgressBar>>,
    children: Mutex<Vec<Arc<ProgressBar>>>,
    listeners: Mutex<Listeners>,
    done_emitted: AtomicBool,
    stopped_emitted: AtomicBool,
}

/// Builder for a [`MultiProgress`]
#[derive(Debug, Default)]
pub struct MultiProgressBuilder {
    top: Option<ProgressBarBuilder>,
    output: Option<Output>,
    inset: Option<InsetStyle>,
}

impl MultiProgressBuilder {
    /// Draw an aggregate bar with this template on the first row
    pub fn top(self, format: impl Into<String>) -> Self {
        self.top_bar(crate::progress(format))
    }

    /// Draw an aggregate bar on the first row, configured by the builder
    ///
    /// The total of the builder is ignored, the total of the top bar is
    /// the sum of the children
    pub fn top_bar(mut self, builder: ProgressBarBuilder) -> Self {
        self.top = Some(builder);
        self
    }

    /// Set where the block is drawn. Default is stdout
    pub fn output(mut self, output: Output) -> Self {
        self.output = Some(output);
        self
    }

    /// Set the row prefixes. Only used when there is a top bar
    pub fn inset(mut self, inset: InsetStyle) -> Self {
        self.inset = Some(inset);
        self
    }

    /// Build the coordinator
    ///
    /// # Errors
    /// If the top bar template or configuration is invalid
    pub fn build(self) -> crate::Result<MultiProgress> {
        let output = self.output.unwrap_or_default();
        let inset = match &self.top {
            Some(_) => Some(self.inset.unwrap_or_default()),
            None => None,
        };
        let screen = Arc::new(Screen::new(output, inset));
        let top = match self.top {
            None => None,
            Some(builder) => {
                builder.validate()?;
                let row = screen.next_row();
                Some(builder.no_width().build_attached(Arc::clone(&screen), row))
            }
        };
        Ok(MultiProgress {
            inner: Arc::new(Inner {
                screen,
                top,
                children: Mutex::new(Vec::new()),
                listeners: Mutex::new(Listeners::default()),
                done_emitted: AtomicBool::new(false),
                stopped_emitted: AtomicBool::new(false),
            }),
        })
    }
}

impl Default for MultiProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl MultiProgress {
    /// Create a coordinator without a top bar, drawing on stdout
    pub fn new() -> Self {
        let screen = Arc::new(Screen::new(Output::stdout(), None));
        Self {
            inner: Arc::new(Inner {
                screen,
                top: None,
                children: Mutex::new(Vec::new()),
                listeners: Mutex::new(Listeners::default()),
                done_emitted: AtomicBool::new(false),
                stopped_emitted: AtomicBool::new(false),
            }),
        }
    }

    /// Start building a coordinator
    pub fn builder() -> MultiProgressBuilder {
        MultiProgressBuilder::default()
    }

    /// Start building a coordinator with an aggregate bar
    ///
    /// ```rust
    /// # fn main() -> tally::Result<()> {
    /// let (out, _) = tally::Output::capture();
    /// let multi = tally::MultiProgress::with_top("total [:bar] :percent")
    ///     .output(out)
    ///     .build()?;
    /// let a = multi.register(tally::progress("a [:bar]").total(5))?;
    /// let b = multi.register(tally::progress("b [:bar]").total(5))?;
    /// assert_eq!((a.row(), b.row()), (Some(1), Some(2)));
    /// multi.start()?;
    /// a.advance(5)?;
    /// assert_eq!(multi.current(), 5);
    /// assert_eq!(multi.total(), Some(10));
    /// b.advance(5)?;
    /// assert!(multi.is_complete());
    /// # Ok(())
    /// # }
    /// ```
    pub fn with_top(format: impl Into<String>) -> MultiProgressBuilder {
        Self::builder().top(format)
    }

    /// Build a bar that draws on the next row of the block
    ///
    /// The output of the builder is ignored. The bar is not started.
    ///
    /// # Errors
    /// If the template or configuration is invalid
    pub fn register(&self, builder: ProgressBarBuilder) -> crate::Result<Arc<ProgressBar>> {
        builder.validate()?;
        let row = self.inner.screen.next_row();
        let bar = builder.build_attached(Arc::clone(&self.inner.screen), row);
        for event in [Event::Progress, Event::Done, Event::Stopped] {
            let inner = Arc::downgrade(&self.inner);
            bar.on(event, move || {
                if let Some(inner) = Weak::upgrade(&inner) {
                    inner.on_child_event(event);
                }
            });
        }
        if let Ok(mut children) = self.inner.children.lock() {
            children.push(Arc::clone(&bar));
        }
        self.inner.sync_top();
        log::debug!("bar {} registered on row {row}", bar.id());
        Ok(bar)
    }

    /// Start the top bar and every child. The top bar claims the first row
    pub fn start(&self) -> crate::Result<()> {
        if let Some(top) = &self.inner.top {
            top.start()?;
        }
        for child in self.inner.children() {
            child.start()?;
        }
        Ok(())
    }

    /// Take the next row index. Bars take their rows when registered
    pub fn next_row(&self) -> usize {
        self.inner.screen.next_row()
    }

    /// Number of rows claimed on the screen
    pub fn rows(&self) -> usize {
        self.inner.screen.rows()
    }

    /// The prefix drawn in front of a bar. Empty without a top bar
    pub fn line_inset(&self, bar: &ProgressBar) -> String {
        self.inner.screen.line_inset(bar.row()).to_string()
    }

    /// The aggregate bar, if built with a top format
    pub fn top(&self) -> Option<&Arc<ProgressBar>> {
        self.inner.top.as_ref()
    }

    /// Snapshot of the registered bars, in row order
    pub fn bars(&self) -> Vec<Arc<ProgressBar>> {
        self.inner.children()
    }

    /// Finish every bar
    ///
    /// # Errors
    /// The first write error. Every bar is finished regardless
    pub fn finish(&self) -> crate::Result<()> {
        self.for_each_bar(|bar| bar.finish())
    }

    /// Stop every bar that is not finished
    ///
    /// # Errors
    /// The first write error. Every bar is stopped regardless
    pub fn stop(&self) -> crate::Result<()> {
        self.for_each_bar(|bar| bar.stop())
    }

    pub fn pause(&self) {
        let _: crate::Result<()> = self.for_each_bar(|bar| {
            bar.pause();
            Ok(())
        });
    }

    pub fn resume(&self) -> crate::Result<()> {
        // children did not report while paused
        self.inner.sync_top();
        self.for_each_bar(|bar| bar.resume())
    }

    /// Children first, then the top bar
    fn for_each_bar(
        &self,
        f: impl Fn(&ProgressBar) -> crate::Result<()>,
    ) -> crate::Result<()> {
        let mut result = Ok(());
        for child in self.inner.children() {
            result = result.and(f(child.as_ref()));
        }
        if let Some(top) = &self.inner.top {
            result = result.and(f(top.as_ref()));
        }
        result
    }

    /// Sum of the children's counters
    pub fn current(&self) -> u64 {
        self.inner.sum().0
    }

    /// Sum of the children's totals, `None` if any of them is unknown
    pub fn total(&self) -> Option<u64> {
        self.inner.sum().1
    }

    /// If there are bars and every one of them is done
    pub fn is_complete(&self) -> bool {
        let children = self.inner.children();
        !children.is_empty() && children.iter().all(|x| x.is_done())
    }

    /// If every bar is finished and at least one was stopped
    pub fn is_stopped(&self) -> bool {
        let children = self.inner.children();
        children.iter().all(|x| x.is_finished()) && children.iter().any(|x| x.is_stopped())
    }

    /// If there are bars and every one of them is done or stopped
    pub fn is_done(&self) -> bool {
        let children = self.inner.children();
        !children.is_empty() && children.iter().all(|x| x.is_finished())
    }

    /// Print a message above the block
    pub fn log(&self, message: impl AsRef<str>) -> crate::Result<()> {
        let message = ansi::single_line(message.as_ref());
        self.inner.screen.log(Some(0), &message)
    }

    /// Register a listener for an event of the whole block
    ///
    /// `Progress` fires when any bar moves, `Done` once when every bar is done,
    /// and `Stopped` once when every bar is finished and any of them was stopped.
    pub fn on<F>(&self, event: Event, listener: F) -> &Self
    where
        F: FnMut() + Send + 'static,
    {
        if let Ok(mut listeners) = self.inner.listeners.lock() {
            listeners.add(event, Box::new(listener));
        }
        self
    }
}

/// Aggregate of the children, from their hot counters
struct Summary {
    current: u64,
    total: Option<u64>,
    all_done: bool,
    all_finished: bool,
    any_stopped: bool,
}

impl Inner {
    fn children(&self) -> Vec<Arc<ProgressBar>> {
        match self.children.lock() {
            Ok(children) => children.clone(),
            Err(_) => Vec::new(),
        }
    }

    fn sum(&self) -> (u64, Option<u64>) {
        let summary = self.summarize();
        (summary.current, summary.total)
    }

    fn summarize(&self) -> Summary {
        let mut summary = Summary {
            current: 0,
            total: Some(0),
            all_done: false,
            all_finished: false,
            any_stopped: false,
        };
        // statuses are read under the list lock, so that of two children
        // finishing at the same time, at least one sees the other finished
        let Ok(children) = self.children.lock() else {
            return summary;
        };
        summary.all_done = !children.is_empty();
        summary.all_finished = !children.is_empty();
        for child in children.iter() {
            summary.current = summary.current.saturating_add(child.current());
            summary.total = match (summary.total, child.total()) {
                (Some(a), Some(b)) => Some(a.saturating_add(b)),
                _ => None,
            };
            let status = child.status();
            summary.all_done &= status == Status::Done;
            summary.all_finished &= child.is_finished();
            summary.any_stopped |= status == Status::Stopped;
        }
        summary
    }

    /// Push the sums to the top bar
    fn sync_top(&self) {
        let Some(top) = &self.top else {
            return;
        };
        let (current, total) = self.sum();
        if let Err(e) = top.sync(current, total, true) {
            log::debug!("failed to draw top bar: {e:?}");
        }
    }

    fn on_child_event(&self, event: Event) {
        let summary = self.summarize();
        if let Some(top) = &self.top {
            if top.status() == Status::Created {
                if let Err(e) = top.start() {
                    log::debug!("failed to start top bar: {e:?}");
                }
            }
            let ending = summary.all_done || (summary.all_finished && summary.any_stopped);
            let mut result = top.sync(summary.current, summary.total, !ending);
            if summary.all_done {
                result = result.and(top.finish());
            } else if summary.all_finished && summary.any_stopped {
                result = result.and(top.stop());
            }
            if let Err(e) = result {
                log::debug!("failed to draw top bar: {e:?}");
            }
        }
        if event == Event::Progress {
            self.emit(Event::Progress);
        }
        if summary.all_done {
            if !self.done_emitted.swap(true, Ordering::AcqRel) {
                log::debug!("all bars done");
                self.emit(Event::Done);
            }
        } else if summary.all_finished
            && summary.any_stopped
            && !self.stopped_emitted.swap(true, Ordering::AcqRel)
        {
            log::debug!("all bars finished, some stopped");
            self.emit(Event::Stopped);
        }
    }

    fn emit(&self, event: Event) {
        if let Ok(mut listeners) = self.listeners.lock() {
            listeners.emit(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn multi(top: Option<&str>) -> (MultiProgress, crate::Capture) {
        let (out, capture) = Output::capture();
        let mut builder = MultiProgress::builder().output(out);
        if let Some(top) = top {
            builder = builder.top(top);
        }
        (builder.build().unwrap(), capture)
    }

    #[test]
    fn rows_follow_registration() {
        let (multi, _) = multi(None);
        let a = multi.register(crate::progress("a").total(1)).unwrap();
        let b = multi.register(crate::progress("b").total(1)).unwrap();
        assert_eq!(a.row(), Some(0));
        assert_eq!(b.row(), Some(1));
        assert_eq!(multi.next_row(), 2);
        assert_eq!(multi.rows(), 0);
    }

    #[test]
    fn invalid_child_does_not_take_a_row() {
        let (multi, _) = multi(None);
        assert!(multi.register(crate::progress("")).is_err());
        let a = multi.register(crate::progress("a")).unwrap();
        assert_eq!(a.row(), Some(0));
    }

    #[test]
    fn top_bar_tracks_children() {
        let (multi, _) = multi(Some(":current/:total"));
        let a = multi.register(crate::progress("a").total(10)).unwrap();
        let b = multi.register(crate::progress("b").total(5)).unwrap();
        let top = multi.top().unwrap();
        assert_eq!(top.row(), Some(0));
        assert_eq!(top.total(), Some(15));
        multi.start().unwrap();
        a.advance(4).unwrap();
        b.advance(1).unwrap();
        assert_eq!(top.current(), 5);
        assert_eq!(top.to_line(), "\u{250c} 5/15");
        a.advance(6).unwrap();
        assert!(!top.is_finished());
        b.stop().unwrap();
        assert!(top.is_stopped());
        assert!(multi.is_stopped());
        assert!(multi.is_done());
        assert!(!multi.is_complete());
    }

    #[test]
    fn unknown_child_total_makes_top_unknown() {
        let (multi, _) = multi(Some(":total"));
        multi.register(crate::progress("a").total(10)).unwrap();
        multi.register(crate::progress("b").no_width()).unwrap();
        assert_eq!(multi.total(), None);
        assert_eq!(multi.top().unwrap().total(), None);
    }

    #[test]
    fn empty_block_is_not_done() {
        let (multi, _) = multi(None);
        assert!(!multi.is_done());
        assert!(!multi.is_complete());
        assert!(!multi.is_stopped());
        assert_eq!(multi.current(), 0);
        assert_eq!(multi.total(), Some(0));
    }
}
