use std::sync::Arc;

use crate::ProgressBar;

/// Iterator that advances a bar before yielding each element
///
/// Created by [`ProgressBar::iter`] or [`ProgressIteratorExt`]. When the
/// inner iterator is exhausted and the bar is still running (the total was
/// not known), the bar is finished.
#[derive(Debug)]
pub struct ProgressIter<I> {
    iter: I,
    bar: Arc<ProgressBar>,
    step: u64,
}

impl<I> ProgressIter<I> {
    pub(crate) fn new(iter: I, bar: Arc<ProgressBar>, step: u64) -> Self {
        Self { iter, bar, step }
    }

    /// The bar being advanced
    pub fn bar(&self) -> &Arc<ProgressBar> {
        &self.bar
    }
}

impl<I: Iterator> Iterator for ProgressIter<I> {
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.iter.next();
        let result = match item {
            Some(_) => self.bar.advance(self.step),
            None => self.bar.finish(),
        };
        if let Err(e) = result {
            log::debug!("failed to update bar {} while iterating: {e:?}", self.bar.id());
        }
        item
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

/// Extension trait to drive a bar from any iterator
///
/// ```rust
/// # fn main() -> tally::Result<()> {
/// use tally::ProgressIteratorExt as _;
///
/// let (out, _) = tally::Output::capture();
/// let bar = tally::progress(":current/:total").output(out).build()?;
/// let doubled: Vec<_> = (0..4).with_progress(&bar).map(|x| x * 2).collect();
/// assert_eq!(doubled, vec![0, 2, 4, 6]);
/// assert_eq!(bar.current(), 4);
/// # Ok(())
/// # }
/// ```
pub trait ProgressIteratorExt: Iterator + Sized {
    /// Advance the bar by 1 for each element
    fn with_progress(self, bar: &Arc<ProgressBar>) -> ProgressIter<Self> {
        bar.iter(self, 1)
    }

    /// Advance the bar by `step` for each element
    fn with_progress_step(self, bar: &Arc<ProgressBar>, step: u64) -> ProgressIter<Self> {
        bar.iter(self, step)
    }
}

impl<I: Iterator> ProgressIteratorExt for I {}
