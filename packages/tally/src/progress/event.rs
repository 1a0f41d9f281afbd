/// Events emitted by bars and coordinators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Event {
    /// The bar was drawn after its counter moved. Updates held back by the
    /// frequency limit or a pause do not fire it
    Progress,
    /// The bar reached its total or was finished
    Done,
    /// The bar was stopped before it was done
    Stopped,
    /// The bar was paused
    Paused,
}

impl Event {
    const COUNT: usize = 4;

    fn index(self) -> usize {
        match self {
            Self::Progress => 0,
            Self::Done => 1,
            Self::Stopped => 2,
            Self::Paused => 3,
        }
    }
}

/// Boxed listener callback
pub type Listener = Box<dyn FnMut() + Send>;

/// Listeners of each event, in registration order
#[derive(Default)]
pub(crate) struct Listeners {
    slots: [Vec<Listener>; Event::COUNT],
}

impl std::fmt::Debug for Listeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let counts = self.slots.each_ref().map(Vec::len);
        f.debug_struct("Listeners").field("counts", &counts).finish()
    }
}

impl Listeners {
    pub fn add(&mut self, event: Event, listener: Listener) {
        self.slots[event.index()].push(listener);
    }

    pub fn emit(&mut self, event: Event) {
        for listener in &mut self.slots[event.index()] {
            listener();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[test]
    fn emits_to_matching_listeners_in_order() {
        let order = Arc::new(std::sync::Mutex::new(Vec::new()));
        let done = Arc::new(AtomicUsize::new(0));
        let mut listeners = Listeners::default();
        for i in 0..3 {
            let order = Arc::clone(&order);
            listeners.add(Event::Progress, Box::new(move || order.lock().unwrap().push(i)));
        }
        {
            let done = Arc::clone(&done);
            listeners.add(Event::Done, Box::new(move || {
                done.fetch_add(1, Ordering::SeqCst);
            }));
        }
        listeners.emit(Event::Progress);
        listeners.emit(Event::Stopped);
        assert_eq!(*order.lock().unwrap(), vec![0, 1, 2]);
        assert_eq!(done.load(Ordering::SeqCst), 0);
        listeners.emit(Event::Done);
        assert_eq!(done.load(Ordering::SeqCst), 1);
    }
}
