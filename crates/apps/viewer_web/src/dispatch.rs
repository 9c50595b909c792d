//! Single-owner event dispatch for page callbacks.
//!
//! JS can call back into the module while a handler is still running, for
//! example a map that fires `moveend` synchronously from `setView`. Those
//! nested events are queued and handled, in arrival order, before the outer
//! call releases the state.

use std::cell::RefCell;
use std::collections::VecDeque;

pub struct Dispatcher<S, E> {
    state: RefCell<Option<S>>,
    deferred: RefCell<VecDeque<E>>,
}

impl<S, E> Dispatcher<S, E> {
    pub const fn new() -> Self {
        Self {
            state: RefCell::new(None),
            deferred: RefCell::new(VecDeque::new()),
        }
    }

    pub fn install(&self, state: S) {
        *self.state.borrow_mut() = Some(state);
    }

    /// Runs `handle` for `event` and for everything queued meanwhile, then
    /// `settle` once. Returns `false` when the event was queued behind a
    /// running handler or nothing is installed yet.
    pub fn dispatch(&self, event: E, handle: impl Fn(&mut S, E), settle: impl FnOnce(&S)) -> bool {
        let Ok(mut slot) = self.state.try_borrow_mut() else {
            self.deferred.borrow_mut().push_back(event);
            return false;
        };
        let Some(state) = slot.as_mut() else {
            return false;
        };
        let mut next = Some(event);
        while let Some(event) = next {
            handle(state, event);
            next = self.deferred.borrow_mut().pop_front();
        }
        settle(state);
        true
    }

    /// Read access for setup code. `None` inside a handler or before install.
    pub fn with<R>(&self, f: impl FnOnce(&S) -> R) -> Option<R> {
        let slot = self.state.try_borrow().ok()?;
        slot.as_ref().map(f)
    }
}

#[cfg(test)]
mod tests {
    use super::Dispatcher;
    use pretty_assertions::assert_eq;

    thread_local! {
        static LOG: Dispatcher<Vec<u32>, u32> = const { Dispatcher::new() };
    }

    fn handle(seen: &mut Vec<u32>, event: u32) {
        seen.push(event);
        if event == 1 {
            let queued = LOG.with(|d| d.dispatch(10, handle, |_| {}));
            assert!(!queued);
            LOG.with(|d| d.dispatch(11, handle, |_| {}));
        }
    }

    #[test]
    fn nested_events_run_after_the_outer_handler() {
        LOG.with(|d| d.install(Vec::new()));
        let mut settled = Vec::new();
        assert!(LOG.with(|d| d.dispatch(1, handle, |s| settled = s.clone())));
        assert_eq!(settled, vec![1, 10, 11]);

        assert!(LOG.with(|d| d.dispatch(2, handle, |_| {})));
        assert_eq!(LOG.with(|d| d.with(|s| s.clone())), Some(vec![1, 10, 11, 2]));
    }

    #[test]
    fn events_before_install_are_not_handled() {
        let d: Dispatcher<Vec<u32>, u32> = Dispatcher::new();
        assert!(!d.dispatch(1, handle_plain, |_| {}));
        assert_eq!(d.with(|s| s.len()), None);
    }

    fn handle_plain(seen: &mut Vec<u32>, event: u32) {
        seen.push(event);
    }
}
