use std::cell::Cell;
use std::rc::Rc;

/// Shared "applying state from the URL" marker.
///
/// Outbound observers check it and stay silent while it is set. It can only
/// be raised through [`ApplyFlag::acquire`], whose guard lowers it again on
/// every exit path, panics included.
#[derive(Debug, Clone, Default)]
pub struct ApplyFlag(Rc<Cell<bool>>);

impl ApplyFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_set(&self) -> bool {
        self.0.get()
    }

    #[must_use = "the flag drops back as soon as the guard is dropped"]
    pub fn acquire(&self) -> ApplyGuard {
        let previous = self.0.replace(true);
        ApplyGuard {
            flag: Rc::clone(&self.0),
            previous,
        }
    }
}

#[derive(Debug)]
pub struct ApplyGuard {
    flag: Rc<Cell<bool>>,
    previous: bool,
}

impl Drop for ApplyGuard {
    fn drop(&mut self) {
        self.flag.set(self.previous);
    }
}
