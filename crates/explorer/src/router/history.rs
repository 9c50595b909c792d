use std::cell::RefCell;
use std::rc::Rc;

use crate::collaborators::UrlHistory;

/// Whether a URL write adds a history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryMode {
    Push,
    Replace,
}

#[derive(Debug)]
struct Entries {
    stack: Vec<String>,
    cursor: usize,
}

/// In-process history stack with browser push/replace/back/forward rules.
///
/// Clones share one stack, so a test can keep a handle while the router
/// owns another.
#[derive(Debug, Clone)]
pub struct MemoryHistory {
    inner: Rc<RefCell<Entries>>,
}

impl MemoryHistory {
    pub fn new(initial_query: &str) -> Self {
        let initial = initial_query.strip_prefix('?').unwrap_or(initial_query);
        Self {
            inner: Rc::new(RefCell::new(Entries {
                stack: vec![initial.to_string()],
                cursor: 0,
            })),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn entries(&self) -> Vec<String> {
        self.inner.borrow().stack.clone()
    }

    /// Moves one entry back. Returns `false` at the start of history.
    pub fn back(&self) -> bool {
        let mut e = self.inner.borrow_mut();
        if e.cursor == 0 {
            return false;
        }
        e.cursor -= 1;
        true
    }

    pub fn forward(&self) -> bool {
        let mut e = self.inner.borrow_mut();
        if e.cursor + 1 >= e.stack.len() {
            return false;
        }
        e.cursor += 1;
        true
    }
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self::new("")
    }
}

impl UrlHistory for MemoryHistory {
    fn query(&self) -> String {
        let e = self.inner.borrow();
        e.stack[e.cursor].clone()
    }

    fn push(&mut self, query: &str) {
        let mut e = self.inner.borrow_mut();
        let keep = e.cursor + 1;
        e.stack.truncate(keep);
        e.stack.push(query.to_string());
        e.cursor = keep;
    }

    fn replace(&mut self, query: &str) {
        let mut e = self.inner.borrow_mut();
        let at = e.cursor;
        e.stack[at] = query.to_string();
    }
}
