use std::fmt;

use catalog::{GroupKey, GroupKind};

use crate::collaborators::FilterObserver;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterKind {
    Group(GroupKind),
    /// Free-text results; the label is the raw query.
    Search,
}

impl FilterKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FilterKind::Group(kind) => kind.as_str(),
            FilterKind::Search => "Search",
        }
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What subset of items is currently emphasized.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FilterDescriptor {
    pub kind: FilterKind,
    pub label: String,
}

impl FilterDescriptor {
    pub fn group(key: &GroupKey) -> Self {
        Self {
            kind: FilterKind::Group(key.kind),
            label: key.label.clone(),
        }
    }

    pub fn search(query: impl Into<String>) -> Self {
        Self {
            kind: FilterKind::Search,
            label: query.into(),
        }
    }

    pub fn group_key(&self) -> Option<GroupKey> {
        match self.kind {
            FilterKind::Group(kind) => Some(GroupKey::new(kind, self.label.clone())),
            FilterKind::Search => None,
        }
    }
}

impl fmt::Display for FilterDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.label)
    }
}

/// The single live filter. Every change is pushed to the observer before
/// `set`/`clear` return.
#[derive(Default)]
pub struct FilterState {
    current: Option<FilterDescriptor>,
    observer: Option<Box<dyn FilterObserver>>,
}

impl fmt::Debug for FilterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterState")
            .field("current", &self.current)
            .field("observed", &self.observer.is_some())
            .finish()
    }
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces any previous observer.
    pub fn set_observer(&mut self, observer: Box<dyn FilterObserver>) {
        self.observer = Some(observer);
    }

    pub fn get(&self) -> Option<&FilterDescriptor> {
        self.current.as_ref()
    }

    pub fn set(&mut self, descriptor: FilterDescriptor) {
        self.current = Some(descriptor);
        self.notify();
    }

    pub fn clear(&mut self) {
        self.current = None;
        self.notify();
    }

    fn notify(&mut self) {
        if let Some(observer) = self.observer.as_mut() {
            observer.filter_changed(self.current.as_ref());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{FilterDescriptor, FilterKind, FilterState};
    use crate::testing::RecordingFilterObserver;
    use catalog::{GroupKey, GroupKind};
    use pretty_assertions::assert_eq;

    #[test]
    fn set_and_clear_notify_synchronously() {
        let observer = RecordingFilterObserver::default();
        let mut state = FilterState::new();
        state.set_observer(Box::new(observer.clone()));

        state.set(FilterDescriptor::search("paris"));
        assert_eq!(observer.seen(), vec![Some(FilterDescriptor::search("paris"))]);

        let key = GroupKey::new(GroupKind::Collection, "Noir");
        state.set(FilterDescriptor::group(&key));
        state.clear();
        assert_eq!(observer.seen().len(), 3);
        assert_eq!(observer.seen()[1].as_ref().map(|d| d.kind), Some(FilterKind::Group(GroupKind::Collection)));
        assert_eq!(observer.seen()[2], None);
        assert_eq!(state.get(), None);
    }

    #[test]
    fn group_descriptor_maps_back_to_key() {
        let key = GroupKey::new(GroupKind::Title, "Skyfall");
        let d = FilterDescriptor::group(&key);
        assert_eq!(d.group_key(), Some(key));
        assert_eq!(d.to_string(), "Title: Skyfall");
        assert_eq!(FilterDescriptor::search("x").group_key(), None);
    }
}
