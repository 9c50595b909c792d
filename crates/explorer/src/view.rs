use catalog::{GroupKey, GroupKind, Item, ItemStore};
use foundation::{ItemId, ItemIdx};
use search::SearchIndex;

use crate::collaborators::{FilterObserver, MarkerLayer, ResultsView};
use crate::config::Limits;
use crate::filter::{FilterDescriptor, FilterState};
use crate::guard::ApplyFlag;
use crate::view_state::Tab;

/// A state change the URL has to follow.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewChange {
    /// Query or tab changed; any group filter is gone.
    Search { query: String, tab: Tab },
    /// The query box was emptied. The map filter is left as it was.
    QueryCleared,
    /// A group filter was applied. `tab` is set when the tab switched with it.
    Filter { key: GroupKey, tab: Option<Tab> },
    Reset,
    DetailOpened(ItemId),
    DetailClosed,
    ResultsOverlay(bool),
}

/// Tab, query, filter and result rendering.
///
/// Changes the URL must follow are queued as [`ViewChange`]s for the router
/// to drain, unless the shared [`ApplyFlag`] says the change is itself being
/// applied from the URL.
pub struct ViewController {
    limits: Limits,
    store: ItemStore,
    index: Option<SearchIndex>,
    tab: Tab,
    query: String,
    filter: FilterState,
    results_open: bool,
    open_item: Option<ItemId>,
    results: Box<dyn ResultsView>,
    markers: Box<dyn MarkerLayer>,
    applying: ApplyFlag,
    changes: Vec<ViewChange>,
}

impl ViewController {
    pub fn new(limits: Limits, results: Box<dyn ResultsView>, markers: Box<dyn MarkerLayer>) -> Self {
        Self {
            limits,
            store: ItemStore::new(),
            index: None,
            tab: Tab::Groups,
            query: String::new(),
            filter: FilterState::new(),
            results_open: false,
            open_item: None,
            results,
            markers,
            applying: ApplyFlag::new(),
            changes: Vec::new(),
        }
    }

    pub fn set_filter_observer(&mut self, observer: Box<dyn FilterObserver>) {
        self.filter.set_observer(observer);
    }

    pub fn apply_flag(&self) -> &ApplyFlag {
        &self.applying
    }

    pub fn set_store(&mut self, store: ItemStore) {
        self.store = store;
        self.open_item = None;
        self.show_all();
    }

    pub fn set_index(&mut self, index: SearchIndex) {
        self.index = Some(index);
    }

    pub fn store(&self) -> &ItemStore {
        &self.store
    }

    pub fn index(&self) -> Option<&SearchIndex> {
        self.index.as_ref()
    }

    pub fn limits(&self) -> Limits {
        self.limits
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn filter(&self) -> Option<&FilterDescriptor> {
        self.filter.get()
    }

    pub fn results_open(&self) -> bool {
        self.results_open
    }

    pub fn open_item(&self) -> Option<&ItemId> {
        self.open_item.as_ref()
    }

    pub fn take_changes(&mut self) -> Vec<ViewChange> {
        std::mem::take(&mut self.changes)
    }

    fn emit(&mut self, change: ViewChange) {
        if self.applying.is_set() {
            tracing::trace!(?change, "suppressed while applying from url");
            return;
        }
        self.changes.push(change);
    }

    pub fn set_active_tab(&mut self, tab: Tab) {
        self.switch_tab(tab);
        self.emit(ViewChange::Search {
            query: self.query.clone(),
            tab,
        });
        if !self.query.is_empty() {
            self.execute_query();
        }
    }

    fn switch_tab(&mut self, tab: Tab) {
        self.tab = tab;
        self.results.set_active_tab(tab);
    }

    /// Runs `raw` against the active tab's index.
    ///
    /// An empty query only closes the results overlay; the map keeps its
    /// current filter.
    pub fn run_search(&mut self, raw: &str) {
        let query = raw.trim().to_string();
        self.results.set_query_text(&query);
        self.query = query;

        if self.query.is_empty() {
            self.set_results_open(false);
            self.emit(ViewChange::QueryCleared);
            return;
        }

        self.set_results_open(true);
        self.execute_query();
        self.emit(ViewChange::Search {
            query: self.query.clone(),
            tab: self.tab,
        });
    }

    fn execute_query(&mut self) {
        let Some(index) = self.index.as_ref() else {
            tracing::debug!(query = %self.query, "search before index is ready");
            return;
        };
        match self.tab {
            Tab::Groups => {
                let hits = index.search_groups(&self.query, Some(self.limits.group_results));
                let groups: Vec<_> = hits.into_iter().map(|h| h.group).collect();
                self.results.render_groups(&groups);
            }
            Tab::Places => {
                let hits: Vec<ItemIdx> = index
                    .search_items(&self.query, None)
                    .into_iter()
                    .map(|h| h.item)
                    .collect();
                let shown = &hits[..hits.len().min(self.limits.place_results)];
                let items: Vec<&Item> = shown.iter().filter_map(|&i| self.store.get(i)).collect();
                self.results.render_places(&items);
                self.filter.set(FilterDescriptor::search(self.query.clone()));
                self.restrict_map(&hits);
            }
        }
    }

    fn restrict_map(&mut self, items: &[ItemIdx]) {
        let markers = self.store.markers_for(items);
        let fit = if !items.is_empty() && items.len() <= self.limits.fit_bounds_max {
            self.store.bounds_of(items)
        } else {
            None
        };
        self.markers.show_markers(&markers, fit);
    }

    fn show_all(&mut self) {
        let all = self.store.all_indices();
        let markers = self.store.markers_for(&all);
        self.markers.show_markers(&markers, None);
    }

    /// Sets the filter and map to exactly the group's members. A group the
    /// store does not know changes nothing and returns `false`.
    fn filter_to_group(&mut self, key: &GroupKey) -> bool {
        let Some(members) = self.store.group_members(key).map(<[ItemIdx]>::to_vec) else {
            tracing::debug!(group = %key, "filter names an unknown group");
            return false;
        };
        self.query.clear();
        self.results.set_query_text("");
        self.filter.set(FilterDescriptor::group(key));
        self.restrict_map(&members);
        true
    }

    pub fn apply_group_filter(&mut self, key: &GroupKey) -> bool {
        if !self.store.groups().contains(key) {
            tracing::debug!(group = %key, "filter names an unknown group");
            return false;
        }
        self.set_results_open(false);
        self.filter_to_group(key);
        self.emit(ViewChange::Filter {
            key: key.clone(),
            tab: None,
        });
        true
    }

    /// Applies the group filter, then lists its places on the Places tab.
    pub fn filter_group_and_list_places(&mut self, key: &GroupKey) -> bool {
        if !self.filter_to_group(key) {
            return false;
        }
        self.switch_tab(Tab::Places);

        let members = self.store.group_members(key).unwrap_or(&[]);
        let total = members.len();
        let items: Vec<&Item> = members
            .iter()
            .take(self.limits.group_places)
            .filter_map(|&i| self.store.get(i))
            .collect();
        self.results.render_group_places(key, &items, total);

        self.set_results_open(true);
        self.emit(ViewChange::Filter {
            key: key.clone(),
            tab: Some(Tab::Places),
        });
        true
    }

    pub fn reset_all(&mut self) {
        self.query.clear();
        self.results.set_query_text("");
        self.filter.clear();
        self.show_all();
        self.results_open = false;
        self.results.set_results_open(false);
        if self.open_item.take().is_some() {
            self.results.hide_detail();
        }
        self.browse();
        self.emit(ViewChange::Reset);
    }

    /// Default Groups listing: the largest titles and collections.
    pub fn browse(&mut self) {
        let n = self.limits.group_results;
        let mut groups = self.store.top_groups(GroupKind::Title, n);
        groups.extend(self.store.top_groups(GroupKind::Collection, n));
        self.results.render_groups(&groups);
    }

    pub fn set_results_open(&mut self, open: bool) {
        self.results.set_results_open(open);
        if self.results_open != open {
            self.results_open = open;
            self.emit(ViewChange::ResultsOverlay(open));
        }
    }

    /// Opens the detail overlay. Unknown ids are ignored and return `false`.
    pub fn open_detail(&mut self, id: &str) -> bool {
        let Some(item) = self.store.by_id(id) else {
            return false;
        };
        self.results.show_detail(item);
        let id = item.id.clone();
        self.open_item = Some(id.clone());
        self.emit(ViewChange::DetailOpened(id));
        true
    }

    pub fn close_detail(&mut self) {
        if self.open_item.take().is_some() {
            self.results.hide_detail();
            self.emit(ViewChange::DetailClosed);
        }
    }

    /// A tag in the detail overlay: closes the detail and filters to the
    /// tagged group.
    pub fn apply_tag(&mut self, key: &GroupKey) -> bool {
        if !self.store.groups().contains(key) {
            return false;
        }
        if self.open_item.take().is_some() {
            self.results.hide_detail();
        }
        self.apply_group_filter(key)
    }
}
