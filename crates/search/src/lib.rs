//! Fuzzy retrieval over an [`ItemStore`]: one index over items, one over
//! group summaries.

pub mod fields;
pub mod index;
pub mod pattern;

use catalog::{GroupSummary, ItemStore};
use foundation::ItemIdx;

pub use fields::{FieldSpec, GROUP_FIELDS, ITEM_FIELDS};
pub use index::{FuzzyIndex, Hit};
pub use pattern::{MAX_PATTERN_CHARS, Pattern};

pub const DEFAULT_THRESHOLD: f64 = 0.35;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ItemHit {
    pub item: ItemIdx,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupHit {
    pub group: GroupSummary,
    pub score: f64,
}

/// Both indexes, built together from one store snapshot.
#[derive(Debug, Clone)]
pub struct SearchIndex {
    items: FuzzyIndex,
    groups: FuzzyIndex,
    summaries: Vec<GroupSummary>,
}

impl SearchIndex {
    pub fn build(store: &ItemStore, threshold: f64) -> Self {
        let index = Self {
            items: build_item_index(store, threshold),
            groups: build_group_index(store.summaries(), threshold),
            summaries: store.summaries().to_vec(),
        };
        tracing::info!(
            items = index.items.len(),
            item_values = index.items.distinct_values(),
            groups = index.groups.len(),
            "search index built"
        );
        index
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Items best first. `limit` of `None` returns every match.
    pub fn search_items(&self, query: &str, limit: Option<usize>) -> Vec<ItemHit> {
        let hits = match limit {
            Some(n) => self.items.search_top(query, n),
            None => self.items.search(query),
        };
        hits.into_iter()
            .map(|h| ItemHit {
                item: ItemIdx(h.record),
                score: h.score,
            })
            .collect()
    }

    pub fn search_groups(&self, query: &str, limit: Option<usize>) -> Vec<GroupHit> {
        let hits = match limit {
            Some(n) => self.groups.search_top(query, n),
            None => self.groups.search(query),
        };
        hits.into_iter()
            .filter_map(|h| {
                self.summaries
                    .get(h.record as usize)
                    .map(|group| GroupHit {
                        group: group.clone(),
                        score: h.score,
                    })
            })
            .collect()
    }
}

pub fn build_item_index(store: &ItemStore, threshold: f64) -> FuzzyIndex {
    let mut index = FuzzyIndex::new(&ITEM_FIELDS, threshold);
    for item in store.items() {
        let values = (0..ITEM_FIELDS.len())
            .flat_map(|f| fields::item_values(item, f).into_iter().map(move |v| (f, v)));
        index.push(values);
    }
    index
}

pub fn build_group_index(summaries: &[GroupSummary], threshold: f64) -> FuzzyIndex {
    let mut index = FuzzyIndex::new(&GROUP_FIELDS, threshold);
    for group in summaries {
        let values = (0..GROUP_FIELDS.len())
            .flat_map(|f| fields::group_values(group, f).into_iter().map(move |v| (f, v)));
        index.push(values);
    }
    index
}
