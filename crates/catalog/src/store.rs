use std::collections::{HashMap, HashSet};

use foundation::{GeoBounds, ItemId, ItemIdx, LatLng, MarkerHandle};

use crate::groups::{GroupIndex, GroupKey, GroupKind, GroupSummary};
use crate::item::{Item, Rejection};
use crate::record::RawRecord;

const DERIVED_ID_HEX: usize = 12;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoadReport {
    pub accepted: usize,
    pub rejected: usize,
}

/// The validated item collection plus its group aggregates.
///
/// `load` replaces everything; nothing here is updated incrementally except
/// the marker back references.
#[derive(Debug, Default)]
pub struct ItemStore {
    items: Vec<Item>,
    by_id: HashMap<ItemId, ItemIdx>,
    groups: GroupIndex,
    summaries: Vec<GroupSummary>,
}

impl ItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records<I>(records: I) -> (Self, LoadReport)
    where
        I: IntoIterator<Item = RawRecord>,
    {
        let mut store = Self::new();
        let report = store.load(records);
        (store, report)
    }

    pub fn load<I>(&mut self, records: I) -> LoadReport
    where
        I: IntoIterator<Item = RawRecord>,
    {
        self.items.clear();
        self.by_id.clear();
        self.groups = GroupIndex::new();

        let mut report = LoadReport::default();
        let mut taken: HashSet<ItemId> = HashSet::new();

        for (row, record) in records.into_iter().enumerate() {
            let mut item = match Item::from_record(&record) {
                Ok(item) => item,
                Err(reason) => {
                    report.rejected += 1;
                    log_rejection(row, reason);
                    continue;
                }
            };
            let base = if item.id.as_str().is_empty() {
                derive_id(&item)
            } else {
                item.id.as_str().to_string()
            };
            item.id = unique_id(&base, &mut taken);

            let idx = ItemIdx(self.items.len() as u32);
            self.by_id.insert(item.id.clone(), idx);
            self.groups
                .insert(GroupKey::new(GroupKind::Title, item.title.clone()), idx);
            for c in &item.collections {
                self.groups
                    .insert(GroupKey::new(GroupKind::Collection, c.clone()), idx);
            }
            self.groups
                .insert(GroupKey::new(GroupKind::Type, item.kind.label()), idx);
            self.items.push(item);
            report.accepted += 1;
        }

        self.summaries = self.groups.summaries();
        tracing::info!(
            accepted = report.accepted,
            rejected = report.rejected,
            groups = self.summaries.len(),
            "item store loaded"
        );
        report
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn all_indices(&self) -> Vec<ItemIdx> {
        (0..self.items.len() as u32).map(ItemIdx).collect()
    }

    pub fn get(&self, idx: ItemIdx) -> Option<&Item> {
        self.items.get(idx.index())
    }

    pub fn idx_of(&self, id: &str) -> Option<ItemIdx> {
        self.by_id.get(&ItemId::from(id)).copied()
    }

    pub fn by_id(&self, id: &str) -> Option<&Item> {
        self.idx_of(id).and_then(|idx| self.get(idx))
    }

    pub fn groups(&self) -> &GroupIndex {
        &self.groups
    }

    pub fn summaries(&self) -> &[GroupSummary] {
        &self.summaries
    }

    pub fn group_members(&self, key: &GroupKey) -> Option<&[ItemIdx]> {
        self.groups.members(key)
    }

    pub fn top_groups(&self, kind: GroupKind, n: usize) -> Vec<GroupSummary> {
        self.groups.top(kind, n)
    }

    /// Records the map layer's marker for every item.
    pub fn bind_markers<F>(&mut self, mut make: F)
    where
        F: FnMut(ItemIdx, &Item) -> MarkerHandle,
    {
        for (i, item) in self.items.iter_mut().enumerate() {
            let handle = make(ItemIdx(i as u32), item);
            item.marker = Some(handle);
        }
    }

    /// Marker handles for the given items; unbound items are skipped.
    pub fn markers_for(&self, items: &[ItemIdx]) -> Vec<MarkerHandle> {
        items
            .iter()
            .filter_map(|&idx| self.get(idx).and_then(|it| it.marker))
            .collect()
    }

    pub fn positions_for(&self, items: &[ItemIdx]) -> Vec<LatLng> {
        items
            .iter()
            .filter_map(|&idx| self.get(idx).map(|it| it.position))
            .collect()
    }

    pub fn bounds_of(&self, items: &[ItemIdx]) -> Option<GeoBounds> {
        GeoBounds::from_points(self.positions_for(items))
    }
}

fn log_rejection(row: usize, reason: Rejection) {
    tracing::debug!(row, reason = reason.as_str(), "record rejected");
}

fn derive_id(item: &Item) -> String {
    let key = format!(
        "{}|{}|{}|{}",
        item.title, item.place, item.position.lat, item.position.lng
    );
    let hex = blake3::hash(key.as_bytes()).to_hex();
    hex.as_str()[..DERIVED_ID_HEX].to_string()
}

fn unique_id(base: &str, taken: &mut HashSet<ItemId>) -> ItemId {
    let mut candidate = ItemId::new(base);
    let mut n = 2u32;
    while taken.contains(&candidate) {
        candidate = ItemId::new(format!("{base}-{n}"));
        n += 1;
    }
    taken.insert(candidate.clone());
    candidate
}
