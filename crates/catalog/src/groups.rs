use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use foundation::ItemIdx;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Axis along which items are bucketed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum GroupKind {
    Title,
    Collection,
    Type,
}

impl GroupKind {
    pub const ALL: [GroupKind; 3] = [GroupKind::Title, GroupKind::Collection, GroupKind::Type];

    pub fn as_str(self) -> &'static str {
        match self {
            GroupKind::Title => "Title",
            GroupKind::Collection => "Collection",
            GroupKind::Type => "Type",
        }
    }
}

impl fmt::Display for GroupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown group kind '{0}'")]
pub struct UnknownGroupKind(pub String);

impl FromStr for GroupKind {
    type Err = UnknownGroupKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Title" => Ok(GroupKind::Title),
            "Collection" => Ok(GroupKind::Collection),
            "Type" => Ok(GroupKind::Type),
            other => Err(UnknownGroupKind(other.to_string())),
        }
    }
}

/// Group identity: the pair (kind, label). Displays as `kind::label`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GroupKey {
    pub kind: GroupKind,
    pub label: String,
}

impl GroupKey {
    pub fn new(kind: GroupKind, label: impl Into<String>) -> Self {
        Self {
            kind,
            label: label.into(),
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.kind, self.label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupSummary {
    pub kind: GroupKind,
    pub label: String,
    pub count: usize,
}

impl GroupSummary {
    pub fn key(&self) -> GroupKey {
        GroupKey::new(self.kind, self.label.clone())
    }
}

/// Group key to members, in ingestion order.
#[derive(Debug, Default, Clone)]
pub struct GroupIndex {
    slots: HashMap<GroupKey, usize>,
    keys: Vec<GroupKey>,
    members: Vec<Vec<ItemIdx>>,
}

impl GroupIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `item` to the group. Repeated labels for one item are ignored.
    pub fn insert(&mut self, key: GroupKey, item: ItemIdx) {
        let slot = match self.slots.get(&key) {
            Some(&slot) => slot,
            None => {
                let slot = self.keys.len();
                self.slots.insert(key.clone(), slot);
                self.keys.push(key);
                self.members.push(Vec::new());
                slot
            }
        };
        let list = &mut self.members[slot];
        if list.last() != Some(&item) {
            list.push(item);
        }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn contains(&self, key: &GroupKey) -> bool {
        self.slots.contains_key(key)
    }

    pub fn members(&self, key: &GroupKey) -> Option<&[ItemIdx]> {
        self.slots.get(key).map(|&slot| self.members[slot].as_slice())
    }

    /// Summaries grouped by kind (Title, Collection, Type), first-seen order
    /// within each kind.
    pub fn summaries(&self) -> Vec<GroupSummary> {
        let mut out = Vec::with_capacity(self.keys.len());
        for kind in GroupKind::ALL {
            for (key, members) in self.keys.iter().zip(&self.members) {
                if key.kind == kind {
                    out.push(GroupSummary {
                        kind,
                        label: key.label.clone(),
                        count: members.len(),
                    });
                }
            }
        }
        out
    }

    /// Largest groups of one kind, ties by label.
    pub fn top(&self, kind: GroupKind, n: usize) -> Vec<GroupSummary> {
        let mut picked: Vec<GroupSummary> = self
            .keys
            .iter()
            .zip(&self.members)
            .filter(|(k, _)| k.kind == kind)
            .map(|(k, m)| GroupSummary {
                kind,
                label: k.label.clone(),
                count: m.len(),
            })
            .collect();
        picked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
        picked.truncate(n);
        picked
    }
}
