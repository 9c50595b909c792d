use std::fmt;
use std::str::FromStr;

use foundation::{ItemId, LatLng, MarkerHandle};
use serde::{Deserialize, Serialize};

use crate::groups::{GroupKey, GroupKind};
use crate::record::RawRecord;

/// Classification tag. Free-form source values are folded into this set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ItemType {
    #[serde(rename = "Film")]
    Film,
    #[serde(rename = "TV")]
    Tv,
    #[serde(rename = "Music Video")]
    MusicVideo,
    #[serde(rename = "Misc")]
    Misc,
}

impl ItemType {
    pub const ALL: [ItemType; 4] = [
        ItemType::Film,
        ItemType::Tv,
        ItemType::MusicVideo,
        ItemType::Misc,
    ];

    /// Folds a source cell into a known type. Unknown and empty values are `Misc`.
    pub fn normalize(raw: &str) -> ItemType {
        match raw.trim().to_ascii_lowercase().as_str() {
            "film" | "movie" | "movies" | "films" => ItemType::Film,
            "tv" | "tv show" | "tv shows" | "television" => ItemType::Tv,
            "music video" | "music videos" | "mv" => ItemType::MusicVideo,
            _ => ItemType::Misc,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ItemType::Film => "Film",
            ItemType::Tv => "TV",
            ItemType::MusicVideo => "Music Video",
            ItemType::Misc => "Misc",
        }
    }

    pub fn badge(self) -> &'static str {
        match self {
            ItemType::Film => "F",
            ItemType::Tv => "TV",
            ItemType::MusicVideo => "MV",
            ItemType::Misc => "?",
        }
    }

    /// Marker colour as a CSS hex string.
    pub fn color(self) -> &'static str {
        match self {
            ItemType::Film => "#2563eb",
            ItemType::Tv => "#16a34a",
            ItemType::MusicVideo => "#db2777",
            ItemType::Misc => "#6b7280",
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ItemType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(ItemType::normalize(s))
    }
}

/// Why a raw record was excluded from the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    MissingTitle,
    MissingPlace,
    InvalidCoordinates,
}

impl Rejection {
    pub fn as_str(self) -> &'static str {
        match self {
            Rejection::MissingTitle => "missing title",
            Rejection::MissingPlace => "missing place",
            Rejection::InvalidCoordinates => "invalid coordinates",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub id: ItemId,
    pub title: String,
    pub kind: ItemType,
    pub place: String,
    pub country: Option<String>,
    pub description: Option<String>,
    pub series: Option<String>,
    pub collections: Vec<String>,
    pub keywords: Vec<String>,
    pub aliases: Vec<String>,
    pub images: Vec<String>,
    pub position: LatLng,
    /// Set by the map layer once it has created this item's marker.
    pub marker: Option<MarkerHandle>,
}

impl Item {
    /// Normalizes one record. The id is left empty when the record carries
    /// none; the store derives one after validation.
    pub fn from_record(record: &RawRecord) -> Result<Item, Rejection> {
        let title = record.text("title").ok_or(Rejection::MissingTitle)?;
        let place = record.text("place").ok_or(Rejection::MissingPlace)?;
        let lat = record.number("lat");
        let lng = record.number("lng").or_else(|| record.number("lon"));
        let position = match (lat, lng) {
            (Some(lat), Some(lng)) => {
                LatLng::finite(lat, lng).ok_or(Rejection::InvalidCoordinates)?
            }
            _ => return Err(Rejection::InvalidCoordinates),
        };

        let kind = match record.text("type") {
            Some(t) => ItemType::normalize(&t),
            None => record.fallback_type().unwrap_or(ItemType::Misc),
        };

        let mut aliases = record.list("aliases");
        aliases.extend(record.list("alias"));

        Ok(Item {
            id: ItemId::new(record.text("id").unwrap_or_default()),
            title,
            kind,
            place,
            country: record.text("country"),
            description: record.text("description"),
            series: record.text("series"),
            collections: record.list("collections"),
            keywords: record.list("keywords"),
            aliases,
            images: record.list("images"),
            position,
            marker: None,
        })
    }

    /// Group descriptors shown as clickable tags in the detail overlay.
    pub fn tags(&self) -> Vec<GroupKey> {
        let mut tags = Vec::with_capacity(2 + self.collections.len());
        tags.push(GroupKey::new(GroupKind::Title, self.title.clone()));
        tags.push(GroupKey::new(GroupKind::Type, self.kind.label()));
        for c in &self.collections {
            tags.push(GroupKey::new(GroupKind::Collection, c.clone()));
        }
        tags
    }
}
