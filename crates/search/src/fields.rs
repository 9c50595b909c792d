use catalog::{GroupSummary, Item};

/// A searchable field and its relative weight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub weight: f64,
}

const fn field(name: &'static str, weight: f64) -> FieldSpec {
    FieldSpec { name, weight }
}

/// Item fields, strongest signal first.
pub const ITEM_FIELDS: [FieldSpec; 9] = [
    field("title", 3.0),
    field("collections", 2.5),
    field("series", 2.0),
    field("aliases", 2.0),
    field("place", 1.7),
    field("country", 1.2),
    field("type", 1.1),
    field("keywords", 1.0),
    field("description", 0.8),
];

pub const GROUP_FIELDS: [FieldSpec; 2] = [field("label", 3.0), field("kind", 0.3)];

/// Values of one item field, in `ITEM_FIELDS` order.
pub fn item_values(item: &Item, field: usize) -> Vec<&str> {
    match field {
        0 => vec![item.title.as_str()],
        1 => item.collections.iter().map(String::as_str).collect(),
        2 => item.series.as_deref().into_iter().collect(),
        3 => item.aliases.iter().map(String::as_str).collect(),
        4 => vec![item.place.as_str()],
        5 => item.country.as_deref().into_iter().collect(),
        6 => vec![item.kind.label()],
        7 => item.keywords.iter().map(String::as_str).collect(),
        8 => item.description.as_deref().into_iter().collect(),
        _ => Vec::new(),
    }
}

pub fn group_values(group: &GroupSummary, field: usize) -> Vec<&str> {
    match field {
        0 => vec![group.label.as_str()],
        1 => vec![group.kind.as_str()],
        _ => Vec::new(),
    }
}
