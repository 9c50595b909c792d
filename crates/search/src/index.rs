use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use crate::fields::FieldSpec;
use crate::pattern::Pattern;

/// Floor for a perfect field score so weights still separate exact matches.
const SCORE_FLOOR: f64 = 1e-3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    /// Insertion position of the matched record.
    pub record: u32,
    /// Lower is better; 0.0 is a perfect match on every matched field.
    pub score: f64,
}

impl Eq for Hit {}

impl Ord for Hit {
    fn cmp(&self, other: &Self) -> Ordering {
        self.score
            .total_cmp(&other.score)
            .then_with(|| self.record.cmp(&other.record))
    }
}

impl PartialOrd for Hit {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Weighted multi-field fuzzy index over records added in order.
///
/// Field values are lower-cased and interned, so a query scores every
/// distinct string once no matter how many records share it.
#[derive(Debug, Clone)]
pub struct FuzzyIndex {
    exponents: Vec<f64>,
    threshold: f64,
    values: Vec<String>,
    interned: HashMap<String, u32>,
    /// Per record: (field, value) pairs.
    records: Vec<Vec<(u8, u32)>>,
}

impl FuzzyIndex {
    pub fn new(fields: &[FieldSpec], threshold: f64) -> Self {
        let total: f64 = fields.iter().map(|f| f.weight).sum();
        let exponents = fields
            .iter()
            .map(|f| if total > 0.0 { f.weight / total } else { 0.0 })
            .collect();
        Self {
            exponents,
            threshold,
            values: Vec::new(),
            interned: HashMap::new(),
            records: Vec::new(),
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn distinct_values(&self) -> usize {
        self.values.len()
    }

    /// Appends a record given as (field position, value) pairs.
    pub fn push<'a, I>(&mut self, fields: I) -> u32
    where
        I: IntoIterator<Item = (usize, &'a str)>,
    {
        let mut entry = Vec::new();
        for (field, value) in fields {
            let value = value.trim();
            if value.is_empty() || field >= self.exponents.len() {
                continue;
            }
            let key = value.to_lowercase();
            let id = match self.interned.get(&key) {
                Some(&id) => id,
                None => {
                    let id = self.values.len() as u32;
                    self.values.push(key.clone());
                    self.interned.insert(key, id);
                    id
                }
            };
            entry.push((field as u8, id));
        }
        let record = self.records.len() as u32;
        self.records.push(entry);
        record
    }

    fn value_scores(&self, pattern: &Pattern) -> Vec<Option<f64>> {
        self.values
            .iter()
            .map(|v| {
                let s = pattern.score(v);
                (s <= self.threshold).then_some(s)
            })
            .collect()
    }

    fn score_record(&self, entry: &[(u8, u32)], scores: &[Option<f64>]) -> Option<f64> {
        let mut best: Vec<Option<f64>> = vec![None; self.exponents.len()];
        for &(field, value) in entry {
            if let Some(s) = scores[value as usize] {
                let slot = &mut best[field as usize];
                *slot = Some(slot.map_or(s, |cur: f64| cur.min(s)));
            }
        }
        let mut total = 1.0;
        let mut matched = false;
        for (field, s) in best.into_iter().enumerate() {
            if let Some(s) = s {
                matched = true;
                total *= s.max(SCORE_FLOOR).powf(self.exponents[field]);
            }
        }
        matched.then_some(total)
    }

    /// Every match, best first, ties by insertion order.
    pub fn search(&self, query: &str) -> Vec<Hit> {
        let Some(pattern) = Pattern::new(query) else {
            return Vec::new();
        };
        let scores = self.value_scores(&pattern);
        let mut hits: Vec<Hit> = self
            .records
            .iter()
            .enumerate()
            .filter_map(|(i, entry)| {
                self.score_record(entry, &scores).map(|score| Hit {
                    record: i as u32,
                    score,
                })
            })
            .collect();
        hits.sort();
        hits
    }

    /// The best `n` matches in the same order `search` would give them,
    /// without sorting the full match set.
    pub fn search_top(&self, query: &str, n: usize) -> Vec<Hit> {
        if n == 0 {
            return Vec::new();
        }
        let Some(pattern) = Pattern::new(query) else {
            return Vec::new();
        };
        let scores = self.value_scores(&pattern);
        let mut heap: BinaryHeap<Hit> = BinaryHeap::with_capacity(n + 1);
        for (i, entry) in self.records.iter().enumerate() {
            let Some(score) = self.score_record(entry, &scores) else {
                continue;
            };
            let hit = Hit {
                record: i as u32,
                score,
            };
            if heap.len() < n {
                heap.push(hit);
            } else if heap.peek().is_some_and(|worst| hit < *worst) {
                heap.pop();
                heap.push(hit);
            }
        }
        heap.into_sorted_vec()
    }
}
