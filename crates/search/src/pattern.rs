use std::collections::HashMap;

/// Longest pattern the bit-parallel matcher handles; longer queries are cut.
pub const MAX_PATTERN_CHARS: usize = 64;

/// A lower-cased query compiled for approximate substring matching.
///
/// Uses Myers' bit-vector edit distance in its semi-global form: the result
/// is the fewest edits turning the pattern into *some* substring of the text.
#[derive(Debug, Clone)]
pub struct Pattern {
    len: usize,
    ascii: [u64; 128],
    other: HashMap<char, u64>,
    last: u64,
}

impl Pattern {
    /// Returns `None` for a blank query.
    pub fn new(query: &str) -> Option<Pattern> {
        let chars: Vec<char> = query
            .trim()
            .chars()
            .flat_map(char::to_lowercase)
            .take(MAX_PATTERN_CHARS)
            .collect();
        if chars.is_empty() {
            return None;
        }
        let mut ascii = [0u64; 128];
        let mut other = HashMap::new();
        for (i, &c) in chars.iter().enumerate() {
            let bit = 1u64 << i;
            if c.is_ascii() {
                ascii[c as usize] |= bit;
            } else {
                *other.entry(c).or_insert(0) |= bit;
            }
        }
        Some(Pattern {
            len: chars.len(),
            ascii,
            other,
            last: 1u64 << (chars.len() - 1),
        })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn peq(&self, c: char) -> u64 {
        if c.is_ascii() {
            self.ascii[c as usize]
        } else {
            self.other.get(&c).copied().unwrap_or(0)
        }
    }

    /// Minimum edit distance between the pattern and any substring of
    /// `text`. `text` is expected to be lower-cased already.
    pub fn distance(&self, text: &str) -> usize {
        let mask = if self.len == 64 {
            u64::MAX
        } else {
            (1u64 << self.len) - 1
        };
        let mut pv = mask;
        let mut mv = 0u64;
        let mut score = self.len;
        let mut best = score;

        for c in text.chars() {
            let eq = self.peq(c);
            let xv = eq | mv;
            let xh = (((eq & pv).wrapping_add(pv)) ^ pv) | eq;
            let mut ph = mv | !(xh | pv);
            let mut mh = pv & xh;
            if ph & self.last != 0 {
                score += 1;
            } else if mh & self.last != 0 {
                score -= 1;
            }
            // Free leading text: no carry into the first row.
            ph <<= 1;
            mh <<= 1;
            pv = (mh | !(xv | ph)) & mask;
            mv = ph & xv & mask;
            best = best.min(score);
            if best == 0 {
                break;
            }
        }
        best
    }

    /// Edit distance normalized by pattern length: 0.0 is exact, 1.0 is no
    /// useful overlap.
    pub fn score(&self, text: &str) -> f64 {
        self.distance(text) as f64 / self.len as f64
    }
}
