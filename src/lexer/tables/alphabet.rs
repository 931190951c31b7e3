// src/lexer/tables/alphabet.rs
// Disjoint range alphabet. Every DFA edge is labelled with exactly one of
// these ranges, which is what makes the transition table deterministic.
use std::ops;

use hashbrown::HashMap;

use super::expr::Range;

#[derive(Debug, Clone, Default)]
pub struct RangeAlphabet {
    /// Sorted, pairwise disjoint. Index = alphabet symbol id.
    ranges: Vec<Range>,
    /// Original ranges that were cut into more than one symbol.
    expansions: HashMap<Range, ops::Range<u32>>,
}

impl RangeAlphabet {
    /// Sweeps the sorted endpoints of `input`, cutting at every boundary
    /// while at least one interval is open.
    pub fn build(input: &[Range]) -> Self {
        // (position, +1 open / -1 close); ends are stored one past max so
        // adjacent ranges share a cut point.
        let mut events: Vec<(u64, i32)> = Vec::with_capacity(input.len() * 2);
        for r in input.iter().filter(|r| r.min <= r.max) {
            events.push((r.min as u64, 1));
            events.push((r.max as u64 + 1, -1));
        }
        events.sort_unstable();

        let mut ranges = Vec::new();
        let mut open = 0i32;
        let mut prev = 0u64;
        let mut i = 0;
        while i < events.len() {
            let pos = events[i].0;
            if open > 0 && prev < pos {
                ranges.push(Range::new(prev as u32, (pos - 1) as u32));
            }
            while i < events.len() && events[i].0 == pos {
                open += events[i].1;
                i += 1;
            }
            prev = pos;
        }

        let mut alphabet = Self {
            ranges,
            expansions: HashMap::new(),
        };
        for r in input.iter().filter(|r| r.min <= r.max) {
            let span = alphabet.locate(*r);
            if span.len() > 1 {
                alphabet.expansions.insert(*r, span);
            }
        }
        log::debug!(
            "[tables] alphabet: {} input ranges -> {} disjoint ({} split)",
            input.len(),
            alphabet.ranges.len(),
            alphabet.expansions.len()
        );
        alphabet
    }

    fn locate(&self, r: Range) -> ops::Range<u32> {
        let lo = self.ranges.partition_point(|d| d.min < r.min);
        let hi = self.ranges.partition_point(|d| d.max <= r.max);
        lo as u32..hi.max(lo) as u32
    }

    /// Symbol ids whose ranges exactly tile `r`.
    ///
    /// `r` must be one of the ranges the alphabet was built from (or a
    /// union of whole symbols); anything else is clipped to the symbols
    /// fully inside it.
    pub fn expand(&self, r: Range) -> ops::Range<u32> {
        if r.min > r.max {
            return 0..0;
        }
        match self.expansions.get(&r) {
            Some(span) => span.clone(),
            None => self.locate(r),
        }
    }

    /// Symbol id of the range containing `c`.
    pub fn symbol_of(&self, c: u32) -> Option<u32> {
        symbol_in(&self.ranges, c)
    }

    pub fn ranges(&self) -> &[Range] {
        &self.ranges
    }

    pub fn range(&self, symbol: u32) -> Range {
        self.ranges[symbol as usize]
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Original ranges that overlap-normalization split, with their symbols.
    pub fn expansions(&self) -> impl Iterator<Item = (&Range, &ops::Range<u32>)> {
        self.expansions.iter()
    }
}

/// Binary search over a sorted disjoint range list; shared by the DFA and
/// the exported tables.
pub fn symbol_in(ranges: &[Range], c: u32) -> Option<u32> {
    let i = ranges.partition_point(|d| d.max < c);
    match ranges.get(i) {
        Some(d) if d.contains(c) => Some(i as u32),
        _ => None,
    }
}
