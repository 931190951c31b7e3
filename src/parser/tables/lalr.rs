// src/parser/tables/lalr.rs
use std::{collections::BTreeMap, time::Instant};

use hashbrown::HashMap;

use super::lr1::{Lr1Automaton, LrState};

/// Merges canonical LR(1) states that share an LR(0) core.
///
/// The first state seen with a core represents it; every other state's items
/// are unioned in and every edge is redirected to its target's
/// representative. Merging can introduce reduce/reduce conflicts the
/// canonical automaton did not have; they are left for the table builder.
pub fn merge_lalr(lr1: &Lr1Automaton) -> Lr1Automaton {
    let t0 = Instant::now();
    let mut by_core: HashMap<Vec<(u32, u32)>, u32> = HashMap::new();
    let mut rep = vec![0u32; lr1.states.len()];
    let mut merged: Vec<LrState> = Vec::new();

    for (i, st) in lr1.states.iter().enumerate() {
        let id = *by_core.entry(st.core()).or_insert_with(|| {
            merged.push(LrState {
                items: Default::default(),
                trans: BTreeMap::new(),
            });
            (merged.len() - 1) as u32
        });
        rep[i] = id;
        merged[id as usize].items.extend(st.items.iter().copied());
    }

    for (i, st) in lr1.states.iter().enumerate() {
        let from = rep[i] as usize;
        for (&x, &t) in &st.trans {
            let to = rep[t as usize];
            let prev = merged[from].trans.insert(x, to);
            debug_assert!(prev.is_none() || prev == Some(to));
        }
    }

    log::info!(
        "[parser] LALR merge: {} -> {} states (took {:?})",
        lr1.states.len(),
        merged.len(),
        t0.elapsed()
    );

    Lr1Automaton {
        states: merged,
        augmented: lr1.augmented,
        start: lr1.start,
    }
}
