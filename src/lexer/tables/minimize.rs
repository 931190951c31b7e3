// src/lexer/tables/minimize.rs
// Hopcroft partition refinement.
use std::{
    collections::{BTreeMap, VecDeque},
    time::Instant,
};

use super::dfa::{Dfa, DfaState};

/// Returns the minimal DFA for the same language and token labels.
///
/// The partial input is completed with an explicit dead state for the
/// refinement; the dead state's class (states that can never reach an
/// accept) is dropped again afterwards, so missing edges still mean reject.
/// States are renumbered breadth-first from the start state.
pub fn minimize(dfa: &Dfa) -> Dfa {
    let t0 = Instant::now();
    let n = dfa.states.len();
    let k = dfa.alphabet.len();
    if n == 0 {
        return dfa.clone();
    }
    let dead = n;
    let total = n + 1;

    let target = |q: usize, sym: usize| -> usize {
        if q == dead {
            return dead;
        }
        dfa.states[q]
            .trans
            .get(&(sym as u32))
            .map(|&t| t as usize)
            .unwrap_or(dead)
    };

    // inverse[sym * total + t] = predecessors of t on sym
    let mut inverse: Vec<Vec<u32>> = vec![Vec::new(); k * total];
    for q in 0..total {
        for sym in 0..k {
            inverse[sym * total + target(q, sym)].push(q as u32);
        }
    }

    // Initial partition: one group per accept label, non-accepting together.
    let mut by_label: BTreeMap<Option<u32>, Vec<u32>> = BTreeMap::new();
    for q in 0..total {
        let label = if q == dead { None } else { dfa.states[q].accept };
        by_label.entry(label).or_default().push(q as u32);
    }
    let mut blocks: Vec<Vec<u32>> = by_label.into_values().collect();
    let mut block_of = vec![0usize; total];
    for (b, members) in blocks.iter().enumerate() {
        for &q in members {
            block_of[q as usize] = b;
        }
    }

    let mut queue: VecDeque<usize> = (0..blocks.len()).collect();
    let mut queued = vec![true; blocks.len()];
    let mut in_x = vec![false; total];

    while let Some(b) = queue.pop_front() {
        queued[b] = false;
        let splitter = blocks[b].clone();
        for sym in 0..k {
            // states with an edge on `sym` into the splitter, grouped by block
            let mut touched: BTreeMap<usize, Vec<u32>> = BTreeMap::new();
            for &t in &splitter {
                for &q in &inverse[sym * total + t as usize] {
                    touched.entry(block_of[q as usize]).or_default().push(q);
                }
            }

            for (g, hits) in touched {
                if hits.len() == blocks[g].len() {
                    continue;
                }
                for &q in &hits {
                    in_x[q as usize] = true;
                }
                let rest: Vec<u32> = blocks[g]
                    .iter()
                    .copied()
                    .filter(|&q| !in_x[q as usize])
                    .collect();
                for &q in &hits {
                    in_x[q as usize] = false;
                }

                let ng = blocks.len();
                for &q in &rest {
                    block_of[q as usize] = ng;
                }
                blocks[g] = hits;
                blocks.push(rest);
                queued.push(false);

                if queued[g] {
                    queue.push_back(ng);
                    queued[ng] = true;
                } else {
                    let smaller = if blocks[g].len() <= blocks[ng].len() { g } else { ng };
                    queue.push_back(smaller);
                    queued[smaller] = true;
                }
            }
        }
    }

    // Merge: one state per class, reachable from the start, dead class dropped.
    let dead_class = block_of[dead];
    let mut new_id: Vec<Option<u32>> = vec![None; blocks.len()];
    let mut order: Vec<usize> = Vec::new();
    let start_class = block_of[dfa.start as usize];
    new_id[start_class] = Some(0);
    order.push(start_class);

    let mut states: Vec<DfaState> = Vec::new();
    let mut i = 0;
    while i < order.len() {
        let class = order[i];
        let rep = blocks[class]
            .iter()
            .copied()
            .find(|&q| q as usize != dead)
            .map(|q| q as usize);
        let mut st = DfaState::default();
        if let Some(rep) = rep {
            st.accept = dfa.states[rep].accept;
            for (&sym, &t) in &dfa.states[rep].trans {
                let tc = block_of[t as usize];
                if tc == dead_class {
                    continue;
                }
                let id = match new_id[tc] {
                    Some(id) => id,
                    None => {
                        let id = order.len() as u32;
                        new_id[tc] = Some(id);
                        order.push(tc);
                        id
                    }
                };
                st.trans.insert(sym, id);
            }
        }
        states.push(st);
        i += 1;
    }

    log::debug!(
        "[tables] minimize: {} -> {} states ({:?})",
        n,
        states.len(),
        t0.elapsed()
    );

    Dfa {
        alphabet: dfa.alphabet.clone(),
        states,
        start: 0,
    }
}
