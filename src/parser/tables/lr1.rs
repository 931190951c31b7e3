// src/parser/tables/lr1.rs
// Canonical LR(1) collection.
use std::{
    collections::{BTreeMap, BTreeSet},
    time::Instant,
};

use hashbrown::HashMap;

use super::first::FirstSets;
use crate::grammar::{Grammar, Symbol};

/// `[prod -> α · β, lookahead]`
///
/// Ordered by production, then dot, then lookahead, so an item set's
/// iteration order is its canonical key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Item {
    pub prod: u32,
    pub dot: u32,
    pub lookahead: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LrState {
    pub items: BTreeSet<Item>,
    pub trans: BTreeMap<Symbol, u32>,
}

impl LrState {
    /// LR(0) core: the item set with lookaheads erased.
    pub fn core(&self) -> Vec<(u32, u32)> {
        let mut core: Vec<(u32, u32)> = self.items.iter().map(|it| (it.prod, it.dot)).collect();
        core.dedup();
        core
    }
}

/// LR automaton over a grammar augmented with `S' -> S`.
///
/// The augmented production has index `grammar.productions.len()`; state 0
/// is the start state.
#[derive(Debug, Clone)]
pub struct Lr1Automaton {
    pub states: Vec<LrState>,
    pub augmented: u32,
    pub start: u32,
}

impl Lr1Automaton {
    /// Body length of a declared production or of the augmented one.
    pub fn rhs_len(&self, grammar: &Grammar, prod: u32) -> usize {
        if prod == self.augmented {
            1
        } else {
            grammar.productions[prod as usize].rhs.len()
        }
    }

    pub fn is_complete(&self, grammar: &Grammar, item: &Item) -> bool {
        item.dot as usize >= self.rhs_len(grammar, item.prod)
    }

    pub fn build(grammar: &Grammar, first: &FirstSets) -> Self {
        let t0 = Instant::now();
        let cx = Context::new(grammar, first);

        let mut states: Vec<LrState> = Vec::new();
        let mut index: HashMap<Vec<Item>, u32> = HashMap::new();

        let start = cx.closure([Item {
            prod: cx.augmented,
            dot: 0,
            lookahead: grammar.eof(),
        }]);
        index.insert(start.iter().copied().collect(), 0);
        states.push(LrState {
            items: start,
            trans: BTreeMap::new(),
        });

        let mut i = 0;
        while i < states.len() {
            let mut kernels: BTreeMap<Symbol, Vec<Item>> = BTreeMap::new();
            for it in &states[i].items {
                if let Some(&x) = cx.rhs(it.prod).get(it.dot as usize) {
                    kernels.entry(x).or_default().push(Item {
                        dot: it.dot + 1,
                        ..*it
                    });
                }
            }

            let mut trans = BTreeMap::new();
            for (x, kernel) in kernels {
                let items = cx.closure(kernel);
                let key: Vec<Item> = items.iter().copied().collect();
                let id = match index.get(&key) {
                    Some(&id) => id,
                    None => {
                        let id = states.len() as u32;
                        index.insert(key, id);
                        states.push(LrState {
                            items,
                            trans: BTreeMap::new(),
                        });
                        id
                    }
                };
                trans.insert(x, id);
            }
            states[i].trans = trans;
            i += 1;
        }

        log::info!(
            "[parser] canonical LR(1): {} states (took {:?})",
            states.len(),
            t0.elapsed()
        );

        Self {
            states,
            augmented: cx.augmented,
            start: grammar.start,
        }
    }
}

struct Context<'g> {
    grammar: &'g Grammar,
    first: &'g FirstSets,
    /// productions per non-terminal; malformed productions are left out
    by_lhs: Vec<Vec<u32>>,
    augmented: u32,
    augmented_rhs: [Symbol; 1],
}

impl<'g> Context<'g> {
    fn new(grammar: &'g Grammar, first: &'g FirstSets) -> Self {
        let mut by_lhs = vec![Vec::new(); grammar.nonterminals.len()];
        for (i, p) in grammar.productions.iter().enumerate() {
            if grammar.is_well_formed(p) {
                by_lhs[p.lhs as usize].push(i as u32);
            }
        }
        Self {
            grammar,
            first,
            by_lhs,
            augmented: grammar.productions.len() as u32,
            augmented_rhs: [Symbol::NonTerminal(grammar.start)],
        }
    }

    fn rhs(&self, prod: u32) -> &[Symbol] {
        if prod == self.augmented {
            &self.augmented_rhs
        } else {
            &self.grammar.productions[prod as usize].rhs
        }
    }

    /// For `[A -> α · B β, a]` adds `[B -> · γ, b]` for every b in
    /// FIRST(β a); work-list until nothing new appears.
    fn closure(&self, kernel: impl IntoIterator<Item = Item>) -> BTreeSet<Item> {
        let mut set = BTreeSet::new();
        let mut work = Vec::new();
        for it in kernel {
            if set.insert(it) {
                work.push(it);
            }
        }
        while let Some(it) = work.pop() {
            let rhs = self.rhs(it.prod);
            let Some(&Symbol::NonTerminal(b)) = rhs.get(it.dot as usize) else {
                continue;
            };
            let lookaheads = self
                .first
                .first_of_seq(&rhs[it.dot as usize + 1..], it.lookahead);
            for &p in &self.by_lhs[b as usize] {
                for &a in &lookaheads {
                    let n = Item {
                        prod: p,
                        dot: 0,
                        lookahead: a,
                    };
                    if set.insert(n) {
                        work.push(n);
                    }
                }
            }
        }
        set
    }
}
