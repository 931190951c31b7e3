// src/parser/tables/first.rs
use std::collections::BTreeSet;

use crate::grammar::{Grammar, Symbol};

/// FIRST set of one symbol; `epsilon` marks nullability.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FirstSet {
    pub terminals: BTreeSet<u32>,
    pub epsilon: bool,
}

/// FIRST sets of every non-terminal. Terminals are their own FIRST set and
/// are not stored.
#[derive(Debug, Clone)]
pub struct FirstSets {
    nonterminals: Vec<FirstSet>,
}

impl FirstSets {
    /// Fixed point over all productions, repeated full passes until nothing
    /// changes.
    pub fn compute(grammar: &Grammar) -> Self {
        let mut sets = vec![FirstSet::default(); grammar.nonterminals.len()];
        let mut passes = 0usize;
        loop {
            passes += 1;
            let mut changed = false;
            for p in grammar.productions.iter().filter(|p| grammar.is_well_formed(p)) {
                let lhs = &sets[p.lhs as usize];
                let mut add = BTreeSet::new();
                let mut nullable = true;
                for &s in &p.rhs {
                    match s {
                        Symbol::Terminal(t) => {
                            add.insert(t);
                            nullable = false;
                        }
                        Symbol::NonTerminal(n) => {
                            let f = &sets[n as usize];
                            add.extend(f.terminals.iter().copied());
                            nullable = f.epsilon;
                        }
                    }
                    if !nullable {
                        break;
                    }
                }
                if add.is_subset(&lhs.terminals) && (!nullable || lhs.epsilon) {
                    continue;
                }
                let lhs = &mut sets[p.lhs as usize];
                lhs.terminals.extend(add);
                lhs.epsilon |= nullable;
                changed = true;
            }
            if !changed {
                break;
            }
        }
        log::debug!("[parser] FIRST sets converged after {passes} passes");
        Self { nonterminals: sets }
    }

    pub fn of_nonterminal(&self, n: u32) -> &FirstSet {
        &self.nonterminals[n as usize]
    }

    pub fn nullable(&self, n: u32) -> bool {
        self.nonterminals[n as usize].epsilon
    }

    /// FIRST of a symbol sequence, written into `out`. Returns whether the
    /// whole sequence is nullable.
    pub fn first_of_seq_into(&self, seq: &[Symbol], out: &mut BTreeSet<u32>) -> bool {
        for &s in seq {
            match s {
                Symbol::Terminal(t) => {
                    out.insert(t);
                    return false;
                }
                Symbol::NonTerminal(n) => {
                    let f = &self.nonterminals[n as usize];
                    out.extend(f.terminals.iter().copied());
                    if !f.epsilon {
                        return false;
                    }
                }
            }
        }
        true
    }

    /// FIRST(seq), with `lookahead` standing in for ε when `seq` is nullable.
    pub fn first_of_seq(&self, seq: &[Symbol], lookahead: u32) -> BTreeSet<u32> {
        let mut out = BTreeSet::new();
        if self.first_of_seq_into(seq, &mut out) {
            out.insert(lookahead);
        }
        out
    }
}
