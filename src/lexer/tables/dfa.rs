// src/lexer/tables/dfa.rs
use std::{collections::BTreeMap, time::Instant};

use hashbrown::HashMap;

use super::{
    alphabet::{RangeAlphabet, symbol_in},
    expr::Range,
    nfa::{Nfa, StateId},
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DfaState {
    /// alphabet symbol -> target; at most one target per symbol
    pub trans: BTreeMap<u32, u32>,
    /// token id when this state completes a token
    pub accept: Option<u32>,
}

/// Deterministic automaton over a disjoint range alphabet.
/// Missing transitions reject.
#[derive(Debug, Clone, Default)]
pub struct Dfa {
    pub alphabet: Vec<Range>,
    pub states: Vec<DfaState>,
    pub start: u32,
}

/// Read-only view a CPU lexer can drive.
pub trait Automaton {
    fn start(&self) -> u32;
    fn step(&self, state: u32, c: char) -> Option<u32>;
    fn accept(&self, state: u32) -> Option<u32>;
}

impl Automaton for Dfa {
    fn start(&self) -> u32 {
        self.start
    }

    fn step(&self, state: u32, c: char) -> Option<u32> {
        let sym = symbol_in(&self.alphabet, c as u32)?;
        self.states[state as usize].trans.get(&sym).copied()
    }

    fn accept(&self, state: u32) -> Option<u32> {
        self.states[state as usize].accept
    }
}

impl Dfa {
    /// Powerset construction. Each distinct epsilon closure (sorted member
    /// list) becomes one state; the lowest-priority accept among the members
    /// labels it.
    pub fn from_nfa(nfa: &Nfa, alphabet: &RangeAlphabet) -> Self {
        let t0 = Instant::now();
        let mut memo: HashMap<Vec<StateId>, u32> = HashMap::new();
        let mut sets: Vec<Vec<StateId>> = Vec::new();
        let mut states: Vec<DfaState> = Vec::new();

        let start = nfa.epsilon_closure([nfa.start]);
        memo.insert(start.clone(), 0);
        sets.push(start);
        states.push(DfaState::default());

        let mut i = 0;
        while i < sets.len() {
            // the closure stays owned by `memo`; the work-list copy is spent
            let set = std::mem::take(&mut sets[i]);

            let accept = set
                .iter()
                .filter_map(|&s| nfa.states[s as usize].accept)
                .min_by_key(|a| (a.priority, a.token))
                .map(|a| a.token);

            let mut moves: BTreeMap<u32, Vec<StateId>> = BTreeMap::new();
            for &s in &set {
                for &(sym, to) in &nfa.states[s as usize].trans {
                    moves.entry(sym).or_default().push(to);
                }
            }

            let mut trans = BTreeMap::new();
            for (sym, targets) in moves {
                let closure = nfa.epsilon_closure(targets);
                let id = match memo.get(&closure) {
                    Some(&id) => id,
                    None => {
                        let id = states.len() as u32;
                        memo.insert(closure.clone(), id);
                        sets.push(closure);
                        states.push(DfaState::default());
                        id
                    }
                };
                trans.insert(sym, id);
            }

            states[i] = DfaState { trans, accept };
            i += 1;
        }

        log::debug!(
            "[tables] subset construction: {} nfa states -> {} dfa states ({:?})",
            nfa.states.len(),
            states.len(),
            t0.elapsed()
        );

        Self {
            alphabet: alphabet.ranges().to_vec(),
            states,
            start: 0,
        }
    }

    pub fn n_states(&self) -> usize {
        self.states.len()
    }

    pub fn n_symbols(&self) -> usize {
        self.alphabet.len()
    }

    /// Runs the whole input; the accept label of the final state, if any.
    pub fn matches(&self, input: &str) -> Option<u32> {
        let mut s = self.start;
        for c in input.chars() {
            s = self.step(s, c)?;
        }
        self.states[s as usize].accept
    }

    /// Longest accepted prefix of `input`: (token, byte length).
    pub fn longest_match(&self, input: &str) -> Option<(u32, usize)> {
        longest_match(self, input)
    }
}

/// Maximal munch from the beginning of `input`.
pub fn longest_match<A: Automaton + ?Sized>(a: &A, input: &str) -> Option<(u32, usize)> {
    let mut s = a.start();
    let mut best = None;
    for (i, c) in input.char_indices() {
        match a.step(s, c) {
            Some(n) => s = n,
            None => break,
        }
        if let Some(tok) = a.accept(s) {
            best = Some((tok, i + c.len_utf8()));
        }
    }
    best
}
