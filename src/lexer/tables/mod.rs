// src/lexer/tables/mod.rs
pub mod alphabet;
pub mod build;
pub mod dfa;
pub mod expr;
pub mod io;
pub mod minimize;
pub mod nfa;
pub mod tokens;

use std::collections::BTreeMap;

pub use alphabet::RangeAlphabet;
pub use build::build_lexer;
pub use dfa::{Automaton, Dfa, DfaState};
pub use expr::{Definition, Expr, LexSpec, Range};
pub use io::{load_tables_bin_bytes, load_tables_json_bytes, save_tables_bin, save_tables_json};
pub use minimize::minimize;
pub use tokens::{INVALID_STATE, INVALID_TOKEN};

use alphabet::symbol_in;

/// Dense, emission-ready form of a DFA.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexerTables {
    /// Sorted disjoint ranges; index = alphabet symbol id.
    pub alphabet: Vec<Range>,
    pub n_states: u32,
    pub n_symbols: u32,
    pub start: u32,
    /// n_states * n_symbols row-major, `INVALID_STATE` = reject
    pub next: Vec<u32>,
    /// accepting state -> token id
    pub accept: BTreeMap<u32, u32>,
    pub token_names: Vec<String>,
}

impl LexerTables {
    pub fn from_dfa(dfa: &Dfa, spec: &LexSpec) -> Self {
        let n_states = dfa.n_states();
        let n_symbols = dfa.n_symbols();
        let mut next = vec![INVALID_STATE; n_states * n_symbols];
        let mut accept = BTreeMap::new();
        for (s, st) in dfa.states.iter().enumerate() {
            for (&sym, &t) in &st.trans {
                next[s * n_symbols + sym as usize] = t;
            }
            if let Some(tok) = st.accept {
                accept.insert(s as u32, tok);
            }
        }
        Self {
            alphabet: dfa.alphabet.clone(),
            n_states: n_states as u32,
            n_symbols: n_symbols as u32,
            start: dfa.start,
            next,
            accept,
            token_names: spec.token_names(),
        }
    }

    /// Token id per state, `INVALID_TOKEN` for non-accepting states.
    pub fn token_of(&self) -> Vec<u32> {
        let mut out = vec![INVALID_TOKEN; self.n_states as usize];
        for (&s, &tok) in &self.accept {
            out[s as usize] = tok;
        }
        out
    }

    pub fn token_name(&self, token: u32) -> &str {
        self.token_names
            .get(token as usize)
            .map(String::as_str)
            .unwrap_or("?")
    }
}

impl Automaton for LexerTables {
    fn start(&self) -> u32 {
        self.start
    }

    fn step(&self, state: u32, c: char) -> Option<u32> {
        let sym = symbol_in(&self.alphabet, c as u32)?;
        let t = self.next[(state * self.n_symbols + sym) as usize];
        (t != INVALID_STATE).then_some(t)
    }

    fn accept(&self, state: u32) -> Option<u32> {
        self.accept.get(&state).copied()
    }
}
