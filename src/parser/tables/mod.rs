// src/parser/tables/mod.rs
pub mod build;
pub mod first;
pub mod io;
pub mod lalr;
pub mod lr1;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_with::serde_as;

pub use build::build_parser;
pub use first::{FirstSet, FirstSets};
pub use io::{load_parse_tables_json_bytes, save_parse_tables_json};
pub use lalr::merge_lalr;
pub use lr1::{Item, Lr1Automaton, LrState};

use crate::grammar::ProductionKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Shift(u32),
    Reduce(u32),
    Accept,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConflictKind {
    ShiftReduce,
    ReduceReduce,
    /// A reduction competing with accept on end of input.
    ReduceAccept,
}

/// One occupied cell that received a second candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conflict {
    pub state: u32,
    pub terminal: u32,
    pub kind: ConflictKind,
    pub kept: Action,
    pub dropped: Action,
}

/// What a driver needs to perform a reduction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductionInfo {
    pub lhs: u32,
    pub len: u32,
    pub kind: ProductionKind,
    pub name: Option<String>,
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseTable {
    pub terminal_names: Vec<String>,
    pub nonterminal_names: Vec<String>,
    /// End-of-input terminal id (= number of declared terminals).
    pub eof: u32,
    /// action[state][terminal], terminal in `0..=eof`
    pub action: Vec<Vec<Option<Action>>>,
    /// goto[state][non-terminal]
    #[serde_as(as = "Vec<Vec<(_, _)>>")]
    pub goto: Vec<BTreeMap<u32, u32>>,
    pub productions: Vec<ProductionInfo>,
    #[serde(default)]
    pub conflicts: Vec<Conflict>,
}

impl ParseTable {
    pub fn n_states(&self) -> usize {
        self.action.len()
    }

    pub fn action(&self, state: u32, terminal: u32) -> Option<Action> {
        self.action
            .get(state as usize)?
            .get(terminal as usize)
            .copied()
            .flatten()
    }

    pub fn goto(&self, state: u32, nonterminal: u32) -> Option<u32> {
        self.goto.get(state as usize)?.get(&nonterminal).copied()
    }

    pub fn terminal_name(&self, t: u32) -> &str {
        if t == self.eof {
            return "$";
        }
        self.terminal_names
            .get(t as usize)
            .map(String::as_str)
            .unwrap_or("?")
    }

    pub fn conflicts_of(&self, kind: ConflictKind) -> impl Iterator<Item = &Conflict> {
        self.conflicts.iter().filter(move |c| c.kind == kind)
    }
}
