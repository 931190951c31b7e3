// src/parser/tables/build.rs
use std::{collections::BTreeMap, time::Instant};

use super::{
    Action, Conflict, ConflictKind, ParseTable, ProductionInfo, first::FirstSets, lalr::merge_lalr,
    lr1::Lr1Automaton,
};
use crate::{
    Diagnostics, GenError, ParserConfig,
    grammar::{Grammar, Symbol},
};

/// Grammar -> LALR(1) (or canonical LR(1)) parse table.
pub fn build_parser(
    grammar: &Grammar,
    config: &ParserConfig,
    diags: &mut Diagnostics,
) -> Result<ParseTable, GenError> {
    grammar.validate(diags)?;
    let t0 = Instant::now();

    let first = FirstSets::compute(grammar);
    let lr1 = Lr1Automaton::build(grammar, &first);
    let automaton = if config.lalr { merge_lalr(&lr1) } else { lr1 };
    let table = ParseTable::build(grammar, &automaton, diags);

    log::info!(
        "[parser] table: {} states x {} terminals, {} conflicts (took {:?})",
        table.n_states(),
        grammar.n_terminals_with_eof(),
        table.conflicts.len(),
        t0.elapsed()
    );
    Ok(table)
}

impl ParseTable {
    /// Fills action/goto from an LR automaton.
    ///
    /// Shifts are placed first, then accept, then reductions. An occupied
    /// cell keeps a shift over a reduce and the lower-numbered production
    /// over another reduce; every such collision becomes a warning and a
    /// [`Conflict`] record. Conflicts never stop construction.
    pub fn build(grammar: &Grammar, automaton: &Lr1Automaton, diags: &mut Diagnostics) -> Self {
        let n_states = automaton.states.len();
        let eof = grammar.eof();
        let mut b = Builder {
            grammar,
            action: vec![vec![None; grammar.n_terminals_with_eof()]; n_states],
            conflicts: Vec::new(),
            diags,
        };
        let mut goto = vec![BTreeMap::new(); n_states];

        for (s, st) in automaton.states.iter().enumerate() {
            for (&x, &t) in &st.trans {
                match x {
                    Symbol::Terminal(a) => b.action[s][a as usize] = Some(Action::Shift(t)),
                    Symbol::NonTerminal(n) => {
                        goto[s].insert(n, t);
                    }
                }
            }

            for it in &st.items {
                if it.prod == automaton.augmented && it.dot == 1 && it.lookahead == eof {
                    b.action[s][eof as usize] = Some(Action::Accept);
                }
            }

            for it in &st.items {
                if it.prod == automaton.augmented || !automaton.is_complete(grammar, it) {
                    continue;
                }
                b.place(s as u32, it.lookahead, it.prod);
            }
        }

        let productions = grammar
            .productions
            .iter()
            .map(|p| ProductionInfo {
                lhs: p.lhs,
                len: p.rhs.len() as u32,
                kind: p.kind,
                name: p.name.clone(),
            })
            .collect();

        ParseTable {
            terminal_names: grammar.terminals.clone(),
            nonterminal_names: grammar.nonterminals.clone(),
            eof,
            action: b.action,
            goto,
            productions,
            conflicts: b.conflicts,
        }
    }
}

struct Builder<'a> {
    grammar: &'a Grammar,
    action: Vec<Vec<Option<Action>>>,
    conflicts: Vec<Conflict>,
    diags: &'a mut Diagnostics,
}

impl Builder<'_> {
    fn place(&mut self, state: u32, terminal: u32, prod: u32) {
        let candidate = Action::Reduce(prod);
        let cell = &mut self.action[state as usize][terminal as usize];
        let (kind, kept, dropped) = match *cell {
            None => {
                *cell = Some(candidate);
                return;
            }
            Some(Action::Reduce(q)) if q == prod => return,
            Some(Action::Shift(t)) => (ConflictKind::ShiftReduce, Action::Shift(t), candidate),
            Some(Action::Accept) => (ConflictKind::ReduceAccept, Action::Accept, candidate),
            Some(Action::Reduce(q)) => {
                // earlier-declared production wins
                let (keep, drop) = if q < prod { (q, prod) } else { (prod, q) };
                *cell = Some(Action::Reduce(keep));
                (
                    ConflictKind::ReduceReduce,
                    Action::Reduce(keep),
                    Action::Reduce(drop),
                )
            }
        };
        self.report(state, terminal, kind, kept, dropped);
    }

    fn report(
        &mut self,
        state: u32,
        terminal: u32,
        kind: ConflictKind,
        kept: Action,
        dropped: Action,
    ) {
        let g = self.grammar;
        let what = |a: Action| match a {
            Action::Shift(t) => format!("shift to {t}"),
            Action::Reduce(p) => format!("reduce {}", g.display_production(p as usize)),
            Action::Accept => "accept".to_string(),
        };
        let label = match kind {
            ConflictKind::ShiftReduce => "shift/reduce",
            ConflictKind::ReduceReduce => "reduce/reduce",
            ConflictKind::ReduceAccept => "reduce/accept",
        };
        self.diags.warning(
            format!(
                "{label} conflict in state {state} on `{}`: keeping {} over {}",
                g.terminal_name(terminal),
                what(kept),
                what(dropped)
            ),
            None,
        );
        self.conflicts.push(Conflict {
            state,
            terminal,
            kind,
            kept,
            dropped,
        });
    }
}
