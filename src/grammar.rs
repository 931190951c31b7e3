// src/grammar.rs
// Flattened context-free grammar as handed over by the front-end.
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::{Diagnostics, GenError, Location};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Symbol {
    Terminal(u32),
    NonTerminal(u32),
}

impl Symbol {
    pub fn is_terminal(self) -> bool {
        matches!(self, Symbol::Terminal(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProductionKind {
    Normal,
    /// Introduced by EBNF flattening (quantifier helpers).
    Auxiliary,
    /// Left-recursive list accumulation, always `L -> L X`.
    Flatten,
    /// Pure-epsilon production whose node is dropped from the tree.
    Removed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Production {
    pub kind: ProductionKind,
    pub lhs: u32,
    pub rhs: Vec<Symbol>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grammar {
    pub terminals: Vec<String>,
    pub nonterminals: Vec<String>,
    pub start: u32,
    pub productions: Vec<Production>,
}

impl Grammar {
    /// Synthetic end-of-input terminal; one past the declared terminals.
    pub fn eof(&self) -> u32 {
        self.terminals.len() as u32
    }

    pub fn n_terminals_with_eof(&self) -> usize {
        self.terminals.len() + 1
    }

    pub fn symbol_name(&self, s: Symbol) -> &str {
        match s {
            Symbol::Terminal(t) if t == self.eof() => "$",
            Symbol::Terminal(t) => self
                .terminals
                .get(t as usize)
                .map(String::as_str)
                .unwrap_or("?"),
            Symbol::NonTerminal(n) => self
                .nonterminals
                .get(n as usize)
                .map(String::as_str)
                .unwrap_or("?"),
        }
    }

    pub fn terminal_name(&self, t: u32) -> &str {
        self.symbol_name(Symbol::Terminal(t))
    }

    /// Every symbol of `p` (and its left-hand side) is declared. Table
    /// construction only looks at well-formed productions; `validate`
    /// reports the rest.
    pub fn is_well_formed(&self, p: &Production) -> bool {
        let n_t = self.terminals.len() as u32;
        let n_nt = self.nonterminals.len() as u32;
        p.lhs < n_nt
            && p.rhs.iter().all(|s| match *s {
                Symbol::Terminal(t) => t < n_t,
                Symbol::NonTerminal(n) => n < n_nt,
            })
    }

    /// `A -> b C` rendering for diagnostics.
    pub fn display_production(&self, p: usize) -> String {
        let prod = &self.productions[p];
        let mut s = format!("{} ->", self.symbol_name(Symbol::NonTerminal(prod.lhs)));
        if prod.rhs.is_empty() {
            s.push_str(" ε");
        }
        for sym in &prod.rhs {
            s.push(' ');
            s.push_str(self.symbol_name(*sym));
        }
        s
    }

    /// Structural checks run before table construction.
    ///
    /// Fatal problems come back as `Err`; shape violations of individual
    /// productions are reported as errors and construction may continue.
    pub fn validate(&self, diags: &mut Diagnostics) -> Result<(), GenError> {
        if self.productions.is_empty() {
            return Err(GenError::EmptyGrammar);
        }
        if self.start as usize >= self.nonterminals.len() {
            return Err(GenError::MissingStart(self.start));
        }
        if !self.productions.iter().any(|p| p.lhs == self.start) {
            return Err(GenError::StartWithoutProductions(
                self.nonterminals[self.start as usize].clone(),
            ));
        }

        let n_t = self.terminals.len() as u32;
        let n_nt = self.nonterminals.len() as u32;
        for (i, p) in self.productions.iter().enumerate() {
            if p.lhs >= n_nt {
                diags.error(
                    format!("production {i}: left-hand side {} is not declared", p.lhs),
                    None,
                );
                continue;
            }
            for s in &p.rhs {
                let ok = match *s {
                    Symbol::Terminal(t) => t < n_t,
                    Symbol::NonTerminal(n) => n < n_nt,
                };
                if !ok {
                    diags.error(format!("production {i}: undefined symbol {s:?}"), None);
                }
            }
            match p.kind {
                ProductionKind::Removed if !p.rhs.is_empty() => diags.error(
                    format!(
                        "production {i} ({}) is REMOVED but not empty",
                        self.display_production(i)
                    ),
                    None,
                ),
                ProductionKind::Flatten
                    if !(p.rhs.len() == 2 && p.rhs[0] == Symbol::NonTerminal(p.lhs)) =>
                {
                    diags.error(
                        format!(
                            "production {i} ({}) is FLATTEN but not of shape L -> L X",
                            self.display_production(i)
                        ),
                        None,
                    )
                }
                _ => {}
            }
        }
        Ok(())
    }
}

/// Name-based construction, mostly for tests and input adapters.
///
/// Unknown names and duplicate declarations are reported to the collector
/// passed to [`GrammarBuilder::build`]; the offending production is dropped.
#[derive(Default)]
pub struct GrammarBuilder {
    terminals: Vec<String>,
    nonterminals: Vec<String>,
    names: HashMap<String, Symbol>,
    start: Option<String>,
    pending: Vec<PendingProduction>,
    duplicates: Vec<String>,
}

struct PendingProduction {
    kind: ProductionKind,
    lhs: String,
    rhs: Vec<String>,
    name: Option<String>,
    location: Option<Location>,
}

impl GrammarBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn terminal(mut self, name: &str) -> Self {
        self.declare(name, true);
        self
    }

    pub fn terminals(mut self, names: &[&str]) -> Self {
        for n in names {
            self.declare(n, true);
        }
        self
    }

    pub fn nonterminal(mut self, name: &str) -> Self {
        self.declare(name, false);
        self
    }

    pub fn nonterminals(mut self, names: &[&str]) -> Self {
        for n in names {
            self.declare(n, false);
        }
        self
    }

    fn declare(&mut self, name: &str, terminal: bool) {
        if self.names.contains_key(name) {
            self.duplicates.push(name.to_string());
            return;
        }
        let sym = if terminal {
            self.terminals.push(name.to_string());
            Symbol::Terminal(self.terminals.len() as u32 - 1)
        } else {
            self.nonterminals.push(name.to_string());
            Symbol::NonTerminal(self.nonterminals.len() as u32 - 1)
        };
        self.names.insert(name.to_string(), sym);
    }

    pub fn start(mut self, name: &str) -> Self {
        self.start = Some(name.to_string());
        self
    }

    pub fn production(self, lhs: &str, rhs: &[&str]) -> Self {
        self.production_with(ProductionKind::Normal, lhs, rhs, None)
    }

    pub fn production_with(
        mut self,
        kind: ProductionKind,
        lhs: &str,
        rhs: &[&str],
        name: Option<&str>,
    ) -> Self {
        self.pending.push(PendingProduction {
            kind,
            lhs: lhs.to_string(),
            rhs: rhs.iter().map(|s| s.to_string()).collect(),
            name: name.map(str::to_string),
            location: None,
        });
        self
    }

    pub fn production_at(mut self, lhs: &str, rhs: &[&str], location: Location) -> Self {
        self.pending.push(PendingProduction {
            kind: ProductionKind::Normal,
            lhs: lhs.to_string(),
            rhs: rhs.iter().map(|s| s.to_string()).collect(),
            name: None,
            location: Some(location),
        });
        self
    }

    pub fn build(self, diags: &mut Diagnostics) -> Result<Grammar, GenError> {
        for d in &self.duplicates {
            diags.error(format!("duplicate symbol `{d}`"), None);
        }

        let mut productions = Vec::with_capacity(self.pending.len());
        'prods: for p in &self.pending {
            let lhs = match self.names.get(&p.lhs) {
                Some(Symbol::NonTerminal(n)) => *n,
                Some(Symbol::Terminal(_)) => {
                    diags.error(
                        format!("terminal `{}` used as a left-hand side", p.lhs),
                        p.location,
                    );
                    continue;
                }
                None => {
                    diags.error(format!("undefined non-terminal `{}`", p.lhs), p.location);
                    continue;
                }
            };
            let mut rhs = Vec::with_capacity(p.rhs.len());
            for name in &p.rhs {
                match self.names.get(name) {
                    Some(s) => rhs.push(*s),
                    None => {
                        diags.error(
                            format!("undefined symbol `{name}` in rule for `{}`", p.lhs),
                            p.location,
                        );
                        continue 'prods;
                    }
                }
            }
            productions.push(Production {
                kind: p.kind,
                lhs,
                rhs,
                name: p.name.clone(),
            });
        }

        let start = match &self.start {
            Some(s) => match self.names.get(s) {
                Some(Symbol::NonTerminal(n)) => *n,
                _ => return Err(GenError::MissingStart(u32::MAX)),
            },
            None => productions
                .first()
                .map(|p| p.lhs)
                .ok_or(GenError::EmptyGrammar)?,
        };

        Ok(Grammar {
            terminals: self.terminals,
            nonterminals: self.nonterminals,
            start,
            productions,
        })
    }
}
