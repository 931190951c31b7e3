// src/parser/bnf_input.rs
// Reads plain BNF (`<a> ::= <b> "x" | ""`) into a Grammar.
//
//   * quoted strings are terminals, numbered by first appearance
//   * `""` is epsilon
//   * the first rule's left-hand side is the start symbol
//
// `<x>` and `"x"` are different symbols, so terminals and non-terminals are
// numbered in separate tables.

use bnf::Term;
use hashbrown::HashMap;

use crate::{
    Diagnostics, GenError,
    grammar::{Grammar, Production, ProductionKind, Symbol},
};

#[derive(Default)]
struct Names {
    list: Vec<String>,
    index: HashMap<String, u32>,
}

impl Names {
    fn intern(&mut self, name: &str) -> u32 {
        if let Some(&i) = self.index.get(name) {
            return i;
        }
        let i = self.list.len() as u32;
        self.list.push(name.to_string());
        self.index.insert(name.to_string(), i);
        i
    }
}

pub fn grammar_from_bnf(src: &str, diags: &mut Diagnostics) -> Result<Grammar, GenError> {
    let parsed: bnf::Grammar = src
        .trim()
        .parse()
        .map_err(|e: bnf::Error| GenError::Bnf(e.to_string()))?;

    let mut terminals = Names::default();
    let mut nonterminals = Names::default();
    let mut productions = Vec::new();

    // left-hand sides first, so rule order fixes non-terminal ids
    for prod in parsed.productions_iter() {
        if let Term::Nonterminal(n) = &prod.lhs {
            nonterminals.intern(n);
        }
    }

    for prod in parsed.productions_iter() {
        let lhs = match &prod.lhs {
            Term::Nonterminal(n) => nonterminals.intern(n),
            Term::Terminal(t) => {
                diags.error(format!("terminal \"{t}\" on a left-hand side"), None);
                continue;
            }
        };
        for expr in prod.rhs_iter() {
            let mut rhs = Vec::new();
            for term in expr.terms_iter() {
                match term {
                    Term::Terminal(t) if t.is_empty() => {}
                    Term::Terminal(t) => rhs.push(Symbol::Terminal(terminals.intern(t))),
                    Term::Nonterminal(n) => {
                        if !nonterminals.index.contains_key(n.as_str()) {
                            diags.error(format!("undefined non-terminal <{n}>"), None);
                        }
                        rhs.push(Symbol::NonTerminal(nonterminals.intern(n)));
                    }
                }
            }
            productions.push(Production {
                kind: ProductionKind::Normal,
                lhs,
                rhs,
                name: None,
            });
        }
    }

    if productions.is_empty() {
        return Err(GenError::EmptyGrammar);
    }
    Ok(Grammar {
        terminals: terminals.list,
        nonterminals: nonterminals.list,
        start: 0,
        productions,
    })
}
