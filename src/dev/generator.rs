// src/dev/generator.rs
// Shared input generators for the fuzz binary and the integration tests.

use std::collections::{BTreeSet, VecDeque};

use hashbrown::HashSet;
use rand::Rng;

use crate::{
    grammar::{Grammar, Symbol},
    lexer::tables::{Expr, LexSpec},
};

/// Small C-like token language exercising keywords vs identifiers,
/// fragments, negated classes, and cyclic block-comment structure.
pub fn demo_spec() -> LexSpec {
    LexSpec::new()
        .fragment("digit", Expr::range('0', '9'))
        .fragment("alpha", Expr::class(&[('a', 'z'), ('A', 'Z'), ('_', '_')]))
        .fragment(
            "alnum",
            Expr::alt(vec![Expr::reference("alpha"), Expr::reference("digit")]),
        )
        .token("IF", Expr::lit("if"))
        .token("ELSE", Expr::lit("else"))
        .token("WHILE", Expr::lit("while"))
        .token(
            "IDENT",
            Expr::seq(vec![
                Expr::reference("alpha"),
                Expr::star(Expr::reference("alnum")),
            ]),
        )
        .token(
            "FLOAT",
            Expr::seq(vec![
                Expr::plus(Expr::reference("digit")),
                Expr::lit("."),
                Expr::star(Expr::reference("digit")),
            ]),
        )
        .token("INT", Expr::plus(Expr::reference("digit")))
        .token(
            "STRING",
            Expr::seq(vec![
                Expr::lit("\""),
                Expr::star(Expr::alt(vec![
                    Expr::not_class(&[('"', '"'), ('\\', '\\'), ('\n', '\n')]),
                    Expr::seq(vec![Expr::lit("\\"), Expr::not_class(&[('\n', '\n')])]),
                ])),
                Expr::lit("\""),
            ]),
        )
        .token("WHITE", Expr::plus(Expr::class(&[(' ', ' '), ('\t', '\t'), ('\n', '\n')])))
        .token(
            "LINE_COMMENT",
            Expr::seq(vec![Expr::lit("//"), Expr::star(Expr::not_class(&[('\n', '\n')]))]),
        )
        .token(
            "BLOCK_COMMENT",
            Expr::seq(vec![
                Expr::lit("/*"),
                Expr::star(Expr::alt(vec![
                    Expr::not_class(&[('*', '*')]),
                    Expr::seq(vec![
                        Expr::plus(Expr::lit("*")),
                        Expr::not_class(&[('*', '*'), ('/', '/')]),
                    ]),
                ])),
                Expr::plus(Expr::lit("*")),
                Expr::lit("/"),
            ]),
        )
        .token("EQEQ", Expr::lit("=="))
        .token("ASSIGN", Expr::lit("="))
        .token("LE", Expr::lit("<="))
        .token("LT", Expr::lit("<"))
        .token("PLUS", Expr::lit("+"))
        .token("MINUS", Expr::lit("-"))
        .token("STAR", Expr::lit("*"))
        .token("SLASH", Expr::lit("/"))
        .token("LPAREN", Expr::lit("("))
        .token("RPAREN", Expr::lit(")"))
        .token("LBRACE", Expr::lit("{"))
        .token("RBRACE", Expr::lit("}"))
        .token("SEMI", Expr::lit(";"))
}

/// Characters the demo language cares about, plus a few it rejects.
pub const DEMO_CHARS: &[char] = &[
    'i', 'f', 'e', 'l', 's', 'w', 'h', 'x', 'Z', '_', '0', '7', '9', '.', '"', '\\', ' ', '\n',
    '/', '*', '=', '<', '+', '-', '(', ')', '{', '}', ';', '#', 'é',
];

/// Random string of `len` characters drawn from `pool`.
pub fn gen_source<R: Rng + ?Sized>(rng: &mut R, pool: &[char], len: usize) -> String {
    (0..len)
        .map(|_| pool[rng.random_range(0..pool.len())])
        .collect()
}

/// Every terminal string of length <= `max_len` derivable from the start
/// symbol, by breadth-first leftmost expansion.
///
/// Sentential forms whose shortest possible yield already exceeds `max_len`
/// are pruned; forms are also capped in length so nullable recursion
/// terminates.
pub fn sentences(grammar: &Grammar, max_len: usize) -> BTreeSet<Vec<u32>> {
    let min_yield = min_yields(grammar);
    let form_cap = 2 * max_len + 4;
    let cost = |form: &[Symbol]| -> usize {
        form.iter()
            .map(|s| match *s {
                Symbol::Terminal(_) => 1,
                Symbol::NonTerminal(n) => min_yield[n as usize],
            })
            .fold(0usize, usize::saturating_add)
    };

    let mut out = BTreeSet::new();
    let mut seen: HashSet<Vec<Symbol>> = HashSet::new();
    let mut queue: VecDeque<Vec<Symbol>> = VecDeque::new();
    let start = vec![Symbol::NonTerminal(grammar.start)];
    seen.insert(start.clone());
    queue.push_back(start);

    while let Some(form) = queue.pop_front() {
        let Some(i) = form.iter().position(|s| !s.is_terminal()) else {
            out.insert(
                form.iter()
                    .map(|s| match *s {
                        Symbol::Terminal(t) => t,
                        Symbol::NonTerminal(n) => n,
                    })
                    .collect(),
            );
            continue;
        };
        let Symbol::NonTerminal(n) = form[i] else {
            continue;
        };
        for p in grammar.productions.iter().filter(|p| p.lhs == n) {
            let mut next = Vec::with_capacity(form.len() + p.rhs.len());
            next.extend_from_slice(&form[..i]);
            next.extend_from_slice(&p.rhs);
            next.extend_from_slice(&form[i + 1..]);
            if next.len() > form_cap || cost(&next) > max_len {
                continue;
            }
            if seen.insert(next.clone()) {
                queue.push_back(next);
            }
        }
    }
    out
}

/// Length of the shortest terminal string each non-terminal derives
/// (`usize::MAX` for unproductive ones).
fn min_yields(grammar: &Grammar) -> Vec<usize> {
    let mut best = vec![usize::MAX; grammar.nonterminals.len()];
    loop {
        let mut changed = false;
        for p in &grammar.productions {
            let total = p
                .rhs
                .iter()
                .map(|s| match *s {
                    Symbol::Terminal(_) => 1,
                    Symbol::NonTerminal(n) => best[n as usize],
                })
                .fold(0usize, usize::saturating_add);
            if total < best[p.lhs as usize] {
                best[p.lhs as usize] = total;
                changed = true;
            }
        }
        if !changed {
            return best;
        }
    }
}

pub fn env_u64(name: &str, default: u64) -> u64 {
    std::env::var(name)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(default)
}

pub fn env_usize(name: &str, default: usize) -> usize {
    std::env::var(name)
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(default)
}
