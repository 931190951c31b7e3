// src/lexer/tables/nfa.rs
// Thompson construction into an arena of states addressed by integer handles.
use std::fmt;

use hashbrown::{HashMap, HashSet};

use super::{
    alphabet::RangeAlphabet,
    expr::{Expr, LexSpec, Range, complement},
};
use crate::Diagnostics;

pub type StateId = u32;

/// Token completed by reaching a state. Lower priority wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Accept {
    pub token: u32,
    pub priority: u32,
}

#[derive(Debug, Clone, Default)]
pub struct NfaState {
    /// (alphabet symbol, target)
    pub trans: Vec<(u32, StateId)>,
    pub eps: Vec<StateId>,
    pub accept: Option<Accept>,
}

#[derive(Debug, Clone, Default)]
pub struct Nfa {
    pub states: Vec<NfaState>,
    pub start: StateId,
}

/// Entry/success pair of a partially built automaton.
#[derive(Debug, Clone, Copy)]
pub struct Fragment {
    pub entry: StateId,
    pub exit: StateId,
}

impl Nfa {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_state(&mut self) -> StateId {
        self.states.push(NfaState::default());
        (self.states.len() - 1) as StateId
    }

    pub fn add_eps(&mut self, from: StateId, to: StateId) {
        self.states[from as usize].eps.push(to);
    }

    pub fn add_trans(&mut self, from: StateId, symbol: u32, to: StateId) {
        self.states[from as usize].trans.push((symbol, to));
    }

    /// Sorted set of states reachable from `seeds` through epsilon edges.
    pub fn epsilon_closure(&self, seeds: impl IntoIterator<Item = StateId>) -> Vec<StateId> {
        let mut seen = HashSet::new();
        let mut stack: Vec<StateId> = Vec::new();
        for s in seeds {
            if seen.insert(s) {
                stack.push(s);
            }
        }
        while let Some(s) = stack.pop() {
            for &t in &self.states[s as usize].eps {
                if seen.insert(t) {
                    stack.push(t);
                }
            }
        }
        let mut out: Vec<StateId> = seen.into_iter().collect();
        out.sort_unstable();
        out
    }

    pub fn reaches_by_epsilon(&self, from: StateId, to: StateId) -> bool {
        self.epsilon_closure([from]).binary_search(&to).is_ok()
    }

    fn fresh_fragment(&mut self) -> Fragment {
        Fragment {
            entry: self.add_state(),
            exit: self.add_state(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    Undefined(String),
    Cycle(String),
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileError::Undefined(n) => write!(f, "undefined reference `{n}`"),
            CompileError::Cycle(n) => write!(f, "recursive reference to `{n}`"),
        }
    }
}

/// Compiled template of a named definition, in its own arena.
struct Template {
    nfa: Nfa,
    frag: Fragment,
}

/// Named definitions available to `Expr::Ref`.
///
/// Each definition is compiled once into a private template; every
/// reference copies that graph into the caller's arena with fresh handles,
/// so two occurrences never share states.
pub struct FragmentTable<'a> {
    defs: HashMap<&'a str, &'a Expr>,
    templates: HashMap<&'a str, Template>,
    in_progress: HashSet<&'a str>,
    duplicate_tokens: HashSet<usize>,
}

impl<'a> FragmentTable<'a> {
    /// Registers fragments first, then tokens. Later duplicates of a name are
    /// reported and ignored.
    pub fn new(spec: &'a LexSpec, diags: &mut Diagnostics) -> Self {
        let mut defs: HashMap<&'a str, &'a Expr> = HashMap::new();
        let mut duplicate_tokens = HashSet::new();
        for f in &spec.fragments {
            if defs.contains_key(f.name.as_str()) {
                diags.error(format!("duplicate fragment `{}`", f.name), f.location);
                continue;
            }
            defs.insert(f.name.as_str(), &f.expr);
        }
        for (i, t) in spec.tokens.iter().enumerate() {
            if defs.contains_key(t.name.as_str()) {
                diags.error(format!("duplicate definition `{}`", t.name), t.location);
                duplicate_tokens.insert(i);
                continue;
            }
            defs.insert(t.name.as_str(), &t.expr);
        }
        Self {
            defs,
            templates: HashMap::new(),
            in_progress: HashSet::new(),
            duplicate_tokens,
        }
    }

    pub fn is_duplicate_token(&self, index: usize) -> bool {
        self.duplicate_tokens.contains(&index)
    }

    /// Copies the compiled template for `name` into `arena`.
    pub fn instantiate(
        &mut self,
        name: &str,
        arena: &mut Nfa,
        alphabet: &RangeAlphabet,
    ) -> Result<Fragment, CompileError> {
        let Some((&key, &expr)) = self.defs.get_key_value(name) else {
            return Err(CompileError::Undefined(name.to_string()));
        };
        if !self.templates.contains_key(key) {
            if !self.in_progress.insert(key) {
                return Err(CompileError::Cycle(name.to_string()));
            }
            let mut nfa = Nfa::new();
            let built = compile(expr, &mut nfa, self, alphabet);
            self.in_progress.remove(key);
            let frag = built?;
            self.templates.insert(key, Template { nfa, frag });
        }
        Ok(copy_reachable(&self.templates[key], arena))
    }
}

fn copy_reachable(t: &Template, arena: &mut Nfa) -> Fragment {
    let mut map: HashMap<StateId, StateId> = HashMap::new();
    let mut stack = vec![t.frag.entry];
    map.insert(t.frag.entry, arena.add_state());
    while let Some(old) = stack.pop() {
        let new = map[&old];
        let src = &t.nfa.states[old as usize];
        for &(sym, to) in &src.trans {
            let to_new = *map.entry(to).or_insert_with(|| {
                stack.push(to);
                arena.add_state()
            });
            arena.add_trans(new, sym, to_new);
        }
        for &to in &src.eps {
            let to_new = *map.entry(to).or_insert_with(|| {
                stack.push(to);
                arena.add_state()
            });
            arena.add_eps(new, to_new);
        }
    }
    let exit = match map.get(&t.frag.exit) {
        Some(&s) => s,
        None => arena.add_state(),
    };
    Fragment {
        entry: map[&t.frag.entry],
        exit,
    }
}

fn literal(arena: &mut Nfa, alphabet: &RangeAlphabet, ranges: &[Range]) -> Fragment {
    let f = arena.fresh_fragment();
    let mut seen = HashSet::new();
    for r in ranges {
        for sym in alphabet.expand(*r) {
            if seen.insert(sym) {
                arena.add_trans(f.entry, sym, f.exit);
            }
        }
    }
    f
}

/// Thompson construction of `expr` into `arena`.
pub fn compile(
    expr: &Expr,
    arena: &mut Nfa,
    table: &mut FragmentTable<'_>,
    alphabet: &RangeAlphabet,
) -> Result<Fragment, CompileError> {
    let frag = match expr {
        Expr::Ranges(rs) => literal(arena, alphabet, rs),
        Expr::Negated(rs) => literal(arena, alphabet, &complement(rs)),
        Expr::Str(s) => {
            let entry = arena.add_state();
            let mut cur = entry;
            for c in s.chars() {
                let next = arena.add_state();
                for sym in alphabet.expand(Range::single(c)) {
                    arena.add_trans(cur, sym, next);
                }
                cur = next;
            }
            if cur == entry {
                let exit = arena.add_state();
                arena.add_eps(entry, exit);
                cur = exit;
            }
            Fragment { entry, exit: cur }
        }
        Expr::Concat(parts) => {
            let mut acc: Option<Fragment> = None;
            for p in parts {
                let b = compile(p, arena, table, alphabet)?;
                acc = Some(match acc {
                    None => b,
                    Some(a) => {
                        arena.add_eps(a.exit, b.entry);
                        Fragment {
                            entry: a.entry,
                            exit: b.exit,
                        }
                    }
                });
            }
            match acc {
                Some(f) => f,
                None => {
                    let f = arena.fresh_fragment();
                    arena.add_eps(f.entry, f.exit);
                    f
                }
            }
        }
        Expr::Union(parts) => {
            let f = arena.fresh_fragment();
            for p in parts {
                let a = compile(p, arena, table, alphabet)?;
                arena.add_eps(f.entry, a.entry);
                arena.add_eps(a.exit, f.exit);
            }
            f
        }
        Expr::Optional(inner) => {
            let e = compile(inner, arena, table, alphabet)?;
            let f = arena.fresh_fragment();
            arena.add_eps(f.entry, e.entry);
            arena.add_eps(f.entry, f.exit);
            arena.add_eps(e.exit, f.exit);
            f
        }
        Expr::Star(inner) => {
            let e = compile(inner, arena, table, alphabet)?;
            let f = arena.fresh_fragment();
            arena.add_eps(f.entry, e.entry);
            arena.add_eps(f.entry, f.exit);
            arena.add_eps(e.exit, e.entry);
            arena.add_eps(e.exit, f.exit);
            f
        }
        Expr::Plus(inner) => {
            let e = compile(inner, arena, table, alphabet)?;
            let f = arena.fresh_fragment();
            arena.add_eps(f.entry, e.entry);
            arena.add_eps(e.exit, e.entry);
            arena.add_eps(e.exit, f.exit);
            f
        }
        Expr::Ref(name) => table.instantiate(name, arena, alphabet)?,
    };
    Ok(frag)
}

/// Builds the combined NFA: one start state with an epsilon edge into every
/// accepted token. Rules that fail are reported and left out.
///
/// Returns the NFA and the number of tokens that made it in.
pub fn build_nfa(spec: &LexSpec, alphabet: &RangeAlphabet, diags: &mut Diagnostics) -> (Nfa, usize) {
    let mut nfa = Nfa::new();
    nfa.start = nfa.add_state();
    let mut table = FragmentTable::new(spec, diags);
    let mut accepted = 0usize;

    for (id, tok) in spec.tokens.iter().enumerate() {
        if table.is_duplicate_token(id) {
            continue;
        }
        let frag = match compile(&tok.expr, &mut nfa, &mut table, alphabet) {
            Ok(f) => f,
            Err(e) => {
                diags.error(format!("token `{}`: {e}", tok.name), tok.location);
                continue;
            }
        };
        // A token that can match the empty input would stall the lexer.
        if nfa.reaches_by_epsilon(frag.entry, frag.exit) {
            diags.error(
                format!("token `{}` can match the empty string", tok.name),
                tok.location,
            );
            continue;
        }
        let start = nfa.start;
        nfa.add_eps(start, frag.entry);
        nfa.states[frag.exit as usize].accept = Some(Accept {
            token: id as u32,
            priority: id as u32,
        });
        accepted += 1;
    }

    log::debug!(
        "[tables] nfa: {} states, {accepted}/{} tokens",
        nfa.states.len(),
        spec.tokens.len()
    );
    (nfa, accepted)
}
