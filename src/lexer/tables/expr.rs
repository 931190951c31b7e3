// src/lexer/tables/expr.rs
// Token-expression AST handed over by the grammar front-end.
use serde::{Deserialize, Serialize};

use crate::Location;

pub const MAX_CODE_POINT: u32 = 0x10FFFF;

/// Closed code-point interval `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Range {
    pub min: u32,
    pub max: u32,
}

impl Range {
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    pub const fn single(c: char) -> Self {
        Self {
            min: c as u32,
            max: c as u32,
        }
    }

    pub fn chars(lo: char, hi: char) -> Self {
        Self::new(lo as u32, hi as u32)
    }

    #[inline]
    pub fn contains(&self, c: u32) -> bool {
        self.min <= c && c <= self.max
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Expr {
    /// Character class: any code point in one of the ranges.
    Ranges(Vec<Range>),
    /// Any code point in `0..=MAX_CODE_POINT` outside the ranges.
    Negated(Vec<Range>),
    Str(String),
    Concat(Vec<Expr>),
    Union(Vec<Expr>),
    Optional(Box<Expr>),
    Star(Box<Expr>),
    Plus(Box<Expr>),
    /// Named fragment (or token) instantiated at this point.
    Ref(String),
}

impl Expr {
    pub fn lit(s: &str) -> Self {
        Expr::Str(s.to_string())
    }

    pub fn range(lo: char, hi: char) -> Self {
        Expr::Ranges(vec![Range::chars(lo, hi)])
    }

    pub fn class(ranges: &[(char, char)]) -> Self {
        Expr::Ranges(ranges.iter().map(|&(lo, hi)| Range::chars(lo, hi)).collect())
    }

    pub fn not_class(ranges: &[(char, char)]) -> Self {
        Expr::Negated(ranges.iter().map(|&(lo, hi)| Range::chars(lo, hi)).collect())
    }

    pub fn seq(parts: Vec<Expr>) -> Self {
        Expr::Concat(parts)
    }

    pub fn alt(parts: Vec<Expr>) -> Self {
        Expr::Union(parts)
    }

    pub fn opt(e: Expr) -> Self {
        Expr::Optional(Box::new(e))
    }

    pub fn star(e: Expr) -> Self {
        Expr::Star(Box::new(e))
    }

    pub fn plus(e: Expr) -> Self {
        Expr::Plus(Box::new(e))
    }

    pub fn reference(name: &str) -> Self {
        Expr::Ref(name.to_string())
    }

    /// Pushes every literal range this expression mentions (without following
    /// references; the referenced definitions contribute their own).
    pub fn collect_ranges(&self, out: &mut Vec<Range>) {
        let mut stack = vec![self];
        while let Some(e) = stack.pop() {
            match e {
                Expr::Ranges(rs) => out.extend(rs.iter().copied()),
                Expr::Negated(rs) => out.extend(complement(rs)),
                Expr::Str(s) => out.extend(s.chars().map(Range::single)),
                Expr::Concat(parts) | Expr::Union(parts) => stack.extend(parts.iter()),
                Expr::Optional(inner) | Expr::Star(inner) | Expr::Plus(inner) => stack.push(inner),
                Expr::Ref(_) => {}
            }
        }
    }
}

/// Complement of `ranges` over `0..=MAX_CODE_POINT`.
pub fn complement(ranges: &[Range]) -> Vec<Range> {
    let mut sorted: Vec<Range> = ranges
        .iter()
        .copied()
        .filter(|r| r.min <= r.max && r.min <= MAX_CODE_POINT)
        .collect();
    sorted.sort();
    let mut out = Vec::new();
    let mut next = 0u32;
    let mut covered_to_end = false;
    for r in sorted {
        if r.min > next {
            out.push(Range::new(next, r.min - 1));
        }
        if r.max >= MAX_CODE_POINT {
            covered_to_end = true;
            break;
        }
        next = next.max(r.max + 1);
    }
    if !covered_to_end && next <= MAX_CODE_POINT {
        out.push(Range::new(next, MAX_CODE_POINT));
    }
    out
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Definition {
    pub name: String,
    pub expr: Expr,
    #[serde(default)]
    pub location: Option<Location>,
}

impl Definition {
    pub fn new(name: &str, expr: Expr) -> Self {
        Self {
            name: name.to_string(),
            expr,
            location: None,
        }
    }

    pub fn at(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }
}

/// Token and fragment definitions.
///
/// A token's id is its declaration index, which is also its priority:
/// earlier declarations win equal-length matches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LexSpec {
    #[serde(default)]
    pub fragments: Vec<Definition>,
    pub tokens: Vec<Definition>,
}

impl LexSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fragment(mut self, name: &str, expr: Expr) -> Self {
        self.fragments.push(Definition::new(name, expr));
        self
    }

    pub fn token(mut self, name: &str, expr: Expr) -> Self {
        self.tokens.push(Definition::new(name, expr));
        self
    }

    pub fn token_names(&self) -> Vec<String> {
        self.tokens.iter().map(|t| t.name.clone()).collect()
    }

    /// Every literal range in every definition.
    pub fn literal_ranges(&self) -> Vec<Range> {
        let mut out = Vec::new();
        for d in self.fragments.iter().chain(self.tokens.iter()) {
            d.expr.collect_ranges(&mut out);
        }
        out
    }
}
