// src/lexer/cpu.rs
// Maximal-munch reference lexer, used as the correctness oracle for the
// generated tables.

use crate::lexer::tables::{Automaton, dfa::longest_match};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuToken {
    pub kind: u32,
    pub start: usize,
    pub len: usize,
}

fn slice_dbg(src: &str, i: usize) -> (usize, String) {
    let mut lo = i.saturating_sub(16);
    while !src.is_char_boundary(lo) {
        lo -= 1;
    }
    let mut hi = (i + 16).min(src.len());
    while !src.is_char_boundary(hi) {
        hi += 1;
    }
    let s = src[lo..hi]
        .chars()
        .map(|c| {
            if c.is_ascii_graphic() || c == ' ' {
                c
            } else {
                '·'
            }
        })
        .collect();
    (lo, s)
}

/// Longest match at every position; ties between equal-length matches were
/// already settled by priority when the DFA was built.
///
/// `skip` filters tokens out of the result (whitespace, comments).
pub fn lex_on_cpu<A: Automaton + ?Sized>(
    automaton: &A,
    input: &str,
    skip: impl Fn(u32) -> bool,
) -> Result<Vec<CpuToken>, String> {
    let mut out = Vec::new();
    let mut pos = 0usize;
    while pos < input.len() {
        let Some((kind, len)) = longest_match(automaton, &input[pos..]) else {
            let (ctx_lo, ctx) = slice_dbg(input, pos);
            let c = input[pos..].chars().next().unwrap_or('\0');
            return Err(format!(
                "no token matches at byte {pos} (char {c:?}); context [{}..):\n{}",
                ctx_lo, ctx
            ));
        };
        if !skip(kind) {
            out.push(CpuToken {
                kind,
                start: pos,
                len,
            });
        }
        pos += len;
    }
    Ok(out)
}
