// src/parser/cpu.rs
// Table-driven shift-reduce driver; the reference for what the emitted
// tables accept.

use std::fmt;

use crate::parser::tables::{Action, ParseTable};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseError {
    /// index of the offending token (`input.len()` for end of input)
    pub position: usize,
    pub terminal: u32,
    pub state: u32,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unexpected terminal {} at token {} (state {})",
            self.terminal, self.position, self.state
        )
    }
}

/// Parses a terminal-id sequence (end of input is implicit) and returns the
/// productions reduced, in order.
pub fn parse_on_cpu(table: &ParseTable, input: &[u32]) -> Result<Vec<u32>, ParseError> {
    let mut stack: Vec<u32> = vec![0];
    let mut pos = 0usize;
    let mut reductions = Vec::new();

    loop {
        let la = input.get(pos).copied().unwrap_or(table.eof);
        let state = stack.last().copied().unwrap_or(0);
        let error = ParseError {
            position: pos,
            terminal: la,
            state,
        };
        // a declared terminal id equal to eof would be mistaken for end of input
        if pos < input.len() && la >= table.eof {
            return Err(error);
        }
        match table.action(state, la) {
            Some(Action::Shift(t)) => {
                stack.push(t);
                pos += 1;
            }
            Some(Action::Reduce(p)) => {
                let Some(info) = table.productions.get(p as usize) else {
                    return Err(error);
                };
                let len = info.len as usize;
                if len >= stack.len() {
                    return Err(error);
                }
                stack.truncate(stack.len() - len);
                let top = stack.last().copied().unwrap_or(0);
                let Some(next) = table.goto(top, info.lhs) else {
                    return Err(error);
                };
                stack.push(next);
                reductions.push(p);
            }
            Some(Action::Accept) => return Ok(reductions),
            None => return Err(error),
        }
    }
}
