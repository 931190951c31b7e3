// src/lexer/tables/build.rs
use std::time::Instant;

use super::{alphabet::RangeAlphabet, dfa::Dfa, expr::LexSpec, minimize::minimize, nfa::build_nfa};
use crate::{Diagnostics, GenError, LexerConfig};

/// Token expressions -> (minimal) DFA.
///
/// Rules with undefined references, duplicate names, or empty matches are
/// reported and skipped; the build only fails when nothing is left.
pub fn build_lexer(
    spec: &LexSpec,
    config: &LexerConfig,
    diags: &mut Diagnostics,
) -> Result<Dfa, GenError> {
    if spec.tokens.is_empty() {
        return Err(GenError::NoTokens);
    }
    let t0 = Instant::now();

    let alphabet = RangeAlphabet::build(&spec.literal_ranges());
    let (nfa, accepted) = build_nfa(spec, &alphabet, diags);
    if accepted == 0 {
        return Err(GenError::AllTokensRejected(spec.tokens.len()));
    }
    log::info!(
        "[lexer] alphabet = {} symbols, nfa = {} states (took {:?})",
        alphabet.len(),
        nfa.states.len(),
        t0.elapsed()
    );

    let t1 = Instant::now();
    let dfa = Dfa::from_nfa(&nfa, &alphabet);
    log::info!(
        "[lexer] subset construction: {} states (took {:?})",
        dfa.n_states(),
        t1.elapsed()
    );

    if !config.minimize {
        return Ok(dfa);
    }
    let t2 = Instant::now();
    let min = minimize(&dfa);
    log::info!(
        "[lexer] minimized {} -> {} states (took {:?})",
        dfa.n_states(),
        min.n_states(),
        t2.elapsed()
    );
    Ok(min)
}
