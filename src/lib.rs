//! Table generator backend.
//!
//! Two independent pipelines, both consuming already-flattened grammar
//! front-end output:
//!
//! * lexer: token expressions -> disjoint range alphabet -> Thompson NFA ->
//!   subset-constructed DFA -> Hopcroft-minimized DFA -> [`lexer::tables::LexerTables`]
//! * parser: [`grammar::Grammar`] -> FIRST sets -> canonical LR(1) collection ->
//!   LALR(1) merge -> [`parser::tables::ParseTable`]
//!
//! Recoverable problems go to a [`diagnostics::Diagnostics`] collector that is
//! threaded through every construction call; structural failures come back as
//! [`error::GenError`].

pub mod config;
pub mod dev;
pub mod diagnostics;
pub mod error;
pub mod grammar;
pub mod lexer;
pub mod parser;

pub use config::{Config, LexerConfig, ParserConfig};
pub use diagnostics::{Diagnostic, Diagnostics, Location, Severity};
pub use error::GenError;

/// Output of a full generator run.
pub struct Generated {
    pub lexer: lexer::tables::LexerTables,
    pub parser: parser::tables::ParseTable,
}

/// Runs both pipelines.
///
/// Both sides always run so that every recoverable diagnostic is collected in
/// one pass; callers must still check [`Diagnostics::had_error`] before
/// emitting anything from the result.
pub fn generate(
    spec: &lexer::tables::LexSpec,
    grammar: &grammar::Grammar,
    config: &Config,
    diags: &mut Diagnostics,
) -> Result<Generated, GenError> {
    let dfa = lexer::tables::build_lexer(spec, &config.lexer, diags);
    let table = parser::tables::build_parser(grammar, &config.parser, diags);
    let dfa = dfa?;
    let table = table?;
    Ok(Generated {
        lexer: lexer::tables::LexerTables::from_dfa(&dfa, spec),
        parser: table,
    })
}
