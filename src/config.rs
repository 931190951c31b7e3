// src/config.rs
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::GenError;

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub lexer: LexerConfig,
    pub parser: ParserConfig,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct LexerConfig {
    /// Run Hopcroft minimization after subset construction.
    pub minimize: bool,
}

impl Default for LexerConfig {
    fn default() -> Self {
        Self { minimize: true }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ParserConfig {
    /// Merge LR(1) states by LR(0) core. Off gives the canonical LR(1) table.
    pub lalr: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self { lalr: true }
    }
}

impl Config {
    pub fn from_json_bytes(data: &[u8]) -> Result<Self, GenError> {
        Ok(serde_json::from_slice(data)?)
    }

    pub fn load(path: &Path) -> Result<Self, GenError> {
        let data = std::fs::read(path)?;
        Self::from_json_bytes(&data)
    }

    /// Applies `TABLEGEN_NO_MINIMIZE` / `TABLEGEN_CANONICAL_LR1` overrides.
    pub fn with_env_overrides(mut self) -> Self {
        if env_flag("TABLEGEN_NO_MINIMIZE") {
            self.lexer.minimize = false;
        }
        if env_flag("TABLEGEN_CANONICAL_LR1") {
            self.parser.lalr = false;
        }
        self
    }
}

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .map(|v| !v.is_empty() && v != "0")
        .unwrap_or(false)
}
