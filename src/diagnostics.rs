// src/diagnostics.rs
use std::fmt;

use serde::{Deserialize, Serialize};

/// 1-based position in the grammar source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Location {
    pub line: u32,
    pub column: u32,
}

impl Location {
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub location: Option<Location>,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        match self.location {
            Some(loc) => write!(f, "{tag} at {loc}: {}", self.message),
            None => write!(f, "{tag}: {}", self.message),
        }
    }
}

/// Collector for recoverable problems.
///
/// Construction never stops on a diagnostic; callers check [`had_error`]
/// after the full run before emitting anything.
///
/// [`had_error`]: Diagnostics::had_error
#[derive(Debug, Default, Clone)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&mut self, message: impl Into<String>, location: Option<Location>) {
        self.push(Severity::Error, message.into(), location);
    }

    pub fn warning(&mut self, message: impl Into<String>, location: Option<Location>) {
        self.push(Severity::Warning, message.into(), location);
    }

    fn push(&mut self, severity: Severity, message: String, location: Option<Location>) {
        let d = Diagnostic {
            severity,
            message,
            location,
        };
        match severity {
            Severity::Error => log::error!("{d}"),
            Severity::Warning => log::warn!("{d}"),
        }
        self.items.push(d);
    }

    pub fn had_error(&self) -> bool {
        self.items.iter().any(|d| d.severity == Severity::Error)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter().filter(|d| d.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter().filter(|d| d.severity == Severity::Warning)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
