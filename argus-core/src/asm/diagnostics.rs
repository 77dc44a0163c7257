//! Assembler diagnostics: collected, non-aborting error records keyed to a source line.

use colored::Colorize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub line: usize,
    pub source_line: String,
    pub message: String,
    pub severity: Severity,
}

impl Diagnostic {
    pub fn error(line: usize, source_line: impl Into<String>, message: impl Into<String>) -> Diagnostic {
        Diagnostic {
            line,
            source_line: source_line.into(),
            message: message.into(),
            severity: Severity::Error,
        }
    }

    pub fn warning(line: usize, source_line: impl Into<String>, message: impl Into<String>) -> Diagnostic {
        Diagnostic {
            line,
            source_line: source_line.into(),
            message: message.into(),
            severity: Severity::Warning,
        }
    }

    /// A human-readable, colored rendering suitable for printing to a terminal.
    pub fn nice_message(&self) -> String {
        let tag = match self.severity {
            Severity::Error => "error".red().bold(),
            Severity::Warning => "warning".yellow().bold(),
        };
        format!(
            "{}: {} (line {})\n  {}",
            tag,
            self.message,
            self.line,
            self.source_line.trim().dimmed()
        )
    }
}

/// An append-only collection of diagnostics, accumulated across both assembler passes.
#[derive(Debug, Default)]
pub struct Diagnostics {
    records: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Diagnostics {
        Diagnostics { records: Vec::new() }
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.records.push(diagnostic);
    }

    pub fn has_errors(&self) -> bool {
        self.records.iter().any(|d| d.severity == Severity::Error)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
