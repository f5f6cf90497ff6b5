//! Semantic error reporting.
//!
//! The conflict detector produces conflict *sets*; this module turns them
//! into user-facing redeclaration diagnostics — one per offending
//! declaration, each carrying every colliding declaration as related
//! information.

use std::sync::Arc;

use crate::base::{FileId, Interner, TextRange};
use super::conflicts::DeclarationInspector;
use super::symbols::Declarations;

/// Severity level of a diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
    Warning,
    Info,
    Hint,
}

impl Severity {
    /// Convert to LSP severity number.
    pub fn to_lsp(&self) -> u32 {
        match self {
            Severity::Error => 1,
            Severity::Warning => 2,
            Severity::Info => 3,
            Severity::Hint => 4,
        }
    }
}

/// A diagnostic message with location.
#[derive(Clone, Debug)]
pub struct Diagnostic {
    pub file: FileId,
    pub range: TextRange,
    pub severity: Severity,
    /// Error/warning code (e.g. "E1001").
    pub code: Option<Arc<str>>,
    pub message: Arc<str>,
    /// Locations of the other parties to this diagnostic.
    pub related: Vec<RelatedInfo>,
}

/// Related information for a diagnostic.
#[derive(Clone, Debug)]
pub struct RelatedInfo {
    pub file: FileId,
    pub range: TextRange,
    pub message: Arc<str>,
}

impl Diagnostic {
    /// Create a new error diagnostic.
    pub fn error(file: FileId, range: TextRange, message: impl Into<Arc<str>>) -> Self {
        Self {
            file,
            range,
            severity: Severity::Error,
            code: None,
            message: message.into(),
            related: Vec::new(),
        }
    }

    /// Set the error code.
    pub fn with_code(mut self, code: impl Into<Arc<str>>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Add related information.
    pub fn with_related(mut self, info: RelatedInfo) -> Self {
        self.related.push(info);
        self
    }
}

/// Standard diagnostic codes for this crate's errors.
pub mod codes {
    /// Conflicting redeclaration of the same name and signature.
    pub const REDECLARATION: &str = "E1001";
    /// Conflicting overloads across files of a package.
    pub const CONFLICTING_OVERLOADS: &str = "E1002";
}

/// Collects diagnostics during an analysis pass.
#[derive(Clone, Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    /// Create a new empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a diagnostic.
    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Add a redeclaration error, relating every other occupant of the name.
    pub fn redeclaration(
        &mut self,
        file: FileId,
        range: TextRange,
        name: &str,
        others: &[(FileId, TextRange)],
    ) {
        let mut diag = Diagnostic::error(file, range, format!("conflicting declarations of '{name}'"))
            .with_code(codes::REDECLARATION);
        for &(other_file, other_range) in others {
            diag = diag.with_related(RelatedInfo {
                file: other_file,
                range: other_range,
                message: Arc::from(format!("'{name}' is also declared here")),
            });
        }
        self.add(diag);
    }

    /// Get all diagnostics.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Get diagnostics for a specific file.
    pub fn diagnostics_for_file(&self, file: FileId) -> Vec<&Diagnostic> {
        self.diagnostics.iter().filter(|d| d.file == file).collect()
    }

    /// Get the number of errors.
    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .count()
    }

    /// Check if there are any errors.
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity == Severity::Error)
    }

    /// Take all diagnostics, leaving the collector empty.
    pub fn take(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    /// Clear all diagnostics.
    pub fn clear(&mut self) {
        self.diagnostics.clear();
    }
}

/// Report one redeclaration diagnostic per declaration with a non-empty
/// conflict set.
pub fn report_redeclarations(
    decls: &Declarations,
    interner: &Interner,
    inspector: &DeclarationInspector<'_>,
    collector: &mut DiagnosticCollector,
) {
    for decl in inspector.declarations_with_conflicts() {
        let data = decls.get(decl);
        let name = interner.get(data.name);
        let others: Vec<_> = inspector
            .conflicts_for(decl)
            .into_iter()
            .map(|other| {
                let other_data = decls.get(other);
                (other_data.file, other_data.range)
            })
            .collect();
        collector.redeclaration(data.file, data.range, &name, &others);
    }
}
