//! Error taxonomy for the analysis core.
//!
//! Conflicts are data, not errors: only infrastructure failures are
//! represented here. [`UnresolvedExternalSymbol`] never aborts a pass — a
//! single bad external reference degrades to "no conflict contribution".

use smol_str::SmolStr;
use thiserror::Error;

use crate::base::{FileId, TextSize};

/// A failure that aborts one query without corrupting any other state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    /// The position could not be associated with any syntax node. Fatal to
    /// this single query only; never produces a partial result.
    #[error("no syntax node covers offset {offset:?} in {file}")]
    InvalidPosition { file: FileId, offset: TextSize },

    /// Cooperative cancellation. Always safe to retry the whole query later.
    #[error("analysis was cancelled")]
    Cancelled,
}

/// An external symbol failed to resolve during the cross-file conflict pass.
///
/// Recoverable: the detector logs it at debug level and continues with the
/// next candidate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("external symbol `{name}` could not be resolved")]
pub struct UnresolvedExternalSymbol {
    pub name: SmolStr,
}

impl UnresolvedExternalSymbol {
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Self { name: name.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AnalysisError::InvalidPosition {
            file: FileId::new(3),
            offset: TextSize::from(42),
        };
        let rendered = err.to_string();
        assert!(rendered.contains("file#3"));

        assert_eq!(AnalysisError::Cancelled.to_string(), "analysis was cancelled");
    }
}
