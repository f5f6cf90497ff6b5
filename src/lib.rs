//! # kite-base
//!
//! Core library for Kite name resolution, scope analysis, and
//! declaration-conflict checking.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! ide     → presentation of analysis results
//!   ↓
//! hir     → semantic model: declarations, scopes, conflicts
//!   ↓
//! syntax  → position-addressable syntax trees
//!   ↓
//! base    → primitives (FileId, Span, Name interning)
//! ```
//!
//! The two engines of the crate are
//! [`ScopeContextBuilder`](hir::ScopeContextBuilder), which maps a lexical
//! position to the ordered tower of visible scopes, and
//! [`DeclarationInspector`](hir::DeclarationInspector), which computes
//! redeclaration conflicts among sibling declarations — locally and across
//! the files of a package.
//!
//! Parsing, type inference, and result caching are collaborators, not
//! residents: syntax trees, declarations, and types arrive already built,
//! and everything is recomputed from the snapshot on demand.

/// Foundation types: FileId, ModuleId, spans, Name interning
pub mod base;

/// Semantic model: declarations, types, scope towers, conflicts
pub mod hir;

/// Presentation of analysis results
pub mod ide;

/// Position-addressable syntax trees
pub mod syntax;

// Re-export the foundation types
pub use base::{FileId, Interner, LineCol, LineIndex, ModuleId, Name, TextRange, TextSize};
