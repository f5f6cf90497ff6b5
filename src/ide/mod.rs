//! Presentation of analysis results.
//!
//! Pure functions over the semantic model: data in, text out. Nothing here
//! computes — the [`hir`](crate::hir) layer does — and nothing here speaks
//! any particular protocol; hosts convert at their own boundary.

mod scope_context;

pub use scope_context::render_scope_context;
