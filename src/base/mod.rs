//! Foundation types for the Kite front-end.
//!
//! This module provides fundamental types used throughout the analyzer:
//! - [`FileId`], [`ModuleId`] - interned file and module identifiers
//! - [`TextRange`], [`TextSize`] - source positions
//! - [`LineCol`], [`LineIndex`] - line/column conversion for display
//! - [`Name`], [`Interner`] - string interning
//!
//! This module has NO dependencies on other kite modules.

mod file_id;
mod intern;
mod span;

pub use file_id::{FileId, ModuleId};
pub use intern::{Interner, Name};
pub use span::{LineCol, LineIndex, TextRange, TextSize};
