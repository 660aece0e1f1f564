//! Foundation types for the TTCN-3 analysis engine.
//!
//! This module provides fundamental types used throughout the crate:
//! - [`FileId`] - Source artifact identifiers
//! - [`Identifier`] - Canonical name plus display spelling
//! - [`Location`] - File plus half-open byte range
//! - [`LineCol`], [`LineIndex`] - Line/column conversion for presentation
//! - [`Shift`] - Moving positioned data after an edit
//!
//! This module has NO dependencies on other crate modules.

mod file_id;
mod identifier;
mod line_index;
mod location;

pub use file_id::FileId;
pub use identifier::Identifier;
pub use line_index::{LineCol, LineIndex};
pub use location::{Location, Shift};
pub(crate) use location::{envelops, overlaps};

// Re-export text-size types for convenience
pub use text_size::{self, TextRange, TextSize};
