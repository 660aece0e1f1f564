//! Incremental re-parsing after text edits.
//!
//! An edit is turned into a [`DamageRegion`]. The items of the edited module
//! are classified against it, the region is grown over neighbours the new
//! text lexically extends, and only that region is re-parsed. Escalation to
//! a wider region is signalled with [`SyntaxDamage`].

mod damage;
mod reparse;

pub use damage::{
    DamageClassification, DamageRegion, Growth, TextEdit, classify_elements, grow,
};
pub use reparse::{ReparseEngine, ReparseOutcome, SyntaxDamage};
