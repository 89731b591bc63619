//! Modifier ledger: named, independently removable stat adjustments.
//!
//! Composition order is fixed: flat additions, then summed percentages, then
//! multiplicative factors. Entries live in ordered maps so the result is
//! deterministic regardless of the order in which modifiers were applied.

mod stacking;
mod table;

pub mod stats;

pub use stacking::{CategoryTotals, ModifierKind};
pub use table::{Modifier, ModifierId, ModifierOwner, StatLedger};
