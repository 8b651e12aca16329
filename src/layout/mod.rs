//! Decoding for the keyboard layout (`uchr`) resource.
//!
//! A layout resource starts with a small header and a table of 28-byte keyboard type entries.
//! Every entry points (by offset from the start of the resource) at the tables that apply to it:
//! - a modifier table, picking a code table for each modifier combination,
//! - a code table, mapping key codes to tagged values,
//! - optionally the dead-key state index, its terminators and its state names.
//!
//! All table offsets are relative to the table that declares them, except the state index whose
//! record offsets are relative to the whole resource. [`StateIndex::decode`] takes both spans to
//! keep that visible.
//!
//! Decoding is all-or-nothing: the first malformed field fails the whole resource.

mod code_table;
mod keyboard_type;
mod modifier_table;
mod resource;
mod state;

pub use code_table::CodeTable;
pub use keyboard_type::{KEYBOARD_TYPE_ENTRY_SIZE, KeyboardType};
pub use modifier_table::ModifierTable;
pub use resource::{FeatureInfo, LayoutHeader, LayoutResource};
pub use state::{StateIndex, StateNames, StateRecord, StateTerminators, Transition};
