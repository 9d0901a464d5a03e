//! Nemein (workspace facade crate).
//!
//! Re-exports the member crates under one name: `nemein::{types, core, adapter}`.

pub use nemein_adapter as adapter;
pub use nemein_core as core;
pub use nemein_types as types;
