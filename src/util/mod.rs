//! Internal utilities for bit manipulation.
//!
//! This module contains low-level utilities used by the succinct data structures.
//! Most users should not need to use these directly.

pub(crate) mod broadword;
pub(crate) mod table;

pub use broadword::select_in_word;
