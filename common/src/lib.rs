//! Shared data model for a generated slide deck.

mod types;

pub use types::*;
