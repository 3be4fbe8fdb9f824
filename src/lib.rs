//! Facade over the `munch` engine crates.

pub use munch_core::*;
