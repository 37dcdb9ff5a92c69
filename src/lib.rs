//! Book store service library
//!
//! Wires the books module onto the shared document store.

pub mod modules;

pub use modules::*;
