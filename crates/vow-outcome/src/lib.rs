#![forbid(unsafe_code)]

//! Outcome: the shared error-channel currency of the Vow workspace.

pub mod outcome;

pub use outcome::{Completion, Outcome};
