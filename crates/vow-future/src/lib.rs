#![forbid(unsafe_code)]

//! Futures: deferred computations delivering a single outcome.

pub mod future;

pub use future::Future;
pub use vow_outcome::{Completion, Outcome};
