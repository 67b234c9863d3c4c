#![forbid(unsafe_code)]

//! Vow public facade crate.
//!
//! This crate provides the stable, ergonomic surface area for users.

pub use vow_future::Future;
pub use vow_outcome::{Completion, Outcome};
#[cfg(feature = "reactive")]
pub use vow_reactive::{Observable, ObservableOptions, Subscription, WeakObservable};

pub mod prelude {
    pub use vow_future as future;
    pub use vow_outcome as outcome;
    #[cfg(feature = "reactive")]
    pub use vow_reactive as reactive;
}
