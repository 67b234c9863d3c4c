#![forbid(unsafe_code)]

//! Reactive value streams for Vow.
//!
//! This crate provides the push-stream primitive and the outcome-carrying
//! combinators built on top of it:
//!
//! - [`Observable`]: a shared, version-tracked value stream with change
//!   notification via subscriber callbacks.
//! - [`Subscription`]: RAII guard that automatically unsubscribes on drop.
//! - Outcome-stream combinators (`then`, `then_stream`, `next`, `error`,
//!   `peek`) letting a stream of [`vow_outcome::Outcome`] values chain with
//!   short-circuit-on-failure semantics.

pub mod observable;
pub mod outcome_stream;

pub use observable::{Observable, ObservableOptions, Subscription, WeakObservable};
