#![forbid(unsafe_code)]

//! Deferred computations with an explicit error channel.
//!
//! [`Future<T, E>`] wraps a single asynchronous operation: a function that,
//! given a completion callback, eventually invokes that callback exactly
//! once with an [`Outcome<T, E>`]. A future is a recipe, not a cached value.
//! Combinators build new recipes that close over the original without
//! executing anything; only [`execute`](Future::execute) drives evaluation.
//!
//! The operation may invoke its completion synchronously (same call stack)
//! or from any later same-thread context such as an event-loop callback.
//!
//! # Invariants
//!
//! 1. The wrapped operation must invoke its completion at most once per
//!    `execute` call. This is a documented contract on the operation
//!    author, not a runtime check.
//! 2. `and_then`'s second stage begins strictly after the first stage's
//!    completion has fired; there is no interleaving.
//! 3. `map`'s transform runs synchronously inside the upstream completion,
//!    before the downstream completion fires.
//! 4. No outcome is stored: re-executing re-runs the operation and its
//!    side effects. Callers needing at-most-once side effects must provide
//!    that guarantee inside the operation itself.
//!
//! # Failure Modes
//!
//! - **Operation never completes**: the completion stays pending forever
//!   and every composed future downstream stays unresolved. No timeout or
//!   cancellation primitive exists at this layer.
//! - **Operation completes twice**: the caller's completion is invoked
//!   twice; behavior of the surrounding program is unspecified.

use std::fmt;
use std::rc::Rc;

use vow_outcome::{Completion, Outcome};

/// A deferred computation that eventually yields one [`Outcome<T, E>`].
///
/// Cloning a `Future` creates another handle to the **same** recipe; both
/// handles execute the same underlying operation.
pub struct Future<T, E> {
    operation: Rc<dyn Fn(Completion<T, E>)>,
}

impl<T, E> Clone for Future<T, E> {
    fn clone(&self) -> Self {
        Self {
            operation: Rc::clone(&self.operation),
        }
    }
}

impl<T, E> fmt::Debug for Future<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Future").finish_non_exhaustive()
    }
}

impl<T: 'static, E: 'static> Future<T, E> {
    /// Wrap a raw operation.
    ///
    /// The operation receives the completion callback for one execution and
    /// must invoke it exactly once, now or later.
    #[must_use]
    pub fn new(operation: impl Fn(Completion<T, E>) + 'static) -> Self {
        Self {
            operation: Rc::new(operation),
        }
    }

    /// A future that completes immediately and synchronously with a clone
    /// of `outcome` on every execution.
    #[must_use]
    pub fn from_outcome(outcome: Outcome<T, E>) -> Self
    where
        T: Clone,
        E: Clone,
    {
        Self::new(move |completion| completion(outcome.clone()))
    }

    /// A future that completes immediately with `Success(value)`.
    #[must_use]
    pub fn from_value(value: T) -> Self
    where
        T: Clone,
        E: Clone,
    {
        Self::from_outcome(Outcome::Success(value))
    }

    /// A future that completes immediately with `Failure(error)`.
    #[must_use]
    pub fn from_error(error: E) -> Self
    where
        T: Clone,
        E: Clone,
    {
        Self::from_outcome(Outcome::Failure(error))
    }

    /// Run the wrapped operation, forwarding its single callback invocation
    /// unchanged to `completion`. No retry, no timeout.
    pub fn execute(&self, completion: impl FnOnce(Outcome<T, E>) + 'static) {
        #[cfg(feature = "tracing")]
        log_execute("completion");
        self.run(Box::new(completion));
    }

    /// Run the wrapped operation, destructuring the outcome before
    /// forwarding: `on_success` on `Success`, `on_failure` on `Failure`,
    /// never both.
    pub fn execute_with(
        &self,
        on_success: impl FnOnce(T) + 'static,
        on_failure: impl FnOnce(E) + 'static,
    ) {
        #[cfg(feature = "tracing")]
        log_execute("handlers");
        self.run(Box::new(move |outcome| match outcome {
            Outcome::Success(value) => on_success(value),
            Outcome::Failure(error) => on_failure(error),
        }));
    }

    /// Sequential composition.
    ///
    /// On execute: run `self`; on success, feed the payload into
    /// `transform` and execute the future it returns, forwarding that
    /// future's outcome as the final result. On failure, short-circuit with
    /// the original failure without ever invoking `transform`.
    #[must_use]
    pub fn and_then<U: 'static>(
        &self,
        transform: impl Fn(T) -> Future<U, E> + 'static,
    ) -> Future<U, E> {
        let upstream = self.clone();
        let transform = Rc::new(transform);
        Future::new(move |completion: Completion<U, E>| {
            let transform = Rc::clone(&transform);
            upstream.run(Box::new(move |outcome| match outcome {
                Outcome::Success(value) => transform(value).run(completion),
                Outcome::Failure(error) => completion(Outcome::Failure(error)),
            }));
        })
    }

    /// Transform the success payload.
    ///
    /// The transform runs synchronously inside the upstream completion and
    /// must not itself fail; a failing transform requires
    /// [`and_then`](Future::and_then) instead. Failures are forwarded
    /// unchanged without invoking `transform`.
    #[must_use]
    pub fn map<U: 'static>(&self, transform: impl Fn(T) -> U + 'static) -> Future<U, E> {
        let upstream = self.clone();
        let transform = Rc::new(transform);
        Future::new(move |completion: Completion<U, E>| {
            let transform = Rc::clone(&transform);
            upstream.run(Box::new(move |outcome| {
                completion(outcome.map(|value| transform(value)));
            }));
        })
    }

    fn run(&self, completion: Completion<T, E>) {
        (self.operation)(completion);
    }
}

#[cfg(feature = "tracing")]
fn log_execute(kind: &str) {
    tracing::trace!(message = "future.execute", kind);
}

// ─── Tests ───────────────────────────────────────────────────────────────────
