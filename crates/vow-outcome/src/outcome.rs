#![forbid(unsafe_code)]

//! Two-variant outcome type with short-circuiting combinators.
//!
//! [`Outcome<T, E>`] holds either a success payload or a failure payload,
//! never both. It converts losslessly to and from `std::result::Result`;
//! the surface it adds on top is the continuation-passing bridge
//! ([`and_then_async`](Outcome::and_then_async)) used to thread a
//! synchronous outcome into callback-based asynchronous code.
//!
//! # Invariants
//!
//! 1. Exactly one variant is inhabited; there is no partial or empty state.
//! 2. Once constructed, an outcome is never mutated.
//! 3. Combinators never swallow a failure: every operation that can observe
//!    a `Failure` forwards it unchanged, and the success-side transform is
//!    never invoked on a failure.
//! 4. The error type `E` is caller-supplied and opaque; this module never
//!    synthesizes an error except by capturing an explicit `Err` in
//!    [`from_fallible`](Outcome::from_fallible).

/// Completion callback consuming a single outcome.
///
/// This is the terminal shape shared with `vow-future`: a continuation that
/// is invoked exactly once with the final outcome of a computation.
pub type Completion<T, E> = Box<dyn FnOnce(Outcome<T, E>)>;

/// Either a success payload or a failure payload, never both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome<T, E> {
    /// The computation produced a value.
    Success(T),
    /// The computation failed with a caller-defined error.
    Failure(E),
}

impl<T, E> Outcome<T, E> {
    /// Run `block` exactly once, synchronously, capturing its result.
    ///
    /// An `Err` becomes [`Outcome::Failure`]; an `Ok` becomes
    /// [`Outcome::Success`]. The conversion from the host failure mechanism
    /// is explicit; no coercion between error types takes place.
    pub fn from_fallible(block: impl FnOnce() -> Result<T, E>) -> Self {
        match block() {
            Ok(value) => Self::Success(value),
            Err(error) => Self::Failure(error),
        }
    }

    /// True if this outcome holds a success payload.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// True if this outcome holds a failure payload.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }

    /// The success payload, if present.
    #[must_use]
    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Success(value) => Some(value),
            Self::Failure(_) => None,
        }
    }

    /// The failure payload, if present.
    #[must_use]
    pub fn error(&self) -> Option<&E> {
        match self {
            Self::Success(_) => None,
            Self::Failure(error) => Some(error),
        }
    }

    /// Consume the outcome, yielding the success payload if present.
    #[must_use]
    pub fn into_value(self) -> Option<T> {
        match self {
            Self::Success(value) => Some(value),
            Self::Failure(_) => None,
        }
    }

    /// Consume the outcome, yielding the failure payload if present.
    #[must_use]
    pub fn into_error(self) -> Option<E> {
        match self {
            Self::Success(_) => None,
            Self::Failure(error) => Some(error),
        }
    }

    /// Apply `transform` to the success payload.
    ///
    /// A failure passes through untouched and `transform` is never invoked.
    #[must_use]
    pub fn map<U>(self, transform: impl FnOnce(T) -> U) -> Outcome<U, E> {
        match self {
            Self::Success(value) => Outcome::Success(transform(value)),
            Self::Failure(error) => Outcome::Failure(error),
        }
    }

    /// Chain a fallible continuation.
    ///
    /// On success, `transform` decides the combined outcome; on failure the
    /// chain short-circuits without invoking `transform`. The continuation
    /// may return either an [`Outcome<U, E>`] or a `Result<U, E>`; both
    /// convert in.
    #[must_use]
    pub fn and_then<U, O>(self, transform: impl FnOnce(T) -> O) -> Outcome<U, E>
    where
        O: Into<Outcome<U, E>>,
    {
        match self {
            Self::Success(value) => transform(value).into(),
            Self::Failure(error) => Outcome::Failure(error),
        }
    }

    /// Bridge this outcome into a continuation-passing computation.
    ///
    /// Returns a deferred operation: invoked with a downstream continuation,
    /// it either feeds the success payload and the continuation into
    /// `operation`, or, on failure, invokes the continuation immediately
    /// with the failure. This is the glue that lets an already-resolved
    /// outcome participate in callback-based async code without a dedicated
    /// future.
    pub fn and_then_async<U>(
        self,
        operation: impl FnOnce(T, Completion<U, E>),
    ) -> impl FnOnce(Completion<U, E>) {
        move |continuation: Completion<U, E>| match self {
            Self::Success(value) => operation(value, continuation),
            Self::Failure(error) => continuation(Outcome::Failure(error)),
        }
    }

    /// The success payload, or `default` on failure.
    #[must_use]
    pub fn value_or(self, default: T) -> T {
        match self {
            Self::Success(value) => value,
            Self::Failure(_) => default,
        }
    }

    /// The success payload, or a default computed lazily from the failure.
    #[must_use]
    pub fn value_or_else(self, default: impl FnOnce(E) -> T) -> T {
        match self {
            Self::Success(value) => value,
            Self::Failure(error) => default(error),
        }
    }
}

impl<T, E> From<Result<T, E>> for Outcome<T, E> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Self::Success(value),
            Err(error) => Self::Failure(error),
        }
    }
}

impl<T, E> From<Outcome<T, E>> for Result<T, E> {
    fn from(outcome: Outcome<T, E>) -> Self {
        match outcome {
            Outcome::Success(value) => Ok(value),
            Outcome::Failure(error) => Err(error),
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
