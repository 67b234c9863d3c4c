#![forbid(unsafe_code)]

//! Short-circuiting combinators for outcome-carrying streams.
//!
//! A stream whose element type is [`Outcome<V, E>`] can be chained so that
//! transforms run only on success deliveries, with failures forwarded
//! unchanged. This is the stream analogue of `Future::and_then`. Every derived
//! stream is constructed with its upstream's [`ObservableOptions`],
//! unchanged.
//!
//! The combinators register standing subscriptions: the registration lives
//! as long as the upstream stream, and each upstream holds its derived
//! streams alive through the relay callbacks. Flattening combinators
//! ([`then_stream`](Observable::then_stream),
//! [`then_outcome_stream`](Observable::then_outcome_stream)) additionally
//! retain the per-delivery inner streams on the derived stream, while their
//! relay callbacks hold only a weak downstream handle, so no reference
//! cycle forms.

use vow_outcome::Outcome;

use crate::observable::Observable;

impl<T: Clone + 'static> Observable<T> {
    /// Derive an outcome stream by running a fallible transform on every
    /// delivery, capturing an `Err` as a `Failure`.
    #[must_use]
    pub fn try_map<U, E>(
        &self,
        transform: impl Fn(&T) -> Result<U, E> + 'static,
    ) -> Observable<Outcome<U, E>>
    where
        U: Clone + 'static,
        E: Clone + 'static,
    {
        let downstream = Observable::with_options(self.options());
        let relay = downstream.clone();
        self.subscribe_forever(move |value: &T| {
            relay.update(Outcome::from_fallible(|| transform(value)));
        });
        downstream
    }
}

impl<V, E> Observable<Outcome<V, E>>
where
    V: Clone + 'static,
    E: Clone + 'static,
{
    /// Chain a transform that runs only on success deliveries.
    ///
    /// On `Success(v)`, `transform` decides the downstream outcome; it may
    /// return an [`Outcome<U, E>`] or a `Result<U, E>`, both convert in.
    /// On `Failure`, the failure is forwarded unchanged without invoking
    /// `transform`.
    #[must_use]
    pub fn then<U, O>(&self, transform: impl Fn(&V) -> O + 'static) -> Observable<Outcome<U, E>>
    where
        U: Clone + 'static,
        O: Into<Outcome<U, E>>,
    {
        let downstream = Observable::with_options(self.options());
        let relay = downstream.clone();
        self.subscribe_forever(move |outcome: &Outcome<V, E>| match outcome {
            Outcome::Success(value) => relay.update(transform(value).into()),
            Outcome::Failure(error) => relay.update(Outcome::Failure(error.clone())),
        });
        downstream
    }

    /// Chain an infallible transform over success deliveries.
    #[must_use]
    pub fn then_map<U>(&self, transform: impl Fn(&V) -> U + 'static) -> Observable<Outcome<U, E>>
    where
        U: Clone + 'static,
    {
        self.then(move |value| Outcome::Success(transform(value)))
    }

    /// Chain a transform producing a whole stream per success delivery.
    ///
    /// Each delivery of the produced stream is relayed downstream as a
    /// `Success`; an upstream `Failure` is forwarded downstream directly.
    /// This is stream-level flattening, the asynchronous analogue of
    /// `Future::and_then`.
    #[must_use]
    pub fn then_stream<U>(
        &self,
        transform: impl Fn(&V) -> Observable<U> + 'static,
    ) -> Observable<Outcome<U, E>>
    where
        U: Clone + 'static,
    {
        let downstream = Observable::with_options(self.options());
        let relay = downstream.clone();
        self.subscribe_forever(move |outcome: &Outcome<V, E>| match outcome {
            Outcome::Success(value) => {
                let inner = transform(value);
                let weak = relay.downgrade();
                inner.subscribe_forever(move |value: &U| {
                    if let Some(downstream) = weak.upgrade() {
                        downstream.update(Outcome::Success(value.clone()));
                    }
                });
                relay.retain_source(inner);
            }
            Outcome::Failure(error) => relay.update(Outcome::Failure(error.clone())),
        });
        downstream
    }

    /// Chain a transform producing an outcome-carrying stream per success
    /// delivery, relaying its outcomes downstream verbatim.
    #[must_use]
    pub fn then_outcome_stream<U>(
        &self,
        transform: impl Fn(&V) -> Observable<Outcome<U, E>> + 'static,
    ) -> Observable<Outcome<U, E>>
    where
        U: Clone + 'static,
    {
        let downstream = Observable::with_options(self.options());
        let relay = downstream.clone();
        self.subscribe_forever(move |outcome: &Outcome<V, E>| match outcome {
            Outcome::Success(value) => {
                let inner = transform(value);
                let weak = relay.downgrade();
                inner.subscribe_forever(move |inner_outcome: &Outcome<U, E>| {
                    if let Some(downstream) = weak.upgrade() {
                        downstream.update(inner_outcome.clone());
                    }
                });
                relay.retain_source(inner);
            }
            Outcome::Failure(error) => relay.update(Outcome::Failure(error.clone())),
        });
        downstream
    }

    /// Observe only success deliveries.
    ///
    /// Registers a standing subscription and returns a handle to the same
    /// stream for continued chaining.
    pub fn next(&self, block: impl Fn(&V) + 'static) -> Observable<Outcome<V, E>> {
        self.subscribe_forever(move |outcome: &Outcome<V, E>| {
            if let Outcome::Success(value) = outcome {
                block(value);
            }
        });
        self.clone()
    }

    /// Observe only failure deliveries.
    ///
    /// Registers a standing subscription and returns a handle to the same
    /// stream for continued chaining.
    pub fn error(&self, block: impl Fn(&E) + 'static) -> Observable<Outcome<V, E>> {
        self.subscribe_forever(move |outcome: &Outcome<V, E>| {
            if let Outcome::Failure(error) = outcome {
                block(error);
            }
        });
        self.clone()
    }

    /// The success payload of the current snapshot, or `None` if nothing
    /// has been delivered yet or the snapshot holds a failure.
    #[must_use]
    pub fn peek(&self) -> Option<V> {
        self.get().and_then(Outcome::into_value)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use vow_outcome::Outcome;

    use crate::observable::{Observable, ObservableOptions};

    #[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
    enum TestError {
        #[error("empty")]
        Empty,
    }

    fn outcome_stream() -> Observable<Outcome<i32, TestError>> {
        Observable::new()
    }

    #[test]
    fn then_transforms_success_deliveries() {
        let upstream = outcome_stream();
        let downstream = upstream.then(|value| Outcome::<_, TestError>::Success(value.to_string()));

        upstream.update(Outcome::Success(1));
        assert_eq!(downstream.get(), Some(Outcome::Success("1".to_string())));
    }

    #[test]
    fn then_short_circuits_on_failure_without_invoking_the_transform() {
        let upstream = outcome_stream();
        let transformed = Rc::new(Cell::new(false));

        let touched = Rc::clone(&transformed);
        let downstream = upstream.then(move |value| {
            touched.set(true);
            Outcome::<_, TestError>::Success(*value)
        });

        upstream.update(Outcome::Failure(TestError::Empty));
        assert!(!transformed.get());
        assert_eq!(downstream.get(), Some(Outcome::Failure(TestError::Empty)));
    }

    #[test]
    fn then_accepts_a_result_returning_transform() {
        let upstream = outcome_stream();
        let downstream = upstream.then(|value| -> Result<i32, TestError> {
            if *value > 0 { Ok(*value) } else { Err(TestError::Empty) }
        });

        upstream.update(Outcome::Success(4));
        assert_eq!(downstream.peek(), Some(4));

        upstream.update(Outcome::Success(-4));
        assert_eq!(downstream.get(), Some(Outcome::Failure(TestError::Empty)));
    }

    #[test]
    fn then_map_wraps_the_transform_as_success() {
        let upstream = outcome_stream();
        let downstream = upstream.then_map(|value| value * 10);

        upstream.update(Outcome::Success(3));
        assert_eq!(downstream.peek(), Some(30));

        upstream.update(Outcome::Failure(TestError::Empty));
        assert_eq!(downstream.peek(), None);
    }

    #[test]
    fn try_map_captures_transform_failures() {
        let plain: Observable<i32> = Observable::new();
        let derived = plain.try_map(|value| {
            if value % 2 == 0 {
                Ok(value / 2)
            } else {
                Err(TestError::Empty)
            }
        });

        plain.update(8);
        assert_eq!(derived.peek(), Some(4));

        plain.update(7);
        assert_eq!(derived.get(), Some(Outcome::Failure(TestError::Empty)));
    }

    #[test]
    fn next_fires_only_on_success() {
        let stream = outcome_stream();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let log = Rc::clone(&seen);
        stream.next(move |value| log.borrow_mut().push(*value));

        stream.update(Outcome::Success(1));
        stream.update(Outcome::Failure(TestError::Empty));
        stream.update(Outcome::Success(2));

        assert_eq!(*seen.borrow(), vec![1, 2]);
    }

    #[test]
    fn error_fires_only_on_failure() {
        let stream = outcome_stream();
        let failures = Rc::new(Cell::new(0));

        let counter = Rc::clone(&failures);
        stream.error(move |_| counter.set(counter.get() + 1));

        stream.update(Outcome::Success(1));
        stream.update(Outcome::Failure(TestError::Empty));
        stream.update(Outcome::Failure(TestError::Empty));

        assert_eq!(failures.get(), 2);
    }

    #[test]
    fn next_and_error_chain_on_the_same_stream() {
        let stream = outcome_stream();
        let successes = Rc::new(Cell::new(0));
        let failures = Rc::new(Cell::new(0));

        let ok = Rc::clone(&successes);
        let err = Rc::clone(&failures);
        stream
            .next(move |_| ok.set(ok.get() + 1))
            .error(move |_| err.set(err.get() + 1));

        stream.update(Outcome::Success(1));
        stream.update(Outcome::Failure(TestError::Empty));

        assert_eq!(successes.get(), 1);
        assert_eq!(failures.get(), 1);
    }

    #[test]
    fn peek_reads_only_a_success_snapshot() {
        let stream = outcome_stream();
        assert_eq!(stream.peek(), None);

        stream.update(Outcome::Success(5));
        assert_eq!(stream.peek(), Some(5));

        stream.update(Outcome::Failure(TestError::Empty));
        assert_eq!(stream.peek(), None);
    }

    #[test]
    fn then_stream_relays_every_inner_delivery() {
        let upstream = outcome_stream();
        let inner: Observable<i32> = Observable::new();

        let source = inner.clone();
        let downstream = upstream.then_stream(move |_| source.clone());
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&seen);
        downstream.next(move |value| log.borrow_mut().push(*value));

        upstream.update(Outcome::Success(0));
        inner.update(10);
        inner.update(20);

        assert_eq!(*seen.borrow(), vec![10, 20]);
    }

    #[test]
    fn then_stream_forwards_upstream_failures() {
        let upstream = outcome_stream();
        let downstream =
            upstream.then_stream(|_| -> Observable<i32> { Observable::new() });

        upstream.update(Outcome::Failure(TestError::Empty));
        assert_eq!(downstream.get(), Some(Outcome::Failure(TestError::Empty)));
    }

    #[test]
    fn then_stream_keeps_per_delivery_inner_streams_alive() {
        let upstream = outcome_stream();
        // The transform creates a fresh, pre-seeded inner stream per
        // delivery; replay pushes its value through the relay immediately.
        let downstream = upstream.then_stream(|value: &i32| {
            let inner = Observable::with_options(ObservableOptions::new().with_replay(true));
            inner.update(value * 2);
            inner
        });

        upstream.update(Outcome::Success(3));
        assert_eq!(downstream.peek(), Some(6));

        upstream.update(Outcome::Success(4));
        assert_eq!(downstream.peek(), Some(8));
    }

    #[test]
    fn then_outcome_stream_relays_inner_outcomes_verbatim() {
        let upstream = outcome_stream();
        let inner: Observable<Outcome<String, TestError>> = Observable::new();

        let source = inner.clone();
        let downstream = upstream.then_outcome_stream(move |_| source.clone());

        upstream.update(Outcome::Success(0));
        inner.update(Outcome::Success("ok".to_string()));
        assert_eq!(downstream.peek(), Some("ok".to_string()));

        inner.update(Outcome::Failure(TestError::Empty));
        assert_eq!(downstream.get(), Some(Outcome::Failure(TestError::Empty)));
    }

    #[test]
    fn then_outcome_stream_forwards_upstream_failures() {
        let upstream = outcome_stream();
        let downstream = upstream
            .then_outcome_stream(|_| -> Observable<Outcome<String, TestError>> {
                Observable::new()
            });

        upstream.update(Outcome::Failure(TestError::Empty));
        assert_eq!(downstream.get(), Some(Outcome::Failure(TestError::Empty)));
    }

    #[test]
    fn derived_streams_inherit_upstream_options() {
        let upstream: Observable<Outcome<i32, TestError>> =
            Observable::with_options(ObservableOptions::new().with_replay(true));
        let downstream = upstream.then_map(|value| value + 1);

        assert_eq!(downstream.options(), upstream.options());

        // Replay applies on the derived stream too: a late subscriber sees
        // the last derived delivery.
        upstream.update(Outcome::Success(1));
        let replayed = Rc::new(Cell::new(None));
        let sink = Rc::clone(&replayed);
        let _sub = downstream.subscribe(move |outcome: &Outcome<i32, TestError>| {
            sink.set(outcome.clone().into_value());
        });
        assert_eq!(replayed.get(), Some(2));
    }

    #[test]
    fn inner_relay_goes_quiet_once_the_derived_stream_is_gone() {
        let upstream = outcome_stream();
        let inner: Observable<i32> = Observable::new();

        let source = inner.clone();
        let downstream = upstream.then_stream(move |_| source.clone());
        upstream.update(Outcome::Success(0));

        // The relay callback holds only a weak downstream handle. With the
        // derived stream and its upstream both gone, a late inner delivery
        // is dropped instead of panicking.
        drop(downstream);
        drop(upstream);
        inner.update(1);
        assert_eq!(inner.get(), Some(1));
    }
}
