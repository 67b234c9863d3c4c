#![forbid(unsafe_code)]

//! Push-based value streams with snapshot and version tracking.
//!
//! # Architecture
//!
//! [`Observable<T>`] uses `Rc<RefCell<..>>` for single-threaded shared
//! ownership; cloning a handle shares the underlying stream. Guarded
//! subscribers are stored as `Weak` function pointers (the strong end
//! lives in the [`Subscription`] guard) and are cleaned up lazily during
//! notification. Standing subscribers are stored strongly and live as long
//! as the stream.
//!
//! # Invariants
//!
//! 1. `version` increments exactly once per [`update`](Observable::update).
//! 2. Subscribers are notified in registration order.
//! 3. Every update notifies: deliveries are a stream, not a deduplicated
//!    state cell, so pushing an equal value again still notifies.
//! 4. Dropping a [`Subscription`] removes its callback before the next
//!    notification cycle.
//! 5. Notification happens outside the internal borrow, so a subscriber may
//!    re-enter the stream (for example push another value); reentrant
//!    updates run as separate, complete notification cycles.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

type Callback<T> = Box<dyn Fn(&T)>;

/// Delivery configuration for an [`Observable`].
///
/// Treated as an opaque pass-through by derived streams: every stream a
/// combinator creates is constructed with its upstream's options, unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ObservableOptions {
    /// Replay the current snapshot to each new subscriber.
    pub replay: bool,
}

impl ObservableOptions {
    #[must_use]
    pub const fn new() -> Self {
        Self { replay: false }
    }

    #[must_use]
    pub const fn with_replay(mut self, replay: bool) -> Self {
        self.replay = replay;
        self
    }
}

/// RAII guard for a guarded subscription.
///
/// The guard owns the strong end of the callback; dropping it removes the
/// callback before the next notification cycle.
#[must_use = "dropping the subscription unsubscribes"]
pub struct Subscription {
    _callback: Rc<dyn Any>,
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}

enum Slot<T> {
    /// Weak end of a guarded subscription; dead once the guard drops.
    Guarded(Weak<Callback<T>>),
    /// Standing subscription, alive for the stream's lifetime.
    Standing(Rc<Callback<T>>),
}

impl<T> Slot<T> {
    fn live(&self) -> Option<Rc<Callback<T>>> {
        match self {
            Slot::Guarded(weak) => weak.upgrade(),
            Slot::Standing(callback) => Some(Rc::clone(callback)),
        }
    }

    fn is_live(&self) -> bool {
        match self {
            Slot::Guarded(weak) => weak.strong_count() > 0,
            Slot::Standing(_) => true,
        }
    }
}

struct Inner<T> {
    value: Option<T>,
    version: u64,
    subscribers: Vec<Slot<T>>,
    /// Upstream streams kept alive on behalf of relay subscriptions.
    retained_sources: Vec<Box<dyn Any>>,
    options: ObservableOptions,
}

impl<T> Inner<T> {
    fn with_options(options: ObservableOptions) -> Self {
        Self {
            value: None,
            version: 0,
            subscribers: Vec::new(),
            retained_sources: Vec::new(),
            options,
        }
    }

    /// Sweep dead guarded slots, then snapshot the live callbacks in
    /// registration order.
    fn live_callbacks(&mut self) -> Vec<Rc<Callback<T>>> {
        self.subscribers.retain(Slot::is_live);
        self.subscribers.iter().filter_map(Slot::live).collect()
    }
}

/// A shared, version-tracked push stream of values.
///
/// Cloning an `Observable` creates a new handle to the **same** stream.
pub struct Observable<T> {
    inner: Rc<RefCell<Inner<T>>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Observable")
            .field("value", &inner.value)
            .field("version", &inner.version)
            .field("subscribers", &inner.subscribers.len())
            .finish()
    }
}

impl<T> Default for Observable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Observable<T> {
    /// An empty stream with default options: no snapshot, version 0.
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(ObservableOptions::new())
    }

    /// An empty stream with the given delivery options.
    #[must_use]
    pub fn with_options(options: ObservableOptions) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner::with_options(options))),
        }
    }

    /// The stream's delivery options.
    #[must_use]
    pub fn options(&self) -> ObservableOptions {
        self.inner.borrow().options
    }

    /// Number of updates delivered so far.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.inner.borrow().version
    }

    /// True once at least one value has been delivered.
    #[must_use]
    pub fn has_value(&self) -> bool {
        self.inner.borrow().value.is_some()
    }

    /// Count of currently live subscribers (guarded and standing).
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner
            .borrow()
            .subscribers
            .iter()
            .filter(|slot| slot.is_live())
            .count()
    }

    /// A non-owning handle to this stream.
    #[must_use]
    pub fn downgrade(&self) -> WeakObservable<T> {
        WeakObservable {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Keep `source` alive for as long as this stream.
    ///
    /// Relay combinators park the streams they subscribe to here so that a
    /// derived stream's upstreams are not dropped out from under it.
    pub fn retain_source(&self, source: impl Any) {
        self.inner
            .borrow_mut()
            .retained_sources
            .push(Box::new(source));
    }
}

impl<T: Clone + 'static> Observable<T> {
    /// The current snapshot, if any value has been delivered yet.
    #[must_use]
    pub fn get(&self) -> Option<T> {
        self.inner.borrow().value.clone()
    }

    /// Deliver a value: store it as the snapshot, bump the version by
    /// exactly one, and notify subscribers in registration order.
    ///
    /// Notification runs after the internal borrow is released, so
    /// callbacks may re-enter the stream.
    pub fn update(&self, value: T) {
        let callbacks = {
            let mut inner = self.inner.borrow_mut();
            inner.value = Some(value.clone());
            inner.version += 1;
            #[cfg(feature = "tracing")]
            log_update(inner.version, inner.subscribers.len());
            inner.live_callbacks()
        };
        for callback in callbacks {
            callback(&value);
        }
    }

    /// Register a guarded subscriber.
    ///
    /// If the stream's options request replay and a snapshot exists, the
    /// callback is invoked immediately with the current value. Dropping the
    /// returned [`Subscription`] unsubscribes.
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        let callback: Rc<Callback<T>> = Rc::new(Box::new(callback));
        self.replay_to(&callback);
        self.inner
            .borrow_mut()
            .subscribers
            .push(Slot::Guarded(Rc::downgrade(&callback)));
        Subscription {
            _callback: callback,
        }
    }

    /// Register a standing subscriber that lives as long as the stream.
    ///
    /// There is no unsubscribe for standing subscribers; replay behaves as
    /// in [`subscribe`](Observable::subscribe).
    pub fn subscribe_forever(&self, callback: impl Fn(&T) + 'static) {
        let callback: Rc<Callback<T>> = Rc::new(Box::new(callback));
        self.replay_to(&callback);
        self.inner
            .borrow_mut()
            .subscribers
            .push(Slot::Standing(callback));
    }

    fn replay_to(&self, callback: &Rc<Callback<T>>) {
        let snapshot = {
            let inner = self.inner.borrow();
            if inner.options.replay {
                inner.value.clone()
            } else {
                None
            }
        };
        if let Some(value) = snapshot {
            callback(&value);
        }
    }
}

/// Non-owning [`Observable`] handle.
///
/// Relay callbacks hold one of these instead of a strong handle so that a
/// derived stream retaining its upstreams does not form a reference cycle.
pub struct WeakObservable<T> {
    inner: Weak<RefCell<Inner<T>>>,
}

impl<T> Clone for WeakObservable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Weak::clone(&self.inner),
        }
    }
}

impl<T> WeakObservable<T> {
    /// The strong handle, if the stream is still alive.
    #[must_use]
    pub fn upgrade(&self) -> Option<Observable<T>> {
        self.inner.upgrade().map(|inner| Observable { inner })
    }
}

#[cfg(feature = "tracing")]
fn log_update(version: u64, subscribers: usize) {
    tracing::trace!(message = "observable.update", version, subscribers);
}

// ─── Tests ───────────────────────────────────────────────────────────────────
