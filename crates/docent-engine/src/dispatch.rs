#![forbid(unsafe_code)]

//! Typed event dispatch with weak-referenced subscribers.
//!
//! # Design
//!
//! [`Dispatcher<T>`] stores callbacks as `Weak` references; the strong
//! half lives inside the [`Subscription`] guard returned from
//! [`subscribe`](Dispatcher::subscribe). Dropping the guard unsubscribes
//! the callback. Cloning a `Dispatcher` creates a second handle to the
//! **same** subscriber list.
//!
//! Emission is synchronous: `emit` runs every live callback, in
//! registration order, before it returns. The internal borrow is
//! released before callbacks run, so a callback may subscribe or emit
//! on the same dispatcher without deadlocking.
//!
//! # Failure Modes
//!
//! - **Subscriber leak**: guards stored indefinitely keep their
//!   callbacks alive. Dead weak references are pruned lazily during
//!   `emit`.
//! - **Re-entrant state mutation**: the dispatcher itself tolerates
//!   re-entrancy, but callbacks that mutate the emitting object through
//!   a shared `RefCell` will panic on the nested borrow. Treat events
//!   as read-only notifications.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// A subscriber callback stored as a strong `Rc` inside the guard,
/// handed to the dispatcher as `Weak`.
type CallbackRc<T> = Rc<dyn Fn(&T)>;
type CallbackWeak<T> = Weak<dyn Fn(&T)>;

/// Shared interior for [`Dispatcher<T>`].
struct DispatcherInner<T> {
    /// Subscribers stored as weak references. Dead entries are pruned
    /// on emit.
    subscribers: Vec<CallbackWeak<T>>,
}

/// A synchronous, registration-ordered event fan-out.
pub struct Dispatcher<T> {
    inner: Rc<RefCell<DispatcherInner<T>>>,
}

// Manual Clone: shares the same Rc.
impl<T> Clone for Dispatcher<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T> Default for Dispatcher<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for Dispatcher<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("subscriber_count", &self.inner.borrow().subscribers.len())
            .finish()
    }
}

impl<T> Dispatcher<T> {
    /// Create a dispatcher with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(DispatcherInner {
                subscribers: Vec::new(),
            })),
        }
    }

    /// Number of registered subscribers (including dead ones not yet
    /// pruned).
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().subscribers.len()
    }
}

impl<T: 'static> Dispatcher<T> {
    /// Subscribe to events. The callback runs for every `emit` until the
    /// returned [`Subscription`] guard is dropped.
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        let strong: CallbackRc<T> = Rc::new(callback);
        let weak = Rc::downgrade(&strong);
        self.inner.borrow_mut().subscribers.push(weak);
        // Wrap in a holder that can be type-erased as `dyn Any`, since
        // `Rc<dyn Fn(&T)>` cannot directly coerce to `Rc<dyn Any>`.
        Subscription {
            _guard: Box::new(strong),
        }
    }

    /// Run every live callback with `event`, in registration order, and
    /// prune dead subscribers.
    pub fn emit(&self, event: &T) {
        // Collect live callbacks first so the borrow is released before
        // any callback runs.
        let callbacks: Vec<CallbackRc<T>> = {
            let mut inner = self.inner.borrow_mut();
            inner.subscribers.retain(|w| w.strong_count() > 0);
            inner
                .subscribers
                .iter()
                .filter_map(Weak::upgrade)
                .collect()
        };

        for cb in &callbacks {
            cb(event);
        }
    }
}

/// RAII guard for a subscriber callback.
///
/// Dropping the `Subscription` causes the associated callback to become
/// unreachable: the strong `Rc` is dropped, so the `Weak` in the
/// dispatcher's subscriber list fails to upgrade on the next emit.
pub struct Subscription {
    /// Type-erased strong reference keeping the callback `Rc` alive.
    _guard: Box<dyn std::any::Any>,
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
