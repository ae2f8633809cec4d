#![forbid(unsafe_code)]

//! Element-geometry lookup behind a trait.
//!
//! The positioner never touches a real DOM or widget tree. It asks a
//! [`GeometryProvider`] for the viewport size and for the rectangle
//! behind a step's selector, and the host decides what a selector means:
//! CSS queries in a browser bridge, widget ids in a TUI, fixed tables in
//! tests.
//!
//! # Invariants
//!
//! 1. `resolve` answers in viewport coordinates, same space as
//!    `viewport()`.
//! 2. Resize callbacks live exactly as long as their
//!    [`ResizeSubscription`] guard.
//! 3. [`StaticProvider`] hands out plain copies; mutating the table
//!    never invalidates previously returned rects.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use docent_core::geometry::{Rect, Size};
use docent_engine::dispatch::Dispatcher;

/// Resolves step selectors into viewport rectangles.
///
/// Implementations are queried on every step change and every resize,
/// so `resolve` should be a cheap lookup, not a layout pass.
pub trait GeometryProvider {
    /// The rectangle behind `selector`, if the element currently exists.
    fn resolve(&self, selector: &str) -> Option<Rect>;

    /// Current viewport size.
    fn viewport(&self) -> Size;

    /// Register a viewport-resize callback. Dropping the returned guard
    /// unregisters it.
    fn subscribe_resize(&self, callback: Box<dyn Fn(Size)>) -> ResizeSubscription;
}

/// RAII guard for a resize callback.
///
/// Providers stash whatever keeps their callback registered inside the
/// guard; dropping it releases the registration.
pub struct ResizeSubscription {
    _guard: Box<dyn std::any::Any>,
}

impl ResizeSubscription {
    #[must_use]
    pub fn new(guard: impl std::any::Any) -> Self {
        Self {
            _guard: Box::new(guard),
        }
    }
}

impl std::fmt::Debug for ResizeSubscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResizeSubscription").finish_non_exhaustive()
    }
}

/// Table-backed provider.
///
/// Doubles as the unit-test provider and as a bridge for hosts that
/// already track element geometry themselves: keep a handle, update the
/// table and viewport as layout changes, call [`emit_resize`] after
/// viewport changes.
///
/// All methods take `&self`; shared handles (`Rc<StaticProvider>`) can
/// feed the overlay while the host keeps mutating the table.
///
/// [`emit_resize`]: StaticProvider::emit_resize
pub struct StaticProvider {
    inner: Rc<RefCell<ProviderInner>>,
    resize: Dispatcher<Size>,
}

struct ProviderInner {
    rects: HashMap<String, Rect>,
    viewport: Size,
}

impl StaticProvider {
    #[must_use]
    pub fn new(viewport: Size) -> Self {
        Self {
            inner: Rc::new(RefCell::new(ProviderInner {
                rects: HashMap::new(),
                viewport,
            })),
            resize: Dispatcher::new(),
        }
    }

    /// Add a selector mapping, builder-style.
    #[must_use]
    pub fn rect(self, selector: impl Into<String>, rect: Rect) -> Self {
        self.insert(selector, rect);
        self
    }

    /// Add or replace a selector mapping.
    pub fn insert(&self, selector: impl Into<String>, rect: Rect) {
        self.inner.borrow_mut().rects.insert(selector.into(), rect);
    }

    /// Remove a selector mapping. Returns whether it existed.
    pub fn remove(&self, selector: &str) -> bool {
        self.inner.borrow_mut().rects.remove(selector).is_some()
    }

    /// Change the viewport without notifying subscribers.
    pub fn set_viewport(&self, viewport: Size) {
        self.inner.borrow_mut().viewport = viewport;
    }

    /// Notify resize subscribers with the current viewport.
    pub fn emit_resize(&self) {
        let viewport = self.viewport();
        self.resize.emit(&viewport);
    }

    /// Live resize callbacks. Lookup-table introspection for tests.
    #[must_use]
    pub fn resize_subscriber_count(&self) -> usize {
        self.resize.subscriber_count()
    }
}

impl GeometryProvider for StaticProvider {
    fn resolve(&self, selector: &str) -> Option<Rect> {
        self.inner.borrow().rects.get(selector).copied()
    }

    fn viewport(&self) -> Size {
        self.inner.borrow().viewport
    }

    fn subscribe_resize(&self, callback: Box<dyn Fn(Size)>) -> ResizeSubscription {
        ResizeSubscription::new(self.resize.subscribe(move |size: &Size| callback(*size)))
    }
}

impl std::fmt::Debug for StaticProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("StaticProvider")
            .field("selectors", &inner.rects.len())
            .field("viewport", &inner.viewport)
            .finish_non_exhaustive()
    }
}
