#![forbid(unsafe_code)]

//! The presentation-side controller.
//!
//! [`OverlayController`] subscribes to engine events and maintains one
//! [`OverlayFrame`]: everything a host needs to draw the current step.
//! Hosts read [`frame`] from their render loop and wire user gestures
//! back through [`next`], [`previous`], [`close`] and [`complete`].
//!
//! # Invariants
//!
//! 1. `frame()` is `Some` exactly while the engine shows a step that
//!    this controller has observed.
//! 2. Geometry is recomputed on every step change and every announced
//!    viewport resize, never between.
//! 3. The provider resize subscription is held only while a step is
//!    shown; ending, finishing, resetting, and dropping the controller
//!    all release it.
//! 4. Event handling never re-enters the engine. Everything a frame
//!    needs travels inside the event payload.
//!
//! # Example
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use docent_core::geometry::{Rect, Size};
//! use docent_core::tutorial::{Placement, Step, StepTarget, Tutorial};
//! use docent_engine::catalog::TutorialCatalog;
//! use docent_engine::engine::TutorialEngine;
//! use docent_engine::store::MemoryStore;
//! use docent_overlay::overlay::OverlayController;
//! use docent_overlay::provider::StaticProvider;
//!
//! let mut catalog = TutorialCatalog::new();
//! catalog.register(
//!     Tutorial::new("tour", "Quick tour").step(
//!         Step::new("search", "Search")
//!             .target(StepTarget::new("#search"))
//!             .placement(Placement::Bottom),
//!     ),
//! );
//! let engine = Rc::new(RefCell::new(TutorialEngine::new(
//!     catalog,
//!     Box::new(MemoryStore::new()),
//! )));
//! let provider = Rc::new(
//!     StaticProvider::new(Size::new(1280.0, 720.0))
//!         .rect("#search", Rect::new(540.0, 8.0, 200.0, 32.0)),
//! );
//!
//! let controller = OverlayController::new(Rc::clone(&engine), provider);
//! engine.borrow_mut().start_tutorial("tour");
//!
//! let frame = controller.frame().expect("a step is showing");
//! assert_eq!(frame.step.id, "search");
//! assert!(frame.is_first && frame.is_last);
//! ```
//!
//! [`frame`]: OverlayController::frame
//! [`next`]: OverlayController::next
//! [`previous`]: OverlayController::previous
//! [`close`]: OverlayController::close
//! [`complete`]: OverlayController::complete

use std::cell::RefCell;
use std::rc::Rc;

use docent_core::tutorial::{Step, Tutorial};
use docent_engine::dispatch::Subscription;
use docent_engine::engine::{EngineEvent, TutorialEngine};
use tracing::trace;

use crate::positioner::{Positioner, StepGeometry};
use crate::provider::{GeometryProvider, ResizeSubscription};

/// Everything a host needs to render the current step.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayFrame {
    pub tutorial_id: String,
    pub tutorial_name: String,
    pub step: Step,
    /// Zero-based ordinal within the tutorial.
    pub step_index: usize,
    pub step_count: usize,
    pub is_first: bool,
    pub is_last: bool,
    pub geometry: StepGeometry,
}

/// The step currently on screen, as captured from event payloads.
struct ShownStep {
    tutorial: Tutorial,
    step_index: usize,
}

#[derive(Default)]
struct OverlayInner {
    current: Option<ShownStep>,
    geometry: Option<StepGeometry>,
    resize_sub: Option<ResizeSubscription>,
}

/// Pairs a [`TutorialEngine`] with a [`GeometryProvider`].
///
/// Keeps both alive for its own lifetime. Dropping the controller
/// detaches it from engine events and from the provider's resize
/// notifications; the engine itself keeps running.
pub struct OverlayController {
    engine: Rc<RefCell<TutorialEngine>>,
    provider: Rc<dyn GeometryProvider>,
    positioner: Positioner,
    inner: Rc<RefCell<OverlayInner>>,
    _events: Subscription,
}

impl OverlayController {
    /// Attach to an engine with default positioning.
    #[must_use]
    pub fn new(engine: Rc<RefCell<TutorialEngine>>, provider: Rc<dyn GeometryProvider>) -> Self {
        Self::with_positioner(engine, provider, Positioner::default())
    }

    /// Attach to an engine with custom positioning.
    ///
    /// If a tutorial is already mid-run, the controller picks it up
    /// immediately; subscribing is not racy against an earlier start.
    #[must_use]
    pub fn with_positioner(
        engine: Rc<RefCell<TutorialEngine>>,
        provider: Rc<dyn GeometryProvider>,
        positioner: Positioner,
    ) -> Self {
        let inner = Rc::new(RefCell::new(OverlayInner::default()));

        let events = {
            let inner = Rc::downgrade(&inner);
            let provider_weak = Rc::downgrade(&provider);
            engine.borrow_mut().subscribe(move |event| {
                let Some(inner) = inner.upgrade() else { return };
                let Some(provider) = provider_weak.upgrade() else {
                    return;
                };
                Self::apply_event(&inner, &provider, positioner, event);
            })
        };

        let snapshot = {
            let engine = engine.borrow();
            engine
                .active_tutorial()
                .cloned()
                .zip(engine.active_step_index())
        };
        if let Some((tutorial, step_index)) = snapshot {
            Self::show_step(&inner, &provider, positioner, tutorial, step_index);
        }

        Self {
            engine,
            provider,
            positioner,
            inner,
            _events: events,
        }
    }

    /// The engine this controller is attached to.
    #[must_use]
    pub fn engine(&self) -> &Rc<RefCell<TutorialEngine>> {
        &self.engine
    }

    /// The current frame, if a step is showing.
    #[must_use]
    pub fn frame(&self) -> Option<OverlayFrame> {
        let state = self.inner.borrow();
        let shown = state.current.as_ref()?;
        let step = shown.tutorial.step_at(shown.step_index)?.clone();
        let step_count = shown.tutorial.step_count();
        Some(OverlayFrame {
            tutorial_id: shown.tutorial.id.clone(),
            tutorial_name: shown.tutorial.name.clone(),
            step,
            step_index: shown.step_index,
            step_count,
            is_first: shown.step_index == 0,
            is_last: shown.step_index + 1 == step_count,
            geometry: state.geometry?,
        })
    }

    /// Recompute geometry for the shown step against the provider's
    /// current layout. For hosts that move elements without resizing.
    pub fn refresh(&self) {
        Self::reposition(&self.inner, &self.provider, self.positioner);
    }

    // ── Gestures ─────────────────────────────────────────────────────────

    /// Advance the walkthrough. Returns the new step, `None` when the
    /// tutorial finished (or nothing was active).
    pub fn next(&self) -> Option<Step> {
        self.engine.borrow_mut().next_step()
    }

    /// Go back one step.
    pub fn previous(&self) -> Option<Step> {
        self.engine.borrow_mut().previous_step()
    }

    /// Dismiss the walkthrough ("don't show this again").
    pub fn close(&self) {
        self.engine.borrow_mut().end_tutorial(true);
    }

    /// Put the walkthrough away without dismissing it.
    pub fn complete(&self) {
        self.engine.borrow_mut().end_tutorial(false);
    }

    // ── Event plumbing ───────────────────────────────────────────────────

    fn apply_event(
        inner: &Rc<RefCell<OverlayInner>>,
        provider: &Rc<dyn GeometryProvider>,
        positioner: Positioner,
        event: &EngineEvent,
    ) {
        match event {
            EngineEvent::Started {
                tutorial,
                step_index,
            }
            | EngineEvent::StepChanged {
                tutorial,
                step_index,
                ..
            } => {
                Self::show_step(inner, provider, positioner, tutorial.clone(), *step_index);
            }
            EngineEvent::Finished { .. } | EngineEvent::Ended { .. } => {
                Self::clear(inner);
            }
            EngineEvent::ProgressReset { tutorial_id } => {
                let shown = inner
                    .borrow()
                    .current
                    .as_ref()
                    .map(|s| s.tutorial.id.clone());
                let clears = match (tutorial_id, shown) {
                    (None, Some(_)) => true,
                    (Some(reset_id), Some(shown_id)) => *reset_id == shown_id,
                    (_, None) => false,
                };
                if clears {
                    Self::clear(inner);
                }
            }
        }
    }

    fn show_step(
        inner: &Rc<RefCell<OverlayInner>>,
        provider: &Rc<dyn GeometryProvider>,
        positioner: Positioner,
        tutorial: Tutorial,
        step_index: usize,
    ) {
        let geometry = tutorial
            .step_at(step_index)
            .map(|step| positioner.position(provider.as_ref(), step));
        let watch = inner
            .borrow()
            .resize_sub
            .is_none()
            .then(|| Self::watch_resize(inner, provider, positioner));

        let mut state = inner.borrow_mut();
        state.current = Some(ShownStep {
            tutorial,
            step_index,
        });
        state.geometry = geometry;
        if watch.is_some() {
            state.resize_sub = watch;
        }
    }

    fn watch_resize(
        inner: &Rc<RefCell<OverlayInner>>,
        provider: &Rc<dyn GeometryProvider>,
        positioner: Positioner,
    ) -> ResizeSubscription {
        // Weak both ways so the provider's callback list never keeps the
        // overlay (or itself) alive.
        let inner = Rc::downgrade(inner);
        let provider_weak = Rc::downgrade(provider);
        provider.subscribe_resize(Box::new(move |size| {
            let (Some(inner), Some(provider)) = (inner.upgrade(), provider_weak.upgrade()) else {
                return;
            };
            trace!(width = size.width, height = size.height, "overlay.resized");
            Self::reposition(&inner, &provider, positioner);
        }))
    }

    fn reposition(
        inner: &Rc<RefCell<OverlayInner>>,
        provider: &Rc<dyn GeometryProvider>,
        positioner: Positioner,
    ) {
        let step = {
            let state = inner.borrow();
            state
                .current
                .as_ref()
                .and_then(|s| s.tutorial.step_at(s.step_index).cloned())
        };
        let Some(step) = step else { return };
        let geometry = positioner.position(provider.as_ref(), &step);
        inner.borrow_mut().geometry = Some(geometry);
    }

    fn clear(inner: &Rc<RefCell<OverlayInner>>) {
        let mut state = inner.borrow_mut();
        state.current = None;
        state.geometry = None;
        state.resize_sub = None;
    }
}

impl std::fmt::Debug for OverlayController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.borrow();
        f.debug_struct("OverlayController")
            .field(
                "shown",
                &state.current.as_ref().map(|s| (&s.tutorial.id, s.step_index)),
            )
            .field("watching_resize", &state.resize_sub.is_some())
            .finish_non_exhaustive()
    }
}
