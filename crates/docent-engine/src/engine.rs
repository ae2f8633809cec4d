#![forbid(unsafe_code)]

//! The walkthrough state machine.
//!
//! [`TutorialEngine`] is the only writer of progress records. It is
//! either idle or in exactly one step of exactly one tutorial, and every
//! transition follows the same shape: mutate state, persist through the
//! store, then notify subscribers synchronously.
//!
//! # Invariants
//!
//! 1. At most one tutorial is active, and at most one step within it.
//! 2. Starting a tutorial always begins at its first step. Saved
//!    `current_step_id` values are bookkeeping, never navigation.
//! 3. `completed_steps` only grows. Going back over a step does not
//!    unmark it.
//! 4. `dismissed` is written only by [`end_tutorial`] with
//!    `dismiss = true`, and cleared only by [`start_tutorial`].
//! 5. Subscribers run in registration order, after the save, before the
//!    mutating call returns.
//!
//! # Failure Modes
//!
//! - Unknown ids and idle-state calls are safe no-ops (`false`/`None`).
//! - Persistence failures are absorbed by the store; the engine
//!   proceeds as if the save succeeded.
//! - Callbacks must not mutate the engine re-entrantly. Under the usual
//!   `Rc<RefCell<TutorialEngine>>` hosting, a violation panics on the
//!   nested borrow instead of corrupting state.
//!
//! [`end_tutorial`]: TutorialEngine::end_tutorial
//! [`start_tutorial`]: TutorialEngine::start_tutorial

use docent_core::progress::{ProgressMap, TutorialProgress};
use docent_core::tutorial::{Step, Tutorial};
use tracing::{debug, warn};

use crate::catalog::TutorialCatalog;
use crate::dispatch::{Dispatcher, Subscription};
use crate::store::ProgressStore;

/// Why the active step changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepChangeReason {
    Forward,
    Back,
}

/// Notification emitted after each engine transition.
///
/// Events carry owned data so subscribers never need to reach back into
/// the engine from inside a callback.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// A tutorial was started (or restarted) at its first step.
    Started {
        tutorial: Tutorial,
        step_index: usize,
    },
    /// The active step moved forward or back.
    StepChanged {
        tutorial: Tutorial,
        step_index: usize,
        reason: StepChangeReason,
    },
    /// The last step was completed and the tutorial finished.
    Finished { tutorial_id: String },
    /// The tutorial was ended before its last step.
    Ended {
        tutorial_id: String,
        dismissed: bool,
    },
    /// Progress records were removed. `None` means all of them.
    ProgressReset { tutorial_id: Option<String> },
}

/// The engine's position while a tutorial is active.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ActiveStep {
    tutorial_id: String,
    step_index: usize,
}

/// The walkthrough state machine.
///
/// Owns the catalog, the authoritative in-memory [`ProgressMap`], and
/// the persistence store. Constructed explicitly and passed by
/// reference; there is no global instance.
pub struct TutorialEngine {
    catalog: TutorialCatalog,
    store: Box<dyn ProgressStore>,
    progress: ProgressMap,
    active: Option<ActiveStep>,
    events: Dispatcher<EngineEvent>,
}

impl std::fmt::Debug for TutorialEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TutorialEngine")
            .field("tutorials", &self.catalog.len())
            .field("records", &self.progress.len())
            .field("active", &self.active)
            .finish_non_exhaustive()
    }
}

impl TutorialEngine {
    /// Create an engine over a catalog and a progress store.
    ///
    /// Loads persisted progress once, up front.
    #[must_use]
    pub fn new(catalog: TutorialCatalog, mut store: Box<dyn ProgressStore>) -> Self {
        let progress = store.load();
        debug!(
            tutorials = catalog.len(),
            records = progress.len(),
            "engine.created"
        );
        Self {
            catalog,
            store,
            progress,
            active: None,
            events: Dispatcher::new(),
        }
    }

    /// The registered tutorial definitions.
    #[must_use]
    pub fn catalog(&self) -> &TutorialCatalog {
        &self.catalog
    }

    // ── Lifecycle ────────────────────────────────────────────────────────

    /// Start (or restart) a tutorial at its first step.
    ///
    /// Creates the progress record if needed, points it at the first
    /// step, and clears any earlier dismissal. Returns `false` for
    /// unknown ids and step-less tutorials, leaving all state untouched.
    pub fn start_tutorial(&mut self, id: &str) -> bool {
        let Some(tutorial) = self.catalog.get(id) else {
            warn!(tutorial = id, "tutorial.start_unknown_id");
            return false;
        };
        if tutorial.steps.is_empty() {
            warn!(tutorial = id, "tutorial.start_without_steps");
            return false;
        }
        let tutorial = tutorial.clone();
        let first_step_id = tutorial.steps[0].id.clone();

        let record = self
            .progress
            .entry(tutorial.id.clone())
            .or_insert_with(|| TutorialProgress::new(&tutorial.id));
        record.current_step_id = Some(first_step_id);
        record.dismissed = false;
        record.touch();

        self.active = Some(ActiveStep {
            tutorial_id: tutorial.id.clone(),
            step_index: 0,
        });
        debug!(tutorial = %tutorial.id, steps = tutorial.steps.len(), "tutorial.started");

        self.persist();
        self.events.emit(&EngineEvent::Started {
            tutorial,
            step_index: 0,
        });
        true
    }

    /// Complete the current step and advance.
    ///
    /// Marks the current step into `completed_steps`, then either moves
    /// to the next step (returning it) or, on the last step, finishes
    /// the tutorial: the record gets `completed = true`, the engine goes
    /// idle, and `None` is returned. Idle engines return `None` without
    /// side effects.
    pub fn next_step(&mut self) -> Option<Step> {
        let active = self.active.clone()?;
        let tutorial = self.catalog.get(&active.tutorial_id)?.clone();
        let current = tutorial.step_at(active.step_index)?;
        let current_id = current.id.clone();
        let is_last = active.step_index + 1 >= tutorial.steps.len();

        let record = self
            .progress
            .entry(active.tutorial_id.clone())
            .or_insert_with(|| TutorialProgress::new(&active.tutorial_id));
        record.mark_step(&current_id);

        if is_last {
            record.completed = true;
            record.touch();
            self.active = None;
            debug!(tutorial = %active.tutorial_id, "tutorial.finished");

            self.persist();
            self.events.emit(&EngineEvent::Finished {
                tutorial_id: active.tutorial_id,
            });
            return None;
        }

        let next_index = active.step_index + 1;
        let next = tutorial.steps[next_index].clone();
        record.current_step_id = Some(next.id.clone());
        record.touch();

        self.active = Some(ActiveStep {
            tutorial_id: active.tutorial_id.clone(),
            step_index: next_index,
        });
        debug!(tutorial = %active.tutorial_id, step = next_index, "tutorial.step_advanced");

        self.persist();
        self.events.emit(&EngineEvent::StepChanged {
            tutorial,
            step_index: next_index,
            reason: StepChangeReason::Forward,
        });
        Some(next)
    }

    /// Move back one step.
    ///
    /// Returns the new step, or `None` when idle or already on the
    /// first step. Never removes anything from `completed_steps`.
    pub fn previous_step(&mut self) -> Option<Step> {
        let active = self.active.clone()?;
        if active.step_index == 0 {
            return None;
        }
        let tutorial = self.catalog.get(&active.tutorial_id)?.clone();
        let prev_index = active.step_index - 1;
        let prev = tutorial.step_at(prev_index)?.clone();

        let record = self
            .progress
            .entry(active.tutorial_id.clone())
            .or_insert_with(|| TutorialProgress::new(&active.tutorial_id));
        record.current_step_id = Some(prev.id.clone());
        record.touch();

        self.active = Some(ActiveStep {
            tutorial_id: active.tutorial_id.clone(),
            step_index: prev_index,
        });
        debug!(tutorial = %active.tutorial_id, step = prev_index, "tutorial.step_retreated");

        self.persist();
        self.events.emit(&EngineEvent::StepChanged {
            tutorial,
            step_index: prev_index,
            reason: StepChangeReason::Back,
        });
        Some(prev)
    }

    /// End the active tutorial before its last step.
    ///
    /// With `dismiss = true` the record is marked dismissed, which
    /// blocks future auto-starts. Ending never marks the tutorial
    /// completed, whatever step it was on. Idle engines ignore the call.
    pub fn end_tutorial(&mut self, dismiss: bool) {
        let Some(active) = self.active.take() else {
            return;
        };

        let record = self
            .progress
            .entry(active.tutorial_id.clone())
            .or_insert_with(|| TutorialProgress::new(&active.tutorial_id));
        if dismiss {
            record.dismissed = true;
        }
        record.touch();
        debug!(tutorial = %active.tutorial_id, dismiss, "tutorial.ended");

        self.persist();
        self.events.emit(&EngineEvent::Ended {
            tutorial_id: active.tutorial_id,
            dismissed: dismiss,
        });
    }

    // ── Active-state reads ───────────────────────────────────────────────

    /// Whether a tutorial is active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// The active tutorial definition.
    #[must_use]
    pub fn active_tutorial(&self) -> Option<&Tutorial> {
        let active = self.active.as_ref()?;
        self.catalog.get(&active.tutorial_id)
    }

    /// The active step definition.
    #[must_use]
    pub fn active_step(&self) -> Option<&Step> {
        let active = self.active.as_ref()?;
        self.catalog.get(&active.tutorial_id)?.step_at(active.step_index)
    }

    /// Zero-based index of the active step.
    #[must_use]
    pub fn active_step_index(&self) -> Option<usize> {
        self.active.as_ref().map(|a| a.step_index)
    }

    // ── Progress ─────────────────────────────────────────────────────────

    /// The progress record for one tutorial, if any exists.
    #[must_use]
    pub fn progress(&self, id: &str) -> Option<&TutorialProgress> {
        self.progress.get(id)
    }

    /// All progress records. Callers clone what they keep.
    #[must_use]
    pub fn progress_snapshot(&self) -> &ProgressMap {
        &self.progress
    }

    /// Remove the progress record for one tutorial.
    ///
    /// If that tutorial was active, the engine goes idle. Does nothing
    /// (and emits nothing) when there is neither a record nor an active
    /// run to clear.
    pub fn reset_progress(&mut self, id: &str) {
        let removed = self.progress.remove(id).is_some();
        let was_active = self
            .active
            .as_ref()
            .is_some_and(|a| a.tutorial_id == id);
        if was_active {
            self.active = None;
        }
        if !removed && !was_active {
            return;
        }
        debug!(tutorial = id, "tutorial.progress_reset");

        self.persist();
        self.events.emit(&EngineEvent::ProgressReset {
            tutorial_id: Some(id.to_owned()),
        });
    }

    /// Remove every progress record and go idle.
    pub fn reset_all_progress(&mut self) {
        if self.progress.is_empty() && self.active.is_none() {
            return;
        }
        self.progress.clear();
        self.active = None;
        debug!("tutorial.progress_reset_all");

        self.persist();
        self.events
            .emit(&EngineEvent::ProgressReset { tutorial_id: None });
    }

    // ── Routes ───────────────────────────────────────────────────────────

    /// Tutorials the given route should offer, per the engine's current
    /// progress.
    #[must_use]
    pub fn tutorials_for_route(&self, route: &str) -> Vec<&Tutorial> {
        self.catalog.for_route(route, &self.progress)
    }

    /// The tutorial that would auto-start on the given route, if any.
    #[must_use]
    pub fn auto_start_for_route(&self, route: &str) -> Option<&Tutorial> {
        self.catalog.auto_start_for_route(route, &self.progress)
    }

    /// React to the host navigating to `route`: start the first eligible
    /// auto-start tutorial and return its id.
    ///
    /// Does nothing while a tutorial is already active; navigation must
    /// not silently replace a walkthrough in progress.
    pub fn handle_route_change(&mut self, route: &str) -> Option<String> {
        if self.is_active() {
            return None;
        }
        let id = self.catalog.auto_start_for_route(route, &self.progress)?.id.clone();
        debug!(route, tutorial = %id, "tutorial.auto_start");
        self.start_tutorial(&id).then_some(id)
    }

    // ── Events ───────────────────────────────────────────────────────────

    /// Subscribe to engine events.
    ///
    /// Callbacks run synchronously on the mutating call, in registration
    /// order, after the transition is persisted. Dropping the returned
    /// guard unsubscribes.
    pub fn subscribe(&mut self, callback: impl Fn(&EngineEvent) + 'static) -> Subscription {
        self.events.subscribe(callback)
    }

    fn persist(&mut self) {
        self.store.save(&self.progress);
    }
}

// =============================================================================
// Tests
// =============================================================================
