#![forbid(unsafe_code)]

//! Persisted per-tutorial progress records.
//!
//! A [`TutorialProgress`] tracks what one user has done with one
//! tutorial: the set of step ids they completed, the step they were last
//! on, and the terminal `completed` / `dismissed` flags. Records live in
//! a [`ProgressMap`] keyed by tutorial id; the BTree keeps serialized
//! output deterministic.
//!
//! # Invariants
//!
//! 1. `completed_steps` only grows through [`TutorialProgress::mark_step`];
//!    going back over a step never unmarks it.
//! 2. `completed` and `dismissed` are independent flags. Both can be set.
//! 3. Every mutation refreshes `last_updated_ms`.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Progress records keyed by tutorial id.
pub type ProgressMap = BTreeMap<String, TutorialProgress>;

/// Walkthrough state for one tutorial.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TutorialProgress {
    /// Id of the tutorial this record belongs to.
    pub tutorial_id: String,
    /// Ids of steps the user has moved past. Serializes as a sorted list.
    #[serde(default)]
    pub completed_steps: BTreeSet<String>,
    /// Step the user was last on, if the tutorial was left mid-flight.
    #[serde(default)]
    pub current_step_id: Option<String>,
    /// Set once the final step is completed. Blocks auto-start forever.
    #[serde(default)]
    pub completed: bool,
    /// Set when the user explicitly dismisses the tutorial.
    #[serde(default)]
    pub dismissed: bool,
    /// Wall-clock milliseconds of the last mutation.
    #[serde(default)]
    pub last_updated_ms: u64,
}

impl TutorialProgress {
    /// Create an empty record with a fresh timestamp.
    #[must_use]
    pub fn new(tutorial_id: impl Into<String>) -> Self {
        Self {
            tutorial_id: tutorial_id.into(),
            completed_steps: BTreeSet::new(),
            current_step_id: None,
            completed: false,
            dismissed: false,
            last_updated_ms: now_ms(),
        }
    }

    /// Refresh the last-updated timestamp.
    pub fn touch(&mut self) {
        self.last_updated_ms = now_ms();
    }

    /// Record a step as completed. Returns `true` if it was newly added.
    pub fn mark_step(&mut self, step_id: &str) -> bool {
        if self.completed_steps.contains(step_id) {
            return false;
        }
        self.completed_steps.insert(step_id.to_owned())
    }

    /// Whether a step id has been completed.
    #[must_use]
    pub fn is_step_completed(&self, step_id: &str) -> bool {
        self.completed_steps.contains(step_id)
    }
}

/// Current wall-clock time in epoch milliseconds.
///
/// Uses web-time so the same code path works on wasm targets.
#[must_use]
pub fn now_ms() -> u64 {
    web_time::SystemTime::now()
        .duration_since(web_time::SystemTime::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
