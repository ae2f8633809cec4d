#![forbid(unsafe_code)]

//! Docent public facade crate.
//!
//! This crate provides the stable, ergonomic surface area for hosts. It
//! re-exports common types from the internal crates and offers a
//! lightweight prelude for day-to-day usage.
//!
//! # Quick start
//!
//! ```
//! use docent::prelude::*;
//!
//! let mut catalog = TutorialCatalog::new();
//! catalog.register(
//!     Tutorial::new("getting-started", "Getting started")
//!         .auto_start(true)
//!         .trigger_route("/dashboard")
//!         .step(Step::new("welcome", "Welcome").content("A two-minute tour."))
//!         .step(
//!             Step::new("search", "Search anywhere")
//!                 .target(StepTarget::new("#global-search"))
//!                 .placement(Placement::Bottom),
//!         ),
//! );
//!
//! let mut engine = TutorialEngine::new(catalog, Box::new(MemoryStore::new()));
//! assert_eq!(
//!     engine.handle_route_change("/dashboard").as_deref(),
//!     Some("getting-started")
//! );
//!
//! while engine.next_step().is_some() {}
//! assert!(engine.progress("getting-started").is_some_and(|p| p.completed));
//! ```

// --- Core re-exports -------------------------------------------------------

pub use docent_core::geometry::{Rect, Size};
pub use docent_core::progress::{ProgressMap, TutorialProgress};
pub use docent_core::tutorial::{
    DEFAULT_TARGET_MARGIN, ElementPosition, Placement, Step, StepTarget, Tutorial,
    TutorialCategory,
};

// --- Engine re-exports -----------------------------------------------------

pub use docent_engine::catalog::TutorialCatalog;
pub use docent_engine::dispatch::{Dispatcher, Subscription};
pub use docent_engine::engine::{EngineEvent, StepChangeReason, TutorialEngine};
pub use docent_engine::store::{JsonFileStore, MemoryStore, ProgressStore};

// --- Overlay re-exports ----------------------------------------------------

#[cfg(feature = "overlay")]
pub use docent_overlay::overlay::{OverlayController, OverlayFrame};
#[cfg(feature = "overlay")]
pub use docent_overlay::positioner::{
    Positioner, PositionerConfig, StepGeometry, TooltipAnchor, TooltipPose,
};
#[cfg(feature = "overlay")]
pub use docent_overlay::provider::{GeometryProvider, ResizeSubscription, StaticProvider};

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        EngineEvent, JsonFileStore, MemoryStore, Placement, ProgressStore, Rect, Size, Step,
        StepTarget, Subscription, Tutorial, TutorialCatalog, TutorialCategory, TutorialEngine,
        TutorialProgress,
    };

    #[cfg(feature = "overlay")]
    pub use crate::{GeometryProvider, OverlayController, OverlayFrame, Positioner, StaticProvider};

    pub use crate::{core, engine};

    #[cfg(feature = "overlay")]
    pub use crate::overlay;
}

pub use docent_core as core;
pub use docent_engine as engine;
#[cfg(feature = "overlay")]
pub use docent_overlay as overlay;
