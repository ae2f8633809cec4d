#![forbid(unsafe_code)]

//! Tutorial and step definitions.
//!
//! A [`Tutorial`] is an immutable, ordered list of [`Step`]s plus catalog
//! metadata (category, auto-start flag, trigger route). Definitions are
//! plain data: they serialize, so catalogs can live in code or in a JSON
//! document, and nothing here ever mutates after construction.
//!
//! # Invariants
//!
//! 1. Step ids are unique within one tutorial (by construction of the
//!    catalog author; the engine addresses steps positionally and only
//!    uses ids for progress bookkeeping).
//! 2. A tutorial with no steps is representable but inert: the engine
//!    refuses to start it.
//!
//! # Example
//!
//! ```
//! use docent_core::tutorial::{Placement, Step, StepTarget, Tutorial, TutorialCategory};
//!
//! let tutorial = Tutorial::new("onboarding", "Welcome")
//!     .description("A first look around the app.")
//!     .category(TutorialCategory::Onboarding)
//!     .auto_start(true)
//!     .trigger_route("/home")
//!     .step(
//!         Step::new("menu", "The menu")
//!             .content("Everything starts here.")
//!             .target(StepTarget::new("#main-menu"))
//!             .placement(Placement::Bottom),
//!     );
//!
//! assert_eq!(tutorial.steps.len(), 1);
//! ```

use serde::{Deserialize, Serialize};

/// Margin applied around a target when the step does not specify one,
/// in viewport units.
pub const DEFAULT_TARGET_MARGIN: f64 = 10.0;

/// Broad grouping used for catalog filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TutorialCategory {
    Onboarding,
    #[default]
    Feature,
    Livestream,
    Orders,
    Products,
}

/// Positioning context of the target element in the host layout.
///
/// A pass-through hint for the host's highlight layer (a fixed-position
/// element must not scroll with the page). The positioning math itself
/// never reads it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementPosition {
    Fixed,
    Absolute,
}

/// Tooltip placement relative to the target box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Placement {
    Top,
    Right,
    Bottom,
    Left,
    /// Centered in the viewport; also the behavior for steps without a
    /// target.
    #[default]
    Center,
}

/// Where a step points in the host UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepTarget {
    /// Host-side selector for the element to highlight.
    pub selector: String,
    /// Highlight margin override, in viewport units.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub margin: Option<f64>,
    /// Positioning-context hint for the host's highlight layer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<ElementPosition>,
}

impl StepTarget {
    /// Target the element matched by `selector`.
    #[must_use]
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            margin: None,
            position: None,
        }
    }

    /// Override the highlight margin.
    #[must_use]
    pub fn margin(mut self, margin: f64) -> Self {
        self.margin = Some(margin);
        self
    }

    /// Set the positioning-context hint.
    #[must_use]
    pub fn position(mut self, position: ElementPosition) -> Self {
        self.position = Some(position);
        self
    }

    /// The effective margin: the override, or [`DEFAULT_TARGET_MARGIN`].
    #[must_use]
    pub fn margin_or_default(&self) -> f64 {
        self.margin.unwrap_or(DEFAULT_TARGET_MARGIN)
    }
}

/// One step of a walkthrough.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    /// Stable id, unique within the owning tutorial.
    pub id: String,
    /// Tooltip heading.
    pub title: String,
    /// Tooltip body copy.
    #[serde(default)]
    pub content: String,
    /// Optional illustration shown in the tooltip.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Optional embedded video.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    /// Element this step points at. `None` renders a centered tooltip
    /// over a full-viewport highlight.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<StepTarget>,
    /// Tooltip placement relative to the target.
    #[serde(default)]
    pub placement: Placement,
    /// Host-interpreted action tag (e.g. "click", "input").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    /// Whether the host should offer a dismiss control on this step.
    #[serde(default = "default_dismissable")]
    pub dismissable: bool,
}

fn default_dismissable() -> bool {
    true
}

impl Step {
    /// Create a step with the given id and title.
    #[must_use]
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            content: String::new(),
            image: None,
            video_url: None,
            target: None,
            placement: Placement::default(),
            action: None,
            dismissable: true,
        }
    }

    /// Set the body copy.
    #[must_use]
    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    /// Attach an illustration.
    #[must_use]
    pub fn image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// Attach an embedded video.
    #[must_use]
    pub fn video_url(mut self, url: impl Into<String>) -> Self {
        self.video_url = Some(url.into());
        self
    }

    /// Point the step at a host element.
    #[must_use]
    pub fn target(mut self, target: StepTarget) -> Self {
        self.target = Some(target);
        self
    }

    /// Set the tooltip placement.
    #[must_use]
    pub fn placement(mut self, placement: Placement) -> Self {
        self.placement = placement;
        self
    }

    /// Tag the step with a host-interpreted action.
    #[must_use]
    pub fn action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    /// Set whether the host should offer a dismiss control.
    #[must_use]
    pub fn dismissable(mut self, dismissable: bool) -> Self {
        self.dismissable = dismissable;
        self
    }
}

/// An immutable walkthrough definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tutorial {
    /// Stable id, unique across the catalog.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Catalog description.
    #[serde(default)]
    pub description: String,
    /// Catalog grouping.
    #[serde(default)]
    pub category: TutorialCategory,
    /// Ordered steps. Empty tutorials are inert.
    #[serde(default)]
    pub steps: Vec<Step>,
    /// Whether this tutorial may start on its own when its trigger
    /// route is visited.
    #[serde(default)]
    pub auto_start: bool,
    /// Route that offers (and possibly auto-starts) this tutorial.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger_route: Option<String>,
}

impl Tutorial {
    /// Create a tutorial with the given id and display name.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            category: TutorialCategory::default(),
            steps: Vec::new(),
            auto_start: false,
            trigger_route: None,
        }
    }

    /// Set the catalog description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the catalog grouping.
    #[must_use]
    pub fn category(mut self, category: TutorialCategory) -> Self {
        self.category = category;
        self
    }

    /// Append a step.
    #[must_use]
    pub fn step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    /// Allow the tutorial to start on its own when its trigger route is
    /// visited.
    #[must_use]
    pub fn auto_start(mut self, auto_start: bool) -> Self {
        self.auto_start = auto_start;
        self
    }

    /// Set the route that offers this tutorial.
    #[must_use]
    pub fn trigger_route(mut self, route: impl Into<String>) -> Self {
        self.trigger_route = Some(route.into());
        self
    }

    /// Number of steps.
    #[must_use]
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Look up a step by position.
    #[must_use]
    pub fn step_at(&self, index: usize) -> Option<&Step> {
        self.steps.get(index)
    }
}
