#![forbid(unsafe_code)]

//! Placement math for the spotlight cutout and tooltip.
//!
//! Pure arithmetic: a [`Positioner`] reads element rectangles through a
//! [`GeometryProvider`] and produces [`StepGeometry`], never touching
//! engine state or any render surface.
//!
//! # Invariants
//!
//! 1. A step without a usable target degrades to the centered layout:
//!    full-viewport highlight, tooltip at the viewport center. "Not
//!    usable" covers missing targets, unresolved selectors, empty boxes,
//!    and non-finite boxes, and all four produce identical output.
//! 2. The highlight always contains the target box, inflated by the
//!    step margin on every side.
//! 3. Tooltip offsets are measured from the unexpanded box, so a larger
//!    margin moves the tooltip and the highlight edge in lockstep.
//! 4. Finite inputs produce finite output. NaN stops here.

use docent_core::geometry::{Rect, Size};
use docent_core::tutorial::{Placement, Step};
use tracing::trace;

use crate::provider::GeometryProvider;

/// Which point of the tooltip body sits on the pose coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TooltipAnchor {
    Center,
    BottomCenter,
    TopCenter,
    RightCenter,
    LeftCenter,
}

/// Where to pin the tooltip, in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TooltipPose {
    pub x: f64,
    pub y: f64,
    pub anchor: TooltipAnchor,
}

/// Render-ready geometry for one step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepGeometry {
    /// Spotlight cutout, already inflated by the step margin.
    pub highlight: Rect,
    /// Tooltip attachment point.
    pub tooltip: TooltipPose,
}

/// Tunable spacing for [`Positioner`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionerConfig {
    default_margin: f64,
    tooltip_gap: f64,
}

impl PositionerConfig {
    /// Defaults: 10px margin around the target, 10px gap between the
    /// highlight edge and the tooltip anchor.
    #[must_use]
    pub fn new() -> Self {
        Self {
            default_margin: docent_core::tutorial::DEFAULT_TARGET_MARGIN,
            tooltip_gap: 10.0,
        }
    }

    /// Margin used when a step target does not set its own.
    #[must_use]
    pub fn default_margin(mut self, margin: f64) -> Self {
        self.default_margin = margin;
        self
    }

    /// Extra distance between the highlight edge and the tooltip.
    #[must_use]
    pub fn tooltip_gap(mut self, gap: f64) -> Self {
        self.tooltip_gap = gap;
        self
    }
}

impl Default for PositionerConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Computes [`StepGeometry`] for the active step.
#[derive(Debug, Clone, Copy, Default)]
pub struct Positioner {
    config: PositionerConfig,
}

impl Positioner {
    #[must_use]
    pub fn new(config: PositionerConfig) -> Self {
        Self { config }
    }

    /// Geometry for `step` against the provider's current layout.
    ///
    /// Resolution failures degrade to the centered layout rather than
    /// erroring; a missing element must never take the walkthrough down.
    pub fn position(&self, provider: &dyn GeometryProvider, step: &Step) -> StepGeometry {
        let viewport = provider.viewport();
        let Some(target) = &step.target else {
            return Self::centered(viewport);
        };
        let Some(body) = provider.resolve(&target.selector) else {
            trace!(selector = %target.selector, "overlay.target_unresolved");
            return Self::centered(viewport);
        };
        if body.is_empty() || !body.is_finite() {
            trace!(selector = %target.selector, "overlay.target_degenerate");
            return Self::centered(viewport);
        }

        let margin = target.margin.unwrap_or(self.config.default_margin);
        let offset = margin + self.config.tooltip_gap;
        let tooltip = match step.placement {
            Placement::Top => TooltipPose {
                x: body.center_x(),
                y: body.top() - offset,
                anchor: TooltipAnchor::BottomCenter,
            },
            Placement::Bottom => TooltipPose {
                x: body.center_x(),
                y: body.bottom() + offset,
                anchor: TooltipAnchor::TopCenter,
            },
            Placement::Left => TooltipPose {
                x: body.left() - offset,
                y: body.center_y(),
                anchor: TooltipAnchor::RightCenter,
            },
            Placement::Right => TooltipPose {
                x: body.right() + offset,
                y: body.center_y(),
                anchor: TooltipAnchor::LeftCenter,
            },
            Placement::Center => Self::centered_pose(viewport),
        };

        StepGeometry {
            highlight: body.expand(margin),
            tooltip,
        }
    }

    /// The no-target layout: full-viewport highlight, centered tooltip.
    fn centered(viewport: Size) -> StepGeometry {
        StepGeometry {
            highlight: viewport.to_rect(),
            tooltip: Self::centered_pose(viewport),
        }
    }

    fn centered_pose(viewport: Size) -> TooltipPose {
        TooltipPose {
            x: viewport.width / 2.0,
            y: viewport.height / 2.0,
            anchor: TooltipAnchor::Center,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::StaticProvider;
    use docent_core::tutorial::StepTarget;
    use proptest::prelude::*;

    fn provider() -> StaticProvider {
        StaticProvider::new(Size::new(1280.0, 720.0))
            .rect("#box", Rect::new(100.0, 50.0, 200.0, 80.0))
    }

    fn step_with(target: StepTarget, placement: Placement) -> Step {
        Step::new("s", "Step").target(target).placement(placement)
    }

    // ── Degraded layouts ─────────────────────────────────────────────────

    #[test]
    fn no_target_centers_over_viewport() {
        let positioner = Positioner::default();
        let geometry = positioner.position(&provider(), &Step::new("s", "Step"));

        assert_eq!(geometry.highlight, Rect::new(0.0, 0.0, 1280.0, 720.0));
        assert_eq!(geometry.tooltip.x, 640.0);
        assert_eq!(geometry.tooltip.y, 360.0);
        assert_eq!(geometry.tooltip.anchor, TooltipAnchor::Center);
    }

    #[test]
    fn unresolved_selector_matches_no_target_exactly() {
        let positioner = Positioner::default();
        let provider = provider();

        let without = positioner.position(&provider, &Step::new("s", "Step"));
        let unresolved = positioner.position(
            &provider,
            &step_with(StepTarget::new("#gone"), Placement::Bottom),
        );
        assert_eq!(without, unresolved);
    }

    #[test]
    fn empty_box_degrades_to_centered() {
        let positioner = Positioner::default();
        let provider =
            StaticProvider::new(Size::new(1280.0, 720.0)).rect("#flat", Rect::new(5.0, 5.0, 0.0, 40.0));

        let geometry =
            positioner.position(&provider, &step_with(StepTarget::new("#flat"), Placement::Top));
        assert_eq!(geometry.highlight, Rect::new(0.0, 0.0, 1280.0, 720.0));
        assert_eq!(geometry.tooltip.anchor, TooltipAnchor::Center);
    }

    #[test]
    fn non_finite_box_degrades_to_centered() {
        let positioner = Positioner::default();
        let provider = StaticProvider::new(Size::new(1280.0, 720.0))
            .rect("#nan", Rect::new(f64::NAN, 5.0, 40.0, 40.0));

        let geometry =
            positioner.position(&provider, &step_with(StepTarget::new("#nan"), Placement::Top));
        assert_eq!(geometry.highlight, Rect::new(0.0, 0.0, 1280.0, 720.0));
    }

    // ── Placements ───────────────────────────────────────────────────────

    #[test]
    fn highlight_inflates_by_default_margin() {
        let positioner = Positioner::default();
        let geometry = positioner.position(
            &provider(),
            &step_with(StepTarget::new("#box"), Placement::Bottom),
        );
        // Box {100, 50, 200, 80} inflated by 10 on every side.
        assert_eq!(geometry.highlight, Rect::new(90.0, 40.0, 220.0, 100.0));
    }

    #[test]
    fn bottom_placement_hangs_under_the_box() {
        let positioner = Positioner::default();
        let geometry = positioner.position(
            &provider(),
            &step_with(StepTarget::new("#box"), Placement::Bottom),
        );
        // Offset 20 = margin 10 + gap 10, measured from the unexpanded box.
        assert_eq!(geometry.tooltip.x, 200.0);
        assert_eq!(geometry.tooltip.y, 150.0);
        assert_eq!(geometry.tooltip.anchor, TooltipAnchor::TopCenter);
    }

    #[test]
    fn top_placement_floats_above_the_box() {
        let positioner = Positioner::default();
        let geometry = positioner.position(
            &provider(),
            &step_with(StepTarget::new("#box"), Placement::Top),
        );
        assert_eq!(geometry.tooltip.x, 200.0);
        assert_eq!(geometry.tooltip.y, 30.0);
        assert_eq!(geometry.tooltip.anchor, TooltipAnchor::BottomCenter);
    }

    #[test]
    fn left_and_right_placements_flank_the_box() {
        let positioner = Positioner::default();

        let left = positioner.position(
            &provider(),
            &step_with(StepTarget::new("#box"), Placement::Left),
        );
        assert_eq!((left.tooltip.x, left.tooltip.y), (80.0, 90.0));
        assert_eq!(left.tooltip.anchor, TooltipAnchor::RightCenter);

        let right = positioner.position(
            &provider(),
            &step_with(StepTarget::new("#box"), Placement::Right),
        );
        assert_eq!((right.tooltip.x, right.tooltip.y), (320.0, 90.0));
        assert_eq!(right.tooltip.anchor, TooltipAnchor::LeftCenter);
    }

    #[test]
    fn center_placement_keeps_highlight_but_centers_tooltip() {
        let positioner = Positioner::default();
        let geometry = positioner.position(
            &provider(),
            &step_with(StepTarget::new("#box"), Placement::Center),
        );
        assert_eq!(geometry.highlight, Rect::new(90.0, 40.0, 220.0, 100.0));
        assert_eq!(geometry.tooltip.x, 640.0);
        assert_eq!(geometry.tooltip.y, 360.0);
        assert_eq!(geometry.tooltip.anchor, TooltipAnchor::Center);
    }

    #[test]
    fn step_margin_overrides_config_default() {
        let positioner = Positioner::new(PositionerConfig::new().default_margin(4.0));
        let geometry = positioner.position(
            &provider(),
            &step_with(StepTarget::new("#box").margin(30.0), Placement::Bottom),
        );
        assert_eq!(geometry.highlight, Rect::new(70.0, 20.0, 260.0, 140.0));
        // Offset 40 = step margin 30 + gap 10.
        assert_eq!(geometry.tooltip.y, 170.0);
    }

    #[test]
    fn config_controls_fallback_margin_and_gap() {
        let positioner = Positioner::new(
            PositionerConfig::new().default_margin(2.0).tooltip_gap(5.0),
        );
        let geometry = positioner.position(
            &provider(),
            &step_with(StepTarget::new("#box"), Placement::Top),
        );
        assert_eq!(geometry.highlight, Rect::new(98.0, 48.0, 204.0, 84.0));
        assert_eq!(geometry.tooltip.y, 43.0);
    }

    // ── Properties ───────────────────────────────────────────────────────

    fn finite_rect() -> impl Strategy<Value = Rect> {
        (
            -1000.0f64..1000.0,
            -1000.0f64..1000.0,
            1.0f64..2000.0,
            1.0f64..2000.0,
        )
            .prop_map(|(x, y, w, h)| Rect::new(x, y, w, h))
    }

    proptest! {
        #[test]
        fn finite_inputs_produce_finite_output(
            body in finite_rect(),
            margin in 0.0f64..100.0,
            placement_index in 0usize..5,
        ) {
            let placement = [
                Placement::Top,
                Placement::Bottom,
                Placement::Left,
                Placement::Right,
                Placement::Center,
            ][placement_index];
            let provider = StaticProvider::new(Size::new(1920.0, 1080.0)).rect("#el", body);
            let step = step_with(StepTarget::new("#el").margin(margin), placement);

            let geometry = Positioner::default().position(&provider, &step);
            prop_assert!(geometry.highlight.is_finite());
            prop_assert!(geometry.tooltip.x.is_finite());
            prop_assert!(geometry.tooltip.y.is_finite());
        }

        #[test]
        fn highlight_always_contains_the_body(
            body in finite_rect(),
            margin in 0.0f64..100.0,
        ) {
            let provider = StaticProvider::new(Size::new(1920.0, 1080.0)).rect("#el", body);
            let step = step_with(StepTarget::new("#el").margin(margin), Placement::Bottom);

            let geometry = Positioner::default().position(&provider, &step);
            prop_assert!(geometry.highlight.contains_rect(&body));
        }
    }
}
