#![forbid(unsafe_code)]

//! Overlay: spotlight geometry and the presentation-side controller.
//!
//! # Role in docent
//! `docent-overlay` turns the engine's "tutorial X, step N" into
//! render-ready geometry. The host supplies a
//! [`provider::GeometryProvider`] that can resolve step selectors into
//! viewport rectangles; everything else here is pure arithmetic over
//! [`docent_core::geometry`].
//!
//! # Primary responsibilities
//! - **GeometryProvider**: the injected element-lookup boundary, with
//!   [`provider::StaticProvider`] as the table-backed implementation.
//! - **Positioner**: placement math for the spotlight cutout and the
//!   tooltip pose, with a centered fallback for unresolvable targets.
//! - **OverlayController**: the engine subscriber that keeps one
//!   [`overlay::OverlayFrame`] in sync with the active step and the
//!   viewport size.
//!
//! # How it fits in the system
//! Hosts own the render loop. They read
//! [`overlay::OverlayController::frame`] whenever it suits them and wire
//! user gestures back through the controller; nothing in this crate
//! draws, schedules, or touches a real DOM.

pub mod overlay;
pub mod positioner;
pub mod provider;
