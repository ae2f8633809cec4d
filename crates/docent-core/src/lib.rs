#![forbid(unsafe_code)]

//! Core: tutorial definitions, progress records, and viewport geometry.
//!
//! # Role in docent
//! `docent-core` is the vocabulary layer. It owns the immutable tutorial
//! catalog types, the mutable per-tutorial progress records, and the
//! floating-point geometry used to place highlights and tooltips.
//!
//! # Primary responsibilities
//! - **Tutorial / Step**: immutable walkthrough definitions with targets
//!   and tooltip placements.
//! - **TutorialProgress**: the persisted record of which steps a user has
//!   seen, completed, or dismissed.
//! - **Rect / Size**: viewport-coordinate geometry shared by the
//!   positioning layer.
//!
//! # How it fits in the system
//! The engine (`docent-engine`) mutates progress records and walks steps;
//! the overlay layer (`docent-overlay`) turns a step plus a resolved
//! target rect into render-ready geometry. Both consume this crate and
//! never the other way around.

pub mod geometry;
pub mod progress;
pub mod tutorial;
