#![forbid(unsafe_code)]

//! Engine: tutorial catalog, progress persistence, and the walkthrough
//! state machine.
//!
//! # Role in docent
//! `docent-engine` owns all mutable tutorial state. The host registers
//! tutorial definitions in a [`catalog::TutorialCatalog`], picks a
//! [`store::ProgressStore`] for persistence, and drives a single
//! [`engine::TutorialEngine`] with start/next/previous/end calls.
//!
//! # Primary responsibilities
//! - **TutorialCatalog**: id-addressed registry with route and category
//!   queries.
//! - **ProgressStore**: the injected persistence boundary, with JSON-file
//!   and in-memory implementations.
//! - **TutorialEngine**: the Idle/InStep state machine, the only writer
//!   of progress records.
//! - **Dispatcher**: typed, synchronous event notification with RAII
//!   unsubscribe guards.
//!
//! # How it fits in the system
//! The overlay layer (`docent-overlay`) subscribes to engine events and
//! projects the active step into render-ready geometry. The engine never
//! learns about rendering or element lookup; it deals purely in ids,
//! indices, and progress records.

pub mod catalog;
pub mod dispatch;
pub mod engine;
pub mod store;
