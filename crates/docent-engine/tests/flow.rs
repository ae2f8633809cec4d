#![forbid(unsafe_code)]

//! End-to-end walkthrough flows over the public API.
//!
//! Covers:
//! 1. First visit to a route: auto-start, walk every step, finish.
//! 2. Immediate dismissal: no re-trigger on revisit, manual replay stays
//!    available.
//! 3. Progress surviving a restart through the JSON file store.
//!
//! Run:
//!   cargo test -p docent-engine --test flow

use std::cell::RefCell;
use std::rc::Rc;

use docent_core::tutorial::{Placement, Step, StepTarget, Tutorial, TutorialCategory};
use docent_engine::catalog::TutorialCatalog;
use docent_engine::engine::{EngineEvent, TutorialEngine};
use docent_engine::store::{JsonFileStore, MemoryStore, ProgressStore};

fn getting_started() -> Tutorial {
    Tutorial::new("getting-started", "Getting started")
        .description("A quick tour of the dashboard.")
        .category(TutorialCategory::Onboarding)
        .auto_start(true)
        .trigger_route("/dashboard")
        .step(
            Step::new("welcome", "Welcome")
                .content("This tour shows the three things you will use most."),
        )
        .step(
            Step::new("search", "Search anywhere")
                .content("Find orders, products and customers from here.")
                .target(StepTarget::new("#global-search"))
                .placement(Placement::Bottom),
        )
        .step(
            Step::new("create", "Create your first order")
                .content("Everything starts from this button.")
                .target(StepTarget::new("#new-order").margin(16.0))
                .placement(Placement::Left)
                .action("Open the order form"),
        )
}

fn orders_tour() -> Tutorial {
    Tutorial::new("orders-tour", "Order management")
        .category(TutorialCategory::Orders)
        .auto_start(true)
        .trigger_route("/orders")
        .step(Step::new("filters", "Filter the list").target(StepTarget::new("#order-filters")))
        .step(Step::new("export", "Export").target(StepTarget::new("#export-csv")))
}

fn engine_over(store: Box<dyn ProgressStore>) -> TutorialEngine {
    let mut catalog = TutorialCatalog::new();
    catalog.register(getting_started());
    catalog.register(orders_tour());
    TutorialEngine::new(catalog, store)
}

// ── Scenario: first visit to a route ─────────────────────────────────────

#[test]
fn first_visit_auto_starts_and_walks_to_completion() {
    let mut engine = engine_over(Box::new(MemoryStore::new()));
    let transitions = Rc::new(RefCell::new(Vec::new()));
    let transitions_clone = Rc::clone(&transitions);
    let _sub = engine.subscribe(move |event| {
        transitions_clone.borrow_mut().push(match event {
            EngineEvent::Started { step_index, .. } => format!("started@{step_index}"),
            EngineEvent::StepChanged { step_index, .. } => format!("step@{step_index}"),
            EngineEvent::Finished { .. } => "finished".to_owned(),
            EngineEvent::Ended { .. } => "ended".to_owned(),
            EngineEvent::ProgressReset { .. } => "reset".to_owned(),
        });
    });

    // Landing on the dashboard for the first time starts the tour.
    assert_eq!(
        engine.handle_route_change("/dashboard").as_deref(),
        Some("getting-started")
    );
    assert_eq!(engine.active_step().map(|s| s.id.as_str()), Some("welcome"));

    // Walk forward until the engine goes idle.
    assert_eq!(engine.next_step().map(|s| s.id), Some("search".to_owned()));
    assert_eq!(engine.next_step().map(|s| s.id), Some("create".to_owned()));
    assert!(engine.next_step().is_none());
    assert!(!engine.is_active());

    let record = engine.progress("getting-started").expect("record written");
    assert!(record.completed);
    assert!(!record.dismissed);
    for step_id in ["welcome", "search", "create"] {
        assert!(record.is_step_completed(step_id), "{step_id} marked");
    }

    assert_eq!(
        *transitions.borrow(),
        vec!["started@0", "step@1", "step@2", "finished"]
    );

    // Revisiting the route must not re-trigger the tour...
    assert_eq!(engine.handle_route_change("/dashboard"), None);
    // ...but the route still offers it for a manual replay.
    let offered = engine.tutorials_for_route("/dashboard");
    assert_eq!(offered.len(), 1);
    assert_eq!(offered[0].id, "getting-started");
}

#[test]
fn routes_trigger_independently() {
    let mut engine = engine_over(Box::new(MemoryStore::new()));

    assert_eq!(
        engine.handle_route_change("/dashboard").as_deref(),
        Some("getting-started")
    );
    engine.end_tutorial(false);

    // The orders tour is untouched by the dashboard run.
    assert_eq!(
        engine.handle_route_change("/orders").as_deref(),
        Some("orders-tour")
    );
    assert_eq!(engine.active_tutorial().map(|t| t.id.as_str()), Some("orders-tour"));
}

// ── Scenario: immediate dismissal ────────────────────────────────────────

#[test]
fn dismissal_blocks_auto_start_but_not_manual_replay() {
    let mut engine = engine_over(Box::new(MemoryStore::new()));

    engine.handle_route_change("/dashboard");
    engine.end_tutorial(true);

    let record = engine.progress("getting-started").expect("record written");
    assert!(record.dismissed);
    assert!(!record.completed);
    assert_eq!(record.current_step_id.as_deref(), Some("welcome"));

    // Revisit: stays quiet.
    assert_eq!(engine.handle_route_change("/dashboard"), None);
    assert!(engine.auto_start_for_route("/dashboard").is_none());

    // The help menu still lists it, and a manual start clears the
    // dismissal so a later abandon behaves like a fresh one.
    assert_eq!(engine.tutorials_for_route("/dashboard").len(), 1);
    assert!(engine.start_tutorial("getting-started"));
    assert!(!engine.progress("getting-started").unwrap().dismissed);
}

#[test]
fn completed_and_dismissed_drops_out_of_route_offers() {
    let mut engine = engine_over(Box::new(MemoryStore::new()));

    // Complete the tour, then dismiss a replay partway through.
    engine.start_tutorial("getting-started");
    while engine.next_step().is_some() {}
    engine.start_tutorial("getting-started");
    engine.end_tutorial(true);

    let record = engine.progress("getting-started").unwrap();
    assert!(record.completed && record.dismissed);
    assert!(engine.tutorials_for_route("/dashboard").is_empty());

    // Resetting restores first-run behavior entirely.
    engine.reset_progress("getting-started");
    assert_eq!(engine.tutorials_for_route("/dashboard").len(), 1);
    assert_eq!(
        engine.handle_route_change("/dashboard").as_deref(),
        Some("getting-started")
    );
}

// ── Restart with the file store ──────────────────────────────────────────

#[test]
fn progress_survives_restart() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("progress.json");

    // Session 1: get halfway through, then the app closes mid-run.
    {
        let mut engine = engine_over(Box::new(JsonFileStore::new(&path)));
        engine.handle_route_change("/dashboard");
        engine.next_step();
    }

    // Session 2: the half-finished record is back, but navigation state
    // is not. The route triggers again and the tour starts from the top.
    {
        let mut engine = engine_over(Box::new(JsonFileStore::new(&path)));
        assert!(!engine.is_active());

        let record = engine.progress("getting-started").expect("reloaded");
        assert!(record.is_step_completed("welcome"));
        assert!(!record.completed);

        assert_eq!(
            engine.handle_route_change("/dashboard").as_deref(),
            Some("getting-started")
        );
        assert_eq!(engine.active_step_index(), Some(0));
        while engine.next_step().is_some() {}
    }

    // Session 3: completion stuck.
    {
        let engine = engine_over(Box::new(JsonFileStore::new(&path)));
        assert!(engine.progress("getting-started").expect("reloaded").completed);
        assert!(engine.auto_start_for_route("/dashboard").is_none());
    }
}

#[test]
fn dismissal_survives_restart() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("progress.json");

    {
        let mut engine = engine_over(Box::new(JsonFileStore::new(&path)));
        engine.handle_route_change("/orders");
        engine.end_tutorial(true);
    }

    let mut engine = engine_over(Box::new(JsonFileStore::new(&path)));
    assert_eq!(engine.handle_route_change("/orders"), None);
    assert!(engine.progress("orders-tour").expect("reloaded").dismissed);
}
