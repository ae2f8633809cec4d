#![forbid(unsafe_code)]

//! Central registry of tutorial definitions.
//!
//! Maps tutorial ids to immutable [`Tutorial`] definitions and answers
//! the two route questions the host asks on navigation: which tutorials
//! should this route offer, and which one (if any) may start on its own.
//! Both queries take a [`ProgressMap`] snapshot so the catalog itself
//! stays free of mutable state.
//!
//! # Invariants
//!
//! 1. Each id maps to at most one [`Tutorial`]; re-registering replaces
//!    in place.
//! 2. Iteration order is registration order. Auto-start picks the first
//!    eligible match in that order.
//! 3. A tutorial stops being offered on its route only once it is both
//!    completed **and** dismissed; either flag alone leaves it offered.
//!
//! # Example
//!
//! ```
//! use docent_core::progress::ProgressMap;
//! use docent_core::tutorial::{Step, Tutorial};
//! use docent_engine::catalog::TutorialCatalog;
//!
//! let mut catalog = TutorialCatalog::new();
//! catalog.register(
//!     Tutorial::new("onboarding", "Welcome")
//!         .trigger_route("/home")
//!         .auto_start(true)
//!         .step(Step::new("hello", "Hello")),
//! );
//!
//! let progress = ProgressMap::new();
//! assert_eq!(catalog.for_route("/home", &progress).len(), 1);
//! assert!(catalog.auto_start_for_route("/home", &progress).is_some());
//! ```

use std::io;

use docent_core::progress::ProgressMap;
use docent_core::tutorial::{Tutorial, TutorialCategory};
use serde::Deserialize;
use tracing::debug;

/// Current catalog document version.
const CATALOG_VERSION: u64 = 1;

/// On-disk representation of a data-declared catalog.
#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default = "default_catalog_version")]
    version: u64,
    tutorials: Vec<Tutorial>,
}

fn default_catalog_version() -> u64 {
    CATALOG_VERSION
}

/// Registry of tutorial definitions, ordered by registration.
#[derive(Debug, Clone, Default)]
pub struct TutorialCatalog {
    tutorials: Vec<Tutorial>,
}

impl TutorialCatalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tutorials: Vec::new(),
        }
    }

    /// Load a catalog from a JSON document of the form
    /// `{ "version": 1, "tutorials": [...] }`.
    ///
    /// Unknown versions and malformed documents are rejected with
    /// [`io::ErrorKind::InvalidData`].
    pub fn from_json_str(json: &str) -> io::Result<Self> {
        let file: CatalogFile = serde_json::from_str(json).map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("failed to parse tutorial catalog: {e}"),
            )
        })?;

        if file.version != CATALOG_VERSION {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "unsupported tutorial catalog version: {} (expected {CATALOG_VERSION})",
                    file.version
                ),
            ));
        }

        let mut catalog = Self::new();
        for tutorial in file.tutorials {
            catalog.register(tutorial);
        }
        debug!(tutorials = catalog.len(), "catalog.loaded");
        Ok(catalog)
    }

    /// Register a tutorial definition.
    ///
    /// Replaces any existing definition with the same id, keeping its
    /// position in the registration order.
    pub fn register(&mut self, tutorial: Tutorial) {
        if let Some(existing) = self.tutorials.iter_mut().find(|t| t.id == tutorial.id) {
            *existing = tutorial;
        } else {
            self.tutorials.push(tutorial);
        }
    }

    /// Remove a tutorial definition.
    ///
    /// Returns `true` if a definition was present.
    pub fn unregister(&mut self, id: &str) -> bool {
        let before = self.tutorials.len();
        self.tutorials.retain(|t| t.id != id);
        self.tutorials.len() != before
    }

    /// Look up a tutorial by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Tutorial> {
        self.tutorials.iter().find(|t| t.id == id)
    }

    /// Whether a tutorial with this id is registered.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// All tutorials, in registration order.
    #[must_use]
    pub fn all(&self) -> &[Tutorial] {
        &self.tutorials
    }

    /// Tutorials in a category, in registration order.
    #[must_use]
    pub fn by_category(&self, category: TutorialCategory) -> Vec<&Tutorial> {
        self.tutorials
            .iter()
            .filter(|t| t.category == category)
            .collect()
    }

    /// Number of registered tutorials.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tutorials.len()
    }

    /// Whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tutorials.is_empty()
    }

    /// Iterate over all registered ids.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.tutorials.iter().map(|t| t.id.as_str())
    }

    /// Tutorials this route should offer, given the user's progress.
    ///
    /// A tutorial is offered while its progress record is absent or not
    /// yet both completed and dismissed.
    #[must_use]
    pub fn for_route<'a>(&'a self, route: &str, progress: &ProgressMap) -> Vec<&'a Tutorial> {
        self.tutorials
            .iter()
            .filter(|t| t.trigger_route.as_deref() == Some(route))
            .filter(|t| is_offered(progress, &t.id))
            .collect()
    }

    /// The tutorial that may start on its own for this route, if any.
    ///
    /// Scans in registration order for the first auto-start tutorial on
    /// the route whose progress is absent or carries neither terminal
    /// flag.
    #[must_use]
    pub fn auto_start_for_route<'a>(
        &'a self,
        route: &str,
        progress: &ProgressMap,
    ) -> Option<&'a Tutorial> {
        self.tutorials
            .iter()
            .filter(|t| t.auto_start && t.trigger_route.as_deref() == Some(route))
            .find(|t| is_auto_startable(progress, &t.id))
    }
}

/// Route-offer rule: absent record, or not (completed and dismissed).
fn is_offered(progress: &ProgressMap, id: &str) -> bool {
    match progress.get(id) {
        None => true,
        Some(p) => !(p.completed && p.dismissed),
    }
}

/// Auto-start rule: absent record, or neither completed nor dismissed.
fn is_auto_startable(progress: &ProgressMap, id: &str) -> bool {
    match progress.get(id) {
        None => true,
        Some(p) => !p.completed && !p.dismissed,
    }
}
