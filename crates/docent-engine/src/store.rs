//! Progress persistence.
//!
//! [`ProgressStore`] is the injected boundary between the engine and
//! whatever keeps progress alive between sessions. The contract is
//! deliberately infallible: persistence is convenience, not
//! correctness, so implementations recover internally and log instead
//! of surfacing errors into the walkthrough flow.
//!
//! # File Format
//!
//! [`JsonFileStore`] writes a versioned document:
//!
//! ```json
//! {
//!   "version": 1,
//!   "saved_at_ms": 1764115200000,
//!   "tutorials": {
//!     "onboarding": {
//!       "tutorial_id": "onboarding",
//!       "completed_steps": ["hello", "menu"],
//!       "current_step_id": "menu",
//!       "completed": false,
//!       "dismissed": false,
//!       "last_updated_ms": 1764115200000
//!     }
//!   }
//! }
//! ```
//!
//! # Atomic Writes
//!
//! Writes use a temp-file-then-rename pattern to prevent corruption on
//! crash.

use std::io;
use std::path::{Path, PathBuf};

use docent_core::progress::{ProgressMap, now_ms};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Current file format version.
const FORMAT_VERSION: u64 = 1;

/// On-disk representation of saved progress.
#[derive(Debug, Serialize, Deserialize)]
struct ProgressFile {
    version: u64,
    saved_at_ms: u64,
    tutorials: ProgressMap,
}

/// Where progress records live between sessions.
///
/// `load` runs once at engine construction; `save` runs after every
/// engine mutation. Neither returns an error: a store that cannot do
/// its job degrades (empty map on load, dropped write on save) and says
/// so through `tracing`.
pub trait ProgressStore {
    /// Load all saved records. Failures degrade to an empty map.
    fn load(&mut self) -> ProgressMap;

    /// Persist all records. Failures are logged and dropped.
    fn save(&mut self, map: &ProgressMap);
}

/// In-memory store for tests and ephemeral hosts.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    map: ProgressMap,
    saves: usize,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-seeded with records, as if loaded from disk.
    #[must_use]
    pub fn with_map(map: ProgressMap) -> Self {
        Self { map, saves: 0 }
    }

    /// Number of `save` calls so far.
    #[must_use]
    pub fn saves(&self) -> usize {
        self.saves
    }

    /// The records as of the last save (or the seed).
    #[must_use]
    pub fn map(&self) -> &ProgressMap {
        &self.map
    }
}

impl ProgressStore for MemoryStore {
    fn load(&mut self) -> ProgressMap {
        self.map.clone()
    }

    fn save(&mut self, map: &ProgressMap) {
        self.map = map.clone();
        self.saves += 1;
    }
}

/// JSON-file store with atomic writes.
///
/// - Missing file loads as empty progress (a fresh user, not an error).
/// - Unreadable, malformed, or wrong-version files load as empty
///   progress with a warning; the next save overwrites them.
/// - Failed saves leave the previous file untouched.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Store progress at `path`. The parent directory must exist.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The file this store reads and writes.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> io::Result<ProgressMap> {
        if !self.path.exists() {
            return Ok(ProgressMap::new());
        }

        let contents = std::fs::read_to_string(&self.path)?;
        let file: ProgressFile = serde_json::from_str(&contents).map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("failed to parse progress file: {e}"),
            )
        })?;

        if file.version != FORMAT_VERSION {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "unsupported progress file version: {} (expected {FORMAT_VERSION})",
                    file.version
                ),
            ));
        }

        Ok(file.tutorials)
    }

    fn write(&self, map: &ProgressMap) -> io::Result<()> {
        let file = ProgressFile {
            version: FORMAT_VERSION,
            saved_at_ms: now_ms(),
            tutorials: map.clone(),
        };

        let json = serde_json::to_string_pretty(&file).map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("failed to serialize progress: {e}"),
            )
        })?;

        // Atomic write: temp file then rename.
        let temp = self.path.with_extension("json.tmp");
        std::fs::write(&temp, json)?;
        std::fs::rename(&temp, &self.path)?;

        Ok(())
    }
}

impl ProgressStore for JsonFileStore {
    fn load(&mut self) -> ProgressMap {
        match self.read() {
            Ok(map) => {
                debug!(
                    path = %self.path.display(),
                    records = map.len(),
                    "progress.loaded"
                );
                map
            }
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "progress.load_failed (starting with empty progress)"
                );
                ProgressMap::new()
            }
        }
    }

    fn save(&mut self, map: &ProgressMap) {
        if let Err(e) = self.write(map) {
            warn!(
                path = %self.path.display(),
                error = %e,
                "progress.save_failed (keeping records in memory only)"
            );
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
