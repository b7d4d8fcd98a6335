//! Durable crawl state
//!
//! `state.json` is the single source of truth for resumption: the catalog
//! page being walked, how many novels the logical crawl has processed,
//! and per-novel chapter progress. Saves are atomic (temp file + rename)
//! so a crash mid-write never corrupts the previously valid file; loads
//! never fail, a missing or unreadable file simply yields a fresh state.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::storage::StorageError;

/// Per-novel chapter discovery progress, keyed by slug
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NovelProgress {
    /// Highest chapter sequence persisted so far
    #[serde(default)]
    pub last_chapter: u32,

    /// True once chapter discovery for this novel is finished for good
    #[serde(default)]
    pub completed: bool,
}

/// The persisted crawl checkpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlState {
    /// Catalog page currently being walked (1-based)
    #[serde(default = "first_page")]
    pub current_page: u32,

    /// Novels fully processed in this logical crawl
    #[serde(default)]
    pub stories_crawled_count: u32,

    /// Slug → progress for every novel touched so far
    #[serde(default)]
    pub processed_novels: BTreeMap<String, NovelProgress>,
}

fn first_page() -> u32 {
    1
}

impl Default for CrawlState {
    fn default() -> Self {
        Self {
            current_page: 1,
            stories_crawled_count: 0,
            processed_novels: BTreeMap::new(),
        }
    }
}

impl CrawlState {
    /// Progress for a slug, zero when the novel was never touched.
    pub fn progress(&self, slug: &str) -> NovelProgress {
        self.processed_novels.get(slug).copied().unwrap_or_default()
    }
}

/// Loads the crawl state, falling back to a fresh zero-value state when
/// the file is missing or unparsable.
pub fn load_state(path: &Path) -> CrawlState {
    match fs::read_to_string(path) {
        Ok(text) => match serde_json::from_str(&text) {
            Ok(state) => state,
            Err(e) => {
                tracing::warn!(
                    "State file {} is unparsable ({}), starting from a fresh state",
                    path.display(),
                    e
                );
                CrawlState::default()
            }
        },
        Err(_) => CrawlState::default(),
    }
}

/// Atomically persists the crawl state: writes to a temporary file in the
/// same directory, then renames it over the target.
pub fn save_state(path: &Path, state: &CrawlState) -> Result<(), StorageError> {
    let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
    let dir = dir.unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    serde_json::to_writer_pretty(&mut tmp, state)?;
    tmp.write_all(b"\n")?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
