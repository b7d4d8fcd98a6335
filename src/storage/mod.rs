//! The on-disk archive
//!
//! Layout, rooted at the configured data directory:
//!
//! ```text
//! <data-dir>/genres.json                 all taxonomy term records
//! <data-dir>/state.json                  crawl checkpoint (see crate::state)
//! <data-dir>/<novel-slug>/metadata.json  full novel record, rewritten on every save
//! <data-dir>/<novel-slug>/NNN - CHAxxxxxxx - Title.txt
//! ```
//!
//! Chapter artifacts are write-once: an artifact that already exists is
//! never rewritten, even when a re-fetch returns different content. The
//! novel metadata rewrite is a full idempotent replace.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

use crate::ids::{self, IdSeeds};
use crate::model::{ChapterRecord, GenreRecord, NovelRecord};
use crate::state::{save_state, CrawlState};

/// Errors from archive operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for archive operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Handle to the dataset directory
#[derive(Debug, Clone)]
pub struct Archive {
    root: PathBuf,
}

impl Archive {
    /// Opens (creating if needed) the archive root and seeds the shared
    /// files so partial crawls always find a consistent directory:
    /// an empty `genres.json` and a zero-value `state.json`.
    pub fn open(root: impl Into<PathBuf>) -> StorageResult<Self> {
        let archive = Self { root: root.into() };
        fs::create_dir_all(&archive.root)?;

        if !archive.genres_path().exists() {
            archive.save_genres(&[])?;
        }
        if !archive.state_path().exists() {
            save_state(&archive.state_path(), &CrawlState::default())?;
        }
        tracing::info!("Archive ready at {}", archive.root.display());
        Ok(archive)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn state_path(&self) -> PathBuf {
        self.root.join("state.json")
    }

    pub fn genres_path(&self) -> PathBuf {
        self.root.join("genres.json")
    }

    pub fn novel_dir(&self, slug: &str) -> PathBuf {
        self.root.join(slug)
    }

    /// Highest contiguous-looking chapter sequence already on disk for a
    /// novel, judged by the leading numeric token of artifact names.
    /// Returns 0 when the directory is missing or holds no artifacts.
    pub fn existing_max_chapter(&self, slug: &str) -> u32 {
        let entries = match fs::read_dir(self.novel_dir(slug)) {
            Ok(entries) => entries,
            Err(_) => return 0,
        };
        entries
            .flatten()
            .filter_map(|entry| leading_number(&entry.file_name().to_string_lossy()))
            .max()
            .unwrap_or(0)
    }

    /// Reads a novel's persisted metadata, if any. Unparsable metadata is
    /// treated as absent (the record will be rebuilt from a fresh scrape).
    pub fn load_novel(&self, slug: &str) -> Option<NovelRecord> {
        let path = self.novel_dir(slug).join("metadata.json");
        let text = fs::read_to_string(&path).ok()?;
        match serde_json::from_str(&text) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!("Ignoring unparsable metadata {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Persists a novel: full metadata replace, then one artifact per new
    /// chapter, skipping any artifact that already exists.
    pub fn write_novel(
        &self,
        novel: &NovelRecord,
        new_chapters: &[ChapterRecord],
    ) -> StorageResult<PathBuf> {
        let dir = self.novel_dir(&novel.slug);
        fs::create_dir_all(&dir)?;

        let metadata = serde_json::to_vec_pretty(novel)?;
        fs::write(dir.join("metadata.json"), metadata)?;

        for chapter in new_chapters {
            let path = dir.join(chapter.artifact_name());
            if path.exists() {
                tracing::debug!(
                    "Chapter artifact {} already exists, keeping previous content",
                    path.display()
                );
                continue;
            }
            fs::write(&path, chapter.body())?;
        }
        Ok(dir)
    }

    /// Loads the persisted genre list; missing or unparsable files yield
    /// an empty list.
    pub fn load_genres(&self) -> Vec<GenreRecord> {
        let text = match fs::read_to_string(self.genres_path()) {
            Ok(text) => text,
            Err(_) => return Vec::new(),
        };
        match serde_json::from_str(&text) {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!("Ignoring unparsable genres.json: {}", e);
                Vec::new()
            }
        }
    }

    /// Atomically rewrites the full genre list.
    pub fn save_genres(&self, genres: &[GenreRecord]) -> StorageResult<()> {
        let mut tmp = NamedTempFile::new_in(&self.root)?;
        serde_json::to_writer_pretty(&mut tmp, genres)?;
        tmp.write_all(b"\n")?;
        tmp.persist(self.genres_path()).map_err(|e| e.error)?;
        Ok(())
    }

    /// Every novel record currently in the archive (best effort; novels
    /// with missing or unparsable metadata are skipped).
    pub fn load_all_novels(&self) -> Vec<NovelRecord> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(_) => return Vec::new(),
        };
        entries
            .flatten()
            .filter(|entry| entry.path().is_dir())
            .filter_map(|entry| self.load_novel(&entry.file_name().to_string_lossy()))
            .collect()
    }

    /// Scans the persisted dataset for the highest issued identifier of
    /// each entity class, so the id generator can continue past them on a
    /// resumed run instead of re-issuing identifiers from 1.
    pub fn highest_issued_ids(&self) -> IdSeeds {
        let mut seeds = IdSeeds::default();
        for novel in self.load_all_novels() {
            if let Some(n) = ids::parse_sequence(&novel.novel_id) {
                seeds.novel = seeds.novel.max(n);
            }
            for chapter_id in &novel.chapter_list {
                if let Some(n) = ids::parse_sequence(chapter_id) {
                    seeds.chapter = seeds.chapter.max(n);
                }
            }
        }
        for genre in self.load_genres() {
            if let Some(n) = ids::parse_sequence(&genre.genre_id) {
                seeds.genre = seeds.genre.max(n);
            }
        }
        seeds
    }
}

/// Parses the leading decimal token of an artifact name: `012 - …` → 12.
fn leading_number(name: &str) -> Option<u32> {
    let digits: String = name.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        None
    } else {
        digits.parse().ok()
    }
}
