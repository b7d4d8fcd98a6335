//! Genre taxonomy deduplication
//!
//! Genres are a shared vocabulary built incrementally while novels are
//! processed independently. The registry guarantees that a canonical name
//! (exact match after trimming) maps to exactly one identifier for the
//! dataset's lifetime: it is rebuilt from the persisted `genres.json` at
//! startup, so names seen in earlier runs keep their identifiers.

use std::collections::HashMap;

use crate::ids::{EntityKind, IdGenerator};
use crate::model::records::GENRE_CLASS;
use crate::model::{synth, GenreRecord};
use crate::text::slugify;

/// Name → id map plus the full ordered term list for persistence
#[derive(Debug, Default)]
pub struct GenreRegistry {
    by_name: HashMap<String, String>,
    records: Vec<GenreRecord>,
}

impl GenreRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds the registry from previously persisted records.
    pub fn from_records(records: Vec<GenreRecord>) -> Self {
        let by_name = records
            .iter()
            .map(|r| (r.name.clone(), r.genre_id.clone()))
            .collect();
        Self { by_name, records }
    }

    /// Resolves a raw genre name to its identifier, allocating a new term
    /// record on first sight. Blank names resolve to `None`.
    pub fn resolve(&mut self, raw_name: &str, ids: &mut IdGenerator) -> Option<String> {
        let name = raw_name.trim();
        if name.is_empty() {
            return None;
        }
        if let Some(id) = self.by_name.get(name) {
            return Some(id.clone());
        }

        let id = ids.next(EntityKind::Genre);
        let slug = slugify(name).unwrap_or_else(|| id.to_lowercase());
        let (created, updated) = synth::genre_dates();
        self.records.push(GenreRecord {
            genre_id: id.clone(),
            name: name.to_string(),
            description: format!("{} {}", name, id),
            slug,
            is_active: true,
            created,
            updated,
            class: GENRE_CLASS.to_string(),
        });
        self.by_name.insert(name.to_string(), id.clone());
        tracing::debug!("New genre '{}' -> {}", name, id);
        Some(id)
    }

    /// The full term list, in allocation order.
    pub fn records(&self) -> &[GenreRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_name_resolves_to_same_id() {
        let mut ids = IdGenerator::new();
        let mut registry = GenreRegistry::new();

        let first = registry.resolve("Fantasy", &mut ids).unwrap();
        let second = registry.resolve("Fantasy", &mut ids).unwrap();
        assert_eq!(first, second);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_trimming_collapses_padded_names() {
        let mut ids = IdGenerator::new();
        let mut registry = GenreRegistry::new();

        let a = registry.resolve("  Tiên Hiệp ", &mut ids).unwrap();
        let b = registry.resolve("Tiên Hiệp", &mut ids).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_case_is_significant() {
        let mut ids = IdGenerator::new();
        let mut registry = GenreRegistry::new();

        let lower = registry.resolve("fantasy", &mut ids).unwrap();
        let upper = registry.resolve("Fantasy", &mut ids).unwrap();
        assert_ne!(lower, upper);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_blank_names_are_ignored() {
        let mut ids = IdGenerator::new();
        let mut registry = GenreRegistry::new();

        assert_eq!(registry.resolve("", &mut ids), None);
        assert_eq!(registry.resolve("   ", &mut ids), None);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_reload_preserves_identifiers_across_runs() {
        let mut ids = IdGenerator::new();
        let mut registry = GenreRegistry::new();
        let fantasy = registry.resolve("Fantasy", &mut ids).unwrap();

        // Simulate a second run: registry rebuilt from persisted records,
        // id generator reseeded past the issued genre ids.
        let mut reloaded = GenreRegistry::from_records(registry.records().to_vec());
        let mut ids2 = IdGenerator::seeded(crate::ids::IdSeeds {
            genre: 1,
            ..Default::default()
        });

        assert_eq!(reloaded.resolve("Fantasy", &mut ids2), Some(fantasy));
        let wuxia = reloaded.resolve("Wuxia", &mut ids2).unwrap();
        assert_eq!(wuxia, "GEN0000002");
    }

    #[test]
    fn test_record_fields() {
        let mut ids = IdGenerator::new();
        let mut registry = GenreRegistry::new();
        let id = registry.resolve("Huyền Huyễn", &mut ids).unwrap();

        let record = &registry.records()[0];
        assert_eq!(record.genre_id, id);
        assert_eq!(record.name, "Huyền Huyễn");
        assert_eq!(record.slug, "huyen-huyen");
        assert_eq!(record.description, format!("Huyền Huyễn {}", id));
        assert!(record.is_active);
    }
}
