//! In-memory scenario catalog keyed by `meta.id`.
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::hash::Hasher;
use twox_hash::XxHash64;

use crate::scenario::{Scenario, ScenarioDocument, normalize};

/// Stored document plus a content digest for change detection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryEntry {
    pub document: ScenarioDocument,
    pub fingerprint: u64,
}

/// Digest of a document's canonical JSON encoding.
#[must_use]
pub fn fingerprint(document: &ScenarioDocument) -> u64 {
    let bytes = serde_json::to_vec(document).unwrap_or_default();
    let mut hasher = XxHash64::with_seed(0);
    hasher.write(&bytes);
    hasher.finish()
}

/// Catalog ordering applied by [`ScenarioRegistry::query`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogSort {
    /// Registration order.
    #[default]
    Recommended,
    DifficultyHighToLow,
    DifficultyLowToHigh,
}

/// Listing filter used by scenario pickers.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CatalogQuery {
    /// Case-insensitive substring over title, description and tags.
    #[serde(default)]
    pub search: Option<String>,
    /// Keep scenarios with a tag containing this text; `None` keeps all.
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub sort: CatalogSort,
}

impl CatalogQuery {
    fn matches(&self, document: &ScenarioDocument) -> bool {
        let meta = &document.meta;
        let search_ok = self
            .search
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .is_none_or(|q| {
                let q = q.to_lowercase();
                meta.title.to_lowercase().contains(&q)
                    || meta.description.to_lowercase().contains(&q)
                    || meta.tags.iter().any(|t| t.to_lowercase().contains(&q))
            });
        let category_ok = self.category.as_deref().is_none_or(|category| {
            let category = category.to_lowercase();
            meta.tags
                .iter()
                .any(|t| t.to_lowercase().contains(&category))
        });
        search_ok && category_ok
    }
}

/// Registry of every known scenario, built-in and imported alike.
#[derive(Debug, Clone, Default)]
pub struct ScenarioRegistry {
    entries: Vec<RegistryEntry>,
    index: HashMap<String, usize>,
}

impl ScenarioRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry seeded with `documents`.
    #[must_use]
    pub fn with_documents(documents: impl IntoIterator<Item = ScenarioDocument>) -> Self {
        let mut registry = Self::new();
        for document in documents {
            registry.register(document);
        }
        registry
    }

    /// Insert or replace the scenario with the same id; returns its
    /// play-facing projection.
    pub fn register(&mut self, document: ScenarioDocument) -> Scenario {
        let scenario = normalize(&document);
        let entry = RegistryEntry {
            fingerprint: fingerprint(&document),
            document,
        };
        let id = entry.document.meta.id.clone();
        if let Some(&slot) = self.index.get(&id) {
            let unchanged = self.entries[slot].fingerprint == entry.fingerprint;
            log::info!("scenario '{id}' replaced (unchanged: {unchanged})");
            self.entries[slot] = entry;
        } else {
            log::info!(
                "scenario '{id}' registered with {} question(s)",
                entry.document.questions.len()
            );
            self.index.insert(id, self.entries.len());
            self.entries.push(entry);
        }
        scenario
    }

    #[must_use]
    pub fn get_all(&self) -> Vec<Scenario> {
        self.entries
            .iter()
            .map(|entry| normalize(&entry.document))
            .collect()
    }

    #[must_use]
    pub fn get_by_id(&self, id: &str) -> Option<Scenario> {
        self.document(id).map(normalize)
    }

    #[must_use]
    pub fn document(&self, id: &str) -> Option<&ScenarioDocument> {
        self.entry(id).map(|entry| &entry.document)
    }

    #[must_use]
    pub fn entry(&self, id: &str) -> Option<&RegistryEntry> {
        self.index.get(id).and_then(|&slot| self.entries.get(slot))
    }

    pub fn entries(&self) -> std::slice::Iter<'_, RegistryEntry> {
        self.entries.iter()
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Filter and order the catalog for display.
    #[must_use]
    pub fn query(&self, query: &CatalogQuery) -> Vec<Scenario> {
        let mut matched: Vec<&ScenarioDocument> = self
            .entries
            .iter()
            .map(|entry| &entry.document)
            .filter(|document| query.matches(document))
            .collect();
        match query.sort {
            CatalogSort::Recommended => {}
            CatalogSort::DifficultyHighToLow => {
                matched.sort_by_key(|d| std::cmp::Reverse(d.meta.difficulty.rank()));
            }
            CatalogSort::DifficultyLowToHigh => matched.sort_by_key(|d| d.meta.difficulty.rank()),
        }
        matched.into_iter().map(normalize).collect()
    }
}
