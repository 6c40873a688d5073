use std::sync::Arc;

use dashmap::{mapref::entry::Entry, DashMap};
use larder::{FavoriteEntry, RecipeDetail};
use serde::Serialize;

use crate::catalog::Catalog;

/// What we know about one favorite's catalog record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DetailCacheEntry {
    Loading,
    Ready { detail: Arc<RecipeDetail> },
    Failed { message: String },
}

/// Per-user cache of catalog records for their favorites, keyed by internal recipe id.
///
/// Entries are filled lazily and only ever dropped when the favorite is removed.
#[derive(Default)]
pub struct DetailCache {
    entries: DashMap<i64, DetailCacheEntry>,
}

impl DetailCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, recipe_id: i64) -> Option<DetailCacheEntry> {
        self.entries.get(&recipe_id).map(|e| e.value().clone())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fetch the record for `recipe_id` unless we already have it or are already fetching it.
    ///
    /// Returns true if this call did the fetch.
    pub async fn ensure(
        &self,
        catalog: &dyn Catalog,
        recipe_id: i64,
        mealdb_id: Option<&str>,
    ) -> bool {
        let Some(mealdb_id) = mealdb_id else {
            tracing::debug!("Recipe {} has no catalog id, nothing to fetch", recipe_id);
            return false;
        };
        match self.entries.entry(recipe_id) {
            Entry::Occupied(_) => return false,
            Entry::Vacant(slot) => {
                slot.insert(DetailCacheEntry::Loading);
            }
        }

        let settled = match catalog.get_detail(mealdb_id).await {
            Ok(detail) => DetailCacheEntry::Ready {
                detail: Arc::new(detail),
            },
            Err(e) => DetailCacheEntry::Failed {
                message: e.to_string(),
            },
        };
        // If the favorite was removed while we were fetching, leave it gone.
        if let Some(mut entry) = self.entries.get_mut(&recipe_id) {
            if *entry == DetailCacheEntry::Loading {
                *entry = settled;
            }
        }
        true
    }

    /// Fill the cache for every favorite, one catalog request at a time.
    pub async fn warm_all(&self, catalog: &dyn Catalog, favorites: &[FavoriteEntry]) -> usize {
        tracing::info!("Warming details for {} favorites", favorites.len());
        let mut fetched = 0;
        for favorite in favorites {
            if self
                .ensure(catalog, favorite.recipe_id, favorite.mealdb_id.as_deref())
                .await
            {
                fetched += 1;
            }
        }
        tracing::info!("Warmed {} of {} favorites", fetched, favorites.len());
        fetched
    }

    pub fn evict(&self, recipe_id: i64) {
        self.entries.remove(&recipe_id);
    }
}
