use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use larder::{IngredientSelector, RecipeDetail, SaveOutcome, SaveStatus};
use serde::Serialize;
use tokio::sync::Mutex;

use super::{run_search, SearchError};
use crate::catalog::Catalog;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SearchOutcome {
    /// The newest search; its results are now on the board.
    Current {
        generation: u64,
        recipes: Vec<RecipeDetail>,
    },
    /// A newer search started while this one ran, so its results were thrown away.
    Superseded { generation: u64 },
}

/// State behind one user's search page.
///
/// Every search takes a new generation number. Results are only written back if no
/// newer search has started in the meantime, so a slow answer can't overwrite a fresh one.
#[derive(Default)]
pub struct SearchBoard {
    selector: Mutex<IngredientSelector>,
    generation: AtomicU64,
    results: Mutex<Vec<RecipeDetail>>,
    last_error: Mutex<Option<String>>,
    save_status: DashMap<String, SaveStatus>,
}

impl SearchBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn selector(&self) -> IngredientSelector {
        self.selector.lock().await.clone()
    }

    /// Change the selection and return the result along with the new selection.
    pub async fn update_selector<R>(
        &self,
        change: impl FnOnce(&mut IngredientSelector) -> R,
    ) -> (R, IngredientSelector) {
        let mut selector = self.selector.lock().await;
        let result = change(&mut selector);
        (result, selector.clone())
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    pub async fn results(&self) -> Vec<RecipeDetail> {
        self.results.lock().await.clone()
    }

    pub async fn last_error(&self) -> Option<String> {
        self.last_error.lock().await.clone()
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation() == generation
    }

    /// Run the current selection against the catalog.
    pub async fn search(&self, catalog: &dyn Catalog) -> Result<SearchOutcome, SearchError> {
        let criteria = self.selector.lock().await.search_criteria();
        // The generation only moves while `results` is locked, so a current check made
        // under that lock holds until the lock is released.
        let generation = {
            let mut results = self.results.lock().await;
            let mut last_error = self.last_error.lock().await;
            let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            results.clear();
            *last_error = None;
            self.save_status
                .retain(|_, status| *status == SaveStatus::Saving);
            generation
        };

        let result = match criteria {
            Ok(criteria) => run_search(catalog, &criteria).await,
            Err(e) => Err(e.into()),
        };

        let mut results = self.results.lock().await;
        let mut last_error = self.last_error.lock().await;
        if !self.is_current(generation) {
            tracing::info!("Discarding results of superseded search {}", generation);
            return Ok(SearchOutcome::Superseded { generation });
        }
        match result {
            Ok(recipes) => {
                *results = recipes.clone();
                Ok(SearchOutcome::Current {
                    generation,
                    recipes,
                })
            }
            Err(e) => {
                *last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    pub fn save_status(&self, mealdb_id: &str) -> SaveStatus {
        self.save_status
            .get(mealdb_id)
            .map(|s| s.value().clone())
            .unwrap_or_default()
    }

    /// Mark a card as saving. If it is already saving or saved, returns its status instead.
    pub fn begin_save(&self, mealdb_id: &str) -> Result<(), SaveStatus> {
        let mut status = self.save_status.entry(mealdb_id.to_string()).or_default();
        if status.begin() {
            Ok(())
        } else {
            Err(status.clone())
        }
    }

    /// Forget the save state of these cards, so they can be saved again.
    pub fn clear_save_status<'a>(&self, cards: impl IntoIterator<Item = &'a str>) {
        for card in cards {
            self.save_status.remove(card);
        }
    }

    pub fn finish_save<E: std::fmt::Display>(
        &self,
        mealdb_id: &str,
        result: Result<SaveOutcome, E>,
    ) -> SaveStatus {
        let mut status = self.save_status.entry(mealdb_id.to_string()).or_default();
        status.finish(result);
        status.clone()
    }
}
