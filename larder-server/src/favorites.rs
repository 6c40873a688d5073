use larder::favorites::Tentative;
use larder::{FavoriteEntry, SaveOutcome, ValidationError};
use tokio::sync::Mutex;

use crate::catalog::Catalog;
use crate::database::Database;
use crate::detail_cache::{DetailCache, DetailCacheEntry};
use crate::models::{Favorite, InternalRecipe};

#[derive(thiserror::Error, Debug)]
pub enum FavoriteError {
    #[error("Failed to save favorite: {0}")]
    Save(anyhow::Error),
    #[error("Failed to remove favorite: {0}")]
    Remove(anyhow::Error),
    #[error("Could not load your favorite recipes: {0}")]
    Load(anyhow::Error),
}

/// Save a catalog recipe as one of `user_id`'s favorites.
///
/// The catalog recipe is mapped to our own record by display name, creating that record
/// the first time anyone saves the name. Saving something already saved reports
/// [`SaveOutcome::AlreadySaved`].
pub fn save_favorite(
    db: &Database,
    user_id: &str,
    mealdb_id: Option<&str>,
    recipe_name: &str,
) -> Result<SaveOutcome, FavoriteError> {
    let recipe_name = recipe_name.trim();
    if recipe_name.is_empty() {
        return Err(FavoriteError::Save(ValidationError::BlankRecipeName.into()));
    }
    let mealdb_id = mealdb_id.map(str::trim).filter(|id| !id.is_empty());
    let recipe = match InternalRecipe::find_by_name(db, recipe_name).map_err(FavoriteError::Save)? {
        Some(existing) => {
            tracing::debug!("Recipe {:?} found as {}", recipe_name, existing.recipe_id);
            if let (None, Some(mealdb_id)) = (&existing.mealdb_id, mealdb_id) {
                if let Err(e) = InternalRecipe::backfill_mealdb_id(db, existing.recipe_id, mealdb_id) {
                    tracing::warn!(
                        "Could not record catalog id {} on recipe {}: {:?}",
                        mealdb_id,
                        existing.recipe_id,
                        e
                    );
                }
            }
            existing
        }
        None => {
            let created = InternalRecipe::find_or_create(db, recipe_name, mealdb_id)
                .map_err(FavoriteError::Save)?;
            tracing::info!("Recipe {:?} recorded as {}", recipe_name, created.recipe_id);
            created
        }
    };

    let outcome = Favorite::link(db, user_id, recipe.recipe_id).map_err(FavoriteError::Save)?;
    match outcome {
        SaveOutcome::Saved => tracing::info!(
            "Favorite link created for user {} and recipe {}",
            user_id,
            recipe.recipe_id
        ),
        SaveOutcome::AlreadySaved => tracing::warn!(
            "Favorite link for user {} and recipe {} already exists",
            user_id,
            recipe.recipe_id
        ),
    }
    Ok(outcome)
}

/// State behind one user's favorites page: the list as shown, the last error message,
/// and the catalog details fetched so far.
#[derive(Default)]
pub struct FavoritesBoard {
    favorites: Mutex<Vec<FavoriteEntry>>,
    last_error: Mutex<Option<String>>,
    details: DetailCache,
}

impl FavoritesBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn details(&self) -> &DetailCache {
        &self.details
    }

    pub async fn favorites(&self) -> Vec<FavoriteEntry> {
        self.favorites.lock().await.clone()
    }

    pub async fn last_error(&self) -> Option<String> {
        self.last_error.lock().await.clone()
    }

    async fn set_error(&self, message: Option<String>) {
        *self.last_error.lock().await = message;
    }

    /// Reload the list from the store. On failure the list is cleared and the error kept.
    pub async fn load(
        &self,
        db: &Database,
        user_id: &str,
    ) -> Result<Vec<FavoriteEntry>, FavoriteError> {
        match Favorite::list_for_user(db, user_id) {
            Ok(list) => {
                *self.favorites.lock().await = list.clone();
                self.set_error(None).await;
                Ok(list)
            }
            Err(e) => {
                tracing::error!("Could not load favorites for {}: {:?}", user_id, e);
                self.favorites.lock().await.clear();
                let err = FavoriteError::Load(e);
                self.set_error(Some(err.to_string())).await;
                Err(err)
            }
        }
    }

    /// Remove a favorite, showing the removal before the store has confirmed it.
    ///
    /// If the store refuses, the list goes back to exactly what it was and the error is
    /// kept for display. If it succeeds, the cached details for that recipe are dropped.
    pub async fn remove_favorite(
        &self,
        db: &Database,
        user_id: &str,
        recipe_id: i64,
    ) -> Result<(), FavoriteError> {
        let pending = {
            let mut favorites = self.favorites.lock().await;
            Tentative::apply(&mut *favorites, |list| {
                list.retain(|f| f.recipe_id != recipe_id)
            })
        };

        match Favorite::unlink(db, user_id, recipe_id) {
            Ok(_) => {
                pending.confirm();
                tracing::info!("Favorite {} removed for user {}", recipe_id, user_id);
                self.details.evict(recipe_id);
                self.set_error(None).await;
                Ok(())
            }
            Err(e) => {
                tracing::error!("Error removing favorite {}: {:?}", recipe_id, e);
                pending.roll_back(&mut *self.favorites.lock().await);
                let err = FavoriteError::Remove(e);
                self.set_error(Some(err.to_string())).await;
                Err(err)
            }
        }
    }

    /// Fetch catalog details for `recipe_id` if needed, and return what the cache now holds.
    pub async fn detail(&self, catalog: &dyn Catalog, recipe_id: i64) -> Option<DetailCacheEntry> {
        let mealdb_id = self
            .favorites
            .lock()
            .await
            .iter()
            .find(|f| f.recipe_id == recipe_id)
            .map(|f| f.mealdb_id.clone())?;
        self.details
            .ensure(catalog, recipe_id, mealdb_id.as_deref())
            .await;
        self.details.get(recipe_id)
    }

    /// Warm the detail cache for the current list, one favorite at a time.
    pub async fn warm_all(&self, catalog: &dyn Catalog) -> usize {
        let favorites = self.favorites().await;
        self.details.warm_all(catalog, &favorites).await
    }
}
