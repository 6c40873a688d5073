//! Read-only client for the external recipe catalog.
//!
//! The catalog answers three questions: which ingredients exist, which recipes use a
//! given ingredient, and what a given recipe contains. Everything comes back wrapped in
//! `{"meals": [...]}`.

use std::time::Duration;

use async_trait::async_trait;
use itertools::Itertools;
use larder::basic_models::{CatalogIngredient, CatalogMeal, MealsEnvelope};
use larder::{RecipeDetail, RecipeSummary};
use serde::de::DeserializeOwned;
use tokio_retry::Retry;

use crate::config::CatalogConfig;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("No such recipe in the catalog")]
    NotFound,
    #[error("Network error: {0}")]
    Network(String),
    #[error("Unexpected catalog response: {0}")]
    Decode(String),
}

pub type CatalogResult<T> = Result<T, CatalogError>;

#[async_trait]
pub trait Catalog: Send + Sync {
    /// Every ingredient name the catalog knows, for autocomplete.
    async fn list_ingredient_names(&self) -> CatalogResult<Vec<String>>;

    /// Recipes using `ingredient`. The catalog only filters on one ingredient per call.
    async fn find_by_ingredient(&self, ingredient: &str) -> CatalogResult<Vec<RecipeSummary>>;

    /// The full record for one recipe.
    async fn get_detail(&self, external_id: &str) -> CatalogResult<RecipeDetail>;
}

/// Waits of up to 100ms, 200ms, 400ms and so on, capped at two seconds.
fn default_retry(retries: usize) -> impl Iterator<Item = Duration> {
    tokio_retry::strategy::ExponentialBackoff::from_millis(2)
        .factor(50)
        .max_delay(Duration::from_secs(2))
        .map(tokio_retry::strategy::jitter)
        .take(retries)
}

#[derive(Clone)]
pub struct MealDbClient {
    http: reqwest::Client,
    base_url: String,
    retries: usize,
}

impl MealDbClient {
    pub fn new(conf: &CatalogConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(conf.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url: conf.base_url.trim_end_matches('/').to_string(),
            retries: conf.retries,
        })
    }

    /// GET `{base}/{endpoint}?{key}={value}` and decode the envelope.
    ///
    /// Only transport failures are retried; a non-2xx answer is returned straight away.
    async fn get_meals<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        key: &str,
        value: &str,
    ) -> CatalogResult<Vec<T>> {
        let url = format!("{}/{}", self.base_url, endpoint);
        let response = Retry::spawn(default_retry(self.retries), || async {
            self.http
                .get(&url)
                .query(&[(key, value)])
                .send()
                .await
                .inspect_err(|e| tracing::debug!("Catalog request to {} failed: {}", url, e))
        })
        .await
        .map_err(|e| CatalogError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Network(format!("{url} answered {status}")));
        }
        let envelope: MealsEnvelope<T> = response
            .json()
            .await
            .map_err(|e| CatalogError::Decode(e.to_string()))?;
        Ok(envelope.into_vec())
    }
}

#[async_trait]
impl Catalog for MealDbClient {
    async fn list_ingredient_names(&self) -> CatalogResult<Vec<String>> {
        let rows: Vec<CatalogIngredient> = self.get_meals("list.php", "i", "list").await?;
        Ok(rows
            .into_iter()
            .filter_map(|row| row.name)
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .collect_vec())
    }

    async fn find_by_ingredient(&self, ingredient: &str) -> CatalogResult<Vec<RecipeSummary>> {
        self.get_meals("filter.php", "i", ingredient).await
    }

    async fn get_detail(&self, external_id: &str) -> CatalogResult<RecipeDetail> {
        let result = self
            .get_meals::<CatalogMeal>("lookup.php", "i", external_id)
            .await
            .and_then(|meals| {
                meals
                    .into_iter()
                    .next()
                    .map(CatalogMeal::into_detail)
                    .ok_or(CatalogError::NotFound)
            });
        if let Err(e) = &result {
            tracing::warn!("Failed to fetch details for recipe {}: {}", external_id, e);
        }
        result
    }
}
