#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use larder::basic_models::{fold_name, IngredientLine};
use larder::{RecipeDetail, RecipeSummary};
use larder_server::catalog::{Catalog, CatalogError, CatalogResult};

/// A catalog with canned answers that records the order of every request.
#[derive(Default)]
pub struct ScriptedCatalog {
    ingredients: Vec<String>,
    by_ingredient: HashMap<String, Vec<RecipeSummary>>,
    details: HashMap<String, RecipeDetail>,
    failing: HashSet<String>,
    search_failure: Option<CatalogError>,
    delays: HashMap<String, Duration>,
    events: Mutex<Vec<String>>,
}

pub fn recipe(external_id: &str, name: &str, ingredients: &[&str]) -> RecipeDetail {
    RecipeDetail {
        external_id: external_id.to_string(),
        name: name.to_string(),
        category: Some("Main".into()),
        area: None,
        instructions: Some("Cook it.".into()),
        thumbnail: None,
        ingredients: ingredients
            .iter()
            .map(|i| IngredientLine {
                ingredient: i.to_string(),
                measure: "1 cup".into(),
            })
            .collect(),
    }
}

impl ScriptedCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ingredients(mut self, names: &[&str]) -> Self {
        self.ingredients = names.iter().map(|n| n.to_string()).collect();
        self
    }

    /// Add a recipe, findable by each of its ingredients.
    pub fn with_recipe(mut self, external_id: &str, name: &str, ingredients: &[&str]) -> Self {
        let detail = recipe(external_id, name, ingredients);
        for ingredient in ingredients {
            self.by_ingredient
                .entry(fold_name(ingredient))
                .or_default()
                .push(RecipeSummary {
                    external_id: external_id.to_string(),
                    name: name.to_string(),
                    thumbnail: None,
                });
        }
        self.details.insert(external_id.to_string(), detail);
        self
    }

    /// Listed by ingredient search, but its lookup fails.
    pub fn with_broken_detail(mut self, external_id: &str) -> Self {
        self.failing.insert(external_id.to_string());
        self
    }

    pub fn with_search_failure(mut self, error: CatalogError) -> Self {
        self.search_failure = Some(error);
        self
    }

    /// Slow down lookups of a recipe id, or searches for an ingredient.
    pub fn with_delay(mut self, key: &str, millis: u64) -> Self {
        self.delays
            .insert(key.to_string(), Duration::from_millis(millis));
        self
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    fn record(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }

    async fn pause(&self, key: &str) {
        if let Some(delay) = self.delays.get(key) {
            tokio::time::sleep(*delay).await;
        }
    }
}

#[async_trait]
impl Catalog for ScriptedCatalog {
    async fn list_ingredient_names(&self) -> CatalogResult<Vec<String>> {
        self.record("list".into());
        Ok(self.ingredients.clone())
    }

    async fn find_by_ingredient(&self, ingredient: &str) -> CatalogResult<Vec<RecipeSummary>> {
        let key = fold_name(ingredient);
        self.record(format!("find:{key}"));
        self.pause(&key).await;
        if let Some(error) = &self.search_failure {
            return Err(error.clone());
        }
        Ok(self.by_ingredient.get(&key).cloned().unwrap_or_default())
    }

    async fn get_detail(&self, external_id: &str) -> CatalogResult<RecipeDetail> {
        self.record(format!("start:{external_id}"));
        self.pause(external_id).await;
        self.record(format!("end:{external_id}"));
        if self.failing.contains(external_id) {
            return Err(CatalogError::Network("connection reset".into()));
        }
        self.details
            .get(external_id)
            .cloned()
            .ok_or(CatalogError::NotFound)
    }
}
