use larder::RecipeDetail;
use quick_cache::sync::Cache;
use quick_cache::Weighter;
use std::sync::Arc;

use crate::catalog::{Catalog, CatalogError, CatalogResult};

/// Server-wide cache of catalog answers that are the same for every user.
pub type CatalogCache = Arc<Cache<CacheQuery, CacheValue, ValueWeighter>>;

pub fn new_cache() -> CatalogCache {
    Arc::new(Cache::with_weighter(1_000, 20 << 20, ValueWeighter))
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheQuery {
    IngredientNames,
    Detail { external_id: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheValue {
    IngredientNames { names: Arc<Vec<String>> },
    Detail { detail: Arc<RecipeDetail> },
}

#[derive(Clone)]
pub struct ValueWeighter;

impl Weighter<CacheQuery, CacheValue> for ValueWeighter {
    fn weight(&self, _key: &CacheQuery, val: &CacheValue) -> u64 {
        match val {
            CacheValue::IngredientNames { names } => {
                names.iter().map(|n| n.len() as u64 + 24).sum::<u64>().max(1)
            }
            CacheValue::Detail { detail } => {
                let text = detail.name.len()
                    + detail.instructions.as_ref().map_or(0, String::len)
                    + detail
                        .ingredients
                        .iter()
                        .map(|i| i.ingredient.len() + i.measure.len())
                        .sum::<usize>();
                text as u64 + 256
            }
        }
    }
}

fn wrong_kind(value: &CacheValue) -> CatalogError {
    tracing::error!("Catalog cache held an unexpected value: {:?}", value);
    CatalogError::Decode("cache held the wrong value kind".into())
}

/// The catalog's ingredient list, fetched once. Failures are not cached.
pub async fn ingredient_names(
    cache: &CatalogCache,
    catalog: &dyn Catalog,
) -> CatalogResult<Arc<Vec<String>>> {
    match cache
        .get_value_or_guard_async(&CacheQuery::IngredientNames)
        .await
    {
        Ok(CacheValue::IngredientNames { names }) => Ok(names),
        Ok(other) => Err(wrong_kind(&other)),
        Err(guard) => {
            tracing::info!("Loading ingredient names from the catalog");
            let names = Arc::new(catalog.list_ingredient_names().await?);
            guard
                .insert(CacheValue::IngredientNames {
                    names: names.clone(),
                })
                .unwrap_or_default();
            Ok(names)
        }
    }
}

/// One recipe's catalog record, for the detail view.
pub async fn recipe_detail(
    cache: &CatalogCache,
    catalog: &dyn Catalog,
    external_id: &str,
) -> CatalogResult<Arc<RecipeDetail>> {
    let query = CacheQuery::Detail {
        external_id: external_id.to_string(),
    };
    match cache.get_value_or_guard_async(&query).await {
        Ok(CacheValue::Detail { detail }) => Ok(detail),
        Ok(other) => Err(wrong_kind(&other)),
        Err(guard) => {
            let detail = Arc::new(catalog.get_detail(external_id).await?);
            guard
                .insert(CacheValue::Detail {
                    detail: detail.clone(),
                })
                .unwrap_or_default();
            Ok(detail)
        }
    }
}
