use futures::future::join_all;
use larder::filter::filter_recipes;
use larder::{RecipeDetail, SearchCriteria, ValidationError};

use crate::catalog::{Catalog, CatalogError};

pub mod board;

pub use board::{SearchBoard, SearchOutcome};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Failed to process recipes. {0}")]
    Catalog(#[from] CatalogError),
}

/// Find catalog recipes matching `criteria`.
///
/// The catalog can only narrow by one ingredient, so we ask it for the first included
/// ingredient, fetch every hit's full record at once, and filter those ourselves.
/// A hit whose record can't be fetched is dropped rather than failing the search.
pub async fn run_search(
    catalog: &dyn Catalog,
    criteria: &SearchCriteria,
) -> Result<Vec<RecipeDetail>, SearchError> {
    let primary = criteria.primary_ingredient();
    let summaries = catalog.find_by_ingredient(primary).await?;
    tracing::info!(
        "Catalog returned {} recipes with {:?}",
        summaries.len(),
        primary
    );
    if summaries.is_empty() {
        return Ok(vec![]);
    }

    let lookups = summaries
        .iter()
        .map(|summary| catalog.get_detail(&summary.external_id));
    let details = join_all(lookups)
        .await
        .into_iter()
        .filter_map(Result::ok)
        .collect::<Vec<_>>();
    let dropped = summaries.len() - details.len();
    if dropped > 0 {
        tracing::warn!("Dropped {} recipes whose details could not be fetched", dropped);
    }

    let matches = filter_recipes(details, criteria);
    tracing::info!("{} recipes match", matches.len());
    Ok(matches)
}
