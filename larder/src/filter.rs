//! Decides which detailed recipes satisfy the user's ingredient criteria.
//!
//! All comparisons use trimmed, case-folded ingredient names. A recipe is kept when:
//! - none of its ingredients are excluded,
//! - every included ingredient is present,
//! - and, in strict mode, it uses nothing outside the included set.

use std::collections::HashSet;

use crate::basic_models::RecipeDetail;
use crate::criteria::SearchCriteria;

/// Why a recipe was turned down. Useful for logging; the filter itself only needs a yes/no.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    Excluded(String),
    Missing(String),
    Extra(String),
}

pub fn check(recipe: &RecipeDetail, criteria: &SearchCriteria) -> Result<(), Rejection> {
    let ingredients: HashSet<String> = recipe.ingredient_keys().collect();

    if let Some(name) = criteria.exclude().iter().find(|e| ingredients.contains(*e)) {
        return Err(Rejection::Excluded(name.clone()));
    }
    if let Some(name) = criteria.include().iter().find(|i| !ingredients.contains(*i)) {
        return Err(Rejection::Missing(name.clone()));
    }
    if criteria.strict() {
        // No allowance for staples like salt or water.
        if let Some(name) = ingredients.iter().find(|i| !criteria.include().contains(*i)) {
            return Err(Rejection::Extra(name.clone()));
        }
    }
    Ok(())
}

pub fn accepts(recipe: &RecipeDetail, criteria: &SearchCriteria) -> bool {
    check(recipe, criteria).is_ok()
}

/// Keep the recipes that pass, in their original order.
pub fn filter_recipes(candidates: Vec<RecipeDetail>, criteria: &SearchCriteria) -> Vec<RecipeDetail> {
    candidates
        .into_iter()
        .filter(|recipe| match check(recipe, criteria) {
            Ok(()) => true,
            Err(reason) => {
                tracing::debug!("Dropping {} ({}): {:?}", recipe.name, recipe.external_id, reason);
                false
            }
        })
        .collect()
}
