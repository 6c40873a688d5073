pub mod basic_models;
pub mod criteria;
pub mod favorites;
pub mod filter;

pub use basic_models::{RecipeDetail, RecipeSummary};
pub use criteria::{IngredientCriterion, IngredientSelector, Mode, SearchCriteria, ValidationError};
pub use favorites::{FavoriteEntry, SaveOutcome, SaveStatus};
