use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// The catalog never numbers ingredient slots past this.
pub const MAX_INGREDIENT_SLOTS: usize = 20;

/// A search hit from the catalog's single-ingredient lookup.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct RecipeSummary {
    #[serde(rename = "idMeal")]
    pub external_id: String,
    #[serde(rename = "strMeal")]
    pub name: String,
    #[serde(rename = "strMealThumb", default)]
    pub thumbnail: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct IngredientLine {
    pub ingredient: String,
    pub measure: String,
}

/// The full catalog record for one recipe.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct RecipeDetail {
    pub external_id: String,
    pub name: String,
    pub category: Option<String>,
    pub area: Option<String>,
    pub instructions: Option<String>,
    pub thumbnail: Option<String>,
    /// At most [`MAX_INGREDIENT_SLOTS`] entries, in catalog order.
    pub ingredients: Vec<IngredientLine>,
}

impl RecipeDetail {
    /// Trimmed, lower-cased ingredient names, used for all comparisons.
    pub fn ingredient_keys(&self) -> impl Iterator<Item = String> + '_ {
        self.ingredients.iter().map(|line| fold_name(&line.ingredient))
    }

    /// Human readable "measure ingredient" lines for the detail view.
    pub fn ingredient_lines(&self) -> Vec<String> {
        self.ingredients
            .iter()
            .map(|line| {
                if line.measure.is_empty() {
                    line.ingredient.clone()
                } else {
                    format!("{} {}", line.measure, line.ingredient)
                }
            })
            .collect()
    }
}

/// Normalize a name for comparison: trimmed and case-folded.
pub fn fold_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// The catalog wraps every answer in `{"meals": [...]}`, with `null` for no results.
#[derive(Debug, Deserialize)]
pub struct MealsEnvelope<T> {
    pub meals: Option<Vec<T>>,
}

impl<T> MealsEnvelope<T> {
    pub fn into_vec(self) -> Vec<T> {
        self.meals.unwrap_or_default()
    }
}

/// One row of the catalog's ingredient listing.
#[derive(Debug, Deserialize)]
pub struct CatalogIngredient {
    #[serde(rename = "strIngredient")]
    pub name: Option<String>,
}

/// A recipe exactly as the catalog sends it: flat, with numbered ingredient slots.
#[derive(Debug, Deserialize)]
pub struct CatalogMeal {
    #[serde(rename = "idMeal")]
    pub id: String,
    #[serde(rename = "strMeal")]
    pub name: String,
    #[serde(rename = "strCategory", default)]
    pub category: Option<String>,
    #[serde(rename = "strArea", default)]
    pub area: Option<String>,
    #[serde(rename = "strInstructions", default)]
    pub instructions: Option<String>,
    #[serde(rename = "strMealThumb", default)]
    pub thumbnail: Option<String>,
    #[serde(flatten)]
    pub slots: HashMap<String, serde_json::Value>,
}

impl CatalogMeal {
    fn slot(&self, prefix: &str, index: usize) -> &str {
        match self.slots.get(&format!("{prefix}{index}")) {
            Some(serde_json::Value::String(s)) => s.trim(),
            _ => "",
        }
    }

    /// Collapse the numbered slots into an ordered ingredient list.
    ///
    /// The first blank ingredient slot ends the list, even if later slots are filled.
    pub fn into_detail(self) -> RecipeDetail {
        let mut ingredients = vec![];
        for index in 1..=MAX_INGREDIENT_SLOTS {
            let ingredient = self.slot("strIngredient", index);
            if ingredient.is_empty() {
                break;
            }
            ingredients.push(IngredientLine {
                ingredient: ingredient.to_string(),
                measure: self.slot("strMeasure", index).to_string(),
            });
        }
        RecipeDetail {
            external_id: self.id,
            name: self.name,
            category: self.category.filter(|s| !s.trim().is_empty()),
            area: self.area.filter(|s| !s.trim().is_empty()),
            instructions: self.instructions.filter(|s| !s.trim().is_empty()),
            thumbnail: self.thumbnail.filter(|s| !s.trim().is_empty()),
            ingredients,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn meal(value: serde_json::Value) -> RecipeDetail {
        serde_json::from_value::<CatalogMeal>(value)
            .unwrap()
            .into_detail()
    }

    #[test]
    fn first_blank_slot_ends_the_list() {
        let detail = meal(json!({
            "idMeal": "52772",
            "strMeal": "Teriyaki Chicken Casserole",
            "strCategory": "Chicken",
            "strArea": "Japanese",
            "strInstructions": "Preheat oven to 350.",
            "strMealThumb": "https://example.test/t.jpg",
            "strIngredient1": "soy sauce",
            "strMeasure1": "3/4 cup",
            "strIngredient2": " Chicken Breasts ",
            "strMeasure2": "2",
            "strIngredient3": "",
            "strMeasure3": "",
            "strIngredient4": "garlic",
            "strMeasure4": "1 clove",
            "strIngredient5": null
        }));
        assert_eq!(detail.external_id, "52772");
        assert_eq!(detail.area.as_deref(), Some("Japanese"));
        assert_eq!(detail.ingredients.len(), 2);
        assert_eq!(detail.ingredients[1].ingredient, "Chicken Breasts");
        assert_eq!(
            detail.ingredient_keys().collect::<Vec<_>>(),
            vec!["soy sauce", "chicken breasts"]
        );
    }

    #[test]
    fn never_reads_past_twenty_slots() {
        let mut value = json!({"idMeal": "1", "strMeal": "Everything"});
        for i in 1..=25 {
            value[format!("strIngredient{i}")] = json!(format!("thing {i}"));
        }
        assert_eq!(meal(value).ingredients.len(), MAX_INGREDIENT_SLOTS);
    }

    #[test]
    fn ingredient_lines_skip_blank_measures() {
        let detail = meal(json!({
            "idMeal": "2",
            "strMeal": "Toast",
            "strIngredient1": "Bread",
            "strMeasure1": "2 slices",
            "strIngredient2": "Butter",
            "strMeasure2": " "
        }));
        assert_eq!(detail.ingredient_lines(), vec!["2 slices Bread", "Butter"]);
    }

    #[test]
    fn null_meals_is_empty() {
        let envelope: MealsEnvelope<RecipeSummary> =
            serde_json::from_str(r#"{"meals": null}"#).unwrap();
        assert!(envelope.into_vec().is_empty());
    }
}
