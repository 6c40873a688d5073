use std::collections::HashSet;

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

use crate::basic_models::fold_name;

/// Autocomplete stays quiet until this many characters have been typed.
pub const MIN_SUGGEST_CHARS: usize = 2;
pub const MAX_SUGGESTIONS: usize = 10;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please select at least one ingredient to include.")]
    NoIncludedIngredient,
    #[error("Recipe name must not be blank.")]
    BlankRecipeName,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, IntoStaticStr, Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Mode {
    Include,
    Exclude,
}

impl Mode {
    pub fn flipped(self) -> Self {
        match self {
            Mode::Include => Mode::Exclude,
            Mode::Exclude => Mode::Include,
        }
    }
}

/// An ingredient the user wants required or forbidden.
///
/// `name` keeps the case it was picked with; comparisons go through [`fold_name`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientCriterion {
    pub name: String,
    pub mode: Mode,
}

impl IngredientCriterion {
    pub fn key(&self) -> String {
        fold_name(&self.name)
    }
}

/// The user's chosen ingredients plus the "only these ingredients" flag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientSelector {
    criteria: Vec<IngredientCriterion>,
    strict: bool,
}

impl IngredientSelector {
    pub fn new() -> Self {
        Self::default()
    }

    fn position(&self, name: &str) -> Option<usize> {
        let key = fold_name(name);
        self.criteria.iter().position(|c| c.key() == key)
    }

    /// Add `name` as an included ingredient. Returns false if it was already selected,
    /// in any case, or is blank.
    pub fn select(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() || self.position(name).is_some() {
            return false;
        }
        self.criteria.push(IngredientCriterion {
            name: name.to_string(),
            mode: Mode::Include,
        });
        true
    }

    /// Flip include/exclude for `name`. Returns the new mode, if it was selected.
    pub fn toggle_mode(&mut self, name: &str) -> Option<Mode> {
        let index = self.position(name)?;
        let criterion = &mut self.criteria[index];
        criterion.mode = criterion.mode.flipped();
        Some(criterion.mode)
    }

    pub fn remove(&mut self, name: &str) -> bool {
        match self.position(name) {
            Some(index) => {
                self.criteria.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn set_strict_mode(&mut self, strict: bool) {
        self.strict = strict;
    }

    pub fn strict(&self) -> bool {
        self.strict
    }

    pub fn criteria(&self) -> &[IngredientCriterion] {
        &self.criteria
    }

    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Rebuild a selection from a list, as if each entry had been picked and toggled by hand.
    pub fn from_criteria(criteria: &[IngredientCriterion], strict: bool) -> Self {
        let mut selector = Self::new();
        for criterion in criteria {
            if selector.select(&criterion.name) && criterion.mode == Mode::Exclude {
                selector.toggle_mode(&criterion.name);
            }
        }
        selector.set_strict_mode(strict);
        selector
    }

    /// Freeze the selection into something the filter can run.
    pub fn search_criteria(&self) -> Result<SearchCriteria, ValidationError> {
        let names = |mode: Mode| {
            self.criteria
                .iter()
                .filter(move |c| c.mode == mode)
                .map(|c| c.name.clone())
        };
        SearchCriteria::new(names(Mode::Include), names(Mode::Exclude), self.strict)
    }
}

/// Case-folded include/exclude sets plus the strict flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchCriteria {
    /// In selection order; the first one seeds the catalog lookup.
    include: Vec<String>,
    include_set: HashSet<String>,
    exclude: HashSet<String>,
    strict: bool,
}

impl SearchCriteria {
    pub fn new<I, E>(include: I, exclude: E, strict: bool) -> Result<Self, ValidationError>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
        E: IntoIterator,
        E::Item: AsRef<str>,
    {
        let include = include
            .into_iter()
            .map(|name| fold_name(name.as_ref()))
            .filter(|name| !name.is_empty())
            .unique()
            .collect_vec();
        if include.is_empty() {
            return Err(ValidationError::NoIncludedIngredient);
        }
        let exclude = exclude
            .into_iter()
            .map(|name| fold_name(name.as_ref()))
            .filter(|name| !name.is_empty())
            .collect();
        Ok(Self {
            include_set: include.iter().cloned().collect(),
            include,
            exclude,
            strict,
        })
    }

    /// The ingredient sent to the catalog, which can only filter on one at a time.
    pub fn primary_ingredient(&self) -> &str {
        &self.include[0]
    }

    pub fn include(&self) -> &HashSet<String> {
        &self.include_set
    }

    pub fn exclude(&self) -> &HashSet<String> {
        &self.exclude
    }

    pub fn strict(&self) -> bool {
        self.strict
    }
}

/// Autocomplete: case-insensitive substring match over the known ingredient names.
pub fn suggest<'a>(known: &'a [String], typed: &str) -> Vec<&'a str> {
    if typed.chars().count() < MIN_SUGGEST_CHARS {
        return vec![];
    }
    let needle = typed.to_lowercase();
    known
        .iter()
        .filter(|name| name.to_lowercase().contains(&needle))
        .map(String::as_str)
        .take(MAX_SUGGESTIONS)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_is_case_insensitive_and_idempotent() {
        let mut selector = IngredientSelector::new();
        assert!(selector.select("Chicken"));
        assert!(!selector.select("  chicken "));
        assert!(!selector.select("CHICKEN"));
        assert_eq!(selector.criteria().len(), 1);
        assert_eq!(selector.criteria()[0].name, "Chicken");
        assert_eq!(selector.criteria()[0].mode, Mode::Include);
    }

    #[test]
    fn blank_names_are_ignored() {
        let mut selector = IngredientSelector::new();
        assert!(!selector.select("   "));
        assert!(selector.is_empty());
    }

    #[test]
    fn toggle_twice_restores_mode() {
        let mut selector = IngredientSelector::new();
        selector.select("Lemon");
        assert_eq!(selector.toggle_mode("lemon"), Some(Mode::Exclude));
        assert_eq!(selector.toggle_mode("LEMON"), Some(Mode::Include));
        assert_eq!(selector.toggle_mode("lime"), None);
    }

    #[test]
    fn remove_deletes_only_the_match() {
        let mut selector = IngredientSelector::new();
        selector.select("Chicken");
        selector.select("Rice");
        assert!(selector.remove("chicken"));
        assert!(!selector.remove("chicken"));
        assert_eq!(selector.criteria().len(), 1);
        assert_eq!(selector.criteria()[0].name, "Rice");
    }

    #[test]
    fn criteria_need_an_included_ingredient() {
        let mut selector = IngredientSelector::new();
        assert_eq!(
            selector.search_criteria(),
            Err(ValidationError::NoIncludedIngredient)
        );
        selector.select("Lemon");
        selector.toggle_mode("Lemon");
        assert_eq!(
            selector.search_criteria(),
            Err(ValidationError::NoIncludedIngredient)
        );
    }

    #[test]
    fn first_include_seeds_the_lookup() {
        let mut selector = IngredientSelector::new();
        selector.select("Lemon");
        selector.toggle_mode("Lemon");
        selector.select(" Chicken ");
        selector.select("Rice");
        selector.set_strict_mode(true);
        let criteria = selector.search_criteria().unwrap();
        assert_eq!(criteria.primary_ingredient(), "chicken");
        assert!(criteria.exclude().contains("lemon"));
        assert!(criteria.include().contains("rice"));
        assert!(criteria.strict());
    }

    #[test]
    fn from_criteria_applies_selection_rules() {
        let selector = IngredientSelector::from_criteria(
            &[
                IngredientCriterion {
                    name: "Chicken".into(),
                    mode: Mode::Include,
                },
                IngredientCriterion {
                    name: "chicken".into(),
                    mode: Mode::Exclude,
                },
                IngredientCriterion {
                    name: "Lemon".into(),
                    mode: Mode::Exclude,
                },
            ],
            false,
        );
        assert_eq!(selector.criteria().len(), 2);
        assert_eq!(selector.criteria()[0].mode, Mode::Include);
        assert_eq!(selector.criteria()[1].mode, Mode::Exclude);
    }

    #[test]
    fn mode_parses_from_text() {
        assert_eq!("Exclude".parse::<Mode>().unwrap(), Mode::Exclude);
        assert_eq!(Mode::Include.to_string(), "include");
    }

    #[test]
    fn suggestions_need_two_characters_and_cap_at_ten() {
        let known = (0..30).map(|i| format!("Green Bean {i}")).collect_vec();
        assert!(suggest(&known, "g").is_empty());
        assert_eq!(suggest(&known, "gR").len(), MAX_SUGGESTIONS);
        let matches = suggest(&known, "bean 2");
        assert_eq!(matches.len(), MAX_SUGGESTIONS);
        assert_eq!(matches[0], "Green Bean 2");
        assert_eq!(matches[9], "Green Bean 28");
        assert!(suggest(&known, "potato").is_empty());
    }
}
