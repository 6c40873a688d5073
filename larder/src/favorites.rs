use serde::{Deserialize, Serialize};

/// A saved recipe as the favorites page sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoriteEntry {
    /// Internal recipe id, shared by everyone who saved a recipe with this name.
    pub recipe_id: i64,
    pub recipe_name: String,
    /// Catalog id, if we know it. Old records may predate it.
    pub mealdb_id: Option<String>,
}

/// What came of a save request, from the store's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveOutcome {
    Saved,
    AlreadySaved,
}

/// The save button of one recipe card, for one user.
///
/// `Idle -> Saving -> {Saved | AlreadySaved | Error}`. Saved and AlreadySaved are final,
/// Error can be retried.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum SaveStatus {
    #[default]
    Idle,
    Saving,
    Saved,
    AlreadySaved,
    Error(String),
}

impl SaveStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SaveStatus::Saved | SaveStatus::AlreadySaved)
    }

    pub fn can_save(&self) -> bool {
        matches!(self, SaveStatus::Idle | SaveStatus::Error(_))
    }

    /// Move into `Saving`. Returns false, changing nothing, if a save is running or done.
    pub fn begin(&mut self) -> bool {
        if self.can_save() {
            *self = SaveStatus::Saving;
            true
        } else {
            false
        }
    }

    pub fn finish<E: std::fmt::Display>(&mut self, result: Result<SaveOutcome, E>) {
        *self = match result {
            Ok(SaveOutcome::Saved) => SaveStatus::Saved,
            Ok(SaveOutcome::AlreadySaved) => SaveStatus::AlreadySaved,
            Err(e) => SaveStatus::Error(e.to_string()),
        };
    }
}

/// A change that has been shown to the user but not yet confirmed by the store.
///
/// Holds the state from before the change until the store answers, so it can be put back.
#[must_use = "a tentative change must be confirmed or rolled back"]
#[derive(Debug)]
pub struct Tentative<T> {
    snapshot: T,
}

/// How a tentative change ended.
#[derive(Debug, PartialEq, Eq)]
pub enum Settled<T> {
    Confirmed,
    RolledBack(T),
}

impl<T: Clone> Tentative<T> {
    /// Snapshot `state`, then apply `change` to it in place.
    pub fn apply(state: &mut T, change: impl FnOnce(&mut T)) -> Self {
        let snapshot = state.clone();
        change(state);
        Self { snapshot }
    }
}

impl<T> Tentative<T> {
    pub fn confirm(self) -> Settled<T> {
        Settled::Confirmed
    }

    /// Put the snapshot back into `state`, exactly as it was before the change.
    pub fn roll_back(self, state: &mut T) -> Settled<T>
    where
        T: Clone,
    {
        *state = self.snapshot.clone();
        Settled::RolledBack(self.snapshot)
    }
}
