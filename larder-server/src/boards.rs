use std::sync::Arc;

use dashmap::DashMap;

use crate::favorites::FavoritesBoard;
use crate::search::SearchBoard;

/// Everything one signed-in user is looking at.
#[derive(Default)]
pub struct UserBoards {
    pub search: SearchBoard,
    pub favorites: FavoritesBoard,
}

/// Per-user boards, created on first use and dropped at sign-out.
#[derive(Clone, Default)]
pub struct Boards {
    by_user: Arc<DashMap<String, Arc<UserBoards>>>,
}

impl Boards {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_user(&self, user_id: &str) -> Arc<UserBoards> {
        self.by_user
            .entry(user_id.to_string())
            .or_default()
            .value()
            .clone()
    }

    pub fn drop_user(&self, user_id: &str) {
        if self.by_user.remove(user_id).is_some() {
            tracing::debug!("Dropped boards for user {}", user_id);
        }
    }

    pub fn len(&self) -> usize {
        self.by_user.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_user.is_empty()
    }
}
