use std::sync::Arc;

use axum::extract::FromRef;

use crate::auth::session::Sessions;
use crate::auth::IdentityProvider;
use crate::boards::Boards;
use crate::cache::CatalogCache;
use crate::catalog::Catalog;
use crate::database::Database;

#[derive(Clone)]
pub struct AllStates {
    pub db: Database,
    pub catalog: Arc<dyn Catalog>,
    pub cache: CatalogCache,
    pub identity: Arc<dyn IdentityProvider>,
    pub sessions: Arc<Sessions>,
    pub boards: Boards,
}

impl FromRef<AllStates> for Arc<Sessions> {
    fn from_ref(state: &AllStates) -> Self {
        state.sessions.clone()
    }
}
