use axum::extract::FromRef;
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::CookieJar;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::config::AuthConfig;
use crate::errors::WebError;

use super::Identity;

pub type SessionID = String;

pub const SESSION_COOKIE: &str = "larder_session";

/// Information about the connected user, and proof that they are authenticated.
/// Use this as a request guard to get the user's session.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UserSession {
    pub id: SessionID,
    pub user_id: String,
    pub email: String,
    pub access_token: String,
}

#[derive(Serialize, Deserialize, Default)]
pub struct Sessions {
    pub sessions: DashMap<SessionID, UserSession>,
}

impl Sessions {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub async fn from_config(conf: &AuthConfig) -> Arc<Self> {
        // Copy this path to avoid borrowing issues
        let path = conf.session_storage_path.clone();
        // Read sessions from the file
        let session_text = tokio::fs::read_to_string(&path).await.unwrap_or_default();
        let sessions: Self = serde_json::from_str(&session_text).unwrap_or_default();
        tracing::info!("Restored {} sessions", sessions.sessions.len());

        let sessions_ref = Arc::new(sessions);

        // Start a task to save the sessions to disk every 5 minutes
        let sessions_ref2 = sessions_ref.clone();
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(Duration::from_secs(300)).await;
                if let Err(e) = sessions_ref2.save(&path).await {
                    tracing::error!("Failed to save sessions to {}: {:?}", path, e);
                }
            }
        });

        sessions_ref
    }

    pub async fn save(&self, path: &str) -> anyhow::Result<()> {
        let sessions_text = serde_json::to_string(self)?;
        tokio::fs::write(path, sessions_text).await?;
        Ok(())
    }

    /// Start a session for a freshly signed-in user.
    pub fn create(&self, identity: Identity) -> UserSession {
        let id = hex::encode(rand::random::<[u8; 32]>());
        let session = UserSession {
            id: id.clone(),
            user_id: identity.user_id,
            email: identity.email,
            access_token: identity.access_token,
        };
        self.sessions.insert(id, session.clone());
        session
    }

    pub fn get(&self, id: &str) -> Option<UserSession> {
        self.sessions.get(id).map(|s| s.value().clone())
    }

    pub fn remove(&self, id: &str) -> Option<UserSession> {
        self.sessions.remove(id).map(|(_, session)| session)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for UserSession
where
    Arc<Sessions>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = WebError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let jar = match CookieJar::from_request_parts(parts, state).await {
            Ok(jar) => jar,
            Err(never) => match never {},
        };
        let session_id = jar.get(SESSION_COOKIE).ok_or(WebError::SignInRequired)?;
        Arc::<Sessions>::from_ref(state)
            .get(session_id.value())
            .ok_or(WebError::SignInRequired)
    }
}
