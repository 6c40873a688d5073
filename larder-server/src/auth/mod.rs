//! Sign-in, sign-up and sign-out are handled by a hosted identity service.
//! We only keep a server-side session per signed-in browser.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::AuthConfig;
use crate::errors::WebError;

pub mod route;
pub mod session;

pub type AuthResult<X> = Result<X, AuthError>;

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(thiserror::Error, Debug)]
pub enum AuthError {
    #[error("Password must be at least {MIN_PASSWORD_LEN} characters long.")]
    WeakPassword,
    #[error("{0}")]
    Rejected(String),
    #[error("Identity provider request error: {0}")]
    Provider(#[from] reqwest::Error),
}

impl From<AuthError> for WebError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::WeakPassword => WebError::Auth(e.to_string()),
            AuthError::Rejected(msg) => WebError::Auth(msg),
            AuthError::Provider(e) => WebError::Internal(e.into()),
        }
    }
}

/// Who the identity service says the user is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: String,
    pub email: String,
    pub access_token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignUpOutcome {
    pub user_id: String,
    pub email: String,
    /// The account exists but the user must confirm their email before signing in.
    pub confirmation_required: bool,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> AuthResult<Identity>;
    async fn sign_up(&self, email: &str, password: &str) -> AuthResult<SignUpOutcome>;
    async fn sign_out(&self, access_token: &str) -> AuthResult<()>;
}

/// Client for a GoTrue-style identity service (`/auth/v1/...`).
#[derive(Clone)]
pub struct GoTrueClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct ProviderUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    user: ProviderUser,
}

/// Sign-up answers with a session when confirmation is off, or a bare user when it is on.
#[derive(Debug, Deserialize)]
struct SignUpResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    user: Option<ProviderUser>,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    email: Option<String>,
}

/// Error bodies differ between service versions, so take whichever message is present.
#[derive(Debug, Default, Deserialize)]
struct ProviderErrorBody {
    error_description: Option<String>,
    msg: Option<String>,
    message: Option<String>,
    error: Option<String>,
}

impl GoTrueClient {
    pub fn new_from_config(conf: &AuthConfig) -> anyhow::Result<Self> {
        Ok(Self {
            http: reqwest::Client::builder().build()?,
            base_url: format!("{}/auth/v1", conf.provider_url.trim_end_matches('/')),
            api_key: conf.api_key.clone(),
        })
    }

    async fn rejection(response: reqwest::Response) -> AuthError {
        let status = response.status();
        let body: ProviderErrorBody = response.json().await.unwrap_or_default();
        let message = body
            .error_description
            .or(body.msg)
            .or(body.message)
            .or(body.error)
            .unwrap_or_else(|| format!("Identity provider answered {status}"));
        AuthError::Rejected(message)
    }
}

#[async_trait]
impl IdentityProvider for GoTrueClient {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> AuthResult<Identity> {
        let response = self
            .http
            .post(format!("{}/token", self.base_url))
            .query(&[("grant_type", "password")])
            .header("apikey", &self.api_key)
            .json(&Credentials { email, password })
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }
        let tokens: TokenResponse = response.json().await?;
        Ok(Identity {
            user_id: tokens.user.id,
            email: tokens.user.email.unwrap_or_else(|| email.to_string()),
            access_token: tokens.access_token,
        })
    }

    async fn sign_up(&self, email: &str, password: &str) -> AuthResult<SignUpOutcome> {
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::WeakPassword);
        }
        let response = self
            .http
            .post(format!("{}/signup", self.base_url))
            .header("apikey", &self.api_key)
            .json(&Credentials { email, password })
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }
        let body: SignUpResponse = response.json().await?;
        let confirmation_required = body.access_token.is_none();
        let (user_id, user_email) = match body.user {
            Some(user) => (Some(user.id), user.email),
            None => (body.id, body.email),
        };
        let user_id = user_id.ok_or(AuthError::Rejected(
            "Identity provider did not return a user".into(),
        ))?;
        Ok(SignUpOutcome {
            user_id,
            email: user_email.unwrap_or_else(|| email.to_string()),
            confirmation_required,
        })
    }

    async fn sign_out(&self, access_token: &str) -> AuthResult<()> {
        let response = self
            .http
            .post(format!("{}/logout", self.base_url))
            .header("apikey", &self.api_key)
            .bearer_auth(access_token)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }
        Ok(())
    }
}
