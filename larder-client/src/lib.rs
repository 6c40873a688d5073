use anyhow::{ensure, Context, Result};
use larder::{FavoriteEntry, IngredientSelector, RecipeDetail, SaveStatus};
use serde::Deserialize;
use serde_json::{json, Value};

pub const DEFAULT_SERVER: &str = "http://localhost:3000";

/// Build a selection the same way the web page would, one pick at a time.
///
/// A name given both as include and exclude stays included, since it was picked first.
pub fn selection_from_flags(include: &[String], exclude: &[String], only: bool) -> IngredientSelector {
    let mut selector = IngredientSelector::new();
    for name in include {
        selector.select(name);
    }
    for name in exclude {
        if selector.select(name) {
            selector.toggle_mode(name);
        }
    }
    selector.set_strict_mode(only);
    selector
}

#[derive(Debug, Deserialize)]
pub struct SessionInfo {
    pub user_id: String,
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    pub outcome: String,
    pub generation: u64,
    #[serde(default)]
    pub recipes: Vec<RecipeDetail>,
}

#[derive(Debug, Deserialize)]
pub struct FavoritesResponse {
    pub favorites: Vec<FavoriteEntry>,
    pub error: Option<String>,
}

/// A signed-in conversation with a larder server. The session lives in the cookie store.
pub struct ServerClient {
    http: reqwest::Client,
    base: String,
}

impl ServerClient {
    pub fn new(server: &str) -> Result<Self> {
        Ok(Self {
            http: reqwest::Client::builder().cookie_store(true).build()?,
            base: server.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, route: &str) -> String {
        format!("{}{}", self.base, route)
    }

    async fn checked(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        anyhow::bail!("Server answered {status}: {body}")
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<SessionInfo> {
        let response = self
            .http
            .post(self.url("/auth/login"))
            .json(&json!({"email": email, "password": password}))
            .send()
            .await?;
        Ok(Self::checked(response).await?.json().await?)
    }

    /// Sign in with `LARDER_EMAIL` and `LARDER_PASSWORD`.
    pub async fn sign_in_from_env(&self) -> Result<SessionInfo> {
        let email = dotenvy::var("LARDER_EMAIL").context("LARDER_EMAIL is not set")?;
        let password = dotenvy::var("LARDER_PASSWORD").context("LARDER_PASSWORD is not set")?;
        self.sign_in(&email, &password).await
    }

    pub async fn session(&self) -> Result<SessionInfo> {
        let response = self.http.get(self.url("/api/session")).send().await?;
        Ok(Self::checked(response).await?.json().await?)
    }

    pub async fn search(&self, selector: &IngredientSelector) -> Result<SearchResponse> {
        ensure!(
            selector.search_criteria().is_ok(),
            "Please select at least one ingredient to include."
        );
        let response = self
            .http
            .post(self.url("/api/search"))
            .json(&json!({
                "criteria": selector.criteria(),
                "strict": selector.strict(),
            }))
            .send()
            .await?;
        Ok(Self::checked(response).await?.json().await?)
    }

    pub async fn save(&self, recipe: &RecipeDetail) -> Result<SaveStatus> {
        let response = self
            .http
            .post(self.url("/api/favorites"))
            .json(&json!({"mealdb_id": recipe.external_id, "recipe_name": recipe.name}))
            .send()
            .await?;
        Ok(Self::checked(response).await?.json().await?)
    }

    pub async fn favorites(&self) -> Result<FavoritesResponse> {
        let response = self.http.get(self.url("/api/favorites")).send().await?;
        Ok(Self::checked(response).await?.json().await?)
    }

    pub async fn remove(&self, recipe_id: i64) -> Result<FavoritesResponse> {
        let response = self
            .http
            .delete(self.url(&format!("/api/favorites/{recipe_id}")))
            .send()
            .await?;
        Ok(Self::checked(response).await?.json().await?)
    }

    /// The server's cache entry for one favorite's catalog details.
    pub async fn favorite_detail(&self, recipe_id: i64) -> Result<Value> {
        let response = self
            .http
            .get(self.url(&format!("/api/favorites/{recipe_id}/detail")))
            .send()
            .await?;
        Ok(Self::checked(response).await?.json().await?)
    }
}
