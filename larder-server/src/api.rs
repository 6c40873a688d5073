use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use larder::criteria::suggest;
use larder::{
    FavoriteEntry, IngredientCriterion, IngredientSelector, RecipeDetail, SaveStatus,
    ValidationError,
};
use serde::{Deserialize, Serialize};

use crate::auth::{route as auth_route, session::UserSession};
use crate::cache;
use crate::detail_cache::DetailCacheEntry;
use crate::errors::{WebError, WebResult};
use crate::favorites::save_favorite;
use crate::models::{InternalRecipe, Report};
use crate::search::SearchOutcome;
use crate::state::AllStates;

pub fn router(allstates: AllStates) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/auth/login", post(auth_route::login))
        .route("/auth/signup", post(auth_route::signup))
        .route("/auth/logout", post(auth_route::logout))
        .route("/api/session", get(auth_route::current_session))
        .route("/api/ingredients", get(ingredient_suggestions))
        .route("/api/selection", get(get_selection).post(select_ingredient))
        .route("/api/selection/strict", put(set_strict_mode))
        .route("/api/selection/:name/toggle", post(toggle_ingredient))
        .route("/api/selection/:name", delete(remove_ingredient))
        .route("/api/search", post(search_recipes))
        .route("/api/recipe/:external_id", get(get_recipe))
        .route("/api/favorites", get(list_favorites).post(add_favorite))
        .route("/api/favorites/:recipe_id", delete(remove_favorite))
        .route("/api/favorites/:recipe_id/detail", get(favorite_detail))
        .route("/api/reports", post(report_recipe))
        .with_state(allstates)
}

// Just reply that everything is okay
async fn health() -> StatusCode {
    StatusCode::OK
}

#[derive(Debug, Deserialize)]
struct SuggestQuery {
    #[serde(default)]
    q: String,
}

/// Autocomplete against the catalog's ingredient list.
async fn ingredient_suggestions(
    State(allstates): State<AllStates>,
    Query(query): Query<SuggestQuery>,
) -> WebResult<Json<Vec<String>>> {
    let names = cache::ingredient_names(&allstates.cache, allstates.catalog.as_ref()).await?;
    Ok(Json(
        suggest(&names, &query.q)
            .into_iter()
            .map(str::to_string)
            .collect(),
    ))
}

async fn get_selection(
    State(allstates): State<AllStates>,
    session: UserSession,
) -> Json<IngredientSelector> {
    let boards = allstates.boards.for_user(&session.user_id);
    Json(boards.search.selector().await)
}

#[derive(Debug, Deserialize)]
struct SelectRequest {
    name: String,
}

async fn select_ingredient(
    State(allstates): State<AllStates>,
    session: UserSession,
    Json(request): Json<SelectRequest>,
) -> Json<IngredientSelector> {
    let boards = allstates.boards.for_user(&session.user_id);
    let (_, selector) = boards
        .search
        .update_selector(|s| s.select(&request.name))
        .await;
    Json(selector)
}

async fn toggle_ingredient(
    State(allstates): State<AllStates>,
    session: UserSession,
    Path(name): Path<String>,
) -> WebResult<Json<IngredientSelector>> {
    let boards = allstates.boards.for_user(&session.user_id);
    let (mode, selector) = boards.search.update_selector(|s| s.toggle_mode(&name)).await;
    mode.ok_or(WebError::NotFound)?;
    Ok(Json(selector))
}

async fn remove_ingredient(
    State(allstates): State<AllStates>,
    session: UserSession,
    Path(name): Path<String>,
) -> Json<IngredientSelector> {
    let boards = allstates.boards.for_user(&session.user_id);
    let (_, selector) = boards.search.update_selector(|s| s.remove(&name)).await;
    Json(selector)
}

#[derive(Debug, Deserialize)]
struct StrictRequest {
    strict: bool,
}

async fn set_strict_mode(
    State(allstates): State<AllStates>,
    session: UserSession,
    Json(request): Json<StrictRequest>,
) -> Json<IngredientSelector> {
    let boards = allstates.boards.for_user(&session.user_id);
    let (_, selector) = boards
        .search
        .update_selector(|s| s.set_strict_mode(request.strict))
        .await;
    Json(selector)
}

/// Optionally replaces the whole selection before searching.
#[derive(Debug, Default, Deserialize)]
struct SearchRequest {
    #[serde(default)]
    criteria: Option<Vec<IngredientCriterion>>,
    #[serde(default)]
    strict: Option<bool>,
}

async fn search_recipes(
    State(allstates): State<AllStates>,
    session: UserSession,
    request: Option<Json<SearchRequest>>,
) -> WebResult<Json<SearchOutcome>> {
    let Json(request) = request.unwrap_or_default();
    let boards = allstates.boards.for_user(&session.user_id);
    if request.criteria.is_some() || request.strict.is_some() {
        boards
            .search
            .update_selector(|s| {
                let strict = request.strict.unwrap_or(s.strict());
                *s = match &request.criteria {
                    Some(criteria) => IngredientSelector::from_criteria(criteria, strict),
                    None => {
                        let mut kept = s.clone();
                        kept.set_strict_mode(strict);
                        kept
                    }
                };
            })
            .await;
    }
    Ok(Json(boards.search.search(allstates.catalog.as_ref()).await?))
}

#[derive(Debug, Serialize)]
struct RecipeView {
    #[serde(flatten)]
    detail: Arc<RecipeDetail>,
    ingredient_lines: Vec<String>,
}

async fn get_recipe(
    State(allstates): State<AllStates>,
    Path(external_id): Path<String>,
) -> WebResult<Json<RecipeView>> {
    let detail =
        cache::recipe_detail(&allstates.cache, allstates.catalog.as_ref(), &external_id).await?;
    Ok(Json(RecipeView {
        ingredient_lines: detail.ingredient_lines(),
        detail,
    }))
}

#[derive(Debug, Deserialize)]
struct SaveRequest {
    #[serde(default)]
    mealdb_id: Option<String>,
    recipe_name: String,
}

/// Save a search result as a favorite, returning the card's save status.
async fn add_favorite(
    State(allstates): State<AllStates>,
    session: UserSession,
    Json(request): Json<SaveRequest>,
) -> WebResult<Json<SaveStatus>> {
    let recipe_name = request.recipe_name.trim();
    if recipe_name.is_empty() {
        return Err(ValidationError::BlankRecipeName.into());
    }
    let mealdb_id = request
        .mealdb_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty());
    let boards = allstates.boards.for_user(&session.user_id);
    let card = mealdb_id.unwrap_or(recipe_name).to_string();
    if let Err(status) = boards.search.begin_save(&card) {
        tracing::debug!("Ignoring save of {} while {:?}", card, status);
        return Ok(Json(status));
    }
    let result = save_favorite(&allstates.db, &session.user_id, mealdb_id, recipe_name);
    if let Err(e) = &result {
        tracing::error!("{:?}", e);
    }
    Ok(Json(boards.search.finish_save(&card, result)))
}

#[derive(Debug, Serialize)]
struct FavoritesView {
    favorites: Vec<FavoriteEntry>,
    error: Option<String>,
}

/// List favorites, and start fetching their catalog details in the background.
async fn list_favorites(
    State(allstates): State<AllStates>,
    session: UserSession,
) -> (StatusCode, Json<FavoritesView>) {
    let boards = allstates.boards.for_user(&session.user_id);
    let status = match boards.favorites.load(&allstates.db, &session.user_id).await {
        Ok(_) => {
            let warming = boards.clone();
            let catalog = allstates.catalog.clone();
            tokio::spawn(async move {
                let fetched = warming.favorites.warm_all(catalog.as_ref()).await;
                tracing::debug!("Warmed {} favorite details", fetched);
            });
            StatusCode::OK
        }
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(FavoritesView {
            favorites: boards.favorites.favorites().await,
            error: boards.favorites.last_error().await,
        }),
    )
}

/// Remove a favorite. Its search card, if shown, becomes saveable again.
async fn remove_favorite(
    State(allstates): State<AllStates>,
    session: UserSession,
    Path(recipe_id): Path<i64>,
) -> (StatusCode, Json<FavoritesView>) {
    let boards = allstates.boards.for_user(&session.user_id);
    let recipe = InternalRecipe::get_by_id(&allstates.db, recipe_id).unwrap_or_else(|e| {
        tracing::warn!("Could not look up recipe {}: {:?}", recipe_id, e);
        None
    });
    let status = match boards
        .favorites
        .remove_favorite(&allstates.db, &session.user_id, recipe_id)
        .await
    {
        Ok(()) => {
            if let Some(recipe) = &recipe {
                let cards = recipe
                    .mealdb_id
                    .iter()
                    .map(String::as_str)
                    .chain([recipe.recipe_name.as_str()]);
                boards.search.clear_save_status(cards);
            }
            StatusCode::OK
        }
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(FavoritesView {
            favorites: boards.favorites.favorites().await,
            error: boards.favorites.last_error().await,
        }),
    )
}

async fn favorite_detail(
    State(allstates): State<AllStates>,
    session: UserSession,
    Path(recipe_id): Path<i64>,
) -> WebResult<Json<DetailCacheEntry>> {
    let boards = allstates.boards.for_user(&session.user_id);
    let entry = boards
        .favorites
        .detail(allstates.catalog.as_ref(), recipe_id)
        .await
        .ok_or(WebError::NotFound)?;
    Ok(Json(entry))
}

#[derive(Debug, Deserialize)]
struct ReportRequest {
    mealdb_id: String,
    recipe_name: String,
    #[serde(default)]
    comment: Option<String>,
}

#[derive(Debug, Serialize)]
struct ReportReceipt {
    report_id: i64,
}

async fn report_recipe(
    State(allstates): State<AllStates>,
    session: UserSession,
    Json(request): Json<ReportRequest>,
) -> WebResult<Json<ReportReceipt>> {
    let report_id = Report::push(
        &allstates.db,
        &session.user_id,
        &request.mealdb_id,
        &request.recipe_name,
        request.comment.as_deref(),
    )?;
    tracing::info!(
        "User {} reported recipe {} as report {}",
        session.user_id,
        request.mealdb_id,
        report_id
    );
    Ok(Json(ReportReceipt { report_id }))
}
