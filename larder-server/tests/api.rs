mod common;

use std::sync::Arc;

use common::ScriptedCatalog;
use larder_server::auth::{session::Sessions, GoTrueClient};
use larder_server::boards::Boards;
use larder_server::cache::new_cache;
use larder_server::config::AuthConfig;
use larder_server::database::Database;
use larder_server::state::AllStates;
use larder_server::api;
use reqwest::{header, StatusCode};
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct TestServer {
    base: String,
    http: reqwest::Client,
    _identity: MockServer,
}

impl TestServer {
    async fn start() -> Self {
        let identity = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "jwt-token",
                "user": {"id": "user-ada", "email": "ada@example.test"}
            })))
            .mount(&identity)
            .await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/logout"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&identity)
            .await;

        let catalog = ScriptedCatalog::new()
            .with_ingredients(&["Chicken", "Chicken Breast", "Lemon", "Beef"])
            .with_recipe("1", "Chicken Soup", &["Chicken", "Water"])
            .with_recipe("2", "Lemon Chicken", &["Chicken", "Lemon"]);
        let gotrue = GoTrueClient::new_from_config(&AuthConfig {
            provider_url: identity.uri(),
            api_key: "anon-key".into(),
            session_storage_path: "unused.json".into(),
        })
        .unwrap();
        let app = api::router(AllStates {
            db: Database::in_memory().unwrap(),
            catalog: Arc::new(catalog),
            cache: new_cache(),
            identity: Arc::new(gotrue),
            sessions: Sessions::new(),
            boards: Boards::new(),
        });

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        tokio::spawn(async move { axum::serve(listener, app).await });
        Self {
            base,
            http: reqwest::Client::new(),
            _identity: identity,
        }
    }

    fn url(&self, route: &str) -> String {
        format!("{}{}", self.base, route)
    }

    /// Sign in and return the session cookie to send back.
    async fn sign_in(&self) -> String {
        let response = self
            .http
            .post(self.url("/auth/login"))
            .json(&json!({"email": "ada@example.test", "password": "hunter22"}))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
        cookie.split(';').next().unwrap().to_string()
    }
}

#[tokio::test]
async fn health_needs_no_session() {
    let server = TestServer::start().await;
    let response = server.http.get(server.url("/health")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn user_routes_require_sign_in() {
    let server = TestServer::start().await;
    for route in ["/api/session", "/api/favorites", "/api/selection"] {
        let response = server.http.get(server.url(route)).send().await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{route}");
    }
    let response = server
        .http
        .get(server.url("/api/favorites"))
        .header(header::COOKIE, "larder_session=forged")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn autocomplete_suggests_after_two_characters() {
    let server = TestServer::start().await;
    let names: Vec<String> = server
        .http
        .get(server.url("/api/ingredients?q=chi"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(names, vec!["Chicken", "Chicken Breast"]);

    let names: Vec<String> = server
        .http
        .get(server.url("/api/ingredients?q=c"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(names.is_empty());
}

#[tokio::test]
async fn search_save_and_list_favorites() {
    let server = TestServer::start().await;
    let cookie = server.sign_in().await;

    let outcome: Value = server
        .http
        .post(server.url("/api/search"))
        .header(header::COOKIE, &cookie)
        .json(&json!({"criteria": [
            {"name": "Chicken", "mode": "include"},
            {"name": "lemon", "mode": "exclude"}
        ]}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(outcome["outcome"], "current");
    assert_eq!(outcome["recipes"].as_array().unwrap().len(), 1);
    assert_eq!(outcome["recipes"][0]["name"], "Chicken Soup");

    let save = json!({"mealdb_id": "1", "recipe_name": "Chicken Soup"});
    for expected in ["saved", "already_saved"] {
        let status: Value = server
            .http
            .post(server.url("/api/favorites"))
            .header(header::COOKIE, &cookie)
            .json(&save)
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(status["status"], expected);
    }

    let listing: Value = server
        .http
        .get(server.url("/api/favorites"))
        .header(header::COOKIE, &cookie)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let favorites = listing["favorites"].as_array().unwrap();
    assert_eq!(favorites.len(), 1);
    assert_eq!(favorites[0]["mealdb_id"], "1");
    assert!(listing["error"].is_null());
}

#[tokio::test]
async fn searching_without_an_included_ingredient_is_a_bad_request() {
    let server = TestServer::start().await;
    let cookie = server.sign_in().await;

    let response = server
        .http
        .post(server.url("/api/search"))
        .header(header::COOKIE, &cookie)
        .json(&json!({"criteria": [{"name": "Lemon", "mode": "exclude"}]}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.text().await.unwrap(),
        "Please select at least one ingredient to include."
    );
}

#[tokio::test]
async fn sign_out_ends_the_session() {
    let server = TestServer::start().await;
    let cookie = server.sign_in().await;

    let response = server
        .http
        .post(server.url("/auth/logout"))
        .header(header::COOKIE, &cookie)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = server
        .http
        .get(server.url("/api/session"))
        .header(header::COOKIE, &cookie)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn saving_again_after_removal_stores_a_new_link() {
    let server = TestServer::start().await;
    let cookie = server.sign_in().await;
    let save = json!({"mealdb_id": "1", "recipe_name": "Chicken Soup"});

    let save_status = || async {
        let status: Value = server
            .http
            .post(server.url("/api/favorites"))
            .header(header::COOKIE, &cookie)
            .json(&save)
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        status["status"].as_str().unwrap().to_string()
    };
    let list_favorites = || async {
        let listing: Value = server
            .http
            .get(server.url("/api/favorites"))
            .header(header::COOKIE, &cookie)
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        listing["favorites"].as_array().unwrap().clone()
    };

    assert_eq!(save_status().await, "saved");
    let favorites = list_favorites().await;
    assert_eq!(favorites.len(), 1);
    let recipe_id = favorites[0]["recipe_id"].as_i64().unwrap();

    let response = server
        .http
        .delete(server.url(&format!("/api/favorites/{recipe_id}")))
        .header(header::COOKIE, &cookie)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(list_favorites().await.is_empty());

    assert_eq!(save_status().await, "saved");
    let favorites = list_favorites().await;
    assert_eq!(favorites.len(), 1);
    assert_eq!(favorites[0]["recipe_id"].as_i64(), Some(recipe_id));
}

#[tokio::test]
async fn saving_a_blank_recipe_name_is_a_bad_request() {
    let server = TestServer::start().await;
    let cookie = server.sign_in().await;

    let response = server
        .http
        .post(server.url("/api/favorites"))
        .header(header::COOKIE, &cookie)
        .json(&json!({"mealdb_id": "1", "recipe_name": "   "}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response.text().await.unwrap(), "Recipe name must not be blank.");

    let listing: Value = server
        .http
        .get(server.url("/api/favorites"))
        .header(header::COOKIE, &cookie)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(listing["favorites"].as_array().unwrap().is_empty());
}
