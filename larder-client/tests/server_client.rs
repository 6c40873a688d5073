use larder::SaveStatus;
use larder_client::{selection_from_flags, ServerClient};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn signed_in(server: &MockServer) -> ServerClient {
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "larder_session=abc123; HttpOnly; Path=/")
                .set_body_json(json!({"user_id": "user-ada", "email": "ada@example.test"})),
        )
        .mount(server)
        .await;
    let client = ServerClient::new(&server.uri()).unwrap();
    let session = client.sign_in("ada@example.test", "hunter22").await.unwrap();
    assert_eq!(session.user_id, "user-ada");
    client
}

#[tokio::test]
async fn the_session_cookie_follows_later_requests() {
    let server = MockServer::start().await;
    let client = signed_in(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/favorites"))
        .and(header("cookie", "larder_session=abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "favorites": [{"recipe_id": 7, "recipe_name": "Pancakes", "mealdb_id": null}],
            "error": null
        })))
        .expect(1)
        .mount(&server)
        .await;

    let listing = client.favorites().await.unwrap();
    assert_eq!(listing.favorites[0].recipe_id, 7);
    assert_eq!(listing.favorites[0].mealdb_id, None);
}

#[tokio::test]
async fn search_sends_the_whole_selection() {
    let server = MockServer::start().await;
    let client = signed_in(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/search"))
        .and(body_json(json!({
            "criteria": [
                {"name": "Chicken", "mode": "include"},
                {"name": "Lemon", "mode": "exclude"}
            ],
            "strict": false
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "outcome": "current",
            "generation": 1,
            "recipes": [{
                "external_id": "52940",
                "name": "Brown Stew Chicken",
                "category": null,
                "area": null,
                "instructions": null,
                "thumbnail": null,
                "ingredients": [{"ingredient": "Chicken", "measure": "1 whole"}]
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let selector = selection_from_flags(&["Chicken".into()], &["Lemon".into()], false);
    let response = client.search(&selector).await.unwrap();
    assert_eq!(response.recipes.len(), 1);
    assert_eq!(response.recipes[0].ingredient_lines(), vec!["1 whole Chicken"]);

    Mock::given(method("POST"))
        .and(path("/api/favorites"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "already_saved"})))
        .mount(&server)
        .await;
    let status = client.save(&response.recipes[0]).await.unwrap();
    assert_eq!(status, SaveStatus::AlreadySaved);
}

#[tokio::test]
async fn server_errors_are_reported_with_their_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/session"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Sign in required"))
        .mount(&server)
        .await;

    let client = ServerClient::new(&server.uri()).unwrap();
    let err = client.session().await.unwrap_err();
    assert!(err.to_string().contains("Sign in required"), "{err}");
}
