use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::{
    cookie::{Cookie, SameSite},
    CookieJar,
};
use serde::{Deserialize, Serialize};

use crate::errors::WebResult;
use crate::state::AllStates;

use super::session::{UserSession, SESSION_COOKIE};
use super::SignUpOutcome;

#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// What the browser is allowed to know about its session.
#[derive(Debug, Serialize)]
pub struct SessionView {
    pub user_id: String,
    pub email: String,
}

impl From<&UserSession> for SessionView {
    fn from(session: &UserSession) -> Self {
        Self {
            user_id: session.user_id.clone(),
            email: session.email.clone(),
        }
    }
}

pub async fn login(
    State(allstates): State<AllStates>,
    mut jar: CookieJar,
    Json(credentials): Json<Credentials>,
) -> WebResult<(CookieJar, Json<SessionView>)> {
    let identity = allstates
        .identity
        .sign_in_with_password(credentials.email.trim(), &credentials.password)
        .await?;
    let session = allstates.sessions.create(identity);
    tracing::info!("User {} signed in", session.user_id);
    let cookie = Cookie::build((SESSION_COOKIE, session.id.clone()))
        .http_only(true)
        .path("/")
        .same_site(SameSite::Lax)
        .secure(!cfg!(debug_assertions));
    jar = jar.add(cookie);
    Ok((jar, Json(SessionView::from(&session))))
}

/// Create an account. The new user still has to sign in afterwards.
pub async fn signup(
    State(allstates): State<AllStates>,
    Json(credentials): Json<Credentials>,
) -> WebResult<Json<SignUpOutcome>> {
    let outcome = allstates
        .identity
        .sign_up(credentials.email.trim(), &credentials.password)
        .await?;
    tracing::info!("User {} signed up", outcome.user_id);
    Ok(Json(outcome))
}

pub async fn logout(
    State(allstates): State<AllStates>,
    session: UserSession,
    mut jar: CookieJar,
) -> WebResult<(CookieJar, StatusCode)> {
    // The local session ends even if the provider refuses.
    if let Err(e) = allstates.identity.sign_out(&session.access_token).await {
        tracing::warn!("Identity provider sign-out failed for {}: {:?}", session.user_id, e);
    }
    allstates.sessions.remove(&session.id);
    allstates.boards.drop_user(&session.user_id);
    jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    Ok((jar, StatusCode::NO_CONTENT))
}

pub async fn current_session(session: UserSession) -> Json<SessionView> {
    Json(SessionView::from(&session))
}
