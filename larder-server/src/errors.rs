use axum::{
    http,
    response::{IntoResponse, Response},
};
use larder::ValidationError;

use crate::catalog::CatalogError;
use crate::search::SearchError;

pub type WebResult<T> = std::result::Result<T, WebError>;

#[derive(thiserror::Error, Debug)]
pub enum WebError {
    #[error("Internal Server Error: {0}")]
    Internal(#[from] anyhow::Error),
    #[error("{0}")]
    Validation(#[from] ValidationError),
    #[error("Recipe catalog unavailable: {0}")]
    Catalog(CatalogError),
    #[error("Authentication error: {0}")]
    Auth(String),
    #[error("Sign in required")]
    SignInRequired,
    #[error("Not found")]
    NotFound,
}

impl From<CatalogError> for WebError {
    fn from(e: CatalogError) -> Self {
        match e {
            CatalogError::NotFound => WebError::NotFound,
            other => WebError::Catalog(other),
        }
    }
}

impl From<SearchError> for WebError {
    fn from(e: SearchError) -> Self {
        match e {
            SearchError::Validation(e) => e.into(),
            SearchError::Catalog(e) => WebError::Catalog(e),
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        // In development, we want to return the error message
        // In production, we want to return a generic error message
        let display = self.to_string();
        match self {
            WebError::Internal(_) => {
                let display = if cfg!(debug_assertions) {
                    display
                } else {
                    "Internal Server Error".into()
                };
                (http::StatusCode::INTERNAL_SERVER_ERROR, display).into_response()
            }
            WebError::Validation(_) => (http::StatusCode::BAD_REQUEST, display).into_response(),
            WebError::Catalog(_) => (http::StatusCode::BAD_GATEWAY, display).into_response(),
            // Auth failures are always explained
            WebError::Auth(_) | WebError::SignInRequired => {
                (http::StatusCode::UNAUTHORIZED, display).into_response()
            }
            WebError::NotFound => (http::StatusCode::NOT_FOUND, "Not Found").into_response(),
        }
    }
}
