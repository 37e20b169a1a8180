//! HTTP handlers.
pub mod comments;
pub mod items;
pub mod matches;
pub mod status;
pub mod swipes;

use axum::extract::{FromRequest, Json, Request};
use axum::routing::{delete, get, post};
use axum::{Router, middleware as AxumMiddleware};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::AppState;
use crate::error::ServerError;
use crate::middleware;

/// JSON body validated with [`validator`] before reaching the handler.
#[derive(Debug, Clone, Copy, Default)]
pub struct Valid<T>(pub T);

impl<T, S> FromRequest<S> for Valid<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        value.validate()?;
        Ok(Valid(value))
    }
}

/// Routes served on behalf of an authenticated caller.
pub fn router() -> Router<AppState> {
    Router::new()
        // `POST /swipes` records a swipe and runs match detection.
        .route("/swipes", post(swipes::handler))
        // `GET /matches` lists the caller's matches.
        .route("/matches", get(matches::handler))
        .route("/matches/{id}/comments", get(comments::list))
        .route("/items", get(items::feed).post(items::create))
        .route("/items/{id}", delete(items::delete))
        .route("/comments", post(comments::create))
        .route_layer(AxumMiddleware::from_fn(middleware::identify))
}

/// MUST NEVER be used in production.
#[cfg(test)]
pub fn state(pool: sqlx::Pool<sqlx::Postgres>) -> AppState {
    use std::sync::Arc;

    AppState::new(
        Arc::new(crate::config::Configuration::default()),
        crate::database::Database { postgres: pool },
        None,
    )
}
