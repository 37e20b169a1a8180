//! Middlewares for routes.

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;

use crate::UserId;
use crate::error::{Result, ServerError};

/// Header set by the upstream gateway once the user is authenticated.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Authenticated user making the request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Caller(pub UserId);

fn caller(req: &Request) -> Option<Caller> {
    req.headers()
        .get(USER_ID_HEADER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<UserId>()
        .ok()
        .filter(|id| *id > 0)
        .map(Caller)
}

/// Middleware resolving the [`Caller`] from the `X-User-Id` header.
pub async fn identify(mut req: Request, next: Next) -> Result<Response> {
    let Some(caller) = caller(&req) else {
        tracing::debug!(path = req.uri().path(), "request without valid caller");
        return Err(ServerError::Unauthorized);
    };

    req.extensions_mut().insert(caller);
    Ok(next.run(req).await)
}
