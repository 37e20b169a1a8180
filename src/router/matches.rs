use axum::Json;
use axum::extract::{Extension, State};

use crate::AppState;
use crate::error::Result;
use crate::matching::MatchView;
use crate::middleware::Caller;

/// Handler listing the caller's matches, newest first.
pub async fn handler(
    State(state): State<AppState>,
    Extension(Caller(user_id)): Extension<Caller>,
) -> Result<Json<Vec<MatchView>>> {
    Ok(Json(state.engine.list_matches(user_id).await?))
}
