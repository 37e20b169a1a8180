use axum::extract::{Extension, Path, State};
use axum::{Json, http::StatusCode};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::comment::Comment;
use crate::error::Result;
use crate::middleware::Caller;
use crate::ports::CommentSource;
use crate::router::Valid;
use crate::{AppState, MatchId};

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct Body {
    #[validate(range(min = 1, message = "Match ID must be positive."))]
    pub match_id: MatchId,
    #[validate(length(min = 1, max = 2000, message = "Content is required."))]
    pub content: String,
}

/// Handler to post on a match thread.
pub async fn create(
    State(state): State<AppState>,
    Extension(Caller(user_id)): Extension<Caller>,
    Valid(body): Valid<Body>,
) -> Result<(StatusCode, Json<Comment>)> {
    let comment = state
        .repository
        .create_comment(body.match_id, user_id, &body.content)
        .await?;

    Ok((StatusCode::CREATED, Json(comment)))
}

/// Handler returning a match thread, oldest first.
pub async fn list(
    State(state): State<AppState>,
    Extension(Caller(user_id)): Extension<Caller>,
    Path(match_id): Path<MatchId>,
) -> Result<Json<Vec<Comment>>> {
    state.repository.ensure_participant(match_id, user_id).await?;

    Ok(Json(state.repository.comments_of(match_id).await?))
}
