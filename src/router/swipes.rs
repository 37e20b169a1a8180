use axum::extract::{Extension, State};
use axum::{Json, http::StatusCode};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::error::Result;
use crate::middleware::Caller;
use crate::router::Valid;
use crate::swipe::{Direction, Swipe};
use crate::{AppState, ItemId};

fn validate_direction(direction: &str) -> std::result::Result<(), ValidationError> {
    match direction {
        "left" | "right" => Ok(()),
        _ => Err(ValidationError::new("direction")),
    }
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct Body {
    #[validate(range(min = 1, message = "Item ID must be positive."))]
    pub item_id: ItemId,
    #[validate(custom(
        function = "validate_direction",
        message = "Direction must be 'left' or 'right'."
    ))]
    pub direction: String,
}

/// Handler to record a swipe.
pub async fn handler(
    State(state): State<AppState>,
    Extension(Caller(user_id)): Extension<Caller>,
    Valid(body): Valid<Body>,
) -> Result<(StatusCode, Json<Swipe>)> {
    let direction = body.direction.parse::<Direction>()?;
    let swipe = state
        .engine
        .record_swipe(user_id, body.item_id, direction)
        .await?;

    Ok((StatusCode::CREATED, Json(swipe)))
}
