use axum::extract::{Extension, Path, Query, State};
use axum::{Json, http::StatusCode};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::Result;
use crate::item::{Item, ItemWithOwner, NewItem};
use crate::middleware::Caller;
use crate::router::Valid;
use crate::{AppState, ItemId};

#[derive(Debug, Default, Deserialize)]
pub struct FeedQuery {
    #[serde(default)]
    pub exclude_own: bool,
}

/// Handler for the browse feed.
pub async fn feed(
    State(state): State<AppState>,
    Extension(Caller(user_id)): Extension<Caller>,
    Query(query): Query<FeedQuery>,
) -> Result<Json<Vec<ItemWithOwner>>> {
    Ok(Json(state.repository.feed(user_id, query.exclude_own).await?))
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct Body {
    #[validate(length(min = 1, max = 200, message = "Title is required."))]
    pub title: String,
    #[serde(default)]
    #[validate(length(max = 5000))]
    pub description: String,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub category: String,
    #[serde(default)]
    #[validate(length(max = 2048))]
    pub image_url: String,
}

/// Handler to list a new item.
pub async fn create(
    State(state): State<AppState>,
    Extension(Caller(user_id)): Extension<Caller>,
    Valid(body): Valid<Body>,
) -> Result<(StatusCode, Json<Item>)> {
    let item = state
        .repository
        .create_item(user_id, NewItem {
            title: body.title.trim().to_owned(),
            description: body.description,
            category: body.category,
            image_url: body.image_url,
        })
        .await?;

    tracing::info!(user_id, item_id = item.id, "item created");

    Ok((StatusCode::CREATED, Json(item)))
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct Deleted {
    pub id: ItemId,
}

/// Handler to delete one of the caller's items.
pub async fn delete(
    State(state): State<AppState>,
    Extension(Caller(user_id)): Extension<Caller>,
    Path(item_id): Path<ItemId>,
) -> Result<Json<Deleted>> {
    state.repository.delete_item(user_id, item_id).await?;

    tracing::info!(user_id, item_id, "item deleted");

    Ok(Json(Deleted { id: item_id }))
}
