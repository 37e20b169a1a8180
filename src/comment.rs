use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{MatchId, UserId};

/// Message posted on a match thread.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub id: i64,
    pub match_id: MatchId,
    pub user_id: UserId,
    pub user_name: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}
