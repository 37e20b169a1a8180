mod ledger;
mod reciprocity;

pub use ledger::*;
pub use reciprocity::*;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ServerError;
use crate::{ItemId, UserId};

/// Side a user swiped an item to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Left,
    Right,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = ServerError;

    /// Only the exact lowercase words are accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "left" => Ok(Direction::Left),
            "right" => Ok(Direction::Right),
            _ => Err(ServerError::invalid_field(
                "direction",
                "Direction must be 'left' or 'right'.",
            )),
        }
    }
}

/// Recorded decision of a user on an item.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Swipe {
    pub id: i64,
    pub user_id: UserId,
    pub item_id: ItemId,
    pub direction: Direction,
    pub created_at: DateTime<Utc>,
}
