//! In-memory store for unit tests, with failure injection.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use crate::comment::Comment;
use crate::config::CandidateScope;
use crate::error::{Result, ServerError};
use crate::item::Item;
use crate::matching::{EndpointPair, GuardOutcome, Match, MatchView};
use crate::ports::{CommentSource, ItemDirectory, MatchStore, SwipeStore};
use crate::swipe::{Direction, Swipe};
use crate::{ItemId, MatchId, UserId};

#[derive(Default)]
struct State {
    next_id: i64,
    users: HashMap<UserId, String>,
    items: Vec<Item>,
    swipes: Vec<Swipe>,
    matches: Vec<Match>,
    comments: Vec<Comment>,
}

impl State {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn swiped_right(&self, user_id: UserId, item_id: ItemId) -> bool {
        self.swipes.iter().any(|s| {
            s.user_id == user_id && s.item_id == item_id && s.direction == Direction::Right
        })
    }

    fn owns(&self, user_id: UserId, item_id: ItemId) -> bool {
        self.items
            .iter()
            .any(|i| i.id == item_id && i.user_id == user_id)
    }

    fn title(&self, item_id: ItemId) -> String {
        self.items
            .iter()
            .find(|i| i.id == item_id)
            .map(|i| i.title.clone())
            .unwrap_or_default()
    }

    fn name(&self, user_id: UserId) -> String {
        self.users.get(&user_id).cloned().unwrap_or_default()
    }

    fn insert_match(&mut self, pair: &EndpointPair) -> Match {
        let created = Match {
            id: self.next_id(),
            user1_id: pair.first().user_id,
            item1_id: pair.first().item_id,
            user2_id: pair.second().user_id,
            item2_id: pair.second().item_id,
            created_at: Utc::now(),
        };
        self.matches.push(created.clone());
        created
    }
}

/// Store keeping everything behind one mutex.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
    failing_lookups: Mutex<HashSet<ItemId>>,
    failing_matches: Mutex<HashSet<ItemId>>,
    failing_comments: Mutex<HashSet<MatchId>>,
    match_delay: Mutex<Option<Duration>>,
}

fn injected() -> ServerError {
    ServerError::Storage(sqlx::Error::PoolTimedOut)
}

impl MemoryStore {
    pub fn add_user(&self, id: UserId, name: &str) {
        self.state.lock().unwrap().users.insert(id, name.to_owned());
    }

    pub fn add_item(&self, user_id: UserId, title: &str) -> ItemId {
        let mut state = self.state.lock().unwrap();
        let id = state.next_id();
        state.items.push(Item {
            id,
            user_id,
            title: title.to_owned(),
            description: String::new(),
            category: String::new(),
            image_url: String::new(),
            created_at: Utc::now(),
        });
        id
    }

    /// Record a swipe directly, bypassing the ledger.
    pub fn swipe(&self, user_id: UserId, item_id: ItemId, direction: Direction) {
        let mut state = self.state.lock().unwrap();
        let id = state.next_id();
        state.swipes.push(Swipe {
            id,
            user_id,
            item_id,
            direction,
            created_at: Utc::now(),
        });
    }

    /// Insert a match without any check.
    pub fn force_match(
        &self,
        user_a: UserId,
        item_a: ItemId,
        user_b: UserId,
        item_b: ItemId,
    ) -> MatchId {
        let pair = EndpointPair::new(
            crate::matching::Endpoint::new(user_a, item_a),
            crate::matching::Endpoint::new(user_b, item_b),
        )
        .unwrap();
        self.state.lock().unwrap().insert_match(&pair).id
    }

    pub fn add_comment(&self, match_id: MatchId, user_id: UserId, content: &str) {
        let mut state = self.state.lock().unwrap();
        let id = state.next_id();
        let user_name = state.name(user_id);
        state.comments.push(Comment {
            id,
            match_id,
            user_id,
            user_name,
            content: content.to_owned(),
            created_at: Utc::now(),
        });
    }

    pub fn swipe_count(&self) -> usize {
        self.state.lock().unwrap().swipes.len()
    }

    pub fn match_count(&self) -> usize {
        self.state.lock().unwrap().matches.len()
    }

    /// Make reciprocity lookups on `item_id` fail.
    pub fn fail_lookups_on(&self, item_id: ItemId) {
        self.failing_lookups.lock().unwrap().insert(item_id);
    }

    /// Make match creation involving `item_id` fail.
    pub fn fail_matches_on(&self, item_id: ItemId) {
        self.failing_matches.lock().unwrap().insert(item_id);
    }

    /// Make the comment thread of `match_id` fail to load.
    pub fn fail_comments_on(&self, match_id: MatchId) {
        self.failing_comments.lock().unwrap().insert(match_id);
    }

    /// Delay every match transaction.
    pub fn delay_matches(&self, delay: Duration) {
        *self.match_delay.lock().unwrap() = Some(delay);
    }
}

#[async_trait]
impl ItemDirectory for MemoryStore {
    async fn item_owner(&self, item_id: ItemId) -> Result<Option<UserId>> {
        let state = self.state.lock().unwrap();
        Ok(state.items.iter().find(|i| i.id == item_id).map(|i| i.user_id))
    }

    async fn owned_items(&self, user_id: UserId, scope: CandidateScope) -> Result<Vec<Item>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .items
            .iter()
            .filter(|i| i.user_id == user_id)
            .filter(|i| match scope {
                CandidateScope::All => true,
                CandidateScope::Unswiped => !state
                    .swipes
                    .iter()
                    .any(|s| s.user_id == user_id && s.item_id == i.id),
            })
            .cloned()
            .collect())
    }
}

#[async_trait]
impl SwipeStore for MemoryStore {
    async fn insert_swipe(
        &self,
        user_id: UserId,
        item_id: ItemId,
        direction: Direction,
    ) -> Result<Swipe> {
        let mut state = self.state.lock().unwrap();
        if !state.items.iter().any(|i| i.id == item_id) {
            return Err(ServerError::NotFound("item"));
        }
        if state
            .swipes
            .iter()
            .any(|s| s.user_id == user_id && s.item_id == item_id)
        {
            return Err(ServerError::Conflict("item already swiped".into()));
        }

        let swipe = Swipe {
            id: state.next_id(),
            user_id,
            item_id,
            direction,
            created_at: Utc::now(),
        };
        state.swipes.push(swipe.clone());
        Ok(swipe)
    }

    async fn has_swiped_right(&self, user_id: UserId, item_id: ItemId) -> Result<bool> {
        if self.failing_lookups.lock().unwrap().contains(&item_id) {
            return Err(injected());
        }
        Ok(self.state.lock().unwrap().swiped_right(user_id, item_id))
    }
}

#[async_trait]
impl MatchStore for MemoryStore {
    async fn create_if_reciprocal(&self, pair: &EndpointPair) -> Result<GuardOutcome> {
        let delay = *self.match_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let failing = self
            .failing_matches
            .lock()
            .unwrap()
            .iter()
            .any(|item| pair.involves_item(*item));
        if failing {
            return Err(injected());
        }

        let (a, b) = (pair.first(), pair.second());
        let mut state = self.state.lock().unwrap();

        let reciprocal = state.owns(a.user_id, a.item_id)
            && state.owns(b.user_id, b.item_id)
            && state.swiped_right(a.user_id, b.item_id)
            && state.swiped_right(b.user_id, a.item_id);
        if !reciprocal {
            return Ok(GuardOutcome::NotReciprocal);
        }

        let exists = state.matches.iter().any(|m| {
            (m.user1_id, m.item1_id, m.user2_id, m.item2_id)
                == (a.user_id, a.item_id, b.user_id, b.item_id)
        });
        if exists {
            return Ok(GuardOutcome::AlreadyMatched);
        }

        Ok(GuardOutcome::Created(state.insert_match(pair)))
    }

    async fn matches_of(&self, user_id: UserId) -> Result<Vec<MatchView>> {
        let state = self.state.lock().unwrap();
        let mut views: Vec<MatchView> = state
            .matches
            .iter()
            .filter(|m| m.user1_id == user_id || m.user2_id == user_id)
            .map(|m| MatchView {
                id: m.id,
                user1_id: m.user1_id,
                user2_id: m.user2_id,
                item1_id: m.item1_id,
                item2_id: m.item2_id,
                item1_title: state.title(m.item1_id),
                item2_title: state.title(m.item2_id),
                user1_name: state.name(m.user1_id),
                user2_name: state.name(m.user2_id),
                created_at: m.created_at,
                comments: Vec::new(),
            })
            .collect();
        views.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(views)
    }
}

#[async_trait]
impl CommentSource for MemoryStore {
    async fn comments_of(&self, match_id: MatchId) -> Result<Vec<Comment>> {
        if self.failing_comments.lock().unwrap().contains(&match_id) {
            return Err(injected());
        }
        let state = self.state.lock().unwrap();
        Ok(state
            .comments
            .iter()
            .filter(|c| c.match_id == match_id)
            .cloned()
            .collect())
    }
}
