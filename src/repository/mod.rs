//! Handle database requests.
//!
//! [`Repository`] implements every storage port of the engine plus the plain
//! item and comment operations exposed over HTTP.
mod comments;
mod items;
mod matches;
mod swipes;

use sqlx::{Pool, Postgres};

use crate::error::ServerError;

#[derive(Clone)]
pub struct Repository {
    pool: Pool<Postgres>,
}

impl Repository {
    /// Create a new [`Repository`].
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

/// Name of the constraint a database error was raised by, if any.
fn violated_constraint(err: &sqlx::Error) -> Option<&str> {
    err.as_database_error().and_then(|e| e.constraint())
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(|e| e.is_unique_violation())
}

fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(|e| e.is_foreign_key_violation())
}

/// Map a foreign key violation raised while inserting a row that references
/// a user and one other `entity` through `constraint`.
fn missing_reference(
    err: sqlx::Error,
    constraint: &str,
    entity: &'static str,
) -> ServerError {
    if !is_foreign_key_violation(&err) {
        return err.into();
    }

    if violated_constraint(&err) == Some(constraint) {
        ServerError::NotFound(entity)
    } else {
        ServerError::NotFound("user")
    }
}

#[cfg(test)]
mod tests {
    use sqlx::{Pool, Postgres};

    use super::*;
    use crate::config::CandidateScope;
    use crate::matching::{Endpoint, EndpointPair, GuardOutcome};
    use crate::ports::{ItemDirectory, MatchStore, SwipeStore};
    use crate::swipe::Direction;

    const ALICE: i64 = 1;
    const BOB: i64 = 2;
    const CHARLIE: i64 = 3;
    const LAMP: i64 = 1;
    const BIKE: i64 = 2;
    const COOKBOOK: i64 = 3;

    fn pair(user_a: i64, item_a: i64, user_b: i64, item_b: i64) -> EndpointPair {
        EndpointPair::new(Endpoint::new(user_a, item_a), Endpoint::new(user_b, item_b)).unwrap()
    }

    async fn match_rows(pool: &Pool<Postgres>) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM matches")
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[sqlx::test(fixtures("../../fixtures/users.sql"))]
    async fn test_swipe_is_unique_per_item(pool: Pool<Postgres>) {
        let repo = Repository::new(pool);

        let swipe = repo.insert_swipe(ALICE, COOKBOOK, Direction::Left).await.unwrap();
        assert_eq!(swipe.direction, Direction::Left);

        let err = repo.insert_swipe(ALICE, COOKBOOK, Direction::Right).await.unwrap_err();
        assert!(matches!(err, ServerError::Conflict(_)));
        assert!(!repo.has_swiped_right(ALICE, COOKBOOK).await.unwrap());
    }

    #[sqlx::test(fixtures("../../fixtures/users.sql"))]
    async fn test_swipe_on_missing_references(pool: Pool<Postgres>) {
        let repo = Repository::new(pool);

        let err = repo.insert_swipe(ALICE, 999, Direction::Right).await.unwrap_err();
        assert!(matches!(err, ServerError::NotFound("item")));

        let err = repo.insert_swipe(999, COOKBOOK, Direction::Right).await.unwrap_err();
        assert!(matches!(err, ServerError::NotFound("user")));
    }

    #[sqlx::test(fixtures("../../fixtures/users.sql"))]
    async fn test_owned_items_scope(pool: Pool<Postgres>) {
        let repo = Repository::new(pool);
        assert_eq!(repo.item_owner(COOKBOOK).await.unwrap(), Some(BOB));
        assert_eq!(repo.item_owner(999).await.unwrap(), None);

        repo.insert_swipe(ALICE, LAMP, Direction::Left).await.unwrap();

        let all = repo.owned_items(ALICE, CandidateScope::All).await.unwrap();
        let mut ids: Vec<_> = all.iter().map(|i| i.id).collect();
        ids.sort();
        assert_eq!(ids, [LAMP, BIKE]);

        let unswiped = repo.owned_items(ALICE, CandidateScope::Unswiped).await.unwrap();
        assert_eq!(unswiped.len(), 1);
        assert_eq!(unswiped[0].id, BIKE);
    }

    #[sqlx::test(fixtures("../../fixtures/users.sql"))]
    async fn test_guard_requires_both_swipes(pool: Pool<Postgres>) {
        let repo = Repository::new(pool.clone());

        repo.insert_swipe(BOB, LAMP, Direction::Right).await.unwrap();
        let outcome = repo.create_if_reciprocal(&pair(ALICE, LAMP, BOB, COOKBOOK)).await.unwrap();
        assert_eq!(outcome, GuardOutcome::NotReciprocal);

        repo.insert_swipe(ALICE, COOKBOOK, Direction::Right).await.unwrap();
        let outcome = repo.create_if_reciprocal(&pair(ALICE, LAMP, BOB, COOKBOOK)).await.unwrap();
        assert!(matches!(outcome, GuardOutcome::Created(_)));

        let outcome = repo.create_if_reciprocal(&pair(BOB, COOKBOOK, ALICE, LAMP)).await.unwrap();
        assert_eq!(outcome, GuardOutcome::AlreadyMatched);
        assert_eq!(match_rows(&pool).await, 1);
    }

    #[sqlx::test(fixtures("../../fixtures/users.sql"))]
    async fn test_guard_checks_ownership(pool: Pool<Postgres>) {
        let repo = Repository::new(pool.clone());

        // Charlie liked the lamp and Alice liked the cookbook, but the
        // cookbook is Bob's.
        repo.insert_swipe(CHARLIE, LAMP, Direction::Right).await.unwrap();
        repo.insert_swipe(ALICE, COOKBOOK, Direction::Right).await.unwrap();

        let outcome = repo
            .create_if_reciprocal(&pair(ALICE, LAMP, CHARLIE, COOKBOOK))
            .await
            .unwrap();
        assert_eq!(outcome, GuardOutcome::NotReciprocal);
        assert_eq!(match_rows(&pool).await, 0);
    }

    #[sqlx::test(fixtures("../../fixtures/users.sql"))]
    async fn test_concurrent_guards_insert_once(pool: Pool<Postgres>) {
        let repo = Repository::new(pool.clone());
        repo.insert_swipe(BOB, LAMP, Direction::Right).await.unwrap();
        repo.insert_swipe(ALICE, COOKBOOK, Direction::Right).await.unwrap();

        let mut tasks = Vec::new();
        for i in 0..8 {
            let repo = repo.clone();
            let pair = if i % 2 == 0 {
                pair(ALICE, LAMP, BOB, COOKBOOK)
            } else {
                pair(BOB, COOKBOOK, ALICE, LAMP)
            };
            tasks.push(tokio::spawn(async move {
                repo.create_if_reciprocal(&pair).await
            }));
        }

        let mut created = 0;
        for task in tasks {
            if let GuardOutcome::Created(_) = task.await.unwrap().unwrap() {
                created += 1;
            }
        }

        assert_eq!(created, 1);
        assert_eq!(match_rows(&pool).await, 1);
    }

    #[sqlx::test(fixtures("../../fixtures/users.sql"))]
    async fn test_matches_of_joins_display_data(pool: Pool<Postgres>) {
        let repo = Repository::new(pool);
        repo.insert_swipe(BOB, LAMP, Direction::Right).await.unwrap();
        repo.insert_swipe(ALICE, COOKBOOK, Direction::Right).await.unwrap();
        repo.create_if_reciprocal(&pair(BOB, COOKBOOK, ALICE, LAMP)).await.unwrap();

        let views = repo.matches_of(BOB).await.unwrap();
        assert_eq!(views.len(), 1);

        let view = &views[0];
        assert_eq!((view.user1_id, view.item1_id), (ALICE, LAMP));
        assert_eq!((view.user2_id, view.item2_id), (BOB, COOKBOOK));
        assert_eq!(view.item1_title, "Vintage Lamp");
        assert_eq!(view.item2_title, "Cookbook");
        assert_eq!(view.user1_name, "Alice");
        assert_eq!(view.user2_name, "Bob");

        assert!(repo.matches_of(CHARLIE).await.unwrap().is_empty());
    }
}
