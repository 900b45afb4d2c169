use chrono::Utc;
use sea_orm::{sea_query::OnConflict, DatabaseConnection};
use thiserror::Error;

use crate::{entity::prelude::*, ids::UserId};

#[derive(Debug, Error)]
pub enum FollowsServiceError {
    #[error("fatal database error")]
    DbError(#[from] DbErr),

    #[error("user not found")]
    UserNotFound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowOutcome {
    Created,
    AlreadyFollowing,
    /// Following yourself is silently ignored.
    SelfFollowIgnored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnfollowOutcome {
    Removed,
    NotFollowing,
}

#[derive(Clone)]
pub struct FollowsService {
    db: DatabaseConnection,
}

impl FollowsService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Make `user` follow the author named `target_username`.
    ///
    /// Get-or-create: the insert is `ON CONFLICT DO NOTHING`, so repeated or
    /// concurrent calls for the same pair leave exactly one edge.
    pub async fn follow(
        &self,
        user: &UserModel,
        target_username: &str,
    ) -> Result<FollowOutcome, FollowsServiceError> {
        let author = self.resolve(target_username).await?;

        if author.id == user.id {
            return Ok(FollowOutcome::SelfFollowIgnored);
        }

        let edge = FollowActiveModel {
            follower_id: Set(user.id),
            author_id: Set(author.id),
            created_at: Set(Utc::now()),
        };

        let inserted = Follow::insert(edge)
            .on_conflict(
                OnConflict::columns([FollowColumn::FollowerId, FollowColumn::AuthorId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;

        if inserted == 0 {
            return Ok(FollowOutcome::AlreadyFollowing);
        }

        tracing::info!(follower = %user.username, author = %author.username, "follow created");
        Ok(FollowOutcome::Created)
    }

    /// Remove the edge from `user` to `target_username`, if there is one
    pub async fn unfollow(
        &self,
        user: &UserModel,
        target_username: &str,
    ) -> Result<UnfollowOutcome, FollowsServiceError> {
        let author = self.resolve(target_username).await?;

        let deleted = Follow::delete_many()
            .filter(FollowColumn::FollowerId.eq(user.id))
            .filter(FollowColumn::AuthorId.eq(author.id))
            .exec(&self.db)
            .await?;

        if deleted.rows_affected == 0 {
            return Ok(UnfollowOutcome::NotFollowing);
        }

        tracing::info!(follower = %user.username, author = %author.username, "follow removed");
        Ok(UnfollowOutcome::Removed)
    }

    pub async fn is_following(
        &self,
        follower_id: UserId,
        author_id: UserId,
    ) -> Result<bool, FollowsServiceError> {
        let edge = Follow::find_by_id((follower_id, author_id))
            .one(&self.db)
            .await?;

        Ok(edge.is_some())
    }

    /// Number of users following `author_id`
    pub async fn follower_count(&self, author_id: UserId) -> Result<u64, FollowsServiceError> {
        let count = Follow::find()
            .filter(FollowColumn::AuthorId.eq(author_id))
            .count(&self.db)
            .await?;

        Ok(count)
    }

    /// Number of authors `follower_id` follows
    pub async fn following_count(&self, follower_id: UserId) -> Result<u64, FollowsServiceError> {
        let count = Follow::find()
            .filter(FollowColumn::FollowerId.eq(follower_id))
            .count(&self.db)
            .await?;

        Ok(count)
    }

    async fn resolve(&self, username: &str) -> Result<UserModel, FollowsServiceError> {
        User::find()
            .filter(UserColumn::Username.eq(username))
            .one(&self.db)
            .await?
            .ok_or(FollowsServiceError::UserNotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    async fn edge_count(db: &DatabaseConnection) -> u64 {
        Follow::find().count(db).await.unwrap()
    }

    #[tokio::test]
    async fn test_follow_creates_one_edge() {
        let db = setup_test_db().await;
        let service = FollowsService::new(db.clone());
        let sarah = create_test_user(&db, "sarah").await;
        let sam = create_test_user(&db, "sam").await;

        let outcome = service.follow(&sam, "sarah").await.unwrap();

        assert_eq!(outcome, FollowOutcome::Created);
        assert!(service.is_following(sam.id, sarah.id).await.unwrap());
        assert!(!service.is_following(sarah.id, sam.id).await.unwrap());
        assert_eq!(edge_count(&db).await, 1);
    }

    #[tokio::test]
    async fn test_follow_twice_leaves_one_edge() {
        let db = setup_test_db().await;
        let service = FollowsService::new(db.clone());
        create_test_user(&db, "sarah").await;
        let sam = create_test_user(&db, "sam").await;

        service.follow(&sam, "sarah").await.unwrap();
        let second = service.follow(&sam, "sarah").await.unwrap();

        assert_eq!(second, FollowOutcome::AlreadyFollowing);
        assert_eq!(edge_count(&db).await, 1);
    }

    #[tokio::test]
    async fn test_unfollow_twice_leaves_no_edge() {
        let db = setup_test_db().await;
        let service = FollowsService::new(db.clone());
        create_test_user(&db, "sarah").await;
        let sam = create_test_user(&db, "sam").await;
        service.follow(&sam, "sarah").await.unwrap();

        let first = service.unfollow(&sam, "sarah").await.unwrap();
        let second = service.unfollow(&sam, "sarah").await.unwrap();

        assert_eq!(first, UnfollowOutcome::Removed);
        assert_eq!(second, UnfollowOutcome::NotFollowing);
        assert_eq!(edge_count(&db).await, 0);
    }

    #[tokio::test]
    async fn test_unfollow_without_edge_is_noop() {
        let db = setup_test_db().await;
        let service = FollowsService::new(db.clone());
        create_test_user(&db, "sarah").await;
        let sam = create_test_user(&db, "sam").await;

        let outcome = service.unfollow(&sam, "sarah").await.unwrap();

        assert_eq!(outcome, UnfollowOutcome::NotFollowing);
        assert_eq!(edge_count(&db).await, 0);
    }

    #[tokio::test]
    async fn test_self_follow_is_ignored() {
        let db = setup_test_db().await;
        let service = FollowsService::new(db.clone());
        let sarah = create_test_user(&db, "sarah").await;

        let outcome = service.follow(&sarah, "sarah").await.unwrap();

        assert_eq!(outcome, FollowOutcome::SelfFollowIgnored);
        assert_eq!(edge_count(&db).await, 0);
    }

    #[tokio::test]
    async fn test_unknown_target_is_not_found() {
        let db = setup_test_db().await;
        let service = FollowsService::new(db.clone());
        let sam = create_test_user(&db, "sam").await;

        let follow = service.follow(&sam, "nobody").await;
        let unfollow = service.unfollow(&sam, "nobody").await;

        assert!(matches!(follow, Err(FollowsServiceError::UserNotFound)));
        assert!(matches!(unfollow, Err(FollowsServiceError::UserNotFound)));
    }

    #[tokio::test]
    async fn test_follower_and_following_counts() {
        let db = setup_test_db().await;
        let service = FollowsService::new(db.clone());
        let sarah = create_test_user(&db, "sarah").await;
        let sam = create_test_user(&db, "sam").await;
        let scott = create_test_user(&db, "scott").await;

        service.follow(&sam, "sarah").await.unwrap();
        service.follow(&scott, "sarah").await.unwrap();
        service.follow(&sam, "scott").await.unwrap();

        assert_eq!(service.follower_count(sarah.id).await.unwrap(), 2);
        assert_eq!(service.following_count(sam.id).await.unwrap(), 2);
        assert_eq!(service.following_count(sarah.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_follows_converge_on_one_edge() {
        let (db, path) = setup_file_test_db("follow-race").await;
        let service = FollowsService::new(db.clone());
        let sarah = create_test_user(&db, "sarah").await;
        let sam = create_test_user(&db, "sam").await;

        let (first, second) = tokio::join!(
            service.follow(&sam, "sarah"),
            service.follow(&sam, "sarah"),
        );
        let mut outcomes = [first.unwrap(), second.unwrap()];
        outcomes.sort_by_key(|outcome| *outcome != FollowOutcome::Created);

        assert_eq!(
            outcomes,
            [FollowOutcome::Created, FollowOutcome::AlreadyFollowing]
        );
        assert_eq!(edge_count(&db).await, 1);
        assert!(service.is_following(sam.id, sarah.id).await.unwrap());

        db.close().await.unwrap();
        let _ = std::fs::remove_file(path);
    }
}
