use chrono::Utc;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use thiserror::Error;

use crate::{
    entity::prelude::*,
    forms::{CommentForm, FormErrors},
    ids::{CommentId, PostId},
};

#[derive(Debug, Error)]
pub enum CommentsServiceError {
    #[error("fatal database error")]
    DbError(#[from] DbErr),

    #[error("{0}")]
    Validation(FormErrors),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentEntry {
    pub comment: CommentModel,
    pub author: UserModel,
}

#[derive(Clone)]
pub struct CommentsService {
    db: DatabaseConnection,
}

impl CommentsService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Attach a comment from `author` to `post`
    pub async fn add_comment(
        &self,
        author: &UserModel,
        post: &PostModel,
        form: &CommentForm,
    ) -> Result<CommentModel, CommentsServiceError> {
        let text = form.clean().map_err(CommentsServiceError::Validation)?;

        let comment = CommentActiveModel {
            id: Set(CommentId::new()),
            post_id: Set(post.id),
            author_id: Set(author.id),
            text: Set(text),
            created_at: Set(Utc::now()),
        };

        let comment = Comment::insert(comment).exec_with_returning(&self.db).await?;
        tracing::info!(
            comment_id = %comment.id,
            post_id = %post.id,
            author = %author.username,
            "comment added"
        );
        Ok(comment)
    }

    /// Comments on a post, oldest first (conversation order)
    pub async fn list_comments(
        &self,
        post_id: PostId,
    ) -> Result<Vec<CommentEntry>, CommentsServiceError> {
        let rows = Comment::find()
            .filter(CommentColumn::PostId.eq(post_id))
            .find_also_related(User)
            .order_by_asc(CommentColumn::CreatedAt)
            .order_by_asc(CommentColumn::Id)
            .all(&self.db)
            .await?;

        let comments = rows
            .into_iter()
            .filter_map(|(comment, author)| Some(CommentEntry { comment, author: author? }))
            .collect();

        Ok(comments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{forms::REQUIRED, test_utils::*};

    fn comment(text: &str) -> CommentForm {
        CommentForm {
            text: text.to_string(),
        }
    }

    #[tokio::test]
    async fn test_add_and_list_comments() {
        let db = setup_test_db().await;
        let service = CommentsService::new(db.clone());
        let sarah = create_test_user(&db, "sarah").await;
        let sam = create_test_user(&db, "sam").await;
        let post = create_test_post(&db, &sarah, None, "crazy", 0).await;

        service.add_comment(&sam, &post, &comment("first")).await.unwrap();
        service.add_comment(&sarah, &post, &comment("second")).await.unwrap();

        let comments = service.list_comments(post.id).await.unwrap();
        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0].comment.text, "first");
        assert_eq!(comments[0].author.username, "sam");
        assert_eq!(comments[1].comment.text, "second");
        assert_eq!(comments[1].author.username, "sarah");
    }

    #[tokio::test]
    async fn test_comments_are_scoped_to_their_post() {
        let db = setup_test_db().await;
        let service = CommentsService::new(db.clone());
        let sarah = create_test_user(&db, "sarah").await;
        let post1 = create_test_post(&db, &sarah, None, "one", 1).await;
        let post2 = create_test_post(&db, &sarah, None, "two", 0).await;

        service.add_comment(&sarah, &post1, &comment("on one")).await.unwrap();

        assert_eq!(service.list_comments(post1.id).await.unwrap().len(), 1);
        assert!(service.list_comments(post2.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_blank_comment_is_rejected() {
        let db = setup_test_db().await;
        let service = CommentsService::new(db.clone());
        let sarah = create_test_user(&db, "sarah").await;
        let post = create_test_post(&db, &sarah, None, "crazy", 0).await;

        match service.add_comment(&sarah, &post, &comment("  ")).await {
            Err(CommentsServiceError::Validation(errors)) => {
                assert_eq!(errors.field("text"), [REQUIRED.to_string()]);
            }
            other => panic!("Expected validation error, got {other:?}"),
        }
        assert!(service.list_comments(post.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_comment_on_missing_post_is_rejected_by_store() {
        let db = setup_test_db().await;
        let service = CommentsService::new(db.clone());
        let sarah = create_test_user(&db, "sarah").await;
        let mut post = create_test_post(&db, &sarah, None, "crazy", 0).await;
        post.id = PostId::new();

        let result = service.add_comment(&sarah, &post, &comment("hello?")).await;
        assert!(matches!(result, Err(CommentsServiceError::DbError(_))));
    }
}
