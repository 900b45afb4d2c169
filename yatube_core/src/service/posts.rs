use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;
use image::ImageFormat;
use sea_orm::DatabaseConnection;
use thiserror::Error;

use crate::{
    entity::prelude::*,
    forms::{clean_text, FormErrors, PostForm, INVALID_CHOICE, INVALID_IMAGE},
    ids::{GroupId, PostId, UserId},
    media::{self, MediaError, MediaStore},
};

#[derive(Debug, Error)]
pub enum PostsServiceError {
    #[error("fatal database error")]
    DbError(#[from] DbErr),

    #[error("media storage error")]
    Media(#[from] MediaError),

    #[error("post not found")]
    PostNotFound,

    #[error("{0}")]
    Validation(FormErrors),
}

/// A `PostForm` that passed every check.
struct CleanPost {
    text: String,
    group_id: Option<GroupId>,
    image: Option<(Bytes, ImageFormat)>,
}

#[derive(Clone)]
pub struct PostsService {
    db: DatabaseConnection,
    media: Arc<dyn MediaStore>,
}

impl PostsService {
    pub fn new(db: DatabaseConnection, media: Arc<dyn MediaStore>) -> Self {
        Self { db, media }
    }

    /// Create a new post authored by `author`.
    ///
    /// The row insert and the image write share one transaction: if storing
    /// the image fails, the post is rolled back, and if the commit fails, the
    /// image is removed.
    pub async fn create_post(
        &self,
        author: &UserModel,
        form: PostForm,
    ) -> Result<PostModel, PostsServiceError> {
        let clean = self.clean(form).await?;

        let txn = self.db.begin().await?;

        let post_id = PostId::new();
        let image = clean
            .image
            .map(|(data, format)| (media::post_image_name(post_id, format), data));

        let post = PostActiveModel {
            id: Set(post_id),
            author_id: Set(author.id),
            group_id: Set(clean.group_id),
            text: Set(clean.text),
            image: Set(image.as_ref().map(|(name, _)| name.clone())),
            created_at: Set(Utc::now()),
        };
        let created = Post::insert(post).exec_with_returning(&txn).await?;

        let stored = match image {
            Some((name, data)) => Some(self.media.save(&name, data).await?),
            None => None,
        };

        self.settle(txn.commit().await, stored.as_deref()).await?;

        tracing::info!(post_id = %created.id, author = %author.username, "post created");
        Ok(created)
    }

    /// Get a specific post by ID
    pub async fn get_post(&self, post_id: PostId) -> Result<PostModel, PostsServiceError> {
        Post::find_by_id(post_id)
            .one(&self.db)
            .await?
            .ok_or(PostsServiceError::PostNotFound)
    }

    /// Get a post by ID, but only if `username` wrote it
    pub async fn find_post(
        &self,
        username: &str,
        post_id: PostId,
    ) -> Result<PostModel, PostsServiceError> {
        Post::find_by_id(post_id)
            .inner_join(User)
            .filter(UserColumn::Username.eq(username))
            .one(&self.db)
            .await?
            .ok_or(PostsServiceError::PostNotFound)
    }

    /// Replace text and group. A new image replaces the old one; no image keeps it.
    ///
    /// The new image goes under a fresh name and the old file is only removed
    /// once the row points at the new one.
    ///
    /// Callers must check edit rights first, see [`crate::auth::edit_access`].
    pub async fn update_post(
        &self,
        post: PostModel,
        form: PostForm,
    ) -> Result<PostModel, PostsServiceError> {
        let clean = self.clean(form).await?;

        let txn = self.db.begin().await?;

        let post_id = post.id;
        let previous_image = post.image.clone();
        let mut post_active: PostActiveModel = post.into();
        post_active.text = Set(clean.text);
        post_active.group_id = Set(clean.group_id);

        let image = clean
            .image
            .map(|(data, format)| (media::post_image_name(post_id, format), data));
        if let Some((name, _)) = &image {
            post_active.image = Set(Some(name.clone()));
        }

        let updated = post_active.update(&txn).await?;

        let stored = match image {
            Some((name, data)) => Some(self.media.save(&name, data).await?),
            None => None,
        };

        self.settle(txn.commit().await, stored.as_deref()).await?;

        if let (Some(_), Some(old)) = (&stored, &previous_image) {
            self.remove_media(old).await;
        }

        tracing::info!(post_id = %updated.id, "post updated");
        Ok(updated)
    }

    /// Count total posts by a user
    pub async fn count_posts_by_author(&self, author_id: UserId) -> Result<u64, PostsServiceError> {
        let count = Post::find()
            .filter(PostColumn::AuthorId.eq(author_id))
            .count(&self.db)
            .await?;

        Ok(count)
    }

    /// Passes a commit result through. A failed commit also drops the image
    /// stored alongside it.
    async fn settle(
        &self,
        committed: Result<(), DbErr>,
        stored: Option<&str>,
    ) -> Result<(), PostsServiceError> {
        if let Err(err) = committed {
            if let Some(name) = stored {
                self.remove_media(name).await;
            }
            return Err(err.into());
        }
        Ok(())
    }

    async fn remove_media(&self, name: &str) {
        if let Err(err) = self.media.delete(name).await {
            tracing::warn!(name, error = %err, "failed to remove media file");
        }
    }

    /// Runs every field check and reports all failures together.
    async fn clean(&self, form: PostForm) -> Result<CleanPost, PostsServiceError> {
        let mut errors = FormErrors::new();

        let text = clean_text(&form.text, "text", &mut errors);

        let group_id = match form.group.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => match self.resolve_group(raw).await? {
                Some(group_id) => Some(group_id),
                None => {
                    errors.add("group", INVALID_CHOICE);
                    None
                }
            },
        };

        let image = match form.image {
            Some(upload) => match media::validate_image(&upload.data) {
                Ok(format) => Some((upload.data, format)),
                Err(_) => {
                    tracing::warn!(file_name = %upload.file_name, "rejected non-image upload");
                    errors.add("image", INVALID_IMAGE);
                    None
                }
            },
            None => None,
        };

        errors.into_result().map_err(PostsServiceError::Validation)?;

        Ok(CleanPost {
            text: text.unwrap_or_default(),
            group_id,
            image,
        })
    }

    async fn resolve_group(&self, raw: &str) -> Result<Option<GroupId>, DbErr> {
        let Ok(group_id) = raw.parse::<GroupId>() else {
            return Ok(None);
        };
        let group = Group::find_by_id(group_id).one(&self.db).await?;
        Ok(group.map(|g| g.id))
    }
}
