pub mod entity;
pub mod ids;
pub mod models;

use std::{sync::Arc, time::Duration};

use sea_orm::DatabaseConnection;

use crate::{
    cache::FeedCache,
    media::{FsMediaStore, MediaStore},
    service::{
        comments::CommentsService, feeds::FeedsService, follows::FollowsService,
        groups::GroupsService, posts::PostsService, users::UsersService,
    },
};

pub mod auth;
pub mod cache;
pub mod config;
pub mod error;
pub mod forms;
pub mod media;
pub mod service;

#[cfg(test)]
pub(crate) mod test_utils;

/// Main runtime handle for Yatube: config, store and every service.
#[derive(Clone)]
pub struct YatubeCore {
    pub config: config::YatubeConfig,
    pub db: DatabaseConnection,
    pub users: UsersService,
    pub groups: GroupsService,
    pub posts: PostsService,
    pub comments: CommentsService,
    pub follows: FollowsService,
    pub feeds: FeedsService,
    /// Rendered global feed pages. Evict after post writes.
    pub feed_cache: FeedCache,
}

impl YatubeCore {
    /// Opens the database, applies migrations and prepares the media root.
    pub async fn start(config: config::YatubeConfig) -> Result<Self, error::StartupError> {
        tokio::fs::create_dir_all(&config.media_root).await?;

        let db = models::open_or_create_db(&config).await?;
        models::migrate_up(&db).await?;

        let media = Arc::new(FsMediaStore::new(&config.media_root));

        tracing::info!(database = %config.database_path.display(), "yatube core started");
        Ok(Self::with_parts(config, db, media))
    }

    /// Wires services over an already migrated connection.
    pub fn with_parts(
        config: config::YatubeConfig,
        db: DatabaseConnection,
        media: Arc<dyn MediaStore>,
    ) -> Self {
        let feed_cache = FeedCache::new(Duration::from_secs(config.feed_cache_ttl_secs));

        Self {
            users: UsersService::new(db.clone()),
            groups: GroupsService::new(db.clone()),
            posts: PostsService::new(db.clone(), media),
            comments: CommentsService::new(db.clone()),
            follows: FollowsService::new(db.clone()),
            feeds: FeedsService::new(db.clone()),
            feed_cache,
            config,
            db,
        }
    }

    pub async fn shutdown(self) -> Result<(), sea_orm::DbErr> {
        self.db.close().await
    }
}

pub mod prelude {
    pub use super::auth;
    pub use super::cache;
    pub use super::config;
    pub use super::entity;
    pub use super::error;
    pub use super::forms;
    pub use super::ids;
    pub use super::media;
    pub use super::models;
    pub use super::service;
    pub use super::YatubeCore;
}
