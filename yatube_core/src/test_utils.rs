use chrono::{Duration, Utc};
use sea_orm_migration::MigratorTrait;

use crate::entity::prelude::*;
use crate::ids::{GroupId, PostId, UserId};
use crate::models::migrator::Migrator;

/// Fresh in-memory SQLite database with every migration applied.
/// Each call creates an isolated database instance.
pub async fn setup_test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory database");

    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    db
}

/// Migrated SQLite database in a fresh file, for tests that need more than
/// one pooled connection. Returns the path so the caller can remove it.
pub async fn setup_file_test_db(name: &str) -> (DatabaseConnection, std::path::PathBuf) {
    let path = std::env::temp_dir().join(format!("yatube-{name}-{}.db", uuid::Uuid::now_v7()));
    let db = Database::connect(format!("sqlite://{}?mode=rwc", path.display()))
        .await
        .expect("Failed to create file database");

    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    (db, path)
}

pub async fn create_test_user(db: &DatabaseConnection, username: &str) -> UserModel {
    let user = UserActiveModel {
        id: Set(UserId::new()),
        username: Set(username.to_string()),
        date_joined: Set(Utc::now()),
    };
    User::insert(user).exec_with_returning(db).await.unwrap()
}

pub async fn create_test_group(db: &DatabaseConnection, title: &str, slug: &str) -> GroupModel {
    let group = GroupActiveModel {
        id: Set(GroupId::new()),
        title: Set(title.to_string()),
        slug: Set(slug.to_string()),
        description: Set(String::new()),
    };
    Group::insert(group).exec_with_returning(db).await.unwrap()
}

/// Inserts a post directly, `minutes_ago` in the past, bypassing form checks.
pub async fn create_test_post(
    db: &DatabaseConnection,
    author: &UserModel,
    group: Option<&GroupModel>,
    text: &str,
    minutes_ago: i64,
) -> PostModel {
    let post = PostActiveModel {
        id: Set(PostId::new()),
        author_id: Set(author.id),
        group_id: Set(group.map(|g| g.id)),
        text: Set(text.to_string()),
        image: Set(None),
        created_at: Set(Utc::now() - Duration::minutes(minutes_ago)),
    };
    Post::insert(post).exec_with_returning(db).await.unwrap()
}
