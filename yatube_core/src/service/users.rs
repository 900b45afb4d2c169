use chrono::Utc;
use sea_orm::DatabaseConnection;
use thiserror::Error;

use crate::{
    entity::prelude::*,
    forms::{clean_text, FormErrors},
    ids::UserId,
};

#[derive(Debug, Error)]
pub enum UsersServiceError {
    #[error("fatal database error")]
    DbError(#[from] DbErr),

    #[error("user not found")]
    UserNotFound,

    #[error("{0}")]
    Validation(FormErrors),
}

pub const USERNAME_TAKEN: &str = "A user with that username already exists.";

#[derive(Clone)]
pub struct UsersService {
    db: DatabaseConnection,
}

impl UsersService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Register a new user under a unique username
    pub async fn create_user(&self, username: &str) -> Result<UserModel, UsersServiceError> {
        let mut errors = FormErrors::new();
        let username = clean_text(username, "username", &mut errors);

        if let Some(username) = &username {
            if self.find_optional(username).await?.is_some() {
                errors.add("username", USERNAME_TAKEN);
            }
        }
        errors.into_result().map_err(UsersServiceError::Validation)?;

        let user = UserActiveModel {
            id: Set(UserId::new()),
            username: Set(username.unwrap_or_default()),
            date_joined: Set(Utc::now()),
        };

        let user = User::insert(user).exec_with_returning(&self.db).await?;
        tracing::info!(user_id = %user.id, username = %user.username, "user created");
        Ok(user)
    }

    pub async fn get_user(&self, user_id: UserId) -> Result<Option<UserModel>, UsersServiceError> {
        Ok(User::find_by_id(user_id).one(&self.db).await?)
    }

    pub async fn find_by_username(&self, username: &str) -> Result<UserModel, UsersServiceError> {
        self.find_optional(username)
            .await?
            .ok_or(UsersServiceError::UserNotFound)
    }

    async fn find_optional(&self, username: &str) -> Result<Option<UserModel>, DbErr> {
        User::find()
            .filter(UserColumn::Username.eq(username))
            .one(&self.db)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{forms::REQUIRED, test_utils::setup_test_db};

    #[tokio::test]
    async fn test_create_and_find_user() {
        let service = UsersService::new(setup_test_db().await);

        let sarah = service.create_user("sarah").await.unwrap();
        let found = service.find_by_username("sarah").await.unwrap();

        assert_eq!(found, sarah);
        assert_eq!(service.get_user(sarah.id).await.unwrap(), Some(sarah));
    }

    #[tokio::test]
    async fn test_unknown_username_is_not_found() {
        let service = UsersService::new(setup_test_db().await);

        let result = service.find_by_username("nobody").await;
        assert!(matches!(result, Err(UsersServiceError::UserNotFound)));
    }

    #[tokio::test]
    async fn test_duplicate_username_is_rejected() {
        let service = UsersService::new(setup_test_db().await);
        service.create_user("sarah").await.unwrap();

        match service.create_user("sarah").await {
            Err(UsersServiceError::Validation(errors)) => {
                assert_eq!(errors.field("username"), [USERNAME_TAKEN.to_string()]);
            }
            other => panic!("Expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_blank_username_is_rejected() {
        let service = UsersService::new(setup_test_db().await);

        match service.create_user("  ").await {
            Err(UsersServiceError::Validation(errors)) => {
                assert_eq!(errors.field("username"), [REQUIRED.to_string()]);
            }
            other => panic!("Expected validation error, got {other:?}"),
        }
    }
}
