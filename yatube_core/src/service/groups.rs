use sea_orm::DatabaseConnection;
use thiserror::Error;

use crate::{
    entity::prelude::*,
    forms::{clean_text, FormErrors},
    ids::GroupId,
};

#[derive(Debug, Error)]
pub enum GroupsServiceError {
    #[error("fatal database error")]
    DbError(#[from] DbErr),

    #[error("group not found")]
    GroupNotFound,

    #[error("{0}")]
    Validation(FormErrors),
}

pub const SLUG_TAKEN: &str = "A group with this slug already exists.";
pub const SLUG_INVALID: &str =
    "Enter a valid slug consisting of letters, numbers, underscores or hyphens.";

fn is_valid_slug(slug: &str) -> bool {
    slug.chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[derive(Clone)]
pub struct GroupsService {
    db: DatabaseConnection,
}

impl GroupsService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create a new group addressable by `slug`
    pub async fn create_group(
        &self,
        title: &str,
        slug: &str,
        description: &str,
    ) -> Result<GroupModel, GroupsServiceError> {
        let mut errors = FormErrors::new();
        let title = clean_text(title, "title", &mut errors);
        let slug = clean_text(slug, "slug", &mut errors);

        if let Some(slug) = &slug {
            if !is_valid_slug(slug) {
                errors.add("slug", SLUG_INVALID);
            } else if self.find_optional(slug).await?.is_some() {
                errors.add("slug", SLUG_TAKEN);
            }
        }
        errors.into_result().map_err(GroupsServiceError::Validation)?;

        let group = GroupActiveModel {
            id: Set(GroupId::new()),
            title: Set(title.unwrap_or_default()),
            slug: Set(slug.unwrap_or_default()),
            description: Set(description.trim().to_string()),
        };

        let group = Group::insert(group).exec_with_returning(&self.db).await?;
        tracing::info!(group_id = %group.id, slug = %group.slug, "group created");
        Ok(group)
    }

    /// Get a specific group by ID
    pub async fn get_group(&self, group_id: GroupId) -> Result<GroupModel, GroupsServiceError> {
        Group::find_by_id(group_id)
            .one(&self.db)
            .await?
            .ok_or(GroupsServiceError::GroupNotFound)
    }

    pub async fn find_by_slug(&self, slug: &str) -> Result<GroupModel, GroupsServiceError> {
        self.find_optional(slug)
            .await?
            .ok_or(GroupsServiceError::GroupNotFound)
    }

    /// All groups by title, for the group picker on the post form
    pub async fn list_groups(&self) -> Result<Vec<GroupModel>, GroupsServiceError> {
        let groups = Group::find()
            .order_by_asc(GroupColumn::Title)
            .all(&self.db)
            .await?;

        Ok(groups)
    }

    async fn find_optional(&self, slug: &str) -> Result<Option<GroupModel>, DbErr> {
        Group::find()
            .filter(GroupColumn::Slug.eq(slug))
            .one(&self.db)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::setup_test_db;

    #[tokio::test]
    async fn test_create_and_find_by_slug() {
        let service = GroupsService::new(setup_test_db().await);

        let group = service
            .create_group("Змея", "anaconda", "Snakes")
            .await
            .unwrap();

        let found = service.find_by_slug("anaconda").await.unwrap();
        assert_eq!(found, group);
        assert_eq!(service.get_group(group.id).await.unwrap().title, "Змея");
    }

    #[tokio::test]
    async fn test_unknown_slug_is_not_found() {
        let service = GroupsService::new(setup_test_db().await);

        let result = service.find_by_slug("python").await;
        assert!(matches!(result, Err(GroupsServiceError::GroupNotFound)));
    }

    #[tokio::test]
    async fn test_duplicate_slug_is_rejected() {
        let service = GroupsService::new(setup_test_db().await);
        service.create_group("One", "snakes", "").await.unwrap();

        match service.create_group("Two", "snakes", "").await {
            Err(GroupsServiceError::Validation(errors)) => {
                assert_eq!(errors.field("slug"), [SLUG_TAKEN.to_string()]);
            }
            other => panic!("Expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_slug_with_spaces_is_rejected() {
        let service = GroupsService::new(setup_test_db().await);

        let result = service.create_group("Cats", "big cats", "").await;
        assert!(matches!(result, Err(GroupsServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn test_list_groups_orders_by_title() {
        let service = GroupsService::new(setup_test_db().await);
        service.create_group("Vipers", "vipers", "").await.unwrap();
        service.create_group("Anacondas", "anacondas", "").await.unwrap();

        let titles: Vec<String> = service
            .list_groups()
            .await
            .unwrap()
            .into_iter()
            .map(|g| g.title)
            .collect();

        assert_eq!(titles, ["Anacondas", "Vipers"]);
    }
}
