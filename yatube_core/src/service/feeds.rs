use std::collections::HashMap;

use sea_orm::{sea_query::Query, DatabaseConnection, Select};
use serde::Serialize;
use thiserror::Error;

use crate::{
    entity::prelude::*,
    ids::{GroupId, UserId},
};

/// Posts per page, for every feed.
pub const PAGE_SIZE: u64 = 10;

#[derive(Debug, Error)]
pub enum FeedsServiceError {
    #[error("fatal database error")]
    DbError(#[from] DbErr),

    #[error("group not found")]
    GroupNotFound,

    #[error("user not found")]
    UserNotFound,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedScope {
    Global,
    ByGroup(String),
    ByAuthor(String),
    /// Posts by everyone this user follows.
    ByFollowing(UserId),
}

/// What a feed was resolved against, for page headings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "entity", rename_all = "snake_case")]
pub enum FeedSubject {
    Global,
    Group(GroupModel),
    Author(UserModel),
    Following,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedEntry {
    pub post: PostModel,
    pub author: UserModel,
    pub group: Option<GroupModel>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based page number actually served.
    pub number: u64,
    pub num_pages: u64,
    pub total: u64,
    pub has_next: bool,
    pub has_prev: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Feed {
    pub subject: FeedSubject,
    pub page: Page<FeedEntry>,
}

/// Requested page number, parsed leniently from a query string value.
///
/// Missing or non-numeric input means the first page; a number outside the
/// available range (zero and negatives included) means the last page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PageRequest(Option<i64>);

impl PageRequest {
    pub fn first() -> Self {
        Self(None)
    }

    pub fn number(number: i64) -> Self {
        Self(Some(number))
    }

    pub fn from_query(raw: Option<&str>) -> Self {
        Self(raw.and_then(|raw| raw.trim().parse().ok()))
    }

    /// Picks the page to serve out of `1..=num_pages`.
    pub fn resolve(self, num_pages: u64) -> u64 {
        let num_pages = num_pages.max(1);
        match self.0 {
            None => 1,
            Some(n) if n >= 1 && (n as u64) <= num_pages => n as u64,
            Some(_) => num_pages,
        }
    }
}

#[derive(Clone)]
pub struct FeedsService {
    db: DatabaseConnection,
}

impl FeedsService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Build one page of the feed for `scope`. Read-only.
    pub async fn list_feed(
        &self,
        scope: FeedScope,
        page: PageRequest,
    ) -> Result<Feed, FeedsServiceError> {
        let (subject, select) = match scope {
            FeedScope::Global => (FeedSubject::Global, Post::find()),
            FeedScope::ByGroup(slug) => {
                let group = Group::find()
                    .filter(GroupColumn::Slug.eq(slug.as_str()))
                    .one(&self.db)
                    .await?
                    .ok_or(FeedsServiceError::GroupNotFound)?;
                let select = Post::find().filter(PostColumn::GroupId.eq(group.id));
                (FeedSubject::Group(group), select)
            }
            FeedScope::ByAuthor(username) => {
                let author = User::find()
                    .filter(UserColumn::Username.eq(username.as_str()))
                    .one(&self.db)
                    .await?
                    .ok_or(FeedsServiceError::UserNotFound)?;
                let select = Post::find().filter(PostColumn::AuthorId.eq(author.id));
                (FeedSubject::Author(author), select)
            }
            FeedScope::ByFollowing(user_id) => {
                let followed = Query::select()
                    .column(FollowColumn::AuthorId)
                    .from(Follow)
                    .and_where(FollowColumn::FollowerId.eq(user_id))
                    .to_owned();
                let select = Post::find().filter(PostColumn::AuthorId.in_subquery(followed));
                (FeedSubject::Following, select)
            }
        };

        let page = self.paginate(select, page).await?;
        Ok(Feed { subject, page })
    }

    async fn paginate(
        &self,
        select: Select<Post>,
        page: PageRequest,
    ) -> Result<Page<FeedEntry>, DbErr> {
        let paginator = select
            .order_by_desc(PostColumn::CreatedAt)
            .order_by_desc(PostColumn::Id)
            .paginate(&self.db, PAGE_SIZE);

        let ItemsAndPagesNumber {
            number_of_items,
            number_of_pages,
        } = paginator.num_items_and_pages().await?;

        let num_pages = number_of_pages.max(1);
        let number = page.resolve(num_pages);
        let posts = paginator.fetch_page(number - 1).await?;

        Ok(Page {
            items: self.attach_authors_and_groups(posts).await?,
            number,
            num_pages,
            total: number_of_items,
            has_next: number < num_pages,
            has_prev: number > 1,
        })
    }

    /// Two batched lookups instead of one per post.
    async fn attach_authors_and_groups(
        &self,
        posts: Vec<PostModel>,
    ) -> Result<Vec<FeedEntry>, DbErr> {
        if posts.is_empty() {
            return Ok(Vec::new());
        }

        let author_ids: Vec<UserId> = posts.iter().map(|p| p.author_id).collect();
        let authors: HashMap<UserId, UserModel> = User::find()
            .filter(UserColumn::Id.is_in(author_ids))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();

        let group_ids: Vec<GroupId> = posts.iter().filter_map(|p| p.group_id).collect();
        let groups: HashMap<GroupId, GroupModel> = if group_ids.is_empty() {
            HashMap::new()
        } else {
            Group::find()
                .filter(GroupColumn::Id.is_in(group_ids))
                .all(&self.db)
                .await?
                .into_iter()
                .map(|g| (g.id, g))
                .collect()
        };

        let entries = posts
            .into_iter()
            .filter_map(|post| {
                let author = authors.get(&post.author_id)?.clone();
                let group = post.group_id.and_then(|id| groups.get(&id).cloned());
                Some(FeedEntry {
                    post,
                    author,
                    group,
                })
            })
            .collect();

        Ok(entries)
    }
}
