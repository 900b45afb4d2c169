use axum::{
    extract::{Path, Query, RawQuery, State},
    http::{header, Uri},
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use yatube_core::{
    auth::Actor,
    service::feeds::{FeedScope, FeedSubject},
};

use super::{login_gate, PageQuery};
use crate::{error::AppError, session::CurrentActor, views::ProfileView, AppState};

/// Global feed. Rendered pages are cached per raw query string.
pub async fn index(
    State(state): State<AppState>,
    RawQuery(raw_query): RawQuery,
    Query(query): Query<PageQuery>,
) -> Result<Response, AppError> {
    let cache = &state.core.feed_cache;

    let rendered = match cache.get(raw_query.as_deref()).await {
        Some(rendered) => rendered,
        None => {
            let feed = state
                .core
                .feeds
                .list_feed(FeedScope::Global, query.request())
                .await?;
            let rendered = Bytes::from(serde_json::to_vec(&feed)?);
            cache.insert(raw_query.as_deref(), rendered.clone()).await;
            rendered
        }
    };

    Ok(([(header::CONTENT_TYPE, "application/json")], rendered).into_response())
}

pub async fn group_posts(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Response, AppError> {
    let feed = state
        .core
        .feeds
        .list_feed(FeedScope::ByGroup(slug), query.request())
        .await?;

    Ok(Json(feed).into_response())
}

pub async fn profile(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(username): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Response, AppError> {
    let feed = state
        .core
        .feeds
        .list_feed(FeedScope::ByAuthor(username), query.request())
        .await?;

    let FeedSubject::Author(author) = feed.subject else {
        return Err(AppError::internal("author feed resolved to another subject"));
    };

    let follows = &state.core.follows;
    let following = match &actor {
        Actor::User(viewer) => follows.is_following(viewer.id, author.id).await?,
        Actor::Anonymous => false,
    };

    let view = ProfileView {
        posts_count: feed.page.total,
        follower_count: follows.follower_count(author.id).await?,
        following_count: follows.following_count(author.id).await?,
        following,
        page: feed.page,
        author,
    };

    Ok(Json(view).into_response())
}

/// Posts by every author the viewer follows.
pub async fn follow_index(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    uri: Uri,
    Query(query): Query<PageQuery>,
) -> Result<Response, AppError> {
    let user = login_gate(&state, &actor, &uri)?;

    let feed = state
        .core
        .feeds
        .list_feed(FeedScope::ByFollowing(user.id), query.request())
        .await?;

    Ok(Json(feed).into_response())
}
