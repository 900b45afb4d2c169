pub mod feeds;
pub mod follows;
pub mod posts;

use axum::http::Uri;
use serde::Deserialize;
use yatube_core::{
    auth::{self, Actor},
    entity::prelude::UserModel,
    ids::PostId,
    service::feeds::PageRequest,
};

use crate::{error::AppError, AppState};

/// Every query pair in order. A repeated `page` never rejects the request;
/// the last value wins.
#[derive(Debug, Default, Deserialize)]
#[serde(transparent)]
pub struct PageQuery(Vec<(String, String)>);

impl PageQuery {
    pub fn request(&self) -> PageRequest {
        let page = self
            .0
            .iter()
            .rev()
            .find(|(key, _)| key == "page")
            .map(|(_, value)| value.as_str());
        PageRequest::from_query(page)
    }
}

/// Post ids in paths that are not ids are plain misses.
pub(crate) fn parse_post_id(raw: &str) -> Result<PostId, AppError> {
    raw.parse().map_err(|_| AppError::NotFound)
}

/// The signed-in user, or a redirect to login that returns to `uri`.
pub(crate) fn login_gate<'a>(
    state: &AppState,
    actor: &'a Actor,
    uri: &Uri,
) -> Result<&'a UserModel, AppError> {
    let next = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| uri.path());
    Ok(auth::require_login(actor, &state.core.config.login_url, next)?)
}

pub(crate) fn profile_url(username: &str) -> String {
    format!("/{username}/")
}

pub(crate) fn post_url(username: &str, post_id: PostId) -> String {
    format!("/{username}/{post_id}/")
}

#[cfg(test)]
mod tests {
    use axum::extract::Query;

    use super::*;

    fn request(query: &str) -> PageRequest {
        let uri: Uri = format!("/?{query}").parse().unwrap();
        let Query(query) = Query::<PageQuery>::try_from_uri(&uri).unwrap();
        query.request()
    }

    #[test]
    fn test_last_page_value_wins() {
        assert_eq!(request("page=1&page=2"), PageRequest::number(2));
        assert_eq!(request("page=1&page=x"), PageRequest::first());
    }

    #[test]
    fn test_missing_page_is_first() {
        assert_eq!(request("sort=new"), PageRequest::first());
        assert_eq!(request(""), PageRequest::first());
    }
}
