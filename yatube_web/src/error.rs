use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};
use yatube_core::{
    auth::AuthError,
    service::{
        comments::CommentsServiceError, feeds::FeedsServiceError, follows::FollowsServiceError,
        groups::GroupsServiceError, posts::PostsServiceError, users::UsersServiceError,
    },
};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("not found")]
    NotFound,

    /// Anonymous caller on a protected route; holds the login URL.
    #[error("login required")]
    LoginRequired(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("internal error: {0}")]
    Internal(#[source] BoxError),
}

impl AppError {
    pub fn internal(err: impl Into<BoxError>) -> Self {
        AppError::Internal(err.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::NotFound => StatusCode::NOT_FOUND.into_response(),
            AppError::LoginRequired(location) => Redirect::to(&location).into_response(),
            AppError::BadRequest(reason) => {
                warn!(%reason, "bad request");
                (StatusCode::BAD_REQUEST, Json(json!({ "error": reason }))).into_response()
            }
            AppError::Internal(err) => {
                error!(error = %err, "request failed");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::LoginRequired { redirect_to } => AppError::LoginRequired(redirect_to),
        }
    }
}

impl From<FeedsServiceError> for AppError {
    fn from(err: FeedsServiceError) -> Self {
        match err {
            FeedsServiceError::GroupNotFound | FeedsServiceError::UserNotFound => {
                AppError::NotFound
            }
            FeedsServiceError::DbError(e) => AppError::internal(e),
        }
    }
}

impl From<PostsServiceError> for AppError {
    fn from(err: PostsServiceError) -> Self {
        match err {
            PostsServiceError::PostNotFound => AppError::NotFound,
            PostsServiceError::Validation(errors) => AppError::BadRequest(errors.to_string()),
            PostsServiceError::DbError(e) => AppError::internal(e),
            PostsServiceError::Media(e) => AppError::internal(e),
        }
    }
}

impl From<CommentsServiceError> for AppError {
    fn from(err: CommentsServiceError) -> Self {
        match err {
            CommentsServiceError::Validation(errors) => AppError::BadRequest(errors.to_string()),
            CommentsServiceError::DbError(e) => AppError::internal(e),
        }
    }
}

impl From<FollowsServiceError> for AppError {
    fn from(err: FollowsServiceError) -> Self {
        match err {
            FollowsServiceError::UserNotFound => AppError::NotFound,
            FollowsServiceError::DbError(e) => AppError::internal(e),
        }
    }
}

impl From<UsersServiceError> for AppError {
    fn from(err: UsersServiceError) -> Self {
        match err {
            UsersServiceError::UserNotFound => AppError::NotFound,
            UsersServiceError::Validation(errors) => AppError::BadRequest(errors.to_string()),
            UsersServiceError::DbError(e) => AppError::internal(e),
        }
    }
}

impl From<GroupsServiceError> for AppError {
    fn from(err: GroupsServiceError) -> Self {
        match err {
            GroupsServiceError::GroupNotFound => AppError::NotFound,
            GroupsServiceError::Validation(errors) => AppError::BadRequest(errors.to_string()),
            GroupsServiceError::DbError(e) => AppError::internal(e),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::internal(err)
    }
}

impl From<tower_sessions::session::Error> for AppError {
    fn from(err: tower_sessions::session::Error) -> Self {
        AppError::internal(err)
    }
}

/// Router fallback. The body is filled in by [`error_pages`].
pub async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}

/// Replaces every 404 and 500 body with the public error page, so no
/// handler or panic detail reaches the client.
pub async fn error_pages(request: Request, next: Next) -> Response {
    let path = request.uri().path().to_owned();
    let response = next.run(request).await;

    match response.status() {
        StatusCode::NOT_FOUND => (
            StatusCode::NOT_FOUND,
            Json(json!({ "status": 404, "path": path })),
        )
            .into_response(),
        StatusCode::INTERNAL_SERVER_ERROR => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "status": 500, "detail": "Server error" })),
        )
            .into_response(),
        _ => response,
    }
}
