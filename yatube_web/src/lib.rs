// Handlers answer with JSON view contexts; page templates live outside this
// crate. Identity comes from the session cookie, see `session`.

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{catch_panic::CatchPanicLayer, services::ServeDir, trace::TraceLayer};
use tower_sessions::{cookie::SameSite, MemoryStore, SessionManagerLayer};
use yatube_core::YatubeCore;

pub mod error;
pub mod handlers;
pub mod session;
pub mod upload;
pub mod views;

pub const SESSION_COOKIE_NAME: &str = "yatube-session";

/// Largest request body accepted, image uploads included.
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub core: Arc<YatubeCore>,
}

impl AppState {
    pub fn new(core: YatubeCore) -> Self {
        Self {
            core: Arc::new(core),
        }
    }
}

/// Every public route, without state or middleware.
pub fn routes() -> Router<AppState> {
    use handlers::{feeds, follows, posts};

    Router::new()
        .route("/", get(feeds::index))
        .route("/new/", get(posts::new_post_form).post(posts::new_post))
        .route("/follow/", get(feeds::follow_index))
        .route("/group/:slug/", get(feeds::group_posts))
        .route("/:username/", get(feeds::profile))
        .route("/:username/follow/", get(follows::profile_follow))
        .route("/:username/unfollow/", get(follows::profile_unfollow))
        .route("/:username/:post_id/", get(posts::post_view))
        .route(
            "/:username/:post_id/edit/",
            get(posts::post_edit_form).post(posts::post_edit),
        )
        .route("/:username/:post_id/comment/", post(posts::add_comment))
        .fallback(error::not_found)
}

/// Wraps `router` with media serving, sessions, tracing and error pages.
pub fn layered(router: Router<AppState>, state: AppState) -> Router {
    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_name(SESSION_COOKIE_NAME)
        .with_secure(state.core.config.secure_cookies)
        .with_same_site(SameSite::Lax)
        .with_http_only(true);

    let media = ServeDir::new(&state.core.config.media_root);

    router
        .nest_service("/media", media)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CatchPanicLayer::new())
        .layer(middleware::from_fn(error::error_pages))
        .layer(TraceLayer::new_for_http())
        .layer(session_layer)
        .with_state(state)
}

pub fn app(state: AppState) -> Router {
    layered(routes(), state)
}
