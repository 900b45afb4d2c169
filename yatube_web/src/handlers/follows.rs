use axum::{
    extract::{Path, State},
    http::Uri,
    response::Redirect,
};

use super::{login_gate, profile_url};
use crate::{error::AppError, session::CurrentActor, AppState};

pub async fn profile_follow(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    uri: Uri,
    Path(username): Path<String>,
) -> Result<Redirect, AppError> {
    let user = login_gate(&state, &actor, &uri)?;

    let outcome = state.core.follows.follow(user, &username).await?;
    tracing::debug!(?outcome, %username, "follow requested");

    Ok(Redirect::to(&profile_url(&username)))
}

pub async fn profile_unfollow(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    uri: Uri,
    Path(username): Path<String>,
) -> Result<Redirect, AppError> {
    let user = login_gate(&state, &actor, &uri)?;

    let outcome = state.core.follows.unfollow(user, &username).await?;
    tracing::debug!(?outcome, %username, "unfollow requested");

    Ok(Redirect::to(&profile_url(&username)))
}
