// The login flow itself is external; it calls `sign_in` once the
// credentials check out. Every request then resolves to an `Actor`.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;
use yatube_core::{auth::Actor, entity::prelude::UserModel, ids::UserId};

use crate::{error::AppError, AppState};

pub const USER_ID_KEY: &str = "user_id";

/// The acting identity for this request.
pub struct CurrentActor(pub Actor);

#[async_trait]
impl FromRequestParts<AppState> for CurrentActor {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|(_, reason)| AppError::internal(reason))?;

        let Some(user_id) = session.get::<UserId>(USER_ID_KEY).await? else {
            return Ok(CurrentActor(Actor::Anonymous));
        };

        match state.core.users.get_user(user_id).await? {
            Some(user) => Ok(CurrentActor(Actor::User(user))),
            None => {
                tracing::debug!(%user_id, "session points at a deleted user");
                session.remove::<UserId>(USER_ID_KEY).await?;
                Ok(CurrentActor(Actor::Anonymous))
            }
        }
    }
}

/// Binds `user` to the session under a fresh session id.
pub async fn sign_in(session: &Session, user: &UserModel) -> Result<(), AppError> {
    session.cycle_id().await?;
    session.insert(USER_ID_KEY, user.id).await?;
    tracing::info!(username = %user.username, "signed in");
    Ok(())
}

pub async fn sign_out(session: &Session) -> Result<(), AppError> {
    session.flush().await?;
    Ok(())
}
