// Pure checks over the acting identity. Handlers run these before calling a
// mutating service; the services themselves trust their `author` arguments.

use serde::Serialize;
use thiserror::Error;

use crate::entity::prelude::{PostModel, UserModel};

/// Who is making the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "user", rename_all = "snake_case")]
pub enum Actor {
    Anonymous,
    User(UserModel),
}

impl Actor {
    pub fn user(&self) -> Option<&UserModel> {
        match self {
            Actor::Anonymous => None,
            Actor::User(user) => Some(user),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user().is_some()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    /// Carries the login URL the caller should be sent to.
    #[error("login required")]
    LoginRequired { redirect_to: String },
}

/// `login_url?next=<next>` with `next` percent-encoded.
pub fn login_redirect(login_url: &str, next: &str) -> String {
    format!("{login_url}?next={}", urlencoding::encode(next))
}

/// Returns the signed-in user, or where to send an anonymous caller so that
/// a successful login comes back to `next`.
pub fn require_login<'a>(
    actor: &'a Actor,
    login_url: &str,
    next: &str,
) -> Result<&'a UserModel, AuthError> {
    actor.user().ok_or_else(|| AuthError::LoginRequired {
        redirect_to: login_redirect(login_url, next),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditAccess {
    Granted,
    /// Not the author. The caller goes back to the post, no error shown.
    ReadOnly,
}

pub fn edit_access(actor: &Actor, post: &PostModel) -> EditAccess {
    match actor.user() {
        Some(user) if user.id == post.author_id => EditAccess::Granted,
        _ => EditAccess::ReadOnly,
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::ids::{PostId, UserId};

    fn user(name: &str) -> UserModel {
        UserModel {
            id: UserId::new(),
            username: name.to_string(),
            date_joined: Utc::now(),
        }
    }

    fn post_by(author: &UserModel) -> PostModel {
        PostModel {
            id: PostId::new(),
            author_id: author.id,
            group_id: None,
            text: "crazy".to_string(),
            image: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_anonymous_is_sent_to_login_with_next() {
        let err = require_login(&Actor::Anonymous, "/auth/login/", "/new/").unwrap_err();
        assert_eq!(
            err,
            AuthError::LoginRequired {
                redirect_to: "/auth/login/?next=%2Fnew%2F".to_string()
            }
        );
    }

    #[test]
    fn test_signed_in_user_passes() {
        let sarah = user("sarah");
        let actor = Actor::User(sarah.clone());
        assert_eq!(require_login(&actor, "/auth/login/", "/new/").unwrap(), &sarah);
    }

    #[test]
    fn test_only_author_may_edit() {
        let sarah = user("sarah");
        let sam = user("sam");
        let post = post_by(&sarah);

        assert_eq!(edit_access(&Actor::User(sarah), &post), EditAccess::Granted);
        assert_eq!(edit_access(&Actor::User(sam), &post), EditAccess::ReadOnly);
        assert_eq!(edit_access(&Actor::Anonymous, &post), EditAccess::ReadOnly);
    }
}
