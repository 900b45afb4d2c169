use serde::Serialize;
use yatube_core::{
    entity::prelude::{GroupModel, PostModel, UserModel},
    forms::FormErrors,
    service::{
        comments::CommentEntry,
        feeds::{FeedEntry, Page},
    },
};

#[derive(Debug, Serialize)]
pub struct ProfileView {
    pub author: UserModel,
    pub page: Page<FeedEntry>,
    pub posts_count: u64,
    /// Whether the viewer follows `author`. Always false for anonymous viewers.
    pub following: bool,
    pub follower_count: u64,
    pub following_count: u64,
}

#[derive(Debug, Serialize)]
pub struct PostView {
    pub entry: FeedEntry,
    pub posts_count: u64,
    pub comments: Vec<CommentEntry>,
    pub form: CommentFormView,
    pub can_edit: bool,
}

#[derive(Debug, Default, Serialize)]
pub struct CommentFormView {
    pub text: String,
    pub errors: FormErrors,
}

/// Create and edit share one form page.
#[derive(Debug, Serialize)]
pub struct PostFormView {
    pub is_edit: bool,
    pub groups: Vec<GroupModel>,
    pub text: String,
    pub group: Option<String>,
    pub errors: FormErrors,
    pub post: Option<PostModel>,
}
