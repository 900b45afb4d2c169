use axum::{
    extract::{Multipart, Path, State},
    http::Uri,
    response::{IntoResponse, Redirect, Response},
    Form, Json,
};
use yatube_core::{
    auth::{edit_access, Actor, EditAccess},
    entity::prelude::PostModel,
    forms::{CommentForm, FormErrors},
    ids::PostId,
    service::{comments::CommentsServiceError, feeds::FeedEntry, posts::PostsServiceError},
};

use super::{login_gate, parse_post_id, post_url};
use crate::{
    error::AppError,
    session::CurrentActor,
    upload::read_post_form,
    views::{CommentFormView, PostFormView, PostView},
    AppState,
};

pub async fn post_view(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path((username, post_id)): Path<(String, String)>,
) -> Result<Response, AppError> {
    let post_id = parse_post_id(&post_id)?;
    let view = post_context(&state, &actor, &username, post_id, CommentFormView::default()).await?;
    Ok(Json(view).into_response())
}

pub async fn new_post_form(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    uri: Uri,
) -> Result<Response, AppError> {
    login_gate(&state, &actor, &uri)?;

    let view = form_context(&state, None, String::new(), None, FormErrors::new()).await?;
    Ok(Json(view).into_response())
}

/// The body is only read once the caller is known to be signed in, so an
/// anonymous submission of any shape gets the login redirect.
pub async fn new_post(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    uri: Uri,
    multipart: Option<Multipart>,
) -> Result<Response, AppError> {
    let user = login_gate(&state, &actor, &uri)?;
    let form = read_post_form(require_multipart(multipart)?).await?;
    let (text, group) = (form.text.clone(), form.group.clone());

    match state.core.posts.create_post(user, form).await {
        Ok(_) => {
            state.core.feed_cache.invalidate_all();
            Ok(Redirect::to("/").into_response())
        }
        Err(PostsServiceError::Validation(errors)) => {
            tracing::warn!(username = %user.username, %errors, "post rejected");
            let view = form_context(&state, None, text, group, errors).await?;
            Ok(Json(view).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn post_edit_form(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path((username, post_id)): Path<(String, String)>,
) -> Result<Response, AppError> {
    let post = match editable_post(&state, &actor, &username, &post_id).await? {
        Ok(post) => post,
        Err(back) => return Ok(back.into_response()),
    };

    let text = post.text.clone();
    let group = post.group_id.map(|id| id.to_string());
    let view = form_context(&state, Some(post), text, group, FormErrors::new()).await?;
    Ok(Json(view).into_response())
}

pub async fn post_edit(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path((username, post_id)): Path<(String, String)>,
    multipart: Option<Multipart>,
) -> Result<Response, AppError> {
    let post = match editable_post(&state, &actor, &username, &post_id).await? {
        Ok(post) => post,
        Err(back) => return Ok(back.into_response()),
    };

    let form = read_post_form(require_multipart(multipart)?).await?;
    let (text, group) = (form.text.clone(), form.group.clone());

    match state.core.posts.update_post(post.clone(), form).await {
        Ok(updated) => {
            state.core.feed_cache.invalidate_all();
            Ok(Redirect::to(&post_url(&username, updated.id)).into_response())
        }
        Err(PostsServiceError::Validation(errors)) => {
            tracing::warn!(post_id = %post.id, %errors, "edit rejected");
            let view = form_context(&state, Some(post), text, group, errors).await?;
            Ok(Json(view).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn add_comment(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    uri: Uri,
    Path((username, post_id)): Path<(String, String)>,
    form: Option<Form<CommentForm>>,
) -> Result<Response, AppError> {
    let user = login_gate(&state, &actor, &uri)?;
    let post_id = parse_post_id(&post_id)?;
    let post = state.core.posts.find_post(&username, post_id).await?;
    let Form(form) = form.ok_or_else(|| AppError::BadRequest("expected a form body".into()))?;

    match state.core.comments.add_comment(user, &post, &form).await {
        Ok(_) => Ok(Redirect::to(&post_url(&username, post.id)).into_response()),
        Err(CommentsServiceError::Validation(errors)) => {
            tracing::warn!(%post_id, %errors, "comment rejected");
            let form = CommentFormView {
                text: form.text,
                errors,
            };
            let view = post_context(&state, &actor, &username, post_id, form).await?;
            Ok(Json(view).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// Loads the post and checks the actor may edit it. Anyone else is sent
/// back to the read view.
async fn editable_post(
    state: &AppState,
    actor: &Actor,
    username: &str,
    raw_post_id: &str,
) -> Result<Result<PostModel, Redirect>, AppError> {
    let post_id = parse_post_id(raw_post_id)?;
    let post = state.core.posts.find_post(username, post_id).await?;

    match edit_access(actor, &post) {
        EditAccess::Granted => Ok(Ok(post)),
        EditAccess::ReadOnly => Ok(Err(Redirect::to(&post_url(username, post.id)))),
    }
}

fn require_multipart(multipart: Option<Multipart>) -> Result<Multipart, AppError> {
    multipart.ok_or_else(|| AppError::BadRequest("expected a multipart form".into()))
}

async fn post_context(
    state: &AppState,
    actor: &Actor,
    username: &str,
    post_id: PostId,
    form: CommentFormView,
) -> Result<PostView, AppError> {
    let core = &state.core;

    let post = core.posts.find_post(username, post_id).await?;
    let author = core.users.find_by_username(username).await?;
    let group = match post.group_id {
        Some(group_id) => Some(core.groups.get_group(group_id).await?),
        None => None,
    };

    let can_edit = edit_access(actor, &post) == EditAccess::Granted;
    let posts_count = core.posts.count_posts_by_author(author.id).await?;
    let comments = core.comments.list_comments(post.id).await?;

    Ok(PostView {
        entry: FeedEntry {
            post,
            author,
            group,
        },
        posts_count,
        comments,
        form,
        can_edit,
    })
}

async fn form_context(
    state: &AppState,
    post: Option<PostModel>,
    text: String,
    group: Option<String>,
    errors: FormErrors,
) -> Result<PostFormView, AppError> {
    Ok(PostFormView {
        is_edit: post.is_some(),
        groups: state.core.groups.list_groups().await?,
        text,
        group,
        errors,
        post,
    })
}
