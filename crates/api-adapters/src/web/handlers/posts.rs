//! Post, comment and vote endpoints under `/api`.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use domains::{NewPostRequest, Post, VoteDirection};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::web::{ApiError, AppState, CurrentUser};

type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Deserialize)]
pub struct CommentForm {
    pub comment: String,
}

pub async fn list_posts(State(state): State<AppState>) -> ApiResult<Json<Vec<Post>>> {
    Ok(Json(state.posts.list().await?))
}

pub async fn create_post(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    payload: Result<Json<NewPostRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Post>)> {
    let Json(request) = payload?;
    let post = state.posts.create(request, &user).await?;
    state.metrics.posts_created.inc();
    Ok((StatusCode::CREATED, Json(post)))
}

pub async fn list_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> ApiResult<Json<Vec<Post>>> {
    Ok(Json(state.posts.list_by_category(&category).await?))
}

pub async fn list_user_posts(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> ApiResult<Json<Vec<Post>>> {
    Ok(Json(state.posts.list_by_user(&username).await?))
}

pub async fn get_post(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Post>> {
    Ok(Json(state.posts.get(&id).await?))
}

pub async fn add_comment(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    payload: Result<Json<CommentForm>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Post>)> {
    let Json(form) = payload?;
    let post = state.posts.add_comment(&id, &user, &form.comment).await?;
    state.metrics.comments_added.inc();
    Ok((StatusCode::CREATED, Json(post)))
}

pub async fn delete_comment(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((id, comment_id)): Path<(String, String)>,
) -> ApiResult<Json<Post>> {
    Ok(Json(state.posts.delete_comment(&id, &comment_id, &user).await?))
}

pub async fn upvote(state: State<AppState>, user: CurrentUser, id: Path<String>) -> ApiResult<Json<Post>> {
    vote(state, user, id, VoteDirection::Up).await
}

pub async fn downvote(state: State<AppState>, user: CurrentUser, id: Path<String>) -> ApiResult<Json<Post>> {
    vote(state, user, id, VoteDirection::Down).await
}

pub async fn unvote(state: State<AppState>, user: CurrentUser, id: Path<String>) -> ApiResult<Json<Post>> {
    vote(state, user, id, VoteDirection::Clear).await
}

async fn vote(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    direction: VoteDirection,
) -> ApiResult<Json<Post>> {
    let post = state.posts.vote(&id, &user, direction).await?;
    state.metrics.record_vote(direction.as_str());
    Ok(Json(post))
}

pub async fn delete_post(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    state.posts.delete(&id, &user).await?;
    Ok(Json(json!({ "message": "success" })))
}
