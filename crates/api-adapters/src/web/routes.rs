use axum::{
    middleware::from_fn_with_state,
    routing::{delete, get, post},
    Router,
};

use super::handlers::{accounts, posts, system};
use super::middleware::{cors_policy, panic_recovery, slide_session, standard_middleware};
use super::AppState;

/// The full HTTP surface: JSON API under `/api`, plus logout, metrics and
/// health at the root.
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/register", post(accounts::register))
        .route("/login", post(accounts::login))
        .route("/posts", get(posts::list_posts).post(posts::create_post))
        .route("/posts/{category}", get(posts::list_category))
        .route(
            "/post/{id}",
            get(posts::get_post).post(posts::add_comment).delete(posts::delete_post),
        )
        .route("/post/{id}/upvote", get(posts::upvote))
        .route("/post/{id}/downvote", get(posts::downvote))
        .route("/post/{id}/unvote", get(posts::unvote))
        .route("/post/{id}/{comment_id}", delete(posts::delete_comment))
        .route("/user/{username}", get(posts::list_user_posts));

    Router::new()
        .nest("/api", api)
        .route("/logout", get(accounts::logout).post(accounts::logout))
        .route("/metrics", get(system::metrics))
        .route("/health", get(system::health))
        .layer(from_fn_with_state(state.clone(), slide_session))
        .layer(cors_policy())
        .layer(panic_recovery())
        .layer(standard_middleware())
        .with_state(state)
}
