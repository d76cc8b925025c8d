// handlers/public/mod.rs - Tier 1: identity optional
//
// Catalog reads, token acquisition and anonymous counters. Every handler
// receives a `MaybeUser`; an invalid token is treated as anonymous.

pub mod auth;
pub mod creator;
pub mod music;
pub mod series;
pub mod users;
pub mod videos;

use axum::{
    routing::{get, post},
    Router,
};

use crate::app::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/videos", get(videos::list))
        .route("/api/videos/categories", get(videos::categories))
        .route("/api/videos/trending", get(videos::trending))
        .route("/api/videos/:id", get(videos::show))
        .route("/api/videos/:id/seo", get(videos::seo))
        .route("/api/videos/:id/view", post(videos::view))
        .route("/api/videos/:id/comments", get(videos::comments))
        .route("/api/comments/:id", get(videos::comments))
        .route("/api/series", get(series::list))
        .route("/api/series/:id", get(series::show))
        .route("/api/music/songs", get(music::songs))
        .route("/api/music/genres", get(music::genres))
        .route("/api/music/playlists", get(music::playlists))
        .route("/api/music/songs/:id/play", post(music::play))
        .route("/api/users/:id/followers", get(users::followers))
        .route("/api/users/:id/following", get(users::following))
        .route("/api/creator/top", get(creator::top))
}
