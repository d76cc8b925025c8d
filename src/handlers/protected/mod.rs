// handlers/protected/mod.rs - Tier 2: bearer token required
//
// Writes by signed-in users. Handlers receive the caller as `AuthUser`;
// owner-or-admin checks happen per handler through `auth::authorize`.

pub mod creator;
pub mod music;
pub mod notifications;
pub mod series;
pub mod users;
pub mod videos;

use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};

use crate::app::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        // Videos
        .route("/api/videos", post(videos::upload))
        .route("/api/videos/my-content", get(videos::my_content))
        .route("/api/videos/:id", patch(videos::update).delete(videos::delete))
        .route("/api/videos/:id/status", patch(videos::update_status))
        .route("/api/videos/:id/progress", post(videos::progress))
        .route("/api/videos/:id/like", post(videos::like).delete(videos::unlike))
        .route("/api/videos/:id/share", post(videos::share))
        .route("/api/videos/:id/comments", post(videos::add_comment))
        .route("/api/videos/comments/:id", delete(videos::delete_comment))
        .route("/api/comments/:id", post(videos::add_comment).delete(videos::delete_comment))
        // Series
        .route("/api/series", post(series::create))
        .route("/api/series/:id", patch(series::update).delete(series::delete))
        // Music
        .route("/api/music/songs/:id/like", post(music::like).delete(music::unlike))
        .route("/api/music/playlists", post(music::create_playlist))
        .route("/api/music/my-playlists", get(music::my_playlists))
        .route("/api/music/playlists/add", post(music::add_song))
        .route("/api/music/playlists/:id", patch(music::update_playlist))
        .route("/api/music/playlists/:id/songs/:song_id", delete(music::remove_song))
        // Users
        .route("/api/users/profile", get(users::profile))
        .route("/api/users/preferences", put(users::update_preferences))
        .route("/api/users/history", get(users::history))
        .route("/api/users/history/:id", delete(users::delete_history))
        .route("/api/users/:id/follow", post(users::follow).delete(users::unfollow))
        .route("/api/users/watchlist", get(users::watchlist).post(users::add_to_watchlist))
        .route("/api/users/watchlist/:id", delete(users::remove_from_watchlist))
        // Creator
        .route("/api/creator/profile", post(creator::create_profile).patch(creator::update_profile))
        .route("/api/creator/monetization", get(creator::monetization))
        // Notifications
        .route("/api/notifications", get(notifications::list))
        .route("/api/notifications/register-token", post(notifications::register_token))
}
