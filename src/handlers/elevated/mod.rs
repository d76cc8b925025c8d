// handlers/elevated/mod.rs - Tier 3: admin only
//
// Dashboard and moderation endpoints under /api/admin. The admin gate runs
// after token validation; every handler here may act on any row.
//
// Route Prefix: /api/admin/*

pub mod admin;

use axum::{
    routing::{delete, get, patch},
    Router,
};

use crate::app::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/admin/stats", get(admin::stats::show))
        // Users
        .route("/api/admin/users", get(admin::users::list))
        .route("/api/admin/users/:id", get(admin::users::show).delete(admin::users::delete))
        .route("/api/admin/users/:id/status", patch(admin::users::update_status))
        // Videos
        .route("/api/admin/videos", get(admin::videos::list))
        .route("/api/admin/videos/:id", get(admin::videos::show).delete(admin::videos::delete))
        .route("/api/admin/videos/:id/status", patch(admin::videos::update_status))
        // Music
        .route("/api/admin/songs", get(admin::music::songs))
        .route("/api/admin/songs/:id", get(admin::music::song).delete(admin::music::delete_song))
        .route("/api/admin/songs/:id/status", patch(admin::music::update_song_status))
        .route("/api/admin/playlists", get(admin::music::playlists))
        // Creators
        .route("/api/admin/creators", get(admin::creators::list))
        .route("/api/admin/creators/:id/monetization", patch(admin::creators::update_monetization))
        // Taxonomy
        .route("/api/admin/categories", get(admin::taxonomy::categories).post(admin::taxonomy::create_category))
        .route("/api/admin/categories/:id", delete(admin::taxonomy::delete_category))
        .route("/api/admin/genres", get(admin::taxonomy::genres).post(admin::taxonomy::create_genre))
        .route("/api/admin/genres/:id", delete(admin::taxonomy::delete_genre))
}
