/// Shared types used across the codebase

use serde::{Deserialize, Serialize};

/// Catalog entry kind stored in `videos.type`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VideoType {
    #[default]
    Video,
    Reel,
}

impl VideoType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VideoType::Video => "VIDEO",
            VideoType::Reel => "REEL",
        }
    }

    /// Case-insensitive; anything unrecognised is `None`
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "VIDEO" => Some(VideoType::Video),
            "REEL" => Some(VideoType::Reel),
            _ => None,
        }
    }
}

/// Account role stored in `users.role`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "user" => Some(Role::User),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}
