pub mod app;
pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod filter;
pub mod handlers;
pub mod middleware;
pub mod seo;
pub mod services;
pub mod storage;
pub mod types;
pub mod update;
