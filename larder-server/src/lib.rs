pub mod api;
pub mod auth;
pub mod boards;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod database;
pub mod detail_cache;
pub mod errors;
pub mod favorites;
pub mod models;
pub mod search;
pub mod state;
