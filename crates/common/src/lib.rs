pub mod auth;
pub mod config;
pub mod logger;
pub mod models;
