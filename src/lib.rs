pub mod apify;
pub mod auth;
pub mod banner;
pub mod config;
pub mod consts;
pub mod engine;
pub mod schema;
pub mod server;
