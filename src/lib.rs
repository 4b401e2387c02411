pub mod auth;
pub mod config;
pub mod error;
pub mod flag;
pub mod handlers;
pub mod routes;
pub mod store;
pub mod validate;
