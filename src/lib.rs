pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod ingredients;
pub mod memberships;
pub mod recipes;
pub mod state;
pub mod users;
