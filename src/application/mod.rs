//! Application services: credentials and Markdown rendering.

pub mod auth;
pub mod error;
pub mod render;
