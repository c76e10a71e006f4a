//! Backend core for a personal blog: Markdown rendering with syntax
//! highlighting and single-admin credential handling, exposed over HTTP.

pub mod application;
pub mod config;
pub mod infra;
