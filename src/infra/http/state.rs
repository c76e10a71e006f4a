use std::sync::Arc;

use crate::application::auth::CredentialEngine;
use crate::application::render::MarkdownRender;

#[derive(Clone)]
pub struct AppState {
    pub credentials: Arc<CredentialEngine>,
    pub renderer: Arc<dyn MarkdownRender>,
    /// Serve the password hashing helper on `GET /api/auth/login`.
    pub expose_hash_tool: bool,
}

impl AppState {
    pub fn new(credentials: Arc<CredentialEngine>, renderer: Arc<dyn MarkdownRender>) -> Self {
        Self {
            credentials,
            renderer,
            expose_hash_tool: false,
        }
    }

    pub fn with_hash_tool(mut self, expose: bool) -> Self {
        self.expose_hash_tool = expose;
        self
    }
}
