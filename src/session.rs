//! Shared holder for the current OAuth tokens.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::models::Token;

#[derive(Debug, Default)]
struct SessionState {
    token: Option<Token>,
    machine_access_token: Option<String>,
}

/// Current user token and optional machine token.
///
/// Clones share the same state, so a re-authentication triggered by one
/// request is visible to every client built on the same gateway.
#[derive(Debug, Clone, Default)]
pub struct Session {
    state: Arc<RwLock<SessionState>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// True if a token is held and its access token is non-empty.
    pub async fn is_authenticated(&self) -> bool {
        let state = self.state.read().await;
        state
            .token
            .as_ref()
            .is_some_and(|token| !token.access_token.is_empty())
    }

    /// User access token, or empty if none is held.
    pub async fn access_token(&self) -> String {
        let state = self.state.read().await;
        state
            .token
            .as_ref()
            .map(|token| token.access_token.clone())
            .unwrap_or_default()
    }

    /// Company the token owner belongs to, or empty if none is held.
    pub async fn company_id(&self) -> String {
        let state = self.state.read().await;
        state
            .token
            .as_ref()
            .map(|token| token.user_company_id.clone())
            .unwrap_or_default()
    }

    pub async fn machine_access_token(&self) -> String {
        let state = self.state.read().await;
        state.machine_access_token.clone().unwrap_or_default()
    }

    /// Replace the held token wholesale.
    pub async fn set_token(&self, token: Option<Token>) {
        let mut state = self.state.write().await;
        state.token = token;
    }

    pub async fn set_machine_access_token(&self, token: Option<String>) {
        let mut state = self.state.write().await;
        state.machine_access_token = token;
    }
}
