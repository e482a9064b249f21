//! OAuth client-credentials authentication against the Syncplicity gateway.

use reqwest::Method;
use tracing::{debug, info, warn};

use crate::gateway::{ApiRequest, Credentials, Gateway, FORM_CONTENT_TYPE};
use crate::models::Token;

/// Body of every token request.
const CLIENT_CREDENTIALS_GRANT: &str = "grant_type=client_credentials";

impl Gateway {
    /// Obtain a user access token and, when machine-token authentication is
    /// enabled, a machine access token for storage vault calls.
    ///
    /// The outcome is recorded in the session; check
    /// [`Gateway::is_authenticated`] afterwards.
    pub async fn authenticate(&self) {
        let token = self.obtain_token(Credentials::UserGrant).await;
        self.session().set_token(token).await;

        if self.config().machine_token_auth_enabled {
            let machine_token = self
                .obtain_token(Credentials::MachineGrant)
                .await
                .map(|token| token.access_token)
                .filter(|access_token| !access_token.is_empty());

            if machine_token.is_none() {
                warn!("Failed to obtain a machine access token for storage vault calls");
            }
            self.session().set_machine_access_token(machine_token).await;
        }
    }

    /// Client-credentials grants have no refresh flow, so refreshing is
    /// authenticating again from scratch.
    pub async fn refresh_token(&self) {
        self.authenticate().await;
    }

    /// Invalidate the current token and the application's grant for the
    /// user account.
    pub async fn revoke_token(&self) {
        let url = self.config().oauth_revoke_token_url();
        let token: Option<Token> = self.get(&url, &[], false, false).await;
        self.session().set_token(token).await;
    }

    pub async fn is_authenticated(&self) -> bool {
        self.session().is_authenticated().await
    }

    async fn obtain_token(&self, credentials: Credentials) -> Option<Token> {
        let request = ApiRequest::new(Method::POST, self.config().oauth_token_url())
            .credentials(credentials)
            .body(FORM_CONTENT_TYPE, CLIENT_CREDENTIALS_GRANT);

        let body = match self.send_once(&request).await {
            Ok(Some(body)) => body,
            Ok(None) => {
                warn!(?credentials, "Token endpoint returned an empty response");
                return None;
            }
            Err(err) => {
                warn!(?credentials, error = %err, "Token request failed");
                return None;
            }
        };

        match serde_json::from_slice::<Token>(&body) {
            Ok(token) => {
                debug!(company = %token.user_company_id, "Token response parsed");
                info!(?credentials, "Obtained access token");
                Some(token)
            }
            Err(err) => {
                warn!(?credentials, error = %err, "Could not parse the token response");
                None
            }
        }
    }
}
