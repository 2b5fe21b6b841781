//! Obtains access tokens for the service account.
//!
//! There is no consent flow: the service account signs a JWT with its private key and exchanges it
//! for an access token at `token_uri`. `yup-oauth2` caches the token in memory and refreshes it
//! when it is within a minute of expiring.

use crate::api::{Credentials, SCOPES};
use crate::error::Res;
use anyhow::Context;
use tracing::debug;
use yup_oauth2::authenticator::DefaultAuthenticator;

/// Hands out access tokens for the spreadsheet and drive scopes.
pub(crate) struct TokenProvider {
    auth: DefaultAuthenticator,
}

impl TokenProvider {
    /// Creates an authenticator for the service account in `credentials`. This does not contact
    /// Google; the first call to `token` does.
    pub(crate) async fn new(credentials: &Credentials) -> Res<Self> {
        let auth = yup_oauth2::ServiceAccountAuthenticator::builder(credentials.key().clone())
            .build()
            .await
            .context("Failed to create the service account authenticator")?;
        debug!(
            "Created authenticator for service account {}",
            credentials.client_email()
        );
        Ok(Self { auth })
    }

    /// Returns a valid access token, fetching a new one if the cached one is missing or expiring.
    pub(crate) async fn token(&self) -> Res<String> {
        let token = self
            .auth
            .token(SCOPES)
            .await
            .context("Failed to obtain an access token for the service account")?;
        token
            .token()
            .map(str::to_string)
            .context("The token response did not include an access token")
    }
}
