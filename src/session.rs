//! ==============================================================================
//! session.rs - credential/session manager
//! ==============================================================================
//!
//! purpose:
//!     runs the two-step login flow against the cloud api and produces a
//!     SessionState. sequencing rule: a failure of the authorize step means
//!     the token step is never attempted.
//!
//! ownership rule:
//!     this module only ever produces valid sessions. invalidation is the
//!     control loop's job, done when an acquisition fails.
//!
//! ==============================================================================

use thiserror::Error;

use crate::cloud::CloudClient;
use crate::domain::SessionState;
use crate::net::HttpError;

#[derive(Debug, Error)]
pub enum AuthError {
    /// the authorize step failed; no token request was made
    #[error("authentication failed: {0}")]
    BadAuthentication(HttpError),
    /// the authorize step succeeded but the token exchange failed
    #[error("token exchange failed: {0}")]
    BadOAuth(HttpError),
}

/// run authorize -> settle -> accesstoken and return a valid session
pub async fn authenticate(
    cloud: &CloudClient,
    email: &str,
    password: &str,
) -> Result<SessionState, AuthError> {
    let authorization = cloud
        .authorize(email, password)
        .await
        .map_err(AuthError::BadAuthentication)?;

    cloud.settle().await;

    let access_token = cloud
        .access_token(&authorization)
        .await
        .map_err(AuthError::BadOAuth)?;

    Ok(SessionState {
        authorization,
        access_token,
        valid: true,
    })
}
