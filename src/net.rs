//! ==============================================================================
//! net.rs - http plumbing shared by both external services
//! ==============================================================================
//!
//! purpose:
//!     one thin `post_json` helper over reqwest plus the failure taxonomy
//!     every http-calling component maps into. components never retry here;
//!     failures travel up to the control loop, which owns the retry policy.
//!
//! taxonomy:
//!     - Transport: no http status obtained at all (network unreachable)
//!     - Api: http 400 carrying the provider's structured {error:{message}}
//!     - UnexpectedStatus: any other non-200
//!     - Deserialization: 200 but the body did not parse
//!
//! ==============================================================================

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("network unreachable: {0}")]
    Transport(String),
    #[error("{message}")]
    Api { message: String },
    #[error("unexpected status {code}")]
    UnexpectedStatus { code: u16 },
    #[error("malformed response body: {0}")]
    Deserialization(String),
}

/// provider error body shape: {"error": {"message": "..."}}
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// POST a json body, optionally bearer-authenticated, expect a json response
pub async fn post_json<B, R>(
    client: &reqwest::Client,
    url: &str,
    bearer: Option<&str>,
    body: &B,
) -> Result<R, HttpError>
where
    B: Serialize + ?Sized,
    R: DeserializeOwned,
{
    let mut request = client.post(url).json(body);
    if let Some(token) = bearer {
        request = request.bearer_auth(token);
    }

    // a send error means we never got an http status line
    let response = request
        .send()
        .await
        .map_err(|e| HttpError::Transport(e.to_string()))?;

    let status = response.status();
    if status.as_u16() == 400 {
        // the provider puts a human-readable message in the 400 body;
        // surface it so the panel status line can show it verbatim
        let message = response
            .json::<ApiErrorBody>()
            .await
            .map(|b| b.error.message)
            .unwrap_or_else(|_| "bad request".to_string());
        return Err(HttpError::Api { message });
    }
    if !status.is_success() {
        return Err(HttpError::UnexpectedStatus { code: status.as_u16() });
    }

    response
        .json::<R>()
        .await
        .map_err(|e| HttpError::Deserialization(e.to_string()))
}
