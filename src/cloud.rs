//! ==============================================================================
//! cloud.rs - sensor cloud api client
//! ==============================================================================
//!
//! purpose:
//!     wire-level client for the four cloud endpoints. this module only knows
//!     urls and body shapes; the login sequencing lives in session.rs and the
//!     table population in acquire.rs.
//!
//! endpoints:
//!     POST /oauth/authorize    {email,password}  -> {authorization}
//!     POST /oauth/accesstoken  {authorization}   -> {accesstoken}
//!     POST /devices/sensors    (bearer, {})      -> map id -> metadata
//!     POST /samples            (bearer, {limit}) -> map id -> [samples]
//!
//! ==============================================================================

use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use std::time::Duration;

use crate::net::{post_json, HttpError};

/// per-sensor metadata from /devices/sensors
#[derive(Clone, Debug, Deserialize)]
pub struct SensorMeta {
    pub name: String,
    pub battery_voltage: f64,
    pub rssi: f64,
    pub alerts: SensorAlerts,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SensorAlerts {
    pub temperature: AlertBand,
    pub humidity: AlertBand,
}

#[derive(Clone, Copy, Debug, Deserialize)]
pub struct AlertBand {
    pub min: f64,
    pub max: f64,
}

/// one sample object from /samples; newest first, we only ever request one
#[derive(Clone, Debug, Deserialize)]
pub struct Sample {
    pub temperature: f64,
    pub humidity: f64,
    #[serde(default)]
    pub barometric_pressure: Option<f64>,
    /// utc timestamp string, e.g. "2024-07-27T14:05:00.000Z"
    pub observed: String,
}

#[derive(Debug, Deserialize)]
struct AuthorizeResponse {
    authorization: String,
}

#[derive(Debug, Deserialize)]
struct AccessTokenResponse {
    accesstoken: String,
}

pub struct CloudClient {
    http: reqwest::Client,
    base_url: String,
    /// pause between chained calls, provider rate-limit courtesy.
    /// zeroed in tests; not a retry mechanism.
    settling_delay: Duration,
}

impl CloudClient {
    pub fn new(base_url: impl Into<String>, settling_delay: Duration) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            settling_delay,
        }
    }

    pub async fn settle(&self) {
        tokio::time::sleep(self.settling_delay).await;
    }

    /// step one of the login flow: credentials -> short-lived authorization code
    pub async fn authorize(&self, email: &str, password: &str) -> Result<String, HttpError> {
        let url = format!("{}/oauth/authorize", self.base_url);
        let body = json!({ "email": email, "password": password });
        let resp: AuthorizeResponse = post_json(&self.http, &url, None, &body).await?;
        Ok(resp.authorization)
    }

    /// step two: authorization code -> bearer access token
    pub async fn access_token(&self, authorization: &str) -> Result<String, HttpError> {
        let url = format!("{}/oauth/accesstoken", self.base_url);
        let body = json!({ "authorization": authorization });
        let resp: AccessTokenResponse = post_json(&self.http, &url, None, &body).await?;
        Ok(resp.accesstoken)
    }

    /// sensor metadata: names, battery, signal, alert bands
    pub async fn sensors(&self, token: &str) -> Result<HashMap<String, SensorMeta>, HttpError> {
        let url = format!("{}/devices/sensors", self.base_url);
        post_json(&self.http, &url, Some(token), &json!({})).await
    }

    /// latest sample per sensor (limit 1, index 0 is the newest)
    pub async fn samples(&self, token: &str) -> Result<HashMap<String, Vec<Sample>>, HttpError> {
        let url = format!("{}/samples", self.base_url);
        post_json(&self.http, &url, Some(token), &json!({ "limit": 1 })).await
    }
}
