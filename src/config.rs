//! ==============================================================================
//! config.rs - Runtime Configuration Loader
//! ==============================================================================
//!
//! purpose:
//!     defines the schema for `panel.toml`.
//!     loads configuration from file or falls back to compiled-in defaults,
//!     which double as the build-time constant surface of the deployment.
//!
//! structure:
//!     - CloudConfig: sensor cloud credentials, base url, the three sensor ids.
//!     - TelemetryConfig: channel id, write key, base url.
//!     - IntervalsConfig: the four scheduler periods plus the settling delay.
//!     - ThresholdsConfig: global low-battery / low-signal alert floors.
//!
//! ==============================================================================

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::domain::SENSOR_COUNT;

/// Root configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct PanelConfig {
    pub cloud: CloudConfig,
    pub telemetry: TelemetryConfig,
    #[serde(default)]
    pub intervals: IntervalsConfig,
    #[serde(default)]
    pub thresholds: ThresholdsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CloudConfig {
    pub base_url: String,
    pub email: String,
    pub password: String,
    /// exactly three entries, panel slot order
    pub sensors: [SensorEntry; SENSOR_COUNT],
}

#[derive(Debug, Deserialize, Clone)]
pub struct SensorEntry {
    /// opaque identifier assigned by the cloud provider
    pub id: String,
    /// only sensor 1 reports barometric pressure in this deployment;
    /// configured rather than inferred so the omission stays deliberate
    #[serde(default)]
    pub has_pressure: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TelemetryConfig {
    pub base_url: String,
    pub channel_id: u64,
    pub write_api_key: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct IntervalsConfig {
    /// full acquisition cycle period
    pub cycle_secs: u64,
    /// re-attempt period while the last cycle failed
    pub retry_secs: u64,
    /// unconditional token refresh period
    pub token_refresh_secs: u64,
    /// pressure history / chart append period
    pub chart_secs: u64,
    /// pause between chained cloud calls (provider rate-limit courtesy)
    pub settling_delay_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ThresholdsConfig {
    /// battery voltage at or below this is an alert
    pub low_battery_volts: f64,
    /// signal strength at or below this is an alert
    pub low_signal_dbm: f64,
}

impl PanelConfig {
    /// Load configuration from file
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| anyhow::anyhow!("Failed to read config file: {}", e))?;

        let config: PanelConfig = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config: {}", e))?;

        Ok(config)
    }

    /// Load with default fallback
    pub fn load_or_default() -> Self {
        let paths = [
            std::path::PathBuf::from("panel.toml"),
            std::path::PathBuf::from("config").join("panel.toml"),
        ];

        for path in &paths {
            if path.exists() {
                match Self::load(path) {
                    Ok(config) => {
                        println!("[CONFIG] Loaded from {}", path.display());
                        return config;
                    }
                    Err(e) => {
                        println!("[CONFIG] Warning: Failed to load {}: {}", path.display(), e);
                    }
                }
            }
        }

        println!("[CONFIG] Warning: No config file found - using defaults");
        Self::default()
    }

    /// Print configuration summary
    pub fn print_summary(&self) {
        println!("┌─────────────────────────────────────────┐");
        println!("│          PANEL CONFIGURATION            │");
        println!("├─────────────────────────────────────────┤");
        println!("│ Cloud API: {}", self.cloud.base_url);
        println!("│ Telemetry channel: {}", self.telemetry.channel_id);
        println!("│ Cycle: {}s  Retry: {}s  Token: {}s",
            self.intervals.cycle_secs,
            self.intervals.retry_secs,
            self.intervals.token_refresh_secs);
        println!("└─────────────────────────────────────────┘");
    }

    pub fn settling_delay(&self) -> Duration {
        Duration::from_secs(self.intervals.settling_delay_secs)
    }
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            cloud: CloudConfig {
                base_url: "https://api.sensorpush.com/api/v1".to_string(),
                email: "panel@example.com".to_string(),
                password: "changeme".to_string(),
                sensors: [
                    SensorEntry { id: "sensor-1".to_string(), has_pressure: true },
                    SensorEntry { id: "sensor-2".to_string(), has_pressure: false },
                    SensorEntry { id: "sensor-3".to_string(), has_pressure: false },
                ],
            },
            telemetry: TelemetryConfig {
                base_url: "https://api.thingspeak.com".to_string(),
                channel_id: 0,
                write_api_key: "changeme".to_string(),
            },
            intervals: IntervalsConfig::default(),
            thresholds: ThresholdsConfig::default(),
        }
    }
}

impl Default for IntervalsConfig {
    fn default() -> Self {
        Self {
            cycle_secs: 5 * 60,
            retry_secs: 60,
            token_refresh_secs: 40 * 60,
            chart_secs: 30 * 60,
            settling_delay_secs: 2,
        }
    }
}

impl Default for ThresholdsConfig {
    fn default() -> Self {
        Self {
            low_battery_volts: 2.4,
            low_signal_dbm: -85.0,
        }
    }
}
