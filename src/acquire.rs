//! ==============================================================================
//! acquire.rs - reading acquirer
//! ==============================================================================
//!
//! purpose:
//!     one acquisition pass: sensors-list call, settle, samples call, each
//!     gated on the previous succeeding. writes go straight into the
//!     ReadingTable so a later-stage failure leaves earlier-stage fields
//!     freshly written and the rest stale-but-displayable.
//!
//! missing ids:
//!     a configured sensor id absent from a response is a surfaced
//!     configuration error, not a silent default.
//!
//! ==============================================================================

use thiserror::Error;

use crate::cloud::CloudClient;
use crate::config::SensorEntry;
use crate::domain::{Bounds, ReadingTable, SessionState, SENSOR_COUNT};
use crate::net::HttpError;

/// panel name column width; longer cloud names are cut to fit
const NAME_MAX_CHARS: usize = 9;

#[derive(Debug, Error)]
pub enum AcquireError {
    #[error("sensors read failed: {0}")]
    BadSensorsRead(HttpError),
    #[error("samples read failed: {0}")]
    BadSamplesRead(HttpError),
    #[error("configured sensor {id} missing from cloud response")]
    UnknownSensor { id: String },
}

/// run one full acquisition pass against the cloud api
pub async fn acquire(
    cloud: &CloudClient,
    session: &SessionState,
    sensors: &[SensorEntry; SENSOR_COUNT],
    table: &mut ReadingTable,
) -> Result<(), AcquireError> {
    // stage 1: metadata (identity, battery, signal, alert bands)
    let metas = cloud
        .sensors(&session.access_token)
        .await
        .map_err(AcquireError::BadSensorsRead)?;

    for (index, entry) in sensors.iter().enumerate() {
        let meta = metas
            .get(&entry.id)
            .ok_or_else(|| AcquireError::UnknownSensor { id: entry.id.clone() })?;

        let slot = table.slot_mut(index);
        slot.name = meta.name.chars().take(NAME_MAX_CHARS).collect();
        slot.battery_voltage = meta.battery_voltage;
        slot.signal_dbm = meta.rssi;
        slot.temperature_bounds = Bounds::new(meta.alerts.temperature.min, meta.alerts.temperature.max);
        slot.humidity_bounds = Bounds::new(meta.alerts.humidity.min, meta.alerts.humidity.max);
    }

    cloud.settle().await;

    // stage 2: latest sample per sensor
    let samples = cloud
        .samples(&session.access_token)
        .await
        .map_err(AcquireError::BadSamplesRead)?;

    for (index, entry) in sensors.iter().enumerate() {
        let newest = samples
            .get(&entry.id)
            .and_then(|list| list.first())
            .ok_or_else(|| AcquireError::UnknownSensor { id: entry.id.clone() })?;

        let slot = table.slot_mut(index);
        slot.temperature = newest.temperature;
        slot.humidity = newest.humidity;
        if entry.has_pressure {
            slot.pressure_inhg = newest.barometric_pressure;
        }
        slot.observed_utc = newest.observed.clone();
    }

    Ok(())
}

impl AcquireError {
    /// text for the panel status line; includes the provider's own message
    /// when the failure was an http 400
    pub fn status_text(&self) -> String {
        match self {
            AcquireError::BadSensorsRead(HttpError::Api { message }) => {
                format!("Sensor read failed: {}", message)
            }
            AcquireError::BadSensorsRead(_) => "Sensor read failed".to_string(),
            AcquireError::BadSamplesRead(HttpError::Api { message }) => {
                format!("Sample read failed: {}", message)
            }
            AcquireError::BadSamplesRead(_) => "Sample read failed".to_string(),
            AcquireError::UnknownSensor { id } => {
                format!("Unknown sensor id: {}", id)
            }
        }
    }
}
