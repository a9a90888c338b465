//! ==============================================================================
//! domain.rs - panel data model
//! ==============================================================================
//!
//! purpose:
//!     the in-memory state the control loop mutates: one reading slot per
//!     physical sensor (fixed set of 3), the cloud session, and the cycle
//!     status bookkeeping. everything is bundled into PanelContext so
//!     components take an explicit context instead of touching globals.
//!
//! refresh discipline:
//!     a SensorReading is fed from two different cloud calls and never from
//!     anywhere else:
//!     - the sensors-list call owns: name, battery_voltage, signal_dbm,
//!       temperature_bounds, humidity_bounds
//!     - the samples call owns: temperature, humidity, pressure_inhg,
//!       observed_utc
//!     if one of the calls fails the other half simply keeps its previous
//!     values. staleness is implicit; there is no validity flag per field.
//!
//! ==============================================================================

/// number of panel slots; the deployment has exactly three sensors
pub const SENSOR_COUNT: usize = 3;

/// alert band as supplied by the cloud api, inclusive on both ends
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

impl Bounds {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }
}

/// one panel slot, mutated in place for the process lifetime
#[derive(Clone, Debug, Default)]
pub struct SensorReading {
    /// short display name from the cloud metadata (panel truncates at 9 chars)
    pub name: String,
    /// degrees fahrenheit
    pub temperature: f64,
    /// relative humidity percent
    pub humidity: f64,
    /// inches of mercury; None for sensors that do not report pressure
    pub pressure_inhg: Option<f64>,
    /// battery voltage in volts
    pub battery_voltage: f64,
    /// wifi signal strength in dBm
    pub signal_dbm: f64,
    /// raw utc "observed" string from the latest sample
    pub observed_utc: String,
    /// per-sensor temperature alert band from the cloud
    pub temperature_bounds: Bounds,
    /// per-sensor humidity alert band from the cloud
    pub humidity_bounds: Bounds,
}

/// fixed three-slot reading table, allocated once at startup
#[derive(Clone, Debug, Default)]
pub struct ReadingTable {
    slots: [SensorReading; SENSOR_COUNT],
}

impl ReadingTable {
    pub fn slot(&self, index: usize) -> &SensorReading {
        &self.slots[index]
    }

    pub fn slot_mut(&mut self, index: usize) -> &mut SensorReading {
        &mut self.slots[index]
    }
}

/// cloud api session credentials
///
/// starts invalid; `session::authenticate` produces a valid one. the control
/// loop (never the session manager itself) clears `valid` when an acquisition
/// fails, which forces re-authentication before the next attempt.
#[derive(Clone, Debug, Default)]
pub struct SessionState {
    /// short-lived code from /oauth/authorize, consumed once
    pub authorization: String,
    /// bearer credential for the data endpoints
    pub access_token: String,
    /// true once an access token has been obtained
    pub valid: bool,
}

impl SessionState {
    pub fn invalidate(&mut self) {
        self.valid = false;
    }
}

/// everything the control loop owns, passed explicitly to each component
#[derive(Debug, Default)]
pub struct PanelContext {
    pub readings: ReadingTable,
    pub session: SessionState,
    /// success flag of the most recent acquisition cycle
    pub last_cycle_ok: bool,
    /// success flag of the most recent telemetry forward (status color only)
    pub last_forward_ok: bool,
    /// status line shown on the panel, optionally carrying the api's message
    pub status_text: String,
}
