//! weather panel host: polls a cloud sensor api for three remote sensors,
//! evaluates alert thresholds, feeds a display sink, and mirrors readings to
//! a telemetry channel. the binary in main.rs wires these modules to the
//! control loop; the library split exists so the wire paths are reachable
//! from integration tests.

pub mod acquire;
pub mod alerts;
pub mod cloud;
pub mod config;
pub mod display;
pub mod domain;
pub mod net;
pub mod sched;
pub mod session;
pub mod telemetry;
pub mod timefmt;
