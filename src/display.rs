//! ==============================================================================
//! display.rs - display sink boundary
//! ==============================================================================
//!
//! purpose:
//!     the panel ui itself (widget tree, touch, drivers) is an external
//!     collaborator; this module only defines the narrow interface we feed it:
//!     formatted field strings with a color pair, a status line, and pressure
//!     history points for the chart.
//!
//! ```text
//!     `update_panel` is the whole per-cycle display refresh: it formats every
//!     field (alerts::format_value) and decides every color
//!     (alerts::classify / classify_floor) but performs no i/o of its own.
//! ```
//!
//! ==============================================================================

use crate::alerts::{
    classify, classify_floor, format_value, style_for, AlertState, FieldCategory, Style,
};
use crate::config::ThresholdsConfig;
use crate::domain::{PanelContext, SENSOR_COUNT};
use crate::timefmt;

pub trait DisplaySink {
    /// one formatted field of one sensor row
    fn set_field(&mut self, sensor: usize, category: FieldCategory, text: &str, style: Style);
    /// the panel-wide status line
    fn set_status(&mut self, text: &str, style: Style);
    /// append one point to the pressure history chart
    fn append_pressure_point(&mut self, inhg: f64);
}

/// push the whole context onto the sink
pub fn update_panel(sink: &mut dyn DisplaySink, ctx: &PanelContext, thresholds: &ThresholdsConfig) {
    for index in 0..SENSOR_COUNT {
        let reading = ctx.readings.slot(index);

        let state = classify(reading.temperature, reading.temperature_bounds);
        sink.set_field(
            index,
            FieldCategory::Temperature,
            &format_value(reading.temperature, 1, 5, "°"),
            style_for(FieldCategory::Temperature, state),
        );

        let state = classify(reading.humidity, reading.humidity_bounds);
        sink.set_field(
            index,
            FieldCategory::Humidity,
            &format_value(reading.humidity, 1, 5, "%"),
            style_for(FieldCategory::Humidity, state),
        );

        let state = classify_floor(reading.battery_voltage, thresholds.low_battery_volts);
        sink.set_field(
            index,
            FieldCategory::Battery,
            &format_value(reading.battery_voltage, 2, 0, "v"),
            style_for(FieldCategory::Battery, state),
        );

        let state = classify_floor(reading.signal_dbm, thresholds.low_signal_dbm);
        sink.set_field(
            index,
            FieldCategory::Wifi,
            &format_value(reading.signal_dbm, 0, 0, "dB"),
            style_for(FieldCategory::Wifi, state),
        );

        // pressure and the observed clock have no alert bands and must not
        // collide in a sink keyed by (sensor, category)
        if let Some(pressure) = reading.pressure_inhg {
            sink.set_field(
                index,
                FieldCategory::Pressure,
                &format_value(pressure, 2, 0, "inHg"),
                style_for(FieldCategory::Pressure, AlertState::Normal),
            );
        }
        if let Ok(clock) = timefmt::to_local_display(&reading.observed_utc) {
            sink.set_field(
                index,
                FieldCategory::Clock,
                &clock,
                style_for(FieldCategory::Clock, AlertState::Normal),
            );
        }
    }

    // telemetry trouble only shows up here, as the status color
    let status_state = if ctx.last_cycle_ok && ctx.last_forward_ok {
        AlertState::Normal
    } else {
        AlertState::Alert
    };
    sink.set_status(&ctx.status_text, style_for(FieldCategory::Status, status_state));
}

/// logs fields instead of driving a panel; stands in for the real ui when
/// running on a development machine
#[derive(Default)]
pub struct ConsoleSink;

impl DisplaySink for ConsoleSink {
    fn set_field(&mut self, sensor: usize, category: FieldCategory, text: &str, _style: Style) {
        println!("[PANEL] sensor {} {:?}: {}", sensor + 1, category, text);
    }

    fn set_status(&mut self, text: &str, _style: Style) {
        println!("[PANEL] status: {}", text);
    }

    fn append_pressure_point(&mut self, inhg: f64) {
        println!("[PANEL] chart point: {:.2} inHg", inhg);
    }
}
