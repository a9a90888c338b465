//! ==============================================================================
//! alerts.rs - alert evaluator and field formatting
//! ==============================================================================
//!
//! purpose:
//!     the two pure functions the display update is built from:
//!     - classify: numeric value + band -> Alert/Normal
//!     - format_value: numeric value -> fixed-width panel string
//!     kept separate on purpose; deciding a color and rendering a number are
//!     independent concerns.
//!
//! ==============================================================================

use crate::domain::Bounds;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AlertState {
    Normal,
    Alert,
}

/// band check against the per-sensor cloud bounds.
/// values exactly on a bound are Normal.
pub fn classify(value: f64, bounds: Bounds) -> AlertState {
    if value < bounds.min || value > bounds.max {
        AlertState::Alert
    } else {
        AlertState::Normal
    }
}

/// floor check for battery voltage and signal strength, which the cloud api
/// supplies no per-sensor bounds for. at-or-below the floor is an alert.
pub fn classify_floor(value: f64, floor: f64) -> AlertState {
    if value <= floor {
        AlertState::Alert
    } else {
        AlertState::Normal
    }
}

/// panel field categories, each with its own color pair
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldCategory {
    Temperature,
    Humidity,
    Pressure,
    Battery,
    Wifi,
    Clock,
    Status,
}

/// text/background color pair handed to the display sink (rgb888)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Style {
    pub fg: u32,
    pub bg: u32,
}

const ALERT_FG: u32 = 0xFF_3B_30;
const PANEL_BG: u32 = 0x10_10_18;
const TEMPERATURE_FG: u32 = 0xFF_D5_4F;
const HUMIDITY_FG: u32 = 0x4F_C3_F7;
const PRESSURE_FG: u32 = 0x80_DE_EA;
const BATTERY_FG: u32 = 0x9C_CC_65;
const WIFI_FG: u32 = 0xCE_93_D8;
const CLOCK_FG: u32 = 0xB0_BE_C5;
const STATUS_FG: u32 = 0xE0_E0_E0;

/// exhaustive category/state -> color mapping
pub fn style_for(category: FieldCategory, state: AlertState) -> Style {
    let fg = match (category, state) {
        (_, AlertState::Alert) => ALERT_FG,
        (FieldCategory::Temperature, AlertState::Normal) => TEMPERATURE_FG,
        (FieldCategory::Humidity, AlertState::Normal) => HUMIDITY_FG,
        (FieldCategory::Pressure, AlertState::Normal) => PRESSURE_FG,
        (FieldCategory::Battery, AlertState::Normal) => BATTERY_FG,
        (FieldCategory::Wifi, AlertState::Normal) => WIFI_FG,
        (FieldCategory::Clock, AlertState::Normal) => CLOCK_FG,
        (FieldCategory::Status, AlertState::Normal) => STATUS_FG,
    };
    Style { fg, bg: PANEL_BG }
}

/// fixed-width decimal rendering with a unit suffix, e.g. " 68.5°"
pub fn format_value(value: f64, decimals: usize, min_width: usize, unit: &str) -> String {
    format!("{:>width$.prec$}{}", value, unit, width = min_width, prec = decimals)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inside_band_is_normal() {
        assert_eq!(classify(68.5, Bounds::new(60.0, 75.0)), AlertState::Normal);
    }

    #[test]
    fn below_min_and_above_max_alert() {
        assert_eq!(classify(68.5, Bounds::new(70.0, 75.0)), AlertState::Alert);
        assert_eq!(classify(76.1, Bounds::new(70.0, 75.0)), AlertState::Alert);
    }

    #[test]
    fn boundary_values_are_normal() {
        let bounds = Bounds::new(60.0, 75.0);
        assert_eq!(classify(60.0, bounds), AlertState::Normal);
        assert_eq!(classify(75.0, bounds), AlertState::Normal);
    }

    #[test]
    fn floor_is_inclusive_alert() {
        assert_eq!(classify_floor(2.4, 2.4), AlertState::Alert);
        assert_eq!(classify_floor(2.41, 2.4), AlertState::Normal);
        assert_eq!(classify_floor(-90.0, -85.0), AlertState::Alert);
    }

    #[test]
    fn alert_overrides_every_category_color() {
        for category in [
            FieldCategory::Temperature,
            FieldCategory::Humidity,
            FieldCategory::Pressure,
            FieldCategory::Battery,
            FieldCategory::Wifi,
            FieldCategory::Clock,
            FieldCategory::Status,
        ] {
            assert_eq!(style_for(category, AlertState::Alert).fg, ALERT_FG);
        }
    }

    #[test]
    fn formatting_pads_and_suffixes() {
        assert_eq!(format_value(68.5, 1, 5, "°"), " 68.5°");
        assert_eq!(format_value(2.9, 2, 0, "v"), "2.90v");
        assert_eq!(format_value(-67.0, 0, 0, "dB"), "-67dB");
        assert_eq!(format_value(29.92, 2, 0, "inHg"), "29.92inHg");
    }
}
