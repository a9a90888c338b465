//! ==============================================================================
//! telemetry.rs - telemetry forwarder
//! ==============================================================================
//!
//! purpose:
//!     mirrors the reading table to the aggregation service's bulk-update
//!     endpoint. best-effort by contract: the caller only uses the returned
//!     bool to color a status indicator. a failed forward never invalidates
//!     the session and never blocks the display update.
//!
//! channel-field mapping (fixed by the channel definition, not negotiable
//! at runtime):
//!     sensor 1 -> field1 temperature, field2 humidity,
//!                 field3 pressure,    field4 battery
//!     sensor 2 -> field5 temperature, field6 humidity
//!     sensor 3 -> field7 temperature, field8 humidity
//!
//! ==============================================================================

use chrono::{SecondsFormat, Utc};
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::domain::ReadingTable;
use crate::net::post_json;

#[derive(Debug, Deserialize)]
struct BulkUpdateResponse {
    success: bool,
}

pub struct TelemetryClient {
    http: reqwest::Client,
    base_url: String,
    channel_id: u64,
    write_api_key: String,
}

impl TelemetryClient {
    pub fn new(base_url: impl Into<String>, channel_id: u64, write_api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            channel_id,
            write_api_key: write_api_key.into(),
        }
    }

    /// push the current table as one bulk update; true means the service
    /// acknowledged with {"success": true}
    pub async fn forward(&self, table: &ReadingTable) -> bool {
        let url = format!("{}/channels/{}/bulk_update.json", self.base_url, self.channel_id);
        let body = json!({
            "write_api_key": self.write_api_key,
            "updates": build_updates(table, &Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)),
        });

        match post_json::<Value, BulkUpdateResponse>(&self.http, &url, None, &body).await {
            Ok(resp) => resp.success,
            Err(e) => {
                println!("[TELEMETRY] Forward failed: {}", e);
                false
            }
        }
    }
}

/// one update entry per sensor, each carrying only the fields its channel
/// slots define. split out so the payload shape is testable without a server.
pub fn build_updates(table: &ReadingTable, created_at: &str) -> Vec<Value> {
    let mut updates = Vec::with_capacity(3);

    // sensor 1: temperature, humidity, pressure, battery
    let s1 = table.slot(0);
    let mut fields = Map::new();
    fields.insert("created_at".to_string(), json!(created_at));
    fields.insert("field1".to_string(), json!(s1.temperature));
    fields.insert("field2".to_string(), json!(s1.humidity));
    if let Some(pressure) = s1.pressure_inhg {
        fields.insert("field3".to_string(), json!(pressure));
    }
    fields.insert("field4".to_string(), json!(s1.battery_voltage));
    updates.push(Value::Object(fields));

    // sensors 2 and 3: temperature and humidity only
    for (index, (temp_field, hum_field)) in [("field5", "field6"), ("field7", "field8")].iter().enumerate() {
        let slot = table.slot(index + 1);
        let mut fields = Map::new();
        fields.insert("created_at".to_string(), json!(created_at));
        fields.insert(temp_field.to_string(), json!(slot.temperature));
        fields.insert(hum_field.to_string(), json!(slot.humidity));
        updates.push(Value::Object(fields));
    }

    updates
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> ReadingTable {
        let mut table = ReadingTable::default();
        {
            let s1 = table.slot_mut(0);
            s1.temperature = 68.5;
            s1.humidity = 41.0;
            s1.pressure_inhg = Some(29.92);
            s1.battery_voltage = 2.9;
        }
        table.slot_mut(1).temperature = 70.1;
        table.slot_mut(1).humidity = 44.5;
        table.slot_mut(2).temperature = 66.0;
        table.slot_mut(2).humidity = 50.2;
        table
    }

    #[test]
    fn updates_follow_channel_field_mapping() {
        let updates = build_updates(&sample_table(), "2024-07-27T14:05:00Z");
        assert_eq!(updates.len(), 3);

        assert_eq!(updates[0]["field1"], json!(68.5));
        assert_eq!(updates[0]["field2"], json!(41.0));
        assert_eq!(updates[0]["field3"], json!(29.92));
        assert_eq!(updates[0]["field4"], json!(2.9));

        assert_eq!(updates[1]["field5"], json!(70.1));
        assert_eq!(updates[1]["field6"], json!(44.5));
        assert!(updates[1].get("field1").is_none());

        assert_eq!(updates[2]["field7"], json!(66.0));
        assert_eq!(updates[2]["field8"], json!(50.2));
    }

    #[test]
    fn pressure_field_omitted_when_sensor_has_none() {
        let mut table = sample_table();
        table.slot_mut(0).pressure_inhg = None;
        let updates = build_updates(&table, "2024-07-27T14:05:00Z");
        assert!(updates[0].get("field3").is_none());
    }

    #[test]
    fn every_update_carries_created_at() {
        let updates = build_updates(&sample_table(), "2024-07-27T14:05:00Z");
        for update in &updates {
            assert_eq!(update["created_at"], json!("2024-07-27T14:05:00Z"));
        }
    }
}
