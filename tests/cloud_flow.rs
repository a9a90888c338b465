//! wire-path tests for the cloud login flow, the acquisition sequence, and
//! the telemetry forward, run against a canned-response http listener on
//! localhost so the real reqwest stack is exercised.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use weatherpanel_host::acquire::{acquire, AcquireError};
use weatherpanel_host::cloud::CloudClient;
use weatherpanel_host::config::SensorEntry;
use weatherpanel_host::domain::{ReadingTable, SessionState};
use weatherpanel_host::session::{authenticate, AuthError};
use weatherpanel_host::telemetry::TelemetryClient;

/// a recorded request: (path, body)
type Request = (String, String);

struct CannedServer {
    base_url: String,
    requests: Arc<Mutex<Vec<Request>>>,
}

impl CannedServer {
    /// serve the given (status, body) responses in order, one per request,
    /// then stop accepting
    fn start(responses: Vec<(u16, String)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let requests: Arc<Mutex<Vec<Request>>> = Arc::new(Mutex::new(Vec::new()));

        let seen = requests.clone();
        thread::spawn(move || {
            for (status, body) in responses {
                let (stream, _) = match listener.accept() {
                    Ok(pair) => pair,
                    Err(_) => return,
                };
                stream
                    .set_read_timeout(Some(Duration::from_secs(5)))
                    .ok();
                let mut stream = stream;
                let request = read_request(&mut stream);
                if let Some(request) = request {
                    seen.lock().unwrap().push(request);
                }
                let reason = if status == 200 { "OK" } else { "Error" };
                let response = format!(
                    "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    reason,
                    body.len(),
                    body
                );
                stream.write_all(response.as_bytes()).ok();
            }
        });

        Self { base_url, requests }
    }

    fn paths(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|(path, _)| path.clone())
            .collect()
    }
}

fn read_request(stream: &mut std::net::TcpStream) -> Option<Request> {
    let mut reader = BufReader::new(stream);

    let mut request_line = String::new();
    reader.read_line(&mut request_line).ok()?;
    let path = request_line.split_whitespace().nth(1)?.to_string();

    let mut content_length = 0usize;
    loop {
        let mut line = String::new();
        reader.read_line(&mut line).ok()?;
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some(value) = line
            .to_ascii_lowercase()
            .strip_prefix("content-length:")
            .map(str::trim)
            .and_then(|v| v.parse::<usize>().ok())
        {
            content_length = value;
        }
    }

    let mut body = vec![0u8; content_length];
    reader.read_exact(&mut body).ok()?;
    Some((path, String::from_utf8_lossy(&body).into_owned()))
}

fn cloud_client(server: &CannedServer) -> CloudClient {
    // zero settling delay: the pauses are provider courtesy, not logic
    CloudClient::new(server.base_url.clone(), Duration::ZERO)
}

fn sensor_set() -> [SensorEntry; 3] {
    [
        SensorEntry { id: "s1".to_string(), has_pressure: true },
        SensorEntry { id: "s2".to_string(), has_pressure: false },
        SensorEntry { id: "s3".to_string(), has_pressure: false },
    ]
}

fn sensors_body() -> String {
    let entry = |name: &str, battery: f64| {
        format!(
            r#"{{"name":"{}","battery_voltage":{},"rssi":-67.0,
                "alerts":{{"temperature":{{"min":60.0,"max":75.0}},
                           "humidity":{{"min":30.0,"max":60.0}}}}}}"#,
            name, battery
        )
    };
    format!(
        r#"{{"s1":{},"s2":{},"s3":{}}}"#,
        entry("Garage", 2.9),
        entry("Porch", 2.8),
        entry("Basement", 2.7)
    )
}

fn samples_body() -> String {
    r#"{
        "s1":[{"temperature":68.5,"humidity":41.0,"barometric_pressure":29.92,"observed":"2024-07-27T14:05:00.000Z"}],
        "s2":[{"temperature":70.1,"humidity":44.5,"observed":"2024-07-27T14:05:00.000Z"}],
        "s3":[{"temperature":66.0,"humidity":50.2,"observed":"2024-07-27T14:05:00.000Z"}]
    }"#
    .to_string()
}

fn valid_session() -> SessionState {
    SessionState {
        authorization: "abc".to_string(),
        access_token: "xyz".to_string(),
        valid: true,
    }
}

// ==============================================================================
// login flow
// ==============================================================================

#[tokio::test]
async fn authenticate_chains_authorize_then_token() {
    let server = CannedServer::start(vec![
        (200, r#"{"authorization":"abc"}"#.to_string()),
        (200, r#"{"accesstoken":"xyz"}"#.to_string()),
    ]);

    let session = authenticate(&cloud_client(&server), "a@b.c", "pw")
        .await
        .expect("auth should succeed");

    assert!(session.valid);
    assert_eq!(session.authorization, "abc");
    assert_eq!(session.access_token, "xyz");
    assert_eq!(server.paths(), vec!["/oauth/authorize", "/oauth/accesstoken"]);
}

#[tokio::test]
async fn authorize_failure_never_reaches_the_token_endpoint() {
    let server = CannedServer::start(vec![
        (400, r#"{"error":{"message":"bad credentials"}}"#.to_string()),
        // would answer a token request if one (incorrectly) arrived
        (200, r#"{"accesstoken":"xyz"}"#.to_string()),
    ]);

    let err = authenticate(&cloud_client(&server), "a@b.c", "wrong")
        .await
        .expect_err("auth should fail");

    assert!(matches!(err, AuthError::BadAuthentication(_)));
    assert!(err.to_string().contains("bad credentials"));
    assert_eq!(server.paths(), vec!["/oauth/authorize"]);
}

#[tokio::test]
async fn token_exchange_failure_is_bad_oauth() {
    let server = CannedServer::start(vec![
        (200, r#"{"authorization":"abc"}"#.to_string()),
        (500, "oops".to_string()),
    ]);

    let err = authenticate(&cloud_client(&server), "a@b.c", "pw")
        .await
        .expect_err("token step should fail");

    assert!(matches!(err, AuthError::BadOAuth(_)));
}

// ==============================================================================
// acquisition
// ==============================================================================

#[tokio::test]
async fn acquisition_populates_all_three_slots() {
    let server = CannedServer::start(vec![
        (200, sensors_body()),
        (200, samples_body()),
    ]);

    let mut table = ReadingTable::default();
    acquire(&cloud_client(&server), &valid_session(), &sensor_set(), &mut table)
        .await
        .expect("acquire should succeed");

    let s1 = table.slot(0);
    assert_eq!(s1.name, "Garage");
    assert_eq!(s1.temperature, 68.5);
    assert_eq!(s1.pressure_inhg, Some(29.92));
    assert_eq!(s1.temperature_bounds.min, 60.0);
    assert_eq!(s1.temperature_bounds.max, 75.0);

    // sensors 2 and 3 never report pressure in this deployment
    assert_eq!(table.slot(1).pressure_inhg, None);
    assert_eq!(table.slot(2).pressure_inhg, None);
    assert_eq!(table.slot(2).humidity, 50.2);
    assert_eq!(server.paths(), vec!["/devices/sensors", "/samples"]);
}

#[tokio::test]
async fn sensors_read_400_surfaces_the_api_message() {
    let server = CannedServer::start(vec![(
        400,
        r#"{"error":{"message":"invalid token"}}"#.to_string(),
    )]);

    let mut table = ReadingTable::default();
    let err = acquire(&cloud_client(&server), &valid_session(), &sensor_set(), &mut table)
        .await
        .expect_err("sensors read should fail");

    assert!(matches!(err, AcquireError::BadSensorsRead(_)));
    assert!(err.status_text().contains("invalid token"));
    // nothing was written
    assert_eq!(table.slot(0).name, "");
}

#[tokio::test]
async fn samples_failure_keeps_fresh_metadata_and_stale_samples() {
    // first pass: full success
    let server = CannedServer::start(vec![
        (200, sensors_body()),
        (200, samples_body()),
    ]);
    let mut table = ReadingTable::default();
    acquire(&cloud_client(&server), &valid_session(), &sensor_set(), &mut table)
        .await
        .expect("first acquire should succeed");

    // second pass: metadata arrives (with a drained battery), samples 500
    let drained = sensors_body().replace("2.9", "2.1");
    let server = CannedServer::start(vec![
        (200, drained),
        (500, "oops".to_string()),
    ]);
    let err = acquire(&cloud_client(&server), &valid_session(), &sensor_set(), &mut table)
        .await
        .expect_err("samples read should fail");

    assert!(matches!(err, AcquireError::BadSamplesRead(_)));
    // metadata half freshly written, sample half retains the previous cycle
    assert_eq!(table.slot(0).battery_voltage, 2.1);
    assert_eq!(table.slot(0).temperature, 68.5);
    assert_eq!(table.slot(0).observed_utc, "2024-07-27T14:05:00.000Z");
}

#[tokio::test]
async fn configured_id_missing_from_response_is_surfaced() {
    // response only knows s1 and s2
    let body = sensors_body().replace(r#","s3":"#, r#","other":"#);
    let server = CannedServer::start(vec![(200, body)]);

    let mut table = ReadingTable::default();
    let err = acquire(&cloud_client(&server), &valid_session(), &sensor_set(), &mut table)
        .await
        .expect_err("unknown id should fail");

    assert!(matches!(err, AcquireError::UnknownSensor { ref id } if id == "s3"));
}

// ==============================================================================
// telemetry forward
// ==============================================================================

#[tokio::test]
async fn forward_returns_the_service_success_flag() {
    let server = CannedServer::start(vec![(200, r#"{"success":false}"#.to_string())]);
    let client = TelemetryClient::new(server.base_url.clone(), 42, "key");

    let table = ReadingTable::default();
    assert!(!client.forward(&table).await);
    assert_eq!(server.paths(), vec!["/channels/42/bulk_update.json"]);

    let server = CannedServer::start(vec![(200, r#"{"success":true}"#.to_string())]);
    let client = TelemetryClient::new(server.base_url.clone(), 42, "key");
    assert!(client.forward(&table).await);
}

#[tokio::test]
async fn forward_embeds_the_write_key_in_the_payload() {
    let server = CannedServer::start(vec![(200, r#"{"success":true}"#.to_string())]);
    let client = TelemetryClient::new(server.base_url.clone(), 42, "secret-key");

    client.forward(&ReadingTable::default()).await;

    let requests = server.requests.lock().unwrap();
    let (_, body) = &requests[0];
    let parsed: serde_json::Value = serde_json::from_str(body).unwrap();
    assert_eq!(parsed["write_api_key"], "secret-key");
    assert_eq!(parsed["updates"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn forward_transport_failure_is_just_false() {
    // grab a port and close it again so the connect is refused
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let client = TelemetryClient::new(format!("http://127.0.0.1:{}", port), 42, "key");
    assert!(!client.forward(&ReadingTable::default()).await);
}
