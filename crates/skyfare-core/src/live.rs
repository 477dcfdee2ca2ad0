use crate::config::{BoundingBox, SkyFareConfig};
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use reqwest::StatusCode;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Positional layout of one OpenSky state vector.
pub const STATE_VECTOR_FIELDS: [&str; 17] = [
    "icao24",
    "callsign",
    "origin_country",
    "time_position",
    "last_contact",
    "longitude",
    "latitude",
    "baro_altitude",
    "on_ground",
    "velocity",
    "heading",
    "vertical_rate",
    "sensors",
    "geo_altitude",
    "squawk",
    "spi",
    "position_source",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LiveFlightRecord {
    pub icao24: Option<String>,
    pub callsign: Option<String>,
    pub origin_country: Option<String>,
    pub time_position: Option<i64>,
    pub last_contact: Option<i64>,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    pub baro_altitude: Option<f64>,
    pub on_ground: Option<bool>,
    pub velocity: Option<f64>,
    pub heading: Option<f64>,
    pub vertical_rate: Option<f64>,
    pub sensors: Option<Vec<i64>>,
    pub geo_altitude: Option<f64>,
    pub squawk: Option<String>,
    pub spi: Option<bool>,
    pub position_source: Option<i64>,
    pub timestamp: DateTime<Utc>,
    pub route: String,
    pub price: i64,
}

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP client setup failed: {0}")]
    Client(#[source] reqwest::Error),
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Unexpected HTTP status {0}")]
    Status(u16),
    #[error("Malformed response body: {0}")]
    Body(#[from] serde_json::Error),
}

/// What a single live fetch produced. The page only ever sees `records()`,
/// the variant tells callers and tests why a table came back empty.
#[derive(Debug)]
pub enum FetchOutcome {
    Fetched(Vec<LiveFlightRecord>),
    Empty,
    Failed(FetchError),
}

impl FetchOutcome {
    pub fn records(&self) -> &[LiveFlightRecord] {
        match self {
            FetchOutcome::Fetched(records) => records.as_slice(),
            FetchOutcome::Empty | FetchOutcome::Failed(_) => &[],
        }
    }

    pub fn into_records(self) -> Vec<LiveFlightRecord> {
        match self {
            FetchOutcome::Fetched(records) => records,
            FetchOutcome::Empty | FetchOutcome::Failed(_) => Vec::new(),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, FetchOutcome::Failed(_))
    }
}

/// Anything that can hand the page pipeline a table of live flights.
pub trait LiveSource: Send + Sync {
    fn fetch(&self) -> FetchOutcome;
}

/// Blocking client for the OpenSky `states/all` endpoint.
pub struct OpenSkyFetcher {
    url: String,
    bounding_box: BoundingBox,
    timeout: Duration,
}

impl OpenSkyFetcher {
    pub fn new(config: &SkyFareConfig) -> Self {
        Self {
            url: config.api_url.clone(),
            bounding_box: config.bounding_box,
            timeout: config.timeout(),
        }
    }

    fn request_body(&self) -> Result<String, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(FetchError::Client)?;

        let response = client
            .get(&self.url)
            .query(&self.bounding_box.query_pairs())
            .send()
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetchError::Status(status.as_u16()));
        }

        response.text().map_err(|e| self.classify(e))
    }

    fn classify(&self, error: reqwest::Error) -> FetchError {
        if error.is_timeout() {
            FetchError::Timeout(self.timeout)
        } else {
            FetchError::Transport(error)
        }
    }
}

impl LiveSource for OpenSkyFetcher {
    fn fetch(&self) -> FetchOutcome {
        info!(
            "Fetching live state vectors — url={} timeout={:?}",
            self.url, self.timeout
        );

        let outcome = match self.request_body() {
            Ok(body) => parse_states_payload(&body),
            Err(e) => FetchOutcome::Failed(e),
        };

        match &outcome {
            FetchOutcome::Fetched(records) => {
                info!("Live fetch succeeded — records={}", records.len())
            }
            FetchOutcome::Empty => info!("Live fetch returned no state vectors"),
            FetchOutcome::Failed(e) => warn!("Error fetching live data: {}", e),
        }
        outcome
    }
}

/// Decodes a states response body. The capture timestamp is taken once the
/// body has parsed and is shared by every record.
pub fn parse_states_payload(body: &str) -> FetchOutcome {
    let value: Value = match serde_json::from_str(body) {
        Ok(v) => v,
        Err(e) => return FetchOutcome::Failed(FetchError::Body(e)),
    };
    records_from_payload(&value, Utc::now())
}

pub fn records_from_payload(payload: &Value, captured_at: DateTime<Utc>) -> FetchOutcome {
    let states = match payload.get("states") {
        Some(Value::Array(states)) if !states.is_empty() => states,
        Some(Value::Array(_)) | Some(Value::Null) | None => return FetchOutcome::Empty,
        Some(other) => {
            warn!("Ignoring non-array 'states' field — kind={}", json_kind(other));
            return FetchOutcome::Empty;
        }
    };

    let mut records = Vec::with_capacity(states.len());
    for (index, state) in states.iter().enumerate() {
        match state {
            Value::Array(fields) => {
                if fields.len() != STATE_VECTOR_FIELDS.len() {
                    debug!(
                        "Coercing state vector with unexpected arity — index={} fields={}",
                        index,
                        fields.len()
                    );
                }
                records.push(record_from_state(fields, captured_at));
            }
            other => debug!(
                "Skipping non-array state vector — index={} kind={}",
                index,
                json_kind(other)
            ),
        }
    }

    if records.is_empty() {
        FetchOutcome::Empty
    } else {
        FetchOutcome::Fetched(records)
    }
}

/// Maps one positional state vector onto a record. Missing trailing fields
/// read as null and extra ones are ignored.
pub fn record_from_state(fields: &[Value], captured_at: DateTime<Utc>) -> LiveFlightRecord {
    static NULL: Value = Value::Null;
    let field = |i: usize| fields.get(i).unwrap_or(&NULL);

    let origin_country = as_text(field(2));
    let velocity = as_f64(field(9));

    LiveFlightRecord {
        icao24: as_text(field(0)),
        callsign: as_text(field(1)),
        route: estimated_route(origin_country.as_deref()),
        price: estimated_price(velocity),
        origin_country,
        time_position: as_i64(field(3)),
        last_contact: as_i64(field(4)),
        longitude: as_f64(field(5)),
        latitude: as_f64(field(6)),
        baro_altitude: as_f64(field(7)),
        on_ground: as_bool(field(8)),
        velocity,
        heading: as_f64(field(10)),
        vertical_rate: as_f64(field(11)),
        sensors: as_sensor_list(field(12)),
        geo_altitude: as_f64(field(13)),
        squawk: as_text(field(14)),
        spi: as_bool(field(15)),
        position_source: as_i64(field(16)),
        timestamp: captured_at,
    }
}

pub fn estimated_route(origin_country: Option<&str>) -> String {
    format!("{} (Est.)", origin_country.unwrap_or("Unknown"))
}

/// Display-only placeholder price: `100 + (velocity mod 50)`, truncated.
pub fn estimated_price(velocity: Option<f64>) -> i64 {
    let v = velocity.filter(|v| v.is_finite()).unwrap_or(0.0);
    100 + v.rem_euclid(50.0).trunc() as i64
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    }
}

fn as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

fn as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_i64().map(|i| i != 0),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn as_sensor_list(value: &Value) -> Option<Vec<i64>> {
    match value {
        Value::Array(items) => Some(items.iter().filter_map(as_i64).collect()),
        _ => None,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
