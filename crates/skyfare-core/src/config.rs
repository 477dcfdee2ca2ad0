use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const OPENSKY_STATES_URL: &str = "https://opensky-network.org/api/states/all";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_LIVE_ROW_LIMIT: usize = 20;

pub const DEFAULT_ROUTES: [&str; 5] = [
    "Sydney-Melbourne",
    "Brisbane-Sydney",
    "Melbourne-Perth",
    "Sydney-Perth",
    "Adelaide-Sydney",
];

/// Min/max latitude and longitude used to scope the states query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub lamin: f64,
    pub lomin: f64,
    pub lamax: f64,
    pub lomax: f64,
}

impl BoundingBox {
    /// Australian airspace.
    pub const AUSTRALIA: BoundingBox = BoundingBox {
        lamin: -44.0,
        lomin: 113.0,
        lamax: -10.0,
        lomax: 154.0,
    };

    /// Query pairs in the order the states endpoint documents them.
    pub fn query_pairs(&self) -> [(&'static str, String); 4] {
        [
            ("lamin", format!("{:.1}", self.lamin)),
            ("lomin", format!("{:.1}", self.lomin)),
            ("lamax", format!("{:.1}", self.lamax)),
            ("lomax", format!("{:.1}", self.lomax)),
        ]
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::AUSTRALIA
    }
}

/// Closed calendar window covered by the synthetic fare table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn days(&self) -> Vec<NaiveDate> {
        self.start
            .iter_days()
            .take_while(|day| *day <= self.end)
            .collect()
    }
}

impl Default for DateWindow {
    fn default() -> Self {
        // 2025-06-01..=2025-07-14, fixed so output never depends on the wall clock.
        Self {
            start: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap_or_default(),
            end: NaiveDate::from_ymd_opt(2025, 7, 14).unwrap_or_default(),
        }
    }
}

/// Everything the generator, fetcher and page pipeline need, passed in
/// explicitly instead of living in module globals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkyFareConfig {
    pub api_url: String,
    pub bounding_box: BoundingBox,
    pub timeout_secs: u64,
    pub routes: Vec<String>,
    pub window: DateWindow,
    pub live_row_limit: usize,
}

impl SkyFareConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for SkyFareConfig {
    fn default() -> Self {
        Self {
            api_url: OPENSKY_STATES_URL.to_string(),
            bounding_box: BoundingBox::AUSTRALIA,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            routes: DEFAULT_ROUTES.iter().map(|r| r.to_string()).collect(),
            window: DateWindow::default(),
            live_row_limit: DEFAULT_LIVE_ROW_LIMIT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_window_is_44_days() {
        let window = DateWindow::default();
        let days = window.days();
        assert_eq!(days.len(), 44);
        assert_eq!(days[0], NaiveDate::from_ymd_opt(2025, 6, 1).unwrap());
        assert_eq!(days[43], NaiveDate::from_ymd_opt(2025, 7, 14).unwrap());
    }

    #[test]
    fn test_bounding_box_query() {
        let pairs = BoundingBox::AUSTRALIA.query_pairs();
        assert_eq!(pairs[0], ("lamin", "-44.0".to_string()));
        assert_eq!(pairs[1], ("lomin", "113.0".to_string()));
        assert_eq!(pairs[2], ("lamax", "-10.0".to_string()));
        assert_eq!(pairs[3], ("lomax", "154.0".to_string()));
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let config: SkyFareConfig =
            serde_json::from_str(r#"{ "timeout_secs": 3, "live_row_limit": 5 }"#).unwrap();
        assert_eq!(config.timeout(), Duration::from_secs(3));
        assert_eq!(config.live_row_limit, 5);
        assert_eq!(config.routes.len(), 5);
        assert_eq!(config.api_url, OPENSKY_STATES_URL);
    }
}
