use crate::config::SkyFareConfig;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoricalFare {
    pub date: NaiveDate,
    pub route: String,
    pub price: i64,
}

/// Synthetic fare signal for the i-th generated row.
pub fn synthetic_price(index: usize) -> i64 {
    (100 + index % 30 + (index % 5) * 10) as i64
}

/// Builds the synthetic fare table.
///
/// The day list is repeated once per route while the route list cycles row by
/// row, so every (date, route) pair appears exactly once when the day count
/// and route count are coprime (44 and 5 for the default window).
pub fn generate_fares(config: &SkyFareConfig) -> Vec<HistoricalFare> {
    let days = config.window.days();
    let routes = &config.routes;
    if days.is_empty() || routes.is_empty() {
        return Vec::new();
    }

    let total = days.len() * routes.len();
    let fares: Vec<HistoricalFare> = (0..total)
        .map(|i| HistoricalFare {
            date: days[i % days.len()],
            route: routes[i % routes.len()].clone(),
            price: synthetic_price(i),
        })
        .collect();

    log::debug!(
        "Generated synthetic fares — rows={} days={} routes={}",
        fares.len(),
        days.len(),
        routes.len()
    );
    fares
}
