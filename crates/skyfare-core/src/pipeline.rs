use crate::config::SkyFareConfig;
use crate::dataset::{generate_fares, HistoricalFare};
use crate::dates::{DateInputError, DateRange};
use crate::live::{FetchOutcome, LiveSource};
use crate::render;
use log::{debug, info};
use serde::{Deserialize, Serialize};

/// Fields posted by the refresh form. Both are free text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshForm {
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
}

impl RefreshForm {
    pub fn new(start_date: &str, end_date: &str) -> Self {
        Self {
            start_date: Some(start_date.to_string()),
            end_date: Some(end_date.to_string()),
        }
    }

    pub fn date_range(&self) -> Result<DateRange, DateInputError> {
        DateRange::parse(self.start_date.as_deref(), self.end_date.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteSummary {
    pub route: String,
    pub average_price: f64,
    pub min_price: i64,
    pub max_price: i64,
}

/// Historical half of a page, before it is turned into markup.
#[derive(Debug, Clone, PartialEq)]
pub enum HistoricalView {
    NotRequested,
    InvalidInput(DateInputError),
    NoData,
    Trend {
        fares: Vec<HistoricalFare>,
        summaries: Vec<RouteSummary>,
    },
}

#[derive(Debug)]
pub struct PageReport {
    pub historical: HistoricalView,
    pub live: FetchOutcome,
}

/// Markup handed to the page template. `None` leaves a slot empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageFragments {
    pub chart: Option<String>,
    pub summary_table: Option<String>,
    pub live_table: String,
}

pub fn filter_fares(fares: &[HistoricalFare], range: &DateRange) -> Vec<HistoricalFare> {
    fares
        .iter()
        .filter(|fare| range.contains(fare.date))
        .cloned()
        .collect()
}

/// Average/min/max per route, in the order routes first appear.
pub fn summarize_routes(fares: &[HistoricalFare]) -> Vec<RouteSummary> {
    struct Accumulator<'a> {
        route: &'a str,
        total: i64,
        count: usize,
        min: i64,
        max: i64,
    }

    let mut groups: Vec<Accumulator> = Vec::new();
    for fare in fares {
        match groups.iter_mut().find(|g| g.route == fare.route) {
            Some(group) => {
                group.total += fare.price;
                group.count += 1;
                group.min = group.min.min(fare.price);
                group.max = group.max.max(fare.price);
            }
            None => groups.push(Accumulator {
                route: &fare.route,
                total: fare.price,
                count: 1,
                min: fare.price,
                max: fare.price,
            }),
        }
    }

    groups
        .into_iter()
        .map(|g| RouteSummary {
            route: g.route.to_string(),
            average_price: g.total as f64 / g.count as f64,
            min_price: g.min,
            max_price: g.max,
        })
        .collect()
}

pub fn historical_view(fares: &[HistoricalFare], form: Option<&RefreshForm>) -> HistoricalView {
    let Some(form) = form else {
        return HistoricalView::NotRequested;
    };

    let range = match form.date_range() {
        Ok(range) => range,
        Err(e) => {
            info!("Rejected refresh form — reason={}", e);
            return HistoricalView::InvalidInput(e);
        }
    };

    let filtered = filter_fares(fares, &range);
    debug!(
        "Filtered synthetic fares — start={} end={} rows={}",
        range.start,
        range.end,
        filtered.len()
    );

    if filtered.is_empty() {
        return HistoricalView::NoData;
    }

    let summaries = summarize_routes(&filtered);
    HistoricalView::Trend {
        fares: filtered,
        summaries,
    }
}

/// Runs one page view: generates the synthetic table, fetches live flights,
/// and applies the optional date filter. Never fails.
pub fn build_page(
    config: &SkyFareConfig,
    source: &dyn LiveSource,
    form: Option<&RefreshForm>,
) -> PageReport {
    let fares = generate_fares(config);
    let live = source.fetch();
    let historical = historical_view(&fares, form);
    PageReport { historical, live }
}

impl PageReport {
    pub fn render(&self, live_row_limit: usize) -> PageFragments {
        let (chart, summary_table) = match &self.historical {
            HistoricalView::NotRequested => (None, None),
            HistoricalView::InvalidInput(e) => (Some(render::error_fragment(e)), None),
            HistoricalView::NoData => (Some(render::NO_HISTORICAL_DATA.to_string()), None),
            HistoricalView::Trend { fares, summaries } => (
                Some(render::price_chart(fares)),
                Some(render::summary_table(summaries)),
            ),
        };

        PageFragments {
            chart,
            summary_table,
            live_table: render::live_table(self.live.records(), live_row_limit),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    struct NoFlights;

    impl LiveSource for NoFlights {
        fn fetch(&self) -> FetchOutcome {
            FetchOutcome::Empty
        }
    }

    fn date(month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, month, day).unwrap()
    }

    fn default_fares() -> Vec<HistoricalFare> {
        generate_fares(&SkyFareConfig::default())
    }

    #[test]
    fn test_filter_count_matches_day_count() {
        let fares = default_fares();
        for (start, end) in [
            (date(6, 1), date(6, 1)),
            (date(6, 1), date(7, 14)),
            (date(6, 10), date(6, 20)),
            (date(6, 30), date(7, 1)),
            (date(7, 14), date(7, 14)),
        ] {
            let range = DateRange::new(start, end);
            assert_eq!(
                filter_fares(&fares, &range).len(),
                range.day_count() * 5,
                "{}..={}",
                start,
                end
            );
        }
    }

    #[test]
    fn test_range_overlapping_window_edge() {
        let fares = default_fares();
        let range = DateRange::new(date(5, 25), date(6, 2));
        assert_eq!(filter_fares(&fares, &range).len(), 10);
    }

    #[test]
    fn test_outside_window_is_no_data() {
        let form = RefreshForm::new("2025-08-01", "2025-08-02");
        let view = historical_view(&default_fares(), Some(&form));
        assert_eq!(view, HistoricalView::NoData);
    }

    #[test]
    fn test_inverted_range_is_no_data() {
        let form = RefreshForm::new("2025-06-10", "2025-06-01");
        let view = historical_view(&default_fares(), Some(&form));
        assert_eq!(view, HistoricalView::NoData);
    }

    #[test]
    fn test_unparseable_dates_are_invalid_input() {
        let form = RefreshForm::new("first of june", "2025-06-02");
        let view = historical_view(&default_fares(), Some(&form));
        assert!(matches!(view, HistoricalView::InvalidInput(DateInputError::Unparseable(_))));

        let missing = RefreshForm {
            start_date: Some("2025-06-01".to_string()),
            end_date: None,
        };
        let view = historical_view(&default_fares(), Some(&missing));
        assert_eq!(view, HistoricalView::InvalidInput(DateInputError::Missing("end_date")));
    }

    #[test]
    fn test_summary_matches_arithmetic() {
        let fares = default_fares();
        let range = DateRange::new(date(6, 1), date(6, 7));
        let filtered = filter_fares(&fares, &range);
        let summaries = summarize_routes(&filtered);
        assert_eq!(summaries.len(), 5);

        for summary in &summaries {
            let prices: Vec<i64> = filtered
                .iter()
                .filter(|f| f.route == summary.route)
                .map(|f| f.price)
                .collect();
            assert_eq!(prices.len(), 7);
            let mean = prices.iter().sum::<i64>() as f64 / prices.len() as f64;
            assert!((summary.average_price - mean).abs() < 1e-9);
            assert_eq!(summary.min_price, *prices.iter().min().unwrap());
            assert_eq!(summary.max_price, *prices.iter().max().unwrap());
        }
    }

    #[test]
    fn test_summary_first_seen_order() {
        let filtered = filter_fares(&default_fares(), &DateRange::new(date(6, 1), date(7, 14)));
        let summaries = summarize_routes(&filtered);
        let routes: Vec<&str> = summaries.iter().map(|s| s.route.as_str()).collect();
        assert_eq!(
            routes,
            vec![
                "Sydney-Melbourne",
                "Brisbane-Sydney",
                "Melbourne-Perth",
                "Sydney-Perth",
                "Adelaide-Sydney"
            ]
        );
    }

    #[test]
    fn test_single_occurrence_summary() {
        let fares = default_fares();
        let first = fares
            .iter()
            .find(|f| f.route == "Sydney-Melbourne")
            .cloned()
            .unwrap();
        let summaries = summarize_routes(&[first.clone()]);
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].average_price, first.price as f64);
        assert_eq!(summaries[0].min_price, first.price);
        assert_eq!(summaries[0].max_price, first.price);
    }

    #[test]
    fn test_single_day_refresh() {
        let form = RefreshForm::new("2025-06-01", "2025-06-01");
        let report = build_page(&SkyFareConfig::default(), &NoFlights, Some(&form));
        let HistoricalView::Trend { fares, summaries } = &report.historical else {
            panic!("expected a trend, got {:?}", report.historical);
        };
        assert_eq!(fares.len(), 5);
        assert_eq!(summaries.len(), 5);
        for summary in summaries {
            assert_eq!(summary.average_price, summary.min_price as f64);
            assert_eq!(summary.min_price, summary.max_price);
        }

        let fragments = report.render(20);
        assert!(fragments.chart.unwrap().contains("Plotly.newPlot"));
        assert!(fragments.summary_table.unwrap().contains("<td>Sydney-Melbourne</td>"));
    }

    #[test]
    fn test_get_renders_live_table_only() {
        let report = build_page(&SkyFareConfig::default(), &NoFlights, None);
        assert_eq!(report.historical, HistoricalView::NotRequested);

        let fragments = report.render(20);
        assert_eq!(fragments.chart, None);
        assert_eq!(fragments.summary_table, None);
        assert_eq!(fragments.live_table, render::NO_LIVE_DATA);
    }

    #[test]
    fn test_no_data_message_has_no_summary() {
        let form = RefreshForm::new("2025-08-01", "2025-08-02");
        let fragments = build_page(&SkyFareConfig::default(), &NoFlights, Some(&form)).render(20);
        assert_eq!(fragments.chart.as_deref(), Some(render::NO_HISTORICAL_DATA));
        assert_eq!(fragments.summary_table, None);
    }

    #[test]
    fn test_invalid_input_keeps_live_table() {
        let form = RefreshForm::new("banana", "2025-06-02");
        let fragments = build_page(&SkyFareConfig::default(), &NoFlights, Some(&form)).render(20);
        let chart = fragments.chart.unwrap();
        assert!(chart.starts_with("<p>Error processing your request:"));
        assert!(chart.contains("banana"));
        assert_eq!(fragments.summary_table, None);
        assert_eq!(fragments.live_table, render::NO_LIVE_DATA);
    }
}
