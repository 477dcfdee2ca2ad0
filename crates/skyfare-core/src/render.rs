//! HTML fragments embedded by the page template.
//!
//! Every value that originates outside this crate (API payloads, form input)
//! is escaped before it reaches markup.

use crate::dataset::HistoricalFare;
use crate::live::LiveFlightRecord;
use crate::pipeline::RouteSummary;
use chrono::NaiveDate;
use serde_json::json;
use std::fmt::Display;

pub const NO_HISTORICAL_DATA: &str = "<p>No flight data available for selected dates.</p>";
pub const NO_LIVE_DATA: &str = "<p>No live flight data available at the moment.</p>";
pub const CHART_TITLE: &str = "Simulated Price Trend Over Time";

const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";
const CHART_ELEMENT_ID: &str = "price-trend-chart";
const TABLE_CLASSES: &str = "dataframe table table-striped";

pub const SUMMARY_COLUMNS: [&str; 4] = ["Route", "Avg Price", "Min Price", "Max Price"];
pub const LIVE_COLUMNS: [&str; 6] = [
    "icao24",
    "callsign",
    "origin_country",
    "velocity",
    "route",
    "price",
];

pub fn error_fragment(reason: &impl Display) -> String {
    format!(
        "<p>Error processing your request: {}</p>",
        html_escape::encode_text(&reason.to_string())
    )
}

/// Points per route, routes in first-seen order, each series sorted by date.
/// The sort is stable so same-day rows keep their table order.
pub fn route_series(fares: &[HistoricalFare]) -> Vec<(&str, Vec<(NaiveDate, i64)>)> {
    let mut series: Vec<(&str, Vec<(NaiveDate, i64)>)> = Vec::new();
    for fare in fares {
        match series.iter_mut().find(|(route, _)| *route == fare.route) {
            Some((_, points)) => points.push((fare.date, fare.price)),
            None => series.push((fare.route.as_str(), vec![(fare.date, fare.price)])),
        }
    }
    for (_, points) in &mut series {
        points.sort_by_key(|(date, _)| *date);
    }
    series
}

/// Interactive line chart, one trace per route in first-seen order.
pub fn price_chart(fares: &[HistoricalFare]) -> String {
    let traces: Vec<serde_json::Value> = route_series(fares)
        .into_iter()
        .map(|(route, points)| {
            let (x, y): (Vec<String>, Vec<i64>) = points
                .into_iter()
                .map(|(date, price)| (date.format("%Y-%m-%d").to_string(), price))
                .unzip();
            json!({
                "type": "scatter",
                "mode": "lines",
                "name": route,
                "legendgroup": route,
                "x": x,
                "y": y,
            })
        })
        .collect();

    let layout = json!({
        "title": { "text": CHART_TITLE },
        "xaxis": { "title": { "text": "Date" } },
        "yaxis": { "title": { "text": "Price" } },
        "legend": { "title": { "text": "Route" } },
    });

    format!(
        "<div id=\"{id}\" class=\"plotly-graph-div\" style=\"height:100%; width:100%;\"></div>\n\
         <script src=\"{cdn}\" charset=\"utf-8\"></script>\n\
         <script type=\"text/javascript\">Plotly.newPlot(\"{id}\", {data}, {layout}, {{\"responsive\": true}});</script>",
        id = CHART_ELEMENT_ID,
        cdn = PLOTLY_CDN,
        data = script_safe(&serde_json::Value::Array(traces).to_string()),
        layout = script_safe(&layout.to_string()),
    )
}

pub fn summary_table(summaries: &[RouteSummary]) -> String {
    let averages: Vec<f64> = summaries.iter().map(|s| s.average_price).collect();
    let rows = summaries
        .iter()
        .zip(format_float_column(&averages))
        .map(|(s, average)| {
            vec![
                s.route.clone(),
                average,
                s.min_price.to_string(),
                s.max_price.to_string(),
            ]
        });
    html_table(&SUMMARY_COLUMNS, rows)
}

/// Projects the first `limit` records onto the live column subset.
pub fn live_table(records: &[LiveFlightRecord], limit: usize) -> String {
    if records.is_empty() {
        return NO_LIVE_DATA.to_string();
    }

    let rows = records.iter().take(limit).map(|r| {
        vec![
            r.icao24.clone().unwrap_or_default(),
            r.callsign.clone().unwrap_or_default(),
            r.origin_country.clone().unwrap_or_default(),
            r.velocity.map(format_float).unwrap_or_default(),
            r.route.clone(),
            r.price.to_string(),
        ]
    });
    html_table(&LIVE_COLUMNS, rows)
}

const MAX_DECIMALS: usize = 6;

fn decimals_needed(value: f64) -> usize {
    let fixed = format!("{:.*}", MAX_DECIMALS, value);
    let fraction = fixed.split('.').nth(1).unwrap_or_default();
    fraction.trim_end_matches('0').len().max(1)
}

/// Up to six decimals, trailing zeros trimmed, at least one decimal kept.
pub fn format_float(value: f64) -> String {
    format!("{:.*}", decimals_needed(value), value)
}

/// Formats a whole column with one shared precision, the widest any cell
/// needs, so `114` next to `113.333333` prints as `114.000000`.
pub fn format_float_column(values: &[f64]) -> Vec<String> {
    let decimals = values.iter().map(|v| decimals_needed(*v)).max().unwrap_or(1);
    values
        .iter()
        .map(|v| format!("{:.*}", decimals, v))
        .collect()
}

fn html_table<I>(headers: &[&str], rows: I) -> String
where
    I: IntoIterator<Item = Vec<String>>,
{
    let mut html = format!(
        "<table border=\"1\" class=\"{}\">\n  <thead>\n    <tr style=\"text-align: right;\">\n",
        TABLE_CLASSES
    );
    for header in headers {
        html.push_str(&format!("      <th>{}</th>\n", html_escape::encode_text(header)));
    }
    html.push_str("    </tr>\n  </thead>\n  <tbody>\n");
    for row in rows {
        html.push_str("    <tr>\n");
        for cell in row {
            html.push_str(&format!("      <td>{}</td>\n", html_escape::encode_text(&cell)));
        }
        html.push_str("    </tr>\n");
    }
    html.push_str("  </tbody>\n</table>");
    html
}

// Keeps serialized JSON from closing the surrounding <script> element.
fn script_safe(json: &str) -> String {
    json.replace("</", "<\\/")
}
