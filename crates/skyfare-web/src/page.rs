use skyfare_core::{DateWindow, PageFragments};

const INDEX_TEMPLATE: &str = include_str!("../templates/index.html");

/// Fills the index template in a single pass, so text inside a fragment is
/// never mistaken for another placeholder. Unknown placeholders render empty.
pub fn render_index(fragments: &PageFragments, window: &DateWindow) -> String {
    let window_start = window.start.format("%Y-%m-%d").to_string();
    let window_end = window.end.format("%Y-%m-%d").to_string();

    fill_template(INDEX_TEMPLATE, |name| match name {
        "chart" => fragments.chart.as_deref(),
        "summary_table" => fragments.summary_table.as_deref(),
        "live_table" => Some(fragments.live_table.as_str()),
        "window_start" => Some(window_start.as_str()),
        "window_end" => Some(window_end.as_str()),
        _ => None,
    })
}

fn fill_template<'a, F>(template: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<&'a str>,
{
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find("{{") {
        out.push_str(&rest[..open]);
        let after = &rest[open + 2..];
        match after.find("}}") {
            Some(close) => {
                out.push_str(lookup(after[..close].trim()).unwrap_or_default());
                rest = &after[close + 2..];
            }
            None => {
                out.push_str(&rest[open..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}
