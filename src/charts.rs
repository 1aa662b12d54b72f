//! Shared pieces for the ECharts charts on the dashboard, budget and transactions pages.
//!
//! Each chart is built with `charming`, serialized to JSON and initialised by an inline script
//! in the page head.

use charming::element::{AxisPointer, AxisPointerType, JsFunction, Tooltip, Trigger};
use maud::{Markup, PreEscaped, html};
use time::{Date, Month};

use crate::html::HeadElement;

/// The path of the ECharts library under the static route.
const ECHARTS_SCRIPT: &str = "/static/echarts.6.0.0.min.js";

/// A chart with its HTML container ID and ECharts configuration.
pub struct PageChart {
    /// The HTML element ID to use for the chart (kebab-case)
    pub id: &'static str,
    /// The ECharts configuration as a JSON string
    pub options: String,
}

/// Renders the HTML container for a single chart.
pub fn chart_container(chart: &PageChart) -> Markup {
    html!(
        div
            id=(chart.id)
            class="min-h-[380px] w-full rounded dark:bg-gray-100"
        {}
    )
}

/// The script elements that load ECharts and initialise `charts`.
///
/// Creates scripts that initialize ECharts instances with dark mode support
/// and responsive resizing.
pub fn charts_head_elements(charts: &[PageChart]) -> [HeadElement; 2] {
    [
        HeadElement::ScriptLink(ECHARTS_SCRIPT.to_owned()),
        charts_script(charts),
    ]
}

fn charts_script(charts: &[PageChart]) -> HeadElement {
    let script_content = charts
        .iter()
        .map(|chart| {
            format!(
                r#"(function() {{
                    const chartDom = document.getElementById("{}");
                    if (!chartDom) return;
                    const chart = echarts.init(chartDom);
                    const option = {};
                    chart.setOption(option);

                    window.addEventListener('resize', chart.resize);

                    const darkModeMediaQuery = window.matchMedia('(prefers-color-scheme: dark)');
                    const updateTheme = () => {{
                        const isDarkMode = darkModeMediaQuery.matches;
                        chart.setTheme(isDarkMode ? 'dark' : 'default');
                    }}
                    darkModeMediaQuery.addEventListener('change', updateTheme);
                    updateTheme();
                }})();"#,
                chart.id, chart.options
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let wrapped_script = format!(
        "document.addEventListener('DOMContentLoaded', function() {{\n{}\n}});",
        script_content
    );

    HeadElement::ScriptSource(PreEscaped(wrapped_script))
}

#[inline]
pub fn currency_formatter() -> JsFunction {
    JsFunction::new_with_args(
        "number",
        "const currencyFormatter = new Intl.NumberFormat('en-US', {
              style: 'currency',
              currency: 'USD'
            });
            return (number) ? currencyFormatter.format(number) : \"-\";",
    )
}

/// Creates a tooltip configuration for currency values
pub fn currency_tooltip() -> Tooltip {
    Tooltip::new()
        .trigger(Trigger::Axis)
        .value_formatter(currency_formatter())
        .axis_pointer(AxisPointer::new().type_(AxisPointerType::Shadow))
}

/// Three-letter abbreviation of a month, e.g. "Jan".
pub fn short_month_name(month: Month) -> &'static str {
    match month {
        Month::January => "Jan",
        Month::February => "Feb",
        Month::March => "Mar",
        Month::April => "Apr",
        Month::May => "May",
        Month::June => "Jun",
        Month::July => "Jul",
        Month::August => "Aug",
        Month::September => "Sep",
        Month::October => "Oct",
        Month::November => "Nov",
        Month::December => "Dec",
    }
}

/// Label for a day on a chart axis, e.g. "Jan 05".
pub fn format_day_label(date: Date) -> String {
    format!("{} {:02}", short_month_name(date.month()), date.day())
}

/// Label for a month on a chart axis, e.g. "Jan 2025".
pub fn format_month_label(month: Date) -> String {
    format!("{} {}", short_month_name(month.month()), month.year())
}

#[cfg(test)]
mod chart_label_tests {
    use time::macros::date;

    use crate::html::HeadElement;

    use super::{PageChart, charts_head_elements, format_day_label, format_month_label};

    #[test]
    fn day_label_is_short_month_and_padded_day() {
        assert_eq!(format_day_label(date!(2025 - 01 - 05)), "Jan 05");
        assert_eq!(format_day_label(date!(2025 - 12 - 25)), "Dec 25");
    }

    #[test]
    fn month_label_has_year() {
        assert_eq!(format_month_label(date!(2024 - 11 - 01)), "Nov 2024");
    }

    #[test]
    fn script_initialises_each_chart() {
        let charts = [
            PageChart {
                id: "first-chart",
                options: "{}".to_owned(),
            },
            PageChart {
                id: "second-chart",
                options: "{}".to_owned(),
            },
        ];

        let [link, script] = charts_head_elements(&charts);

        assert!(matches!(link, HeadElement::ScriptLink(path) if path.contains("echarts")));
        let HeadElement::ScriptSource(script) = script else {
            panic!("want inline script source");
        };
        assert!(script.0.contains("\"first-chart\""));
        assert!(script.0.contains("\"second-chart\""));
    }
}
