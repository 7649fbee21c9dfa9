//! ECharts configuration for the dashboard and monthly summary.
//!
//! Each chart is serialized to JSON and initialised by a script in the page head,
//! see [charts_script].

use charming::{
    Chart,
    component::{Axis, Grid, Title},
    element::{AxisLabel, AxisPointer, AxisPointerType, AxisType, JsFunction, Tooltip, Trigger},
    series::bar,
};
use maud::{Markup, PreEscaped, html};
use time::Date;

use crate::{category::CategoryName, date_range::month_label, html::HeadElement, money::Amount};

/// A chart with its HTML container ID and ECharts configuration.
pub(super) struct DashboardChart {
    /// The HTML element ID to use for the chart (kebab-case)
    pub id: &'static str,
    /// The ECharts configuration as a JSON string
    pub options: String,
}

/// Renders the HTML containers for `charts`.
pub(super) fn charts_view(charts: &[DashboardChart]) -> Markup {
    html!(
        section
            id="charts"
            class="w-full mx-auto mb-4"
        {
            div class="grid grid-cols-1 gap-4"
            {
                @for chart in charts {
                    div
                        id=(chart.id)
                        class="min-h-[380px] rounded dark:bg-gray-100"
                    {}
                }
            }
        }
    )
}

/// Generates the JavaScript that initialises each chart once the page has loaded.
///
/// Charts follow the browser's colour scheme and resize with the window.
pub(super) fn charts_script(charts: &[DashboardChart]) -> HeadElement {
    let script_content = charts
        .iter()
        .map(|chart| {
            format!(
                r#"(function() {{
                    const chartDom = document.getElementById("{}");
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

/// Bar chart of the filtered expenses summed per category.
pub(super) fn category_breakdown_chart(category_totals: &[(CategoryName, Amount)]) -> Chart {
    let labels: Vec<String> = category_totals
        .iter()
        .map(|(category, _)| category.to_string())
        .collect();
    let values: Vec<f64> = category_totals
        .iter()
        .map(|(_, total)| total.as_f64())
        .collect();

    currency_bar_chart("Spending by Category", "Filtered expenses", labels)
        .series(bar::Bar::new().name("Spent").data(values))
}

/// Bar chart of the total spent in each month, oldest first.
pub(super) fn monthly_totals_chart(monthly_totals: &[(Date, Amount)]) -> Chart {
    let labels: Vec<String> = monthly_totals
        .iter()
        .map(|(month, _)| month_label(*month))
        .collect();
    let values: Vec<f64> = monthly_totals
        .iter()
        .map(|(_, total)| total.as_f64())
        .collect();

    currency_bar_chart("Monthly Spending", "All expenses", labels)
        .series(bar::Bar::new().name("Spent").data(values))
}

fn currency_bar_chart(title: &str, subtitle: &str, labels: Vec<String>) -> Chart {
    Chart::new()
        .title(Title::new().text(title).subtext(subtitle))
        .tooltip(currency_tooltip())
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .contain_label(true),
        )
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .axis_label(AxisLabel::new().formatter(currency_formatter())),
        )
}

#[inline]
fn currency_formatter() -> JsFunction {
    JsFunction::new_with_args(
        "number",
        "const currencyFormatter = new Intl.NumberFormat('en-IN', {
              style: 'currency',
              currency: 'INR'
            });
            return (number) ? currencyFormatter.format(number) : \"-\";",
    )
}

/// Creates a tooltip configuration for currency values
fn currency_tooltip() -> Tooltip {
    Tooltip::new()
        .trigger(Trigger::Axis)
        .value_formatter(currency_formatter())
        .axis_pointer(AxisPointer::new().type_(AxisPointerType::Shadow))
}
