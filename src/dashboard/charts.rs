//! Chart generation for the dashboard.
//!
//! - **Income vs Expenses**: monthly income and expense totals over the last twelve months
//! - **Expense Categories**: this month's expenses per category, largest first

use charming::{
    Chart,
    component::{Axis, Grid, Legend, Title},
    element::{AxisLabel, AxisType, Emphasis, EmphasisFocus},
    series::{Line, bar},
};
use time::Date;

use crate::charts::{currency_formatter, currency_tooltip, format_month_label};

use super::aggregation::Totals;

pub(super) fn income_expense_chart(months: &[Date], totals: &[Totals]) -> Chart {
    let labels: Vec<String> = months.iter().copied().map(format_month_label).collect();
    let income: Vec<f64> = totals.iter().map(|totals| totals.income).collect();
    let expenses: Vec<f64> = totals.iter().map(|totals| totals.expenses).collect();

    Chart::new()
        .title(
            Title::new()
                .text("Income vs Expenses")
                .subtext("Last twelve months")
                .left(20)
                .top("1%"),
        )
        .tooltip(currency_tooltip())
        .legend(Legend::new().right(20).top("1%"))
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .top(90)
                .contain_label(true),
        )
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .axis_label(AxisLabel::new().formatter(currency_formatter())),
        )
        .series(Line::new().name("Income").data(income))
        .series(Line::new().name("Expenses").data(expenses))
}

pub(super) fn expense_categories_chart(categories: &[(String, f64)]) -> Chart {
    let labels: Vec<String> = categories.iter().map(|(name, _)| name.clone()).collect();
    let amounts: Vec<f64> = categories.iter().map(|(_, amount)| *amount).collect();

    Chart::new()
        .title(
            Title::new()
                .text("Expense Categories")
                .subtext("This month")
                .left(20)
                .top("1%"),
        )
        .tooltip(currency_tooltip())
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .top(90)
                .contain_label(true),
        )
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .axis_label(AxisLabel::new().formatter(currency_formatter())),
        )
        .series(
            bar::Bar::new()
                .name("Expenses")
                .emphasis(Emphasis::new().focus(EmphasisFocus::Series))
                .data(amounts),
        )
}
