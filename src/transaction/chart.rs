//! Daily income and expense totals for the chart on the transactions page.

use std::collections::BTreeMap;

use charming::{
    Chart,
    component::{Axis, Grid, Legend, Title},
    element::{AxisLabel, AxisType, Emphasis, EmphasisFocus},
    series::bar,
};
use time::Date;

use crate::charts::{currency_formatter, currency_tooltip, format_day_label};

use super::{Transaction, TransactionType};

/// The money earned and spent on one day.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub(crate) struct DailyTotals {
    pub(crate) income: f64,
    pub(crate) expenses: f64,
}

/// Sum transactions per date, oldest date first.
///
/// Income and expenses are summed separately, so a day with both produces one bucket holding
/// both totals.
pub(crate) fn group_by_date(transactions: &[Transaction]) -> BTreeMap<Date, DailyTotals> {
    let mut buckets: BTreeMap<Date, DailyTotals> = BTreeMap::new();

    for transaction in transactions {
        let totals = buckets.entry(transaction.date).or_default();

        match transaction.transaction_type {
            TransactionType::Income => totals.income += transaction.amount,
            TransactionType::Expense => totals.expenses += transaction.amount,
        }
    }

    buckets
}

/// Bar chart of income next to expenses for each day that has transactions.
pub(crate) fn income_expense_chart(transactions: &[Transaction]) -> Chart {
    let buckets = group_by_date(transactions);

    let labels: Vec<String> = buckets.keys().copied().map(format_day_label).collect();
    let income: Vec<f64> = buckets.values().map(|totals| totals.income).collect();
    let expenses: Vec<f64> = buckets.values().map(|totals| totals.expenses).collect();

    Chart::new()
        .title(Title::new().text("Income vs Expenses").left(20).top("1%"))
        .tooltip(currency_tooltip())
        .legend(Legend::new().right(20).top("1%"))
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .top(70)
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
                .name("Income")
                .emphasis(Emphasis::new().focus(EmphasisFocus::Series))
                .data(income),
        )
        .series(
            bar::Bar::new()
                .name("Expenses")
                .emphasis(Emphasis::new().focus(EmphasisFocus::Series))
                .data(expenses),
        )
}

#[cfg(test)]
mod tests {
    use time::{Date, macros::date};

    use crate::{
        transaction::{Transaction, TransactionType},
        user::UserID,
    };

    use super::{DailyTotals, group_by_date, income_expense_chart};

    fn transaction(
        id: i64,
        transaction_type: TransactionType,
        amount: f64,
        date: Date,
    ) -> Transaction {
        Transaction {
            id,
            user_id: UserID::new(1),
            transaction_type,
            category: "Misc".to_owned(),
            amount,
            date,
            description: None,
        }
    }

    #[test]
    fn mixed_types_on_same_date_accumulate_independently() {
        let day = date!(2025 - 03 - 14);
        let transactions = vec![
            transaction(1, TransactionType::Income, 1000.0, day),
            transaction(2, TransactionType::Expense, 40.0, day),
            transaction(3, TransactionType::Expense, 10.0, day),
            transaction(4, TransactionType::Income, 5.5, day),
        ];

        let buckets = group_by_date(&transactions);

        assert_eq!(buckets.len(), 1);
        assert_eq!(
            buckets[&day],
            DailyTotals {
                income: 1005.5,
                expenses: 50.0,
            }
        );
    }

    #[test]
    fn buckets_are_ordered_by_date() {
        let transactions = vec![
            transaction(1, TransactionType::Expense, 1.0, date!(2025 - 03 - 20)),
            transaction(2, TransactionType::Expense, 2.0, date!(2024 - 12 - 31)),
            transaction(3, TransactionType::Income, 3.0, date!(2025 - 01 - 02)),
        ];

        let dates: Vec<Date> = group_by_date(&transactions).into_keys().collect();

        assert_eq!(
            dates,
            vec![
                date!(2024 - 12 - 31),
                date!(2025 - 01 - 02),
                date!(2025 - 03 - 20)
            ]
        );
    }

    #[test]
    fn dates_with_one_type_have_zero_for_the_other() {
        let day = date!(2025 - 03 - 14);
        let transactions = vec![transaction(1, TransactionType::Expense, 12.0, day)];

        let buckets = group_by_date(&transactions);

        assert_eq!(buckets[&day].income, 0.0);
        assert_eq!(buckets[&day].expenses, 12.0);
    }

    #[test]
    fn chart_uses_day_labels() {
        let transactions = vec![transaction(
            1,
            TransactionType::Income,
            10.0,
            date!(2025 - 03 - 04),
        )];

        let options = income_expense_chart(&transactions).to_string();

        assert!(options.contains("Mar 04"), "got options {options}");
        assert!(options.contains("Income"));
        assert!(options.contains("Expenses"));
    }
}
