//! Transaction data aggregation for the dashboard summaries and charts.
//!
//! Provides functions to total income and expenses, bucket them by month and group the
//! current month's expenses by category.

use std::collections::HashMap;

use time::{Date, Duration};

use crate::{
    timezone::first_day_of_month,
    transaction::{Transaction, TransactionType},
};

/// The number of months shown on the income vs expenses chart, including the current month.
pub(super) const MONTHS_IN_CHART: usize = 12;

/// Income and expense totals over some period.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub(super) struct Totals {
    pub income: f64,
    pub expenses: f64,
}

impl Totals {
    /// Income minus expenses.
    pub fn net(&self) -> f64 {
        self.income - self.expenses
    }

    fn add(&mut self, transaction: &Transaction) {
        match transaction.transaction_type {
            TransactionType::Income => self.income += transaction.amount,
            TransactionType::Expense => self.expenses += transaction.amount,
        }
    }
}

/// Sums income and expenses across `transactions`.
pub(super) fn sum_totals<'a>(transactions: impl IntoIterator<Item = &'a Transaction>) -> Totals {
    let mut totals = Totals::default();

    for transaction in transactions {
        totals.add(transaction);
    }

    totals
}

/// The first day of each of the last [MONTHS_IN_CHART] months, oldest first and ending with the
/// month `today` falls in.
pub(super) fn last_twelve_months(today: Date) -> Vec<Date> {
    let mut months = Vec::with_capacity(MONTHS_IN_CHART);
    let mut month = first_day_of_month(today);

    for _ in 0..MONTHS_IN_CHART {
        months.push(month);
        month = first_day_of_month(month.saturating_sub(Duration::days(1)));
    }

    months.reverse();
    months
}

/// Totals for each month in `months`, in the same order.
///
/// Months without transactions get zero totals.
pub(super) fn aggregate_by_month(transactions: &[Transaction], months: &[Date]) -> Vec<Totals> {
    let mut totals: HashMap<Date, Totals> = HashMap::new();

    for transaction in transactions {
        totals
            .entry(first_day_of_month(transaction.date))
            .or_default()
            .add(transaction);
    }

    months
        .iter()
        .map(|month| totals.get(month).copied().unwrap_or_default())
        .collect()
}

/// Sums expenses per category, largest first.
///
/// Categories with equal totals are sorted by name. Income is ignored.
pub(super) fn expenses_by_category<'a>(
    transactions: impl IntoIterator<Item = &'a Transaction>,
) -> Vec<(String, f64)> {
    let mut totals: HashMap<&str, f64> = HashMap::new();

    for transaction in transactions {
        if transaction.transaction_type == TransactionType::Expense {
            *totals.entry(transaction.category.as_str()).or_insert(0.0) += transaction.amount;
        }
    }

    let mut categories: Vec<(String, f64)> = totals
        .into_iter()
        .map(|(category, amount)| (category.to_owned(), amount))
        .collect();
    categories.sort_by(|(a_name, a_amount), (b_name, b_amount)| {
        b_amount.total_cmp(a_amount).then_with(|| a_name.cmp(b_name))
    });

    categories
}
