//! Transactions for the finance application.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and `NewTransaction` for creating transactions
//! - User-scoped database queries used by the transactions, budget and dashboard pages
//! - The transactions page with its daily income and expense chart

mod chart;
mod core;
mod transactions_page;

pub use core::{
    NewTransaction, Transaction, TransactionType, count_transactions, create_transaction,
    create_transaction_table, get_expenses_since, get_recent_transactions, get_transactions,
    get_transactions_in_date_range,
};
pub use transactions_page::get_transactions_page;
pub(crate) use transactions_page::transaction_row;
