//! Dashboard module
//!
//! Provides an overview page with this month's totals, charts of income and expenses, and the
//! most recent transactions.

mod aggregation;
mod charts;
mod handlers;

pub use handlers::get_dashboard_page;
