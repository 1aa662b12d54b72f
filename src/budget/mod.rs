//! Monthly budgets per expense category and the page that tracks spending against them.

mod budget_page;
mod core;
mod progress;

pub use budget_page::get_budget_page;
pub use core::{Budget, BudgetPeriod, NewBudget, create_budget, create_budget_table, get_budgets};
