//! Compares budgets against the expenses in their category.

use crate::transaction::{Transaction, TransactionType};

use super::Budget;

/// Chart colours for budgets, assigned by position and repeating after the last.
pub const BUDGET_COLORS: [&str; 5] = ["#0088FE", "#00C49F", "#FFBB28", "#FF8042", "#8884D8"];

/// The fraction of a budget that may be spent before the page warns about it.
const WARNING_THRESHOLD: f64 = 0.9;

/// How spending compares to the budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetStatus {
    /// Spending is at most 90% of the budget.
    OnTrack,
    /// Spending is over 90% of the budget but has not gone over it.
    ApproachingLimit,
    /// Spending is more than the budget.
    OverBudget,
}

/// One budget with what has been spent against it.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetProgress {
    pub category: String,
    pub budget: f64,
    pub spent: f64,
    /// Negative when over budget.
    pub remaining: f64,
    pub color: &'static str,
    pub status: BudgetStatus,
}

impl BudgetProgress {
    /// How full the progress bar is, from 0 to 100.
    pub fn percent(&self) -> f64 {
        if self.budget > 0.0 {
            (self.spent / self.budget * 100.0).clamp(0.0, 100.0)
        } else if self.spent > 0.0 {
            100.0
        } else {
            0.0
        }
    }
}

fn budget_status(budget: f64, spent: f64) -> BudgetStatus {
    if spent > budget {
        BudgetStatus::OverBudget
    } else if spent > budget * WARNING_THRESHOLD {
        BudgetStatus::ApproachingLimit
    } else {
        BudgetStatus::OnTrack
    }
}

/// Sum the expenses in each budget's category, keeping the order of `budgets`.
pub fn calculate_progress(budgets: &[Budget], expenses: &[Transaction]) -> Vec<BudgetProgress> {
    budgets
        .iter()
        .enumerate()
        .map(|(index, budget)| {
            let spent: f64 = expenses
                .iter()
                .filter(|transaction| {
                    transaction.transaction_type == TransactionType::Expense
                        && transaction.category == budget.category
                })
                .fold(0.0, |sum, transaction| sum + transaction.amount);

            BudgetProgress {
                category: budget.category.clone(),
                budget: budget.amount,
                spent,
                remaining: budget.amount - spent,
                color: BUDGET_COLORS[index % BUDGET_COLORS.len()],
                status: budget_status(budget.amount, spent),
            }
        })
        .collect()
}
