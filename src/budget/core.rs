//! Defines the budget model and its database queries.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    Connection, Row, ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};

use crate::{Error, user::UserID};

/// How often a budget's amount resets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetPeriod {
    /// The budget covers one week.
    Weekly,
    /// The budget covers one calendar month.
    Monthly,
    /// The budget covers one calendar year.
    Yearly,
}

impl BudgetPeriod {
    /// The text stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            BudgetPeriod::Weekly => "weekly",
            BudgetPeriod::Monthly => "monthly",
            BudgetPeriod::Yearly => "yearly",
        }
    }
}

impl Display for BudgetPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BudgetPeriod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "weekly" => Ok(BudgetPeriod::Weekly),
            "monthly" => Ok(BudgetPeriod::Monthly),
            "yearly" => Ok(BudgetPeriod::Yearly),
            other => Err(Error::InvalidBudgetPeriod(other.to_owned())),
        }
    }
}

impl ToSql for BudgetPeriod {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for BudgetPeriod {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse::<BudgetPeriod>()
            .map_err(|error: Error| FromSqlError::Other(Box::new(error)))
    }
}

/// A spending limit for one category over a period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    /// The ID of the budget.
    pub id: i64,
    /// The user the budget belongs to.
    pub user_id: UserID,
    /// The expense category the budget limits, e.g. "Food".
    pub category: String,
    /// The most the user wants to spend in the category during one period.
    pub amount: f64,
    /// How often the budget resets.
    pub period: BudgetPeriod,
}

impl Budget {
    /// Create a new budget.
    ///
    /// Shortcut for [NewBudget] for discoverability.
    pub fn build(user_id: UserID, category: &str, amount: f64, period: BudgetPeriod) -> NewBudget {
        NewBudget {
            user_id,
            category: category.to_owned(),
            amount,
            period,
        }
    }
}

/// A budget that has not been inserted into the database yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBudget {
    /// The user the budget belongs to.
    pub user_id: UserID,
    /// The expense category the budget limits.
    pub category: String,
    /// The spending limit, must not be negative.
    pub amount: f64,
    /// How often the budget resets.
    pub period: BudgetPeriod,
}

/// Create the budget table.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_budget_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS budget (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                category TEXT NOT NULL,
                amount REAL NOT NULL CHECK (amount >= 0),
                period TEXT NOT NULL CHECK (period IN ('weekly', 'monthly', 'yearly'))
                )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_budget_user_period ON budget(user_id, period);",
        (),
    )?;

    Ok(())
}

/// Insert a new budget into the database.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error, e.g. the amount is
/// negative.
pub fn create_budget(new_budget: NewBudget, connection: &Connection) -> Result<Budget, Error> {
    connection
        .prepare(
            "INSERT INTO budget (user_id, category, amount, period) VALUES (?1, ?2, ?3, ?4)
             RETURNING id, user_id, category, amount, period",
        )?
        .query_row(
            (
                new_budget.user_id.as_i64(),
                new_budget.category,
                new_budget.amount,
                new_budget.period,
            ),
            map_budget_row,
        )
        .map_err(|error| error.into())
}

/// Get the user's budgets for `period` in the order they were created.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_budgets(
    user_id: UserID,
    period: BudgetPeriod,
    connection: &Connection,
) -> Result<Vec<Budget>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, category, amount, period FROM budget
             WHERE user_id = ?1 AND period = ?2 ORDER BY id ASC",
        )?
        .query_map((user_id.as_i64(), period), map_budget_row)?
        .collect::<Result<Vec<Budget>, rusqlite::Error>>()
        .map_err(|error| error.into())
}

fn map_budget_row(row: &Row) -> Result<Budget, rusqlite::Error> {
    Ok(Budget {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        category: row.get(2)?,
        amount: row.get(3)?,
        period: row.get(4)?,
    })
}
