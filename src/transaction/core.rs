//! Defines the core data models and database queries for transactions.
//!
//! Every query takes the ID of the user the rows belong to. There is no way to read
//! transactions without naming their owner.

use std::{fmt::Display, ops::RangeInclusive, str::FromStr};

use rusqlite::{
    Connection, Row, ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{Error, user::UserID};

// ============================================================================
// MODELS
// ============================================================================

/// Whether money was earned or spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money earned, e.g. a salary.
    Income,
    /// Money spent, e.g. groceries.
    Expense,
}

impl TransactionType {
    /// The text stored in the database and used in query strings.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            other => Err(Error::InvalidTransactionType(other.to_owned())),
        }
    }
}

impl ToSql for TransactionType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for TransactionType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse::<TransactionType>()
            .map_err(|error: Error| FromSqlError::Other(Box::new(error)))
    }
}

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: i64,
    /// The user the transaction belongs to.
    pub user_id: UserID,
    /// Whether the transaction is income or an expense.
    pub transaction_type: TransactionType,
    /// The category of the transaction, e.g. "Food", "Transport", "Salary".
    pub category: String,
    /// The amount of money spent or earned. Never negative.
    pub amount: f64,
    /// When the transaction happened.
    pub date: Date,
    /// An optional text description of what the transaction was for.
    pub description: Option<String>,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [NewTransaction] for discoverability.
    pub fn build(
        user_id: UserID,
        transaction_type: TransactionType,
        category: &str,
        amount: f64,
        date: Date,
    ) -> NewTransaction {
        NewTransaction {
            user_id,
            transaction_type,
            category: category.to_owned(),
            amount,
            date,
            description: None,
        }
    }

    /// The amount with the sign of the money flow: positive for income, negative for expenses.
    pub fn signed_amount(&self) -> f64 {
        match self.transaction_type {
            TransactionType::Income => self.amount,
            TransactionType::Expense => -self.amount,
        }
    }
}

/// A transaction that has not been inserted into the database yet.
#[derive(Debug, PartialEq, Clone)]
pub struct NewTransaction {
    /// The user the transaction belongs to.
    pub user_id: UserID,
    /// Whether the transaction is income or an expense.
    pub transaction_type: TransactionType,
    /// The category of the transaction.
    pub category: String,
    /// The amount of money spent or earned, must not be negative.
    pub amount: f64,
    /// When the transaction happened.
    pub date: Date,
    /// An optional description.
    pub description: Option<String>,
}

impl NewTransaction {
    /// Set the description for the transaction.
    pub fn description(mut self, description: &str) -> Self {
        self.description = Some(description.to_owned());
        self
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

const SELECT_COLUMNS: &str =
    "SELECT id, user_id, type, category, amount, date, description FROM \"transaction\"";

/// Create a new transaction in the database.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error, e.g. the amount is
/// negative.
pub fn create_transaction(
    new_transaction: NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(
            "INSERT INTO \"transaction\" (user_id, type, category, amount, date, description)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             RETURNING id, user_id, type, category, amount, date, description",
        )?
        .query_row(
            (
                new_transaction.user_id.as_i64(),
                new_transaction.transaction_type,
                new_transaction.category,
                new_transaction.amount,
                new_transaction.date,
                new_transaction.description,
            ),
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Get the user's transactions, newest first.
///
/// If `transaction_type` is set, only transactions of that type are returned.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_transactions(
    user_id: UserID,
    transaction_type: Option<TransactionType>,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    let query = match transaction_type {
        Some(_) => format!(
            "{SELECT_COLUMNS} WHERE user_id = ?1 AND type = ?2 ORDER BY date DESC, id DESC"
        ),
        None => format!("{SELECT_COLUMNS} WHERE user_id = ?1 ORDER BY date DESC, id DESC"),
    };

    let mut statement = connection.prepare(&query)?;
    let rows = match transaction_type {
        Some(transaction_type) => {
            statement.query_map((user_id.as_i64(), transaction_type), map_transaction_row)?
        }
        None => statement.query_map((user_id.as_i64(),), map_transaction_row)?,
    };

    rows.collect::<Result<Vec<Transaction>, rusqlite::Error>>()
        .map_err(|error| error.into())
}

/// Get the user's `limit` newest transactions, newest first.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_recent_transactions(
    user_id: UserID,
    limit: u32,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(&format!(
            "{SELECT_COLUMNS} WHERE user_id = ?1 ORDER BY date DESC, id DESC LIMIT ?2"
        ))?
        .query_map((user_id.as_i64(), limit), map_transaction_row)?
        .collect::<Result<Vec<Transaction>, rusqlite::Error>>()
        .map_err(|error| error.into())
}

/// Get the user's expenses dated on or after `since`, oldest first.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_expenses_since(
    user_id: UserID,
    since: Date,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(&format!(
            "{SELECT_COLUMNS} WHERE user_id = ?1 AND type = ?2 AND date >= ?3
             ORDER BY date ASC, id ASC"
        ))?
        .query_map(
            (user_id.as_i64(), TransactionType::Expense, since),
            map_transaction_row,
        )?
        .collect::<Result<Vec<Transaction>, rusqlite::Error>>()
        .map_err(|error| error.into())
}

/// Get the user's transactions within the inclusive `date_range`, oldest first.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_transactions_in_date_range(
    user_id: UserID,
    date_range: RangeInclusive<Date>,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(&format!(
            "{SELECT_COLUMNS} WHERE user_id = ?1 AND date BETWEEN ?2 AND ?3
             ORDER BY date ASC, id ASC"
        ))?
        .query_map(
            (user_id.as_i64(), date_range.start(), date_range.end()),
            map_transaction_row,
        )?
        .collect::<Result<Vec<Transaction>, rusqlite::Error>>()
        .map_err(|error| error.into())
}

/// Get the number of transactions the user has.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn count_transactions(user_id: UserID, connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row(
            "SELECT COUNT(id) FROM \"transaction\" WHERE user_id = ?1",
            (user_id.as_i64(),),
            |row| row.get(0),
        )
        .map_err(|error| error.into())
}

/// Create the transaction table in the database.
///
/// `user_id` is not a foreign key: the stub credential strategy returns an identity that does
/// not have to exist in the user table.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                type TEXT NOT NULL CHECK (type IN ('income', 'expense')),
                category TEXT NOT NULL,
                amount REAL NOT NULL CHECK (amount >= 0),
                date TEXT NOT NULL,
                description TEXT
                )",
        (),
    )?;

    // Every query filters on the user and most sort or filter by date.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_user_date ON \"transaction\"(user_id, date);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    Ok(Transaction {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        transaction_type: row.get(2)?,
        category: row.get(3)?,
        amount: row.get(4)?,
        date: row.get(5)?,
        description: row.get(6)?,
    })
}

// ============================================================================
// TESTS
// ============================================================================
