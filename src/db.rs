//! Sets up the application's database.

use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};

use crate::{
    Error, budget::create_budget_table, transaction::create_transaction_table,
    user::create_user_table,
};

/// Create the tables for users, budgets and transactions if they do not exist yet.
///
/// All tables are created in a single exclusive transaction, so either all or none of them are
/// created.
///
/// # Errors
/// This function will return an error if there is an SQL error.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    let transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_user_table(&transaction)?;
    create_budget_table(&transaction)?;
    create_transaction_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}
