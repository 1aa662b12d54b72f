use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::{Date, Duration, OffsetDateTime};

use fintrack::{
    Budget, BudgetPeriod, PasswordHash, Transaction, TransactionType, UserID, create_budget,
    create_transaction, create_user, first_day_of_month, initialize_db,
};

/// A utility for creating a test database for the fintrack server.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating test user...");
    let password_hash = PasswordHash::from_raw_password("test", PasswordHash::DEFAULT_COST)?;
    let user = create_user("test@example.com", "Test User", password_hash, &conn)?;
    // The stub log-in strategy always logs in as user 1, so seed both identities.
    let user_ids = if user.id == UserID::new(1) {
        vec![user.id]
    } else {
        vec![user.id, UserID::new(1)]
    };

    let today = OffsetDateTime::now_utc().date();

    for user_id in user_ids {
        println!("Creating budgets for user {user_id}...");
        for (category, amount) in [
            ("Food", 800.0),
            ("Transport", 400.0),
            ("Entertainment", 300.0),
            ("Bills", 2000.0),
        ] {
            create_budget(
                Budget::build(user_id, category, amount, BudgetPeriod::Monthly),
                &conn,
            )?;
        }

        println!("Creating transactions for user {user_id}...");
        for month_start in month_starts(today) {
            let transactions = [
                (TransactionType::Income, "Salary", 5000.0, 0, "Monthly pay"),
                (TransactionType::Expense, "Bills", 1950.0, 1, "Rent"),
                (TransactionType::Expense, "Food", 120.5, 2, "Groceries"),
                (TransactionType::Expense, "Transport", 60.0, 3, "Fuel"),
                (TransactionType::Expense, "Food", 640.0, 4, "Dinner party"),
                (TransactionType::Expense, "Entertainment", 45.0, 5, "Cinema"),
            ];

            for (transaction_type, category, amount, day_offset, description) in transactions {
                let date = (month_start + Duration::days(day_offset)).min(today);
                create_transaction(
                    Transaction::build(user_id, transaction_type, category, amount, date)
                        .description(description),
                    &conn,
                )?;
            }
        }
    }

    println!("Success!");

    Ok(())
}

/// The first days of last month and this month.
fn month_starts(today: Date) -> [Date; 2] {
    let this_month = first_day_of_month(today);
    let last_month = first_day_of_month(this_month.saturating_sub(Duration::days(1)));

    [last_month, this_month]
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use super::month_starts;

    #[test]
    fn month_starts_are_first_days_of_last_and_this_month() {
        assert_eq!(
            month_starts(date!(2025 - 03 - 17)),
            [date!(2025 - 02 - 01), date!(2025 - 03 - 01)]
        );
        assert_eq!(
            month_starts(date!(2025 - 01 - 01)),
            [date!(2024 - 12 - 01), date!(2025 - 01 - 01)]
        );
    }
}
