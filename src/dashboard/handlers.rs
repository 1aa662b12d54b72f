//! Dashboard HTTP handler and view rendering.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use time::Date;

use crate::{
    AppState, Error,
    charts::{PageChart, chart_container, charts_head_elements},
    dashboard::{
        aggregation::{
            Totals, aggregate_by_month, expenses_by_category, last_twelve_months, sum_totals,
        },
        charts::{expense_categories_chart, income_expense_chart},
    },
    endpoints,
    html::{
        CARD_STYLE, EXPENSE_TEXT_STYLE, INCOME_TEXT_STYLE, PAGE_CONTAINER_STYLE, base, card,
        format_currency,
    },
    navigation::NavBar,
    timezone::{first_day_of_month, get_local_date},
    transaction::{
        Transaction, count_transactions, get_recent_transactions, get_transactions_in_date_range,
        transaction_row,
    },
    user::User,
};

/// How many transactions are listed under "Recent Transactions".
const RECENT_TRANSACTION_COUNT: u32 = 5;

/// The state needed for displaying the dashboard page.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Holds all the data needed to render the dashboard.
struct DashboardData {
    month_totals: Totals,
    charts: [PageChart; 2],
    recent_transactions: Vec<Transaction>,
}

/// Display a page with an overview of the user's finances.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    Extension(user): Extension<User>,
) -> Result<Response, Error> {
    let today = get_local_date(&state.local_timezone)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW);

    match build_dashboard_data(&user, today, &connection)? {
        Some(data) => Ok(dashboard_view(nav_bar, &user, data).into_response()),
        None => Ok(dashboard_no_data_view(nav_bar, &user).into_response()),
    }
}

/// Queries and aggregates the user's transactions.
///
/// Returns `None` if the user has no transactions at all.
fn build_dashboard_data(
    user: &User,
    today: Date,
    connection: &Connection,
) -> Result<Option<DashboardData>, Error> {
    let transaction_count = count_transactions(user.id, connection)
        .inspect_err(|error| tracing::error!("could not count transactions: {error}"))?;

    if transaction_count == 0 {
        return Ok(None);
    }

    let months = last_twelve_months(today);
    let month_start = first_day_of_month(today);
    // `months` is never empty, the fallback only keeps this infallible.
    let year_start = months.first().copied().unwrap_or(month_start);

    let transactions = get_transactions_in_date_range(user.id, year_start..=today, connection)
        .inspect_err(|error| tracing::error!("could not get transactions in date range: {error}"))?;
    let recent_transactions = get_recent_transactions(user.id, RECENT_TRANSACTION_COUNT, connection)
        .inspect_err(|error| tracing::error!("could not get recent transactions: {error}"))?;

    let this_month = || {
        transactions
            .iter()
            .filter(move |transaction| transaction.date >= month_start)
    };

    let monthly_totals = aggregate_by_month(&transactions, &months);
    let categories = expenses_by_category(this_month());

    Ok(Some(DashboardData {
        month_totals: sum_totals(this_month()),
        charts: [
            PageChart {
                id: "income-expense-chart",
                options: income_expense_chart(&months, &monthly_totals).to_string(),
            },
            PageChart {
                id: "expense-categories-chart",
                options: expense_categories_chart(&categories).to_string(),
            },
        ],
        recent_transactions,
    }))
}

fn dashboard_view(nav_bar: NavBar, user: &User, data: DashboardData) -> Markup {
    let content = html!(
        (nav_bar.into_html())

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-6xl space-y-4"
            {
                h1 class="text-2xl font-bold" { "Welcome back, " (user.name) "!" }

                (monthly_summary(&data.month_totals))

                section id="charts" class="grid grid-cols-1 xl:grid-cols-2 gap-4"
                {
                    @for chart in &data.charts {
                        section class=(CARD_STYLE) { (chart_container(chart)) }
                    }
                }

                (card("Recent Transactions", &html! {
                    ul id="recent-transactions" class="divide-y divide-gray-200 dark:divide-gray-700"
                    {
                        @for transaction in &data.recent_transactions {
                            (transaction_row(transaction))
                        }
                    }
                }))
            }
        }
    );

    base("Dashboard", &charts_head_elements(&data.charts), &content)
}

fn monthly_summary(totals: &Totals) -> Markup {
    let net = totals.net();
    let net_style = if net < 0.0 {
        EXPENSE_TEXT_STYLE
    } else {
        INCOME_TEXT_STYLE
    };

    html! {
        section id="monthly-summary" class="grid grid-cols-1 md:grid-cols-3 gap-4"
        {
            (summary_card("monthly-income", "Income this month", &format_currency(totals.income), INCOME_TEXT_STYLE))
            (summary_card("monthly-expenses", "Expenses this month", &format_currency(totals.expenses), EXPENSE_TEXT_STYLE))
            (summary_card("monthly-net", "Net this month", &format_currency(net), net_style))
        }
    }
}

fn summary_card(id: &str, label: &str, value: &str, value_style: &str) -> Markup {
    html! {
        div id=(id) class=(CARD_STYLE)
        {
            p class="text-sm text-gray-500 dark:text-gray-400" { (label) }
            p class={ "summary-value text-2xl font-semibold " (value_style) } { (value) }
        }
    }
}

fn dashboard_no_data_view(nav_bar: NavBar, user: &User) -> Markup {
    let content = html!(
        (nav_bar.into_html())

        div class=(PAGE_CONTAINER_STYLE)
        {
            h1 class="text-2xl font-bold mb-4" { "Welcome back, " (user.name) "!" }

            section id="empty-state" class="text-center space-y-2"
            {
                h2 class="text-xl font-semibold" { "Nothing here yet" }
                p class="text-gray-500 dark:text-gray-400"
                {
                    "Charts and summaries will appear here once you have some transactions."
                }
            }
        }
    );

    base("Dashboard", &[], &content)
}
