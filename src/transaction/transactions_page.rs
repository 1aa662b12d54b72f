//! Defines the route handler for the page that lists the user's transactions.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Query, State},
    http::header::VARY,
    response::{IntoResponse, Response},
};
use axum_htmx::{HxHistoryRestoreRequest, HxRequest};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;
use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

use crate::{
    AppState, Error,
    charts::{PageChart, chart_container, charts_head_elements},
    endpoints,
    html::{
        CARD_STYLE, EXPENSE_TEXT_STYLE, HeadElement, INCOME_TEXT_STYLE, PAGE_CONTAINER_STYLE,
        base, format_signed_currency,
    },
    navigation::NavBar,
    user::User,
};

use super::{Transaction, TransactionType, chart::income_expense_chart, get_transactions};

const LONG_DATE_FORMAT: &[BorrowedFormatItem] =
    format_description!("[month repr:long] [day padding:none], [year]");

const TAB_STYLE: &str = "inline-block px-4 py-2 rounded-t border-b-2 border-transparent \
    text-gray-500 hover:text-gray-700 hover:border-gray-300 dark:text-gray-400 \
    dark:hover:text-gray-300";
const ACTIVE_TAB_STYLE: &str = "inline-block px-4 py-2 rounded-t border-b-2 \
    border-blue-600 text-blue-600 dark:text-blue-500 dark:border-blue-500";

const CHART_ID: &str = "income-expense-chart";

/// The state needed for the transactions page.
#[derive(Debug, Clone)]
pub struct TransactionsState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for TransactionsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The query parameters for the transactions page.
#[derive(Debug, Default, Deserialize)]
pub struct TransactionsQuery {
    /// Only list transactions of this type. All transactions are listed when absent.
    #[serde(rename = "type")]
    pub transaction_type: Option<TransactionType>,
}

/// Render the user's transactions, newest first, with a chart of daily income and expenses.
///
/// HTMX requests, i.e. clicking a tab, only get the tab panel back. HTMX history restores
/// replace the whole page, so they get the full page like any other request.
pub async fn get_transactions_page(
    State(state): State<TransactionsState>,
    Extension(user): Extension<User>,
    HxRequest(is_htmx): HxRequest,
    HxHistoryRestoreRequest(is_history_restore): HxHistoryRestoreRequest,
    Query(query): Query<TransactionsQuery>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let listed = get_transactions(user.id, query.transaction_type, &connection).inspect_err(
        |error| tracing::error!("could not get transactions for {}: {error}", user.id),
    )?;

    // The same URL serves a fragment or a full page, so caches must key on `HX-Request`.
    let vary = [(VARY, "HX-Request")];

    if is_htmx && !is_history_restore {
        return Ok((vary, transactions_panel(query.transaction_type, &listed)).into_response());
    }

    // The chart always shows both income and expenses, whichever tab is selected.
    let all = match query.transaction_type {
        None => listed.clone(),
        Some(_) => get_transactions(user.id, None, &connection).inspect_err(|error| {
            tracing::error!("could not get transactions for {}: {error}", user.id)
        })?,
    };

    Ok((vary, transactions_page(query.transaction_type, &listed, &all)).into_response())
}

fn transactions_page(
    filter: Option<TransactionType>,
    listed: &[Transaction],
    all: &[Transaction],
) -> Markup {
    let nav_bar = NavBar::new(endpoints::TRANSACTIONS_VIEW).into_html();
    let chart = (!all.is_empty()).then(|| PageChart {
        id: CHART_ID,
        options: income_expense_chart(all).to_string(),
    });
    let head_elements: Vec<HeadElement> = match &chart {
        Some(chart) => charts_head_elements(std::slice::from_ref(chart)).into(),
        None => Vec::new(),
    };

    let content = html! {
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-5xl space-y-4"
            {
                h1 class="text-xl font-bold" { "Transactions" }

                @if let Some(chart) = &chart {
                    section class=(CARD_STYLE) { (chart_container(chart)) }
                }

                (transactions_panel(filter, listed))
            }
        }
    };

    base("Transactions", &head_elements, &content)
}

fn transactions_panel(filter: Option<TransactionType>, transactions: &[Transaction]) -> Markup {
    html! {
        section id="transactions-panel" class=(CARD_STYLE)
        {
            (filter_tabs(filter))

            @if transactions.is_empty() {
                p id="empty-state" class="py-6 text-center text-gray-500 dark:text-gray-400"
                {
                    @match filter {
                        Some(TransactionType::Income) => { "No income recorded yet." }
                        Some(TransactionType::Expense) => { "No expenses recorded yet." }
                        None => { "No transactions recorded yet." }
                    }
                }
            } @else {
                ul id="transaction-list" class="divide-y divide-gray-200 dark:divide-gray-700"
                {
                    @for transaction in transactions {
                        (transaction_row(transaction))
                    }
                }
            }
        }
    }
}

fn filter_tabs(filter: Option<TransactionType>) -> Markup {
    let tabs = [
        ("All", None),
        ("Income", Some(TransactionType::Income)),
        ("Expenses", Some(TransactionType::Expense)),
    ];

    html! {
        ul class="flex flex-wrap mb-2 text-sm font-medium text-center border-b border-gray-200 dark:border-gray-700"
        {
            @for (label, tab_filter) in tabs {
                @let url = filter_url(tab_filter);
                li
                {
                    a
                        href=(url)
                        hx-get=(url)
                        hx-target="#transactions-panel"
                        hx-swap="outerHTML"
                        hx-push-url="true"
                        class=(if tab_filter == filter { ACTIVE_TAB_STYLE } else { TAB_STYLE })
                        aria-current=[(tab_filter == filter).then_some("page")]
                    {
                        (label)
                    }
                }
            }
        }
    }
}

fn filter_url(filter: Option<TransactionType>) -> String {
    match filter {
        Some(transaction_type) => {
            format!("{}?type={transaction_type}", endpoints::TRANSACTIONS_VIEW)
        }
        None => endpoints::TRANSACTIONS_VIEW.to_owned(),
    }
}

/// A list item with the category, date, description and signed amount of a transaction.
pub(crate) fn transaction_row(transaction: &Transaction) -> Markup {
    let is_income = transaction.transaction_type == TransactionType::Income;
    let amount_style = if is_income {
        INCOME_TEXT_STYLE
    } else {
        EXPENSE_TEXT_STYLE
    };

    html! {
        li class="flex items-center justify-between gap-4 py-3" data-transaction-id=(transaction.id)
        {
            div class="min-w-0"
            {
                p class="font-medium text-gray-900 dark:text-white" { (transaction.category) }
                p class="text-sm text-gray-500 dark:text-gray-400"
                {
                    time datetime=(transaction.date) { (format_long_date(transaction.date)) }
                }
                @if let Some(description) = &transaction.description {
                    p class="text-sm text-gray-500 dark:text-gray-400 truncate" { (description) }
                }
            }

            span class={ "font-semibold whitespace-nowrap " (amount_style) }
            {
                (format_signed_currency(transaction.amount, is_income))
            }
        }
    }
}

fn format_long_date(date: Date) -> String {
    date.format(LONG_DATE_FORMAT)
        .unwrap_or_else(|_| date.to_string())
}
