//! Defines the route handler for the page comparing this month's budgets with spending.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use charming::{
    Chart,
    component::Legend,
    element::{Color, Tooltip, Trigger},
    series::Pie,
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    charts::{PageChart, chart_container, charts_head_elements, currency_formatter},
    endpoints,
    html::{PAGE_CONTAINER_STYLE, base, card, format_currency},
    navigation::NavBar,
    timezone::{first_day_of_month, get_local_date},
    transaction::get_expenses_since,
    user::User,
};

use super::{
    BudgetPeriod, get_budgets,
    progress::{BudgetProgress, BudgetStatus, calculate_progress},
};

const CHART_ID: &str = "budget-chart";

/// The message shown under a budget that is close to being used up.
pub const APPROACHING_LIMIT_MSG: &str = "Approaching budget limit";

/// The state needed for the budget page.
#[derive(Debug, Clone)]
pub struct BudgetState {
    /// The database connection for reading budgets and expenses.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for BudgetState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Render the user's monthly budgets against the expenses recorded since the start of the
/// current month.
pub async fn get_budget_page(
    State(state): State<BudgetState>,
    Extension(user): Extension<User>,
) -> Result<Response, Error> {
    let month_start = first_day_of_month(get_local_date(&state.local_timezone)?);

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let budgets = get_budgets(user.id, BudgetPeriod::Monthly, &connection)
        .inspect_err(|error| tracing::error!("could not get budgets for {}: {error}", user.id))?;
    let expenses = get_expenses_since(user.id, month_start, &connection)
        .inspect_err(|error| tracing::error!("could not get expenses for {}: {error}", user.id))?;

    let progress = calculate_progress(&budgets, &expenses);

    Ok(budget_view(&progress).into_response())
}

fn budget_view(progress: &[BudgetProgress]) -> Markup {
    let nav_bar = NavBar::new(endpoints::BUDGET_VIEW).into_html();

    if progress.is_empty() {
        let content = html! {
            (nav_bar)

            div class=(PAGE_CONTAINER_STYLE)
            {
                h1 class="text-xl font-bold mb-4" { "Budget" }
                p id="empty-state" class="text-gray-500 dark:text-gray-400"
                {
                    "No monthly budgets have been set up yet."
                }
            }
        };

        return base("Budget", &[], &content);
    }

    let chart = PageChart {
        id: CHART_ID,
        options: budget_chart(progress).to_string(),
    };

    let content = html! {
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-5xl"
            {
                h1 class="text-xl font-bold mb-4" { "Budget" }

                div class="grid grid-cols-1 lg:grid-cols-2 gap-4"
                {
                    (card("Budget Overview", &chart_container(&chart)))
                    (card("Category Breakdown", &category_breakdown(progress)))
                }
            }
        }
    };

    base("Budget", &charts_head_elements(&[chart]), &content)
}

fn category_breakdown(progress: &[BudgetProgress]) -> Markup {
    html! {
        ul id="category-breakdown" class="mt-4 space-y-6"
        {
            @for budget in progress {
                li class="space-y-2" data-category=(budget.category)
                {
                    div class="flex justify-between"
                    {
                        span class="font-medium" { (budget.category) }
                        span class="budget-amounts text-gray-600 dark:text-gray-400"
                        {
                            (format_currency(budget.spent)) " / " (format_currency(budget.budget))
                        }
                    }

                    div
                        class="w-full h-2 rounded-full bg-gray-200 dark:bg-gray-700"
                        role="progressbar"
                        aria-valuemin="0"
                        aria-valuemax="100"
                        aria-valuenow=(format!("{:.0}", budget.percent()))
                    {
                        div
                            class="h-2 rounded-full"
                            style=(format!("width: {:.1}%; background-color: {}", budget.percent(), budget.color))
                        {}
                    }

                    @match budget.status {
                        BudgetStatus::OverBudget => {
                            p class="budget-warning text-sm text-red-500"
                            {
                                "Over budget by " (format_currency(-budget.remaining))
                            }
                        },
                        BudgetStatus::ApproachingLimit => {
                            p class="budget-warning text-sm text-yellow-600 dark:text-yellow-400"
                            {
                                (APPROACHING_LIMIT_MSG)
                            }
                        },
                        BudgetStatus::OnTrack => {},
                    }
                }
            }
        }
    }
}

/// Pie chart of how the monthly budget is split between categories.
fn budget_chart(progress: &[BudgetProgress]) -> Chart {
    let colors: Vec<Color> = progress.iter().map(|budget| Color::from(budget.color)).collect();
    let data: Vec<(f64, &str)> = progress
        .iter()
        .map(|budget| (budget.budget, budget.category.as_str()))
        .collect();

    Chart::new()
        .color(colors)
        .tooltip(
            Tooltip::new()
                .trigger(Trigger::Item)
                .value_formatter(currency_formatter()),
        )
        .legend(Legend::new().bottom("0"))
        .series(Pie::new().name("Budget").radius("60%").data(data))
}

#[cfg(test)]
mod tests {
    use axum::{Extension, extract::State};
    use time::Duration;

    use crate::{
        AppState,
        budget::{Budget, BudgetPeriod, create_budget},
        test_utils::{
            assert_status_ok, assert_valid_html, get_test_state, parse_html_document,
            select_text, selector_count,
        },
        timezone::{first_day_of_month, get_local_date},
        transaction::{Transaction, TransactionType, create_transaction},
        user::{User, UserID},
    };

    use super::{APPROACHING_LIMIT_MSG, BudgetState, CHART_ID, get_budget_page};

    fn test_user() -> User {
        User {
            id: UserID::new(1),
            email: "jane@example.com".to_owned(),
            name: "Jane".to_owned(),
        }
    }

    async fn get_page(state: &AppState) -> axum::response::Response {
        get_budget_page(
            State(BudgetState {
                db_connection: state.db_connection.clone(),
                local_timezone: state.local_timezone.clone(),
            }),
            Extension(test_user()),
        )
        .await
        .unwrap()
    }

    fn seed(state: &AppState) {
        let connection = state.db_connection.lock().unwrap();
        let user = test_user();
        let today = get_local_date(&state.local_timezone).unwrap();
        let last_month = first_day_of_month(today) - Duration::days(1);

        for (category, amount) in [("Food", 500.0), ("Transport", 100.0), ("Fun", 200.0)] {
            create_budget(
                Budget::build(user.id, category, amount, BudgetPeriod::Monthly),
                &connection,
            )
            .unwrap();
        }
        create_budget(
            Budget::build(user.id, "Holiday", 3000.0, BudgetPeriod::Yearly),
            &connection,
        )
        .unwrap();

        let expenses = [
            ("Food", 100.0, today),
            ("Food", 450.0, today),
            ("Transport", 95.0, today),
            ("Fun", 1000.0, last_month),
        ];
        for (category, amount, date) in expenses {
            create_transaction(
                Transaction::build(user.id, TransactionType::Expense, category, amount, date),
                &connection,
            )
            .unwrap();
        }
        create_transaction(
            Transaction::build(user.id, TransactionType::Income, "Fun", 1000.0, today),
            &connection,
        )
        .unwrap();
        create_transaction(
            Transaction::build(
                UserID::new(2),
                TransactionType::Expense,
                "Transport",
                1000.0,
                today,
            ),
            &connection,
        )
        .unwrap();
    }

    #[tokio::test]
    async fn shows_spending_against_monthly_budgets() {
        let state = get_test_state();
        seed(&state);

        let response = get_page(&state).await;

        assert_status_ok(&response);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        assert_eq!(
            select_text(&html, "#category-breakdown li span.font-medium"),
            vec!["Food", "Transport", "Fun"]
        );
        assert_eq!(
            select_text(&html, "#category-breakdown .budget-amounts"),
            vec!["$550.00 / $500.00", "$95.00 / $100.00", "$0.00 / $200.00"]
        );
        assert_eq!(selector_count(&html, &format!("#{CHART_ID}")), 1);
    }

    #[tokio::test]
    async fn warns_about_overspent_and_nearly_spent_budgets() {
        let state = get_test_state();
        seed(&state);

        let html = parse_html_document(get_page(&state).await).await;

        assert_eq!(
            select_text(&html, "#category-breakdown .budget-warning"),
            vec!["Over budget by $50.00", APPROACHING_LIMIT_MSG]
        );
    }

    #[tokio::test]
    async fn progress_bars_are_clamped() {
        let state = get_test_state();
        seed(&state);

        let html = parse_html_document(get_page(&state).await).await;

        let selector = scraper::Selector::parse("[role=progressbar]").unwrap();
        let values: Vec<&str> = html
            .select(&selector)
            .map(|bar| bar.value().attr("aria-valuenow").unwrap())
            .collect();
        assert_eq!(values, vec!["100", "95", "0"]);
    }

    #[tokio::test]
    async fn shows_empty_state_without_budgets() {
        let state = get_test_state();

        let html = parse_html_document(get_page(&state).await).await;

        assert_valid_html(&html);
        assert_eq!(selector_count(&html, "#empty-state"), 1);
        assert_eq!(selector_count(&html, &format!("#{CHART_ID}")), 0);
    }
}
