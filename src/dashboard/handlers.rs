//! Dashboard HTTP handlers and view rendering.

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};

use crate::{
    AppState, Error,
    api::ApiClient,
    auth::Session,
    category::{Category, get_categories},
    dashboard::{
        aggregation::{expense_totals_by_category, monthly_totals, summarize},
        cards::summary_cards,
        charts::{
            DashboardChart, category_expenses_chart, charts_script, charts_view,
            income_expense_chart, monthly_trend_chart,
        },
    },
    endpoints,
    html::{HeadElement, base, link},
    navigation::NavBar,
    transaction::{Transaction, get_transactions},
};

/// The state needed for displaying the dashboard page.
#[derive(Clone)]
pub struct DashboardState {
    /// The client for the remote finance API.
    pub api: ApiClient,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            api: state.api.clone(),
        }
    }
}

/// Display a page with an overview of the user's data.
///
/// The fetched transaction list is aggregated in a single pass into overall
/// income/expense totals, per-category expense totals, and per-month totals,
/// which feed the summary cards and the three charts.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    Extension(session): Extension<Session>,
) -> Result<Response, Error> {
    let (transactions, categories) = tokio::try_join!(
        get_transactions(&state.api, &session),
        get_categories(&state.api, &session),
    )?;

    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW);

    if transactions.is_empty() {
        return Ok(dashboard_no_data_view(nav_bar).into_response());
    }

    Ok(dashboard_view(nav_bar, &transactions, &categories).into_response())
}

/// Creates the array of dashboard charts from transaction data.
fn build_dashboard_charts(
    transactions: &[Transaction],
    categories: &[Category],
) -> [DashboardChart; 3] {
    let summary = summarize(transactions);

    [
        DashboardChart {
            id: "income-expense-chart",
            options: income_expense_chart(&summary).to_string(),
        },
        DashboardChart {
            id: "monthly-trend-chart",
            options: monthly_trend_chart(&monthly_totals(transactions)).to_string(),
        },
        DashboardChart {
            id: "category-expenses-chart",
            options: category_expenses_chart(&expense_totals_by_category(
                transactions,
                categories,
            ))
            .to_string(),
        },
    ]
}

/// Renders the dashboard page when no transaction data exists.
fn dashboard_no_data_view(nav_bar: NavBar) -> Markup {
    let nav_bar = nav_bar.into_html();
    let new_transaction_link = link(endpoints::TRANSACTIONS_VIEW, "recording a transaction");

    let content = html!(
        (nav_bar)

        div class="flex flex-col items-center px-6 py-8 mx-auto text-gray-900 dark:text-white"
        {
            h2 class="text-xl font-bold"
            {
                "Nothing here yet..."
            }

            p
            {
                "Charts will show up here once you add some transactions.
                Start by " (new_transaction_link) "."
            }
        }
    );

    base("Dashboard", &[], &content)
}

/// Renders the main dashboard page with summary cards and charts.
fn dashboard_view(
    nav_bar: NavBar,
    transactions: &[Transaction],
    categories: &[Category],
) -> Markup {
    let nav_bar = nav_bar.into_html();
    let summary = summarize(transactions);
    let charts = build_dashboard_charts(transactions, categories);

    let content = html!(
        (nav_bar)

        div
            id="dashboard-content"
            class="flex flex-col items-center px-2 lg:px-6 lg:py-8 mx-auto
                max-w-screen-xl text-gray-900 dark:text-white"
        {
            (summary_cards(&summary))

            (charts_view(&charts))
        }
    );

    let scripts = [
        HeadElement::ScriptLink("/static/echarts.6.0.0.min.js".to_owned()),
        charts_script(&charts),
    ];

    base("Dashboard", &scripts, &content)
}

#[cfg(test)]
mod dashboard_route_tests {
    use axum::{Extension, extract::State, http::StatusCode};
    use time::macros::date;

    use crate::{
        test_utils::{StubApi, test_session},
        transaction::TransactionType,
    };

    use super::{DashboardState, get_dashboard_page};

    async fn response_text(response: axum::response::Response) -> String {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        String::from_utf8_lossy(&body).to_string()
    }

    #[tokio::test]
    async fn dashboard_shows_no_data_view_without_transactions() {
        let stub = StubApi::spawn().await;
        let state = DashboardState {
            api: stub.client(),
        };

        let response = get_dashboard_page(State(state), Extension(test_session()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let text = response_text(response).await;
        assert!(text.contains("Nothing here yet"));
    }

    #[tokio::test]
    async fn dashboard_renders_cards_and_charts() {
        let stub = StubApi::spawn().await;
        stub.seed_category(1, "Food", TransactionType::Expense);
        stub.seed_typed_transaction(
            1,
            Some(1),
            40.0,
            date!(2024 - 01 - 15),
            TransactionType::Expense,
        );
        stub.seed_typed_transaction(2, None, 100.0, date!(2024 - 01 - 01), TransactionType::Income);

        let state = DashboardState {
            api: stub.client(),
        };

        let response = get_dashboard_page(State(state), Extension(test_session()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let text = response_text(response).await;

        assert!(text.contains("income-expense-chart"));
        assert!(text.contains("monthly-trend-chart"));
        assert!(text.contains("category-expenses-chart"));
        // The cards show the aggregated totals.
        assert!(text.contains("$100.00"));
        assert!(text.contains("$40.00"));
        assert!(text.contains("$60.00"));
        // The chart data includes the month label and category name.
        assert!(text.contains("Jan 2024"));
        assert!(text.contains("Food"));
    }
}
