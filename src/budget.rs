//! This file defines the `Budget` type, the pages for managing monthly
//! budgets, and the calls that keep them in sync with the remote API.
//! A budget is a target amount associated with a calendar month.

use axum::{
    Extension, Form,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    AppState, Error,
    alert::Alert,
    api::{self, ApiClient},
    auth::Session,
    endpoints,
    html::{
        BUTTON_DELETE_STYLE, BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        PAGE_CONTAINER_STYLE, base, dollar_input_styles, format_currency,
    },
    navigation::NavBar,
    transaction::{amount_format, date_format},
};

pub type BudgetId = i64;

/// A target amount for a calendar month.
///
/// The API stores the month as a full date; the client treats any two dates
/// in the same calendar month as referring to the same budget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    /// The ID of the budget.
    pub id: BudgetId,

    /// The ID of the user that owns the budget.
    pub user: i64,

    /// The month the budget applies to.
    #[serde(with = "date_format")]
    pub month: Date,

    /// The target amount for the month.
    #[serde(with = "amount_format")]
    pub amount: f64,
}

/// The fields sent to the API when creating or updating a budget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetData {
    /// The month the budget applies to.
    #[serde(with = "date_format")]
    pub month: Date,

    /// The target amount for the month.
    #[serde(with = "amount_format")]
    pub amount: f64,

    /// The ID of the user that owns the budget.
    pub user: i64,
}

/// Whether two dates fall in the same calendar month.
pub fn is_same_month(left: Date, right: Date) -> bool {
    left.year() == right.year() && left.month() == right.month()
}

/// Format a date as its calendar month, e.g. "January 2024".
pub fn month_label(month: Date) -> String {
    format!("{} {}", month.month(), month.year())
}

/// Retrieve all of the user's budgets from the API.
///
/// # Errors
/// Returns an error if the API cannot be reached or rejects the session.
pub async fn get_budgets(api: &ApiClient, session: &Session) -> Result<Vec<Budget>, Error> {
    api.get_json(api::BUDGETS, session).await
}

/// Retrieve a single budget from the API.
///
/// # Errors
/// Returns [Error::NotFound] if there is no budget with `budget_id`.
pub async fn get_budget(
    api: &ApiClient,
    session: &Session,
    budget_id: BudgetId,
) -> Result<Budget, Error> {
    api.get_json(&ApiClient::item(api::BUDGETS, budget_id), session)
        .await
}

/// Create a budget through the API.
///
/// # Errors
/// Returns an error if the API cannot be reached or rejects the record.
pub async fn create_budget(
    api: &ApiClient,
    session: &Session,
    data: &BudgetData,
) -> Result<Budget, Error> {
    api.post_json(api::BUDGETS, data, Some(session)).await
}

/// Replace the budget with `budget_id` through the API.
///
/// # Errors
/// Returns [Error::NotFound] if there is no budget with `budget_id`.
pub async fn update_budget(
    api: &ApiClient,
    session: &Session,
    budget_id: BudgetId,
    data: &BudgetData,
) -> Result<Budget, Error> {
    api.put_json(&ApiClient::item(api::BUDGETS, budget_id), data, session)
        .await
}

/// Delete the budget with `budget_id` through the API.
///
/// # Errors
/// Returns [Error::NotFound] if there is no budget with `budget_id`.
pub async fn delete_budget(
    api: &ApiClient,
    session: &Session,
    budget_id: BudgetId,
) -> Result<(), Error> {
    api.delete(&ApiClient::item(api::BUDGETS, budget_id), session)
        .await
}

fn budget_form_fields(month: Option<&str>, amount: Option<f64>) -> Markup {
    html! {
        div class="grid grid-cols-1 md:grid-cols-2 gap-4"
        {
            div
            {
                label for="month" class=(FORM_LABEL_STYLE) { "Month" }

                input
                    id="month"
                    type="date"
                    name="month"
                    value=[month]
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }

                div class="input-wrapper w-full"
                {
                    input
                        id="amount"
                        type="number"
                        name="amount"
                        step="0.01"
                        min="0.01"
                        placeholder="0.00"
                        value=[amount]
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }
            }
        }
    }
}

fn new_budget_form_view() -> Markup {
    html! {
        form
            hx-post=(endpoints::POST_BUDGET)
            hx-target-error="#alert-container"
            class="w-full space-y-4 md:space-y-6 mb-8"
        {
            (budget_form_fields(None, None))

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Add Budget" }
        }
    }
}

fn edit_budget_form_view(
    update_endpoint: &str,
    month: Option<&str>,
    amount: Option<f64>,
    error_message: &str,
) -> Markup {
    html! {
        form
            hx-put=(update_endpoint)
            hx-target-error="#alert-container"
            class="w-full space-y-4 md:space-y-6"
        {
            (budget_form_fields(month, amount))

            @if !error_message.is_empty() {
                p class="text-red-600 dark:text-red-400" { (error_message) }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Update Budget" }
        }
    }
}

fn budget_card(budget: &Budget) -> Markup {
    let edit_endpoint = endpoints::format_endpoint(endpoints::EDIT_BUDGET_VIEW, budget.id);
    let delete_endpoint = endpoints::format_endpoint(endpoints::DELETE_BUDGET, budget.id);

    html! {
        div class="budget-card border border-gray-300 dark:border-gray-700 p-4 mb-4 rounded-lg
            bg-white dark:bg-gray-800"
        {
            h3 class="text-xl font-semibold" { (month_label(budget.month)) }

            p class="text-lg" { "Amount: " (format_currency(budget.amount)) }

            div class="mt-4 flex gap-4"
            {
                a
                    href=(edit_endpoint)
                    class="text-blue-600 hover:text-blue-500 dark:text-blue-500 underline"
                {
                    "Edit"
                }

                button
                    type="button"
                    hx-delete=(delete_endpoint)
                    hx-confirm="Are you sure you want to delete this budget?"
                    hx-target="closest .budget-card"
                    hx-swap="delete"
                    hx-target-error="#alert-container"
                    class=(BUTTON_DELETE_STYLE)
                {
                    "Delete"
                }
            }
        }
    }
}

fn budgets_view(budgets: &[Budget]) -> Markup {
    let nav_bar = NavBar::new(endpoints::BUDGETS_VIEW).into_html();

    let content = html! {
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-4xl"
            {
                h1 class="text-2xl font-bold mb-6" { "Budget Management" }

                (new_budget_form_view())

                @if budgets.is_empty() {
                    p class="text-gray-500 dark:text-gray-400"
                    {
                        "No budgets yet. Add your first one above."
                    }
                } @else {
                    @for budget in budgets {
                        (budget_card(budget))
                    }
                }
            }
        }
    };

    base("Budgets", &[dollar_input_styles()], &content)
}

fn edit_budget_view(
    update_endpoint: &str,
    month: Option<&str>,
    amount: Option<f64>,
    error_message: &str,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::BUDGETS_VIEW).into_html();
    let form = edit_budget_form_view(update_endpoint, month, amount, error_message);

    let content = html! {
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-md"
            {
                h1 class="text-2xl font-bold mb-6" { "Edit Budget" }

                (form)
            }
        }
    };

    base("Edit Budget", &[dollar_input_styles()], &content)
}

/// The state needed for the budgets listing page.
#[derive(Clone)]
pub struct BudgetsPageState {
    /// The client for the remote finance API.
    pub api: ApiClient,
}

impl FromRef<AppState> for BudgetsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            api: state.api.clone(),
        }
    }
}

/// The state needed for creating a budget.
#[derive(Clone)]
pub struct CreateBudgetEndpointState {
    /// The client for the remote finance API.
    pub api: ApiClient,
}

impl FromRef<AppState> for CreateBudgetEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            api: state.api.clone(),
        }
    }
}

/// The state needed for the edit budget page.
#[derive(Clone)]
pub struct EditBudgetPageState {
    /// The client for the remote finance API.
    pub api: ApiClient,
}

impl FromRef<AppState> for EditBudgetPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            api: state.api.clone(),
        }
    }
}

/// The state needed for updating a budget.
#[derive(Clone)]
pub struct UpdateBudgetEndpointState {
    /// The client for the remote finance API.
    pub api: ApiClient,
}

impl FromRef<AppState> for UpdateBudgetEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            api: state.api.clone(),
        }
    }
}

/// The state needed for deleting a budget.
#[derive(Clone)]
pub struct DeleteBudgetEndpointState {
    /// The client for the remote finance API.
    pub api: ApiClient,
}

impl FromRef<AppState> for DeleteBudgetEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            api: state.api.clone(),
        }
    }
}

/// The raw data entered by the user in the budget forms.
#[derive(Debug, Serialize, Deserialize)]
pub struct BudgetFormData {
    /// The month the budget applies to.
    #[serde(with = "date_format")]
    pub month: Date,
    /// The target amount for the month.
    pub amount: f64,
}

impl BudgetFormData {
    fn validate(&self) -> Result<(), Error> {
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(Error::InvalidAmount);
        }

        Ok(())
    }
}

/// Display the budgets page with the list of budgets and the form for
/// creating a new one.
pub async fn get_budgets_page(
    State(state): State<BudgetsPageState>,
    Extension(session): Extension<Session>,
) -> Result<Response, Error> {
    let mut budgets = get_budgets(&state.api, &session).await?;
    budgets.sort_by(|a, b| b.month.cmp(&a.month));

    Ok(budgets_view(&budgets).into_response())
}

/// A route handler for creating a new budget.
///
/// The fetched budget list is checked first so that a second budget for the
/// same calendar month is rejected before it reaches the API.
pub async fn create_budget_endpoint(
    State(state): State<CreateBudgetEndpointState>,
    Extension(session): Extension<Session>,
    Form(form_data): Form<BudgetFormData>,
) -> Response {
    if let Err(error) = form_data.validate() {
        return error.into_alert_response();
    }

    let existing_budgets = match get_budgets(&state.api, &session).await {
        Ok(budgets) => budgets,
        Err(error) => {
            tracing::error!("Could not fetch budgets for the duplicate month check: {error}");
            return error.into_alert_response();
        }
    };

    if existing_budgets
        .iter()
        .any(|budget| is_same_month(budget.month, form_data.month))
    {
        return Error::DuplicateBudgetMonth(month_label(form_data.month)).into_alert_response();
    }

    let data = BudgetData {
        month: form_data.month,
        amount: form_data.amount,
        user: session.user_id,
    };

    match create_budget(&state.api, &session, &data).await {
        Ok(_) => (
            HxRedirect(endpoints::BUDGETS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while creating a budget: {error}");

            error.into_alert_response()
        }
    }
}

/// Route handler for the edit budget page.
pub async fn get_edit_budget_page(
    Path(budget_id): Path<BudgetId>,
    State(state): State<EditBudgetPageState>,
    Extension(session): Extension<Session>,
) -> Result<Response, Error> {
    let update_endpoint = endpoints::format_endpoint(endpoints::PUT_BUDGET, budget_id);

    match get_budget(&state.api, &session, budget_id).await {
        Ok(budget) => Ok(edit_budget_view(
            &update_endpoint,
            Some(&budget.month.to_string()),
            Some(budget.amount),
            "",
        )
        .into_response()),
        Err(error) => {
            let error_message = match error {
                Error::NotFound => "Budget not found",
                _ => {
                    tracing::error!("Failed to retrieve budget {budget_id}: {error}");
                    "Failed to load budget"
                }
            };

            Ok(edit_budget_view(&update_endpoint, None, None, error_message).into_response())
        }
    }
}

/// A route handler for updating a budget.
///
/// The duplicate month check skips the budget being edited so that changing
/// only the amount still succeeds.
pub async fn update_budget_endpoint(
    Path(budget_id): Path<BudgetId>,
    State(state): State<UpdateBudgetEndpointState>,
    Extension(session): Extension<Session>,
    Form(form_data): Form<BudgetFormData>,
) -> Response {
    if let Err(error) = form_data.validate() {
        return error.into_alert_response();
    }

    let existing_budgets = match get_budgets(&state.api, &session).await {
        Ok(budgets) => budgets,
        Err(error) => {
            tracing::error!("Could not fetch budgets for the duplicate month check: {error}");
            return error.into_alert_response();
        }
    };

    if existing_budgets.iter().any(|budget| {
        budget.id != budget_id && is_same_month(budget.month, form_data.month)
    }) {
        return Error::DuplicateBudgetMonth(month_label(form_data.month)).into_alert_response();
    }

    let data = BudgetData {
        month: form_data.month,
        amount: form_data.amount,
        user: session.user_id,
    };

    match update_budget(&state.api, &session, budget_id, &data).await {
        Ok(_) => (
            HxRedirect(endpoints::BUDGETS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while updating budget {budget_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}

/// A route handler for deleting a budget.
pub async fn delete_budget_endpoint(
    Path(budget_id): Path<BudgetId>,
    State(state): State<DeleteBudgetEndpointState>,
    Extension(session): Extension<Session>,
) -> Response {
    match delete_budget(&state.api, &session, budget_id).await {
        Ok(()) => Alert::success_simple("Budget deleted successfully").into_response(),
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while deleting budget {budget_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod month_tests {
    use time::macros::date;

    use super::{is_same_month, month_label};

    #[test]
    fn same_month_ignores_the_day() {
        assert!(is_same_month(date!(2024 - 01 - 01), date!(2024 - 01 - 31)));
    }

    #[test]
    fn different_month_same_year() {
        assert!(!is_same_month(date!(2024 - 01 - 15), date!(2024 - 02 - 15)));
    }

    #[test]
    fn same_month_different_year() {
        assert!(!is_same_month(date!(2023 - 01 - 15), date!(2024 - 01 - 15)));
    }

    #[test]
    fn month_label_is_human_readable() {
        assert_eq!(month_label(date!(2024 - 01 - 15)), "January 2024");
        assert_eq!(month_label(date!(2025 - 12 - 01)), "December 2025");
    }
}
