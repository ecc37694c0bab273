//! This file defines the `Transaction` type, the pages for recording and
//! editing transactions, and the calls that keep them in sync with the
//! remote API.

use std::{collections::HashMap, fmt::Display};

use axum::{
    Extension, Form,
    extract::{FromRef, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{
    AppState, Error,
    alert::Alert,
    api::{self, ApiClient},
    auth::Session,
    category::{Category, CategoryId, get_categories},
    endpoints,
    html::{
        BUTTON_DELETE_STYLE, BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base,
        dollar_input_styles, format_currency,
    },
    navigation::NavBar,
    pagination::{PaginationConfig, create_pagination_indicators, pagination_controls},
};

pub(crate) mod date_format {
    //! Serializes a [time::Date] the way the API writes dates: "2024-01-15".

    use serde::{Deserialize, Deserializer, Serializer};
    use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

    const DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

    pub fn serialize<S>(date: &Date, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let formatted = date.format(DATE_FORMAT).map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&formatted)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Date, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Date::parse(&s, DATE_FORMAT).map_err(serde::de::Error::custom)
    }
}

pub(crate) mod amount_format {
    //! Accepts amounts as either JSON numbers or the decimal strings the API
    //! serializes, and always writes them back as numbers.

    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<S>(amount: &f64, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(*amount)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum StringOrNumber {
            Number(f64),
            Text(String),
        }

        match StringOrNumber::deserialize(deserializer)? {
            StringOrNumber::Number(number) => Ok(number),
            StringOrNumber::Text(text) => text.trim().parse().map_err(de::Error::custom),
        }
    }
}

/// Whether money came in or went out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money received.
    Income,
    /// Money spent.
    Expense,
}

impl TransactionType {
    /// The wire name of the variant, as the API spells it.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

pub type TransactionId = i64;

/// A record of money moved, as stored by the remote API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,

    /// The ID of the user that owns the transaction.
    pub user: i64,

    /// The category the transaction belongs to, if any.
    pub category: Option<CategoryId>,

    /// How much money moved. Always positive; the direction is in `kind`.
    #[serde(with = "amount_format")]
    pub amount: f64,

    /// The day the transaction happened.
    #[serde(with = "date_format")]
    pub date: Date,

    /// A free-form note.
    #[serde(default)]
    pub description: String,

    /// Whether the transaction is income or an expense.
    #[serde(rename = "type")]
    pub kind: TransactionType,
}

/// The fields sent to the API when creating or updating a transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionData {
    /// How much money moved.
    #[serde(with = "amount_format")]
    pub amount: f64,

    /// The day the transaction happened.
    #[serde(with = "date_format")]
    pub date: Date,

    /// A free-form note.
    #[serde(default)]
    pub description: String,

    /// Whether the transaction is income or an expense.
    #[serde(rename = "type")]
    pub kind: TransactionType,

    /// The category the transaction belongs to, if any.
    pub category: Option<CategoryId>,

    /// The ID of the user that owns the transaction.
    pub user: i64,
}

impl TransactionData {
    /// Check the fields before they are sent to the API.
    ///
    /// # Errors
    /// Returns:
    /// - [Error::InvalidAmount] if the amount is zero, negative, or not finite.
    /// - [Error::FutureDate] if the date is after `today`.
    pub fn validate(&self, today: Date) -> Result<(), Error> {
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(Error::InvalidAmount);
        }

        if self.date > today {
            return Err(Error::FutureDate(self.date));
        }

        Ok(())
    }
}

/// Retrieve all of the user's transactions from the API.
///
/// # Errors
/// Returns an error if the API cannot be reached or rejects the session.
pub async fn get_transactions(
    api: &ApiClient,
    session: &Session,
) -> Result<Vec<Transaction>, Error> {
    api.get_json(api::TRANSACTIONS, session).await
}

/// Retrieve a single transaction from the API.
///
/// # Errors
/// Returns [Error::NotFound] if there is no transaction with `transaction_id`.
pub async fn get_transaction(
    api: &ApiClient,
    session: &Session,
    transaction_id: TransactionId,
) -> Result<Transaction, Error> {
    api.get_json(&ApiClient::item(api::TRANSACTIONS, transaction_id), session)
        .await
}

/// Create a transaction through the API.
///
/// # Errors
/// Returns an error if the API cannot be reached or rejects the record.
pub async fn create_transaction(
    api: &ApiClient,
    session: &Session,
    data: &TransactionData,
) -> Result<Transaction, Error> {
    api.post_json(api::TRANSACTIONS, data, Some(session)).await
}

/// Replace the transaction with `transaction_id` through the API.
///
/// # Errors
/// Returns [Error::NotFound] if there is no transaction with `transaction_id`.
pub async fn update_transaction(
    api: &ApiClient,
    session: &Session,
    transaction_id: TransactionId,
    data: &TransactionData,
) -> Result<Transaction, Error> {
    api.put_json(
        &ApiClient::item(api::TRANSACTIONS, transaction_id),
        data,
        session,
    )
    .await
}

/// Delete the transaction with `transaction_id` through the API.
///
/// # Errors
/// Returns [Error::NotFound] if there is no transaction with `transaction_id`.
pub async fn delete_transaction(
    api: &ApiClient,
    session: &Session,
    transaction_id: TransactionId,
) -> Result<(), Error> {
    api.delete(&ApiClient::item(api::TRANSACTIONS, transaction_id), session)
        .await
}

/// The label shown when a transaction's category is missing or dangling.
pub const UNCATEGORIZED_LABEL: &str = "Uncategorized";

/// Resolve a category reference against the fetched category list.
///
/// Deleted categories leave transactions pointing at IDs that no longer
/// exist; those fall back to [UNCATEGORIZED_LABEL] just like transactions
/// that never had a category.
pub fn category_label<'a>(
    category: Option<CategoryId>,
    names: &HashMap<CategoryId, &'a str>,
) -> &'a str {
    category
        .and_then(|id| names.get(&id).copied())
        .unwrap_or(UNCATEGORIZED_LABEL)
}

/// Build a lookup table from category ID to category name.
pub fn category_names(categories: &[Category]) -> HashMap<CategoryId, &str> {
    categories
        .iter()
        .map(|category| (category.id, category.name.as_ref()))
        .collect()
}

fn kind_select_view(selected: TransactionType) -> Markup {
    html! {
        div
        {
            label for="type" class=(FORM_LABEL_STYLE) { "Type" }

            select
                id="type"
                name="type"
                class=(FORM_TEXT_INPUT_STYLE)
            {
                option value="expense" selected[selected == TransactionType::Expense] { "Expense" }
                option value="income" selected[selected == TransactionType::Income] { "Income" }
            }
        }
    }
}

fn category_select_view(selected: Option<CategoryId>, categories: &[Category]) -> Markup {
    html! {
        div
        {
            label for="category" class=(FORM_LABEL_STYLE) { "Category" }

            select
                id="category"
                name="category"
                class=(FORM_TEXT_INPUT_STYLE)
            {
                option value="" selected[selected.is_none()] { "Select Category" }

                @for category in categories {
                    option
                        value=(category.id)
                        selected[selected == Some(category.id)]
                    {
                        (category.name)
                    }
                }
            }
        }
    }
}

fn transaction_form_fields(values: &TransactionFormValues, categories: &[Category]) -> Markup {
    html! {
        div class="grid grid-cols-1 md:grid-cols-2 gap-4"
        {
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
                        value=[values.amount]
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }
            }

            (kind_select_view(values.kind))
        }

        div class="grid grid-cols-1 md:grid-cols-2 gap-4"
        {
            (category_select_view(values.category, categories))

            div
            {
                label for="date" class=(FORM_LABEL_STYLE) { "Date" }

                input
                    id="date"
                    type="date"
                    name="date"
                    value=[values.date.as_deref()]
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }
        }

        div
        {
            label for="description" class=(FORM_LABEL_STYLE) { "Description" }

            textarea
                id="description"
                name="description"
                placeholder="Description"
                class=(FORM_TEXT_INPUT_STYLE)
            {
                (values.description)
            }
        }
    }
}

/// The values a transaction form is rendered with.
#[derive(Default)]
struct TransactionFormValues<'a> {
    amount: Option<f64>,
    kind: TransactionType,
    category: Option<CategoryId>,
    date: Option<String>,
    description: &'a str,
}

impl Default for TransactionType {
    fn default() -> Self {
        TransactionType::Expense
    }
}

fn new_transaction_form_view(categories: &[Category]) -> Markup {
    html! {
        form
            hx-post=(endpoints::POST_TRANSACTION)
            hx-target-error="#alert-container"
            class="w-full space-y-4 md:space-y-6 mb-8"
        {
            (transaction_form_fields(&TransactionFormValues::default(), categories))

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Add Transaction" }
        }
    }
}

fn edit_transaction_form_view(
    update_endpoint: &str,
    values: &TransactionFormValues,
    categories: &[Category],
    error_message: &str,
) -> Markup {
    html! {
        form
            hx-put=(update_endpoint)
            hx-target-error="#alert-container"
            class="w-full space-y-4 md:space-y-6"
        {
            (transaction_form_fields(values, categories))

            @if !error_message.is_empty() {
                p class="text-red-600 dark:text-red-400" { (error_message) }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Update Transaction" }
        }
    }
}

fn transaction_row(
    transaction: &Transaction,
    category_names: &HashMap<CategoryId, &str>,
) -> Markup {
    let kind_style = match transaction.kind {
        TransactionType::Income => "font-semibold text-green-600 dark:text-green-400",
        TransactionType::Expense => "font-semibold text-red-600 dark:text-red-400",
    };
    let edit_endpoint =
        endpoints::format_endpoint(endpoints::EDIT_TRANSACTION_VIEW, transaction.id);
    let delete_endpoint =
        endpoints::format_endpoint(endpoints::DELETE_TRANSACTION, transaction.id);

    html! {
        tr class=(TABLE_ROW_STYLE)
        {
            td class=(TABLE_CELL_STYLE) { (transaction.date) }
            td class={ (TABLE_CELL_STYLE) " " (kind_style) } { (transaction.kind) }
            td class=(TABLE_CELL_STYLE) {
                (category_label(transaction.category, category_names))
            }
            td class=(TABLE_CELL_STYLE) { (format_currency(transaction.amount)) }
            td class=(TABLE_CELL_STYLE) { (transaction.description) }
            td class=(TABLE_CELL_STYLE)
            {
                a
                    href=(edit_endpoint)
                    class="text-blue-600 hover:text-blue-500 dark:text-blue-500 underline mr-4"
                {
                    "Edit"
                }

                button
                    type="button"
                    hx-delete=(delete_endpoint)
                    hx-confirm="Are you sure you want to delete this transaction?"
                    hx-target="closest tr"
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

fn transactions_view(
    transactions: &[Transaction],
    categories: &[Category],
    curr_page: u64,
    page_count: u64,
    max_pages: u64,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::TRANSACTIONS_VIEW).into_html();
    let names = category_names(categories);
    let indicators = create_pagination_indicators(curr_page, page_count, max_pages);

    let content = html! {
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-4xl"
            {
                h1 class="text-2xl font-bold mb-6" { "Add Transaction" }

                (new_transaction_form_view(categories))

                h2 class="text-2xl font-bold mb-6" { "Transaction List" }

                @if transactions.is_empty() {
                    p class="text-gray-500 dark:text-gray-400"
                    {
                        "No transactions yet. Add your first one above."
                    }
                } @else {
                    div class="relative overflow-x-auto shadow-md sm:rounded-lg mb-4"
                    {
                        table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
                        {
                            thead class=(TABLE_HEADER_STYLE)
                            {
                                tr
                                {
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Type" }
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Amount" }
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                                }
                            }

                            tbody
                            {
                                @for transaction in transactions {
                                    (transaction_row(transaction, &names))
                                }
                            }
                        }
                    }

                    @if page_count > 1 {
                        (pagination_controls(&indicators, endpoints::TRANSACTIONS_VIEW))
                    }
                }
            }
        }
    };

    base("Transactions", &[dollar_input_styles()], &content)
}

fn edit_transaction_view(
    update_endpoint: &str,
    values: &TransactionFormValues,
    categories: &[Category],
    error_message: &str,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::TRANSACTIONS_VIEW).into_html();
    let form = edit_transaction_form_view(update_endpoint, values, categories, error_message);

    let content = html! {
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-md"
            {
                h1 class="text-2xl font-bold mb-6" { "Edit Transaction" }

                (form)
            }
        }
    };

    base("Edit Transaction", &[dollar_input_styles()], &content)
}

/// The state needed for the transactions listing page.
#[derive(Clone)]
pub struct TransactionsPageState {
    /// The client for the remote finance API.
    pub api: ApiClient,
    /// The config that controls how to display pages of data.
    pub pagination_config: PaginationConfig,
}

impl FromRef<AppState> for TransactionsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            api: state.api.clone(),
            pagination_config: state.pagination_config.clone(),
        }
    }
}

/// The state needed for creating a transaction.
#[derive(Clone)]
pub struct CreateTransactionEndpointState {
    /// The client for the remote finance API.
    pub api: ApiClient,
}

impl FromRef<AppState> for CreateTransactionEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            api: state.api.clone(),
        }
    }
}

/// The state needed for the edit transaction page.
#[derive(Clone)]
pub struct EditTransactionPageState {
    /// The client for the remote finance API.
    pub api: ApiClient,
}

impl FromRef<AppState> for EditTransactionPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            api: state.api.clone(),
        }
    }
}

/// The state needed for updating a transaction.
#[derive(Clone)]
pub struct UpdateTransactionEndpointState {
    /// The client for the remote finance API.
    pub api: ApiClient,
}

impl FromRef<AppState> for UpdateTransactionEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            api: state.api.clone(),
        }
    }
}

/// The state needed for deleting a transaction.
#[derive(Clone)]
pub struct DeleteTransactionEndpointState {
    /// The client for the remote finance API.
    pub api: ApiClient,
}

impl FromRef<AppState> for DeleteTransactionEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            api: state.api.clone(),
        }
    }
}

/// The query parameters accepted by the transactions page.
#[derive(Debug, Deserialize)]
pub struct TransactionsQuery {
    /// The page of transactions to display.
    pub page: Option<u64>,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<CategoryId>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;

    match value.as_deref() {
        None | Some("") => Ok(None),
        Some(text) => text.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

/// The raw data entered by the user in the transaction forms.
#[derive(Debug, Serialize, Deserialize)]
pub struct TransactionFormData {
    /// How much money moved.
    pub amount: f64,
    /// Whether the transaction is income or an expense.
    #[serde(rename = "type")]
    pub kind: TransactionType,
    /// The selected category, where an empty selection means no category.
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub category: Option<CategoryId>,
    /// The day the transaction happened.
    #[serde(with = "date_format")]
    pub date: Date,
    /// A free-form note.
    #[serde(default)]
    pub description: String,
}

impl TransactionFormData {
    fn into_transaction_data(self, user: i64) -> TransactionData {
        TransactionData {
            amount: self.amount,
            date: self.date,
            description: self.description,
            kind: self.kind,
            category: self.category,
            user,
        }
    }
}

/// Display the transactions page with the list of transactions and the form
/// for recording a new one.
pub async fn get_transactions_page(
    State(state): State<TransactionsPageState>,
    Extension(session): Extension<Session>,
    Query(query): Query<TransactionsQuery>,
) -> Result<Response, Error> {
    let (mut transactions, categories) = tokio::try_join!(
        get_transactions(&state.api, &session),
        get_categories(&state.api, &session),
    )?;

    // Newest first, falling back to insertion order within a day.
    transactions.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));

    let page_size = state.pagination_config.default_page_size.max(1);
    let page_count = (transactions.len() as u64).div_ceil(page_size).max(1);
    let curr_page = query
        .page
        .unwrap_or(state.pagination_config.default_page)
        .clamp(1, page_count);

    let start = ((curr_page - 1) * page_size) as usize;
    let page_of_transactions: Vec<Transaction> = transactions
        .into_iter()
        .skip(start)
        .take(page_size as usize)
        .collect();

    Ok(transactions_view(
        &page_of_transactions,
        &categories,
        curr_page,
        page_count,
        state.pagination_config.max_pages,
    )
    .into_response())
}

/// A route handler for creating a new transaction.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionEndpointState>,
    Extension(session): Extension<Session>,
    Form(form_data): Form<TransactionFormData>,
) -> Response {
    let data = form_data.into_transaction_data(session.user_id);

    if let Err(error) = data.validate(OffsetDateTime::now_utc().date()) {
        return error.into_alert_response();
    }

    match create_transaction(&state.api, &session, &data).await {
        Ok(_) => (
            HxRedirect(endpoints::TRANSACTIONS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while creating a transaction: {error}");

            error.into_alert_response()
        }
    }
}

/// Route handler for the edit transaction page.
pub async fn get_edit_transaction_page(
    Path(transaction_id): Path<TransactionId>,
    State(state): State<EditTransactionPageState>,
    Extension(session): Extension<Session>,
) -> Result<Response, Error> {
    let update_endpoint = endpoints::format_endpoint(endpoints::PUT_TRANSACTION, transaction_id);

    let (transaction, categories) = tokio::try_join!(
        get_transaction(&state.api, &session, transaction_id),
        get_categories(&state.api, &session),
    )
    .map_err(|error| {
        if error != Error::NotFound {
            tracing::error!("Failed to retrieve transaction {transaction_id}: {error}");
        }

        error
    })?;

    let values = TransactionFormValues {
        amount: Some(transaction.amount),
        kind: transaction.kind,
        category: transaction.category,
        date: Some(transaction.date.to_string()),
        description: &transaction.description,
    };

    Ok(edit_transaction_view(&update_endpoint, &values, &categories, "").into_response())
}

/// A route handler for updating a transaction.
pub async fn update_transaction_endpoint(
    Path(transaction_id): Path<TransactionId>,
    State(state): State<UpdateTransactionEndpointState>,
    Extension(session): Extension<Session>,
    Form(form_data): Form<TransactionFormData>,
) -> Response {
    let data = form_data.into_transaction_data(session.user_id);

    if let Err(error) = data.validate(OffsetDateTime::now_utc().date()) {
        return error.into_alert_response();
    }

    match update_transaction(&state.api, &session, transaction_id, &data).await {
        Ok(_) => (
            HxRedirect(endpoints::TRANSACTIONS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while updating transaction {transaction_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}

/// A route handler for deleting a transaction.
pub async fn delete_transaction_endpoint(
    Path(transaction_id): Path<TransactionId>,
    State(state): State<DeleteTransactionEndpointState>,
    Extension(session): Extension<Session>,
) -> Response {
    match delete_transaction(&state.api, &session, transaction_id).await {
        Ok(()) => Alert::success_simple("Transaction deleted successfully").into_response(),
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while deleting transaction {transaction_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod wire_format_tests {
    use time::macros::date;

    use super::{Transaction, TransactionData, TransactionType};

    #[test]
    fn deserializes_amount_from_decimal_string() {
        let json = r#"{
            "id": 1,
            "user": 2,
            "category": 3,
            "amount": "150.50",
            "date": "2024-01-15",
            "description": "Groceries",
            "type": "expense"
        }"#;

        let transaction: Transaction = serde_json::from_str(json).unwrap();

        assert_eq!(transaction.amount, 150.50);
        assert_eq!(transaction.date, date!(2024 - 01 - 15));
        assert_eq!(transaction.kind, TransactionType::Expense);
        assert_eq!(transaction.category, Some(3));
    }

    #[test]
    fn deserializes_amount_from_number() {
        let json = r#"{
            "id": 1,
            "user": 2,
            "category": null,
            "amount": 42.0,
            "date": "2024-02-29",
            "type": "income"
        }"#;

        let transaction: Transaction = serde_json::from_str(json).unwrap();

        assert_eq!(transaction.amount, 42.0);
        assert_eq!(transaction.category, None);
        assert_eq!(transaction.description, "");
    }

    #[test]
    fn serializes_payload_the_way_the_api_expects() {
        let data = TransactionData {
            amount: 19.99,
            date: date!(2024 - 03 - 01),
            description: "Lunch".to_owned(),
            kind: TransactionType::Expense,
            category: Some(7),
            user: 2,
        };

        let json = serde_json::to_value(&data).unwrap();

        assert_eq!(json["amount"], 19.99);
        assert_eq!(json["date"], "2024-03-01");
        assert_eq!(json["type"], "expense");
        assert_eq!(json["category"], 7);
        assert_eq!(json["user"], 2);
    }
}
