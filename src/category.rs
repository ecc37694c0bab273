//! This file defines the `Category` type, the pages for managing categories,
//! and the calls that keep them in sync with the remote API.
//! A category is used for grouping transactions, e.g., 'Groceries', 'Wages'.

use std::{fmt::Display, str::FromStr};

use axum::{
    Extension, Form,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    alert::Alert,
    api::{self, ApiClient},
    auth::Session,
    endpoints,
    html::{
        BUTTON_DELETE_STYLE, BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base,
    },
    navigation::NavBar,
    transaction::TransactionType,
};

/// The name of a category.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct CategoryName(String);

impl CategoryName {
    /// Create a category name.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::EmptyCategoryName] if `name` is an empty string.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            Err(Error::EmptyCategoryName)
        } else {
            Ok(Self(name.to_string()))
        }
    }

    /// Create a category name without validation.
    ///
    /// The caller should ensure that the string is not empty.
    ///
    /// This function has `_unchecked` in the name but is not `unsafe`, because if the non-empty invariant is violated it will cause incorrect behaviour but not affect memory safety.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl AsRef<str> for CategoryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for CategoryName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CategoryName::new(s)
    }
}

impl Display for CategoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub type CategoryId = i64;

/// A named grouping of transactions, typed as income or expense.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    /// The ID of the category.
    pub id: CategoryId,

    /// The ID of the user that owns the category.
    pub user: i64,

    /// The name of the category.
    pub name: CategoryName,

    /// Whether the category groups income or expenses.
    #[serde(rename = "type")]
    pub kind: TransactionType,
}

/// The fields sent to the API when creating or updating a category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryData {
    /// The name of the category.
    pub name: CategoryName,

    /// Whether the category groups income or expenses.
    #[serde(rename = "type")]
    pub kind: TransactionType,

    /// The ID of the user that owns the category.
    pub user: i64,
}

/// Retrieve all of the user's categories from the API.
///
/// # Errors
/// Returns an error if the API cannot be reached or rejects the session.
pub async fn get_categories(api: &ApiClient, session: &Session) -> Result<Vec<Category>, Error> {
    api.get_json(api::CATEGORIES, session).await
}

/// Retrieve a single category from the API.
///
/// # Errors
/// Returns [Error::NotFound] if there is no category with `category_id`.
pub async fn get_category(
    api: &ApiClient,
    session: &Session,
    category_id: CategoryId,
) -> Result<Category, Error> {
    api.get_json(&ApiClient::item(api::CATEGORIES, category_id), session)
        .await
}

/// Create a category through the API.
///
/// # Errors
/// Returns an error if the API cannot be reached or rejects the record.
pub async fn create_category(
    api: &ApiClient,
    session: &Session,
    data: &CategoryData,
) -> Result<Category, Error> {
    api.post_json(api::CATEGORIES, data, Some(session)).await
}

/// Replace the category with `category_id` through the API.
///
/// # Errors
/// Returns [Error::NotFound] if there is no category with `category_id`.
pub async fn update_category(
    api: &ApiClient,
    session: &Session,
    category_id: CategoryId,
    data: &CategoryData,
) -> Result<Category, Error> {
    api.put_json(&ApiClient::item(api::CATEGORIES, category_id), data, session)
        .await
}

/// Delete the category with `category_id` through the API.
///
/// The backend clears the category reference on any transactions that used
/// it; the client renders those as uncategorized afterwards.
///
/// # Errors
/// Returns [Error::NotFound] if there is no category with `category_id`.
pub async fn delete_category(
    api: &ApiClient,
    session: &Session,
    category_id: CategoryId,
) -> Result<(), Error> {
    api.delete(&ApiClient::item(api::CATEGORIES, category_id), session)
        .await
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
                option value="income" selected[selected == TransactionType::Income] { "Income" }
                option value="expense" selected[selected == TransactionType::Expense] { "Expense" }
            }
        }
    }
}

fn new_category_form_view() -> Markup {
    html! {
        form
            hx-post=(endpoints::POST_CATEGORY)
            hx-target-error="#alert-container"
            class="w-full space-y-4 md:space-y-6 mb-8"
        {
            div class="grid grid-cols-1 md:grid-cols-2 gap-4"
            {
                div
                {
                    label for="name" class=(FORM_LABEL_STYLE) { "Category Name" }

                    input
                        id="name"
                        type="text"
                        name="name"
                        placeholder="New Category"
                        required
                        autofocus
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                (kind_select_view(TransactionType::Income))
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Add Category" }
        }
    }
}

fn edit_category_form_view(
    update_endpoint: &str,
    category_name: &str,
    kind: TransactionType,
    error_message: &str,
) -> Markup {
    html! {
        form
            hx-put=(update_endpoint)
            hx-target-error="#alert-container"
            class="w-full space-y-4 md:space-y-6"
        {
            div
            {
                label for="name" class=(FORM_LABEL_STYLE) { "Category Name" }

                input
                    id="name"
                    type="text"
                    name="name"
                    placeholder="Category Name"
                    value=(category_name)
                    required
                    autofocus
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            (kind_select_view(kind))

            @if !error_message.is_empty() {
                p class="text-red-600 dark:text-red-400" { (error_message) }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Update Category" }
        }
    }
}

fn category_row(category: &Category) -> Markup {
    let edit_endpoint = endpoints::format_endpoint(endpoints::EDIT_CATEGORY_VIEW, category.id);
    let delete_endpoint = endpoints::format_endpoint(endpoints::DELETE_CATEGORY, category.id);

    html! {
        tr class=(TABLE_ROW_STYLE)
        {
            td class={ (TABLE_CELL_STYLE) " font-medium text-gray-900 dark:text-white" }
            {
                (category.name)
            }
            td class=(TABLE_CELL_STYLE) { (category.kind) }
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
                    hx-confirm="Are you sure you want to delete this category? Its transactions will become uncategorized."
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

fn categories_view(categories: &[Category]) -> Markup {
    let nav_bar = NavBar::new(endpoints::CATEGORIES_VIEW).into_html();

    let content = html! {
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-4xl"
            {
                h1 class="text-2xl font-bold mb-6" { "Manage Categories" }

                (new_category_form_view())

                h2 class="text-2xl font-bold mb-6" { "Categories" }

                @if categories.is_empty() {
                    p class="text-gray-500 dark:text-gray-400"
                    {
                        "No categories yet. Add your first one above."
                    }
                } @else {
                    div class="relative overflow-x-auto shadow-md sm:rounded-lg"
                    {
                        table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
                        {
                            thead class=(TABLE_HEADER_STYLE)
                            {
                                tr
                                {
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Name" }
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Type" }
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                                }
                            }

                            tbody
                            {
                                @for category in categories {
                                    (category_row(category))
                                }
                            }
                        }
                    }
                }
            }
        }
    };

    base("Categories", &[], &content)
}

fn edit_category_view(
    update_endpoint: &str,
    category_name: &str,
    kind: TransactionType,
    error_message: &str,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::CATEGORIES_VIEW).into_html();
    let form = edit_category_form_view(update_endpoint, category_name, kind, error_message);

    let content = html! {
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-md"
            {
                h1 class="text-2xl font-bold mb-6" { "Edit Category" }

                (form)
            }
        }
    };

    base("Edit Category", &[], &content)
}

/// The state needed for the categories listing page.
#[derive(Clone)]
pub struct CategoriesPageState {
    /// The client for the remote finance API.
    pub api: ApiClient,
}

impl FromRef<AppState> for CategoriesPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            api: state.api.clone(),
        }
    }
}

/// The state needed for creating a category.
#[derive(Clone)]
pub struct CreateCategoryEndpointState {
    /// The client for the remote finance API.
    pub api: ApiClient,
}

impl FromRef<AppState> for CreateCategoryEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            api: state.api.clone(),
        }
    }
}

/// The state needed for the edit category page.
#[derive(Clone)]
pub struct EditCategoryPageState {
    /// The client for the remote finance API.
    pub api: ApiClient,
}

impl FromRef<AppState> for EditCategoryPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            api: state.api.clone(),
        }
    }
}

/// The state needed for updating a category.
#[derive(Clone)]
pub struct UpdateCategoryEndpointState {
    /// The client for the remote finance API.
    pub api: ApiClient,
}

impl FromRef<AppState> for UpdateCategoryEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            api: state.api.clone(),
        }
    }
}

/// The state needed for deleting a category.
#[derive(Clone)]
pub struct DeleteCategoryEndpointState {
    /// The client for the remote finance API.
    pub api: ApiClient,
}

impl FromRef<AppState> for DeleteCategoryEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            api: state.api.clone(),
        }
    }
}

/// The raw data entered by the user in the category forms.
#[derive(Debug, Serialize, Deserialize)]
pub struct CategoryFormData {
    /// The name of the category.
    pub name: String,
    /// Whether the category groups income or expenses.
    #[serde(rename = "type")]
    pub kind: TransactionType,
}

/// Display the categories page with the list of categories and the form for
/// creating a new one.
pub async fn get_categories_page(
    State(state): State<CategoriesPageState>,
    Extension(session): Extension<Session>,
) -> Result<Response, Error> {
    let categories = get_categories(&state.api, &session).await?;

    Ok(categories_view(&categories).into_response())
}

/// A route handler for creating a new category.
pub async fn create_category_endpoint(
    State(state): State<CreateCategoryEndpointState>,
    Extension(session): Extension<Session>,
    Form(form_data): Form<CategoryFormData>,
) -> Response {
    let name = match CategoryName::new(&form_data.name) {
        Ok(name) => name,
        Err(error) => return error.into_alert_response(),
    };

    let data = CategoryData {
        name,
        kind: form_data.kind,
        user: session.user_id,
    };

    match create_category(&state.api, &session, &data).await {
        Ok(_) => (
            HxRedirect(endpoints::CATEGORIES_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while creating a category: {error}");

            error.into_alert_response()
        }
    }
}

/// Route handler for the edit category page.
pub async fn get_edit_category_page(
    Path(category_id): Path<CategoryId>,
    State(state): State<EditCategoryPageState>,
    Extension(session): Extension<Session>,
) -> Result<Response, Error> {
    let update_endpoint = endpoints::format_endpoint(endpoints::PUT_CATEGORY, category_id);

    match get_category(&state.api, &session, category_id).await {
        Ok(category) => Ok(edit_category_view(
            &update_endpoint,
            category.name.as_ref(),
            category.kind,
            "",
        )
        .into_response()),
        Err(error) => {
            let error_message = match error {
                Error::NotFound => "Category not found",
                _ => {
                    tracing::error!("Failed to retrieve category {category_id}: {error}");
                    "Failed to load category"
                }
            };

            Ok(edit_category_view(
                &update_endpoint,
                "",
                TransactionType::Income,
                error_message,
            )
            .into_response())
        }
    }
}

/// A route handler for updating a category.
pub async fn update_category_endpoint(
    Path(category_id): Path<CategoryId>,
    State(state): State<UpdateCategoryEndpointState>,
    Extension(session): Extension<Session>,
    Form(form_data): Form<CategoryFormData>,
) -> Response {
    let name = match CategoryName::new(&form_data.name) {
        Ok(name) => name,
        Err(error) => return error.into_alert_response(),
    };

    let data = CategoryData {
        name,
        kind: form_data.kind,
        user: session.user_id,
    };

    match update_category(&state.api, &session, category_id, &data).await {
        Ok(_) => (
            HxRedirect(endpoints::CATEGORIES_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while updating category {category_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}

/// A route handler for deleting a category.
pub async fn delete_category_endpoint(
    Path(category_id): Path<CategoryId>,
    State(state): State<DeleteCategoryEndpointState>,
    Extension(session): Extension<Session>,
) -> Response {
    match delete_category(&state.api, &session, category_id).await {
        Ok(()) => Alert::success_simple("Category deleted successfully").into_response(),
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while deleting category {category_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod category_name_tests {
    use crate::{Error, category::CategoryName};

    #[test]
    fn new_fails_on_empty_string() {
        let category_name = CategoryName::new("");

        assert_eq!(category_name, Err(Error::EmptyCategoryName));
    }

    #[test]
    fn new_fails_on_just_whitespace() {
        let category_name = CategoryName::new("\n\t \r");

        assert_eq!(category_name, Err(Error::EmptyCategoryName));
    }

    #[test]
    fn new_trims_surrounding_whitespace() {
        let category_name = CategoryName::new("  Groceries  ").unwrap();

        assert_eq!(category_name.as_ref(), "Groceries");
    }

    #[test]
    fn serializes_as_plain_string() {
        let category_name = CategoryName::new_unchecked("Groceries");

        assert_eq!(
            serde_json::to_string(&category_name).unwrap(),
            r#""Groceries""#
        );
    }
}

#[cfg(test)]
mod category_route_tests {
    use axum::{
        Extension, Form,
        extract::{Path, State},
        http::StatusCode,
    };
    use axum_htmx::HX_REDIRECT;

    use crate::{
        endpoints,
        test_utils::{StubApi, test_session},
        transaction::TransactionType,
    };

    use super::{
        CategoriesPageState, CategoryFormData, CreateCategoryEndpointState,
        DeleteCategoryEndpointState, UpdateCategoryEndpointState, create_category_endpoint,
        delete_category_endpoint, get_categories, get_categories_page, update_category_endpoint,
    };

    async fn response_text(response: axum::response::Response) -> String {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        String::from_utf8_lossy(&body).to_string()
    }

    #[tokio::test]
    async fn create_category_stores_record_and_redirects() {
        let stub = StubApi::spawn().await;
        let state = CreateCategoryEndpointState {
            api: stub.client(),
        };

        let response = create_category_endpoint(
            State(state),
            Extension(test_session()),
            Form(CategoryFormData {
                name: "Groceries".to_owned(),
                kind: TransactionType::Expense,
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(HX_REDIRECT).unwrap(),
            endpoints::CATEGORIES_VIEW
        );

        let stored = get_categories(&stub.client(), &test_session()).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].name.as_ref(), "Groceries");
        assert_eq!(stored[0].kind, TransactionType::Expense);
    }

    #[tokio::test]
    async fn create_category_rejects_empty_name() {
        let stub = StubApi::spawn().await;
        let state = CreateCategoryEndpointState {
            api: stub.client(),
        };

        let response = create_category_endpoint(
            State(state),
            Extension(test_session()),
            Form(CategoryFormData {
                name: "   ".to_owned(),
                kind: TransactionType::Expense,
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let stored = get_categories(&stub.client(), &test_session()).await.unwrap();
        assert!(stored.is_empty());
    }

    #[tokio::test]
    async fn categories_page_lists_categories() {
        let stub = StubApi::spawn().await;
        stub.seed_category(1, "Wages", TransactionType::Income);
        stub.seed_category(2, "Rent", TransactionType::Expense);

        let state = CategoriesPageState {
            api: stub.client(),
        };

        let response = get_categories_page(State(state), Extension(test_session()))
            .await
            .unwrap();

        let text = response_text(response).await;
        assert!(text.contains("Wages"));
        assert!(text.contains("Rent"));
    }

    #[tokio::test]
    async fn update_category_replaces_record() {
        let stub = StubApi::spawn().await;
        stub.seed_category(1, "Wages", TransactionType::Income);

        let state = UpdateCategoryEndpointState {
            api: stub.client(),
        };

        let response = update_category_endpoint(
            Path(1),
            State(state),
            Extension(test_session()),
            Form(CategoryFormData {
                name: "Salary".to_owned(),
                kind: TransactionType::Income,
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let stored = get_categories(&stub.client(), &test_session()).await.unwrap();
        assert_eq!(stored[0].name.as_ref(), "Salary");
    }

    #[tokio::test]
    async fn delete_missing_category_returns_alert() {
        let stub = StubApi::spawn().await;
        let state = DeleteCategoryEndpointState {
            api: stub.client(),
        };

        let response =
            delete_category_endpoint(Path(999), State(state), Extension(test_session())).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
