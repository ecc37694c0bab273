//! Helpers shared between tests.
//!
//! The centerpiece is [StubApi]: an in-memory imitation of the remote finance
//! API served over real HTTP, so the reqwest-based [ApiClient] can be
//! exercised end to end. Its endpoints mirror the backend's REST resources
//! and its bearer-token checks.

use std::sync::{Arc, Mutex, MutexGuard};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Deserialize;
use serde_json::json;
use time::{Date, Duration, OffsetDateTime};

use crate::{
    api::ApiClient,
    auth::Session,
    budget::{Budget, BudgetData},
    category::{Category, CategoryData, CategoryName},
    transaction::{Transaction, TransactionData, TransactionType},
};

/// The only username the stub API issues tokens for.
pub const TEST_USERNAME: &str = "testuser";
/// The password matching [TEST_USERNAME].
pub const TEST_PASSWORD: &str = "correct horse battery staple";
/// The bearer token the stub API accepts on resource endpoints.
pub const TEST_ACCESS_TOKEN: &str = "test-access-token";
/// The user ID the stub API reports for [TEST_USERNAME].
pub const TEST_USER_ID: i64 = 1;

/// A session holding the stub API's expected bearer token.
pub fn test_session() -> Session {
    Session {
        access_token: TEST_ACCESS_TOKEN.to_owned(),
        refresh_token: "test-refresh-token".to_owned(),
        user_id: TEST_USER_ID,
        expires_at: OffsetDateTime::now_utc() + Duration::hours(1),
    }
}

#[derive(Default)]
struct StubState {
    transactions: Vec<Transaction>,
    categories: Vec<Category>,
    budgets: Vec<Budget>,
}

type SharedState = Arc<Mutex<StubState>>;

/// An in-memory stand-in for the remote finance API.
pub struct StubApi {
    client: ApiClient,
    state: SharedState,
}

impl StubApi {
    /// Start the stub API on a random local port.
    ///
    /// The server task is tied to the test's tokio runtime and goes away with
    /// it.
    pub async fn spawn() -> Self {
        let state: SharedState = Arc::new(Mutex::new(StubState::default()));
        let router = stub_router(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Could not bind the stub API listener.");
        let address = listener
            .local_addr()
            .expect("stub API listener should have an address");

        tokio::spawn(async move {
            axum::serve(listener, router)
                .await
                .expect("stub API server stopped unexpectedly");
        });

        let base_url = format!("http://{address}/api");
        let client = ApiClient::new(&base_url).expect("Could not create API client.");

        Self { client, state }
    }

    /// A client pointed at this stub.
    pub fn client(&self) -> ApiClient {
        self.client.clone()
    }

    fn lock(&self) -> MutexGuard<'_, StubState> {
        self.state.lock().expect("stub API state lock poisoned")
    }

    /// Insert a category directly into the stub's state.
    pub fn seed_category(&self, id: i64, name: &str, kind: TransactionType) {
        self.lock().categories.push(Category {
            id,
            user: TEST_USER_ID,
            name: CategoryName::new_unchecked(name),
            kind,
        });
    }

    /// Insert an expense transaction directly into the stub's state.
    pub fn seed_transaction(
        &self,
        id: i64,
        category: Option<i64>,
        amount: f64,
        date: Date,
        description: &str,
    ) {
        self.lock().transactions.push(Transaction {
            id,
            user: TEST_USER_ID,
            category,
            amount,
            date,
            description: description.to_owned(),
            kind: TransactionType::Expense,
        });
    }

    /// Insert a transaction of the given kind directly into the stub's state.
    pub fn seed_typed_transaction(
        &self,
        id: i64,
        category: Option<i64>,
        amount: f64,
        date: Date,
        kind: TransactionType,
    ) {
        self.lock().transactions.push(Transaction {
            id,
            user: TEST_USER_ID,
            category,
            amount,
            date,
            description: String::new(),
            kind,
        });
    }

    /// Insert a budget directly into the stub's state.
    pub fn seed_budget(&self, id: i64, month: Date, amount: f64) {
        self.lock().budgets.push(Budget {
            id,
            user: TEST_USER_ID,
            month,
            amount,
        });
    }
}

fn stub_router(state: SharedState) -> Router {
    Router::new()
        .route("/api/token/", axum::routing::post(obtain_token))
        .route("/api/signup/", axum::routing::post(sign_up))
        .route(
            "/api/transactions/",
            get(list_transactions).post(create_transaction),
        )
        .route(
            "/api/transactions/{id}/",
            get(get_transaction)
                .put(update_transaction)
                .delete(delete_transaction),
        )
        .route(
            "/api/categories/",
            get(list_categories).post(create_category),
        )
        .route(
            "/api/categories/{id}/",
            get(get_category).put(update_category).delete(delete_category),
        )
        .route("/api/budgets/", get(list_budgets).post(create_budget))
        .route(
            "/api/budgets/{id}/",
            get(get_budget).put(update_budget).delete(delete_budget),
        )
        .with_state(state)
}

fn check_auth(headers: &HeaderMap) -> Result<(), Response> {
    let expected = format!("Bearer {TEST_ACCESS_TOKEN}");
    let header = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    if header == Some(expected.as_str()) {
        Ok(())
    } else {
        Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "Authentication credentials were not provided."})),
        )
            .into_response())
    }
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({"detail": "Not found."}))).into_response()
}

#[derive(Deserialize)]
struct Credentials {
    username: String,
    password: String,
}

async fn obtain_token(Json(credentials): Json<Credentials>) -> Response {
    if credentials.username == TEST_USERNAME && credentials.password == TEST_PASSWORD {
        Json(json!({
            "access": TEST_ACCESS_TOKEN,
            "refresh": "test-refresh-token",
            "user_id": TEST_USER_ID,
            "username": TEST_USERNAME,
        }))
        .into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "No active account found with the given credentials"})),
        )
            .into_response()
    }
}

async fn sign_up(Json(credentials): Json<Credentials>) -> Response {
    if credentials.username == TEST_USERNAME {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({"username": ["A user with that username already exists."]})),
        )
            .into_response()
    } else {
        (
            StatusCode::CREATED,
            Json(json!({"message": "User created successfully"})),
        )
            .into_response()
    }
}

fn next_id<T>(items: &[T], id_of: impl Fn(&T) -> i64) -> i64 {
    items.iter().map(id_of).max().unwrap_or(0) + 1
}

async fn list_transactions(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    if let Err(response) = check_auth(&headers) {
        return response;
    }

    Json(state.lock().unwrap().transactions.clone()).into_response()
}

async fn create_transaction(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(data): Json<TransactionData>,
) -> Response {
    if let Err(response) = check_auth(&headers) {
        return response;
    }

    let mut state = state.lock().unwrap();
    let transaction = Transaction {
        id: next_id(&state.transactions, |transaction| transaction.id),
        user: data.user,
        category: data.category,
        amount: data.amount,
        date: data.date,
        description: data.description,
        kind: data.kind,
    };
    state.transactions.push(transaction.clone());

    (StatusCode::CREATED, Json(transaction)).into_response()
}

async fn get_transaction(
    Path(id): Path<i64>,
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> Response {
    if let Err(response) = check_auth(&headers) {
        return response;
    }

    let state = state.lock().unwrap();

    match state.transactions.iter().find(|transaction| transaction.id == id) {
        Some(transaction) => Json(transaction.clone()).into_response(),
        None => not_found(),
    }
}

async fn update_transaction(
    Path(id): Path<i64>,
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(data): Json<TransactionData>,
) -> Response {
    if let Err(response) = check_auth(&headers) {
        return response;
    }

    let mut state = state.lock().unwrap();

    match state
        .transactions
        .iter_mut()
        .find(|transaction| transaction.id == id)
    {
        Some(transaction) => {
            transaction.category = data.category;
            transaction.amount = data.amount;
            transaction.date = data.date;
            transaction.description = data.description;
            transaction.kind = data.kind;

            Json(transaction.clone()).into_response()
        }
        None => not_found(),
    }
}

async fn delete_transaction(
    Path(id): Path<i64>,
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> Response {
    if let Err(response) = check_auth(&headers) {
        return response;
    }

    let mut state = state.lock().unwrap();
    let initial_len = state.transactions.len();
    state.transactions.retain(|transaction| transaction.id != id);

    if state.transactions.len() == initial_len {
        not_found()
    } else {
        StatusCode::NO_CONTENT.into_response()
    }
}

async fn list_categories(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    if let Err(response) = check_auth(&headers) {
        return response;
    }

    Json(state.lock().unwrap().categories.clone()).into_response()
}

async fn create_category(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(data): Json<CategoryData>,
) -> Response {
    if let Err(response) = check_auth(&headers) {
        return response;
    }

    let mut state = state.lock().unwrap();
    let category = Category {
        id: next_id(&state.categories, |category| category.id),
        user: data.user,
        name: data.name,
        kind: data.kind,
    };
    state.categories.push(category.clone());

    (StatusCode::CREATED, Json(category)).into_response()
}

async fn get_category(
    Path(id): Path<i64>,
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> Response {
    if let Err(response) = check_auth(&headers) {
        return response;
    }

    let state = state.lock().unwrap();

    match state.categories.iter().find(|category| category.id == id) {
        Some(category) => Json(category.clone()).into_response(),
        None => not_found(),
    }
}

async fn update_category(
    Path(id): Path<i64>,
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(data): Json<CategoryData>,
) -> Response {
    if let Err(response) = check_auth(&headers) {
        return response;
    }

    let mut state = state.lock().unwrap();

    match state.categories.iter_mut().find(|category| category.id == id) {
        Some(category) => {
            category.name = data.name;
            category.kind = data.kind;

            Json(category.clone()).into_response()
        }
        None => not_found(),
    }
}

async fn delete_category(
    Path(id): Path<i64>,
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> Response {
    if let Err(response) = check_auth(&headers) {
        return response;
    }

    let mut state = state.lock().unwrap();
    let initial_len = state.categories.len();
    state.categories.retain(|category| category.id != id);

    if state.categories.len() == initial_len {
        not_found()
    } else {
        // The backend clears the reference on transactions that used this
        // category.
        for transaction in &mut state.transactions {
            if transaction.category == Some(id) {
                transaction.category = None;
            }
        }

        StatusCode::NO_CONTENT.into_response()
    }
}

async fn list_budgets(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    if let Err(response) = check_auth(&headers) {
        return response;
    }

    Json(state.lock().unwrap().budgets.clone()).into_response()
}

async fn create_budget(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(data): Json<BudgetData>,
) -> Response {
    if let Err(response) = check_auth(&headers) {
        return response;
    }

    let mut state = state.lock().unwrap();
    let budget = Budget {
        id: next_id(&state.budgets, |budget| budget.id),
        user: data.user,
        month: data.month,
        amount: data.amount,
    };
    state.budgets.push(budget.clone());

    (StatusCode::CREATED, Json(budget)).into_response()
}

async fn get_budget(
    Path(id): Path<i64>,
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> Response {
    if let Err(response) = check_auth(&headers) {
        return response;
    }

    let state = state.lock().unwrap();

    match state.budgets.iter().find(|budget| budget.id == id) {
        Some(budget) => Json(budget.clone()).into_response(),
        None => not_found(),
    }
}

async fn update_budget(
    Path(id): Path<i64>,
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(data): Json<BudgetData>,
) -> Response {
    if let Err(response) = check_auth(&headers) {
        return response;
    }

    let mut state = state.lock().unwrap();

    match state.budgets.iter_mut().find(|budget| budget.id == id) {
        Some(budget) => {
            budget.month = data.month;
            budget.amount = data.amount;

            Json(budget.clone()).into_response()
        }
        None => not_found(),
    }
}

async fn delete_budget(
    Path(id): Path<i64>,
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> Response {
    if let Err(response) = check_auth(&headers) {
        return response;
    }

    let mut state = state.lock().unwrap();
    let initial_len = state.budgets.len();
    state.budgets.retain(|budget| budget.id != id);

    if state.budgets.len() == initial_len {
        not_found()
    } else {
        StatusCode::NO_CONTENT.into_response()
    }
}
