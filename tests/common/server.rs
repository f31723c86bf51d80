//! Fake dealership backend
//!
//! Serves the `login/` and `cars/` endpoints the console talks to, backed by
//! in-memory state seeded from the fixtures. Mutations require an admin token,
//! any known token may list.

use super::constants::*;
use super::fixtures::{test_cars, test_users, FakeUser};
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use showroom_console::inventory::{InventoryItem, InventoryItemId, NewInventoryItem};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

struct BackendState {
    base_url: String,
    users: Vec<FakeUser>,
    cars: BTreeMap<u64, InventoryItem>,
    next_id: u64,
    paginate: bool,
}

type SharedState = Arc<Mutex<BackendState>>;

/// Fake backend bound to a random port.
///
/// When dropped, the server gracefully shuts down.
pub struct TestServer {
    /// e.g. "http://127.0.0.1:12345"
    pub base_url: String,

    state: SharedState,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestServer {
    /// Spawns a backend whose listing is paginated by [`PAGE_SIZE`].
    pub async fn spawn() -> Self {
        Self::spawn_with(true).await
    }

    /// Spawns a backend whose listing is a bare JSON array.
    pub async fn spawn_unpaginated() -> Self {
        Self::spawn_with(false).await
    }

    async fn spawn_with(paginate: bool) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();
        let base_url = format!("http://127.0.0.1:{}", port);

        let cars = test_cars()
            .into_iter()
            .map(|car| (car.id.0, car))
            .collect::<BTreeMap<_, _>>();
        let state = Arc::new(Mutex::new(BackendState {
            base_url: base_url.clone(),
            users: test_users(),
            next_id: cars.len() as u64 + 1,
            cars,
            paginate,
        }));

        let app = Router::new()
            .route("/health", get(|| async { "ok" }))
            .route("/api/login/", post(login))
            .route("/api/cars/", get(list_cars).post(create_car))
            .route("/api/cars/{id}/", put(update_car).delete(delete_car))
            .route("/api/cars/statistics/", get(statistics))
            .route("/api/cars/average-price/", get(average_price))
            .route("/api/cars/expensive/", get(expensive_cars))
            .route("/api/cars/low-stock/", get(low_stock_cars))
            .with_state(state.clone());

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Server failed");
        });

        let server = Self {
            base_url,
            state,
            _shutdown_tx: Some(shutdown_tx),
        };
        server.wait_for_ready().await;
        server
    }

    /// Base URL the console is configured with.
    pub fn api_url(&self) -> String {
        format!("{}/api/", self.base_url)
    }

    /// Cars currently held by the backend, in id order.
    pub fn cars(&self) -> Vec<InventoryItem> {
        self.state.lock().unwrap().cars.values().cloned().collect()
    }

    /// Deletes a car behind the console's back.
    pub fn remove_car(&self, id: u64) {
        self.state.lock().unwrap().cars.remove(&id);
    }

    /// Empties the inventory behind the console's back.
    pub fn remove_all_cars(&self) {
        self.state.lock().unwrap().cars.clear();
    }

    async fn wait_for_ready(&self) {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .expect("Failed to build reqwest client");

        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(SERVER_READY_TIMEOUT_MS);

        loop {
            if start.elapsed() > timeout {
                panic!(
                    "Server did not become ready within {}ms",
                    SERVER_READY_TIMEOUT_MS
                );
            }
            match client.get(format!("{}/health", self.base_url)).send().await {
                Ok(response) if response.status().is_success() => return,
                _ => {
                    tokio::time::sleep(Duration::from_millis(SERVER_READY_POLL_INTERVAL_MS)).await
                }
            }
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

#[derive(Deserialize)]
struct LoginBody {
    username: String,
    password: String,
}

#[derive(Deserialize)]
struct PageQuery {
    page: Option<usize>,
}

fn caller(state: &BackendState, headers: &HeaderMap) -> Option<FakeUser> {
    let token = headers
        .get("authorization")?
        .to_str()
        .ok()?
        .strip_prefix("Token ")?;
    state.users.iter().find(|user| user.token == token).cloned()
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"detail": "Invalid token."})),
    )
        .into_response()
}

fn forbidden() -> Response {
    (
        StatusCode::FORBIDDEN,
        Json(json!({"detail": "You do not have permission to perform this action."})),
    )
        .into_response()
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({"detail": "Not found."}))).into_response()
}

/// Authorizes a mutation, only admins may change the inventory.
fn require_admin(state: &BackendState, headers: &HeaderMap) -> Result<(), Response> {
    match caller(state, headers) {
        None => Err(unauthorized()),
        Some(user) if user.role == Some("admin") => Ok(()),
        Some(_) => Err(forbidden()),
    }
}

async fn login(State(state): State<SharedState>, Json(body): Json<LoginBody>) -> Response {
    let state = state.lock().unwrap();
    let user = state
        .users
        .iter()
        .find(|user| user.username == body.username && user.password == body.password);
    match user {
        Some(user) => {
            let mut response = json!({"token": user.token, "username": user.username});
            if let Some(role) = user.role {
                response["role"] = json!(role);
            }
            (StatusCode::OK, Json(response)).into_response()
        }
        None => (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Invalid Credentials"})),
        )
            .into_response(),
    }
}

async fn list_cars(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Query(query): Query<PageQuery>,
) -> Response {
    let state = state.lock().unwrap();
    if caller(&state, &headers).is_none() {
        return unauthorized();
    }
    let cars: Vec<InventoryItem> = state.cars.values().cloned().collect();
    if !state.paginate {
        return Json(cars).into_response();
    }

    let page = query.page.unwrap_or(1).max(1);
    let start = (page - 1) * PAGE_SIZE;
    let results: Vec<&InventoryItem> = cars.iter().skip(start).take(PAGE_SIZE).collect();
    let next = (start + PAGE_SIZE < cars.len())
        .then(|| format!("{}/api/cars/?page={}", state.base_url, page + 1));
    let previous =
        (page > 1).then(|| format!("{}/api/cars/?page={}", state.base_url, page - 1));
    Json(json!({
        "count": cars.len(),
        "next": next,
        "previous": previous,
        "results": results,
    }))
    .into_response()
}

async fn create_car(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(body): Json<NewInventoryItem>,
) -> Response {
    let mut state = state.lock().unwrap();
    if let Err(response) = require_admin(&state, &headers) {
        return response;
    }
    let id = state.next_id;
    state.next_id += 1;
    let car = InventoryItem {
        id: InventoryItemId(id),
        brand: body.brand,
        model: body.model,
        year: body.year,
        price: body.price,
        stock: body.stock,
    };
    state.cars.insert(id, car.clone());
    (StatusCode::CREATED, Json(car)).into_response()
}

async fn update_car(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(id): Path<u64>,
    Json(body): Json<NewInventoryItem>,
) -> Response {
    let mut state = state.lock().unwrap();
    if let Err(response) = require_admin(&state, &headers) {
        return response;
    }
    let Some(car) = state.cars.get_mut(&id) else {
        return not_found();
    };
    car.brand = body.brand;
    car.model = body.model;
    car.year = body.year;
    car.price = body.price;
    car.stock = body.stock;
    Json(car.clone()).into_response()
}

async fn delete_car(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(id): Path<u64>,
) -> Response {
    let mut state = state.lock().unwrap();
    if let Err(response) = require_admin(&state, &headers) {
        return response;
    }
    match state.cars.remove(&id) {
        Some(_) => StatusCode::NO_CONTENT.into_response(),
        None => not_found(),
    }
}

fn price_of(car: &InventoryItem) -> f64 {
    car.price.parse().unwrap_or_default()
}

/// Report rows carry the price as a number, unlike the listing.
fn report_row(car: &InventoryItem) -> serde_json::Value {
    json!({
        "id": car.id,
        "brand": car.brand,
        "model": car.model,
        "year": car.year,
        "price": price_of(car),
        "stock": car.stock,
    })
}

async fn statistics(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    let state = state.lock().unwrap();
    if caller(&state, &headers).is_none() {
        return unauthorized();
    }
    let cars: Vec<&InventoryItem> = state.cars.values().collect();
    let (average_price, total_stock) = if cars.is_empty() {
        (None, None)
    } else {
        let total: f64 = cars.iter().map(|car| price_of(car)).sum();
        let stock: u32 = cars.iter().map(|car| car.stock).sum();
        (Some(total / cars.len() as f64), Some(stock))
    };
    let models: std::collections::BTreeSet<(&str, &str)> = cars
        .iter()
        .map(|car| (car.brand.as_str(), car.model.as_str()))
        .collect();
    Json(json!({
        "total_cars": cars.len(),
        "average_price": average_price,
        "total_stock": total_stock,
        "unique_models": models.len(),
    }))
    .into_response()
}

async fn average_price(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    let state = state.lock().unwrap();
    if caller(&state, &headers).is_none() {
        return unauthorized();
    }
    if state.cars.is_empty() {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"error": "No cars available"})),
        )
            .into_response();
    }
    let total: f64 = state.cars.values().map(price_of).sum();
    Json(json!({"average_price": total / state.cars.len() as f64})).into_response()
}

async fn expensive_cars(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    let state = state.lock().unwrap();
    if caller(&state, &headers).is_none() {
        return unauthorized();
    }
    let mut cars: Vec<&InventoryItem> = state
        .cars
        .values()
        .filter(|car| price_of(car) > PREMIUM_PRICE_THRESHOLD)
        .collect();
    cars.sort_by(|a, b| price_of(b).total_cmp(&price_of(a)));
    let rows: Vec<serde_json::Value> = cars.into_iter().map(report_row).collect();
    Json(json!({"expensive_cars": rows})).into_response()
}

async fn low_stock_cars(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    let state = state.lock().unwrap();
    match caller(&state, &headers) {
        None => return unauthorized(),
        Some(user) if matches!(user.role, Some("admin") | Some("staff")) => {}
        Some(_) => return forbidden(),
    }
    let mut cars: Vec<&InventoryItem> = state
        .cars
        .values()
        .filter(|car| car.stock < LOW_STOCK_THRESHOLD)
        .collect();
    cars.sort_by_key(|car| car.stock);
    let rows: Vec<serde_json::Value> = cars.into_iter().map(report_row).collect();
    Json(json!({"low_stock_cars": rows})).into_response()
}
