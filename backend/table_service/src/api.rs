//! Axum REST API handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tableside::{
    elapsed_minutes, Bill, CartSnapshot, Catalog, KitchenOrder, KitchenStatus, MenuEntry,
    Partition, PaymentMethod, PaymentReceipt, PaymentState, Review, StatusCounts, TableInfo,
    MAX_RATING,
};

use crate::errors::{Result, ServiceError};
use crate::payments;
use crate::state::AppState;

// ─────────────────────────────────────────────────────────
// Request shapes
// ─────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct MenuQuery {
    pub category: Option<String>,
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddReviewRequest {
    pub author: Option<String>,
    #[serde(default = "max_rating")]
    pub rating: u8,
    pub comment: String,
}

fn max_rating() -> u8 {
    MAX_RATING
}

#[derive(Debug, Deserialize)]
pub struct LikeReviewRequest {
    /// Who is liking; usually the table id.
    pub liker: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct OpenTableRequest {
    pub table_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub item_id: String,
    #[serde(default = "one")]
    pub quantity: u32,
}

fn one() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
pub struct UpdateQuantityRequest {
    pub quantity: i64,
}

#[derive(Debug, Default, Deserialize)]
pub struct PaymentRequest {
    #[serde(default)]
    pub method: PaymentMethod,
}

#[derive(Debug, Default, Deserialize)]
pub struct KitchenQuery {
    pub status: Option<String>,
}

// ─────────────────────────────────────────────────────────
// Response shapes
// ─────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Serialize)]
pub struct MenuResponse {
    pub count: usize,
    pub items: Vec<MenuEntry>,
}

#[derive(Serialize)]
pub struct CategoriesResponse {
    pub categories: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ReviewsResponse {
    pub item_id: String,
    pub count: usize,
    pub average_rating: Option<f32>,
    pub reviews: Vec<Review>,
}

#[derive(Debug, Serialize)]
pub struct TableResponse {
    pub table: TableInfo,
    pub cart: CartSnapshot,
}

#[derive(Debug, Serialize)]
pub struct PartitionsResponse {
    pub current: Partition,
    pub confirmed: Vec<Partition>,
    pub grand_subtotal: u64,
}

#[derive(Debug, Serialize)]
pub struct ConfirmResponse {
    /// `None` when the open partition was empty and nothing changed.
    pub confirmed: Option<Partition>,
    pub kitchen_order: Option<KitchenOrder>,
    pub current: Partition,
}

#[derive(Debug, Serialize)]
pub struct PaymentStatusResponse {
    pub payment: PaymentState,
    pub last_receipt: Option<PaymentReceipt>,
}

#[derive(Debug, Serialize)]
pub struct KitchenOrderView {
    #[serde(flatten)]
    pub order: KitchenOrder,
    pub elapsed_minutes: i64,
    pub high_priority: bool,
}

#[derive(Debug, Serialize)]
pub struct KitchenOrdersResponse {
    pub count: usize,
    pub orders: Vec<KitchenOrderView>,
}

#[derive(Debug, Serialize)]
pub struct KitchenSummaryResponse {
    #[serde(flatten)]
    pub counts: StatusCounts,
    pub active: usize,
}

// ─────────────────────────────────────────────────────────
// Handlers: menu
// ─────────────────────────────────────────────────────────

/// `GET /health`
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// `GET /menu?category=&q=`
pub async fn list_menu(
    State(state): State<Arc<AppState>>,
    Query(query): Query<MenuQuery>,
) -> Json<MenuResponse> {
    let items: Vec<MenuEntry> = state
        .catalog
        .search(query.category.as_deref(), query.q.as_deref().unwrap_or(""))
        .into_iter()
        .cloned()
        .collect();
    Json(MenuResponse {
        count: items.len(),
        items,
    })
}

/// `GET /menu/categories`
pub async fn list_categories(State(state): State<Arc<AppState>>) -> Json<CategoriesResponse> {
    Json(CategoriesResponse {
        categories: state.catalog.categories().to_vec(),
    })
}

/// `GET /menu/:id`
pub async fn get_menu_item(
    State(state): State<Arc<AppState>>,
    Path(item_id): Path<String>,
) -> Result<Json<MenuEntry>> {
    state
        .catalog
        .get(&item_id)
        .cloned()
        .map(Json)
        .ok_or_else(|| tableside::Error::UnknownItem(item_id).into())
}

/// `GET /menu/:id/reviews`
pub async fn list_reviews(
    State(state): State<Arc<AppState>>,
    Path(item_id): Path<String>,
) -> Result<Json<ReviewsResponse>> {
    let reviews = state.reviews.lock().await;
    Ok(Json(ReviewsResponse {
        count: reviews.reviews(&item_id)?.len(),
        average_rating: reviews.average_rating(&item_id)?,
        reviews: reviews.reviews(&item_id)?.to_vec(),
        item_id,
    }))
}

/// `POST /menu/:id/reviews`
///
/// Blank comments are ignored; the response is the item's review list
/// either way.
pub async fn add_review(
    State(state): State<Arc<AppState>>,
    Path(item_id): Path<String>,
    Json(request): Json<AddReviewRequest>,
) -> Result<Json<ReviewsResponse>> {
    state.reviews.lock().await.add_review(
        &item_id,
        request.author.as_deref(),
        request.rating,
        &request.comment,
        Utc::now(),
    )?;
    list_reviews(State(state), Path(item_id)).await
}

/// `POST /menu/:id/reviews/:review_id/like`
///
/// Toggles: a second like from the same liker takes it back.
pub async fn like_review(
    State(state): State<Arc<AppState>>,
    Path((item_id, review_id)): Path<(String, u64)>,
    Json(request): Json<LikeReviewRequest>,
) -> Result<Json<Review>> {
    let mut reviews = state.reviews.lock().await;
    let review = reviews.toggle_like(&item_id, review_id, request.liker.trim())?;
    Ok(Json(review.clone()))
}

// ─────────────────────────────────────────────────────────
// Handlers: table session & cart
// ─────────────────────────────────────────────────────────

/// `POST /tables/:table_id`
///
/// Called after a QR scan or manual entry. Idempotent: an existing session
/// is returned unchanged.
pub async fn open_table(
    State(state): State<Arc<AppState>>,
    Path(table_id): Path<String>,
    body: Option<Json<OpenTableRequest>>,
) -> Result<Json<TableResponse>> {
    let request = body.map(|Json(b)| b).unwrap_or_default();
    let table = TableInfo::from_scan(&table_id, request.table_name.as_deref())
        .ok_or_else(|| ServiceError::BadRequest("table id must not be blank".to_string()))?;

    let entry = state.open_table(table).await;
    let session = entry.session.lock().await;
    Ok(Json(TableResponse {
        table: session.table().clone(),
        cart: session.cart().snapshot(),
    }))
}

/// `DELETE /tables/:table_id`
pub async fn close_table(
    State(state): State<Arc<AppState>>,
    Path(table_id): Path<String>,
) -> Result<StatusCode> {
    state.close_table(&table_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /tables/:table_id/cart`
pub async fn get_cart(
    State(state): State<Arc<AppState>>,
    Path(table_id): Path<String>,
) -> Result<Json<CartSnapshot>> {
    let entry = state.table(&table_id).await?;
    let snapshot = entry.session.lock().await.cart().snapshot();
    Ok(Json(snapshot))
}

/// `POST /tables/:table_id/cart/items`
pub async fn add_item(
    State(state): State<Arc<AppState>>,
    Path(table_id): Path<String>,
    Json(request): Json<AddItemRequest>,
) -> Result<Json<CartSnapshot>> {
    let entry = state.table(&table_id).await?;
    let item = state
        .catalog
        .get(&request.item_id)
        .ok_or_else(|| tableside::Error::UnknownItem(request.item_id.clone()))?;

    let mut session = entry.session.lock().await;
    entry.ensure_editable()?;
    session.add_item(item, request.quantity);
    Ok(Json(session.cart().snapshot()))
}

/// `PUT /tables/:table_id/cart/items/:item_id`
pub async fn update_item(
    State(state): State<Arc<AppState>>,
    Path((table_id, item_id)): Path<(String, String)>,
    Json(request): Json<UpdateQuantityRequest>,
) -> Result<Json<CartSnapshot>> {
    let entry = state.table(&table_id).await?;
    let mut session = entry.session.lock().await;
    entry.ensure_editable()?;
    session.update_quantity(&item_id, request.quantity);
    Ok(Json(session.cart().snapshot()))
}

/// `DELETE /tables/:table_id/cart/items/:item_id`
pub async fn remove_item(
    State(state): State<Arc<AppState>>,
    Path((table_id, item_id)): Path<(String, String)>,
) -> Result<Json<CartSnapshot>> {
    let entry = state.table(&table_id).await?;
    let mut session = entry.session.lock().await;
    entry.ensure_editable()?;
    session.remove_item(&item_id);
    Ok(Json(session.cart().snapshot()))
}

/// `DELETE /tables/:table_id/cart`
pub async fn clear_cart(
    State(state): State<Arc<AppState>>,
    Path(table_id): Path<String>,
) -> Result<Json<CartSnapshot>> {
    let entry = state.table(&table_id).await?;
    let mut session = entry.session.lock().await;
    entry.ensure_editable()?;
    session.clear_cart();
    Ok(Json(session.cart().snapshot()))
}

// ─────────────────────────────────────────────────────────
// Handlers: partitions & bill
// ─────────────────────────────────────────────────────────

/// `GET /tables/:table_id/partitions`
pub async fn get_partitions(
    State(state): State<Arc<AppState>>,
    Path(table_id): Path<String>,
) -> Result<Json<PartitionsResponse>> {
    let entry = state.table(&table_id).await?;
    let session = entry.session.lock().await;
    let partitions = session.partitions();
    Ok(Json(PartitionsResponse {
        current: partitions.current().clone(),
        confirmed: partitions.confirmed().to_vec(),
        grand_subtotal: partitions.grand_subtotal(),
    }))
}

/// `POST /tables/:table_id/partitions/confirm`
///
/// Freezes the open partition and sends it to the kitchen board. An empty
/// partition is left as-is and reported with `confirmed: null`. Like every
/// cart change, refused while the table's payment is in flight or unsettled.
pub async fn confirm_partition(
    State(state): State<Arc<AppState>>,
    Path(table_id): Path<String>,
) -> Result<Json<ConfirmResponse>> {
    let entry = state.table(&table_id).await?;
    let mut session = entry.session.lock().await;
    entry.ensure_editable()?;

    let confirmed = session.confirm_partition();
    let kitchen_order = match &confirmed {
        Some(partition) => {
            let mut kitchen = state.kitchen.lock().await;
            let order_id = loop {
                let id = state.order_ids.next_id();
                if kitchen.get(&id).is_none() {
                    break id;
                }
            };
            let order =
                kitchen.enqueue_partition(order_id, session.table(), partition, Utc::now())?;
            Some(order.clone())
        }
        None => None,
    };

    Ok(Json(ConfirmResponse {
        confirmed,
        kitchen_order,
        current: session.partitions().current().clone(),
    }))
}

/// `GET /tables/:table_id/bill`
pub async fn get_bill(
    State(state): State<Arc<AppState>>,
    Path(table_id): Path<String>,
) -> Result<Json<Bill>> {
    let entry = state.table(&table_id).await?;
    let bill = entry.session.lock().await.bill(state.config.tax_policy());
    Ok(Json(bill))
}

// ─────────────────────────────────────────────────────────
// Handlers: payment
// ─────────────────────────────────────────────────────────

/// `POST /tables/:table_id/payment`
///
/// Accepts the payment and returns `202 Accepted` immediately; poll
/// `GET /tables/:table_id/payment` for the outcome.
pub async fn start_payment(
    State(state): State<Arc<AppState>>,
    Path(table_id): Path<String>,
    body: Option<Json<PaymentRequest>>,
) -> Result<(StatusCode, Json<PaymentStatusResponse>)> {
    let request = body.map(|Json(b)| b).unwrap_or_default();
    let entry = state.table(&table_id).await?;

    // Bill and accept under one session lock.
    let session = entry.session.lock().await;
    let bill = session.bill(state.config.tax_policy());
    let ticket = entry.payment.begin(&bill)?;
    drop(session);

    payments::spawn_payment(
        entry.clone(),
        ticket,
        bill,
        request.method,
        state.completions.clone(),
    );

    let last_receipt = entry.last_receipt.lock().await.clone();
    Ok((
        StatusCode::ACCEPTED,
        Json(PaymentStatusResponse {
            payment: entry.payment.state(),
            last_receipt,
        }),
    ))
}

/// `GET /tables/:table_id/payment`
pub async fn get_payment(
    State(state): State<Arc<AppState>>,
    Path(table_id): Path<String>,
) -> Result<Json<PaymentStatusResponse>> {
    let entry = state.table(&table_id).await?;
    let last_receipt = entry.last_receipt.lock().await.clone();
    Ok(Json(PaymentStatusResponse {
        payment: entry.payment.state(),
        last_receipt,
    }))
}

// ─────────────────────────────────────────────────────────
// Handlers: kitchen
// ─────────────────────────────────────────────────────────

/// `GET /kitchen/orders?status=`
pub async fn list_kitchen_orders(
    State(state): State<Arc<AppState>>,
    Query(query): Query<KitchenQuery>,
) -> Result<Json<KitchenOrdersResponse>> {
    let filter = match query.status.as_deref().map(str::trim) {
        None | Some("") | Some("all") => None,
        Some(raw) => Some(
            KitchenStatus::parse(raw)
                .ok_or_else(|| ServiceError::BadRequest(format!("unknown status: {raw}")))?,
        ),
    };

    let now = Utc::now();
    let kitchen = state.kitchen.lock().await;
    let orders: Vec<KitchenOrderView> = kitchen
        .orders(filter)
        .into_iter()
        .map(|order| KitchenOrderView {
            elapsed_minutes: elapsed_minutes(order, now),
            high_priority: kitchen.is_high_priority(order, now),
            order: order.clone(),
        })
        .collect();

    Ok(Json(KitchenOrdersResponse {
        count: orders.len(),
        orders,
    }))
}

/// `GET /kitchen/summary`
pub async fn kitchen_summary(State(state): State<Arc<AppState>>) -> Json<KitchenSummaryResponse> {
    let counts = state.kitchen.lock().await.status_counts();
    Json(KitchenSummaryResponse {
        active: counts.active(),
        counts,
    })
}

/// `POST /kitchen/orders/:order_id/advance`
pub async fn advance_kitchen_order(
    State(state): State<Arc<AppState>>,
    Path(order_id): Path<String>,
) -> Result<Json<KitchenOrder>> {
    let mut kitchen = state.kitchen.lock().await;
    let order = kitchen.advance(&order_id)?.clone();
    Ok(Json(order))
}
