//! Handler-level tests: each handler is called directly with its extractors,
//! against a fresh [`AppState`].

use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use tableside::{KitchenStatus, OrderIdGenerator, PaymentMethod, PaymentReceipt, PaymentState};
use tokio::sync::mpsc;

use crate::api::{
    self, AddItemRequest, AddReviewRequest, KitchenQuery, LikeReviewRequest, MenuQuery,
    PaymentRequest,
};
use crate::config::Config;
use crate::errors::ServiceError;
use crate::payments;
use crate::state::AppState;

fn fresh_state() -> (Arc<AppState>, mpsc::UnboundedReceiver<PaymentReceipt>) {
    let config = Config {
        seed_kitchen_demo: false,
        ..Config::default()
    };
    let (tx, rx) = mpsc::unbounded_channel();
    (Arc::new(AppState::new(config, tx)), rx)
}

async fn open(state: &Arc<AppState>, table_id: &str) {
    api::open_table(State(state.clone()), Path(table_id.to_string()), None)
        .await
        .unwrap();
}

async fn add(state: &Arc<AppState>, table_id: &str, item_id: &str, quantity: u32) {
    api::add_item(
        State(state.clone()),
        Path(table_id.to_string()),
        Json(AddItemRequest {
            item_id: item_id.to_string(),
            quantity,
        }),
    )
    .await
    .unwrap();
}

async fn confirm(state: &Arc<AppState>, table_id: &str) -> api::ConfirmResponse {
    api::confirm_partition(State(state.clone()), Path(table_id.to_string()))
        .await
        .unwrap()
        .0
}

// ── Menu ─────────────────────────────────────────────────

#[tokio::test]
async fn menu_filters_by_category_and_query() {
    let (state, _rx) = fresh_state();

    let all = api::list_menu(State(state.clone()), Query(MenuQuery::default())).await;
    assert_eq!(all.count, 7);

    let drinks = api::list_menu(
        State(state.clone()),
        Query(MenuQuery {
            category: Some("Drinks".to_string()),
            q: None,
        }),
    )
    .await;
    assert!(drinks.items.iter().all(|e| e.category == "Drinks"));
    assert_eq!(drinks.count, 2);

    let categories = api::list_categories(State(state.clone())).await;
    assert_eq!(categories.categories, ["Starters", "Main Course", "Drinks"]);
}

#[tokio::test]
async fn unknown_menu_item_is_404() {
    let (state, _rx) = fresh_state();
    let err = api::get_menu_item(State(state), Path("I999".to_string()))
        .await
        .unwrap_err();
    assert_eq!(err.status(), StatusCode::NOT_FOUND);
}

// ── Tables & cart ────────────────────────────────────────

#[tokio::test]
async fn open_table_derives_name_and_is_idempotent() {
    let (state, _rx) = fresh_state();

    let first = api::open_table(State(state.clone()), Path("T03".to_string()), None)
        .await
        .unwrap();
    assert_eq!(first.table.table_name, "Table 3");

    add(&state, "T03", "I101", 1).await;
    let again = api::open_table(State(state.clone()), Path("T03".to_string()), None)
        .await
        .unwrap();
    assert_eq!(again.cart.total_items, 1);
}

#[tokio::test]
async fn blank_table_id_is_rejected() {
    let (state, _rx) = fresh_state();
    let err = api::open_table(State(state), Path("   ".to_string()), None)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::BadRequest(_)));
}

#[tokio::test]
async fn cart_routes_require_an_open_table() {
    let (state, _rx) = fresh_state();
    let err = api::get_cart(State(state), Path("T09".to_string()))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::TableNotFound(_)));
    assert_eq!(err.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn adding_an_unknown_item_leaves_cart_untouched() {
    let (state, _rx) = fresh_state();
    open(&state, "T01").await;

    let err = api::add_item(
        State(state.clone()),
        Path("T01".to_string()),
        Json(AddItemRequest {
            item_id: "nope".to_string(),
            quantity: 1,
        }),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status(), StatusCode::NOT_FOUND);

    let cart = api::get_cart(State(state), Path("T01".to_string()))
        .await
        .unwrap();
    assert_eq!(cart.total_items, 0);
}

#[tokio::test]
async fn update_and_remove_items() {
    let (state, _rx) = fresh_state();
    open(&state, "T01").await;
    add(&state, "T01", "I101", 2).await;
    add(&state, "T01", "I301", 1).await;

    let cart = api::update_item(
        State(state.clone()),
        Path(("T01".to_string(), "I101".to_string())),
        Json(api::UpdateQuantityRequest { quantity: 4 }),
    )
    .await
    .unwrap();
    assert_eq!(cart.total_items, 5);
    assert_eq!(cart.total_price, 4 * 250 + 80);

    let cart = api::update_item(
        State(state.clone()),
        Path(("T01".to_string(), "I301".to_string())),
        Json(api::UpdateQuantityRequest { quantity: 0 }),
    )
    .await
    .unwrap();
    assert_eq!(cart.lines.len(), 1);

    let cart = api::remove_item(
        State(state.clone()),
        Path(("T01".to_string(), "I101".to_string())),
    )
    .await
    .unwrap();
    assert!(cart.lines.is_empty());
}

// ── Partitions, bill, kitchen ────────────────────────────

#[tokio::test]
async fn confirm_sends_partition_to_kitchen_and_bills_all_partitions() {
    let (state, _rx) = fresh_state();
    open(&state, "T02").await;

    add(&state, "T02", "I101", 1).await;
    add(&state, "T02", "I202", 1).await;
    let first = confirm(&state, "T02").await;
    let confirmed = first.confirmed.unwrap();
    assert_eq!(confirmed.partition_no(), 1);
    assert_eq!(confirmed.subtotal(), 370);
    assert_eq!(first.current.partition_no(), 2);

    let ticket = first.kitchen_order.unwrap();
    assert_eq!(ticket.status, KitchenStatus::Pending);
    assert_eq!(ticket.table_name, "Table 2");
    assert_eq!(ticket.items.len(), 2);

    add(&state, "T02", "I103", 1).await;
    confirm(&state, "T02").await;

    let bill = api::get_bill(State(state.clone()), Path("T02".to_string()))
        .await
        .unwrap();
    assert_eq!(bill.grand_subtotal, 570);
    assert_eq!(bill.tax, 103);
    assert_eq!(bill.final_total, 673);

    let summary = api::kitchen_summary(State(state.clone())).await;
    assert_eq!(summary.counts.pending, 2);
    assert_eq!(summary.active, 2);
}

#[tokio::test]
async fn confirming_an_empty_partition_changes_nothing() {
    let (state, _rx) = fresh_state();
    open(&state, "T02").await;

    let response = confirm(&state, "T02").await;
    assert!(response.confirmed.is_none());
    assert!(response.kitchen_order.is_none());
    assert_eq!(response.current.partition_no(), 1);

    let partitions = api::get_partitions(State(state), Path("T02".to_string()))
        .await
        .unwrap();
    assert!(partitions.confirmed.is_empty());
}

#[tokio::test]
async fn kitchen_orders_advance_and_filter() {
    let (state, _rx) = fresh_state();
    open(&state, "T04").await;
    add(&state, "T04", "I201", 2).await;
    let order_id = confirm(&state, "T04").await.kitchen_order.unwrap().order_id;

    let cooking = api::advance_kitchen_order(State(state.clone()), Path(order_id.clone()))
        .await
        .unwrap();
    assert_eq!(cooking.status, KitchenStatus::Cooking);
    assert_eq!(cooking.estimated_minutes, Some(15));

    let listed = api::list_kitchen_orders(
        State(state.clone()),
        Query(KitchenQuery {
            status: Some("cooking".to_string()),
        }),
    )
    .await
    .unwrap();
    assert_eq!(listed.count, 1);
    assert!(!listed.orders[0].high_priority);

    let err = api::list_kitchen_orders(
        State(state.clone()),
        Query(KitchenQuery {
            status: Some("burnt".to_string()),
        }),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);

    for _ in 0..2 {
        api::advance_kitchen_order(State(state.clone()), Path(order_id.clone()))
            .await
            .unwrap();
    }
    let err = api::advance_kitchen_order(State(state.clone()), Path(order_id))
        .await
        .unwrap_err();
    assert_eq!(err.status(), StatusCode::CONFLICT);

    let err = api::advance_kitchen_order(State(state), Path("O404".to_string()))
        .await
        .unwrap_err();
    assert_eq!(err.status(), StatusCode::NOT_FOUND);
}

// ── Payment ──────────────────────────────────────────────

#[tokio::test]
async fn paying_an_empty_bill_is_rejected() {
    let (state, _rx) = fresh_state();
    open(&state, "T05").await;

    let err = api::start_payment(State(state), Path("T05".to_string()), None)
        .await
        .unwrap_err();
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test(start_paused = true)]
async fn payment_settles_and_clears_the_table() {
    let (state, mut rx) = fresh_state();
    open(&state, "T06").await;
    add(&state, "T06", "I102", 1).await;
    confirm(&state, "T06").await;

    let (status, accepted) = api::start_payment(
        State(state.clone()),
        Path("T06".to_string()),
        Some(Json(PaymentRequest {
            method: PaymentMethod::Card,
        })),
    )
    .await
    .unwrap();
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(accepted.payment, PaymentState::Processing);

    let err = api::start_payment(State(state.clone()), Path("T06".to_string()), None)
        .await
        .unwrap_err();
    assert_eq!(err.status(), StatusCode::CONFLICT);

    tokio::time::sleep(Duration::from_millis(3_001)).await;
    let receipt = rx.recv().await.unwrap();
    assert_eq!(receipt.amount, 354);
    assert_eq!(receipt.method, PaymentMethod::Card);

    payments::settle(&state, receipt.clone()).await;

    let status = api::get_payment(State(state.clone()), Path("T06".to_string()))
        .await
        .unwrap();
    assert_eq!(status.payment, PaymentState::Idle);
    assert_eq!(status.last_receipt.as_ref(), Some(&receipt));

    let partitions = api::get_partitions(State(state.clone()), Path("T06".to_string()))
        .await
        .unwrap();
    assert!(partitions.confirmed.is_empty());
    assert_eq!(partitions.current.partition_no(), 1);
}

#[tokio::test(start_paused = true)]
async fn closing_a_table_cancels_its_payment() {
    let (state, mut rx) = fresh_state();
    open(&state, "T07").await;
    add(&state, "T07", "I301", 3).await;

    let entry = state.table("T07").await.unwrap();
    let mut watch = entry.payment.subscribe();

    api::start_payment(State(state.clone()), Path("T07".to_string()), None)
        .await
        .unwrap();
    assert_eq!(*watch.borrow_and_update(), PaymentState::Processing);

    let status = api::close_table(State(state.clone()), Path("T07".to_string()))
        .await
        .unwrap();
    assert_eq!(status, StatusCode::NO_CONTENT);

    watch.changed().await.unwrap();
    assert_eq!(*watch.borrow(), PaymentState::Idle);
    assert!(rx.try_recv().is_err());
    assert!(state.table("T07").await.is_err());
}

#[tokio::test]
async fn kitchen_view_flattens_the_order() {
    let (state, _rx) = fresh_state();
    open(&state, "T08").await;
    add(&state, "T08", "I302", 2).await;
    confirm(&state, "T08").await;

    let listed = api::list_kitchen_orders(State(state), Query(KitchenQuery::default()))
        .await
        .unwrap();
    let json = serde_json::to_value(&listed.orders[0]).unwrap();
    assert_eq!(json["status"], "pending");
    assert_eq!(json["table_name"], "Table 8");
    assert_eq!(json["elapsed_minutes"], 0);
    assert_eq!(json["high_priority"], false);
    assert_eq!(json["items"][0]["quantity"], 2);
}

#[tokio::test(start_paused = true)]
async fn cart_is_frozen_from_payment_until_settlement() {
    let (state, mut rx) = fresh_state();
    open(&state, "T10").await;
    add(&state, "T10", "I101", 1).await;
    confirm(&state, "T10").await;

    api::start_payment(State(state.clone()), Path("T10".to_string()), None)
        .await
        .unwrap();

    let add_during = api::add_item(
        State(state.clone()),
        Path("T10".to_string()),
        Json(AddItemRequest {
            item_id: "I102".to_string(),
            quantity: 2,
        }),
    )
    .await
    .unwrap_err();
    assert!(matches!(
        add_during,
        ServiceError::Ordering(tableside::Error::PaymentInProgress)
    ));
    assert_eq!(add_during.status(), StatusCode::CONFLICT);

    let confirm_during = api::confirm_partition(State(state.clone()), Path("T10".to_string()))
        .await
        .unwrap_err();
    assert_eq!(confirm_during.status(), StatusCode::CONFLICT);

    tokio::time::sleep(Duration::from_millis(3_001)).await;
    let receipt = rx.recv().await.unwrap();
    assert_eq!(receipt.amount, 295);

    let clear_unsettled = api::clear_cart(State(state.clone()), Path("T10".to_string()))
        .await
        .unwrap_err();
    assert!(matches!(
        clear_unsettled,
        ServiceError::Ordering(tableside::Error::AlreadyPaid)
    ));

    // Only what was billed reached the kitchen.
    assert_eq!(api::kitchen_summary(State(state.clone())).await.counts.pending, 1);

    payments::settle(&state, receipt).await;

    add(&state, "T10", "I102", 2).await;
    confirm(&state, "T10").await;
    let bill = api::get_bill(State(state.clone()), Path("T10".to_string()))
        .await
        .unwrap();
    assert_eq!(bill.grand_subtotal, 600);
    assert_eq!(bill.final_total, 708);
    assert_eq!(api::kitchen_summary(State(state)).await.counts.pending, 2);
}

#[tokio::test(start_paused = true)]
async fn receipt_is_recorded_before_the_payment_reads_idle() {
    let (state, mut rx) = fresh_state();
    open(&state, "T11").await;
    add(&state, "T11", "I301", 1).await;
    api::start_payment(State(state.clone()), Path("T11".to_string()), None)
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(3_001)).await;
    let receipt = rx.recv().await.unwrap();

    let entry = state.table("T11").await.unwrap();
    let held = entry.last_receipt.lock().await;
    let settling = {
        let state = state.clone();
        let receipt = receipt.clone();
        tokio::spawn(async move { payments::settle(&state, receipt).await })
    };
    for _ in 0..5 {
        tokio::task::yield_now().await;
    }
    assert!(matches!(entry.payment.state(), PaymentState::Succeeded { .. }));

    drop(held);
    settling.await.unwrap();
    assert_eq!(entry.payment.state(), PaymentState::Idle);
    assert_eq!(entry.last_receipt.lock().await.as_ref(), Some(&receipt));
}

#[tokio::test]
async fn generated_ids_skip_those_already_on_the_board() {
    let (tx, _rx) = mpsc::unbounded_channel();
    let mut app = AppState::new(Config::default(), tx);
    app.order_ids = Arc::new(OrderIdGenerator::starting_at("O", 1234));
    let state = Arc::new(app);

    open(&state, "T07").await;
    add(&state, "T07", "I102", 1).await;
    let order = confirm(&state, "T07").await.kitchen_order.unwrap();
    assert_eq!(order.order_id, "O001238");

    let advanced = api::advance_kitchen_order(State(state.clone()), Path(order.order_id))
        .await
        .unwrap();
    assert_eq!(advanced.table_id, "T07");
    assert_eq!(advanced.status, KitchenStatus::Cooking);

    let listed = api::list_kitchen_orders(
        State(state),
        Query(KitchenQuery {
            status: Some("pending".to_string()),
        }),
    )
    .await
    .unwrap();
    assert_eq!(listed.count, 1);
    assert_eq!(listed.orders[0].order.order_id, "O001234");
}

// ── Reviews ──────────────────────────────────────────────

#[tokio::test]
async fn reviews_can_be_posted_and_liked() {
    let (state, _rx) = fresh_state();

    let seeded = api::list_reviews(State(state.clone()), Path("I101".to_string()))
        .await
        .unwrap();
    assert_eq!(seeded.count, 3);
    assert_eq!(seeded.average_rating, Some(5.0));

    let unchanged = api::add_review(
        State(state.clone()),
        Path("I101".to_string()),
        Json(AddReviewRequest {
            author: None,
            rating: 2,
            comment: "   ".to_string(),
        }),
    )
    .await
    .unwrap();
    assert_eq!(unchanged.count, 3);

    let posted = api::add_review(
        State(state.clone()),
        Path("I101".to_string()),
        Json(AddReviewRequest {
            author: Some("Priya".to_string()),
            rating: 4,
            comment: "Smoky and juicy".to_string(),
        }),
    )
    .await
    .unwrap();
    assert_eq!(posted.count, 4);
    assert_eq!(posted.reviews[0].author, "Priya");
    assert_eq!(posted.reviews[0].comment, "Smoky and juicy");

    let target = posted.reviews[1].clone();
    let like = || {
        api::like_review(
            State(state.clone()),
            Path(("I101".to_string(), target.id)),
            Json(LikeReviewRequest {
                liker: "T01".to_string(),
            }),
        )
    };
    assert_eq!(like().await.unwrap().likes, target.likes + 1);
    assert_eq!(like().await.unwrap().likes, target.likes);

    let err = api::list_reviews(State(state.clone()), Path("I999".to_string()))
        .await
        .unwrap_err();
    assert_eq!(err.status(), StatusCode::NOT_FOUND);

    let err = api::like_review(
        State(state),
        Path(("I101".to_string(), 9_999)),
        Json(LikeReviewRequest {
            liker: "T01".to_string(),
        }),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status(), StatusCode::NOT_FOUND);
}
