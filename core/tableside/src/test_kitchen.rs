use chrono::{Duration, TimeZone, Utc};

use crate::invariants::assert_valid_kitchen_transition;
use crate::{
    elapsed_minutes, Catalog, Error, KitchenBoard, KitchenPolicy, KitchenStatus, StaticCatalog,
    TableInfo, TableSession,
};

fn now() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
}

fn seeded() -> KitchenBoard {
    let mut board = KitchenBoard::new(KitchenPolicy::default());
    board.seed_demo(now());
    board
}

#[test]
fn test_demo_seed() {
    let board = seeded();
    let counts = board.status_counts();
    assert_eq!((counts.pending, counts.cooking, counts.ready, counts.served), (1, 1, 1, 1));
    assert_eq!(counts.active(), 2);

    let cooking = board.get("O001235").unwrap();
    assert_eq!(cooking.status, KitchenStatus::Cooking);
    assert_eq!(cooking.estimated_minutes, Some(10));
    assert_eq!(cooking.table_id, "T05");
    assert_eq!(elapsed_minutes(cooking, now()), 15);
}

#[test]
fn test_advance_walks_the_full_chain() {
    let mut board = seeded();
    let mut previous = board.get("O001234").unwrap().status;

    for expected in [KitchenStatus::Cooking, KitchenStatus::Ready, KitchenStatus::Served] {
        let order = board.advance("O001234").unwrap();
        assert_valid_kitchen_transition(previous, order.status);
        assert_eq!(order.status, expected);
        previous = order.status;
    }

    assert_eq!(
        board.advance("O001234").unwrap_err(),
        Error::AlreadyServed("O001234".to_string())
    );
}

#[test]
fn test_skipping_or_reversing_is_rejected() {
    let mut board = seeded();

    let err = board.set_status("O001234", KitchenStatus::Ready).unwrap_err();
    assert!(matches!(
        err,
        Error::InvalidTransition {
            from: KitchenStatus::Pending,
            to: KitchenStatus::Ready,
            ..
        }
    ));

    assert!(board.set_status("O001236", KitchenStatus::Cooking).is_err());
    assert!(board.set_status("O001235", KitchenStatus::Cooking).is_err());
    assert!(board.set_status("O001237", KitchenStatus::Pending).is_err());

    // Rejected calls leave state untouched.
    assert_eq!(board.get("O001234").unwrap().status, KitchenStatus::Pending);
    assert_eq!(board.get("O001235").unwrap().estimated_minutes, Some(10));

    assert_eq!(
        board.advance("O404").unwrap_err(),
        Error::OrderNotFound("O404".to_string())
    );
}

#[test]
fn test_entering_cooking_sets_estimate_and_leaving_clears_it() {
    let mut board = seeded();

    let order = board.set_status("O001234", KitchenStatus::Cooking).unwrap();
    assert_eq!(order.estimated_minutes, Some(15));

    let order = board.advance("O001234").unwrap();
    assert_eq!(order.status, KitchenStatus::Ready);
    assert_eq!(order.estimated_minutes, None);
}

#[test]
fn test_tick_decrements_cooking_orders_to_zero() {
    let mut board = KitchenBoard::new(KitchenPolicy::default());
    board.seed_demo(now());
    board.advance("O001234").unwrap(); // now cooking at 15

    assert_eq!(board.tick(), 2);
    assert_eq!(board.get("O001234").unwrap().estimated_minutes, Some(14));
    assert_eq!(board.get("O001235").unwrap().estimated_minutes, Some(9));

    for _ in 0..20 {
        board.tick();
    }
    assert_eq!(board.get("O001234").unwrap().estimated_minutes, Some(0));
    assert_eq!(board.get("O001235").unwrap().estimated_minutes, Some(0));
    assert_eq!(board.tick(), 0);

    // Orders outside cooking are never touched.
    assert_eq!(board.get("O001236").unwrap().estimated_minutes, None);
}

#[test]
fn test_custom_cooking_estimate() {
    let mut board = KitchenBoard::new(KitchenPolicy {
        cooking_estimate_mins: 2,
        priority_after_mins: 20,
    });
    board.seed_demo(now());

    board.advance("O001234").unwrap();
    board.tick();
    board.tick();
    board.tick();
    assert_eq!(board.get("O001234").unwrap().estimated_minutes, Some(0));
}

#[test]
fn test_high_priority_flag() {
    let board = seeded();
    let flagged: Vec<&str> = board
        .orders(None)
        .into_iter()
        .filter(|o| board.is_high_priority(o, now()))
        .map(|o| o.order_id.as_str())
        .collect();

    // 25 minutes old and ready: flagged. 35 minutes old but served: never.
    assert_eq!(flagged, vec!["O001236"]);

    let later = now() + Duration::minutes(10);
    let pending = board.get("O001234").unwrap();
    assert_eq!(elapsed_minutes(pending, later), 15);
    assert!(!board.is_high_priority(pending, later));
    assert!(board.is_high_priority(pending, now() + Duration::minutes(16)));
    assert!(!board.is_high_priority(board.get("O001237").unwrap(), later));
}

#[test]
fn test_filter_by_status() {
    let mut board = seeded();
    board.advance("O001234").unwrap();

    let cooking: Vec<&str> = board
        .orders(Some(KitchenStatus::Cooking))
        .iter()
        .map(|o| o.order_id.as_str())
        .collect();
    assert_eq!(cooking, vec!["O001234", "O001235"]);
    assert!(board.orders(Some(KitchenStatus::Pending)).is_empty());
    assert_eq!(board.orders(None).len(), 4);
}

#[test]
fn test_confirmed_partition_becomes_pending_order() {
    let catalog = StaticCatalog::demo();
    let table = TableInfo::from_scan("T07", None).unwrap();
    let mut session = TableSession::new(table.clone());
    session.add_item(catalog.get("I201").unwrap(), 2);
    session.add_item(catalog.get("I301").unwrap(), 1);
    let partition = session.confirm_partition().unwrap();

    let mut board = KitchenBoard::default();
    let order = board
        .enqueue_partition("O000100".to_string(), &table, &partition, now())
        .unwrap();

    assert_eq!(order.status, KitchenStatus::Pending);
    assert_eq!(order.table_name, "Table 7");
    assert_eq!(order.partition_no, 1);
    assert_eq!(order.items.len(), 2);
    assert_eq!(order.items[0].name, "Chicken Kebab");
    assert_eq!(order.items[0].quantity, 2);
    assert_eq!(order.estimated_minutes, None);
    assert_eq!(board.status_counts().pending, 1);
}

#[test]
fn test_enqueue_rejects_an_id_already_on_the_board() {
    let catalog = StaticCatalog::demo();
    let table = TableInfo::from_scan("T07", None).unwrap();
    let mut session = TableSession::new(table.clone());
    session.add_item(catalog.get("I102").unwrap(), 1);
    let partition = session.confirm_partition().unwrap();

    let mut board = seeded();
    let err = board
        .enqueue_partition("O001234".to_string(), &table, &partition, now())
        .unwrap_err();
    assert_eq!(err, Error::DuplicateOrderId("O001234".to_string()));
    assert_eq!(board.orders(None).len(), 4);

    let seeded_order = board.advance("O001234").unwrap();
    assert_eq!(seeded_order.table_id, "T03");
    assert!(board
        .orders(None)
        .iter()
        .all(|o| o.table_id != "T07"));
}
