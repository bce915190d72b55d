//! # Tableside Ordering Core
//!
//! In-memory domain core of a table-ordering app: guests browse a menu, fill
//! a cart, send it to the kitchen in numbered *partitions*, and pay the
//! combined bill. A kitchen board tracks every sent partition through its
//! preparation lifecycle.
//!
//! | Phase        | Entry Point(s)                                               |
//! |--------------|--------------------------------------------------------------|
//! | Browse       | [`Catalog`], [`StaticCatalog::search`]                       |
//! | Reviews      | [`ReviewBoard::add_review`], [`ReviewBoard::toggle_like`]    |
//! | Cart         | [`CartStore::add_to_cart`], `add_many`, `update_quantity`, … |
//! | Partitioning | [`PartitionManager::confirm`], [`TableSession::confirm_partition`] |
//! | Billing      | [`compute_bill`], [`TableSession::bill`]                     |
//! | Payment      | [`PaymentSimulator::pay`]                                    |
//! | Kitchen      | [`KitchenBoard::advance`], `tick`, `enqueue_partition`       |
//!
//! ## Architecture
//!
//! Every piece of state is an explicitly owned value. [`TableSession`] is the
//! container for one table and keeps the cart and the open partition in step.
//! Observers subscribe through `tokio::sync::watch` channels and always
//! receive complete snapshots. Time-driven behavior (payment latency) is
//! async and cancellable; the kitchen tick is a plain method so the owner
//! decides how to schedule it.

mod billing;
mod cart;
mod catalog;
mod kitchen;
mod partition;
mod payment;
mod reviews;
mod session;
mod types;

#[cfg(test)]
mod test_kitchen;

pub use billing::{compute_bill, TaxPolicy, DEFAULT_TAX_RATE_PERCENT};
pub use cart::{CartSnapshot, CartStore};
pub use catalog::{Catalog, StaticCatalog, ALL_CATEGORIES};
pub use kitchen::{
    elapsed_minutes, KitchenBoard, KitchenPolicy, StatusCounts, DEFAULT_COOKING_ESTIMATE_MINS,
    DEFAULT_PRIORITY_AFTER_MINS,
};
pub use partition::PartitionManager;
pub use payment::{
    ApproveAll, OrderIdGenerator, PaymentMethod, PaymentReceipt, PaymentSimulator, PaymentState,
    PaymentTicket, Settlement, DEFAULT_PAYMENT_DELAY,
};
pub use reviews::{Review, ReviewBoard, ANONYMOUS_AUTHOR, MAX_RATING, MIN_RATING};
pub use session::TableSession;
pub use types::{
    lines_total, Bill, CartLine, Customization, CustomizationOption, ItemDetails, KitchenItem,
    KitchenOrder, KitchenStatus, MenuEntry, NutritionalInfo, Partition, PartitionStatus,
    TableInfo,
};

use thiserror::Error;

/// Failures surfaced by the ordering core.
///
/// Non-positive quantities and confirming an empty partition are not
/// errors; both have defined no-op/removal semantics.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("unknown menu item: {0}")]
    UnknownItem(String),

    #[error("kitchen order not found: {0}")]
    OrderNotFound(String),

    #[error("invalid kitchen transition for {order_id}: {from} -> {to}")]
    InvalidTransition {
        order_id: String,
        from: KitchenStatus,
        to: KitchenStatus,
    },

    #[error("kitchen order id already in use: {0}")]
    DuplicateOrderId(String),

    #[error("kitchen order {0} has already been served")]
    AlreadyServed(String),

    #[error("review {review_id} not found for item {item_id}")]
    ReviewNotFound { item_id: String, review_id: u64 },

    #[error("bill has no partitions to pay for")]
    EmptyBill,

    #[error("a payment is already being processed")]
    PaymentInProgress,

    #[error("bill has already been paid")]
    AlreadyPaid,

    #[error("payment declined: {0}")]
    PaymentDeclined(String),

    #[error("payment cancelled before completion")]
    PaymentCancelled,
}

pub type Result<T> = std::result::Result<T, Error>;
