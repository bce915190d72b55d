//! # Kitchen Board
//!
//! Tracks orders sent to the kitchen through a forward-only lifecycle:
//!
//! ```text
//! Pending ──► Cooking ──► Ready ──► Served
//! ```
//!
//! Each call moves an order by exactly one step. Entering `Cooking` sets a
//! countdown estimate which [`KitchenBoard::tick`] lowers by one minute per
//! call until it reaches zero. Elapsed time and the high-priority flag are
//! derived from the creation timestamp for display and never drive status.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::types::{KitchenItem, KitchenOrder, KitchenStatus, Partition, TableInfo};
use crate::{Error, Result};

/// Estimate (minutes) assigned when an order starts cooking.
pub const DEFAULT_COOKING_ESTIMATE_MINS: u32 = 15;

/// Orders older than this (minutes) and not yet served are flagged.
pub const DEFAULT_PRIORITY_AFTER_MINS: i64 = 20;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KitchenPolicy {
    pub cooking_estimate_mins: u32,
    pub priority_after_mins: i64,
}

impl Default for KitchenPolicy {
    fn default() -> Self {
        Self {
            cooking_estimate_mins: DEFAULT_COOKING_ESTIMATE_MINS,
            priority_after_mins: DEFAULT_PRIORITY_AFTER_MINS,
        }
    }
}

/// Number of orders in each status.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub pending: usize,
    pub cooking: usize,
    pub ready: usize,
    pub served: usize,
}

impl StatusCounts {
    /// Orders still being worked on (pending + cooking).
    pub fn active(&self) -> usize {
        self.pending + self.cooking
    }
}

/// Whole minutes between `created_at` and `now`, never negative.
pub fn elapsed_minutes(order: &KitchenOrder, now: DateTime<Utc>) -> i64 {
    (now - order.created_at).num_minutes().max(0)
}

#[derive(Clone, Debug, Default)]
pub struct KitchenBoard {
    orders: Vec<KitchenOrder>,
    policy: KitchenPolicy,
}

impl KitchenBoard {
    pub fn new(policy: KitchenPolicy) -> Self {
        Self {
            orders: Vec::new(),
            policy,
        }
    }

    pub fn policy(&self) -> KitchenPolicy {
        self.policy
    }

    pub fn get(&self, order_id: &str) -> Option<&KitchenOrder> {
        self.orders.iter().find(|o| o.order_id == order_id)
    }

    /// Orders in insertion order, optionally restricted to one status.
    pub fn orders(&self, status: Option<KitchenStatus>) -> Vec<&KitchenOrder> {
        self.orders
            .iter()
            .filter(|o| status.map_or(true, |s| o.status == s))
            .collect()
    }

    pub fn status_counts(&self) -> StatusCounts {
        self.orders
            .iter()
            .fold(StatusCounts::default(), |mut counts, order| {
                match order.status {
                    KitchenStatus::Pending => counts.pending += 1,
                    KitchenStatus::Cooking => counts.cooking += 1,
                    KitchenStatus::Ready => counts.ready += 1,
                    KitchenStatus::Served => counts.served += 1,
                }
                counts
            })
    }

    pub fn is_high_priority(&self, order: &KitchenOrder, now: DateTime<Utc>) -> bool {
        order.status != KitchenStatus::Served
            && elapsed_minutes(order, now) > self.policy.priority_after_mins
    }

    /// Add an order as-is. Used for seeding.
    pub fn insert(&mut self, order: KitchenOrder) {
        self.orders.push(order);
    }

    /// Send a confirmed partition to the kitchen as a new pending order.
    ///
    /// Order ids are unique on the board; an id already in use is rejected
    /// with [`Error::DuplicateOrderId`] and the board is left unchanged.
    pub fn enqueue_partition(
        &mut self,
        order_id: String,
        table: &TableInfo,
        partition: &Partition,
        now: DateTime<Utc>,
    ) -> Result<&KitchenOrder> {
        if self.get(&order_id).is_some() {
            return Err(Error::DuplicateOrderId(order_id));
        }

        let items = partition
            .lines()
            .iter()
            .map(|line| KitchenItem {
                item_id: line.item_id.clone(),
                name: line.name.clone(),
                quantity: line.quantity,
                notes: None,
            })
            .collect();

        info!(
            %order_id,
            table_id = %table.table_id,
            partition_no = partition.partition_no(),
            "kitchen order received"
        );

        self.orders.push(KitchenOrder {
            order_id,
            table_id: table.table_id.clone(),
            table_name: table.table_name.clone(),
            partition_no: partition.partition_no(),
            items,
            status: KitchenStatus::Pending,
            created_at: now,
            estimated_minutes: None,
        });
        Ok(&self.orders[self.orders.len() - 1])
    }

    /// Move `order_id` one step along its lifecycle.
    pub fn advance(&mut self, order_id: &str) -> Result<&KitchenOrder> {
        let current = self
            .get(order_id)
            .ok_or_else(|| Error::OrderNotFound(order_id.to_string()))?
            .status;
        let next = current
            .next()
            .ok_or_else(|| Error::AlreadyServed(order_id.to_string()))?;
        self.set_status(order_id, next)
    }

    /// Move `order_id` to `target`, which must be the immediate successor of
    /// its current status.
    pub fn set_status(&mut self, order_id: &str, target: KitchenStatus) -> Result<&KitchenOrder> {
        let estimate = self.policy.cooking_estimate_mins;
        let order = self
            .orders
            .iter_mut()
            .find(|o| o.order_id == order_id)
            .ok_or_else(|| Error::OrderNotFound(order_id.to_string()))?;

        if order.status.next() != Some(target) {
            return Err(Error::InvalidTransition {
                order_id: order_id.to_string(),
                from: order.status,
                to: target,
            });
        }

        order.status = target;
        order.estimated_minutes = (target == KitchenStatus::Cooking).then_some(estimate);

        info!(order_id, status = %target, "kitchen order advanced");
        Ok(&*order)
    }

    /// Lower the estimate of every cooking order by one minute, stopping at
    /// zero. Returns how many orders changed.
    pub fn tick(&mut self) -> usize {
        let mut changed = 0;
        for order in &mut self.orders {
            if order.status != KitchenStatus::Cooking {
                continue;
            }
            if let Some(remaining) = order.estimated_minutes.as_mut().filter(|m| **m > 0) {
                *remaining -= 1;
                changed += 1;
            }
        }
        debug!(changed, "kitchen tick");
        changed
    }

    /// Seed the four demo orders, aged relative to `now`.
    pub fn seed_demo(&mut self, now: DateTime<Utc>) {
        let item = |id: &str, name: &str, quantity: u32| KitchenItem {
            item_id: id.to_string(),
            name: name.to_string(),
            quantity,
            notes: None,
        };
        let order = |order_id: &str,
                     table_no: u32,
                     partition_no: u32,
                     items: Vec<KitchenItem>,
                     status: KitchenStatus,
                     age_mins: i64,
                     estimated_minutes: Option<u32>| KitchenOrder {
            order_id: order_id.to_string(),
            table_id: format!("T{table_no:02}"),
            table_name: format!("Table {table_no}"),
            partition_no,
            items,
            status,
            created_at: now - Duration::minutes(age_mins),
            estimated_minutes,
        };

        self.orders.extend([
            order(
                "O001234",
                3,
                1,
                vec![item("I101", "Grilled Chicken", 2), item("I201", "Chicken Kebab", 1)],
                KitchenStatus::Pending,
                5,
                None,
            ),
            order(
                "O001235",
                5,
                1,
                vec![item("I102", "Mutton Curry", 1), item("I103", "Fish Fry", 2)],
                KitchenStatus::Cooking,
                15,
                Some(10),
            ),
            order(
                "O001236",
                2,
                2,
                vec![item("I202", "Paneer Tikka", 3), item("I301", "Mango Lassi", 2)],
                KitchenStatus::Ready,
                25,
                None,
            ),
            order(
                "O001237",
                1,
                1,
                vec![item("I302", "Fresh Lime Soda", 4)],
                KitchenStatus::Served,
                35,
                None,
            ),
        ]);
    }
}
