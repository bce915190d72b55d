//! Per-table shopping cart with snapshot subscriptions.

use serde::Serialize;
use tokio::sync::watch;
use tracing::debug;

use crate::types::{lines_total, CartLine, MenuEntry};

/// A complete, self-consistent view of the cart at one instant.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CartSnapshot {
    pub lines: Vec<CartLine>,
    pub total_items: u64,
    pub total_price: u64,
}

/// Ordered collection of cart lines, at most one per menu entry.
///
/// Every mutation publishes one [`CartSnapshot`] to subscribers. Totals in a
/// snapshot are computed from the lines in that same snapshot.
#[derive(Debug)]
pub struct CartStore {
    lines: Vec<CartLine>,
    tx: watch::Sender<CartSnapshot>,
}

impl Default for CartStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CartStore {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(CartSnapshot::default());
        Self {
            lines: Vec::new(),
            tx,
        }
    }

    /// Receive a fresh snapshot after every mutation.
    pub fn subscribe(&self) -> watch::Receiver<CartSnapshot> {
        self.tx.subscribe()
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn snapshot(&self) -> CartSnapshot {
        CartSnapshot {
            lines: self.lines.clone(),
            total_items: self.total_items(),
            total_price: self.total_price(),
        }
    }

    /// Add one unit of `entry`.
    pub fn add_to_cart(&mut self, entry: &MenuEntry) {
        self.add_many(entry, 1);
    }

    /// Add `quantity` units of `entry` in a single step.
    ///
    /// An existing line grows by `quantity`; otherwise a new line is appended.
    /// Zero is a no-op.
    pub fn add_many(&mut self, entry: &MenuEntry, quantity: u32) {
        if quantity == 0 {
            return;
        }

        match self.lines.iter_mut().find(|line| line.item_id == entry.id) {
            Some(line) => line.quantity = line.quantity.saturating_add(quantity),
            None => self.lines.push(CartLine::from_entry(entry, quantity)),
        }

        debug!(item_id = %entry.id, quantity, "cart add");
        self.publish();
    }

    /// Set the quantity of an existing line. `quantity <= 0` removes it.
    ///
    /// Ids not in the cart are ignored.
    pub fn update_quantity(&mut self, item_id: &str, quantity: i64) {
        if quantity <= 0 {
            self.remove_from_cart(item_id);
            return;
        }

        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        let Some(line) = self.lines.iter_mut().find(|line| line.item_id == item_id) else {
            return;
        };
        if line.quantity == quantity {
            return;
        }
        line.quantity = quantity;

        debug!(item_id, quantity, "cart update");
        self.publish();
    }

    pub fn remove_from_cart(&mut self, item_id: &str) {
        let before = self.lines.len();
        self.lines.retain(|line| line.item_id != item_id);
        if self.lines.len() != before {
            debug!(item_id, "cart remove");
            self.publish();
        }
    }

    pub fn clear_cart(&mut self) {
        if self.lines.is_empty() {
            return;
        }
        self.lines.clear();
        debug!("cart cleared");
        self.publish();
    }

    /// Σ quantity over all lines.
    pub fn total_items(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }

    /// Σ(price × quantity) over all lines.
    pub fn total_price(&self) -> u64 {
        lines_total(&self.lines)
    }

    fn publish(&self) {
        self.tx.send_replace(self.snapshot());
    }
}
