//! One table's ordering state.
//!
//! [`TableSession`] owns the cart and the partitions for a single table and
//! is the only place both are mutated. Every cart change re-mirrors the open
//! partition before the method returns, so a caller holding `&TableSession`
//! never sees one updated without the other.

use tokio::sync::watch;
use tracing::info;

use crate::billing::{compute_bill, TaxPolicy};
use crate::cart::{CartSnapshot, CartStore};
use crate::partition::PartitionManager;
use crate::types::{Bill, MenuEntry, Partition, TableInfo};

#[derive(Debug)]
pub struct TableSession {
    table: TableInfo,
    cart: CartStore,
    partitions: PartitionManager,
}

impl TableSession {
    pub fn new(table: TableInfo) -> Self {
        Self {
            table,
            cart: CartStore::new(),
            partitions: PartitionManager::new(),
        }
    }

    pub fn table(&self) -> &TableInfo {
        &self.table
    }

    pub fn cart(&self) -> &CartStore {
        &self.cart
    }

    pub fn partitions(&self) -> &PartitionManager {
        &self.partitions
    }

    pub fn subscribe_cart(&self) -> watch::Receiver<CartSnapshot> {
        self.cart.subscribe()
    }

    pub fn add_item(&mut self, entry: &MenuEntry, quantity: u32) {
        self.cart.add_many(entry, quantity);
        self.sync();
    }

    pub fn update_quantity(&mut self, item_id: &str, quantity: i64) {
        self.cart.update_quantity(item_id, quantity);
        self.sync();
    }

    pub fn remove_item(&mut self, item_id: &str) {
        self.cart.remove_from_cart(item_id);
        self.sync();
    }

    pub fn clear_cart(&mut self) {
        self.cart.clear_cart();
        self.sync();
    }

    /// Confirm the open partition and empty the cart.
    ///
    /// Nothing changes when the open partition is empty.
    pub fn confirm_partition(&mut self) -> Option<Partition> {
        let frozen = self.partitions.confirm()?;
        self.cart.clear_cart();
        self.sync();
        Some(frozen)
    }

    /// Bill over confirmed partitions plus the open one if it has lines.
    pub fn bill(&self, tax: TaxPolicy) -> Bill {
        compute_bill(
            &self.table,
            self.partitions.confirmed(),
            self.partitions.open_for_billing(),
            tax,
        )
    }

    /// Start over after the bill has been paid.
    pub fn settle(&mut self) {
        info!(table_id = %self.table.table_id, "table settled");
        self.cart.clear_cart();
        self.partitions.reset();
    }

    fn sync(&mut self) {
        self.partitions.mirror(self.cart.lines());
    }
}
