//! # Partition Manager
//!
//! Splits a table's order into numbered sub-bills.
//!
//! ```text
//! Open(n) ──confirm (≥1 line)──► Confirmed(n)     and a fresh Open(n + 1)
//! Open(n) ──confirm (0 lines)──► Open(n)          (no-op)
//! ```
//!
//! Exactly one partition is open at any time. Confirmed partitions are kept
//! in confirmation order and never change again.

use serde::Serialize;
use tracing::info;

use crate::types::{CartLine, Partition};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PartitionManager {
    confirmed: Vec<Partition>,
    current: Partition,
}

impl Default for PartitionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl PartitionManager {
    pub fn new() -> Self {
        Self {
            confirmed: Vec::new(),
            current: Partition::open(1),
        }
    }

    /// The open partition.
    pub fn current(&self) -> &Partition {
        &self.current
    }

    /// Confirmed partitions in confirmation order.
    pub fn confirmed(&self) -> &[Partition] {
        &self.confirmed
    }

    /// Make the open partition mirror `lines` (normally the live cart).
    pub fn mirror(&mut self, lines: &[CartLine]) {
        self.current.set_lines(lines.to_vec());
    }

    /// Freeze the open partition and start the next one.
    ///
    /// Returns the frozen partition, or `None` (leaving every field
    /// untouched) when the open partition has no lines.
    pub fn confirm(&mut self) -> Option<Partition> {
        if self.current.is_empty() {
            return None;
        }

        let next = Partition::open(self.current.partition_no() + 1);
        let frozen = std::mem::replace(&mut self.current, next).into_confirmed();

        info!(
            partition_no = frozen.partition_no(),
            lines = frozen.lines().len(),
            subtotal = frozen.subtotal(),
            "partition confirmed"
        );

        self.confirmed.push(frozen.clone());
        Some(frozen)
    }

    /// Σ subtotal over the confirmed partitions and the open one.
    pub fn grand_subtotal(&self) -> u64 {
        self.confirmed
            .iter()
            .chain(std::iter::once(&self.current))
            .map(Partition::subtotal)
            .sum()
    }

    /// The open partition when it has at least one line.
    pub fn open_for_billing(&self) -> Option<&Partition> {
        Some(&self.current).filter(|p| !p.is_empty())
    }

    /// Drop every partition and start again at #1.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}
