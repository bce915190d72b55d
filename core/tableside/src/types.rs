//! # Types
//!
//! Shared data structures used across all modules of the ordering core.
//!
//! ## Design decisions
//!
//! ### Lines carry a price snapshot
//!
//! A [`CartLine`] stores the entry id together with the name and unit price
//! read from the catalog when the line was created. Partitions and bills are
//! therefore computed from their own lines without a catalog lookup.
//!
//! ### Subtotals are derived
//!
//! [`Partition`] keeps its fields private. The only way to change its lines
//! is through methods that recompute the subtotal in the same call, so a
//! partition can never carry a subtotal that disagrees with its lines.
//!
//! ### Kitchen status as a Finite-State Machine
//!
//! [`KitchenStatus`] enforces a strict forward-only lifecycle:
//!
//! ```text
//! Pending ──► Cooking ──► Ready ──► Served
//! ```
//!
//! Skipping a step, moving backwards, and leaving `Served` are rejected by
//! the kitchen board.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Catalog ──────────────────────────────────────────────────────────

/// A single orderable item on the menu.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuEntry {
    /// Unique identifier (e.g. `I101`).
    pub id: String,
    pub name: String,
    pub description: String,
    /// Unit price in whole rupees.
    pub price: u64,
    /// One of the catalog's category labels.
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<ItemDetails>,
}

/// Extended display metadata shown on the item page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDetails {
    pub nutrition: NutritionalInfo,
    pub preparation_time: String,
    pub serving_size: String,
    /// 0 (none) to 3 (very hot).
    pub spice_level: u8,
    pub is_vegetarian: bool,
    pub allergens: Vec<String>,
    pub customizations: Vec<Customization>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NutritionalInfo {
    pub calories: u32,
    pub protein: String,
    pub carbs: String,
    pub fat: String,
}

/// A named group of options, e.g. "Spice Level" or "Add-ons".
///
/// Option prices are informational only and never enter the cart total.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customization {
    pub name: String,
    pub options: Vec<CustomizationOption>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomizationOption {
    pub name: String,
    pub price: u64,
}

// ── Table ────────────────────────────────────────────────────────────

/// The table a session belongs to, as read from its QR code.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableInfo {
    pub table_id: String,
    pub table_name: String,
}

impl TableInfo {
    /// Build table info from a scanned or typed id.
    ///
    /// Returns `None` when the id is blank. Without an explicit name, ids of
    /// the form `T03` are displayed as `Table 3`; anything else is shown as-is.
    pub fn from_scan(table_id: &str, table_name: Option<&str>) -> Option<Self> {
        let table_id = table_id.trim();
        if table_id.is_empty() {
            return None;
        }

        let table_name = match table_name.map(str::trim).filter(|n| !n.is_empty()) {
            Some(name) => name.to_string(),
            None => default_table_name(table_id),
        };

        Some(Self {
            table_id: table_id.to_string(),
            table_name,
        })
    }
}

fn default_table_name(table_id: &str) -> String {
    let number = table_id
        .strip_prefix(|c: char| c.eq_ignore_ascii_case(&'t'))
        .and_then(|digits| digits.parse::<u32>().ok());
    match number {
        Some(n) => format!("Table {n}"),
        None => table_id.to_string(),
    }
}

// ── Cart ─────────────────────────────────────────────────────────────

/// One distinct menu entry in a cart or partition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub item_id: String,
    pub name: String,
    /// Unit price captured when the line was created.
    pub price: u64,
    /// Always ≥ 1 for a stored line.
    pub quantity: u32,
}

impl CartLine {
    pub fn from_entry(entry: &MenuEntry, quantity: u32) -> Self {
        Self {
            item_id: entry.id.clone(),
            name: entry.name.clone(),
            price: entry.price,
            quantity,
        }
    }

    /// `price × quantity` for this line.
    pub fn line_total(&self) -> u64 {
        self.price * u64::from(self.quantity)
    }
}

/// Σ(price × quantity) over `lines`.
pub fn lines_total(lines: &[CartLine]) -> u64 {
    lines.iter().map(CartLine::line_total).sum()
}

// ── Partitions ───────────────────────────────────────────────────────

/// Lifecycle status of a partition. `Confirmed` is terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartitionStatus {
    /// Editable; mirrors the live cart.
    Open,
    /// Frozen snapshot sent to the kitchen.
    Confirmed,
}

/// One "send to kitchen" batch of cart lines.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Partition {
    partition_no: u32,
    status: PartitionStatus,
    lines: Vec<CartLine>,
    subtotal: u64,
}

impl Partition {
    /// A new, empty open partition.
    pub fn open(partition_no: u32) -> Self {
        Self {
            partition_no,
            status: PartitionStatus::Open,
            lines: Vec::new(),
            subtotal: 0,
        }
    }

    pub fn partition_no(&self) -> u32 {
        self.partition_no
    }

    pub fn status(&self) -> PartitionStatus {
        self.status
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn subtotal(&self) -> u64 {
        self.subtotal
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn is_open(&self) -> bool {
        self.status == PartitionStatus::Open
    }

    /// Replace the lines of an open partition. Confirmed partitions are
    /// left untouched.
    pub(crate) fn set_lines(&mut self, lines: Vec<CartLine>) {
        if !self.is_open() {
            return;
        }
        self.subtotal = lines_total(&lines);
        self.lines = lines;
    }

    /// Consume an open partition and return its frozen form.
    pub(crate) fn into_confirmed(mut self) -> Self {
        self.status = PartitionStatus::Confirmed;
        self.subtotal = lines_total(&self.lines);
        self
    }
}

// ── Bill ─────────────────────────────────────────────────────────────

/// Aggregate of all partitions for a table. Always recomputed, never stored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Bill {
    pub table: TableInfo,
    pub partitions: Vec<Partition>,
    pub grand_subtotal: u64,
    pub tax: u64,
    pub final_total: u64,
}

impl Bill {
    pub fn is_empty(&self) -> bool {
        self.partitions.is_empty()
    }
}

// ── Kitchen ──────────────────────────────────────────────────────────

/// Status of an order on the kitchen board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KitchenStatus {
    Pending,
    Cooking,
    Ready,
    /// Terminal.
    Served,
}

impl KitchenStatus {
    /// The only status this one may move to, or `None` for `Served`.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Pending => Some(Self::Cooking),
            Self::Cooking => Some(Self::Ready),
            Self::Ready => Some(Self::Served),
            Self::Served => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Cooking => "cooking",
            Self::Ready => "ready",
            Self::Served => "served",
        }
    }

    /// Parse a lowercase status name as used in query strings.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "cooking" => Some(Self::Cooking),
            "ready" => Some(Self::Ready),
            "served" => Some(Self::Served),
            _ => None,
        }
    }
}

impl fmt::Display for KitchenStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KitchenItem {
    pub item_id: String,
    pub name: String,
    pub quantity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// An order as the kitchen sees it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KitchenOrder {
    pub order_id: String,
    pub table_id: String,
    pub table_name: String,
    pub partition_no: u32,
    pub items: Vec<KitchenItem>,
    pub status: KitchenStatus,
    pub created_at: DateTime<Utc>,
    /// Minutes until ready; only set while cooking.
    pub estimated_minutes: Option<u32>,
}
