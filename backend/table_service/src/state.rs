//! Shared service state: the catalog and its reviews, open table sessions,
//! and the kitchen board.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tableside::{
    KitchenBoard, OrderIdGenerator, PaymentReceipt, PaymentSimulator, PaymentState, ReviewBoard,
    StaticCatalog, TableInfo, TableSession,
};
use tokio::sync::{mpsc, Mutex, RwLock};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::Config;
use crate::errors::{Result, ServiceError};

/// Everything that belongs to one table.
pub struct TableEntry {
    pub session: Mutex<TableSession>,
    pub payment: PaymentSimulator,
    /// Receipt of the most recent settled payment.
    pub last_receipt: Mutex<Option<PaymentReceipt>>,
    /// Cancelled when the table is closed; stops any in-flight payment.
    pub cancel: CancellationToken,
}

impl TableEntry {
    /// Cart and partition changes are refused from the moment a payment is
    /// accepted until it has been settled. Call with the session lock held.
    pub fn ensure_editable(&self) -> Result<()> {
        match self.payment.state() {
            PaymentState::Processing => Err(tableside::Error::PaymentInProgress.into()),
            PaymentState::Succeeded { .. } => Err(tableside::Error::AlreadyPaid.into()),
            PaymentState::Idle | PaymentState::Failed { .. } => Ok(()),
        }
    }
}

pub struct AppState {
    pub config: Config,
    pub catalog: StaticCatalog,
    pub reviews: Mutex<ReviewBoard>,
    pub tables: RwLock<HashMap<String, Arc<TableEntry>>>,
    pub kitchen: Mutex<KitchenBoard>,
    pub order_ids: Arc<OrderIdGenerator>,
    /// Completed payments waiting to be settled.
    pub completions: mpsc::UnboundedSender<PaymentReceipt>,
    /// Parent token for every table and background task.
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(config: Config, completions: mpsc::UnboundedSender<PaymentReceipt>) -> Self {
        let now = Utc::now();
        let catalog = StaticCatalog::demo();

        let mut kitchen = KitchenBoard::new(config.kitchen_policy());
        let mut reviews = ReviewBoard::for_catalog(&catalog);
        if config.seed_kitchen_demo {
            kitchen.seed_demo(now);
        }
        if config.seed_demo_reviews {
            reviews.seed_demo(now);
        }

        Self {
            order_ids: Arc::new(OrderIdGenerator::new(config.order_id_prefix.clone())),
            reviews: Mutex::new(reviews),
            catalog,
            tables: RwLock::new(HashMap::new()),
            kitchen: Mutex::new(kitchen),
            completions,
            shutdown: CancellationToken::new(),
            config,
        }
    }

    /// Return the session for `table`, creating it on first scan.
    pub async fn open_table(&self, table: TableInfo) -> Arc<TableEntry> {
        let mut tables = self.tables.write().await;
        tables
            .entry(table.table_id.clone())
            .or_insert_with(|| {
                info!(table_id = %table.table_id, table_name = %table.table_name, "table opened");
                Arc::new(TableEntry {
                    payment: PaymentSimulator::new(
                        self.config.payment_delay(),
                        self.order_ids.clone(),
                    ),
                    session: Mutex::new(TableSession::new(table)),
                    last_receipt: Mutex::new(None),
                    cancel: self.shutdown.child_token(),
                })
            })
            .clone()
    }

    pub async fn table(&self, table_id: &str) -> Result<Arc<TableEntry>> {
        self.tables
            .read()
            .await
            .get(table_id)
            .cloned()
            .ok_or_else(|| ServiceError::TableNotFound(table_id.to_string()))
    }

    /// Drop the session and cancel anything still running for it.
    pub async fn close_table(&self, table_id: &str) -> Result<()> {
        let entry = self
            .tables
            .write()
            .await
            .remove(table_id)
            .ok_or_else(|| ServiceError::TableNotFound(table_id.to_string()))?;
        entry.cancel.cancel();
        info!(table_id, "table closed");
        Ok(())
    }
}
