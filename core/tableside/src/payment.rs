//! # Payment Simulator
//!
//! ```text
//!            pay()                 delay elapses, settled
//!   Idle ───────────► Processing ─────────────────────────► Succeeded
//!    ▲                 │    ▲  │
//!    │  cancelled      │    │  │ delay elapses, declined
//!    └─────────────────┘    │  ▼
//!                           └─ Failed     (pay() again retries)
//! ```
//!
//! The simulator only reports outcomes. Clearing the cart and partitions
//! after a successful payment is the caller's job, triggered from the
//! `on_complete` callback or the returned receipt.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::types::{Bill, TableInfo};
use crate::{Error, Result};

/// Simulated processing latency.
pub const DEFAULT_PAYMENT_DELAY: Duration = Duration::from_secs(3);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    Upi,
    Card,
    Cash,
}

/// Proof of a completed payment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PaymentReceipt {
    pub order_id: String,
    pub table: TableInfo,
    pub method: PaymentMethod,
    pub amount: u64,
    pub paid_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PaymentState {
    #[default]
    Idle,
    Processing,
    Succeeded { receipt: PaymentReceipt },
    Failed { reason: String },
}

/// Decides whether a processed payment goes through.
pub trait Settlement: Send + Sync {
    /// `Err(reason)` declines the payment.
    fn settle(&self, bill: &Bill, method: PaymentMethod) -> std::result::Result<(), String>;
}

/// Settlement that accepts every payment.
#[derive(Clone, Copy, Debug, Default)]
pub struct ApproveAll;

impl Settlement for ApproveAll {
    fn settle(&self, _bill: &Bill, _method: PaymentMethod) -> std::result::Result<(), String> {
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────
// Order ids
// ─────────────────────────────────────────────────────────

/// Produces ids shaped like `O123456`.
///
/// The numeric part starts from the last six digits of the millisecond
/// clock and then counts up, so ids never repeat within one generator.
#[derive(Debug)]
pub struct OrderIdGenerator {
    prefix: String,
    next: AtomicU64,
}

impl OrderIdGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        let seed = Utc::now().timestamp_millis().rem_euclid(1_000_000) as u64;
        Self::starting_at(prefix, seed)
    }

    pub fn starting_at(prefix: impl Into<String>, start: u64) -> Self {
        Self {
            prefix: prefix.into(),
            next: AtomicU64::new(start),
        }
    }

    pub fn next_id(&self) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        format!("{}{:06}", self.prefix, n)
    }
}

impl Default for OrderIdGenerator {
    fn default() -> Self {
        Self::new("O")
    }
}

// ─────────────────────────────────────────────────────────
// Simulator
// ─────────────────────────────────────────────────────────

/// Proof that [`PaymentSimulator::begin`] accepted a bill.
#[derive(Debug)]
#[must_use]
pub struct PaymentTicket {
    _priv: (),
}

pub struct PaymentSimulator<S = ApproveAll> {
    delay: Duration,
    settlement: S,
    ids: Arc<OrderIdGenerator>,
    state: watch::Sender<PaymentState>,
}

impl PaymentSimulator<ApproveAll> {
    pub fn new(delay: Duration, ids: Arc<OrderIdGenerator>) -> Self {
        Self::with_settlement(delay, ids, ApproveAll)
    }
}

impl<S: Settlement> PaymentSimulator<S> {
    pub fn with_settlement(
        delay: Duration,
        ids: Arc<OrderIdGenerator>,
        settlement: S,
    ) -> Self {
        let (state, _rx) = watch::channel(PaymentState::Idle);
        Self {
            delay,
            settlement,
            ids,
            state,
        }
    }

    pub fn state(&self) -> PaymentState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<PaymentState> {
        self.state.subscribe()
    }

    /// Process `bill`, wait the simulated latency, then settle it.
    ///
    /// Allowed from `Idle` and `Failed` (a retry). On success the state
    /// becomes `Succeeded`, `on_complete` runs with the receipt, and the
    /// receipt is returned. Cancelling `cancel` while waiting returns the
    /// simulator to `Idle`.
    pub async fn pay<F>(
        &self,
        bill: &Bill,
        method: PaymentMethod,
        cancel: &CancellationToken,
        on_complete: F,
    ) -> Result<PaymentReceipt>
    where
        F: FnOnce(&PaymentReceipt),
    {
        let ticket = self.begin(bill)?;
        self.process(ticket, bill, method, cancel, on_complete).await
    }

    /// Validate `bill` and move to `Processing` without waiting.
    ///
    /// The returned ticket is required by [`PaymentSimulator::process`], so
    /// the latency can run on another task while the caller learns
    /// synchronously whether the payment was accepted for processing.
    pub fn begin(&self, bill: &Bill) -> Result<PaymentTicket> {
        if bill.is_empty() {
            return Err(Error::EmptyBill);
        }

        let mut outcome = Ok(PaymentTicket { _priv: () });
        self.state.send_if_modified(|state| match state {
            PaymentState::Idle | PaymentState::Failed { .. } => {
                *state = PaymentState::Processing;
                true
            }
            PaymentState::Processing => {
                outcome = Err(Error::PaymentInProgress);
                false
            }
            PaymentState::Succeeded { .. } => {
                outcome = Err(Error::AlreadyPaid);
                false
            }
        });

        if outcome.is_ok() {
            info!(
                table_id = %bill.table.table_id,
                amount = bill.final_total,
                "payment processing"
            );
        }
        outcome
    }

    /// Wait the simulated latency and settle a payment started by
    /// [`PaymentSimulator::begin`].
    pub async fn process<F>(
        &self,
        _ticket: PaymentTicket,
        bill: &Bill,
        method: PaymentMethod,
        cancel: &CancellationToken,
        on_complete: F,
    ) -> Result<PaymentReceipt>
    where
        F: FnOnce(&PaymentReceipt),
    {
        tokio::select! {
            _ = cancel.cancelled() => {
                warn!(table_id = %bill.table.table_id, "payment cancelled");
                self.state.send_replace(PaymentState::Idle);
                return Err(Error::PaymentCancelled);
            }
            _ = tokio::time::sleep(self.delay) => {}
        }

        if let Err(reason) = self.settlement.settle(bill, method) {
            warn!(table_id = %bill.table.table_id, %reason, ?method, "payment declined");
            self.state.send_replace(PaymentState::Failed {
                reason: reason.clone(),
            });
            return Err(Error::PaymentDeclined(reason));
        }

        let receipt = PaymentReceipt {
            order_id: self.ids.next_id(),
            table: bill.table.clone(),
            method,
            amount: bill.final_total,
            paid_at: Utc::now(),
        };
        info!(order_id = %receipt.order_id, amount = receipt.amount, ?method, "payment succeeded");

        self.state.send_replace(PaymentState::Succeeded {
            receipt: receipt.clone(),
        });
        on_complete(&receipt);
        Ok(receipt)
    }

    /// Return a finished simulator to `Idle`. Ignored while processing.
    pub fn reset(&self) {
        self.state.send_if_modified(|state| match state {
            PaymentState::Processing | PaymentState::Idle => false,
            _ => {
                *state = PaymentState::Idle;
                true
            }
        });
    }
}
