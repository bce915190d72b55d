//! Payment tasks.
//!
//! A payment is accepted synchronously by the request handler and then
//! processed on its own task so the simulated latency never holds a table
//! lock. Completed payments travel over an mpsc channel to the settlement
//! loop, which clears the table for its next order.

use std::sync::Arc;

use tableside::{Bill, PaymentMethod, PaymentReceipt, PaymentTicket};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::state::{AppState, TableEntry};

/// Spawn the processing half of a payment accepted by `PaymentSimulator::begin`.
pub fn spawn_payment(
    entry: Arc<TableEntry>,
    ticket: PaymentTicket,
    bill: Bill,
    method: PaymentMethod,
    completions: mpsc::UnboundedSender<PaymentReceipt>,
) {
    tokio::spawn(async move {
        let outcome = entry
            .payment
            .process(ticket, &bill, method, &entry.cancel, |receipt| {
                if completions.send(receipt.clone()).is_err() {
                    error!(order_id = %receipt.order_id, "settlement loop is gone");
                }
            })
            .await;

        if let Err(e) = outcome {
            warn!(table_id = %bill.table.table_id, "payment did not complete: {e}");
        }
    });
}

/// Apply one completed payment: clear the table and make it payable again.
pub async fn settle(state: &AppState, receipt: PaymentReceipt) {
    let Ok(entry) = state.table(&receipt.table.table_id).await else {
        warn!(table_id = %receipt.table.table_id, "paid table already closed");
        return;
    };

    // Held until the simulator is back to `Idle`.
    let mut session = entry.session.lock().await;
    info!(
        order_id = %receipt.order_id,
        table_id = %receipt.table.table_id,
        "payment settled"
    );
    *entry.last_receipt.lock().await = Some(receipt);
    session.settle();
    entry.payment.reset();
}

/// Long-running loop that settles completed payments until shutdown.
pub async fn run_settlements(
    state: Arc<AppState>,
    mut completions: mpsc::UnboundedReceiver<PaymentReceipt>,
    shutdown: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            received = completions.recv() => match received {
                Some(receipt) => settle(&state, receipt).await,
                None => break,
            },
        }
    }
    info!("settlement loop stopped");
}
