//! Table-side ordering service: entry point.
//!
//! Serves the menu, per-table carts, partitioned bills and simulated
//! payments over a small Axum REST API, alongside a kitchen status board.
//! Two background tasks run next to the server: the kitchen ETA ticker and
//! the payment settlement loop.

mod api;
mod config;
mod errors;
mod payments;
mod state;
mod ticker;

#[cfg(test)]
mod test_api;

use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialise structured logging (RUST_LOG controls verbosity).
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Load optional .env file (ignored if missing).
    let _ = dotenvy::dotenv();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!("{e}"))?;
    let addr = format!("0.0.0.0:{}", config.api_port);

    let (completions_tx, completions_rx) = mpsc::unbounded_channel();
    let state = Arc::new(AppState::new(config, completions_tx));

    // ─── Background tasks ─────────────────────────────────
    let ticker = tokio::spawn(ticker::run(state.clone(), state.shutdown.child_token()));
    let settlements = tokio::spawn(payments::run_settlements(
        state.clone(),
        completions_rx,
        state.shutdown.child_token(),
    ));

    // ─── REST API ─────────────────────────────────────────
    let app = router(state.clone());

    info!("API listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(state.shutdown.clone()))
        .await?;

    state.shutdown.cancel();
    if let Err(e) = tokio::try_join!(ticker, settlements) {
        warn!("background task ended abnormally: {e}");
    }

    info!("Shut down cleanly");
    Ok(())
}

fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(api::health))
        // menu
        .route("/menu", get(api::list_menu))
        .route("/menu/categories", get(api::list_categories))
        .route("/menu/:id", get(api::get_menu_item))
        .route("/menu/:id/reviews", get(api::list_reviews).post(api::add_review))
        .route("/menu/:id/reviews/:review_id/like", post(api::like_review))
        // table session & cart
        .route("/tables/:table_id", post(api::open_table).delete(api::close_table))
        .route("/tables/:table_id/cart", get(api::get_cart).delete(api::clear_cart))
        .route("/tables/:table_id/cart/items", post(api::add_item))
        .route(
            "/tables/:table_id/cart/items/:item_id",
            put(api::update_item).delete(api::remove_item),
        )
        // partitions, bill, payment
        .route("/tables/:table_id/partitions", get(api::get_partitions))
        .route("/tables/:table_id/partitions/confirm", post(api::confirm_partition))
        .route("/tables/:table_id/bill", get(api::get_bill))
        .route("/tables/:table_id/payment", post(api::start_payment).get(api::get_payment))
        // kitchen
        .route("/kitchen/orders", get(api::list_kitchen_orders))
        .route("/kitchen/summary", get(api::kitchen_summary))
        .route("/kitchen/orders/:order_id/advance", post(api::advance_kitchen_order))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Resolves on Ctrl-C, or when something else cancels `shutdown`.
async fn shutdown_signal(shutdown: CancellationToken) {
    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                warn!("failed to listen for Ctrl-C: {e}");
            }
            info!("Shutdown requested");
            shutdown.cancel();
        }
        _ = shutdown.cancelled() => {}
    }
}
