//! Application configuration loaded from environment variables.

use std::time::Duration;

use tableside::{KitchenPolicy, TaxPolicy};

use crate::errors::{Result, ServiceError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Port for the REST API server
    pub api_port: u16,
    /// Simulated payment latency in milliseconds
    pub payment_delay_ms: u64,
    /// How often (in seconds) the kitchen ETA countdown ticks
    pub kitchen_tick_secs: u64,
    /// Flat tax rate applied to every bill, in whole percent
    pub tax_rate_percent: u32,
    /// Prefix for generated order ids
    pub order_id_prefix: String,
    /// Estimate (minutes) set when an order starts cooking
    pub cooking_estimate_mins: u32,
    /// Orders older than this (minutes) and not served are flagged
    pub priority_after_mins: i64,
    /// Seed the kitchen board with demo orders on startup
    pub seed_kitchen_demo: bool,
    /// Seed every menu item with the house reviews on startup
    pub seed_demo_reviews: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_port: 3000,
            payment_delay_ms: 3000,
            kitchen_tick_secs: 60,
            tax_rate_percent: tableside::DEFAULT_TAX_RATE_PERCENT,
            order_id_prefix: "O".to_string(),
            cooking_estimate_mins: tableside::DEFAULT_COOKING_ESTIMATE_MINS,
            priority_after_mins: tableside::DEFAULT_PRIORITY_AFTER_MINS,
            seed_kitchen_demo: true,
            seed_demo_reviews: true,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key → value source. Missing keys fall back
    /// to the defaults; present but unparsable values are errors.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Config::default();

        let config = Config {
            api_port: parse_or(&lookup, "API_PORT", defaults.api_port)?,
            payment_delay_ms: parse_or(&lookup, "PAYMENT_DELAY_MS", defaults.payment_delay_ms)?,
            kitchen_tick_secs: parse_or(&lookup, "KITCHEN_TICK_SECS", defaults.kitchen_tick_secs)?,
            tax_rate_percent: parse_or(&lookup, "TAX_RATE_PERCENT", defaults.tax_rate_percent)?,
            order_id_prefix: lookup("ORDER_ID_PREFIX")
                .map(|v| v.trim().to_string())
                .unwrap_or(defaults.order_id_prefix),
            cooking_estimate_mins: parse_or(
                &lookup,
                "COOKING_ESTIMATE_MINS",
                defaults.cooking_estimate_mins,
            )?,
            priority_after_mins: parse_or(
                &lookup,
                "PRIORITY_AFTER_MINS",
                defaults.priority_after_mins,
            )?,
            seed_kitchen_demo: parse_or(&lookup, "SEED_KITCHEN_DEMO", defaults.seed_kitchen_demo)?,
            seed_demo_reviews: parse_or(&lookup, "SEED_DEMO_REVIEWS", defaults.seed_demo_reviews)?,
        };

        if config.kitchen_tick_secs == 0 {
            return Err(ServiceError::Config(
                "KITCHEN_TICK_SECS must be greater than zero".to_string(),
            ));
        }

        Ok(config)
    }

    pub fn payment_delay(&self) -> Duration {
        Duration::from_millis(self.payment_delay_ms)
    }

    pub fn kitchen_tick(&self) -> Duration {
        Duration::from_secs(self.kitchen_tick_secs)
    }

    pub fn tax_policy(&self) -> TaxPolicy {
        TaxPolicy::new(self.tax_rate_percent)
    }

    pub fn kitchen_policy(&self) -> KitchenPolicy {
        KitchenPolicy {
            cooking_estimate_mins: self.cooking_estimate_mins,
            priority_after_mins: self.priority_after_mins,
        }
    }
}

fn parse_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T> {
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ServiceError::Config(format!("Invalid {key}: {raw:?}"))),
    }
}
