//! Bill computation.

use crate::types::{lines_total, Bill, Partition, TableInfo};

/// Flat tax (GST) applied to the grand subtotal.
pub const DEFAULT_TAX_RATE_PERCENT: u32 = 18;

/// Tax rate in whole percent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TaxPolicy {
    pub rate_percent: u32,
}

impl Default for TaxPolicy {
    fn default() -> Self {
        Self {
            rate_percent: DEFAULT_TAX_RATE_PERCENT,
        }
    }
}

impl TaxPolicy {
    pub fn new(rate_percent: u32) -> Self {
        Self { rate_percent }
    }

    /// `amount × rate`, rounded to the nearest rupee with halves rounded up.
    pub fn tax_on(&self, amount: u64) -> u64 {
        (amount * u64::from(self.rate_percent) + 50) / 100
    }
}

/// Build the bill for `table`.
///
/// The open partition is included only when present and non-empty. Each
/// partition's subtotal is recomputed from its lines; the result depends on
/// nothing but the arguments.
pub fn compute_bill(
    table: &TableInfo,
    confirmed: &[Partition],
    open: Option<&Partition>,
    tax: TaxPolicy,
) -> Bill {
    let partitions: Vec<Partition> = confirmed
        .iter()
        .chain(open.filter(|p| !p.is_empty()))
        .cloned()
        .collect();

    let grand_subtotal = partitions.iter().map(|p| lines_total(p.lines())).sum();
    let tax_amount = tax.tax_on(grand_subtotal);

    Bill {
        table: table.clone(),
        partitions,
        grand_subtotal,
        tax: tax_amount,
        final_total: grand_subtotal + tax_amount,
    }
}
