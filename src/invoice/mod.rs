mod record;
mod totals;
mod window;

pub use record::{parse_amount, parse_invoices, parse_timestamp, Invoice, ParsedInvoices};
pub use totals::{aggregate, InvoiceTotals, PeriodTotal};
pub use window::{
    compute_windows, partition, resolve_reference_time, DateWindow, Partitions, Period, Windows,
};

use chrono::NaiveDateTime;
use serde::Serialize;
use serde_json::Value;

use crate::config::MalformedPolicy;
use crate::error::Result;

/// Result of running raw invoice records through parse, partition and sum
#[derive(Debug, Serialize)]
pub struct TotalsSummary {
    pub now: NaiveDateTime,
    pub windows: Windows,
    pub totals: InvoiceTotals,
    pub invoice_count: usize,
    pub skipped: usize,
}

pub fn summarize(
    records: &[Value],
    now: NaiveDateTime,
    policy: MalformedPolicy,
) -> Result<TotalsSummary> {
    let parsed = parse_invoices(records, policy)?;
    let windows = compute_windows(now);
    let totals = aggregate(&partition(&parsed.invoices, &windows))?;

    Ok(TotalsSummary {
        now,
        windows,
        totals,
        invoice_count: parsed.invoices.len(),
        skipped: parsed.skipped,
    })
}
