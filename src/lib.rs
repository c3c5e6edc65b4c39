pub mod api;
pub mod chart;
pub mod config;
pub mod error;
pub mod invoice;
pub mod logging;
pub mod mail;
pub mod report;

pub use api::{Account, BillingClient, Promotion};
pub use config::{Config, MalformedPolicy};
pub use error::{ReportError, Result};
pub use invoice::{compute_windows, summarize, DateWindow, Invoice, InvoiceTotals, Period, Windows};
