mod console;
mod format;

pub use console::{account_table, totals_table};
pub use format::{format_account_summary, format_invoice_totals, format_money, format_report};
