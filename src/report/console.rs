use tabled::{settings::Style, Table, Tabled};

use super::format::format_money;
use crate::api::Account;
use crate::invoice::{Period, TotalsSummary, Windows};

// Table row structs for tabled
#[derive(Tabled)]
struct FieldRow {
    #[tabled(rename = "FIELD")]
    field: String,
    #[tabled(rename = "VALUE")]
    value: String,
}

#[derive(Tabled)]
struct TotalRow {
    #[tabled(rename = "PERIOD")]
    period: String,
    #[tabled(rename = "FROM")]
    from: String,
    #[tabled(rename = "TO")]
    to: String,
    #[tabled(rename = "TOTAL")]
    total: String,
}

/// Account summary as a terminal table
pub fn account_table(account: &Account) -> String {
    let mut rows = vec![
        row("Company", account.company.as_deref().unwrap_or("-")),
        row("Email", account.email.as_deref().unwrap_or("-")),
        row("Balance", &format_money(account.balance)),
        row(
            "Accrued charges",
            &account
                .balance_uninvoiced
                .map(format_money)
                .unwrap_or_else(|| "-".to_string()),
        ),
        row("Active since", account.active_since.as_deref().unwrap_or("-")),
    ];

    if let Some(promo) = account.primary_promotion() {
        rows.push(row("Promotion", &promo.summary));
        rows.push(row("  Expires", promo.expire_dt.as_deref().unwrap_or("-")));
        rows.push(row("  Monthly cap", &format_money(promo.credit_monthly_cap)));
        rows.push(row("  Remaining", &format_money(promo.credit_remaining)));
        rows.push(row(
            "  Remaining this month",
            &format_money(promo.this_month_credit_remaining),
        ));
    }

    Table::new(rows).with(Style::rounded()).to_string()
}

/// Period totals with their date ranges as a terminal table
pub fn totals_table(summary: &TotalsSummary) -> String {
    let rows: Vec<TotalRow> = summary
        .totals
        .iter()
        .map(|t| {
            let window = summary.windows.get(t.period);
            TotalRow {
                period: t.label.to_string(),
                from: window.start.format("%Y-%m-%d").to_string(),
                to: describe_end(&summary.windows, t.period),
                total: format_money(t.amount),
            }
        })
        .collect();

    Table::new(rows).with(Style::rounded()).to_string()
}

fn describe_end(windows: &Windows, period: Period) -> String {
    let window = windows.get(period);
    if window.end_inclusive {
        window.end.format("%Y-%m-%d %H:%M").to_string()
    } else {
        format!("before {}", window.end.format("%Y-%m-%d"))
    }
}

fn row(field: &str, value: &str) -> FieldRow {
    FieldRow {
        field: field.to_string(),
        value: value.to_string(),
    }
}
