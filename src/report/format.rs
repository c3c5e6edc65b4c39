use rust_decimal::{Decimal, RoundingStrategy};

use crate::api::Account;
use crate::invoice::InvoiceTotals;

const FOOTER: &str = "---------------------------";

/// Format an amount as `$1234.50`: exactly two decimals, half away from zero
pub fn format_money(amount: Decimal) -> String {
    let mut rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    format!("${rounded}")
}

/// Account block of the email body
pub fn format_account_summary(account: &Account) -> String {
    let mut out = String::from("----- Account Summary -----\n\n");

    let details = [
        ("company", account.company.clone().unwrap_or_default()),
        ("email", account.email.clone().unwrap_or_default()),
        ("balance", format_money(account.balance)),
        (
            "credit used",
            format_money(account.balance_uninvoiced.unwrap_or_default()),
        ),
        (
            "active_since",
            account.active_since.clone().unwrap_or_default(),
        ),
    ];
    let mut lines: Vec<String> = details
        .iter()
        .map(|(key, value)| format!("{key}: {value}"))
        .collect();

    if let Some(promo) = account.primary_promotion() {
        lines.push(promo.summary.clone());
        let promo_details = [
            ("expiration", promo.expire_dt.clone().unwrap_or_default()),
            ("credit monthly cap", format_money(promo.credit_monthly_cap)),
            ("credit remaining", format_money(promo.credit_remaining)),
            (
                "credit remaining this month",
                format_money(promo.this_month_credit_remaining),
            ),
        ];
        lines.extend(
            promo_details
                .iter()
                .map(|(key, value)| format!("  - {key}: {value}")),
        );
    }
    out.push_str(&lines.join("\n"));

    out.push('\n');
    out.push_str(FOOTER);
    out.push_str("\n\n");
    out
}

/// Totals block of the email body, one `label: $amount` line per period
pub fn format_invoice_totals(totals: &InvoiceTotals) -> String {
    let lines: Vec<String> = totals
        .iter()
        .map(|t| format!("{}: {}", t.label, format_money(t.amount)))
        .collect();

    format!(
        "----- Invoice Totals -----\n\n{}\n{}\n\n",
        lines.join("\n"),
        FOOTER
    )
}

/// Full email body: account block then totals block
pub fn format_report(account: &Account, totals: &InvoiceTotals) -> String {
    format_account_summary(account) + &format_invoice_totals(totals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Promotion;
    use crate::invoice::{aggregate, compute_windows, partition, parse_timestamp, Invoice};
    use rust_decimal_macros::dec;

    fn totals(amounts: &[(&str, Decimal)], now: &str) -> InvoiceTotals {
        let invoices: Vec<Invoice> = amounts
            .iter()
            .map(|(date, total)| Invoice {
                id: date.to_string(),
                date: parse_timestamp(date).unwrap(),
                total: *total,
            })
            .collect();
        let windows = compute_windows(parse_timestamp(now).unwrap());
        aggregate(&partition(&invoices, &windows)).unwrap()
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(dec!(100)), "$100.00");
        assert_eq!(format_money(dec!(100.010)), "$100.01");
        assert_eq!(format_money(dec!(0.005)), "$0.01");
        assert_eq!(format_money(dec!(2.994)), "$2.99");
        assert_eq!(format_money(dec!(12.5)), "$12.50");
        assert_eq!(format_money(Decimal::ZERO), "$0.00");
    }

    #[test]
    fn test_invoice_totals_block() {
        let totals = totals(
            &[
                ("2023-12-15", dec!(20)),
                ("2024-01-10", dec!(50.005)),
                ("2024-01-20", dec!(50.005)),
            ],
            "2024-01-25",
        );

        assert_eq!(
            format_invoice_totals(&totals),
            "----- Invoice Totals -----\n\n\
             Last Month Total: $20.00\n\
             Current Month Total: $100.01\n\
             Year to Date Total: $100.01\n\
             ---------------------------\n\n"
        );
    }

    #[test]
    fn test_account_block_without_promotion() {
        let account = Account {
            company: Some("Acme".into()),
            email: Some("ops@acme.test".into()),
            balance: dec!(5),
            balance_uninvoiced: Some(dec!(14.271)),
            active_since: Some("2018-01-01T00:01:01".into()),
            active_promotions: vec![],
        };

        assert_eq!(
            format_account_summary(&account),
            "----- Account Summary -----\n\n\
             company: Acme\n\
             email: ops@acme.test\n\
             balance: $5.00\n\
             credit used: $14.27\n\
             active_since: 2018-01-01T00:01:01\n\
             ---------------------------\n\n"
        );
    }

    #[test]
    fn test_account_block_with_promotion() {
        let account = Account {
            company: Some("Acme".into()),
            email: Some("ops@acme.test".into()),
            balance: Decimal::ZERO,
            balance_uninvoiced: None,
            active_since: None,
            active_promotions: vec![Promotion {
                summary: "$100 off your Linode".into(),
                expire_dt: Some("2024-03-31T23:59:59".into()),
                credit_monthly_cap: dec!(10),
                credit_remaining: dec!(50),
                this_month_credit_remaining: dec!(7.5),
            }],
        };

        let block = format_account_summary(&account);
        assert!(block.contains("credit used: $0.00\n"));
        assert!(block.contains("\n$100 off your Linode\n"));
        assert!(block.contains("  - expiration: 2024-03-31T23:59:59\n"));
        assert!(block.contains("  - credit monthly cap: $10.00\n"));
        assert!(block.contains("  - credit remaining: $50.00\n"));
        assert!(block.contains("  - credit remaining this month: $7.50\n"));
        assert!(block.ends_with("---------------------------\n\n"));
    }

    #[test]
    fn test_report_orders_account_before_totals() {
        let report = format_report(&Account::default(), &totals(&[], "2024-01-25"));
        let account_at = report.find("Account Summary").unwrap();
        let totals_at = report.find("Invoice Totals").unwrap();
        assert!(account_at < totals_at);
    }
}
