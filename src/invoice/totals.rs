use rust_decimal::Decimal;
use serde::Serialize;

use super::window::{Partitions, Period};
use crate::error::{ReportError, Result};

/// Summed invoice total for one period
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodTotal {
    pub period: Period,
    pub label: &'static str,
    pub amount: Decimal,
}

/// Totals in fixed period order (last month, current month, year to date)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvoiceTotals {
    pub totals: Vec<PeriodTotal>,
}

impl InvoiceTotals {
    pub fn get(&self, period: Period) -> Decimal {
        self.totals
            .iter()
            .find(|t| t.period == period)
            .map(|t| t.amount)
            .unwrap_or(Decimal::ZERO)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PeriodTotal> {
        self.totals.iter()
    }
}

/// Sum each period's invoices. Amounts are normalized, so `100.010` becomes `100.01`.
pub fn aggregate(partitions: &Partitions<'_>) -> Result<InvoiceTotals> {
    let totals = Period::ALL
        .iter()
        .map(|&period| {
            let amount = partitions
                .get(period)
                .iter()
                .try_fold(Decimal::ZERO, |sum, invoice| sum.checked_add(invoice.total))
                .ok_or(ReportError::TotalOverflow {
                    label: period.label(),
                })?;
            Ok(PeriodTotal {
                period,
                label: period.label(),
                amount: amount.normalize(),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(InvoiceTotals { totals })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoice::record::Invoice;
    use crate::invoice::window::{compute_windows, partition};
    use chrono::NaiveDateTime;
    use rust_decimal_macros::dec;

    fn ts(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").unwrap()
    }

    fn invoice(date: &str, total: Decimal) -> Invoice {
        Invoice {
            id: date.to_string(),
            date: ts(date),
            total,
        }
    }

    #[test]
    fn test_empty_sums_to_zero() {
        let windows = compute_windows(ts("2024-05-05T00:00:00"));
        let totals = aggregate(&partition(&[], &windows)).unwrap();

        assert_eq!(totals.totals.len(), 3);
        for total in totals.iter() {
            assert_eq!(total.amount, Decimal::ZERO, "{}", total.label);
        }
    }

    #[test]
    fn test_decimal_sum_is_exact() {
        let invoices = vec![
            invoice("2024-01-10T00:00:00", dec!(50.005)),
            invoice("2024-01-20T00:00:00", dec!(50.005)),
        ];
        let windows = compute_windows(ts("2024-01-25T00:00:00"));
        let totals = aggregate(&partition(&invoices, &windows)).unwrap();

        assert_eq!(totals.get(Period::CurrentMonth), dec!(100.01));
        assert_eq!(totals.get(Period::YearToDate), dec!(100.01));
        assert_eq!(totals.get(Period::LastMonth), Decimal::ZERO);
    }

    #[test]
    fn test_many_small_amounts_do_not_drift() {
        let invoices: Vec<_> = (1..=28)
            .map(|day| invoice(&format!("2024-02-{day:02}T00:00:00"), dec!(0.1)))
            .collect();
        let windows = compute_windows(ts("2024-03-02T00:00:00"));
        let totals = aggregate(&partition(&invoices, &windows)).unwrap();

        assert_eq!(totals.get(Period::LastMonth), dec!(2.8));
    }

    #[test]
    fn test_current_month_never_exceeds_year_to_date() {
        let invoices = vec![
            invoice("2023-11-30T10:00:00", dec!(12.50)),
            invoice("2024-01-02T00:00:00", dec!(3.10)),
            invoice("2024-04-01T00:00:00", dec!(7)),
            invoice("2024-04-14T23:00:00", dec!(0.99)),
            invoice("2024-04-30T00:00:00", dec!(100)),
        ];
        let windows = compute_windows(ts("2024-04-15T00:00:00"));
        let totals = aggregate(&partition(&invoices, &windows)).unwrap();

        assert_eq!(totals.get(Period::LastMonth), Decimal::ZERO);
        assert_eq!(totals.get(Period::CurrentMonth), dec!(7.99));
        assert_eq!(totals.get(Period::YearToDate), dec!(11.09));
        assert!(totals.get(Period::CurrentMonth) <= totals.get(Period::YearToDate));
    }

    #[test]
    fn test_normalized_scale() {
        let invoices = vec![
            invoice("2024-01-10T00:00:00", dec!(50.005)),
            invoice("2024-01-20T00:00:00", dec!(50.005)),
        ];
        let windows = compute_windows(ts("2024-01-25T00:00:00"));
        let totals = aggregate(&partition(&invoices, &windows)).unwrap();

        assert_eq!(totals.get(Period::CurrentMonth).to_string(), "100.01");
        assert_eq!(totals.get(Period::LastMonth).to_string(), "0");
    }

    #[test]
    fn test_overflow_is_an_error() {
        let invoices = vec![
            invoice("2024-01-10T00:00:00", Decimal::MAX),
            invoice("2024-01-20T00:00:00", dec!(1)),
        ];
        let windows = compute_windows(ts("2024-01-25T00:00:00"));
        let err = aggregate(&partition(&invoices, &windows)).unwrap_err();

        assert!(
            matches!(err, ReportError::TotalOverflow { label: "Current Month Total" }),
            "{err}"
        );
        assert!(err.to_string().contains("Current Month Total"), "{err}");
    }

    #[test]
    fn test_order_and_labels() {
        let windows = compute_windows(ts("2024-04-15T00:00:00"));
        let totals = aggregate(&partition(&[], &windows)).unwrap();
        let labels: Vec<_> = totals.iter().map(|t| t.label).collect();
        assert_eq!(
            labels,
            ["Last Month Total", "Current Month Total", "Year to Date Total"]
        );
    }
}
