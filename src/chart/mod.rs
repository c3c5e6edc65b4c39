mod bar;

pub use bar::{layout, render_bar_chart, Bar, BarChart, Rect, Rgb, HEIGHT, WIDTH};

use chrono::NaiveDate;
use std::path::{Path, PathBuf};

use crate::api::Account;
use crate::error::Result;

pub const CREDIT_OVERVIEW: &str = "credit_overview";
pub const ACCRUED_CHARGES_OVERVIEW: &str = "accrued_charges_overview";

/// `{dir}/{base_name}-{YYYY-MM-DD}.png`
pub fn chart_path(dir: &Path, base_name: &str, date: NaiveDate) -> PathBuf {
    dir.join(format!("{}-{}.png", base_name, date.format("%Y-%m-%d")))
}

/// Remaining promotion credit against the monthly cap
pub fn credit_overview(account: &Account) -> Result<Option<BarChart>> {
    let Some(promo) = account.primary_promotion() else {
        return Ok(None);
    };

    Ok(Some(BarChart {
        title: "Credit Overview".to_string(),
        bars: vec![
            Bar {
                label: "Credit Remaining".to_string(),
                value: promo.credit_remaining,
                color: Rgb::from_hex("#56B4E9")?,
            },
            Bar {
                label: "Credit Monthly Cap".to_string(),
                value: promo.credit_monthly_cap,
                color: Rgb::from_hex("#D55E00")?,
            },
        ],
    }))
}

/// Charges accrued since the last invoice
pub fn accrued_charges_overview(account: &Account) -> Result<Option<BarChart>> {
    let Some(accrued) = account.balance_uninvoiced else {
        return Ok(None);
    };

    Ok(Some(BarChart {
        title: "Accrued Charges Overview".to_string(),
        bars: vec![Bar {
            label: "Accrued Charges Since Last Month".to_string(),
            value: accrued,
            color: Rgb::from_hex("#009E73")?,
        }],
    }))
}

/// Render whichever report charts the account has data for.
///
/// Returns the paths of both chart files in report order, rendered or not;
/// delivery skips the ones that do not exist.
pub fn render_report_charts(
    account: &Account,
    output_dir: &Path,
    date: NaiveDate,
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(output_dir)?;

    let charts = [
        (CREDIT_OVERVIEW, credit_overview(account)?),
        (ACCRUED_CHARGES_OVERVIEW, accrued_charges_overview(account)?),
    ];

    let mut paths = Vec::with_capacity(charts.len());
    for (base_name, chart) in charts {
        let path = chart_path(output_dir, base_name, date);
        match chart {
            Some(chart) => {
                render_bar_chart(&chart, &path)?;
                tracing::info!(path = %path.display(), "rendered chart");
            }
            None => tracing::debug!(chart = base_name, "no data for chart, skipping"),
        }
        paths.push(path);
    }

    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Promotion;
    use rust_decimal_macros::dec;
    use tempfile::TempDir;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 25).unwrap()
    }

    #[test]
    fn test_chart_path() {
        assert_eq!(
            chart_path(Path::new("/tmp/out"), CREDIT_OVERVIEW, date()),
            PathBuf::from("/tmp/out/credit_overview-2024-01-25.png")
        );
    }

    #[test]
    fn test_render_both_charts() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("charts");
        let account = Account {
            balance_uninvoiced: Some(dec!(14.27)),
            active_promotions: vec![Promotion {
                summary: "promo".into(),
                credit_monthly_cap: dec!(10),
                credit_remaining: dec!(50),
                ..Promotion::default()
            }],
            ..Account::default()
        };

        let paths = render_report_charts(&account, &out, date()).unwrap();
        assert_eq!(paths.len(), 2);
        assert!(paths[0].ends_with("credit_overview-2024-01-25.png"));
        assert!(paths[1].ends_with("accrued_charges_overview-2024-01-25.png"));

        for path in &paths {
            let bytes = std::fs::read(path).unwrap();
            assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
        }
    }

    #[test]
    fn test_charts_without_data_are_not_written() {
        let dir = TempDir::new().unwrap();
        let paths = render_report_charts(&Account::default(), dir.path(), date()).unwrap();

        assert_eq!(paths.len(), 2);
        assert!(paths.iter().all(|p| !p.exists()));
    }
}
