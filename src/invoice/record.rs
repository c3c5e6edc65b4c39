use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;

use crate::config::MalformedPolicy;
use crate::error::{ReportError, Result};

/// An invoice as returned by the billing API, with its date and total parsed
#[derive(Debug, Clone, PartialEq)]
pub struct Invoice {
    pub id: String,
    pub date: NaiveDateTime,
    pub total: Decimal,
}

impl Invoice {
    /// Parse a raw `data` entry of an invoices page
    pub fn from_record(record: &Value) -> Result<Self> {
        let id = record_id(record);

        let raw_date = &record["date"];
        let date = raw_date
            .as_str()
            .and_then(parse_timestamp)
            .ok_or_else(|| ReportError::MalformedRecord {
                id: id.clone(),
                field: "date",
                value: display_raw(raw_date),
            })?;

        let raw_total = &record["total"];
        let total = parse_amount(raw_total).ok_or_else(|| ReportError::MalformedRecord {
            id: id.clone(),
            field: "total",
            value: display_raw(raw_total),
        })?;

        Ok(Self { id, date, total })
    }
}

/// Invoices that parsed cleanly, plus how many records were dropped
#[derive(Debug, Default)]
pub struct ParsedInvoices {
    pub invoices: Vec<Invoice>,
    pub skipped: usize,
}

/// Parse every record, aborting or skipping malformed ones according to `policy`
pub fn parse_invoices(records: &[Value], policy: MalformedPolicy) -> Result<ParsedInvoices> {
    let mut parsed = ParsedInvoices {
        invoices: Vec::with_capacity(records.len()),
        skipped: 0,
    };

    for record in records {
        match Invoice::from_record(record) {
            Ok(invoice) => parsed.invoices.push(invoice),
            Err(err) if policy == MalformedPolicy::Skip => {
                tracing::warn!(error = %err, "skipping malformed invoice record");
                parsed.skipped += 1;
            }
            Err(err) => return Err(err),
        }
    }

    Ok(parsed)
}

/// Parse an API timestamp.
///
/// Accepts `YYYY-MM-DDTHH:MM:SS[.fff]`, RFC 3339 with an offset (taken as
/// UTC), `YYYY-MM-DD HH:MM:SS` and a bare `YYYY-MM-DD` (midnight).
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();

    if let Ok(ts) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(ts);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.naive_utc());
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(ts);
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .map(|d| d.and_time(NaiveTime::MIN))
}

/// Parse a monetary value sent either as a JSON number or a numeric string.
///
/// Numbers go through their shortest decimal text, so `50.005` stays exact.
pub fn parse_amount(value: &Value) -> Option<Decimal> {
    let text = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        _ => return None,
    };

    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}

fn record_id(record: &Value) -> String {
    match &record["id"] {
        Value::String(s) => s.clone(),
        Value::Null => "<no id>".to_string(),
        other => other.to_string(),
    }
}

fn display_raw(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "<missing>".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn ts(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").unwrap()
    }

    #[test]
    fn test_from_record() {
        let invoice = Invoice::from_record(&json!({
            "id": 123,
            "date": "2024-01-10T08:30:00",
            "label": "Invoice",
            "total": 50.005
        }))
        .unwrap();

        assert_eq!(invoice.id, "123");
        assert_eq!(invoice.date, ts("2024-01-10T08:30:00"));
        assert_eq!(invoice.total, dec!(50.005));
    }

    #[test]
    fn test_timestamp_formats() {
        assert_eq!(
            parse_timestamp("2024-01-10T08:30:00"),
            Some(ts("2024-01-10T08:30:00"))
        );
        assert_eq!(
            parse_timestamp("2024-01-10T08:30:00.250").map(|t| t.and_utc().timestamp()),
            Some(ts("2024-01-10T08:30:00").and_utc().timestamp())
        );
        assert_eq!(
            parse_timestamp("2024-01-10T08:30:00+02:00"),
            Some(ts("2024-01-10T06:30:00"))
        );
        assert_eq!(
            parse_timestamp("2024-01-10 08:30:00"),
            Some(ts("2024-01-10T08:30:00"))
        );
        assert_eq!(parse_timestamp("2024-01-10"), Some(ts("2024-01-10T00:00:00")));
        assert_eq!(parse_timestamp("10/01/2024"), None);
        assert_eq!(parse_timestamp(""), None);
    }

    #[test]
    fn test_amount_forms() {
        assert_eq!(parse_amount(&json!(12)), Some(dec!(12)));
        assert_eq!(parse_amount(&json!(0.1)), Some(dec!(0.1)));
        assert_eq!(parse_amount(&json!("10.00")), Some(dec!(10.00)));
        assert_eq!(parse_amount(&json!(" -3.5 ")), Some(dec!(-3.5)));
        assert_eq!(parse_amount(&json!("ten")), None);
        assert_eq!(parse_amount(&json!(null)), None);
        assert_eq!(parse_amount(&json!([1])), None);
    }

    #[test]
    fn test_malformed_date_aborts() {
        let records = vec![
            json!({"id": 1, "date": "2024-01-10T00:00:00", "total": 5}),
            json!({"id": 2, "date": "yesterday", "total": 5}),
        ];

        let err = parse_invoices(&records, MalformedPolicy::Abort).unwrap_err();
        match err {
            ReportError::MalformedRecord { id, field, value } => {
                assert_eq!(id, "2");
                assert_eq!(field, "date");
                assert_eq!(value, "yesterday");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_malformed_records_skipped() {
        let records = vec![
            json!({"id": 1, "date": "2024-01-10T00:00:00", "total": 5}),
            json!({"id": 2, "date": "2024-01-11T00:00:00", "total": "n/a"}),
            json!({"id": 3, "total": 7}),
            json!({"id": 4, "date": "2024-01-12T00:00:00", "total": "7.25"}),
        ];

        let parsed = parse_invoices(&records, MalformedPolicy::Skip).unwrap();
        assert_eq!(parsed.skipped, 2);
        let ids: Vec<_> = parsed.invoices.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, ["1", "4"]);
    }
}
