use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The subset of `GET /account` the report uses
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Account {
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub balance: Decimal,
    /// Charges accrued since the last invoice
    #[serde(default)]
    pub balance_uninvoiced: Option<Decimal>,
    #[serde(default)]
    pub active_since: Option<String>,
    #[serde(default)]
    pub active_promotions: Vec<Promotion>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Promotion {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub expire_dt: Option<String>,
    #[serde(default)]
    pub credit_monthly_cap: Decimal,
    #[serde(default)]
    pub credit_remaining: Decimal,
    #[serde(default)]
    pub this_month_credit_remaining: Decimal,
}

impl Account {
    /// The promotion shown in the report, if any
    pub fn primary_promotion(&self) -> Option<&Promotion> {
        self.active_promotions.first()
    }
}
