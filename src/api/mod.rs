mod account;
mod client;

pub use account::{Account, Promotion};
pub use client::BillingClient;
