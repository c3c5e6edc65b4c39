use serde_json::Value;
use std::time::Duration;
use tracing::debug;
use ureq::Agent;

use super::account::Account;
use crate::config::Config;
use crate::error::{ReportError, Result};

/// Blocking client for the billing API
pub struct BillingClient {
    agent: Agent,
    base_url: String,
    token: String,
}

impl BillingClient {
    pub fn from_config(config: &Config) -> Result<Self> {
        let token = config.api_token()?.to_string();
        Ok(Self::with_base_url(
            token,
            config.api.base_url.clone(),
            Duration::from_secs(config.api.timeout_secs),
        ))
    }

    pub fn with_base_url(token: String, base_url: String, timeout: Duration) -> Self {
        // Non-2xx responses come back as responses so the API's error text can be reported
        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    /// GET `{base}/{path}` and parse the JSON body
    fn get_json(&self, path: &str, query: &[(&str, String)]) -> Result<Value> {
        let url = format!("{}/{}", self.base_url, path);
        let endpoint = describe_endpoint(path, query);

        let mut request = self
            .agent
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/json");
        for (key, value) in query {
            request = request.query(*key, value);
        }

        let mut response = request.call().map_err(|e| ReportError::Fetch {
            endpoint: endpoint.clone(),
            reason: e.to_string(),
        })?;

        let status = response.status();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| ReportError::Fetch {
                endpoint: endpoint.clone(),
                reason: e.to_string(),
            })?;

        if !status.is_success() {
            return Err(ReportError::Fetch {
                endpoint,
                reason: format!("HTTP {}: {}", status.as_u16(), extract_api_error(&body)),
            });
        }

        serde_json::from_str(&body).map_err(|e| ReportError::Fetch {
            endpoint,
            reason: format!("invalid JSON: {e}"),
        })
    }

    pub fn account(&self) -> Result<Account> {
        let body = self.get_json("account", &[])?;
        serde_json::from_value(body).map_err(|e| ReportError::Fetch {
            endpoint: "account".to_string(),
            reason: format!("unexpected account payload: {e}"),
        })
    }

    /// Fetch every invoice record, following `page`/`pages` until the last page.
    ///
    /// A page without a `data` array ends the stream early with what was
    /// collected so far. Any failed request fails the whole fetch.
    pub fn fetch_all_invoices(&self) -> Result<Vec<Value>> {
        let mut invoices = Vec::new();
        let mut page: u64 = 1;
        let mut previous: Option<u64> = None;

        loop {
            let mut body = self.get_json("account/invoices", &[("page", page.to_string())])?;

            let current = body.get("page").and_then(Value::as_u64);
            let pages = body.get("pages").and_then(Value::as_u64);

            let Some(Value::Array(data)) = body.get_mut("data").map(Value::take) else {
                debug!(page, "invoice page without data, stopping");
                break;
            };
            debug!(page, records = data.len(), ?pages, "fetched invoice page");
            invoices.extend(data);

            let (Some(current), Some(pages)) = (current, pages) else {
                break;
            };
            if current >= pages {
                break;
            }
            if previous.is_some_and(|prev| current <= prev) {
                return Err(ReportError::Fetch {
                    endpoint: format!("account/invoices?page={page}"),
                    reason: format!("pagination stuck: server answered page {current} again"),
                });
            }

            previous = Some(current);
            page = current + 1;
        }

        Ok(invoices)
    }
}

fn describe_endpoint(path: &str, query: &[(&str, String)]) -> String {
    if query.is_empty() {
        return path.to_string();
    }
    let params: Vec<String> = query.iter().map(|(k, v)| format!("{k}={v}")).collect();
    format!("{}?{}", path, params.join("&"))
}

/// Pull the `errors[].reason` list out of an API error body, falling back to the raw text
fn extract_api_error(body: &str) -> String {
    let reasons: Vec<String> = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v["errors"].as_array().cloned())
        .unwrap_or_default()
        .iter()
        .filter_map(|e| e["reason"].as_str().map(str::to_string))
        .collect();

    if reasons.is_empty() {
        body.trim().to_string()
    } else {
        reasons.join("; ")
    }
}
