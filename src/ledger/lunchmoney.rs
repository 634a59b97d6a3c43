//! Lunch Money ledger client
//!
//! Blocking reqwest client for the Lunch Money v1 REST API. Only the endpoints
//! the reconciler needs are covered. Transactions are requested with
//! `debit_as_negative=false` so expenses arrive positive, matching the sign
//! convention used throughout the crate.

use std::time::Duration;

use chrono::NaiveDate;
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ReimburseError, ReimburseResult};
use crate::models::{
    Category, CategoryId, Money, NewTransactionGroup, SplitPortion, Tag, TagId, Transaction,
    TransactionId, TransactionStatus,
};

use super::{Ledger, TransactionQuery};

const PAGE_SIZE: usize = 500;

/// Lunch Money API client (blocking)
pub struct LunchMoneyClient {
    http: Client,
    api_base: String,
    token: String,
}

// ── Wire types ──────────────────────────────────────────────────────

#[derive(Deserialize)]
struct CategoriesResponse {
    categories: Vec<WireCategory>,
}

#[derive(Deserialize)]
struct WireCategory {
    id: i64,
    name: String,
}

#[derive(Deserialize)]
struct WireTag {
    id: i64,
    name: String,
}

#[derive(Deserialize)]
struct TransactionsResponse {
    transactions: Vec<WireTransaction>,
    #[serde(default)]
    has_more: Option<bool>,
}

#[derive(Deserialize)]
struct WireTransaction {
    id: i64,
    date: NaiveDate,
    #[serde(default)]
    payee: Option<String>,
    amount: Value,
    #[serde(default)]
    category_id: Option<i64>,
    #[serde(default)]
    notes: Option<String>,
    #[serde(default)]
    original_name: Option<String>,
    #[serde(default)]
    group_id: Option<i64>,
    #[serde(default)]
    tags: Option<Vec<WireTag>>,
    #[serde(default)]
    status: Option<String>,
}

#[derive(Serialize)]
struct WireSplit<'a> {
    date: NaiveDate,
    category_id: Option<i64>,
    notes: &'a str,
    amount: String,
}

#[derive(Serialize)]
struct SplitRequest<'a> {
    split: Vec<WireSplit<'a>>,
}

#[derive(Deserialize)]
struct SplitResponse {
    #[serde(default)]
    split: Vec<i64>,
    #[serde(default)]
    error: Option<Value>,
}

#[derive(Serialize)]
struct GroupRequest<'a> {
    date: NaiveDate,
    payee: &'a str,
    category_id: i64,
    notes: &'a str,
    transactions: Vec<i64>,
}

impl WireTransaction {
    fn into_model(self) -> ReimburseResult<Transaction> {
        let amount = parse_amount(&self.amount).ok_or_else(|| {
            ReimburseError::Ledger(format!(
                "transaction {} has an unreadable amount: {}",
                self.id, self.amount
            ))
        })?;

        let mut txn = Transaction::new(TransactionId::new(self.id), self.date, amount);
        txn.payee = self.payee.filter(|p| !p.is_empty());
        txn.category_id = self.category_id.map(CategoryId::new);
        txn.notes = self.notes.filter(|n| !n.is_empty());
        txn.original_name = self.original_name.filter(|n| !n.is_empty());
        txn.group_id = self.group_id.map(TransactionId::new);
        txn.tags = self
            .tags
            .unwrap_or_default()
            .into_iter()
            .map(|t| Tag::new(TagId::new(t.id), t.name))
            .collect();
        txn.status = self
            .status
            .as_deref()
            .and_then(TransactionStatus::from_wire)
            .unwrap_or_default();
        Ok(txn)
    }
}

/// Amounts arrive as decimal strings ("12.0000"), occasionally as numbers
fn parse_amount(value: &Value) -> Option<Money> {
    match value {
        Value::String(s) => Money::parse(s).ok(),
        Value::Number(n) => Money::parse(&n.to_string()).ok(),
        _ => None,
    }
}

/// The API sometimes reports failures in a 200 body as `{"error": ...}`
fn body_error(value: &Value) -> Option<String> {
    value.get("error").map(|e| match e {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    })
}

impl LunchMoneyClient {
    /// Create a client with an access token against `api_base`
    pub fn new(token: impl Into<String>, api_base: impl Into<String>) -> ReimburseResult<Self> {
        let http = Client::builder()
            .user_agent(format!("reimburse-cli/{}", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ReimburseError::Ledger(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.api_base, path.trim_start_matches('/'))
    }

    fn send(&self, request: RequestBuilder) -> ReimburseResult<Response> {
        let response = request
            .bearer_auth(&self.token)
            .send()
            .map_err(|e| ReimburseError::Ledger(format!("Network error: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ReimburseError::Ledger(format!(
                "HTTP {}: {}",
                status.as_u16(),
                body
            )));
        }

        Ok(response)
    }

    fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> ReimburseResult<T> {
        let response = self.send(self.http.get(self.url(path)).query(query))?;
        response
            .json()
            .map_err(|e| ReimburseError::Ledger(format!("Failed to parse {}: {}", path, e)))
    }
}

impl Ledger for LunchMoneyClient {
    fn categories(&self) -> ReimburseResult<Vec<Category>> {
        let body: CategoriesResponse = self.get_json("categories", &[])?;
        Ok(body
            .categories
            .into_iter()
            .map(|c| Category::new(CategoryId::new(c.id), c.name))
            .collect())
    }

    fn tags(&self) -> ReimburseResult<Vec<Tag>> {
        let body: Vec<WireTag> = self.get_json("tags", &[])?;
        Ok(body
            .into_iter()
            .map(|t| Tag::new(TagId::new(t.id), t.name))
            .collect())
    }

    fn transactions(&self, query: &TransactionQuery) -> ReimburseResult<Vec<Transaction>> {
        let mut all = Vec::new();
        let mut offset = 0usize;

        loop {
            let mut params = vec![
                ("start_date", query.start_date.format("%Y-%m-%d").to_string()),
                ("end_date", query.end_date.format("%Y-%m-%d").to_string()),
                ("debit_as_negative", "false".to_string()),
                ("offset", offset.to_string()),
                ("limit", PAGE_SIZE.to_string()),
            ];
            if let Some(status) = query.status {
                params.push(("status", status.as_str().to_string()));
            }

            let page: TransactionsResponse = self.get_json("transactions", &params)?;
            let count = page.transactions.len();
            for wire in page.transactions {
                all.push(wire.into_model()?);
            }

            let more = page.has_more.unwrap_or(count == PAGE_SIZE);
            if !more || count == 0 {
                break;
            }
            offset += count;
        }

        tracing::debug!(count = all.len(), "fetched transactions from ledger");
        Ok(all)
    }

    fn transaction(&self, id: TransactionId) -> ReimburseResult<Transaction> {
        let body: Value = self.get_json(
            &format!("transactions/{}", id),
            &[("debit_as_negative", "false".to_string())],
        )?;
        if let Some(error) = body_error(&body) {
            if error.to_lowercase().contains("not found") {
                return Err(ReimburseError::transaction_not_found(id.to_string()));
            }
            return Err(ReimburseError::Ledger(error));
        }
        let wire: WireTransaction = serde_json::from_value(body).map_err(|e| {
            ReimburseError::Ledger(format!("Failed to parse transaction {}: {}", id, e))
        })?;
        wire.into_model()
    }

    fn split_transaction(
        &self,
        id: TransactionId,
        portions: &[SplitPortion],
    ) -> ReimburseResult<Vec<TransactionId>> {
        let request = SplitRequest {
            split: portions
                .iter()
                .map(|p| WireSplit {
                    date: p.date,
                    category_id: p.category_id.map(|id| id.get()),
                    notes: &p.notes,
                    amount: p.amount.to_decimal_string(),
                })
                .collect(),
        };

        let response = self.send(
            self.http
                .put(self.url(&format!("transactions/{}", id)))
                .json(&request),
        )?;
        let body: SplitResponse = response.json().map_err(|e| {
            ReimburseError::Ledger(format!("Failed to parse split response: {}", e))
        })?;

        if let Some(error) = body.error {
            return Err(ReimburseError::Ledger(format!(
                "split of {} rejected: {}",
                id, error
            )));
        }
        if body.split.len() != portions.len() {
            return Err(ReimburseError::Ledger(format!(
                "split of {} returned {} transactions, expected {}",
                id,
                body.split.len(),
                portions.len()
            )));
        }

        Ok(body.split.into_iter().map(TransactionId::new).collect())
    }

    fn create_group(&self, group: &NewTransactionGroup) -> ReimburseResult<TransactionId> {
        let request = GroupRequest {
            date: group.date,
            payee: &group.payee,
            category_id: group.category_id.get(),
            notes: &group.notes,
            transactions: group.transactions.iter().map(|id| id.get()).collect(),
        };

        let response = self.send(self.http.post(self.url("transactions/group")).json(&request))?;
        let body: Value = response.json().map_err(|e| {
            ReimburseError::Ledger(format!("Failed to parse group response: {}", e))
        })?;

        if let Some(error) = body_error(&body) {
            return Err(ReimburseError::Ledger(format!("group rejected: {}", error)));
        }

        body.as_i64()
            .or_else(|| body.get("transaction_id").and_then(Value::as_i64))
            .map(TransactionId::new)
            .ok_or_else(|| ReimburseError::Ledger(format!("unexpected group response: {}", body)))
    }
}
