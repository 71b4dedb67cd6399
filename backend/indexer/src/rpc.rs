//! Soroban RPC client — polls `getEvents` and decodes QVF events.
//!
//! Events are requested with `xdrFormat: "json"`, so topics and data arrive
//! as JSON-rendered `ScVal`s (`{"symbol":"voted"}`, `{"u64":"3"}`, `{"map":[…]}`).
//! The decoder also accepts the flatter `{"type":…,"value":…}` and plain
//! string shapes some RPC proxies produce.
//!
//! ## Resilience
//!
//! * Exponential back-off is applied when the RPC returns a soft error, a
//!   rate-limit or a 5xx response, up to [`MAX_BACKOFF_SECS`] seconds.
//! * Transient network errors (connection reset, timeout) are retried silently.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::errors::{IndexerError, Result};
use crate::events::{EventKind, QvfEvent};

const MAX_BACKOFF_SECS: u64 = 60;
const INITIAL_BACKOFF_SECS: u64 = 2;

// ─────────────────────────────────────────────────────────
// JSON-RPC response shapes
// ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RpcResponse {
    pub result: Option<EventsResult>,
    pub error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct EventsResult {
    pub events: Vec<RawEvent>,
    pub cursor: Option<String>,
    #[serde(rename = "latestLedger")]
    pub latest_ledger: Option<u64>,
}

#[derive(Debug, Deserialize, Clone)]
#[allow(dead_code)]
pub struct RawEvent {
    /// Topic list, JSON-rendered
    #[serde(alias = "topicJson")]
    pub topic: Vec<Value>,
    /// Event data, JSON-rendered
    #[serde(alias = "valueJson")]
    pub value: Value,
    #[serde(rename = "contractId")]
    pub contract_id: Option<String>,
    #[serde(rename = "txHash")]
    pub tx_hash: Option<String>,
    pub id: Option<String>,
    pub ledger: Option<u64>,
    #[serde(rename = "ledgerClosedAt")]
    pub ledger_closed_at: Option<String>,
    #[serde(rename = "inSuccessfulContractCall")]
    pub in_successful_contract_call: Option<bool>,
    #[serde(rename = "pagingToken")]
    pub paging_token: Option<String>,
}

// ─────────────────────────────────────────────────────────
// Public API
// ─────────────────────────────────────────────────────────

/// Fetch a page of events from the RPC.
///
/// * `start_ledger` — the ledger sequence to scan from (inclusive).
/// * `cursor`       — optional opaque pagination cursor from a previous response.
/// * `limit`        — maximum number of events to return.
///
/// Returns `(events, next_cursor, latest_ledger)`.
pub async fn fetch_events(
    client: &Client,
    rpc_url: &str,
    contract_id: &str,
    start_ledger: u32,
    cursor: Option<&str>,
    limit: u32,
) -> Result<(Vec<RawEvent>, Option<String>, Option<u64>)> {
    let mut backoff = Backoff::new();

    loop {
        let params = build_params(contract_id, start_ledger, cursor, limit);

        let response = client
            .post(rpc_url)
            .json(&json!({
                "jsonrpc": "2.0",
                "id": 1,
                "method": "getEvents",
                "params": params,
            }))
            .send()
            .await;

        let resp = match response {
            Err(e) => {
                warn!("RPC request failed (will retry in {}s): {e}", backoff.secs);
                backoff.wait().await;
                continue;
            }
            Ok(resp) => resp,
        };

        if is_retryable_status(resp.status()) {
            warn!(
                "RPC returned {} (will retry in {}s)",
                resp.status(),
                backoff.secs
            );
            backoff.wait().await;
            continue;
        }

        let body: RpcResponse = resp.json().await?;

        if let Some(err) = body.error {
            if is_hard_error(err.code) {
                return Err(IndexerError::Rpc {
                    code: err.code,
                    message: err.message,
                });
            }
            warn!(
                "RPC soft error (will retry in {}s): {} {}",
                backoff.secs, err.code, err.message
            );
            backoff.wait().await;
            continue;
        }

        let result = body.result.ok_or_else(|| {
            IndexerError::EventParse("Empty result from getEvents".to_string())
        })?;

        debug!(
            "Fetched {} events (latest_ledger={:?})",
            result.events.len(),
            result.latest_ledger
        );

        return Ok((result.events, result.cursor, result.latest_ledger));
    }
}

/// Rate limits and 5xx answers (often HTML or empty bodies from a proxy)
/// are transient.
fn is_retryable_status(status: reqwest::StatusCode) -> bool {
    status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

/// Invalid request / unknown method / invalid params will not improve on retry.
fn is_hard_error(code: i64) -> bool {
    matches!(code, -32600 | -32601 | -32602)
}

struct Backoff {
    secs: u64,
}

impl Backoff {
    fn new() -> Self {
        Self {
            secs: INITIAL_BACKOFF_SECS,
        }
    }

    async fn wait(&mut self) {
        tokio::time::sleep(Duration::from_secs(self.secs)).await;
        self.secs = (self.secs * 2).min(MAX_BACKOFF_SECS);
    }
}

fn build_params(contract_id: &str, start_ledger: u32, cursor: Option<&str>, limit: u32) -> Value {
    let mut params = json!({
        "filters": [
            {
                "type": "contract",
                "contractIds": [contract_id]
            }
        ],
        "pagination": {
            "limit": limit
        },
        "xdrFormat": "json"
    });

    if let Some(cur) = cursor {
        params["pagination"]["cursor"] = json!(cur);
    } else {
        params["startLedger"] = json!(start_ledger);
    }

    params
}

// ─────────────────────────────────────────────────────────
// Event decoding
// ─────────────────────────────────────────────────────────

/// Decode a list of raw RPC events into [`QvfEvent`] structs.
///
/// Events from failed invocations are dropped: their state changes were
/// rolled back on chain.
pub fn decode_events(raw: &[RawEvent], contract_id: &str) -> Vec<QvfEvent> {
    raw.iter()
        .enumerate()
        .filter(|(_, e)| e.in_successful_contract_call != Some(false))
        .filter_map(|(idx, e)| decode_single(e, contract_id, idx))
        .collect()
}

fn decode_single(raw: &RawEvent, contract_id: &str, idx: usize) -> Option<QvfEvent> {
    // Extract leading topic symbol to determine event type.
    let first_topic = raw.topic.first()?;
    let kind = EventKind::from_topic(&extract_symbol(first_topic));

    let ledger = raw.ledger.unwrap_or(0) as i64;
    let timestamp = raw
        .ledger_closed_at
        .as_deref()
        .and_then(parse_iso_to_unix)
        .unwrap_or(0);

    let project_id = raw
        .topic
        .get(1)
        .map(extract_scalar)
        .or_else(|| extract_field(&raw.value, &["project_id"]));

    let data = decode_data(&raw.value, kind);

    // `id` and `pagingToken` are globally unique; the positional key is a
    // last resort for proxies that strip both.
    let event_key = raw
        .id
        .clone()
        .or_else(|| raw.paging_token.clone())
        .unwrap_or_else(|| {
            format!(
                "{}:{}:{}:{}",
                ledger,
                raw.tx_hash.as_deref().unwrap_or("-"),
                kind.as_str(),
                idx
            )
        });

    Some(QvfEvent {
        event_type: kind.as_str().to_string(),
        project_id,
        actor: data.actor,
        amount: data.amount,
        power: data.power,
        ledger,
        timestamp,
        contract_id: raw
            .contract_id
            .clone()
            .unwrap_or_else(|| contract_id.to_string()),
        tx_hash: raw.tx_hash.clone(),
        event_key,
    })
}

#[derive(Debug, Default, PartialEq)]
struct EventData {
    actor: Option<String>,
    amount: Option<String>,
    power: Option<String>,
}

/// Pull the interesting fields out of an event's data struct.
fn decode_data(value: &Value, kind: EventKind) -> EventData {
    match kind {
        EventKind::Initialized => EventData {
            actor: extract_field(value, &["admin"]),
            amount: extract_field(value, &["min_contribution"]),
            power: None,
        },
        EventKind::ProjectCreated => EventData {
            actor: extract_field(value, &["proposer", "beneficiary"]),
            amount: extract_field(value, &["funding_goal"]),
            power: None,
        },
        EventKind::VoteCast => EventData {
            actor: extract_field(value, &["voter"]),
            amount: extract_field(value, &["amount"]),
            power: extract_field(value, &["project_power"]),
        },
        EventKind::PoolFunded => EventData {
            actor: extract_field(value, &["funder"]),
            amount: extract_field(value, &["amount"]),
            power: None,
        },
        EventKind::FundsDistributed => EventData {
            actor: extract_field(value, &["beneficiary"]),
            amount: extract_field(value, &["amount"]),
            power: None,
        },
        EventKind::DistributionCompleted => EventData {
            actor: None,
            amount: extract_field(value, &["total_paid"]),
            power: None,
        },
        EventKind::ProjectPaused | EventKind::EmergencyWithdrawal => EventData {
            actor: extract_field(value, &["admin"]),
            amount: extract_field(value, &["amount"]),
            power: None,
        },
        EventKind::Unknown => EventData::default(),
    }
}

/// Look up the first present key, in either a flat JSON object or an
/// `ScVal` map (`{"map":[{"key":{"symbol":k},"val":…}]}`).
fn extract_field(value: &Value, keys: &[&str]) -> Option<String> {
    for key in keys {
        let found = value.get(key).or_else(|| scval_map_get(value, key));
        if let Some(s) = found.and_then(scalar_to_string) {
            return Some(s);
        }
    }
    None
}

fn scval_map_get<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    value
        .get("map")?
        .as_array()?
        .iter()
        .find(|entry| {
            entry
                .get("key")
                .map(|k| scalar_to_string(k).as_deref() == Some(key))
                .unwrap_or(false)
        })?
        .get("val")
}

/// Render a scalar `ScVal` as a string: plain strings and numbers as-is,
/// single-entry wrappers like `{"i128":"5"}` or `{"type":"u64","value":5}`
/// by unwrapping.
fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Object(map) => {
            if let Some(inner) = map.get("value") {
                return scalar_to_string(inner);
            }
            if map.len() == 1 {
                let (_, inner) = map.iter().next()?;
                return scalar_to_string(inner);
            }
            None
        }
        _ => None,
    }
}

/// Extract a Soroban Symbol from a topic entry. Topics may arrive as
/// `{"symbol":"voted"}`, `{"type":"symbol","value":"voted"}`, a string
/// holding either of those, or the bare symbol.
fn extract_symbol(raw: &Value) -> String {
    extract_scalar(raw)
}

/// Extract a scalar topic entry (symbol or project id) as a string.
fn extract_scalar(raw: &Value) -> String {
    if let Value::String(s) = raw {
        if let Ok(parsed) = serde_json::from_str::<Value>(s) {
            if parsed.is_object() {
                return extract_scalar(&parsed);
            }
        }
        return s.clone();
    }
    scalar_to_string(raw).unwrap_or_else(|| raw.to_string())
}

/// Parse an ISO-8601 timestamp string into a Unix epoch (seconds).
fn parse_iso_to_unix(s: &str) -> Option<i64> {
    use chrono::DateTime;
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.timestamp())
}

// ─────────────────────────────────────────────────────────
// Unit tests
// ─────────────────────────────────────────────────────────
