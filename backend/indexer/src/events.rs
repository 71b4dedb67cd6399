//! Canonical event types emitted by the QVF protocol contract.
//!
//! These mirror the Soroban contract events defined in
//! `contracts/qvf_protocol/src/events.rs`.

use serde::{Deserialize, Serialize};

/// All recognised event kinds from the QVF contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// Contract initialised (`init` topic).
    Initialized,
    /// A new project was proposed (`created` topic).
    ProjectCreated,
    /// A voter contributed to a project (`voted` topic).
    VoteCast,
    /// Funds were added to the pool without a vote (`pool_in` topic).
    PoolFunded,
    /// A project's allocation was paid out (`paid` topic).
    FundsDistributed,
    /// A distribution pass finished (`dist_done` topic).
    DistributionCompleted,
    /// An admin paused a project (`paused` topic).
    ProjectPaused,
    /// An admin drained the contract (`emergency` topic).
    EmergencyWithdrawal,
    /// An event from this contract that we don't recognise yet.
    Unknown,
}

impl EventKind {
    /// Parse the leading topic symbol string produced by Soroban into an [`EventKind`].
    pub fn from_topic(topic: &str) -> Self {
        match topic {
            "init" => Self::Initialized,
            "created" => Self::ProjectCreated,
            "voted" => Self::VoteCast,
            "pool_in" => Self::PoolFunded,
            "paid" => Self::FundsDistributed,
            "dist_done" => Self::DistributionCompleted,
            "paused" => Self::ProjectPaused,
            "emergency" => Self::EmergencyWithdrawal,
            _ => Self::Unknown,
        }
    }

    /// Return a short identifier string suitable for storage in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Initialized => "initialized",
            Self::ProjectCreated => "project_created",
            Self::VoteCast => "vote_cast",
            Self::PoolFunded => "pool_funded",
            Self::FundsDistributed => "funds_distributed",
            Self::DistributionCompleted => "distribution_completed",
            Self::ProjectPaused => "project_paused",
            Self::EmergencyWithdrawal => "emergency_withdrawal",
            Self::Unknown => "unknown",
        }
    }
}

/// A fully decoded QVF event, ready to be stored in the database.
///
/// Amounts and powers are kept as decimal strings: they are `i128` on chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QvfEvent {
    pub event_type: String,
    pub project_id: Option<String>,
    pub actor: Option<String>,
    pub amount: Option<String>,
    /// Project power after a vote.
    pub power: Option<String>,
    pub ledger: i64,
    pub timestamp: i64,
    pub contract_id: String,
    pub tx_hash: Option<String>,
    /// Unique per on-chain event; makes re-indexing idempotent.
    pub event_key: String,
}

/// A raw event record as stored in / read from the database.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct EventRecord {
    pub id: i64,
    pub event_type: String,
    pub project_id: Option<String>,
    pub actor: Option<String>,
    pub amount: Option<String>,
    pub power: Option<String>,
    pub ledger: i64,
    pub timestamp: i64,
    pub contract_id: String,
    pub tx_hash: Option<String>,
    pub created_at: i64,
}

/// Per-project aggregates rebuilt from indexed events.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSummary {
    pub project_id: String,
    pub vote_count: u64,
    pub distinct_voters: u64,
    pub total_contributed: i128,
    /// Power reported by the most recent vote, if any.
    pub latest_power: Option<i128>,
    pub total_paid: i128,
    pub paused: bool,
}

impl ProjectSummary {
    /// Fold a project's events, oldest first, into a summary.
    pub fn from_events(project_id: &str, events: &[EventRecord]) -> Self {
        let mut summary = ProjectSummary {
            project_id: project_id.to_string(),
            ..Default::default()
        };
        let mut voters = std::collections::HashSet::new();

        for ev in events {
            let amount = parse_amount(ev.amount.as_deref());
            match EventKind::from_stored(&ev.event_type) {
                Some(EventKind::VoteCast) => {
                    summary.vote_count += 1;
                    summary.total_contributed += amount;
                    if let Some(actor) = &ev.actor {
                        voters.insert(actor.clone());
                    }
                    if let Some(power) = ev.power.as_deref().and_then(|p| p.parse().ok()) {
                        summary.latest_power = Some(power);
                    }
                }
                Some(EventKind::FundsDistributed) => summary.total_paid += amount,
                Some(EventKind::ProjectPaused) => summary.paused = true,
                _ => {}
            }
        }

        summary.distinct_voters = voters.len() as u64;
        summary
    }
}

impl EventKind {
    const ALL: [EventKind; 9] = [
        Self::Initialized,
        Self::ProjectCreated,
        Self::VoteCast,
        Self::PoolFunded,
        Self::FundsDistributed,
        Self::DistributionCompleted,
        Self::ProjectPaused,
        Self::EmergencyWithdrawal,
        Self::Unknown,
    ];

    /// Inverse of [`EventKind::as_str`].
    pub fn from_stored(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == s)
    }
}

fn parse_amount(raw: Option<&str>) -> i128 {
    raw.and_then(|s| s.parse().ok()).unwrap_or(0)
}
