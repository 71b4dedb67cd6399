//! # Types
//!
//! Shared data structures used across all modules of the QVF protocol.
//!
//! ## Design decisions
//!
//! ### Config / State split
//!
//! A project is internally stored as two separate ledger entries:
//!
//! - [`ProjectConfig`] — written once at creation; never mutated.
//! - [`ProjectState`] — written on every vote, on pause and on payout.
//!
//! The public API exposes the reconstructed [`Project`] struct for convenience.
//!
//! ### Status is derived, not stored
//!
//! [`ProjectStatus`] is computed from `(is_active, funds_withdrawn, deadline)`
//! and the current ledger time:
//!
//! ```text
//! Open ──(deadline passes)──► ClosedPendingPayout ──(distribution)──► Paid
//!   └──────────(admin pause)──────────┴──► Paused
//! ```
//!
//! `Paid` and `Paused` are terminal. There is no un-pause.

use soroban_sdk::{contracttype, Address, String};

/// Lifecycle status of a project, derived at read time.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ProjectStatus {
    /// Inside the voting window; accepting votes.
    Open,
    /// Voting window closed; waiting for the next distribution pass.
    ClosedPendingPayout,
    /// Allocation transferred to the beneficiary.
    Paid,
    /// Deactivated by an administrator before being paid.
    Paused,
}

/// Deployment-time protocol parameters, written once by `init`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProtocolConfig {
    /// Token used for votes, pool inflows and payouts.
    pub token: Address,
    /// Smallest accepted single contribution, in token base units.
    pub min_contribution: i128,
    /// Length of every project's voting window, in seconds.
    pub voting_period: u64,
}

/// Immutable project configuration, written once at creation.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProjectConfig {
    pub id: u64,
    pub proposer: Address,
    pub title: String,
    pub description: String,
    pub beneficiary: Address,
    pub funding_goal: i128,
    pub created_at: u64,
    pub deadline: u64,
}

/// Mutable project state, updated on votes, pause and payout.
///
/// Kept small so that the per-vote write stays cheap.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProjectState {
    pub total_funding: i128,
    pub voting_power: i128,
    pub voter_count: u32,
    pub is_active: bool,
    pub funds_withdrawn: bool,
}

impl ProjectState {
    pub fn new() -> Self {
        Self {
            total_funding: 0,
            voting_power: 0,
            voter_count: 0,
            is_active: true,
            funds_withdrawn: false,
        }
    }
}

impl Default for ProjectState {
    fn default() -> Self {
        Self::new()
    }
}

/// Full representation of a project returned by `get_project`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Project {
    /// Sequential identifier, starting at 0.
    pub id: u64,
    /// Address that proposed the project.
    pub proposer: Address,
    pub title: String,
    pub description: String,
    /// Address that receives the project's allocation.
    pub beneficiary: Address,
    /// Informational target; never enforced as a cap.
    pub funding_goal: i128,
    /// Sum of all contributions received.
    pub total_funding: i128,
    /// Σ isqrt(cumulative contribution) over all voters.
    pub voting_power: i128,
    /// Number of distinct voters.
    pub voter_count: u32,
    pub created_at: u64,
    /// Last timestamp at which votes are accepted.
    pub deadline: u64,
    pub is_active: bool,
    pub funds_withdrawn: bool,
    /// Derived from the fields above and the ledger time of the read.
    pub status: ProjectStatus,
}

/// One voter's standing in one project.
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ContributionRecord {
    /// Cumulative amount contributed.
    pub amount: i128,
    /// Always `isqrt(amount)`.
    pub power: i128,
}

/// Returned by `cast_vote`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VoteReceipt {
    pub project_id: u64,
    /// The voter's power in this project after the vote.
    pub voter_power: i128,
    /// The project's total power after the vote.
    pub project_power: i128,
}

/// A single payout instruction produced by a distribution pass.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Payout {
    pub project_id: u64,
    pub beneficiary: Address,
    pub amount: i128,
}
