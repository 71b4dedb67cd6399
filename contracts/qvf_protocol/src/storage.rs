//! # Storage
//!
//! Provides typed helpers over Soroban's storage tiers used by QVF:
//!
//! ## Instance storage (contract-lifetime TTL)
//!
//! | Key              | Type             | Description                         |
//! |------------------|------------------|-------------------------------------|
//! | `Admin`          | `Address`        | Administrator capability holder     |
//! | `Config`         | `ProtocolConfig` | Token, minimum, voting period       |
//! | `ProjectCount`   | `u64`            | Auto-increment project ID counter   |
//! | `PoolTotal`      | `i128`           | Undistributed funds                 |
//! | `Locked`         | `bool`           | Call-in-progress flag               |
//!
//! Instance TTL is bumped by **7 days** whenever it falls below 1 day remaining.
//!
//! ## Persistent storage (per-entry TTL)
//!
//! | Key                       | Type                 | Description                  |
//! |---------------------------|----------------------|------------------------------|
//! | `ProjConfig(id)`          | `ProjectConfig`      | Immutable project data       |
//! | `ProjState(id)`           | `ProjectState`       | Mutable project data         |
//! | `Contribution(id, voter)` | `ContributionRecord` | Voter's standing in project  |
//! | `VoterTotal(voter)`       | `i128`               | Lifetime contributions       |
//!
//! Persistent TTL is bumped by **30 days** whenever it falls below 7 days remaining.
//!
//! ## Why split Config and State?
//!
//! Votes are high-frequency writes. Rewriting the title and description on every
//! vote would be wasteful; `ProjectState` holds only the counters and flags that
//! a vote, a pause or a payout actually touch.

use soroban_sdk::{contracttype, Address, Env};

use crate::types::{ContributionRecord, ProjectConfig, ProjectState, ProtocolConfig};
use crate::Error;

// ── TTL Constants ────────────────────────────────────────────────────

/// Approximate ledgers per day (~5 seconds per ledger).
const DAY_IN_LEDGERS: u32 = 17_280;

/// Instance storage: bump by 7 days when below 1 day remaining.
const INSTANCE_BUMP_AMOUNT: u32 = 7 * DAY_IN_LEDGERS;
const INSTANCE_LIFETIME_THRESHOLD: u32 = DAY_IN_LEDGERS;

/// Persistent storage: bump by 30 days when below 7 days remaining.
const PERSISTENT_BUMP_AMOUNT: u32 = 30 * DAY_IN_LEDGERS;
const PERSISTENT_LIFETIME_THRESHOLD: u32 = 7 * DAY_IN_LEDGERS;

// ── Storage Keys ─────────────────────────────────────────────────────

/// All contract storage keys.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DataKey {
    /// Administrator address (Instance).
    Admin,
    /// Protocol parameters (Instance).
    Config,
    /// Global auto-increment counter for project IDs (Instance).
    ProjectCount,
    /// Undistributed pool balance (Instance).
    PoolTotal,
    /// Call-in-progress flag (Instance).
    Locked,
    /// Immutable project configuration keyed by ID (Persistent).
    ProjConfig(u64),
    /// Mutable project state keyed by ID (Persistent).
    ProjState(u64),
    /// Contribution record keyed by (project ID, voter) (Persistent).
    Contribution(u64, Address),
    /// Lifetime contribution total keyed by voter (Persistent).
    VoterTotal(Address),
}

// ── Instance Storage Helpers ─────────────────────────────────────────

/// Extend instance storage TTL if it falls below the threshold.
fn bump_instance(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_LIFETIME_THRESHOLD, INSTANCE_BUMP_AMOUNT);
}

pub fn is_initialized(env: &Env) -> bool {
    env.storage().instance().has(&DataKey::Admin)
}

pub fn set_admin(env: &Env, admin: &Address) {
    env.storage().instance().set(&DataKey::Admin, admin);
    bump_instance(env);
}

pub fn get_admin(env: &Env) -> Result<Address, Error> {
    bump_instance(env);
    env.storage()
        .instance()
        .get(&DataKey::Admin)
        .ok_or(Error::NotInitialized)
}

pub fn set_config(env: &Env, config: &ProtocolConfig) {
    env.storage().instance().set(&DataKey::Config, config);
    bump_instance(env);
}

pub fn get_config(env: &Env) -> Result<ProtocolConfig, Error> {
    bump_instance(env);
    env.storage()
        .instance()
        .get(&DataKey::Config)
        .ok_or(Error::NotInitialized)
}

/// Atomically reads, increments, and stores the project counter.
/// Returns the ID to use for the *current* project (pre-increment value).
pub fn get_and_increment_project_id(env: &Env) -> u64 {
    bump_instance(env);
    let current = get_project_count(env);
    env.storage()
        .instance()
        .set(&DataKey::ProjectCount, &(current + 1));
    current
}

/// Number of projects ever created; also the next ID to be assigned.
pub fn get_project_count(env: &Env) -> u64 {
    env.storage()
        .instance()
        .get(&DataKey::ProjectCount)
        .unwrap_or(0)
}

pub fn get_pool_total(env: &Env) -> i128 {
    env.storage()
        .instance()
        .get(&DataKey::PoolTotal)
        .unwrap_or(0)
}

pub fn set_pool_total(env: &Env, total: i128) {
    env.storage().instance().set(&DataKey::PoolTotal, &total);
    bump_instance(env);
}

pub fn is_locked(env: &Env) -> bool {
    env.storage()
        .instance()
        .get(&DataKey::Locked)
        .unwrap_or(false)
}

pub fn set_locked(env: &Env, locked: bool) {
    if locked {
        env.storage().instance().set(&DataKey::Locked, &true);
    } else {
        env.storage().instance().remove(&DataKey::Locked);
    }
}

// ── Persistent Storage Helpers ───────────────────────────────────────

/// Extend the TTL for a persistent storage key.
fn bump_persistent(env: &Env, key: &DataKey) {
    env.storage()
        .persistent()
        .extend_ttl(key, PERSISTENT_LIFETIME_THRESHOLD, PERSISTENT_BUMP_AMOUNT);
}

/// Save both the immutable config and initial mutable state for a new project.
pub fn save_project(env: &Env, config: &ProjectConfig, state: &ProjectState) {
    let config_key = DataKey::ProjConfig(config.id);
    let state_key = DataKey::ProjState(config.id);

    env.storage().persistent().set(&config_key, config);
    env.storage().persistent().set(&state_key, state);
    bump_persistent(env, &config_key);
    bump_persistent(env, &state_key);
}

/// Load only the immutable project configuration.
pub fn load_project_config(env: &Env, id: u64) -> Result<ProjectConfig, Error> {
    let key = DataKey::ProjConfig(id);
    let config: ProjectConfig = env
        .storage()
        .persistent()
        .get(&key)
        .ok_or(Error::InvalidProjectId)?;
    bump_persistent(env, &key);
    Ok(config)
}

/// Load only the mutable project state.
pub fn load_project_state(env: &Env, id: u64) -> Result<ProjectState, Error> {
    let key = DataKey::ProjState(id);
    let state: ProjectState = env
        .storage()
        .persistent()
        .get(&key)
        .ok_or(Error::InvalidProjectId)?;
    bump_persistent(env, &key);
    Ok(state)
}

/// Save only the mutable project state (votes, pause, payout).
pub fn save_project_state(env: &Env, id: u64, state: &ProjectState) {
    let key = DataKey::ProjState(id);
    env.storage().persistent().set(&key, state);
    bump_persistent(env, &key);
}

/// Load a voter's record for a project; absent records read as zero.
pub fn load_contribution(env: &Env, project_id: u64, voter: &Address) -> ContributionRecord {
    let key = DataKey::Contribution(project_id, voter.clone());
    match env.storage().persistent().get(&key) {
        Some(record) => {
            bump_persistent(env, &key);
            record
        }
        None => ContributionRecord::default(),
    }
}

pub fn save_contribution(env: &Env, project_id: u64, voter: &Address, record: &ContributionRecord) {
    let key = DataKey::Contribution(project_id, voter.clone());
    env.storage().persistent().set(&key, record);
    bump_persistent(env, &key);
}

pub fn get_voter_total(env: &Env, voter: &Address) -> i128 {
    env.storage()
        .persistent()
        .get(&DataKey::VoterTotal(voter.clone()))
        .unwrap_or(0)
}

pub fn set_voter_total(env: &Env, voter: &Address, total: i128) {
    let key = DataKey::VoterTotal(voter.clone());
    env.storage().persistent().set(&key, &total);
    bump_persistent(env, &key);
}
