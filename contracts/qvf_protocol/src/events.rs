//! # Events
//!
//! Every state change publishes one event. Topics are `(symbol, project_id)`
//! for project-scoped events and `(symbol,)` for protocol-wide ones; the data
//! is one of the structs below.
//!
//! | Topic       | Data                    |
//! |-------------|-------------------------|
//! | `init`      | [`Initialized`]         |
//! | `created`   | [`ProjectCreated`]      |
//! | `voted`     | [`VoteCast`]            |
//! | `pool_in`   | [`PoolFunded`]          |
//! | `paid`      | [`FundsDistributed`]    |
//! | `dist_done` | [`DistributionCompleted`] |
//! | `paused`    | [`ProjectPaused`]       |
//! | `emergency` | [`EmergencyWithdrawal`] |

use soroban_sdk::{contracttype, symbol_short, Address, Env};

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Initialized {
    pub admin: Address,
    pub token: Address,
    pub min_contribution: i128,
    pub voting_period: u64,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProjectCreated {
    pub project_id: u64,
    pub proposer: Address,
    pub beneficiary: Address,
    pub funding_goal: i128,
    pub deadline: u64,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VoteCast {
    pub project_id: u64,
    pub voter: Address,
    pub amount: i128,
    /// Voter's power in the project after this vote.
    pub voter_power: i128,
    /// Project's total power after this vote.
    pub project_power: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PoolFunded {
    pub funder: Address,
    pub amount: i128,
    pub pool_total: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FundsDistributed {
    pub project_id: u64,
    pub beneficiary: Address,
    pub amount: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DistributionCompleted {
    pub pool_before: i128,
    pub total_paid: i128,
    pub projects_paid: u32,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProjectPaused {
    pub project_id: u64,
    pub admin: Address,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EmergencyWithdrawal {
    pub admin: Address,
    pub amount: i128,
}

pub fn initialized(env: &Env, data: Initialized) {
    env.events().publish((symbol_short!("init"),), data);
}

pub fn project_created(env: &Env, data: ProjectCreated) {
    env.events()
        .publish((symbol_short!("created"), data.project_id), data);
}

pub fn vote_cast(env: &Env, data: VoteCast) {
    env.events()
        .publish((symbol_short!("voted"), data.project_id), data);
}

pub fn pool_funded(env: &Env, data: PoolFunded) {
    env.events().publish((symbol_short!("pool_in"),), data);
}

pub fn funds_distributed(env: &Env, data: FundsDistributed) {
    env.events()
        .publish((symbol_short!("paid"), data.project_id), data);
}

pub fn distribution_completed(env: &Env, data: DistributionCompleted) {
    env.events().publish((symbol_short!("dist_done"),), data);
}

pub fn project_paused(env: &Env, data: ProjectPaused) {
    env.events()
        .publish((symbol_short!("paused"), data.project_id), data);
}

pub fn emergency_withdrawal(env: &Env, data: EmergencyWithdrawal) {
    env.events().publish((symbol_short!("emergency"),), data);
}
