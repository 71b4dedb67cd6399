//! # QVF Protocol Contract
//!
//! This is the root crate of the **Quadratic Voting Fund (QVF)**. Contributors
//! vote for projects with tokens; a voter's influence on a project is the
//! integer square root of everything they have put into it. Once a project's
//! voting window closes, the pool is split across closed projects in
//! proportion to their voting power.
//!
//! | Phase        | Entry Point(s)                                        |
//! |--------------|-------------------------------------------------------|
//! | Bootstrap    | [`QvfProtocol::init`]                                 |
//! | Proposals    | [`QvfProtocol::create_project`]                       |
//! | Funding      | [`QvfProtocol::cast_vote`], [`QvfProtocol::fund_pool`] |
//! | Payout       | [`QvfProtocol::distribute_funds`]                     |
//! | Admin        | `pause_project`, `emergency_withdraw`                 |
//! | Queries      | `get_project`, `get_user_vote`, `get_active_projects`, ... |
//!
//! ## Architecture
//!
//! Vote accounting lives in [`ledger`] and [`power`], project lifecycle in
//! [`registry`], the payout split in [`distribution`]. Storage access is fully
//! delegated to [`storage`]. This file contains **only** the public entry
//! points, input validation ordering and event emissions.
//!
//! Every mutating entry point runs under [`guard::non_reentrant`] and returns
//! `Result<_, Error>`; any `Err` aborts the invocation and the host discards
//! its writes.

#![no_std]

use soroban_sdk::{contract, contracterror, contractimpl, Address, Env, String, Vec};

mod access;
mod distribution;
pub mod events;
mod guard;
mod ledger;
pub mod math;
mod power;
mod registry;
mod storage;
mod treasury;
mod types;

#[cfg(test)]
extern crate std;

#[cfg(test)]
mod invariants;
#[cfg(test)]
mod test_distribution;
#[cfg(test)]
mod test_events;

pub use types::{
    ContributionRecord, Payout, Project, ProjectStatus, ProtocolConfig, VoteReceipt,
};

/// Default length of a project's voting window: seven days.
pub const DEFAULT_VOTING_PERIOD: u64 = 7 * 24 * 60 * 60;

/// Default smallest accepted contribution, in token base units.
pub const DEFAULT_MIN_CONTRIBUTION: i128 = 100;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    AlreadyInitialized  = 1,
    NotInitialized      = 2,
    InvalidConfig       = 3,
    EmptyField          = 4,
    InvalidBeneficiary  = 5,
    ZeroGoal            = 6,
    InvalidProjectId    = 7,
    BelowMinimum        = 8,
    ProjectInactive     = 9,
    DeadlinePassed      = 10,
    InvalidAmount       = 11,
    Unauthorized        = 12,
    NoEligibleProjects  = 13,
    NoVotesCast         = 14,
    TransferFailed      = 15,
    Reentrancy          = 16,
    ArithmeticOverflow  = 17,
}

#[contract]
pub struct QvfProtocol;

#[contractimpl]
impl QvfProtocol {
    // ─────────────────────────────────────────────────────────
    // Initialisation
    // ─────────────────────────────────────────────────────────

    /// Initialise the contract.
    ///
    /// Must be called exactly once immediately after deployment.
    ///
    /// - `admin` must sign and becomes the only address accepted by admin entry points.
    /// - `token` is the asset used for votes, pool inflows and payouts.
    /// - `min_contribution` and `voting_period` must both be positive.
    pub fn init(
        env: Env,
        admin: Address,
        token: Address,
        min_contribution: i128,
        voting_period: u64,
    ) -> Result<(), Error> {
        admin.require_auth();
        if storage::is_initialized(&env) {
            return Err(Error::AlreadyInitialized);
        }
        if min_contribution <= 0 || voting_period == 0 {
            return Err(Error::InvalidConfig);
        }

        let config = ProtocolConfig {
            token: token.clone(),
            min_contribution,
            voting_period,
        };
        storage::set_admin(&env, &admin);
        storage::set_config(&env, &config);
        storage::set_pool_total(&env, 0);

        events::initialized(
            &env,
            events::Initialized {
                admin,
                token,
                min_contribution,
                voting_period,
            },
        );
        Ok(())
    }

    // ─────────────────────────────────────────────────────────
    // Proposals and votes
    // ─────────────────────────────────────────────────────────

    /// Propose a project. Its voting window opens immediately.
    pub fn create_project(
        env: Env,
        proposer: Address,
        title: String,
        description: String,
        beneficiary: Address,
        funding_goal: i128,
    ) -> Result<u64, Error> {
        proposer.require_auth();
        let protocol = storage::get_config(&env)?;

        guard::non_reentrant(&env, || {
            let now = env.ledger().timestamp();
            let config = registry::create(
                &env,
                &protocol,
                proposer,
                title,
                description,
                beneficiary,
                funding_goal,
                now,
            )?;

            events::project_created(
                &env,
                events::ProjectCreated {
                    project_id: config.id,
                    proposer: config.proposer,
                    beneficiary: config.beneficiary,
                    funding_goal: config.funding_goal,
                    deadline: config.deadline,
                },
            );
            Ok(config.id)
        })
    }

    /// Vote for a project by contributing `amount` tokens.
    ///
    /// The whole amount joins the pool. The voter's power in the project is
    /// recomputed from their new cumulative contribution and the project's
    /// power moves by the difference.
    pub fn cast_vote(
        env: Env,
        voter: Address,
        project_id: u64,
        amount: i128,
    ) -> Result<VoteReceipt, Error> {
        voter.require_auth();
        let protocol = storage::get_config(&env)?;

        guard::non_reentrant(&env, || {
            let now = env.ledger().timestamp();
            let config = storage::load_project_config(&env, project_id)?;
            if amount < protocol.min_contribution {
                return Err(Error::BelowMinimum);
            }
            let mut state = storage::load_project_state(&env, project_id)?;
            registry::ensure_open(&config, &state, now)?;

            let pool = storage::get_pool_total(&env)
                .checked_add(amount)
                .ok_or(Error::ArithmeticOverflow)?;

            let change = ledger::record_contribution(&env, &voter, project_id, amount)?;
            power::apply_contribution(&mut state, &change, amount)?;
            storage::save_project_state(&env, project_id, &state);
            storage::set_pool_total(&env, pool);

            treasury::pull(&env, &protocol, &voter, amount)?;

            events::vote_cast(
                &env,
                events::VoteCast {
                    project_id,
                    voter,
                    amount,
                    voter_power: change.new_power,
                    project_power: state.voting_power,
                },
            );
            Ok(VoteReceipt {
                project_id,
                voter_power: change.new_power,
                project_power: state.voting_power,
            })
        })
    }

    /// Add funds to the pool without voting for anything.
    ///
    /// Returns the new pool total.
    pub fn fund_pool(env: Env, funder: Address, amount: i128) -> Result<i128, Error> {
        funder.require_auth();
        let protocol = storage::get_config(&env)?;
        if amount <= 0 {
            return Err(Error::InvalidAmount);
        }

        guard::non_reentrant(&env, || {
            let pool = storage::get_pool_total(&env)
                .checked_add(amount)
                .ok_or(Error::ArithmeticOverflow)?;
            storage::set_pool_total(&env, pool);

            treasury::pull(&env, &protocol, &funder, amount)?;

            events::pool_funded(
                &env,
                events::PoolFunded {
                    funder,
                    amount,
                    pool_total: pool,
                },
            );
            Ok(pool)
        })
    }

    // ─────────────────────────────────────────────────────────
    // Payout
    // ─────────────────────────────────────────────────────────

    /// Split the pool across every project whose voting window has closed.
    ///
    /// Anyone may trigger a pass. Fails with `NoEligibleProjects` when no
    /// project is closed and unpaid, and with `NoVotesCast` when the eligible
    /// projects hold no voting power.
    pub fn distribute_funds(env: Env) -> Result<Vec<Payout>, Error> {
        let protocol = storage::get_config(&env)?;

        guard::non_reentrant(&env, || {
            let now = env.ledger().timestamp();
            let outcome = distribution::distribute(&env, &protocol, now)?;

            events::distribution_completed(
                &env,
                events::DistributionCompleted {
                    pool_before: outcome.pool_before,
                    total_paid: outcome.total_paid(),
                    projects_paid: outcome.payouts.len(),
                },
            );
            Ok(outcome.payouts)
        })
    }

    // ─────────────────────────────────────────────────────────
    // Administration
    // ─────────────────────────────────────────────────────────

    /// Permanently remove a project from distribution eligibility.
    ///
    /// Applies regardless of deadline or funding state. Pausing a project
    /// that is already paused or paid changes nothing.
    pub fn pause_project(env: Env, admin: Address, project_id: u64) -> Result<(), Error> {
        access::require_admin(&env, &admin)?;

        guard::non_reentrant(&env, || {
            registry::pause(&env, project_id)?;
            events::project_paused(&env, events::ProjectPaused { project_id, admin });
            Ok(())
        })
    }

    /// Send the contract's entire token balance to the admin and zero the pool.
    ///
    /// Returns the amount withdrawn.
    pub fn emergency_withdraw(env: Env, admin: Address) -> Result<i128, Error> {
        access::require_admin(&env, &admin)?;
        let protocol = storage::get_config(&env)?;

        guard::non_reentrant(&env, || {
            let amount = treasury::balance(&env, &protocol);
            storage::set_pool_total(&env, 0);
            if amount > 0 {
                treasury::push(&env, &protocol, &admin, amount)?;
            }
            events::emergency_withdrawal(&env, events::EmergencyWithdrawal { admin, amount });
            Ok(amount)
        })
    }

    // ─────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────

    /// Retrieve a project by its ID.
    pub fn get_project(env: Env, project_id: u64) -> Result<Project, Error> {
        registry::load(&env, project_id, env.ledger().timestamp())
    }

    /// A voter's cumulative contribution and power in one project.
    pub fn get_user_vote(env: Env, voter: Address, project_id: u64) -> Result<ContributionRecord, Error> {
        storage::load_project_config(&env, project_id)?;
        Ok(storage::load_contribution(&env, project_id, &voter))
    }

    /// IDs of projects that are active and still inside their voting window.
    pub fn get_active_projects(env: Env) -> Result<Vec<u64>, Error> {
        registry::active_project_ids(&env, env.ledger().timestamp())
    }

    /// Whether the next distribution pass would include this project.
    pub fn is_eligible(env: Env, project_id: u64) -> Result<bool, Error> {
        let config = storage::load_project_config(&env, project_id)?;
        let state = storage::load_project_state(&env, project_id)?;
        Ok(registry::is_eligible_for_payout(
            &config,
            &state,
            env.ledger().timestamp(),
        ))
    }

    pub fn get_pool_total(env: Env) -> i128 {
        storage::get_pool_total(&env)
    }

    /// Lifetime contributions of `voter` across all projects.
    pub fn get_voter_total(env: Env, voter: Address) -> i128 {
        storage::get_voter_total(&env, &voter)
    }

    pub fn get_project_count(env: Env) -> u64 {
        storage::get_project_count(&env)
    }

    pub fn get_config(env: Env) -> Result<ProtocolConfig, Error> {
        storage::get_config(&env)
    }

    pub fn get_admin(env: Env) -> Result<Address, Error> {
        storage::get_admin(&env)
    }
}
