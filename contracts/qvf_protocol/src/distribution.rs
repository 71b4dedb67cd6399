//! # Distribution engine
//!
//! Splits the pool across every eligible project in proportion to its voting
//! power. Two passes are required because each share depends on the total
//! power of *all* eligible projects:
//!
//! 1. Sum the power of eligible projects.
//! 2. Pay each one `floor(pool * power / total_power)`.
//!
//! Each paid project's state is committed before its transfer is attempted.
//! A failed transfer fails the call and the host discards every write made
//! by it. The flooring residue is not carried forward: the pool is reset to
//! zero once all transfers have gone through.

use soroban_sdk::{Env, Vec};

use crate::math::mul_div_floor;
use crate::registry::is_eligible_for_payout;
use crate::storage::{
    get_pool_total, get_project_count, load_project_config, load_project_state,
    save_project_state, set_pool_total,
};
use crate::types::{Payout, ProtocolConfig};
use crate::{events, treasury, Error};

/// Result of a completed pass.
pub struct Distribution {
    pub pool_before: i128,
    pub payouts: Vec<Payout>,
}

impl Distribution {
    pub fn total_paid(&self) -> i128 {
        self.payouts.iter().map(|p| p.amount).sum()
    }
}

pub fn distribute(env: &Env, protocol: &ProtocolConfig, now: u64) -> Result<Distribution, Error> {
    // Pass 1: eligible set and its total power.
    let mut eligible: Vec<(u64, i128)> = Vec::new(env);
    let mut total_power: i128 = 0;
    for id in 0..get_project_count(env) {
        let config = load_project_config(env, id)?;
        let state = load_project_state(env, id)?;
        if is_eligible_for_payout(&config, &state, now) {
            total_power = total_power
                .checked_add(state.voting_power)
                .ok_or(Error::ArithmeticOverflow)?;
            eligible.push_back((id, state.voting_power));
        }
    }

    if eligible.is_empty() {
        return Err(Error::NoEligibleProjects);
    }
    if total_power == 0 {
        return Err(Error::NoVotesCast);
    }

    // Pass 2: proportional shares.
    let pool_before = get_pool_total(env);
    let mut payouts = Vec::new(env);
    for (id, power) in eligible.iter() {
        let allocation = mul_div_floor(env, pool_before, power, total_power)?;
        if allocation == 0 {
            continue;
        }

        let config = load_project_config(env, id)?;
        let mut state = load_project_state(env, id)?;
        state.funds_withdrawn = true;
        state.is_active = false;
        save_project_state(env, id, &state);

        treasury::push(env, protocol, &config.beneficiary, allocation)?;

        events::funds_distributed(
            env,
            events::FundsDistributed {
                project_id: id,
                beneficiary: config.beneficiary.clone(),
                amount: allocation,
            },
        );
        payouts.push_back(Payout {
            project_id: id,
            beneficiary: config.beneficiary,
            amount: allocation,
        });
    }

    set_pool_total(env, 0);

    Ok(Distribution {
        pool_before,
        payouts,
    })
}
