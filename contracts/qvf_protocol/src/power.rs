//! # Voting power accumulator
//!
//! A project's power is `Σ isqrt(cumulative(voter, project))` over its voters.
//! It is maintained by adding the per-contribution delta reported by the
//! ledger, so a vote costs O(1) regardless of how many voters came before.
//! By induction over contributions the cached value always equals the sum.

use crate::ledger::PowerChange;
use crate::types::ProjectState;
use crate::Error;

/// Add a signed power delta to the project's cached total.
pub fn apply_delta(state: &mut ProjectState, delta: i128) -> Result<(), Error> {
    state.voting_power = state
        .voting_power
        .checked_add(delta)
        .ok_or(Error::ArithmeticOverflow)?;
    Ok(())
}

/// Fold one ledger write into the project's aggregates.
pub fn apply_contribution(
    state: &mut ProjectState,
    change: &PowerChange,
    amount: i128,
) -> Result<(), Error> {
    apply_delta(state, change.delta())?;
    state.total_funding = state
        .total_funding
        .checked_add(amount)
        .ok_or(Error::ArithmeticOverflow)?;
    if change.is_first() {
        state.voter_count += 1;
    }
    Ok(())
}

/// Full rescan of the given voters' records. Only used to check the cached
/// value in tests; never on the vote path.
#[cfg(test)]
pub fn recompute_power(
    env: &soroban_sdk::Env,
    project_id: u64,
    voters: &[soroban_sdk::Address],
) -> i128 {
    voters
        .iter()
        .map(|voter| {
            let record = crate::storage::load_contribution(env, project_id, voter);
            crate::math::voting_power(record.amount)
        })
        .sum()
}
