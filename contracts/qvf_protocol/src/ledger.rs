//! # Ledger
//!
//! Append-only accounting of what each voter has put into each project.
//!
//! A record only ever grows. Its cached power is recomputed from the new
//! cumulative amount on every write, so two contributions of 100 leave the
//! voter with `isqrt(200) = 14`, never `10 + 10`.

use soroban_sdk::{Address, Env};

use crate::math::voting_power;
use crate::storage::{get_voter_total, load_contribution, save_contribution, set_voter_total};
use crate::types::ContributionRecord;
use crate::Error;

/// Before/after view of a single voter × project record.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PowerChange {
    pub old_amount: i128,
    pub new_amount: i128,
    pub old_power: i128,
    pub new_power: i128,
}

impl PowerChange {
    /// Power gained by the project from this contribution.
    pub fn delta(&self) -> i128 {
        self.new_power - self.old_power
    }

    /// `true` when this contribution created the record.
    pub fn is_first(&self) -> bool {
        self.old_amount == 0
    }
}

/// Fold `amount` into the voter's record for `project_id`.
///
/// The caller has already validated the project and the minimum; this only
/// does the arithmetic and the writes. The voter's lifetime total is bumped
/// alongside.
pub fn record_contribution(
    env: &Env,
    voter: &Address,
    project_id: u64,
    amount: i128,
) -> Result<PowerChange, Error> {
    let record = load_contribution(env, project_id, voter);
    let new_amount = record
        .amount
        .checked_add(amount)
        .ok_or(Error::ArithmeticOverflow)?;

    let change = PowerChange {
        old_amount: record.amount,
        new_amount,
        old_power: voting_power(record.amount),
        new_power: voting_power(new_amount),
    };

    save_contribution(
        env,
        project_id,
        voter,
        &ContributionRecord {
            amount: new_amount,
            power: change.new_power,
        },
    );

    let lifetime = get_voter_total(env, voter)
        .checked_add(amount)
        .ok_or(Error::ArithmeticOverflow)?;
    set_voter_total(env, voter, lifetime);

    Ok(change)
}
