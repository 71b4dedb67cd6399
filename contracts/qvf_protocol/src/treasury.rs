//! Token movements in and out of the contract.
//!
//! These are the only calls that leave the contract. Failures are checked and
//! surfaced as [`Error::TransferFailed`] instead of trapping, so callers keep
//! a typed error.

use soroban_sdk::{token, Address, Env};

use crate::types::ProtocolConfig;
use crate::Error;

/// Move `amount` from `from` into the contract.
pub fn pull(env: &Env, config: &ProtocolConfig, from: &Address, amount: i128) -> Result<(), Error> {
    let client = token::Client::new(env, &config.token);
    match client.try_transfer(from, &env.current_contract_address(), &amount) {
        Ok(Ok(())) => Ok(()),
        _ => Err(Error::TransferFailed),
    }
}

/// Move `amount` from the contract to `to`.
pub fn push(env: &Env, config: &ProtocolConfig, to: &Address, amount: i128) -> Result<(), Error> {
    let client = token::Client::new(env, &config.token);
    match client.try_transfer(&env.current_contract_address(), to, &amount) {
        Ok(Ok(())) => Ok(()),
        _ => Err(Error::TransferFailed),
    }
}

/// The contract's own token balance.
pub fn balance(env: &Env, config: &ProtocolConfig) -> i128 {
    token::Client::new(env, &config.token).balance(&env.current_contract_address())
}
