//! Call-in-progress guard.
//!
//! Every mutating entry point runs inside [`non_reentrant`]. The flag lives in
//! instance storage, so it is shared by all projects: a nested entry into any
//! mutating entry point fails with [`Error::Reentrancy`] while another one is
//! executing. When the wrapped body fails the host discards the invocation's
//! writes, the flag included.

use soroban_sdk::Env;

use crate::storage::{is_locked, set_locked};
use crate::Error;

pub fn non_reentrant<T>(env: &Env, body: impl FnOnce() -> Result<T, Error>) -> Result<T, Error> {
    if is_locked(env) {
        return Err(Error::Reentrancy);
    }
    set_locked(env, true);
    let result = body();
    set_locked(env, false);
    result
}
