//! Administrator capability check.
//!
//! Admin-only entry points take the admin address as an explicit argument.
//! The address must both authorise the call and match the one stored by `init`.

use soroban_sdk::{Address, Env};

use crate::storage::get_admin;
use crate::Error;

pub fn require_admin(env: &Env, caller: &Address) -> Result<(), Error> {
    caller.require_auth();
    let admin = get_admin(env)?;
    if *caller != admin {
        return Err(Error::Unauthorized);
    }
    Ok(())
}
