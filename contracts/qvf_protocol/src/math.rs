//! Integer arithmetic used by the power accounting and the payout split.
//!
//! Everything here is exact: no floating point is involved anywhere in the
//! contract.

use soroban_sdk::{Env, U256};

use crate::Error;

/// Floor integer square root: the unique `k` with `k² ≤ n < (k+1)²`.
///
/// Newton's iteration started from a power of two that is guaranteed to be
/// at or above the root, so the sequence decreases monotonically and stops
/// at the floor. Intermediate values never exceed `2^65`.
pub fn isqrt(n: u128) -> u128 {
    if n < 2 {
        return n;
    }
    let bits = 128 - n.leading_zeros();
    let mut x = 1u128 << bits.div_ceil(2);
    loop {
        let y = (x + n / x) >> 1;
        if y >= x {
            return x;
        }
        x = y;
    }
}

/// Quadratic voting power of a cumulative contribution.
///
/// Non-positive amounts carry no power.
pub fn voting_power(amount: i128) -> i128 {
    if amount <= 0 {
        return 0;
    }
    // isqrt(i128::MAX) < 2^64, so the cast back cannot truncate.
    isqrt(amount as u128) as i128
}

/// `floor(a * b / c)` with a 256-bit intermediate product.
///
/// All operands must be non-negative and `c` non-zero.
pub fn mul_div_floor(env: &Env, a: i128, b: i128, c: i128) -> Result<i128, Error> {
    if a < 0 || b < 0 || c <= 0 {
        return Err(Error::ArithmeticOverflow);
    }
    let product = U256::from_u128(env, a as u128).mul(&U256::from_u128(env, b as u128));
    let quotient = product.div(&U256::from_u128(env, c as u128));
    quotient
        .to_u128()
        .and_then(|q| i128::try_from(q).ok())
        .ok_or(Error::ArithmeticOverflow)
}
