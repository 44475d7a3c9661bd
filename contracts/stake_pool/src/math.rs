//! Checked fixed-point arithmetic for reward accounting.
//!
//! Every helper fails with [`ContractError::ArithmeticOverflow`] instead of
//! wrapping or saturating. Reward amounts are `u64`, the per-share
//! accumulator is `u128` scaled by [`PRECISION`], and [`mul_div`] widens to
//! 256 bits through the host's `U256` so the multiply-before-divide step can
//! never overflow; only the narrowed quotient can.

use soroban_sdk::{Env, U256};

use crate::ContractError;

/// Scale applied to `accrued_reward_per_share`.
pub const PRECISION: u128 = 1_000_000_000_000;

/// Timestamps are milliseconds; reward rates are per second.
pub const MS_PER_SEC: u64 = 1_000;

/// Largest token decimals accepted at registration (`10^18` fits in `u64`).
pub const MAX_DECIMALS: u32 = 18;

pub fn add(a: u128, b: u128) -> Result<u128, ContractError> {
    a.checked_add(b).ok_or(ContractError::ArithmeticOverflow)
}

/// `a - b`, failing when the result would be negative.
pub fn sub(a: u128, b: u128) -> Result<u128, ContractError> {
    a.checked_sub(b).ok_or(ContractError::ArithmeticOverflow)
}

pub fn mul(a: u128, b: u128) -> Result<u128, ContractError> {
    a.checked_mul(b).ok_or(ContractError::ArithmeticOverflow)
}

/// `base^exp` by binary exponentiation.
pub fn pow(base: u128, exp: u32) -> Result<u128, ContractError> {
    let mut acc: u128 = 1;
    let mut base = base;
    let mut exp = exp;
    while exp > 0 {
        if exp & 1 == 1 {
            acc = mul(acc, base)?;
        }
        exp >>= 1;
        // The last square is never used.
        if exp > 0 {
            base = mul(base, base)?;
        }
    }
    Ok(acc)
}

/// `a * b / denom`, rounded down, with a 256-bit intermediate product.
pub fn mul_div(env: &Env, a: u128, b: u128, denom: u128) -> Result<u128, ContractError> {
    if denom == 0 {
        return Err(ContractError::ArithmeticOverflow);
    }
    if a == 0 || b == 0 {
        return Ok(0);
    }
    let product = U256::from_u128(env, a).mul(&U256::from_u128(env, b));
    product
        .div(&U256::from_u128(env, denom))
        .to_u128()
        .ok_or(ContractError::ArithmeticOverflow)
}

/// `a / denom`, rounded up.
pub fn div_up(a: u128, denom: u128) -> Result<u128, ContractError> {
    if denom == 0 {
        return Err(ContractError::ArithmeticOverflow);
    }
    let q = a / denom;
    if a % denom == 0 {
        Ok(q)
    } else {
        add(q, 1)
    }
}

pub fn to_u64(v: u128) -> Result<u64, ContractError> {
    u64::try_from(v).map_err(|_| ContractError::ArithmeticOverflow)
}

pub fn add_u64(a: u64, b: u64) -> Result<u64, ContractError> {
    a.checked_add(b).ok_or(ContractError::ArithmeticOverflow)
}

pub fn sub_u64(a: u64, b: u64) -> Result<u64, ContractError> {
    a.checked_sub(b).ok_or(ContractError::ArithmeticOverflow)
}

pub fn mul_u64(a: u64, b: u64) -> Result<u64, ContractError> {
    a.checked_mul(b).ok_or(ContractError::ArithmeticOverflow)
}
