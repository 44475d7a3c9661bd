use soroban_sdk::{symbol_short, Address, Env, Symbol};

use crate::policy::GlobalPolicy;
use crate::pool::{StakePool, UserPosition};
use crate::ContractError;

// ── Storage key constants ────────────────────────────────────────────────────

const POLICY: Symbol = symbol_short!("POLICY");
const POOL_CTR: Symbol = symbol_short!("POOL_CTR");

// Persistent entries use tuple keys: (prefix, pool_id[, user])
const POOL: Symbol = symbol_short!("POOL");
const POSITION: Symbol = symbol_short!("POS");

const TTL_THRESHOLD: u32 = 5184000;
const TTL_EXTEND_TO: u32 = 10368000;

fn pool_key(pool_id: u32) -> (Symbol, u32) {
    (POOL, pool_id)
}

fn position_key(pool_id: u32, user: &Address) -> (Symbol, u32, Address) {
    (POSITION, pool_id, user.clone())
}

/// Keep the contract instance (policy and pool counter) alive.
pub fn bump_instance(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(TTL_THRESHOLD, TTL_EXTEND_TO);
}

// ── Policy ───────────────────────────────────────────────────────────────────

pub fn has_policy(env: &Env) -> bool {
    env.storage().instance().has(&POLICY)
}

pub fn load_policy(env: &Env) -> Result<GlobalPolicy, ContractError> {
    env.storage()
        .instance()
        .get(&POLICY)
        .ok_or(ContractError::NotInitialized)
}

pub fn save_policy(env: &Env, policy: &GlobalPolicy) {
    env.storage().instance().set(&POLICY, policy);
}

// ── Pools ────────────────────────────────────────────────────────────────────

pub fn pool_count(env: &Env) -> u32 {
    env.storage().instance().get(&POOL_CTR).unwrap_or(0)
}

/// Allocate the next pool id. Ids start at 1.
pub fn next_pool_id(env: &Env) -> Result<u32, ContractError> {
    let next = pool_count(env)
        .checked_add(1)
        .ok_or(ContractError::ArithmeticOverflow)?;
    env.storage().instance().set(&POOL_CTR, &next);
    Ok(next)
}

pub fn load_pool(env: &Env, pool_id: u32) -> Result<StakePool, ContractError> {
    let key = pool_key(pool_id);
    let pool: StakePool = env
        .storage()
        .persistent()
        .get(&key)
        .ok_or(ContractError::PoolNotFound)?;
    env.storage()
        .persistent()
        .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
    Ok(pool)
}

pub fn save_pool(env: &Env, pool: &StakePool) {
    let key = pool_key(pool.id);
    env.storage().persistent().set(&key, pool);
    env.storage()
        .persistent()
        .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

// ── Positions ────────────────────────────────────────────────────────────────

/// A user without a stored entry has the all-zero position.
pub fn load_position(env: &Env, pool_id: u32, user: &Address) -> UserPosition {
    env.storage()
        .persistent()
        .get(&position_key(pool_id, user))
        .unwrap_or_default()
}

/// Persist `position`, dropping the entry once it holds nothing.
pub fn save_position(env: &Env, pool_id: u32, user: &Address, position: &UserPosition) {
    let key = position_key(pool_id, user);
    if position.is_empty() {
        env.storage().persistent().remove(&key);
        return;
    }
    env.storage().persistent().set(&key, position);
    env.storage()
        .persistent()
        .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
}
