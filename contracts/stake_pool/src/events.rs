#![allow(deprecated)] // events().publish migration tracked separately

use soroban_sdk::{symbol_short, Address, Env, Symbol};

// ── Event payloads ──────────────────────────────────────────────────────────

/// Fired once when the global policy is created.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InitializedEvent {
    pub emergency_admin: Address,
    pub treasury_admin: Address,
    pub version: u32,
    pub timestamp: u64,
}

/// Fired when either admin role changes hands.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AdminChangedEvent {
    pub role: Symbol,
    pub old_admin: Address,
    pub new_admin: Address,
    pub timestamp: u64,
}

/// Fired when the process-wide emergency latch is engaged.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GlobalEmergencyEvent {
    pub admin: Address,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PoolRegisteredEvent {
    pub pool_id: u32,
    pub funder: Address,
    pub stake_token: Address,
    pub reward_token: Address,
    pub reward_deposit: u64,
    pub reward_rate_per_sec: u64,
    pub end_time: u64,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StakedEvent {
    pub pool_id: u32,
    pub staker: Address,
    pub amount: u64,
    pub new_total_staked: u64,
    pub unlock_time: u64,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UnstakedEvent {
    pub pool_id: u32,
    pub staker: Address,
    pub amount: u64,
    pub new_total_staked: u64,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HarvestedEvent {
    pub pool_id: u32,
    pub staker: Address,
    pub amount: u64,
    pub timestamp: u64,
}

/// Fired when a pool receives extra reward funding.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RewardDepositedEvent {
    pub pool_id: u32,
    pub funder: Address,
    pub amount: u64,
    pub new_rate_per_sec: u64,
    pub end_time: u64,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TreasuryWithdrawalEvent {
    pub pool_id: u32,
    pub admin: Address,
    pub amount: u64,
    pub remaining_reserve: u64,
    pub timestamp: u64,
}

/// Fired when a single pool's emergency latch is engaged.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PoolEmergencyEvent {
    pub pool_id: u32,
    pub admin: Address,
    pub timestamp: u64,
}

/// Fired when a user pulls principal out under an emergency latch.
/// `forfeited_reward` is the settled reward left behind.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EmergencyUnstakeEvent {
    pub pool_id: u32,
    pub staker: Address,
    pub amount: u64,
    pub forfeited_reward: u64,
    pub timestamp: u64,
}

// ── Publishers ──────────────────────────────────────────────────────────────

pub fn publish_initialized(
    env: &Env,
    emergency_admin: Address,
    treasury_admin: Address,
    version: u32,
) {
    env.events().publish(
        (symbol_short!("INIT"),),
        InitializedEvent {
            emergency_admin,
            treasury_admin,
            version,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_admin_changed(env: &Env, role: Symbol, old_admin: Address, new_admin: Address) {
    env.events().publish(
        (symbol_short!("ADM_SET"), role.clone()),
        AdminChangedEvent {
            role,
            old_admin,
            new_admin,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_global_emergency(env: &Env, admin: Address) {
    env.events().publish(
        (symbol_short!("GLB_EMRG"),),
        GlobalEmergencyEvent {
            admin,
            timestamp: env.ledger().timestamp(),
        },
    );
}

#[allow(clippy::too_many_arguments)]
pub fn publish_pool_registered(
    env: &Env,
    pool_id: u32,
    funder: Address,
    stake_token: Address,
    reward_token: Address,
    reward_deposit: u64,
    reward_rate_per_sec: u64,
    end_time: u64,
) {
    env.events().publish(
        (symbol_short!("POOL_REG"), pool_id),
        PoolRegisteredEvent {
            pool_id,
            funder,
            stake_token,
            reward_token,
            reward_deposit,
            reward_rate_per_sec,
            end_time,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_staked(
    env: &Env,
    pool_id: u32,
    staker: Address,
    amount: u64,
    new_total_staked: u64,
    unlock_time: u64,
) {
    env.events().publish(
        (symbol_short!("STAKED"), pool_id, staker.clone()),
        StakedEvent {
            pool_id,
            staker,
            amount,
            new_total_staked,
            unlock_time,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_unstaked(
    env: &Env,
    pool_id: u32,
    staker: Address,
    amount: u64,
    new_total_staked: u64,
) {
    env.events().publish(
        (symbol_short!("UNSTAKED"), pool_id, staker.clone()),
        UnstakedEvent {
            pool_id,
            staker,
            amount,
            new_total_staked,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_harvested(env: &Env, pool_id: u32, staker: Address, amount: u64) {
    env.events().publish(
        (symbol_short!("HARVEST"), pool_id, staker.clone()),
        HarvestedEvent {
            pool_id,
            staker,
            amount,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_reward_deposited(
    env: &Env,
    pool_id: u32,
    funder: Address,
    amount: u64,
    new_rate_per_sec: u64,
    end_time: u64,
) {
    env.events().publish(
        (symbol_short!("RWD_DEP"), pool_id),
        RewardDepositedEvent {
            pool_id,
            funder,
            amount,
            new_rate_per_sec,
            end_time,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_treasury_withdrawal(
    env: &Env,
    pool_id: u32,
    admin: Address,
    amount: u64,
    remaining_reserve: u64,
) {
    env.events().publish(
        (symbol_short!("TRSY_WD"), pool_id),
        TreasuryWithdrawalEvent {
            pool_id,
            admin,
            amount,
            remaining_reserve,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_pool_emergency(env: &Env, pool_id: u32, admin: Address) {
    env.events().publish(
        (symbol_short!("POOL_EMRG"), pool_id),
        PoolEmergencyEvent {
            pool_id,
            admin,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_emergency_unstake(
    env: &Env,
    pool_id: u32,
    staker: Address,
    amount: u64,
    forfeited_reward: u64,
) {
    env.events().publish(
        (symbol_short!("EMRG_UNST"), pool_id, staker.clone()),
        EmergencyUnstakeEvent {
            pool_id,
            staker,
            amount,
            forfeited_reward,
            timestamp: env.ledger().timestamp(),
        },
    );
}
