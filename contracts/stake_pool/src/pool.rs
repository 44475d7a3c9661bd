//! Accumulator-based stake pool accounting.
//!
//! A pool keeps one running value, `accrued_reward_per_share`, equal to the
//! reward earned by a single staked unit since the pool was registered
//! (scaled by [`PRECISION`]). Each position remembers the accumulator value
//! at its last settlement (`reward_debt`), so a user's reward is
//! `staked * (acc - reward_debt)` no matter how many other users exist.
//!
//! Every mutating operation follows the same order: validate, `accrue` the
//! pool to `now`, `settle` the caller's position, then change balances. All
//! work happens on copies that are committed only when the whole operation
//! succeeds.

use soroban_sdk::{contracttype, Address, Env};

use crate::math::{self, MAX_DECIMALS, MS_PER_SEC, PRECISION};
use crate::policy::GlobalPolicy;
use crate::ContractError;

/// Longest funding window accepted at registration (ten years).
pub const MAX_DURATION_SECS: u64 = 10 * 365 * 24 * 60 * 60;

/// Accumulator increment per unit of `reward_rate_per_sec * elapsed_ms`.
const SHARE_SCALE_PER_MS: u128 = PRECISION / MS_PER_SEC as u128;

// ── Types ────────────────────────────────────────────────────────────────────

/// Registration parameters for a new pool.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PoolParams {
    /// Reward tokens funded at registration.
    pub reward_deposit: u64,
    /// Funding window in seconds.
    pub duration_secs: u64,
    pub stake_decimals: u32,
    pub reward_decimals: u32,
    /// Minimum time principal stays locked after each deposit.
    pub lock_duration_ms: u64,
    pub max_stake_per_user: u64,
}

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PoolState {
    /// Inside the funding window; every operation is open.
    Active,
    /// Window ended; accrual is frozen but harvest and unstake still work.
    Expired,
    /// A latch is engaged; only `emergency_unstake` and treasury recovery.
    Emergency,
}

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AssetKind {
    Stake,
    Reward,
}

/// Transfer the dispatch layer must perform after a successful operation.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Payout {
    pub asset: AssetKind,
    pub amount: u64,
    pub recipient: Address,
}

/// One user's ledger entry in one pool.
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct UserPosition {
    pub staked_amount: u64,
    /// Accumulator snapshot taken at the last settlement.
    pub reward_debt: u128,
    /// Settled reward not yet paid out.
    pub pending_reward: u64,
    pub unlock_time: u64,
}

impl UserPosition {
    /// A position with nothing staked and nothing owed carries no state worth
    /// persisting.
    pub fn is_empty(&self) -> bool {
        self.staked_amount == 0 && self.pending_reward == 0
    }
}

/// Read-only summary returned by `get_pool_info`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PoolInfo {
    pub total_staked: u64,
    pub reward_rate_per_sec: u64,
    pub end_time: u64,
    pub emergency_locked: bool,
    pub reward_reserve: u64,
    pub staker_count: u32,
    pub state: PoolState,
}

/// Read-only summary returned by `get_user_stake_info`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UserStakeInfo {
    pub staked_amount: u64,
    /// Pending reward plus everything accrued up to the query time.
    pub claimable_reward: u64,
    pub unlock_time: u64,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StakePool {
    pub id: u32,
    pub stake_token: Address,
    pub reward_token: Address,
    pub total_staked: u64,
    /// Reward tokens held by the pool and not yet paid out.
    pub reward_reserve: u64,
    /// Reward credited to stakers and not yet paid, scaled by [`PRECISION`].
    /// Always equals `PRECISION * sum(pending_reward)` plus
    /// `sum(staked_amount * (acc - reward_debt))` over live positions.
    pub reward_obligations: u128,
    pub reward_rate_per_sec: u64,
    pub accrued_reward_per_share: u128,
    pub last_accrual_time: u64,
    pub start_time: u64,
    pub end_time: u64,
    pub duration_secs: u64,
    pub lock_duration_ms: u64,
    pub max_stake_per_user: u64,
    pub stake_decimals: u32,
    pub reward_decimals: u32,
    /// `10^stake_decimals`
    pub stake_unit: u64,
    /// `10^reward_decimals`
    pub reward_unit: u64,
    pub staker_count: u32,
    emergency_locked: bool,
    emergency_locked_at: u64,
}

// ── Lifecycle ────────────────────────────────────────────────────────────────

impl StakePool {
    /// Create a pool funded with `params.reward_deposit`.
    ///
    /// The rate is `reward_deposit / duration_secs` rounded down; the
    /// remainder stays in the reserve and can only leave through treasury
    /// recovery once the window has ended.
    pub fn register(
        policy: &GlobalPolicy,
        id: u32,
        stake_token: Address,
        reward_token: Address,
        params: &PoolParams,
        now: u64,
    ) -> Result<Self, ContractError> {
        policy.require_no_global_emergency()?;
        if stake_token == reward_token {
            return Err(ContractError::TokensIdentical);
        }
        if params.duration_secs == 0
            || params.duration_secs > MAX_DURATION_SECS
            || params.max_stake_per_user == 0
            || params.lock_duration_ms == 0
            || params.stake_decimals > MAX_DECIMALS
            || params.reward_decimals > MAX_DECIMALS
        {
            return Err(ContractError::InvalidInput);
        }

        let stake_unit = math::to_u64(math::pow(10, params.stake_decimals)?)?;
        let reward_unit = math::to_u64(math::pow(10, params.reward_decimals)?)?;
        let window_ms = math::mul_u64(params.duration_secs, MS_PER_SEC)?;
        let end_time = math::add_u64(now, window_ms)?;

        Ok(Self {
            id,
            stake_token,
            reward_token,
            total_staked: 0,
            reward_reserve: params.reward_deposit,
            reward_obligations: 0,
            reward_rate_per_sec: params.reward_deposit / params.duration_secs,
            accrued_reward_per_share: 0,
            last_accrual_time: now,
            start_time: now,
            end_time,
            duration_secs: params.duration_secs,
            lock_duration_ms: params.lock_duration_ms,
            max_stake_per_user: params.max_stake_per_user,
            stake_decimals: params.stake_decimals,
            reward_decimals: params.reward_decimals,
            stake_unit,
            reward_unit,
            staker_count: 0,
            emergency_locked: false,
            emergency_locked_at: 0,
        })
    }

    pub fn is_emergency_locked(&self) -> bool {
        self.emergency_locked
    }

    pub fn emergency_locked_at(&self) -> Option<u64> {
        if self.emergency_locked {
            Some(self.emergency_locked_at)
        } else {
            None
        }
    }

    /// True when either the pool latch or the global latch is engaged.
    pub fn in_emergency(&self, policy: &GlobalPolicy) -> bool {
        self.emergency_locked || policy.is_global_emergency()
    }

    pub fn state(&self, policy: &GlobalPolicy, now: u64) -> PoolState {
        if self.in_emergency(policy) {
            PoolState::Emergency
        } else if now >= self.end_time {
            PoolState::Expired
        } else {
            PoolState::Active
        }
    }

    pub fn info(&self, policy: &GlobalPolicy, now: u64) -> PoolInfo {
        PoolInfo {
            total_staked: self.total_staked,
            reward_rate_per_sec: self.reward_rate_per_sec,
            end_time: self.end_time,
            emergency_locked: self.emergency_locked,
            reward_reserve: self.reward_reserve,
            staker_count: self.staker_count,
            state: self.state(policy, now),
        }
    }

    /// Projected position as of `now`, computed on copies so storage is
    /// untouched.
    pub fn user_stake_info(
        &self,
        env: &Env,
        position: &UserPosition,
        now: u64,
    ) -> Result<UserStakeInfo, ContractError> {
        let mut pool = self.clone();
        let mut projected = position.clone();
        pool.accrue(env, now)?;
        pool.settle(&mut projected)?;
        Ok(UserStakeInfo {
            staked_amount: projected.staked_amount,
            claimable_reward: projected.pending_reward,
            unlock_time: projected.unlock_time,
        })
    }

    // ── Accrual ──────────────────────────────────────────────────────────────

    /// Advance the accumulator to `min(now, end_time)`.
    ///
    /// Stale timestamps accrue nothing. The clock advances even when nothing
    /// is staked so an empty period is never credited later.
    fn accrue(&mut self, env: &Env, now: u64) -> Result<(), ContractError> {
        let until = now.min(self.end_time);
        if until <= self.last_accrual_time {
            return Ok(());
        }
        let elapsed_ms = until - self.last_accrual_time;

        if self.total_staked > 0 {
            let reward_ms = math::mul(
                u128::from(self.reward_rate_per_sec),
                u128::from(elapsed_ms),
            )?;
            let increment = math::mul_div(
                env,
                reward_ms,
                SHARE_SCALE_PER_MS,
                u128::from(self.total_staked),
            )?;
            self.accrued_reward_per_share = math::add(self.accrued_reward_per_share, increment)?;

            // Only what the accumulator actually credited becomes owed.
            let credited = math::mul(increment, u128::from(self.total_staked))?;
            self.reward_obligations = math::add(self.reward_obligations, credited)?;
        }

        self.last_accrual_time = until;
        Ok(())
    }

    /// Move everything `position` earned since its last snapshot into
    /// `pending_reward`. Must run after `accrue`.
    ///
    /// The sub-unit remainder dropped by rounding down can never be paid, so
    /// it is released from `reward_obligations`.
    fn settle(&mut self, position: &mut UserPosition) -> Result<(), ContractError> {
        let delta = math::sub(self.accrued_reward_per_share, position.reward_debt)?;
        // Bounded by `reward_obligations`, so the product fits.
        let earned = math::mul(u128::from(position.staked_amount), delta)?;
        let owed = earned / PRECISION;
        let dropped = earned % PRECISION;

        position.pending_reward = math::add_u64(position.pending_reward, math::to_u64(owed)?)?;
        position.reward_debt = self.accrued_reward_per_share;
        self.reward_obligations = math::sub(self.reward_obligations, dropped)?;
        Ok(())
    }

    /// Reward still owed to stakers, in whole reward units, rounded up.
    pub fn outstanding_obligations(&self) -> Result<u64, ContractError> {
        math::to_u64(math::div_up(self.reward_obligations, PRECISION)?)
    }

    /// Run `op` against a copy of the pool and keep the copy only on success.
    fn transact<T>(
        &mut self,
        op: impl FnOnce(&mut Self) -> Result<T, ContractError>,
    ) -> Result<T, ContractError> {
        let mut next = self.clone();
        let out = op(&mut next)?;
        *self = next;
        Ok(out)
    }

    fn require_no_emergency(&self, policy: &GlobalPolicy) -> Result<(), ContractError> {
        policy.require_no_global_emergency()?;
        if self.emergency_locked {
            return Err(ContractError::PoolEmergency);
        }
        Ok(())
    }

    // ── User operations ──────────────────────────────────────────────────────

    /// Add `amount` to the position. Every top-up restarts the lock period.
    pub fn stake(
        &mut self,
        env: &Env,
        policy: &GlobalPolicy,
        position: &mut UserPosition,
        amount: u64,
        now: u64,
    ) -> Result<(), ContractError> {
        if amount == 0 {
            return Err(ContractError::InvalidInput);
        }
        self.require_no_emergency(policy)?;
        if now >= self.end_time {
            return Err(ContractError::PoolExpired);
        }
        let new_stake = math::add_u64(position.staked_amount, amount)?;
        if new_stake > self.max_stake_per_user {
            return Err(ContractError::MaxStakeExceeded);
        }

        self.transact(|pool| {
            let mut next = position.clone();
            pool.accrue(env, now)?;
            pool.settle(&mut next)?;

            if next.staked_amount == 0 {
                pool.staker_count = pool
                    .staker_count
                    .checked_add(1)
                    .ok_or(ContractError::ArithmeticOverflow)?;
            }
            next.staked_amount = new_stake;
            next.unlock_time = math::add_u64(now, pool.lock_duration_ms)?;
            pool.total_staked = math::add_u64(pool.total_staked, amount)?;

            *position = next;
            Ok(())
        })
    }

    /// Withdraw `amount` of principal once the lock period has passed.
    pub fn unstake(
        &mut self,
        env: &Env,
        policy: &GlobalPolicy,
        user: &Address,
        position: &mut UserPosition,
        amount: u64,
        now: u64,
    ) -> Result<Payout, ContractError> {
        if amount == 0 {
            return Err(ContractError::InvalidInput);
        }
        if amount > position.staked_amount {
            return Err(ContractError::InsufficientBalance);
        }
        self.require_no_emergency(policy)?;
        if now < position.unlock_time {
            return Err(ContractError::LockPeriodActive);
        }

        self.transact(|pool| {
            let mut next = position.clone();
            pool.accrue(env, now)?;
            pool.settle(&mut next)?;

            next.staked_amount = math::sub_u64(next.staked_amount, amount)?;
            pool.total_staked = math::sub_u64(pool.total_staked, amount)?;
            if next.staked_amount == 0 {
                pool.staker_count = pool
                    .staker_count
                    .checked_sub(1)
                    .ok_or(ContractError::ArithmeticOverflow)?;
            }

            *position = next;
            Ok(Payout {
                asset: AssetKind::Stake,
                amount,
                recipient: user.clone(),
            })
        })
    }

    /// Pay out everything the position has earned. A zero harvest succeeds.
    pub fn harvest(
        &mut self,
        env: &Env,
        policy: &GlobalPolicy,
        user: &Address,
        position: &mut UserPosition,
        now: u64,
    ) -> Result<Payout, ContractError> {
        self.require_no_emergency(policy)?;

        self.transact(|pool| {
            let mut next = position.clone();
            pool.accrue(env, now)?;
            pool.settle(&mut next)?;

            let amount = next.pending_reward;
            pool.reward_reserve = pool
                .reward_reserve
                .checked_sub(amount)
                .ok_or(ContractError::InsufficientReserve)?;
            pool.reward_obligations = pool
                .reward_obligations
                .checked_sub(math::mul(u128::from(amount), PRECISION)?)
                .ok_or(ContractError::InsufficientReserve)?;
            next.pending_reward = 0;

            *position = next;
            Ok(Payout {
                asset: AssetKind::Reward,
                amount,
                recipient: user.clone(),
            })
        })
    }

    // ── Funding & treasury ───────────────────────────────────────────────────

    /// Add reward funding and open a fresh window of `duration_secs`.
    ///
    /// Reward still scheduled under the old rate is folded into the new rate
    /// together with `amount`. The accumulator is brought up to date first,
    /// so rewards already earned are not affected.
    pub fn deposit_reward_coins(
        &mut self,
        env: &Env,
        policy: &GlobalPolicy,
        amount: u64,
        now: u64,
    ) -> Result<(), ContractError> {
        if amount == 0 {
            return Err(ContractError::InvalidInput);
        }
        self.require_no_emergency(policy)?;

        self.transact(|pool| {
            pool.accrue(env, now)?;

            let from = now.max(pool.last_accrual_time);
            let leftover = if from < pool.end_time {
                math::to_u64(math::mul_div(
                    env,
                    u128::from(pool.reward_rate_per_sec),
                    u128::from(pool.end_time - from),
                    u128::from(MS_PER_SEC),
                )?)?
            } else {
                0
            };
            let budget = math::add_u64(leftover, amount)?;
            let window_ms = math::mul_u64(pool.duration_secs, MS_PER_SEC)?;

            pool.reward_reserve = math::add_u64(pool.reward_reserve, amount)?;
            pool.reward_rate_per_sec = budget / pool.duration_secs;
            pool.start_time = from;
            pool.last_accrual_time = from;
            pool.end_time = math::add_u64(from, window_ms)?;
            Ok(())
        })
    }

    /// Move surplus reward reserve to the treasury admin once the funding
    /// window has ended.
    ///
    /// Without a latch only reserve above the outstanding obligations can
    /// leave. Under either latch harvest is permanently closed, so after
    /// expiry the whole reserve is recoverable.
    pub fn withdraw_to_treasury(
        &mut self,
        env: &Env,
        policy: &GlobalPolicy,
        caller: &Address,
        amount: u64,
        now: u64,
    ) -> Result<Payout, ContractError> {
        policy.require_treasury_admin(caller)?;
        if amount == 0 {
            return Err(ContractError::InvalidInput);
        }
        if now < self.end_time {
            return Err(ContractError::PoolStillActive);
        }
        let emergency = self.in_emergency(policy);

        self.transact(|pool| {
            let available = if emergency {
                pool.reward_reserve
            } else {
                pool.accrue(env, now)?;
                math::sub_u64(pool.reward_reserve, pool.outstanding_obligations()?)?
            };
            if amount > available {
                return Err(ContractError::InsufficientReserve);
            }
            pool.reward_reserve = math::sub_u64(pool.reward_reserve, amount)?;
            Ok(Payout {
                asset: AssetKind::Reward,
                amount,
                recipient: caller.clone(),
            })
        })
    }

    // ── Emergency ────────────────────────────────────────────────────────────

    /// Engage this pool's latch. There is no inverse operation.
    pub fn enable_emergency(
        &mut self,
        policy: &GlobalPolicy,
        caller: &Address,
        now: u64,
    ) -> Result<(), ContractError> {
        policy.require_emergency_admin(caller)?;
        if self.emergency_locked {
            return Err(ContractError::AlreadyEngaged);
        }
        self.emergency_locked = true;
        self.emergency_locked_at = now;
        Ok(())
    }

    /// Return the full principal without accruing, settling or paying any
    /// pending reward. The forfeited reward is cleared from the position and
    /// from the pool's obligations.
    pub fn emergency_unstake(
        &mut self,
        policy: &GlobalPolicy,
        user: &Address,
        position: &mut UserPosition,
    ) -> Result<Payout, ContractError> {
        if !self.in_emergency(policy) {
            return Err(ContractError::NotInEmergency);
        }
        let amount = position.staked_amount;
        if amount == 0 {
            return Err(ContractError::InvalidInput);
        }

        self.transact(|pool| {
            let unsettled = math::mul(
                u128::from(amount),
                math::sub(pool.accrued_reward_per_share, position.reward_debt)?,
            )?;
            let forfeited = math::add(
                math::mul(u128::from(position.pending_reward), PRECISION)?,
                unsettled,
            )?;
            pool.reward_obligations = math::sub(pool.reward_obligations, forfeited)?;
            pool.total_staked = math::sub_u64(pool.total_staked, amount)?;
            pool.staker_count = pool
                .staker_count
                .checked_sub(1)
                .ok_or(ContractError::ArithmeticOverflow)?;

            *position = UserPosition::default();
            Ok(Payout {
                asset: AssetKind::Stake,
                amount,
                recipient: user.clone(),
            })
        })
    }
}
