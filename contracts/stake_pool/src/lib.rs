#![no_std]

pub mod errors;
pub mod events;
pub mod math;
pub mod policy;
pub mod pool;
mod storage;

use soroban_sdk::{contract, contractimpl, symbol_short, token, Address, Env};

pub use errors::ContractError;
pub use policy::{GlobalPolicy, POLICY_VERSION};
pub use pool::{
    AssetKind, Payout, PoolInfo, PoolParams, PoolState, StakePool, UserPosition, UserStakeInfo,
    MAX_DURATION_SECS,
};

// ── Contract ─────────────────────────────────────────────────────────────────

#[contract]
pub struct StakePoolContract;

#[contractimpl]
impl StakePoolContract {
    // ── Global policy ───────────────────────────────────────────────────────

    /// Bootstrap the global policy shared by every pool.
    ///
    /// * `emergency_admin` – may engage the global latch and pool latches.
    /// * `treasury_admin`  – may recover surplus reward reserve.
    pub fn initialize(
        env: Env,
        emergency_admin: Address,
        treasury_admin: Address,
    ) -> Result<(), ContractError> {
        if storage::has_policy(&env) {
            return Err(ContractError::AlreadyInitialized);
        }

        let policy = GlobalPolicy::new(&env, emergency_admin.clone(), treasury_admin.clone())?;
        storage::save_policy(&env, &policy);
        storage::bump_instance(&env);

        events::publish_initialized(&env, emergency_admin, treasury_admin, policy.version);

        Ok(())
    }

    /// Hand the emergency role to `new_admin`. Only the current holder may
    /// call this.
    pub fn set_emergency_admin(
        env: Env,
        caller: Address,
        new_admin: Address,
    ) -> Result<(), ContractError> {
        caller.require_auth();
        let mut policy = storage::load_policy(&env)?;

        let old_admin = policy.emergency_admin.clone();
        policy.set_emergency_admin(&env, &caller, new_admin.clone())?;
        storage::save_policy(&env, &policy);
        storage::bump_instance(&env);

        events::publish_admin_changed(&env, symbol_short!("EMERGENCY"), old_admin, new_admin);

        Ok(())
    }

    /// Hand the treasury role to `new_admin`. Only the current holder may
    /// call this.
    pub fn set_treasury_admin(
        env: Env,
        caller: Address,
        new_admin: Address,
    ) -> Result<(), ContractError> {
        caller.require_auth();
        let mut policy = storage::load_policy(&env)?;

        let old_admin = policy.treasury_admin.clone();
        policy.set_treasury_admin(&env, &caller, new_admin.clone())?;
        storage::save_policy(&env, &policy);
        storage::bump_instance(&env);

        events::publish_admin_changed(&env, symbol_short!("TREASURY"), old_admin, new_admin);

        Ok(())
    }

    /// Engage the process-wide emergency latch. Irreversible: every pool
    /// switches to emergency-exit-only.
    pub fn engage_global_emergency(env: Env, caller: Address) -> Result<(), ContractError> {
        caller.require_auth();
        let mut policy = storage::load_policy(&env)?;

        let now = Self::now_ms(&env)?;
        policy.engage_global_emergency(&caller, now)?;
        storage::save_policy(&env, &policy);
        storage::bump_instance(&env);

        events::publish_global_emergency(&env, caller);

        Ok(())
    }

    // ── Pool lifecycle ──────────────────────────────────────────────────────

    /// Register a pool for the `stake_token` / `reward_token` pair, funded by
    /// `funder` with `params.reward_deposit` reward tokens.
    ///
    /// Returns the new pool id.
    pub fn register_pool(
        env: Env,
        funder: Address,
        stake_token: Address,
        reward_token: Address,
        params: PoolParams,
    ) -> Result<u32, ContractError> {
        funder.require_auth();
        let policy = storage::load_policy(&env)?;

        let now = Self::now_ms(&env)?;
        let pool_id = storage::next_pool_id(&env)?;
        let pool = StakePool::register(
            &policy,
            pool_id,
            stake_token.clone(),
            reward_token.clone(),
            &params,
            now,
        )?;

        Self::pull_in(&env, &pool.reward_token, &funder, params.reward_deposit);
        storage::save_pool(&env, &pool);
        storage::bump_instance(&env);

        events::publish_pool_registered(
            &env,
            pool_id,
            funder,
            stake_token,
            reward_token,
            params.reward_deposit,
            pool.reward_rate_per_sec,
            pool.end_time,
        );

        Ok(pool_id)
    }

    /// Add reward funding to a pool and restart its funding window.
    pub fn deposit_reward_coins(
        env: Env,
        funder: Address,
        pool_id: u32,
        amount: u64,
    ) -> Result<(), ContractError> {
        funder.require_auth();
        let policy = storage::load_policy(&env)?;
        let mut pool = storage::load_pool(&env, pool_id)?;

        let now = Self::now_ms(&env)?;
        pool.deposit_reward_coins(&env, &policy, amount, now)?;

        Self::pull_in(&env, &pool.reward_token, &funder, amount);
        storage::save_pool(&env, &pool);
        storage::bump_instance(&env);

        events::publish_reward_deposited(
            &env,
            pool_id,
            funder,
            amount,
            pool.reward_rate_per_sec,
            pool.end_time,
        );

        Ok(())
    }

    /// Recover surplus reward reserve. Treasury admin only.
    pub fn withdraw_to_treasury(
        env: Env,
        caller: Address,
        pool_id: u32,
        amount: u64,
    ) -> Result<u64, ContractError> {
        caller.require_auth();
        let policy = storage::load_policy(&env)?;
        let mut pool = storage::load_pool(&env, pool_id)?;

        let now = Self::now_ms(&env)?;
        let payout = pool.withdraw_to_treasury(&env, &policy, &caller, amount, now)?;

        storage::save_pool(&env, &pool);
        Self::pay_out(&env, &pool, &payout);
        storage::bump_instance(&env);

        events::publish_treasury_withdrawal(
            &env,
            pool_id,
            caller,
            payout.amount,
            pool.reward_reserve,
        );

        Ok(payout.amount)
    }

    /// Engage one pool's emergency latch. Emergency admin only.
    pub fn enable_emergency(env: Env, caller: Address, pool_id: u32) -> Result<(), ContractError> {
        caller.require_auth();
        let policy = storage::load_policy(&env)?;
        let mut pool = storage::load_pool(&env, pool_id)?;

        let now = Self::now_ms(&env)?;
        pool.enable_emergency(&policy, &caller, now)?;
        storage::save_pool(&env, &pool);
        storage::bump_instance(&env);

        events::publish_pool_emergency(&env, pool_id, caller);

        Ok(())
    }

    // ── Staking ─────────────────────────────────────────────────────────────

    /// Deposit `amount` stake tokens into `pool_id`.
    ///
    /// The pool accumulator is flushed and the staker's position settled at
    /// the old balance before the deposit lands, so new principal never
    /// earns retroactively. Every deposit restarts the lock period.
    pub fn stake(env: Env, staker: Address, pool_id: u32, amount: u64) -> Result<(), ContractError> {
        staker.require_auth();
        let policy = storage::load_policy(&env)?;
        let mut pool = storage::load_pool(&env, pool_id)?;
        let mut position = storage::load_position(&env, pool_id, &staker);

        let now = Self::now_ms(&env)?;
        pool.stake(&env, &policy, &mut position, amount, now)?;

        Self::pull_in(&env, &pool.stake_token, &staker, amount);
        storage::save_pool(&env, &pool);
        storage::save_position(&env, pool_id, &staker, &position);
        storage::bump_instance(&env);

        events::publish_staked(
            &env,
            pool_id,
            staker,
            amount,
            pool.total_staked,
            position.unlock_time,
        );

        Ok(())
    }

    /// Withdraw `amount` of principal after the lock period. Earned reward
    /// stays in the position until harvested.
    pub fn unstake(env: Env, staker: Address, pool_id: u32, amount: u64) -> Result<u64, ContractError> {
        staker.require_auth();
        let policy = storage::load_policy(&env)?;
        let mut pool = storage::load_pool(&env, pool_id)?;
        let mut position = storage::load_position(&env, pool_id, &staker);

        let now = Self::now_ms(&env)?;
        let payout = pool.unstake(&env, &policy, &staker, &mut position, amount, now)?;

        storage::save_pool(&env, &pool);
        storage::save_position(&env, pool_id, &staker, &position);
        Self::pay_out(&env, &pool, &payout);
        storage::bump_instance(&env);

        events::publish_unstaked(&env, pool_id, staker, payout.amount, pool.total_staked);

        Ok(payout.amount)
    }

    /// Claim every reward the staker has earned in `pool_id`.
    ///
    /// Returns the amount paid; zero is a successful no-op.
    pub fn harvest(env: Env, staker: Address, pool_id: u32) -> Result<u64, ContractError> {
        staker.require_auth();
        let policy = storage::load_policy(&env)?;
        let mut pool = storage::load_pool(&env, pool_id)?;
        let mut position = storage::load_position(&env, pool_id, &staker);

        let now = Self::now_ms(&env)?;
        let payout = pool.harvest(&env, &policy, &staker, &mut position, now)?;

        storage::save_pool(&env, &pool);
        storage::save_position(&env, pool_id, &staker, &position);
        Self::pay_out(&env, &pool, &payout);
        storage::bump_instance(&env);

        if payout.amount > 0 {
            events::publish_harvested(&env, pool_id, staker, payout.amount);
        }

        Ok(payout.amount)
    }

    /// Pull the full principal out of a pool under an emergency latch.
    /// Settled but unclaimed reward is forfeited and reported in the event.
    pub fn emergency_unstake(env: Env, staker: Address, pool_id: u32) -> Result<u64, ContractError> {
        staker.require_auth();
        let policy = storage::load_policy(&env)?;
        let mut pool = storage::load_pool(&env, pool_id)?;
        let mut position = storage::load_position(&env, pool_id, &staker);

        let forfeited = position.pending_reward;
        let payout = pool.emergency_unstake(&policy, &staker, &mut position)?;

        storage::save_pool(&env, &pool);
        storage::save_position(&env, pool_id, &staker, &position);
        Self::pay_out(&env, &pool, &payout);
        storage::bump_instance(&env);

        events::publish_emergency_unstake(
            &env,
            pool_id,
            staker,
            payout.amount,
            forfeited,
        );

        Ok(payout.amount)
    }

    // ── View functions ───────────────────────────────────────────────────────

    pub fn get_pool_info(env: Env, pool_id: u32) -> Result<PoolInfo, ContractError> {
        let policy = storage::load_policy(&env)?;
        let pool = storage::load_pool(&env, pool_id)?;
        Ok(pool.info(&policy, Self::now_ms(&env)?))
    }

    /// Staked balance, reward claimable right now (including what has
    /// accrued since the last interaction) and unlock time.
    pub fn get_user_stake_info(
        env: Env,
        pool_id: u32,
        user: Address,
    ) -> Result<UserStakeInfo, ContractError> {
        let pool = storage::load_pool(&env, pool_id)?;
        let position = storage::load_position(&env, pool_id, &user);
        pool.user_stake_info(&env, &position, Self::now_ms(&env)?)
    }

    pub fn get_pool_state(env: Env, pool_id: u32) -> Result<PoolState, ContractError> {
        let policy = storage::load_policy(&env)?;
        let pool = storage::load_pool(&env, pool_id)?;
        Ok(pool.state(&policy, Self::now_ms(&env)?))
    }

    /// Full stored pool record.
    pub fn get_pool(env: Env, pool_id: u32) -> Result<StakePool, ContractError> {
        storage::load_pool(&env, pool_id)
    }

    /// Stored position as of the user's last interaction.
    pub fn get_position(env: Env, pool_id: u32, user: Address) -> UserPosition {
        storage::load_position(&env, pool_id, &user)
    }

    pub fn pool_count(env: Env) -> u32 {
        storage::pool_count(&env)
    }

    pub fn get_policy(env: Env) -> Result<GlobalPolicy, ContractError> {
        storage::load_policy(&env)
    }

    pub fn is_global_emergency(env: Env) -> bool {
        storage::load_policy(&env)
            .map(|policy| policy.is_global_emergency())
            .unwrap_or(false)
    }

    pub fn is_initialized(env: Env) -> bool {
        storage::has_policy(&env)
    }

    // ── Internal helpers ─────────────────────────────────────────────────────

    /// Ledger time in the millisecond unit the accounting core works in.
    fn now_ms(env: &Env) -> Result<u64, ContractError> {
        math::mul_u64(env.ledger().timestamp(), math::MS_PER_SEC)
    }

    /// Move `amount` of `token` from `from` into the contract.
    fn pull_in(env: &Env, token: &Address, from: &Address, amount: u64) {
        if amount == 0 {
            return;
        }
        token::Client::new(env, token).transfer(
            from,
            &env.current_contract_address(),
            &i128::from(amount),
        );
    }

    /// Perform the transfer a core operation asked for.
    fn pay_out(env: &Env, pool: &StakePool, payout: &Payout) {
        if payout.amount == 0 {
            return;
        }
        let token = match payout.asset {
            AssetKind::Stake => &pool.stake_token,
            AssetKind::Reward => &pool.reward_token,
        };
        token::Client::new(env, token).transfer(
            &env.current_contract_address(),
            &payout.recipient,
            &i128::from(payout.amount),
        );
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────


#[cfg(test)]
mod test_policy;
