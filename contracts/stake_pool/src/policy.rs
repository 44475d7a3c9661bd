use soroban_sdk::{contracttype, Address, Env};

use crate::ContractError;

/// Schema version written by `GlobalPolicy::new`.
pub const POLICY_VERSION: u32 = 1;

/// Process-wide admin roles and the global emergency latch.
///
/// Every pool operation receives the policy by reference; pools read it but
/// never write it. The latch fields are private and the only mutator is
/// [`GlobalPolicy::engage_global_emergency`], so an engaged latch cannot be
/// cleared.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GlobalPolicy {
    /// May engage the global latch and any pool latch.
    pub emergency_admin: Address,
    /// May recover surplus reward reserve from pools.
    pub treasury_admin: Address,
    pub version: u32,
    global_emergency_engaged: bool,
    emergency_engaged_at: u64,
}

impl GlobalPolicy {
    /// Build the initial policy. The contract's own address is the host's
    /// null identity and is refused for either role.
    pub fn new(
        env: &Env,
        emergency_admin: Address,
        treasury_admin: Address,
    ) -> Result<Self, ContractError> {
        require_not_null(env, &emergency_admin)?;
        require_not_null(env, &treasury_admin)?;
        Ok(Self {
            emergency_admin,
            treasury_admin,
            version: POLICY_VERSION,
            global_emergency_engaged: false,
            emergency_engaged_at: 0,
        })
    }

    pub fn set_emergency_admin(
        &mut self,
        env: &Env,
        caller: &Address,
        new_admin: Address,
    ) -> Result<(), ContractError> {
        self.require_emergency_admin(caller)?;
        require_not_null(env, &new_admin)?;
        self.emergency_admin = new_admin;
        Ok(())
    }

    pub fn set_treasury_admin(
        &mut self,
        env: &Env,
        caller: &Address,
        new_admin: Address,
    ) -> Result<(), ContractError> {
        self.require_treasury_admin(caller)?;
        require_not_null(env, &new_admin)?;
        self.treasury_admin = new_admin;
        Ok(())
    }

    /// Engage the global latch. There is no inverse operation.
    pub fn engage_global_emergency(
        &mut self,
        caller: &Address,
        now: u64,
    ) -> Result<(), ContractError> {
        self.require_emergency_admin(caller)?;
        if self.global_emergency_engaged {
            return Err(ContractError::AlreadyEngaged);
        }
        self.global_emergency_engaged = true;
        self.emergency_engaged_at = now;
        Ok(())
    }

    pub fn is_global_emergency(&self) -> bool {
        self.global_emergency_engaged
    }

    /// Millisecond timestamp at which the global latch was engaged.
    pub fn emergency_engaged_at(&self) -> Option<u64> {
        if self.global_emergency_engaged {
            Some(self.emergency_engaged_at)
        } else {
            None
        }
    }

    pub fn require_emergency_admin(&self, caller: &Address) -> Result<(), ContractError> {
        if *caller != self.emergency_admin {
            return Err(ContractError::Unauthorized);
        }
        Ok(())
    }

    pub fn require_treasury_admin(&self, caller: &Address) -> Result<(), ContractError> {
        if *caller != self.treasury_admin {
            return Err(ContractError::Unauthorized);
        }
        Ok(())
    }

    /// Guard for operations that are refused while the global latch is set.
    pub fn require_no_global_emergency(&self) -> Result<(), ContractError> {
        if self.global_emergency_engaged {
            return Err(ContractError::GlobalEmergency);
        }
        Ok(())
    }
}

fn require_not_null(env: &Env, who: &Address) -> Result<(), ContractError> {
    if *who == env.current_contract_address() {
        return Err(ContractError::InvalidInput);
    }
    Ok(())
}
