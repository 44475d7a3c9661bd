extern crate std;

use soroban_sdk::{
    testutils::{Address as _, Ledger as _},
    Address, Env,
};

use crate::{ContractError, GlobalPolicy, StakePoolContract, StakePoolContractClient};

// ── Test helpers ─────────────────────────────────────────────────────────────

fn setup() -> (Env, StakePoolContractClient<'static>, Address, Address, Address) {
    let env = Env::default();
    env.mock_all_auths();

    let contract_id = env.register(StakePoolContract, ());
    let client = StakePoolContractClient::new(&env, &contract_id);

    let emergency_admin = Address::generate(&env);
    let treasury_admin = Address::generate(&env);
    client.initialize(&emergency_admin, &treasury_admin);

    (env, client, contract_id, emergency_admin, treasury_admin)
}

// ── Admin hand-over ──────────────────────────────────────────────────────────

#[test]
fn test_emergency_admin_hands_over_role() {
    let (env, client, _, emergency_admin, _) = setup();
    let successor = Address::generate(&env);

    client.set_emergency_admin(&emergency_admin, &successor);
    assert_eq!(client.get_policy().emergency_admin, successor);

    // The previous holder lost the role.
    let result = client.try_engage_global_emergency(&emergency_admin);
    match result {
        Err(Ok(e)) => assert_eq!(e, ContractError::Unauthorized),
        _ => unreachable!("Expected Unauthorized error"),
    }
    client.engage_global_emergency(&successor);
    assert!(client.is_global_emergency());
}

#[test]
fn test_treasury_admin_hands_over_role() {
    let (env, client, _, _, treasury_admin) = setup();
    let successor = Address::generate(&env);

    client.set_treasury_admin(&treasury_admin, &successor);
    assert_eq!(client.get_policy().treasury_admin, successor);
}

#[test]
fn test_roles_cannot_set_each_other() {
    let (env, client, _, emergency_admin, treasury_admin) = setup();
    let intruder = Address::generate(&env);

    let result = client.try_set_emergency_admin(&treasury_admin, &intruder);
    match result {
        Err(Ok(e)) => assert_eq!(e, ContractError::Unauthorized),
        _ => unreachable!("Expected Unauthorized error"),
    }

    let result = client.try_set_treasury_admin(&emergency_admin, &intruder);
    match result {
        Err(Ok(e)) => assert_eq!(e, ContractError::Unauthorized),
        _ => unreachable!("Expected Unauthorized error"),
    }

    let policy = client.get_policy();
    assert_eq!(policy.emergency_admin, emergency_admin);
    assert_eq!(policy.treasury_admin, treasury_admin);
}

#[test]
fn test_admin_cannot_be_contract_address() {
    let (_env, client, contract_id, emergency_admin, treasury_admin) = setup();

    let result = client.try_set_emergency_admin(&emergency_admin, &contract_id);
    match result {
        Err(Ok(e)) => assert_eq!(e, ContractError::InvalidInput),
        _ => unreachable!("Expected InvalidInput error"),
    }

    let result = client.try_set_treasury_admin(&treasury_admin, &contract_id);
    match result {
        Err(Ok(e)) => assert_eq!(e, ContractError::InvalidInput),
        _ => unreachable!("Expected InvalidInput error"),
    }
}

// ── Global emergency latch ───────────────────────────────────────────────────

#[test]
fn test_global_emergency_requires_emergency_admin() {
    let (_env, client, _, _, treasury_admin) = setup();

    let result = client.try_engage_global_emergency(&treasury_admin);
    match result {
        Err(Ok(e)) => assert_eq!(e, ContractError::Unauthorized),
        _ => unreachable!("Expected Unauthorized error"),
    }
    assert!(!client.is_global_emergency());
}

#[test]
fn test_global_emergency_is_one_way() {
    let (env, client, _, emergency_admin, _) = setup();
    env.ledger().set_timestamp(42);

    client.engage_global_emergency(&emergency_admin);
    let policy = client.get_policy();
    assert!(policy.is_global_emergency());
    assert_eq!(policy.emergency_engaged_at(), Some(42_000));

    let result = client.try_engage_global_emergency(&emergency_admin);
    match result {
        Err(Ok(e)) => assert_eq!(e, ContractError::AlreadyEngaged),
        _ => unreachable!("Expected AlreadyEngaged error"),
    }

    // Handing over the role does not clear the latch.
    let successor = Address::generate(&env);
    client.set_emergency_admin(&emergency_admin, &successor);
    assert!(client.is_global_emergency());
}

#[test]
fn test_global_emergency_false_before_initialize() {
    let env = Env::default();
    let contract_id = env.register(StakePoolContract, ());
    let client = StakePoolContractClient::new(&env, &contract_id);

    assert!(!client.is_global_emergency());
    assert!(!client.is_initialized());
    let result = client.try_get_policy();
    match result {
        Err(Ok(e)) => assert_eq!(e, ContractError::NotInitialized),
        _ => unreachable!("Expected NotInitialized error"),
    }
}

// ── GlobalPolicy in isolation ────────────────────────────────────────────────

#[test]
fn test_policy_guards() {
    let env = Env::default();
    let contract_id = env.register(StakePoolContract, ());
    let emergency_admin = Address::generate(&env);
    let treasury_admin = Address::generate(&env);

    let mut policy = env
        .as_contract(&contract_id, || {
            GlobalPolicy::new(&env, emergency_admin.clone(), treasury_admin.clone())
        })
        .unwrap();

    assert_eq!(policy.emergency_engaged_at(), None);
    assert!(policy.require_no_global_emergency().is_ok());
    assert!(policy.require_emergency_admin(&emergency_admin).is_ok());
    assert_eq!(
        policy.require_emergency_admin(&treasury_admin),
        Err(ContractError::Unauthorized)
    );
    assert!(policy.require_treasury_admin(&treasury_admin).is_ok());
    assert_eq!(
        policy.require_treasury_admin(&emergency_admin),
        Err(ContractError::Unauthorized)
    );

    policy.engage_global_emergency(&emergency_admin, 7).unwrap();
    assert_eq!(
        policy.require_no_global_emergency(),
        Err(ContractError::GlobalEmergency)
    );

    let refused = env.as_contract(&contract_id, || {
        GlobalPolicy::new(&env, contract_id.clone(), treasury_admin.clone())
    });
    assert_eq!(refused, Err(ContractError::InvalidInput));
}
