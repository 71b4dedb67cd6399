extern crate std;

use soroban_sdk::{
    testutils::{Address as _, Ledger},
    token, Address, Env, String,
};

use crate::invariants::{assert_all_project_invariants, assert_distribution_invariant};
use crate::{
    Error, Payout, ProjectStatus, QvfProtocol, QvfProtocolClient, DEFAULT_MIN_CONTRIBUTION,
    DEFAULT_VOTING_PERIOD,
};

/// A token whose transfers can be switched off, to drive payout failures.
mod blocking_token {
    use soroban_sdk::{contract, contractimpl, symbol_short, Address, Env};

    #[contract]
    pub struct BlockingToken;

    #[contractimpl]
    impl BlockingToken {
        pub fn set_blocked(env: Env, blocked: bool) {
            env.storage()
                .instance()
                .set(&symbol_short!("blocked"), &blocked);
        }

        pub fn transfer(env: Env, _from: Address, _to: Address, _amount: i128) {
            let blocked: bool = env
                .storage()
                .instance()
                .get(&symbol_short!("blocked"))
                .unwrap_or(false);
            if blocked {
                panic!("transfers blocked");
            }
        }

        pub fn balance(_env: Env, _id: Address) -> i128 {
            0
        }
    }
}

use blocking_token::{BlockingToken, BlockingTokenClient};

fn setup_with_init() -> (Env, QvfProtocolClient<'static>, token::Client<'static>) {
    let env = Env::default();
    env.mock_all_auths();
    let contract_id = env.register(QvfProtocol, ());
    let client = QvfProtocolClient::new(&env, &contract_id);

    let admin = Address::generate(&env);
    let token_admin = Address::generate(&env);
    let sac = env.register_stellar_asset_contract_v2(token_admin);
    let token = token::Client::new(&env, &sac.address());
    client.init(
        &admin,
        &token.address,
        &DEFAULT_MIN_CONTRIBUTION,
        &DEFAULT_VOTING_PERIOD,
    );
    (env, client, token)
}

fn create_project(env: &Env, client: &QvfProtocolClient) -> (u64, Address) {
    let beneficiary = Address::generate(env);
    let id = client.create_project(
        &Address::generate(env),
        &String::from_str(env, "Shared tools"),
        &String::from_str(env, "A lending shed for the block"),
        &beneficiary,
        &1_000i128,
    );
    (id, beneficiary)
}

fn vote(env: &Env, client: &QvfProtocolClient, token: &token::Client, id: u64, amount: i128) {
    let voter = Address::generate(env);
    token::StellarAssetClient::new(env, &token.address).mint(&voter, &amount);
    client.cast_vote(&voter, &id, &amount);
}

fn close_voting(env: &Env) {
    env.ledger().set_timestamp(DEFAULT_VOTING_PERIOD + 1);
}

#[test]
fn test_proportional_split_with_rounding_loss() {
    let (env, client, token) = setup_with_init();
    let (a, beneficiary_a) = create_project(&env, &client);
    let (b, beneficiary_b) = create_project(&env, &client);
    vote(&env, &client, &token, a, 100);
    vote(&env, &client, &token, b, 400);
    assert_eq!(client.get_pool_total(), 500);

    close_voting(&env);
    let payouts = client.distribute_funds();

    assert_eq!(
        payouts,
        soroban_sdk::vec![
            &env,
            Payout {
                project_id: a,
                beneficiary: beneficiary_a.clone(),
                amount: 166,
            },
            Payout {
                project_id: b,
                beneficiary: beneficiary_b.clone(),
                amount: 333,
            }
        ]
    );
    assert_eq!(token.balance(&beneficiary_a), 166);
    assert_eq!(token.balance(&beneficiary_b), 333);

    // The flooring residue stays in the contract but leaves the pool.
    assert_eq!(token.balance(&client.address), 1);
    assert_eq!(client.get_pool_total(), 0);

    for id in [a, b] {
        let project = client.get_project(&id);
        assert!(project.funds_withdrawn);
        assert!(!project.is_active);
        assert_eq!(project.status, ProjectStatus::Paid);
        assert_all_project_invariants(&project);
    }
}

#[test]
fn test_second_distribution_has_nothing_to_pay() {
    let (env, client, token) = setup_with_init();
    let (a, _) = create_project(&env, &client);
    vote(&env, &client, &token, a, 100);
    close_voting(&env);

    client.distribute_funds();
    assert_eq!(
        client.try_distribute_funds(),
        Err(Ok(Error::NoEligibleProjects))
    );
}

#[test]
fn test_distribution_before_any_deadline_fails() {
    let (env, client, token) = setup_with_init();
    let (a, _) = create_project(&env, &client);
    vote(&env, &client, &token, a, 100);

    assert_eq!(
        client.try_distribute_funds(),
        Err(Ok(Error::NoEligibleProjects))
    );
    assert_eq!(client.get_pool_total(), 100);
}

#[test]
fn test_distribution_without_votes_fails() {
    let (env, client, token) = setup_with_init();
    create_project(&env, &client);
    let funder = Address::generate(&env);
    token::StellarAssetClient::new(&env, &token.address).mint(&funder, &1_000);
    client.fund_pool(&funder, &1_000);
    close_voting(&env);

    assert_eq!(client.try_distribute_funds(), Err(Ok(Error::NoVotesCast)));
    assert_eq!(client.get_pool_total(), 1_000);
}

#[test]
fn test_open_projects_are_untouched_but_share_the_pool() {
    let (env, client, token) = setup_with_init();
    let (a, beneficiary_a) = create_project(&env, &client);
    vote(&env, &client, &token, a, 100);

    env.ledger().set_timestamp(1_000);
    let (c, beneficiary_c) = create_project(&env, &client);
    vote(&env, &client, &token, c, 400);
    let before = client.get_project(&c);

    close_voting(&env);
    let payouts = client.distribute_funds();

    // Only A is eligible, and the whole pool is split among eligible projects.
    assert_eq!(payouts.len(), 1);
    assert_eq!(token.balance(&beneficiary_a), 500);
    assert_eq!(token.balance(&beneficiary_c), 0);
    assert_eq!(client.get_project(&c), before);
    assert_eq!(client.get_project(&c).status, ProjectStatus::Open);
}

#[test]
fn test_paused_projects_are_excluded() {
    let (env, client, token) = setup_with_init();
    let (a, beneficiary_a) = create_project(&env, &client);
    let (b, beneficiary_b) = create_project(&env, &client);
    vote(&env, &client, &token, a, 100);
    vote(&env, &client, &token, b, 400);
    client.pause_project(&client.get_admin(), &b);

    close_voting(&env);
    client.distribute_funds();

    assert_eq!(token.balance(&beneficiary_a), 500);
    assert_eq!(token.balance(&beneficiary_b), 0);
    let paused = client.get_project(&b);
    assert!(!paused.funds_withdrawn);
    assert_eq!(paused.status, ProjectStatus::Paused);
}

#[test]
fn test_pause_after_payout_is_a_no_op() {
    let (env, client, token) = setup_with_init();
    let (a, _) = create_project(&env, &client);
    vote(&env, &client, &token, a, 100);
    close_voting(&env);
    client.distribute_funds();

    let paid = client.get_project(&a);
    client.pause_project(&client.get_admin(), &a);
    assert_eq!(client.get_project(&a), paid);
    assert_eq!(client.get_project(&a).status, ProjectStatus::Paid);
}

#[test]
fn test_zero_allocations_are_skipped() {
    let (env, client, token) = setup_with_init();
    let (a, beneficiary_a) = create_project(&env, &client);
    vote(&env, &client, &token, a, 100);
    client.emergency_withdraw(&client.get_admin());
    close_voting(&env);

    let payouts = client.distribute_funds();
    assert!(payouts.is_empty());
    assert_eq!(token.balance(&beneficiary_a), 0);

    // Untouched, so still waiting for a payout.
    let project = client.get_project(&a);
    assert!(!project.funds_withdrawn);
    assert!(client.is_eligible(&a));
}

#[test]
fn test_failed_transfer_rolls_back_everything() {
    let env = Env::default();
    env.mock_all_auths();
    let client = QvfProtocolClient::new(&env, &env.register(QvfProtocol, ()));
    let token = BlockingTokenClient::new(&env, &env.register(BlockingToken, ()));
    let admin = Address::generate(&env);
    client.init(
        &admin,
        &token.address,
        &DEFAULT_MIN_CONTRIBUTION,
        &DEFAULT_VOTING_PERIOD,
    );

    let (a, _) = create_project(&env, &client);
    let (b, _) = create_project(&env, &client);
    client.cast_vote(&Address::generate(&env), &a, &100);
    client.cast_vote(&Address::generate(&env), &b, &400);
    close_voting(&env);

    let before_a = client.get_project(&a);
    let before_b = client.get_project(&b);

    token.set_blocked(&true);
    assert_eq!(
        client.try_distribute_funds(),
        Err(Ok(Error::TransferFailed))
    );
    assert_eq!(client.get_project(&a), before_a);
    assert_eq!(client.get_project(&b), before_b);
    assert_eq!(client.get_pool_total(), 500);

    token.set_blocked(&false);
    let payouts = client.distribute_funds();
    assert_eq!(payouts.len(), 2);
    assert_eq!(client.get_pool_total(), 0);
}

#[test]
fn test_rounding_loss_is_bounded_by_eligible_count() {
    let cases: [&[i128]; 4] = [
        &[100, 400],
        &[101, 257, 999, 12_345],
        &[100, 100, 100],
        &[7_919, 104_729, 1_299_709, 100, 15_485_863],
    ];

    for amounts in cases {
        let (env, client, token) = setup_with_init();
        for amount in amounts.iter() {
            let (id, _) = create_project(&env, &client);
            vote(&env, &client, &token, id, *amount);
        }
        close_voting(&env);

        let pool_before = client.get_pool_total();
        let payouts = client.distribute_funds();
        let paid: i128 = payouts.iter().map(|p| p.amount).sum();

        assert_distribution_invariant(pool_before, paid, amounts.len() as u32);
        assert_eq!(token.balance(&client.address), pool_before - paid);
    }
}
