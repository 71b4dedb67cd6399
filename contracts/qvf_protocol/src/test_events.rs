extern crate std;

use soroban_sdk::{
    symbol_short,
    testutils::{Address as _, Events, Ledger},
    token, vec, Address, Env, IntoVal, String, TryIntoVal, Val,
};

use crate::events::{
    DistributionCompleted, EmergencyWithdrawal, FundsDistributed, PoolFunded, ProjectCreated,
    ProjectPaused, VoteCast,
};
use crate::{QvfProtocol, QvfProtocolClient, DEFAULT_MIN_CONTRIBUTION, DEFAULT_VOTING_PERIOD};

fn setup_with_init() -> (Env, QvfProtocolClient<'static>, Address, token::Client<'static>) {
    let env = Env::default();
    env.mock_all_auths();
    let contract_id = env.register(QvfProtocol, ());
    let client = QvfProtocolClient::new(&env, &contract_id);
    let admin = Address::generate(&env);
    let token_admin = Address::generate(&env);
    let addr = env.register_stellar_asset_contract_v2(token_admin);
    let token = token::Client::new(&env, &addr.address());
    client.init(
        &admin,
        &token.address,
        &DEFAULT_MIN_CONTRIBUTION,
        &DEFAULT_VOTING_PERIOD,
    );
    (env, client, admin, token)
}

fn register(env: &Env, client: &QvfProtocolClient, beneficiary: &Address) -> u64 {
    client.create_project(
        &Address::generate(env),
        &String::from_str(env, "Night market"),
        &String::from_str(env, "Lights and stalls"),
        beneficiary,
        &2_500i128,
    )
}

fn mint(env: &Env, token: &token::Client, to: &Address, amount: i128) {
    token::StellarAssetClient::new(env, &token.address).mint(to, &amount);
}

/// The last event published by the contract, as (topics, data).
fn last_contract_event(env: &Env, client: &QvfProtocolClient) -> (soroban_sdk::Vec<Val>, Val) {
    let all_events = env.events().all();
    let (contract, topics, data) = all_events
        .iter()
        .filter(|(contract, _, _)| *contract == client.address)
        .last()
        .expect("No events found");
    assert_eq!(contract, client.address);
    (topics, data)
}

#[test]
fn test_project_created_event() {
    let (env, client, _admin, _token) = setup_with_init();
    let beneficiary = Address::generate(&env);
    env.ledger().set_timestamp(50);
    let id = register(&env, &client, &beneficiary);
    let project = client.get_project(&id);

    let (topics, data) = last_contract_event(&env, &client);

    // Topic: (symbol_short!("created"), project_id)
    let expected_topics: soroban_sdk::Vec<Val> = vec![
        &env,
        symbol_short!("created").into_val(&env),
        id.into_val(&env),
    ];
    assert_eq!(topics, expected_topics);

    let event_data: ProjectCreated = data.try_into_val(&env).unwrap();
    assert_eq!(
        event_data,
        ProjectCreated {
            project_id: id,
            proposer: project.proposer,
            beneficiary,
            funding_goal: 2_500,
            deadline: 50 + DEFAULT_VOTING_PERIOD,
        }
    );
}

#[test]
fn test_vote_cast_event() {
    let (env, client, _admin, token) = setup_with_init();
    let id = register(&env, &client, &Address::generate(&env));
    let voter = Address::generate(&env);
    mint(&env, &token, &voter, 1_000);

    client.cast_vote(&voter, &id, &100);
    client.cast_vote(&voter, &id, &125);

    let (topics, data) = last_contract_event(&env, &client);
    let expected_topics: soroban_sdk::Vec<Val> = vec![
        &env,
        symbol_short!("voted").into_val(&env),
        id.into_val(&env),
    ];
    assert_eq!(topics, expected_topics);

    let event_data: VoteCast = data.try_into_val(&env).unwrap();
    assert_eq!(
        event_data,
        VoteCast {
            project_id: id,
            voter,
            amount: 125,
            voter_power: 15,
            project_power: 15,
        }
    );
}

#[test]
fn test_pool_funded_event() {
    let (env, client, _admin, token) = setup_with_init();
    let funder = Address::generate(&env);
    mint(&env, &token, &funder, 900);
    client.fund_pool(&funder, &900);

    let (topics, data) = last_contract_event(&env, &client);
    let expected_topics: soroban_sdk::Vec<Val> = vec![&env, symbol_short!("pool_in").into_val(&env)];
    assert_eq!(topics, expected_topics);
    let event_data: PoolFunded = data.try_into_val(&env).unwrap();
    assert_eq!(
        event_data,
        PoolFunded {
            funder,
            amount: 900,
            pool_total: 900,
        }
    );
}

#[test]
fn test_distribution_events() {
    let (env, client, _admin, token) = setup_with_init();
    let beneficiary = Address::generate(&env);
    let id = register(&env, &client, &beneficiary);
    let voter = Address::generate(&env);
    mint(&env, &token, &voter, 400);
    client.cast_vote(&voter, &id, &400);

    env.ledger().set_timestamp(DEFAULT_VOTING_PERIOD + 1);
    client.distribute_funds();

    let (topics, data) = last_contract_event(&env, &client);
    let expected_topics: soroban_sdk::Vec<Val> =
        vec![&env, symbol_short!("dist_done").into_val(&env)];
    assert_eq!(topics, expected_topics);
    let summary: DistributionCompleted = data.try_into_val(&env).unwrap();
    assert_eq!(
        summary,
        DistributionCompleted {
            pool_before: 400,
            total_paid: 400,
            projects_paid: 1,
        }
    );

    let paid_topics: soroban_sdk::Vec<Val> = vec![
        &env,
        symbol_short!("paid").into_val(&env),
        id.into_val(&env),
    ];
    let paid: std::vec::Vec<FundsDistributed> = env
        .events()
        .all()
        .iter()
        .filter(|(contract, topics, _)| *contract == client.address && *topics == paid_topics)
        .map(|(_, _, data)| {
            let event: FundsDistributed = data.try_into_val(&env).unwrap();
            event
        })
        .collect();
    assert_eq!(
        paid,
        std::vec![FundsDistributed {
            project_id: id,
            beneficiary,
            amount: 400,
        }]
    );
}

#[test]
fn test_admin_events() {
    let (env, client, admin, token) = setup_with_init();
    let id = register(&env, &client, &Address::generate(&env));

    client.pause_project(&admin, &id);
    let (topics, data) = last_contract_event(&env, &client);
    let expected_topics: soroban_sdk::Vec<Val> = vec![
        &env,
        symbol_short!("paused").into_val(&env),
        id.into_val(&env),
    ];
    assert_eq!(topics, expected_topics);
    let paused: ProjectPaused = data.try_into_val(&env).unwrap();
    assert_eq!(
        paused,
        ProjectPaused {
            project_id: id,
            admin: admin.clone(),
        }
    );

    let funder = Address::generate(&env);
    mint(&env, &token, &funder, 300);
    client.fund_pool(&funder, &300);
    client.emergency_withdraw(&admin);

    let (topics, data) = last_contract_event(&env, &client);
    let expected_topics: soroban_sdk::Vec<Val> =
        vec![&env, symbol_short!("emergency").into_val(&env)];
    assert_eq!(topics, expected_topics);
    let withdrawal: EmergencyWithdrawal = data.try_into_val(&env).unwrap();
    assert_eq!(withdrawal, EmergencyWithdrawal { admin, amount: 300 });
}
