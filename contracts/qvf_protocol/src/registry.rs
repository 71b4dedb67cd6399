//! # Project registry
//!
//! Creation, eligibility and deactivation of projects. Projects are never
//! deleted; the registry only ever flips `is_active` off.

use soroban_sdk::{Address, Env, String, Vec};

use crate::storage::{
    get_and_increment_project_id, get_project_count, load_project_config, load_project_state,
    save_project, save_project_state,
};
use crate::types::{Project, ProjectConfig, ProjectState, ProjectStatus, ProtocolConfig};
use crate::Error;

/// Validate and store a new project. Returns its configuration.
#[allow(clippy::too_many_arguments)]
pub fn create(
    env: &Env,
    protocol: &ProtocolConfig,
    proposer: Address,
    title: String,
    description: String,
    beneficiary: Address,
    funding_goal: i128,
    now: u64,
) -> Result<ProjectConfig, Error> {
    if title.len() == 0 || description.len() == 0 {
        return Err(Error::EmptyField);
    }
    // The contract paying itself would strand the allocation.
    if beneficiary == env.current_contract_address() {
        return Err(Error::InvalidBeneficiary);
    }
    if funding_goal <= 0 {
        return Err(Error::ZeroGoal);
    }
    let deadline = now
        .checked_add(protocol.voting_period)
        .ok_or(Error::ArithmeticOverflow)?;

    let config = ProjectConfig {
        id: get_and_increment_project_id(env),
        proposer,
        title,
        description,
        beneficiary,
        funding_goal,
        created_at: now,
        deadline,
    };
    save_project(env, &config, &ProjectState::new());
    Ok(config)
}

/// Active, past its deadline, and not yet paid.
pub fn is_eligible_for_payout(config: &ProjectConfig, state: &ProjectState, now: u64) -> bool {
    state.is_active && now > config.deadline && !state.funds_withdrawn
}

/// Check that a project can take a vote at `now`.
pub fn ensure_open(config: &ProjectConfig, state: &ProjectState, now: u64) -> Result<(), Error> {
    if !state.is_active {
        return Err(Error::ProjectInactive);
    }
    if now > config.deadline {
        return Err(Error::DeadlinePassed);
    }
    Ok(())
}

pub fn status(config: &ProjectConfig, state: &ProjectState, now: u64) -> ProjectStatus {
    if state.funds_withdrawn {
        ProjectStatus::Paid
    } else if !state.is_active {
        ProjectStatus::Paused
    } else if now > config.deadline {
        ProjectStatus::ClosedPendingPayout
    } else {
        ProjectStatus::Open
    }
}

/// Deactivate a project unconditionally.
///
/// Overwriting `is_active` on a paid or already paused project is a no-op.
pub fn pause(env: &Env, project_id: u64) -> Result<(), Error> {
    let mut state = load_project_state(env, project_id)?;
    state.is_active = false;
    save_project_state(env, project_id, &state);
    Ok(())
}

/// Load the full `Project` by combining config and state.
pub fn load(env: &Env, project_id: u64, now: u64) -> Result<Project, Error> {
    let config = load_project_config(env, project_id)?;
    let state = load_project_state(env, project_id)?;
    let status = status(&config, &state, now);
    Ok(Project {
        id: config.id,
        proposer: config.proposer,
        title: config.title,
        description: config.description,
        beneficiary: config.beneficiary,
        funding_goal: config.funding_goal,
        total_funding: state.total_funding,
        voting_power: state.voting_power,
        voter_count: state.voter_count,
        created_at: config.created_at,
        deadline: config.deadline,
        is_active: state.is_active,
        funds_withdrawn: state.funds_withdrawn,
        status,
    })
}

/// IDs of projects currently accepting votes, in creation order.
pub fn active_project_ids(env: &Env, now: u64) -> Result<Vec<u64>, Error> {
    let mut ids = Vec::new(env);
    for id in 0..get_project_count(env) {
        let config = load_project_config(env, id)?;
        let state = load_project_state(env, id)?;
        if ensure_open(&config, &state, now).is_ok() {
            ids.push_back(id);
        }
    }
    Ok(ids)
}
