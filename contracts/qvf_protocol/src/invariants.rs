#![allow(dead_code)]

extern crate std;

use crate::math::voting_power;
use crate::types::{ContributionRecord, Project, ProjectStatus};

/// INV-1: Funding and power are never negative.
pub fn assert_totals_non_negative(project: &Project) {
    assert!(
        project.total_funding >= 0 && project.voting_power >= 0,
        "INV-1 violated: project {} has negative totals (funding {}, power {})",
        project.id,
        project.total_funding,
        project.voting_power
    );
}

/// INV-2: Project goal must always be positive.
pub fn assert_goal_positive(project: &Project) {
    assert!(
        project.funding_goal > 0,
        "INV-2 violated: project {} has non-positive goal ({})",
        project.id,
        project.funding_goal
    );
}

/// INV-3: The deadline lies strictly after creation.
pub fn assert_deadline_after_creation(project: &Project) {
    assert!(
        project.deadline > project.created_at,
        "INV-3 violated: project {} closes at {} but was created at {}",
        project.id,
        project.deadline,
        project.created_at
    );
}

/// INV-4: A paid project is never active.
pub fn assert_withdrawn_implies_inactive(project: &Project) {
    if project.funds_withdrawn {
        assert!(
            !project.is_active,
            "INV-4 violated: project {} is paid but still active",
            project.id
        );
    }
}

/// INV-5: The derived status agrees with the flags it is derived from.
pub fn assert_status_matches_flags(project: &Project) {
    let consistent = match project.status {
        ProjectStatus::Paid => project.funds_withdrawn,
        ProjectStatus::Paused => !project.is_active && !project.funds_withdrawn,
        ProjectStatus::Open | ProjectStatus::ClosedPendingPayout => {
            project.is_active && !project.funds_withdrawn
        }
    };
    assert!(
        consistent,
        "INV-5 violated: project {} has status {:?} with active={} withdrawn={}",
        project.id,
        project.status,
        project.is_active,
        project.funds_withdrawn
    );
}

/// INV-6: isqrt(a) <= a, so power can never exceed the funding behind it.
pub fn assert_power_bounded_by_funding(project: &Project) {
    assert!(
        project.voting_power <= project.total_funding,
        "INV-6 violated: project {} has power {} above funding {}",
        project.id,
        project.voting_power,
        project.total_funding
    );
}

/// INV-7: A record's cached power is the root of its cumulative amount.
pub fn assert_record_power(record: &ContributionRecord) {
    assert_eq!(
        record.power,
        voting_power(record.amount),
        "INV-7 violated: record with amount {} caches power {}",
        record.amount,
        record.power
    );
}

/// INV-8: Project IDs are sequential starting from 0.
pub fn assert_sequential_ids(projects: &[Project]) {
    for (i, project) in projects.iter().enumerate() {
        assert_eq!(
            project.id, i as u64,
            "INV-8 violated: expected id {}, got {}",
            i, project.id
        );
    }
}

/// INV-9: A distribution never pays out more than the pool, and loses less
/// than one base unit per eligible project to flooring.
pub fn assert_distribution_invariant(pool_before: i128, paid: i128, eligible: u32) {
    assert!(
        paid <= pool_before,
        "INV-9 violated: paid {} out of a pool of {}",
        paid,
        pool_before
    );
    assert!(
        pool_before - paid < eligible as i128,
        "INV-9 violated: lost {} to rounding across {} projects",
        pool_before - paid,
        eligible
    );
}

/// Run all stateless project invariants.
pub fn assert_all_project_invariants(project: &Project) {
    assert_totals_non_negative(project);
    assert_goal_positive(project);
    assert_deadline_after_creation(project);
    assert_withdrawn_implies_inactive(project);
    assert_status_matches_flags(project);
    assert_power_bounded_by_funding(project);
}
