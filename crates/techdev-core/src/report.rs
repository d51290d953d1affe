use crate::account::Account;
use crate::role::TechLeadCredential;
use crate::team::Team;
use crate::types::Role;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

// ---------------------------------------------------------------------------
// PlatformStats
// ---------------------------------------------------------------------------

/// Counts and derived scores over every account and team.
///
/// Recomputed in full on each call; nothing is cached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformStats {
    pub total_users: usize,
    pub tech_lead_count: usize,
    pub verified_tech_lead_count: usize,
    pub developer_intern_count: usize,
    pub unassigned_count: usize,
    pub total_teams: usize,
    pub teams_with_members: usize,
    pub total_members: usize,
    pub average_team_size: f64,
    /// 0–100, one decimal.
    pub platform_health_score: f64,
    /// Teams per intern as a percentage. Can exceed 100.
    pub team_formation_rate: f64,
}

impl PlatformStats {
    pub fn compute(
        accounts: &[Account],
        teams: &[Team],
        credentials: &[TechLeadCredential],
    ) -> Self {
        let total_users = accounts.len();
        let count_role = |role: Role| accounts.iter().filter(|a| a.role == role).count();
        let tech_lead_count = count_role(Role::TechLead);
        let developer_intern_count = count_role(Role::DeveloperIntern);
        let unassigned_count = count_role(Role::Unassigned);

        let active: HashSet<&str> = credentials
            .iter()
            .filter(|c| c.is_active())
            .map(|c| c.identifier.as_str())
            .collect();
        let verified_tech_lead_count = accounts
            .iter()
            .filter(|a| a.role == Role::TechLead && active.contains(a.identifier.as_str()))
            .count();

        let total_teams = teams.len();
        let teams_with_members = teams.iter().filter(|t| !t.is_empty()).count();
        let total_members: usize = teams.iter().map(|t| t.len()).sum();
        let average_team_size = ratio(total_members, total_teams);

        let platform_health_score = health_score(
            total_users - unassigned_count,
            total_users,
            teams_with_members,
            total_teams,
            tech_lead_count,
        );
        let team_formation_rate =
            total_teams as f64 / developer_intern_count.max(1) as f64 * 100.0;

        Self {
            total_users,
            tech_lead_count,
            verified_tech_lead_count,
            developer_intern_count,
            unassigned_count,
            total_teams,
            teams_with_members,
            total_members,
            average_team_size,
            platform_health_score,
            team_formation_rate,
        }
    }
}

/// `num / den`, or 0 when `den` is 0.
fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

/// Weighted score: 30 for role coverage, 40 for staffed teams, up to 30 for
/// tech lead share. Rounded to one decimal and capped at 100.
pub fn health_score(
    accounts_with_role: usize,
    total_accounts: usize,
    staffed_teams: usize,
    total_teams: usize,
    tech_leads: usize,
) -> f64 {
    let role_term = 30.0 * ratio(accounts_with_role, total_accounts);
    let team_term = 40.0 * ratio(staffed_teams, total_teams);
    let lead_term = (30.0 * ratio(tech_leads, total_accounts)).min(30.0);
    let score = ((role_term + team_term + lead_term) * 10.0).round() / 10.0;
    score.min(100.0)
}

// ---------------------------------------------------------------------------
// TeamStats
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamStats {
    pub team_size: usize,
    pub available_slots: usize,
    pub created_at: DateTime<Utc>,
}

impl TeamStats {
    pub fn for_team(team: &Team, capacity: usize) -> Self {
        Self {
            team_size: team.len(),
            available_slots: capacity.saturating_sub(team.len()),
            created_at: team.created_at,
        }
    }

    pub fn created_date(&self) -> String {
        self.created_at.format("%Y-%m-%d").to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
