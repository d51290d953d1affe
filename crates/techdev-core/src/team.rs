use crate::account::{self, Account};
use crate::config::{LeaderFilter, RosterConfig};
use crate::error::{Result, TechDevError};
use crate::paths::TEAMS_KEY;
use crate::store::{self, DocumentStore};
use crate::types::Role;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Member
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    pub name: String,
    /// Collaboration-platform username, unique per team ignoring case.
    pub external_handle: String,
    pub added_at: DateTime<Utc>,
}

fn clean_handle(handle: &str) -> &str {
    let h = handle.trim();
    h.strip_prefix('@').unwrap_or(h).trim()
}

// ---------------------------------------------------------------------------
// Team
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    pub team_id: String,
    pub leader: String,
    /// Display order; positions shown to users are 1-based.
    pub members: Vec<Member>,
    pub created_at: DateTime<Utc>,
}

impl Team {
    pub fn new(leader: impl Into<String>) -> Self {
        Self {
            team_id: Uuid::new_v4().to_string(),
            leader: leader.into(),
            members: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn has_handle(&self, handle: &str) -> bool {
        let wanted = handle.to_lowercase();
        self.members
            .iter()
            .any(|m| m.external_handle.to_lowercase() == wanted)
    }

    /// Append a member. Rejects a full team or a handle already present.
    pub fn add_member(&mut self, name: &str, handle: &str, capacity: usize) -> Result<&Member> {
        let name = name.trim();
        let handle = clean_handle(handle);
        if name.is_empty() {
            return Err(TechDevError::MissingField("name"));
        }
        if handle.is_empty() {
            return Err(TechDevError::MissingField("external_handle"));
        }
        if self.members.len() >= capacity {
            return Err(TechDevError::TeamFull { capacity });
        }
        if self.has_handle(handle) {
            return Err(TechDevError::DuplicateHandle(handle.to_string()));
        }
        self.members.push(Member {
            name: name.to_string(),
            external_handle: handle.to_string(),
            added_at: Utc::now(),
        });
        Ok(&self.members[self.members.len() - 1])
    }

    /// Remove the member at 1-based `position`; later members shift up.
    pub fn remove_member(&mut self, position: usize) -> Result<Member> {
        let len = self.members.len();
        if position == 0 || position > len {
            return Err(TechDevError::IndexOutOfRange { position, len });
        }
        Ok(self.members.remove(position - 1))
    }

    pub fn summary(&self, capacity: usize) -> TeamSummary {
        TeamSummary {
            team_id: self.team_id.clone(),
            leader: self.leader.clone(),
            members: self.members.clone(),
            created_at: self.created_at,
            member_count: self.members.len(),
            available_slots: capacity.saturating_sub(self.members.len()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamSummary {
    pub team_id: String,
    pub leader: String,
    pub members: Vec<Member>,
    pub created_at: DateTime<Utc>,
    pub member_count: usize,
    pub available_slots: usize,
}

/// All teams, oldest first. Degrades to empty on read failure.
pub fn list_teams(store: &dyn DocumentStore) -> Vec<Team> {
    let mut teams: Vec<Team> = store::read_entries(store, TEAMS_KEY)
        .into_iter()
        .map(|(_, t)| t)
        .collect();
    teams.sort_by(|a: &Team, b: &Team| {
        a.created_at
            .cmp(&b.created_at)
            .then_with(|| a.team_id.cmp(&b.team_id))
    });
    teams
}

// ---------------------------------------------------------------------------
// TeamRoster
// ---------------------------------------------------------------------------

/// Teams keyed by leader; every mutation is one atomic store update.
pub struct TeamRoster {
    store: Arc<dyn DocumentStore>,
    config: RosterConfig,
}

impl TeamRoster {
    pub fn new(store: Arc<dyn DocumentStore>, config: RosterConfig) -> Self {
        Self { store, config }
    }

    pub fn capacity(&self) -> usize {
        self.config.max_members
    }

    /// Return the leader's team, creating an empty one on first access.
    ///
    /// Only the first call for a leader writes to the store.
    pub fn get_or_create(&self, leader: &str) -> Result<Team> {
        let doc = self.store.load(TEAMS_KEY)?;
        if let Some(team) = store::decode_entry::<Team>(&doc, leader)? {
            return Ok(team);
        }
        self.with_team(leader, |_| Ok(()))
    }

    pub fn add_member(&self, leader: &str, name: &str, handle: &str) -> Result<Team> {
        let capacity = self.capacity();
        let team = self.with_team(leader, |team| {
            team.add_member(name, handle, capacity).map(|_| ())
        })?;
        tracing::info!(leader, team_id = %team.team_id, size = team.len(), "member added");
        Ok(team)
    }

    pub fn remove_member(&self, leader: &str, position: usize) -> Result<(Team, Member)> {
        let mut removed = None;
        let team = self.with_team(leader, |team| {
            removed = Some(team.remove_member(position)?);
            Ok(())
        })?;
        let member = removed.ok_or(TechDevError::IndexOutOfRange {
            position,
            len: team.len(),
        })?;
        tracing::info!(leader, team_id = %team.team_id, handle = %member.external_handle, "member removed");
        Ok((team, member))
    }

    /// One summary per team whose leader is a known account, oldest first.
    pub fn list_all_teams(&self) -> Vec<TeamSummary> {
        let accounts: HashMap<String, Account> = account::list_accounts(self.store.as_ref())
            .into_iter()
            .map(|a| (a.identifier.clone(), a))
            .collect();
        list_teams(self.store.as_ref())
            .into_iter()
            .filter(|t| match accounts.get(&t.leader) {
                None => false,
                Some(a) => match self.config.leader_filter {
                    LeaderFilter::DeveloperInterns => a.role == Role::DeveloperIntern,
                    LeaderFilter::AnyAccount => true,
                },
            })
            .map(|t| t.summary(self.capacity()))
            .collect()
    }

    fn with_team(&self, leader: &str, mut apply: impl FnMut(&mut Team) -> Result<()>) -> Result<Team> {
        let mut result: Option<Team> = None;
        self.store.update(TEAMS_KEY, &mut |doc| {
            let mut team = match store::decode_entry::<Team>(doc, leader)? {
                Some(t) => t,
                None => {
                    let t = Team::new(leader);
                    tracing::info!(leader, team_id = %t.team_id, "team created");
                    t
                }
            };
            apply(&mut team)?;
            store::encode_entry(doc, leader, &team)?;
            result = Some(team);
            Ok(())
        })?;
        result.ok_or_else(|| TechDevError::StoreUnavailable("team update produced no result".to_string()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
