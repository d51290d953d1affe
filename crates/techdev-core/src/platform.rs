//! Session-aware entry points tying the components together.
//!
//! Every operation takes the caller's [`Session`] explicitly. Role checks
//! read the stored account on each call, so a role cached in the session is
//! only used for display.

use crate::account::{self, CredentialStore, IdentityProvider};
use crate::config::Config;
use crate::error::{Result, TechDevError};
use crate::metrics::{MetricsSink, WindowedMetrics};
use crate::report::{PlatformStats, TeamStats};
use crate::role::{self, RoleAssignment};
use crate::session::Session;
use crate::standup::{StandupEntry, StandupLog};
use crate::store::{DocumentStore, FileStore, MemoryStore};
use crate::team::{self, Member, Team, TeamRoster, TeamSummary};
use crate::types::{Page, Role, RoleState};
use chrono::Duration;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

pub struct Platform {
    config: Config,
    store: Arc<dyn DocumentStore>,
    identity: Box<dyn IdentityProvider>,
    roles: RoleAssignment,
    roster: TeamRoster,
    standups: StandupLog,
    metrics: WindowedMetrics,
}

impl Platform {
    /// Open the file-backed platform rooted at `root`.
    pub fn open(root: &Path) -> Result<Self> {
        let config = Config::load(root)?;
        Ok(Self::with_store(config, Arc::new(FileStore::new(root))))
    }

    pub fn in_memory(config: Config) -> Self {
        Self::with_store(config, Arc::new(MemoryStore::new()))
    }

    pub fn with_store(config: Config, store: Arc<dyn DocumentStore>) -> Self {
        let identity = Box::new(CredentialStore::new(
            Arc::clone(&store),
            config.password.clone(),
            config.hashing.clone(),
        ));
        let roles = RoleAssignment::new(Arc::clone(&store), config.token.clone());
        let roster = TeamRoster::new(Arc::clone(&store), config.roster.clone());
        let standups = StandupLog::new(Arc::clone(&store));
        let metrics = WindowedMetrics::new(
            config.metrics.capacity,
            Duration::minutes(config.metrics.window_minutes.max(1)),
        );
        Self {
            config,
            store,
            identity,
            roles,
            roster,
            standups,
            metrics,
        }
    }

    /// Swap the identity provider, e.g. for a hosted auth service.
    pub fn with_identity(mut self, identity: Box<dyn IdentityProvider>) -> Self {
        self.identity = identity;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn metrics(&self) -> &WindowedMetrics {
        &self.metrics
    }

    pub fn roles(&self) -> &RoleAssignment {
        &self.roles
    }

    pub fn new_session(&self) -> Session {
        Session::new(&self.config.rate_limit)
    }

    fn timed<T>(&self, op: &str, f: impl FnOnce() -> Result<T>) -> Result<T> {
        let started = Instant::now();
        let result = f();
        self.metrics
            .record(op, started.elapsed().as_secs_f64() * 1000.0);
        result
    }

    // -----------------------------------------------------------------------
    // Accounts and sessions
    // -----------------------------------------------------------------------

    pub fn register(&self, identifier: &str, secret: &str) -> Result<()> {
        self.timed("register", || self.identity.sign_up(identifier, secret))
    }

    /// Rate-limited login. Only credential failures count toward lockout.
    pub fn login(&self, session: &mut Session, identifier: &str, secret: &str) -> Result<Role> {
        self.timed("login", || {
            if let Err(e) = session.limiter_mut().check() {
                tracing::warn!(identifier, "login refused: rate limited");
                return Err(e);
            }
            match self.identity.sign_in(identifier, secret) {
                Ok(verified) => {
                    session.limiter_mut().record_success();
                    let role = self.roles.role_of(&verified.identifier);
                    session.sign_in(verified.identifier, role);
                    Ok(role)
                }
                Err(TechDevError::InvalidCredentials) => {
                    session.limiter_mut().record_failure();
                    tracing::info!(
                        identifier,
                        attempts = session.limiter().failed_attempts(),
                        "failed login attempt"
                    );
                    Err(TechDevError::InvalidCredentials)
                }
                Err(e) => Err(e),
            }
        })
    }

    pub fn logout(&self, session: &mut Session) {
        if let Some(id) = session.identifier() {
            tracing::info!(identifier = id, "logged out");
        }
        session.logout();
    }

    pub fn role_state(&self, session: &Session) -> Result<RoleState> {
        let id = session.require_identity()?;
        Ok(self.roles.role_state(id))
    }

    /// Pick a role for the logged-in account. Tech Lead needs a token.
    pub fn choose_role(&self, session: &mut Session, role: Role, token: Option<&str>) -> Result<()> {
        match (role, token) {
            (Role::DeveloperIntern, _) => self.choose_developer_intern(session),
            (Role::TechLead, Some(token)) => self.choose_tech_lead(session, token),
            (Role::TechLead, None) => Err(TechDevError::MissingField("token")),
            (Role::Unassigned, _) => Err(TechDevError::InvalidRole(
                "unassigned cannot be chosen".to_string(),
            )),
        }
    }

    pub fn choose_developer_intern(&self, session: &mut Session) -> Result<()> {
        let id = session.require_identity()?.to_string();
        self.timed("choose_role", || self.roles.assign_developer_intern(&id))?;
        session.set_role(Role::DeveloperIntern);
        Ok(())
    }

    pub fn choose_tech_lead(&self, session: &mut Session, token: &str) -> Result<()> {
        let id = session.require_identity()?.to_string();
        self.timed("choose_role", || self.roles.assign_tech_lead(&id, token))?;
        session.set_role(Role::TechLead);
        Ok(())
    }

    /// Revoke another lead's credential. Requires a verified Tech Lead.
    pub fn revoke_tech_lead(&self, session: &Session, target: &str) -> Result<bool> {
        self.require_verified_lead(session)?;
        self.roles.revoke_tech_lead(target)
    }

    /// Switch the session's current view, enforcing the page's role gate.
    pub fn navigate(&self, session: &mut Session, page: Page) -> Result<()> {
        self.timed("navigate", || match page {
            Page::Dashboard | Page::Standups => session.require_identity().map(|_| ()),
            Page::TeamManagement => self.require_intern(session).map(|_| ()),
            Page::TeamsOverview => self.require_verified_lead(session).map(|_| ()),
        })?;
        session.set_page(page);
        Ok(())
    }

    fn require_intern<'s>(&self, session: &'s Session) -> Result<&'s str> {
        let id = session.require_identity()?;
        if self.roles.role_of(id) != Role::DeveloperIntern {
            return Err(TechDevError::Forbidden(
                "team management requires the Developer Intern role".to_string(),
            ));
        }
        Ok(id)
    }

    fn require_verified_lead<'s>(&self, session: &'s Session) -> Result<&'s str> {
        let id = session.require_identity()?;
        self.roles.require_verified_tech_lead(id)?;
        Ok(id)
    }

    // -----------------------------------------------------------------------
    // Own roster
    // -----------------------------------------------------------------------

    /// The caller's team; creates it on first access.
    pub fn my_team(&self, session: &Session) -> Result<Team> {
        let id = self.require_intern(session)?;
        self.timed("my_team", || self.roster.get_or_create(id))
    }

    pub fn my_team_stats(&self, session: &Session) -> Result<TeamStats> {
        let team = self.my_team(session)?;
        Ok(TeamStats::for_team(&team, self.roster.capacity()))
    }

    pub fn add_member(&self, session: &Session, name: &str, handle: &str) -> Result<Team> {
        let id = self.require_intern(session)?;
        self.timed("add_member", || self.roster.add_member(id, name, handle))
    }

    /// Remove the member at 1-based `position` from the caller's team.
    pub fn remove_member(&self, session: &Session, position: usize) -> Result<Member> {
        let id = self.require_intern(session)?;
        self.timed("remove_member", || {
            self.roster.remove_member(id, position).map(|(_, m)| m)
        })
    }

    // -----------------------------------------------------------------------
    // Read-only overviews
    // -----------------------------------------------------------------------

    pub fn all_teams(&self, session: &Session) -> Result<Vec<TeamSummary>> {
        self.require_verified_lead(session)?;
        self.timed("all_teams", || Ok(self.roster.list_all_teams()))
    }

    pub fn stats(&self, session: &Session) -> Result<PlatformStats> {
        self.require_verified_lead(session)?;
        self.timed("stats", || {
            let store = self.store.as_ref();
            Ok(PlatformStats::compute(
                &account::list_accounts(store),
                &team::list_teams(store),
                &role::list_credentials(store),
            ))
        })
    }

    // -----------------------------------------------------------------------
    // Standups
    // -----------------------------------------------------------------------

    pub fn submit_standup(
        &self,
        session: &Session,
        student_id: &str,
        tasks_done: &str,
        what_learned: &str,
    ) -> Result<StandupEntry> {
        let id = session.require_identity()?;
        self.timed("submit_standup", || {
            self.standups.submit(id, student_id, tasks_done, what_learned)
        })
    }

    pub fn standups(&self, session: &Session) -> Result<Vec<StandupEntry>> {
        session.require_identity()?;
        self.timed("standups", || Ok(self.standups.list()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
