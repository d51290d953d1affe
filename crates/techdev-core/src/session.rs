use crate::config::RateLimitConfig;
use crate::error::{Result, TechDevError};
use crate::rate_limit::RateLimiter;
use crate::types::{Page, Role};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Per-user interaction context, created at session start and dropped at
/// logout or expiry. Nothing here is persisted.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    identifier: Option<String>,
    role: Role,
    page: Page,
    limiter: RateLimiter,
    started_at: DateTime<Utc>,
}

impl Session {
    pub fn new(rate_limit: &RateLimitConfig) -> Self {
        Self {
            identifier: None,
            role: Role::Unassigned,
            page: Page::Dashboard,
            limiter: RateLimiter::new(rate_limit),
            started_at: Utc::now(),
        }
    }

    pub fn identifier(&self) -> Option<&str> {
        self.identifier.as_deref()
    }

    pub fn is_logged_in(&self) -> bool {
        self.identifier.is_some()
    }

    /// The logged-in identifier, or `NotAuthenticated`.
    pub fn require_identity(&self) -> Result<&str> {
        self.identifier().ok_or(TechDevError::NotAuthenticated)
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn page(&self) -> Page {
        self.page
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    pub fn limiter_mut(&mut self) -> &mut RateLimiter {
        &mut self.limiter
    }

    pub(crate) fn sign_in(&mut self, identifier: String, role: Role) {
        self.identifier = Some(identifier);
        self.role = role;
        self.page = Page::Dashboard;
    }

    pub(crate) fn set_role(&mut self, role: Role) {
        self.role = role;
    }

    pub(crate) fn set_page(&mut self, page: Page) {
        self.page = page;
    }

    /// Forget the user. The failed-attempt counter survives until the
    /// session itself is dropped.
    pub fn logout(&mut self) {
        self.identifier = None;
        self.role = Role::Unassigned;
        self.page = Page::Dashboard;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_session_is_anonymous() {
        let s = Session::new(&RateLimitConfig::default());
        assert!(!s.is_logged_in());
        assert!(matches!(
            s.require_identity(),
            Err(TechDevError::NotAuthenticated)
        ));
        assert_eq!(s.page(), Page::Dashboard);
    }

    #[test]
    fn logout_keeps_failed_attempts() {
        let mut s = Session::new(&RateLimitConfig::default());
        s.limiter_mut().record_failure();
        s.sign_in("alice".to_string(), Role::DeveloperIntern);
        s.set_page(Page::TeamManagement);
        s.logout();
        assert!(!s.is_logged_in());
        assert_eq!(s.role(), Role::Unassigned);
        assert_eq!(s.page(), Page::Dashboard);
        assert_eq!(s.limiter().failed_attempts(), 1);
    }
}
