use crate::config::RateLimitConfig;
use crate::error::{Result, TechDevError};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// Consecutive failed-login counter for one session.
///
/// Lives in memory only; a new session starts with a clean slate.
#[derive(Debug, Clone, Serialize)]
pub struct RateLimiter {
    max_attempts: u32,
    #[serde(skip)]
    cooldown: Duration,
    failed_attempts: u32,
    last_failure: Option<DateTime<Utc>>,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(&RateLimitConfig::default())
    }
}

impl RateLimiter {
    pub fn new(cfg: &RateLimitConfig) -> Self {
        Self {
            max_attempts: cfg.max_attempts,
            cooldown: Duration::minutes(cfg.cooldown_minutes.max(0)),
            failed_attempts: 0,
            last_failure: None,
        }
    }

    pub fn failed_attempts(&self) -> u32 {
        self.failed_attempts
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn last_failure(&self) -> Option<DateTime<Utc>> {
        self.last_failure
    }

    pub fn record_failure(&mut self) {
        self.record_failure_at(Utc::now());
    }

    pub fn record_failure_at(&mut self, now: DateTime<Utc>) {
        self.failed_attempts = self.failed_attempts.saturating_add(1);
        self.last_failure = Some(now);
    }

    pub fn record_success(&mut self) {
        self.failed_attempts = 0;
    }

    pub fn check(&mut self) -> Result<()> {
        self.check_at(Utc::now())
    }

    /// Fail while the session is locked out.
    ///
    /// Once the threshold is reached, attempts are refused until `cooldown`
    /// has passed since the last failure. When the cooldown has run out the
    /// counter is reset here, without waiting for a successful login.
    pub fn check_at(&mut self, now: DateTime<Utc>) -> Result<()> {
        if self.failed_attempts < self.max_attempts {
            return Ok(());
        }
        if let Some(last) = self.last_failure {
            let elapsed = now - last;
            if elapsed < self.cooldown {
                let remaining = self.cooldown - elapsed;
                let ms = remaining.num_milliseconds().max(0);
                let retry_after_minutes = ((ms + 59_999) / 60_000).max(1);
                return Err(TechDevError::RateLimited {
                    retry_after_minutes,
                });
            }
        }
        self.failed_attempts = 0;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn t0() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-03-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn below_threshold_passes_without_reset() {
        let mut rl = RateLimiter::default();
        rl.record_failure_at(t0());
        rl.record_failure_at(t0());
        rl.check_at(t0()).unwrap();
        assert_eq!(rl.failed_attempts(), 2);
    }

    #[test]
    fn three_failures_lock_out() {
        let mut rl = RateLimiter::default();
        for _ in 0..3 {
            rl.check_at(t0()).unwrap();
            rl.record_failure_at(t0());
        }
        let err = rl.check_at(t0() + Duration::seconds(30)).unwrap_err();
        match err {
            TechDevError::RateLimited {
                retry_after_minutes,
            } => assert_eq!(retry_after_minutes, 5),
            other => panic!("expected RateLimited, got {other:?}"),
        }
    }

    #[test]
    fn retry_after_counts_partial_seconds() {
        let mut rl = RateLimiter::default();
        for _ in 0..3 {
            rl.record_failure_at(t0());
        }
        // 60.5s remaining -> 2 minutes
        let err = rl
            .check_at(t0() + Duration::milliseconds(239_500))
            .unwrap_err();
        assert!(matches!(
            err,
            TechDevError::RateLimited {
                retry_after_minutes: 2
            }
        ));
        // exactly 60s remaining -> 1 minute
        let err = rl.check_at(t0() + Duration::seconds(240)).unwrap_err();
        assert!(matches!(
            err,
            TechDevError::RateLimited {
                retry_after_minutes: 1
            }
        ));
    }

    #[test]
    fn retry_after_rounds_up() {
        let mut rl = RateLimiter::default();
        for _ in 0..3 {
            rl.record_failure_at(t0());
        }
        // 4m01s remaining -> 5 minutes
        let err = rl.check_at(t0() + Duration::seconds(59)).unwrap_err();
        assert!(matches!(
            err,
            TechDevError::RateLimited {
                retry_after_minutes: 5
            }
        ));
        // 10s remaining -> 1 minute
        let err = rl.check_at(t0() + Duration::seconds(290)).unwrap_err();
        assert!(matches!(
            err,
            TechDevError::RateLimited {
                retry_after_minutes: 1
            }
        ));
    }

    #[test]
    fn cooldown_expiry_resets_counter() {
        let mut rl = RateLimiter::default();
        for _ in 0..3 {
            rl.record_failure_at(t0());
        }
        rl.check_at(t0() + Duration::minutes(5)).unwrap();
        assert_eq!(rl.failed_attempts(), 0);
    }

    #[test]
    fn success_resets_counter() {
        let mut rl = RateLimiter::default();
        rl.record_failure_at(t0());
        rl.record_failure_at(t0());
        rl.record_success();
        assert_eq!(rl.failed_attempts(), 0);
        rl.record_failure_at(t0());
        rl.check_at(t0()).unwrap();
    }

    #[test]
    fn honours_configured_threshold() {
        let mut rl = RateLimiter::new(&RateLimitConfig {
            max_attempts: 1,
            cooldown_minutes: 1,
        });
        rl.record_failure_at(t0());
        assert!(rl.check_at(t0()).is_err());
        rl.check_at(t0() + Duration::minutes(1)).unwrap();
    }
}
