use crate::error::Result;
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// PasswordPolicy
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordPolicy {
    #[serde(default = "default_password_min")]
    pub min_length: usize,
}

fn default_password_min() -> usize {
    8
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: default_password_min(),
        }
    }
}

// ---------------------------------------------------------------------------
// TokenPolicy
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPolicy {
    #[serde(default = "default_token_min")]
    pub min_length: usize,
}

fn default_token_min() -> usize {
    20
}

impl Default for TokenPolicy {
    fn default() -> Self {
        Self {
            min_length: default_token_min(),
        }
    }
}

// ---------------------------------------------------------------------------
// RateLimitConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_cooldown_minutes")]
    pub cooldown_minutes: i64,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_cooldown_minutes() -> i64 {
    5
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            cooldown_minutes: default_cooldown_minutes(),
        }
    }
}

// ---------------------------------------------------------------------------
// RosterConfig
// ---------------------------------------------------------------------------

/// Which leaders appear in the all-teams listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaderFilter {
    /// Only leaders whose role is Developer Intern.
    #[default]
    DeveloperInterns,
    /// Any leader with a known account.
    AnyAccount,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterConfig {
    #[serde(default = "default_max_members")]
    pub max_members: usize,
    #[serde(default)]
    pub leader_filter: LeaderFilter,
}

fn default_max_members() -> usize {
    5
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            max_members: default_max_members(),
            leader_filter: LeaderFilter::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// HashingConfig
// ---------------------------------------------------------------------------

/// Argon2id work factor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HashingConfig {
    #[serde(default = "default_memory_kib")]
    pub memory_kib: u32,
    #[serde(default = "default_iterations")]
    pub iterations: u32,
    #[serde(default = "default_parallelism")]
    pub parallelism: u32,
}

fn default_memory_kib() -> u32 {
    65536
}

fn default_iterations() -> u32 {
    3
}

fn default_parallelism() -> u32 {
    4
}

impl Default for HashingConfig {
    fn default() -> Self {
        Self {
            memory_kib: default_memory_kib(),
            iterations: default_iterations(),
            parallelism: default_parallelism(),
        }
    }
}

impl HashingConfig {
    /// Smallest parameters Argon2 accepts. Only for tests and local demos.
    pub fn minimal() -> Self {
        Self {
            memory_kib: 8,
            iterations: 1,
            parallelism: 1,
        }
    }
}

// ---------------------------------------------------------------------------
// MetricsConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    #[serde(default = "default_metrics_capacity")]
    pub capacity: usize,
    #[serde(default = "default_window_minutes")]
    pub window_minutes: i64,
}

fn default_metrics_capacity() -> usize {
    512
}

fn default_window_minutes() -> i64 {
    60
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            capacity: default_metrics_capacity(),
            window_minutes: default_window_minutes(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub password: PasswordPolicy,
    #[serde(default)]
    pub token: TokenPolicy,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    #[serde(default)]
    pub roster: RosterConfig,
    #[serde(default)]
    pub hashing: HashingConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

fn default_version() -> u32 {
    1
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            password: PasswordPolicy::default(),
            token: TokenPolicy::default(),
            rate_limit: RateLimitConfig::default(),
            roster: RosterConfig::default(),
            hashing: HashingConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

impl Config {
    /// Load `.techdev/config.yaml`, falling back to defaults when absent.
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(&path)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.roster.max_members == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "roster.max_members is 0: no team can hold a member".to_string(),
            });
        }

        if self.password.min_length < 8 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!(
                    "password.min_length={} is below the recommended minimum of 8",
                    self.password.min_length
                ),
            });
        }

        if self.token.min_length < 20 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!(
                    "token.min_length={} is below the recommended minimum of 20",
                    self.token.min_length
                ),
            });
        }

        let h = &self.hashing;
        if h.parallelism == 0 || h.iterations == 0 || h.memory_kib < 8 * h.parallelism {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!(
                    "hashing parameters are invalid (memory_kib={}, iterations={}, parallelism={}): \
                     memory_kib must be at least 8 * parallelism",
                    h.memory_kib, h.iterations, h.parallelism
                ),
            });
        }

        if self.rate_limit.cooldown_minutes <= 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "rate_limit.cooldown_minutes is 0: failed logins are never throttled"
                    .to_string(),
            });
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
