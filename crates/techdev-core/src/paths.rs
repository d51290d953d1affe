use crate::error::{Result, TechDevError};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const TECHDEV_DIR: &str = ".techdev";
pub const CONFIG_FILE: &str = ".techdev/config.yaml";

// ---------------------------------------------------------------------------
// Store keys
// ---------------------------------------------------------------------------

pub const ACCOUNTS_KEY: &str = "accounts";
pub const TECH_LEADS_KEY: &str = "tech_leads";
pub const TEAMS_KEY: &str = "teams";
pub const STANDUPS_KEY: &str = "standups";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn techdev_dir(root: &Path) -> PathBuf {
    root.join(TECHDEV_DIR)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

/// File backing a store key, e.g. `.techdev/teams.json`.
pub fn document_path(root: &Path, key: &str) -> PathBuf {
    techdev_dir(root).join(format!("{key}.json"))
}

// ---------------------------------------------------------------------------
// Identifier validation
// ---------------------------------------------------------------------------

/// Normalize an account identifier (email or username).
pub fn normalize_identifier(identifier: &str) -> Result<String> {
    let trimmed = identifier.trim();
    if trimmed.is_empty() || trimmed.len() > 254 || trimmed.chars().any(char::is_whitespace) {
        return Err(TechDevError::InvalidIdentifier(identifier.to_string()));
    }
    Ok(trimmed.to_string())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
