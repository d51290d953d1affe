pub mod account;
pub mod config;
pub mod init;
pub mod role;
pub mod shell;
pub mod standup;
pub mod stats;
pub mod team;
pub mod token;

use anyhow::Context;
use std::path::Path;
use techdev_core::{Platform, Session};

/// `--user` / `--password`, either of which may be missing.
pub struct Credentials {
    pub user: Option<String>,
    pub password: Option<String>,
}

impl Credentials {
    pub fn password(&self) -> anyhow::Result<&str> {
        self.password
            .as_deref()
            .context("--password (or TECHDEV_PASSWORD) is required")
    }

    pub fn user(&self) -> anyhow::Result<&str> {
        self.user
            .as_deref()
            .context("--user (or TECHDEV_USER) is required")
    }
}

pub fn open_platform(root: &Path) -> anyhow::Result<Platform> {
    Platform::open(root).with_context(|| format!("failed to open {}", root.display()))
}

/// Open the platform and log in once with the supplied credentials.
pub fn open_session(root: &Path, creds: &Credentials) -> anyhow::Result<(Platform, Session)> {
    let platform = open_platform(root)?;
    let mut session = platform.new_session();
    let user = creds.user()?;
    platform
        .login(&mut session, user, creds.password()?)
        .with_context(|| format!("login failed for '{user}'"))?;
    Ok((platform, session))
}
