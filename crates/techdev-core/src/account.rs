use crate::config::{HashingConfig, PasswordPolicy};
use crate::error::{Result, TechDevError};
use crate::paths::{self, ACCOUNTS_KEY};
use crate::password;
use crate::store::{self, DocumentStore};
use crate::types::Role;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, OnceLock};

// ---------------------------------------------------------------------------
// Account
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub identifier: String,
    /// Absent when identity is delegated to an external provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salt: Option<String>,
    #[serde(default)]
    pub role: Role,
    /// Stamped on role assignment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registered_at: Option<DateTime<Utc>>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login: Option<DateTime<Utc>>,
}

impl Account {
    /// An account with no local credentials, e.g. one backed by a hosted
    /// identity provider.
    pub fn external(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            secret_hash: None,
            salt: None,
            role: Role::Unassigned,
            registered_at: None,
            created_at: Utc::now(),
            last_login: None,
        }
    }

    pub fn has_local_credentials(&self) -> bool {
        self.secret_hash.is_some()
    }
}

/// All accounts in the store, oldest first. Degrades to empty on read failure.
pub fn list_accounts(store: &dyn DocumentStore) -> Vec<Account> {
    let mut accounts: Vec<Account> = store::read_entries(store, ACCOUNTS_KEY)
        .into_iter()
        .map(|(_, a)| a)
        .collect();
    accounts.sort_by(|a: &Account, b: &Account| {
        a.created_at
            .cmp(&b.created_at)
            .then_with(|| a.identifier.cmp(&b.identifier))
    });
    accounts
}

/// Look up one account. Degrades to `None` on read failure.
pub fn find_account(store: &dyn DocumentStore, identifier: &str) -> Option<Account> {
    let doc = store::load_or_empty(store, ACCOUNTS_KEY);
    match store::decode_entry(&doc, identifier) {
        Ok(found) => found,
        Err(e) => {
            tracing::warn!(identifier, error = %e, "undecodable account record");
            None
        }
    }
}

// ---------------------------------------------------------------------------
// IdentityProvider
// ---------------------------------------------------------------------------

/// Identity confirmed by a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifiedIdentity {
    pub identifier: String,
}

/// System of record for credentials. The local [`CredentialStore`] is one
/// implementation; a hosted auth service can stand in behind the same seam.
pub trait IdentityProvider: Send + Sync {
    fn sign_up(&self, identifier: &str, secret: &str) -> Result<()>;
    fn sign_in(&self, identifier: &str, secret: &str) -> Result<VerifiedIdentity>;
}

// ---------------------------------------------------------------------------
// CredentialStore
// ---------------------------------------------------------------------------

pub struct CredentialStore {
    store: Arc<dyn DocumentStore>,
    policy: PasswordPolicy,
    hashing: HashingConfig,
    /// Throwaway hash verified when no stored hash exists.
    decoy: OnceLock<Option<String>>,
}

impl CredentialStore {
    pub fn new(store: Arc<dyn DocumentStore>, policy: PasswordPolicy, hashing: HashingConfig) -> Self {
        Self {
            store,
            policy,
            hashing,
            decoy: OnceLock::new(),
        }
    }

    /// Create an account with a salted hash of `secret`. Does not log in.
    ///
    /// Any existing record is a duplicate, including one created through a
    /// delegated login: those never gain a local password.
    pub fn register(&self, identifier: &str, secret: &str) -> Result<()> {
        let identifier = paths::normalize_identifier(identifier)?;
        password::validate_strength(secret, &self.policy)?;

        // Hash before taking the store lock; Argon2 is deliberately slow.
        let hashed = password::hash_secret(secret, &self.hashing)?;

        self.store.update(ACCOUNTS_KEY, &mut |doc| {
            if doc.contains_key(&identifier) {
                return Err(TechDevError::DuplicateIdentifier(identifier.clone()));
            }
            let mut a = Account::external(identifier.clone());
            a.secret_hash = Some(hashed.hash.clone());
            a.salt = Some(hashed.salt.clone());
            store::encode_entry(doc, &identifier, &a)
        })?;

        tracing::info!(identifier = %identifier, "account registered");
        Ok(())
    }

    /// Check `secret` and return the account's current role.
    ///
    /// Unknown identifiers and wrong secrets both yield `InvalidCredentials`
    /// and both cost one Argon2 verification. An unreadable account store is
    /// `StoreUnavailable`, not a credential failure.
    pub fn authenticate(&self, identifier: &str, secret: &str) -> Result<Role> {
        let identifier = identifier.trim();
        let doc = self.store.load(ACCOUNTS_KEY)?;
        let account: Option<Account> = store::decode_entry(&doc, identifier)?;
        let Some((account, stored)) =
            account.and_then(|a| a.secret_hash.clone().map(|h| (a, h)))
        else {
            return self.reject_unknown(identifier, secret);
        };
        let ok = match password::verify_secret(secret, &stored) {
            Ok(ok) => ok,
            Err(e) => {
                tracing::warn!(identifier, error = %e, "stored hash could not be verified");
                false
            }
        };
        if !ok {
            tracing::info!(identifier, "login rejected");
            return Err(TechDevError::InvalidCredentials);
        }

        let now = Utc::now();
        self.store.update(ACCOUNTS_KEY, &mut |doc| {
            if let Some(mut a) = store::decode_entry::<Account>(doc, identifier)? {
                a.last_login = Some(now);
                store::encode_entry(doc, identifier, &a)?;
            }
            Ok(())
        })?;

        tracing::info!(identifier, role = %account.role, "login succeeded");
        Ok(account.role)
    }

    fn reject_unknown(&self, identifier: &str, secret: &str) -> Result<Role> {
        let decoy = self
            .decoy
            .get_or_init(|| password::hash_secret("Decoy-secret-0", &self.hashing).ok().map(|h| h.hash));
        if let Some(hash) = decoy.as_deref() {
            let _ = password::verify_secret(secret, hash);
        }
        tracing::info!(identifier, "login rejected");
        Err(TechDevError::InvalidCredentials)
    }
}

impl IdentityProvider for CredentialStore {
    fn sign_up(&self, identifier: &str, secret: &str) -> Result<()> {
        self.register(identifier, secret)
    }

    fn sign_in(&self, identifier: &str, secret: &str) -> Result<VerifiedIdentity> {
        self.authenticate(identifier, secret)?;
        Ok(VerifiedIdentity {
            identifier: identifier.trim().to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
