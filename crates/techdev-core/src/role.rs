use crate::account::Account;
use crate::config::TokenPolicy;
use crate::error::{Result, TechDevError};
use crate::paths::{ACCOUNTS_KEY, TECH_LEADS_KEY};
use crate::store::{self, DocumentStore};
use crate::types::{Role, RoleState};
use chrono::{DateTime, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::sync::Arc;

// ---------------------------------------------------------------------------
// TechLeadCredential
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialStatus {
    Active,
    Revoked,
}

impl fmt::Display for CredentialStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CredentialStatus::Active => "active",
            CredentialStatus::Revoked => "revoked",
        };
        f.write_str(s)
    }
}

/// Proof that an account supplied a valid tech lead token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TechLeadCredential {
    pub identifier: String,
    /// Hex SHA-256 of the token. The token itself is never stored.
    pub token_hash: String,
    pub status: CredentialStatus,
    pub registered_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revoked_at: Option<DateTime<Utc>>,
}

impl TechLeadCredential {
    pub fn is_active(&self) -> bool {
        self.status == CredentialStatus::Active
    }
}

/// All credential rows. Degrades to empty on read failure.
pub fn list_credentials(store: &dyn DocumentStore) -> Vec<TechLeadCredential> {
    store::read_entries(store, TECH_LEADS_KEY)
        .into_iter()
        .map(|(_, c)| c)
        .collect()
}

// ---------------------------------------------------------------------------
// Tokens
// ---------------------------------------------------------------------------

pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Token rules: minimum length, at least one letter, at least one digit.
pub fn validate_token(token: &str, policy: &TokenPolicy) -> Result<()> {
    if token.chars().count() < policy.min_length {
        return Err(TechDevError::WeakToken(format!(
            "must be at least {} characters long",
            policy.min_length
        )));
    }
    if !token.chars().any(|c| c.is_alphabetic()) {
        return Err(TechDevError::WeakToken("must contain a letter".to_string()));
    }
    if !token.chars().any(|c| c.is_ascii_digit()) {
        return Err(TechDevError::WeakToken("must contain a digit".to_string()));
    }
    Ok(())
}

/// A random 32-character alphanumeric token that satisfies the default policy.
pub fn generate_token() -> String {
    let mut rng = rand::thread_rng();
    loop {
        let token: String = (&mut rng)
            .sample_iter(&Alphanumeric)
            .take(32)
            .map(char::from)
            .collect();
        if validate_token(&token, &TokenPolicy::default()).is_ok() {
            return token;
        }
    }
}

// ---------------------------------------------------------------------------
// RoleAssignment
// ---------------------------------------------------------------------------

pub struct RoleAssignment {
    store: Arc<dyn DocumentStore>,
    policy: TokenPolicy,
}

impl RoleAssignment {
    pub fn new(store: Arc<dyn DocumentStore>, policy: TokenPolicy) -> Self {
        Self { store, policy }
    }

    /// Current role of `identifier`; unknown accounts are unassigned.
    pub fn role_of(&self, identifier: &str) -> Role {
        crate::account::find_account(self.store.as_ref(), identifier)
            .map(|a| a.role)
            .unwrap_or_default()
    }

    pub fn credential_of(&self, identifier: &str) -> Option<TechLeadCredential> {
        let doc = store::load_or_empty(self.store.as_ref(), TECH_LEADS_KEY);
        store::decode_entry(&doc, identifier).ok().flatten()
    }

    pub fn is_tech_lead_verified(&self, identifier: &str) -> bool {
        self.role_of(identifier) == Role::TechLead
            && self
                .credential_of(identifier)
                .is_some_and(|c| c.is_active())
    }

    pub fn role_state(&self, identifier: &str) -> RoleState {
        match self.role_of(identifier) {
            Role::Unassigned => RoleState::Unassigned,
            Role::DeveloperIntern => RoleState::DeveloperIntern,
            Role::TechLead if self.is_tech_lead_verified(identifier) => {
                RoleState::TechLeadVerified
            }
            Role::TechLead => RoleState::TechLeadPending,
        }
    }

    /// Capability gate for elevated operations.
    pub fn require_verified_tech_lead(&self, identifier: &str) -> Result<()> {
        if self.is_tech_lead_verified(identifier) {
            Ok(())
        } else {
            Err(TechDevError::Forbidden(
                "requires a verified Tech Lead".to_string(),
            ))
        }
    }

    /// Unassigned -> Developer Intern. Repeating re-stamps `registered_at`.
    pub fn assign_developer_intern(&self, identifier: &str) -> Result<()> {
        self.set_role(identifier, Role::DeveloperIntern)?;
        tracing::info!(identifier, "assigned Developer Intern");
        Ok(())
    }

    /// Verify `token` and make `identifier` a Tech Lead.
    ///
    /// Also re-verifies a pending lead or rotates an existing lead's token.
    pub fn assign_tech_lead(&self, identifier: &str, token: &str) -> Result<()> {
        validate_token(token, &self.policy)?;
        let current = self.role_of(identifier);
        if current == Role::DeveloperIntern {
            return Err(TechDevError::RoleConflict {
                identifier: identifier.to_string(),
                current: current.label().to_string(),
            });
        }

        let now = Utc::now();
        let credential = TechLeadCredential {
            identifier: identifier.to_string(),
            token_hash: hash_token(token),
            status: CredentialStatus::Active,
            registered_at: now,
            revoked_at: None,
        };
        // Role first: a failure between the two writes leaves a pending lead.
        self.set_role(identifier, Role::TechLead)?;
        self.store.update(TECH_LEADS_KEY, &mut |doc| {
            store::encode_entry(doc, identifier, &credential)
        })?;

        tracing::info!(identifier, "assigned Tech Lead");
        Ok(())
    }

    /// Mark the credential revoked. The account keeps its role but is no
    /// longer verified.
    pub fn revoke_tech_lead(&self, identifier: &str) -> Result<bool> {
        let mut revoked = false;
        self.store.update(TECH_LEADS_KEY, &mut |doc| {
            if let Some(mut c) = store::decode_entry::<TechLeadCredential>(doc, identifier)? {
                if c.is_active() {
                    c.status = CredentialStatus::Revoked;
                    c.revoked_at = Some(Utc::now());
                    store::encode_entry(doc, identifier, &c)?;
                    revoked = true;
                }
            }
            Ok(())
        })?;
        if revoked {
            tracing::info!(identifier, "tech lead credential revoked");
        }
        Ok(revoked)
    }

    fn set_role(&self, identifier: &str, role: Role) -> Result<()> {
        self.store.update(ACCOUNTS_KEY, &mut |doc| {
            let mut account = store::decode_entry::<Account>(doc, identifier)?
                .unwrap_or_else(|| Account::external(identifier));
            if account.role.is_assigned() && account.role != role {
                return Err(TechDevError::RoleConflict {
                    identifier: identifier.to_string(),
                    current: account.role.label().to_string(),
                });
            }
            account.role = role;
            account.registered_at = Some(Utc::now());
            store::encode_entry(doc, identifier, &account)
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::find_account;
    use crate::store::MemoryStore;

    const TOKEN: &str = "lead-token-0123456789abc";

    fn roles() -> (Arc<dyn DocumentStore>, RoleAssignment) {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
        let roles = RoleAssignment::new(Arc::clone(&store), TokenPolicy::default());
        (store, roles)
    }

    #[test]
    fn token_rules() {
        let p = TokenPolicy::default();
        validate_token(TOKEN, &p).unwrap();
        assert!(matches!(
            validate_token("short1", &p),
            Err(TechDevError::WeakToken(_))
        ));
        assert!(validate_token("abcdefghijklmnopqrstuvwxyz", &p).is_err());
        assert!(validate_token("12345678901234567890123", &p).is_err());
    }

    #[test]
    fn token_hash_is_sha256_hex() {
        let h = hash_token("abc");
        assert_eq!(
            h,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn generated_tokens_pass_policy() {
        for _ in 0..10 {
            let t = generate_token();
            assert_eq!(t.len(), 32);
            validate_token(&t, &TokenPolicy::default()).unwrap();
        }
    }

    #[test]
    fn intern_assignment_is_idempotent() {
        let (store, roles) = roles();
        roles.assign_developer_intern("alice").unwrap();
        let first = find_account(store.as_ref(), "alice")
            .unwrap()
            .registered_at
            .unwrap();
        roles.assign_developer_intern("alice").unwrap();
        let second = find_account(store.as_ref(), "alice")
            .unwrap()
            .registered_at
            .unwrap();
        assert!(second >= first);
        assert_eq!(roles.role_state("alice"), RoleState::DeveloperIntern);
    }

    #[test]
    fn tech_lead_requires_strong_token() {
        let (_, roles) = roles();
        assert!(matches!(
            roles.assign_tech_lead("bob", "weak"),
            Err(TechDevError::WeakToken(_))
        ));
        assert_eq!(roles.role_of("bob"), Role::Unassigned);
        assert!(roles.credential_of("bob").is_none());
    }

    #[test]
    fn tech_lead_verified_after_token() {
        let (_, roles) = roles();
        roles.assign_tech_lead("bob", TOKEN).unwrap();
        assert_eq!(roles.role_of("bob"), Role::TechLead);
        assert!(roles.is_tech_lead_verified("bob"));
        assert_eq!(roles.role_state("bob"), RoleState::TechLeadVerified);

        let cred = roles.credential_of("bob").unwrap();
        assert_eq!(cred.token_hash, hash_token(TOKEN));
        assert_eq!(cred.status, CredentialStatus::Active);
    }

    #[test]
    fn role_without_credential_is_pending() {
        let (store, roles) = roles();
        let mut pending = Account::external("carol");
        pending.role = Role::TechLead;
        store
            .update(ACCOUNTS_KEY, &mut |doc| store::encode_entry(doc, "carol", &pending))
            .unwrap();

        assert_eq!(roles.role_state("carol"), RoleState::TechLeadPending);
        assert!(matches!(
            roles.require_verified_tech_lead("carol"),
            Err(TechDevError::Forbidden(_))
        ));

        roles.assign_tech_lead("carol", TOKEN).unwrap();
        roles.require_verified_tech_lead("carol").unwrap();
    }

    #[test]
    fn revoke_drops_verification() {
        let (_, roles) = roles();
        roles.assign_tech_lead("dan", TOKEN).unwrap();
        assert!(roles.revoke_tech_lead("dan").unwrap());
        assert!(!roles.revoke_tech_lead("dan").unwrap());
        assert_eq!(roles.role_of("dan"), Role::TechLead);
        assert_eq!(roles.role_state("dan"), RoleState::TechLeadPending);
    }

    #[test]
    fn cross_role_switch_rejected() {
        let (_, roles) = roles();
        roles.assign_developer_intern("erin").unwrap();
        assert!(matches!(
            roles.assign_tech_lead("erin", TOKEN),
            Err(TechDevError::RoleConflict { .. })
        ));
        assert!(roles.credential_of("erin").is_none());

        roles.assign_tech_lead("frank", TOKEN).unwrap();
        assert!(matches!(
            roles.assign_developer_intern("frank"),
            Err(TechDevError::RoleConflict { .. })
        ));
    }
}
