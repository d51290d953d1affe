//! Password policy and Argon2id hashing.
//!
//! Hashes are stored in PHC string format, which embeds the algorithm,
//! parameters and salt. The salt is also kept beside the hash on the account
//! record so an operator can see that no two accounts share one.

use crate::config::{HashingConfig, PasswordPolicy};
use crate::error::{Result, TechDevError};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, ParamsBuilder, Version,
};
use regex::Regex;
use std::sync::OnceLock;

/// A freshly computed hash together with the salt that produced it.
#[derive(Debug, Clone)]
pub struct HashedSecret {
    pub hash: String,
    pub salt: String,
}

// ---------------------------------------------------------------------------
// Policy
// ---------------------------------------------------------------------------

static UPPER_RE: OnceLock<Regex> = OnceLock::new();
static LOWER_RE: OnceLock<Regex> = OnceLock::new();
static DIGIT_RE: OnceLock<Regex> = OnceLock::new();

fn upper_re() -> &'static Regex {
    UPPER_RE.get_or_init(|| Regex::new(r"[A-Z]").unwrap())
}

fn lower_re() -> &'static Regex {
    LOWER_RE.get_or_init(|| Regex::new(r"[a-z]").unwrap())
}

fn digit_re() -> &'static Regex {
    DIGIT_RE.get_or_init(|| Regex::new(r"[0-9]").unwrap())
}

/// Check a plaintext secret against the strength policy.
///
/// Rules are checked in order and the first failure is reported. There is no
/// special-character requirement.
pub fn validate_strength(secret: &str, policy: &PasswordPolicy) -> Result<()> {
    if secret.chars().count() < policy.min_length {
        return Err(TechDevError::WeakSecret(format!(
            "must be at least {} characters long",
            policy.min_length
        )));
    }
    if !upper_re().is_match(secret) {
        return Err(TechDevError::WeakSecret(
            "must include an uppercase letter".to_string(),
        ));
    }
    if !lower_re().is_match(secret) {
        return Err(TechDevError::WeakSecret(
            "must include a lowercase letter".to_string(),
        ));
    }
    if !digit_re().is_match(secret) {
        return Err(TechDevError::WeakSecret("must include a digit".to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Hashing
// ---------------------------------------------------------------------------

fn argon2(cfg: &HashingConfig) -> Result<Argon2<'static>> {
    let params = ParamsBuilder::new()
        .m_cost(cfg.memory_kib)
        .t_cost(cfg.iterations)
        .p_cost(cfg.parallelism)
        .output_len(32)
        .build()
        .map_err(|e| TechDevError::Hashing(format!("invalid parameters: {e}")))?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Hash `secret` with a new random salt from the OS RNG.
pub fn hash_secret(secret: &str, cfg: &HashingConfig) -> Result<HashedSecret> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = argon2(cfg)?
        .hash_password(secret.as_bytes(), &salt)
        .map_err(|e| TechDevError::Hashing(e.to_string()))?;
    Ok(HashedSecret {
        hash: hash.to_string(),
        salt: salt.as_str().to_string(),
    })
}

/// Constant-time check of `secret` against a stored PHC hash.
///
/// Parameters and salt come from the stored hash, so accounts created under an
/// older work factor keep verifying after the config changes.
pub fn verify_secret(secret: &str, stored_hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|e| TechDevError::Hashing(format!("unreadable stored hash: {e}")))?;
    match Argon2::default().verify_password(secret.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(TechDevError::Hashing(e.to_string())),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> PasswordPolicy {
        PasswordPolicy::default()
    }

    #[test]
    fn accepts_policy_compliant_secret() {
        validate_strength("Passw0rd1", &policy()).unwrap();
        validate_strength("abcDEF12", &policy()).unwrap();
    }

    #[test]
    fn rejects_each_rule() {
        let cases = [
            ("Sh0rt", "at least 8"),
            ("password1", "uppercase"),
            ("PASSWORD1", "lowercase"),
            ("Password", "digit"),
        ];
        for (secret, fragment) in cases {
            let err = validate_strength(secret, &policy()).unwrap_err();
            assert!(matches!(err, TechDevError::WeakSecret(_)), "{secret}");
            assert!(err.to_string().contains(fragment), "{secret}: {err}");
        }
    }

    #[test]
    fn special_characters_not_required() {
        assert!(validate_strength("NoSymbols123", &policy()).is_ok());
    }

    #[test]
    fn hash_and_verify() {
        let cfg = HashingConfig::minimal();
        let hashed = hash_secret("Passw0rd1", &cfg).unwrap();
        assert!(hashed.hash.starts_with("$argon2id$"));
        assert!(hashed.hash.contains(&hashed.salt));
        assert!(verify_secret("Passw0rd1", &hashed.hash).unwrap());
        assert!(!verify_secret("Passw0rd2", &hashed.hash).unwrap());
    }

    #[test]
    fn salts_are_never_reused() {
        let cfg = HashingConfig::minimal();
        let a = hash_secret("Passw0rd1", &cfg).unwrap();
        let b = hash_secret("Passw0rd1", &cfg).unwrap();
        assert_ne!(a.salt, b.salt);
        assert_ne!(a.hash, b.hash);
    }

    #[test]
    fn garbage_hash_is_an_error() {
        assert!(matches!(
            verify_secret("x", "not-a-phc-string"),
            Err(TechDevError::Hashing(_))
        ));
    }
}
