use argon2::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher as Argon2PasswordHasher, PasswordVerifier,
        SaltString,
    },
    Argon2,
};
use thiserror::Error;

/// Password-related errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PasswordError {
    #[error("password hashing failed: {0}")]
    HashingFailed(String),
    #[error("password verification failed")]
    VerificationFailed,
    /// The stored value is not a PHC hash string at all.
    #[error("invalid hash format")]
    InvalidHashFormat,
}

/// Password hasher using Argon2id (the recommended variant for password hashing).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Argon2Hasher {
    /// Memory cost in KiB (default: 19456 = 19 MiB)
    m_cost: u32,
    /// Time cost / iterations (default: 2)
    t_cost: u32,
    /// Parallelism factor (default: 1)
    p_cost: u32,
}

impl Default for Argon2Hasher {
    fn default() -> Self {
        // OWASP recommended minimum parameters for Argon2id
        Self {
            m_cost: 19456,
            t_cost: 2,
            p_cost: 1,
        }
    }
}

impl Argon2Hasher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure memory cost in KiB.
    pub fn with_memory_cost(mut self, kib: u32) -> Self {
        self.m_cost = kib;
        self
    }

    /// Configure time cost (iterations).
    pub fn with_time_cost(mut self, iterations: u32) -> Self {
        self.t_cost = iterations;
        self
    }

    /// Configure parallelism factor.
    pub fn with_parallelism(mut self, threads: u32) -> Self {
        self.p_cost = threads;
        self
    }

    fn argon2(&self) -> Result<Argon2<'static>, PasswordError> {
        let params = argon2::Params::new(self.m_cost, self.t_cost, self.p_cost, None)
            .map_err(|e| PasswordError::HashingFailed(e.to_string()))?;
        Ok(Argon2::new(
            argon2::Algorithm::Argon2id,
            argon2::Version::V0x13,
            params,
        ))
    }

    /// Hash a secret with a fresh random salt, returning the PHC-format string.
    pub fn hash(&self, secret: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon2()?
            .hash_password(secret.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| PasswordError::HashingFailed(e.to_string()))
    }

    /// Verify a secret against a stored PHC-format hash.
    ///
    /// Cost parameters are read from the stored hash, so hashes produced with
    /// other settings still verify. A stored value that does not parse as a
    /// Argon2 PHC string with a hash output yields
    /// [`PasswordError::InvalidHashFormat`], distinct from a mismatch.
    pub fn verify(&self, secret: &str, stored_hash: &str) -> Result<(), PasswordError> {
        let parsed = parse_argon2(stored_hash).ok_or(PasswordError::InvalidHashFormat)?;

        Argon2::default()
            .verify_password(secret.as_bytes(), &parsed)
            .map_err(|_| PasswordError::VerificationFailed)
    }
}

/// Parse a stored value as an Argon2 PHC hash. Strings that are PHC-shaped
/// but name another algorithm or carry no output (`$abc123`) are rejected.
fn parse_argon2(stored: &str) -> Option<PasswordHash<'_>> {
    let parsed = PasswordHash::new(stored).ok()?;
    if argon2::Algorithm::try_from(parsed.algorithm).is_err() || parsed.hash.is_none() {
        return None;
    }
    Some(parsed)
}

/// Whether a stored secret is in the current hashed format.
#[inline]
pub fn is_phc_hash(stored: &str) -> bool {
    parse_argon2(stored).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap() -> Argon2Hasher {
        Argon2Hasher::new().with_memory_cost(1024).with_time_cost(1)
    }

    #[test]
    fn hash_and_verify() {
        let hasher = cheap();
        let hash = hasher.hash("supersecret123").expect("hash should succeed");
        assert!(hash.starts_with("$argon2id$"));
        assert!(is_phc_hash(&hash));

        hasher
            .verify("supersecret123", &hash)
            .expect("verification should succeed");
        assert_eq!(
            hasher.verify("wrongpassword", &hash),
            Err(PasswordError::VerificationFailed)
        );
    }

    #[test]
    fn salts_differ_between_calls() {
        let hasher = cheap();
        let a = hasher.hash("abc123").unwrap();
        let b = hasher.hash("abc123").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn plaintext_is_a_format_error() {
        assert_eq!(
            cheap().verify("abc123", "abc123"),
            Err(PasswordError::InvalidHashFormat)
        );
        assert!(!is_phc_hash("abc123"));
    }

    #[test]
    fn dollar_prefixed_plaintext_is_a_format_error() {
        let hasher = cheap();
        for stored in ["$abc123", "$pass$word", "$money$2024", "$argon2id$v=19$m=1024,t=1,p=1"] {
            assert!(!is_phc_hash(stored), "{stored:?}");
            assert_eq!(
                hasher.verify(stored, stored),
                Err(PasswordError::InvalidHashFormat),
                "{stored:?}"
            );
        }
    }

    #[test]
    fn verifies_hash_made_with_other_costs() {
        let hash = Argon2Hasher::new()
            .with_memory_cost(2048)
            .with_time_cost(3)
            .hash("abc123")
            .unwrap();
        cheap().verify("abc123", &hash).expect("params come from the hash");
    }

    #[test]
    fn invalid_params_surface_as_hashing_error() {
        let hasher = Argon2Hasher::new().with_time_cost(0);
        assert!(matches!(
            hasher.hash("abc123"),
            Err(PasswordError::HashingFailed(_))
        ));
    }
}
