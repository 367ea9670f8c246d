//! Argon2id password hashing and verification.

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        PasswordHash, PasswordHasher as ArgonHasher, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};

use memberhub_core::error::AppError;

/// Handles password hashing and verification using Argon2id.
///
/// Hashes are self-describing PHC strings, so verification keeps working
/// after the cost parameters change.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    /// Cost parameters used for new hashes.
    params: Params,
}

impl PasswordHasher {
    /// Creates a hasher with the library's recommended Argon2id parameters.
    pub fn new() -> Self {
        Self {
            params: Params::default(),
        }
    }

    /// Creates a hasher with explicit memory (KiB) and iteration costs.
    pub fn with_cost(memory_kib: u32, iterations: u32) -> Result<Self, AppError> {
        let params = Params::new(memory_kib, iterations, Params::DEFAULT_P_COST, None)
            .map_err(|e| AppError::configuration(format!("Invalid Argon2 parameters: {e}")))?;
        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hashes a plaintext password using Argon2id with a random salt.
    pub fn hash_password(&self, password: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);

        let hash = self
            .argon2()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))?;

        Ok(hash.to_string())
    }

    /// Verifies a plaintext password against a stored Argon2id hash.
    ///
    /// Returns `Ok(true)` if the password matches, `Ok(false)` if not.
    pub fn verify_password(&self, password: &str, hash: &str) -> Result<bool, AppError> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| AppError::internal(format!("Invalid password hash format: {e}")))?;

        match self.argon2().verify_password(password.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AppError::internal(format!(
                "Password verification failed: {e}"
            ))),
        }
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap() -> PasswordHasher {
        PasswordHasher::with_cost(256, 1).unwrap()
    }

    #[test]
    fn test_hash_then_verify() {
        let hasher = cheap();
        let hash = hasher.hash_password("abcdefg123").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify_password("abcdefg123", &hash).unwrap());
        assert!(!hasher.verify_password("abcdefg124", &hash).unwrap());
    }

    #[test]
    fn test_salts_differ() {
        let hasher = cheap();
        let a = hasher.hash_password("abcdefg123").unwrap();
        let b = hasher.hash_password("abcdefg123").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_verifies_hash_made_with_other_cost() {
        let hash = cheap().hash_password("abcdefg123").unwrap();
        let other = PasswordHasher::with_cost(512, 2).unwrap();
        assert!(other.verify_password("abcdefg123", &hash).unwrap());
    }

    #[test]
    fn test_garbage_hash_is_an_error() {
        assert!(cheap().verify_password("abcdefg123", "not-a-hash").is_err());
    }

    #[test]
    fn test_invalid_cost_rejected() {
        assert!(PasswordHasher::with_cost(1, 1).is_err());
    }
}
