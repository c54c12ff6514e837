use anyhow::{anyhow, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};

#[derive(Debug, Clone)]
pub struct Argon2Config {
    pub memory_cost_kib: u32,
    pub time_cost: u32,
    pub parallelism: u32,
    pub output_length: usize,
}

impl Default for Argon2Config {
    fn default() -> Self {
        Self {
            memory_cost_kib: 19456,
            time_cost: 2,
            parallelism: 1,
            output_length: 32,
        }
    }
}

impl Argon2Config {
    pub fn low_memory() -> Self {
        Self {
            memory_cost_kib: 8192,
            time_cost: 1,
            parallelism: 1,
            output_length: 32,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PasswordIssue {
    TooShort { min: usize, actual: usize },
    MissingLetter,
    MissingDigit,
}

impl PasswordIssue {
    pub fn message(&self) -> String {
        match self {
            Self::TooShort { min, actual } => {
                format!("Password must be at least {min} characters (currently {actual})")
            }
            Self::MissingLetter => "Password must contain a letter".to_string(),
            Self::MissingDigit => "Password must contain a digit".to_string(),
        }
    }
}

pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Minimal policy applied to passwords chosen at bootstrap.
pub fn check_password(password: &str) -> Vec<PasswordIssue> {
    let mut issues = Vec::new();
    let len = password.chars().count();
    if len < MIN_PASSWORD_LENGTH {
        issues.push(PasswordIssue::TooShort {
            min: MIN_PASSWORD_LENGTH,
            actual: len,
        });
    }
    if !password.chars().any(char::is_alphabetic) {
        issues.push(PasswordIssue::MissingLetter);
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        issues.push(PasswordIssue::MissingDigit);
    }
    issues
}

pub struct PasswordHasher2 {
    argon2: Argon2<'static>,
}

impl PasswordHasher2 {
    pub fn new(argon2_config: Argon2Config) -> Result<Self> {
        let params = Params::new(
            argon2_config.memory_cost_kib,
            argon2_config.time_cost,
            argon2_config.parallelism,
            Some(argon2_config.output_length),
        )
        .map_err(|e| anyhow!("Invalid Argon2 parameters: {e}"))?;

        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        Ok(Self { argon2 })
    }

    pub fn with_defaults() -> Result<Self> {
        Self::new(Argon2Config::default())
    }

    pub fn hash(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| anyhow!("Failed to hash password: {e}"))?;

        Ok(hash.to_string())
    }

    pub fn verify(&self, password: &str, hash: &str) -> Result<bool> {
        let parsed_hash =
            PasswordHash::new(hash).map_err(|e| anyhow!("Invalid password hash format: {e}"))?;

        match self.argon2.verify_password(password.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(anyhow!("Password verification failed: {e}")),
        }
    }
}

pub fn hash_password(password: &str) -> Result<String> {
    let hasher = PasswordHasher2::with_defaults()?;
    hasher.hash(password)
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let hasher = PasswordHasher2::with_defaults()?;
    hasher.verify(password, hash)
}
