//! Password strength checks and bcrypt hashing.
//!
//! A raw password becomes a [ValidatedPassword] once zxcvbn scores it as
//! strong enough, and only a validated password can be turned into a
//! [PasswordHash] for storage.

use std::fmt::Display;

use bcrypt::BcryptError;
use zxcvbn::{Score, feedback::Feedback, zxcvbn};

use crate::Error;

/// A password that is strong enough to use, but not yet hashed.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedPassword(String);

impl ValidatedPassword {
    /// Check the strength of `raw_password`.
    ///
    /// `user_inputs` are other values from the same form, e.g. the username,
    /// which make a password easier to guess if it contains them.
    ///
    /// # Errors
    /// Returns [Error::TooWeak] with zxcvbn's suggestions if the password scores below three.
    pub fn new(raw_password: &str, user_inputs: &[&str]) -> Result<Self, Error> {
        let analysis = zxcvbn(raw_password, user_inputs);

        if matches!(analysis.score(), Score::Three | Score::Four) {
            return Ok(Self(raw_password.to_owned()));
        }

        let feedback = analysis
            .feedback()
            .map(Feedback::to_string)
            .unwrap_or_default();

        Err(Error::TooWeak(feedback))
    }

    /// Wrap `raw_password` without checking its strength.
    ///
    /// Intended for tests and tooling that seed known passwords.
    pub fn new_unchecked(raw_password: &str) -> Self {
        Self(raw_password.to_owned())
    }
}

impl Display for ValidatedPassword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("********")
    }
}

/// A salted bcrypt hash of a password.
#[derive(Debug, Clone, PartialEq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// The bcrypt cost used for new accounts.
    pub const DEFAULT_COST: u32 = bcrypt::DEFAULT_COST;

    /// Hash `password` with bcrypt using `cost` rounds.
    ///
    /// # Errors
    /// Returns [Error::HashingError] if bcrypt fails, e.g. for an out of range cost.
    pub fn new(password: ValidatedPassword, cost: u32) -> Result<Self, Error> {
        bcrypt::hash(&password.0, cost)
            .map(Self)
            .map_err(|error| Error::HashingError(error.to_string()))
    }

    /// Wrap an existing hash, e.g. one read from the database.
    pub fn new_unchecked(raw_password_hash: &str) -> Self {
        Self(raw_password_hash.to_owned())
    }

    /// Check `raw_password` against this hash.
    pub fn verify(&self, raw_password: &str) -> Result<bool, BcryptError> {
        bcrypt::verify(raw_password, &self.0)
    }
}

impl AsRef<str> for PasswordHash {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for PasswordHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}


#[cfg(test)]
mod password_hash_tests {
    use super::{PasswordHash, ValidatedPassword};

    // The minimum bcrypt cost keeps these tests fast.
    const TEST_COST: u32 = 4;

    #[test]
    fn verifies_matching_password() {
        let hash = PasswordHash::new(ValidatedPassword::new_unchecked("okon"), TEST_COST).unwrap();

        assert!(hash.verify("okon").unwrap());
    }

    #[test]
    fn rejects_wrong_password() {
        let hash = PasswordHash::new(ValidatedPassword::new_unchecked("okon"), TEST_COST).unwrap();

        assert!(!hash.verify("thewrongpassword").unwrap());
    }

    #[test]
    fn hashes_are_salted() {
        let first =
            PasswordHash::new(ValidatedPassword::new_unchecked("okon"), TEST_COST).unwrap();
        let second =
            PasswordHash::new(ValidatedPassword::new_unchecked("okon"), TEST_COST).unwrap();

        assert_ne!(first, second);
    }
}
