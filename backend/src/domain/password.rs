//! Password digests.
//!
//! A digest is a deterministic SHA-256 of the email and password joined by a
//! separator, hex encoded. Verification recomputes the digest and compares.
//! Changing the email therefore invalidates the stored digest.

use std::fmt;

use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

const SEPARATOR: &[u8] = b"|";

/// Plain-text password, wiped from memory on drop.
#[derive(Clone)]
pub struct Password(Zeroizing<String>);

impl Password {
    /// Wrap a plain-text password.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(Zeroizing::new(raw.into()))
    }

    fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(<redacted>)")
    }
}

/// Hex encoded one-way digest of `(email, password)`.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordDigest(String);

impl PasswordDigest {
    /// Compute the digest for the given credentials.
    ///
    /// # Examples
    /// ```
    /// use social_backend::domain::{Password, PasswordDigest};
    ///
    /// let digest = PasswordDigest::derive("ada@example.com", &Password::new("s3cret"));
    /// assert!(digest.verify("ada@example.com", &Password::new("s3cret")));
    /// assert!(!digest.verify("ada@example.com", &Password::new("guess")));
    /// ```
    pub fn derive(email: &str, password: &Password) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(email.as_bytes());
        hasher.update(SEPARATOR);
        hasher.update(password.expose().as_bytes());
        Self(hex::encode(hasher.finalize()))
    }

    /// Rehydrate a digest loaded from storage.
    pub fn from_stored(hex_digest: impl Into<String>) -> Self {
        Self(hex_digest.into())
    }

    /// Recompute the digest for the candidate credentials and compare.
    pub fn verify(&self, email: &str, candidate: &Password) -> bool {
        let recomputed = Self::derive(email, candidate);
        constant_time_eq(self.0.as_bytes(), recomputed.0.as_bytes())
    }

    /// Hex encoded digest for storage.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PasswordDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordDigest(<redacted>)")
    }
}

fn constant_time_eq(left: &[u8], right: &[u8]) -> bool {
    if left.len() != right.len() {
        return false;
    }
    left.iter()
        .zip(right)
        .fold(0_u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn digest_is_deterministic() {
        let first = PasswordDigest::derive("a@b.c", &Password::new("pw"));
        let second = PasswordDigest::derive("a@b.c", &Password::new("pw"));
        assert!(first == second);
        assert_eq!(first.as_str().len(), 64);
    }

    #[rstest]
    #[case("other@b.c", "pw")]
    #[case("a@b.c", "PW")]
    fn digest_depends_on_both_inputs(#[case] email: &str, #[case] password: &str) {
        let stored = PasswordDigest::derive("a@b.c", &Password::new("pw"));
        assert!(!stored.verify(email, &Password::new(password)));
    }

    #[rstest]
    fn debug_output_is_redacted() {
        let password = Password::new("hunter2");
        assert!(!format!("{password:?}").contains("hunter2"));
    }
}
