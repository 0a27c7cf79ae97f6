//! Opaque token generation for sessions and single-use email links.
//!
//! Tokens are random alphanumeric strings handed to the client exactly once.
//! Only their SHA-256 digest is stored, so a database leak does not expose
//! live sessions or pending reset links.

use rand::Rng;

use crate::hashing::sha256_hex;

/// Length of every generated token (alphanumeric characters).
pub const TOKEN_LENGTH: usize = 48;

/// Email verification links stay valid for 24 hours.
pub const EMAIL_VERIFICATION_TTL_HOURS: i64 = 24;

/// Password reset links stay valid for 1 hour.
pub const PASSWORD_RESET_TTL_HOURS: i64 = 1;

/// What a single-use email token authorizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenPurpose {
    EmailVerification,
    PasswordReset,
}

impl TokenPurpose {
    /// Database representation (`auth_tokens.purpose`).
    pub fn as_str(self) -> &'static str {
        match self {
            TokenPurpose::EmailVerification => "email_verification",
            TokenPurpose::PasswordReset => "password_reset",
        }
    }

    /// Lifetime of a freshly issued token.
    pub fn ttl(self) -> chrono::Duration {
        match self {
            TokenPurpose::EmailVerification => {
                chrono::Duration::hours(EMAIL_VERIFICATION_TTL_HOURS)
            }
            TokenPurpose::PasswordReset => chrono::Duration::hours(PASSWORD_RESET_TTL_HOURS),
        }
    }
}

/// A freshly generated token: the plaintext goes to the client, the hash to
/// the database.
pub struct GeneratedToken {
    pub plaintext: String,
    pub hash: String,
}

/// Generate a new random token.
pub fn generate_token() -> GeneratedToken {
    let plaintext: String = rand::rng()
        .sample_iter(&rand::distr::Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect();
    let hash = hash_token(&plaintext);
    GeneratedToken { plaintext, hash }
}

/// Digest used to look a presented token up in storage.
pub fn hash_token(token: &str) -> String {
    sha256_hex(token.as_bytes())
}

/// Cheap shape check before touching the database.
///
/// Anything that could not have been produced by [`generate_token`] is
/// rejected, which keeps garbage cookies away from the session table.
pub fn is_well_formed(token: &str) -> bool {
    token.len() == TOKEN_LENGTH && token.chars().all(|c| c.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_token_has_expected_shape() {
        let token = generate_token();
        assert_eq!(token.plaintext.len(), TOKEN_LENGTH);
        assert!(is_well_formed(&token.plaintext));
        assert_eq!(token.hash, hash_token(&token.plaintext));
        assert_eq!(token.hash.len(), 64);
    }

    #[test]
    fn tokens_are_unique() {
        let a = generate_token();
        let b = generate_token();
        assert_ne!(a.plaintext, b.plaintext);
        assert_ne!(a.hash, b.hash);
    }

    #[test]
    fn malformed_tokens_rejected() {
        assert!(!is_well_formed(""));
        assert!(!is_well_formed("short"));
        assert!(!is_well_formed(&"a".repeat(TOKEN_LENGTH - 1)));
        assert!(!is_well_formed(&format!("{}-", "a".repeat(TOKEN_LENGTH - 1))));
    }

    #[test]
    fn purposes_have_distinct_lifetimes() {
        assert_eq!(
            TokenPurpose::EmailVerification.ttl(),
            chrono::Duration::hours(24)
        );
        assert_eq!(TokenPurpose::PasswordReset.ttl(), chrono::Duration::hours(1));
        assert_eq!(TokenPurpose::PasswordReset.as_str(), "password_reset");
    }
}
