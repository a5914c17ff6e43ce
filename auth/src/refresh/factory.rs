use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Duration;
use chrono::Utc;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Digest;
use sha2::Sha256;
use subtle::ConstantTimeEq;

use super::errors::RefreshTokenError;
use super::token::ClientContext;
use super::token::RefreshToken;
use super::token::TokenHash;

/// Random bytes drawn for every refresh token (256 bits).
pub const REFRESH_TOKEN_BYTES: usize = 32;

/// Issues opaque refresh tokens and derives their storage hash and
/// client-binding fingerprint.
///
/// Holds the server-side fingerprint secret; immutable after construction.
pub struct RefreshTokenFactory {
    fingerprint_secret: String,
    refresh_token_lifetime: Duration,
}

impl RefreshTokenFactory {
    /// Create a new factory.
    ///
    /// # Arguments
    /// * `fingerprint_secret` - Server secret mixed into every fingerprint
    /// * `refresh_token_lifetime` - Validity of issued refresh tokens
    pub fn new(fingerprint_secret: impl Into<String>, refresh_token_lifetime: Duration) -> Self {
        Self {
            fingerprint_secret: fingerprint_secret.into(),
            refresh_token_lifetime,
        }
    }

    /// Draw a new refresh token for a user and client.
    ///
    /// The plaintext is 32 bytes from the operating system CSPRNG, encoded as
    /// unpadded base64url.
    ///
    /// # Errors
    /// * `EntropyUnavailable` - The OS random source failed
    pub fn generate(
        &self,
        user_id: impl ToString,
        client: ClientContext,
    ) -> Result<RefreshToken, RefreshTokenError> {
        let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| RefreshTokenError::EntropyUnavailable(e.to_string()))?;

        let now = Utc::now();

        Ok(RefreshToken {
            token: URL_SAFE_NO_PAD.encode(bytes),
            user_id: user_id.to_string(),
            client,
            created_at: now,
            expires_at: now + self.refresh_token_lifetime,
            revoked: false,
        })
    }

    /// Storage lookup key of a plaintext token.
    pub fn hash(&self, token: &str) -> TokenHash {
        let digest = Sha256::digest(token.as_bytes());

        let mut bytes = [0u8; TokenHash::LENGTH];
        bytes.copy_from_slice(&digest);
        TokenHash::new(bytes)
    }

    /// Fingerprint binding a plaintext token to a client and the server secret.
    ///
    /// Every field is length-prefixed before hashing so that no two distinct
    /// tuples share an input.
    pub fn fingerprint(&self, token: &str, client: &ClientContext) -> String {
        let mut hasher = Sha256::new();

        for field in [
            token,
            client.user_agent.as_str(),
            client.ip.as_str(),
            self.fingerprint_secret.as_str(),
        ] {
            hasher.update((field.len() as u64).to_be_bytes());
            hasher.update(field.as_bytes());
        }

        hex::encode(hasher.finalize())
    }

    /// Fingerprint of a token returned by [`generate`](Self::generate).
    pub fn fingerprint_of(&self, token: &RefreshToken) -> String {
        self.fingerprint(&token.token, &token.client)
    }

    /// Constant-time fingerprint comparison.
    pub fn fingerprints_match(presented: &str, stored: &str) -> bool {
        presented.as_bytes().ct_eq(stored.as_bytes()).into()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::refresh::token::PresentedRefreshToken;

    fn factory() -> RefreshTokenFactory {
        RefreshTokenFactory::new("test-fingerprint-secret", Duration::hours(720))
    }

    fn client() -> ClientContext {
        ClientContext::new("Mozilla/5.0 (X11; Linux x86_64)", "203.0.113.7")
    }

    #[test]
    fn test_generate() {
        let token = factory()
            .generate("user123", client())
            .expect("Failed to generate token");

        // 32 bytes as unpadded base64url
        assert_eq!(token.token.len(), 43);
        assert!(token
            .token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        assert_eq!(token.user_id, "user123");
        assert_eq!(token.client, client());
        assert_eq!(token.expires_at - token.created_at, Duration::hours(720));
        assert!(!token.revoked);
    }

    #[test]
    fn test_generate_is_unique() {
        let factory = factory();
        let tokens: HashSet<String> = (0..100)
            .map(|_| factory.generate("user123", client()).unwrap().token)
            .collect();

        assert_eq!(tokens.len(), 100);
    }

    #[test]
    fn test_hash_is_deterministic_and_one_way() {
        let factory = factory();
        let token = factory.generate("user123", client()).unwrap();

        let first = factory.hash(&token.token);
        let second = factory.hash(&token.token);

        assert_eq!(first, second);
        assert_eq!(first.as_bytes().len(), 32);
        assert_ne!(first.as_bytes(), token.token.as_bytes());
        assert_ne!(first.to_hex(), token.token);
        assert_ne!(first, factory.hash("another-token"));
    }

    #[test]
    fn test_hash_ignores_secret() {
        let other = RefreshTokenFactory::new("other-secret", Duration::hours(1));
        assert_eq!(factory().hash("token"), other.hash("token"));
    }

    #[test]
    fn test_fingerprint_is_deterministic() {
        let factory = factory();
        assert_eq!(
            factory.fingerprint("token", &client()),
            factory.fingerprint("token", &client())
        );
    }

    #[test]
    fn test_fingerprint_depends_on_every_input() {
        let factory = factory();
        let baseline = factory.fingerprint("token", &client());

        let other_agent = ClientContext::new("curl/8.0", "203.0.113.7");
        let other_ip = ClientContext::new("Mozilla/5.0 (X11; Linux x86_64)", "198.51.100.1");
        let other_secret = RefreshTokenFactory::new("other-secret", Duration::hours(720));

        assert_ne!(baseline, factory.fingerprint("token", &other_agent));
        assert_ne!(baseline, factory.fingerprint("token", &other_ip));
        assert_ne!(baseline, factory.fingerprint("other-token", &client()));
        assert_ne!(baseline, other_secret.fingerprint("token", &client()));
    }

    #[test]
    fn test_fingerprint_fields_do_not_shift() {
        let factory = factory();

        let left = factory.fingerprint("token", &ClientContext::new("a.b", "c"));
        let right = factory.fingerprint("token", &ClientContext::new("a", "b.c"));

        assert_ne!(left, right);
    }

    #[test]
    fn test_fingerprint_same_for_issued_and_presented_token() {
        let factory = factory();
        let issued = factory.generate("user123", client()).unwrap();
        let presented = PresentedRefreshToken::new(issued.token.clone(), client());

        assert_eq!(
            factory.fingerprint_of(&issued),
            factory.fingerprint(&presented.token, &presented.client)
        );
    }

    #[test]
    fn test_fingerprints_match() {
        let factory = factory();
        let stored = factory.fingerprint("token", &client());

        assert!(RefreshTokenFactory::fingerprints_match(&stored, &stored.clone()));
        assert!(!RefreshTokenFactory::fingerprints_match(
            &factory.fingerprint("token", &ClientContext::new("curl/8.0", "203.0.113.7")),
            &stored
        ));
        assert!(!RefreshTokenFactory::fingerprints_match("", &stored));
    }
}
