use std::fs;
use std::path::Path;

use chrono::Duration;
use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;

use super::claims::AccessTokenClaims;
use super::errors::TokenError;

/// The only algorithm tokens are signed with and accepted under.
const PINNED_ALGORITHM: Algorithm = Algorithm::RS256;

/// Signs and verifies access tokens with an RSA key pair.
///
/// Keys are parsed once at construction and owned by the instance. Share it
/// between consumers through an `Arc` rather than reloading key material.
pub struct AccessTokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    access_token_lifetime: Duration,
}

impl AccessTokenCodec {
    /// Create a codec from PEM encoded RSA keys.
    ///
    /// # Arguments
    /// * `private_pem` - PKCS#1 or PKCS#8 private key used for signing
    /// * `public_pem` - Matching public key used for verification
    /// * `access_token_lifetime` - Validity of issued tokens
    ///
    /// # Errors
    /// * `KeyLoading` - Either key could not be parsed as RSA
    pub fn from_rsa_pem(
        private_pem: &[u8],
        public_pem: &[u8],
        access_token_lifetime: Duration,
    ) -> Result<Self, TokenError> {
        let encoding_key = EncodingKey::from_rsa_pem(private_pem)
            .map_err(|e| TokenError::KeyLoading(format!("private key: {}", e)))?;
        let decoding_key = DecodingKey::from_rsa_pem(public_pem)
            .map_err(|e| TokenError::KeyLoading(format!("public key: {}", e)))?;

        let mut validation = Validation::new(PINNED_ALGORITHM);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            encoding_key,
            decoding_key,
            validation,
            access_token_lifetime,
        })
    }

    /// Create a codec from PEM files on disk.
    ///
    /// # Errors
    /// * `KeyLoading` - A file could not be read or parsed
    pub fn from_pem_files(
        private_key_path: impl AsRef<Path>,
        public_key_path: impl AsRef<Path>,
        access_token_lifetime: Duration,
    ) -> Result<Self, TokenError> {
        let private_pem = read_key(private_key_path.as_ref())?;
        let public_pem = read_key(public_key_path.as_ref())?;

        Self::from_rsa_pem(&private_pem, &public_pem, access_token_lifetime)
    }

    /// Issue a signed access token for a user.
    ///
    /// # Arguments
    /// * `user_id` - Subject of the token
    /// * `role` - Role claim
    ///
    /// # Returns
    /// Compact JWS string
    ///
    /// # Errors
    /// * `SigningFailed` - Token signing failed
    pub fn generate_access_token(&self, user_id: &str, role: &str) -> Result<String, TokenError> {
        let claims = AccessTokenClaims::new(user_id, role, self.access_token_lifetime);
        self.encode(&claims)
    }

    /// Sign an already built set of claims.
    ///
    /// # Errors
    /// * `SigningFailed` - Token signing failed
    pub fn encode(&self, claims: &AccessTokenClaims) -> Result<String, TokenError> {
        let header = Header::new(PINNED_ALGORITHM);

        encode(&header, claims, &self.encoding_key)
            .map_err(|e| TokenError::SigningFailed(e.to_string()))
    }

    /// Verify a token and return its claims.
    ///
    /// The signature is checked before the expiration, so a forged token is
    /// always reported as invalid even when its `exp` lies in the past.
    ///
    /// # Errors
    /// * `Expired` - Signature is valid but `exp` has passed
    /// * `Invalid` - Malformed token, bad signature, or an algorithm other than RS256
    pub fn token_claims(&self, token: &str) -> Result<AccessTokenClaims, TokenError> {
        decode::<AccessTokenClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid(e.to_string()),
            })
    }
}

fn read_key(path: &Path) -> Result<Vec<u8>, TokenError> {
    fs::read(path).map_err(|e| TokenError::KeyLoading(format!("{}: {}", path.display(), e)))
}
