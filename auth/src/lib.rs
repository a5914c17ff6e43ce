//! Session credential primitives
//!
//! Provides the token building blocks used by the session service:
//! - Access tokens: RS256 signed claims with a pinned algorithm
//! - Refresh tokens: opaque random values, their storage hash and their
//!   client-binding fingerprint
//!
//! Storage, password checks and the login/rotation protocol live in the
//! service; this crate holds no state beyond the keys and secrets it is
//! constructed with.
//!
//! # Examples
//!
//! ## Access Tokens
//! ```
//! use auth::AccessTokenCodec;
//! use chrono::Duration;
//!
//! let codec = AccessTokenCodec::from_rsa_pem(
//!     include_bytes!("../testdata/private.pem"),
//!     include_bytes!("../testdata/public.pem"),
//!     Duration::minutes(15),
//! )
//! .unwrap();
//!
//! let token = codec.generate_access_token("user123", "employee").unwrap();
//! let claims = codec.token_claims(&token).unwrap();
//! assert_eq!(claims.role, "employee");
//! ```
//!
//! ## Refresh Tokens
//! ```
//! use auth::{ClientContext, PresentedRefreshToken, RefreshTokenFactory};
//! use chrono::Duration;
//!
//! let factory = RefreshTokenFactory::new("server-secret", Duration::days(30));
//! let client = ClientContext::new("curl/8.0", "203.0.113.7");
//!
//! // Issue: only hash and fingerprint are stored
//! let issued = factory.generate("user123", client.clone()).unwrap();
//! let stored_hash = factory.hash(&issued.token);
//! let stored_fingerprint = factory.fingerprint_of(&issued);
//!
//! // Present: recompute from the client's value and request context
//! let presented = PresentedRefreshToken::new(issued.token.clone(), client);
//! assert_eq!(factory.hash(&presented.token), stored_hash);
//! assert!(RefreshTokenFactory::fingerprints_match(
//!     &factory.fingerprint(&presented.token, &presented.client),
//!     &stored_fingerprint,
//! ));
//! ```

pub mod jwt;
pub mod refresh;

// Re-export commonly used items
pub use jwt::AccessTokenClaims;
pub use jwt::AccessTokenCodec;
pub use jwt::TokenError;
pub use refresh::ClientContext;
pub use refresh::PresentedRefreshToken;
pub use refresh::RefreshToken;
pub use refresh::RefreshTokenError;
pub use refresh::RefreshTokenFactory;
pub use refresh::TokenHash;
