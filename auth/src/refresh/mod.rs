pub mod errors;
pub mod factory;
pub mod token;

pub use errors::RefreshTokenError;
pub use factory::RefreshTokenFactory;
pub use token::ClientContext;
pub use token::PresentedRefreshToken;
pub use token::RefreshToken;
pub use token::TokenHash;
