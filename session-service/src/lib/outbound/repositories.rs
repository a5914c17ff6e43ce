pub mod session;
pub mod user;

pub use session::PostgresSessionStore;
pub use user::PostgresUserRepository;
