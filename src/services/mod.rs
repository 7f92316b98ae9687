// Service exports
pub mod auth;
pub mod memory;
pub mod postgres;
pub mod store;

pub use auth::{AuthError, AuthService, Claims, Identity};
pub use memory::MemoryStore;
pub use postgres::PostgresClient;
pub use store::{Store, StoreError};
