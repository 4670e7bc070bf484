pub mod memory;
#[cfg(feature = "database")]
pub mod postgres;

pub use memory::{InMemoryAccessTokenRepository, InMemoryPinUserRepository};
#[cfg(feature = "database")]
pub use postgres::{PostgresAccessTokenRepository, PostgresPinUserRepository};
