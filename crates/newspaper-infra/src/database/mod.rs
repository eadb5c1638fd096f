//! Post store and category registry implementations.

mod connections;
mod memory;

#[cfg(feature = "postgres")]
mod postgres_base;
#[cfg(feature = "postgres")]
pub mod postgres_repo;

#[cfg(feature = "postgres")]
pub mod entity;

pub use connections::DatabaseConfig;
pub use memory::{InMemoryCategoryRepository, InMemoryPostRepository};

#[cfg(feature = "postgres")]
pub use connections::connect;
#[cfg(feature = "postgres")]
pub use postgres_repo::{PostgresCategoryRepository, PostgresPostRepository};
