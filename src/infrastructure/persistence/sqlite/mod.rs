//! SQLite Persistence

mod credential_repo;
mod database;
mod message_repo;
mod set_repo;

pub use credential_repo::SqliteCredentialRepository;
pub use database::{create_pool, run_migrations, DatabaseConfig, DbPool};
pub use message_repo::SqliteMessageRepository;
pub use set_repo::SqliteSetRepository;
