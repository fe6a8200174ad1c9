// Service exports
pub mod postgres;
pub mod records;
pub mod store;

pub use postgres::{PostgresClient, PostgresError};
pub use records::{RecordStoreClient, RecordStoreError, RecordTables};
pub use store::{InMemoryMatchStore, MatchStore, MatchStoreError};
