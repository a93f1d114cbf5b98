pub mod connection;
pub mod error;
pub mod migration;
pub mod models;
pub mod schema;
pub mod versions;

// Re-export commonly used items
pub use connection::{establish_connection, DatabaseConnection};
pub use error::{MigrationError, MigrationResult};
pub use migration::{Migrator, MigratorConfig, SchemaChange, SchemaConnection};
pub use versions::c8542cd94b7d_bitcoin_table::{BITCOIN, REVISION as BITCOIN_TABLE};
