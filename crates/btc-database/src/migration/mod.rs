//! Reversible schema changes, their chain and the migrator that runs them

pub mod chain;
pub mod change;
pub mod ddl;
pub mod introspect;
pub mod migrator;
pub mod source;

pub use chain::{MigrationChain, Target, BASE, HEAD};
pub use change::{Direction, SchemaChange};
pub use ddl::{ColumnDef, ColumnType, Dialect, SchemaOp, TableDef};
pub use introspect::{ColumnInfo, SchemaConnection};
pub use migrator::{HistoryEntry, Migrator, MigratorConfig};
pub use source::{version_for, ChainSource, ChainedChange, LEDGER_TABLE};
