//! Registered revisions, one module per change

pub mod c8542cd94b7d_bitcoin_table;

use crate::error::MigrationResult;
use crate::migration::{MigrationChain, SchemaChange};

/// Every revision this crate ships, in any order
pub fn all() -> Vec<SchemaChange> {
  vec![c8542cd94b7d_bitcoin_table::REVISION]
}

pub fn chain() -> MigrationResult<MigrationChain> {
  MigrationChain::new(all())
}
