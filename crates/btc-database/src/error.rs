//! Error type shared by the migration units, chain and migrator

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use thiserror::Error;

/// Migration errors
#[derive(Error, Debug)]
pub enum MigrationError {
  /// The create/drop precondition (table absent/present) does not hold
  #[error("Schema conflict on table {table}: {reason}")]
  SchemaConflict { table: String, reason: String },

  /// The database is unreachable or the connection dropped mid-operation
  #[error("Connection error: {0}")]
  Connection(String),

  #[error("Database query error: {0}")]
  Query(String),

  #[error("Invalid SQL identifier: {0:?}")]
  InvalidIdentifier(String),

  #[error("Unknown revision: {0}")]
  UnknownRevision(String),

  #[error("Ambiguous revision prefix {prefix}: matches {candidates:?}")]
  AmbiguousRevision { prefix: String, candidates: Vec<String> },

  #[error("Broken migration chain: {0}")]
  BrokenChain(String),

  #[error("Invalid target: {0}")]
  InvalidTarget(String),

  /// The harness ledger disagrees with the chain or the requested operation
  #[error("Ledger error: {0}")]
  Ledger(String),
}

impl MigrationError {
  pub fn conflict(table: &str, reason: impl Into<String>) -> Self {
    MigrationError::SchemaConflict { table: table.to_string(), reason: reason.into() }
  }

  pub fn is_schema_conflict(&self) -> bool {
    matches!(self, MigrationError::SchemaConflict { .. })
  }
}

impl From<DieselError> for MigrationError {
  fn from(err: DieselError) -> Self {
    match err {
      DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, info) => {
        MigrationError::Connection(info.message().to_string())
      }
      DieselError::DatabaseError(_, info) => MigrationError::Query(info.message().to_string()),
      DieselError::BrokenTransactionManager => {
        MigrationError::Connection("transaction manager is broken".to_string())
      }
      _ => MigrationError::Query(err.to_string()),
    }
  }
}

impl From<diesel::ConnectionError> for MigrationError {
  fn from(err: diesel::ConnectionError) -> Self {
    MigrationError::Connection(err.to_string())
  }
}

/// Errors surfacing from `diesel_migrations::MigrationHarness`.
///
/// A chain entry that fails inside the harness comes back boxed; unbox it so
/// `SchemaConflict` and friends reach callers unchanged.
impl From<Box<dyn std::error::Error + Send + Sync>> for MigrationError {
  fn from(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
    match err.downcast::<MigrationError>() {
      Ok(err) => *err,
      Err(err) => match err.downcast::<DieselError>() {
        Ok(err) => MigrationError::from(*err),
        Err(err) => MigrationError::Ledger(err.to_string()),
      },
    }
  }
}

pub type MigrationResult<T> = Result<T, MigrationError>;
