use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;

use crate::migration::Dialect;

/// A live connection to either supported backend
pub enum DatabaseConnection {
  Postgres(PgConnection),
  Sqlite(SqliteConnection),
}

impl DatabaseConnection {
  pub fn dialect(&self) -> Dialect {
    match self {
      DatabaseConnection::Postgres(_) => Dialect::Postgres,
      DatabaseConnection::Sqlite(_) => Dialect::Sqlite,
    }
  }
}

impl std::fmt::Debug for DatabaseConnection {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "DatabaseConnection({})", self.dialect())
  }
}

/// Runs `$body` with `$c` bound to the concrete connection inside a
/// [`DatabaseConnection`], so generic code over `SchemaConnection` can be
/// called without matching on the backend by hand.
#[macro_export]
macro_rules! with_connection {
  ($conn:expr, |$c:ident| $body:expr) => {
    match $conn {
      $crate::connection::DatabaseConnection::Postgres($c) => $body,
      $crate::connection::DatabaseConnection::Sqlite($c) => $body,
    }
  };
}

/// Backend a database URL points at. Anything that is not a postgres URL is
/// treated as a SQLite path.
pub fn dialect_for_url(database_url: &str) -> Dialect {
  if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
    Dialect::Postgres
  } else {
    Dialect::Sqlite
  }
}

/// Establish a database connection
pub fn establish_connection(database_url: &str) -> Result<DatabaseConnection, diesel::ConnectionError> {
  match dialect_for_url(database_url) {
    Dialect::Postgres => PgConnection::establish(database_url).map(DatabaseConnection::Postgres),
    Dialect::Sqlite => {
      let path = database_url.strip_prefix("sqlite://").unwrap_or(database_url);
      SqliteConnection::establish(path).map(DatabaseConnection::Sqlite)
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::error::MigrationError;

  #[test]
  fn test_dialect_for_url() {
    assert_eq!(dialect_for_url("postgres://u:p@localhost/db"), Dialect::Postgres);
    assert_eq!(dialect_for_url("postgresql://localhost/db"), Dialect::Postgres);
    assert_eq!(dialect_for_url("sqlite://prices.db"), Dialect::Sqlite);
    assert_eq!(dialect_for_url(":memory:"), Dialect::Sqlite);
  }

  #[test]
  fn test_establish_sqlite_memory() {
    let conn = establish_connection("sqlite://:memory:").unwrap();
    assert_eq!(conn.dialect(), Dialect::Sqlite);
  }

  #[test]
  fn test_unreachable_postgres_is_connection_error() {
    let err = establish_connection("postgres://nobody@127.0.0.1:1/missing").unwrap_err();
    assert!(matches!(MigrationError::from(err), MigrationError::Connection(_)));
  }

  #[test]
  fn test_unopenable_sqlite_is_connection_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("no_such_dir").join("prices.db");
    let err = establish_connection(path.to_str().unwrap()).unwrap_err();
    assert!(matches!(MigrationError::from(err), MigrationError::Connection(_)));
  }
}
