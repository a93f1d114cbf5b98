/*
 *
 *
 *
 *
 * MIT License
 * Copyright (c) 2025. Dwight J. Browne
 * dwight[-at-]dwightjbrowne[-dot-]com
 *
 *
 * Permission is hereby granted, free of charge, to any person obtaining a copy
 * of this software and associated documentation files (the "Software"), to deal
 * in the Software without restriction, including without limitation the rights
 * to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
 * copies of the Software, and to permit persons to whom the Software is
 * furnished to do so, subject to the following conditions:
 *
 * The above copyright notice and this permission notice shall be included in all
 * copies or substantial portions of the Software.
 *
 * THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
 * IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
 * FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
 * AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
 * LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
 * OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
 * SOFTWARE.
 */

//! Declarative table descriptions and the DDL they render to

use std::fmt;

use crate::error::{MigrationError, MigrationResult};

/// SQL flavour a statement is rendered for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
  Postgres,
  Sqlite,
}

impl fmt::Display for Dialect {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Dialect::Postgres => write!(f, "postgres"),
      Dialect::Sqlite => write!(f, "sqlite"),
    }
  }
}

impl std::str::FromStr for Dialect {
  type Err = MigrationError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_ascii_lowercase().as_str() {
      "postgres" | "postgresql" | "pg" => Ok(Dialect::Postgres),
      "sqlite" | "sqlite3" => Ok(Dialect::Sqlite),
      other => Err(MigrationError::InvalidTarget(format!("unknown dialect {other}"))),
    }
  }
}

/// Portable column types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
  /// Calendar date without time of day
  Date,
  /// Double precision floating point
  Float,
}

impl ColumnType {
  pub fn to_sql(self, dialect: Dialect) -> &'static str {
    match (self, dialect) {
      (ColumnType::Date, _) => "DATE",
      (ColumnType::Float, Dialect::Postgres) => "DOUBLE PRECISION",
      (ColumnType::Float, Dialect::Sqlite) => "REAL",
    }
  }

  /// Whether a type name reported by the database catalog denotes this type.
  ///
  /// PostgreSQL reports `information_schema.columns.data_type` in lower case;
  /// SQLite echoes the declared type verbatim.
  pub fn matches_reported(self, dialect: Dialect, reported: &str) -> bool {
    reported.trim().eq_ignore_ascii_case(self.to_sql(dialect))
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnDef {
  pub name: &'static str,
  pub ty: ColumnType,
  pub nullable: bool,
}

impl ColumnDef {
  pub const fn required(name: &'static str, ty: ColumnType) -> Self {
    ColumnDef { name, ty, nullable: false }
  }

  pub const fn nullable(name: &'static str, ty: ColumnType) -> Self {
    ColumnDef { name, ty, nullable: true }
  }

  fn to_sql(&self, dialect: Dialect) -> MigrationResult<String> {
    let mut sql = format!("{} {}", quote_ident(self.name)?, self.ty.to_sql(dialect));
    if !self.nullable {
      sql.push_str(" NOT NULL");
    }
    Ok(sql)
  }
}

/// A table as a flat list of columns plus its primary key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableDef {
  pub name: &'static str,
  pub columns: &'static [ColumnDef],
  pub primary_key: &'static [&'static str],
}

impl TableDef {
  pub fn column(&self, name: &str) -> Option<&ColumnDef> {
    self.columns.iter().find(|c| c.name == name)
  }

  pub fn create_sql(&self, dialect: Dialect) -> MigrationResult<String> {
    let mut parts =
      self.columns.iter().map(|c| c.to_sql(dialect)).collect::<MigrationResult<Vec<_>>>()?;

    if !self.primary_key.is_empty() {
      for key in self.primary_key {
        if self.column(key).is_none() {
          return Err(MigrationError::InvalidIdentifier(format!(
            "primary key column {key} is not a column of {}",
            self.name
          )));
        }
      }
      let keys = self.primary_key.iter().map(|k| quote_ident(k)).collect::<MigrationResult<Vec<_>>>()?;
      parts.push(format!("PRIMARY KEY ({})", keys.join(", ")));
    }

    Ok(format!("CREATE TABLE {} (\n    {}\n)", quote_ident(self.name)?, parts.join(",\n    ")))
  }

  pub fn drop_sql(&self) -> MigrationResult<String> {
    Ok(format!("DROP TABLE {}", quote_ident(self.name)?))
  }
}

/// One DDL action of a schema change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaOp {
  CreateTable(&'static TableDef),
  DropTable(&'static TableDef),
}

impl SchemaOp {
  pub fn table(&self) -> &'static TableDef {
    match *self {
      SchemaOp::CreateTable(t) | SchemaOp::DropTable(t) => t,
    }
  }

  /// The action that undoes this one at the schema level
  pub fn inverse(&self) -> SchemaOp {
    match *self {
      SchemaOp::CreateTable(t) => SchemaOp::DropTable(t),
      SchemaOp::DropTable(t) => SchemaOp::CreateTable(t),
    }
  }

  pub fn to_sql(&self, dialect: Dialect) -> MigrationResult<String> {
    match self {
      SchemaOp::CreateTable(t) => t.create_sql(dialect),
      SchemaOp::DropTable(t) => t.drop_sql(),
    }
  }
}

impl fmt::Display for SchemaOp {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      SchemaOp::CreateTable(t) => write!(f, "create table {}", t.name),
      SchemaOp::DropTable(t) => write!(f, "drop table {}", t.name),
    }
  }
}

/// Accepts `[A-Za-z_][A-Za-z0-9_]*` only, so quoting never needs escaping.
pub fn validate_ident(name: &str) -> MigrationResult<&str> {
  let mut chars = name.chars();
  let valid = match chars.next() {
    Some(first) if first.is_ascii_alphabetic() || first == '_' => {
      chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
    }
    _ => false,
  };
  if valid { Ok(name) } else { Err(MigrationError::InvalidIdentifier(name.to_string())) }
}

pub fn quote_ident(name: &str) -> MigrationResult<String> {
  Ok(format!("\"{}\"", validate_ident(name)?))
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;

  static PAIRS: TableDef = TableDef {
    name: "pairs",
    columns: &[
      ColumnDef::required("day", ColumnType::Date),
      ColumnDef::nullable("rate", ColumnType::Float),
    ],
    primary_key: &["day"],
  };

  #[test]
  fn test_create_sql_postgres() {
    let sql = SchemaOp::CreateTable(&PAIRS).to_sql(Dialect::Postgres).unwrap();
    assert_eq!(
      sql,
      "CREATE TABLE \"pairs\" (\n    \"day\" DATE NOT NULL,\n    \"rate\" DOUBLE PRECISION,\n    PRIMARY KEY (\"day\")\n)"
    );
  }

  #[test]
  fn test_create_sql_sqlite_uses_real() {
    let sql = PAIRS.create_sql(Dialect::Sqlite).unwrap();
    assert!(sql.contains("\"rate\" REAL"));
    assert!(sql.contains("\"day\" DATE NOT NULL"));
  }

  #[test]
  fn test_inverse_swaps_create_and_drop() {
    let op = SchemaOp::CreateTable(&PAIRS);
    assert_eq!(op.inverse(), SchemaOp::DropTable(&PAIRS));
    assert_eq!(op.inverse().inverse(), op);
    assert_eq!(op.inverse().to_sql(Dialect::Sqlite).unwrap(), "DROP TABLE \"pairs\"");
  }

  #[test]
  fn test_column_rendering() {
    let col = ColumnDef::required("day", ColumnType::Date);
    assert_eq!(col.to_sql(Dialect::Postgres).unwrap(), "\"day\" DATE NOT NULL");
    let col = ColumnDef::nullable("rate", ColumnType::Float);
    assert_eq!(col.to_sql(Dialect::Sqlite).unwrap(), "\"rate\" REAL");
  }

  #[test]
  fn test_identifier_validation() {
    assert!(validate_ident("bitcoin").is_ok());
    assert!(validate_ident("_prices2").is_ok());
    assert!(validate_ident("").is_err());
    assert!(validate_ident("2fast").is_err());
    assert!(matches!(
      quote_ident("bit\"coin"),
      Err(MigrationError::InvalidIdentifier(name)) if name == "bit\"coin"
    ));
  }

  #[test]
  fn test_unknown_primary_key_column_rejected() {
    static BROKEN: TableDef = TableDef {
      name: "broken",
      columns: &[ColumnDef::required("a", ColumnType::Date)],
      primary_key: &["b"],
    };
    assert!(BROKEN.create_sql(Dialect::Postgres).is_err());
  }

  #[test]
  fn test_reported_type_matching() {
    assert!(ColumnType::Float.matches_reported(Dialect::Postgres, "double precision"));
    assert!(ColumnType::Float.matches_reported(Dialect::Sqlite, "REAL"));
    assert!(ColumnType::Date.matches_reported(Dialect::Postgres, "date"));
    assert!(!ColumnType::Float.matches_reported(Dialect::Postgres, "real"));
  }

  #[test]
  fn test_dialect_parse() {
    assert_eq!("PostgreSQL".parse::<Dialect>().unwrap(), Dialect::Postgres);
    assert_eq!("sqlite".parse::<Dialect>().unwrap(), Dialect::Sqlite);
    assert!("mysql".parse::<Dialect>().is_err());
  }
}
