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

//! Bitcoin table
//!
//! Revision ID: c8542cd94b7d
//! Revises: (root)
//! Create Date: 2018-01-23 16:09:53.627618

use crate::migration::{ColumnDef, ColumnType, SchemaChange, SchemaOp, TableDef};

/// Daily bitcoin quotes keyed by calendar date
pub static BITCOIN: TableDef = TableDef {
  name: "bitcoin",
  columns: &[
    ColumnDef::required("date", ColumnType::Date),
    ColumnDef::nullable("open", ColumnType::Float),
    ColumnDef::nullable("high", ColumnType::Float),
    ColumnDef::nullable("low", ColumnType::Float),
    ColumnDef::nullable("close", ColumnType::Float),
    ColumnDef::nullable("volume", ColumnType::Float),
    ColumnDef::nullable("marketcap", ColumnType::Float),
  ],
  primary_key: &["date"],
};

pub static REVISION: SchemaChange = SchemaChange {
  revision: "c8542cd94b7d",
  down_revision: None,
  message: "Bitcoin table",
  create_date: "2018-01-23 16:09:53.627618",
  branch_labels: &[],
  depends_on: &[],
  ops: &[SchemaOp::CreateTable(&BITCOIN)],
};

#[cfg(test)]
mod tests {
  use super::*;
  use crate::migration::{Dialect, Direction};
  use pretty_assertions::assert_eq;

  #[test]
  fn test_revision_is_chain_root() {
    assert!(REVISION.is_root());
    assert!(REVISION.branch_labels.is_empty());
    assert!(REVISION.depends_on.is_empty());
  }

  #[test]
  fn test_upgrade_sql_postgres() {
    let sql = REVISION.render(Direction::Up, Dialect::Postgres).unwrap();
    assert_eq!(
      sql,
      vec![
        "CREATE TABLE \"bitcoin\" (\n    \
         \"date\" DATE NOT NULL,\n    \
         \"open\" DOUBLE PRECISION,\n    \
         \"high\" DOUBLE PRECISION,\n    \
         \"low\" DOUBLE PRECISION,\n    \
         \"close\" DOUBLE PRECISION,\n    \
         \"volume\" DOUBLE PRECISION,\n    \
         \"marketcap\" DOUBLE PRECISION,\n    \
         PRIMARY KEY (\"date\")\n)"
          .to_string()
      ]
    );
  }

  #[test]
  fn test_downgrade_is_single_drop() {
    assert_eq!(REVISION.downgrade_ops(), vec![SchemaOp::DropTable(&BITCOIN)]);
    assert_eq!(
      REVISION.render(Direction::Down, Dialect::Sqlite).unwrap(),
      vec!["DROP TABLE \"bitcoin\"".to_string()]
    );
  }

  #[test]
  fn test_only_date_is_required() {
    let required: Vec<_> = BITCOIN.columns.iter().filter(|c| !c.nullable).map(|c| c.name).collect();
    assert_eq!(required, vec!["date"]);
    assert_eq!(BITCOIN.columns.len(), 7);
  }
}
