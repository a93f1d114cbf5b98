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

//! Catalog queries behind one trait per backend

use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::sql_query;
use diesel::sql_types::{Bool, Text};
use diesel::sqlite::SqliteConnection;

use super::ddl::Dialect;
use crate::error::MigrationResult;

/// One column as reported by the database catalog
#[derive(QueryableByName, Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
  #[diesel(sql_type = Text)]
  pub name: String,
  #[diesel(sql_type = Text)]
  pub data_type: String,
  #[diesel(sql_type = Bool)]
  pub not_null: bool,
  #[diesel(sql_type = Bool)]
  pub primary_key: bool,
}

/// A connection schema changes can run against.
///
/// DDL goes through `SimpleConnection::batch_execute`; catalog lookups need
/// backend specific SQL and live here. Applied revisions are tracked by the
/// diesel migration harness, not by this trait.
pub trait SchemaConnection: Connection + 'static {
  fn dialect(&self) -> Dialect;

  /// Columns of the base table `table` in declaration order. Empty when no
  /// such table exists; views are not tables.
  fn describe_table(&mut self, table: &str) -> MigrationResult<Vec<ColumnInfo>>;

  fn table_exists(&mut self, table: &str) -> MigrationResult<bool> {
    Ok(!self.describe_table(table)?.is_empty())
  }
}

impl SchemaConnection for PgConnection {
  fn dialect(&self) -> Dialect {
    Dialect::Postgres
  }

  fn describe_table(&mut self, table: &str) -> MigrationResult<Vec<ColumnInfo>> {
    let columns = sql_query(
      r#"
      SELECT c.column_name::text AS name,
             c.data_type::text AS data_type,
             (c.is_nullable = 'NO') AS not_null,
             EXISTS (
               SELECT 1
               FROM information_schema.table_constraints tc
               JOIN information_schema.key_column_usage k
                 ON k.constraint_name = tc.constraint_name
                AND k.table_schema = tc.table_schema
                AND k.table_name = tc.table_name
               WHERE tc.constraint_type = 'PRIMARY KEY'
                 AND tc.table_schema = c.table_schema
                 AND tc.table_name = c.table_name
                 AND k.column_name = c.column_name
             ) AS primary_key
      FROM information_schema.columns c
      JOIN information_schema.tables t
        ON t.table_schema = c.table_schema
       AND t.table_name = c.table_name
      WHERE t.table_type = 'BASE TABLE'
        AND c.table_schema = current_schema()
        AND c.table_name = $1
      ORDER BY c.ordinal_position
      "#,
    )
    .bind::<Text, _>(table)
    .load::<ColumnInfo>(self)?;

    Ok(columns)
  }
}

impl SchemaConnection for SqliteConnection {
  fn dialect(&self) -> Dialect {
    Dialect::Sqlite
  }

  fn describe_table(&mut self, table: &str) -> MigrationResult<Vec<ColumnInfo>> {
    let columns = sql_query(
      r#"
      SELECT p.name AS name,
             p.type AS data_type,
             p."notnull" <> 0 AS not_null,
             p.pk > 0 AS primary_key
      FROM sqlite_master m
      JOIN pragma_table_info(m.name) p
      WHERE m.type = 'table'
        AND m.name = ?
      ORDER BY p.cid
      "#,
    )
    .bind::<Text, _>(table)
    .load::<ColumnInfo>(self)?;

    Ok(columns)
  }
}
