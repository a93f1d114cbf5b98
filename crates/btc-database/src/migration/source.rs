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
//! Chain entries as diesel migrations.
//!
//! Each entry becomes a `diesel::migration::Migration` whose version is its
//! 1-based chain position followed by the revision id (`0001_c8542cd94b7d`),
//! so the harness's lexical version order is the chain order. Applied
//! versions live in diesel's own `__diesel_schema_migrations` table.

use std::fmt;
use std::marker::PhantomData;

use diesel::connection::BoxableConnection;
use diesel::migration::{self, Migration, MigrationMetadata, MigrationName, MigrationSource, MigrationVersion};

use super::chain::MigrationChain;
use super::change::SchemaChange;
use super::introspect::SchemaConnection;
use crate::error::{MigrationError, MigrationResult};

/// Ledger table maintained by `diesel_migrations::MigrationHarness`
pub const LEDGER_TABLE: &str = "__diesel_schema_migrations";

/// Harness version of the chain entry at `position` (0-based)
pub fn version_for(position: usize, revision: &str) -> String {
  format!("{:04}_{revision}", position + 1)
}

/// One chain entry, runnable by the harness on connections of type `C`
pub struct ChainedChange<C> {
  change: SchemaChange,
  version: String,
  transactional: bool,
  _conn: PhantomData<fn() -> C>,
}

impl<C> ChainedChange<C> {
  pub fn new(position: usize, change: SchemaChange, transactional: bool) -> Self {
    Self {
      version: version_for(position, change.revision),
      change,
      transactional,
      _conn: PhantomData,
    }
  }

  pub fn change(&self) -> &SchemaChange {
    &self.change
  }
}

impl<C> fmt::Display for ChainedChange<C> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} ({})", self.version, self.change.message)
  }
}

impl<C> MigrationName for ChainedChange<C> {
  fn version(&self) -> MigrationVersion<'_> {
    MigrationVersion::from(&self.version)
  }
}

impl<C> MigrationMetadata for ChainedChange<C> {
  fn run_in_transaction(&self) -> bool {
    self.transactional
  }
}

impl<C: SchemaConnection> Migration<C::Backend> for ChainedChange<C> {
  fn run(&self, conn: &mut dyn BoxableConnection<C::Backend>) -> migration::Result<()> {
    self.change.upgrade(downcast::<C>(conn)?)?;
    Ok(())
  }

  fn revert(&self, conn: &mut dyn BoxableConnection<C::Backend>) -> migration::Result<()> {
    self.change.downgrade(downcast::<C>(conn)?)?;
    Ok(())
  }

  fn metadata(&self) -> &dyn MigrationMetadata {
    self
  }

  fn name(&self) -> &dyn MigrationName {
    self
  }
}

fn downcast<C: SchemaConnection>(
  conn: &mut dyn BoxableConnection<C::Backend>,
) -> MigrationResult<&mut C> {
  conn.downcast_mut::<C>().ok_or_else(|| {
    MigrationError::Connection(format!("expected a {} connection", std::any::type_name::<C>()))
  })
}

/// Hands the whole chain to the harness, root first
pub struct ChainSource<'a, C> {
  chain: &'a MigrationChain,
  transactional: bool,
  _conn: PhantomData<fn() -> C>,
}

impl<'a, C> ChainSource<'a, C> {
  pub fn new(chain: &'a MigrationChain, transactional: bool) -> Self {
    Self { chain, transactional, _conn: PhantomData }
  }
}

impl<C> Clone for ChainSource<'_, C> {
  fn clone(&self) -> Self {
    *self
  }
}

impl<C> Copy for ChainSource<'_, C> {}

impl<C: SchemaConnection> MigrationSource<C::Backend> for ChainSource<'_, C> {
  fn migrations(&self) -> migration::Result<Vec<Box<dyn Migration<C::Backend>>>> {
    Ok(
      self
        .chain
        .iter()
        .enumerate()
        .map(|(position, change)| {
          Box::new(ChainedChange::<C>::new(position, *change, self.transactional))
            as Box<dyn Migration<C::Backend>>
        })
        .collect(),
    )
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::versions;
  use diesel::sqlite::{Sqlite, SqliteConnection};
  use pretty_assertions::assert_eq;

  #[test]
  fn test_versions_follow_chain_order() {
    assert_eq!(version_for(0, "c8542cd94b7d"), "0001_c8542cd94b7d");
    assert!(version_for(8, "ffff") < version_for(9, "0000"));
  }

  #[test]
  fn test_source_lists_chain() {
    let chain = versions::chain().unwrap();
    let source = ChainSource::<SqliteConnection>::new(&chain, true);
    let migrations = MigrationSource::<Sqlite>::migrations(&source).unwrap();

    let names: Vec<_> = migrations.iter().map(|m| m.name().version().to_string()).collect();
    assert_eq!(names, vec!["0001_c8542cd94b7d".to_string()]);
    assert!(migrations[0].metadata().run_in_transaction());
    assert_eq!(migrations[0].name().to_string(), "0001_c8542cd94b7d (Bitcoin table)");
  }

  #[test]
  fn test_non_transactional_metadata() {
    let change =
      ChainedChange::<SqliteConnection>::new(0, versions::c8542cd94b7d_bitcoin_table::REVISION, false);
    assert!(!change.metadata().run_in_transaction());
    assert_eq!(change.change().revision, "c8542cd94b7d");
  }
}
