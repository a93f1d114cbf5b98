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
//! Drives chain entries through the diesel migration harness

use diesel::migration::CREATE_MIGRATIONS_TABLE;
use diesel::Connection;
use diesel_migrations::MigrationHarness;
use log::{info, warn};
use serde::Serialize;

use super::chain::{MigrationChain, Target};
use super::change::{Direction, SchemaChange};
use super::ddl::Dialect;
use super::introspect::SchemaConnection;
use super::source::{version_for, ChainSource, LEDGER_TABLE};
use crate::error::{MigrationError, MigrationResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MigratorConfig {
  /// Run each change and its ledger update inside one transaction
  pub transactional: bool,
}

impl Default for MigratorConfig {
  fn default() -> Self {
    Self { transactional: true }
  }
}

/// A chain entry together with its state in one database
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
  pub revision: String,
  pub down_revision: Option<String>,
  pub message: String,
  pub create_date: String,
  pub applied: bool,
  pub is_head: bool,
}

pub struct Migrator {
  chain: MigrationChain,
  config: MigratorConfig,
}

impl Migrator {
  pub fn new(chain: MigrationChain, config: MigratorConfig) -> Self {
    Self { chain, config }
  }

  pub fn chain(&self) -> &MigrationChain {
    &self.chain
  }

  pub fn config(&self) -> &MigratorConfig {
    &self.config
  }

  /// The chain as a `MigrationSource` for connections of type `C`
  pub fn source<C: SchemaConnection>(&self) -> ChainSource<'_, C> {
    ChainSource::new(&self.chain, self.config.transactional)
  }

  /// Chain position of a harness version, `None` for versions from elsewhere
  fn position_of(&self, version: &str) -> Option<usize> {
    let (_, revision) = version.split_once('_')?;
    let position = self.chain.position(revision)?;
    (version_for(position, revision) == version).then_some(position)
  }

  fn revision_of(&self, version: &str) -> MigrationResult<&'static str> {
    self
      .position_of(version)
      .and_then(|p| self.chain.at(p))
      .map(|c| c.revision)
      .ok_or_else(|| {
        MigrationError::Ledger(format!("ledger holds migration {version} which is not in the chain"))
      })
  }

  /// Number of applied changes. Applied revisions always form a prefix of the chain.
  fn applied_count<C>(&self, conn: &mut C) -> MigrationResult<usize>
  where
    C: SchemaConnection + MigrationHarness<<C as Connection>::Backend>,
  {
    let recorded = conn.applied_migrations()?;

    let mut positions = recorded
      .iter()
      .map(|version| {
        let version = version.to_string();
        self.position_of(&version).ok_or_else(|| {
          MigrationError::Ledger(format!("ledger holds migration {version} which is not in the chain"))
        })
      })
      .collect::<MigrationResult<Vec<_>>>()?;
    positions.sort_unstable();

    for (expected, actual) in positions.iter().enumerate() {
      if expected != *actual {
        let missing = self.chain.at(expected).map(|c| c.revision).unwrap_or("?");
        return Err(MigrationError::Ledger(format!(
          "revision {missing} is not applied but a later revision is"
        )));
      }
    }

    Ok(positions.len())
  }

  /// The newest applied change, `None` when the database is at base
  pub fn current<C>(&self, conn: &mut C) -> MigrationResult<Option<&SchemaChange>>
  where
    C: SchemaConnection + MigrationHarness<<C as Connection>::Backend>,
  {
    let applied = self.applied_count(conn)?;
    Ok(applied.checked_sub(1).and_then(|i| self.chain.at(i)))
  }

  /// Changes not yet applied, oldest first
  pub fn pending<C>(&self, conn: &mut C) -> MigrationResult<Vec<&SchemaChange>>
  where
    C: SchemaConnection + MigrationHarness<<C as Connection>::Backend>,
  {
    let applied = self.applied_count(conn)?;
    Ok(self.chain.iter().skip(applied).collect())
  }

  /// Every chain entry, oldest first, flagged with whether it is applied
  pub fn history<C>(&self, conn: &mut C) -> MigrationResult<Vec<HistoryEntry>>
  where
    C: SchemaConnection + MigrationHarness<<C as Connection>::Backend>,
  {
    let applied = self.applied_count(conn)?;
    let head = self.chain.head().revision;
    Ok(
      self
        .chain
        .iter()
        .enumerate()
        .map(|(i, c)| HistoryEntry {
          revision: c.revision.to_string(),
          down_revision: c.down_revision.map(str::to_string),
          message: c.message.to_string(),
          create_date: c.create_date.to_string(),
          applied: i < applied,
          is_head: c.revision == head,
        })
        .collect(),
    )
  }

  /// Applies pending changes up to and including `target`.
  ///
  /// Returns the revisions applied, oldest first.
  pub fn upgrade<C>(&self, conn: &mut C, target: &str) -> MigrationResult<Vec<&'static str>>
  where
    C: SchemaConnection + MigrationHarness<<C as Connection>::Backend>,
  {
    let applied = self.applied_count(conn)?;
    let upto = match self.chain.resolve(target)? {
      Target::Base if applied == 0 => return Ok(Vec::new()),
      Target::Base => {
        return Err(MigrationError::InvalidTarget(
          "cannot upgrade to base from an applied revision, downgrade instead".to_string(),
        ));
      }
      Target::Revision(i) if i + 1 < applied => {
        return Err(MigrationError::InvalidTarget(format!(
          "{target} is behind the current revision, downgrade instead"
        )));
      }
      Target::Revision(i) => i + 1,
    };
    self.warn_if_untransacted();

    let mut done = Vec::new();
    if upto == self.chain.len() {
      let versions: Vec<String> =
        conn.run_pending_migrations(self.source::<C>())?.iter().map(|v| v.to_string()).collect();
      for version in versions {
        done.push(self.revision_of(&version)?);
      }
    } else {
      let pending = conn.pending_migrations(self.source::<C>())?;
      for migration in pending.iter().take(upto - applied) {
        let version = conn.run_migration(&**migration)?.to_string();
        done.push(self.revision_of(&version)?);
      }
    }

    if done.is_empty() {
      info!("Already at {target}, nothing to upgrade");
    }
    Ok(done)
  }

  /// Reverts applied changes, newest first, until `target` is the newest
  /// applied one (`base` reverts everything).
  ///
  /// Returns the revisions reverted, newest first.
  pub fn downgrade<C>(&self, conn: &mut C, target: &str) -> MigrationResult<Vec<&'static str>>
  where
    C: SchemaConnection + MigrationHarness<<C as Connection>::Backend>,
  {
    let applied = self.applied_count(conn)?;
    let keep = match self.chain.resolve(target)? {
      Target::Base => 0,
      Target::Revision(i) if i + 1 > applied => {
        return Err(MigrationError::InvalidTarget(format!(
          "{target} is ahead of the current revision, upgrade instead"
        )));
      }
      Target::Revision(i) => i + 1,
    };
    self.warn_if_untransacted();

    let mut done = Vec::new();
    for _ in keep..applied {
      let version = conn.revert_last_migration(self.source::<C>())?.to_string();
      done.push(self.revision_of(&version)?);
    }

    if done.is_empty() {
      info!("Already at {target}, nothing to downgrade");
    }
    Ok(done)
  }

  fn warn_if_untransacted(&self) {
    if !self.config.transactional {
      warn!("Running schema changes outside a transaction");
    }
  }

  /// Offline mode: the script `upgrade`/`downgrade` would run from base or
  /// head respectively, without touching a database.
  pub fn sql(&self, direction: Direction, target: &str, dialect: Dialect) -> MigrationResult<String> {
    let resolved = self.chain.resolve(target)?;
    let bound = match resolved {
      Target::Base => 0,
      Target::Revision(i) => i + 1,
    };
    let mut script = String::new();

    match direction {
      Direction::Up => {
        push_statement(&mut script, CREATE_MIGRATIONS_TABLE.trim().trim_end_matches(';'));
        for (position, change) in self.chain.iter().enumerate().take(bound) {
          script.push_str(&format!(
            "-- Running upgrade {} -> {}\n\n",
            change.down_revision.unwrap_or(""),
            change.revision
          ));
          for stmt in change.render(Direction::Up, dialect)? {
            push_statement(&mut script, &stmt);
          }
          push_statement(
            &mut script,
            &format!(
              "INSERT INTO {LEDGER_TABLE} (version) VALUES ({})",
              sql_literal(&version_for(position, change.revision))
            ),
          );
        }
      }
      Direction::Down => {
        for (position, change) in self.chain.iter().enumerate().skip(bound).rev() {
          script.push_str(&format!(
            "-- Running downgrade {} -> {}\n\n",
            change.revision,
            change.down_revision.unwrap_or("")
          ));
          for stmt in change.render(Direction::Down, dialect)? {
            push_statement(&mut script, &stmt);
          }
          push_statement(
            &mut script,
            &format!(
              "DELETE FROM {LEDGER_TABLE} WHERE version = {}",
              sql_literal(&version_for(position, change.revision))
            ),
          );
        }
      }
    }

    Ok(script)
  }
}

fn push_statement(script: &mut String, stmt: &str) {
  script.push_str(stmt);
  script.push_str(";\n\n");
}

fn sql_literal(value: &str) -> String {
  format!("'{}'", value.replace('\'', "''"))
}
