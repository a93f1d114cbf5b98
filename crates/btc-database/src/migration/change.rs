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

//! A single reversible schema change, addressed by its revision id

use diesel::connection::SimpleConnection;
use log::{debug, info};

use super::ddl::{Dialect, SchemaOp};
use super::introspect::SchemaConnection;
use crate::error::{MigrationError, MigrationResult};

/// Immutable description of one migration step.
///
/// `ops` is the forward action list. The downgrade is derived from it (ops
/// reversed, each one inverted), so the two directions are exact inverses.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SchemaChange {
  pub revision: &'static str,
  /// Predecessor revision, `None` at the root of the chain
  pub down_revision: Option<&'static str>,
  pub message: &'static str,
  /// Creation timestamp, `%Y-%m-%d %H:%M:%S%.f`
  pub create_date: &'static str,
  pub branch_labels: &'static [&'static str],
  pub depends_on: &'static [&'static str],
  pub ops: &'static [SchemaOp],
}

/// Direction a change is run in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
  Up,
  Down,
}

impl SchemaChange {
  pub fn is_root(&self) -> bool {
    self.down_revision.is_none()
  }

  pub fn upgrade_ops(&self) -> Vec<SchemaOp> {
    self.ops.to_vec()
  }

  pub fn downgrade_ops(&self) -> Vec<SchemaOp> {
    self.ops.iter().rev().map(SchemaOp::inverse).collect()
  }

  pub fn ops_for(&self, direction: Direction) -> Vec<SchemaOp> {
    match direction {
      Direction::Up => self.upgrade_ops(),
      Direction::Down => self.downgrade_ops(),
    }
  }

  /// Statements this change issues in `direction`, without touching a database
  pub fn render(&self, direction: Direction, dialect: Dialect) -> MigrationResult<Vec<String>> {
    self.ops_for(direction).iter().map(|op| op.to_sql(dialect)).collect()
  }

  /// Apply the forward actions.
  ///
  /// Fails with `SchemaConflict` if a table to be created already exists.
  pub fn upgrade<C: SchemaConnection>(&self, conn: &mut C) -> MigrationResult<()> {
    info!("Upgrading to {} ({})", self.revision, self.message);
    self.run(conn, Direction::Up)
  }

  /// Apply the inverse actions.
  ///
  /// Fails with `SchemaConflict` if a table to be dropped does not exist.
  pub fn downgrade<C: SchemaConnection>(&self, conn: &mut C) -> MigrationResult<()> {
    info!("Downgrading {} ({})", self.revision, self.message);
    self.run(conn, Direction::Down)
  }

  fn run<C: SchemaConnection>(&self, conn: &mut C, direction: Direction) -> MigrationResult<()> {
    let dialect = conn.dialect();
    for op in self.ops_for(direction) {
      check_precondition(conn, &op)?;
      let sql = op.to_sql(dialect)?;
      debug!("{}: {}", self.revision, sql);
      SimpleConnection::batch_execute(conn, &sql)?;
    }
    Ok(())
  }
}

fn check_precondition<C: SchemaConnection>(conn: &mut C, op: &SchemaOp) -> MigrationResult<()> {
  let table = op.table().name;
  let exists = conn.table_exists(table)?;
  match op {
    SchemaOp::CreateTable(_) if exists => Err(MigrationError::conflict(table, "table already exists")),
    SchemaOp::DropTable(_) if !exists => Err(MigrationError::conflict(table, "table does not exist")),
    _ => Ok(()),
  }
}
