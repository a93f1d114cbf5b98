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

//! Ordered registry of schema changes linked by `down_revision`

use std::collections::{HashMap, HashSet};

use super::change::SchemaChange;
use crate::error::{MigrationError, MigrationResult};

/// Symbolic target for the newest revision
pub const HEAD: &str = "head";
/// Symbolic target for "before the first revision"
pub const BASE: &str = "base";

/// Where a target resolves to inside a chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
  /// Nothing applied
  Base,
  /// Up to and including the change at this index
  Revision(usize),
}

/// A validated, linear sequence of changes, root first.
#[derive(Debug, Clone)]
pub struct MigrationChain {
  ordered: Vec<SchemaChange>,
  index: HashMap<&'static str, usize>,
}

impl MigrationChain {
  /// Orders `changes` by following `down_revision` links from the root.
  ///
  /// The links must form a single line: one root, no unknown parents, no
  /// parent revised twice and no cycles.
  pub fn new(changes: Vec<SchemaChange>) -> MigrationResult<Self> {
    if changes.is_empty() {
      return Err(MigrationError::BrokenChain("no revisions registered".to_string()));
    }

    let mut by_revision: HashMap<&'static str, SchemaChange> = HashMap::new();
    for change in &changes {
      if by_revision.insert(change.revision, *change).is_some() {
        return Err(MigrationError::BrokenChain(format!(
          "duplicate revision {}",
          change.revision
        )));
      }
    }

    let mut child_of: HashMap<&'static str, &'static str> = HashMap::new();
    let mut roots = Vec::new();
    for change in &changes {
      match change.down_revision {
        None => roots.push(change.revision),
        Some(parent) => {
          if !by_revision.contains_key(parent) {
            return Err(MigrationError::BrokenChain(format!(
              "{} revises unknown revision {}",
              change.revision, parent
            )));
          }
          if let Some(other) = child_of.insert(parent, change.revision) {
            return Err(MigrationError::BrokenChain(format!(
              "{} is revised by both {} and {}",
              parent, other, change.revision
            )));
          }
        }
      }
    }

    let root = match roots.as_slice() {
      [root] => *root,
      [] => return Err(MigrationError::BrokenChain("no root revision (cycle?)".to_string())),
      many => {
        return Err(MigrationError::BrokenChain(format!("multiple root revisions: {many:?}")));
      }
    };

    let mut ordered = Vec::with_capacity(changes.len());
    let mut seen = HashSet::new();
    let mut cursor = Some(root);
    while let Some(rev) = cursor {
      seen.insert(rev);
      ordered.push(by_revision[rev]);
      cursor = child_of.get(rev).copied();
    }

    if ordered.len() != changes.len() {
      let mut detached: Vec<_> =
        changes.iter().map(|c| c.revision).filter(|r| !seen.contains(r)).collect();
      detached.sort_unstable();
      return Err(MigrationError::BrokenChain(format!(
        "revisions not reachable from root {root}: {detached:?}"
      )));
    }

    let index = ordered.iter().enumerate().map(|(i, c)| (c.revision, i)).collect();
    Ok(Self { ordered, index })
  }

  pub fn base(&self) -> &SchemaChange {
    &self.ordered[0]
  }

  pub fn head(&self) -> &SchemaChange {
    &self.ordered[self.ordered.len() - 1]
  }

  pub fn len(&self) -> usize {
    self.ordered.len()
  }

  pub fn get(&self, revision: &str) -> Option<&SchemaChange> {
    self.index.get(revision).map(|&i| &self.ordered[i])
  }

  pub fn position(&self, revision: &str) -> Option<usize> {
    self.index.get(revision).copied()
  }

  /// Root to head
  pub fn iter(&self) -> impl DoubleEndedIterator<Item = &SchemaChange> + ExactSizeIterator {
    self.ordered.iter()
  }

  pub fn at(&self, position: usize) -> Option<&SchemaChange> {
    self.ordered.get(position)
  }

  /// Resolves `head`, `base`, a full revision or a unique revision prefix.
  pub fn resolve(&self, target: &str) -> MigrationResult<Target> {
    let target = target.trim();
    if target.eq_ignore_ascii_case(HEAD) {
      return Ok(Target::Revision(self.ordered.len() - 1));
    }
    if target.eq_ignore_ascii_case(BASE) {
      return Ok(Target::Base);
    }
    if let Some(i) = self.position(target) {
      return Ok(Target::Revision(i));
    }
    if target.is_empty() {
      return Err(MigrationError::UnknownRevision(target.to_string()));
    }

    let candidates: Vec<usize> = self
      .ordered
      .iter()
      .enumerate()
      .filter(|(_, c)| c.revision.starts_with(target))
      .map(|(i, _)| i)
      .collect();

    match candidates.as_slice() {
      [i] => Ok(Target::Revision(*i)),
      [] => Err(MigrationError::UnknownRevision(target.to_string())),
      many => Err(MigrationError::AmbiguousRevision {
        prefix: target.to_string(),
        candidates: many.iter().map(|&i| self.ordered[i].revision.to_string()).collect(),
      }),
    }
  }
}
