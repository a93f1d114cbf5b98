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

use crate::config::Config;
use anyhow::{Context, Result};
use btc_database::migration::HistoryEntry;
use btc_database::{establish_connection, versions, with_connection, DatabaseConnection, Migrator};
use tracing::info;

fn open(config: &Config) -> Result<(Migrator, DatabaseConnection)> {
  let chain = versions::chain().context("Invalid migration chain")?;
  let migrator = Migrator::new(chain, config.migrator_config());
  let url = config.database_url()?;
  let conn = establish_connection(url).context("Failed to connect to database")?;
  info!("Connected to {} database", conn.dialect());
  Ok((migrator, conn))
}

pub fn upgrade(config: &Config, target: &str) -> Result<Vec<&'static str>> {
  let (migrator, mut conn) = open(config)?;
  let applied = with_connection!(&mut conn, |c| migrator.upgrade(c, target))
    .with_context(|| format!("Upgrade to {target} failed"))?;
  for revision in &applied {
    println!("Applied {revision}");
  }
  Ok(applied)
}

pub fn downgrade(config: &Config, target: &str) -> Result<Vec<&'static str>> {
  let (migrator, mut conn) = open(config)?;
  let reverted = with_connection!(&mut conn, |c| migrator.downgrade(c, target))
    .with_context(|| format!("Downgrade to {target} failed"))?;
  for revision in &reverted {
    println!("Reverted {revision}");
  }
  Ok(reverted)
}

pub fn current(config: &Config) -> Result<Option<&'static str>> {
  let (migrator, mut conn) = open(config)?;
  let current = with_connection!(&mut conn, |c| migrator.current(c))?.map(|change| change.revision);
  match current {
    Some(revision) => {
      let head = migrator.chain().head().revision == revision;
      println!("{revision}{}", if head { " (head)" } else { "" });
    }
    None => println!("<base>"),
  }
  Ok(current)
}

/// Prints the chain newest first and returns it in that order
pub fn history(config: &Config, json: bool) -> Result<Vec<HistoryEntry>> {
  let (migrator, mut conn) = open(config)?;
  let mut entries = with_connection!(&mut conn, |c| migrator.history(c))?;
  entries.reverse();
  println!("{}", render_history(&entries, json)?);
  Ok(entries)
}

pub fn render_history(entries: &[HistoryEntry], json: bool) -> Result<String> {
  if json {
    return Ok(serde_json::to_string_pretty(entries)?);
  }
  Ok(entries.iter().map(format_entry).collect::<Vec<_>>().join("\n"))
}

pub fn format_entry(entry: &HistoryEntry) -> String {
  let mut tags = Vec::new();
  if entry.is_head {
    tags.push("head");
  }
  if entry.applied {
    tags.push("applied");
  }
  let tags = if tags.is_empty() { String::new() } else { format!(" ({})", tags.join(", ")) };
  format!(
    "{} -> {}{}, {} [{}]",
    entry.down_revision.as_deref().unwrap_or("<base>"),
    entry.revision,
    tags,
    entry.message,
    entry.create_date
  )
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;

  fn sqlite_config(dir: &tempfile::TempDir) -> Config {
    Config {
      database_url: Some(dir.path().join("btc.db").to_str().unwrap().to_string()),
      transactional: true,
    }
  }

  #[test]
  fn test_upgrade_current_downgrade() {
    let dir = tempfile::tempdir().unwrap();
    let config = sqlite_config(&dir);

    assert_eq!(current(&config).unwrap(), None);
    assert_eq!(upgrade(&config, "head").unwrap(), vec!["c8542cd94b7d"]);
    assert_eq!(current(&config).unwrap(), Some("c8542cd94b7d"));
    assert!(upgrade(&config, "head").unwrap().is_empty());

    let entries = history(&config, false).unwrap();
    assert!(entries[0].applied);

    assert_eq!(downgrade(&config, "base").unwrap(), vec!["c8542cd94b7d"]);
    assert_eq!(current(&config).unwrap(), None);
  }

  #[test]
  fn test_downgrade_unknown_target_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = sqlite_config(&dir);
    assert!(downgrade(&config, "ffffff").is_err());
  }

  #[test]
  fn test_missing_database_url() {
    let config = Config { database_url: None, transactional: true };
    assert!(upgrade(&config, "head").is_err());
  }

  fn entry(revision: &str, down_revision: Option<&str>, is_head: bool) -> HistoryEntry {
    HistoryEntry {
      revision: revision.to_string(),
      down_revision: down_revision.map(str::to_string),
      message: "Bitcoin table".to_string(),
      create_date: "2018-01-23 16:09:53.627618".to_string(),
      applied: false,
      is_head,
    }
  }

  #[test]
  fn test_text_and_json_history_share_order() {
    // `history` hands entries over already reversed, newest first
    let entries = vec![entry("bbb222", Some("c8542cd94b7d"), true), entry("c8542cd94b7d", None, false)];

    let text = render_history(&entries, false).unwrap();
    let lines: Vec<_> = text.lines().collect();
    assert!(lines[0].contains("-> bbb222"));
    assert!(lines[1].starts_with("<base> -> c8542cd94b7d"));

    let json: serde_json::Value = serde_json::from_str(&render_history(&entries, true).unwrap()).unwrap();
    let revisions: Vec<_> =
      json.as_array().unwrap().iter().map(|e| e["revision"].as_str().unwrap()).collect();
    assert_eq!(revisions, vec!["bbb222", "c8542cd94b7d"]);
  }

  #[test]
  fn test_history_command_is_newest_first() {
    let dir = tempfile::tempdir().unwrap();
    let config = sqlite_config(&dir);
    upgrade(&config, "head").unwrap();

    let entries = history(&config, true).unwrap();
    assert_eq!(entries.first().map(|e| e.is_head), Some(true));
  }

  #[test]
  fn test_format_entry() {
    let entry = entry("c8542cd94b7d", None, true);
    assert_eq!(
      format_entry(&entry),
      "<base> -> c8542cd94b7d (head), Bitcoin table [2018-01-23 16:09:53.627618]"
    );
  }
}
