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

use anyhow::Result;
use clap::{Parser, Subcommand};
use dotenvy::dotenv;

mod commands;
use commands::sql::SqlCommand;

mod config;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(name = "btc")]
#[command(propagate_version = true)]
struct Cli {
  #[command(subcommand)]
  command: Commands,

  /// Database URL (postgres://... or a SQLite path); overrides DATABASE_URL
  #[arg(long, global = true)]
  database_url: Option<String>,

  /// Verbose output
  #[arg(short, long, global = true)]
  verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
  /// Apply pending revisions up to TARGET
  Upgrade {
    #[arg(default_value = "head")]
    target: String,
  },
  /// Revert applied revisions down to TARGET ("base" reverts everything)
  Downgrade { target: String },
  /// Show the newest applied revision
  Current,
  /// List all revisions, newest first
  History {
    /// Print as JSON
    #[arg(long)]
    json: bool,
  },
  Sql(SqlCommand),
}

fn main() -> Result<()> {
  // Load environment variables
  dotenv().ok();

  // Parse CLI arguments
  let cli = Cli::parse();

  // Initialize logging
  let log_level = if cli.verbose { "debug" } else { "info" };
  tracing_subscriber::fmt().with_env_filter(log_level).init();

  // Load configuration
  let mut config = config::Config::from_env()?;
  if cli.database_url.is_some() {
    config.database_url = cli.database_url;
  }

  // Execute command
  match cli.command {
    Commands::Upgrade { target } => {
      commands::migrate::upgrade(&config, &target)?;
    }
    Commands::Downgrade { target } => {
      commands::migrate::downgrade(&config, &target)?;
    }
    Commands::Current => {
      commands::migrate::current(&config)?;
    }
    Commands::History { json } => {
      commands::migrate::history(&config, json)?;
    }
    Commands::Sql(cmd) => commands::sql::execute(cmd, config)?,
  }

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use btc_database::migration::Dialect;

  #[test]
  fn test_parse_upgrade_defaults_to_head() {
    let cli = Cli::try_parse_from(["btc", "upgrade"]).unwrap();
    assert!(matches!(cli.command, Commands::Upgrade { ref target } if target == "head"));
    assert!(!cli.verbose);
  }

  #[test]
  fn test_downgrade_requires_target() {
    assert!(Cli::try_parse_from(["btc", "downgrade"]).is_err());
    let cli = Cli::try_parse_from(["btc", "downgrade", "base", "--database-url", "x.db"]).unwrap();
    assert!(matches!(cli.command, Commands::Downgrade { ref target } if target == "base"));
    assert_eq!(cli.database_url.as_deref(), Some("x.db"));
  }

  #[test]
  fn test_parse_sql_command() {
    let cli = Cli::try_parse_from(["btc", "-v", "sql", "--down", "--dialect", "sqlite"]).unwrap();
    assert!(cli.verbose);
    match cli.command {
      Commands::Sql(cmd) => {
        assert!(cmd.down);
        assert_eq!(cmd.dialect, Dialect::Sqlite);
        assert!(cmd.target.is_none());
      }
      other => panic!("unexpected command {other:?}"),
    }
  }

  #[test]
  fn test_rejects_unknown_dialect() {
    assert!(Cli::try_parse_from(["btc", "sql", "--dialect", "oracle"]).is_err());
  }
}
