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
use btc_database::migration::{Dialect, Direction, BASE, HEAD};
use btc_database::{versions, Migrator};
use clap::Args;

/// Render the migration script without connecting to a database
#[derive(Args, Debug)]
pub struct SqlCommand {
  /// Render the downgrade script instead of the upgrade one
  #[arg(long)]
  pub down: bool,

  /// SQL flavour to render (postgres or sqlite)
  #[arg(long, default_value = "postgres")]
  pub dialect: Dialect,

  /// Revision to stop at (defaults to head, or base with --down)
  pub target: Option<String>,
}

pub fn render(cmd: &SqlCommand, config: &Config) -> Result<String> {
  let chain = versions::chain().context("Invalid migration chain")?;
  let migrator = Migrator::new(chain, config.migrator_config());

  let (direction, default_target) = if cmd.down { (Direction::Down, BASE) } else { (Direction::Up, HEAD) };
  let target = cmd.target.as_deref().unwrap_or(default_target);

  Ok(migrator.sql(direction, target, cmd.dialect)?)
}

pub fn execute(cmd: SqlCommand, config: Config) -> Result<()> {
  print!("{}", render(&cmd, &config)?);
  Ok(())
}
