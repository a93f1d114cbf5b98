use anyhow::{anyhow, Context, Result};
use btc_database::MigratorConfig;
use std::env;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
  /// Not needed for offline SQL rendering, hence optional here
  pub database_url: Option<String>,
  pub transactional: bool,
}

impl Config {
  pub fn from_env() -> Result<Self> {
    let database_url = env::var("DATABASE_URL").ok();

    let transactional = match env::var("BTC_TRANSACTIONAL") {
      Ok(value) => parse_flag(&value).context("Invalid BTC_TRANSACTIONAL")?,
      Err(_) => true,
    };

    Ok(Self { database_url, transactional })
  }

  pub fn database_url(&self) -> Result<&str> {
    self
      .database_url
      .as_deref()
      .context("DATABASE_URL environment variable not set (or pass --database-url)")
  }

  pub fn migrator_config(&self) -> MigratorConfig {
    MigratorConfig { transactional: self.transactional }
  }
}

fn parse_flag(value: &str) -> Result<bool> {
  match value.trim().to_ascii_lowercase().as_str() {
    "1" | "true" | "yes" | "on" => Ok(true),
    "0" | "false" | "no" | "off" => Ok(false),
    other => Err(anyhow!("expected a boolean, got {other:?}")),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;
  use serial_test::serial;

  fn clear() {
    env::remove_var("DATABASE_URL");
    env::remove_var("BTC_TRANSACTIONAL");
  }

  #[test]
  #[serial]
  fn test_config_defaults() {
    clear();
    let config = Config::from_env().unwrap();
    assert_eq!(
      config,
      Config { database_url: None, transactional: true }
    );
    assert!(config.database_url().is_err());
  }

  #[test]
  #[serial]
  fn test_config_from_env() {
    clear();
    env::set_var("DATABASE_URL", "postgres://localhost/prices");
    env::set_var("BTC_TRANSACTIONAL", "off");

    let config = Config::from_env().unwrap();
    assert_eq!(config.database_url().unwrap(), "postgres://localhost/prices");
    assert_eq!(config.migrator_config(), MigratorConfig { transactional: false });
    clear();
  }

  #[test]
  #[serial]
  fn test_invalid_transactional_flag() {
    clear();
    env::set_var("BTC_TRANSACTIONAL", "sometimes");
    assert!(Config::from_env().is_err());
    clear();
  }
}
