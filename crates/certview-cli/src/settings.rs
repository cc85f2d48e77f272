//! Runtime settings: optional TOML file layered under `CERTVIEW_*`
//! environment variables. Command-line flags override both.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use certview_core::{record::TierRules, table::DEFAULT_PAGE_SIZE};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
  /// Base URL of the lookup service.
  pub base_url:        String,
  pub timeout_secs:    u64,
  /// Initial rows per page in the TUI.
  pub page_size:       usize,
  /// Directory the TUI proposes for exported workbooks.
  pub export_dir:      PathBuf,
  /// Where the TUI writes its log. Nothing is logged when unset.
  pub log_file:        Option<PathBuf>,
  pub primary_tiers:   Vec<String>,
  pub secondary_tiers: Vec<String>,
}

impl Default for Settings {
  fn default() -> Self {
    let tiers = TierRules::default();
    Self {
      base_url:        "http://localhost:8080".to_string(),
      timeout_secs:    30,
      page_size:       DEFAULT_PAGE_SIZE,
      export_dir:      PathBuf::from("."),
      log_file:        None,
      primary_tiers:   tiers.primary,
      secondary_tiers: tiers.secondary,
    }
  }
}

impl Settings {
  /// Load from `path` (may be absent) and the environment.
  pub fn load(path: &Path) -> anyhow::Result<Self> { Self::load_with(path, environment()) }

  fn load_with(path: &Path, env: config::Environment) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(env)
      .build()
      .with_context(|| format!("failed to read config file {}", path.display()))?;

    settings
      .try_deserialize()
      .context("failed to deserialise Settings")
  }

  pub fn tier_rules(&self) -> TierRules {
    TierRules {
      primary:   self.primary_tiers.clone(),
      secondary: self.secondary_tiers.clone(),
    }
  }
}

/// `CERTVIEW_*` variables; tier lists are comma-separated.
fn environment() -> config::Environment {
  config::Environment::with_prefix("CERTVIEW")
    .try_parsing(true)
    .list_separator(",")
    .with_list_parse_key("primary_tiers")
    .with_list_parse_key("secondary_tiers")
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn missing_file_yields_defaults() {
    let settings = Settings::load(Path::new("/nonexistent/certview.toml")).unwrap();
    assert_eq!(settings.timeout_secs, 30);
    assert_eq!(settings.page_size, 5);
    assert_eq!(settings.tier_rules(), TierRules::default());
  }

  fn env(vars: &[(&str, &str)]) -> config::Environment {
    let vars = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    environment().source(Some(vars))
  }

  #[test]
  fn file_values_override_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("certview.toml");
    std::fs::write(
      &path,
      "base_url = \"https://certs.example.com/api\"\npage_size = 10\nprimary_tiers = [\"CEA\", \"CFP\"]\n",
    )
    .unwrap();

    let settings = Settings::load_with(&path, env(&[])).unwrap();

    assert_eq!(settings.base_url, "https://certs.example.com/api");
    assert_eq!(settings.page_size, 10);
    assert_eq!(settings.primary_tiers, vec!["CEA", "CFP"]);
    assert_eq!(settings.secondary_tiers, vec!["CPA-10"]);
  }

  #[test]
  fn environment_overrides_file_and_splits_tier_lists() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("certview.toml");
    std::fs::write(&path, "page_size = 10\nprimary_tiers = [\"CFP\"]\n").unwrap();

    let settings = Settings::load_with(
      &path,
      env(&[
        ("CERTVIEW_PRIMARY_TIERS", "CEA,CPA-20"),
        ("CERTVIEW_SECONDARY_TIERS", "CPA-10"),
        ("CERTVIEW_TIMEOUT_SECS", "5"),
      ]),
    )
    .unwrap();

    assert_eq!(settings.primary_tiers, vec!["CEA", "CPA-20"]);
    assert_eq!(settings.secondary_tiers, vec!["CPA-10"]);
    assert_eq!(settings.timeout_secs, 5);
    assert_eq!(settings.page_size, 10);
  }
}
