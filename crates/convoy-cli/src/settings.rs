//! Layered configuration: TOML file, then `CONVOY_*` environment variables.
//! Command-line flags are applied on top by `main`.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use convoy_core::obstacle::Coordinates;
use serde::Deserialize;

pub const DEFAULT_STORE_PATH: &str = "~/.local/share/convoy/convoy.db";
pub const DEFAULT_GEOCODER_URL: &str = "https://nominatim.openstreetmap.org/search";
pub const DEFAULT_DIALER_COMMAND: &str = "xdg-open";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Settings {
  /// SQLite file holding the obstacle collection. A leading `~` is expanded.
  #[serde(default = "default_store_path")]
  pub store_path:     PathBuf,
  /// Fixed position reported for `--here`. Unset means location is
  /// unavailable.
  #[serde(default)]
  pub position:       Option<Coordinates>,
  /// Nominatim-compatible search endpoint.
  #[serde(default = "default_geocoder_url")]
  pub geocoder_url:   String,
  /// Program that opens `tel:` URIs.
  #[serde(default = "default_dialer_command")]
  pub dialer_command: String,
}

fn default_store_path() -> PathBuf { PathBuf::from(DEFAULT_STORE_PATH) }

fn default_geocoder_url() -> String { DEFAULT_GEOCODER_URL.to_owned() }

fn default_dialer_command() -> String { DEFAULT_DIALER_COMMAND.to_owned() }

impl Settings {
  /// Read `config_path` (if it exists) and the `CONVOY_` environment.
  ///
  /// Nested keys use a double underscore in the environment, e.g.
  /// `CONVOY_POSITION__LATITUDE=49.12`.
  pub fn load(config_path: &Path) -> anyhow::Result<Self> {
    Self::load_with(config_path, environment())
  }

  fn load_with(config_path: &Path, env: config::Environment) -> anyhow::Result<Self> {
    config::Config::builder()
      .add_source(config::File::from(config_path).required(false))
      .add_source(env)
      .build()
      .with_context(|| format!("failed to read config file {}", config_path.display()))?
      .try_deserialize()
      .context("failed to deserialise settings")
  }

  /// The store path with `~` expanded.
  pub fn resolved_store_path(&self) -> PathBuf { expand_tilde(&self.store_path) }
}

/// `CONVOY_` variables; `__` separates nested keys. Setting `separator`
/// alone would also turn the prefix separator into `__`.
fn environment() -> config::Environment {
  config::Environment::with_prefix("CONVOY")
    .prefix_separator("_")
    .separator("__")
    .try_parsing(true)
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn missing_file_yields_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let settings = Settings::load(&dir.path().join("absent.toml")).unwrap();

    assert_eq!(settings.store_path, PathBuf::from(DEFAULT_STORE_PATH));
    assert_eq!(settings.position, None);
    assert_eq!(settings.geocoder_url, DEFAULT_GEOCODER_URL);
    assert_eq!(settings.dialer_command, DEFAULT_DIALER_COMMAND);
  }

  #[test]
  fn file_values_override_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("convoy.toml");
    std::fs::write(
      &path,
      r#"
store_path = "/var/lib/convoy/log.db"
dialer_command = "termux-open"

[position]
latitude = 49.1193089
longitude = 6.1757156
"#,
    )
    .unwrap();

    let settings = Settings::load(&path).unwrap();
    assert_eq!(settings.store_path, PathBuf::from("/var/lib/convoy/log.db"));
    assert_eq!(settings.dialer_command, "termux-open");
    assert_eq!(settings.position, Some(Coordinates::new(49.1193089, 6.1757156)));
    assert_eq!(settings.geocoder_url, DEFAULT_GEOCODER_URL);
  }

  #[test]
  fn environment_overrides_file_and_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("convoy.toml");
    std::fs::write(&path, "dialer_command = \"termux-open\"\n").unwrap();

    let vars = config::Map::from([
      ("CONVOY_DIALER_COMMAND".to_owned(), "gio-open".to_owned()),
      ("CONVOY_POSITION__LATITUDE".to_owned(), "49.12".to_owned()),
      ("CONVOY_POSITION__LONGITUDE".to_owned(), "6.17".to_owned()),
      ("CONVOY_GEOCODER_URL".to_owned(), "http://localhost:8080/search".to_owned()),
    ]);
    let settings = Settings::load_with(&path, environment().source(Some(vars))).unwrap();

    assert_eq!(settings.dialer_command, "gio-open");
    assert_eq!(settings.position, Some(Coordinates::new(49.12, 6.17)));
    assert_eq!(settings.geocoder_url, "http://localhost:8080/search");
    assert_eq!(settings.store_path, PathBuf::from(DEFAULT_STORE_PATH));
  }

  #[test]
  fn double_underscore_prefix_is_not_recognised() {
    let dir = tempfile::tempdir().unwrap();
    let vars = config::Map::from([("CONVOY__DIALER_COMMAND".to_owned(), "gio-open".to_owned())]);
    let settings =
      Settings::load_with(&dir.path().join("absent.toml"), environment().source(Some(vars)))
        .unwrap();
    assert_eq!(settings.dialer_command, DEFAULT_DIALER_COMMAND);
  }

  #[test]
  fn tilde_expansion() {
    let Ok(home) = std::env::var("HOME") else { return };
    assert_eq!(
      expand_tilde(Path::new("~/convoy.db")),
      PathBuf::from(home).join("convoy.db")
    );
    assert_eq!(expand_tilde(Path::new("/abs/x.db")), PathBuf::from("/abs/x.db"));
    assert_eq!(expand_tilde(Path::new("rel/x.db")), PathBuf::from("rel/x.db"));
  }
}
