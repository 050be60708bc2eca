use crate::error::Result;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://www.ime.ntnu.no/api";

/// Client settings: built-in defaults, then an optional `ime.*` file, then `IME_*` variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub base_url: String,
    pub timeout_secs: u64,
    /// Timeout for the all-course-codes listing, which is far larger than any other answer
    pub bulk_timeout_secs: u64,
    pub requests_per_second: Option<u32>,
    pub user_agent: String,
}

impl Settings {
    /// Loads settings, reading `ime.{toml,json,yaml}` from the working directory if one exists.
    pub fn load() -> Result<Self> {
        Self::build(File::with_name("ime").required(false))
    }

    /// Loads settings with `path` as the settings file, which must exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        Self::build(File::from(path).required(true))
    }

    fn build<S>(file: S) -> Result<Self>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let settings = defaults()?
            .add_source(file)
            .add_source(Environment::with_prefix("IME"))
            .build()?
            .try_deserialize()?;
        Ok(settings)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn bulk_timeout(&self) -> Duration {
        Duration::from_secs(self.bulk_timeout_secs)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            timeout_secs: 30,
            bulk_timeout_secs: 300,
            requests_per_second: None,
            user_agent: concat!("ime-catalog/", env!("CARGO_PKG_VERSION")).into(),
        }
    }
}

fn defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>> {
    let d = Settings::default();
    Ok(Config::builder()
        .set_default("base_url", d.base_url)?
        .set_default("timeout_secs", d.timeout_secs)?
        .set_default("bulk_timeout_secs", d.bulk_timeout_secs)?
        .set_default("user_agent", d.user_agent)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_deserialize() {
        let settings: Settings = defaults()
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(settings.base_url, DEFAULT_BASE_URL);
        assert_eq!(settings.timeout(), Duration::from_secs(30));
        assert_eq!(settings.bulk_timeout(), Duration::from_secs(300));
        assert_eq!(settings.requests_per_second, None);
    }

    #[test]
    fn file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ime.toml");
        std::fs::write(
            &path,
            "base_url = \"http://localhost:8080/api\"\nrequests_per_second = 2\n",
        )
        .unwrap();

        let settings = Settings::load_from(&path).unwrap();
        assert_eq!(settings.base_url, "http://localhost:8080/api");
        assert_eq!(settings.requests_per_second, Some(2));
        assert_eq!(settings.timeout_secs, 30);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let err = Settings::load_from(Path::new("/nonexistent/ime.toml")).unwrap_err();
        assert!(matches!(err, crate::error::Error::Config { .. }));
    }
}
