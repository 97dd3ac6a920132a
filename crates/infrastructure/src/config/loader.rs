//! Loads a [`SuiteConfig`] from layered sources: built-in defaults, an
//! optional YAML file, then `BOOKCHECK_*` environment variables.
//!
//! Nested keys use a double underscore in the environment
//! (`BOOKCHECK_CREDENTIALS__USERNAME`). The environment can be replaced by a
//! fixed map, so tests never touch the process environment.

use std::path::Path;

use bookcheck_application::config::{ConfigError, SuiteConfig};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File, FileFormat, Map};
use tracing::debug;

/// Prefix shared by every environment override.
pub const ENV_PREFIX: &str = "BOOKCHECK";
/// Overrides `base_url`.
pub const ENV_BASE_URL: &str = "BOOKCHECK_BASE_URL";
/// Overrides `credentials.username`.
pub const ENV_USERNAME: &str = "BOOKCHECK_CREDENTIALS__USERNAME";
/// Overrides `credentials.password`.
pub const ENV_PASSWORD: &str = "BOOKCHECK_CREDENTIALS__PASSWORD";
/// Overrides `timeout_ms`.
pub const ENV_TIMEOUT_MS: &str = "BOOKCHECK_TIMEOUT_MS";

/// Builds suite configurations.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    env: Option<Map<String, String>>,
}

impl ConfigLoader {
    /// A loader reading overrides from the process environment.
    #[must_use]
    pub const fn from_process_env() -> Self {
        Self { env: None }
    }

    /// A loader reading overrides from `vars` instead of the process
    /// environment.
    #[must_use]
    pub fn with_env<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            env: Some(
                vars.into_iter()
                    .map(|(key, value)| (key.into(), value.into()))
                    .collect(),
            ),
        }
    }

    /// Loads the configuration: defaults, then the file (if given), then
    /// environment overrides. The result is validated.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Parse`] if the merged sources do not form a
    /// `SuiteConfig`, and [`ConfigError::Invalid`] if the final value is
    /// unusable.
    pub fn load(&self, path: Option<&Path>) -> Result<SuiteConfig, ConfigError> {
        let config = self.resolve(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Like [`Self::load`], but leaves validation to the caller so further
    /// overrides (such as command-line flags) can be layered on top.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read and
    /// [`ConfigError::Parse`] if the merged sources do not deserialize.
    pub fn resolve(&self, path: Option<&Path>) -> Result<SuiteConfig, ConfigError> {
        let mut builder = defaults()?;
        if let Some(path) = path {
            builder = with_yaml(builder, &read_file(path)?);
        }
        let environment = Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
            .source(self.env.clone());
        deserialize(builder.add_source(environment))
    }
}

/// Parses a YAML document. Missing keys keep their defaults.
///
/// # Errors
///
/// Returns [`ConfigError::Parse`] if the document does not parse.
pub fn parse_config(yaml: &str) -> Result<SuiteConfig, ConfigError> {
    deserialize(with_yaml(defaults()?, yaml))
}

fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let defaults = Config::try_from(&SuiteConfig::default()).map_err(parse_error)?;
    Ok(Config::builder().add_source(defaults))
}

fn with_yaml(builder: ConfigBuilder<DefaultState>, yaml: &str) -> ConfigBuilder<DefaultState> {
    if yaml.trim().is_empty() {
        return builder;
    }
    builder.add_source(File::from_str(yaml, FileFormat::Yaml))
}

fn deserialize(builder: ConfigBuilder<DefaultState>) -> Result<SuiteConfig, ConfigError> {
    builder
        .build()
        .and_then(Config::try_deserialize)
        .map_err(parse_error)
}

fn parse_error(error: config::ConfigError) -> ConfigError {
    ConfigError::Parse(error.to_string())
}

fn read_file(path: &Path) -> Result<String, ConfigError> {
    debug!(path = %path.display(), "reading configuration file");
    std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use bookcheck_application::Scenario;
    use bookcheck_domain::Credentials;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn loader(vars: &[(&str, &str)]) -> ConfigLoader {
        ConfigLoader::with_env(vars.iter().copied())
    }

    fn yaml_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults_without_file_or_env() {
        let config = loader(&[]).load(None).unwrap();
        assert_eq!(config, SuiteConfig::default());
    }

    #[test]
    fn test_file_values() {
        let file = yaml_file(
            "base_url: http://localhost:3001\n\
             timeout_ms: 5000\n\
             credentials:\n  username: root\n  password: hunter2\n\
             parallel: true\n\
             scenarios: [create_booking, delete_booking]\n",
        );

        let config = loader(&[]).load(Some(file.path())).unwrap();

        assert_eq!(config.base_url, "http://localhost:3001");
        assert_eq!(config.timeout_ms, 5000);
        assert_eq!(config.credentials, Credentials::new("root", "hunter2"));
        assert!(config.parallel);
        assert_eq!(
            config.scenarios,
            vec![Scenario::CreateBooking, Scenario::DeleteBooking]
        );
        assert_eq!(config.default_headers.len(), 1);
    }

    #[test]
    fn test_env_overrides_file() {
        let file = yaml_file("base_url: http://localhost:3001\ntimeout_ms: 5000\n");
        let env = loader(&[
            (ENV_BASE_URL, "https://staging.example.com"),
            (ENV_USERNAME, "ops"),
            (ENV_PASSWORD, "s3cret"),
            (ENV_TIMEOUT_MS, "750"),
        ]);

        let config = env.load(Some(file.path())).unwrap();

        assert_eq!(config.base_url, "https://staging.example.com");
        assert_eq!(config.credentials, Credentials::new("ops", "s3cret"));
        assert_eq!(config.timeout_ms, 750);
    }

    #[test]
    fn test_env_overrides_one_nested_key() {
        let file = yaml_file("credentials:\n  username: root\n  password: hunter2\n");
        let config = loader(&[(ENV_PASSWORD, "rotated")])
            .load(Some(file.path()))
            .unwrap();
        assert_eq!(config.credentials, Credentials::new("root", "rotated"));
    }

    #[test]
    fn test_unrelated_env_is_ignored() {
        let config = loader(&[("HOME", "/root"), ("BOOKCHECK_COLOUR", "blue")])
            .load(None)
            .unwrap();
        assert_eq!(config, SuiteConfig::default());
    }

    #[test]
    fn test_parse_partial_document() {
        let config = parse_config("parallel: true\n").unwrap();
        assert!(config.parallel);
        assert_eq!(config.timeout_ms, 30_000);
        assert!(matches!(parse_config("timeout_ms: [1, 2]"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_empty_file_is_default() {
        let file = yaml_file("");
        assert_eq!(
            loader(&[]).load(Some(file.path())).unwrap(),
            SuiteConfig::default()
        );
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = loader(&[]).load(Some(&dir.path().join("bookcheck.yaml")));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_unknown_scenario_is_parse_error() {
        let file = yaml_file("scenarios: [teardown]\n");
        let result = loader(&[]).load(Some(file.path()));
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_non_numeric_timeout_is_parse_error() {
        let result = loader(&[(ENV_TIMEOUT_MS, "soon")]).load(None);
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_bad_overrides_are_invalid() {
        for vars in [
            [(ENV_TIMEOUT_MS, "0")],
            [(ENV_BASE_URL, "ftp://example.com")],
            [(ENV_USERNAME, "")],
        ] {
            let result = loader(&vars).load(None);
            assert!(
                matches!(result, Err(ConfigError::Invalid(_))),
                "accepted {vars:?}"
            );
        }
    }
}
