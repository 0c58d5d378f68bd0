use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

const DEFAULT_CONFIG_FILE: &str = "fleura.toml";
const ENV_CONFIG_PATH: &str = "FLEURA_CONFIG";
const ENV_BACKEND_URL: &str = "FLEURA_BACKEND_URL";
const ENV_BACKEND_TIMEOUT: &str = "FLEURA_BACKEND_TIMEOUT_SECS";
const ENV_SESSION_PATH: &str = "FLEURA_SESSION_PATH";
const ENV_LOG_LEVEL: &str = "FLEURA_LOG_LEVEL";
const ENV_LOG_FORMAT: &str = "FLEURA_LOG_FORMAT";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub backend: BackendConfig,
    pub session: SessionConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct BackendConfig {
    /// Storefront backend base URL, no trailing slash.
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct SessionConfig {
    pub path: PathBuf,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub session_path: Option<PathBuf>,
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    backend: Option<BackendPatch>,
    session: Option<SessionPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct BackendPatch {
    base_url: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct SessionPatch {
    path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend: BackendConfig {
                base_url: "http://localhost:8000".to_string(),
                timeout_secs: 30,
            },
            session: SessionConfig { path: PathBuf::from(".fleura-session.json") },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl AppConfig {
    /// Defaults, then the optional TOML file, then `FLEURA_*` environment
    /// variables, then programmatic overrides, then validation.
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected =
                options.config_path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(backend) = patch.backend {
            if let Some(base_url) = backend.base_url {
                self.backend.base_url = base_url;
            }
            if let Some(timeout_secs) = backend.timeout_secs {
                self.backend.timeout_secs = timeout_secs;
            }
        }

        if let Some(session) = patch.session {
            if let Some(path) = session.path {
                self.session.path = path;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(base_url) = env::var(ENV_BACKEND_URL) {
            self.backend.base_url = base_url;
        }
        if let Ok(raw) = env::var(ENV_BACKEND_TIMEOUT) {
            self.backend.timeout_secs = raw.parse().map_err(|_| {
                ConfigError::InvalidEnvOverride { key: ENV_BACKEND_TIMEOUT.to_string(), value: raw }
            })?;
        }
        if let Ok(path) = env::var(ENV_SESSION_PATH) {
            self.session.path = PathBuf::from(path);
        }
        if let Ok(level) = env::var(ENV_LOG_LEVEL) {
            self.logging.level = level;
        }
        if let Ok(raw) = env::var(ENV_LOG_FORMAT) {
            self.logging.format = raw.parse()?;
        }
        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(base_url) = overrides.base_url {
            self.backend.base_url = base_url;
        }
        if let Some(timeout_secs) = overrides.timeout_secs {
            self.backend.timeout_secs = timeout_secs;
        }
        if let Some(path) = overrides.session_path {
            self.session.path = path;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
        if let Some(format) = overrides.log_format {
            self.logging.format = format;
        }
    }

    fn validate(&mut self) -> Result<(), ConfigError> {
        let trimmed = self.backend.base_url.trim();
        if trimmed.is_empty() {
            return Err(ConfigError::Validation("backend.base_url must not be empty".to_string()));
        }
        if !trimmed.starts_with("http://") && !trimmed.starts_with("https://") {
            return Err(ConfigError::Validation(format!(
                "backend.base_url must start with http:// or https://, got `{trimmed}`"
            )));
        }
        self.backend.base_url = trimmed.trim_end_matches('/').to_string();

        if self.backend.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "backend.timeout_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        if path.exists() {
            return Some(path.to_path_buf());
        }
        return None;
    }

    if let Ok(from_env) = env::var(ENV_CONFIG_PATH) {
        let path = PathBuf::from(from_env);
        if path.exists() {
            return Some(path);
        }
        return None;
    }

    let default = PathBuf::from(DEFAULT_CONFIG_FILE);
    default.exists().then_some(default)
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;
    toml::from_str(&raw)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::io::Write;
    use std::sync::{Mutex, OnceLock};

    use super::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};

    const MANAGED_VARS: [&str; 6] = [
        super::ENV_CONFIG_PATH,
        super::ENV_BACKEND_URL,
        super::ENV_BACKEND_TIMEOUT,
        super::ENV_SESSION_PATH,
        super::ENV_LOG_LEVEL,
        super::ENV_LOG_FORMAT,
    ];

    fn with_env(vars: &[(&str, &str)], run: impl FnOnce()) {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        let _lock = GUARD.get_or_init(|| Mutex::new(())).lock().expect("env guard");

        for key in MANAGED_VARS {
            env::remove_var(key);
        }
        for (key, value) in vars {
            env::set_var(key, value);
        }

        run();

        for key in MANAGED_VARS {
            env::remove_var(key);
        }
    }

    #[test]
    fn defaults_load_without_a_file() {
        with_env(&[], || {
            let config = AppConfig::load(LoadOptions::default()).expect("default config");
            assert_eq!(config.backend.base_url, "http://localhost:8000");
            assert_eq!(config.backend.timeout_secs, 30);
            assert_eq!(config.logging.format, LogFormat::Compact);
        });
    }

    #[test]
    fn env_overrides_win_over_defaults() {
        with_env(
            &[
                (super::ENV_BACKEND_URL, "https://shop.example/api/"),
                (super::ENV_BACKEND_TIMEOUT, "5"),
                (super::ENV_LOG_FORMAT, "json"),
            ],
            || {
                let config = AppConfig::load(LoadOptions::default()).expect("config with env");
                // trailing slash is normalized away
                assert_eq!(config.backend.base_url, "https://shop.example/api");
                assert_eq!(config.backend.timeout_secs, 5);
                assert_eq!(config.logging.format, LogFormat::Json);
            },
        );
    }

    #[test]
    fn programmatic_overrides_win_over_env() {
        with_env(&[(super::ENV_BACKEND_URL, "https://env.example")], || {
            let options = LoadOptions {
                overrides: ConfigOverrides {
                    base_url: Some("https://cli.example".to_string()),
                    ..ConfigOverrides::default()
                },
                ..LoadOptions::default()
            };
            let config = AppConfig::load(options).expect("config with overrides");
            assert_eq!(config.backend.base_url, "https://cli.example");
        });
    }

    #[test]
    fn config_file_is_applied_when_present() {
        with_env(&[], || {
            let mut file = tempfile::Builder::new()
                .suffix(".toml")
                .tempfile()
                .expect("temp config file");
            writeln!(
                file,
                "[backend]\nbase_url = \"https://file.example\"\ntimeout_secs = 12\n\n[logging]\nformat = \"pretty\"\n"
            )
            .expect("write config");

            let options = LoadOptions {
                config_path: Some(file.path().to_path_buf()),
                ..LoadOptions::default()
            };
            let config = AppConfig::load(options).expect("config from file");
            assert_eq!(config.backend.base_url, "https://file.example");
            assert_eq!(config.backend.timeout_secs, 12);
            assert_eq!(config.logging.format, LogFormat::Pretty);
        });
    }

    #[test]
    fn rejects_non_http_base_url() {
        with_env(&[(super::ENV_BACKEND_URL, "not-a-url")], || {
            let error = AppConfig::load(LoadOptions::default()).expect_err("must fail validation");
            assert!(matches!(error, ConfigError::Validation(_)));
        });
    }

    #[test]
    fn rejects_unparseable_timeout_override() {
        with_env(&[(super::ENV_BACKEND_TIMEOUT, "soon")], || {
            let error = AppConfig::load(LoadOptions::default()).expect_err("must fail");
            assert!(matches!(error, ConfigError::InvalidEnvOverride { .. }));
        });
    }

    #[test]
    fn missing_required_file_is_an_error() {
        with_env(&[], || {
            let options = LoadOptions { require_file: true, ..LoadOptions::default() };
            let error = AppConfig::load(options).expect_err("no file present");
            assert!(matches!(error, ConfigError::MissingConfigFile(_)));
        });
    }
}
