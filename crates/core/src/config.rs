use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::negotiation::{DEFAULT_OCCUPANCY_RATE, MAX_REJECTED_ROUNDS};

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub generation: GenerationConfig,
    pub retrieval: RetrievalConfig,
    pub negotiation: NegotiationConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct GenerationConfig {
    pub model: String,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct RetrievalConfig {
    pub top_k: usize,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct NegotiationConfig {
    /// Occupancy rate assumed when the live source is unreachable.
    pub default_occupancy_rate: f64,
    pub max_rounds: u32,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub log_level: Option<String>,
    pub generation_model: Option<String>,
    pub default_occupancy_rate: Option<f64>,
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
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            generation: GenerationConfig { model: "llama3.1".to_string(), timeout_secs: 30 },
            retrieval: RetrievalConfig { top_k: 3, timeout_secs: 10 },
            negotiation: NegotiationConfig {
                default_occupancy_rate: DEFAULT_OCCUPANCY_RATE,
                max_rounds: MAX_REJECTED_ROUNDS,
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
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

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("veranda.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(generation) = patch.generation {
            if let Some(model) = generation.model {
                self.generation.model = model;
            }
            if let Some(timeout_secs) = generation.timeout_secs {
                self.generation.timeout_secs = timeout_secs;
            }
        }

        if let Some(retrieval) = patch.retrieval {
            if let Some(top_k) = retrieval.top_k {
                self.retrieval.top_k = top_k;
            }
            if let Some(timeout_secs) = retrieval.timeout_secs {
                self.retrieval.timeout_secs = timeout_secs;
            }
        }

        if let Some(negotiation) = patch.negotiation {
            if let Some(rate) = negotiation.default_occupancy_rate {
                self.negotiation.default_occupancy_rate = rate;
            }
            if let Some(max_rounds) = negotiation.max_rounds {
                self.negotiation.max_rounds = max_rounds;
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
        if let Some(value) = read_env("VERANDA_GENERATION_MODEL") {
            self.generation.model = value;
        }
        if let Some(value) = read_env("VERANDA_GENERATION_TIMEOUT_SECS") {
            self.generation.timeout_secs = parse_u64("VERANDA_GENERATION_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("VERANDA_RETRIEVAL_TOP_K") {
            self.retrieval.top_k = parse_usize("VERANDA_RETRIEVAL_TOP_K", &value)?;
        }
        if let Some(value) = read_env("VERANDA_RETRIEVAL_TIMEOUT_SECS") {
            self.retrieval.timeout_secs = parse_u64("VERANDA_RETRIEVAL_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("VERANDA_NEGOTIATION_DEFAULT_OCCUPANCY_RATE") {
            self.negotiation.default_occupancy_rate =
                parse_f64("VERANDA_NEGOTIATION_DEFAULT_OCCUPANCY_RATE", &value)?;
        }
        if let Some(value) = read_env("VERANDA_NEGOTIATION_MAX_ROUNDS") {
            self.negotiation.max_rounds = parse_u32("VERANDA_NEGOTIATION_MAX_ROUNDS", &value)?;
        }

        let log_level = read_env("VERANDA_LOGGING_LEVEL").or_else(|| read_env("VERANDA_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("VERANDA_LOGGING_FORMAT").or_else(|| read_env("VERANDA_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(model) = overrides.generation_model {
            self.generation.model = model;
        }
        if let Some(rate) = overrides.default_occupancy_rate {
            self.negotiation.default_occupancy_rate = rate;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.generation.model.trim().is_empty() {
            return Err(ConfigError::Validation("generation.model must not be empty".to_string()));
        }
        if self.generation.timeout_secs == 0 || self.generation.timeout_secs > 300 {
            return Err(ConfigError::Validation(
                "generation.timeout_secs must be in range 1..=300".to_string(),
            ));
        }

        if self.retrieval.top_k == 0 || self.retrieval.top_k > 20 {
            return Err(ConfigError::Validation(
                "retrieval.top_k must be in range 1..=20".to_string(),
            ));
        }
        if self.retrieval.timeout_secs == 0 || self.retrieval.timeout_secs > 300 {
            return Err(ConfigError::Validation(
                "retrieval.timeout_secs must be in range 1..=300".to_string(),
            ));
        }

        let rate = self.negotiation.default_occupancy_rate;
        if !(0.0..=1.0).contains(&rate) {
            return Err(ConfigError::Validation(
                "negotiation.default_occupancy_rate must be in range 0.0..=1.0".to_string(),
            ));
        }
        if self.negotiation.max_rounds == 0 {
            return Err(ConfigError::Validation(
                "negotiation.max_rounds must be greater than zero".to_string(),
            ));
        }

        let level = self.logging.level.trim().to_ascii_lowercase();
        match level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
            _ => Err(ConfigError::Validation(
                "logging.level must be one of trace|debug|info|warn|error".to_string(),
            )),
        }
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("veranda.toml"), PathBuf::from("config/veranda.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u32(key: &str, value: &str) -> Result<u32, ConfigError> {
    value.parse::<u32>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_usize(key: &str, value: &str) -> Result<usize, ConfigError> {
    value.parse::<usize>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_f64(key: &str, value: &str) -> Result<f64, ConfigError> {
    value.parse::<f64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    generation: Option<GenerationPatch>,
    retrieval: Option<RetrievalPatch>,
    negotiation: Option<NegotiationPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct GenerationPatch {
    model: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct RetrievalPatch {
    top_k: Option<usize>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct NegotiationPatch {
    default_occupancy_rate: Option<f64>,
    max_rounds: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;
    use std::io;
    use std::sync::{Mutex, OnceLock};

    use tempfile::TempDir;

    use super::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    fn env_lock() -> &'static Mutex<()> {
        ENV_LOCK.get_or_init(|| Mutex::new(()))
    }

    fn clear_vars(vars: &[&str]) {
        for var in vars {
            env::remove_var(var);
        }
    }

    fn ensure(condition: bool, message: &'static str) -> Result<(), String> {
        if condition {
            Ok(())
        } else {
            Err(message.to_string())
        }
    }

    #[test]
    fn defaults_are_valid() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let config = AppConfig::load(LoadOptions::default())
            .map_err(|err| format!("config load failed: {err}"))?;
        ensure(config.retrieval.top_k == 3, "default retrieval.top_k should be 3")?;
        ensure(
            (config.negotiation.default_occupancy_rate - 0.247).abs() < f64::EPSILON,
            "default occupancy rate should be 0.247",
        )?;
        ensure(config.negotiation.max_rounds == 3, "default max_rounds should be 3")
    }

    #[test]
    fn file_load_supports_env_interpolation() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("TEST_GENERATION_MODEL", "mistral-from-env");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("veranda.toml");
            fs::write(
                &path,
                r#"
[generation]
model = "${TEST_GENERATION_MODEL}"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config =
                AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
                    .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.generation.model == "mistral-from-env",
                "model should be interpolated from environment",
            )
        })();

        clear_vars(&["TEST_GENERATION_MODEL"]);
        result
    }

    #[test]
    fn logging_env_aliases_are_supported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("VERANDA_LOG_LEVEL", "warn");
        env::set_var("VERANDA_LOG_FORMAT", "pretty");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.logging.level == "warn", "warning log level should be set from env var")?;
            ensure(
                matches!(config.logging.format, LogFormat::Pretty),
                "pretty logging format should be set from env var",
            )
        })();

        clear_vars(&["VERANDA_LOG_LEVEL", "VERANDA_LOG_FORMAT"]);
        result
    }

    #[test]
    fn precedence_defaults_file_env_overrides() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("VERANDA_RETRIEVAL_TOP_K", "5");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("veranda.toml");
            fs::write(
                &path,
                r#"
[generation]
model = "model-from-file"

[retrieval]
top_k = 7

[logging]
level = "warn"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config = AppConfig::load(LoadOptions {
                config_path: Some(path),
                overrides: ConfigOverrides {
                    log_level: Some("debug".to_string()),
                    generation_model: Some("model-from-override".to_string()),
                    ..ConfigOverrides::default()
                },
                ..LoadOptions::default()
            })
            .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.generation.model == "model-from-override",
                "explicit override should win over file and env",
            )?;
            ensure(config.logging.level == "debug", "overridden log level should be debug")?;
            ensure(config.retrieval.top_k == 5, "env top_k should win over file value")
        })();

        clear_vars(&["VERANDA_RETRIEVAL_TOP_K"]);
        result
    }

    #[test]
    fn validation_fails_fast_with_actionable_error() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("VERANDA_NEGOTIATION_DEFAULT_OCCUPANCY_RATE", "1.5");

        let result = (|| -> Result<(), String> {
            let error = match AppConfig::load(LoadOptions::default()) {
                Ok(_) => {
                    return Err("expected validation failure but config load succeeded".to_string())
                }
                Err(error) => error,
            };
            let has_message = matches!(
                error,
                ConfigError::Validation(ref message)
                    if message.contains("default_occupancy_rate")
            );
            ensure(has_message, "validation failure should mention default_occupancy_rate")
        })();

        clear_vars(&["VERANDA_NEGOTIATION_DEFAULT_OCCUPANCY_RATE"]);
        result
    }

    #[test]
    fn missing_required_file_is_reported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let error = match AppConfig::load(LoadOptions {
            config_path: Some("definitely-not-here.toml".into()),
            require_file: true,
            ..LoadOptions::default()
        }) {
            Ok(_) => return Err("expected missing-file failure".to_string()),
            Err(error) => error,
        };
        ensure(
            matches!(error, ConfigError::MissingConfigFile(_)),
            "missing required config file should be a dedicated error",
        )
    }
}
