//! Configuration loader
//!
//! Pipeline:
//! 1. Size check, read, UTF-8 BOM strip
//! 2. Environment variable expansion on the raw text
//! 3. YAML parsing (errors carry the line)
//! 4. Deserialization into [`GameConfig`]
//! 5. Validation, collecting every issue

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::schema::GameConfig;
use crate::config::validation::Validator;
use crate::error::ConfigError;

// ============================================================================
// Public API
// ============================================================================

/// Limits applied before parsing.
#[derive(Debug, Clone)]
pub struct ConfigLimits {
    /// Maximum configuration file size in bytes.
    pub max_config_size: usize,
}

impl Default for ConfigLimits {
    fn default() -> Self {
        Self {
            max_config_size: env_or("FISHING_GAME_MAX_CONFIG_SIZE", 64 * 1024),
        }
    }
}

/// Result of loading a configuration file.
#[derive(Debug)]
pub struct LoadResult {
    /// The loaded and validated configuration.
    pub config: Arc<GameConfig>,

    /// Warnings encountered during loading.
    pub warnings: Vec<LoadWarning>,
}

/// Warning during configuration loading.
#[derive(Debug, Clone)]
pub struct LoadWarning {
    /// Warning message.
    pub message: String,

    /// Location where the warning occurred.
    pub location: Option<String>,
}

impl std::fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.location {
            Some(location) => write!(f, "{} at {location}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// Configuration loader.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    limits: ConfigLimits,
}

impl ConfigLoader {
    /// Creates a loader with the given limits.
    #[must_use]
    pub const fn new(limits: ConfigLimits) -> Self {
        Self { limits }
    }

    /// Creates a loader with default limits.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::default()
    }

    /// Loads and validates a configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is too large, if YAML
    /// parsing or deserialization fails, if a required environment variable
    /// is unset, or if validation finds any error.
    pub fn load(&self, path: &Path) -> Result<LoadResult, ConfigError> {
        let metadata = std::fs::metadata(path).map_err(|_| ConfigError::MissingFile {
            path: path.to_path_buf(),
        })?;

        let file_size = usize::try_from(metadata.len()).unwrap_or(usize::MAX);
        if file_size > self.limits.max_config_size {
            return Err(ConfigError::InvalidValue {
                field: "file_size".to_string(),
                value: format!("{file_size} bytes"),
                expected: format!("at most {} bytes", self.limits.max_config_size),
            });
        }

        let raw = std::fs::read_to_string(path).map_err(|_| ConfigError::MissingFile {
            path: path.to_path_buf(),
        })?;

        Self::load_from(&raw, path)
    }

    /// Loads a configuration from text; `source` names it in errors.
    ///
    /// # Errors
    ///
    /// As [`load`](Self::load), minus the file errors.
    pub fn load_str(&self, content: &str, source: &str) -> Result<LoadResult, ConfigError> {
        if content.len() > self.limits.max_config_size {
            return Err(ConfigError::InvalidValue {
                field: "file_size".to_string(),
                value: format!("{} bytes", content.len()),
                expected: format!("at most {} bytes", self.limits.max_config_size),
            });
        }
        Self::load_from(content, Path::new(source))
    }

    fn load_from(raw: &str, path: &Path) -> Result<LoadResult, ConfigError> {
        let raw = raw.strip_prefix('\u{feff}').unwrap_or(raw);

        let mut env_sub = EnvSubstitution::new();
        let substituted = env_sub.substitute(raw, path)?;
        let mut warnings = env_sub.warnings;

        let root: serde_yaml::Value =
            serde_yaml::from_str(&substituted).map_err(|e| parse_error(path, &e))?;

        // An empty document is the all-defaults configuration.
        let config: GameConfig = if root.is_null() {
            GameConfig::default()
        } else {
            serde_yaml::from_value(root).map_err(|e| parse_error(path, &e))?
        };

        let result = Validator::new().validate(&config);
        if !result.is_valid() {
            return Err(ConfigError::ValidationError {
                path: path.display().to_string(),
                errors: result.errors,
            });
        }
        warnings.extend(result.warnings.into_iter().map(|issue| LoadWarning {
            message: issue.message,
            location: Some(issue.path),
        }));

        Ok(LoadResult {
            config: Arc::new(config),
            warnings,
        })
    }
}

fn parse_error(path: &Path, error: &serde_yaml::Error) -> ConfigError {
    ConfigError::ParseError {
        path: path.to_path_buf(),
        line: error.location().map(|l| l.line()),
        message: error.to_string(),
    }
}

// ============================================================================
// Environment Substitution
// ============================================================================

/// Expands `${VAR}`, `${VAR:-default}`, `${VAR:?}` and `$$` in raw text.
struct EnvSubstitution {
    warnings: Vec<LoadWarning>,
}

impl EnvSubstitution {
    const fn new() -> Self {
        Self {
            warnings: Vec::new(),
        }
    }

    /// - `${VAR}`: value, or empty string with a warning when unset
    /// - `${VAR:-default}`: value, or `default` when unset
    /// - `${VAR:?}`: value, or an error when unset
    /// - `$$`: literal `$`
    fn substitute(&mut self, raw: &str, source: &Path) -> Result<String, ConfigError> {
        let mut result = String::with_capacity(raw.len());
        let mut chars = raw.chars().peekable();
        let mut line = 1usize;

        while let Some(c) = chars.next() {
            match c {
                '\n' => {
                    line += 1;
                    result.push(c);
                }
                '$' if chars.peek() == Some(&'$') => {
                    chars.next();
                    result.push('$');
                }
                '$' if chars.peek() == Some(&'{') => {
                    chars.next();
                    let spec = Self::read_spec(&mut chars).ok_or_else(|| {
                        ConfigError::ParseError {
                            path: source.to_path_buf(),
                            line: Some(line),
                            message: "unclosed environment variable reference".to_string(),
                        }
                    })?;
                    self.expand(&spec, source, line, &mut result)?;
                }
                _ => result.push(c),
            }
        }

        Ok(result)
    }

    fn read_spec(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Option<String> {
        let mut spec = String::new();
        for c in chars.by_ref() {
            match c {
                '}' => return Some(spec),
                '\n' => return None,
                _ => spec.push(c),
            }
        }
        None
    }

    fn expand(
        &mut self,
        spec: &str,
        source: &Path,
        line: usize,
        out: &mut String,
    ) -> Result<(), ConfigError> {
        let (name, fallback) = match spec.split_once(':') {
            Some((name, rest)) => (name, Some(rest)),
            None => (spec, None),
        };

        if let Ok(value) = std::env::var(name) {
            out.push_str(&value);
            return Ok(());
        }

        if let Some(default) = fallback.and_then(|rest| rest.strip_prefix('-')) {
            out.push_str(default);
            return Ok(());
        }
        match fallback {
            Some(rest) if rest.starts_with('?') => Err(ConfigError::EnvVarNotSet {
                var: name.to_string(),
                line,
            }),
            _ => {
                self.warnings.push(LoadWarning {
                    message: format!("environment variable '{name}' is not set, using empty string"),
                    location: Some(format!("{}:{line}", source.display())),
                });
                Ok(())
            }
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Resolves a config path, defaulting to `fishing-game.yaml` in the
/// working directory.
#[must_use]
pub fn resolve_path(path: Option<&Path>) -> PathBuf {
    path.map_or_else(|| PathBuf::from("fishing-game.yaml"), Path::to_path_buf)
}
