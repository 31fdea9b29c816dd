//! Configuration module for the GrubDash ordering service.
//!
//! Configuration is loaded from a TOML file. Values of the form `${VAR}` or
//! `${VAR:-default}` are replaced with environment variables before parsing,
//! and the parsed configuration is validated before it is handed out.

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// Extract just the message without the huge input dump
		ConfigError::Parse(err.message().to_string())
	}
}

/// Main configuration structure for the GrubDash service.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
	/// Configuration for the HTTP API server.
	#[serde(default)]
	pub api: ApiConfig,
	/// Configuration for the record stores.
	#[serde(default)]
	pub storage: StorageConfig,
	/// Initial records loaded at startup.
	pub seed: Option<SeedConfig>,
}

/// Configuration for the HTTP API server.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
	/// Host address to bind the server to.
	#[serde(default = "default_api_host")]
	pub host: String,
	/// Port to bind the server to.
	#[serde(default = "default_api_port")]
	pub port: u16,
	/// Maximum request size in bytes.
	#[serde(default = "default_max_request_size")]
	pub max_request_size: usize,
	/// CORS configuration. Permissive when absent.
	pub cors: Option<CorsConfig>,
}

impl Default for ApiConfig {
	fn default() -> Self {
		Self {
			host: default_api_host(),
			port: default_api_port(),
			max_request_size: default_max_request_size(),
			cors: None,
		}
	}
}

/// CORS configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CorsConfig {
	/// Allowed origins for CORS.
	pub allowed_origins: Vec<String>,
}

/// Configuration for the record stores.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
	/// Which implementation to use as primary.
	pub primary: String,
	/// Map of storage implementation names to their configurations.
	#[serde(default)]
	pub implementations: HashMap<String, toml::Value>,
}

impl Default for StorageConfig {
	fn default() -> Self {
		let mut implementations = HashMap::new();
		implementations.insert(
			"memory".to_string(),
			toml::Value::Table(toml::map::Map::new()),
		);
		Self {
			primary: "memory".to_string(),
			implementations,
		}
	}
}

/// Seed files holding the records present at startup.
///
/// Each file is a JSON array. Relative paths are resolved against the
/// directory of the configuration file.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SeedConfig {
	pub dishes: Option<PathBuf>,
	pub orders: Option<PathBuf>,
}

impl SeedConfig {
	fn resolve_against(&mut self, base_dir: &Path) {
		for path in [&mut self.dishes, &mut self.orders].into_iter().flatten() {
			if path.is_relative() {
				*path = base_dir.join(&*path);
			}
		}
	}
}

/// Returns the default API host.
fn default_api_host() -> String {
	"127.0.0.1".to_string()
}

/// Returns the default API port.
fn default_api_port() -> u16 {
	5000
}

/// Returns the default maximum request size in bytes.
fn default_max_request_size() -> usize {
	1024 * 1024 // 1MB
}

/// Expands `${VAR}` and `${VAR:-default}` references in raw configuration text.
///
/// An unset variable without a default fails with its name, before the text
/// reaches the TOML parser.
pub(crate) fn expand_env_refs(raw: &str) -> Result<String, ConfigError> {
	let pattern = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)(?::-([^}]*))?\}")
		.map_err(|e| ConfigError::Parse(format!("Invalid variable pattern: {}", e)))?;

	let mut unset: Option<String> = None;
	let expanded = pattern.replace_all(raw, |caps: &Captures| {
		let name = &caps[1];
		match (std::env::var(name), caps.get(2)) {
			(Ok(value), _) => value,
			(Err(_), Some(default)) => default.as_str().to_string(),
			(Err(_), None) => {
				unset.get_or_insert_with(|| name.to_string());
				String::new()
			},
		}
	});

	match unset {
		Some(name) => Err(ConfigError::Validation(format!(
			"Environment variable '{}' is not set",
			name
		))),
		None => Ok(expanded.into_owned()),
	}
}

impl Config {
	/// Loads configuration from a file.
	///
	/// Relative seed paths are rewritten to be relative to the directory
	/// containing the configuration file.
	pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let path = path.as_ref();
		let content = tokio::fs::read_to_string(path).await.map_err(|e| {
			ConfigError::Io(std::io::Error::new(
				e.kind(),
				format!("Cannot read {}: {}", path.display(), e),
			))
		})?;

		let mut config: Config = content.parse()?;
		let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
		if let Some(seed) = config.seed.as_mut() {
			seed.resolve_against(base_dir);
		}
		Ok(config)
	}

	/// Address the API server binds to.
	pub fn bind_address(&self) -> String {
		format!("{}:{}", self.api.host, self.api.port)
	}

	/// Validates the configuration to ensure all required fields are properly set.
	fn validate(&self) -> Result<(), ConfigError> {
		if self.api.host.is_empty() {
			return Err(ConfigError::Validation("API host cannot be empty".into()));
		}
		if self.api.port == 0 {
			return Err(ConfigError::Validation(
				"API port must be greater than 0".into(),
			));
		}
		if self.api.max_request_size == 0 {
			return Err(ConfigError::Validation(
				"API max_request_size must be greater than 0".into(),
			));
		}
		if let Some(cors) = &self.api.cors {
			if cors.allowed_origins.iter().any(String::is_empty) {
				return Err(ConfigError::Validation(
					"CORS allowed_origins cannot contain empty entries".into(),
				));
			}
		}

		if self.storage.primary.is_empty() {
			return Err(ConfigError::Validation(
				"Storage primary implementation cannot be empty".into(),
			));
		}
		if !self
			.storage
			.implementations
			.contains_key(&self.storage.primary)
		{
			return Err(ConfigError::Validation(format!(
				"Primary storage '{}' not found in implementations",
				self.storage.primary
			)));
		}

		if let Some(seed) = &self.seed {
			for (name, path) in [("dishes", &seed.dishes), ("orders", &seed.orders)] {
				if path.as_ref().is_some_and(|p| p.as_os_str().is_empty()) {
					return Err(ConfigError::Validation(format!(
						"Seed path for {} cannot be empty",
						name
					)));
				}
			}
		}

		Ok(())
	}
}

/// Parses configuration from TOML text.
///
/// Environment variables are resolved and the configuration is validated
/// after parsing.
impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let resolved = expand_env_refs(s)?;
		let config: Config = toml::from_str(&resolved)?;
		config.validate()?;
		Ok(config)
	}
}
