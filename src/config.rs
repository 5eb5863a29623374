use std::path::{Path, PathBuf};
use std::{fmt, fs, io};

use serde::Deserialize;

pub const DEFAULT_CONFIG: &str = "eva.toml";

fn default_module_dir() -> PathBuf {
	PathBuf::from("import")
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EvaConfig {
	/// where `import` looks for `<name>.json`
	#[serde(default = "default_module_dir")]
	pub module_dir: PathBuf,
	/// env_logger filter for this crate, `trace` when unset
	#[serde(default)]
	pub log_level: Option<String>,
}

impl Default for EvaConfig {
	fn default() -> Self {
		EvaConfig {
			module_dir: default_module_dir(),
			log_level: None,
		}
	}
}

#[derive(Debug)]
pub enum ConfigError {
	Read(PathBuf, io::Error),
	Parse(PathBuf, toml::de::Error),
}

impl fmt::Display for ConfigError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ConfigError::Read(path, err) => write!(f, "couldn't read {}: {}", path.display(), err),
			ConfigError::Parse(path, err) => write!(f, "couldn't parse {}: {}", path.display(), err),
		}
	}
}

impl std::error::Error for ConfigError {}

impl EvaConfig {
	pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
		toml::from_str(text)
	}

	/// a missing file means defaults, anything else wrong with it is an error
	pub fn load(path: &Path) -> Result<Self, ConfigError> {
		match fs::read_to_string(path) {
			Ok(text) => Self::parse(&text).map_err(|err| ConfigError::Parse(path.to_path_buf(), err)),
			Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
			Err(err) => Err(ConfigError::Read(path.to_path_buf(), err)),
		}
	}

	pub fn log_filter(&self) -> log::LevelFilter {
		self.log_level
			.as_deref()
			.and_then(|v| v.parse().ok())
			.unwrap_or(log::LevelFilter::Trace)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults() {
		let config = EvaConfig::parse("").unwrap();
		assert_eq!(config, EvaConfig::default());
		assert_eq!(config.module_dir, PathBuf::from("import"));
		assert_eq!(config.log_filter(), log::LevelFilter::Trace);
	}

	#[test]
	fn parses_fields() {
		let config = EvaConfig::parse("module_dir = \"lib\"\nlog_level = \"debug\"\n").unwrap();
		assert_eq!(config.module_dir, PathBuf::from("lib"));
		assert_eq!(config.log_filter(), log::LevelFilter::Debug);
	}

	#[test]
	fn rejects_unknown_fields() {
		assert!(EvaConfig::parse("token = \"abc\"").is_err());
	}

	#[test]
	fn missing_file_is_default() {
		let dir = tempfile::tempdir().unwrap();
		let config = EvaConfig::load(&dir.path().join(DEFAULT_CONFIG)).unwrap();
		assert_eq!(config, EvaConfig::default());
		std::fs::write(dir.path().join("bad.toml"), "module_dir = [").unwrap();
		assert!(matches!(EvaConfig::load(&dir.path().join("bad.toml")), Err(ConfigError::Parse(..))));
	}
}
