//! Multi-file configuration loading.
//!
//! A root file may pull in further files with `include = "file.toml"` or
//! `include = ["a.toml", "b.toml"]`. Includes are resolved relative to the root
//! file's directory, may nest, and must not repeat a top-level section that an
//! earlier file already defined.

use crate::{resolve_env_vars, Config, ConfigError};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::debug;

const INCLUDE_KEY: &str = "include";

/// Loads a configuration tree and merges it into a single document.
pub(crate) struct ConfigLoader {
	/// Directory relative includes are resolved against.
	base_path: PathBuf,
	/// Canonical paths already read, for cycle detection.
	loaded_files: HashSet<PathBuf>,
	/// File each top-level section came from.
	section_sources: HashMap<String, PathBuf>,
}

impl ConfigLoader {
	pub(crate) fn new(base_path: impl AsRef<Path>) -> Self {
		Self {
			base_path: base_path.as_ref().to_path_buf(),
			loaded_files: HashSet::new(),
			section_sources: HashMap::new(),
		}
	}

	/// Loads the root file and everything it includes, then validates the result.
	pub(crate) async fn load_config(
		&mut self,
		config_path: impl AsRef<Path>,
	) -> Result<Config, ConfigError> {
		let root = self.resolve_path(config_path)?;
		let mut merged = toml::Table::new();
		let mut pending = vec![root];

		while let Some(path) = pending.pop() {
			let mut document = self.read_document(&path).await?;
			let includes = extract_includes(&mut document)?;
			self.merge_sections(&mut merged, document, &path)?;

			// Reverse so includes are processed in declaration order
			for include in includes.into_iter().rev() {
				pending.push(self.resolve_path(include)?);
			}
		}

		debug!(
			files = self.loaded_files.len(),
			sections = self.section_sources.len(),
			"Configuration files merged"
		);
		Config::from_value(toml::Value::Table(merged))
	}

	/// Reads one file, resolving environment variables before parsing.
	async fn read_document(&mut self, path: &Path) -> Result<toml::Table, ConfigError> {
		let canonical = tokio::fs::canonicalize(path).await.map_err(|e| {
			ConfigError::Io(std::io::Error::new(
				e.kind(),
				format!("Cannot resolve path {}: {}", path.display(), e),
			))
		})?;
		if !self.loaded_files.insert(canonical.clone()) {
			return Err(ConfigError::Validation(format!(
				"Circular include detected: {} was already loaded",
				canonical.display()
			)));
		}

		let content = tokio::fs::read_to_string(&canonical).await?;
		let resolved = resolve_env_vars(&content)?;
		Ok(toml::from_str(&resolved)?)
	}

	/// Moves every top-level section of `document` into `merged`.
	fn merge_sections(
		&mut self,
		merged: &mut toml::Table,
		document: toml::Table,
		source: &Path,
	) -> Result<(), ConfigError> {
		for (section, value) in document {
			if let Some(existing) = self.section_sources.get(&section) {
				return Err(ConfigError::Validation(format!(
					"Duplicate section '{}' found in {} and {}. \
					Each top-level section must be unique across all configuration files.",
					section,
					existing.display(),
					source.display()
				)));
			}
			self.section_sources
				.insert(section.clone(), source.to_path_buf());
			merged.insert(section, value);
		}
		Ok(())
	}

	fn resolve_path(&self, path: impl AsRef<Path>) -> Result<PathBuf, ConfigError> {
		let path = path.as_ref();
		let resolved = if path.is_absolute() {
			path.to_path_buf()
		} else {
			self.base_path.join(path)
		};

		if !resolved.exists() {
			return Err(ConfigError::Io(std::io::Error::new(
				std::io::ErrorKind::NotFound,
				format!("Configuration file not found: {}", resolved.display()),
			)));
		}
		Ok(resolved)
	}
}

/// Removes the include directive from a document and returns the listed paths.
fn extract_includes(document: &mut toml::Table) -> Result<Vec<PathBuf>, ConfigError> {
	match document.remove(INCLUDE_KEY) {
		None => Ok(Vec::new()),
		Some(toml::Value::String(path)) => Ok(vec![PathBuf::from(path)]),
		Some(toml::Value::Array(items)) => items
			.into_iter()
			.map(|item| match item {
				toml::Value::String(path) => Ok(PathBuf::from(path)),
				_ => Err(ConfigError::Validation(
					"Include array must contain only strings".into(),
				)),
			})
			.collect(),
		Some(_) => Err(ConfigError::Validation(
			"Include must be a string or array of strings".into(),
		)),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::fs;
	use tempfile::TempDir;

	const SESSION: &str = r#"
[session]
id = "loader-test"
"#;

	const PRICING: &str = r#"
[pricing]
primary = "mock"
[pricing.implementations.mock]
"#;

	const MARKETS: &str = r#"
[[markets]]
address = "component_pair"
price_max_decimals = 2
token1 = { address = "resource_a", symbol = "A" }
token2 = { address = "resource_b", symbol = "B" }
"#;

	#[tokio::test]
	async fn test_single_file_config() {
		let dir = TempDir::new().unwrap();
		fs::write(dir.path().join("config.toml"), format!("{}{}", SESSION, PRICING)).unwrap();

		let mut loader = ConfigLoader::new(dir.path());
		let config = loader.load_config("config.toml").await.unwrap();
		assert_eq!(config.session.id, "loader-test");
		assert_eq!(config.pricing.primary, "mock");
	}

	#[tokio::test]
	async fn test_includes_are_merged() {
		let dir = TempDir::new().unwrap();
		fs::write(
			dir.path().join("main.toml"),
			format!("include = [\"pricing.toml\", \"markets.toml\"]\n{}", SESSION),
		)
		.unwrap();
		fs::write(dir.path().join("pricing.toml"), PRICING).unwrap();
		fs::write(dir.path().join("markets.toml"), MARKETS).unwrap();

		let config = Config::from_file(dir.path().join("main.toml").to_str().unwrap())
			.await
			.unwrap();
		assert_eq!(config.markets.len(), 1);
		assert_eq!(config.markets[0].token2.symbol, "B");
	}

	#[tokio::test]
	async fn test_nested_include_with_single_string() {
		let dir = TempDir::new().unwrap();
		fs::write(
			dir.path().join("main.toml"),
			format!("include = \"pricing.toml\"\n{}", SESSION),
		)
		.unwrap();
		fs::write(
			dir.path().join("pricing.toml"),
			format!("include = \"markets.toml\"\n{}", PRICING),
		)
		.unwrap();
		fs::write(dir.path().join("markets.toml"), MARKETS).unwrap();

		let mut loader = ConfigLoader::new(dir.path());
		let config = loader.load_config("main.toml").await.unwrap();
		assert_eq!(config.markets[0].address, "component_pair");
	}

	#[tokio::test]
	async fn test_duplicate_section_rejected() {
		let dir = TempDir::new().unwrap();
		fs::write(
			dir.path().join("main.toml"),
			format!("include = [\"other.toml\"]\n{}{}", SESSION, PRICING),
		)
		.unwrap();
		fs::write(dir.path().join("other.toml"), PRICING).unwrap();

		let mut loader = ConfigLoader::new(dir.path());
		let err = loader.load_config("main.toml").await.unwrap_err();
		assert!(err.to_string().contains("Duplicate section 'pricing'"));
	}

	#[tokio::test]
	async fn test_circular_include_rejected() {
		let dir = TempDir::new().unwrap();
		fs::write(
			dir.path().join("a.toml"),
			format!("include = \"b.toml\"\n{}", SESSION),
		)
		.unwrap();
		fs::write(
			dir.path().join("b.toml"),
			format!("include = \"a.toml\"\n{}", PRICING),
		)
		.unwrap();

		let mut loader = ConfigLoader::new(dir.path());
		let err = loader.load_config("a.toml").await.unwrap_err();
		assert!(err.to_string().contains("Circular include"));
	}

	#[tokio::test]
	async fn test_missing_include_reported() {
		let dir = TempDir::new().unwrap();
		fs::write(
			dir.path().join("main.toml"),
			format!("include = \"absent.toml\"\n{}{}", SESSION, PRICING),
		)
		.unwrap();

		let mut loader = ConfigLoader::new(dir.path());
		let err = loader.load_config("main.toml").await.unwrap_err();
		assert!(err.to_string().contains("absent.toml"));
	}

	#[test]
	fn test_include_must_be_strings() {
		let mut document: toml::Table = toml::from_str("include = [1, 2]").unwrap();
		assert!(extract_includes(&mut document).is_err());
		assert!(document.get(INCLUDE_KEY).is_none());
	}
}
