//! Generator configuration.
//!
//! Cargo provides most of what the generator needs through the build script
//! environment. An optional `capreg.kdl` next to `Cargo.toml` adjusts the rest:
//!
//! ```kdl
//! crate-name "my_plugins"
//! suffix "M"
//! root "src/lib.rs"
//! root "src/extra_root.rs"
//! include-test-modules #false
//! ```
//!
//! `CAPREG_SUFFIX` in the environment overrides `suffix`.

use std::env;
use std::path::{Path, PathBuf};

use kdl::{KdlDocument, KdlNode};

use crate::error::{GenerateError, Result};
use crate::suffix::parse_suffix;

/// Name of the optional configuration file in the manifest directory.
pub const CONFIG_FILE: &str = "capreg.kdl";

/// Environment variable overriding the suffix choice.
pub const SUFFIX_ENV: &str = "CAPREG_SUFFIX";

/// Everything needed to generate one crate's unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
	pub manifest_dir: PathBuf,
	/// Where the unit is written.
	pub out_file: PathBuf,
	/// Crate name as `module_path!()` reports it.
	pub crate_name: String,
	/// Package name, recorded as the unit's origin.
	pub package: String,
	/// Crate root files, relative to `manifest_dir` unless absolute.
	pub roots: Vec<PathBuf>,
	/// Fixed suffix instead of probing.
	pub suffix: Option<char>,
	pub include_test_modules: bool,
	/// Whether to publish the known suffixes to dependents. Only works for
	/// packages with a `links` key.
	pub publish_metadata: bool,
}

impl GeneratorConfig {
	/// Configuration for the package at `manifest_dir`, with default roots.
	pub fn new(manifest_dir: impl Into<PathBuf>, out_file: impl Into<PathBuf>, package: &str) -> Self {
		let manifest_dir = manifest_dir.into();
		Self {
			roots: default_roots(&manifest_dir),
			manifest_dir,
			out_file: out_file.into(),
			crate_name: package.replace('-', "_"),
			package: package.to_string(),
			suffix: None,
			include_test_modules: false,
			publish_metadata: false,
		}
	}

	/// Configuration for the package whose build script is running.
	pub fn from_build_env() -> Result<Self> {
		let manifest_dir = require_env("CARGO_MANIFEST_DIR")?;
		let out_dir = PathBuf::from(require_env("OUT_DIR")?);
		let package = require_env("CARGO_PKG_NAME")?;

		let mut config = Self::new(manifest_dir, out_dir.join(capreg::UNIT_FILE), &package);
		config.publish_metadata = env::var_os("CARGO_MANIFEST_LINKS").is_some();
		config.load_file()?;
		match env::var(SUFFIX_ENV) {
			Ok(suffix) if !suffix.trim().is_empty() => config.suffix = Some(parse_suffix(&suffix)?),
			_ => {}
		}
		Ok(config)
	}

	/// Path of `capreg.kdl` for this package.
	pub fn config_file(&self) -> PathBuf {
		self.manifest_dir.join(CONFIG_FILE)
	}

	/// Applies `capreg.kdl` if it exists.
	pub fn load_file(&mut self) -> Result<()> {
		let path = self.config_file();
		if !path.is_file() {
			return Ok(());
		}
		let content = std::fs::read_to_string(&path).map_err(|error| GenerateError::Io {
			path: path.clone(),
			error,
		})?;
		self.apply_kdl(&content, &path)
	}

	/// Applies configuration text; `path` is used for error messages.
	pub fn apply_kdl(&mut self, content: &str, path: &Path) -> Result<()> {
		let doc: KdlDocument = content.parse().map_err(|error| GenerateError::Kdl {
			path: path.to_path_buf(),
			error,
		})?;

		let mut roots = Vec::new();
		for node in doc.nodes() {
			match node.name().value() {
				"crate-name" => self.crate_name = string_arg(node, path)?,
				"suffix" => self.suffix = Some(parse_suffix(&string_arg(node, path)?)?),
				"root" => roots.push(PathBuf::from(string_arg(node, path)?)),
				"include-test-modules" => self.include_test_modules = bool_arg(node, path)?,
				other => {
					return Err(GenerateError::Config {
						path: path.to_path_buf(),
						message: format!("unknown setting '{other}'"),
					});
				}
			}
		}
		if !roots.is_empty() {
			self.roots = roots;
		}
		Ok(())
	}

	/// Crate roots as absolute paths.
	pub fn root_paths(&self) -> Vec<PathBuf> {
		self.roots.iter().map(|root| self.manifest_dir.join(root)).collect()
	}
}

fn default_roots(manifest_dir: &Path) -> Vec<PathBuf> {
	let lib = PathBuf::from("src/lib.rs");
	if manifest_dir.join(&lib).is_file() || !manifest_dir.join("src/main.rs").is_file() {
		vec![lib]
	} else {
		vec![PathBuf::from("src/main.rs")]
	}
}

fn require_env(name: &'static str) -> Result<String> {
	env::var(name).map_err(|_| GenerateError::MissingEnv(name))
}

fn string_arg(node: &KdlNode, path: &Path) -> Result<String> {
	node.get(0)
		.and_then(|value| value.as_string())
		.map(str::to_string)
		.ok_or_else(|| GenerateError::Config {
			path: path.to_path_buf(),
			message: format!("'{}' expects a string argument", node.name().value()),
		})
}

fn bool_arg(node: &KdlNode, path: &Path) -> Result<bool> {
	node.get(0)
		.and_then(|value| value.as_bool())
		.ok_or_else(|| GenerateError::Config {
			path: path.to_path_buf(),
			message: format!("'{}' expects #true or #false", node.name().value()),
		})
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;
	use tempfile::TempDir;

	use super::*;

	fn config(dir: &Path) -> GeneratorConfig {
		GeneratorConfig::new(dir, dir.join("out/capreg_unit.rs"), "my-plugins")
	}

	#[test]
	fn defaults_follow_the_package() {
		let dir = TempDir::new().unwrap();
		let config = config(dir.path());

		assert_eq!(config.crate_name, "my_plugins");
		assert_eq!(config.package, "my-plugins");
		assert_eq!(config.roots, vec![PathBuf::from("src/lib.rs")]);
		assert_eq!(config.suffix, None);
		assert!(!config.include_test_modules);
	}

	#[test]
	fn binary_only_package_uses_main() {
		let dir = TempDir::new().unwrap();
		std::fs::create_dir_all(dir.path().join("src")).unwrap();
		std::fs::write(dir.path().join("src/main.rs"), "fn main() {}").unwrap();

		assert_eq!(config(dir.path()).roots, vec![PathBuf::from("src/main.rs")]);
	}

	#[test]
	fn kdl_settings_apply() {
		let dir = TempDir::new().unwrap();
		let mut config = config(dir.path());
		config
			.apply_kdl(
				r#"
					crate-name "renamed"
					suffix "M"
					root "src/a.rs"
					root "src/b.rs"
					include-test-modules #true
				"#,
				Path::new("capreg.kdl"),
			)
			.unwrap();

		assert_eq!(config.crate_name, "renamed");
		assert_eq!(config.suffix, Some('M'));
		assert_eq!(config.roots, vec![PathBuf::from("src/a.rs"), PathBuf::from("src/b.rs")]);
		assert!(config.include_test_modules);
		assert_eq!(config.root_paths()[0], dir.path().join("src/a.rs"));
	}

	#[test]
	fn unknown_setting_is_rejected() {
		let dir = TempDir::new().unwrap();
		let err = config(dir.path())
			.apply_kdl("colour \"blue\"", Path::new("capreg.kdl"))
			.unwrap_err();
		assert!(err.to_string().contains("unknown setting 'colour'"));
	}

	#[test]
	fn bad_suffix_is_rejected() {
		let dir = TempDir::new().unwrap();
		let err = config(dir.path())
			.apply_kdl("suffix \"lower\"", Path::new("capreg.kdl"))
			.unwrap_err();
		assert!(matches!(err, GenerateError::InvalidSuffix(_)));
	}

	#[test]
	fn wrong_argument_type_is_rejected() {
		let dir = TempDir::new().unwrap();
		let err = config(dir.path())
			.apply_kdl("include-test-modules \"yes\"", Path::new("capreg.kdl"))
			.unwrap_err();
		assert!(matches!(err, GenerateError::Config { .. }));
	}

	#[test]
	fn invalid_kdl_is_reported() {
		let dir = TempDir::new().unwrap();
		let err = config(dir.path())
			.apply_kdl("suffix \"A", Path::new("capreg.kdl"))
			.unwrap_err();
		assert!(matches!(err, GenerateError::Kdl { .. }));
	}

	#[test]
	fn missing_file_is_not_an_error() {
		let dir = TempDir::new().unwrap();
		let mut config = config(dir.path());
		config.load_file().unwrap();
		assert_eq!(config.suffix, None);
	}

	#[test]
	fn file_is_loaded_from_manifest_dir() {
		let dir = TempDir::new().unwrap();
		std::fs::write(dir.path().join(CONFIG_FILE), "suffix \"Q\"").unwrap();
		let mut config = config(dir.path());
		config.load_file().unwrap();
		assert_eq!(config.suffix, Some('Q'));
	}
}
