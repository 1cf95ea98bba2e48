//! Build-time generator of `capreg` registry units.
//!
//! Call [`build`] from a build script and include the result at the crate
//! root:
//!
//! ```ignore
//! // build.rs
//! fn main() {
//!     capreg_build::build();
//! }
//!
//! // src/lib.rs
//! capreg::include_unit!();
//! ```
//!
//! The generator scans the crate's sources for `#[register(dyn Capability)]`
//! markers, groups them by capability, picks the first unit suffix not used by
//! a dependency, and writes one unit that registers every marked type at
//! bootstrap. Producing crates that other producing crates depend on should
//! declare a `links` key so the suffixes they know about reach their
//! dependents.

mod config;
mod emit;
mod error;
mod group;
mod resolve;
mod scan;
mod suffix;

use std::collections::BTreeSet;
use std::env;
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use walkdir::WalkDir;

pub use config::{CONFIG_FILE, GeneratorConfig, SUFFIX_ENV};
pub use emit::{render_empty, render_unit, write_atomic};
pub use error::{GenerateError, Location, Result};
pub use group::{CapabilityGroup, ImplementationRef, Member, group};
pub use scan::{Marker, Scan, ScanOptions, scan_crate};
pub use suffix::{UNITS_KEY, allocate, parse_suffix, parse_suffix_list, render_list, visible_from_env};

/// Generates the registry unit of one crate.
#[derive(Debug, Clone)]
pub struct Generator {
	config: GeneratorConfig,
	visible: BTreeSet<char>,
}

impl Generator {
	pub fn new(config: GeneratorConfig) -> Self {
		Self {
			config,
			visible: BTreeSet::new(),
		}
	}

	/// Generator for the crate whose build script is running, seeing the
	/// suffixes its dependencies published.
	pub fn from_build_env() -> Result<Self> {
		let config = GeneratorConfig::from_build_env()?;
		let visible = visible_from_env(env::vars())?;
		Ok(Self { config, visible })
	}

	/// Replaces the set of suffixes already taken by linked units.
	pub fn with_visible_units(mut self, visible: impl IntoIterator<Item = char>) -> Self {
		self.visible = visible.into_iter().collect();
		self
	}

	pub fn config(&self) -> &GeneratorConfig {
		&self.config
	}

	pub fn visible_units(&self) -> &BTreeSet<char> {
		&self.visible
	}

	/// Scans the crate without generating anything.
	pub fn scan(&self) -> Result<Scan> {
		let roots = self.config.root_paths();
		scan_crate(&ScanOptions {
			crate_name: &self.config.crate_name,
			roots: &roots,
			include_test_modules: self.config.include_test_modules,
		})
	}

	/// Scans, allocates a suffix if there is anything to register, and
	/// writes the unit file.
	pub fn run(&self) -> Result<Generated> {
		let scan = self.scan()?;
		let groups = group(&scan.markers)?;

		let (suffix, contents) = if groups.is_empty() {
			debug!(package = %self.config.package, "no markers, writing empty unit");
			(None, render_empty(&self.config.package))
		} else {
			let suffix = allocate(&self.visible, self.config.suffix)?;
			let contents = render_unit(suffix, &self.config.package, &groups)?;
			(Some(suffix), contents)
		};

		let written = write_atomic(&self.config.out_file, &contents)?;
		if let Some(suffix) = suffix {
			info!(
				package = %self.config.package,
				suffix = %suffix,
				capabilities = groups.len(),
				implementations = scan.markers.len(),
				visible = %render_list(&self.visible),
				"generated registry unit"
			);
		}

		let config_file = self.config.config_file();
		Ok(Generated {
			suffix,
			groups,
			package: self.config.package.clone(),
			visible: self.visible.clone(),
			unit_path: self.config.out_file.clone(),
			sources: scan.files,
			source_dirs: source_dirs(&self.config),
			config_file: config_file.is_file().then_some(config_file),
			publish_metadata: self.config.publish_metadata,
			written,
		})
	}
}

/// Outcome of [`Generator::run`].
#[derive(Debug, Clone)]
pub struct Generated {
	/// Suffix of the emitted unit, `None` if the crate has no markers.
	pub suffix: Option<char>,
	pub groups: Vec<CapabilityGroup>,
	package: String,
	/// Suffixes taken by dependencies.
	pub visible: BTreeSet<char>,
	pub unit_path: PathBuf,
	/// Source files that were scanned.
	pub sources: Vec<PathBuf>,
	source_dirs: Vec<PathBuf>,
	config_file: Option<PathBuf>,
	publish_metadata: bool,
	/// Whether the unit file changed on disk.
	pub written: bool,
}

impl Generated {
	/// Suffixes this crate tells its dependents about.
	pub fn published_units(&self) -> BTreeSet<char> {
		let mut units = self.visible.clone();
		units.extend(self.suffix);
		units
	}

	/// `cargo::` lines for the build script to print.
	pub fn cargo_directives(&self) -> Vec<String> {
		let mut lines = Vec::new();
		for dir in &self.source_dirs {
			lines.push(format!("cargo::rerun-if-changed={}", dir.display()));
			for entry in WalkDir::new(dir).into_iter().filter_map(|e| e.ok()) {
				if entry.path().extension().is_some_and(|x| x == "rs") {
					lines.push(format!("cargo::rerun-if-changed={}", entry.path().display()));
				}
			}
		}
		for source in &self.sources {
			if !self.source_dirs.iter().any(|dir| source.starts_with(dir)) {
				lines.push(format!("cargo::rerun-if-changed={}", source.display()));
			}
		}
		if let Some(config_file) = &self.config_file {
			lines.push(format!("cargo::rerun-if-changed={}", config_file.display()));
		}
		lines.push(format!("cargo::rerun-if-env-changed={SUFFIX_ENV}"));
		match (self.suffix, self.publish_metadata) {
			(_, true) => {
				lines.push(format!("cargo::metadata={UNITS_KEY}={}", render_list(&self.published_units())));
			}
			// Without `links` a dependent producer cannot see this suffix and
			// would take it again.
			(Some(suffix), false) => lines.push(format!(
				"cargo::warning=capreg: {} registers unit '{suffix}' but has no `links` key; \
				 producing crates that depend on it will not see the suffix",
				self.package
			)),
			(None, false) => {}
		}
		lines
	}
}

/// Directories holding the crate roots, watched for new files.
fn source_dirs(config: &GeneratorConfig) -> Vec<PathBuf> {
	let mut dirs: Vec<PathBuf> = config
		.root_paths()
		.iter()
		.filter_map(|root| root.parent().map(Path::to_path_buf))
		.collect();
	dirs.sort();
	dirs.dedup();
	dirs
}

/// Generates the unit for the crate whose build script is running.
///
/// # Panics
///
/// On any [`GenerateError`], failing the build with its message.
pub fn build() {
	match Generator::from_build_env().and_then(|generator| generator.run()) {
		Ok(generated) => {
			for line in generated.cargo_directives() {
				println!("{line}");
			}
		}
		Err(e) => panic!("capreg: {e}"),
	}
}
