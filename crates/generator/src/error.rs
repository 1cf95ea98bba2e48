//! Error types for registry unit generation.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// Source position of a marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Location {
	pub file: PathBuf,
	pub line: usize,
	pub column: usize,
}

impl fmt::Display for Location {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}:{}:{}", self.file.display(), self.line, self.column + 1)
	}
}

/// Errors that fail the build of the crate being generated for.
#[derive(Debug, Error)]
pub enum GenerateError {
	/// A cargo build environment variable is absent.
	#[error("missing environment variable {0} (is the generator running from a build script?)")]
	MissingEnv(&'static str),

	/// Reading a source file or writing the unit failed.
	#[error("I/O error on {path}: {error}")]
	Io {
		path: PathBuf,
		#[source]
		error: std::io::Error,
	},

	/// A source file is not valid Rust.
	#[error("failed to parse {path}: {error}")]
	Parse {
		path: PathBuf,
		#[source]
		error: syn::Error,
	},

	/// A `mod foo;` declaration has no source file.
	#[error("{declared_in}: no source file for module '{module}' (looked for {candidates})")]
	MissingModule {
		declared_in: PathBuf,
		module: String,
		candidates: String,
	},

	/// A marker is attached to the wrong item or is malformed.
	#[error("{location}: {message}")]
	Marker { location: Location, message: String },

	/// A marker's capability path does not resolve in its module.
	#[error("{location}: cannot resolve capability '{capability}': {reason}")]
	UnresolvedCapability {
		location: Location,
		capability: String,
		reason: String,
	},

	/// Every suffix from A to Z is already used by visible units.
	#[error("all registry unit suffixes A-Z are taken by dependencies ({visible})")]
	SuffixesExhausted { visible: String },

	/// A configured suffix is not a single uppercase letter.
	#[error("invalid suffix '{0}': expected a single letter A-Z")]
	InvalidSuffix(String),

	/// A configured suffix collides with a unit visible from dependencies.
	#[error("suffix '{0}' is already used by a unit visible from dependencies")]
	SuffixTaken(char),

	/// Error parsing `capreg.kdl`.
	#[error("KDL parse error in {path}: {error}")]
	Kdl {
		path: PathBuf,
		#[source]
		error: kdl::KdlError,
	},

	/// `capreg.kdl` is valid KDL but not a valid generator configuration.
	#[error("invalid configuration in {path}: {message}")]
	Config { path: PathBuf, message: String },

	/// A resolved path could not be turned back into tokens.
	#[error("cannot render '{text}' into the unit: {error}")]
	Render {
		text: String,
		#[source]
		error: syn::Error,
	},
}

/// Result type for generation.
pub type Result<T> = std::result::Result<T, GenerateError>;
