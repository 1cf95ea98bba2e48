use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "capreg-gen")]
#[command(about = "Inspect and generate capreg registry units")]
#[command(version)]
/// Command-line arguments.
pub struct Cli {
	/// Verbose logging
	#[arg(short, long, global = true)]
	pub verbose: bool,

	#[command(subcommand)]
	pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
	/// List the markers and capability groups of a crate
	Scan {
		#[command(flatten)]
		target: Target,

		/// Print JSON instead of text
		#[arg(long)]
		json: bool,
	},
	/// Write the registry unit of a crate
	Generate {
		#[command(flatten)]
		target: Target,

		/// Output file
		#[arg(short, long, value_name = "FILE")]
		out: PathBuf,

		/// Use this suffix instead of probing
		#[arg(long, value_name = "LETTER")]
		suffix: Option<String>,

		/// Suffixes already taken by other units, e.g. A,B
		#[arg(long, value_name = "LIST", default_value = "")]
		visible: String,
	},
}

/// The crate to operate on.
#[derive(Args, Debug)]
pub struct Target {
	/// Directory containing the crate's Cargo.toml
	#[arg(value_name = "MANIFEST_DIR")]
	pub manifest_dir: PathBuf,

	/// Package name (defaults to the directory name)
	#[arg(long)]
	pub package: Option<String>,

	/// Crate name as module paths report it (defaults to the package name with '-' replaced by '_')
	#[arg(long)]
	pub crate_name: Option<String>,

	/// Also scan #[cfg(test)] modules
	#[arg(long)]
	pub include_tests: bool,
}
