//! capreg-gen: runs the registry unit generator by hand.
//!
//! Useful for checking what a build script will register, and for producing
//! units for crates that do not use `capreg_build::build()`.

mod cli;

use anyhow::{Context, anyhow};
use capreg_build::{Generator, GeneratorConfig, ImplementationRef, parse_suffix, parse_suffix_list, render_list};
use clap::Parser;
use cli::{Cli, Command, Target};
use tracing::info;

fn main() -> anyhow::Result<()> {
	let cli = Cli::parse();

	let subscriber = tracing_subscriber::fmt()
		.with_max_level(if cli.verbose {
			tracing::Level::DEBUG
		} else {
			tracing::Level::INFO
		})
		.with_writer(std::io::stderr)
		.finish();
	tracing::subscriber::set_global_default(subscriber)?;

	match cli.command {
		Command::Scan { target, json } => scan(&target, json),
		Command::Generate {
			target,
			out,
			suffix,
			visible,
		} => {
			let mut config = config(&target, out)?;
			if let Some(suffix) = suffix {
				config.suffix = Some(parse_suffix(&suffix)?);
			}
			let visible = parse_suffix_list(&visible)?;
			let generated = Generator::new(config).with_visible_units(visible).run()?;

			match generated.suffix {
				Some(suffix) => info!(
					suffix = %suffix,
					unit = %generated.unit_path.display(),
					"wrote registry unit"
				),
				None => info!(unit = %generated.unit_path.display(), "no markers, wrote empty unit"),
			}
			println!("{}", render_list(&generated.published_units()));
			Ok(())
		}
	}
}

fn config(target: &Target, out: std::path::PathBuf) -> anyhow::Result<GeneratorConfig> {
	let package = match &target.package {
		Some(package) => package.clone(),
		None => target
			.manifest_dir
			.canonicalize()
			.with_context(|| format!("cannot open {}", target.manifest_dir.display()))?
			.file_name()
			.and_then(|name| name.to_str())
			.map(str::to_string)
			.ok_or_else(|| anyhow!("cannot derive a package name from {}", target.manifest_dir.display()))?,
	};

	let mut config = GeneratorConfig::new(&target.manifest_dir, out, &package);
	config.load_file()?;
	if let Some(crate_name) = &target.crate_name {
		config.crate_name = crate_name.clone();
	}
	config.include_test_modules |= target.include_tests;
	Ok(config)
}

fn scan(target: &Target, json: bool) -> anyhow::Result<()> {
	let config = config(target, std::path::PathBuf::new())?;
	let generator = Generator::new(config);
	let scan = generator.scan()?;
	let groups = capreg_build::group(&scan.markers)?;

	if json {
		let value = serde_json::json!({
			"crate": generator.config().crate_name,
			"files": scan.files,
			"markers": scan.markers,
			"groups": groups,
		});
		println!("{}", serde_json::to_string_pretty(&value)?);
		return Ok(());
	}

	for group in &groups {
		println!("{}", group.capability);
		for member in &group.implementations {
			let gate = match member.cfgs.as_slice() {
				[] => String::new(),
				cfgs => format!(" #[cfg({})]", cfgs.join(", ")),
			};
			match &member.reference {
				ImplementationRef::Direct(path) => println!("  {path}{gate}"),
				ImplementationRef::Exported(path) => println!("  {path} (exported){gate}"),
			}
		}
	}
	info!(
		files = scan.files.len(),
		markers = scan.markers.len(),
		capabilities = groups.len(),
		"scan complete"
	);
	Ok(())
}
