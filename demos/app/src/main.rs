use clap::Parser;
use tracing::{info, warn};

/// Starts every plugin the linked crates registered.
#[derive(Parser, Debug)]
#[command(name = "capreg-demo")]
struct Args {
	/// Verbose logging
	#[arg(short, long)]
	verbose: bool,
}

fn main() {
	let args = Args::parse();

	let subscriber = tracing_subscriber::fmt()
		.with_max_level(if args.verbose {
			tracing::Level::DEBUG
		} else {
			tracing::Level::INFO
		})
		.finish();
	if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
		eprintln!("failed to install logger: {e}");
	}

	match capreg::bootstrap_report() {
		Ok(report) => info!(units = ?report.initialized.iter().map(|u| u.suffix).collect::<Vec<_>>(), "registry ready"),
		Err(e) => {
			eprintln!("registry bootstrap failed: {e}");
			std::process::exit(1);
		}
	}

	let startup = capreg_demo_app::start();
	for line in &startup.context.output {
		println!("{line}");
	}
	for failure in &startup.report.failures {
		warn!(
			implementation = failure.implementation,
			stage = %failure.stage,
			"{}",
			failure.message
		);
	}
	println!("{}", capreg_demo_app::format("ready"));
}
