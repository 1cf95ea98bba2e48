//! Demo application.
//!
//! Knows only the capabilities from `capreg-demo-api`. Every plugin it starts
//! is found through the registry, whichever linked crate declared it.

capreg::include_unit!();

pub mod plugins;

use capreg::{ConsumeReport, instantiate_all};
use capreg_demo_api::{AppContext, Formatter, Plugin};
#[allow(unused_imports, reason = "links the plugin crates so their units are registered")]
use {capreg_demo_core as _, capreg_demo_extra as _};
use tracing::info;

/// Result of starting the application.
#[derive(Debug, Default)]
pub struct Startup {
	pub context: AppContext,
	pub report: ConsumeReport,
}

/// Instantiates and starts every registered [`Plugin`], in registry order.
pub fn start() -> Startup {
	let mut context = AppContext::default();
	let plugins = capreg::find::<dyn Plugin>();
	info!(plugins = plugins.len(), "starting plugins");

	let report = instantiate_all(&plugins, |plugin| plugin.on_start(&mut context));
	info!(
		started = report.invoked.len(),
		failed = report.failures.len(),
		"plugins started"
	);
	Startup { context, report }
}

/// Runs `text` through every registered [`Formatter`], in registry order.
pub fn format(text: &str) -> String {
	capreg::find::<dyn Formatter>()
		.iter()
		.fold(text.to_string(), |text, formatter| formatter.instantiate().format(&text))
}
