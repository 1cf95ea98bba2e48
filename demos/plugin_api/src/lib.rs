//! Capabilities the demo application discovers at runtime.
//!
//! Nothing here knows about any implementation. Plugin crates mark their
//! types with `#[capreg::register(dyn Plugin)]` and the application finds
//! them through the registry.

use thiserror::Error;

/// Shared state handed to every plugin on start.
#[derive(Debug, Default)]
pub struct AppContext {
	/// Names of the plugins that started, in start order.
	pub started: Vec<&'static str>,
	/// Lines plugins chose to print.
	pub output: Vec<String>,
}

/// Error a plugin reports from [`Plugin::on_start`].
#[derive(Debug, Error)]
#[error("{plugin} failed to start: {reason}")]
pub struct StartError {
	pub plugin: &'static str,
	pub reason: String,
}

/// Something the application starts once at launch.
pub trait Plugin: Send + Sync {
	fn name(&self) -> &'static str;

	fn on_start(&self, context: &mut AppContext) -> Result<(), StartError>;
}

/// Turns text into its display form.
pub trait Formatter: Send + Sync {
	fn format(&self, text: &str) -> String;
}
