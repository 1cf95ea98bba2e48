//! Built-in demo plugins.

capreg::include_unit!();

mod telemetry;

use capreg::register;
use capreg_demo_api::{AppContext, Formatter, Plugin, StartError};

/// Logs every start to the shared context.
#[register(dyn Plugin)]
#[derive(Debug, Default)]
pub struct CoreLogger;

impl Plugin for CoreLogger {
	fn name(&self) -> &'static str {
		"core-logger"
	}

	fn on_start(&self, context: &mut AppContext) -> Result<(), StartError> {
		context.started.push(self.name());
		context.output.push("core: logging enabled".to_string());
		Ok(())
	}
}

#[register(dyn Formatter)]
#[derive(Debug, Default)]
pub struct Plain;

impl Formatter for Plain {
	fn format(&self, text: &str) -> String {
		text.to_string()
	}
}
