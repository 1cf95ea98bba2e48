//! Optional demo plugins.
//!
//! Depends on `capreg-demo-core`, so its unit is generated after the core
//! unit and takes the next suffix.

capreg::include_unit!();

use capreg::register;
use capreg_demo_api::{AppContext, Plugin, StartError};
#[allow(unused_imports, reason = "orders this unit after the core unit")]
use capreg_demo_core as _;

#[register(dyn Plugin)]
#[derive(Debug, Default)]
pub struct Greeter;

impl Plugin for Greeter {
	fn name(&self) -> &'static str {
		"greeter"
	}

	fn on_start(&self, context: &mut AppContext) -> Result<(), StartError> {
		context.started.push(self.name());
		context.output.push(format!("hello after {} plugins", context.started.len() - 1));
		Ok(())
	}
}

pub mod formatters {
	use capreg_demo_api::Formatter;

	#[capreg::register(Formatter)]
	#[derive(Debug, Default)]
	pub struct Shouting;

	impl Formatter for Shouting {
		fn format(&self, text: &str) -> String {
			text.to_uppercase()
		}
	}
}

/// Fails on start; the application keeps going without it.
#[register(dyn Plugin)]
#[derive(Debug, Default)]
pub struct Flaky;

impl Plugin for Flaky {
	fn name(&self) -> &'static str {
		"flaky"
	}

	fn on_start(&self, _: &mut AppContext) -> Result<(), StartError> {
		Err(StartError {
			plugin: self.name(),
			reason: "remote service unavailable".to_string(),
		})
	}
}
