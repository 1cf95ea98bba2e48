use capreg::register;
use capreg_demo_api::{AppContext, Formatter, Plugin, StartError};

/// The application's own plugin, started after every dependency's.
#[register(dyn Plugin)]
#[derive(Debug, Default)]
pub struct Banner;

impl Plugin for Banner {
	fn name(&self) -> &'static str {
		"banner"
	}

	fn on_start(&self, context: &mut AppContext) -> Result<(), StartError> {
		context.started.push(self.name());
		context.output.push(format!("{} plugins up", context.started.len()));
		Ok(())
	}
}

/// Cannot be constructed. Stays registered, is skipped on start.
#[register(dyn Plugin)]
#[derive(Debug)]
pub struct Misconfigured;

impl Default for Misconfigured {
	fn default() -> Self {
		panic!("missing configuration for misconfigured plugin")
	}
}

impl Plugin for Misconfigured {
	fn name(&self) -> &'static str {
		"misconfigured"
	}

	fn on_start(&self, context: &mut AppContext) -> Result<(), StartError> {
		context.started.push(self.name());
		Ok(())
	}
}

#[register(dyn Formatter)]
#[derive(Debug, Default)]
pub struct Bracketed;

impl Formatter for Bracketed {
	fn format(&self, text: &str) -> String {
		format!("[{text}]")
	}
}
