use capreg::register;
use capreg_demo_api::{AppContext, Plugin, StartError};

/// Only nameable inside this module; reaches the registry through the
/// export the marker emits.
#[register(dyn Plugin)]
#[derive(Debug, Default)]
struct Telemetry {
	sample_rate: u32,
}

impl Plugin for Telemetry {
	fn name(&self) -> &'static str {
		"telemetry"
	}

	fn on_start(&self, context: &mut AppContext) -> Result<(), StartError> {
		context.started.push(self.name());
		context
			.output
			.push(format!("telemetry: sampling every {} events", self.sample_rate.max(1)));
		Ok(())
	}
}
