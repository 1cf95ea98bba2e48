//! Instantiating and invoking found implementations.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, error};

use crate::implementation::{Implementation, panic_message};

/// Where a consumer-side failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureStage {
	/// The constructor panicked.
	Instantiate,
	/// The invocation returned an error or panicked.
	Invoke,
}

impl fmt::Display for FailureStage {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Instantiate => write!(f, "instantiate"),
			Self::Invoke => write!(f, "invoke"),
		}
	}
}

/// One implementation that failed while being consumed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsumerFailure {
	pub implementation: &'static str,
	pub stage: FailureStage,
	pub message: String,
}

/// Outcome of [`instantiate_all`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsumeReport {
	/// Implementations that were instantiated and invoked successfully, in order.
	pub invoked: Vec<&'static str>,
	pub failures: Vec<ConsumerFailure>,
}

impl ConsumeReport {
	pub fn is_clean(&self) -> bool {
		self.failures.is_empty()
	}
}

/// Instantiates every implementation and hands each instance to `invoke`.
///
/// A failing constructor or invocation is logged and recorded, then the next
/// implementation is processed. Nothing is propagated to the caller.
pub fn instantiate_all<C, E, F>(implementations: &[Implementation<C>], mut invoke: F) -> ConsumeReport
where
	C: ?Sized + 'static,
	E: fmt::Display,
	F: FnMut(Box<C>) -> Result<(), E>,
{
	let mut report = ConsumeReport::default();
	for implementation in implementations {
		let name = implementation.name();
		let instance = match implementation.try_instantiate() {
			Ok(instance) => instance,
			Err(e) => {
				error!(implementation = name, "{e}");
				report.failures.push(ConsumerFailure {
					implementation: name,
					stage: FailureStage::Instantiate,
					message: e.message,
				});
				continue;
			}
		};

		let message = match panic::catch_unwind(AssertUnwindSafe(|| invoke(instance))) {
			Ok(Ok(())) => {
				debug!(implementation = name, "invoked");
				report.invoked.push(name);
				continue;
			}
			Ok(Err(e)) => e.to_string(),
			Err(payload) => panic_message(payload.as_ref()),
		};
		error!(implementation = name, "invocation failed: {message}");
		report.failures.push(ConsumerFailure {
			implementation: name,
			stage: FailureStage::Invoke,
			message,
		});
	}
	report
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;
	use crate::{Registry, implementation};

	trait Application {
		fn on_create(&self, context: &mut Vec<&'static str>) -> Result<(), String>;
	}

	#[derive(Default)]
	struct Healthy;
	impl Application for Healthy {
		fn on_create(&self, context: &mut Vec<&'static str>) -> Result<(), String> {
			context.push("healthy");
			Ok(())
		}
	}

	struct Unconstructible;
	impl Default for Unconstructible {
		fn default() -> Self {
			panic!("constructor exploded")
		}
	}
	impl Application for Unconstructible {
		fn on_create(&self, context: &mut Vec<&'static str>) -> Result<(), String> {
			context.push("unconstructible");
			Ok(())
		}
	}

	#[derive(Default)]
	struct Refusing;
	impl Application for Refusing {
		fn on_create(&self, _: &mut Vec<&'static str>) -> Result<(), String> {
			Err("not today".to_string())
		}
	}

	#[derive(Default)]
	struct Late;
	impl Application for Late {
		fn on_create(&self, context: &mut Vec<&'static str>) -> Result<(), String> {
			context.push("late");
			Ok(())
		}
	}

	#[test]
	fn failing_constructor_does_not_stop_the_rest() {
		let mut registry = Registry::new();
		registry.register::<dyn Application>([
			implementation!(dyn Application => Unconstructible),
			implementation!(dyn Application => Healthy),
		]);

		let mut context = Vec::new();
		let report = instantiate_all(registry.find::<dyn Application>(), |app| app.on_create(&mut context));

		assert_eq!(context, vec!["healthy"]);
		assert_eq!(report.failures.len(), 1);
		assert_eq!(report.failures[0].stage, FailureStage::Instantiate);
		assert_eq!(report.failures[0].message, "constructor exploded");
		// The failing implementation stays registered.
		assert_eq!(registry.find::<dyn Application>().len(), 2);
	}

	#[test]
	fn invocation_errors_are_recorded_and_skipped() {
		let implementations = [
			implementation!(dyn Application => Refusing),
			implementation!(dyn Application => Late),
		];
		let mut context = Vec::new();
		let report = instantiate_all(&implementations, |app| app.on_create(&mut context));

		assert_eq!(context, vec!["late"]);
		assert!(!report.is_clean());
		assert_eq!(report.failures[0].stage, FailureStage::Invoke);
		assert_eq!(report.failures[0].message, "not today");
		assert_eq!(report.invoked.len(), 1);
		assert!(report.invoked[0].ends_with("Late"));
	}

	#[test]
	fn invocation_panics_are_contained() {
		let implementations = [
			implementation!(dyn Application => Healthy),
			implementation!(dyn Application => Late),
		];
		let mut calls = 0;
		let report = instantiate_all(&implementations, |_app| -> Result<(), String> {
			calls += 1;
			if calls == 1 {
				panic!("first call panics");
			}
			Ok(())
		});

		assert_eq!(calls, 2);
		assert_eq!(report.failures[0].message, "first call panics");
		assert_eq!(report.invoked.len(), 1);
	}
}
