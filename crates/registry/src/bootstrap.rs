//! Bootstrap chain walk.

use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use crate::error::BootstrapError;
use crate::registry::Registry;
use crate::unit::{RegistryUnit, SUFFIXES};

/// Outcome of one bootstrap chain walk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BootstrapReport {
	/// Units whose init ran, in chain order.
	pub initialized: Vec<UnitSummary>,
	/// First suffix without a unit; `None` if every suffix was taken.
	pub stopped_at: Option<char>,
	/// Linked units past the first gap. Their registrations are missing.
	pub unreachable: Vec<UnitSummary>,
}

/// A unit seen during bootstrap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitSummary {
	pub suffix: char,
	pub symbol: String,
	pub origin: &'static str,
	/// Implementations the unit appended; zero for unreachable units.
	pub registrations: usize,
}

impl UnitSummary {
	fn new(unit: &RegistryUnit, registrations: usize) -> Self {
		Self {
			suffix: unit.suffix(),
			symbol: unit.symbol(),
			origin: unit.origin(),
			registrations,
		}
	}
}

/// Invokes unit inits from `'A'` upward until the first missing suffix.
pub(crate) fn walk<'a>(
	registry: &mut Registry,
	units: impl IntoIterator<Item = &'a RegistryUnit>,
) -> Result<BootstrapReport, BootstrapError> {
	let mut by_suffix: BTreeMap<char, &RegistryUnit> = BTreeMap::new();
	for unit in units {
		if let Some(existing) = by_suffix.insert(unit.suffix(), unit) {
			return Err(BootstrapError::DuplicateSuffix {
				suffix: unit.suffix(),
				first: existing.origin(),
				second: unit.origin(),
			});
		}
	}

	let mut report = BootstrapReport::default();
	for suffix in SUFFIXES {
		let Some(unit) = by_suffix.remove(&suffix) else {
			report.stopped_at = Some(suffix);
			break;
		};

		debug!(unit = %unit.symbol(), origin = unit.origin(), "initializing registry unit");
		let before = registry.registrations();
		unit.init(registry).map_err(|source| BootstrapError::Unit {
			symbol: unit.symbol(),
			origin: unit.origin(),
			source: Box::new(source),
		})?;
		report.initialized.push(UnitSummary::new(unit, registry.registrations() - before));
	}

	for unit in by_suffix.into_values() {
		warn!(
			unit = %unit.symbol(),
			origin = unit.origin(),
			stopped_at = ?report.stopped_at,
			"registry unit is unreachable: the suffix chain has a gap"
		);
		report.unreachable.push(UnitSummary::new(unit, 0));
	}

	info!(
		units = report.initialized.len(),
		capabilities = registry.len(),
		registrations = registry.registrations(),
		"capability registry bootstrapped"
	);
	Ok(report)
}
