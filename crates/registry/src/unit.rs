//! Generated registry units and the exported implementation table.
//!
//! Every crate built with `capreg-build` contributes at most one
//! [`RegistryUnit`], submitted to a link-time collection under its suffix
//! letter. Units never reference each other; the bootstrap chain walk is what
//! strings them together.

use std::any::Any;
use std::ops::RangeInclusive;

use crate::error::BootstrapError;
use crate::implementation::Implementation;
use crate::registry::Registry;

/// Prefix of the module emitted for every unit (`__capreg_unit_A`, ...).
pub const UNIT_PREFIX: &str = "__capreg_unit_";

/// File name of the generated unit inside `OUT_DIR`.
pub const UNIT_FILE: &str = "capreg_unit.rs";

/// Suffixes available to units, in chain order.
pub const SUFFIXES: RangeInclusive<char> = 'A'..='Z';

/// Init procedure of a generated unit.
pub type UnitInit = fn(&mut Registry) -> Result<(), BootstrapError>;

/// One crate's generated registrations.
#[derive(Debug, Clone, Copy)]
pub struct RegistryUnit {
	suffix: char,
	origin: &'static str,
	init: UnitInit,
}

impl RegistryUnit {
	pub const fn new(suffix: char, origin: &'static str, init: UnitInit) -> Self {
		Self { suffix, origin, init }
	}

	pub fn suffix(&self) -> char {
		self.suffix
	}

	/// Package that generated this unit.
	pub fn origin(&self) -> &'static str {
		self.origin
	}

	/// Name of the generated module, e.g. `__capreg_unit_B`.
	pub fn symbol(&self) -> String {
		format!("{UNIT_PREFIX}{}", self.suffix)
	}

	pub(crate) fn init(&self, registry: &mut Registry) -> Result<(), BootstrapError> {
		(self.init)(registry)
	}
}

inventory::collect!(RegistryUnit);

/// Implementation exported by the marker attribute from the type's own module.
///
/// Generated units use these for implementation types they cannot name from
/// the crate root.
#[derive(Debug)]
pub struct Exported {
	/// `module_path!()` of the declaring module joined with the type name.
	pub path: &'static str,
	/// A `&'static Implementation<dyn Capability>`.
	pub implementation: &'static (dyn Any + Send + Sync),
}

inventory::collect!(Exported);

/// Looks up the exported implementation of `C` declared at `path`.
pub fn exported<C: ?Sized + 'static>(path: &'static str) -> Result<Implementation<C>, BootstrapError> {
	resolve(inventory::iter::<Exported>, path)
}

pub(crate) fn resolve<'a, C: ?Sized + 'static>(
	entries: impl IntoIterator<Item = &'a Exported>,
	path: &'static str,
) -> Result<Implementation<C>, BootstrapError> {
	let mut seen = false;
	for entry in entries.into_iter().filter(|entry| entry.path == path) {
		seen = true;
		if let Some(implementation) = entry.implementation.downcast_ref::<Implementation<C>>() {
			return Ok(*implementation);
		}
	}

	if seen {
		Err(BootstrapError::CapabilityMismatch {
			path,
			capability: std::any::type_name::<C>(),
		})
	} else {
		Err(BootstrapError::Unresolved { path })
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	trait Codec {}
	trait Store {}

	#[derive(Default)]
	struct Json;
	impl Codec for Json {}

	#[derive(Default)]
	struct Disk;
	impl Store for Disk {}
	impl Codec for Disk {}

	static JSON: Implementation<dyn Codec> = crate::implementation!(dyn Codec => Json);
	static DISK_STORE: Implementation<dyn Store> = crate::implementation!(dyn Store => Disk);
	static DISK_CODEC: Implementation<dyn Codec> = crate::implementation!(dyn Codec => Disk);

	fn table() -> Vec<Exported> {
		vec![
			Exported {
				path: "app::codecs::Json",
				implementation: &JSON,
			},
			Exported {
				path: "app::disk::Disk",
				implementation: &DISK_STORE,
			},
			Exported {
				path: "app::disk::Disk",
				implementation: &DISK_CODEC,
			},
		]
	}

	#[test]
	fn resolves_by_path_and_capability() {
		let table = table();
		let codec = resolve::<dyn Codec>(&table, "app::codecs::Json").unwrap();
		assert!(codec.is::<Json>());

		let store = resolve::<dyn Store>(&table, "app::disk::Disk").unwrap();
		let codec = resolve::<dyn Codec>(&table, "app::disk::Disk").unwrap();
		assert!(store.is::<Disk>());
		assert!(codec.is::<Disk>());
	}

	#[test]
	fn missing_path_is_unresolved() {
		let table = table();
		let err = resolve::<dyn Codec>(&table, "app::codecs::Yaml").unwrap_err();
		assert_eq!(err, BootstrapError::Unresolved { path: "app::codecs::Yaml" });
	}

	#[test]
	fn wrong_capability_is_a_mismatch() {
		let table = table();
		let err = resolve::<dyn Store>(&table, "app::codecs::Json").unwrap_err();
		assert!(matches!(err, BootstrapError::CapabilityMismatch { path: "app::codecs::Json", .. }));
	}

	#[test]
	fn symbol_joins_prefix_and_suffix() {
		fn noop(_: &mut Registry) -> Result<(), BootstrapError> {
			Ok(())
		}
		let unit = RegistryUnit::new('C', "demo", noop);
		assert_eq!(unit.symbol(), "__capreg_unit_C");
		assert_eq!(unit.origin(), "demo");
	}
}
