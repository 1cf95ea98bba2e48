use std::any::{Any, TypeId, type_name};
use std::fmt;

use rustc_hash::FxHashMap;

use crate::bootstrap::{self, BootstrapReport};
use crate::error::BootstrapError;
use crate::implementation::Implementation;
use crate::unit::RegistryUnit;

/// Mapping from capability type to its ordered implementations.
///
/// Lists are append-only: a capability, once registered, is never removed and
/// its implementations are never reordered. The value performs no locking of
/// its own; the process-wide instance behind [`crate::find`] wraps it in a
/// lock.
#[derive(Default)]
pub struct Registry {
	entries: FxHashMap<TypeId, Entry>,
	order: Vec<TypeId>,
}

struct Entry {
	capability: &'static str,
	len: usize,
	/// `Vec<Implementation<C>>` for the capability keyed by this entry.
	implementations: Box<dyn Any + Send + Sync>,
}

impl Registry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a registry populated from every unit linked into the binary.
	pub fn bootstrap() -> Result<(Self, BootstrapReport), BootstrapError> {
		Self::bootstrap_from(inventory::iter::<RegistryUnit>)
	}

	/// Creates a registry populated by chaining the given units.
	pub fn bootstrap_from<'a>(
		units: impl IntoIterator<Item = &'a RegistryUnit>,
	) -> Result<(Self, BootstrapReport), BootstrapError> {
		let mut registry = Self::new();
		let report = bootstrap::walk(&mut registry, units)?;
		Ok((registry, report))
	}

	/// Appends implementations of `C`, creating the capability if absent.
	pub fn register<C: ?Sized + 'static>(&mut self, implementations: impl IntoIterator<Item = Implementation<C>>) {
		let key = TypeId::of::<C>();
		let entry = self.entries.entry(key).or_insert_with(|| {
			self.order.push(key);
			Entry {
				capability: type_name::<C>(),
				len: 0,
				implementations: Box::new(Vec::<Implementation<C>>::new()),
			}
		});

		let capability = entry.capability;
		let Some(list) = entry.implementations.downcast_mut::<Vec<Implementation<C>>>() else {
			unreachable!("registry entry for {capability} holds a foreign list");
		};
		list.extend(implementations);
		entry.len = list.len();
	}

	/// Implementations of `C` in registration order; empty if none were registered.
	pub fn find<C: ?Sized + 'static>(&self) -> &[Implementation<C>] {
		self.entries
			.get(&TypeId::of::<C>())
			.and_then(|entry| entry.implementations.downcast_ref::<Vec<Implementation<C>>>())
			.map(Vec::as_slice)
			.unwrap_or(&[])
	}

	/// Returns true once `C` has been registered, even with an empty list.
	pub fn contains<C: ?Sized + 'static>(&self) -> bool {
		self.entries.contains_key(&TypeId::of::<C>())
	}

	/// Names of registered capabilities in first-registration order.
	pub fn capabilities(&self) -> impl Iterator<Item = &'static str> + '_ {
		self.order.iter().filter_map(|key| self.entries.get(key)).map(|entry| entry.capability)
	}

	/// Number of registered capabilities.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Total number of implementations across all capabilities.
	pub fn registrations(&self) -> usize {
		self.entries.values().map(|entry| entry.len).sum()
	}
}

impl fmt::Debug for Registry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut map = f.debug_map();
		for key in &self.order {
			if let Some(entry) = self.entries.get(key) {
				map.entry(&entry.capability, &entry.len);
			}
		}
		map.finish()
	}
}

#[cfg(test)]
mod tests;
