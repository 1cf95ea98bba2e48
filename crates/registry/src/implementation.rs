use std::any::TypeId;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use crate::error::InstantiateError;

/// A registered implementation of the capability `C`.
///
/// Holds plain function pointers, so handles are `Copy` and can live in
/// statics emitted by the marker attribute. `C` is normally a trait object
/// type such as `dyn Plugin`.
pub struct Implementation<C: ?Sized + 'static> {
	type_name: fn() -> &'static str,
	type_id: fn() -> TypeId,
	construct: fn() -> Box<C>,
}

impl<C: ?Sized + 'static> Implementation<C> {
	/// Creates a handle from its parts. Prefer [`implementation!`](crate::implementation).
	pub const fn new(type_name: fn() -> &'static str, type_id: fn() -> TypeId, construct: fn() -> Box<C>) -> Self {
		Self {
			type_name,
			type_id,
			construct,
		}
	}

	/// Fully qualified name of the implementation type.
	pub fn name(&self) -> &'static str {
		(self.type_name)()
	}

	/// [`TypeId`] of the implementation type (not of the capability).
	pub fn type_id(&self) -> TypeId {
		(self.type_id)()
	}

	/// Returns true if this handle constructs `T`.
	pub fn is<T: 'static>(&self) -> bool {
		self.type_id() == TypeId::of::<T>()
	}

	/// Constructs a fresh instance. Panics raised by the constructor propagate.
	pub fn instantiate(&self) -> Box<C> {
		(self.construct)()
	}

	/// Constructs a fresh instance, converting a constructor panic into an error.
	pub fn try_instantiate(&self) -> Result<Box<C>, InstantiateError> {
		panic::catch_unwind(AssertUnwindSafe(self.construct)).map_err(|payload| InstantiateError {
			type_name: self.name(),
			message: panic_message(payload.as_ref()),
		})
	}
}

impl<C: ?Sized + 'static> Clone for Implementation<C> {
	fn clone(&self) -> Self {
		*self
	}
}

impl<C: ?Sized + 'static> Copy for Implementation<C> {}

impl<C: ?Sized + 'static> PartialEq for Implementation<C> {
	fn eq(&self, other: &Self) -> bool {
		self.type_id() == other.type_id()
	}
}

impl<C: ?Sized + 'static> Eq for Implementation<C> {}

impl<C: ?Sized + 'static> fmt::Debug for Implementation<C> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("Implementation").field(&self.name()).finish()
	}
}

pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
	if let Some(message) = payload.downcast_ref::<&'static str>() {
		(*message).to_string()
	} else if let Some(message) = payload.downcast_ref::<String>() {
		message.clone()
	} else {
		"non-string panic payload".to_string()
	}
}
