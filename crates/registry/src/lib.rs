//! Build-time capability registry.
//!
//! Crates mark implementation types with [`register`], a build script driven
//! by `capreg-build` collects those markers into one generated *registry unit*
//! per crate, and the process-wide [`Registry`] chains every linked unit
//! together on first use:
//!
//! ```ignore
//! // in a plugin crate
//! #[capreg::register(dyn Plugin)]
//! #[derive(Default)]
//! pub struct Greeter;
//!
//! capreg::include_unit!();
//!
//! // anywhere in the final binary
//! for implementation in capreg::find::<dyn Plugin>() {
//!     implementation.instantiate().start();
//! }
//! ```
//!
//! Units carry a single-letter suffix. Bootstrap walks suffixes from `'A'`
//! upward and stops at the first letter with no linked unit, so the whole
//! registry is assembled without a manifest and without scanning anything at
//! runtime.

mod bootstrap;
mod consumer;
mod error;
mod global;
mod implementation;
mod registry;
mod unit;

pub use bootstrap::{BootstrapReport, UnitSummary};
pub use capreg_macros::register;
pub use consumer::{ConsumeReport, ConsumerFailure, FailureStage, instantiate_all};
pub use error::{BootstrapError, InstantiateError};
pub use global::{bootstrap_report, find, register, try_find, try_register};
pub use implementation::Implementation;
pub use registry::Registry;
pub use unit::{Exported, RegistryUnit, SUFFIXES, UNIT_FILE, UNIT_PREFIX, exported};

#[doc(hidden)]
pub use inventory;

/// Builds an [`Implementation`] for a concrete type.
///
/// The type is constructed through [`Default`] and boxed as the capability:
///
/// ```ignore
/// capreg::register::<dyn Logger>([capreg::implementation!(dyn Logger => FileLogger)]);
/// ```
#[macro_export]
macro_rules! implementation {
	($capability:ty => $implementation:ty) => {
		$crate::Implementation::<$capability>::new(
			::core::any::type_name::<$implementation>,
			::core::any::TypeId::of::<$implementation>,
			|| -> ::std::boxed::Box<$capability> {
				::std::boxed::Box::new(<$implementation as ::core::default::Default>::default())
			},
		)
	};
}

/// Includes the registry unit generated for the current crate.
///
/// Place this once at the crate root of every crate whose build script calls
/// `capreg_build::build()`. Crates without markers include an empty unit.
#[macro_export]
macro_rules! include_unit {
	() => {
		::core::include!(::core::concat!(::core::env!("OUT_DIR"), "/capreg_unit.rs"));
	};
}
