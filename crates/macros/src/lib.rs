//! Procedural macros for capreg.
//!
//! * `#[register(dyn Capability)]` - marks a type as an implementation of a capability

use proc_macro::TokenStream;

mod register;

/// Marks a concrete type as an implementation of a capability.
///
/// The attribute is the build-time signal read by `capreg-build`: the generated
/// registry unit of the crate lists the type under the named capability. The
/// type itself is left unchanged.
///
/// ```ignore
/// #[capreg::register(dyn Plugin)]
/// #[derive(Default)]
/// pub struct Greeter;
/// ```
///
/// The type must implement the capability and [`Default`], which is used as its
/// parameterless constructor. Attach the attribute once per capability to
/// register a type for several capabilities. Generic types are rejected.
///
/// The expansion also exports a constructor from the type's own module so that
/// generated units can reach types that are private to nested modules.
#[proc_macro_attribute]
pub fn register(attr: TokenStream, item: TokenStream) -> TokenStream {
	register::register(attr, item)
}
