//! Rendering and writing registry units.

use std::fs;
use std::path::Path;

use capreg::UNIT_PREFIX;
use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{Meta, Path as SynPath, Type};

use crate::error::{GenerateError, Result};
use crate::group::{CapabilityGroup, ImplementationRef};

const HEADER: &str = "// @generated by capreg-build. Do not edit.\n";

/// Renders the unit source for `groups` under `suffix`.
pub fn render_unit(suffix: char, origin: &str, groups: &[CapabilityGroup]) -> Result<String> {
	let module = format_ident!("{UNIT_PREFIX}{suffix}");

	let registrations = groups
		.iter()
		.map(render_group)
		.collect::<Result<Vec<TokenStream>>>()?;

	let tokens = quote! {
		#[doc(hidden)]
		#[allow(non_snake_case)]
		mod #module {
			pub(crate) fn init(
				registry: &mut ::capreg::Registry,
			) -> ::core::result::Result<(), ::capreg::BootstrapError> {
				#(#registrations)*
				::core::result::Result::Ok(())
			}
		}

		::capreg::inventory::submit! {
			::capreg::RegistryUnit::new(#suffix, #origin, #module::init)
		}
	};

	Ok(format!("{HEADER}{tokens}\n"))
}

/// Unit file for a crate without markers.
pub fn render_empty(origin: &str) -> String {
	format!("{HEADER}// {origin} declares no registered implementations.\n")
}

/// One `register` statement per run of members sharing the same cfgs, so
/// that gated implementations drop out together with their types.
fn render_group(group: &CapabilityGroup) -> Result<TokenStream> {
	let capability: Type = parse(&group.capability)?;
	let mut statements = Vec::new();

	for run in group.implementations.chunk_by(|a, b| a.cfgs == b.cfgs) {
		let guard = render_cfg(run.first().map(|m| m.cfgs.as_slice()).unwrap_or_default())?;
		let implementations = run
			.iter()
			.map(|member| render_reference(&capability, &member.reference))
			.collect::<Result<Vec<_>>>()?;
		statements.push(quote! {
			#guard
			registry.register::<#capability>([#(#implementations),*]);
		});
	}

	Ok(quote!(#(#statements)*))
}

fn render_reference(capability: &Type, reference: &ImplementationRef) -> Result<TokenStream> {
	match reference {
		ImplementationRef::Direct(path) => {
			let path: SynPath = parse(path)?;
			Ok(quote!(::capreg::implementation!(#capability => #path)))
		}
		ImplementationRef::Exported(path) => Ok(quote!(::capreg::exported::<#capability>(#path)?)),
	}
}

fn render_cfg(cfgs: &[String]) -> Result<TokenStream> {
	let predicates = cfgs.iter().map(|cfg| parse::<Meta>(cfg)).collect::<Result<Vec<_>>>()?;
	Ok(match predicates.as_slice() {
		[] => TokenStream::new(),
		[only] => quote!(#[cfg(#only)]),
		all => quote!(#[cfg(all(#(#all),*))]),
	})
}

fn parse<T: syn::parse::Parse>(text: &str) -> Result<T> {
	syn::parse_str(text).map_err(|error| GenerateError::Render {
		text: text.to_string(),
		error,
	})
}

/// Writes `contents` to `path` through a temporary sibling file, leaving an
/// identical existing file untouched.
pub fn write_atomic(path: &Path, contents: &str) -> Result<bool> {
	let io = |error: std::io::Error| GenerateError::Io {
		path: path.to_path_buf(),
		error,
	};

	if fs::read_to_string(path).is_ok_and(|existing| existing == contents) {
		return Ok(false);
	}
	if let Some(parent) = path.parent() {
		fs::create_dir_all(parent).map_err(io)?;
	}
	let tmp = path.with_extension("rs.tmp");
	fs::write(&tmp, contents).map_err(io)?;
	fs::rename(&tmp, path).map_err(io)?;
	Ok(true)
}
