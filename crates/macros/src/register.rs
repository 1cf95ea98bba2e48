//! `#[register(...)]` marker implementation.

use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::quote;
use syn::{Attribute, Generics, Ident, Item, Type, parse_macro_input, parse_quote};

/// Normalizes the marker argument to a trait object type.
///
/// Accepts `dyn Capability` and the bare `Capability` shorthand.
fn capability_type(attr: TokenStream) -> syn::Result<Type> {
	if attr.is_empty() {
		return Err(syn::Error::new(
			Span::call_site(),
			"missing capability: expected #[register(dyn Capability)]",
		));
	}

	let ty: Type = syn::parse(attr)?;
	match ty {
		Type::TraitObject(_) => Ok(ty),
		Type::Path(path) if path.qself.is_none() => Ok(parse_quote!(dyn #path)),
		other => Err(syn::Error::new_spanned(
			other,
			"capability must be a trait, written as `dyn Trait` or `Trait`",
		)),
	}
}

fn concrete_target(item: &Item) -> syn::Result<(&Ident, &Generics, &[Attribute])> {
	match item {
		Item::Struct(s) => Ok((&s.ident, &s.generics, &s.attrs)),
		Item::Enum(e) => Ok((&e.ident, &e.generics, &e.attrs)),
		other => Err(syn::Error::new_spanned(
			other,
			"#[register] can only be attached to a struct or enum",
		)),
	}
}

pub fn register(attr: TokenStream, item: TokenStream) -> TokenStream {
	let input = parse_macro_input!(item as Item);

	let capability = match capability_type(attr) {
		Ok(capability) => capability,
		Err(e) => return e.to_compile_error().into(),
	};

	let (ident, generics, attrs) = match concrete_target(&input) {
		Ok(target) => target,
		Err(e) => return e.to_compile_error().into(),
	};

	if !generics.params.is_empty() {
		return syn::Error::new_spanned(generics, "registered types must not be generic")
			.to_compile_error()
			.into();
	}

	let name = ident.to_string();
	// The export must disappear with the type when it is configured out.
	let cfgs = attrs.iter().filter(|attr| attr.path().is_ident("cfg"));

	quote! {
		#input

		#(#cfgs)*
		const _: () = {
			static __CAPREG_IMPLEMENTATION: ::capreg::Implementation<#capability> =
				::capreg::implementation!(#capability => #ident);

			::capreg::inventory::submit! {
				::capreg::Exported {
					path: ::core::concat!(::core::module_path!(), "::", #name),
					implementation: &__CAPREG_IMPLEMENTATION,
				}
			}
		};
	}
	.into()
}
