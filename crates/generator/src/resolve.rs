//! Module-scope path resolution.
//!
//! Generated units live at the crate root, so every path written inside a
//! marker has to be rewritten into a form that means the same thing from
//! there: `crate::...` for items of this crate and `::dep::...` for items of
//! other crates.

use std::collections::{HashMap, HashSet};

use quote::ToTokens;
use syn::{GenericArgument, Item, PathArguments, Type, TypeParamBound, UseTree};

/// Names that mean the same thing at the crate root as anywhere else.
const PRELUDE: &[&str] = &[
	"Send", "Sync", "Unpin", "Sized", "Box", "String", "Vec", "Option", "Result", "Fn", "FnMut", "FnOnce", "Iterator",
	"ToString", "ToOwned", "Clone", "Default", "bool", "char", "str", "u8", "u16", "u32", "u64", "u128", "usize", "i8",
	"i16", "i32", "i64", "i128", "isize", "f32", "f64",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ResolveError {
	Unresolved { name: String, globs: bool },
	TooManySupers,
	SelfType,
	Unsupported(String),
}

impl std::fmt::Display for ResolveError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Unresolved { name, globs: false } => {
				write!(f, "'{name}' is neither imported nor declared in this module")
			}
			Self::Unresolved { name, globs: true } => write!(
				f,
				"'{name}' is neither imported nor declared in this module (glob imports are not followed, use a qualified path)"
			),
			Self::TooManySupers => write!(f, "'super' goes above the crate root"),
			Self::SelfType => write!(f, "'Self' cannot name a capability"),
			Self::Unsupported(what) => write!(f, "unsupported capability form: {what}"),
		}
	}
}

/// A path anchored at the crate root or at an extern crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Canonical {
	Crate(Vec<String>),
	Extern(Vec<String>),
}

impl Canonical {
	fn join(&self, rest: &[String]) -> Self {
		match self {
			Self::Crate(segments) => Self::Crate(segments.iter().chain(rest).cloned().collect()),
			Self::Extern(segments) => Self::Extern(segments.iter().chain(rest).cloned().collect()),
		}
	}

	fn render(&self) -> String {
		match self {
			Self::Crate(segments) => std::iter::once("crate")
				.chain(segments.iter().map(String::as_str))
				.collect::<Vec<_>>()
				.join("::"),
			Self::Extern(segments) => format!("::{}", segments.join("::")),
		}
	}
}

/// Names visible in one module: its imports and its own items.
#[derive(Debug, Default)]
pub(crate) struct Scope {
	imports: HashMap<String, Canonical>,
	locals: HashSet<String>,
	globs: bool,
}

impl Scope {
	pub(crate) fn collect(items: &[Item], module: &[String]) -> Self {
		let mut scope = Scope::default();
		for item in items {
			let ident = match item {
				Item::Struct(i) => &i.ident,
				Item::Enum(i) => &i.ident,
				Item::Union(i) => &i.ident,
				Item::Trait(i) => &i.ident,
				Item::TraitAlias(i) => &i.ident,
				Item::Type(i) => &i.ident,
				Item::Mod(i) => &i.ident,
				_ => continue,
			};
			scope.locals.insert(ident.to_string());
		}

		for item in items {
			if let Item::Use(item) = item {
				let mut flat = Vec::new();
				flatten(&item.tree, Vec::new(), &mut flat, &mut scope.globs);
				for (alias, path) in flat {
					if let Ok(canonical) = scope.anchor(&path, item.leading_colon.is_some(), module) {
						scope.imports.insert(alias, canonical);
					}
				}
			}
		}
		scope
	}

	/// Anchors a written path, resolving its first segment in this scope.
	fn anchor(&self, names: &[String], leading_colon: bool, module: &[String]) -> Result<Canonical, ResolveError> {
		if leading_colon {
			return Ok(Canonical::Extern(names.to_vec()));
		}
		let Some((first, rest)) = names.split_first() else {
			return Err(ResolveError::Unsupported("empty path".into()));
		};

		match first.as_str() {
			"crate" => return Ok(Canonical::Crate(rest.to_vec())),
			"self" => return Ok(Canonical::Crate(module.to_vec()).join(rest)),
			"super" => {
				let supers = names.iter().take_while(|n| *n == "super").count();
				if supers > module.len() {
					return Err(ResolveError::TooManySupers);
				}
				let base = Canonical::Crate(module[..module.len() - supers].to_vec());
				return Ok(base.join(&names[supers..]));
			}
			"Self" => return Err(ResolveError::SelfType),
			_ => {}
		}

		if let Some(import) = self.imports.get(first) {
			return Ok(import.join(rest));
		}
		if self.locals.contains(first) {
			return Ok(Canonical::Crate(module.to_vec()).join(names));
		}
		if !rest.is_empty() {
			return Ok(Canonical::Extern(names.to_vec()));
		}
		Err(ResolveError::Unresolved {
			name: first.clone(),
			globs: self.globs,
		})
	}

	/// Renders `path` so that it means the same thing at the crate root.
	pub(crate) fn render_path(&self, path: &syn::Path, module: &[String]) -> Result<String, ResolveError> {
		let names: Vec<String> = path.segments.iter().map(|s| s.ident.to_string()).collect();

		let base = match (path.leading_colon, names.as_slice()) {
			(None, [single]) if PRELUDE.contains(&single.as_str()) && !self.shadows(single) => single.clone(),
			_ => self.anchor(&names, path.leading_colon.is_some(), module)?.render(),
		};

		let args = match path.segments.last().map(|s| &s.arguments) {
			None | Some(PathArguments::None) => String::new(),
			Some(PathArguments::AngleBracketed(angle)) => {
				let args = angle
					.args
					.iter()
					.map(|arg| match arg {
						GenericArgument::Type(ty) => self.render_type(ty, module),
						GenericArgument::AssocType(assoc) => {
							Ok(format!("{} = {}", assoc.ident, self.render_type(&assoc.ty, module)?))
						}
						other => Ok(other.to_token_stream().to_string()),
					})
					.collect::<Result<Vec<_>, _>>()?;
				format!("<{}>", args.join(", "))
			}
			Some(PathArguments::Parenthesized(args)) => args.to_token_stream().to_string(),
		};

		Ok(format!("{base}{args}"))
	}

	pub(crate) fn render_type(&self, ty: &Type, module: &[String]) -> Result<String, ResolveError> {
		match ty {
			Type::Path(tp) if tp.qself.is_none() => self.render_path(&tp.path, module),
			Type::TraitObject(object) => {
				let bounds = object
					.bounds
					.iter()
					.map(|bound| match bound {
						TypeParamBound::Trait(tb) if tb.lifetimes.is_none() => self.render_path(&tb.path, module),
						other => Ok(other.to_token_stream().to_string()),
					})
					.collect::<Result<Vec<_>, _>>()?;
				Ok(format!("dyn {}", bounds.join(" + ")))
			}
			other => Ok(other.to_token_stream().to_string()),
		}
	}

	/// Renders a marker argument as a trait object type.
	pub(crate) fn render_capability(&self, ty: &Type, module: &[String]) -> Result<String, ResolveError> {
		match ty {
			Type::TraitObject(_) => self.render_type(ty, module),
			Type::Path(tp) if tp.qself.is_none() => Ok(format!("dyn {}", self.render_path(&tp.path, module)?)),
			other => Err(ResolveError::Unsupported(other.to_token_stream().to_string())),
		}
	}

	/// Whether an attribute path names `capreg::register` in this scope.
	///
	/// A qualified `capreg::register` always does. A bare or renamed name only
	/// does when it was imported from `capreg`; other crates' `register`
	/// attributes are left alone.
	pub(crate) fn names_marker(&self, path: &syn::Path, module: &[String]) -> bool {
		let names: Vec<String> = path.segments.iter().map(|s| s.ident.to_string()).collect();
		if matches!(names.as_slice(), [krate, name] if krate == "capreg" && name == "register") {
			return true;
		}
		let marker = Canonical::Extern(vec!["capreg".into(), "register".into()]);
		self.anchor(&names, path.leading_colon.is_some(), module)
			.is_ok_and(|canonical| canonical == marker)
	}

	fn shadows(&self, name: &str) -> bool {
		self.imports.contains_key(name) || self.locals.contains(name)
	}
}

/// Flattens a use tree into `(alias, path)` pairs.
fn flatten(tree: &UseTree, prefix: Vec<String>, out: &mut Vec<(String, Vec<String>)>, globs: &mut bool) {
	match tree {
		UseTree::Path(p) => {
			let mut prefix = prefix;
			prefix.push(p.ident.to_string());
			flatten(&p.tree, prefix, out, globs);
		}
		UseTree::Name(n) if n.ident == "self" => {
			if let Some(last) = prefix.last() {
				out.push((last.clone(), prefix.clone()));
			}
		}
		UseTree::Name(n) => {
			let mut path = prefix;
			path.push(n.ident.to_string());
			out.push((n.ident.to_string(), path));
		}
		UseTree::Rename(r) if r.rename == "_" => {}
		UseTree::Rename(r) => {
			let mut path = prefix;
			if r.ident != "self" {
				path.push(r.ident.to_string());
			}
			out.push((r.rename.to_string(), path));
		}
		UseTree::Glob(_) => *globs = true,
		UseTree::Group(g) => {
			for tree in &g.items {
				flatten(tree, prefix.clone(), out, globs);
			}
		}
	}
}
