//! Source scanning for capability markers.
//!
//! Walks the module tree of one crate the way rustc lays it out on disk
//! (`foo.rs`, `foo/mod.rs`, `#[path]`, inline modules) and records every
//! `#[register(...)]` marker together with what the generated unit needs to
//! know about it: the capability as seen from the crate root, and whether the
//! implementation type can be named from there.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use syn::spanned::Spanned;
use syn::{Attribute, Expr, ExprLit, Generics, Ident, Item, ItemMod, Lit, Meta, Type, Visibility};
use tracing::debug;

use crate::error::{GenerateError, Location, Result};
use crate::resolve::Scope;

/// One `#[register(...)]` occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Marker {
	/// Path of the type from the crate root, e.g. `crate::plugins::Greeter`.
	pub implementation: String,
	/// `module_path!()`-style path the marker exports the type under.
	pub exported_as: String,
	/// Capability as a trait object type nameable from the crate root.
	pub capability: String,
	/// Whether the crate root can name the implementation type.
	pub reachable: bool,
	/// `#[cfg(..)]` predicates of enclosing modules and the item, outermost first.
	#[serde(skip_serializing_if = "Vec::is_empty")]
	pub cfgs: Vec<String>,
	pub location: Location,
}

/// Everything found in one crate.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Scan {
	/// Markers in encounter order.
	pub markers: Vec<Marker>,
	/// Every source file read.
	pub files: Vec<PathBuf>,
}

/// Options for [`scan_crate`].
#[derive(Debug, Clone)]
pub struct ScanOptions<'a> {
	/// Name `module_path!()` reports for the crate root.
	pub crate_name: &'a str,
	/// Crate root files, usually `src/lib.rs` or `src/main.rs`.
	pub roots: &'a [PathBuf],
	/// Descend into `#[cfg(test)]` modules.
	pub include_test_modules: bool,
}

/// Scans the crate rooted at `options.roots`.
pub fn scan_crate(options: &ScanOptions<'_>) -> Result<Scan> {
	let mut walker = Walker {
		crate_name: options.crate_name,
		include_test_modules: options.include_test_modules,
		scan: Scan::default(),
	};

	for root in options.roots {
		let dir = root.parent().map(Path::to_path_buf).unwrap_or_default();
		let module = ModuleCtx {
			segments: Vec::new(),
			reachable: true,
			cfgs: Vec::new(),
		};
		walker.file(root, &module, &dir)?;
	}

	debug!(
		crate_name = options.crate_name,
		files = walker.scan.files.len(),
		markers = walker.scan.markers.len(),
		"scanned crate"
	);
	Ok(walker.scan)
}

/// `#[capreg::register(...)]`, or `register` imported from `capreg` under any name.
fn is_marker(attr: &Attribute, scope: &Scope, module: &ModuleCtx) -> bool {
	scope.names_marker(attr.path(), &module.segments)
}

struct ModuleCtx {
	segments: Vec<String>,
	reachable: bool,
	cfgs: Vec<String>,
}

impl ModuleCtx {
	fn child(&self, name: String, vis: &Visibility, attrs: &[Attribute]) -> Self {
		let reachable = self.reachable && visible_from_root(vis, self.segments.len());
		let mut segments = self.segments.clone();
		segments.push(name);
		let mut cfgs = self.cfgs.clone();
		cfgs.extend(cfg_predicates(attrs));
		Self {
			segments,
			reachable,
			cfgs,
		}
	}
}

struct Walker<'a> {
	crate_name: &'a str,
	include_test_modules: bool,
	scan: Scan,
}

impl Walker<'_> {
	/// `dir` is where `mod foo;` declarations in this file are looked up.
	fn file(&mut self, path: &Path, module: &ModuleCtx, dir: &Path) -> Result<()> {
		let source = fs::read_to_string(path).map_err(|error| GenerateError::Io {
			path: path.to_path_buf(),
			error,
		})?;
		let file = syn::parse_file(&source).map_err(|error| GenerateError::Parse {
			path: path.to_path_buf(),
			error,
		})?;
		self.scan.files.push(path.to_path_buf());
		self.items(&file.items, module, path, dir, false)
	}

	fn items(&mut self, items: &[Item], module: &ModuleCtx, file: &Path, dir: &Path, inline: bool) -> Result<()> {
		let scope = Scope::collect(items, &module.segments);

		for item in items {
			match item {
				Item::Struct(s) => self.type_markers(&s.attrs, &s.ident, &s.vis, &s.generics, module, &scope, file)?,
				Item::Enum(e) => self.type_markers(&e.attrs, &e.ident, &e.vis, &e.generics, module, &scope, file)?,
				Item::Mod(m) => {
					reject_markers(&m.attrs, &scope, module, file)?;
					self.module(m, module, file, dir, inline)?;
				}
				other => {
					if let Some(attrs) = item_attrs(other) {
						reject_markers(attrs, &scope, module, file)?;
					}
				}
			}
		}
		Ok(())
	}

	fn module(&mut self, m: &ItemMod, parent: &ModuleCtx, file: &Path, dir: &Path, inline: bool) -> Result<()> {
		if !self.include_test_modules && is_cfg_test(&m.attrs) {
			debug!(module = %m.ident, "skipping test module");
			return Ok(());
		}

		let name = m.ident.to_string();
		let child = parent.child(name.clone(), &m.vis, &m.attrs);
		let file_name = name.strip_prefix("r#").unwrap_or(&name).to_string();

		if let Some((_, items)) = &m.content {
			let dir = match path_attr(&m.attrs) {
				Some(path) => dir.join(path),
				None => dir.join(&file_name),
			};
			return self.items(items, &child, file, &dir, true);
		}

		let candidates = match path_attr(&m.attrs) {
			Some(path) if inline => vec![dir.join(path)],
			Some(path) => vec![file.parent().unwrap_or(Path::new("")).join(path)],
			None => vec![dir.join(format!("{file_name}.rs")), dir.join(&file_name).join("mod.rs")],
		};

		let Some(found) = candidates.iter().find(|path| path.is_file()) else {
			if has_cfg(&m.attrs) {
				debug!(module = %name, "conditionally compiled module has no source file, skipping");
				return Ok(());
			}
			return Err(GenerateError::MissingModule {
				declared_in: file.to_path_buf(),
				module: name,
				candidates: candidates
					.iter()
					.map(|p| p.display().to_string())
					.collect::<Vec<_>>()
					.join(", "),
			});
		};

		let is_mod_rs = found.file_name().is_some_and(|n| n == "mod.rs") || path_attr(&m.attrs).is_some();
		let child_dir = if is_mod_rs {
			found.parent().map(Path::to_path_buf).unwrap_or_default()
		} else {
			dir.join(&file_name)
		};
		self.file(found, &child, &child_dir)
	}

	#[allow(clippy::too_many_arguments, reason = "flat walker state")]
	fn type_markers(
		&mut self,
		attrs: &[Attribute],
		ident: &Ident,
		vis: &Visibility,
		generics: &Generics,
		module: &ModuleCtx,
		scope: &Scope,
		file: &Path,
	) -> Result<()> {
		if !self.include_test_modules && is_cfg_test(attrs) {
			return Ok(());
		}

		for attr in attrs.iter().filter(|a| is_marker(a, scope, module)) {
			let location = location(file, attr);

			if !generics.params.is_empty() {
				return Err(GenerateError::Marker {
					location,
					message: format!("registered type '{ident}' must not be generic"),
				});
			}

			let written: Type = attr.parse_args().map_err(|e| GenerateError::Marker {
				location: location.clone(),
				message: format!("expected #[register(dyn Capability)]: {e}"),
			})?;

			let capability =
				scope
					.render_capability(&written, &module.segments)
					.map_err(|reason| GenerateError::UnresolvedCapability {
						location: location.clone(),
						capability: quote::quote!(#written).to_string(),
						reason: reason.to_string(),
					})?;

			let mut path = module.segments.clone();
			path.push(ident.to_string());
			let mut cfgs = module.cfgs.clone();
			cfgs.extend(cfg_predicates(attrs));

			let marker = Marker {
				implementation: format!("crate::{}", path.join("::")),
				exported_as: format!("{}::{}", self.crate_name, path.join("::")),
				capability,
				reachable: module.reachable && visible_from_root(vis, module.segments.len()),
				cfgs,
				location,
			};
			debug!(
				implementation = %marker.implementation,
				capability = %marker.capability,
				reachable = marker.reachable,
				"found marker"
			);
			self.scan.markers.push(marker);
		}
		Ok(())
	}
}

/// Whether an item with `vis`, declared in a module `depth` levels below the
/// root, can be named from the crate root.
fn visible_from_root(vis: &Visibility, depth: usize) -> bool {
	match vis {
		Visibility::Public(_) => true,
		Visibility::Inherited => depth == 0,
		Visibility::Restricted(restricted) => {
			let segments: Vec<String> = restricted.path.segments.iter().map(|s| s.ident.to_string()).collect();
			match segments.as_slice() {
				[only] if only == "crate" => true,
				[only] if only == "self" => depth == 0,
				[only] if only == "super" => depth <= 1,
				_ => false,
			}
		}
	}
}

fn reject_markers(attrs: &[Attribute], scope: &Scope, module: &ModuleCtx, file: &Path) -> Result<()> {
	match attrs.iter().find(|a| is_marker(a, scope, module)) {
		Some(attr) => Err(GenerateError::Marker {
			location: location(file, attr),
			message: "#[register] can only be attached to a struct or enum".into(),
		}),
		None => Ok(()),
	}
}

fn item_attrs(item: &Item) -> Option<&[Attribute]> {
	let attrs = match item {
		Item::Const(i) => &i.attrs,
		Item::Fn(i) => &i.attrs,
		Item::Impl(i) => &i.attrs,
		Item::Static(i) => &i.attrs,
		Item::Trait(i) => &i.attrs,
		Item::TraitAlias(i) => &i.attrs,
		Item::Type(i) => &i.attrs,
		Item::Union(i) => &i.attrs,
		Item::Use(i) => &i.attrs,
		_ => return None,
	};
	Some(attrs)
}

fn location(file: &Path, attr: &Attribute) -> Location {
	let start = attr.span().start();
	Location {
		file: file.to_path_buf(),
		line: start.line,
		column: start.column,
	}
}

fn is_cfg_test(attrs: &[Attribute]) -> bool {
	cfg_predicates(attrs).iter().any(|predicate| predicate == "test")
}

/// The predicate of every `#[cfg(..)]` on an item, as written.
fn cfg_predicates(attrs: &[Attribute]) -> Vec<String> {
	attrs
		.iter()
		.filter(|attr| attr.path().is_ident("cfg"))
		.filter_map(|attr| match &attr.meta {
			Meta::List(list) => Some(list.tokens.to_string()),
			_ => None,
		})
		.collect()
}

fn has_cfg(attrs: &[Attribute]) -> bool {
	attrs.iter().any(|attr| attr.path().is_ident("cfg"))
}

fn path_attr(attrs: &[Attribute]) -> Option<PathBuf> {
	attrs.iter().find(|a| a.path().is_ident("path")).and_then(|attr| match &attr.meta {
		Meta::NameValue(nv) => match &nv.value {
			Expr::Lit(ExprLit { lit: Lit::Str(s), .. }) => Some(PathBuf::from(s.value())),
			_ => None,
		},
		_ => None,
	})
}
