//! Grouping markers by capability.

use indexmap::IndexMap;
use serde::Serialize;

use crate::error::{GenerateError, Result};
use crate::scan::Marker;

/// How the generated unit names an implementation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "path")]
pub enum ImplementationRef {
	/// Reachable from the crate root, referenced by path.
	Direct(String),
	/// Hidden behind private modules, looked up through the marker's export.
	Exported(String),
}

impl ImplementationRef {
	pub fn path(&self) -> &str {
		match self {
			Self::Direct(path) | Self::Exported(path) => path,
		}
	}
}

/// One implementation of a group and the `#[cfg(..)]` predicates it is
/// compiled under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Member {
	pub reference: ImplementationRef,
	#[serde(skip_serializing_if = "Vec::is_empty")]
	pub cfgs: Vec<String>,
}

impl Member {
	pub fn new(reference: ImplementationRef) -> Self {
		Self {
			reference,
			cfgs: Vec::new(),
		}
	}
}

/// All implementations of one capability in one crate, in encounter order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CapabilityGroup {
	pub capability: String,
	pub implementations: Vec<Member>,
}

/// Groups `markers` by capability, keeping first-seen order for both
/// capabilities and their implementations.
///
/// A type registered twice for the same capability is rejected.
pub fn group(markers: &[Marker]) -> Result<Vec<CapabilityGroup>> {
	let mut groups: IndexMap<&str, Vec<&Marker>> = IndexMap::new();

	for marker in markers {
		let members = groups.entry(marker.capability.as_str()).or_default();
		if members.iter().any(|m| m.implementation == marker.implementation) {
			return Err(GenerateError::Marker {
				location: marker.location.clone(),
				message: format!(
					"'{}' is already registered for '{}'",
					marker.implementation, marker.capability
				),
			});
		}
		members.push(marker);
	}

	Ok(groups
		.into_iter()
		.map(|(capability, members)| CapabilityGroup {
			capability: capability.to_string(),
			implementations: members
				.into_iter()
				.map(|m| Member {
					reference: if m.reachable {
						ImplementationRef::Direct(m.implementation.clone())
					} else {
						ImplementationRef::Exported(m.exported_as.clone())
					},
					cfgs: m.cfgs.clone(),
				})
				.collect(),
		})
		.collect())
}

#[cfg(test)]
mod tests {
	use std::path::PathBuf;

	use pretty_assertions::assert_eq;

	use super::*;
	use crate::error::Location;

	fn marker(implementation: &str, capability: &str, reachable: bool, line: usize) -> Marker {
		Marker {
			implementation: format!("crate::{implementation}"),
			exported_as: format!("demo::{implementation}"),
			capability: capability.to_string(),
			reachable,
			cfgs: Vec::new(),
			location: Location {
				file: PathBuf::from("src/lib.rs"),
				line,
				column: 0,
			},
		}
	}

	#[test]
	fn groups_in_first_seen_order() {
		let markers = [
			marker("a::First", "dyn crate::Plugin", true, 1),
			marker("b::Codec", "dyn crate::Codec", true, 2),
			marker("c::Hidden", "dyn crate::Plugin", false, 3),
			marker("Second", "dyn crate::Plugin", true, 4),
		];

		let groups = group(&markers).unwrap();
		assert_eq!(
			groups,
			vec![
				CapabilityGroup {
					capability: "dyn crate::Plugin".into(),
					implementations: vec![
						Member::new(ImplementationRef::Direct("crate::a::First".into())),
						Member::new(ImplementationRef::Exported("demo::c::Hidden".into())),
						Member::new(ImplementationRef::Direct("crate::Second".into())),
					],
				},
				CapabilityGroup {
					capability: "dyn crate::Codec".into(),
					implementations: vec![Member::new(ImplementationRef::Direct("crate::b::Codec".into()))],
				},
			]
		);
	}

	#[test]
	fn same_type_for_two_capabilities_is_fine() {
		let markers = [
			marker("Device", "dyn crate::Reader", true, 1),
			marker("Device", "dyn crate::Writer", true, 2),
		];
		assert_eq!(group(&markers).unwrap().len(), 2);
	}

	#[test]
	fn duplicate_registration_is_rejected() {
		let markers = [
			marker("Twice", "dyn crate::Plugin", true, 1),
			marker("Twice", "dyn crate::Plugin", true, 2),
		];
		let err = group(&markers).unwrap_err();
		let GenerateError::Marker { location, .. } = &err else {
			panic!("expected marker error, got {err:?}");
		};
		assert_eq!(location.line, 2);
	}

	#[test]
	fn members_keep_their_cfgs() {
		let mut gated = marker("Gated", "dyn crate::Plugin", false, 1);
		gated.cfgs = vec![r#"feature = "extra""#.into()];
		let markers = [gated, marker("Plain", "dyn crate::Plugin", true, 2)];

		let groups = group(&markers).unwrap();
		assert_eq!(
			groups[0].implementations,
			vec![
				Member {
					reference: ImplementationRef::Exported("demo::Gated".into()),
					cfgs: vec![r#"feature = "extra""#.into()],
				},
				Member::new(ImplementationRef::Direct("crate::Plain".into())),
			]
		);
	}

	#[test]
	fn no_markers_no_groups() {
		assert!(group(&[]).unwrap().is_empty());
	}
}
