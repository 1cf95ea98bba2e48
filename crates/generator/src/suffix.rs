//! Suffix allocation.
//!
//! A crate cannot see which units exist elsewhere in the final binary, only
//! what its direct dependencies tell it. Every producing crate publishes the
//! set of suffixes it knows about (its own plus everything it saw) through
//! cargo's `links` metadata, so a dependent crate sees the whole chain below
//! it and takes the first letter not in it.

use std::collections::BTreeSet;

use capreg::SUFFIXES;

use crate::error::{GenerateError, Result};

/// Metadata key under which units publish their suffix list.
pub const UNITS_KEY: &str = "capreg_units";

/// Suffixes published by dependencies, read from `DEP_<LINKS>_CAPREG_UNITS`.
pub fn visible_from_env(vars: impl IntoIterator<Item = (String, String)>) -> Result<BTreeSet<char>> {
	let suffix = format!("_{}", UNITS_KEY.to_ascii_uppercase());
	let mut visible = BTreeSet::new();
	for (key, value) in vars {
		if key.starts_with("DEP_") && key.ends_with(&suffix) {
			visible.extend(parse_suffix_list(&value)?);
		}
	}
	Ok(visible)
}

/// Parses `A,B,C`. Blank entries are ignored.
pub fn parse_suffix_list(list: &str) -> Result<BTreeSet<char>> {
	list.split(',')
		.map(str::trim)
		.filter(|s| !s.is_empty())
		.map(parse_suffix)
		.collect()
}

/// Parses one suffix letter.
pub fn parse_suffix(text: &str) -> Result<char> {
	let mut chars = text.trim().chars();
	match (chars.next(), chars.next()) {
		(Some(c), None) if SUFFIXES.contains(&c) => Ok(c),
		_ => Err(GenerateError::InvalidSuffix(text.to_string())),
	}
}

/// Picks the suffix for a new unit: `explicit` if given and free, otherwise
/// the first letter not in `visible`.
pub fn allocate(visible: &BTreeSet<char>, explicit: Option<char>) -> Result<char> {
	if let Some(suffix) = explicit {
		if visible.contains(&suffix) {
			return Err(GenerateError::SuffixTaken(suffix));
		}
		return Ok(suffix);
	}
	SUFFIXES
		.clone()
		.find(|c| !visible.contains(c))
		.ok_or_else(|| GenerateError::SuffixesExhausted {
			visible: render_list(visible),
		})
}

/// Renders a suffix set as `A,B,C`.
pub fn render_list(suffixes: &BTreeSet<char>) -> String {
	suffixes.iter().map(char::to_string).collect::<Vec<_>>().join(",")
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;
	use rstest::rstest;

	use super::*;

	fn set(list: &str) -> BTreeSet<char> {
		list.chars().collect()
	}

	#[rstest]
	#[case("", 'A')]
	#[case("A", 'B')]
	#[case("AB", 'C')]
	#[case("B", 'A')]
	#[case("ABD", 'C')]
	fn takes_first_free_letter(#[case] visible: &str, #[case] expected: char) {
		assert_eq!(allocate(&set(visible), None).unwrap(), expected);
	}

	#[test]
	fn all_letters_taken() {
		let visible: BTreeSet<char> = SUFFIXES.collect();
		let err = allocate(&visible, None).unwrap_err();
		assert!(matches!(err, GenerateError::SuffixesExhausted { ref visible } if visible.starts_with("A,B,C")));
	}

	#[test]
	fn explicit_suffix_wins_when_free() {
		assert_eq!(allocate(&set("AB"), Some('Q')).unwrap(), 'Q');
		assert!(matches!(
			allocate(&set("AB"), Some('B')),
			Err(GenerateError::SuffixTaken('B'))
		));
	}

	#[test]
	fn reads_dependency_metadata() {
		let vars = [
			("DEP_DEMO_CORE_CAPREG_UNITS".to_string(), "A".to_string()),
			("DEP_DEMO_EXTRA_CAPREG_UNITS".to_string(), "A,B".to_string()),
			("DEP_Z_ROOT".to_string(), "C".to_string()),
			("PATH".to_string(), "/usr/bin".to_string()),
		];
		assert_eq!(visible_from_env(vars).unwrap(), set("AB"));
	}

	#[rstest]
	#[case("a")]
	#[case("AB")]
	#[case("1")]
	#[case("")]
	fn rejects_bad_suffixes(#[case] text: &str) {
		assert!(matches!(parse_suffix(text), Err(GenerateError::InvalidSuffix(_))));
	}

	#[test]
	fn list_round_trips_through_text() {
		let parsed = parse_suffix_list(" C, A ,,B").unwrap();
		assert_eq!(render_list(&parsed), "A,B,C");
	}
}
