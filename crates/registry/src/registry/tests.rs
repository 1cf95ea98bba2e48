use pretty_assertions::assert_eq;
use rstest::rstest;

use super::*;
use crate::implementation;

trait Logger {
	fn target(&self) -> &'static str;
}

trait Other {}

#[derive(Default)]
struct FileLogger;
impl Logger for FileLogger {
	fn target(&self) -> &'static str {
		"file"
	}
}

#[derive(Default)]
struct StderrLogger;
impl Logger for StderrLogger {
	fn target(&self) -> &'static str {
		"stderr"
	}
}

#[derive(Default)]
struct SyslogLogger;
impl Logger for SyslogLogger {
	fn target(&self) -> &'static str {
		"syslog"
	}
}

fn targets(registry: &Registry) -> Vec<&'static str> {
	registry.find::<dyn Logger>().iter().map(|l| l.instantiate().target()).collect()
}

#[test]
fn unregistered_capability_finds_nothing() {
	let registry = Registry::new();
	assert!(registry.find::<dyn Other>().is_empty());
	assert!(!registry.contains::<dyn Other>());
}

#[test]
fn manual_registration_without_units() {
	let mut registry = Registry::new();
	registry.register::<dyn Logger>([implementation!(dyn Logger => FileLogger)]);
	assert_eq!(targets(&registry), vec!["file"]);
	assert!(registry.find::<dyn Other>().is_empty());
}

#[test]
fn register_appends_without_reordering() {
	let mut registry = Registry::new();
	registry.register::<dyn Logger>([implementation!(dyn Logger => StderrLogger)]);
	registry.register::<dyn Logger>([implementation!(dyn Logger => FileLogger)]);
	registry.register::<dyn Logger>([implementation!(dyn Logger => SyslogLogger)]);
	assert_eq!(targets(&registry), vec!["stderr", "file", "syslog"]);
}

#[rstest]
#[case(1)]
#[case(2)]
#[case(5)]
fn register_keeps_duplicates(#[case] times: usize) {
	let mut registry = Registry::new();
	for _ in 0..times {
		registry.register::<dyn Logger>([implementation!(dyn Logger => FileLogger)]);
	}
	assert_eq!(registry.find::<dyn Logger>().len(), times);
	assert_eq!(registry.registrations(), times);
}

#[test]
fn empty_registration_creates_the_capability() {
	let mut registry = Registry::new();
	registry.register::<dyn Other>([]);
	assert!(registry.contains::<dyn Other>());
	assert!(registry.find::<dyn Other>().is_empty());
	assert_eq!(registry.len(), 1);
}

#[test]
fn capabilities_keep_first_registration_order() {
	let mut registry = Registry::new();
	registry.register::<dyn Other>([]);
	registry.register::<dyn Logger>([implementation!(dyn Logger => FileLogger)]);
	registry.register::<dyn Other>([]);

	let names: Vec<_> = registry.capabilities().collect();
	assert_eq!(names.len(), 2);
	assert!(names[0].ends_with("Other"));
	assert!(names[1].ends_with("Logger"));
}

#[test]
fn found_slice_is_a_copy_safe_view() {
	let mut registry = Registry::new();
	registry.register::<dyn Logger>([implementation!(dyn Logger => FileLogger)]);

	let mut snapshot = registry.find::<dyn Logger>().to_vec();
	snapshot.push(implementation!(dyn Logger => StderrLogger));
	snapshot.clear();

	assert_eq!(targets(&registry), vec!["file"]);
}
