//! Process-wide registry fed by units submitted from this test crate.

use std::sync::atomic::{AtomicUsize, Ordering};

use capreg::{BootstrapError, Registry, RegistryUnit, implementation};
use pretty_assertions::assert_eq;
use serial_test::serial;

trait Greeter: Send + Sync {
	fn greet(&self) -> String;
}

#[derive(Default)]
struct English;
impl Greeter for English {
	fn greet(&self) -> String {
		"hello".into()
	}
}

mod private {
	use super::Greeter;

	#[capreg::register(dyn Greeter)]
	#[derive(Default)]
	struct Hidden;

	impl Greeter for Hidden {
		fn greet(&self) -> String {
			"psst".into()
		}
	}
}

#[capreg::register(dyn Greeter)]
#[cfg(any())]
#[derive(Default)]
struct ConfiguredOut;

#[cfg(any())]
impl Greeter for ConfiguredOut {
	fn greet(&self) -> String {
		"never".into()
	}
}

trait Counter {
	fn count(&self) -> usize;
}

#[derive(Default)]
struct One;
impl Counter for One {
	fn count(&self) -> usize {
		1
	}
}

#[derive(Default)]
struct Two;
impl Counter for Two {
	fn count(&self) -> usize {
		2
	}
}

#[derive(Default)]
struct Three;
impl Counter for Three {
	fn count(&self) -> usize {
		3
	}
}

static A_CALLS: AtomicUsize = AtomicUsize::new(0);
static D_CALLS: AtomicUsize = AtomicUsize::new(0);

fn unit_a(registry: &mut Registry) -> Result<(), BootstrapError> {
	A_CALLS.fetch_add(1, Ordering::SeqCst);
	registry.register::<dyn Greeter>([implementation!(dyn Greeter => English)]);
	Ok(())
}

fn unit_b(registry: &mut Registry) -> Result<(), BootstrapError> {
	registry.register::<dyn Greeter>([capreg::exported::<dyn Greeter>("global::private::Hidden")?]);
	Ok(())
}

fn unit_d(_: &mut Registry) -> Result<(), BootstrapError> {
	D_CALLS.fetch_add(1, Ordering::SeqCst);
	Ok(())
}

capreg::inventory::submit! { RegistryUnit::new('A', "global-a", unit_a) }
capreg::inventory::submit! { RegistryUnit::new('B', "global-b", unit_b) }
capreg::inventory::submit! { RegistryUnit::new('D', "global-d", unit_d) }

#[test]
fn bootstrap_walks_until_the_first_gap() {
	let report = capreg::bootstrap_report().unwrap();

	let suffixes: Vec<char> = report.initialized.iter().map(|u| u.suffix).collect();
	assert_eq!(suffixes, vec!['A', 'B']);
	assert_eq!(report.stopped_at, Some('C'));
	assert_eq!(report.unreachable.len(), 1);
	assert_eq!(report.unreachable[0].origin, "global-d");
	assert_eq!(D_CALLS.load(Ordering::SeqCst), 0);
}

#[test]
fn bootstrap_runs_once() {
	capreg::find::<dyn Greeter>();
	capreg::find::<dyn Counter>();
	capreg::bootstrap_report().unwrap();
	assert_eq!(A_CALLS.load(Ordering::SeqCst), 1);
}

#[test]
fn generated_and_exported_registrations_are_found() {
	let greetings: Vec<String> = capreg::find::<dyn Greeter>()
		.iter()
		.map(|i| i.instantiate().greet())
		.collect();
	assert_eq!(greetings, vec!["hello", "psst"]);
}

#[test]
fn unregistered_capability_is_empty() {
	trait Nothing {}
	assert!(capreg::find::<dyn Nothing>().is_empty());
	assert!(capreg::try_find::<dyn Nothing>().unwrap().is_empty());
}

#[test]
#[serial]
fn manual_registration_appends() {
	capreg::register::<dyn Counter>([implementation!(dyn Counter => One), implementation!(dyn Counter => Two)]);
	let counts: Vec<usize> = capreg::find::<dyn Counter>()
		.iter()
		.map(|i| i.instantiate().count())
		.collect();
	assert_eq!(counts, vec![1, 2]);

	capreg::try_register::<dyn Counter>([implementation!(dyn Counter => Three)]).unwrap();
	let counts: Vec<usize> = capreg::find::<dyn Counter>()
		.iter()
		.map(|i| i.instantiate().count())
		.collect();
	assert_eq!(counts, vec![1, 2, 3]);
}

#[test]
fn exported_lookup_checks_path_and_capability() {
	let hidden = capreg::exported::<dyn Greeter>("global::private::Hidden").unwrap();
	assert!(hidden.name().ends_with("Hidden"));

	assert!(matches!(
		capreg::exported::<dyn Counter>("global::private::Hidden"),
		Err(BootstrapError::CapabilityMismatch { .. })
	));
	assert!(capreg::exported::<dyn Greeter>("global::ConfiguredOut").is_err());
	assert_eq!(
		capreg::exported::<dyn Greeter>("global::private::Missing").unwrap_err(),
		BootstrapError::Unresolved {
			path: "global::private::Missing"
		}
	);
}
