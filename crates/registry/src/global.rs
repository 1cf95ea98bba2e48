//! Process-wide registry, bootstrapped on first use.

use std::sync::OnceLock;

use parking_lot::RwLock;
use tracing::error;

use crate::bootstrap::BootstrapReport;
use crate::error::BootstrapError;
use crate::implementation::Implementation;
use crate::registry::Registry;

struct Global {
	registry: RwLock<Registry>,
	report: BootstrapReport,
}

static GLOBAL: OnceLock<Result<Global, BootstrapError>> = OnceLock::new();

fn global() -> Result<&'static Global, BootstrapError> {
	GLOBAL
		.get_or_init(|| match Registry::bootstrap() {
			Ok((registry, report)) => Ok(Global {
				registry: RwLock::new(registry),
				report,
			}),
			Err(e) => {
				error!("capability registry bootstrap failed: {e}");
				Err(e)
			}
		})
		.as_ref()
		.map_err(Clone::clone)
}

fn expect_global() -> &'static Global {
	match global() {
		Ok(global) => global,
		Err(e) => panic!("capability registry unavailable: {e}"),
	}
}

/// Appends implementations of `C` to the process-wide registry.
///
/// # Panics
///
/// If the bootstrap chain walk failed. Use [`try_register`] to handle that case.
pub fn register<C: ?Sized + 'static>(implementations: impl IntoIterator<Item = Implementation<C>>) {
	expect_global().registry.write().register(implementations);
}

/// Snapshot of the implementations of `C` in the process-wide registry.
///
/// # Panics
///
/// If the bootstrap chain walk failed. Use [`try_find`] to handle that case.
pub fn find<C: ?Sized + 'static>() -> Vec<Implementation<C>> {
	expect_global().registry.read().find::<C>().to_vec()
}

/// Like [`register`], returning the bootstrap failure instead of panicking.
pub fn try_register<C: ?Sized + 'static>(
	implementations: impl IntoIterator<Item = Implementation<C>>,
) -> Result<(), BootstrapError> {
	global()?.registry.write().register(implementations);
	Ok(())
}

/// Like [`find`], returning the bootstrap failure instead of panicking.
pub fn try_find<C: ?Sized + 'static>() -> Result<Vec<Implementation<C>>, BootstrapError> {
	Ok(global()?.registry.read().find::<C>().to_vec())
}

/// Report of the process-wide bootstrap, triggering it if it has not run yet.
pub fn bootstrap_report() -> Result<&'static BootstrapReport, BootstrapError> {
	Ok(&global()?.report)
}
