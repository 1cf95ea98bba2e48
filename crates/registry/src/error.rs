use thiserror::Error;

/// Fatal errors raised while chaining registry units together.
///
/// Any of these aborts the bootstrap: a partially walked chain would hide the
/// registrations of every later unit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BootstrapError {
	/// Two linked units claim the same suffix.
	#[error("registry units from '{first}' and '{second}' both use suffix '{suffix}'")]
	DuplicateSuffix {
		/// The contested suffix.
		suffix: char,
		/// Origin crate of the unit seen first.
		first: &'static str,
		/// Origin crate of the conflicting unit.
		second: &'static str,
	},
	/// A generated unit references an exported implementation that is not linked.
	#[error("no exported implementation named '{path}'")]
	Unresolved {
		/// Qualified path of the implementation type.
		path: &'static str,
	},
	/// An exported implementation exists but was registered for another capability.
	#[error("exported implementation '{path}' is not registered for capability '{capability}'")]
	CapabilityMismatch {
		/// Qualified path of the implementation type.
		path: &'static str,
		/// Capability the generated unit asked for.
		capability: &'static str,
	},
	/// A unit's init procedure failed.
	#[error("registry unit {symbol} from '{origin}' failed: {source}")]
	Unit {
		/// Generated symbol of the failing unit.
		symbol: String,
		/// Origin crate of the failing unit.
		origin: &'static str,
		/// Underlying failure.
		#[source]
		source: Box<BootstrapError>,
	},
}

/// A constructor panicked while instantiating an implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to instantiate {type_name}: {message}")]
pub struct InstantiateError {
	/// Implementation type that failed.
	pub type_name: &'static str,
	/// Panic message of the constructor.
	pub message: String,
}
