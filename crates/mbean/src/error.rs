use std::{any::Any, fmt};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::value::{CoercionError, ValueType};

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Every failure the adaptation engine reports to its callers.
///
/// Failures coming from the adapted object itself are always wrapped in [`Error::TargetInvocation`],
/// so a transport can tell apart "the bean misbehaved" from "the request was wrong".
#[derive(Debug, Error)]
pub enum Error {
	#[error("invalid bean name: {0}")]
	InvalidName(String),
	#[error("failed to resolve bean descriptors for <type='{type_name}'>: {source}")]
	Resolution {
		type_name: &'static str,
		#[source]
		source: ResolutionError,
	},
	#[error("bean already registered <name='{0}'>")]
	DuplicateName(String),
	#[error("bean not found <name='{0}'>")]
	NoSuchName(String),
	#[error("attribute not found <attribute='{0}'>")]
	NoSuchAttribute(String),
	#[error("operation not found <operation='{0}'>")]
	NoSuchOperation(String),
	#[error("attribute is not readable <attribute='{0}'>")]
	NotReadable(String),
	#[error("attribute is not writable <attribute='{0}'>")]
	NotWritable(String),
	#[error("type coercion failed for '{member}': {source}")]
	TypeCoercion {
		member: String,
		#[source]
		source: CoercionError,
	},
	#[error("operation '{operation}' has no overload taking {given} argument(s); declared arities: {expected:?}")]
	ArityMismatch {
		operation: String,
		given: usize,
		expected: Vec<usize>,
	},
	#[error("operation '{operation}' has more than one overload with {arity} argument(s)")]
	AmbiguousOperation { operation: String, arity: usize },
	#[error("bean target failed in '{member}': {source}")]
	TargetInvocation {
		member: String,
		#[source]
		source: TargetError,
	},
	#[error("target object was dropped while still registered <name='{0}'>")]
	TargetGone(String),
	#[error("bean was unregistered <name='{0}'>")]
	Unregistered(String),
	#[error("bean server is not running")]
	ServerNotRunning,
}

impl Error {
	pub(crate) fn resolution<T>(source: ResolutionError) -> Self {
		Self::Resolution {
			type_name: std::any::type_name::<T>(),
			source,
		}
	}

	/// Stable classification of this error, used when translating it onto a wire protocol.
	#[must_use]
	pub const fn kind(&self) -> ErrorKind {
		match self {
			Self::InvalidName(_) => ErrorKind::InvalidName,
			Self::Resolution { .. } => ErrorKind::Resolution,
			Self::DuplicateName(_) => ErrorKind::DuplicateName,
			Self::NoSuchName(_) => ErrorKind::NoSuchName,
			Self::NoSuchAttribute(_) => ErrorKind::NoSuchAttribute,
			Self::NoSuchOperation(_) => ErrorKind::NoSuchOperation,
			Self::NotReadable(_) => ErrorKind::NotReadable,
			Self::NotWritable(_) => ErrorKind::NotWritable,
			Self::TypeCoercion { .. } => ErrorKind::TypeCoercion,
			Self::ArityMismatch { .. } => ErrorKind::ArityMismatch,
			Self::AmbiguousOperation { .. } => ErrorKind::AmbiguousOperation,
			Self::TargetInvocation { .. } => ErrorKind::TargetInvocation,
			Self::TargetGone(_) => ErrorKind::TargetGone,
			Self::Unregistered(_) => ErrorKind::Unregistered,
			Self::ServerNotRunning => ErrorKind::ServerNotRunning,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
	InvalidName,
	Resolution,
	DuplicateName,
	NoSuchName,
	NoSuchAttribute,
	NoSuchOperation,
	NotReadable,
	NotWritable,
	TypeCoercion,
	ArityMismatch,
	AmbiguousOperation,
	TargetInvocation,
	TargetGone,
	Unregistered,
	ServerNotRunning,
}

/// Why a descriptor set could not be matched against a type's shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
	#[error("field does not exist <field='{0}'>")]
	MissingField(String),
	#[error("field is not backed by a writable cell <field='{0}'>")]
	FieldNotWritable(String),
	#[error("attribute is neither readable nor writable <attribute='{0}'>")]
	NoAccess(String),
	#[error("method does not exist <method='{0}'>")]
	MissingMethod(String),
	#[error("method '{method}' takes {found} parameter(s), descriptor expects {expected}")]
	ArityMismatch {
		method: String,
		expected: usize,
		found: usize,
	},
	#[error("method is not shaped as a get/is/set accessor <method='{0}'>")]
	NotAnAccessor(String),
	#[error("getter returns nothing <method='{0}'>")]
	VoidGetter(String),
	#[error("method attribute names neither a getter nor a setter")]
	EmptyAccessor,
	#[error("getter '{getter}' and setter '{setter}' name different attributes")]
	AccessorNameMismatch { getter: String, setter: String },
	#[error("getter and setter of '{attribute}' disagree on type: {getter} vs {setter}")]
	TypeMismatch {
		attribute: String,
		getter: ValueType,
		setter: ValueType,
	},
	#[error("attribute declared more than once <attribute='{0}'>")]
	DuplicateAttribute(String),
	#[error("operation '{method}' has {names} parameter name(s) but {descriptions} description(s)")]
	DescriptionCount {
		method: String,
		names: usize,
		descriptions: usize,
	},
	#[error("type carries no resource metadata and cannot name itself")]
	MissingResource,
	#[error("malformed field value, expected 'key=value' <entry='{0}'>")]
	MalformedFieldValue(String),
}

/// A failure raised by the adapted object while serving a get, set or invoke.
///
/// `kind` is the Rust type name of the original error, or `"panic"` when the target panicked.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{kind}: {message}")]
pub struct TargetError {
	pub kind: String,
	pub message: String,
}

impl TargetError {
	pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
		Self {
			kind: kind.into(),
			message: message.into(),
		}
	}

	pub fn from_display<E: fmt::Display>(error: &E) -> Self {
		Self::new(std::any::type_name::<E>(), error.to_string())
	}

	pub(crate) fn from_panic(payload: &(dyn Any + Send)) -> Self {
		let message = payload
			.downcast_ref::<&str>()
			.map(ToString::to_string)
			.or_else(|| payload.downcast_ref::<String>().cloned())
			.unwrap_or_else(|| "<non-string panic payload>".to_string());

		Self::new("panic", message)
	}
}

/// Failure of a single member access, before the adapter attaches the member name to it.
#[derive(Debug, Error)]
pub enum MemberError {
	#[error(transparent)]
	Coercion(#[from] CoercionError),
	#[error(transparent)]
	Target(#[from] TargetError),
	#[error("member is read-only")]
	ReadOnly,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn panic_payloads_keep_their_message() {
		let payload: Box<dyn Any + Send> = Box::new("boom");
		assert_eq!(TargetError::from_panic(payload.as_ref()).message, "boom");

		let payload: Box<dyn Any + Send> = Box::new(String::from("owned boom"));
		let error = TargetError::from_panic(payload.as_ref());
		assert_eq!(error.kind, "panic");
		assert_eq!(error.message, "owned boom");
	}

	#[test]
	fn resolution_errors_name_the_type() {
		let error = Error::resolution::<u8>(ResolutionError::MissingField("x".into()));
		assert_eq!(error.kind(), ErrorKind::Resolution);
		assert!(error.to_string().contains("<type='u8'>"));
	}
}
