//! Codec independent request and response types for transports sitting in front of a
//! [`BeanServer`](crate::BeanServer).

use serde::{Deserialize, Serialize};

use super::{
	descriptor::BeanInfo,
	error::{Error, ErrorKind},
	value::Value,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "request", rename_all = "snake_case")]
pub enum Request {
	ListBeans,
	Describe {
		bean: String,
	},
	GetAttribute {
		bean: String,
		attribute: String,
	},
	SetAttribute {
		bean: String,
		attribute: String,
		value: Value,
	},
	Invoke {
		bean: String,
		operation: String,
		#[serde(default)]
		args: Vec<Value>,
	},
}

impl Request {
	#[must_use]
	pub const fn name(&self) -> &'static str {
		match self {
			Self::ListBeans => "list_beans",
			Self::Describe { .. } => "describe",
			Self::GetAttribute { .. } => "get_attribute",
			Self::SetAttribute { .. } => "set_attribute",
			Self::Invoke { .. } => "invoke",
		}
	}

	#[must_use]
	pub fn bean(&self) -> Option<&str> {
		match self {
			Self::ListBeans => None,
			Self::Describe { bean }
			| Self::GetAttribute { bean, .. }
			| Self::SetAttribute { bean, .. }
			| Self::Invoke { bean, .. } => Some(bean),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "response", content = "body", rename_all = "snake_case")]
pub enum Response {
	Beans(Vec<String>),
	Info(BeanInfo),
	Value(Value),
	Done,
	Error(RemoteError),
}

/// An [`Error`] flattened for the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteError {
	pub kind: ErrorKind,
	pub message: String,
}

impl From<Error> for RemoteError {
	fn from(e: Error) -> Self {
		Self {
			kind: e.kind(),
			message: e.to_string(),
		}
	}
}
