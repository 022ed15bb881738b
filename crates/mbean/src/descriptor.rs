//! Descriptor sets handed to the resolver, and the published view of a resolved bean.

use serde::{Deserialize, Serialize};

use super::value::ValueType;

/// What kind of effect an operation has, as advertised to management consoles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationAction {
	/// Read-like, no state change.
	Info,
	/// Write-like, changes state.
	Action,
	/// Both returns information and changes state.
	ActionInfo,
	#[default]
	Unknown,
}

/// Exposes a field of the target as an attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeFieldInfo {
	pub field: String,
	#[serde(default = "default_true")]
	pub readable: bool,
	#[serde(default)]
	pub writable: bool,
	#[serde(default)]
	pub description: String,
}

const fn default_true() -> bool {
	true
}

impl AttributeFieldInfo {
	pub fn new(
		field: impl Into<String>,
		readable: bool,
		writable: bool,
		description: impl Into<String>,
	) -> Self {
		Self {
			field: field.into(),
			readable,
			writable,
			description: description.into(),
		}
	}

	pub fn read_only(field: impl Into<String>, description: impl Into<String>) -> Self {
		Self::new(field, true, false, description)
	}

	pub fn read_write(field: impl Into<String>, description: impl Into<String>) -> Self {
		Self::new(field, true, true, description)
	}
}

/// Exposes a getter and/or setter method pair as one attribute.
///
/// The attribute is named after the accessor: `getRunTime`, `isRunning`, `set_limit` expose
/// `runTime`, `running` and `limit`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeMethodInfo {
	#[serde(default)]
	pub getter: Option<String>,
	#[serde(default)]
	pub setter: Option<String>,
	#[serde(default)]
	pub description: String,
}

impl AttributeMethodInfo {
	pub fn getter(getter: impl Into<String>, description: impl Into<String>) -> Self {
		Self {
			getter: Some(getter.into()),
			setter: None,
			description: description.into(),
		}
	}

	pub fn setter(setter: impl Into<String>, description: impl Into<String>) -> Self {
		Self {
			getter: None,
			setter: Some(setter.into()),
			description: description.into(),
		}
	}

	pub fn pair(
		getter: impl Into<String>,
		setter: impl Into<String>,
		description: impl Into<String>,
	) -> Self {
		Self {
			getter: Some(getter.into()),
			setter: Some(setter.into()),
			description: description.into(),
		}
	}
}

/// Exposes a method as an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationInfo {
	pub method: String,
	/// Empty to use introspected names, or exactly one name per parameter.
	#[serde(default)]
	pub parameter_names: Vec<String>,
	/// Empty, or one description per parameter name.
	#[serde(default)]
	pub parameter_descriptions: Vec<String>,
	#[serde(default)]
	pub action: OperationAction,
	#[serde(default)]
	pub description: String,
}

impl OperationInfo {
	pub fn new(method: impl Into<String>, description: impl Into<String>) -> Self {
		Self {
			method: method.into(),
			parameter_names: Vec::new(),
			parameter_descriptions: Vec::new(),
			action: OperationAction::Unknown,
			description: description.into(),
		}
	}

	#[must_use]
	pub fn parameters<N, D>(
		mut self,
		names: impl IntoIterator<Item = N>,
		descriptions: impl IntoIterator<Item = D>,
	) -> Self
	where
		N: Into<String>,
		D: Into<String>,
	{
		self.parameter_names = names.into_iter().map(Into::into).collect();
		self.parameter_descriptions = descriptions.into_iter().map(Into::into).collect();
		self
	}

	#[must_use]
	pub const fn action(mut self, action: OperationAction) -> Self {
		self.action = action;
		self
	}
}

/// The three descriptor arrays of explicit registration.
///
/// Deserializable, so descriptor sets for objects without source access can live in config files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplicitDescriptors {
	#[serde(default)]
	pub fields: Vec<AttributeFieldInfo>,
	#[serde(default)]
	pub methods: Vec<AttributeMethodInfo>,
	#[serde(default)]
	pub operations: Vec<OperationInfo>,
}

impl ExplicitDescriptors {
	pub fn from_json(json: &str) -> serde_json::Result<Self> {
		serde_json::from_str(json)
	}
}

/// Published view of one attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeInfo {
	pub name: String,
	pub value_type: ValueType,
	pub readable: bool,
	pub writable: bool,
	pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterInfo {
	pub name: String,
	pub value_type: ValueType,
	pub description: String,
}

/// Published view of one operation overload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationSignature {
	pub name: String,
	pub parameters: Vec<ParameterInfo>,
	pub return_type: ValueType,
	pub action: OperationAction,
	pub description: String,
}

impl OperationSignature {
	#[must_use]
	pub fn arity(&self) -> usize {
		self.parameters.len()
	}
}

/// Everything a management console needs to render a bean.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeanInfo {
	pub name: String,
	pub type_name: String,
	pub description: String,
	pub attributes: Vec<AttributeInfo>,
	pub operations: Vec<OperationSignature>,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn explicit_descriptors_load_from_json() {
		let descriptors = ExplicitDescriptors::from_json(
			r#"{
				"fields": [
					{ "field": "startMillis", "writable": false, "description": "When our timer started" },
					{ "field": "showSeconds", "writable": true }
				],
				"methods": [{ "getter": "getRunTime" }],
				"operations": [
					{ "method": "restartTimerToValue", "parameter_names": ["startMillis"], "action": "action" }
				]
			}"#,
		)
		.unwrap();

		assert_eq!(
			descriptors.fields[0],
			AttributeFieldInfo::read_only("startMillis", "When our timer started")
		);
		assert!(descriptors.fields[1].readable && descriptors.fields[1].writable);
		assert_eq!(descriptors.methods[0], AttributeMethodInfo::getter("getRunTime", ""));
		assert_eq!(descriptors.operations[0].action, OperationAction::Action);
		assert_eq!(descriptors.operations[0].parameter_names, ["startMillis"]);
	}
}
