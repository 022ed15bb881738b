//! Turns a [`TypeShape`] plus a [`ResolutionMode`] into the attribute and operation tables of a bean.
//!
//! Resolution runs once, at registration. Afterwards every lookup goes through the name indexed maps
//! of [`ResolvedBean`].

use std::collections::{hash_map::Entry, HashMap};

use tracing::{debug, warn};

use super::{
	descriptor::{
		AttributeFieldInfo, AttributeInfo, AttributeMethodInfo, ExplicitDescriptors, OperationAction,
		OperationInfo, OperationSignature, ParameterInfo,
	},
	error::{Error, ResolutionError, Result},
	shape::{MethodMember, TypeShape},
	value::ValueType,
};

/// Inherited-from-everything methods that never become operations during auto-discovery.
const UNIVERSAL_METHODS: [&str; 12] = [
	"to_string",
	"hash",
	"eq",
	"ne",
	"clone",
	"fmt",
	"type_id",
	"type_name",
	"toString",
	"hashCode",
	"equals",
	"getClass",
];

/// How the members of a bean are chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionMode {
	/// Members declared in the type's shape, named by its resource metadata or self-naming.
	Declarative,
	/// Caller supplied descriptors, each validated against the shape.
	Explicit(ExplicitDescriptors),
	/// Every accessor-shaped method is an attribute, every other method an operation.
	AutoDiscovery,
}

impl ResolutionMode {
	#[must_use]
	pub const fn name(&self) -> &'static str {
		match self {
			Self::Declarative => "declarative",
			Self::Explicit(_) => "explicit",
			Self::AutoDiscovery => "auto_discovery",
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Access {
	Field(usize),
	Method(usize),
}

#[derive(Debug, Clone)]
pub(crate) struct ResolvedAttribute {
	pub info: AttributeInfo,
	pub read: Option<Access>,
	pub write: Option<Access>,
}

#[derive(Debug, Clone)]
pub(crate) struct ResolvedOperation {
	pub signature: OperationSignature,
	pub method: usize,
}

/// The attribute and operation tables of one bean, in declaration or discovery order.
#[derive(Debug, Clone, Default)]
pub struct ResolvedBean {
	description: String,
	attributes: Vec<ResolvedAttribute>,
	attribute_index: HashMap<String, usize>,
	operations: Vec<ResolvedOperation>,
	operation_index: HashMap<String, Vec<usize>>,
}

impl ResolvedBean {
	fn new(description: String) -> Self {
		Self {
			description,
			..Default::default()
		}
	}

	#[must_use]
	pub fn description(&self) -> &str {
		&self.description
	}

	pub fn attributes(&self) -> impl Iterator<Item = &AttributeInfo> {
		self.attributes.iter().map(|attribute| &attribute.info)
	}

	pub fn operations(&self) -> impl Iterator<Item = &OperationSignature> {
		self.operations.iter().map(|operation| &operation.signature)
	}

	#[must_use]
	pub fn attribute(&self, name: &str) -> Option<&AttributeInfo> {
		self.resolved_attribute(name).map(|attribute| &attribute.info)
	}

	/// All overloads sharing `name`.
	pub fn overloads<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a OperationSignature> + 'a {
		self.resolved_overloads(name)
			.map(|operation| &operation.signature)
	}

	pub(crate) fn resolved_attribute(&self, name: &str) -> Option<&ResolvedAttribute> {
		self.attribute_index
			.get(name)
			.map(|&idx| &self.attributes[idx])
	}

	pub(crate) fn resolved_overloads<'a>(
		&'a self,
		name: &str,
	) -> impl Iterator<Item = &'a ResolvedOperation> + 'a {
		self.operation_index
			.get(name)
			.into_iter()
			.flatten()
			.map(|&idx| &self.operations[idx])
	}

	fn has_attribute(&self, name: &str) -> bool {
		self.attribute_index.contains_key(name)
	}

	fn push_attribute(&mut self, attribute: ResolvedAttribute) -> Result<(), ResolutionError> {
		match self.attribute_index.entry(attribute.info.name.clone()) {
			Entry::Occupied(entry) => Err(ResolutionError::DuplicateAttribute(entry.key().clone())),
			Entry::Vacant(entry) => {
				entry.insert(self.attributes.len());
				self.attributes.push(attribute);
				Ok(())
			}
		}
	}

	fn push_operation(&mut self, signature: OperationSignature, method: usize) {
		self.operation_index
			.entry(signature.name.clone())
			.or_default()
			.push(self.operations.len());
		self.operations.push(ResolvedOperation { signature, method });
	}

	fn warn_on_ambiguous_overloads(&self) {
		for (name, indexes) in &self.operation_index {
			let mut arities = indexes
				.iter()
				.map(|&idx| self.operations[idx].signature.arity())
				.collect::<Vec<_>>();
			arities.sort_unstable();

			for pair in arities.windows(2) {
				if pair[0] == pair[1] {
					warn!(
						operation = %name,
						arity = pair[0],
						"Operation overloads share an arity, invoking them will be ambiguous;"
					);
				}
			}
		}
	}
}

/// Resolves the attributes and operations `shape` exposes under `mode`.
///
/// Any descriptor that does not match the shape fails the whole resolution.
pub fn resolve<T>(shape: &TypeShape<T>, mode: &ResolutionMode) -> Result<ResolvedBean> {
	let resolved = match mode {
		ResolutionMode::Declarative => declarative(shape),
		ResolutionMode::Explicit(descriptors) => explicit(shape, descriptors),
		ResolutionMode::AutoDiscovery => auto_discovery(shape),
	}
	.map_err(Error::resolution::<T>)?;

	resolved.warn_on_ambiguous_overloads();

	debug!(
		type_name = shape.type_name(),
		mode = mode.name(),
		attributes = resolved.attributes.len(),
		operations = resolved.operations.len(),
		"Resolved bean descriptors;"
	);

	Ok(resolved)
}

fn type_description<T>(shape: &TypeShape<T>) -> String {
	shape
		.resource()
		.and_then(|resource| resource.description.clone())
		.unwrap_or_default()
}

fn declarative<T>(shape: &TypeShape<T>) -> Result<ResolvedBean, ResolutionError> {
	if shape.resource().is_none() && !shape.has_self_naming() {
		return Err(ResolutionError::MissingResource);
	}

	let mut bean = ResolvedBean::new(type_description(shape));

	for info in shape.declared_fields() {
		bean.push_attribute(field_attribute(shape, info)?)?;
	}

	let mut slots = Vec::<AccessorSlot>::new();
	for declared in shape.declared_accessors() {
		let accessor = accessor_role(&shape.methods()[declared.method], declared.method)?;
		let slot = slot_for(&mut slots, &accessor.attribute);
		if !slot.fill(&accessor) {
			return Err(ResolutionError::DuplicateAttribute(accessor.attribute));
		}
		if slot.description.is_empty() {
			slot.description.clone_from(&declared.description);
		}
	}
	for slot in slots {
		bean.push_attribute(slot.resolve(shape)?)?;
	}

	for declared in shape.declared_operations() {
		let method = &shape.methods()[declared.method];
		let decl = &declared.decl;
		check_parameters(method, &decl.parameter_names, &decl.parameter_descriptions)?;
		bean.push_operation(
			signature(
				method,
				&decl.parameter_names,
				&decl.parameter_descriptions,
				decl.action,
				&decl.description,
			),
			declared.method,
		);
	}

	Ok(bean)
}

fn explicit<T>(
	shape: &TypeShape<T>,
	descriptors: &ExplicitDescriptors,
) -> Result<ResolvedBean, ResolutionError> {
	let mut bean = ResolvedBean::new(type_description(shape));

	for info in &descriptors.fields {
		bean.push_attribute(field_attribute(shape, info)?)?;
	}

	for info in &descriptors.methods {
		bean.push_attribute(method_attribute(shape, info)?)?;
	}

	for info in &descriptors.operations {
		explicit_operation(shape, info, &mut bean)?;
	}

	Ok(bean)
}

fn auto_discovery<T>(shape: &TypeShape<T>) -> Result<ResolvedBean, ResolutionError> {
	let mut bean = ResolvedBean::new(type_description(shape));
	let mut slots = Vec::<AccessorSlot>::new();
	let mut operations = Vec::new();

	for (idx, method) in shape.methods().iter().enumerate() {
		if UNIVERSAL_METHODS.contains(&method.name()) {
			continue;
		}

		// First accessor for a name wins, later ones stay callable as operations
		match accessor_role(method, idx) {
			Ok(accessor) if slot_for(&mut slots, &accessor.attribute).fill(&accessor) => {}
			_ => operations.push(idx),
		}
	}

	for slot in slots {
		bean.push_attribute(slot.resolve(shape)?)?;
	}

	for (idx, field) in shape.fields().iter().enumerate() {
		if bean.has_attribute(field.name()) {
			continue;
		}
		let attribute = ResolvedAttribute {
			info: AttributeInfo {
				name: field.name().to_string(),
				value_type: field.value_type(),
				readable: true,
				writable: field.is_writable(),
				description: String::new(),
			},
			read: Some(Access::Field(idx)),
			write: field.is_writable().then_some(Access::Field(idx)),
		};
		if bean.push_attribute(attribute).is_err() {
			debug!(field = field.name(), "Skipping duplicate discovered field;");
		}
	}

	for idx in operations {
		bean.push_operation(
			signature(&shape.methods()[idx], &[], &[], OperationAction::Unknown, ""),
			idx,
		);
	}

	Ok(bean)
}

fn field_attribute<T>(
	shape: &TypeShape<T>,
	info: &AttributeFieldInfo,
) -> Result<ResolvedAttribute, ResolutionError> {
	let (idx, field) = shape
		.fields()
		.iter()
		.enumerate()
		.find(|(_, field)| field.name() == info.field)
		.ok_or_else(|| ResolutionError::MissingField(info.field.clone()))?;

	if !info.readable && !info.writable {
		return Err(ResolutionError::NoAccess(info.field.clone()));
	}
	if info.writable && !field.is_writable() {
		return Err(ResolutionError::FieldNotWritable(info.field.clone()));
	}

	Ok(ResolvedAttribute {
		info: AttributeInfo {
			name: info.field.clone(),
			value_type: field.value_type(),
			readable: info.readable,
			writable: info.writable,
			description: info.description.clone(),
		},
		read: info.readable.then_some(Access::Field(idx)),
		write: info.writable.then_some(Access::Field(idx)),
	})
}

fn method_attribute<T>(
	shape: &TypeShape<T>,
	info: &AttributeMethodInfo,
) -> Result<ResolvedAttribute, ResolutionError> {
	let mut slot = AccessorSlot::default();

	if let Some(getter) = &info.getter {
		let idx = find_method(shape, getter, 0)?;
		let accessor = accessor_role(&shape.methods()[idx], idx)?;
		if accessor.kind == AccessorKind::Set {
			return Err(ResolutionError::NotAnAccessor(getter.clone()));
		}
		slot.attribute.clone_from(&accessor.attribute);
		slot.fill(&accessor);
	}

	if let Some(setter) = &info.setter {
		let idx = find_method(shape, setter, 1)?;
		let accessor = accessor_role(&shape.methods()[idx], idx)?;
		if accessor.kind != AccessorKind::Set {
			return Err(ResolutionError::NotAnAccessor(setter.clone()));
		}
		if slot.getter.is_some() && slot.attribute != accessor.attribute {
			return Err(ResolutionError::AccessorNameMismatch {
				getter: info.getter.clone().unwrap_or_default(),
				setter: setter.clone(),
			});
		}
		slot.attribute.clone_from(&accessor.attribute);
		slot.fill(&accessor);
	}

	slot.description.clone_from(&info.description);
	slot.resolve(shape)
}

fn explicit_operation<T>(
	shape: &TypeShape<T>,
	info: &OperationInfo,
	bean: &mut ResolvedBean,
) -> Result<(), ResolutionError> {
	let candidates = shape
		.methods()
		.iter()
		.enumerate()
		.filter(|(_, method)| method.name() == info.method)
		.collect::<Vec<_>>();

	if candidates.is_empty() {
		return Err(ResolutionError::MissingMethod(info.method.clone()));
	}

	// Named parameters select the overload of that arity, otherwise every overload is exposed
	let selected = if info.parameter_names.is_empty() {
		candidates
	} else {
		let idx = find_method(shape, &info.method, info.parameter_names.len())?;
		vec![(idx, &shape.methods()[idx])]
	};

	for (idx, method) in selected {
		check_parameters(method, &info.parameter_names, &info.parameter_descriptions)?;
		bean.push_operation(
			signature(
				method,
				&info.parameter_names,
				&info.parameter_descriptions,
				info.action,
				&info.description,
			),
			idx,
		);
	}

	Ok(())
}

/// Index of the method called `name` taking `arity` parameters.
fn find_method<T>(shape: &TypeShape<T>, name: &str, arity: usize) -> Result<usize, ResolutionError> {
	let mut found = None;
	for (idx, method) in shape.methods().iter().enumerate() {
		if method.name() != name {
			continue;
		}
		if method.arity() == arity {
			return Ok(idx);
		}
		found.get_or_insert(method.arity());
	}

	Err(found.map_or_else(
		|| ResolutionError::MissingMethod(name.to_string()),
		|found| ResolutionError::ArityMismatch {
			method: name.to_string(),
			expected: arity,
			found,
		},
	))
}

fn check_parameters<T>(
	method: &MethodMember<T>,
	names: &[String],
	descriptions: &[String],
) -> Result<(), ResolutionError> {
	if !names.is_empty() && names.len() != method.arity() {
		return Err(ResolutionError::ArityMismatch {
			method: method.name().to_string(),
			expected: names.len(),
			found: method.arity(),
		});
	}
	if !descriptions.is_empty() && descriptions.len() != names.len() {
		return Err(ResolutionError::DescriptionCount {
			method: method.name().to_string(),
			names: names.len(),
			descriptions: descriptions.len(),
		});
	}

	Ok(())
}

/// Explicit names win, then names recorded in the shape, then `p1..pn`.
fn signature<T>(
	method: &MethodMember<T>,
	names: &[String],
	descriptions: &[String],
	action: OperationAction,
	description: &str,
) -> OperationSignature {
	let parameters = method
		.params()
		.iter()
		.enumerate()
		.map(|(idx, param)| ParameterInfo {
			name: names
				.get(idx)
				.cloned()
				.or_else(|| param.name.clone())
				.unwrap_or_else(|| format!("p{}", idx + 1)),
			value_type: param.value_type,
			description: descriptions.get(idx).cloned().unwrap_or_default(),
		})
		.collect();

	OperationSignature {
		name: method.name().to_string(),
		parameters,
		return_type: method.returns(),
		action,
		description: description.to_string(),
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AccessorKind {
	Get,
	Is,
	Set,
}

#[derive(Debug, Clone)]
struct Accessor {
	method: usize,
	kind: AccessorKind,
	attribute: String,
}

/// Splits `getFoo`, `get_foo`, `isFoo`, `setFoo`... into their kind and attribute name.
fn split_accessor(method: &str) -> Option<(AccessorKind, String)> {
	[
		("get", AccessorKind::Get),
		("is", AccessorKind::Is),
		("set", AccessorKind::Set),
	]
	.into_iter()
	.find_map(|(prefix, kind)| {
		let rest = method.strip_prefix(prefix)?;
		if let Some(snake) = rest.strip_prefix('_') {
			return (!snake.is_empty()).then(|| (kind, snake.to_string()));
		}

		let mut chars = rest.chars();
		let first = chars.next().filter(|c| c.is_uppercase())?;
		let second = chars.clone().next();

		// `getURL` keeps its acronym, `getRunTime` becomes `runTime`
		let attribute = if second.is_some_and(char::is_uppercase) {
			rest.to_string()
		} else {
			first.to_lowercase().chain(chars).collect()
		};

		Some((kind, attribute))
	})
}

fn accessor_role<T>(method: &MethodMember<T>, idx: usize) -> Result<Accessor, ResolutionError> {
	let name = method.name();
	let (kind, attribute) =
		split_accessor(name).ok_or_else(|| ResolutionError::NotAnAccessor(name.to_string()))?;

	let expected = if kind == AccessorKind::Set { 1 } else { 0 };
	if method.arity() != expected {
		return Err(ResolutionError::ArityMismatch {
			method: name.to_string(),
			expected,
			found: method.arity(),
		});
	}

	match (kind, method.returns()) {
		(AccessorKind::Get, ValueType::Void) => Err(ResolutionError::VoidGetter(name.to_string())),
		(AccessorKind::Is, returns) if returns != ValueType::Boolean => {
			Err(ResolutionError::NotAnAccessor(name.to_string()))
		}
		(AccessorKind::Set, returns) if returns != ValueType::Void => {
			Err(ResolutionError::NotAnAccessor(name.to_string()))
		}
		_ => Ok(Accessor {
			method: idx,
			kind,
			attribute,
		}),
	}
}

#[derive(Debug, Default)]
struct AccessorSlot {
	attribute: String,
	getter: Option<usize>,
	setter: Option<usize>,
	description: String,
}

fn slot_for<'a>(slots: &'a mut Vec<AccessorSlot>, attribute: &str) -> &'a mut AccessorSlot {
	let idx = slots
		.iter()
		.position(|slot| slot.attribute == attribute)
		.unwrap_or_else(|| {
			slots.push(AccessorSlot {
				attribute: attribute.to_string(),
				..Default::default()
			});
			slots.len() - 1
		});

	&mut slots[idx]
}

impl AccessorSlot {
	/// Returns `false` when the side `accessor` belongs to is already taken.
	fn fill(&mut self, accessor: &Accessor) -> bool {
		let side = if accessor.kind == AccessorKind::Set {
			&mut self.setter
		} else {
			&mut self.getter
		};

		if side.is_some() {
			return false;
		}
		*side = Some(accessor.method);

		true
	}

	fn resolve<T>(&self, shape: &TypeShape<T>) -> Result<ResolvedAttribute, ResolutionError> {
		let methods = shape.methods();
		let getter_type = self.getter.map(|idx| methods[idx].returns());
		let setter_type = self
			.setter
			.and_then(|idx| methods[idx].params().first())
			.map(|param| param.value_type);

		let value_type = match (getter_type, setter_type) {
			(Some(getter), Some(setter)) if getter != setter => {
				return Err(ResolutionError::TypeMismatch {
					attribute: self.attribute.clone(),
					getter,
					setter,
				});
			}
			(Some(value_type), _) | (None, Some(value_type)) => value_type,
			(None, None) => return Err(ResolutionError::EmptyAccessor),
		};

		Ok(ResolvedAttribute {
			info: AttributeInfo {
				name: self.attribute.clone(),
				value_type,
				readable: self.getter.is_some(),
				writable: self.setter.is_some(),
				description: self.description.clone(),
			},
			read: self.getter.map(Access::Method),
			write: self.setter.map(Access::Method),
		})
	}
}

#[cfg(test)]
mod tests {
	use std::sync::atomic::{AtomicBool, AtomicI32, AtomicI64, Ordering};

	use super::*;
	use crate::shape::{OperationDecl, ResourceMetadata};

	#[derive(Default)]
	struct Counter {
		count: AtomicI32,
		enabled: AtomicBool,
		total: i64,
	}

	impl Counter {
		fn get_count(&self) -> i32 {
			self.count.load(Ordering::SeqCst)
		}

		fn set_count(&self, count: i32) {
			self.count.store(count, Ordering::SeqCst);
		}

		fn reset_count(&self) {
			self.count.store(0, Ordering::SeqCst);
		}

		fn add(&self, a: i32, b: i32) -> i32 {
			a + b
		}
	}

	fn counter_shape() -> TypeShape<Counter> {
		let mut shape = TypeShape::new();
		shape.field("count", |c: &Counter| &c.count);
		shape.field("enabled", |c: &Counter| &c.enabled);
		shape.field("total", |c: &Counter| &c.total);
		shape.method0("getCount", Counter::get_count);
		shape.method1("setCount", Counter::set_count);
		shape.method0("resetCount", Counter::reset_count);
		shape.method2("add", Counter::add);
		shape.method0("toString", |_: &Counter| String::from("Counter"));
		shape
	}

	#[test]
	fn splits_both_naming_conventions() {
		assert_eq!(
			split_accessor("getRunTime"),
			Some((AccessorKind::Get, "runTime".to_string()))
		);
		assert_eq!(
			split_accessor("get_run_time"),
			Some((AccessorKind::Get, "run_time".to_string()))
		);
		assert_eq!(
			split_accessor("isRunning"),
			Some((AccessorKind::Is, "running".to_string()))
		);
		assert_eq!(
			split_accessor("set_limit"),
			Some((AccessorKind::Set, "limit".to_string()))
		);
		assert_eq!(split_accessor("getURL"), Some((AccessorKind::Get, "URL".to_string())));
		assert_eq!(split_accessor("getaway"), None);
		assert_eq!(split_accessor("get_"), None);
		assert_eq!(split_accessor("settle"), None);
	}

	#[test]
	fn auto_discovery_pairs_accessors() {
		let mut shape = TypeShape::<Counter>::new();
		shape.method0("getCount", Counter::get_count);
		shape.method1("setCount", Counter::set_count);
		shape.method0("resetCount", Counter::reset_count);

		let bean = resolve(&shape, &ResolutionMode::AutoDiscovery).unwrap();

		let attributes = bean.attributes().collect::<Vec<_>>();
		assert_eq!(attributes.len(), 1);
		assert_eq!(attributes[0].name, "count");
		assert_eq!(attributes[0].value_type, ValueType::Int);
		assert!(attributes[0].readable && attributes[0].writable);

		let operations = bean.operations().collect::<Vec<_>>();
		assert_eq!(operations.len(), 1);
		assert_eq!(operations[0].name, "resetCount");
		assert_eq!(operations[0].arity(), 0);
		assert_eq!(operations[0].action, OperationAction::Unknown);
	}

	#[test]
	fn auto_discovery_adds_fields_and_skips_universal_methods() {
		let bean = resolve(&counter_shape(), &ResolutionMode::AutoDiscovery).unwrap();

		let names = bean.attributes().map(|a| a.name.as_str()).collect::<Vec<_>>();
		assert_eq!(names, ["count", "enabled", "total"]);
		assert!(bean.attribute("enabled").unwrap().writable);
		assert!(!bean.attribute("total").unwrap().writable);

		let operations = bean.operations().map(|o| o.name.as_str()).collect::<Vec<_>>();
		assert_eq!(operations, ["resetCount", "add"]);

		let add = bean.overloads("add").next().unwrap();
		let params = add.parameters.iter().map(|p| p.name.as_str()).collect::<Vec<_>>();
		assert_eq!(params, ["p1", "p2"]);
	}

	#[test]
	fn auto_discovery_rejects_mismatched_pairs() {
		let mut shape = TypeShape::<Counter>::new();
		shape.method0("getCount", Counter::get_count);
		shape.method1("setCount", |c: &Counter, count: i64| {
			c.count.store(i32::try_from(count).unwrap_or(i32::MAX), Ordering::SeqCst);
		});

		let err = resolve(&shape, &ResolutionMode::AutoDiscovery).unwrap_err();
		assert!(matches!(
			err,
			Error::Resolution {
				source: ResolutionError::TypeMismatch {
					getter: ValueType::Int,
					setter: ValueType::Long,
					..
				},
				..
			}
		));
	}

	#[test]
	fn explicit_rejects_missing_field() {
		let descriptors = ExplicitDescriptors {
			fields: vec![AttributeFieldInfo::read_only("missing", "")],
			..Default::default()
		};

		let err = resolve(&counter_shape(), &ResolutionMode::Explicit(descriptors)).unwrap_err();
		assert!(matches!(
			err,
			Error::Resolution {
				source: ResolutionError::MissingField(ref field),
				..
			} if field == "missing"
		));
	}

	#[test]
	fn explicit_validates_writability_and_arity() {
		let writable_constant = ExplicitDescriptors {
			fields: vec![AttributeFieldInfo::read_write("total", "")],
			..Default::default()
		};
		assert!(matches!(
			resolve(&counter_shape(), &ResolutionMode::Explicit(writable_constant)),
			Err(Error::Resolution {
				source: ResolutionError::FieldNotWritable(_),
				..
			})
		));

		let wrong_arity = ExplicitDescriptors {
			operations: vec![OperationInfo::new("add", "").parameters(["a"], Vec::<String>::new())],
			..Default::default()
		};
		assert!(matches!(
			resolve(&counter_shape(), &ResolutionMode::Explicit(wrong_arity)),
			Err(Error::Resolution {
				source: ResolutionError::ArityMismatch {
					expected: 1,
					found: 2,
					..
				},
				..
			})
		));

		let too_many_descriptions = ExplicitDescriptors {
			operations: vec![OperationInfo::new("add", "").parameters(["a", "b"], ["x"])],
			..Default::default()
		};
		assert!(matches!(
			resolve(&counter_shape(), &ResolutionMode::Explicit(too_many_descriptions)),
			Err(Error::Resolution {
				source: ResolutionError::DescriptionCount { .. },
				..
			})
		));
	}

	#[test]
	fn explicit_method_attributes_pair_up() {
		let descriptors = ExplicitDescriptors {
			methods: vec![AttributeMethodInfo::pair("getCount", "setCount", "Current count")],
			operations: vec![OperationInfo::new("add", "Adds")
				.parameters(["left", "right"], ["Left", "Right"])
				.action(OperationAction::Info)],
			..Default::default()
		};

		let bean = resolve(&counter_shape(), &ResolutionMode::Explicit(descriptors)).unwrap();
		let count = bean.attribute("count").unwrap();
		assert!(count.readable && count.writable);
		assert_eq!(count.description, "Current count");

		let add = bean.overloads("add").next().unwrap();
		assert_eq!(add.parameters[1].name, "right");
		assert_eq!(add.parameters[1].description, "Right");
		assert_eq!(add.return_type, ValueType::Int);

		let not_a_setter = ExplicitDescriptors {
			methods: vec![AttributeMethodInfo::setter("resetCount", "")],
			..Default::default()
		};
		assert!(resolve(&counter_shape(), &ResolutionMode::Explicit(not_a_setter)).is_err());

		let empty = ExplicitDescriptors {
			methods: vec![AttributeMethodInfo {
				getter: None,
				setter: None,
				description: String::new(),
			}],
			..Default::default()
		};
		assert!(matches!(
			resolve(&counter_shape(), &ResolutionMode::Explicit(empty)),
			Err(Error::Resolution {
				source: ResolutionError::EmptyAccessor,
				..
			})
		));
	}

	#[test]
	fn declarative_requires_metadata() {
		assert!(matches!(
			resolve(&counter_shape(), &ResolutionMode::Declarative),
			Err(Error::Resolution {
				source: ResolutionError::MissingResource,
				..
			})
		));
	}

	#[test]
	fn declarative_uses_declared_members_only() {
		struct Timer {
			start: AtomicI64,
		}

		let mut shape = TypeShape::<Timer>::new();
		shape.set_resource(ResourceMetadata::new("test").description("A timer"));
		shape.field("start", |t: &Timer| &t.start).read_only("Start");
		shape
			.method0("getElapsed", |t: &Timer| t.start.load(Ordering::SeqCst))
			.attribute("Elapsed");
		shape
			.method1("restart", |t: &Timer, at: i64| t.start.store(at, Ordering::SeqCst))
			.operation_with(OperationDecl {
				parameter_names: vec!["at".into()],
				action: OperationAction::Action,
				..Default::default()
			});
		shape.method0("hidden", |_: &Timer| 1_i32);

		let bean = resolve(&shape, &ResolutionMode::Declarative).unwrap();
		assert_eq!(bean.description(), "A timer");

		let names = bean.attributes().map(|a| a.name.as_str()).collect::<Vec<_>>();
		assert_eq!(names, ["start", "elapsed"]);
		assert!(!bean.attribute("elapsed").unwrap().writable);

		let operations = bean.operations().collect::<Vec<_>>();
		assert_eq!(operations.len(), 1);
		assert_eq!(operations[0].parameters[0].name, "at");
		assert_eq!(operations[0].action, OperationAction::Action);
	}

	#[test]
	fn declarative_rejects_bad_accessors() {
		struct Flag {
			on: AtomicBool,
		}

		let mut shape = TypeShape::<Flag>::new();
		shape.set_resource(ResourceMetadata::new("test"));
		shape
			.method0("isOn", |f: &Flag| i32::from(f.on.load(Ordering::SeqCst)))
			.attribute("");

		assert!(matches!(
			resolve(&shape, &ResolutionMode::Declarative),
			Err(Error::Resolution {
				source: ResolutionError::NotAnAccessor(_),
				..
			})
		));

		let mut shape = TypeShape::<Flag>::new();
		shape.set_resource(ResourceMetadata::new("test"));
		shape.method0("getNothing", |_: &Flag| ()).attribute("");
		assert!(matches!(
			resolve(&shape, &ResolutionMode::Declarative),
			Err(Error::Resolution {
				source: ResolutionError::VoidGetter(_),
				..
			})
		));
	}

	#[test]
	fn overloads_with_same_arity_are_kept() {
		let mut shape = TypeShape::<Counter>::new();
		shape.method1("bump", |c: &Counter, by: i32| c.count.fetch_add(by, Ordering::SeqCst));
		shape.method1("bump", |c: &Counter, by: i64| {
			c.count.fetch_add(i32::try_from(by).unwrap_or(0), Ordering::SeqCst)
		});

		let bean = resolve(&shape, &ResolutionMode::AutoDiscovery).unwrap();
		assert_eq!(bean.overloads("bump").count(), 2);
	}
}
