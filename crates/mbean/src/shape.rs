//! Static "describe thyself" tables.
//!
//! A [`TypeShape`] lists the members of a type that the adaptation engine may touch: fields backed by
//! a [`ManagedField`] cell and `&self` methods taking and returning [`ManagedType`] values. It also
//! records the declarative metadata used by [`ResolutionMode::Declarative`].
//!
//! Shapes are written by hand through [`Introspect::describe`], or generated at build time by
//! `#[derive(ManagedBean)]` and `#[managed_methods]`.
//!
//! [`ResolutionMode::Declarative`]: crate::ResolutionMode::Declarative

use std::{
	fmt,
	sync::{
		atomic::{AtomicBool, AtomicI16, AtomicI32, AtomicI64, AtomicI8, Ordering},
		PoisonError,
	},
};

use super::{
	descriptor::{AttributeFieldInfo, OperationAction},
	error::MemberError,
	name::{FolderName, NameParts, SelfNaming},
	value::{take_arg, IntoReturn, ManagedType, Value, ValueType},
};

/// A type that can describe its own manageable members.
pub trait Introspect: Send + Sync + Sized + 'static {
	fn describe(shape: &mut TypeShape<Self>);

	#[must_use]
	fn shape() -> TypeShape<Self> {
		let mut shape = TypeShape::new();
		Self::describe(&mut shape);
		shape
	}
}

/// Method half of a shape, implemented by `#[managed_methods]` on an inherent impl block.
pub trait ManagedMethods: Send + Sync + Sized + 'static {
	fn describe_methods(shape: &mut TypeShape<Self>);
}

/// A field cell the engine can read and, when [`Self::WRITABLE`], write through `&self`.
///
/// Implemented for atomics and locks (writable) and for plain primitives (read-only). Keeping the
/// target safe for concurrent access is the cell's job, the engine never locks on its own.
pub trait ManagedField: Send + Sync {
	const VALUE_TYPE: ValueType;
	const WRITABLE: bool;

	fn load(&self) -> Value;

	fn store(&self, value: Value) -> Result<(), MemberError>;
}

macro_rules! atomic_field {
	($($atomic:ty => $inner:ty),* $(,)?) => {
		$(
			impl ManagedField for $atomic {
				const VALUE_TYPE: ValueType = <$inner as ManagedType>::VALUE_TYPE;
				const WRITABLE: bool = true;

				fn load(&self) -> Value {
					<$atomic>::load(self, Ordering::SeqCst).into_value()
				}

				fn store(&self, value: Value) -> Result<(), MemberError> {
					<$atomic>::store(self, <$inner>::from_value(value)?, Ordering::SeqCst);
					Ok(())
				}
			}
		)*
	};
}

atomic_field! {
	AtomicBool => bool,
	AtomicI8 => i8,
	AtomicI16 => i16,
	AtomicI32 => i32,
	AtomicI64 => i64,
}

macro_rules! constant_field {
	($($ty:ty),* $(,)?) => {
		$(
			impl ManagedField for $ty {
				const VALUE_TYPE: ValueType = <$ty as ManagedType>::VALUE_TYPE;
				const WRITABLE: bool = false;

				fn load(&self) -> Value {
					Clone::clone(self).into_value()
				}

				fn store(&self, _: Value) -> Result<(), MemberError> {
					Err(MemberError::ReadOnly)
				}
			}
		)*
	};
}

constant_field!(bool, i8, i16, i32, i64, f32, f64, char, String);

impl<V: ManagedType + Clone + Send + Sync> ManagedField for parking_lot::RwLock<V> {
	const VALUE_TYPE: ValueType = V::VALUE_TYPE;
	const WRITABLE: bool = true;

	fn load(&self) -> Value {
		self.read().clone().into_value()
	}

	fn store(&self, value: Value) -> Result<(), MemberError> {
		*self.write() = V::from_value(value)?;
		Ok(())
	}
}

impl<V: ManagedType + Clone + Send + Sync> ManagedField for parking_lot::Mutex<V> {
	const VALUE_TYPE: ValueType = V::VALUE_TYPE;
	const WRITABLE: bool = true;

	fn load(&self) -> Value {
		self.lock().clone().into_value()
	}

	fn store(&self, value: Value) -> Result<(), MemberError> {
		*self.lock() = V::from_value(value)?;
		Ok(())
	}
}

impl<V: ManagedType + Clone + Send + Sync> ManagedField for std::sync::RwLock<V> {
	const VALUE_TYPE: ValueType = V::VALUE_TYPE;
	const WRITABLE: bool = true;

	fn load(&self) -> Value {
		self.read()
			.unwrap_or_else(PoisonError::into_inner)
			.clone()
			.into_value()
	}

	fn store(&self, value: Value) -> Result<(), MemberError> {
		*self.write().unwrap_or_else(PoisonError::into_inner) = V::from_value(value)?;
		Ok(())
	}
}

impl<V: ManagedType + Clone + Send + Sync> ManagedField for std::sync::Mutex<V> {
	const VALUE_TYPE: ValueType = V::VALUE_TYPE;
	const WRITABLE: bool = true;

	fn load(&self) -> Value {
		self.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.clone()
			.into_value()
	}

	fn store(&self, value: Value) -> Result<(), MemberError> {
		*self.lock().unwrap_or_else(PoisonError::into_inner) = V::from_value(value)?;
		Ok(())
	}
}

type FieldRead<T> = Box<dyn Fn(&T) -> Value + Send + Sync>;
type FieldWrite<T> = Box<dyn Fn(&T, Value) -> Result<(), MemberError> + Send + Sync>;
type MethodCall<T> = Box<dyn Fn(&T, Vec<Value>) -> Result<Value, MemberError> + Send + Sync>;

pub struct FieldMember<T> {
	name: String,
	value_type: ValueType,
	writable: bool,
	read: FieldRead<T>,
	write: FieldWrite<T>,
}

impl<T> FieldMember<T> {
	#[must_use]
	pub fn name(&self) -> &str {
		&self.name
	}

	#[must_use]
	pub const fn value_type(&self) -> ValueType {
		self.value_type
	}

	#[must_use]
	pub const fn is_writable(&self) -> bool {
		self.writable
	}

	pub(crate) fn read(&self, target: &T) -> Value {
		(self.read)(target)
	}

	pub(crate) fn write(&self, target: &T, value: Value) -> Result<(), MemberError> {
		(self.write)(target, value)
	}
}

impl<T> fmt::Debug for FieldMember<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("FieldMember")
			.field("name", &self.name)
			.field("value_type", &self.value_type)
			.field("writable", &self.writable)
			.finish_non_exhaustive()
	}
}

/// A method parameter, with its source-level name when one is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
	pub value_type: ValueType,
	pub name: Option<String>,
}

impl Param {
	#[must_use]
	pub const fn of<A: ManagedType>() -> Self {
		Self {
			value_type: A::VALUE_TYPE,
			name: None,
		}
	}

	pub fn named<A: ManagedType>(name: impl Into<String>) -> Self {
		Self {
			value_type: A::VALUE_TYPE,
			name: Some(name.into()),
		}
	}
}

pub struct MethodMember<T> {
	name: String,
	params: Vec<Param>,
	returns: ValueType,
	call: MethodCall<T>,
}

impl<T> MethodMember<T> {
	#[must_use]
	pub fn name(&self) -> &str {
		&self.name
	}

	#[must_use]
	pub fn params(&self) -> &[Param] {
		&self.params
	}

	#[must_use]
	pub const fn returns(&self) -> ValueType {
		self.returns
	}

	#[must_use]
	pub fn arity(&self) -> usize {
		self.params.len()
	}

	pub(crate) fn call(&self, target: &T, args: Vec<Value>) -> Result<Value, MemberError> {
		(self.call)(target, args)
	}
}

impl<T> fmt::Debug for MethodMember<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("MethodMember")
			.field("name", &self.name)
			.field("params", &self.params)
			.field("returns", &self.returns)
			.finish_non_exhaustive()
	}
}

/// Type level declarative metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceMetadata {
	pub domain: Option<String>,
	/// Leaf name; the short type name is used when absent.
	pub bean_name: Option<String>,
	pub folders: Vec<FolderName>,
	/// `"key=value"` qualifiers rendered before the leaf.
	pub field_values: Vec<String>,
	pub description: Option<String>,
}

impl ResourceMetadata {
	pub fn new(domain: impl Into<String>) -> Self {
		Self {
			domain: Some(domain.into()),
			..Default::default()
		}
	}

	#[must_use]
	pub fn bean_name(mut self, bean_name: impl Into<String>) -> Self {
		self.bean_name = Some(bean_name.into());
		self
	}

	#[must_use]
	pub fn folder(mut self, folder: FolderName) -> Self {
		self.folders.push(folder);
		self
	}

	#[must_use]
	pub fn field_value(mut self, entry: impl Into<String>) -> Self {
		self.field_values.push(entry.into());
		self
	}

	#[must_use]
	pub fn description(mut self, description: impl Into<String>) -> Self {
		self.description = Some(description.into());
		self
	}
}

/// Declarative metadata of one operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationDecl {
	pub parameter_names: Vec<String>,
	pub parameter_descriptions: Vec<String>,
	pub action: OperationAction,
	pub description: String,
}

#[derive(Debug, Clone)]
pub(crate) struct DeclaredAccessor {
	pub method: usize,
	pub description: String,
}

#[derive(Debug, Clone)]
pub(crate) struct DeclaredOperation {
	pub method: usize,
	pub decl: OperationDecl,
}

/// Members and metadata of `T`.
pub struct TypeShape<T> {
	type_name: &'static str,
	resource: Option<ResourceMetadata>,
	naming: Option<fn(&T) -> NameParts>,
	fields: Vec<FieldMember<T>>,
	methods: Vec<MethodMember<T>>,
	declared_fields: Vec<AttributeFieldInfo>,
	declared_accessors: Vec<DeclaredAccessor>,
	declared_operations: Vec<DeclaredOperation>,
}

impl<T: 'static> Default for TypeShape<T> {
	fn default() -> Self {
		Self::new()
	}
}

impl<T> fmt::Debug for TypeShape<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("TypeShape")
			.field("type_name", &self.type_name)
			.field("resource", &self.resource)
			.field("self_naming", &self.naming.is_some())
			.field("fields", &self.fields)
			.field("methods", &self.methods)
			.finish_non_exhaustive()
	}
}

impl<T: 'static> TypeShape<T> {
	#[must_use]
	pub fn new() -> Self {
		Self {
			type_name: std::any::type_name::<T>(),
			resource: None,
			naming: None,
			fields: Vec::new(),
			methods: Vec::new(),
			declared_fields: Vec::new(),
			declared_accessors: Vec::new(),
			declared_operations: Vec::new(),
		}
	}

	pub fn set_resource(&mut self, resource: ResourceMetadata) -> &mut Self {
		self.resource = Some(resource);
		self
	}

	/// Registers the [`SelfNaming`] capability, consulted whenever the bean's name is derived.
	pub fn self_naming(&mut self) -> &mut Self
	where
		T: SelfNaming,
	{
		self.naming = Some(NameParts::of::<T>);
		self
	}

	pub fn field<F: ManagedField + 'static>(
		&mut self,
		name: impl Into<String>,
		access: fn(&T) -> &F,
	) -> FieldDecl<'_, T> {
		let name = name.into();

		self.fields.push(FieldMember {
			name: name.clone(),
			value_type: F::VALUE_TYPE,
			writable: F::WRITABLE,
			read: Box::new(move |target: &T| ManagedField::load(access(target))),
			write: Box::new(move |target: &T, value: Value| {
				ManagedField::store(access(target), value)
			}),
		});

		FieldDecl {
			shape: self,
			field: name,
		}
	}

	/// Raw method registration; arguments arrive already coerced to the declared parameter types.
	pub fn method<C>(
		&mut self,
		name: impl Into<String>,
		params: Vec<Param>,
		returns: ValueType,
		call: C,
	) -> MethodDecl<'_, T>
	where
		C: Fn(&T, Vec<Value>) -> Result<Value, MemberError> + Send + Sync + 'static,
	{
		self.methods.push(MethodMember {
			name: name.into(),
			params,
			returns,
			call: Box::new(call),
		});

		MethodDecl {
			method: self.methods.len() - 1,
			shape: self,
		}
	}

	pub fn method0<R, F>(&mut self, name: impl Into<String>, f: F) -> MethodDecl<'_, T>
	where
		R: IntoReturn,
		F: Fn(&T) -> R + Send + Sync + 'static,
	{
		self.method(
			name,
			Vec::new(),
			R::VALUE_TYPE,
			move |target: &T, _: Vec<Value>| f(target).into_return().map_err(MemberError::from),
		)
	}

	pub fn method1<A, R, F>(&mut self, name: impl Into<String>, f: F) -> MethodDecl<'_, T>
	where
		A: ManagedType,
		R: IntoReturn,
		F: Fn(&T, A) -> R + Send + Sync + 'static,
	{
		self.method(
			name,
			vec![Param::of::<A>()],
			R::VALUE_TYPE,
			move |target: &T, args: Vec<Value>| {
				let mut args = args.into_iter();
				let a = take_arg::<A>(&mut args)?;
				f(target, a).into_return().map_err(MemberError::from)
			},
		)
	}

	pub fn method2<A, B, R, F>(&mut self, name: impl Into<String>, f: F) -> MethodDecl<'_, T>
	where
		A: ManagedType,
		B: ManagedType,
		R: IntoReturn,
		F: Fn(&T, A, B) -> R + Send + Sync + 'static,
	{
		self.method(
			name,
			vec![Param::of::<A>(), Param::of::<B>()],
			R::VALUE_TYPE,
			move |target: &T, args: Vec<Value>| {
				let mut args = args.into_iter();
				let a = take_arg::<A>(&mut args)?;
				let b = take_arg::<B>(&mut args)?;
				f(target, a, b).into_return().map_err(MemberError::from)
			},
		)
	}
}

impl<T> TypeShape<T> {
	#[must_use]
	pub const fn type_name(&self) -> &'static str {
		self.type_name
	}

	/// Last path segment of the type name, without generics.
	#[must_use]
	pub fn short_type_name(&self) -> &'static str {
		let base = self
			.type_name
			.split('<')
			.next()
			.unwrap_or(self.type_name);
		base.rsplit("::").next().unwrap_or(base)
	}

	#[must_use]
	pub const fn resource(&self) -> Option<&ResourceMetadata> {
		self.resource.as_ref()
	}

	#[must_use]
	pub const fn has_self_naming(&self) -> bool {
		self.naming.is_some()
	}

	#[must_use]
	pub fn fields(&self) -> &[FieldMember<T>] {
		&self.fields
	}

	#[must_use]
	pub fn methods(&self) -> &[MethodMember<T>] {
		&self.methods
	}

	pub(crate) fn name_parts(&self, target: &T) -> Option<NameParts> {
		self.naming.map(|naming| naming(target))
	}

	pub(crate) fn declared_fields(&self) -> &[AttributeFieldInfo] {
		&self.declared_fields
	}

	pub(crate) fn declared_accessors(&self) -> &[DeclaredAccessor] {
		&self.declared_accessors
	}

	pub(crate) fn declared_operations(&self) -> &[DeclaredOperation] {
		&self.declared_operations
	}
}

/// Declares the field just added to a shape as an attribute.
pub struct FieldDecl<'a, T> {
	shape: &'a mut TypeShape<T>,
	field: String,
}

impl<T> FieldDecl<'_, T> {
	pub fn attribute(self, readable: bool, writable: bool, description: impl Into<String>) {
		self.shape.declared_fields.push(AttributeFieldInfo::new(
			self.field,
			readable,
			writable,
			description,
		));
	}

	pub fn read_only(self, description: impl Into<String>) {
		self.attribute(true, false, description);
	}

	pub fn read_write(self, description: impl Into<String>) {
		self.attribute(true, true, description);
	}

	pub fn write_only(self, description: impl Into<String>) {
		self.attribute(false, true, description);
	}
}

/// Declares the method just added to a shape as an attribute accessor or an operation.
pub struct MethodDecl<'a, T> {
	shape: &'a mut TypeShape<T>,
	method: usize,
}

impl<T> MethodDecl<'_, T> {
	/// Names the parameters, in order.
	#[must_use]
	pub fn param_names<N: Into<String>>(self, names: impl IntoIterator<Item = N>) -> Self {
		for (param, name) in self.shape.methods[self.method]
			.params
			.iter_mut()
			.zip(names)
		{
			param.name = Some(name.into());
		}
		self
	}

	/// Declares a getter or setter; its role comes from the method name and arity.
	pub fn attribute(self, description: impl Into<String>) {
		self.shape.declared_accessors.push(DeclaredAccessor {
			method: self.method,
			description: description.into(),
		});
	}

	pub fn operation(self, action: OperationAction, description: impl Into<String>) {
		self.operation_with(OperationDecl {
			action,
			description: description.into(),
			..Default::default()
		});
	}

	pub fn operation_with(self, decl: OperationDecl) {
		self.shape.declared_operations.push(DeclaredOperation {
			method: self.method,
			decl,
		});
	}
}
