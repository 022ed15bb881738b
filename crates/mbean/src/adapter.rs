use std::{
	any::TypeId,
	fmt,
	panic::{catch_unwind, AssertUnwindSafe},
	sync::{
		atomic::{AtomicU8, Ordering},
		Arc, Weak,
	},
};

use tracing::{trace, warn};

use super::{
	descriptor::{AttributeInfo, BeanInfo, OperationSignature},
	error::{Error, MemberError, Result, TargetError},
	name::BeanName,
	resolve::{resolve, Access, ResolutionMode, ResolvedBean},
	shape::{Introspect, TypeShape},
	value::{coerce, Value},
};

const ACTIVE: u8 = 0;
const SUSPENDED: u8 = 1;
const DETACHED: u8 = 2;

enum CallFailure {
	Gone,
	Member(MemberError),
}

impl From<MemberError> for CallFailure {
	fn from(e: MemberError) -> Self {
		Self::Member(e)
	}
}

/// Type erased pairing of a target with its shape.
trait BoundTarget: Send + Sync {
	fn type_name(&self) -> &'static str;

	fn target_type(&self) -> TypeId;

	fn target_ptr(&self) -> *const ();

	fn read(&self, access: Access) -> Result<Value, CallFailure>;

	fn write(&self, access: Access, value: Value) -> Result<(), CallFailure>;

	fn call(&self, method: usize, args: Vec<Value>) -> Result<Value, CallFailure>;
}

struct Bound<T> {
	target: Weak<T>,
	shape: TypeShape<T>,
}

impl<T: Introspect> Bound<T> {
	fn target(&self) -> Result<Arc<T>, CallFailure> {
		self.target.upgrade().ok_or(CallFailure::Gone)
	}
}

impl<T: Introspect> BoundTarget for Bound<T> {
	fn type_name(&self) -> &'static str {
		self.shape.type_name()
	}

	fn target_type(&self) -> TypeId {
		TypeId::of::<T>()
	}

	fn target_ptr(&self) -> *const () {
		self.target.as_ptr().cast()
	}

	fn read(&self, access: Access) -> Result<Value, CallFailure> {
		let target = self.target()?;
		match access {
			Access::Field(idx) => Ok(self.shape.fields()[idx].read(&target)),
			Access::Method(idx) => Ok(self.shape.methods()[idx].call(&target, Vec::new())?),
		}
	}

	fn write(&self, access: Access, value: Value) -> Result<(), CallFailure> {
		let target = self.target()?;
		match access {
			Access::Field(idx) => Ok(self.shape.fields()[idx].write(&target, value)?),
			Access::Method(idx) => {
				self.shape.methods()[idx].call(&target, vec![value])?;
				Ok(())
			}
		}
	}

	fn call(&self, method: usize, args: Vec<Value>) -> Result<Value, CallFailure> {
		let target = self.target()?;
		Ok(self.shape.methods()[method].call(&target, args)?)
	}
}

/// Uniform get/set/invoke surface over one live object.
///
/// The adapter only holds a [`Weak`] reference: the caller keeps the object alive, and a dropped
/// object makes every call fail with [`Error::TargetGone`]. Once unregistered the adapter is
/// detached and fails every call with [`Error::Unregistered`], even through references obtained
/// before the unregistration.
///
/// Calls never lock the target, concurrent safety of its state is up to the target itself.
pub struct BeanAdapter {
	name: BeanName,
	bound: Box<dyn BoundTarget>,
	resolved: ResolvedBean,
	state: AtomicU8,
}

impl fmt::Debug for BeanAdapter {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("BeanAdapter")
			.field("name", &self.name)
			.field("type_name", &self.bound.type_name())
			.field("resolved", &self.resolved)
			.field("state", &self.state.load(Ordering::Relaxed))
			.finish()
	}
}

impl BeanAdapter {
	/// Resolves the members of `T` under `mode` and binds them to `target`.
	pub fn bind<T: Introspect>(name: BeanName, target: &Arc<T>, mode: &ResolutionMode) -> Result<Self> {
		let shape = T::shape();
		let resolved = resolve(&shape, mode)?;

		Ok(Self::from_parts(name, target, shape, resolved))
	}

	pub(crate) fn from_parts<T: Introspect>(
		name: BeanName,
		target: &Arc<T>,
		shape: TypeShape<T>,
		resolved: ResolvedBean,
	) -> Self {
		Self {
			name,
			bound: Box::new(Bound {
				target: Arc::downgrade(target),
				shape,
			}),
			resolved,
			state: AtomicU8::new(ACTIVE),
		}
	}

	#[must_use]
	pub const fn name(&self) -> &BeanName {
		&self.name
	}

	#[must_use]
	pub fn type_name(&self) -> &'static str {
		self.bound.type_name()
	}

	#[must_use]
	pub const fn resolved(&self) -> &ResolvedBean {
		&self.resolved
	}

	pub fn attributes(&self) -> impl Iterator<Item = &AttributeInfo> {
		self.resolved.attributes()
	}

	pub fn operations(&self) -> impl Iterator<Item = &OperationSignature> {
		self.resolved.operations()
	}

	#[must_use]
	pub fn info(&self) -> BeanInfo {
		BeanInfo {
			name: self.name.to_string(),
			type_name: self.type_name().to_string(),
			description: self.resolved.description().to_string(),
			attributes: self.attributes().cloned().collect(),
			operations: self.operations().cloned().collect(),
		}
	}

	#[must_use]
	pub fn is_active(&self) -> bool {
		self.state.load(Ordering::Acquire) == ACTIVE
	}

	/// Whether this adapter was bound to exactly `target`.
	#[must_use]
	pub fn is_bound_to<T: 'static>(&self, target: &Arc<T>) -> bool {
		self.bound.target_type() == TypeId::of::<T>()
			&& std::ptr::eq(self.bound.target_ptr(), Arc::as_ptr(target).cast())
	}

	pub fn get_attribute(&self, attribute: &str) -> Result<Value> {
		self.ensure_active()?;

		let resolved = self
			.resolved
			.resolved_attribute(attribute)
			.ok_or_else(|| Error::NoSuchAttribute(attribute.to_string()))?;
		let access = resolved
			.read
			.ok_or_else(|| Error::NotReadable(attribute.to_string()))?;

		trace!(bean = %self.name, attribute, "Reading attribute;");

		self.guard(attribute, || self.bound.read(access))
	}

	/// Coerces `value` to the attribute's declared type, then writes it.
	pub fn set_attribute(&self, attribute: &str, value: Value) -> Result<()> {
		self.ensure_active()?;

		let resolved = self
			.resolved
			.resolved_attribute(attribute)
			.ok_or_else(|| Error::NoSuchAttribute(attribute.to_string()))?;
		let access = resolved
			.write
			.ok_or_else(|| Error::NotWritable(attribute.to_string()))?;
		let value =
			coerce(value, resolved.info.value_type).map_err(|source| Error::TypeCoercion {
				member: attribute.to_string(),
				source,
			})?;

		trace!(bean = %self.name, attribute, "Writing attribute;");

		self.guard(attribute, || self.bound.write(access, value))
	}

	/// Invokes the overload of `operation` taking `args.len()` arguments and returns the target's
	/// own return value.
	pub fn invoke(&self, operation: &str, args: Vec<Value>) -> Result<Value> {
		self.ensure_active()?;

		let overloads = self.resolved.resolved_overloads(operation).collect::<Vec<_>>();
		if overloads.is_empty() {
			return Err(Error::NoSuchOperation(operation.to_string()));
		}

		let mut matching = overloads
			.iter()
			.filter(|overload| overload.signature.arity() == args.len());
		let selected = match (matching.next(), matching.next()) {
			(Some(selected), None) => *selected,
			(None, _) => {
				return Err(Error::ArityMismatch {
					operation: operation.to_string(),
					given: args.len(),
					expected: overloads
						.iter()
						.map(|overload| overload.signature.arity())
						.collect(),
				});
			}
			(Some(_), Some(_)) => {
				return Err(Error::AmbiguousOperation {
					operation: operation.to_string(),
					arity: args.len(),
				});
			}
		};

		let args = args
			.into_iter()
			.zip(&selected.signature.parameters)
			.map(|(arg, param)| {
				coerce(arg, param.value_type).map_err(|source| Error::TypeCoercion {
					member: format!("{operation}({})", param.name),
					source,
				})
			})
			.collect::<Result<Vec<_>>>()?;

		trace!(bean = %self.name, operation, arity = args.len(), "Invoking operation;");

		let method = selected.method;
		self.guard(operation, || self.bound.call(method, args))
	}

	pub(crate) fn detach(&self) {
		self.state.store(DETACHED, Ordering::Release);
	}

	pub(crate) fn suspend(&self) {
		// A detached adapter stays detached
		let _ = self
			.state
			.compare_exchange(ACTIVE, SUSPENDED, Ordering::AcqRel, Ordering::Acquire);
	}

	pub(crate) fn resume(&self) {
		let _ = self
			.state
			.compare_exchange(SUSPENDED, ACTIVE, Ordering::AcqRel, Ordering::Acquire);
	}

	fn ensure_active(&self) -> Result<()> {
		match self.state.load(Ordering::Acquire) {
			ACTIVE => Ok(()),
			SUSPENDED => Err(Error::ServerNotRunning),
			_ => Err(Error::Unregistered(self.name.to_string())),
		}
	}

	/// Runs a target access, turning target failures and panics into [`Error`]s.
	fn guard<R>(&self, member: &str, access: impl FnOnce() -> Result<R, CallFailure>) -> Result<R> {
		match catch_unwind(AssertUnwindSafe(access)) {
			Ok(Ok(value)) => Ok(value),
			Ok(Err(CallFailure::Gone)) => Err(Error::TargetGone(self.name.to_string())),
			Ok(Err(CallFailure::Member(MemberError::Coercion(source)))) => {
				Err(Error::TypeCoercion {
					member: member.to_string(),
					source,
				})
			}
			Ok(Err(CallFailure::Member(MemberError::Target(source)))) => {
				Err(Error::TargetInvocation {
					member: member.to_string(),
					source,
				})
			}
			Ok(Err(CallFailure::Member(MemberError::ReadOnly))) => {
				Err(Error::NotWritable(member.to_string()))
			}
			Err(payload) => {
				let source = TargetError::from_panic(payload.as_ref());
				warn!(bean = %self.name, member, ?source, "Bean target panicked;");
				Err(Error::TargetInvocation {
					member: member.to_string(),
					source,
				})
			}
		}
	}
}
