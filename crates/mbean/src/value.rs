use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::error::{MemberError, TargetError};

/// Declared type of an attribute, parameter or return value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
	Void,
	Boolean,
	Byte,
	Short,
	Int,
	Long,
	Float,
	Double,
	Char,
	String,
}

impl ValueType {
	#[must_use]
	pub const fn is_integral(self) -> bool {
		matches!(self, Self::Byte | Self::Short | Self::Int | Self::Long)
	}

	#[must_use]
	pub const fn is_floating(self) -> bool {
		matches!(self, Self::Float | Self::Double)
	}

	#[must_use]
	pub const fn name(self) -> &'static str {
		match self {
			Self::Void => "void",
			Self::Boolean => "boolean",
			Self::Byte => "byte",
			Self::Short => "short",
			Self::Int => "int",
			Self::Long => "long",
			Self::Float => "float",
			Self::Double => "double",
			Self::Char => "char",
			Self::String => "string",
		}
	}
}

impl fmt::Display for ValueType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

/// A dynamically typed value crossing the bean boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Value {
	Unit,
	Bool(bool),
	Byte(i8),
	Short(i16),
	Int(i32),
	Long(i64),
	Float(f32),
	Double(f64),
	Char(char),
	String(String),
}

impl Value {
	#[must_use]
	pub const fn value_type(&self) -> ValueType {
		match self {
			Self::Unit => ValueType::Void,
			Self::Bool(_) => ValueType::Boolean,
			Self::Byte(_) => ValueType::Byte,
			Self::Short(_) => ValueType::Short,
			Self::Int(_) => ValueType::Int,
			Self::Long(_) => ValueType::Long,
			Self::Float(_) => ValueType::Float,
			Self::Double(_) => ValueType::Double,
			Self::Char(_) => ValueType::Char,
			Self::String(_) => ValueType::String,
		}
	}

	const fn integral(&self) -> Option<i64> {
		match *self {
			Self::Byte(v) => Some(v as i64),
			Self::Short(v) => Some(v as i64),
			Self::Int(v) => Some(v as i64),
			Self::Long(v) => Some(v),
			_ => None,
		}
	}

	fn floating(&self) -> Option<f64> {
		match *self {
			Self::Float(v) => Some(f64::from(v)),
			Self::Double(v) => Some(v),
			_ => None,
		}
	}
}

impl fmt::Display for Value {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Unit => f.write_str("()"),
			Self::Bool(v) => write!(f, "{v}"),
			Self::Byte(v) => write!(f, "{v}"),
			Self::Short(v) => write!(f, "{v}"),
			Self::Int(v) => write!(f, "{v}"),
			Self::Long(v) => write!(f, "{v}"),
			Self::Float(v) => write!(f, "{v}"),
			Self::Double(v) => write!(f, "{v}"),
			Self::Char(v) => write!(f, "{v}"),
			Self::String(v) => f.write_str(v),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot coerce {from} value '{value}' to {to}")]
pub struct CoercionError {
	pub from: ValueType,
	pub to: ValueType,
	pub value: String,
}

impl CoercionError {
	fn new(value: &Value, to: ValueType) -> Self {
		Self {
			from: value.value_type(),
			to,
			value: value.to_string(),
		}
	}
}

/// Converts `value` to the `target` type using the fixed rule set:
/// - identical types pass through;
/// - integral to integral when the value fits the target range;
/// - integral to float or double;
/// - float to double, and double to float when the value is within float range;
/// - float or double to integral only for integral values within range;
/// - char to a one-char string and back;
/// - strings parse into booleans, numbers and chars.
///
/// Nothing converts implicitly to `void`, and nothing but a char converts to a string.
pub fn coerce(value: Value, target: ValueType) -> Result<Value, CoercionError> {
	if value.value_type() == target {
		return Ok(value);
	}

	let coerced = match (&value, target) {
		(_, ValueType::Void) => None,
		(Value::String(text), _) => parse(text.trim(), target),
		(Value::Char(c), ValueType::String) => Some(Value::String(c.to_string())),
		(_, target) if target.is_integral() => value
			.integral()
			.or_else(|| value.floating().and_then(exact_integral))
			.and_then(|int| narrow(int, target)),
		(_, ValueType::Double) => value
			.floating()
			.map(Value::Double)
			.or_else(|| value.integral().map(int_to_double)),
		(_, ValueType::Float) => value
			.floating()
			.and_then(double_to_float)
			.or_else(|| value.integral().map(int_to_float)),
		_ => None,
	};

	coerced.ok_or_else(|| CoercionError::new(&value, target))
}

fn narrow(int: i64, target: ValueType) -> Option<Value> {
	match target {
		ValueType::Byte => i8::try_from(int).ok().map(Value::Byte),
		ValueType::Short => i16::try_from(int).ok().map(Value::Short),
		ValueType::Int => i32::try_from(int).ok().map(Value::Int),
		ValueType::Long => Some(Value::Long(int)),
		_ => None,
	}
}

#[allow(clippy::cast_possible_truncation)]
fn exact_integral(float: f64) -> Option<i64> {
	// i64::MAX is not representable as f64, the upper bound must be exclusive
	const LIMIT: f64 = 9_223_372_036_854_775_808.0;

	(float.is_finite() && float.fract() == 0.0 && (-LIMIT..LIMIT).contains(&float))
		.then(|| float as i64)
}

#[allow(clippy::cast_possible_truncation)]
fn double_to_float(double: f64) -> Option<Value> {
	(!double.is_finite() || double.abs() <= f64::from(f32::MAX)).then(|| Value::Float(double as f32))
}

#[allow(clippy::cast_precision_loss)]
fn int_to_double(int: i64) -> Value {
	Value::Double(int as f64)
}

#[allow(clippy::cast_precision_loss)]
fn int_to_float(int: i64) -> Value {
	Value::Float(int as f32)
}

fn parse(text: &str, target: ValueType) -> Option<Value> {
	match target {
		ValueType::Boolean if text.eq_ignore_ascii_case("true") => Some(Value::Bool(true)),
		ValueType::Boolean if text.eq_ignore_ascii_case("false") => Some(Value::Bool(false)),
		ValueType::Byte => text.parse().ok().map(Value::Byte),
		ValueType::Short => text.parse().ok().map(Value::Short),
		ValueType::Int => text.parse().ok().map(Value::Int),
		ValueType::Long => text.parse().ok().map(Value::Long),
		ValueType::Float => text.parse().ok().and_then(double_to_float),
		ValueType::Double => text.parse().ok().map(Value::Double),
		ValueType::Char => {
			let mut chars = text.chars();
			match (chars.next(), chars.next()) {
				(Some(c), None) => Some(Value::Char(c)),
				_ => None,
			}
		}
		_ => None,
	}
}

/// A Rust type that maps onto one [`ValueType`].
pub trait ManagedType: Sized {
	const VALUE_TYPE: ValueType;

	fn into_value(self) -> Value;

	/// Coerces `value` to [`Self::VALUE_TYPE`] and unwraps it.
	fn from_value(value: Value) -> Result<Self, CoercionError>;
}

macro_rules! managed_type {
	($($ty:ty => $value_type:ident($variant:ident)),* $(,)?) => {
		$(
			impl ManagedType for $ty {
				const VALUE_TYPE: ValueType = ValueType::$value_type;

				fn into_value(self) -> Value {
					Value::$variant(self)
				}

				fn from_value(value: Value) -> Result<Self, CoercionError> {
					let target = <Self as ManagedType>::VALUE_TYPE;
					match coerce(value, target)? {
						Value::$variant(v) => Ok(v),
						other => Err(CoercionError::new(&other, target)),
					}
				}
			}

			impl IntoReturn for $ty {
				const VALUE_TYPE: ValueType = ValueType::$value_type;

				fn into_return(self) -> Result<Value, TargetError> {
					Ok(self.into_value())
				}
			}
		)*
	};
}

managed_type! {
	bool => Boolean(Bool),
	i8 => Byte(Byte),
	i16 => Short(Short),
	i32 => Int(Int),
	i64 => Long(Long),
	f32 => Float(Float),
	f64 => Double(Double),
	char => Char(Char),
	String => String(String),
}

impl ManagedType for () {
	const VALUE_TYPE: ValueType = ValueType::Void;

	fn into_value(self) -> Value {
		Value::Unit
	}

	fn from_value(value: Value) -> Result<Self, CoercionError> {
		match value {
			Value::Unit => Ok(()),
			other => Err(CoercionError::new(&other, ValueType::Void)),
		}
	}
}

impl IntoReturn for () {
	const VALUE_TYPE: ValueType = ValueType::Void;

	fn into_return(self) -> Result<Value, TargetError> {
		Ok(Value::Unit)
	}
}

/// What a bean method may return: a [`ManagedType`] or a `Result` of one.
///
/// The error side of a `Result` becomes a [`TargetError`] carrying the error's type name and message.
pub trait IntoReturn {
	const VALUE_TYPE: ValueType;

	fn into_return(self) -> Result<Value, TargetError>;
}

impl<V: ManagedType, E: fmt::Display> IntoReturn for Result<V, E> {
	const VALUE_TYPE: ValueType = V::VALUE_TYPE;

	fn into_return(self) -> Result<Value, TargetError> {
		self.map(ManagedType::into_value)
			.map_err(|e| TargetError::from_display(&e))
	}
}

/// Pulls the next positional argument out of an invocation and converts it.
#[doc(hidden)]
pub fn take_arg<A: ManagedType>(args: &mut std::vec::IntoIter<Value>) -> Result<A, MemberError> {
	A::from_value(args.next().unwrap_or(Value::Unit)).map_err(MemberError::from)
}
