//!
//! # MBean
//!
//! Exposes live objects of a running process as management beans: hierarchically named entities
//! with typed attributes and operations that a monitoring or administration transport can read,
//! write and invoke without redeploying code.
//!
//! The crate is the adaptation engine and nothing more. It:
//! - derives a stable hierarchical [`BeanName`] for an object, from its type's resource metadata or
//!   from the object itself when it implements [`SelfNaming`];
//! - resolves which members become attributes and operations, from the declarations in the type's
//!   [`TypeShape`], from caller supplied [`ExplicitDescriptors`], or by auto-discovering accessors;
//! - binds a [`BeanAdapter`] answering get, set and invoke against the live object, turning target
//!   failures and panics into [`Error::TargetInvocation`].
//!
//! Shapes replace runtime reflection: a type implements [`Introspect`] by hand, or derives it with
//! `#[derive(ManagedBean)]` and `#[managed_methods]`.
//!
//! ## Basic example
//!
//! ```
//! use std::sync::{
//!     atomic::{AtomicBool, AtomicI64, Ordering},
//!     Arc,
//! };
//!
//! use sd_mbean::{
//!     BeanServer, Introspect, OperationAction, ResourceMetadata, ServerConfig, TypeShape, Value,
//! };
//!
//! pub struct RuntimeCounter {
//!     start_millis: AtomicI64,
//!     show_seconds: AtomicBool,
//! }
//!
//! impl RuntimeCounter {
//!     fn restart_timer_to_value(&self, start_millis: i64) -> String {
//!         self.start_millis.store(start_millis, Ordering::SeqCst);
//!         format!("Timer restarted to {start_millis}")
//!     }
//! }
//!
//! impl Introspect for RuntimeCounter {
//!     fn describe(shape: &mut TypeShape<Self>) {
//!         shape.set_resource(ResourceMetadata::new("j256.simplejmx").bean_name("RuntimeCounter"));
//!         shape
//!             .field("startMillis", |c: &Self| &c.start_millis)
//!             .read_only("When our timer started");
//!         shape
//!             .field("showSeconds", |c: &Self| &c.show_seconds)
//!             .read_write("Show runtime in seconds");
//!         shape
//!             .method1("restartTimerToValue", Self::restart_timer_to_value)
//!             .param_names(["startMillis"])
//!             .operation(OperationAction::Action, "Restart the timer to a value");
//!     }
//! }
//!
//! let server = BeanServer::new(ServerConfig::default());
//! server.start();
//!
//! let counter = Arc::new(RuntimeCounter {
//!     start_millis: AtomicI64::new(0),
//!     show_seconds: AtomicBool::new(false),
//! });
//!
//! let name = server.register(&counter)?;
//! assert_eq!(name.as_str(), "j256.simplejmx:name=RuntimeCounter");
//!
//! let reply = server.invoke(name.as_str(), "restartTimerToValue", vec![Value::Long(5000)])?;
//! assert_eq!(reply, Value::String("Timer restarted to 5000".into()));
//! assert_eq!(
//!     server.get_attribute(name.as_str(), "startMillis")?,
//!     Value::Long(5000)
//! );
//! # Ok::<(), sd_mbean::Error>(())
//! ```

#![warn(
	clippy::all,
	clippy::pedantic,
	clippy::correctness,
	clippy::perf,
	clippy::style,
	clippy::suspicious,
	clippy::complexity,
	clippy::nursery,
	clippy::unwrap_used,
	unused_qualifications,
	rust_2018_idioms,
	trivial_casts,
	trivial_numeric_casts,
	unused_allocation,
	clippy::unnecessary_cast,
	clippy::cast_lossless,
	clippy::cast_possible_truncation,
	clippy::cast_possible_wrap,
	clippy::cast_precision_loss,
	clippy::cast_sign_loss,
	clippy::dbg_macro,
	clippy::deprecated_cfg_attr,
	clippy::separated_literal_suffix,
	deprecated
)]
#![forbid(deprecated_in_future)]
#![allow(clippy::missing_errors_doc, clippy::module_name_repetitions)]

mod adapter;
mod config;
mod descriptor;
mod error;
mod name;
mod registry;
mod request;
mod resolve;
mod server;
mod shape;
mod value;

pub use adapter::BeanAdapter;
pub use config::{config_path, ConfigError, ModeSelector, ServerConfig, StopPolicy};
pub use descriptor::{
	AttributeFieldInfo, AttributeInfo, AttributeMethodInfo, BeanInfo, ExplicitDescriptors,
	OperationAction, OperationInfo, OperationSignature, ParameterInfo,
};
pub use error::{Error, ErrorKind, MemberError, ResolutionError, Result, TargetError};
pub use name::{
	escape_value, needs_quoting, quote, unescape_value, unquote, BeanName, FolderName, NameBuilder,
	NameParts, SelfNaming, LEAF_KEY,
};
pub use registry::Registry;
pub use request::{RemoteError, Request, Response};
pub use resolve::{resolve, ResolutionMode, ResolvedBean};
pub use server::{BeanServer, RegisterOptions};
pub use shape::{
	FieldDecl, FieldMember, Introspect, ManagedField, ManagedMethods, MethodDecl, MethodMember,
	OperationDecl, Param, ResourceMetadata, TypeShape,
};
pub use value::{coerce, CoercionError, IntoReturn, ManagedType, Value, ValueType};

#[cfg(feature = "derive")]
pub use sd_mbean_derive::{managed_methods, ManagedBean};

/// Items used by generated code, not part of the public API.
#[doc(hidden)]
pub mod __private {
	pub use crate::value::take_arg;
}
