//! Build-time generation of `sd-mbean` type shapes.
//!
//! `#[derive(ManagedBean)]` writes the `Introspect` impl of a struct from its `#[mbean(..)]`
//! metadata and annotated fields; `#[managed_methods]` on an inherent impl block writes the matching
//! `ManagedMethods` impl, recording every `pub fn(&self, ..)` with its parameter names.

use proc_macro::TokenStream;

mod attr;
mod bean;
mod methods;

/// Derives `sd_mbean::Introspect` for a struct with named fields.
///
/// Type level metadata:
/// ```ignore
/// #[derive(ManagedBean)]
/// #[mbean(
///     domain = "j256.simplejmx",
///     name = "RuntimeCounter",
///     folders("counters", "type=runtime"),
///     fields("shard=3"),
///     description = "Counter that shows the runtime",
/// )]
/// pub struct RuntimeCounter {
///     #[mbean(rename = "startMillis", attribute(description = "When our timer started"))]
///     start_millis: AtomicI64,
///     #[mbean(rename = "showSeconds", attribute(writable, description = "Show in seconds"))]
///     show_seconds: AtomicBool,
///     #[mbean(field)]
///     hits: AtomicI64,
/// }
/// ```
///
/// Only fields carrying `#[mbean(..)]` are part of the shape. `attribute` declares them for
/// declarative registration, `field` merely exposes them to explicit and auto-discovery modes.
/// `self_naming` registers the type's `SelfNaming` impl. The methods come from the type's
/// `#[managed_methods]` block unless `no_methods` is set.
#[proc_macro_derive(ManagedBean, attributes(mbean))]
pub fn derive_managed_bean(input: TokenStream) -> TokenStream {
	bean::derive_impl(input)
}

/// Generates `sd_mbean::ManagedMethods` from an inherent impl block.
///
/// Every `pub fn(&self, ..)` is recorded, so its parameter and return types must be managed types;
/// mark any other public method `#[mbean(skip)]`. Methods may be declared as attributes or
/// operations for declarative registration:
/// ```ignore
/// #[managed_methods]
/// impl RuntimeCounter {
///     #[mbean(attribute(description = "Run time in seconds or milliseconds"))]
///     pub fn get_run_time(&self) -> i64 { .. }
///
///     #[mbean(rename = "restartTimerToValue", operation(
///         action = "action",
///         params("startMillis"),
///         descriptions("Milliseconds to set our start-time to"),
///         description = "Restart the timer to a value",
///     ))]
///     pub fn restart_timer_to_value(&self, start_millis: i64) -> String { .. }
/// }
/// ```
#[proc_macro_attribute]
pub fn managed_methods(args: TokenStream, input: TokenStream) -> TokenStream {
	methods::managed_methods_impl(args, input)
}
