use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard};
use tracing::{debug, info, instrument, warn};

use super::{
	adapter::BeanAdapter,
	config::{ServerConfig, StopPolicy},
	descriptor::{BeanInfo, ExplicitDescriptors},
	error::{Error, Result},
	name::{derive_name, BeanName},
	registry::Registry,
	request::{Request, Response},
	resolve::{resolve, ResolutionMode},
	shape::Introspect,
	value::Value,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
	Created,
	Running,
	Stopped,
}

/// Per-registration overrides.
#[derive(Debug, Clone, Default)]
pub struct RegisterOptions {
	/// Falls back to the configured default mode.
	pub mode: Option<ResolutionMode>,
	/// Falls back to the name derived from self-naming and resource metadata.
	pub name: Option<BeanName>,
	/// Rendered after the folders, before the leaf.
	pub qualifiers: Vec<(String, String)>,
}

impl RegisterOptions {
	#[must_use]
	pub fn mode(mut self, mode: ResolutionMode) -> Self {
		self.mode = Some(mode);
		self
	}

	#[must_use]
	pub fn name(mut self, name: BeanName) -> Self {
		self.name = Some(name);
		self
	}

	#[must_use]
	pub fn qualifier(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.qualifiers.push((key.into(), value.into()));
		self
	}
}

/// Owns the [`Registry`] and ties it to a start/stop lifecycle.
///
/// There is no global instance: whoever needs registration access is handed the server. Every
/// registration, lookup and request requires the server to be running. Stopping follows the
/// configured [`StopPolicy`].
#[derive(Debug)]
pub struct BeanServer {
	config: ServerConfig,
	registry: Registry,
	lifecycle: RwLock<Lifecycle>,
}

impl Default for BeanServer {
	fn default() -> Self {
		Self::new(ServerConfig::default())
	}
}

impl Drop for BeanServer {
	fn drop(&mut self) {
		// Adapters may outlive the server through `lookup` handles
		self.registry.clear();
	}
}

impl BeanServer {
	#[must_use]
	pub fn new(config: ServerConfig) -> Self {
		Self {
			config,
			registry: Registry::new(),
			lifecycle: RwLock::new(Lifecycle::Created),
		}
	}

	#[must_use]
	pub const fn config(&self) -> &ServerConfig {
		&self.config
	}

	#[must_use]
	pub fn is_running(&self) -> bool {
		*self.lifecycle.read() == Lifecycle::Running
	}

	/// Starts the server, resuming beans kept by an inert stop. Starting twice is a no-op.
	pub fn start(&self) {
		let mut lifecycle = self.lifecycle.write();
		if *lifecycle == Lifecycle::Running {
			return;
		}

		let restarted = *lifecycle == Lifecycle::Stopped;
		*lifecycle = Lifecycle::Running;
		self.registry.resume_all();

		info!(restarted, beans = self.registry.len(), "Bean server started;");
	}

	/// Stops the server. Stopping a server that isn't running is a no-op.
	pub fn stop(&self) {
		let mut lifecycle = self.lifecycle.write();
		if *lifecycle != Lifecycle::Running {
			return;
		}
		*lifecycle = Lifecycle::Stopped;

		match self.config.on_stop {
			StopPolicy::Clear => {
				let cleared = self.registry.clear();
				if cleared > 0 {
					warn!(cleared, "Bean server stopped with beans still registered;");
				}
			}
			StopPolicy::Inert => self.registry.suspend_all(),
		}

		info!(policy = ?self.config.on_stop, "Bean server stopped;");
	}

	/// Holding the guard keeps `stop` from interleaving with the caller.
	fn running(&self) -> Result<RwLockReadGuard<'_, Lifecycle>> {
		let lifecycle = self.lifecycle.read();
		if *lifecycle == Lifecycle::Running {
			Ok(lifecycle)
		} else {
			Err(Error::ServerNotRunning)
		}
	}

	/// Registers `target` under the configured default mode and its derived name.
	pub fn register<T: Introspect>(&self, target: &Arc<T>) -> Result<BeanName> {
		self.register_with(target, RegisterOptions::default())
	}

	/// Resolves, names and registers `target`.
	///
	/// Nothing is registered when resolution or naming fails.
	#[instrument(
		skip_all,
		fields(type_name = std::any::type_name::<T>(), bean = tracing::field::Empty),
		err
	)]
	pub fn register_with<T: Introspect>(
		&self,
		target: &Arc<T>,
		options: RegisterOptions,
	) -> Result<BeanName> {
		// Shape and self-naming code may call back into the server, only the insert holds the guard
		drop(self.running()?);

		let RegisterOptions {
			mode,
			name,
			qualifiers,
		} = options;
		let mode = mode.unwrap_or_else(|| self.config.default_mode());

		let shape = T::shape();
		let resolved = resolve(&shape, &mode)?;

		let name = match name {
			Some(name) if qualifiers.is_empty() => name,
			Some(name) => name.with_qualifiers(qualifiers)?,
			None => derive_name(
				target.as_ref(),
				&shape,
				self.config.default_domain.as_deref(),
				&qualifiers,
			)?,
		};
		tracing::Span::current().record("bean", name.as_str());

		let adapter = Arc::new(BeanAdapter::from_parts(name.clone(), target, shape, resolved));
		let _running = self.running()?;
		self.registry.register(adapter)?;

		Ok(name)
	}

	/// Registers an object whose type declares nothing, exposing exactly `descriptors`.
	pub fn register_explicit<T: Introspect>(
		&self,
		target: &Arc<T>,
		name: BeanName,
		descriptors: ExplicitDescriptors,
	) -> Result<BeanName> {
		self.register_with(
			target,
			RegisterOptions::default()
				.mode(ResolutionMode::Explicit(descriptors))
				.name(name),
		)
	}

	/// Publishes every accessor and method of `target` under `name`.
	pub fn register_all<T: Introspect>(&self, target: &Arc<T>, name: BeanName) -> Result<BeanName> {
		self.register_with(
			target,
			RegisterOptions::default()
				.mode(ResolutionMode::AutoDiscovery)
				.name(name),
		)
	}

	pub fn unregister(&self, name: &str) -> Result<()> {
		let _running = self.running()?;
		self.registry.unregister(name)?;

		Ok(())
	}

	/// Unregisters every bean bound to `target`, whatever names it was registered under, and
	/// returns those names in rendered order.
	pub fn unregister_object<T: Introspect>(&self, target: &Arc<T>) -> Result<Vec<BeanName>> {
		let removed = {
			let _running = self.running()?;

			let mut removed = Vec::new();
			for adapter in self.registry.filter(|adapter| adapter.is_bound_to(target)) {
				match self.registry.unregister(adapter.name().as_str()) {
					Ok(_) => removed.push(adapter.name().clone()),
					// Raced with a concurrent unregister
					Err(Error::NoSuchName(_)) => {}
					Err(e) => return Err(e),
				}
			}
			removed
		};

		if removed.is_empty() {
			let name = derive_name(
				target.as_ref(),
				&T::shape(),
				self.config.default_domain.as_deref(),
				&[],
			)
			.map_or_else(|_| std::any::type_name::<T>().to_string(), |name| name.to_string());
			return Err(Error::NoSuchName(name));
		}

		Ok(removed)
	}

	pub fn lookup(&self, name: &str) -> Result<Arc<BeanAdapter>> {
		let _running = self.running()?;
		self.registry.lookup(name)
	}

	pub fn names(&self) -> Result<Vec<BeanName>> {
		let _running = self.running()?;
		Ok(self.registry.names())
	}

	pub fn describe(&self, bean: &str) -> Result<BeanInfo> {
		Ok(self.lookup(bean)?.info())
	}

	pub fn get_attribute(&self, bean: &str, attribute: &str) -> Result<Value> {
		self.lookup(bean)?.get_attribute(attribute)
	}

	pub fn set_attribute(&self, bean: &str, attribute: &str, value: Value) -> Result<()> {
		self.lookup(bean)?.set_attribute(attribute, value)
	}

	pub fn invoke(&self, bean: &str, operation: &str, args: Vec<Value>) -> Result<Value> {
		self.lookup(bean)?.invoke(operation, args)
	}

	/// Serves one transport request; failures come back as [`Response::Error`].
	#[instrument(skip_all, fields(request = request.name(), bean = request.bean()))]
	pub fn handle(&self, request: Request) -> Response {
		let result = match request {
			Request::ListBeans => self.names().map(|names| {
				Response::Beans(names.iter().map(ToString::to_string).collect())
			}),
			Request::Describe { bean } => self.describe(&bean).map(Response::Info),
			Request::GetAttribute { bean, attribute } => {
				self.get_attribute(&bean, &attribute).map(Response::Value)
			}
			Request::SetAttribute {
				bean,
				attribute,
				value,
			} => self
				.set_attribute(&bean, &attribute, value)
				.map(|()| Response::Done),
			Request::Invoke {
				bean,
				operation,
				args,
			} => self.invoke(&bean, &operation, args).map(Response::Value),
		};

		result.unwrap_or_else(|e| {
			debug!(%e, "Request failed;");
			Response::Error(e.into())
		})
	}
}
