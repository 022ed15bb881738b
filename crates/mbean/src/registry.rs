use std::{collections::BTreeMap, sync::Arc};

use parking_lot::RwLock;
use tracing::{debug, info};

use super::{
	adapter::BeanAdapter,
	error::{Error, Result},
	name::BeanName,
};

/// Rendered name to adapter table.
///
/// A single reader/writer lock guards the table: lookups run concurrently with each other, while a
/// register or unregister excludes everything else and is applied whole. The registry owns its
/// adapters, but adapters only hold weak references to their targets, so registering an object
/// does not keep it alive.
#[derive(Debug, Default)]
pub struct Registry {
	beans: RwLock<BTreeMap<String, Arc<BeanAdapter>>>,
}

impl Registry {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	pub fn register(&self, adapter: Arc<BeanAdapter>) -> Result<()> {
		let name = adapter.name().to_string();

		let mut beans = self.beans.write();
		if beans.contains_key(&name) {
			return Err(Error::DuplicateName(name));
		}
		beans.insert(name.clone(), adapter);
		drop(beans);

		info!(bean = %name, "Registered bean;");

		Ok(())
	}

	/// Removes and detaches the adapter named `name`.
	///
	/// Calls that already hold the adapter may finish, later calls through it fail with
	/// [`Error::Unregistered`].
	pub fn unregister(&self, name: &str) -> Result<Arc<BeanAdapter>> {
		let adapter = self
			.beans
			.write()
			.remove(name)
			.ok_or_else(|| Error::NoSuchName(name.to_string()))?;

		adapter.detach();
		info!(bean = %name, "Unregistered bean;");

		Ok(adapter)
	}

	pub fn lookup(&self, name: &str) -> Result<Arc<BeanAdapter>> {
		self.beans
			.read()
			.get(name)
			.cloned()
			.ok_or_else(|| Error::NoSuchName(name.to_string()))
	}

	/// Every adapter satisfying `predicate`, ordered by rendered name.
	pub fn filter(&self, predicate: impl Fn(&BeanAdapter) -> bool) -> Vec<Arc<BeanAdapter>> {
		self.beans
			.read()
			.values()
			.filter(|adapter| predicate(adapter))
			.cloned()
			.collect()
	}

	/// Snapshot of the registered names, ordered by rendered string.
	#[must_use]
	pub fn names(&self) -> Vec<BeanName> {
		self.beans
			.read()
			.values()
			.map(|adapter| adapter.name().clone())
			.collect()
	}

	#[must_use]
	pub fn contains(&self, name: &str) -> bool {
		self.beans.read().contains_key(name)
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.beans.read().len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.beans.read().is_empty()
	}

	/// Detaches and removes every entry, returning how many there were.
	pub fn clear(&self) -> usize {
		let beans = std::mem::take(&mut *self.beans.write());
		for adapter in beans.values() {
			adapter.detach();
		}

		debug!(count = beans.len(), "Cleared registry;");

		beans.len()
	}

	pub(crate) fn suspend_all(&self) {
		for adapter in self.beans.read().values() {
			adapter.suspend();
		}
	}

	pub(crate) fn resume_all(&self) {
		for adapter in self.beans.read().values() {
			adapter.resume();
		}
	}
}
