//! Server configuration

use std::{
	collections::BTreeMap,
	fs, io,
	path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use super::{descriptor::ExplicitDescriptors, resolve::ResolutionMode};

#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("config file I/O error: {source}; path: '{}'", .path.display())]
	Io {
		path: Box<Path>,
		#[source]
		source: io::Error,
	},
	#[error("malformed config file: {source}; path: '{}'", .path.display())]
	Parse {
		path: Box<Path>,
		#[source]
		source: serde_json::Error,
	},
	#[error("unknown config version: {0}")]
	UnsupportedVersion(u32),
}

impl ConfigError {
	fn io(path: impl AsRef<Path>, source: io::Error) -> Self {
		Self::Io {
			path: path.as_ref().into(),
			source,
		}
	}
}

/// Resolution mode used by [`BeanServer::register`](crate::BeanServer::register).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModeSelector {
	#[default]
	Declarative,
	AutoDiscovery,
}

impl From<ModeSelector> for ResolutionMode {
	fn from(selector: ModeSelector) -> Self {
		match selector {
			ModeSelector::Declarative => Self::Declarative,
			ModeSelector::AutoDiscovery => Self::AutoDiscovery,
		}
	}
}

/// What happens to registered beans when the server stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopPolicy {
	/// Every bean is detached and removed.
	#[default]
	Clear,
	/// Beans stay registered but refuse calls until the server starts again.
	Inert,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
	/// Config schema version
	pub version: u32,

	#[serde(default)]
	pub default_mode: ModeSelector,

	/// Domain for beans whose type and self-naming both leave it unset
	#[serde(default)]
	pub default_domain: Option<String>,

	#[serde(default)]
	pub on_stop: StopPolicy,

	/// Named descriptor sets for objects whose types carry no declarations
	#[serde(default)]
	pub descriptor_sets: BTreeMap<String, ExplicitDescriptors>,
}

impl Default for ServerConfig {
	fn default() -> Self {
		Self {
			version: Self::target_version(),
			default_mode: ModeSelector::default(),
			default_domain: None,
			on_stop: StopPolicy::default(),
			descriptor_sets: BTreeMap::new(),
		}
	}
}

impl ServerConfig {
	#[must_use]
	pub const fn target_version() -> u32 {
		1
	}

	/// Loads the config at `path`, migrating older schema versions in memory.
	pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let path = path.as_ref();

		info!(path = %path.display(), "Loading server config;");

		let json = fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
		let mut config = serde_json::from_str::<Self>(&json).map_err(|source| ConfigError::Parse {
			path: path.into(),
			source,
		})?;

		if config.version < Self::target_version() {
			info!(
				from = config.version,
				to = Self::target_version(),
				"Migrating server config;"
			);
		}
		config.migrate()?;

		Ok(config)
	}

	/// Loads the config at `path`, writing a default one first when none exists.
	pub fn load_or_create(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let path = path.as_ref();

		if path.exists() {
			return Self::load_from(path);
		}

		warn!(path = %path.display(), "No server config found, creating default;");
		let config = Self::default();
		config.save_to(path)?;

		Ok(config)
	}

	pub fn save_to(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
		let path = path.as_ref();

		if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
			fs::create_dir_all(parent).map_err(|e| ConfigError::io(parent, e))?;
		}

		let json = serde_json::to_string_pretty(self).map_err(|source| ConfigError::Parse {
			path: path.into(),
			source,
		})?;
		fs::write(path, json).map_err(|e| ConfigError::io(path, e))?;

		info!(path = %path.display(), "Saved server config;");

		Ok(())
	}

	#[must_use]
	pub fn default_mode(&self) -> ResolutionMode {
		self.default_mode.into()
	}

	#[must_use]
	pub fn descriptor_set(&self, name: &str) -> Option<&ExplicitDescriptors> {
		self.descriptor_sets.get(name)
	}

	fn migrate(&mut self) -> Result<(), ConfigError> {
		match self.version {
			// v0 predates `on_stop`, whose serde default already matches the old behavior
			0 => {
				self.version = 1;
				Ok(())
			}
			1 => Ok(()),
			v => Err(ConfigError::UnsupportedVersion(v)),
		}
	}
}

/// Default file name for a server config inside a data directory.
#[must_use]
pub fn config_path(data_dir: impl AsRef<Path>) -> PathBuf {
	data_dir.as_ref().join("mbean-server.json")
}
