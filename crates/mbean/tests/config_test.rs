use std::{fs, sync::Arc};

use sd_mbean::{
	config_path, BeanName, BeanServer, Error, ModeSelector, ServerConfig, StopPolicy, Value,
};
use tracing_test::traced_test;

mod common;

use common::{HitCounter, LegacyCache, RuntimeCounter};

#[test]
#[traced_test]
fn missing_config_is_created_with_defaults() {
	let dir = tempfile::tempdir().unwrap();
	let path = config_path(dir.path().join("nested"));

	let config = ServerConfig::load_or_create(&path).unwrap();
	assert_eq!(config, ServerConfig::default());
	assert!(path.exists());

	assert_eq!(ServerConfig::load_from(&path).unwrap(), config);
}

#[test]
#[traced_test]
fn config_drives_mode_domain_and_descriptor_sets() {
	let dir = tempfile::tempdir().unwrap();
	let path = config_path(dir.path());

	fs::write(
		&path,
		r#"{
			"version": 1,
			"default_mode": "auto_discovery",
			"default_domain": "app",
			"on_stop": "inert",
			"descriptor_sets": {
				"legacy": {
					"fields": [{ "field": "capacity" }],
					"operations": [{ "method": "seal" }]
				}
			}
		}"#,
	)
	.unwrap();

	let config = ServerConfig::load_from(&path).unwrap();
	assert_eq!(config.default_mode, ModeSelector::AutoDiscovery);
	assert_eq!(config.on_stop, StopPolicy::Inert);

	let legacy = config.descriptor_set("legacy").cloned().unwrap();
	assert!(config.descriptor_set("missing").is_none());

	let server = BeanServer::new(config);
	server.start();

	// No domain on the type, the configured default applies
	let hits = Arc::new(HitCounter::default());
	let hits_name = server.register(&hits).unwrap();
	assert_eq!(hits_name.as_str(), "app:name=HitCounter");
	server
		.set_attribute(hits_name.as_str(), "count", Value::Int(3))
		.unwrap();

	let cache = Arc::new(LegacyCache::new(16));
	let cache_name = server
		.register_explicit(&cache, BeanName::new("app", "legacy").unwrap(), legacy)
		.unwrap();
	let info = server.describe(cache_name.as_str()).unwrap();
	assert_eq!(info.attributes.len(), 1);
	assert_eq!(info.operations.len(), 1);

	// An inert stop keeps every bean, but refuses calls until restarted
	let adapter = server.lookup(hits_name.as_str()).unwrap();
	server.stop();
	assert!(matches!(server.names(), Err(Error::ServerNotRunning)));
	assert!(matches!(
		adapter.get_attribute("count"),
		Err(Error::ServerNotRunning)
	));

	server.start();
	assert_eq!(server.names().unwrap().len(), 2);
	assert_eq!(adapter.get_attribute("count").unwrap(), Value::Int(3));
}

#[test]
#[traced_test]
fn clearing_stop_detaches_beans() {
	let server = BeanServer::new(ServerConfig::default());
	assert!(matches!(
		server.register(&Arc::new(RuntimeCounter::new())),
		Err(Error::ServerNotRunning)
	));

	server.start();
	let counter = Arc::new(RuntimeCounter::new());
	let name = server.register(&counter).unwrap();
	let adapter = server.lookup(name.as_str()).unwrap();

	server.stop();
	assert!(matches!(
		adapter.get_attribute("startMillis"),
		Err(Error::Unregistered(_))
	));

	server.start();
	assert!(server.names().unwrap().is_empty());
	server.register(&counter).unwrap();
}
