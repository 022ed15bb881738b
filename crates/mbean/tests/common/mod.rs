#![allow(dead_code)]

use std::{
	sync::atomic::{AtomicBool, AtomicI32, AtomicI64, Ordering},
	time::{SystemTime, UNIX_EPOCH},
};

use parking_lot::RwLock;
use sd_mbean::{
	managed_methods, FolderName, Introspect, ManagedBean, OperationAction, SelfNaming, TypeShape,
};
use thiserror::Error;

pub fn now_millis() -> i64 {
	let elapsed = SystemTime::now().duration_since(UNIX_EPOCH).unwrap();
	i64::try_from(elapsed.as_millis()).unwrap()
}

/// Declarative bean: two field attributes, a getter attribute and two operations.
#[derive(ManagedBean)]
#[mbean(
	domain = "j256.simplejmx",
	name = "RuntimeCounter",
	description = "Counter that shows the runtime"
)]
pub struct RuntimeCounter {
	#[mbean(rename = "startMillis", attribute(description = "When our timer started"))]
	start_millis: AtomicI64,
	#[mbean(
		rename = "showSeconds",
		attribute(writable, description = "Show runtime in seconds")
	)]
	show_seconds: AtomicBool,
}

impl RuntimeCounter {
	pub fn new() -> Self {
		Self {
			start_millis: AtomicI64::new(now_millis()),
			show_seconds: AtomicBool::new(false),
		}
	}

	pub fn start_millis(&self) -> i64 {
		self.start_millis.load(Ordering::SeqCst)
	}

	pub fn show_seconds(&self) -> bool {
		self.show_seconds.load(Ordering::SeqCst)
	}
}

#[managed_methods]
impl RuntimeCounter {
	#[mbean(
		rename = "getRunTime",
		attribute(description = "Run time in seconds or milliseconds")
	)]
	pub fn run_time(&self) -> i64 {
		let diff = now_millis() - self.start_millis.load(Ordering::SeqCst);
		if self.show_seconds.load(Ordering::SeqCst) {
			diff / 1000
		} else {
			diff
		}
	}

	#[mbean(rename = "restartTimer", operation(description = "Restart our timer"))]
	pub fn restart_timer(&self) -> String {
		self.start_millis.store(now_millis(), Ordering::SeqCst);
		"Timer has been restarted".to_string()
	}

	#[mbean(
		rename = "restartTimerToValue",
		operation(
			action = "action",
			params("startMillis"),
			descriptions("Milliseconds to set our start-time to"),
			description = "Restart the timer to a value"
		)
	)]
	pub fn restart_timer_to_value(&self, start_millis: i64) -> String {
		self.start_millis.store(start_millis, Ordering::SeqCst);
		format!("Timer has been restarted to {start_millis}")
	}
}

/// Nothing declared, meant for auto-discovery.
#[derive(Default, ManagedBean)]
pub struct HitCounter {
	count: AtomicI32,
}

#[managed_methods]
impl HitCounter {
	#[mbean(rename = "getCount")]
	pub fn count(&self) -> i32 {
		self.count.load(Ordering::SeqCst)
	}

	#[mbean(rename = "setCount")]
	pub fn set_count(&self, count: i32) {
		self.count.store(count, Ordering::SeqCst);
	}

	#[mbean(rename = "resetCount")]
	pub fn reset_count(&self) {
		self.count.store(0, Ordering::SeqCst);
	}

	fn not_public(&self) -> i32 {
		-1
	}
}

#[derive(Debug, Error)]
#[error("cache is sealed")]
pub struct SealedError;

/// A type we pretend we cannot annotate, registered through explicit descriptors.
#[derive(ManagedBean)]
pub struct LegacyCache {
	#[mbean(field)]
	entries: AtomicI64,
	#[mbean(field)]
	label: RwLock<String>,
	#[mbean(field)]
	capacity: i64,
	sealed: AtomicBool,
}

impl LegacyCache {
	pub fn new(capacity: i64) -> Self {
		Self {
			entries: AtomicI64::new(0),
			label: RwLock::new("legacy".to_string()),
			capacity,
			sealed: AtomicBool::new(false),
		}
	}
}

#[managed_methods]
impl LegacyCache {
	pub fn get_fill_ratio(&self) -> f64 {
		#[allow(clippy::cast_precision_loss)]
		let ratio = self.entries.load(Ordering::SeqCst) as f64 / self.capacity as f64;
		ratio
	}

	pub fn insert(&self, count: i64) -> Result<i64, SealedError> {
		if self.sealed.load(Ordering::SeqCst) {
			return Err(SealedError);
		}
		Ok(self.entries.fetch_add(count, Ordering::SeqCst) + count)
	}

	pub fn seal(&self) {
		self.sealed.store(true, Ordering::SeqCst);
	}

	pub fn corrupt(&self) -> i64 {
		panic!("cache invariants violated")
	}

	#[mbean(skip)]
	pub fn label_ref(&self) -> &RwLock<String> {
		&self.label
	}
}

/// Names itself from its id.
#[derive(ManagedBean)]
#[mbean(domain = "test.jobs", self_naming, no_methods)]
pub struct JobQueue {
	id: u32,
	#[mbean(field, attribute(description = "Queued jobs"))]
	depth: AtomicI32,
}

impl JobQueue {
	pub fn new(id: u32) -> Self {
		Self {
			id,
			depth: AtomicI32::new(0),
		}
	}
}

impl SelfNaming for JobQueue {
	fn domain_name(&self) -> Option<String> {
		None
	}

	fn bean_name(&self) -> Option<String> {
		Some(format!("queue-{}", self.id))
	}

	fn folder_names(&self) -> Option<Vec<FolderName>> {
		Some(vec![FolderName::with_field("type", "queues")])
	}
}

/// Hand written shape with overloads only reachable by arity.
#[derive(Default)]
pub struct Scaler {
	factor: AtomicI64,
}

impl Introspect for Scaler {
	fn describe(shape: &mut TypeShape<Self>) {
		shape.set_resource(sd_mbean::ResourceMetadata::new("test.math"));
		shape.field("factor", |s: &Self| &s.factor).read_write("Scale factor");
		shape
			.method1("scale", |s: &Self, value: i64| value * s.factor.load(Ordering::SeqCst))
			.operation(OperationAction::Info, "Scale one value");
		shape
			.method2("scale", |s: &Self, a: i64, b: i64| (a + b) * s.factor.load(Ordering::SeqCst))
			.operation(OperationAction::Info, "Scale a sum");
		shape
			.method1("shift", |s: &Self, by: i64| s.factor.fetch_add(by, Ordering::SeqCst) + by)
			.operation(OperationAction::Action, "Shift by an integer");
		shape
			.method1("shift", |s: &Self, by: f64| {
				#[allow(clippy::cast_possible_truncation)]
				let by = by as i64;
				s.factor.fetch_add(by, Ordering::SeqCst) + by
			})
			.operation(OperationAction::Action, "Shift by a float");
	}
}

/// Self-naming that leaves every part blank, so metadata decides.
#[derive(Default, ManagedBean)]
#[mbean(
	domain = "meta.domain",
	name = "metaLeaf",
	folders("metaFolder"),
	self_naming,
	no_methods
)]
pub struct BlankNamer {
	#[mbean(field, attribute)]
	ticks: AtomicI64,
}

impl SelfNaming for BlankNamer {
	fn domain_name(&self) -> Option<String> {
		Some(String::new())
	}

	fn bean_name(&self) -> Option<String> {
		Some("  ".to_string())
	}

	fn folder_names(&self) -> Option<Vec<FolderName>> {
		Some(Vec::new())
	}
}

/// An empty leaf name falls back to the type name.
#[derive(Default, ManagedBean)]
#[mbean(domain = "meta.domain", name = "", no_methods)]
pub struct Unnamed {
	#[mbean(field, attribute)]
	ticks: AtomicI64,
}
