//! Serves a single `RuntimeCounter` bean over stdin/stdout, one JSON request per line.
//!
//! ```text
//! $ echo '{"request":"invoke","bean":"j256.simplejmx:name=RuntimeCounter","operation":"restartTimer"}' \
//!     | cargo run -p sd-mbean --example runtime_counter
//! ```

use std::{
	io::{self, BufRead, Write},
	sync::{
		atomic::{AtomicBool, AtomicI64, Ordering},
		Arc,
	},
	time::{SystemTime, UNIX_EPOCH},
};

use sd_mbean::{managed_methods, BeanServer, ManagedBean, Request, Response, ServerConfig};
use tracing::{error, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn now_millis() -> i64 {
	SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.map_or(0, |elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
}

#[derive(ManagedBean)]
#[mbean(
	domain = "j256.simplejmx",
	name = "RuntimeCounter",
	description = "Counter that shows the runtime"
)]
struct RuntimeCounter {
	#[mbean(rename = "startMillis", attribute(description = "When our timer started"))]
	start_millis: AtomicI64,
	#[mbean(
		rename = "showSeconds",
		attribute(writable, description = "Show runtime in seconds")
	)]
	show_seconds: AtomicBool,
}

#[managed_methods]
impl RuntimeCounter {
	#[mbean(
		rename = "getRunTime",
		attribute(description = "Run time in seconds or milliseconds")
	)]
	fn run_time(&self) -> i64 {
		let diff = now_millis() - self.start_millis.load(Ordering::SeqCst);
		if self.show_seconds.load(Ordering::SeqCst) {
			diff / 1000
		} else {
			diff
		}
	}

	#[mbean(rename = "restartTimer", operation(description = "Restart our timer"))]
	fn restart_timer(&self) -> String {
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
	fn restart_timer_to_value(&self, start_millis: i64) -> String {
		self.start_millis.store(start_millis, Ordering::SeqCst);
		format!("Timer has been restarted to {start_millis}")
	}
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
	tracing_subscriber::registry()
		.with(fmt::layer().with_writer(io::stderr))
		.with(
			EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| EnvFilter::new("info,sd_mbean=debug")),
		)
		.init();

	let server = BeanServer::new(ServerConfig::default());
	server.start();

	let counter = Arc::new(RuntimeCounter {
		start_millis: AtomicI64::new(now_millis()),
		show_seconds: AtomicBool::new(false),
	});
	let name = server.register(&counter)?;
	info!(%name, "Serving requests from stdin;");

	let mut stdout = io::stdout().lock();
	for line in io::stdin().lock().lines() {
		let line = line?;
		if line.trim().is_empty() {
			continue;
		}

		let response = match serde_json::from_str::<Request>(&line) {
			Ok(request) => server.handle(request),
			Err(e) => {
				error!(?e, "Malformed request;");
				continue;
			}
		};

		if let Response::Error(e) = &response {
			error!(kind = ?e.kind, message = %e.message, "Request failed;");
		}

		serde_json::to_writer(&mut stdout, &response)?;
		writeln!(stdout)?;
	}

	server.stop();

	Ok(())
}
