use std::io;

use tracing::{Level, Metadata};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::MakeWriter;

/// Installs a `tracing` subscriber that writes to the browser console.
///
/// Safe to call more than once; only the first call installs anything.
pub fn init_logging(verbosity: u8) {
	// 0 = errors only, 1 = info, 2+ = debug for everything
	let filter = match verbosity {
		0 => "error",
		1 => "info,nosleep=info",
		_ => "debug",
	};

	let result = tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::new(filter))
		.with_writer(MakeConsoleWriter)
		.without_time()
		.with_ansi(false)
		.with_target(true)
		.with_level(true)
		.compact()
		.try_init();

	if result.is_err() {
		tracing::debug!("tracing subscriber already installed");
	}
}

struct MakeConsoleWriter;

impl<'a> MakeWriter<'a> for MakeConsoleWriter {
	type Writer = ConsoleWriter;

	fn make_writer(&'a self) -> Self::Writer {
		ConsoleWriter::new(Level::INFO)
	}

	fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
		ConsoleWriter::new(*meta.level())
	}
}

/// Buffers one formatted event and hands it to `console.*` on drop.
struct ConsoleWriter {
	level: Level,
	buf: Vec<u8>,
}

impl ConsoleWriter {
	fn new(level: Level) -> Self {
		Self { level, buf: Vec::new() }
	}
}

impl io::Write for ConsoleWriter {
	fn write(&mut self, data: &[u8]) -> io::Result<usize> {
		self.buf.extend_from_slice(data);
		Ok(data.len())
	}

	fn flush(&mut self) -> io::Result<()> {
		Ok(())
	}
}

impl Drop for ConsoleWriter {
	fn drop(&mut self) {
		let line = String::from_utf8_lossy(&self.buf);
		let line = line.trim_end();
		if line.is_empty() {
			return;
		}
		let line = wasm_bindgen::JsValue::from_str(line);
		match self.level {
			Level::ERROR => web_sys::console::error_1(&line),
			Level::WARN => web_sys::console::warn_1(&line),
			Level::INFO => web_sys::console::info_1(&line),
			_ => web_sys::console::debug_1(&line),
		}
	}
}
