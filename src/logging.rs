//! `log` backend: logcat on Android, stderr everywhere else.
use log::{Level, LevelFilter, Log, Metadata, Record};
use std::sync::Once;

const TAG: &str = "CardScan";

struct CoreLogger;

static LOGGER: CoreLogger = CoreLogger;
static INIT: Once = Once::new();

/// Installs the logger once; later calls are no-ops.
pub fn init() {
    INIT.call_once(|| {
        if log::set_logger(&LOGGER).is_ok() {
            log::set_max_level(max_level());
        }
    });
}

fn max_level() -> LevelFilter {
    if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

impl Log for CoreLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        write_line(record.level(), &format!("{}: {}", record.target(), record.args()));
    }

    fn flush(&self) {}
}

#[cfg(target_os = "android")]
fn write_line(level: Level, message: &str) {
    use android_log_sys::{LogPriority, __android_log_write};
    use std::ffi::CString;
    use std::os::raw::c_int;

    let priority = match level {
        Level::Error => LogPriority::ERROR,
        Level::Warn => LogPriority::WARN,
        Level::Info => LogPriority::INFO,
        Level::Debug => LogPriority::DEBUG,
        Level::Trace => LogPriority::VERBOSE,
    };
    // Interior NULs would truncate the C string; drop them instead.
    let text = CString::new(message.replace('\0', "")).unwrap_or_default();
    let tag = CString::new(TAG).unwrap_or_default();
    unsafe {
        __android_log_write(priority as c_int, tag.as_ptr(), text.as_ptr());
    }
}

#[cfg(not(target_os = "android"))]
fn write_line(level: Level, message: &str) {
    eprintln!("[{TAG}] {level:<5} {message}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent() {
        init();
        init();
        log::debug!("logger installed twice without panicking");
        assert!(log::max_level() >= LevelFilter::Info);
    }
}
