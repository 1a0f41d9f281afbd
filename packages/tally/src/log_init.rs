use std::io::Write as _;
use std::sync::{Arc, Mutex, OnceLock, Weak};

use env_filter::{Builder as LogEnvBuilder, Filter as LogEnvFilter};

use crate::ProgressBar;

static LOG_FILTER: OnceLock<LogEnvFilter> = OnceLock::new();
/// The bar that log records are printed through
static LOG_TARGET: Mutex<Option<Weak<ProgressBar>>> = Mutex::new(None);

/// Install a logger for the `log` facade that prints through a progress bar
///
/// The filter uses the `env_logger` syntax (for example `info` or `my_crate=debug`).
/// `RUST_LOG`, if set, takes precedence over `default_filter`.
///
/// Records are printed with [`ProgressBar::log`] on the bar set with
/// [`attach_log_target`], so they show up above the bar instead of breaking it.
/// Without a target, or once the target is finished, records go to stderr.
///
/// Only the first call installs the logger.
pub fn log_init(default_filter: &str) {
    let env_rust_log = std::env::var("RUST_LOG");
    let spec = match &env_rust_log {
        Ok(value) if !value.is_empty() => value.as_str(),
        _ => default_filter,
    };
    let filter = LogEnvBuilder::new().parse(spec).build();
    let log_level = filter.filter();
    if LOG_FILTER.set(filter).is_err() {
        return;
    }
    log::set_max_level(log_level);
    let _ = log::set_logger(&LogImpl);
}

/// Print log records through this bar
pub fn attach_log_target(bar: &Arc<ProgressBar>) {
    if let Ok(mut target) = LOG_TARGET.lock() {
        *target = Some(Arc::downgrade(bar));
    }
}

/// Print log records to stderr again
pub fn detach_log_target() {
    if let Ok(mut target) = LOG_TARGET.lock() {
        *target = None;
    }
}

fn current_target() -> Option<Arc<ProgressBar>> {
    let target = LOG_TARGET.lock().ok()?;
    let bar = target.as_ref()?.upgrade()?;
    if bar.is_finished() {
        return None;
    }
    Some(bar)
}

struct LogImpl;
impl log::Log for LogImpl {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        match LOG_FILTER.get() {
            Some(filter) => filter.enabled(metadata),
            None => false,
        }
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let message = format_record(record);
        // records from inside a bar operation (our own, or a listener's)
        // cannot go through a bar without locking it again
        let internal = record.target().starts_with(env!("CARGO_CRATE_NAME"));
        if !internal && !crate::progress::holds_bar_lock() {
            if let Some(bar) = current_target() {
                if bar.log(&message).is_ok() {
                    return;
                }
            }
        }
        let _ = writeln!(std::io::stderr(), "{message}");
    }

    fn flush(&self) {}
}

fn format_record(record: &log::Record) -> String {
    let mut message = String::new();
    message.push_str(match record.level() {
        log::Level::Error => "E",
        log::Level::Warn => "W",
        log::Level::Info => "I",
        log::Level::Debug => "D",
        log::Level::Trace => "T",
    });
    message.push(' ');
    if record.level() == log::Level::Trace {
        // source location in trace messages
        let mut location = String::new();
        if let Some(p) = record.module_path() {
            location.push_str(p);
            location.push(' ');
        }
        if let Some(f) = record.file() {
            let name = match f.rfind(['/', '\\']) {
                None => f,
                Some(i) => &f[i + 1..],
            };
            location.push_str(name);
        }
        if let Some(l) = record.line() {
            location.push(':');
            location.push_str(&l.to_string());
        }
        if !location.is_empty() {
            message.push('[');
            message.push_str(location.trim_end());
            message.push_str("] ");
        }
    }
    use std::fmt::Write;
    let _: Result<_, _> = write!(&mut message, "{}", record.args());
    message
}
