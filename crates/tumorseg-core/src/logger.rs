//! Diagnostics output.
//!
//! Everything goes to stderr so stdout stays free for results (the CLI
//! prints JSON there). Two installers:
//! - [`init_with_level`]: a small `log` backend printing
//!   `[elapsed LEVEL target] message`.
//! - `init_tracing` (feature `tracing`): a `tracing-subscriber` with an
//!   `EnvFilter` taken from `RUST_LOG`, or `default_level` when unset.

use std::io::Write;
use std::sync::OnceLock;
use std::time::Instant;

use log::{LevelFilter, Log, Metadata, Record};

#[cfg(feature = "tracing")]
use tracing_subscriber::fmt::format::FmtSpan;
#[cfg(feature = "tracing")]
use tracing_subscriber::util::SubscriberInitExt;
#[cfg(feature = "tracing")]
use tracing_subscriber::{fmt, EnvFilter};

struct StderrLogger {
    level: LevelFilter,
    started: Instant,
}

/// Crate prefix dropped from record targets to keep lines short.
fn short_target(target: &str) -> &str {
    target
        .strip_prefix("tumorseg_core::")
        .or_else(|| target.strip_prefix("tumorseg::"))
        .unwrap_or(target)
}

fn write_record(out: &mut impl Write, elapsed_s: f64, record: &Record) -> std::io::Result<()> {
    writeln!(
        out,
        "[{:8.3}s {:<5} {}] {}",
        elapsed_s,
        record.level(),
        short_target(record.target()),
        record.args()
    )
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let elapsed = self.started.elapsed().as_secs_f64();
        let _ = write_record(&mut std::io::stderr().lock(), elapsed, record);
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

static LOGGER: OnceLock<StderrLogger> = OnceLock::new();

/// Install the stderr logger at `level`.
///
/// Only the first call installs; later calls return `Ok` and keep the
/// original level.
pub fn init_with_level(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    if LOGGER.get().is_none() {
        let logger = LOGGER.get_or_init(|| StderrLogger {
            level,
            started: Instant::now(),
        });
        log::set_logger(logger)?;
        log::set_max_level(level);
    }
    Ok(())
}

/// Install a stderr `tracing` subscriber.
///
/// `RUST_LOG` wins when set; otherwise events at `default_level` and above
/// pass. Span close events are included for timing. No-op if a global
/// subscriber already exists.
#[cfg(feature = "tracing")]
pub fn init_tracing(json: bool, default_level: LevelFilter) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level.as_str().to_ascii_lowercase()));
    if json {
        let _ = fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_span_events(FmtSpan::CLOSE)
            .json()
            .flatten_event(true)
            .finish()
            .try_init();
    } else {
        let _ = fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_span_events(FmtSpan::CLOSE)
            .with_timer(fmt::time::Uptime::default())
            .finish()
            .try_init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(target: &str, level: log::Level, msg: &str) -> String {
        let mut buf = Vec::new();
        write_record(
            &mut buf,
            1.5,
            &Record::builder()
                .target(target)
                .level(level)
                .args(format_args!("{msg}"))
                .build(),
        )
        .expect("write to vec");
        String::from_utf8(buf).expect("utf8")
    }

    #[test]
    fn record_line_carries_level_and_short_target() {
        let line = render("tumorseg_core::labeling", log::Level::Warn, "cap reached");
        assert_eq!(line, "[   1.500s WARN  labeling] cap reached\n");

        let line = render("other_crate", log::Level::Info, "hi");
        assert!(line.ends_with("INFO  other_crate] hi\n"));
    }

    #[test]
    fn repeated_init_is_a_no_op() {
        init_with_level(LevelFilter::Warn).expect("first init");
        init_with_level(LevelFilter::Trace).expect("second init is ignored");
        assert_eq!(log::max_level(), LevelFilter::Warn);
    }
}
