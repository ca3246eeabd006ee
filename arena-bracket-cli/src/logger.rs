use chrono::Local;
use log::{set_logger, set_max_level, Level, LevelFilter, Log, Metadata, Record};

/// Installs the [`Logger`]. Records are written to stderr so that stdout only carries the
/// output of the command.
pub fn init(level: LevelFilter) {
    if set_logger(&Logger).is_ok() {
        set_max_level(level);
    }
}

#[derive(Copy, Clone, Debug)]
pub struct Logger;

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let now = Local::now().format("%Y-%m-%d %H:%M:%S");

        let level = match record.level() {
            Level::Error => "ERROR",
            Level::Warn => "WARN",
            Level::Info => "INFO",
            Level::Debug => "DEBUG",
            Level::Trace => "TRACE",
        };

        eprintln!(
            "[{}] [{}:{}] [{}] {}",
            now,
            record.file().unwrap_or("???"),
            record.line().unwrap_or(0),
            level,
            record.args()
        );
    }

    fn flush(&self) {}
}
