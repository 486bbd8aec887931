use std::{
    io::{self, Write as _},
    sync::{Mutex, MutexGuard, OnceLock, PoisonError, RwLock},
};

use log::{Log, Metadata, Record};

static LOGGER: OnceLock<AppLogger> = OnceLock::new();

pub fn get_logger() -> &'static AppLogger {
    LOGGER.get_or_init(|| AppLogger::new(log::Level::Warn))
}

pub fn init() {
    if log::set_logger(get_logger()).is_ok() {
        log::set_max_level(log::LevelFilter::Trace);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub level: log::Level,
    pub message: String,
    pub source: String,
}

impl Message {
    pub fn format(&self) -> String {
        format!("[{} {}] {}", self.level, self.source, self.message)
    }
}

/// Writes to stderr, or keeps the messages while the terminal is taken by an animation.
pub struct AppLogger {
    min_level: RwLock<log::Level>,
    held: Mutex<Option<Vec<Message>>>,
}

impl AppLogger {
    fn new(min_level: log::Level) -> Self {
        Self {
            min_level: RwLock::new(min_level),
            held: Mutex::new(None),
        }
    }

    pub fn min_level(&self) -> log::Level {
        *self.min_level.read().unwrap()
    }

    pub fn set_min_level(&self, level: log::Level) {
        *self.min_level.write().unwrap() = level;
    }

    fn held(&self) -> MutexGuard<Option<Vec<Message>>> {
        // losing held messages is better than losing the logger
        self.held.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Keep messages in memory until [`AppLogger::release`].
    pub fn hold(&self) {
        self.held().get_or_insert_with(Vec::new);
    }

    /// Stops holding and returns what was kept.
    pub fn take_held(&self) -> Vec<Message> {
        self.held().take().unwrap_or_default()
    }

    /// Stops holding and writes everything kept to stderr.
    pub fn release(&self) {
        let mut stderr = io::stderr().lock();
        for msg in self.take_held() {
            let _ = writeln!(stderr, "{}", msg.format());
        }
    }
}

impl Log for AppLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.min_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let msg = Message {
            level: record.level(),
            message: record.args().to_string(),
            source: record.module_path().unwrap_or("unknown").to_string(),
        };

        match self.held().as_mut() {
            Some(held) => held.push(msg),
            None => eprintln!("{}", msg.format()),
        }
    }

    fn flush(&self) {
        let _ = io::stderr().flush();
    }
}

#[cfg(test)]
mod tests {
    use log::Level;

    use super::*;

    fn record(logger: &AppLogger, level: Level, text: &str) {
        logger.log(
            &Record::builder()
                .args(format_args!("{text}"))
                .level(level)
                .module_path(Some("gmaze::algorithms"))
                .build(),
        );
    }

    #[test]
    fn holds_until_released() {
        let logger = AppLogger::new(Level::Warn);
        logger.hold();

        record(&logger, Level::Warn, "ran out of stack");
        record(&logger, Level::Debug, "filtered out");

        let held = logger.take_held();
        assert_eq!(held.len(), 1);
        assert_eq!(held[0].format(), "[WARN gmaze::algorithms] ran out of stack");
        assert!(logger.take_held().is_empty());
    }

    #[test]
    fn level_is_adjustable() {
        let logger = AppLogger::new(Level::Warn);
        logger.hold();
        logger.set_min_level(Level::Debug);
        record(&logger, Level::Debug, "now visible");
        assert_eq!(logger.take_held().len(), 1);
    }
}
