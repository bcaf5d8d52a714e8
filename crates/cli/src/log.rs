use std::{
    collections::VecDeque,
    io::Write,
    sync::{Arc, Mutex},
};

use chrono::Local;
use log::{Level, LevelFilter, Metadata, Record, SetLoggerError};

pub const MAX_ENTRIES: usize = 100;

pub static LOG: Mutex<Option<Arc<Mutex<dyn Repository>>>> = Mutex::new(None);

#[allow(clippy::missing_errors_doc)]
pub trait Repository: Send + Sync + 'static {
    fn read_entries(&self) -> Result<VecDeque<Entry>, Error>;
    fn write_entry(&self, entry: Entry) -> Result<(), Error>;
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("{0}")]
    Unknown(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub time: String,
    pub level: Level,
    pub message: String,
}

impl std::fmt::Display for Entry {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{} {:<5} {}", self.time, self.level, self.message)
    }
}

/// Keeps the most recent entries in memory, newest first.
#[derive(Default)]
pub struct Memory {
    entries: Mutex<VecDeque<Entry>>,
}

impl Repository for Memory {
    fn read_entries(&self) -> Result<VecDeque<Entry>, Error> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .map_err(|err| Error::Unknown(err.to_string()))
    }

    fn write_entry(&self, entry: Entry) -> Result<(), Error> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|err| Error::Unknown(err.to_string()))?;
        entries.push_front(entry);
        entries.truncate(MAX_ENTRIES);
        Ok(())
    }
}

static LOGGER: Logger = Logger;

/// Messages up to `verbosity` are printed to stderr, everything down to
/// debug level is kept in the repository.
///
/// # Errors
///
/// Returns an error if the logger has already been initialized.
pub fn init(
    repository: Arc<Mutex<dyn Repository>>,
    verbosity: LevelFilter,
) -> Result<(), SetLoggerError> {
    if let Ok(mut log) = LOG.lock() {
        *log = Some(repository);
    }
    if let Ok(mut stderr_level) = STDERR_LEVEL.lock() {
        *stderr_level = verbosity;
    }
    log::set_logger(&LOGGER).map(|()| log::set_max_level(verbosity.max(LevelFilter::Debug)))
}

/// Logged entries, newest first.
#[must_use]
pub fn entries() -> VecDeque<Entry> {
    let Ok(log) = LOG.lock() else {
        return VecDeque::new();
    };
    log.as_ref()
        .and_then(|repository| repository.lock().ok()?.read_entries().ok())
        .unwrap_or_default()
}

static STDERR_LEVEL: Mutex<LevelFilter> = Mutex::new(LevelFilter::Warn);

struct Logger;

impl log::Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let entry = Entry {
            time: Local::now().format("%b %d %H:%M:%S").to_string(),
            level: record.level(),
            message: record.args().to_string(),
        };
        if STDERR_LEVEL
            .lock()
            .is_ok_and(|level| record.level() <= *level)
        {
            let _ = writeln!(std::io::stderr(), "{entry}");
        }
        if let Some(repository) = LOG.lock().ok().as_deref().and_then(Option::as_ref) {
            if let Ok(repository) = repository.lock() {
                let _ = repository.write_entry(entry);
            }
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn entry(message: &str) -> Entry {
        Entry {
            time: String::from("May 01 07:00:00"),
            level: Level::Info,
            message: message.to_string(),
        }
    }

    #[test]
    fn test_memory_keeps_newest_entries() {
        let memory = Memory::default();

        for i in 0..=MAX_ENTRIES {
            memory.write_entry(entry(&i.to_string())).unwrap();
        }

        let entries = memory.read_entries().unwrap();
        assert_eq!(entries.len(), MAX_ENTRIES);
        assert_eq!(entries[0].message, MAX_ENTRIES.to_string());
        assert_eq!(entries[MAX_ENTRIES - 1].message, "1");
    }

    #[test]
    fn test_entry_display() {
        assert_eq!(
            entry("logged workout").to_string(),
            "May 01 07:00:00 INFO  logged workout"
        );
    }
}
