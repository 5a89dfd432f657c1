//! # Logging
//!
//! The crate logs through the `log` facade. A [`LogHandle`] is created once at
//! process start and handed by reference to every component that reports
//! progress, so no module configures logging as a side effect of being used.

use log::{Level, LevelFilter};

const DEFAULT_TARGET: &str = "party_analysis";

/// Handle to the process-wide logger.
///
/// The handle carries the log target and the most verbose level it lets
/// through. Records above that level are dropped before they reach the
/// facade.
#[derive(Debug, Clone)]
pub struct LogHandle {
    target: String,
    level: LevelFilter,
}

impl LogHandle {
    /// Installs the `env_logger` backend at `level` and returns a handle.
    ///
    /// `RUST_LOG` still overrides the level, so the handle takes the level the
    /// backend actually ended up with. Calling this more than once is
    /// harmless: the first backend stays installed.
    pub fn init(level: LevelFilter) -> Self {
        let _ = env_logger::Builder::new()
            .filter_level(level)
            .parse_default_env()
            .format_timestamp_millis()
            .try_init();

        Self {
            target: DEFAULT_TARGET.to_string(),
            level: log::max_level(),
        }
    }

    /// A silent handle that does not touch the global backend. Raise its
    /// level with [`with_level`](Self::with_level) to log through a backend
    /// installed elsewhere.
    pub fn detached() -> Self {
        Self {
            target: DEFAULT_TARGET.to_string(),
            level: LevelFilter::Off,
        }
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = target.into();
        self
    }

    pub fn with_level(mut self, level: LevelFilter) -> Self {
        self.level = level;
        self
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn level(&self) -> LevelFilter {
        self.level
    }

    /// Whether records at `level` pass this handle.
    pub fn enabled(&self, level: Level) -> bool {
        level <= self.level
    }

    pub fn log(&self, level: Level, args: std::fmt::Arguments<'_>) {
        if self.enabled(level) {
            log::log!(target: self.target.as_str(), level, "{}", args);
        }
    }

    pub fn info(&self, args: std::fmt::Arguments<'_>) {
        self.log(Level::Info, args);
    }

    pub fn debug(&self, args: std::fmt::Arguments<'_>) {
        self.log(Level::Debug, args);
    }

    pub fn warn(&self, args: std::fmt::Arguments<'_>) {
        self.log(Level::Warn, args);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        let first = LogHandle::init(LevelFilter::Debug);
        let second = LogHandle::init(LevelFilter::Info);
        assert_eq!(first.target(), second.target());
        assert_eq!(first.level(), second.level());
        assert_eq!(second.level(), log::max_level());
        second.info(format_args!("logger initialized twice"));
    }

    #[test]
    fn test_custom_target() {
        let handle = LogHandle::detached().with_target("party_analysis::test");
        assert_eq!(handle.target(), "party_analysis::test");
        assert_eq!(handle.level(), LevelFilter::Off);
        handle.debug(format_args!("no backend required"));
    }

    #[test]
    fn test_level_gates_records() {
        let silent = LogHandle::detached();
        assert!(!silent.enabled(Level::Error));

        let handle = silent.with_level(LevelFilter::Info);
        assert_eq!(handle.level(), LevelFilter::Info);
        assert!(handle.enabled(Level::Warn));
        assert!(handle.enabled(Level::Info));
        assert!(!handle.enabled(Level::Debug));
        assert!(!handle.enabled(Level::Trace));
    }
}
