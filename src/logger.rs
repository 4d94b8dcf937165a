//! Logging setup for drivers and tests.
//!
//! The crate itself only emits through `tracing` macros; installing a
//! subscriber is up to whoever embeds it.
//!
//! ```ignore
//! pytrans::logger::init_with_level(LogLevel::Debug);
//! ```

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer, Registry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

/// Installs the subscriber at WARN level.
pub fn init() -> bool {
    init_with_level(LogLevel::Warn)
}

/// Installs a compact `[LEVEL] message` subscriber.
///
/// Returns `false` if a global subscriber was already installed, which is
/// the normal case when several tests call this.
pub fn init_with_level(level: LogLevel) -> bool {
    let filter = tracing_subscriber::filter::LevelFilter::from_level(level.into());

    let layer = tracing_subscriber::fmt::layer()
        .without_time()
        .with_target(false)
        .with_level(true)
        .with_ansi(false)
        .compact()
        .with_filter(filter);

    Registry::default().with(layer).try_init().is_ok()
}

/// Debug level, shows every optimizer change.
pub fn init_debug() -> bool {
    init_with_level(LogLevel::Debug)
}
