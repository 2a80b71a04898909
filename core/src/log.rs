//! Logger and logging macros
//!
//! The macros forward to the [`log`](https://docs.rs/log) facade, so crates of the workspace only
//! depend on `rapids-core` for logging. Native targets get a log4rs backend through [`init_logger`].

#[cfg(not(target_arch = "wasm32"))]
mod appender;
#[cfg(not(target_arch = "wasm32"))]
mod consts;
#[cfg(not(target_arch = "wasm32"))]
mod logger;

#[doc(hidden)]
pub use log as __private_log;
pub use log::{Level, LevelFilter};

#[cfg(not(target_arch = "wasm32"))]
pub use consts::{DEFAULT_LOGGER_ENV, ERR_LOG_FILE_NAME, LOG_FILE_NAME};
#[cfg(not(target_arch = "wasm32"))]
pub use logger::{LogError, LogResult};

#[macro_export]
macro_rules! trace {
    ($($t:tt)*) => (
        $crate::log::__private_log::trace!($($t)*)
    )
}

#[macro_export]
macro_rules! debug {
    ($($t:tt)*) => (
        $crate::log::__private_log::debug!($($t)*)
    )
}

#[macro_export]
macro_rules! info {
    ($($t:tt)*) => (
        $crate::log::__private_log::info!($($t)*)
    )
}

#[macro_export]
macro_rules! warn {
    ($($t:tt)*) => (
        $crate::log::__private_log::warn!($($t)*)
    )
}

#[macro_export]
macro_rules! error {
    ($($t:tt)*) => (
        $crate::log::__private_log::error!($($t)*)
    )
}

/// Installs the global log4rs logger.
///
/// `filters` is a comma separated list of `level` or `module=level` items, e.g. `"info,rapids_consensus=trace"`,
/// applied after the ones found in the `RUST_LOG` environment variable. When `log_dir` is provided, all records
/// additionally go to a size rolled [`LOG_FILE_NAME`] and warnings and errors to [`ERR_LOG_FILE_NAME`].
#[cfg(not(target_arch = "wasm32"))]
pub fn init_logger(log_dir: Option<&str>, filters: &str) -> LogResult<()> {
    use consts::{CONSOLE_APPENDER, ERR_LOG_FILE_APPENDER, LOG_FILE_APPENDER};
    use log4rs::config::{Config, Root};

    let loggers = logger::Builder::new().root_level(LevelFilter::Info).parse_env(DEFAULT_LOGGER_ENV).parse_expression(filters).build();

    let mut appenders = vec![appender::console(CONSOLE_APPENDER)];
    if let Some(log_dir) = log_dir {
        appenders.push(appender::rolling_file(LOG_FILE_APPENDER, None, log_dir, LOG_FILE_NAME)?);
        appenders.push(appender::rolling_file(ERR_LOG_FILE_APPENDER, Some(LevelFilter::Warn), log_dir, ERR_LOG_FILE_NAME)?);
    }

    let root = Root::builder().appenders(appenders.iter().map(|appender| appender.name().to_owned())).build(loggers.root_level());
    let config = Config::builder()
        .appenders(appenders)
        .loggers(loggers.items())
        .build(root)
        .map_err(|err| LogError::ConfigError(err.to_string()))?;

    log4rs::init_config(config).map_err(|_| LogError::AlreadyInitialized)?;
    Ok(())
}
