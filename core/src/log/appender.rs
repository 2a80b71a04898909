use super::{
    consts::{LOG_ARCHIVE_SUFFIX, LOG_FILE_BASE_ROLLS, LOG_FILE_MAX_ROLLS, LOG_FILE_MAX_SIZE, LOG_LINE_PATTERN, LOG_LINE_PATTERN_COLORED},
    logger::{LogError, LogResult},
};
use log::LevelFilter;
use log4rs::{
    append::{
        console::ConsoleAppender,
        rolling_file::{
            RollingFileAppender,
            policy::compound::{CompoundPolicy, roll::fixed_window::FixedWindowRoller, trigger::size::SizeTrigger},
        },
    },
    config::Appender,
    encode::pattern::PatternEncoder,
    filter::threshold::ThresholdFilter,
};
use std::path::Path;

pub(super) fn console(name: &str) -> Appender {
    let console = ConsoleAppender::builder().encoder(Box::new(PatternEncoder::new(LOG_LINE_PATTERN_COLORED))).build();
    Appender::builder().build(name, Box::new(console))
}

/// A size triggered file appender keeping up to [`LOG_FILE_MAX_ROLLS`] gzip archives next to the live file.
/// Records below `threshold` are dropped when one is given.
pub(super) fn rolling_file(name: &str, threshold: Option<LevelFilter>, log_dir: &str, file_name: &str) -> LogResult<Appender> {
    let appender_error = |reason: String| LogError::AppenderError(name.to_owned(), reason);

    let dir = Path::new(log_dir);
    let archive_pattern = dir.join(format!("{}{}", file_name, LOG_ARCHIVE_SUFFIX));
    let archive_pattern = archive_pattern.to_str().ok_or_else(|| appender_error("non UTF-8 log path".to_owned()))?;
    let roller = FixedWindowRoller::builder()
        .base(LOG_FILE_BASE_ROLLS)
        .build(archive_pattern, LOG_FILE_MAX_ROLLS)
        .map_err(|err| appender_error(err.to_string()))?;
    let policy = CompoundPolicy::new(Box::new(SizeTrigger::new(LOG_FILE_MAX_SIZE)), Box::new(roller));

    let file = RollingFileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(LOG_LINE_PATTERN)))
        .build(dir.join(file_name), Box::new(policy))
        .map_err(|err| appender_error(err.to_string()))?;

    let mut builder = Appender::builder();
    if let Some(level) = threshold {
        builder = builder.filter(Box::new(ThresholdFilter::new(level)));
    }
    Ok(builder.build(name, Box::new(file)))
}
