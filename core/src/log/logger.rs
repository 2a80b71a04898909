use log::LevelFilter;
use log4rs::config::Logger;
use std::{collections::HashMap, env, mem, str::FromStr};
use thiserror::Error;

#[derive(Clone, Debug, Error)]
pub enum LogError {
    #[error("Logger spec parsing error: {0}")]
    ParseLoggerSpecError(String),

    #[error("Appender {0} could not be created: {1}")]
    AppenderError(String, String),

    #[error("Invalid logger configuration: {0}")]
    ConfigError(String),

    #[error("A global logger is already installed")]
    AlreadyInitialized,
}

pub type LogResult<T> = std::result::Result<T, LogError>;

/// Root level and per-module levels, sorted by module name
pub(super) struct Loggers {
    modules: Vec<(String, LevelFilter)>,
    root_level: LevelFilter,
}

impl Loggers {
    pub fn root_level(&self) -> LevelFilter {
        self.root_level
    }

    /// Module loggers are additive and write through the root appenders
    pub fn items(&self) -> impl IntoIterator<Item = Logger> + '_ {
        self.modules.iter().map(|(name, level)| Logger::builder().build(name.clone(), *level))
    }
}

/// Collects a root level and per-module levels from filter expressions such as `"info,rapids_consensus=trace"`.
/// Later items win over earlier ones.
#[derive(Default)]
pub(super) struct Builder {
    modules: HashMap<String, LevelFilter>,
    root_level: Option<LevelFilter>,
}

impl Builder {
    pub fn new() -> Builder {
        Self::default()
    }

    pub fn parse_env(&mut self, var: &str) -> &mut Self {
        self.parse_expression(&env::var(var).unwrap_or_default())
    }

    pub fn parse_expression(&mut self, expression: &str) -> &mut Self {
        for item in expression.split(',').map(str::trim).filter(|item| !item.is_empty()) {
            match parse_item(item) {
                Ok(Directive::Root(level)) => {
                    self.root_level(level);
                }
                Ok(Directive::Module(name, level)) => {
                    self.logger(name.to_owned(), level);
                }
                Err(err) => eprintln!("Ignoring invalid logging spec: {}", err),
            }
        }
        self
    }

    pub fn root_level(&mut self, level: LevelFilter) -> &mut Self {
        self.root_level = Some(level);
        self
    }

    pub fn logger(&mut self, name: String, level: LevelFilter) -> &mut Self {
        self.modules.insert(name, level);
        self
    }

    pub fn build(&mut self) -> Loggers {
        let mut modules: Vec<_> = mem::take(&mut self.modules).into_iter().collect();
        modules.sort_unstable_by(|a, b| a.0.cmp(&b.0));
        Loggers { modules, root_level: self.root_level.take().unwrap_or(LevelFilter::Error) }
    }
}

impl FromStr for Builder {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut builder = Self::new();
        builder.parse_expression(s);
        Ok(builder)
    }
}

enum Directive<'a> {
    Root(LevelFilter),
    Module(&'a str, LevelFilter),
}

/// A lone level sets the root level, a lone name or `name=` enables everything for that module
fn parse_item(item: &str) -> LogResult<Directive<'_>> {
    let Some((name, level)) = item.split_once('=') else {
        return Ok(item.parse().map_or(Directive::Module(item, LevelFilter::max()), Directive::Root));
    };
    let level = level.trim();
    if level.contains('=') {
        return Err(LogError::ParseLoggerSpecError(item.to_owned()));
    }
    if level.is_empty() {
        return Ok(Directive::Module(name, LevelFilter::max()));
    }
    level.parse().map(|level| Directive::Module(name, level)).map_err(|_| LogError::ParseLoggerSpecError(level.to_owned()))
}
