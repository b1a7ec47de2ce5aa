use std::{fmt, str::FromStr};

use clap::ArgMatches;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

const LOG_NAMES: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

impl LogLevel {
    /// Verbosity as understood by stderrlog
    pub fn verbosity(&self) -> usize {
        *self as usize
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "error" => Ok(Self::Error),
            "warn" | "warning" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            "trace" => Ok(Self::Trace),
            _ => Err(format!(
                "Unknown log level '{s}': expecting one of {}",
                LOG_NAMES.join(", ")
            )),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", LOG_NAMES[self.verbosity()])
    }
}

/// Set up stderrlog from the top level command line options
pub fn init_log(m: &ArgMatches) {
    let verbose = m
        .get_one::<LogLevel>("loglevel")
        .copied()
        .unwrap_or(LogLevel::Info);
    let quiet = m.get_flag("quiet");
    let ts = m
        .get_one::<stderrlog::Timestamp>("timestamp")
        .cloned()
        .unwrap_or(stderrlog::Timestamp::Off);

    stderrlog::new()
        .quiet(quiet)
        .verbosity(verbose.verbosity())
        .timestamp(ts)
        .init()
        .unwrap_or_else(|e| eprintln!("Could not initialize logging: {e}"));
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse_log_level() {
        assert_eq!("DEBUG".parse::<LogLevel>(), Ok(LogLevel::Debug));
        assert_eq!("warning".parse::<LogLevel>(), Ok(LogLevel::Warn));
        assert!("loud".parse::<LogLevel>().is_err());
        for s in LOG_NAMES {
            let l: LogLevel = s.parse().unwrap();
            assert_eq!(l.to_string(), s);
        }
        assert_eq!(LogLevel::Error.verbosity(), 0);
        assert_eq!(LogLevel::Trace.verbosity(), 4);
    }
}
