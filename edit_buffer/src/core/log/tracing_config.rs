// Copyright (c) 2024-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::str::FromStr;

use tracing_core::LevelFilter;

/// Fields:
/// - `writers`: Zero or more [`WriterArg`]s to send tracing output to.
/// - `level`: The [`tracing::Level`] to use for tracing.
/// - `log_file_path`: The file path to use for the log file, eg: `/tmp/edit_buffer.log`
///   or `edit_buffer.log`. Only used if `writers` contains [`WriterArg::File`].
/// - `preferred_display`: Where [`WriterArg::Stdout`] output actually goes.
#[derive(Clone, Debug)]
pub struct TracingConfig {
    pub writers: Vec<WriterArg>,
    pub level: tracing::Level,
    pub log_file_path: String,
    pub preferred_display: DisplayPreference,
}

mod tracing_config_impl {
    use super::{DisplayPreference, LevelFilter, TracingConfig, WriterArg, WriterConfig};

    impl TracingConfig {
        /// The default configuration for tracing. This will log to both the given
        /// [`DisplayPreference`] and a file.
        #[must_use]
        pub fn new(preferred_display: DisplayPreference) -> Self {
            Self {
                writers: vec![WriterArg::File, WriterArg::Stdout],
                level: tracing::Level::DEBUG,
                log_file_path: "edit_buffer_log_file_debug.log".to_string(),
                preferred_display,
            }
        }

        /// Only write to the given file.
        #[must_use]
        pub fn new_file(log_file_path: impl Into<String>, level: tracing::Level) -> Self {
            Self {
                writers: vec![WriterArg::File],
                level,
                log_file_path: log_file_path.into(),
                preferred_display: DisplayPreference::Stderr,
            }
        }

        #[must_use]
        pub fn get_level_filter(&self) -> LevelFilter {
            tracing_subscriber::filter::LevelFilter::from_level(self.level)
        }

        #[must_use]
        pub fn get_writer_config(&self) -> Option<WriterConfig> {
            WriterConfig::from_writers(&self.writers)
        }
    }
}

/// Use to parse the command line arguments, or a config file entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WriterArg {
    Stdout,
    File,
    None,
}

impl FromStr for WriterArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stdout" => Ok(WriterArg::Stdout),
            "file" => Ok(WriterArg::File),
            "none" | "" => Ok(WriterArg::None),
            _ => Err(format!("{s} is not a valid tracing writer")),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DisplayPreference {
    Stdout,
    Stderr,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WriterConfig {
    Display,
    File,
    DisplayAndFile,
}

impl WriterConfig {
    #[must_use]
    pub fn from_writers(writers: &[WriterArg]) -> Option<WriterConfig> {
        let contains_file_writer = writers.contains(&WriterArg::File);
        let contains_stdout_writer = writers.contains(&WriterArg::Stdout);
        match (contains_file_writer, contains_stdout_writer) {
            (true, true) => Some(WriterConfig::DisplayAndFile),
            (true, false) => Some(WriterConfig::File),
            (false, true) => Some(WriterConfig::Display),
            (false, false) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test_case(&[WriterArg::File, WriterArg::Stdout], Some(WriterConfig::DisplayAndFile))]
    #[test_case(&[WriterArg::File], Some(WriterConfig::File))]
    #[test_case(&[WriterArg::Stdout], Some(WriterConfig::Display))]
    #[test_case(&[WriterArg::None], None)]
    #[test_case(&[], None)]
    fn test_writer_config_from_writers(writers: &[WriterArg], expected: Option<WriterConfig>) {
        assert_eq!(WriterConfig::from_writers(writers), expected);
    }

    #[test]
    fn test_writer_arg_from_str() {
        assert_eq!("stdout".parse::<WriterArg>(), Ok(WriterArg::Stdout));
        assert_eq!("file".parse::<WriterArg>(), Ok(WriterArg::File));
        assert_eq!("".parse::<WriterArg>(), Ok(WriterArg::None));
        assert!("syslog".parse::<WriterArg>().is_err());
    }
}
