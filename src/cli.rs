use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use log::LevelFilter;

#[derive(Parser, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default)]
#[command(
    author,
    version,
    about,
    long_about = "Sends a personalised email to every contact in a CSV file and logs the outcome of each send."
)]
pub struct Cli {
    /// Specify config file to use
    ///
    /// If not specified uses `config.json`, falling back to `config_example.json`
    /// next to it when that does not exist
    #[arg(long = "config", short, value_name = "PATH")]
    pub config_filename: Option<String>,

    /// CSV file of contacts, must have a header row including `email`
    #[arg(long = "contacts", value_name = "PATH", default_value = "contacts_example.csv")]
    pub contacts_filename: String,

    /// Where to write the per contact send log
    #[arg(long = "send-log", value_name = "PATH", default_value = "logs/send_log.csv")]
    pub send_log_filename: String,

    /// Set logging level to use
    #[arg(long, short, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,
}

impl Cli {
    pub fn get_config_path(&self) -> PathBuf {
        match self.config_filename.as_ref() {
            Some(val) => PathBuf::from(val),
            None => PathBuf::from("config.json"),
        }
    }

    pub fn get_contacts_path(&self) -> PathBuf {
        PathBuf::from(&self.contacts_filename)
    }

    pub fn get_send_log_path(&self) -> PathBuf {
        PathBuf::from(&self.send_log_filename)
    }
}

/// Exists to provide better help messages variants copied from LevelFilter as
/// that's the type that is actually needed
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug, Default)]
pub enum LogLevel {
    /// Nothing emitted in this mode
    #[default]
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(value: LogLevel) -> Self {
        match value {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}
