use std::{
    fmt::Display,
    fs::{create_dir_all, File},
    io::{Read, Write},
    path::Path,
};

use anyhow::Context;
use chrono::{SecondsFormat, Utc};
use csv::{ReaderBuilder, Writer, WriterBuilder};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::utils::make_single_line;

pub const HEADER: [&str; 4] = ["timestamp", "email", "status", "error"];

/// Error recorded for contacts without an address
pub const MISSING_EMAIL: &str = "missing email";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timestamp(String);

impl Timestamp {
    /// Current UTC time, RFC 3339 with microseconds
    pub fn new() -> Self {
        Self(Utc::now().to_rfc3339_opts(SecondsFormat::Micros, false))
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SendStatus {
    Sent,
    Failed,
    Skipped,
}

impl Display for SendStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SendStatus::Sent => "sent",
            SendStatus::Failed => "failed",
            SendStatus::Skipped => "skipped",
        };
        f.pad(s)
    }
}

/// One row of the send log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    pub timestamp: Timestamp,
    pub email: String,
    pub status: SendStatus,
    pub error: String,
}

impl LogRecord {
    pub fn sent(email: &str) -> Self {
        Self {
            timestamp: Timestamp::new(),
            email: email.to_string(),
            status: SendStatus::Sent,
            error: String::new(),
        }
    }

    pub fn failed(email: &str, error: &str) -> Self {
        Self {
            timestamp: Timestamp::new(),
            email: email.to_string(),
            status: SendStatus::Failed,
            error: make_single_line(error).into_owned(),
        }
    }

    pub fn skipped() -> Self {
        Self {
            timestamp: Timestamp::new(),
            email: String::new(),
            status: SendStatus::Skipped,
            error: MISSING_EMAIL.to_string(),
        }
    }
}

/// Totals per status for a run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SendReport {
    pub sent: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl SendReport {
    pub fn add(&mut self, status: SendStatus) {
        match status {
            SendStatus::Sent => self.sent += 1,
            SendStatus::Failed => self.failed += 1,
            SendStatus::Skipped => self.skipped += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.sent + self.failed + self.skipped
    }
}

impl Display for SendReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} contacts: {} sent, {} failed, {} skipped",
            self.total(),
            self.sent,
            self.failed,
            self.skipped
        )
    }
}

/// CSV log with one row per processed contact
pub struct SendLog<W: Write> {
    writer: Writer<W>,
}

impl SendLog<File> {
    /// Creates (or truncates) the log at `log_path` and writes the header row
    pub fn create(log_path: &Path) -> anyhow::Result<Self> {
        debug!("Creating send log at {log_path:?}");
        if let Some(parent) = log_path.parent() {
            create_dir_all(parent)
                .with_context(|| format!("Failed to create directory for send log {parent:?}"))?;
        }
        let file = File::create(log_path)
            .with_context(|| format!("Failed to create send log {log_path:?}"))?;
        Self::from_writer(file)
    }
}

impl<W: Write> SendLog<W> {
    pub fn from_writer(inner: W) -> anyhow::Result<Self> {
        let mut writer = WriterBuilder::new().has_headers(false).from_writer(inner);
        writer
            .write_record(HEADER)
            .context("Failed to write send log header")?;
        writer.flush().context("Failed to flush send log")?;
        Ok(Self { writer })
    }

    pub fn record(&mut self, record: &LogRecord) -> anyhow::Result<()> {
        self.writer
            .serialize(record)
            .with_context(|| format!("Failed to write send log row for {:?}", record.email))?;
        self.writer.flush().context("Failed to flush send log")?;
        Ok(())
    }

    pub fn into_inner(self) -> anyhow::Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| anyhow::anyhow!("Failed to flush send log: {}", e.error()))
    }
}

/// Reads back every row of a send log
pub fn read_records<R: Read>(reader: R) -> anyhow::Result<Vec<LogRecord>> {
    let mut reader = ReaderBuilder::new().from_reader(reader);
    let mut result = vec![];
    for (i, record) in reader.deserialize().enumerate() {
        let record: LogRecord =
            record.with_context(|| format!("Failed to parse send log row {}", i + 2))?;
        result.push(record);
    }
    Ok(result)
}
