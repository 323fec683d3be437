//! Monitoring plugin output.
//!
//! `Plugin` accumulates the verdict of a check: a status and message, extra
//! text lines and performance data. Rendering produces the text a
//! Nagios/Icinga/Centreon style supervisor reads, and `Status::exit_code()`
//! the process exit code it relies on. Nothing here exits the process: the
//! binary prints the rendered output and exits last.

mod perfdata;

use std::fmt;

use strum_macros::EnumIter;

pub use perfdata::{PerfData, PerfDataRange, UnitOfMeasurement};

/// Plugin status. The discriminant is the process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter)]
pub enum Status {
    /// Service is healthy
    Ok = 0,
    /// Attention needed soon
    Warning = 1,
    /// Service is broken or about to be
    Critical = 2,
    /// The check itself could not determine the state
    Unknown = 3,
}

impl Status {
    /// Exit code expected by the supervisor.
    pub fn exit_code(self) -> i32 {
        self as i32
    }

    /// Upper-case name used in the output line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Ok => "OK",
            Status::Warning => "WARNING",
            Status::Critical => "CRITICAL",
            Status::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accumulated state of a plugin run.
#[derive(Debug, Clone)]
pub struct Plugin {
    name: String,
    status: Status,
    message: String,
    lines: Vec<String>,
    perf_data: Vec<PerfData>,
}

impl Plugin {
    /// Creates a plugin in the UNKNOWN state.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: Status::Unknown,
            message: "no status set".to_string(),
            lines: Vec::new(),
            perf_data: Vec::new(),
        }
    }

    /// Sets the final status and message.
    pub fn set_state(&mut self, status: Status, message: impl Into<String>) {
        self.status = status;
        self.message = message.into();
    }

    /// Appends a line of extra output.
    pub fn add_line(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    /// Appends several lines of extra output.
    pub fn add_lines<I, S>(&mut self, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lines.extend(lines.into_iter().map(Into::into));
    }

    /// Adds a performance data record.
    ///
    /// # Panics
    ///
    /// Panics if a record with the same label was already added.
    pub fn add_perf_data(&mut self, perf_data: PerfData) {
        assert!(
            !self.perf_data.iter().any(|pd| pd.label() == perf_data.label()),
            "duplicate performance data {}",
            perf_data.label()
        );
        self.perf_data.push(perf_data);
    }

    /// Current status.
    pub fn status(&self) -> Status {
        self.status
    }

    /// Current status message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Extra output lines, in insertion order.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Performance data records, in insertion order.
    pub fn perf_data(&self) -> &[PerfData] {
        &self.perf_data
    }
}

impl fmt::Display for Plugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.name, self.status, self.message)?;
        if !self.perf_data.is_empty() {
            f.write_str(" |")?;
            for pd in &self.perf_data {
                write!(f, " {pd}")?;
            }
        }
        for line in &self.lines {
            write!(f, "\n{line}")?;
        }
        Ok(())
    }
}
