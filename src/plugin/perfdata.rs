//! Performance data records.
//!
//! Encodes `label=value<unit>;warn;crit;min;max` the way Nagios-compatible
//! supervisors parse it. Values are checked against a numeric-literal pattern
//! when a record is built: an invalid literal is a programming error and
//! panics.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

const VALUE_PATTERN: &str = r"^-?(0(\.\d*)?|[1-9]\d*(\.\d*)?|\.\d+)$";

static VALUE_CHECK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(VALUE_PATTERN).expect("performance data value pattern"));

fn checked_value(value: String, what: &str) -> String {
    assert!(
        VALUE_CHECK.is_match(&value),
        "invalid performance data {what} {value:?}"
    );
    value
}

/// Unit appended to a performance data value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnitOfMeasurement {
    /// Plain number
    #[default]
    None,
    /// `s`
    Seconds,
    /// `%`
    Percent,
    /// `B`
    Bytes,
    /// `KB`
    Kilobytes,
    /// `MB`
    Megabytes,
    /// `GB`
    Gigabytes,
    /// `TB`
    Terabytes,
    /// `c`, a continuous counter
    Counter,
}

impl UnitOfMeasurement {
    /// Suffix written after the value.
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitOfMeasurement::None => "",
            UnitOfMeasurement::Seconds => "s",
            UnitOfMeasurement::Percent => "%",
            UnitOfMeasurement::Bytes => "B",
            UnitOfMeasurement::Kilobytes => "KB",
            UnitOfMeasurement::Megabytes => "MB",
            UnitOfMeasurement::Gigabytes => "GB",
            UnitOfMeasurement::Terabytes => "TB",
            UnitOfMeasurement::Counter => "c",
        }
    }
}

/// Warning or critical range of a performance data record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PerfDataRange {
    /// `None` is minus infinity (`~`)
    start: Option<String>,
    end: String,
    inside: bool,
}

impl PerfDataRange {
    /// Range from minus infinity to `max`, rendered `~:max`.
    pub fn at_most(max: impl ToString) -> Self {
        Self {
            start: None,
            end: checked_value(max.to_string(), "range maximum"),
            inside: false,
        }
    }

    /// Range from `min` to `max`, rendered `min:max`.
    pub fn between(min: impl ToString, max: impl ToString) -> Self {
        Self {
            start: Some(checked_value(min.to_string(), "range minimum")),
            end: checked_value(max.to_string(), "range maximum"),
            inside: false,
        }
    }

    /// Alert when the value is inside the range instead of outside (`@` prefix).
    pub fn inside(mut self) -> Self {
        self.inside = true;
        self
    }
}

impl fmt::Display for PerfDataRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.inside {
            f.write_str("@")?;
        }
        write!(f, "{}:{}", self.start.as_deref().unwrap_or("~"), self.end)
    }
}

/// One performance data record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PerfData {
    label: String,
    unit: UnitOfMeasurement,
    value: Option<String>,
    warn: Option<PerfDataRange>,
    crit: Option<PerfDataRange>,
    min: Option<String>,
    max: Option<String>,
}

impl PerfData {
    /// Record with a known value.
    pub fn new(label: impl Into<String>, unit: UnitOfMeasurement, value: impl ToString) -> Self {
        Self {
            value: Some(checked_value(value.to_string(), "value")),
            ..Self::unknown(label, unit)
        }
    }

    /// Record whose value could not be determined (rendered `U`).
    pub fn unknown(label: impl Into<String>, unit: UnitOfMeasurement) -> Self {
        Self {
            label: label.into(),
            unit,
            value: None,
            warn: None,
            crit: None,
            min: None,
            max: None,
        }
    }

    /// Label identifying the record.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Sets the warning range.
    pub fn with_warn(mut self, range: PerfDataRange) -> Self {
        self.warn = Some(range);
        self
    }

    /// Sets the critical range.
    pub fn with_crit(mut self, range: PerfDataRange) -> Self {
        self.crit = Some(range);
        self
    }

    /// Sets the minimal possible value.
    pub fn with_min(mut self, min: impl ToString) -> Self {
        self.min = Some(checked_value(min.to_string(), "minimum"));
        self
    }

    /// Sets the maximal possible value.
    pub fn with_max(mut self, max: impl ToString) -> Self {
        self.max = Some(checked_value(max.to_string(), "maximum"));
        self
    }
}

impl fmt::Display for PerfData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = self.label.replace('\'', "''");
        if self.label.contains([' ', '\'', '=', '"']) {
            write!(f, "'{label}'=")?;
        } else {
            write!(f, "{label}=")?;
        }
        write!(
            f,
            "{}{};",
            self.value.as_deref().unwrap_or("U"),
            self.unit.as_str()
        )?;
        if let Some(warn) = &self.warn {
            write!(f, "{warn}")?;
        }
        f.write_str(";")?;
        if let Some(crit) = &self.crit {
            write!(f, "{crit}")?;
        }
        f.write_str(";")?;
        if let Some(min) = &self.min {
            f.write_str(min)?;
        }
        f.write_str(";")?;
        if let Some(max) = &self.max {
            f.write_str(max)?;
        }
        Ok(())
    }
}
