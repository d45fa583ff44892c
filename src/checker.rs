use std::fmt;

/// Monitoring verdict, ordered from best to worst. The discriminant is the process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Ok = 0,
    Warning = 1,
    Critical = 2,
    Unknown = 3,
}

impl Severity {
    pub fn exit_code(self) -> i32 {
        self as i32
    }

    pub fn label(self) -> &'static str {
        match self {
            Severity::Ok => "OK",
            Severity::Warning => "WARNING",
            Severity::Critical => "CRITICAL",
            Severity::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NamedMetric {
    pub name: String,
    pub value: f64,
    /// Lowest sensible value, reported in perfdata. Never used to clamp.
    pub floor: Option<f64>,
}

impl NamedMetric {
    pub fn new(name: &str, value: f64, floor: Option<f64>) -> Self {
        Self {
            name: name.to_string(),
            value,
            floor,
        }
    }
}

/// Outcome of one probe invocation, handed to an output.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: String,
    pub command: String,
    pub severity: Severity,
    pub metrics: Vec<NamedMetric>,
    /// Warning/critical in the metrics' own units, for display.
    pub warning: Option<f64>,
    pub critical: Option<f64>,
    pub message: Option<String>,
}

impl CheckResult {
    /// A result for an operational failure: no metrics, just a diagnostic.
    pub fn unknown(name: &str, command: &str, message: String) -> Self {
        Self {
            name: name.to_string(),
            command: command.to_string(),
            severity: Severity::Unknown,
            metrics: Vec::new(),
            warning: None,
            critical: None,
            message: Some(message),
        }
    }
}
