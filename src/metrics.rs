//! Per-check conversion of parsed console fields into named metrics.

use log::{debug, trace};
use regex::Regex;
use std::sync::OnceLock;

use crate::checker::NamedMetric;
use crate::extractor::ParsedFields;

pub type MetricComputer = fn(&ParsedFields) -> Vec<NamedMetric>;

/// Metric names produced by the aggregate status report, in display order.
pub const STATUS_METRICS: &[&str] = &["sessions", "5min_sessions", "sps", "5min_sps", "cpu", "stack"];

pub fn calls_count(fields: &ParsedFields) -> Vec<NamedMetric> {
    vec![NamedMetric::new("total", total_or_zero(fields), Some(-1.0))]
}

pub fn total_count(fields: &ParsedFields) -> Vec<NamedMetric> {
    vec![NamedMetric::new("total", total_or_zero(fields), Some(0.0))]
}

pub fn profile_calls(fields: &ParsedFields) -> Vec<NamedMetric> {
    let total = fields.get_int("calls_in") + fields.get_int("calls_out");
    vec![NamedMetric::new("profile_calls", total as f64, Some(0.0))]
}

pub fn failed_calls_in(fields: &ParsedFields) -> Vec<NamedMetric> {
    let failed = fields.get_int("failed_calls_in");
    vec![NamedMetric::new("failed_calls_in", failed as f64, Some(0.0))]
}

pub fn failed_calls_out(fields: &ParsedFields) -> Vec<NamedMetric> {
    let failed = fields.get_int("failed_calls_out");
    vec![NamedMetric::new("failed_calls_out", failed as f64, Some(0.0))]
}

fn total_or_zero(fields: &ParsedFields) -> f64 {
    fields.total().unwrap_or(0) as f64
}

/// Raw figures read from the `status` report. Anything missing stays 0.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusReport {
    pub total_sessions: f64,
    pub current_sessions: f64,
    pub last_five_sessions: f64,
    pub max_sessions: f64,
    pub sessions_per_second: f64,
    pub last_five_sps: f64,
    pub max_sessions_per_second: f64,
    pub cpu_current: f64,
    pub cpu_max: f64,
    pub stack_current: f64,
    pub stack_max: f64,
}

impl StatusReport {
    pub fn from_fields(fields: &ParsedFields) -> Self {
        let mut report = StatusReport::default();
        if let Some(line) = fields.find_line("since startup") {
            trace!("Total Line: {}", line);
            report.total_sessions = number(first_token(line));
        }
        if let Some(line) = fields.find_line("session(s) - peak") {
            trace!("Sessions Line: {}", line);
            report.current_sessions = number(first_token(line));
            report.last_five_sessions = number(last_token(line));
        }
        if let Some(line) = fields.find_line("per sec") {
            trace!("Sessions Per Second Line: {}", line);
            report.sessions_per_second = number(first_token(line));
            report.last_five_sps = number(last_token(line));
            report.max_sessions_per_second = number(&max_sps_token(line));
        }
        if let Some(line) = fields.find_line("session(s) max") {
            trace!("Max sessions Line: {}", line);
            report.max_sessions = number(first_token(line));
        }
        if let Some(line) = fields.find_line("cpu") {
            trace!("CPU Line: {}", line);
            (report.cpu_current, report.cpu_max) = current_and_max(line);
        }
        if let Some(line) = fields.find_line("stack") {
            trace!("Stack Line: {}", line);
            (report.stack_current, report.stack_max) = current_and_max(line);
        }
        debug!("Parsed status report: {:?}", report);
        report
    }

    pub fn metrics(&self) -> Vec<NamedMetric> {
        let values = [
            percent_of(self.current_sessions, self.max_sessions),
            percent_of(self.last_five_sessions, self.max_sessions),
            percent_of(self.sessions_per_second, self.max_sessions_per_second),
            percent_of(self.last_five_sps, self.max_sessions_per_second),
            percent_of(self.cpu_current, self.cpu_max),
            percent_of(self.stack_current, self.stack_max),
        ];
        STATUS_METRICS
            .iter()
            .zip(values)
            .map(|(name, value)| NamedMetric::new(name, value, Some(0.0)))
            .collect()
    }
}

pub fn status(fields: &ParsedFields) -> Vec<NamedMetric> {
    StatusReport::from_fields(fields).metrics()
}

pub fn percent_of(current: f64, max: f64) -> f64 {
    if max == 0.0 || !max.is_finite() {
        return 0.0;
    }
    current * 100.0 / max
}

/// Expands `G`, `M` and `K` by textual zero padding, so `1.5M` reads as `1.5000000`.
pub fn parse_byte_size(raw: &str) -> f64 {
    let expanded = raw
        .trim()
        .replace('G', "000000000")
        .replace('K', "000")
        .replace('M', "000000");
    number(&expanded)
}

fn current_and_max(line: &str) -> (f64, f64) {
    let mut parts = last_token(line).split('/');
    let current = parts.next().map(parse_byte_size).unwrap_or(0.0);
    let max = parts.next().map(parse_byte_size).unwrap_or(0.0);
    (current, max)
}

fn max_sps_token(line: &str) -> String {
    fn re() -> &'static Regex {
        static RE: OnceLock<Regex> = OnceLock::new();
        RE.get_or_init(|| Regex::new(r"(?i)\bmax\s+([^\s,]+)").expect("static regex"))
    }
    re().captures(line)
        .map(|caps| caps[1].chars().filter(|c| c.is_ascii_digit() || *c == '.').collect())
        .unwrap_or_default()
}

fn first_token(line: &str) -> &str {
    line.split_whitespace().next().unwrap_or("")
}

fn last_token(line: &str) -> &str {
    line.split_whitespace().last().unwrap_or("")
}

fn number(raw: &str) -> f64 {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::parse_fields;

    const STATUS_OUTPUT: &str = "\
UP 0 years, 5 days, 2 hours, 15 minutes, 37 seconds, 123 milliseconds, 456 microseconds
FreeSWITCH (Version 1.10.7 -release 64bit) is ready
1234 session(s) since startup
50 session(s) - peak 120, last 5min 96
3 session(s) per Sec out of max 30, peak 12, last 5min 6
100 session(s) max
min idle cpu 5M/10M
Current Stack Size/Max 240K/8192K
";

    fn metric(metrics: &[NamedMetric], name: &str) -> f64 {
        metrics
            .iter()
            .find(|m| m.name == name)
            .map(|m| m.value)
            .unwrap()
    }

    #[test]
    fn byte_suffixes_expand_textually() {
        assert_eq!(parse_byte_size("5M"), 5_000_000.0);
        assert_eq!(parse_byte_size("10M"), 10_000_000.0);
        assert_eq!(parse_byte_size("240K"), 240_000.0);
        assert_eq!(parse_byte_size("2G"), 2_000_000_000.0);
        assert_eq!(parse_byte_size("1.5M"), 1.5);
        assert_eq!(parse_byte_size("98.67"), 98.67);
        assert_eq!(parse_byte_size("lots"), 0.0);
    }

    #[test]
    fn status_report_reads_every_line() {
        let report = StatusReport::from_fields(&parse_fields(STATUS_OUTPUT));
        assert_eq!(report.total_sessions, 1234.0);
        assert_eq!(report.current_sessions, 50.0);
        assert_eq!(report.last_five_sessions, 96.0);
        assert_eq!(report.max_sessions, 100.0);
        assert_eq!(report.sessions_per_second, 3.0);
        assert_eq!(report.last_five_sps, 6.0);
        assert_eq!(report.max_sessions_per_second, 30.0);
        assert_eq!(report.cpu_current, 5_000_000.0);
        assert_eq!(report.cpu_max, 10_000_000.0);
        assert_eq!(report.stack_current, 240_000.0);
        assert_eq!(report.stack_max, 8_192_000.0);
    }

    #[test]
    fn status_metrics_are_percentages_in_stable_order() {
        let metrics = status(&parse_fields(STATUS_OUTPUT));
        let names: Vec<&str> = metrics.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, STATUS_METRICS);
        assert_eq!(metric(&metrics, "sessions"), 50.0);
        assert_eq!(metric(&metrics, "5min_sessions"), 96.0);
        assert_eq!(metric(&metrics, "sps"), 10.0);
        assert_eq!(metric(&metrics, "5min_sps"), 20.0);
        assert_eq!(metric(&metrics, "cpu"), 50.0);
    }

    #[test]
    fn status_tolerates_reordered_lines_and_banners() {
        let output = "\
+OK
Current Stack Size/Max 1M/4M
extra banner line
200 session(s) max
10 session(s) - peak 40, last 5min 20
";
        let metrics = status(&parse_fields(output));
        assert_eq!(metric(&metrics, "sessions"), 5.0);
        assert_eq!(metric(&metrics, "5min_sessions"), 10.0);
        assert_eq!(metric(&metrics, "stack"), 25.0);
        assert_eq!(metric(&metrics, "sps"), 0.0);
        assert_eq!(metric(&metrics, "cpu"), 0.0);
    }

    #[test]
    fn zero_denominator_yields_zero() {
        assert_eq!(percent_of(10.0, 0.0), 0.0);
        let output = "10 session(s) - peak 40, last 5min 20\n0 session(s) max\n";
        let metrics = status(&parse_fields(output));
        assert_eq!(metric(&metrics, "sessions"), 0.0);
        assert_eq!(metric(&metrics, "5min_sessions"), 0.0);
    }

    #[test]
    fn empty_status_output_degrades_to_zero() {
        let metrics = status(&parse_fields(""));
        assert_eq!(metrics.len(), STATUS_METRICS.len());
        assert!(metrics.iter().all(|m| m.value == 0.0));
    }

    #[test]
    fn counts_default_to_zero() {
        let empty = parse_fields("");
        assert_eq!(total_count(&empty)[0].value, 0.0);
        assert_eq!(calls_count(&empty)[0].floor, Some(-1.0));
        assert_eq!(profile_calls(&empty)[0].value, 0.0);
        assert_eq!(failed_calls_in(&empty)[0].value, 0.0);
        assert_eq!(failed_calls_out(&empty)[0].value, 0.0);
    }

    #[test]
    fn sofia_counters() {
        let fields = parse_fields(
            "CALLS-IN         \t7\nFAILED-CALLS-IN  \t2\nCALLS-OUT        \t5\nFAILED-CALLS-OUT   \t1\n",
        );
        assert_eq!(profile_calls(&fields)[0].value, 12.0);
        assert_eq!(failed_calls_in(&fields)[0].name, "failed_calls_in");
        assert_eq!(failed_calls_in(&fields)[0].value, 2.0);
        assert_eq!(failed_calls_out(&fields)[0].value, 1.0);
    }

    #[test]
    fn narrow_column_gap_is_not_a_row() {
        // Only a space and a tab between label and value.
        let fields = parse_fields("CALLS-IN         \t7\nFAILED-CALLS-OUT \t1\n");
        assert_eq!(fields.get("failed_calls_out"), None);
        assert_eq!(failed_calls_out(&fields)[0].value, 0.0);
        assert_eq!(profile_calls(&fields)[0].value, 7.0);
    }

    #[test]
    fn garbled_sofia_counters_read_as_zero() {
        let fields = parse_fields("CALLS-IN     many\nCALLS-OUT     3\n");
        assert_eq!(profile_calls(&fields)[0].value, 3.0);
    }
}
