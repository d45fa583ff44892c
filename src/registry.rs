//! Lookup table from check name to what to run and how to judge it.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::ProbeError;
use crate::metrics::{self, MetricComputer, STATUS_METRICS};
use crate::threshold::ThresholdPolicy;

pub const PROFILE_PLACEHOLDER: &str = "{profile}";

const STATUS_WARNING: Option<f64> = Some(0.75);
const STATUS_CRITICAL: Option<f64> = Some(0.9);

pub struct CheckDefinition {
    pub name: &'static str,
    pub command_template: &'static str,
    pub metric_computer: MetricComputer,
    pub threshold_policy: ThresholdPolicy,
    pub default_warning: Option<f64>,
    pub default_critical: Option<f64>,
    /// Metrics are percentages of a reported maximum.
    pub ratio: bool,
    /// Refuse to run without `--profile`.
    pub requires_profile: bool,
}

impl CheckDefinition {
    const fn counter(name: &'static str, command_template: &'static str, metric_computer: MetricComputer) -> Self {
        Self {
            name,
            command_template,
            metric_computer,
            threshold_policy: ThresholdPolicy::Single,
            default_warning: None,
            default_critical: None,
            ratio: false,
            requires_profile: false,
        }
    }

    const fn sofia(name: &'static str, metric_computer: MetricComputer) -> Self {
        Self {
            requires_profile: true,
            ..Self::counter(name, "sofia status profile {profile}", metric_computer)
        }
    }

    const fn status(name: &'static str, keys: &'static [&'static str]) -> Self {
        Self {
            name,
            command_template: "status",
            metric_computer: metrics::status,
            threshold_policy: ThresholdPolicy::AnyOfKeys(keys),
            default_warning: STATUS_WARNING,
            default_critical: STATUS_CRITICAL,
            ratio: true,
            requires_profile: true,
        }
    }

    /// Substitutes the sanitized profile, or an empty string, into the template.
    pub fn render_command(&self, profile: Option<&str>) -> String {
        let profile = profile.map(sanitize_profile).unwrap_or_default();
        self.command_template.replace(PROFILE_PLACEHOLDER, &profile)
    }

    /// Renders the command, refusing checks that need a profile when none is given.
    pub fn command_for(&self, profile: Option<&str>) -> Result<String, ProbeError> {
        let given = profile.map(str::trim).filter(|p| !p.is_empty());
        if self.requires_profile && given.map(sanitize_profile).map_or(true, |p| p.is_empty()) {
            return Err(ProbeError::MissingProfile(self.name.to_string()));
        }
        Ok(self.render_command(given))
    }
}

static CHECKS: &[CheckDefinition] = &[
    CheckDefinition::counter("show-calls-count", "show calls count", metrics::calls_count),
    CheckDefinition::counter("show-bridged-calls-count", "show bridged_calls count", metrics::total_count),
    CheckDefinition::counter("show-channels-count", "show channels count", metrics::total_count),
    CheckDefinition::sofia("sofia-status", metrics::profile_calls),
    CheckDefinition::sofia("failed-calls-in", metrics::failed_calls_in),
    CheckDefinition::sofia("failed-calls-out", metrics::failed_calls_out),
    CheckDefinition::status("status", STATUS_METRICS),
    CheckDefinition::status("sessions-per-second", &["sps", "5min_sps"]),
    CheckDefinition::status("sessions", &["sessions", "5min_sessions"]),
    CheckDefinition::status("cpu", &["cpu"]),
    CheckDefinition::status("stack", &["stack"]),
];

pub fn check_names() -> Vec<&'static str> {
    CHECKS.iter().map(|c| c.name).collect()
}

pub fn lookup(name: &str) -> Result<&'static CheckDefinition, ProbeError> {
    CHECKS
        .iter()
        .find(|c| c.name == name)
        .ok_or_else(|| ProbeError::UnknownCheck {
            name: name.to_string(),
            known: check_names().join(", "),
        })
}

/// ASCII only, punctuation stripped, runs of whitespace and hyphens collapsed to `-`.
pub fn sanitize_profile(profile: &str) -> String {
    static PUNCTUATION: OnceLock<Regex> = OnceLock::new();
    static SEPARATORS: OnceLock<Regex> = OnceLock::new();
    let punctuation = PUNCTUATION.get_or_init(|| Regex::new(r"[^\w\s-]").expect("static regex"));
    let separators = SEPARATORS.get_or_init(|| Regex::new(r"[-\s]+").expect("static regex"));

    let ascii: String = profile.chars().filter(char::is_ascii).collect();
    let stripped = punctuation.replace_all(ascii.trim(), "");
    separators.replace_all(stripped.trim(), "-").into_owned()
}
