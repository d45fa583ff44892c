use log::debug;

use crate::checker::{NamedMetric, Severity};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ThresholdPolicy {
    /// The first produced metric is compared on its own.
    Single,
    /// Trips on the worst of the named metrics.
    AnyOfKeys(&'static [&'static str]),
}

/// Effective warning/critical levels. `None` disables a level.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ThresholdConfig {
    pub warning: Option<f64>,
    pub critical: Option<f64>,
    /// Metrics are percentages and levels are fractions of 1.
    pub ratio: bool,
}

impl ThresholdConfig {
    /// Resolves user levels against check defaults. An unset level falls back to
    /// the default, an explicit 0 disables the level. For ratio checks any level
    /// above 1 is read as a whole percentage.
    pub fn resolve(
        warning: Option<f64>,
        critical: Option<f64>,
        default_warning: Option<f64>,
        default_critical: Option<f64>,
        ratio: bool,
    ) -> Self {
        let level = |given: Option<f64>, default: Option<f64>| {
            let value = given.or(default).filter(|v| *v != 0.0 && v.is_finite())?;
            if ratio && value > 1.0 {
                Some(value / 100.0)
            } else {
                Some(value)
            }
        };
        Self {
            warning: level(warning, default_warning),
            critical: level(critical, default_critical),
            ratio,
        }
    }

    /// Levels in the same units as the metrics they are compared with.
    pub fn display_levels(&self) -> (Option<f64>, Option<f64>) {
        let scale = |v: f64| if self.ratio { v * 100.0 } else { v };
        (self.warning.map(scale), self.critical.map(scale))
    }

    fn comparable(&self, value: f64) -> f64 {
        if self.ratio {
            value / 100.0
        } else {
            value
        }
    }

    fn exceeds(&self, level: Option<f64>, value: f64) -> bool {
        match level {
            Some(limit) => self.comparable(value) > limit,
            None => false,
        }
    }

    pub fn evaluate(&self, policy: ThresholdPolicy, metrics: &[NamedMetric]) -> Severity {
        let considered: Vec<&NamedMetric> = match policy {
            ThresholdPolicy::Single => metrics.iter().take(1).collect(),
            ThresholdPolicy::AnyOfKeys(keys) => metrics
                .iter()
                .filter(|m| keys.contains(&m.name.as_str()))
                .collect(),
        };
        let severity = if considered.iter().any(|m| self.exceeds(self.critical, m.value)) {
            Severity::Critical
        } else if considered.iter().any(|m| self.exceeds(self.warning, m.value)) {
            Severity::Warning
        } else {
            Severity::Ok
        };
        debug!(
            "Evaluated {} metric(s) against {:?}/{:?}: {}",
            considered.len(),
            self.warning,
            self.critical,
            severity
        );
        severity
    }
}
