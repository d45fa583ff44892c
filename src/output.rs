use crate::checker::{CheckResult, NamedMetric};

pub trait Outputs {
    fn process_probe(&mut self, probe: &CheckResult);
}

/// `<TITLE> <SEVERITY>: <check> (<command>) = <values>[;warn][;crit] | <perfdata>`
pub fn render_line(title: &str, probe: &CheckResult) -> String {
    let mut line = format!("{} {}: {}", title, probe.severity, probe.name);
    if !probe.command.is_empty() {
        line.push_str(&format!(" ({})", probe.command));
    }
    if let Some(message) = &probe.message {
        line.push_str(" - ");
        line.push_str(&single_line(message));
    }
    if probe.metrics.is_empty() {
        return line;
    }

    let values: Vec<String> = probe
        .metrics
        .iter()
        .map(|m| {
            if probe.metrics.len() == 1 {
                format_number(m.value)
            } else {
                format!("{}={}", m.name, format_number(m.value))
            }
        })
        .collect();
    line.push_str(&format!(" = {}", values.join(", ")));
    if let Some(warning) = probe.warning {
        line.push_str(&format!(";{}", format_number(warning)));
    }
    if let Some(critical) = probe.critical {
        line.push_str(&format!(";{}", format_number(critical)));
    }

    let perfdata: Vec<String> = probe
        .metrics
        .iter()
        .map(|m| perfdata(m, probe.warning, probe.critical))
        .collect();
    line.push_str(" | ");
    line.push_str(&perfdata.join(" "));
    line
}

/// `name=value;warn;crit;min;` with empty slots for unset levels.
fn perfdata(metric: &NamedMetric, warning: Option<f64>, critical: Option<f64>) -> String {
    let slot = |v: Option<f64>| v.map(format_number).unwrap_or_default();
    let name = if metric.name.chars().next().map_or(false, |c| c.is_ascii_digit()) {
        format!("'{}'", metric.name)
    } else {
        metric.name.clone()
    };
    format!(
        "{}={};{};{};{};",
        name,
        format_number(metric.value),
        slot(warning),
        slot(critical),
        slot(metric.floor)
    )
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{:.2}", value)
    }
}

fn single_line(message: &str) -> String {
    message.split_whitespace().collect::<Vec<_>>().join(" ")
}
