//! One probe invocation: resolve, run, parse, compute, judge.
//!
//! Nothing here exits the process. Every outcome, including operational failures,
//! comes back as a [`CheckResult`] for the driver to print and turn into an exit code.

use log::{debug, info, warn};

use crate::checker::CheckResult;
use crate::config::Settings;
use crate::error::ProbeError;
use crate::extractor::parse_fields;
use crate::registry::{self, CheckDefinition};
use crate::runner::{build_argv, ConsoleRunner};
use crate::threshold::ThresholdConfig;

#[derive(Debug, Clone, Default)]
pub struct ProbeRequest {
    pub query: String,
    pub profile: Option<String>,
    pub warning: Option<f64>,
    pub critical: Option<f64>,
}

pub fn run_probe(request: &ProbeRequest, settings: &Settings, runner: &dyn ConsoleRunner) -> CheckResult {
    let check = match registry::lookup(&request.query) {
        Ok(check) => check,
        Err(err) => return CheckResult::unknown(&request.query, "", err.to_string()),
    };
    let command = match check.command_for(request.profile.as_deref()) {
        Ok(command) => command,
        Err(err) => return CheckResult::unknown(check.name, check.command_template, err.to_string()),
    };
    match execute_check(check, &command, request, settings, runner) {
        Ok(result) => result,
        Err(err) => CheckResult::unknown(check.name, &command, err.to_string()),
    }
}

fn execute_check(
    check: &CheckDefinition,
    command: &str,
    request: &ProbeRequest,
    settings: &Settings,
    runner: &dyn ConsoleRunner,
) -> Result<CheckResult, ProbeError> {
    let thresholds = ThresholdConfig::resolve(
        request.warning,
        request.critical,
        check.default_warning,
        check.default_critical,
        check.ratio,
    );
    debug!("Running {} with thresholds {:?}", check.name, thresholds);

    let output = runner.run(&build_argv(settings, command))?;
    if output.code != 0 {
        return Err(ProbeError::ExitStatus {
            code: output.code,
            stderr: output.stderr.trim().to_string(),
        });
    }

    let fields = parse_fields(&output.stdout);
    if fields.is_empty() {
        warn!("{} returned nothing recognisable", command);
    }
    debug!("Parsed output: {:?}", fields);
    let metrics = (check.metric_computer)(&fields);
    let severity = thresholds.evaluate(check.threshold_policy, &metrics);
    info!("{} -> {}", check.name, severity);

    let (warning, critical) = thresholds.display_levels();
    Ok(CheckResult {
        name: check.name.to_string(),
        command: command.to_string(),
        severity,
        metrics,
        warning,
        critical,
        message: None,
    })
}
