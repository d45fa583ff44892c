pub mod checker;
pub mod config;
pub mod error;
pub mod extractor;
pub mod metrics;
pub mod output;
pub mod output_print;
pub mod probe;
pub mod registry;
pub mod runner;
pub mod threshold;

use clap::error::ErrorKind;
use clap::Parser;
use log::{error, info};
use std::ffi::OsString;
use std::io::{self, Write};
use std::panic::{self, AssertUnwindSafe};
use std::process;

use crate::checker::{CheckResult, Severity};
use crate::config::{CmdOptions, Settings};
use crate::error::ProbeError;
use crate::output::Outputs;
use crate::output_print::PrintOutput;
use crate::probe::{run_probe, ProbeRequest};
use crate::runner::FsCli;

const DEFAULT_TITLE: &str = "FREESWITCH";

fn probe(opts: &CmdOptions) -> CheckResult {
    let settings = match Settings::from_options(opts) {
        Ok(settings) => settings,
        Err(err) => {
            return CheckResult::unknown(&opts.query, "", ProbeError::from(err).to_string())
        }
    };
    let request = ProbeRequest {
        query: opts.query.clone(),
        profile: opts.profile.clone(),
        warning: opts.warning,
        critical: opts.critical,
    };
    run_probe(&request, &settings, &FsCli::new(&settings))
}

/// Runs `check` and turns a panic into an UNKNOWN result for `query`.
fn guarded<F>(query: &str, check: F) -> CheckResult
where
    F: FnOnce() -> CheckResult,
{
    match panic::catch_unwind(AssertUnwindSafe(check)) {
        Ok(result) => result,
        Err(cause) => {
            let reason = cause
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| cause.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| String::from("unexpected failure"));
            error!("Check panicked: {}", reason);
            CheckResult::unknown(query, "", format!("internal error: {}", reason))
        }
    }
}

/// Parses `args`, runs one check and writes the status line to `out`.
/// Returns the process exit code.
pub fn run<I, T>(args: I, out: &mut dyn Write) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let opts = match CmdOptions::try_parse_from(args) {
        Ok(opts) => opts,
        Err(err) => {
            return match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                    let _ = write!(out, "{}", err);
                    0
                }
                _ => {
                    eprint!("{}", err);
                    let result =
                        CheckResult::unknown("arguments", "", String::from("invalid arguments"));
                    PrintOutput::new(DEFAULT_TITLE, out).process_probe(&result);
                    Severity::Unknown.exit_code()
                }
            };
        }
    };
    let _ = env_logger::Builder::new()
        .filter_level(opts.log_level())
        .parse_default_env()
        .try_init();
    info!("Running check {}", opts.query);

    // Whatever happens the supervisor gets a status line and a valid exit code.
    let result = guarded(&opts.query, || probe(&opts));
    if let Some(message) = &result.message {
        error!("{}", message);
    }

    PrintOutput::new(&opts.title, out).process_probe(&result);
    info!("Exit Code: {}", result.severity.exit_code());
    result.severity.exit_code()
}

fn main() {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let code = run(std::env::args_os(), &mut out);
    let _ = out.flush();
    process::exit(code);
}
