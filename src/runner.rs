use log::{debug, trace};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

use crate::config::Settings;
use crate::error::ProbeError;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandOutput {
    pub code: i32,
    pub stdout: String,
    pub stderr: String,
}

/// Runs one console command and hands back its raw text.
pub trait ConsoleRunner {
    fn run(&self, argv: &[String]) -> Result<CommandOutput, ProbeError>;
}

/// `fs_cli [--host H] [--port P] [--password X] -x "<command>"`
pub fn build_argv(settings: &Settings, command: &str) -> Vec<String> {
    let mut argv = vec![settings.fs_cli.clone()];
    if let Some(host) = &settings.host {
        argv.push(String::from("--host"));
        argv.push(host.clone());
    }
    if let Some(port) = &settings.port {
        argv.push(String::from("--port"));
        argv.push(port.clone());
    }
    if let Some(password) = &settings.password {
        argv.push(String::from("--password"));
        argv.push(password.clone());
    }
    argv.push(String::from("-x"));
    argv.push(command.to_string());
    argv
}

/// Argument vector for logs, with the password value masked.
pub fn redacted(argv: &[String]) -> String {
    let mut shown = Vec::with_capacity(argv.len());
    let mut mask_next = false;
    for arg in argv {
        if mask_next {
            shown.push("********");
            mask_next = false;
        } else {
            mask_next = arg == "--password";
            shown.push(arg.as_str());
        }
    }
    shown.join(" ")
}

pub struct FsCli {
    timeout: Duration,
}

impl FsCli {
    pub fn new(settings: &Settings) -> Self {
        Self {
            timeout: Duration::from_secs(settings.timeout_secs),
        }
    }
}

impl ConsoleRunner for FsCli {
    fn run(&self, argv: &[String]) -> Result<CommandOutput, ProbeError> {
        debug!("Command: {}", redacted(argv));
        let output = execute(argv, self.timeout)?;
        trace!(
            "Command output: code: {}\n stdout: {}\n stderr: {}",
            output.code,
            output.stdout,
            output.stderr
        );
        Ok(output)
    }
}

#[tokio::main(flavor = "current_thread")]
async fn execute(argv: &[String], timeout: Duration) -> Result<CommandOutput, ProbeError> {
    let (program, args) = match argv.split_first() {
        Some(split) => split,
        None => {
            return Err(ProbeError::Launch {
                program: String::new(),
                source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty command"),
            })
        }
    };
    let child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| ProbeError::Launch {
            program: program.clone(),
            source,
        })?;
    let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(result) => result.map_err(|source| ProbeError::Launch {
            program: program.clone(),
            source,
        })?,
        Err(_) => return Err(ProbeError::Timeout { timeout }),
    };
    Ok(CommandOutput {
        // Killed by a signal: no code, report it like a shell would.
        code: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn remote() -> Settings {
        Settings {
            fs_cli: String::from("/usr/bin/fs_cli"),
            host: Some(String::from("127.0.0.1")),
            port: Some(String::from("8021")),
            password: Some(String::from("secret")),
            timeout_secs: 5,
        }
    }

    #[test]
    fn local_argv_has_only_the_command() {
        let argv = build_argv(&Settings::default(), "show calls count");
        assert_eq!(argv, vec!["/usr/bin/fs_cli", "-x", "show calls count"]);
    }

    #[test]
    fn remote_argv_carries_connection_flags() {
        let argv = build_argv(&remote(), "status");
        assert_eq!(
            argv,
            vec![
                "/usr/bin/fs_cli",
                "--host",
                "127.0.0.1",
                "--port",
                "8021",
                "--password",
                "secret",
                "-x",
                "status"
            ]
        );
    }

    #[test]
    fn password_is_redacted_in_logs() {
        let shown = redacted(&build_argv(&remote(), "status"));
        assert!(!shown.contains("secret"));
        assert!(shown.contains("--password ********"));
    }

    #[test]
    fn missing_binary_is_a_launch_error() {
        let settings = Settings {
            fs_cli: String::from("/nonexistent/fs_cli"),
            ..Settings::default()
        };
        let runner = FsCli::new(&settings);
        let err = runner.run(&build_argv(&settings, "status")).unwrap_err();
        assert!(matches!(err, ProbeError::Launch { .. }));
        assert!(err.to_string().contains("/nonexistent/fs_cli"));
    }

    #[cfg(unix)]
    #[test]
    fn captures_output_and_exit_code() {
        let runner = FsCli::new(&Settings::default());
        let argv: Vec<String> = ["sh", "-c", "echo '42 total'; echo oops >&2; exit 3"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let output = runner.run(&argv).unwrap();
        assert_eq!(output.code, 3);
        assert_eq!(output.stdout.trim(), "42 total");
        assert_eq!(output.stderr.trim(), "oops");
    }

    #[cfg(unix)]
    #[test]
    fn hung_command_times_out() {
        let runner = FsCli {
            timeout: Duration::from_millis(200),
        };
        let argv: Vec<String> = ["sleep", "5"].iter().map(|s| s.to_string()).collect();
        let err = runner.run(&argv).unwrap_err();
        assert!(matches!(err, ProbeError::Timeout { .. }));
        assert!(err.to_string().contains("200ms"), "{}", err);
    }
}
