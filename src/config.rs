use clap::Parser;
use log::{debug, LevelFilter};
use std::fs;
use std::path::Path;
use yaml_rust::{Yaml, YamlLoader};

use crate::error::ConfigError;

pub const DEFAULT_FS_CLI: &str = "/usr/bin/fs_cli";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Query the FreeSWITCH console and report a monitoring verdict.
///
/// Examples:
///   check_freeswitch -q show-channels-count -w 100 -c 200
///   check_freeswitch -q status -w 70 -c 85
#[derive(Parser, Debug, Clone)]
#[command(name = "check_freeswitch", version)]
pub struct CmdOptions {
    /// Verbosity level (0-3)
    #[arg(short = 'v', value_parser = clap::value_parser!(u8).range(0..=3), default_value_t = 0)]
    pub verbosity: u8,
    /// Threshold that generates a warning
    #[arg(short = 'w', allow_negative_numbers = true)]
    pub warning: Option<f64>,
    /// Threshold that generates a critical
    #[arg(short = 'c', allow_negative_numbers = true)]
    pub critical: Option<f64>,
    /// Check to run, e.g. show-calls-count maps to `fs_cli -x 'show calls count'`
    #[arg(short = 'q', long = "query", default_value = "status")]
    pub query: String,
    /// Profile name (required for sofia and status checks)
    #[arg(long)]
    pub profile: Option<String>,
    /// YAML settings file with fs_cli, host, port, password and timeout
    #[arg(long)]
    pub settings: Option<String>,
    #[arg(long = "fs-cli")]
    pub fs_cli: Option<String>,
    #[arg(long)]
    pub host: Option<String>,
    #[arg(long)]
    pub port: Option<String>,
    #[arg(long)]
    pub password: Option<String>,
    /// Seconds to wait for fs_cli before giving up
    #[arg(long)]
    pub timeout: Option<u64>,
    /// Label that starts the status line
    #[arg(short = 'f', long = "title", default_value = "FREESWITCH")]
    pub title: String,
}

impl CmdOptions {
    pub fn log_level(&self) -> LevelFilter {
        match self.verbosity {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

/// How to reach the console tool. Loaded once and passed down by reference.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub fs_cli: String,
    pub host: Option<String>,
    pub port: Option<String>,
    pub password: Option<String>,
    pub timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            fs_cli: String::from(DEFAULT_FS_CLI),
            host: None,
            port: None,
            password: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Settings {
    pub fn from_yaml_str(text: &str, path: &str) -> Result<Self, ConfigError> {
        let docs = YamlLoader::load_from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_string(),
            source,
        })?;
        let mut settings = Settings::default();
        let doc = match docs.first() {
            Some(doc) => doc,
            None => return Ok(settings),
        };
        match doc {
            Yaml::Hash(_) => {}
            Yaml::Null => return Ok(settings),
            _ => {
                return Err(ConfigError::Validation(String::from(
                    "settings should be a mapping",
                )))
            }
        }
        if let Some(fs_cli) = scalar(&doc["fs_cli"], "fs_cli")? {
            settings.fs_cli = fs_cli;
        }
        settings.host = scalar(&doc["host"], "host")?;
        settings.port = scalar(&doc["port"], "port")?;
        settings.password = scalar(&doc["password"], "password")?;
        match &doc["timeout"] {
            Yaml::BadValue | Yaml::Null => {}
            Yaml::Integer(secs) if *secs > 0 => settings.timeout_secs = *secs as u64,
            _ => {
                return Err(ConfigError::Validation(String::from(
                    "timeout must be a positive integer",
                )))
            }
        }
        settings.validate()?;
        Ok(settings)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let path_str = path.display().to_string();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path_str.clone(),
            source,
        })?;
        Self::from_yaml_str(&text, &path_str)
    }

    /// Settings file (if any) with command line overrides on top.
    pub fn from_options(opts: &CmdOptions) -> Result<Self, ConfigError> {
        let mut settings = match &opts.settings {
            Some(path) => {
                debug!("Loading settings from {}", path);
                Self::load(path)?
            }
            None => Settings::default(),
        };
        if let Some(fs_cli) = &opts.fs_cli {
            settings.fs_cli = fs_cli.clone();
        }
        if opts.host.is_some() {
            settings.host = opts.host.clone();
        }
        if opts.port.is_some() {
            settings.port = opts.port.clone();
        }
        if opts.password.is_some() {
            settings.password = opts.password.clone();
        }
        if let Some(timeout) = opts.timeout {
            settings.timeout_secs = timeout;
        }
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fs_cli.trim().is_empty() {
            return Err(ConfigError::Validation(String::from(
                "fs_cli must not be empty",
            )));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::Validation(String::from(
                "timeout must be greater than 0",
            )));
        }
        if let Some(port) = &self.port {
            if port.parse::<u16>().is_err() {
                return Err(ConfigError::Validation(format!(
                    "port must be a number between 0 and 65535, got '{}'",
                    port
                )));
            }
        }
        Ok(())
    }
}

fn scalar(value: &Yaml, key: &str) -> Result<Option<String>, ConfigError> {
    match value {
        Yaml::BadValue | Yaml::Null => Ok(None),
        Yaml::String(s) if s.trim().is_empty() => Ok(None),
        Yaml::String(s) => Ok(Some(s.clone())),
        Yaml::Integer(i) => Ok(Some(i.to_string())),
        _ => Err(ConfigError::Validation(format!(
            "{} should be a string",
            key
        ))),
    }
}
