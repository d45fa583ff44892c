use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read settings file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse settings file {path}: {source}")]
    Parse {
        path: String,
        source: yaml_rust::ScanError,
    },
    #[error("invalid settings: {0}")]
    Validation(String),
}

/// Operational failures. Every variant is reported as UNKNOWN.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("unknown check '{name}', expected one of: {known}")]
    UnknownCheck { name: String, known: String },
    #[error("No profile specified for '{0}'")]
    MissingProfile(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("{source}: {program}")]
    Launch {
        program: String,
        source: std::io::Error,
    },
    #[error("Command failed with code {code}: {stderr}")]
    ExitStatus { code: i32, stderr: String },
    #[error("Command timed out after {timeout:?}")]
    Timeout { timeout: std::time::Duration },
}
