//! CLI-specific error types and exit code mapping

use licensehub_core::error::LicenseHubError;
use licensehub_scanner::ScannerError;

/// CLI-specific error type.
///
/// Each variant carries enough context for a user-friendly message.
/// The `exit_code()` method maps errors to standard Unix exit codes.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading or validation failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// A subcommand-specific operation failed.
    #[error("{0}")]
    Command(String),

    /// The scan finished but at least one dependency is blocked by policy.
    #[error("policy violation: {0}")]
    PolicyBlocked(String),

    /// JSON serialisation failed during output rendering.
    #[error("json output error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// IO error (file read, stdout write, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped domain error from licensehub-core.
    #[error("{0}")]
    Core(#[from] LicenseHubError),

    /// Scanner domain error.
    #[error("scan error: {0}")]
    Scan(String),
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                              |
    /// |------|--------------------------------------|
    /// | 0    | Success                              |
    /// | 1    | General / command error              |
    /// | 2    | Configuration error                  |
    /// | 4    | Dependency blocked by policy         |
    /// | 10   | IO error                             |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Core(LicenseHubError::Config(_)) => 2,
            Self::PolicyBlocked(_) => 4,
            Self::Io(_) | Self::Core(LicenseHubError::Io(_)) => 10,
            Self::JsonSerialize(_) | Self::Command(_) | Self::Core(_) | Self::Scan(_) => 1,
        }
    }
}

impl From<ScannerError> for CliError {
    fn from(e: ScannerError) -> Self {
        match e {
            ScannerError::Config { .. } => Self::Config(e.to_string()),
            ScannerError::Io { source, .. } => Self::Io(source),
            other => Self::Scan(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_config_error() {
        let err = CliError::Config("test error".to_owned());
        assert_eq!(err.exit_code(), 2, "config error should return exit code 2");
    }

    #[test]
    fn test_exit_code_core_config_error() {
        use licensehub_core::error::ConfigError;
        let err: CliError = LicenseHubError::Config(ConfigError::FileNotFound {
            path: "licensehub.toml".to_owned(),
        })
        .into();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_exit_code_policy_blocked() {
        let err = CliError::PolicyBlocked("2 blocked dependencies".to_owned());
        assert_eq!(err.exit_code(), 4, "blocked dependencies should return exit code 4");
    }

    #[test]
    fn test_exit_code_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = CliError::Io(io_err);
        assert_eq!(err.exit_code(), 10, "io error should return exit code 10");
    }

    #[test]
    fn test_exit_code_command_and_scan_errors() {
        assert_eq!(CliError::Command("x".to_owned()).exit_code(), 1);
        assert_eq!(CliError::Scan("x".to_owned()).exit_code(), 1);
    }

    #[test]
    fn test_exit_code_json_serialize_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{invalid json")
            .expect_err("should fail parsing");
        let err = CliError::JsonSerialize(json_err);
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_from_scanner_config_error() {
        let err: CliError = ScannerError::Config {
            field: "max_concurrent_repos".to_owned(),
            reason: "must be 1-64".to_owned(),
        }
        .into();
        assert!(matches!(err, CliError::Config(_)));
        assert!(err.to_string().contains("max_concurrent_repos"));
    }

    #[test]
    fn test_from_scanner_io_error_keeps_kind() {
        let err: CliError = ScannerError::Io {
            path: "/repo".to_owned(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        }
        .into();
        match err {
            CliError::Io(e) => assert_eq!(e.kind(), std::io::ErrorKind::PermissionDenied),
            _ => panic!("expected Io error variant"),
        }
    }

    #[test]
    fn test_from_scanner_no_project() {
        let err: CliError = ScannerError::NoProject("empty".to_owned()).into();
        assert!(matches!(err, CliError::Scan(_)));
        assert!(err.to_string().starts_with("scan error:"));
    }

    #[test]
    fn test_error_display_command() {
        let err = CliError::Command("execution failed".to_owned());
        assert_eq!(format!("{}", err), "execution failed");
    }
}
