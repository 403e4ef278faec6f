use thiserror::Error;

#[derive(Error, Debug)]
pub enum ControlError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Could not reach daemon at {path} after {attempts} attempts: {message}")]
    ConnectionError {
        path: String,
        attempts: u32,
        message: String,
    },

    #[error("Daemon rejected request: {message}")]
    DaemonError { message: String },

    #[error("Device not found: {device}")]
    DeviceNotFound { device: String },

    #[error("Command '{program}' failed: {message}")]
    CommandFailed { program: String, message: String },

    #[error("Failed to parse {what}: {message}")]
    ParseError { what: String, message: String },

    #[error("Request denied by policy: {target}")]
    PolicyDenied { target: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Connectivity,
    Hardware,
    External,
    Protocol,
    Security,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ControlError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ControlError::ConfigValidationError { .. }
            | ControlError::InvalidConfigValueError { .. }
            | ControlError::MissingConfigError { .. }
            | ControlError::TomlError(_) => ErrorCategory::Configuration,
            ControlError::ConnectionError { .. } => ErrorCategory::Connectivity,
            ControlError::DeviceNotFound { .. } => ErrorCategory::Hardware,
            ControlError::CommandFailed { .. } | ControlError::DaemonError { .. } => {
                ErrorCategory::External
            }
            ControlError::SerializationError(_) | ControlError::ParseError { .. } => {
                ErrorCategory::Protocol
            }
            ControlError::PolicyDenied { .. } => ErrorCategory::Security,
            ControlError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Hardware | ErrorCategory::Connectivity | ErrorCategory::External => {
                ErrorSeverity::Medium
            }
            ErrorCategory::Configuration | ErrorCategory::Protocol | ErrorCategory::Security => {
                ErrorSeverity::High
            }
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            ControlError::ConnectionError { path, .. } => format!(
                "Make sure loki-daemon is running and {} is accessible",
                path
            ),
            ControlError::DaemonError { .. } => {
                "Check the daemon logs for the failing write or command".to_string()
            }
            ControlError::DeviceNotFound { device } => {
                format!("This device does not expose {}; the control is unavailable", device)
            }
            ControlError::CommandFailed { program, .. } => {
                format!("Make sure '{}' is installed and on PATH", program)
            }
            ControlError::PolicyDenied { .. } => {
                "Add the path or program to the daemon allow-list in the config file".to_string()
            }
            ControlError::ConfigValidationError { field, .. }
            | ControlError::InvalidConfigValueError { field, .. }
            | ControlError::MissingConfigError { field } => {
                format!("Fix '{}' in the configuration file", field)
            }
            ControlError::TomlError(_) => "Check the configuration file for TOML syntax errors".to_string(),
            ControlError::SerializationError(_) | ControlError::ParseError { .. } => {
                "The peer sent malformed data; check that client and daemon versions match"
                    .to_string()
            }
            ControlError::IoError(_) => "Check file permissions and available devices".to_string(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Connectivity => format!("Cannot talk to the control daemon: {}", self),
            ErrorCategory::Hardware => format!("Hardware unavailable: {}", self),
            ErrorCategory::External => format!("System command failed: {}", self),
            ErrorCategory::Protocol => format!("Unexpected data: {}", self),
            ErrorCategory::Security => format!("Not permitted: {}", self),
            ErrorCategory::System => format!("System error: {}", self),
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, ControlError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_maps_to_exit_code() {
        let missing = ControlError::DeviceNotFound {
            device: "backlight".to_string(),
        };
        assert_eq!(missing.category(), ErrorCategory::Hardware);
        assert_eq!(missing.severity(), ErrorSeverity::Medium);
        assert_eq!(missing.exit_code(), 2);

        let conn = ControlError::ConnectionError {
            path: "/run/loki-master.sock".to_string(),
            attempts: 3,
            message: "refused".to_string(),
        };
        assert_eq!(conn.category(), ErrorCategory::Connectivity);
        assert_eq!(conn.exit_code(), 2);

        let io = ControlError::IoError(std::io::Error::other("boom"));
        assert_eq!(io.exit_code(), 3);
    }

    #[test]
    fn test_every_error_exits_non_zero() {
        let errors = [
            ControlError::DeviceNotFound {
                device: "aynec hwmon (fan control)".to_string(),
            },
            ControlError::DaemonError {
                message: "denied".to_string(),
            },
            ControlError::PolicyDenied {
                target: "/etc/shadow".to_string(),
            },
            ControlError::MissingConfigError {
                field: "client.socket_path".to_string(),
            },
        ];
        for err in errors {
            assert_ne!(err.exit_code(), 0, "{} exits with 0", err);
        }
    }

    #[test]
    fn test_recovery_suggestion_names_field() {
        let err = ControlError::MissingConfigError {
            field: "daemon.socket_path".to_string(),
        };
        assert!(err.recovery_suggestion().contains("daemon.socket_path"));
        assert!(err.user_friendly_message().starts_with("Configuration problem"));
    }
}
