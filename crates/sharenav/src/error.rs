//! CLI error types with miette diagnostics.
//!
//! Maps core, session and config failures into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use sharenav_config::ConfigError;
use sharenav_core::{CoreError, CredentialError, SessionError};

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const ABORTED: i32 = 130;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach {url}")]
    #[diagnostic(
        code(sharenav::connection_failed),
        help(
            "Check the directory and relay URLs in your config.\n\
             Use --insecure (-k) for self-signed certificates."
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("The {what} could not be loaded")]
    #[diagnostic(
        code(sharenav::load_failed),
        help("Run with -v for details, then try again.")
    )]
    LoadFailed { what: &'static str },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {reason}")]
    #[diagnostic(
        code(sharenav::auth_failed),
        help(
            "Check the token stored for your identity, or set SHARENAV_TOKEN.\n\
             Run: sharenav config show"
        )
    )]
    AuthFailed { reason: String },

    #[error("Sign-in cancelled")]
    #[diagnostic(code(sharenav::cancelled))]
    Cancelled,

    #[error("Interrupted")]
    #[diagnostic(code(sharenav::interrupted))]
    Interrupted,

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(sharenav::not_found),
        help("Run: sharenav {list_command} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: &'static str,
        identifier: String,
        list_command: String,
    },

    // ── API ──────────────────────────────────────────────────────────
    #[error("API error: {message}")]
    #[diagnostic(code(sharenav::api_error))]
    ApiError { message: String },

    // ── Validation / configuration ───────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(sharenav::validation))]
    Validation { field: String, reason: String },

    #[error("Config file already exists at {path}")]
    #[diagnostic(
        code(sharenav::config_exists),
        help("Use --force to overwrite it.")
    )]
    ConfigExists { path: String },

    #[error(transparent)]
    #[diagnostic(code(sharenav::config))]
    Config(Box<ConfigError>),

    #[error("Session stopped unexpectedly: {0}")]
    #[diagnostic(code(sharenav::session))]
    Session(String),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Could not render JSON: {0}")]
    #[diagnostic(code(sharenav::json))]
    Json(#[from] serde_json::Error),

    #[error("Could not render TOML: {0}")]
    #[diagnostic(code(sharenav::toml))]
    Toml(#[from] toml::ser::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::LoadFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. } | Self::ConfigExists { .. } | Self::Config(_) => {
                exit_code::USAGE
            }
            Self::Cancelled | Self::Interrupted => exit_code::ABORTED,
            _ => exit_code::GENERAL,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            other => Self::Config(Box::new(other)),
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => Self::ConnectionFailed { url, reason },
            CoreError::AuthenticationFailed { message } => Self::AuthFailed { reason: message },
            CoreError::ServerNotFound { identifier } => Self::NotFound {
                resource_type: "server",
                identifier,
                list_command: "browse".into(),
            },
            CoreError::ShareNotFound { identifier } => Self::NotFound {
                resource_type: "share",
                identifier,
                list_command: "browse --server <SERVER>".into(),
            },
            CoreError::InvalidState { operation, phase } => Self::Session(format!(
                "cannot {operation} while {phase}"
            )),
            CoreError::Api {
                message,
                status: Some(status),
            } => Self::ApiError {
                message: format!("{message} (HTTP {status})"),
            },
            CoreError::Api {
                message,
                status: None,
            } => Self::ApiError { message },
            CoreError::Config { message } => Self::Validation {
                field: "config".into(),
                reason: message,
            },
        }
    }
}

impl From<SessionError> for CliError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Credential(CredentialError::Cancelled) => Self::Cancelled,
            SessionError::Credential(other) => Self::AuthFailed {
                reason: other.to_string(),
            },
            SessionError::ChannelClosed => Self::Session("event channel closed".into()),
            SessionError::Core(core) => core.into(),
        }
    }
}
