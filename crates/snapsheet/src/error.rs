#![forbid(unsafe_code)]

//! Unified error type for snapsheet hosts.
//!
//! The controller itself never fails at runtime: malformed input sequences
//! are reported through outcome enums, not errors. Everything here comes
//! from setup: building a viewport, loading or validating configuration,
//! constructing a panel, or replaying a scenario.

use std::fmt;

use snapsheet_core::ViewportError;
#[cfg(feature = "harness")]
use snapsheet_harness::ScenarioError;
use snapsheet_panel::{ConfigError, PanelError};

/// Top-level error type for snapsheet hosts.
#[derive(Debug)]
pub enum Error {
    /// Viewport had a non-finite or non-positive dimension.
    Viewport(ViewportError),
    /// Configuration could not be loaded or failed validation.
    Config(ConfigError),
    /// Panel construction failed.
    Panel(PanelError),
    /// Scenario could not be parsed or replayed.
    #[cfg(feature = "harness")]
    Scenario(ScenarioError),
    /// Raw I/O error (convenience variant for `?` on io::Result).
    Io(std::io::Error),
}

/// Standard result type for snapsheet APIs.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Error type label for logs.
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::Viewport(_) => "viewport",
            Self::Config(_) => "config",
            Self::Panel(_) => "panel",
            #[cfg(feature = "harness")]
            Self::Scenario(_) => "scenario",
            Self::Io(_) => "io",
        }
    }

    /// Validation messages, if this error came from config validation.
    pub fn validation_errors(&self) -> Option<&[String]> {
        match self {
            Self::Config(ConfigError::Validation(errors))
            | Self::Panel(PanelError::Config(ConfigError::Validation(errors))) => {
                Some(errors.as_slice())
            }
            #[cfg(feature = "harness")]
            Self::Scenario(ScenarioError::Panel(PanelError::Config(ConfigError::Validation(
                errors,
            )))) => Some(errors.as_slice()),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Viewport(err) => write!(f, "{err}"),
            Self::Config(err) => write!(f, "{err}"),
            Self::Panel(err) => write!(f, "{err}"),
            #[cfg(feature = "harness")]
            Self::Scenario(err) => write!(f, "{err}"),
            Self::Io(err) => write!(f, "I/O: {err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Viewport(err) => Some(err),
            Self::Config(err) => Some(err),
            Self::Panel(err) => Some(err),
            #[cfg(feature = "harness")]
            Self::Scenario(err) => Some(err),
            Self::Io(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<ViewportError> for Error {
    fn from(err: ViewportError) -> Self {
        Self::Viewport(err)
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

impl From<PanelError> for Error {
    fn from(err: PanelError) -> Self {
        Self::Panel(err)
    }
}

#[cfg(feature = "harness")]
impl From<ScenarioError> for Error {
    fn from(err: ScenarioError) -> Self {
        Self::Scenario(err)
    }
}
