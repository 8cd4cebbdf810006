//! Speedwatch errors

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type used across the crates.
pub type Result<T> = anyhow::Result<T, Error>;

/// Domain level error type.
///
/// None of these are fatal to the ingest loop: the worst outcome of any
/// variant is a single dropped sample.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum Error {
    /// The payload could not be parsed.
    #[error("code: malformed_message, description: {0}")]
    MalformedMessage(String),

    /// A required field is absent or null.
    #[error("code: missing_field, description: missing {0}")]
    MissingField(String),

    /// The road dataset could not be read or parsed.
    #[error("code: invalid_dataset, description: {0}")]
    InvalidDataset(String),

    /// The feed disconnected or reported an error.
    #[error("code: transport_failure, description: {0}")]
    TransportFailure(String),

    /// Anything else.
    #[error("code: server_error, description: {0}")]
    ServerError(String),
}

impl Error {
    /// Returns the error code.
    #[must_use]
    pub const fn code(&self) -> &str {
        match self {
            Self::MalformedMessage(_) => "malformed_message",
            Self::MissingField(_) => "missing_field",
            Self::InvalidDataset(_) => "invalid_dataset",
            Self::TransportFailure(_) => "transport_failure",
            Self::ServerError(_) => "server_error",
        }
    }

    /// Returns the error description.
    #[must_use]
    pub fn description(&self) -> String {
        self.to_string()
    }

    /// Whether the error was caused by a single bad message, as opposed to
    /// the dataset or the transport.
    #[must_use]
    pub const fn is_per_message(&self) -> bool {
        matches!(self, Self::MalformedMessage(_) | Self::MissingField(_))
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        // if type is Error, return it with the newly added context
        if let Some(inner) = err.downcast_ref::<Self>() {
            tracing::debug!("Error: {err}, caused by: {inner}");

            return match inner {
                Self::MalformedMessage(e) => Self::MalformedMessage(format!("{err}: {e}")),
                Self::MissingField(e) => Self::MissingField(format!("{err}: {e}")),
                Self::InvalidDataset(e) => Self::InvalidDataset(format!("{err}: {e}")),
                Self::TransportFailure(e) => Self::TransportFailure(format!("{err}: {e}")),
                Self::ServerError(e) => Self::ServerError(format!("{err}: {e}")),
            };
        }

        let stack = err.chain().map(ToString::to_string).collect::<Vec<_>>().join(" -> ");
        Self::ServerError(stack)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedMessage(err.to_string())
    }
}

#[macro_export]
macro_rules! malformed {
    ($fmt:expr, $($arg:tt)*) => {
        $crate::Error::MalformedMessage(format!($fmt, $($arg)*))
    };
     ($err:expr $(,)?) => {
        $crate::Error::MalformedMessage(format!($err))
    };
}

#[macro_export]
macro_rules! missing_field {
    ($fmt:expr, $($arg:tt)*) => {
        $crate::Error::MissingField(format!($fmt, $($arg)*))
    };
     ($err:expr $(,)?) => {
        $crate::Error::MissingField(format!($err))
    };
}

#[cfg(test)]
mod tests {
    use anyhow::{Context, Result, anyhow};
    use serde_json::Value;
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;
    use tracing_subscriber::{EnvFilter, Registry, fmt};

    use super::Error;

    #[test]
    fn error_display() {
        let err = Error::MissingField("lat".to_string());
        assert_eq!(format!("{err}"), "code: missing_field, description: missing lat");
        assert_eq!(err.code(), "missing_field");
    }

    #[test]
    fn with_context() {
        let _ = Registry::default().with(EnvFilter::new("debug")).with(fmt::layer()).try_init();

        let context_error = || -> Result<(), Error> {
            Err(Error::MalformedMessage("not json".to_string()))
                .context("parsing payload")
                .context("handling message")?;
            Ok(())
        };

        let Err(Error::MalformedMessage(description)) = context_error() else {
            panic!("should keep the malformed message variant");
        };
        assert!(description.starts_with("handling message"));
        assert!(description.ends_with("not json"));
    }

    #[test]
    fn anyhow_context() {
        let result = Err::<(), anyhow::Error>(anyhow!("one-off error")).context("error context");
        let err: Error = result.unwrap_err().into();

        assert_eq!(
            err.to_string(),
            "code: server_error, description: error context -> one-off error"
        );
    }

    #[test]
    fn serde_error() {
        let result: Result<Value, serde_json::Error> = serde_json::from_str(r#"{"VP": {"lat""#);
        let err: Error = result.unwrap_err().into();

        assert_eq!(err.code(), "malformed_message");
        assert!(err.is_per_message());
    }

    #[test]
    fn macros() {
        let err = crate::missing_field!("{}", "long");
        assert_eq!(err, Error::MissingField("long".to_string()));

        let err = crate::malformed!("payload is not an object");
        assert!(err.is_per_message());
        assert!(!Error::TransportFailure("closed".to_string()).is_per_message());
    }
}
