use std::error::Error;

use logwire::LogError;
use thiserror::Error;

/// Describe the result of building objects from configuration.
pub type FactoryResult<T> = Result<T, FactoryError>;

#[derive(Error, Debug)]
#[non_exhaustive]
/// Errors raised while resolving options and building objects.
pub enum FactoryError {
    /// A service, plugin or sub-component could not be located.
    #[error("{message}")]
    NotFound {
        /// Name of the missing service or plugin.
        name: String,
        /// Description naming the missing service.
        message: String,
    },

    /// Options were malformed or the constructor rejected them.
    #[error("{message}")]
    NotCreated {
        /// Which option or constraint failed.
        message: String,
        /// The constructor error, when there is one.
        #[source]
        source: Option<Box<dyn Error + Send + Sync + 'static>>,
    },

    /// A container value is not of the expected type.
    #[error("service {name} is expected to be {expected}, got {actual}")]
    InvalidService {
        /// The service name.
        name: String,
        /// The expected type.
        expected: &'static str,
        /// The type actually stored.
        actual: &'static str,
    },

    /// The YAML configuration could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_yaml::Error),

    /// The configuration file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// The configuration file.
        path: String,
        /// The underlying failure.
        #[source]
        source: std::io::Error,
    },
}

impl FactoryError {
    /// A missing service or plugin.
    pub fn not_found(name: impl Into<String>, message: impl Into<String>) -> Self {
        FactoryError::NotFound {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Malformed options.
    pub fn not_created(message: impl Into<String>) -> Self {
        FactoryError::NotCreated {
            message: message.into(),
            source: None,
        }
    }

    /// A constructor rejecting its resolved arguments.
    pub fn not_created_with(
        message: impl Into<String>,
        source: impl Into<Box<dyn Error + Send + Sync + 'static>>,
    ) -> Self {
        FactoryError::NotCreated {
            message: message.into(),
            source: Some(source.into()),
        }
    }
}

impl From<LogError> for FactoryError {
    fn from(err: LogError) -> Self {
        FactoryError::not_created_with(err.to_string(), err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_errors_become_not_created() {
        let err = FactoryError::from(LogError::InvalidArgument("timeout must be positive".into()));
        match &err {
            FactoryError::NotCreated { message, source } => {
                assert_eq!(message, "invalid argument: timeout must be positive");
                assert!(source.is_some());
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert!(err.source().is_some());
    }
}
