use thiserror::Error;

/// Describe the result of operations in logwire.
pub type LogResult<T> = Result<T, LogError>;

#[derive(Error, Debug)]
#[non_exhaustive]
/// Errors returned by handlers, processors and the constructors of both.
pub enum LogError {
    /// Writing to a stream, file or socket failed.
    #[error("failed to write to {target}: {source}")]
    Io {
        /// The stream, file or address being written.
        target: String,
        /// The underlying failure.
        #[source]
        source: std::io::Error,
    },

    /// A constructor rejected one of its arguments.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A client (Redis, message publisher, mailer) reported a failure.
    #[error("{client} failed: {message}")]
    ClientFailed {
        /// Which client failed.
        client: &'static str,
        /// What the client reported.
        message: String,
    },

    /// An internal lock was poisoned by a panicking thread.
    #[error("{0} lock poisoned")]
    LockPoisoned(&'static str),

    /// Other errors propagated from custom handlers.
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync + 'static>),
}

impl LogError {
    pub(crate) fn io(target: impl Into<String>, source: std::io::Error) -> Self {
        LogError::Io {
            target: target.into(),
            source,
        }
    }
}

impl From<String> for LogError {
    fn from(err_msg: String) -> Self {
        LogError::Other(Box::new(Custom(err_msg)))
    }
}

impl From<&'static str> for LogError {
    fn from(err_msg: &'static str) -> Self {
        LogError::Other(Box::new(Custom(err_msg.into())))
    }
}

/// Wrap type for string
#[derive(Error, Debug)]
#[error("{0}")]
struct Custom(String);
