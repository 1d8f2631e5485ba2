//! Error taxonomy shared by every operation in the driver.
//!
//! Two tiers:
//! - local validation errors (`Malformed`, `InvalidOptions`, `InvalidKeys`,
//!   `InvalidValue`) are raised before the Redis client is ever called;
//! - delegated errors (`FailedToConnect`, `BadConnection`, `Failed`) come
//!   back from an attempted client operation.

use std::fmt;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Terminal failure outcomes of driver operations.
///
/// The variant names are normalized across the driver family so that a
/// caller can treat any compliant driver interchangeably.
#[derive(Debug)]
pub enum Error {
    /// The connection string did not parse; no connection was attempted.
    Malformed(String),

    /// The connection string parsed, but the client never reached a ready
    /// state (wrong credentials, no server, refused, firewalled, ...).
    FailedToConnect(String),

    /// An options bag was not a mapping, or carried unknown/mistyped fields.
    InvalidOptions(String),

    /// The keys argument to a destroy was not a collection of strings.
    InvalidKeys(String),

    /// The value could not be serialized for storage; the store was never
    /// contacted.
    InvalidValue(String),

    /// The operation was attempted but the connection itself was unusable
    /// (refused, dropped mid-flight, I/O fault, timeout).
    BadConnection(String),

    /// The store rejected the operation for any other reason.
    Failed(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Malformed(msg) => write!(f, "malformed connection string: {}", msg),
            Error::FailedToConnect(msg) => write!(f, "failed to connect: {}", msg),
            Error::InvalidOptions(msg) => write!(f, "invalid options: {}", msg),
            Error::InvalidKeys(msg) => write!(f, "invalid keys: {}", msg),
            Error::InvalidValue(msg) => write!(f, "invalid value: {}", msg),
            Error::BadConnection(msg) => write!(f, "bad connection: {}", msg),
            Error::Failed(msg) => write!(f, "operation failed: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

impl Error {
    /// True for the local, pre-flight validation tier.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            Error::Malformed(_)
                | Error::InvalidOptions(_)
                | Error::InvalidKeys(_)
                | Error::InvalidValue(_)
        )
    }

    /// Map a client error raised by an attempted command.
    ///
    /// Connection-level faults become `BadConnection`; anything else the
    /// store reported becomes `Failed`. Connection refusal gets its own
    /// warning, matching how the original driver singled out ECONNREFUSED.
    pub(crate) fn from_command(op: &str, err: redis::RedisError) -> Error {
        if err.is_connection_refusal() {
            warn!(
                "Redis {} failed: connection to the server was refused (ECONNREFUSED)",
                op
            );
            Error::BadConnection(format!("{}: {}", op, err))
        } else if err.is_connection_dropped() || err.is_io_error() || err.is_timeout() {
            warn!("Redis {} failed on a broken connection: {}", op, err);
            Error::BadConnection(format!("{}: {}", op, err))
        } else {
            Error::Failed(format!("{}: {}", op, err))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_detail() {
        let err = Error::Malformed("not a url".to_string());
        assert_eq!(
            err.to_string(),
            "malformed connection string: not a url"
        );

        let err = Error::FailedToConnect("refused".to_string());
        assert!(err.to_string().contains("failed to connect"));
    }

    #[test]
    fn test_local_tier_classification() {
        assert!(Error::Malformed(String::new()).is_local());
        assert!(Error::InvalidOptions(String::new()).is_local());
        assert!(Error::InvalidKeys(String::new()).is_local());
        assert!(Error::InvalidValue(String::new()).is_local());

        assert!(!Error::FailedToConnect(String::new()).is_local());
        assert!(!Error::BadConnection(String::new()).is_local());
        assert!(!Error::Failed(String::new()).is_local());
    }
}
