use std::fmt;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CollectorError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Publish error: {0}")]
    Publish(String),

    #[error("{} of {total} organizations failed: {}", failures.len(), OrgFailureList(failures.as_slice()))]
    Partial {
        failures: Vec<OrgFailure>,
        total: usize,
    },
}

/// A failure that stopped collection for one organization.
#[derive(Debug)]
pub struct OrgFailure {
    pub org: String,
    pub error: CollectorError,
}

struct OrgFailureList<'a>(&'a [OrgFailure]);

impl fmt::Display for OrgFailureList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, failure) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", failure.org, failure.error)?;
        }
        Ok(())
    }
}

impl From<reqwest::Error> for CollectorError {
    fn from(err: reqwest::Error) -> Self {
        CollectorError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for CollectorError {
    fn from(err: serde_json::Error) -> Self {
        CollectorError::Parse(err.to_string())
    }
}

impl From<serde_yaml::Error> for CollectorError {
    fn from(err: serde_yaml::Error) -> Self {
        CollectorError::Config(err.to_string())
    }
}

impl From<std::io::Error> for CollectorError {
    fn from(err: std::io::Error) -> Self {
        CollectorError::Publish(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CollectorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_message_lists_each_org() {
        let err = CollectorError::Partial {
            failures: vec![
                OrgFailure {
                    org: "acme".to_string(),
                    error: CollectorError::Transport("connection refused".to_string()),
                },
                OrgFailure {
                    org: "globex".to_string(),
                    error: CollectorError::Parse("expected an array".to_string()),
                },
            ],
            total: 3,
        };

        assert_eq!(
            err.to_string(),
            "2 of 3 organizations failed: acme: Transport error: connection refused; \
             globex: Parse error: expected an array"
        );
    }

    #[test]
    fn test_json_error_is_parse_error() {
        let err: CollectorError = serde_json::from_str::<Vec<String>>("{}").unwrap_err().into();
        assert!(matches!(err, CollectorError::Parse(_)));
    }
}
