use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unexpected status {status} from {url}")]
    Status { status: StatusCode, url: String },

    #[error("Could not decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Request timed out after {0} ms")]
    Timeout(u128),

    #[error("Gave up waiting after {0} ms")]
    Watchdog(u128),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// True for the failures the pipeline degrades on instead of reporting.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            AppError::Transport(_)
                | AppError::Status { .. }
                | AppError::Decode { .. }
                | AppError::Timeout(_)
                | AppError::Watchdog(_)
        )
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_is_remote() {
        let err = AppError::Status {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            url: "http://localhost/api/items".to_string(),
        };
        assert!(err.is_remote());
        assert_eq!(
            err.to_string(),
            "Unexpected status 500 Internal Server Error from http://localhost/api/items"
        );
    }

    #[test]
    fn test_config_error_is_not_remote() {
        assert!(!AppError::Config("bad url".to_string()).is_remote());
        assert!(AppError::Watchdog(3000).is_remote());
    }
}
