//! Error taxonomy for the course API boundary.

use reqwest::StatusCode;
use thiserror::Error;

/// Failure talking to the course backend.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ApiError {
    /// The course or chapter no longer exists (HTTP 404).
    #[error("resource not found")]
    NotFound,

    /// The backend rejected the request with a non-success status.
    #[error("request failed with status {0}")]
    Status(StatusCode),

    /// Transport-level failure: connect error, timeout, aborted body.
    #[error("network failure talking to the course API")]
    Network(#[source] reqwest::Error),

    /// The payload did not match the contract, including unknown enum tags.
    #[error("malformed payload from the course API: {0}")]
    Decode(String),
}

impl ApiError {
    /// True for failures that could plausibly succeed on a later attempt.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            ApiError::Network(_) => true,
            ApiError::Status(status) => status.is_server_error(),
            ApiError::NotFound | ApiError::Decode(_) => false,
        }
    }

    /// Map a non-success HTTP status to the taxonomy.
    pub(crate) fn from_status(status: StatusCode) -> Self {
        if status == StatusCode::NOT_FOUND {
            ApiError::NotFound
        } else {
            ApiError::Status(status)
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Network(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_from_404() {
        assert!(matches!(
            ApiError::from_status(StatusCode::NOT_FOUND),
            ApiError::NotFound
        ));
    }

    #[test]
    fn other_statuses_keep_their_code() {
        let err = ApiError::from_status(StatusCode::TOO_MANY_REQUESTS);
        assert!(matches!(err, ApiError::Status(s) if s == StatusCode::TOO_MANY_REQUESTS));
    }

    #[test]
    fn server_errors_are_transient() {
        assert!(ApiError::from_status(StatusCode::BAD_GATEWAY).is_transient());
        assert!(!ApiError::from_status(StatusCode::NOT_FOUND).is_transient());
        assert!(!ApiError::Decode("bad".into()).is_transient());
    }
}
