//! Unified error types for smartsearch.
//!
//! Every fault the service can observe is one of these variants. Cache faults
//! are absorbed by the resolver; the rest map onto HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tokio_rusqlite::rusqlite;

/// Body returned when the search provider credentials are absent.
pub const MISCONFIGURED_MESSAGE: &str = "Search provider not configured (API_KEY/CX missing)";

/// Body returned for the query validation fault.
pub const INVALID_QUERY_MESSAGE: &str = "Query parameter is required";

/// Body returned for every other server-side fault.
pub const INTERNAL_MESSAGE: &str = "Internal server error";

/// Unified error types for the smartsearch service.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Query missing or blank after trimming.
    #[error("INVALID_QUERY: {0}")]
    InvalidQuery(String),

    /// Upstream credentials are absent.
    #[error("PROVIDER_MISCONFIGURED: {0}")]
    ProviderMisconfigured(String),

    /// Upstream unreachable, timed out, or answered with an error.
    #[error("PROVIDER_UNAVAILABLE: {0}")]
    ProviderUnavailable(String),

    /// Cache store is disabled or could not be reached.
    #[error("CACHE_UNAVAILABLE: {0}")]
    CacheUnavailable(String),

    /// Database operation failed.
    #[error("CACHE_ERROR: {0}")]
    Database(tokio_rusqlite::Error),

    /// Migration failed to apply.
    #[error("CACHE_ERROR: migration failed: {0}")]
    MigrationFailed(String),

    /// Stored results could not be encoded or decoded.
    #[error("CACHE_ERROR: serialization failed: {0}")]
    Serialization(String),

    /// Anything else.
    #[error("INTERNAL: {0}")]
    Internal(String),
}

impl Error {
    /// Whether this error belongs to the cache layer.
    pub fn is_cache_fault(&self) -> bool {
        matches!(
            self,
            Error::CacheUnavailable(_) | Error::Database(_) | Error::MigrationFailed(_) | Error::Serialization(_)
        )
    }

    /// HTTP status for this fault class.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing message. Internal details never leave the process.
    pub fn public_message(&self) -> &'static str {
        match self {
            Error::InvalidQuery(_) => INVALID_QUERY_MESSAGE,
            Error::ProviderMisconfigured(_) => MISCONFIGURED_MESSAGE,
            _ => INTERNAL_MESSAGE,
        }
    }
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::Database(tokio_rusqlite::Error::Close(c)),
            _ => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Database(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(tokio_rusqlite::Error::Error(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "search endpoint error");
        }

        (status, Json(serde_json::json!({ "error": self.public_message() }))).into_response()
    }
}
