//! Error types shared by the scraping stages and the API layer

use axum::http::StatusCode;

/// Result type for link resolution operations
pub type Result<T> = std::result::Result<T, LinkError>;

/// Error types for link resolution operations
#[derive(thiserror::Error, Debug)]
pub enum LinkError {
    #[error("{0} parameter is required")]
    MissingParameter(&'static str),

    #[error("Invalid parameters: {0}")]
    InvalidParameter(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP error {status}: {url}")]
    UpstreamStatus { status: u16, url: String },

    #[error("{0}")]
    NotFound(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Invalid selector: {0}")]
    Selector(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl LinkError {
    pub fn not_found(message: impl Into<String>) -> Self {
        LinkError::NotFound(message.into())
    }

    /// HTTP status the API layer reports for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            LinkError::MissingParameter(_) | LinkError::InvalidParameter(_) => StatusCode::BAD_REQUEST,
            LinkError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// True when the upstream page could not be retrieved at all
    pub fn is_fetch_error(&self) -> bool {
        matches!(self, LinkError::Http(_) | LinkError::UpstreamStatus { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(LinkError::MissingParameter("Query").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            LinkError::InvalidParameter("duplicate field `query`".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(LinkError::not_found("nothing").status_code(), StatusCode::NOT_FOUND);

        let upstream = LinkError::UpstreamStatus { status: 503, url: "https://example.com".to_string() };
        assert_eq!(upstream.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(upstream.is_fetch_error());
        assert!(!LinkError::Selector("tr[".to_string()).is_fetch_error());
    }

    #[test]
    fn test_messages() {
        assert_eq!(LinkError::MissingParameter("URL").to_string(), "URL parameter is required");
        assert_eq!(
            LinkError::UpstreamStatus { status: 404, url: "https://a.b/c".to_string() }.to_string(),
            "HTTP error 404: https://a.b/c"
        );
    }
}
