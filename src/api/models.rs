//! API data models

use serde::{Deserialize, Serialize};

use crate::links::SearchResult;
use crate::pipeline::ResolvedMovie;

/// `?query=` parameter
#[derive(Debug, Default, Deserialize)]
pub struct QueryParams {
    pub query: Option<String>,
}

/// `?url=` parameter
#[derive(Debug, Default, Deserialize)]
pub struct UrlParams {
    pub url: Option<String>,
}

/// Response of `/api/search`
#[derive(Debug, Serialize, Deserialize)]
pub struct SearchResponse {
    pub query: String,
    pub results: Vec<SearchResult>,
}

/// Response of `/api/src`
#[derive(Debug, Serialize, Deserialize)]
pub struct CombinedResponse {
    pub ok: bool,
    pub developer: String,
    pub results: Vec<ResolvedMovie>,
}

/// Error body returned by every endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// A present, non-empty parameter value
pub(crate) fn required<'a>(value: &'a Option<String>, name: &'static str) -> crate::Result<&'a str> {
    match value.as_deref() {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(crate::LinkError::MissingParameter(name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_parameter() {
        assert_eq!(required(&Some("inception".to_string()), "Query").unwrap(), "inception");
        assert!(required(&Some(String::new()), "Query").is_err());
        assert!(required(&None, "URL").is_err());
    }
}
