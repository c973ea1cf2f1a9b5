use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An outbound HTTP-like call issued through one of the page's network
/// primitives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkRequest {
    pub url: String,
    pub method: String,
}

impl NetworkRequest {
    pub fn new(method: &str, url: &str) -> Self {
        Self {
            url: url.to_string(),
            method: method.to_uppercase(),
        }
    }

    pub fn get(url: &str) -> Self {
        Self::new("GET", url)
    }

    pub fn post(url: &str) -> Self {
        Self::new("POST", url)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkResponse {
    pub status: u16,
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("Network failure: {0}")]
pub struct NetworkFailure(pub String);

/// Response metadata captured by the network monitor. A request that never
/// settled successfully is recorded with status 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapturedResponse {
    pub url: String,
    pub method: String,
    pub status: u16,
}
