//! Loading and raw access for API specification documents.
//!
//! The document parser proper is an external collaborator; this module is
//! the thin plumbing around it: reading a file or URL, accepting either
//! JSON or YAML, and exposing the raw value plus a few document-level
//! accessors. Everything structural happens in [`crate::normalize`].

// Internal imports (std, crate)
use std::path::Path;

use crate::error::Result;
use crate::Error;

// External imports (alphabetized)
use serde_json::Value as JsonValue;
use tokio::fs;

/// A loaded, unvalidated API specification document.
#[derive(Debug, serde::Serialize)]
#[serde(transparent)]
pub struct SpecDocument {
    /// The raw JSON value of the specification
    pub json: JsonValue,
}

impl SpecDocument {
    /// Load a specification from a file path or an HTTP(S) URL.
    pub async fn from_file_or_url<P: AsRef<str>>(location: P) -> Result<Self> {
        let location = location.as_ref();
        if location.starts_with("http://") || location.starts_with("https://") {
            return Self::from_url(location).await;
        }
        Self::from_file(location).await
    }

    /// Load a specification from a file (JSON or YAML).
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).await?;
        Self::parse_content(&content).map_err(|e| {
            Error::config(format!(
                "Failed to parse specification at {}: {}",
                path.display(),
                e
            ))
        })
    }

    /// Load a specification from a URL (JSON or YAML).
    pub async fn from_url(url: &str) -> Result<Self> {
        let response = reqwest::get(url).await.map_err(|e| {
            Error::config(format!("Failed to fetch specification from {}: {}", url, e))
        })?;

        if !response.status().is_success() {
            return Err(Error::config(format!(
                "Failed to fetch specification from {}: HTTP {}",
                url,
                response.status()
            )));
        }

        let content = response.text().await.map_err(|e| {
            Error::config(format!("Failed to read response from {}: {}", url, e))
        })?;

        Self::parse_content(&content)
            .map_err(|e| Error::config(format!("Failed to parse specification from {}: {}", url, e)))
    }

    /// Parse content as either JSON or YAML.
    pub fn parse_content(content: &str) -> std::result::Result<Self, String> {
        if let Ok(json) = serde_json::from_str(content) {
            return Ok(Self { json });
        }
        if let Ok(json) = serde_yaml::from_str(content) {
            return Ok(Self { json });
        }
        Err("content is neither valid JSON nor YAML".to_string())
    }

    /// Get a reference to the raw JSON value
    pub fn as_json(&self) -> &JsonValue {
        &self.json
    }

    /// Title of the API, if declared
    pub fn title(&self) -> Option<&str> {
        self.json.get("info")?.get("title")?.as_str()
    }

    /// Version of the API, if declared
    pub fn version(&self) -> Option<&str> {
        self.json.get("info")?.get("version")?.as_str()
    }

    /// Base path of the API.
    ///
    /// Prefers the OpenAPI 3.x `servers` array; falls back to the Swagger
    /// 2.0 `host` + `basePath` + `schemes` form.
    pub fn base_path(&self) -> Option<String> {
        if let Some(servers) = self.json.get("servers").and_then(|s| s.as_array()) {
            if let Some(url) = servers
                .first()
                .and_then(|server| server.get("url"))
                .and_then(|u| u.as_str())
            {
                return Some(url.to_string());
            }
        }

        let host = self.json.get("host").and_then(|h| h.as_str())?;
        let base_path = self
            .json
            .get("basePath")
            .and_then(|bp| bp.as_str())
            .unwrap_or("");
        let scheme = match self.json.get("schemes").and_then(|s| s.as_array()) {
            Some(schemes) if schemes.iter().any(|s| s.as_str() == Some("https")) => "https",
            Some(schemes) => schemes.first().and_then(|s| s.as_str()).unwrap_or("https"),
            None => "https",
        };
        Some(format!("{}://{}{}", scheme, host, base_path))
    }
}
