//! Configuration for a compiler run.
//!
//! The `GeneratorConfig` struct collects everything a run needs beyond the
//! document itself: naming, the injectable array size bound, and an
//! optional base URL override. It can be created programmatically or
//! loaded from a YAML file.

// Internal imports (std, crate)
use std::path::Path;

use crate::utils::to_upper_camel_case;

// External imports (alphabetized)
use serde::{Deserialize, Serialize};
use tokio::fs;
use url::Url;

/// Default bound on fixed-size array declarations. Spec documents asking
/// for more items than this fail compilation with `MaxItemsExceeded`.
pub const DEFAULT_MAX_ARRAY_ITEMS: u64 = 4095;

/// Configuration for specforge client generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Project name; also seeds the generated client name
    pub project_name: String,

    /// Explicit name for the generated client declaration
    #[serde(default)]
    pub client_name: Option<String>,

    /// Largest `maxItems` value representable as a fixed-size array in the
    /// target. Target-dependent, so injectable rather than hard-coded.
    #[serde(default = "default_max_array_items")]
    pub max_array_items: u64,

    /// Base URL override for the generated client (Optional)
    pub base_url: Option<Url>,
}

impl GeneratorConfig {
    /// Create a new config with default values
    pub fn new(project_name: impl Into<String>) -> Self {
        Self {
            project_name: project_name.into(),
            client_name: None,
            max_array_items: default_max_array_items(),
            base_url: None,
        }
    }

    /// Name of the generated client declaration.
    pub fn client_name(&self) -> String {
        match &self.client_name {
            Some(name) => name.clone(),
            None => format!("{}Client", to_upper_camel_case(&self.project_name)),
        }
    }

    /// Load configuration from a YAML file
    pub async fn from_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let content = fs::read_to_string(path).await?;
        let config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a YAML file
    pub async fn save<P: AsRef<Path>>(&self, path: P) -> crate::Result<()> {
        let content = serde_yaml::to_string(self)?;
        fs::write(path, content).await?;
        Ok(())
    }
}

fn default_max_array_items() -> u64 {
    DEFAULT_MAX_ARRAY_ITEMS
}
