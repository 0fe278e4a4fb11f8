//! REST API endpoint configuration.

use ferry_core::AppKind;
use serde::{Deserialize, Serialize};

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    /// Base URL of the REST API; endpoint paths are appended to it.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Which client profile to run as.
    #[serde(default)]
    pub app: AppKind,

    /// Request timeout override. Unset means the profile default.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            app: AppKind::default(),
            timeout_secs: None,
        }
    }
}
