//! Device storage configuration.

use serde::{Deserialize, Serialize};

const fn default_use_keyring() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Directory holding the plain key-value file.
    #[serde(default)]
    pub data_dir: Option<String>,

    /// OS keychain service name for tokens.
    #[serde(default)]
    pub keyring_service: Option<String>,

    /// Keep tokens in the OS keychain. When false they go to the plain file.
    #[serde(default = "default_use_keyring")]
    pub use_keyring: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            keyring_service: None,
            use_keyring: default_use_keyring(),
        }
    }
}
