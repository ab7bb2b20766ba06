use std::collections::HashMap;
use std::path::PathBuf;

/// Storage backend.
#[config(rename_all = "kebab-case")]
pub struct Storage {
    /// Data directory.
    pub data_dir: PathBuf,
    /// Maximum open connections.
    pub max_connections: u32,
    /// Per-table cache sizes in MiB.
    pub cache_sizes: HashMap<String, u32>,
}

impl Default for Storage {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("/var/lib/app"),
            max_connections: 16,
            cache_sizes: HashMap::from([("users".to_string(), 64)]),
        }
    }
}
