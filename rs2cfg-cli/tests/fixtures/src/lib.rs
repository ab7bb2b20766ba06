pub mod server;
pub mod storage;

use crate::server::Server;
use crate::storage::Storage;

/// Application configuration.
pub struct AppConfig {
    /// HTTP server.
    pub server: Server,
    /// Persistence backend.
    pub storage: Storage,
    /// Enable verbose diagnostics.
    pub debug: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: Server::default(),
            storage: Storage::default(),
            debug: false,
        }
    }
}
