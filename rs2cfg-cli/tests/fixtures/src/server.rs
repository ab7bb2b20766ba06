pub const DEFAULT_PORT: u16 = 8080;

/// Transport protocol.
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    /// Plain text.
    Http,
    /// TLS terminated.
    Https,
}

/// HTTP server settings.
pub struct Server {
    /// Bind address.
    pub host: String,
    /// Listen port.
    pub port: u16,
    /// Accepted protocols.
    pub protocols: Vec<Protocol>,
    /// Protocol used in redirects.
    pub redirect: Protocol,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            protocols: vec![Protocol::Http, Protocol::Https],
            redirect: Protocol::Https,
        }
    }
}
