use std::collections::BTreeMap;
use std::path::PathBuf;

/// Log verbosity.
#[derive(Default)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    /// Everything.
    Debug,
    #[default]
    Info,
    Warn,
}

#[derive(Default)]
pub struct Tls {
    pub cert: PathBuf,
    pub key: PathBuf,
}

pub struct Upstream {
    pub host: String,
    pub port: u16,
    /// Client certificate.
    pub tls: Option<Tls>,
}

#[derive(Default)]
pub struct Listen {
    pub addr: String,
    pub port: u16,
}

/// Service configuration.
#[serde(rename_all = "kebab-case")]
pub struct Service {
    /// Service name.
    pub name: String,
    /// Log verbosity.
    pub log_level: Level,
    /// Upstream servers.
    pub upstreams: Vec<Upstream>,
    /// Per-route weights.
    pub route_weights: BTreeMap<String, u32>,
    pub listen: Listen,
    #[serde(skip)]
    pub runtime_handle: u64,
}

impl Default for Service {
    fn default() -> Self {
        Self {
            name: "gateway".to_string(),
            log_level: Level::default(),
            upstreams: vec![
                Upstream {
                    host: "10.0.0.1".into(),
                    port: 8080,
                    tls: None,
                },
                Upstream {
                    host: "10.0.0.2".into(),
                    port: 8081,
                    tls: Some(Tls {
                        cert: "/etc/cert.pem".into(),
                        key: PathBuf::from("/etc/key.pem"),
                    }),
                },
            ],
            route_weights: BTreeMap::from([("/api".to_string(), 3), ("/static".to_string(), 1)]),
            listen: Listen::default(),
            runtime_handle: 0,
        }
    }
}
