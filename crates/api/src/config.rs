//! Server configuration, filled in by the CLI from flags and environment.

/// Everything `run` needs to bring the HTTP server up.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on, e.g. `0.0.0.0:8080`.
    pub bind: String,
    pub database_url: String,
    pub max_connections: u32,
    /// Apply pending migrations before accepting traffic.
    pub migrate: bool,
}
