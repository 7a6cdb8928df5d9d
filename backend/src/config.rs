use std::{net::SocketAddr, path::PathBuf};

use clap::Parser;

pub const DEFAULT_CATALOG_PATH: &str = "backend/data/sample_catalog.json";
pub const DEFAULT_MAX_LIMIT: usize = 200;

#[derive(Debug, Clone, Parser)]
#[command(
    author,
    version,
    about = "Serve walk route listings and grade-based recommendations"
)]
pub struct ServerConfig {
    /// JSON catalog of parks and walking trails
    #[arg(long, env = "WALK_CATALOG", default_value = DEFAULT_CATALOG_PATH)]
    pub catalog: PathBuf,

    /// Address the HTTP server listens on
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:8000")]
    pub addr: SocketAddr,

    /// Upper bound applied to the `limit` query parameter
    #[arg(long, default_value_t = DEFAULT_MAX_LIMIT)]
    pub max_limit: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_defaults() {
        let config = ServerConfig::parse_from([
            "backend",
            "--catalog",
            "/tmp/courses.json",
            "--addr",
            "127.0.0.1:9000",
            "--max-limit",
            "50",
        ]);
        assert_eq!(config.catalog, PathBuf::from("/tmp/courses.json"));
        assert_eq!(config.addr, "127.0.0.1:9000".parse().unwrap());
        assert_eq!(config.max_limit, 50);
    }
}
