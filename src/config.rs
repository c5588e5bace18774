use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

// Routing registry queried for route objects
pub const RADB_WHOIS_SERVER: &str = "whois.radb.net";
pub const RADB_WHOIS_PORT: u16 = 43;
pub const TIMEOUT_SECONDS: u64 = 10;

// Upper bound for a single registry response (32 MiB)
pub const MAX_RESPONSE_BYTES: usize = 32 * 1024 * 1024;

// On-disk blocklist cache
pub const CACHE_DIR: &str = "cache";
pub const CACHE_EXTENSION: &str = "dat";

// Middle field of every dat line
pub const SEVERITY: &str = "000";

// Public ASN ranges (16-bit private range 64512-65535 excluded)
pub const PUBLIC_ASN_16BIT_MAX: u32 = 64511;
pub const PUBLIC_ASN_32BIT_MIN: u32 = 65536;
pub const PUBLIC_ASN_32BIT_MAX: u32 = 4_199_999_999;

/// Registry and cache settings used by the pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub whois_server: String,
    pub whois_port: u16,
    pub timeout: Duration,
    pub max_response_bytes: usize,
    pub cache_dir: PathBuf,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            whois_server: RADB_WHOIS_SERVER.to_string(),
            whois_port: RADB_WHOIS_PORT,
            timeout: Duration::from_secs(TIMEOUT_SECONDS),
            max_response_bytes: MAX_RESPONSE_BYTES,
            cache_dir: PathBuf::from(CACHE_DIR),
        }
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Serve P2P dat blocklists for the prefixes an ASN announces")]
pub struct Cli {
    /// Listen address
    #[arg(short = 'H', long, default_value = "0.0.0.0")]
    pub host: String,

    /// Listen port
    #[arg(short, long, default_value_t = 8080)]
    pub port: u16,

    /// Directory holding cached blocklists
    #[arg(long, default_value = CACHE_DIR)]
    pub cache_dir: String,

    /// WHOIS server queried for route objects
    #[arg(long, default_value = RADB_WHOIS_SERVER)]
    pub whois_server: String,

    /// WHOIS server port
    #[arg(long, default_value_t = RADB_WHOIS_PORT)]
    pub whois_port: u16,

    /// Registry query timeout in seconds
    #[arg(long, default_value_t = TIMEOUT_SECONDS)]
    pub timeout: u64,

    /// Enable debug output
    #[arg(short, long)]
    pub debug: bool,

    /// Enable trace output (extremely verbose)
    #[arg(short, long)]
    pub trace: bool,

    /// Emit journald-formatted log records
    #[arg(long)]
    pub journald: bool,
}

impl Cli {
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            whois_server: self.whois_server.clone(),
            whois_port: self.whois_port,
            timeout: Duration::from_secs(self.timeout),
            max_response_bytes: MAX_RESPONSE_BYTES,
            cache_dir: PathBuf::from(&self.cache_dir),
        }
    }
}
