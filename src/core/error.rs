//! Error types for the blocklist pipeline

use std::io;
use std::time::Duration;

use thiserror::Error;

/// Failures talking to the routing registry
#[derive(Error, Debug)]
pub enum NetworkError {
    #[error("cannot connect to WHOIS server {address}: {source}")]
    ConnectFailed { address: String, source: io::Error },

    #[error("failed to send query to WHOIS server: {0}")]
    Write(io::Error),

    #[error("failed to read WHOIS server response: {0}")]
    Read(io::Error),

    #[error("WHOIS query to {address} timed out after {timeout:?}")]
    Timeout { address: String, timeout: Duration },

    #[error("WHOIS response exceeded {limit} bytes")]
    ResponseTooLarge { limit: usize },
}

/// Failures reading or writing the blocklist cache
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("failed to read cache entry {path}: {source}")]
    Read { path: String, source: io::Error },

    #[error("failed to write cache entry {path}: {source}")]
    Write { path: String, source: io::Error },

    #[error("invalid cache key: {0:?}")]
    InvalidKey(String),
}

/// Pipeline error type
#[derive(Error, Debug)]
pub enum BlocklistError {
    #[error("Invalid ASN format: {0}")]
    InvalidAsn(String),

    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error(transparent)]
    Cache(#[from] CacheError),
}

/// Result type for pipeline operations
pub type BlocklistResult<T> = Result<T, BlocklistError>;

impl BlocklistError {
    /// Whether the caller sent something wrong (as opposed to a server-side failure)
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidAsn(_))
    }
}
