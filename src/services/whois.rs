use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::config::PipelineConfig;
use crate::core::asn::AsnIdentifier;
use crate::core::error::NetworkError;
use crate::{log_debug, log_warn};

/// Source of raw route objects for an ASN.
#[async_trait]
pub trait RouteRegistry: Send + Sync {
    async fn fetch_raw(&self, asn: AsnIdentifier) -> Result<String, NetworkError>;
}

/// Plain TCP whois client for an IRR such as RADb.
#[derive(Debug, Clone)]
pub struct WhoisRegistry {
    server: String,
    port: u16,
    timeout: Duration,
    max_response_bytes: usize,
}

impl WhoisRegistry {
    pub fn new(server: impl Into<String>, port: u16, timeout: Duration, max_response_bytes: usize) -> Self {
        Self {
            server: server.into(),
            port,
            timeout,
            max_response_bytes,
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(
            config.whois_server.clone(),
            config.whois_port,
            config.timeout,
            config.max_response_bytes,
        )
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.server, self.port)
    }
}

/// Inverse origin lookup: every route object whose origin is `asn`.
pub fn origin_query(asn: AsnIdentifier) -> String {
    format!("-i origin {}\r\n", asn)
}

#[async_trait]
impl RouteRegistry for WhoisRegistry {
    async fn fetch_raw(&self, asn: AsnIdentifier) -> Result<String, NetworkError> {
        let address = self.address();
        let query = origin_query(asn);
        log_debug!("Querying {} for routes originated by {}", address, asn);

        match tokio::time::timeout(self.timeout, query_whois(&address, &query, self.max_response_bytes)).await {
            Ok(result) => result,
            Err(_) => Err(NetworkError::Timeout {
                address,
                timeout: self.timeout,
            }),
        }
    }
}

/// Send `query` to `address` and read until the server closes the connection.
///
/// A read error after some bytes have arrived ends the response; the
/// registry's close is the only terminator the protocol has. A read error
/// before any byte is reported.
pub async fn query_whois(address: &str, query: &str, max_response_bytes: usize) -> Result<String, NetworkError> {
    let mut stream = TcpStream::connect(address)
        .await
        .map_err(|source| NetworkError::ConnectFailed {
            address: address.to_string(),
            source,
        })?;

    if let Err(e) = stream.set_nodelay(true) {
        log_warn!("Failed to set TCP_NODELAY: {}", e);
    }

    stream.write_all(query.as_bytes()).await.map_err(NetworkError::Write)?;
    stream.flush().await.map_err(NetworkError::Write)?;

    let mut response = Vec::new();
    let mut buffer = [0u8; 8192];

    loop {
        match stream.read(&mut buffer).await {
            Ok(0) => break,
            Ok(n) => {
                if response.len() + n > max_response_bytes {
                    return Err(NetworkError::ResponseTooLarge {
                        limit: max_response_bytes,
                    });
                }
                response.extend_from_slice(&buffer[..n]);
            }
            Err(e) if response.is_empty() => return Err(NetworkError::Read(e)),
            Err(e) => {
                log_warn!(
                    "Read from {} failed after {} bytes, treating as end of response: {}",
                    address,
                    response.len(),
                    e
                );
                break;
            }
        }
    }

    log_debug!("Received {} bytes from {}", response.len(), address);

    Ok(String::from_utf8_lossy(&response).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::asn::validate;
    use tokio::io::AsyncBufReadExt;
    use tokio::net::TcpListener;

    /// One-shot whois server answering with `reply`, returning the query it received.
    async fn spawn_registry(reply: &'static str) -> (u16, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let handle = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut reader = tokio::io::BufReader::new(stream);
            let mut line = String::new();
            reader.read_line(&mut line).await.unwrap();
            let mut stream = reader.into_inner();
            stream.write_all(reply.as_bytes()).await.unwrap();
            stream.shutdown().await.unwrap();
            line
        });
        (port, handle)
    }

    fn local_registry(port: u16, timeout: Duration) -> WhoisRegistry {
        WhoisRegistry::new("127.0.0.1", port, timeout, 1024 * 1024)
    }

    #[test]
    fn test_origin_query_format() {
        let asn = validate("AS13335").unwrap();
        assert_eq!(origin_query(asn), "-i origin AS13335\r\n");
    }

    #[tokio::test]
    async fn test_fetch_reads_until_close() {
        let reply = "route:          1.1.1.0/24\norigin:         AS13335\n\nroute:          1.0.0.0/24\n";
        let (port, server) = spawn_registry(reply).await;

        let registry = local_registry(port, Duration::from_secs(5));
        let raw = registry.fetch_raw(validate("AS13335").unwrap()).await.unwrap();

        assert_eq!(raw, reply);
        assert_eq!(server.await.unwrap(), "-i origin AS13335\r\n");
    }

    #[tokio::test]
    async fn test_empty_response_is_not_an_error() {
        let (port, _server) = spawn_registry("").await;
        let registry = local_registry(port, Duration::from_secs(5));
        let raw = registry.fetch_raw(validate("AS64496").unwrap()).await.unwrap();
        assert!(raw.is_empty());
    }

    #[tokio::test]
    async fn test_connect_failure() {
        // Bind then drop to get a port with nothing listening
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap().port()
        };
        let registry = local_registry(port, Duration::from_secs(5));
        let err = registry.fetch_raw(validate("AS13335").unwrap()).await.unwrap_err();
        assert!(matches!(err, NetworkError::ConnectFailed { .. }));
    }

    #[tokio::test]
    async fn test_silent_registry_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let _server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(30)).await;
            drop(stream);
        });

        let registry = local_registry(port, Duration::from_millis(200));
        let err = registry.fetch_raw(validate("AS13335").unwrap()).await.unwrap_err();
        assert!(matches!(err, NetworkError::Timeout { timeout, .. } if timeout == Duration::from_millis(200)));
        assert!(err.to_string().ends_with("timed out after 200ms"));
    }

    /// Whois server that reads the query, optionally sends `reply`, then
    /// aborts the connection with a TCP RST instead of a clean close.
    async fn spawn_resetting_registry(reply: Option<&'static str>) -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut reader = tokio::io::BufReader::new(stream);
            let mut line = String::new();
            reader.read_line(&mut line).await.unwrap();
            let mut stream = reader.into_inner();
            if let Some(reply) = reply {
                stream.write_all(reply.as_bytes()).await.unwrap();
                stream.flush().await.unwrap();
                // Let the client consume the data before the reset arrives
                tokio::time::sleep(Duration::from_millis(200)).await;
            }
            // SO_LINGER 0 turns the close into a reset
            #[allow(deprecated)]
            stream.set_linger(Some(Duration::ZERO)).unwrap();
            drop(stream);
        });
        port
    }

    #[tokio::test]
    async fn test_reset_after_data_ends_response() {
        let port = spawn_resetting_registry(Some("route: 10.0.0.0/24\n")).await;
        let registry = local_registry(port, Duration::from_secs(5));
        let raw = registry.fetch_raw(validate("AS65551").unwrap()).await.unwrap();
        assert_eq!(raw, "route: 10.0.0.0/24\n");
    }

    #[tokio::test]
    async fn test_reset_before_data_is_read_error() {
        let port = spawn_resetting_registry(None).await;
        let registry = local_registry(port, Duration::from_secs(5));
        let err = registry.fetch_raw(validate("AS65551").unwrap()).await.unwrap_err();
        assert!(matches!(err, NetworkError::Read(_)), "unexpected error: {:?}", err);
    }

    #[tokio::test]
    async fn test_oversized_response_rejected() {
        let (port, _server) = spawn_registry("route: 10.0.0.0/8\nroute: 11.0.0.0/8\n").await;
        let registry = WhoisRegistry::new("127.0.0.1", port, Duration::from_secs(5), 16);
        let err = registry.fetch_raw(validate("AS13335").unwrap()).await.unwrap_err();
        assert!(matches!(err, NetworkError::ResponseTooLarge { limit: 16 }));
    }
}
