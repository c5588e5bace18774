//! # ASN Blocklist Generator
//!
//! Looks up the `route:` objects an Autonomous System originates in the RADb
//! routing registry and turns them into an eMule / PeerGuardian "dat"
//! block-list:
//!
//! ```text
//! 1.1.1.0 - 1.1.1.255 , 000 , AS13335
//! ```
//!
//! Generated lists are cached on disk, one file per ASN, and served over HTTP
//! at `GET /generate?asn=AS13335`.
//!
//! ## Library usage
//!
//! ```no_run
//! use asn_blocklist::generate;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let blocklist = generate("AS13335").await?;
//!     print!("{}", blocklist.body);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod core;
pub mod services;
pub mod storage;
pub mod web;

pub use crate::config::PipelineConfig;
pub use crate::core::{Blocklist, BlocklistError, Pipeline, Provenance};
pub use crate::web::BlocklistServer;

/// Generate a blocklist with the default registry and `./cache` directory.
///
/// `asn` may be given with or without the `AS` prefix.
pub async fn generate(asn: &str) -> Result<Blocklist, BlocklistError> {
    let pipeline = Pipeline::from_config(&PipelineConfig::default());
    pipeline.generate(&crate::core::normalize(asn)).await
}
