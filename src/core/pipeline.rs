//! Blocklist generation pipeline
//!
//! validate → cache lookup → (miss) registry query → parse → convert →
//! encode → cache store. Cache read failures end the request; cache write
//! failures are logged and the generated body is still returned.

use std::sync::Arc;

use serde::Serialize;

use crate::config::PipelineConfig;
use crate::core::asn::{self, AsnIdentifier};
use crate::core::dat;
use crate::core::error::BlocklistResult;
use crate::core::range::{self, AddressRange};
use crate::services::routes::parse_prefixes;
use crate::services::whois::{RouteRegistry, WhoisRegistry};
use crate::storage::file_cache::FileCache;
use crate::{log_info, log_warn};

/// Where a blocklist body came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    Cache,
    Registry,
}

impl Provenance {
    pub fn is_cache_hit(self) -> bool {
        self == Provenance::Cache
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blocklist {
    pub asn: AsnIdentifier,
    pub body: String,
    pub provenance: Provenance,
}

pub struct Pipeline {
    registry: Arc<dyn RouteRegistry>,
    cache: FileCache,
}

impl Pipeline {
    pub fn new(registry: Arc<dyn RouteRegistry>, cache: FileCache) -> Self {
        Self { registry, cache }
    }

    /// RADb-backed pipeline with a file cache, both taken from `config`.
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(
            Arc::new(WhoisRegistry::from_config(config)),
            FileCache::new(config.cache_dir.clone()),
        )
    }

    pub fn cache(&self) -> &FileCache {
        &self.cache
    }

    /// Produce the blocklist for a raw ASN string such as `AS13335`.
    pub async fn generate(&self, raw_asn: &str) -> BlocklistResult<Blocklist> {
        let asn = asn::validate(raw_asn)?;
        let key = asn.canonical();

        if let Some(body) = self.cache.get(&key).await? {
            log_info!("Served {} from cache", asn);
            return Ok(Blocklist {
                asn,
                body,
                provenance: Provenance::Cache,
            });
        }

        let raw = self.registry.fetch_raw(asn).await?;
        let prefixes = parse_prefixes(&raw);
        let ranges: Vec<AddressRange> = prefixes.iter().map(|prefix| range::to_range(prefix)).collect();

        let passthrough = ranges
            .iter()
            .filter(|r| matches!(r, AddressRange::Passthrough(_)))
            .count();
        if passthrough > 0 {
            log_warn!("{} of {} prefixes for {} are not IPv4 CIDR, emitted verbatim", passthrough, ranges.len(), asn);
        }

        let body = dat::encode(asn, &ranges);

        if let Err(e) = self.cache.put(&key, &body).await {
            log_warn!("Failed to write to cache: {}", e);
        }

        log_info!("Generated blocklist for {} ({} entries)", asn, ranges.len());
        Ok(Blocklist {
            asn,
            body,
            provenance: Provenance::Registry,
        })
    }
}
