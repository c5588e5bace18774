pub mod asn;
pub mod dat;
pub mod error;
pub mod logger;
pub mod pipeline;
pub mod range;
pub mod stats;

pub use asn::{AsnIdentifier, normalize, validate};
pub use error::{BlocklistError, BlocklistResult, CacheError, NetworkError};
pub use pipeline::{Blocklist, Pipeline, Provenance};
pub use range::{AddressRange, to_range};
