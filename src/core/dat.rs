//! eMule / PeerGuardian "dat" block-list encoding
//!
//! One line per entry: `<first> - <last> , 000 , <ASN>`.

use crate::config::SEVERITY;
use crate::core::asn::AsnIdentifier;
use crate::core::range::AddressRange;

/// One dat line before encoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlocklistEntry {
    pub range: AddressRange,
    pub asn: AsnIdentifier,
}

impl BlocklistEntry {
    pub fn new(range: AddressRange, asn: AsnIdentifier) -> Self {
        Self { range, asn }
    }

    pub fn severity(&self) -> &'static str {
        SEVERITY
    }
}

pub fn encode_entries(entries: &[BlocklistEntry]) -> String {
    let mut blocklist = String::new();
    for entry in entries {
        blocklist.push_str(&format!("{} , {} , {}\n", entry.range, entry.severity(), entry.asn));
    }
    blocklist
}

/// Encode every range as a line tagged with `asn`.
pub fn encode(asn: AsnIdentifier, ranges: &[AddressRange]) -> String {
    let entries: Vec<BlocklistEntry> = ranges
        .iter()
        .cloned()
        .map(|range| BlocklistEntry::new(range, asn))
        .collect();
    encode_entries(&entries)
}
