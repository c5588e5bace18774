use std::fmt;
use std::str::FromStr;

use crate::config::{PUBLIC_ASN_16BIT_MAX, PUBLIC_ASN_32BIT_MAX, PUBLIC_ASN_32BIT_MIN};
use crate::core::error::BlocklistError;

/// A public Autonomous System Number.
///
/// Only [`validate`] builds one, so holding an `AsnIdentifier` means the
/// number is outside the reserved and private ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AsnIdentifier(u32);

impl AsnIdentifier {
    pub fn number(self) -> u32 {
        self.0
    }

    /// Canonical `AS<digits>` form, also used as the cache key
    pub fn canonical(self) -> String {
        self.to_string()
    }
}

impl fmt::Display for AsnIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AS{}", self.0)
    }
}

impl FromStr for AsnIdentifier {
    type Err = BlocklistError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        validate(s)
    }
}

/// Boundary normalization: prepend `AS` when missing. Whitespace is kept,
/// so padded input fails validation.
pub fn normalize(raw: &str) -> String {
    if raw.starts_with("AS") {
        raw.to_string()
    } else {
        format!("AS{}", raw)
    }
}

pub fn is_public_asn(number: u32) -> bool {
    (1..=PUBLIC_ASN_16BIT_MAX).contains(&number)
        || (PUBLIC_ASN_32BIT_MIN..=PUBLIC_ASN_32BIT_MAX).contains(&number)
}

/// Validate an ASN string such as `AS13335` or `13335`.
pub fn validate(raw: &str) -> Result<AsnIdentifier, BlocklistError> {
    let digits = raw.strip_prefix("AS").unwrap_or(raw);

    // u32::from_str accepts a leading '+'
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(BlocklistError::InvalidAsn(raw.to_string()));
    }

    let number: u32 = digits
        .parse()
        .map_err(|_| BlocklistError::InvalidAsn(raw.to_string()))?;

    if !is_public_asn(number) {
        return Err(BlocklistError::InvalidAsn(raw.to_string()));
    }

    Ok(AsnIdentifier(number))
}
