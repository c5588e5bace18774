use std::fmt;
use std::net::Ipv4Addr;

use cidr::Ipv4Inet;

/// Inclusive address span derived from one route prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressRange {
    Span { first: Ipv4Addr, last: Ipv4Addr },
    /// Registry text that is not an IPv4 CIDR, emitted unchanged
    Passthrough(String),
}

impl fmt::Display for AddressRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddressRange::Span { first, last } => write!(f, "{} - {}", first, last),
            AddressRange::Passthrough(raw) => f.write_str(raw),
        }
    }
}

fn netmask(len: u8) -> [u8; 4] {
    u32::MAX
        .checked_shl(32 - u32::from(len))
        .unwrap_or(0)
        .to_be_bytes()
}

/// Convert `addr/len` into its first and last address.
///
/// The first address is the registry's address as written, host bits
/// included. The last address sets every host bit. Anything that does not
/// parse as an IPv4 CIDR comes back as [`AddressRange::Passthrough`].
pub fn to_range(prefix: &str) -> AddressRange {
    match parse_inet(prefix) {
        Some(inet) => span_of(inet),
        None => AddressRange::Passthrough(prefix.to_string()),
    }
}

/// Strict `a.b.c.d/len` parsing.
///
/// `Ipv4Inet::from_str` takes short addresses (`10/8`) and padded or signed
/// lengths (`/024`, `/+24`); those stay unparsed here.
fn parse_inet(prefix: &str) -> Option<Ipv4Inet> {
    let (addr, len) = prefix.split_once('/')?;
    let addr: Ipv4Addr = addr.parse().ok()?;

    if len.is_empty() || !len.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if len.len() > 1 && len.starts_with('0') {
        return None;
    }
    let len: u8 = len.parse().ok()?;

    Ipv4Inet::new(addr, len).ok()
}

fn span_of(inet: Ipv4Inet) -> AddressRange {
    let first = inet.address();
    let mask = netmask(inet.network_length());
    let mut last = first.octets();
    for (byte, mask_byte) in last.iter_mut().zip(mask) {
        *byte |= !mask_byte;
    }

    AddressRange::Span {
        first,
        last: Ipv4Addr::from(last),
    }
}
