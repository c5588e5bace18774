use crate::log_debug;

/// Extract the prefixes of `route:` objects from RPSL whois output.
///
/// Only lines starting exactly with `route:` count; the prefix is the
/// second whitespace-separated field. Order and duplicates are preserved.
pub fn parse_prefixes(raw: &str) -> Vec<String> {
    let prefixes: Vec<String> = raw
        .split('\n')
        .filter(|line| line.starts_with("route:"))
        .filter_map(|line| line.split_whitespace().nth(1))
        .map(str::to_string)
        .collect();

    log_debug!("Parsed {} route prefixes from {} bytes", prefixes.len(), raw.len());
    prefixes
}
