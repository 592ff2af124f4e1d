//! Client identifier extraction.
//!
//! The identifier is the address handed to the geolocation provider. A
//! forwarded-for style header wins over the socket peer address when present
//! and trusted; only its first (left-most) entry is used.

use axum::http::HeaderMap;

use crate::config::ClientIpConfig;

/// Derive the client identifier for a request.
///
/// `remote` is the raw connection address, with or without a port.
pub fn client_identifier(headers: &HeaderMap, remote: &str, config: &ClientIpConfig) -> String {
    if config.trust_forwarded {
        if let Some(forwarded) = forwarded_client(headers, &config.forwarded_header) {
            return forwarded.to_string();
        }
    }
    strip_port(remote).to_string()
}

/// First non-empty entry of a comma-separated forwarded header.
pub fn forwarded_client<'a>(headers: &'a HeaderMap, header: &str) -> Option<&'a str> {
    let value = headers.get(header)?.to_str().ok()?;
    let first = value.split(',').next()?.trim();
    if first.is_empty() {
        None
    } else {
        Some(first)
    }
}

/// Remove a trailing `:port` from an address.
///
/// Handles `host:port`, `[v6]:port`, and bare IPv6 literals (left untouched).
pub fn strip_port(addr: &str) -> &str {
    if let Some(rest) = addr.strip_prefix('[') {
        return match rest.find(']') {
            Some(end) => &rest[..end],
            None => addr,
        };
    }

    match addr.rsplit_once(':') {
        // More than one colon without brackets is an IPv6 literal.
        Some((host, _)) if !host.contains(':') => host,
        _ => addr,
    }
}
