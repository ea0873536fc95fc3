use std::collections::HashSet;

/// Parses a raw `FindProxyForURL` return value into an ordered, deduplicated
/// list of proxy URI strings. Malformed entries normalize to `direct://`
/// rather than being dropped, and an entirely empty/malformed response
/// normalizes to a single `direct://` entry.
pub fn parse_pac_response(resp: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut result = Vec::new();

    for entry in resp.split(';') {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }

        let mut parts = entry.split_whitespace();
        let method = parts.next().unwrap_or("");
        let server = parts.next();

        let normalized = match method.to_ascii_uppercase().as_str() {
            "DIRECT" => "direct://".to_string(),
            "PROXY" => with_scheme("http", server),
            "SOCKS" => with_scheme("socks", server),
            "SOCKS4" => with_scheme("socks4", server),
            "SOCKS4A" => with_scheme("socks4a", server),
            "SOCKS5" => with_scheme("socks5", server),
            _ => "direct://".to_string(),
        };

        if seen.insert(normalized.clone()) {
            result.push(normalized);
        }
    }

    if result.is_empty() {
        vec!["direct://".to_string()]
    } else {
        result
    }
}

fn with_scheme(scheme: &str, server: Option<&str>) -> String {
    match server {
        Some(s) if !s.is_empty() => format!("{}://{}", scheme, s),
        _ => "direct://".to_string(),
    }
}
