use super::uri::Uri;
use ipnet::IpNet;
use std::net::IpAddr;

/// One entry of an ignore list (`no_proxy`-style bypass rule).
#[derive(Debug, Clone)]
pub enum IgnorePattern {
    Wildcard,
    LocalHostname,
    HostExact {
        host: String,
        port: Option<u16>,
    },
    DomainSuffix {
        suffix: String,
        port: Option<u16>,
        #[allow(dead_code)] // kept for round-tripping the original pattern text
        leading_dot_or_star: bool,
    },
    IpExact {
        addr: IpAddr,
        port: Option<u16>,
    },
    IpNetwork {
        network: Option<IpNet>,
    },
}

impl IgnorePattern {
    pub fn parse(pattern: &str) -> IgnorePattern {
        if pattern.contains('/') {
            return IgnorePattern::IpNetwork {
                network: pattern.parse().ok(),
            };
        }

        if pattern == "*" {
            return IgnorePattern::Wildcard;
        }

        if pattern == "<local>" {
            return IgnorePattern::LocalHostname;
        }

        let (base, port) = split_trailing_port(pattern);

        if let Some(suffix) = base.strip_prefix("*.") {
            return IgnorePattern::DomainSuffix {
                suffix: suffix.to_string(),
                port,
                leading_dot_or_star: true,
            };
        }

        if let Some(suffix) = base.strip_prefix('.') {
            return IgnorePattern::DomainSuffix {
                suffix: suffix.to_string(),
                port,
                leading_dot_or_star: true,
            };
        }

        if let Ok(addr) = base.parse::<IpAddr>() {
            return IgnorePattern::IpExact { addr, port };
        }

        IgnorePattern::HostExact {
            host: base.to_string(),
            port,
        }
    }
}

/// Splits a trailing `:port` off an ignore-pattern host, taking care not to
/// mistake a bare (unbracketed) IPv6 literal for a `host:port` pair.
fn split_trailing_port(s: &str) -> (String, Option<u16>) {
    if let Some(stripped) = s.strip_prefix('[') {
        if let Some(end) = stripped.find(']') {
            let host = stripped[..end].to_string();
            let remainder = &stripped[end + 1..];
            if let Some(port_str) = remainder.strip_prefix(':') {
                if let Ok(port) = port_str.parse() {
                    return (host, Some(port));
                }
            }
            return (host, None);
        }
    }

    if s.matches(':').count() == 1 {
        if let Some(idx) = s.rfind(':') {
            let (before, after) = (&s[..idx], &s[idx + 1..]);
            if let Ok(port) = after.parse::<u16>() {
                return (before.to_string(), Some(port));
            }
        }
    }

    (s.to_string(), None)
}

fn port_matches(pattern_port: Option<u16>, dest: &Uri) -> bool {
    match pattern_port {
        Some(p) => dest.port() == p,
        None => true,
    }
}

fn domain_suffix_matches(host: &str, suffix: &str) -> bool {
    let host = host.to_ascii_lowercase();
    let suffix = suffix.to_ascii_lowercase();
    host == suffix || host.ends_with(&format!(".{}", suffix))
}

fn pattern_matches(dest: &Uri, pattern: &IgnorePattern) -> bool {
    match pattern {
        IgnorePattern::Wildcard => true,
        IgnorePattern::LocalHostname => !dest.host().contains('.') && !dest.host().contains(':'),
        IgnorePattern::HostExact { host, port } => dest.host().eq_ignore_ascii_case(host) && port_matches(*port, dest),
        IgnorePattern::DomainSuffix { suffix, port, .. } => {
            domain_suffix_matches(dest.host(), suffix) && port_matches(*port, dest)
        }
        IgnorePattern::IpExact { addr, port } => {
            dest.host().parse::<IpAddr>().map(|ip| ip == *addr).unwrap_or(false) && port_matches(*port, dest)
        }
        IgnorePattern::IpNetwork { network } => match network {
            Some(net) => dest.host().parse::<IpAddr>().map(|ip| net.contains(&ip)).unwrap_or(false),
            None => false,
        },
    }
}

/// Returns true iff any pattern in `patterns` matches `dest`. Hostname
/// resolution is never performed here; only literal IPs match IP rules.
pub fn is_ignored(dest: &Uri, patterns: &[IgnorePattern]) -> bool {
    patterns.iter().any(|p| pattern_matches(dest, p))
}
