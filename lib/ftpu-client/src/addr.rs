/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::fmt;
use std::net::{IpAddr, Ipv6Addr, SocketAddr};
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Error, Eq, PartialEq)]
pub enum UpstreamAddrError {
    #[error("empty string")]
    EmptyString,
    #[error("invalid ipv6 ip in squared brackets")]
    InvalidBracketedIpv6,
    #[error("invalid domain: {0}")]
    InvalidDomain(String),
    #[error("invalid port: {0}")]
    InvalidPort(String),
}

#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum Host {
    Ip(IpAddr),
    Domain(String),
}

impl Host {
    fn from_maybe_mapped_ip6(ip6: Ipv6Addr) -> Self {
        if let Some(ip4) = ip6.to_ipv4_mapped() {
            Host::Ip(IpAddr::V4(ip4))
        } else {
            Host::Ip(IpAddr::V6(ip6))
        }
    }

    fn from_domain_str(domain: &str) -> Result<Self, UpstreamAddrError> {
        let valid = domain
            .bytes()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, b'-' | b'.' | b'_'));
        if valid {
            Ok(Host::Domain(domain.to_ascii_lowercase()))
        } else {
            Err(UpstreamAddrError::InvalidDomain(domain.to_string()))
        }
    }
}

impl fmt::Display for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Host::Ip(ip) => write!(f, "{ip}"),
            Host::Domain(domain) => write!(f, "{domain}"),
        }
    }
}

impl FromStr for Host {
    type Err = UpstreamAddrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(UpstreamAddrError::EmptyString);
        }
        if let Some(s) = s.strip_prefix('[') {
            return match s.strip_suffix(']').map(Ipv6Addr::from_str) {
                Some(Ok(ip6)) => Ok(Host::from_maybe_mapped_ip6(ip6)),
                _ => Err(UpstreamAddrError::InvalidBracketedIpv6),
            };
        }
        match IpAddr::from_str(s) {
            Ok(IpAddr::V6(ip6)) => Ok(Host::from_maybe_mapped_ip6(ip6)),
            Ok(ip) => Ok(Host::Ip(ip)),
            Err(_) => Host::from_domain_str(s),
        }
    }
}

/// Address of the remote FTP server, or of one of its passive data ports.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct UpstreamAddr {
    host: Host,
    port: u16,
}

impl UpstreamAddr {
    pub fn new(host: Host, port: u16) -> Self {
        UpstreamAddr { host, port }
    }

    pub fn from_host_str_and_port(host: &str, port: u16) -> Result<Self, UpstreamAddrError> {
        let host = Host::from_str(host)?;
        Ok(UpstreamAddr { host, port })
    }

    #[inline]
    pub fn host(&self) -> &Host {
        &self.host
    }

    #[inline]
    pub fn port(&self) -> u16 {
        self.port
    }

    #[inline]
    pub fn set_port(&mut self, port: u16) {
        self.port = port;
    }
}

impl From<SocketAddr> for UpstreamAddr {
    fn from(addr: SocketAddr) -> Self {
        UpstreamAddr {
            host: Host::Ip(addr.ip()),
            port: addr.port(),
        }
    }
}

impl fmt::Display for UpstreamAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.host {
            Host::Ip(IpAddr::V6(ip6)) => write!(f, "[{ip6}]:{}", self.port),
            host => write!(f, "{host}:{}", self.port),
        }
    }
}

/// Parse `host[:port]`, the port is left as 0 if absent.
impl FromStr for UpstreamAddr {
    type Err = UpstreamAddrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(UpstreamAddrError::EmptyString);
        }

        if s.starts_with('[') {
            if let Some(p) = memchr::memrchr(b']', s.as_bytes()) {
                let host = Host::from_str(&s[..=p])?;
                let port = match s[p + 1..].strip_prefix(':') {
                    Some(port) => parse_port(port)?,
                    None if p + 1 == s.len() => 0,
                    None => return Err(UpstreamAddrError::InvalidPort(s[p + 1..].to_string())),
                };
                return Ok(UpstreamAddr { host, port });
            }
            return Err(UpstreamAddrError::InvalidBracketedIpv6);
        }

        match s.rsplit_once(':') {
            // bare ipv6 address without brackets
            Some((h, _)) if h.contains(':') => {
                let host = Host::from_str(s)?;
                Ok(UpstreamAddr { host, port: 0 })
            }
            Some((h, port)) => {
                let host = Host::from_str(h)?;
                let port = parse_port(port)?;
                Ok(UpstreamAddr { host, port })
            }
            None => {
                let host = Host::from_str(s)?;
                Ok(UpstreamAddr { host, port: 0 })
            }
        }
    }
}

fn parse_port(s: &str) -> Result<u16, UpstreamAddrError> {
    u16::from_str(s).map_err(|_| UpstreamAddrError::InvalidPort(s.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn parse_domain_with_port() {
        let addr = UpstreamAddr::from_str("FTP.Example.net:2121").unwrap();
        assert_eq!(addr.host(), &Host::Domain("ftp.example.net".to_string()));
        assert_eq!(addr.port(), 2121);
        assert_eq!(addr.to_string(), "ftp.example.net:2121");
    }

    #[test]
    fn parse_without_port() {
        let mut addr = UpstreamAddr::from_str("192.168.1.10").unwrap();
        assert_eq!(
            addr.host(),
            &Host::Ip(IpAddr::V4(Ipv4Addr::new(192, 168, 1, 10)))
        );
        assert_eq!(addr.port(), 0);
        addr.set_port(21);
        assert_eq!(addr.to_string(), "192.168.1.10:21");
    }

    #[test]
    fn parse_ipv6() {
        let addr = UpstreamAddr::from_str("[2001:db8::1]:21").unwrap();
        assert_eq!(addr.port(), 21);
        assert_eq!(addr.to_string(), "[2001:db8::1]:21");

        let addr = UpstreamAddr::from_str("2001:db8::1").unwrap();
        assert_eq!(addr.port(), 0);

        let addr = UpstreamAddr::from_str("[::ffff:10.0.0.1]").unwrap();
        assert_eq!(addr.to_string(), "10.0.0.1:0");
    }

    #[test]
    fn parse_invalid() {
        assert_eq!(
            UpstreamAddr::from_str(""),
            Err(UpstreamAddrError::EmptyString)
        );
        assert!(UpstreamAddr::from_str("[2001:db8::1").is_err());
        assert!(UpstreamAddr::from_str("[2001:db8::1]x").is_err());
        assert!(UpstreamAddr::from_str("example.net:70000").is_err());
        assert!(UpstreamAddr::from_str("bad host:21").is_err());
    }

    #[test]
    fn from_socket_addr() {
        let addr = UpstreamAddr::from(SocketAddr::new(
            IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)),
            50000,
        ));
        assert_eq!(addr.to_string(), "127.0.0.1:50000");
    }
}
