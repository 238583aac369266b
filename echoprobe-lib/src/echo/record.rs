use std::fmt;
use std::net::SocketAddr;

use http::request::Parts;
use http::HeaderMap;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// What the echo backend saw for a single request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EchoRecord {
    pub method: String,
    /// Raw request target, query string included
    pub path: String,
    pub headers: EchoHeaders,
    /// `ip:port` of the immediate TCP peer
    pub client_address: String,
}

impl EchoRecord {
    /// Build the record for a request.
    ///
    /// `raw_head` is the request head as read from the socket. When present it is
    /// the source of the request target and of every header, spelled exactly as
    /// received. Without it the parsed request is used, which only knows
    /// lowercased header names.
    pub fn capture(parts: &Parts, raw_head: Option<&[u8]>, peer: SocketAddr) -> Self {
        let client_address = peer.to_string();
        if let Some(head) = raw_head.and_then(RawHead::parse) {
            return Self {
                method: parts.method.as_str().to_string(),
                path: head.target,
                headers: head.headers,
                client_address,
            };
        }

        Self {
            method: parts.method.as_str().to_string(),
            path: parts.uri.to_string(),
            headers: EchoHeaders::from_header_map(&parts.headers),
            client_address,
        }
    }
}

/// Header name/value pairs in arrival order.
///
/// Names are compared case-insensitively. A repeated name keeps the spelling and
/// position of its first occurrence and the value of its last one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EchoHeaders(Vec<(String, String)>);

impl EchoHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.0.iter_mut().find(|(n, _)| n.eq_ignore_ascii_case(&name)) {
            Some(entry) => entry.1 = value,
            None => self.0.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn from_header_map(map: &HeaderMap) -> Self {
        let mut headers = Self::new();
        for (name, value) in map {
            headers.insert(name.as_str(), latin1(value.as_bytes()));
        }
        headers
    }
}

impl Serialize for EchoHeaders {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for EchoHeaders {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct HeadersVisitor;

        impl<'de> Visitor<'de> for HeadersVisitor {
            type Value = EchoHeaders;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of header names to string values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<EchoHeaders, A::Error> {
                let mut headers = EchoHeaders::new();
                while let Some((name, value)) = access.next_entry::<String, String>()? {
                    headers.insert(name, value);
                }
                Ok(headers)
            }
        }

        deserializer.deserialize_map(HeadersVisitor)
    }
}

/// Request line and header block of an HTTP/1 request, unnormalized
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawHead {
    pub method: String,
    pub target: String,
    pub version: String,
    pub headers: EchoHeaders,
}

impl RawHead {
    /// Parse a captured request head. Returns `None` if it does not look like an
    /// HTTP/1 request; the HTTP layer has already rejected malformed input by
    /// the time this runs, so `None` only means the capture is unusable.
    pub fn parse(head: &[u8]) -> Option<Self> {
        let mut lines = head
            .split(|&b| b == b'\n')
            .map(|line| line.strip_suffix(b"\r").unwrap_or(line))
            .skip_while(|line| line.is_empty());

        let request_line = lines.next()?;
        let mut parts = request_line.split(|&b| b == b' ').filter(|p| !p.is_empty());
        let method = latin1(parts.next()?);
        let target = latin1(parts.next()?);
        let version = latin1(parts.next()?);
        if !version.starts_with("HTTP/") || parts.next().is_some() {
            return None;
        }

        let mut headers = EchoHeaders::new();
        for line in lines {
            if line.is_empty() {
                break;
            }
            let colon = line.iter().position(|&b| b == b':')?;
            let (name, rest) = line.split_at(colon);
            if name.is_empty() {
                return None;
            }
            headers.insert(latin1(name), latin1(trim_ows(&rest[1..])));
        }

        Some(Self { method, target, version, headers })
    }
}

fn trim_ows(mut value: &[u8]) -> &[u8] {
    while let [b' ' | b'\t', rest @ ..] = value {
        value = rest;
    }
    while let [rest @ .., b' ' | b'\t'] = value {
        value = rest;
    }
    value
}

/// Decode bytes one-to-one into chars so that any header byte survives
fn latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}
