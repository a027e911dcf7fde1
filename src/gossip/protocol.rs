//! Tuple Wire Format
//!
//! One broadcast frame, big-endian where integers appear:
//!
//! ```text
//! [local-host: 18 bytes]   // 16 bytes IPv6-mapped IP || 2 bytes port
//! repeated {
//!   [len: 1 byte]          // length of the following record, max 255
//!   [host: 18 bytes]       // owning host
//!   [key: len-18 bytes]    // tuple key, max 237 bytes
//! }
//! ```
//!
//! State-exchange payloads are the same record stream without the leading
//! local-host header (the exchange already knows the remote address). Keys
//! longer than 237 bytes are not representable and are rejected before a
//! frame is produced.

use std::net::{IpAddr, Ipv6Addr, SocketAddr};

use crate::error::KelipsError;
use crate::storage::Tuple;

/// Encoded length of an `ip:port` address.
pub const HOST_LEN: usize = 18;

/// Longest representable key: one length byte covers host and key.
pub const MAX_KEY_LEN: usize = 255 - HOST_LEN;

/// Encodes `ip:port` as 16 IPv6-mapped address bytes plus a big-endian port.
pub fn encode_host(host: &str) -> Result<[u8; HOST_LEN], KelipsError> {
    let addr: SocketAddr = host
        .parse()
        .map_err(|e| KelipsError::MalformedFrame(format!("bad host {}: {}", host, e)))?;

    let ip = match addr.ip() {
        IpAddr::V4(v4) => v4.to_ipv6_mapped(),
        IpAddr::V6(v6) => v6,
    };

    let mut out = [0u8; HOST_LEN];
    out[..16].copy_from_slice(&ip.octets());
    out[16..].copy_from_slice(&addr.port().to_be_bytes());
    Ok(out)
}

pub fn decode_host(buf: &[u8]) -> Result<String, KelipsError> {
    if buf.len() < HOST_LEN {
        return Err(KelipsError::MalformedFrame(
            "short host record".to_string(),
        ));
    }

    let mut octets = [0u8; 16];
    octets.copy_from_slice(&buf[..16]);
    let ip6 = Ipv6Addr::from(octets);
    let port = u16::from_be_bytes([buf[16], buf[17]]);

    let ip = match ip6.to_ipv4_mapped() {
        Some(v4) => IpAddr::V4(v4),
        None => IpAddr::V6(ip6),
    };
    Ok(SocketAddr::new(ip, port).to_string())
}

/// Appends the length-prefixed record stream for `tuples` to `out`.
pub fn write_tuples(out: &mut Vec<u8>, tuples: &[Tuple]) -> Result<(), KelipsError> {
    for tuple in tuples {
        if tuple.key.len() > MAX_KEY_LEN {
            return Err(KelipsError::MalformedFrame(format!(
                "key length {} exceeds {}",
                tuple.key.len(),
                MAX_KEY_LEN
            )));
        }
        let host = encode_host(&tuple.host)?;
        out.push((HOST_LEN + tuple.key.len()) as u8);
        out.extend_from_slice(&host);
        out.extend_from_slice(&tuple.key);
    }
    Ok(())
}

/// Parses a record stream produced by [`write_tuples`].
///
/// Heartbeats and last-seen are not serialized; parsed tuples come back
/// fresh and pick up liveness state when they are inserted or pinged.
pub fn read_tuples(buf: &[u8]) -> Result<Vec<Tuple>, KelipsError> {
    let mut out = Vec::new();
    let mut rest = buf;

    while !rest.is_empty() {
        let len = rest[0] as usize;
        rest = &rest[1..];
        if len < HOST_LEN || rest.len() < len {
            return Err(KelipsError::MalformedFrame(
                "truncated tuple record".to_string(),
            ));
        }

        let host = decode_host(&rest[..HOST_LEN])?;
        out.push(Tuple::new(rest[HOST_LEN..len].to_vec(), host));
        rest = &rest[len..];
    }
    Ok(out)
}

/// Builds a broadcast frame: local-host header followed by the records.
pub fn encode_broadcast(local_host: &str, tuples: &[Tuple]) -> Result<Vec<u8>, KelipsError> {
    let mut frame = encode_host(local_host)?.to_vec();
    write_tuples(&mut frame, tuples)?;
    Ok(frame)
}

/// Splits a broadcast frame into the sending host and its records.
pub fn decode_broadcast(frame: &[u8]) -> Result<(String, Vec<Tuple>), KelipsError> {
    if frame.len() < HOST_LEN {
        return Err(KelipsError::MalformedFrame(
            "frame shorter than host header".to_string(),
        ));
    }
    let from = decode_host(&frame[..HOST_LEN])?;
    let tuples = read_tuples(&frame[HOST_LEN..])?;
    Ok((from, tuples))
}
