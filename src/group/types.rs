use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

/// A contact within an affinity group: the group id together with the host
/// answering for it. Serialized as `"<host>/<id>"`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupContact {
    pub id: u64,
    pub host: String,
}

impl GroupContact {
    pub fn new(id: u64, host: impl Into<String>) -> Self {
        Self {
            id,
            host: host.into(),
        }
    }
}

impl fmt::Display for GroupContact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.host, self.id)
    }
}

impl FromStr for GroupContact {
    type Err = ParseIntError;

    /// Parses `"<host>/<id>"`. A bare host is accepted with group id 0.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.rsplit_once('/') {
            Some((host, id)) => Ok(Self {
                id: id.parse()?,
                host: host.to_string(),
            }),
            None => Ok(Self {
                id: 0,
                host: s.to_string(),
            }),
        }
    }
}

/// A lookup request travelling between nodes.
///
/// `ttl` is a hop budget, not a timeout: each home-group forward decrements
/// it, and a node must not forward once it reaches zero. `originator` is
/// rewritten to the forwarding group's contact on every hop.
#[derive(Debug, Clone)]
pub struct LookupRequest {
    pub key: Vec<u8>,
    pub ttl: u32,
    pub originator: GroupContact,
}

impl LookupRequest {
    pub fn new(key: impl Into<Vec<u8>>, ttl: u32) -> Self {
        Self {
            key: key.into(),
            ttl,
            originator: GroupContact::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_contact_round_trips_through_display() {
        let contact = GroupContact::new(2, "127.0.0.1:9000");
        assert_eq!(contact.to_string(), "127.0.0.1:9000/2");
        assert_eq!(contact.to_string().parse::<GroupContact>().unwrap(), contact);
    }

    #[test]
    fn bare_host_parses_with_group_zero() {
        let contact: GroupContact = "127.0.0.1:9000".parse().unwrap();
        assert_eq!(contact.id, 0);
        assert_eq!(contact.host, "127.0.0.1:9000");
    }

    #[test]
    fn junk_group_id_is_rejected() {
        assert!("127.0.0.1:9000/abc".parse::<GroupContact>().is_err());
    }
}
