use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::name::Name;

/// Lifetime assumed when a requester does not supply one.
pub const DEFAULT_INTEREST_LIFETIME: Duration = Duration::from_millis(4000);

/// A request for a named piece of data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interest {
    pub name: Name,
    pub lifetime: Duration,
}

impl Interest {
    pub fn new(name: impl Into<Name>) -> Self {
        Self {
            name: name.into(),
            lifetime: DEFAULT_INTEREST_LIFETIME,
        }
    }

    pub fn with_lifetime(mut self, lifetime: Duration) -> Self {
        self.lifetime = lifetime;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    pub key_locator: Name,
    /// Hex-encoded Ed25519 signature over [`Data::signed_portion`].
    pub value: String,
}

/// A named, freshness-bounded response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Data {
    pub name: Name,
    pub content: String,
    #[serde(rename = "freshness_ms", with = "millis")]
    pub freshness_period: Duration,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<Signature>,
}

#[derive(Serialize)]
struct SignedPortion<'a> {
    name: &'a Name,
    content: &'a str,
    freshness_ms: u64,
    key_locator: &'a Name,
}

impl Data {
    pub fn new(name: Name, content: impl Into<String>) -> Self {
        Self {
            name,
            content: content.into(),
            freshness_period: Duration::ZERO,
            signature: None,
        }
    }

    /// Canonical bytes covered by a signature from `key_locator`.
    pub fn signed_portion(&self, key_locator: &Name) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(&SignedPortion {
            name: &self.name,
            content: &self.content,
            freshness_ms: millis::as_u64(self.freshness_period),
            key_locator,
        })
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn as_u64(d: Duration) -> u64 {
        u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
    }

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(as_u64(*d))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}
