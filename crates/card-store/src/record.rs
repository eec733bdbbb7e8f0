use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Per-sector health map of a card, as consolidated by the tester.
///
/// The bytes are opaque here. On the wire the map travels as a standard
/// padded base64 string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectorMap(Vec<u8>);

impl SectorMap {
    /// Wraps raw sector map bytes.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Returns the raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns the base64 form sent to clients.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.0)
    }
}

impl From<Vec<u8>> for SectorMap {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<Option<Vec<u8>>> for SectorMap {
    /// A NULL blob reads as an empty map.
    fn from(bytes: Option<Vec<u8>>) -> Self {
        Self(bytes.unwrap_or_default())
    }
}

impl Serialize for SectorMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_base64())
    }
}

impl<'de> Deserialize<'de> for SectorMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded)
            .map(Self)
            .map_err(serde::de::Error::custom)
    }
}

/// One card joined with its active status row.
///
/// Field order matches the JSON objects served to the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardStatusRecord {
    pub id: i64,
    pub name: String,
    /// Consolidated sector map, base64 on the wire.
    pub data: SectorMap,
    /// Unix seconds of the tester's last write.
    pub last_updated: i64,
    /// Capacity in bytes.
    pub size: i64,
    /// Tester state code.
    pub status: i64,
    /// Throughput in bytes per second.
    pub rate: f64,
    pub num_bad_sectors: i64,
    /// Current round plus the stored round offset.
    pub cur_round_num: i64,
}
