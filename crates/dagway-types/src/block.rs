use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Content-addressed identifier for a block.
///
/// A `BlockId` is the BLAKE3 hash of a block's serialized bytes. Identical
/// bytes always produce the same `BlockId`, so an id names exactly one
/// block's content and a fetched block can be verified against the id it
/// was requested under.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockId([u8; 32]);

impl BlockId {
    /// Compute a `BlockId` from raw block bytes.
    pub fn from_bytes(data: &[u8]) -> Self {
        Self(*blake3::hash(data).as_bytes())
    }

    /// Create a `BlockId` from a pre-computed hash.
    pub fn from_hash(hash: [u8; 32]) -> Self {
        Self(hash)
    }

    /// The raw 32-byte hash.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Hex-encoded string representation.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Short hex representation (first 8 characters), for logs.
    pub fn short_hex(&self) -> String {
        hex::encode(&self.0[..4])
    }

    /// Parse from a hex string.
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        if bytes.len() != 32 {
            return Err(TypeError::InvalidLength {
                expected: 32,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl fmt::Debug for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlockId({})", self.short_hex())
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl From<[u8; 32]> for BlockId {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl From<BlockId> for [u8; 32] {
    fn from(id: BlockId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_bytes_is_deterministic() {
        let data = b"leaf block payload";
        let id1 = BlockId::from_bytes(data);
        let id2 = BlockId::from_bytes(data);
        assert_eq!(id1, id2);
    }

    #[test]
    fn different_data_produces_different_ids() {
        let id1 = BlockId::from_bytes(b"block a");
        let id2 = BlockId::from_bytes(b"block b");
        assert_ne!(id1, id2);
    }

    #[test]
    fn hex_roundtrip() {
        let id = BlockId::from_bytes(b"roundtrip");
        let parsed = BlockId::from_hex(&id.to_hex()).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn from_hex_rejects_bad_input() {
        assert!(BlockId::from_hex("not hex").is_err());
        assert!(BlockId::from_hex("abcd").is_err());
    }

    #[test]
    fn display_is_full_hex() {
        let id = BlockId::from_bytes(b"display");
        let shown = format!("{id}");
        assert_eq!(shown.len(), 64);
        assert_eq!(shown, id.to_hex());
    }

    #[test]
    fn short_hex_is_8_chars() {
        let id = BlockId::from_bytes(b"short");
        assert_eq!(id.short_hex().len(), 8);
    }
}
