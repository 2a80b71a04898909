use borsh::{BorshDeserialize, BorshSerialize};
use rapids_math::Uint256;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{Debug, Display, Formatter};
use std::str::{self, FromStr};

pub const HASH_SIZE: usize = 32;

/// A 256 bit block hash, kept in the little-endian byte order it is computed in.
///
/// The textual form is the conventional big-endian hex string, i.e. leading zero bytes of
/// a mined block hash are printed first.
#[derive(PartialEq, Eq, Clone, Copy, Hash, Default, PartialOrd, Ord, BorshSerialize, BorshDeserialize)]
pub struct BlockHash([u8; HASH_SIZE]);

/// `blockhash::NONE` marks an unset hash, e.g. the parent of genesis
pub const NONE: BlockHash = BlockHash::from_bytes([0u8; HASH_SIZE]);

impl BlockHash {
    #[inline(always)]
    pub const fn from_bytes(bytes: [u8; HASH_SIZE]) -> Self {
        BlockHash(bytes)
    }

    #[inline(always)]
    pub const fn as_bytes(&self) -> [u8; HASH_SIZE] {
        self.0
    }

    /// Parses a big-endian hex string at compile time. Meant for hardcoded hashes only: malformed
    /// input fails const evaluation.
    pub const fn from_hex_const(hex: &str) -> Self {
        const fn nibble(c: u8) -> u8 {
            match c {
                b'0'..=b'9' => c - b'0',
                b'a'..=b'f' => c - b'a' + 10,
                b'A'..=b'F' => c - b'A' + 10,
                _ => panic!("invalid hex character in hash literal"),
            }
        }
        let hex = hex.as_bytes();
        assert!(hex.len() == HASH_SIZE * 2, "hash literal must have exactly 64 hex digits");
        let mut bytes = [0u8; HASH_SIZE];
        let mut i = 0;
        while i < HASH_SIZE {
            bytes[HASH_SIZE - 1 - i] = (nibble(hex[2 * i]) << 4) | nibble(hex[2 * i + 1]);
            i += 1;
        }
        BlockHash(bytes)
    }

    /// The hash read as a little-endian number, for comparison against a target
    #[inline]
    pub fn to_uint256(self) -> Uint256 {
        Uint256::from_le_bytes(self.0)
    }

    #[inline]
    pub fn from_uint256(value: Uint256) -> Self {
        BlockHash(value.to_le_bytes())
    }

    #[inline]
    pub fn is_none(&self) -> bool {
        self.eq(&NONE)
    }
}

impl Display for BlockHash {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut be = self.0;
        be.reverse();
        let mut hex = [0u8; HASH_SIZE * 2];
        faster_hex::hex_encode(&be, &mut hex).map_err(|_| std::fmt::Error)?;
        f.write_str(str::from_utf8(&hex).map_err(|_| std::fmt::Error)?)
    }
}

impl Debug for BlockHash {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

impl FromStr for BlockHash {
    type Err = faster_hex::Error;

    fn from_str(hash_str: &str) -> Result<Self, Self::Err> {
        let hash_str = hash_str.strip_prefix("0x").unwrap_or(hash_str);
        if hash_str.len() != HASH_SIZE * 2 {
            return Err(faster_hex::Error::InvalidLength(hash_str.len()));
        }
        let mut bytes = [0u8; HASH_SIZE];
        faster_hex::hex_decode(hash_str.as_bytes(), &mut bytes)?;
        bytes.reverse();
        Ok(BlockHash(bytes))
    }
}

impl From<[u8; HASH_SIZE]> for BlockHash {
    fn from(bytes: [u8; HASH_SIZE]) -> Self {
        BlockHash(bytes)
    }
}

impl Serialize for BlockHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.collect_str(self)
        } else {
            Serialize::serialize(&self.0, serializer)
        }
    }
}

impl<'de> Deserialize<'de> for BlockHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            let s = <String as Deserialize>::deserialize(deserializer)?;
            BlockHash::from_str(&s).map_err(de::Error::custom)
        } else {
            Ok(BlockHash(<[u8; HASH_SIZE] as Deserialize>::deserialize(deserializer)?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_basics() {
        let hash_str = "00000b444395e32c86230466900dba6483f9175cd385c1aa4456651a848900ed";
        let hash = BlockHash::from_str(hash_str).unwrap();
        assert_eq!(hash_str, hash.to_string());
        assert_eq!(hash, BlockHash::from_hex_const(hash_str));
        assert_eq!(hash, BlockHash::from_str(&format!("0x{hash_str}")).unwrap());
        // Leading zeros of the textual form are the most significant bytes
        assert_eq!(hash.as_bytes()[31], 0);
        assert_eq!(hash.as_bytes()[0], 0xed);
        assert!(hash.to_uint256() < Uint256::MAX >> 20);
        assert_eq!(BlockHash::from_uint256(hash.to_uint256()), hash);

        assert!(matches!(BlockHash::from_str(&hash_str[1..]), Err(faster_hex::Error::InvalidLength(63))));
        assert!(BlockHash::from_str(&hash_str.replace('b', "x")).is_err());
        assert!(NONE.is_none());
    }

    #[test]
    fn test_serde() {
        let hash = BlockHash::from_hex_const("000006bc3b91b1f97edfafe72c6226f5bd337087f2e4b0ca636ff9b0cfc12e7e");
        let json = serde_json::to_string(&hash).unwrap();
        assert_eq!(json, "\"000006bc3b91b1f97edfafe72c6226f5bd337087f2e4b0ca636ff9b0cfc12e7e\"");
        assert_eq!(serde_json::from_str::<BlockHash>(&json).unwrap(), hash);

        // Borsh keeps the raw little-endian bytes
        let bytes = borsh::to_vec(&hash).unwrap();
        assert_eq!(bytes, hash.as_bytes());
        assert_eq!(BlockHash::try_from_slice(&bytes).unwrap(), hash);
    }
}
