use crate::Uint256;
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const SIGN_BIT: u32 = 0x0080_0000;
const MANTISSA_MASK: u32 = 0x007f_ffff;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetError {
    #[error("compact target {0:#010x} has its sign bit set")]
    Negative(u32),

    #[error("compact target {0:#010x} decodes to zero")]
    Zero(u32),

    #[error("compact target {0:#010x} does not fit in 256 bits")]
    Overflow(u32),
}

pub type TargetResult<T> = std::result::Result<T, TargetError>;

/// The 32 bit floating point like representation of a 256 bit target carried in block headers.
///
/// The high byte is a base-256 exponent, bit 23 is a sign bit and the low 23 bits are the mantissa:
/// `value = mantissa * 256^(exponent - 3)`.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, BorshSerialize, BorshDeserialize,
)]
#[serde(transparent)]
pub struct CompactTarget(pub u32);

/// Result of decoding a [`CompactTarget`] without judging validity
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecodedTarget {
    pub value: Uint256,
    pub negative: bool,
    pub overflow: bool,
}

impl CompactTarget {
    #[inline]
    pub const fn bits(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn exponent(self) -> u32 {
        self.0 >> 24
    }

    #[inline]
    pub const fn mantissa(self) -> u32 {
        self.0 & MANTISSA_MASK
    }

    /// Expands the compact form. Shifts which push every mantissa bit past 256 bits leave a zero value,
    /// and are always reported through the overflow flag.
    pub fn decode(self) -> DecodedTarget {
        let exponent = self.exponent();
        let mantissa = self.mantissa();
        let value = if exponent <= 3 {
            Uint256::from_u64((mantissa >> (8 * (3 - exponent))) as u64)
        } else {
            Uint256::from_u64(mantissa as u64).overflowing_shl(8 * (exponent - 3)).0
        };
        let negative = mantissa != 0 && self.0 & SIGN_BIT != 0;
        let overflow = mantissa != 0 && (exponent > 34 || (mantissa > 0xff && exponent > 33) || (mantissa > 0xffff && exponent > 32));
        DecodedTarget { value, negative, overflow }
    }

    /// Decodes and rejects negative, overflowing and zero targets
    pub fn to_target(self) -> TargetResult<Uint256> {
        let decoded = self.decode();
        if decoded.negative {
            Err(TargetError::Negative(self.0))
        } else if decoded.overflow {
            Err(TargetError::Overflow(self.0))
        } else if decoded.value.is_zero() {
            Err(TargetError::Zero(self.0))
        } else {
            Ok(decoded.value)
        }
    }

    /// Encodes with the minimal exponent whose 23 bit mantissa keeps the sign bit clear
    pub fn from_target(target: Uint256) -> Self {
        let mut size = target.bits().div_ceil(8);
        let mut compact = if size <= 3 {
            (target.as_u64() << (8 * (3 - size))) as u32
        } else {
            target.overflowing_shr(8 * (size - 3)).0.as_u64() as u32
        };
        if compact & SIGN_BIT != 0 {
            compact >>= 8;
            size += 1;
        }
        Self(compact | (size << 24))
    }
}

impl From<u32> for CompactTarget {
    fn from(bits: u32) -> Self {
        Self(bits)
    }
}

impl From<CompactTarget> for u32 {
    fn from(target: CompactTarget) -> Self {
        target.0
    }
}

impl std::fmt::Display for CompactTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_chacha::{
        rand_core::{RngCore, SeedableRng},
        ChaCha8Rng,
    };

    #[test]
    fn test_decode_vectors() {
        struct Test {
            name: &'static str,
            bits: u32,
            value: Uint256,
            negative: bool,
            overflow: bool,
        }

        let tests = [
            Test { name: "zero", bits: 0, value: Uint256::ZERO, negative: false, overflow: false },
            Test { name: "mantissa shifted out", bits: 0x00123456, value: Uint256::ZERO, negative: false, overflow: false },
            Test { name: "one byte", bits: 0x01123456, value: Uint256::from_u64(0x12), negative: false, overflow: false },
            Test { name: "two bytes", bits: 0x02123456, value: Uint256::from_u64(0x1234), negative: false, overflow: false },
            Test { name: "three bytes", bits: 0x03123456, value: Uint256::from_u64(0x123456), negative: false, overflow: false },
            Test { name: "four bytes", bits: 0x04123456, value: Uint256::from_u64(0x12345600), negative: false, overflow: false },
            Test { name: "negative", bits: 0x04923456, value: Uint256::from_u64(0x12345600), negative: true, overflow: false },
            Test { name: "sign bit without mantissa", bits: 0x01800000, value: Uint256::ZERO, negative: false, overflow: false },
            Test {
                name: "pow limit",
                bits: 0x1e0ffff0,
                value: Uint256::from_u64(0x0ffff0) << 216,
                negative: false,
                overflow: false,
            },
            Test { name: "too large", bits: 0xff123456, value: Uint256::ZERO, negative: false, overflow: true },
            Test { name: "large mantissa at 33", bits: 0x21010000, value: Uint256::ZERO, negative: false, overflow: true },
            Test { name: "zero mantissa never overflows", bits: 0xff000000, value: Uint256::ZERO, negative: false, overflow: false },
        ];

        for test in tests {
            let decoded = CompactTarget(test.bits).decode();
            assert_eq!(decoded.value, test.value, "{}: value", test.name);
            assert_eq!(decoded.negative, test.negative, "{}: negative", test.name);
            assert_eq!(decoded.overflow, test.overflow, "{}: overflow", test.name);
        }
    }

    #[test]
    fn test_encode_vectors() {
        struct Test {
            name: &'static str,
            value: Uint256,
            bits: u32,
        }

        let tests = [
            Test { name: "zero", value: Uint256::ZERO, bits: 0 },
            Test { name: "one byte", value: Uint256::from_u64(0x12), bits: 0x01120000 },
            Test { name: "sign bit forces exponent bump", value: Uint256::from_u64(0x80), bits: 0x02008000 },
            Test { name: "three bytes", value: Uint256::from_u64(0x123456), bits: 0x03123456 },
            Test { name: "truncates low bytes", value: Uint256::from_u64(0x123456789a), bits: 0x05123456 },
            Test { name: "pow limit", value: Uint256::MAX.overflowing_shr(2).0, bits: 0x203fffff },
            Test { name: "pos limit", value: Uint256::MAX.overflowing_shr(24).0, bits: 0x1e00ffff },
            Test { name: "pos v2 limit", value: Uint256::MAX.overflowing_shr(20).0, bits: 0x1e0fffff },
        ];

        for test in tests {
            assert_eq!(CompactTarget::from_target(test.value).bits(), test.bits, "{}", test.name);
        }
    }

    #[test]
    fn test_to_target_rejects_invalid() {
        assert_eq!(CompactTarget(0).to_target(), Err(TargetError::Zero(0)));
        assert_eq!(CompactTarget(0x04923456).to_target(), Err(TargetError::Negative(0x04923456)));
        assert_eq!(CompactTarget(0xff123456).to_target(), Err(TargetError::Overflow(0xff123456)));
        assert_eq!(CompactTarget(0x1d00ffff).to_target(), Ok(Uint256::from_u64(0xffff) << 208));
    }

    #[test]
    fn test_round_trip_precision() {
        let mut rng = ChaCha8Rng::from_seed([42; 32]);
        let mut bytes = [0u8; 32];
        for _ in 0..10_000 {
            rng.fill_bytes(&mut bytes);
            let shift = rng.next_u32() % 256;
            let value = Uint256::from_le_bytes(bytes).overflowing_shr(shift).0;
            let compact = CompactTarget::from_target(value);
            let decoded = compact.decode();
            assert!(!decoded.negative && !decoded.overflow, "{compact} from {value:x}");

            // Up to 23 significant bits survive exactly. Wider values keep the bits of their leading byte plus
            // two more bytes, which is 16 when a full leading byte has to move out of the sign bit.
            let bits = value.bits();
            let kept = if bits <= 23 { bits } else { 16 + bits % 8 };
            let dropped = bits - kept;
            assert_eq!(decoded.value, (value >> dropped) << dropped, "{compact} from {value:x}");
            if bits > 23 {
                assert_eq!(32 - compact.mantissa().leading_zeros(), kept, "{compact} from {value:x}");
            }
            assert_eq!(CompactTarget::from_target(decoded.value), compact);
        }
    }

    #[test]
    fn test_full_mantissa_round_trips_exactly() {
        // 23 significant bits at every byte offset
        for shift in (0..=232).step_by(8) {
            let value = Uint256::from_u64(0x7f_ffff) << shift;
            let compact = CompactTarget::from_target(value);
            assert_eq!(compact.mantissa(), 0x7f_ffff);
            assert_eq!(compact.to_target(), Ok(value));
        }
    }
}
