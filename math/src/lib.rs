pub mod compact;
pub mod uint;

use borsh::{BorshDeserialize, BorshSerialize};

pub use compact::{CompactTarget, DecodedTarget, TargetError, TargetResult};
pub use uint::TryFromIntError;

construct_uint!(Uint256, 4, BorshSerialize, BorshDeserialize);
construct_uint!(Uint320, 5);

impl Uint256 {
    /// Expands compact `bits` ignoring the sign and overflow flags, see [`CompactTarget::decode`]
    #[inline]
    pub fn from_compact_target_bits(bits: u32) -> Self {
        CompactTarget(bits).decode().value
    }

    #[inline]
    pub fn compact_target_bits(self) -> u32 {
        CompactTarget::from_target(self).bits()
    }
}

impl From<Uint256> for Uint320 {
    #[inline]
    fn from(value: Uint256) -> Self {
        let mut limbs = [0u64; 5];
        limbs[..4].copy_from_slice(&value.0);
        Self(limbs)
    }
}

impl TryFrom<Uint320> for Uint256 {
    type Error = TryFromIntError;

    #[inline]
    fn try_from(value: Uint320) -> Result<Self, Self::Error> {
        if value.0[4] != 0 {
            return Err(TryFromIntError);
        }
        let mut limbs = [0u64; 4];
        limbs.copy_from_slice(&value.0[..4]);
        Ok(Self(limbs))
    }
}

impl Uint320 {
    /// Narrows back to 256 bits, saturating at `limit` (which also absorbs anything wider than 256 bits)
    #[inline]
    pub fn clamp_to(self, limit: Uint256) -> Uint256 {
        match Uint256::try_from(self) {
            Ok(value) if value <= limit => value,
            _ => limit,
        }
    }
}
