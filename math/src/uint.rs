#[doc(hidden)]
pub use {faster_hex, serde};

/// Declares a fixed-width, little-endian, unsigned big integer made of `$n_words` u64 limbs.
///
/// Arithmetic operators follow the primitive integer conventions: `+`, `-`, `*` and `<<`
/// debug-assert on overflow, division truncates. Consensus code which must never wrap
/// should call the `overflowing_*` variants or widen to a larger type first.
#[macro_export]
macro_rules! construct_uint {
    ($name:ident, $n_words:literal $(, $derive_trait:ty)*) => {
        /// Little-endian large integer type
        #[derive(Copy, Clone, PartialEq, Eq, Hash, Debug$(, $derive_trait )*)]
        pub struct $name(pub [u64; $n_words]);

        #[allow(unused)]
        impl $name {
            pub const ZERO: Self = $name([0; $n_words]);
            pub const MAX: Self = $name([u64::MAX; $n_words]);
            pub const BITS: u32 = $n_words * u64::BITS;
            pub const BYTES: usize = $n_words * core::mem::size_of::<u64>();
            pub const LIMBS: usize = $n_words;

            #[inline]
            pub const fn from_u64(n: u64) -> Self {
                let mut ret = Self::ZERO;
                ret.0[0] = n;
                ret
            }

            #[inline]
            pub fn from_u128(n: u128) -> Self {
                let mut ret = Self::ZERO;
                ret.0[0] = n as u64;
                ret.0[1] = (n >> 64) as u64;
                ret
            }

            /// Returns the lowest limb, truncating anything above it
            #[inline]
            pub fn as_u64(self) -> u64 {
                self.0[0]
            }

            #[inline(always)]
            pub fn is_zero(self) -> bool {
                self.0.iter().all(|&limb| limb == 0)
            }

            /// Number of significant bits, i.e. the position of the highest set bit plus one
            #[inline]
            pub fn bits(&self) -> u32 {
                match self.0.iter().rposition(|&limb| limb != 0) {
                    Some(i) => u64::BITS * (i as u32 + 1) - self.0[i].leading_zeros(),
                    None => 0,
                }
            }

            /// Shifts left, dropping bits pushed past the top. A shift of `BITS` or more yields zero
            /// and reports the overflow flag.
            #[inline]
            pub fn overflowing_shl(self, s: u32) -> (Self, bool) {
                if s >= Self::BITS {
                    return (Self::ZERO, true);
                }
                let mut ret = [0u64; $n_words];
                let word_shift = (s / 64) as usize;
                let bit_shift = s % 64;
                for i in word_shift..$n_words {
                    ret[i] = self.0[i - word_shift] << bit_shift;
                    if bit_shift > 0 && i > word_shift {
                        ret[i] |= self.0[i - word_shift - 1] >> (64 - bit_shift);
                    }
                }
                (Self(ret), false)
            }

            #[inline]
            pub fn wrapping_shl(self, s: u32) -> Self {
                self.overflowing_shl(s).0
            }

            /// Shifts right. A shift of `BITS` or more yields zero and reports the overflow flag.
            #[inline]
            pub fn overflowing_shr(self, s: u32) -> (Self, bool) {
                if s >= Self::BITS {
                    return (Self::ZERO, true);
                }
                let mut ret = [0u64; $n_words];
                let word_shift = (s / 64) as usize;
                let bit_shift = s % 64;
                for i in word_shift..$n_words {
                    ret[i - word_shift] = self.0[i] >> bit_shift;
                    if bit_shift > 0 && i + 1 < $n_words {
                        ret[i - word_shift] |= self.0[i + 1] << (64 - bit_shift);
                    }
                }
                (Self(ret), false)
            }

            #[inline]
            pub fn overflowing_add(mut self, other: Self) -> (Self, bool) {
                let mut carry = false;
                for i in 0..Self::LIMBS {
                    let (sum, c1) = self.0[i].overflowing_add(other.0[i]);
                    let (sum, c2) = sum.overflowing_add(carry as u64);
                    self.0[i] = sum;
                    carry = c1 | c2;
                }
                (self, carry)
            }

            #[inline]
            pub fn overflowing_add_u64(self, other: u64) -> (Self, bool) {
                self.overflowing_add(Self::from_u64(other))
            }

            #[inline]
            pub fn overflowing_sub(mut self, other: Self) -> (Self, bool) {
                let mut borrow = false;
                for i in 0..Self::LIMBS {
                    let (diff, b1) = self.0[i].overflowing_sub(other.0[i]);
                    let (diff, b2) = diff.overflowing_sub(borrow as u64);
                    self.0[i] = diff;
                    borrow = b1 | b2;
                }
                (self, borrow)
            }

            /// Multiplies by a single limb, returning the truncated product and the limb carried out of the top
            #[inline]
            pub fn carrying_mul_u64(mut self, other: u64) -> (Self, u64) {
                let mut carry: u128 = 0;
                for limb in self.0.iter_mut() {
                    let n = carry + (other as u128) * (*limb as u128);
                    *limb = n as u64;
                    carry = n >> 64;
                }
                (self, carry as u64)
            }

            #[inline]
            pub fn overflowing_mul_u64(self, other: u64) -> (Self, bool) {
                let (product, carry) = self.carrying_mul_u64(other);
                (product, carry != 0)
            }

            /// Schoolbook multiplication, truncated to `$n_words` limbs
            #[inline]
            pub fn overflowing_mul(self, other: Self) -> (Self, bool) {
                let mut result = Self::ZERO;
                let mut overflow = false;
                for j in 0..Self::LIMBS {
                    let mut carry: u64 = 0;
                    for i in 0..Self::LIMBS - j {
                        let n = (self.0[i] as u128) * (other.0[j] as u128) + (result.0[i + j] as u128) + (carry as u128);
                        result.0[i + j] = n as u64;
                        carry = (n >> 64) as u64;
                    }
                    if carry != 0 {
                        overflow = true;
                    }
                    // Any non-zero partial product landing above the top limb is lost as well
                    if other.0[j] != 0 && self.0[Self::LIMBS - j..].iter().any(|&limb| limb != 0) {
                        overflow = true;
                    }
                }
                (result, overflow)
            }

            #[inline]
            pub fn div_rem_u64(mut self, other: u64) -> (Self, u64) {
                assert_ne!(other, 0, "attempted to divide {} by zero", self);
                let mut rem = 0u64;
                for limb in self.0.iter_mut().rev() {
                    let n = (rem as u128) << 64 | (*limb as u128);
                    *limb = (n / other as u128) as u64;
                    rem = (n % other as u128) as u64;
                }
                (self, rem)
            }

            /// Truncating long division, returns `(quotient, remainder)`
            #[inline]
            pub fn div_rem(self, other: Self) -> (Self, Self) {
                let divisor_bits = other.bits();
                assert_ne!(divisor_bits, 0, "attempted to divide {} by zero", self);

                let mut quotient = [0u64; $n_words];
                let mut remainder = self;
                let dividend_bits = self.bits();
                if dividend_bits < divisor_bits {
                    return (Self(quotient), remainder);
                }

                let mut shift = dividend_bits - divisor_bits;
                let mut shifted = other.wrapping_shl(shift);
                loop {
                    if remainder >= shifted {
                        remainder = remainder.overflowing_sub(shifted).0;
                        quotient[(shift / 64) as usize] |= 1 << (shift % 64);
                    }
                    if shift == 0 {
                        break;
                    }
                    shifted = shifted.overflowing_shr(1).0;
                    shift -= 1;
                }
                (Self(quotient), remainder)
            }

            #[inline]
            pub fn from_le_bytes(bytes: [u8; $n_words * 8]) -> Self {
                let mut out = [0u64; $n_words];
                for (limb, chunk) in out.iter_mut().zip(bytes.chunks_exact(8)) {
                    let mut word = [0u8; 8];
                    word.copy_from_slice(chunk);
                    *limb = u64::from_le_bytes(word);
                }
                Self(out)
            }

            #[inline]
            pub fn from_be_bytes(bytes: [u8; $n_words * 8]) -> Self {
                let mut out = [0u64; $n_words];
                for (limb, chunk) in out.iter_mut().rev().zip(bytes.chunks_exact(8)) {
                    let mut word = [0u8; 8];
                    word.copy_from_slice(chunk);
                    *limb = u64::from_be_bytes(word);
                }
                Self(out)
            }

            #[inline]
            pub fn to_le_bytes(self) -> [u8; $n_words * 8] {
                let mut out = [0u8; $n_words * 8];
                for (chunk, limb) in out.chunks_exact_mut(8).zip(self.0) {
                    chunk.copy_from_slice(&limb.to_le_bytes());
                }
                out
            }

            #[inline]
            pub fn to_be_bytes(self) -> [u8; $n_words * 8] {
                let mut out = [0u8; $n_words * 8];
                for (chunk, limb) in out.chunks_exact_mut(8).zip(self.0.into_iter().rev()) {
                    chunk.copy_from_slice(&limb.to_be_bytes());
                }
                out
            }

            /// Lossy conversion to a float, used for reporting only (never in consensus paths)
            #[inline]
            pub fn as_f64(&self) -> f64 {
                self.0.iter().rev().fold(0f64, |acc, &limb| acc * 18446744073709551616.0 + limb as f64)
            }

            /// Parses a big endian hex string of up to `BYTES * 2` digits
            #[inline]
            pub fn from_hex(hex: &str) -> Result<Self, $crate::uint::faster_hex::Error> {
                if hex.len() > Self::BYTES * 2 {
                    return Err($crate::uint::faster_hex::Error::InvalidLength(hex.len()));
                }
                let mut input = [b'0'; $n_words * 16];
                let start = input.len() - hex.len();
                input[start..].copy_from_slice(hex.as_bytes());
                let mut out = [0u8; $n_words * 8];
                $crate::uint::faster_hex::hex_decode(&input, &mut out)?;
                Ok(Self::from_be_bytes(out))
            }
        }

        impl PartialEq<u64> for $name {
            #[inline]
            fn eq(&self, other: &u64) -> bool {
                self.0[1..].iter().all(|&limb| limb == 0) && self.0[0] == *other
            }
        }

        impl PartialOrd<u64> for $name {
            #[inline]
            fn partial_cmp(&self, other: &u64) -> Option<core::cmp::Ordering> {
                if self.0[1..].iter().any(|&limb| limb != 0) {
                    Some(core::cmp::Ordering::Greater)
                } else {
                    self.0[0].partial_cmp(other)
                }
            }
        }

        impl PartialOrd for $name {
            #[inline]
            fn partial_cmp(&self, other: &$name) -> Option<core::cmp::Ordering> {
                Some(self.cmp(other))
            }
        }

        impl Ord for $name {
            #[inline]
            fn cmp(&self, other: &$name) -> core::cmp::Ordering {
                // Limbs are little-endian, so compare from the most significant one down
                Iterator::cmp(self.0.iter().rev(), other.0.iter().rev())
            }
        }

        impl core::ops::Add<$name> for $name {
            type Output = $name;
            #[inline]
            #[track_caller]
            fn add(self, other: $name) -> $name {
                let (sum, carry) = self.overflowing_add(other);
                debug_assert!(!carry, "attempt to add with overflow");
                sum
            }
        }

        impl core::ops::Add<u64> for $name {
            type Output = $name;
            #[inline]
            #[track_caller]
            fn add(self, other: u64) -> $name {
                let (sum, carry) = self.overflowing_add_u64(other);
                debug_assert!(!carry, "attempt to add with overflow");
                sum
            }
        }

        impl core::ops::Sub<$name> for $name {
            type Output = $name;
            #[inline]
            #[track_caller]
            fn sub(self, other: $name) -> $name {
                let (diff, borrow) = self.overflowing_sub(other);
                debug_assert!(!borrow, "attempt to subtract with overflow");
                diff
            }
        }

        impl core::ops::Mul<$name> for $name {
            type Output = $name;
            #[inline]
            #[track_caller]
            fn mul(self, other: $name) -> $name {
                let (product, carry) = self.overflowing_mul(other);
                debug_assert!(!carry, "attempt to multiply with overflow");
                product
            }
        }

        impl core::ops::Mul<u64> for $name {
            type Output = $name;
            #[inline]
            #[track_caller]
            fn mul(self, other: u64) -> $name {
                let (product, carry) = self.overflowing_mul_u64(other);
                debug_assert!(!carry, "attempt to multiply with overflow");
                product
            }
        }

        impl core::ops::Div<$name> for $name {
            type Output = $name;
            #[inline]
            fn div(self, other: $name) -> $name {
                self.div_rem(other).0
            }
        }

        impl core::ops::Rem<$name> for $name {
            type Output = $name;
            #[inline]
            fn rem(self, other: $name) -> $name {
                self.div_rem(other).1
            }
        }

        impl core::ops::Div<u64> for $name {
            type Output = $name;
            #[inline]
            fn div(self, other: u64) -> $name {
                self.div_rem_u64(other).0
            }
        }

        impl core::ops::Rem<u64> for $name {
            type Output = u64;
            #[inline]
            fn rem(self, other: u64) -> u64 {
                self.div_rem_u64(other).1
            }
        }

        impl core::ops::Not for $name {
            type Output = $name;
            #[inline]
            fn not(mut self) -> $name {
                self.0.iter_mut().for_each(|limb| *limb = !*limb);
                self
            }
        }

        impl core::ops::Shl<u32> for $name {
            type Output = $name;
            #[inline]
            #[track_caller]
            fn shl(self, shift: u32) -> $name {
                let (res, overflow) = self.overflowing_shl(shift);
                debug_assert!(!overflow, "attempt to shift left with overflow");
                res
            }
        }

        impl core::ops::Shr<u32> for $name {
            type Output = $name;
            #[inline]
            #[track_caller]
            fn shr(self, shift: u32) -> $name {
                let (res, overflow) = self.overflowing_shr(shift);
                debug_assert!(!overflow, "attempt to shift right with overflow");
                res
            }
        }

        impl Default for $name {
            #[inline]
            fn default() -> Self {
                Self::ZERO
            }
        }

        impl From<u64> for $name {
            #[inline]
            fn from(x: u64) -> Self {
                Self::from_u64(x)
            }
        }

        impl core::fmt::LowerHex for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
                let mut hex = [0u8; $n_words * 16];
                $crate::uint::faster_hex::hex_encode(&self.to_be_bytes(), &mut hex).map_err(|_| core::fmt::Error)?;
                let first_non_zero = hex.iter().position(|&x| x != b'0').unwrap_or(hex.len() - 1);
                let digits = core::str::from_utf8(&hex[first_non_zero..]).map_err(|_| core::fmt::Error)?;
                f.pad_integral(true, "0x", digits)
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
                // 2^64 - 1 has 20 decimal digits, so 20 per limb is always enough
                let mut buf = [0u8; $n_words * 20];
                let mut curr = buf.len();
                let mut n = *self;
                loop {
                    let (quotient, digit) = n.div_rem_u64(10);
                    curr -= 1;
                    buf[curr] = b'0' + digit as u8;
                    n = quotient;
                    if n.is_zero() {
                        break;
                    }
                }
                let digits = core::str::from_utf8(&buf[curr..]).map_err(|_| core::fmt::Error)?;
                f.pad_integral(true, "", digits)
            }
        }

        // Human readable formats get a big endian hex string, binary formats the raw limbs
        impl $crate::uint::serde::Serialize for $name {
            fn serialize<S: $crate::uint::serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                if serializer.is_human_readable() {
                    serializer.collect_str(&format_args!("{:0width$x}", self, width = Self::BYTES * 2))
                } else {
                    use $crate::uint::serde::ser::SerializeTuple;
                    let mut seq = serializer.serialize_tuple(Self::LIMBS)?;
                    for limb in &self.0 {
                        seq.serialize_element(limb)?;
                    }
                    seq.end()
                }
            }
        }

        impl<'de> $crate::uint::serde::Deserialize<'de> for $name {
            fn deserialize<D: $crate::uint::serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                use $crate::uint::serde::de::Error;
                if deserializer.is_human_readable() {
                    let hex = <std::string::String as $crate::uint::serde::Deserialize>::deserialize(deserializer)?;
                    Self::from_hex(hex.trim_start_matches("0x")).map_err(Error::custom)
                } else {
                    let limbs = <[u64; $n_words] as $crate::uint::serde::Deserialize>::deserialize(deserializer)?;
                    Ok(Self(limbs))
                }
            }
        }
    };
}

/// The error type returned when a checked integral type conversion fails.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TryFromIntError;

impl std::error::Error for TryFromIntError {}

impl core::fmt::Display for TryFromIntError {
    fn fmt(&self, fmt: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        "out of range integral type conversion attempted".fmt(fmt)
    }
}

#[cfg(test)]
mod tests {
    use rand_chacha::{
        rand_core::{RngCore, SeedableRng},
        ChaCha8Rng,
    };
    construct_uint!(Uint128, 2);

    fn assert_same(mine: Uint128, native: u128) {
        assert_eq!(mine.to_le_bytes(), native.to_le_bytes());
    }

    #[test]
    fn test_against_native_u128() {
        let mut rng = ChaCha8Rng::from_seed([7; 32]);
        let mut buf = [0u8; 16];
        for i in 0..50_000 {
            rng.fill_bytes(&mut buf);
            // Exercise short operands too, so that division early-returns and small shifts are covered
            let width = (i % 16) + 1;
            buf[width..].iter_mut().for_each(|b| *b = 0);
            let (a, native_a) = (Uint128::from_le_bytes(buf), u128::from_le_bytes(buf));
            rng.fill_bytes(&mut buf);
            let (b, native_b) = (Uint128::from_le_bytes(buf), u128::from_le_bytes(buf));

            let (sum, carry) = a.overflowing_add(b);
            let (native_sum, native_carry) = native_a.overflowing_add(native_b);
            assert_same(sum, native_sum);
            assert_eq!(carry, native_carry);

            let (diff, borrow) = a.overflowing_sub(b);
            let (native_diff, native_borrow) = native_a.overflowing_sub(native_b);
            assert_same(diff, native_diff);
            assert_eq!(borrow, native_borrow);

            let (product, overflow) = a.overflowing_mul(b);
            let (native_product, native_overflow) = native_a.overflowing_mul(native_b);
            assert_same(product, native_product);
            assert_eq!(overflow, native_overflow, "{native_a} * {native_b}");

            let small = rng.next_u64();
            let (product, overflow) = a.overflowing_mul_u64(small);
            let (native_product, native_overflow) = native_a.overflowing_mul(small as u128);
            assert_same(product, native_product);
            assert_eq!(overflow, native_overflow);

            if native_b != 0 {
                let (q, r) = a.div_rem(b);
                assert_same(q, native_a / native_b);
                assert_same(r, native_a % native_b);
            }
            if small != 0 {
                let (q, r) = a.div_rem_u64(small);
                assert_same(q, native_a / small as u128);
                assert_eq!(r as u128, native_a % small as u128);
            }

            let shift = rng.next_u32() % 160;
            assert_same(a.wrapping_shl(shift), native_a.checked_shl(shift).unwrap_or(0));
            assert_same(a.overflowing_shr(shift).0, native_a.checked_shr(shift).unwrap_or(0));

            assert_same(!a, !native_a);
            assert_eq!(a.cmp(&b), native_a.cmp(&native_b));
            assert_eq!(a.bits(), 128 - native_a.leading_zeros());
            assert_eq!(Uint128::from_be_bytes(a.to_be_bytes()), a);
        }
    }

    #[test]
    fn test_formatting() {
        let n = Uint128::from_u128(0x1234_5678_9abc_def0_0fed_cba9_8765_4321);
        assert_eq!(format!("{n}"), format!("{}", 0x1234_5678_9abc_def0_0fed_cba9_8765_4321u128));
        assert_eq!(format!("{n:x}"), "123456789abcdef00fedcba987654321");
        assert_eq!(format!("{:#x}", Uint128::ZERO), "0x0");
        assert_eq!(format!("{}", Uint128::ZERO), "0");
        assert_eq!(Uint128::from_hex("123456789abcdef00fedcba987654321").unwrap(), n);
        assert!(Uint128::from_hex(&"f".repeat(33)).is_err());
    }

    #[test]
    fn test_large_shifts_are_zero() {
        let n = Uint128::MAX;
        assert_eq!(n.overflowing_shl(128), (Uint128::ZERO, true));
        assert_eq!(n.overflowing_shl(4096), (Uint128::ZERO, true));
        assert_eq!(n.overflowing_shr(200), (Uint128::ZERO, true));
    }
}
