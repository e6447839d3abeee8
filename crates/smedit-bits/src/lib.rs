//! Fixed-width bit field helpers for packed block words.
#![forbid(unsafe_code)]

/// All-ones mask of `length` bits. `length` above 31 saturates to a full mask.
#[inline]
pub const fn mask(length: u32) -> u32 {
    if length >= 32 {
        u32::MAX
    } else {
        (1u32 << length) - 1
    }
}

/// Extracts the `length`-bit field of `value` starting at bit `start`.
///
/// Callers guarantee `start + length <= 32`; no range validation happens here.
#[inline]
pub const fn extract(value: u32, start: u32, length: u32) -> u32 {
    (value >> start) & mask(length)
}

/// Shifts `bits` to `start` and ORs them into `into`.
///
/// Callers guarantee `bits` fits its field and the target bits of `into`
/// are clear; this is the raw combine primitive, not a replace.
#[inline]
pub const fn combine(bits: u32, into: u32, start: u32) -> u32 {
    (bits << start) | into
}

/// Returns `value` with the `length`-bit field at `start` replaced by `bits`.
#[inline]
pub const fn replace(value: u32, bits: u32, start: u32, length: u32) -> u32 {
    (value & !(mask(length) << start)) | ((bits & mask(length)) << start)
}

/// Reads the single bit at `index`.
#[inline]
pub const fn bit(value: u32, index: u32) -> bool {
    (value >> index) & 1 == 1
}

/// Returns `value` with the bit at `index` set or cleared.
#[inline]
pub const fn set_bit(value: u32, index: u32, on: bool) -> u32 {
    if on {
        value | (1u32 << index)
    } else {
        value & !(1u32 << index)
    }
}
