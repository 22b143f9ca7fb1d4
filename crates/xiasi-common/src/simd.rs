//! SIMD-accelerated byte searching.
//!
//! Thin wrappers over `memchr`, which picks AVX2/SSE2/NEON at runtime and
//! falls back to scalar code elsewhere.

/// Find the first null byte in a slice, returning its index.
#[inline]
pub fn find_null(data: &[u8]) -> Option<usize> {
    memchr::memchr(0, data)
}

/// Find the first non-zero byte in a slice.
#[inline]
pub fn find_nonzero(data: &[u8]) -> Option<usize> {
    data.iter().position(|&b| b != 0)
}
