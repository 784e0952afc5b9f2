//! Byte-slice bridge.

use crate::runtime::NativeRuntime;
use oxbridge_abi::{CRustSlicei8, CRustVeci32, CRustVeci8};

/// Views host bytes as a native `i8` slice for the duration of one call.
///
/// Pure bit-pattern reinterpretation: `0xff` is seen as `-1`.
pub fn to_native_slice(bytes: &[u8]) -> CRustSlicei8<'_> {
    CRustSlicei8::from_bytes(bytes)
}

/// Copies a native byte vector into host memory and frees it.
///
/// # Safety
///
/// `v` must have been produced by the library behind `runtime`, and
/// `v.data` must point to `v.len` readable bytes.
pub unsafe fn from_native_owned(runtime: &NativeRuntime, v: CRustVeci8) -> Vec<u8> {
    let bytes = v.as_bytes().to_vec();
    runtime.free_vec_i8(v);
    bytes
}

/// Copies a byte slice that stays owned by the native side.
///
/// Nothing is freed; the slice usually points into a live handle.
///
/// # Safety
///
/// `slice.data` must point to `slice.len` readable bytes.
pub unsafe fn copy_slice(slice: CRustSlicei8<'_>) -> Vec<u8> {
    slice.as_bytes().to_vec()
}

/// Copies a native `i32` vector as `u32`s and frees it.
///
/// Each element keeps its bit pattern (`-1` becomes `u32::MAX`).
///
/// # Safety
///
/// Same contract as [`from_native_owned`].
pub unsafe fn take_u32s(runtime: &NativeRuntime, v: CRustVeci32) -> Vec<u32> {
    let values = v.as_slice().iter().map(|&x| x as u32).collect();
    runtime.free_vec_i32(v);
    values
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;
    use proptest::prelude::*;

    /// Hands the viewed bytes to the test allocator as if native code made them.
    fn as_owned(slice: CRustSlicei8<'_>) -> CRustVeci8 {
        CRustVeci8::from_vec(unsafe { slice.as_bytes() }.to_vec())
    }

    #[test]
    fn slice_views_host_memory() {
        let bytes = vec![39u8, 77, 111, 111, 102, 33, 39, 0];
        let slice = to_native_slice(&bytes);
        assert_eq!(slice.data.cast::<u8>(), bytes.as_ptr());
        assert_eq!(slice.len, bytes.len());
    }

    #[test]
    fn owned_bytes_freed_once() {
        let runtime = testing::runtime();
        let before = testing::bytes_freed();

        let bytes = unsafe { from_native_owned(&runtime, CRustVeci8::from_vec(vec![0x80, 0xff, 1])) };

        assert_eq!(bytes, vec![0x80, 0xff, 1]);
        assert_eq!(testing::bytes_freed(), before + 1);
    }

    #[test]
    fn owned_empty_bytes() {
        let runtime = testing::runtime();
        let before = testing::bytes_freed();

        let bytes = unsafe { from_native_owned(&runtime, CRustVeci8::from_vec(Vec::new())) };

        assert!(bytes.is_empty());
        assert_eq!(testing::bytes_freed(), before + 1);
    }

    #[test]
    fn copy_slice_does_not_free() {
        let before = testing::bytes_freed();
        let backing = [5u8, 6, 7];
        let copied = unsafe { copy_slice(to_native_slice(&backing)) };

        assert_eq!(copied, backing);
        assert_eq!(testing::bytes_freed(), before);
    }

    #[test]
    fn i32_tokens_reinterpret_as_u32() {
        let runtime = testing::runtime();
        let before = testing::i32s_freed();

        let tokens = unsafe { take_u32s(&runtime, CRustVeci32::from_vec(vec![39, -1, i32::MIN, 0])) };

        assert_eq!(tokens, vec![39, u32::MAX, 0x8000_0000, 0]);
        assert_eq!(testing::i32s_freed(), before + 1);
    }

    proptest! {
        #[test]
        fn byte_slice_round_trip(bytes in prop::collection::vec(any::<u8>(), 0..512)) {
            let runtime = testing::runtime();
            let owned = as_owned(to_native_slice(&bytes));
            let back = unsafe { from_native_owned(&runtime, owned) };
            prop_assert_eq!(back, bytes);
        }

        #[test]
        fn high_bytes_round_trip(bytes in prop::collection::vec(0x80u8..=0xff, 1..64)) {
            let runtime = testing::runtime();
            let owned = as_owned(to_native_slice(&bytes));
            let back = unsafe { from_native_owned(&runtime, owned) };
            prop_assert_eq!(back, bytes);
        }
    }
}
