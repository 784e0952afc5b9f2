//! String bridge.
//!
//! Host strings go down as null-terminated views over host-owned buffers;
//! native strings come back as [`CRustString`]s that are copied, decoded
//! and freed in one step.

use crate::runtime::NativeRuntime;
use oxbridge_abi::{CRustStrView, CRustString};
use std::fmt;

/// A host-owned, null-terminated copy of a string for one native call.
///
/// The buffer holds the UTF-8 bytes plus a trailing `0`. Views borrow it,
/// so it cannot be dropped while a view is still in use.
pub struct NativeStr {
    buf: Box<[u8]>,
}

impl NativeStr {
    /// Copies `s` into a fresh null-terminated buffer.
    pub fn new(s: &str) -> Self {
        let mut buf = Vec::with_capacity(s.len() + 1);
        buf.extend_from_slice(s.as_bytes());
        buf.push(0);
        Self {
            buf: buf.into_boxed_slice(),
        }
    }

    /// Returns a view for passing to a native call.
    pub fn view(&self) -> CRustStrView<'_> {
        // Safety: `buf` always ends with the terminator pushed in `new`,
        // and the view's lifetime is tied to `self`.
        unsafe { CRustStrView::from_raw_parts(self.buf.as_ptr().cast(), self.len()) }
    }

    /// Length in bytes, without the terminator.
    pub fn len(&self) -> usize {
        self.buf.len() - 1
    }

    /// Returns true if the string is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The UTF-8 bytes, without the terminator.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len()]
    }

    /// The UTF-8 bytes followed by the terminator.
    pub fn as_bytes_with_nul(&self) -> &[u8] {
        &self.buf
    }
}

impl fmt::Debug for NativeStr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NativeStr")
            .field(&String::from_utf8_lossy(self.as_bytes()))
            .finish()
    }
}

/// Converts a host string for a native call.
pub fn to_native(s: &str) -> NativeStr {
    NativeStr::new(s)
}

/// Copies a native string into a host `String` and frees it.
///
/// If the bytes are not valid UTF-8, `fallback` is returned instead. The
/// native string is freed exactly once either way.
///
/// # Safety
///
/// `s` must have been produced by the library behind `runtime`, and
/// `s.data` must point to `s.len` readable bytes.
pub unsafe fn from_native(runtime: &NativeRuntime, s: CRustString, fallback: &str) -> String {
    let bytes = s.as_bytes().to_vec();
    runtime.free_string(s);

    match String::from_utf8(bytes) {
        Ok(decoded) => decoded,
        Err(e) => {
            tracing::warn!(
                valid_up_to = e.utf8_error().valid_up_to(),
                "native string is not valid UTF-8, using fallback"
            );
            fallback.to_owned()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;
    use proptest::prelude::*;

    /// Hands a host string to the test allocator as if native code made it.
    fn as_owned(native: &NativeStr) -> CRustString {
        CRustString::from_vec(native.as_bytes().to_vec())
    }

    #[test]
    fn to_native_adds_terminator() {
        let native = to_native("hello");
        assert_eq!(native.len(), 5);
        assert_eq!(native.as_bytes_with_nul(), b"hello\0");

        let view = native.view();
        assert_eq!(view.len, 5);
        assert_eq!(unsafe { view.as_bytes() }, b"hello");
        // Terminator is present in memory right after the reported length
        assert_eq!(unsafe { *view.data.add(view.len) }, 0);
    }

    #[test]
    fn to_native_empty() {
        let native = to_native("");
        assert!(native.is_empty());
        assert_eq!(native.as_bytes_with_nul(), b"\0");
        assert_eq!(native.view().len, 0);
    }

    #[test]
    fn to_native_counts_utf8_bytes() {
        let native = to_native("ℕ⊆ℤ");
        assert_eq!(native.len(), "ℕ⊆ℤ".len());
        assert_eq!(native.len(), 9);
    }

    #[test]
    fn from_native_frees_once() {
        let runtime = testing::runtime();
        let before = testing::strings_freed();

        let s = unsafe { from_native(&runtime, testing::native_string("device"), "fallback") };

        assert_eq!(s, "device");
        assert_eq!(testing::strings_freed(), before + 1);
    }

    #[test]
    fn from_native_malformed_uses_fallback() {
        let runtime = testing::runtime();
        let before = testing::strings_freed();
        let bad = CRustString::from_vec(vec![0x66, 0x6f, 0xff, 0xfe]);

        let s = unsafe { from_native(&runtime, bad, "fallback") };

        assert_eq!(s, "fallback");
        assert_eq!(testing::strings_freed(), before + 1);
    }

    #[test]
    fn from_native_empty_string() {
        let runtime = testing::runtime();
        let before = testing::strings_freed();

        let s = unsafe { from_native(&runtime, CRustString::empty(), "fallback") };

        assert_eq!(s, "");
        assert_eq!(testing::strings_freed(), before + 1);
    }

    #[test]
    fn utf8_round_trip_math_symbols() {
        let runtime = testing::runtime();
        let original = "ℕ ⊆ ℕ₀ ⊂ ℤ ⊂ ℚ ⊂ ℝ ⊂ ℂ, ⊥ < a ≠ b ≡ c ≤ d ≪ ⊤ ⇒ (A ⇔";
        let native = to_native(original);

        let back = unsafe { from_native(&runtime, as_owned(&native), "") };
        assert_eq!(back, original);
    }

    proptest! {
        #[test]
        fn round_trip_any_unicode(s in any::<String>()) {
            let runtime = testing::runtime();
            let native = to_native(&s);
            let back = unsafe { from_native(&runtime, as_owned(&native), "fallback") };
            prop_assert_eq!(back, s);
        }

        #[test]
        fn round_trip_combining_marks(s in "[a-z\u{0300}-\u{036f}\u{1F600}-\u{1F64F}]{0,32}") {
            let runtime = testing::runtime();
            let native = to_native(&s);
            let back = unsafe { from_native(&runtime, as_owned(&native), "fallback") };
            prop_assert_eq!(back, s);
        }
    }
}
