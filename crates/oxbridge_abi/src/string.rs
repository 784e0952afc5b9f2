//! String types for FFI.

use std::ffi::c_char;
use std::marker::PhantomData;

/// A borrowed UTF-8 string view passed into native calls.
///
/// The bytes at `data` are followed by a null terminator that is not
/// counted in `len`. The view borrows host memory for `'a`.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct CRustStrView<'a> {
    /// Pointer to UTF-8 bytes.
    pub data: *const c_char,
    /// Length in bytes (not including the null terminator).
    pub len: usize,
    _marker: PhantomData<&'a [u8]>,
}

impl<'a> CRustStrView<'a> {
    /// Creates a view over a buffer that ends with a null terminator.
    ///
    /// Returns `None` if `buf` is empty or its last byte is not `0`.
    pub fn from_nul_terminated(buf: &'a [u8]) -> Option<Self> {
        match buf.split_last() {
            Some((0, body)) => Some(Self {
                data: buf.as_ptr().cast(),
                len: body.len(),
                _marker: PhantomData,
            }),
            _ => None,
        }
    }

    /// Creates a view from raw parts.
    ///
    /// # Safety
    ///
    /// `data` must point to `len` readable bytes followed by a null
    /// terminator, all valid for `'a`.
    pub unsafe fn from_raw_parts(data: *const c_char, len: usize) -> Self {
        Self {
            data,
            len,
            _marker: PhantomData,
        }
    }

    /// Returns the viewed bytes, without the terminator.
    ///
    /// # Safety
    ///
    /// `data` must point to at least `len` readable bytes for `'a`.
    pub unsafe fn as_bytes(&self) -> &'a [u8] {
        if self.data.is_null() || self.len == 0 {
            return &[];
        }
        std::slice::from_raw_parts(self.data.cast(), self.len)
    }
}

/// A native-allocated UTF-8 string.
///
/// Memory is owned by the native library. It must be copied out and then
/// handed back to the native free function exactly once. This type is
/// deliberately neither `Copy` nor `Clone`.
#[repr(C)]
#[derive(Debug)]
pub struct CRustString {
    /// Pointer to UTF-8 bytes.
    pub data: *const c_char,
    /// Length in bytes.
    pub len: usize,
    /// Capacity of the allocation (for the native allocator).
    pub capacity: usize,
}

impl CRustString {
    /// Creates a string the way the native side allocates one.
    pub fn from_vec(vec: Vec<u8>) -> Self {
        let mut vec = std::mem::ManuallyDrop::new(vec);
        Self {
            data: vec.as_mut_ptr().cast(),
            len: vec.len(),
            capacity: vec.capacity(),
        }
    }

    /// Creates an empty string.
    pub fn empty() -> Self {
        Self {
            data: std::ptr::null(),
            len: 0,
            capacity: 0,
        }
    }

    /// Returns true if the string is null.
    pub fn is_null(&self) -> bool {
        self.data.is_null()
    }

    /// Returns the string bytes.
    ///
    /// # Safety
    ///
    /// `data` must point to at least `len` readable bytes.
    pub unsafe fn as_bytes(&self) -> &[u8] {
        if self.data.is_null() || self.len == 0 {
            return &[];
        }
        std::slice::from_raw_parts(self.data.cast(), self.len)
    }

    /// Converts back to a Vec, consuming the string.
    ///
    /// # Safety
    ///
    /// The string must have been created by [`CRustString::from_vec`].
    pub unsafe fn into_vec(self) -> Vec<u8> {
        if self.data.is_null() {
            return Vec::new();
        }
        Vec::from_raw_parts(self.data.cast_mut().cast(), self.len, self.capacity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_excludes_terminator() {
        let buf = b"hello\0";
        let view = CRustStrView::from_nul_terminated(buf).unwrap();
        assert_eq!(view.len, 5);
        // Safety: borrowed from `buf`
        assert_eq!(unsafe { view.as_bytes() }, b"hello");
    }

    #[test]
    fn view_requires_terminator() {
        assert!(CRustStrView::from_nul_terminated(b"hello").is_none());
        assert!(CRustStrView::from_nul_terminated(b"").is_none());
    }

    #[test]
    fn view_of_empty_string() {
        let view = CRustStrView::from_nul_terminated(b"\0").unwrap();
        assert_eq!(view.len, 0);
        assert!(unsafe { view.as_bytes() }.is_empty());
    }

    #[test]
    fn string_from_vec() {
        let string = CRustString::from_vec(b"native".to_vec());
        assert!(!string.is_null());
        assert_eq!(string.len, 6);
        assert_eq!(unsafe { string.as_bytes() }, b"native");

        // Safety: we just created it
        let back = unsafe { string.into_vec() };
        assert_eq!(back, b"native");
    }

    #[test]
    fn string_empty() {
        let string = CRustString::empty();
        assert!(string.is_null());
        assert!(unsafe { string.as_bytes() }.is_empty());
        assert!(unsafe { string.into_vec() }.is_empty());
    }
}
