//! Tagged union for fallible native calls.

use crate::option::CRustOption;
use crate::string::CRustString;
use crate::types::RawHandle;
use crate::vec::{CRustForeignVec, CRustVeci32};
use std::fmt;
use std::mem::ManuallyDrop;

/// Payload of a [`CRustResult`]. Exactly one arm is initialized.
#[repr(C)]
pub union CRustResultUnion<T> {
    /// Success value, valid when `is_ok` is non-zero.
    pub ok: ManuallyDrop<T>,
    /// Native error message, valid when `is_ok` is zero.
    pub err: ManuallyDrop<CRustString>,
}

/// Outcome of a fallible native call.
#[repr(C)]
pub struct CRustResult<T> {
    /// Payload.
    pub data: CRustResultUnion<T>,
    /// Success flag.
    pub is_ok: u8,
}

/// Result carrying an opaque handle.
pub type CRustResultHandle = CRustResult<*mut RawHandle>;

/// Result carrying a foreign vector.
pub type CRustResultForeignVec = CRustResult<CRustForeignVec>;

/// Result carrying an optional opaque handle.
pub type CRustResultOptionHandle = CRustResult<CRustOption<*mut RawHandle>>;

/// Result carrying a native `i32` vector.
pub type CRustResultVeci32 = CRustResult<CRustVeci32>;

impl<T> CRustResult<T> {
    /// Creates a success result.
    pub fn ok(value: T) -> Self {
        Self {
            data: CRustResultUnion {
                ok: ManuallyDrop::new(value),
            },
            is_ok: 1,
        }
    }

    /// Creates a failure result carrying a native error string.
    pub fn err(message: CRustString) -> Self {
        Self {
            data: CRustResultUnion {
                err: ManuallyDrop::new(message),
            },
            is_ok: 0,
        }
    }

    /// Returns true if the success flag is set.
    pub fn is_ok(&self) -> bool {
        self.is_ok != 0
    }
}

impl<T> fmt::Debug for CRustResult<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CRustResult")
            .field("is_ok", &self.is_ok)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ok_sets_flag() {
        let result = CRustResult::ok(7usize);
        assert!(result.is_ok());
        assert_eq!(unsafe { *result.data.ok }, 7);
    }

    #[test]
    fn err_clears_flag() {
        let result: CRustResult<usize> = CRustResult::err(CRustString::from_vec(b"boom".to_vec()));
        assert!(!result.is_ok());

        let message = unsafe { ManuallyDrop::into_inner(result.data.err) };
        assert_eq!(unsafe { message.into_vec() }, b"boom");
    }
}
