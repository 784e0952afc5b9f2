//! Allocator-level native functions.

use oxbridge_abi::{CRustString, CRustVeci32, CRustVeci8};
use std::fmt;

/// Native function that frees a [`CRustString`].
pub type FreeStringFn = unsafe extern "C" fn(CRustString);

/// Native function that frees a [`CRustVeci8`].
pub type FreeVecI8Fn = unsafe extern "C" fn(CRustVeci8);

/// Native function that frees a [`CRustVeci32`].
pub type FreeVecI32Fn = unsafe extern "C" fn(CRustVeci32);

/// The native library's free functions for values it hands to the host.
///
/// Whoever links the native library fills this table. Every
/// consume-then-free bridge takes one, so a value is always returned to
/// the allocator that produced it.
#[derive(Clone, Copy)]
pub struct NativeRuntime {
    free_string: FreeStringFn,
    free_vec_i8: FreeVecI8Fn,
    free_vec_i32: FreeVecI32Fn,
}

impl NativeRuntime {
    /// Creates a runtime from the native free functions.
    pub const fn new(
        free_string: FreeStringFn,
        free_vec_i8: FreeVecI8Fn,
        free_vec_i32: FreeVecI32Fn,
    ) -> Self {
        Self {
            free_string,
            free_vec_i8,
            free_vec_i32,
        }
    }

    /// Returns a string to the native allocator.
    ///
    /// # Safety
    ///
    /// `s` must have been produced by this runtime's library and must not
    /// be read afterwards.
    pub(crate) unsafe fn free_string(&self, s: CRustString) {
        tracing::trace!(len = s.len, "freeing native string");
        (self.free_string)(s);
    }

    /// Returns a byte vector to the native allocator.
    ///
    /// # Safety
    ///
    /// Same contract as [`NativeRuntime::free_string`].
    pub(crate) unsafe fn free_vec_i8(&self, v: CRustVeci8) {
        tracing::trace!(len = v.len, "freeing native byte vector");
        (self.free_vec_i8)(v);
    }

    /// Returns an `i32` vector to the native allocator.
    ///
    /// # Safety
    ///
    /// Same contract as [`NativeRuntime::free_string`].
    pub(crate) unsafe fn free_vec_i32(&self, v: CRustVeci32) {
        tracing::trace!(len = v.len, "freeing native i32 vector");
        (self.free_vec_i32)(v);
    }
}

impl fmt::Debug for NativeRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeRuntime")
            .field("free_string", &(self.free_string as *const ()))
            .field("free_vec_i8", &(self.free_vec_i8 as *const ()))
            .field("free_vec_i32", &(self.free_vec_i32 as *const ()))
            .finish()
    }
}
