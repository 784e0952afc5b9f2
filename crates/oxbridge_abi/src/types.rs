//! Opaque handle types.

use std::ffi::c_void;

/// Pointee of every opaque native handle.
///
/// The layout is only known to the native library. Never dereference.
pub type RawHandle = c_void;

/// Entity-specific native delete function.
///
/// Every native entity type exports its own; passing a handle to the
/// wrong one is undefined behaviour on the native side.
pub type ReleaseFn = unsafe extern "C" fn(*mut RawHandle);
