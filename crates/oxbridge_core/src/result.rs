//! Result codec.
//!
//! Every fallible native call reports through a [`CRustResult`]. Decoding
//! branches on `is_ok` before any payload access: reading the inactive arm
//! is undefined behaviour. A failure is surfaced exactly once, never retried.

use crate::error::{CoreError, CoreResult};
use crate::foreign_vec;
use crate::handle::OpaqueHandle;
use crate::option;
use crate::runtime::NativeRuntime;
use crate::string;
use oxbridge_abi::{CRustForeignVec, CRustOption, CRustResult, RawHandle, ReleaseFn};
use std::mem::ManuallyDrop;

/// Decodes a native result.
///
/// On failure the native error string is decoded (falling back to
/// `fallback` if it is not UTF-8) and freed.
///
/// # Safety
///
/// The arm selected by `is_ok` must be initialized, and an error string
/// must have been produced by the library behind `runtime`.
pub unsafe fn decode<T>(runtime: &NativeRuntime, r: CRustResult<T>, fallback: &str) -> CoreResult<T> {
    if r.is_ok() {
        return Ok(ManuallyDrop::into_inner(r.data.ok));
    }

    let message = string::from_native(runtime, ManuallyDrop::into_inner(r.data.err), fallback);
    tracing::debug!(%message, "native call failed");
    Err(CoreError::Native { message })
}

/// Decodes a result carrying a fresh handle and takes ownership of it.
///
/// # Safety
///
/// [`decode`]'s contract, plus [`OpaqueHandle::wrap`]'s for the success
/// pointer and `release`.
pub unsafe fn decode_handle(
    runtime: &NativeRuntime,
    r: CRustResult<*mut RawHandle>,
    release: ReleaseFn,
    entity: &'static str,
    fallback: &str,
) -> CoreResult<OpaqueHandle> {
    let ptr = decode(runtime, r, fallback)?;
    OpaqueHandle::wrap(ptr, release, entity)
}

/// Decodes a result carrying "maybe a fresh handle".
///
/// # Safety
///
/// Same contract as [`decode_handle`].
pub unsafe fn decode_optional_handle(
    runtime: &NativeRuntime,
    r: CRustResult<CRustOption<*mut RawHandle>>,
    release: ReleaseFn,
    entity: &'static str,
    fallback: &str,
) -> CoreResult<Option<OpaqueHandle>> {
    let opt = decode(runtime, r, fallback)?;
    option::decode_handle(opt, release, entity)
}

/// Decodes a result carrying a foreign vector and drains it.
///
/// On failure no record is ever extracted. On success every record is
/// copied into host memory and passed to `decode_record`, in order. The
/// vector's backing buffer is not freed here.
///
/// # Safety
///
/// [`decode`]'s contract, plus [`foreign_vec::records`]' for the vector.
pub unsafe fn map_list_result<T, F>(
    runtime: &NativeRuntime,
    r: CRustResult<CRustForeignVec>,
    entity: &'static str,
    fallback: &str,
    decode_record: F,
) -> CoreResult<Vec<T>>
where
    F: FnMut(OpaqueHandle) -> T,
{
    let v = decode(runtime, r, fallback)?;
    foreign_vec::collect(v, entity, decode_record)
}

/// Runs a native validator, keeping the handle and discarding the reason.
///
/// The native error string is still freed on failure.
///
/// # Safety
///
/// Same contract as [`decode_handle`].
pub unsafe fn validate_as(
    runtime: &NativeRuntime,
    r: CRustResult<*mut RawHandle>,
    release: ReleaseFn,
    entity: &'static str,
) -> Option<OpaqueHandle> {
    decode_handle(runtime, r, release, entity, "").ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{self, boxed_handle, handles_released, release_boxed};
    use oxbridge_abi::{CRustResultUnion, CRustString};

    /// Release function that must never run.
    unsafe extern "C" fn poisoned_release(_: *mut RawHandle) {
        panic!("release called on the inactive result arm");
    }

    #[test]
    fn success_returns_value() {
        let runtime = testing::runtime();
        let value = unsafe { decode(&runtime, CRustResult::ok(41u64), "") }.unwrap();
        assert_eq!(value, 41);
    }

    #[test]
    fn failure_decodes_and_frees_message() {
        let runtime = testing::runtime();
        let before = testing::strings_freed();
        let r: CRustResult<u64> = CRustResult::err(testing::native_string("invalid user id"));

        let err = unsafe { decode(&runtime, r, "") }.unwrap_err();
        assert_eq!(err, CoreError::native("invalid user id"));
        assert_eq!(testing::strings_freed(), before + 1);
    }

    #[test]
    fn failure_with_malformed_message_uses_fallback() {
        let runtime = testing::runtime();
        let r: CRustResult<u64> = CRustResult::err(CRustString::from_vec(vec![0xc3, 0x28]));

        let err = unsafe { decode(&runtime, r, "request failed") }.unwrap_err();
        assert_eq!(err.native_message(), Some("request failed"));
    }

    #[test]
    fn empty_error_message() {
        let runtime = testing::runtime();
        let r: CRustResult<u64> = CRustResult::err(CRustString::empty());
        let err = unsafe { decode(&runtime, r, "fallback") }.unwrap_err();
        assert_eq!(err.native_message(), Some(""));
    }

    #[test]
    fn success_never_touches_error_arm() {
        let runtime = testing::runtime();
        let before = testing::strings_freed();

        // The error arm would alias the handle pointer if it were read as a string.
        let r = CRustResult::ok(boxed_handle(1));
        let handle = unsafe { decode_handle(&runtime, r, release_boxed, "UserId", "") }.unwrap();

        assert_eq!(testing::strings_freed(), before);
        drop(handle);
    }

    #[test]
    fn failure_never_touches_success_arm() {
        let runtime = testing::runtime();
        let before = handles_released();

        let r: CRustResult<*mut RawHandle> = CRustResult::err(testing::native_string("nope"));
        let err = unsafe { decode_handle(&runtime, r, poisoned_release, "UserId", "") }.unwrap_err();

        assert_eq!(err.native_message(), Some("nope"));
        assert_eq!(handles_released(), before);
    }

    #[test]
    fn nonzero_flag_is_success() {
        let runtime = testing::runtime();
        let r = CRustResult {
            data: CRustResultUnion {
                ok: ManuallyDrop::new(5u32),
            },
            is_ok: 7,
        };
        assert_eq!(unsafe { decode(&runtime, r, "") }.unwrap(), 5);
    }

    #[test]
    fn optional_handle_some_none_and_err() {
        let runtime = testing::runtime();
        let before = handles_released();

        let some = CRustResult::ok(CRustOption::some(boxed_handle(3)));
        let handle = unsafe { decode_optional_handle(&runtime, some, release_boxed, "UserResult", "") }.unwrap();
        assert!(handle.is_some());
        drop(handle);
        assert_eq!(handles_released(), before + 1);

        let none = CRustResult::ok(CRustOption::none());
        let handle = unsafe { decode_optional_handle(&runtime, none, release_boxed, "UserResult", "") }.unwrap();
        assert!(handle.is_none());

        let err: CRustResult<CRustOption<*mut RawHandle>> = CRustResult::err(testing::native_string("jwt expired"));
        let err = unsafe { decode_optional_handle(&runtime, err, release_boxed, "UserResult", "") }.unwrap_err();
        assert_eq!(err.native_message(), Some("jwt expired"));
    }

    #[test]
    fn list_result_failure_extracts_nothing() {
        let runtime = testing::runtime();
        let before = testing::strings_freed();
        let mut extracted = 0;

        let r: CRustResult<CRustForeignVec> = CRustResult::err(testing::native_string("boom"));
        let result = unsafe {
            map_list_result(&runtime, r, "GroupMeta", "", |_| {
                extracted += 1;
            })
        };

        assert_eq!(result.unwrap_err(), CoreError::native("boom"));
        assert_eq!(extracted, 0);
        assert_eq!(testing::strings_freed(), before + 1);
    }

    #[test]
    fn list_result_success_drains_in_order() {
        let runtime = testing::runtime();
        let native = [10u32, 20, 30];
        let r = CRustResult::ok(CRustForeignVec::borrowed(&native));

        let values = unsafe {
            map_list_result(&runtime, r, "u32", "", |h| *h.as_ptr().cast::<u32>())
        }
        .unwrap();
        assert_eq!(values, vec![10, 20, 30]);
    }

    #[test]
    fn validate_as_discards_reason_but_frees_it() {
        let runtime = testing::runtime();
        let before = testing::strings_freed();

        let r: CRustResult<*mut RawHandle> = CRustResult::err(testing::native_string("bad key"));
        assert!(unsafe { validate_as(&runtime, r, release_boxed, "PublicKey") }.is_none());
        assert_eq!(testing::strings_freed(), before + 1);

        let ok = CRustResult::ok(boxed_handle(4));
        assert!(unsafe { validate_as(&runtime, ok, release_boxed, "PublicKey") }.is_some());
    }
}
