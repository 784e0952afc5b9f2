//! Option codec.
//!
//! Decoding branches on `is_some` before touching the payload; an absent
//! option's payload may be uninitialized.

use crate::error::CoreResult;
use crate::handle::OpaqueHandle;
use crate::runtime::NativeRuntime;
use crate::string::{self, NativeStr};
use oxbridge_abi::{CRustOption, CRustStrView, CRustString, RawHandle, ReleaseFn};
use std::mem::ManuallyDrop;

/// Encodes "no value" for an optional native parameter.
pub fn encode_absent<T>() -> CRustOption<T> {
    CRustOption::none()
}

/// Encodes a present value for an optional native parameter.
pub fn encode_present<T>(value: T) -> CRustOption<T> {
    CRustOption::some(value)
}

/// Encodes a host option.
pub fn encode<T>(value: Option<T>) -> CRustOption<T> {
    value.map_or_else(encode_absent, encode_present)
}

/// Lends an optional handle's pointer to a native call.
///
/// Whether the call borrows or consumes the handle is decided by that call.
/// For consuming calls pass the pointer from [`OpaqueHandle::into_raw`]
/// through [`encode_present`] instead.
pub fn encode_handle(handle: Option<&OpaqueHandle>) -> CRustOption<*mut RawHandle> {
    encode(handle.map(OpaqueHandle::as_ptr))
}

/// Lends an optional host string to a native call.
pub fn encode_str(s: Option<&NativeStr>) -> CRustOption<CRustStrView<'_>> {
    encode(s.map(NativeStr::view))
}

/// Decodes a native option.
///
/// # Safety
///
/// If `is_some` is set, `val.data` must hold an initialized `T`.
pub unsafe fn decode<T>(opt: CRustOption<T>) -> Option<T> {
    if !opt.is_some() {
        return None;
    }
    Some(ManuallyDrop::into_inner(opt.val.data))
}

/// Decodes an optional handle, taking ownership of it when present.
///
/// # Safety
///
/// If present, the pointer must satisfy [`OpaqueHandle::wrap`]'s contract
/// for `release`.
pub unsafe fn decode_handle(
    opt: CRustOption<*mut RawHandle>,
    release: ReleaseFn,
    entity: &'static str,
) -> CoreResult<Option<OpaqueHandle>> {
    decode(opt)
        .map(|ptr| OpaqueHandle::wrap(ptr, release, entity))
        .transpose()
}

/// Decodes an optional native string, freeing it when present.
///
/// An absent option holds nothing to free.
///
/// # Safety
///
/// If present, the string must satisfy [`string::from_native`]'s contract.
pub unsafe fn decode_string(
    runtime: &NativeRuntime,
    opt: CRustOption<CRustString>,
    fallback: &str,
) -> Option<String> {
    decode(opt).map(|s| string::from_native(runtime, s, fallback))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{self, boxed_handle, handles_released, release_boxed};
    use oxbridge_abi::CRustOptionUnion;
    use std::time::Duration;

    #[test]
    fn absent_decodes_to_none() {
        let opt: CRustOption<u64> = encode_absent();
        assert_eq!(opt.is_some, 0);
        assert_eq!(unsafe { decode(opt) }, None);
    }

    #[test]
    fn present_decodes_to_value() {
        let opt = encode_present(42u64);
        assert_eq!(opt.is_some, 1);
        assert_eq!(unsafe { decode(opt) }, Some(42));
    }

    #[test]
    fn absent_with_garbage_payload_is_not_read() {
        // Payload bytes are deliberately nonsense; only the flag matters.
        let opt = CRustOption::<CRustString> {
            val: CRustOptionUnion { uninit: 0xAB },
            is_some: 0,
        };
        let runtime = testing::runtime();
        let before = testing::strings_freed();
        assert_eq!(unsafe { decode_string(&runtime, opt, "") }, None);
        assert_eq!(testing::strings_freed(), before);
    }

    #[test]
    fn encode_host_option() {
        let timeout = Some(Duration::from_secs(3).as_millis() as u64);
        assert_eq!(unsafe { decode(encode(timeout)) }, Some(3000));
        assert_eq!(unsafe { decode(encode::<u64>(None)) }, None);
    }

    #[test]
    fn handle_round_trip_keeps_pointer() {
        let handle = unsafe { OpaqueHandle::wrap(boxed_handle(5), release_boxed, "GroupId") }.unwrap();
        let opt = encode_handle(Some(&handle));
        assert_eq!(unsafe { decode(opt) }, Some(handle.as_ptr()));

        let none = encode_handle(None);
        assert_eq!(unsafe { decode(none) }, None);
    }

    #[test]
    fn decode_handle_takes_ownership() {
        let before = handles_released();
        let opt = encode_present(boxed_handle(9));

        let handle = unsafe { decode_handle(opt, release_boxed, "UserResult") }
            .unwrap()
            .unwrap();
        assert_eq!(handle.entity(), "UserResult");
        drop(handle);
        assert_eq!(handles_released(), before + 1);
    }

    #[test]
    fn decode_handle_absent() {
        let handle = unsafe { decode_handle(encode_absent(), release_boxed, "UserResult") }.unwrap();
        assert!(handle.is_none());
    }

    #[test]
    fn present_null_handle_is_an_error() {
        let result = unsafe { decode_handle(encode_present(std::ptr::null_mut()), release_boxed, "UserResult") };
        assert!(result.is_err());
    }

    #[test]
    fn optional_string_frees_when_present() {
        let runtime = testing::runtime();
        let before = testing::strings_freed();

        let name = unsafe { decode_string(&runtime, encode_present(testing::native_string("admins")), "") };
        assert_eq!(name.as_deref(), Some("admins"));
        assert_eq!(testing::strings_freed(), before + 1);
    }

    #[test]
    fn optional_str_view() {
        let partition = NativeStr::new("tenant-a");
        let opt = encode_str(Some(&partition));
        let view = unsafe { decode(opt) }.unwrap();
        assert_eq!(unsafe { view.as_bytes() }, b"tenant-a");

        assert!(!encode_str(None).is_some());
    }
}
