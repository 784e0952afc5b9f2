//! In-crate native allocator stand-ins for unit tests.

use crate::runtime::NativeRuntime;
use oxbridge_abi::{CRustString, CRustVeci32, CRustVeci8, RawHandle};
use std::cell::Cell;

thread_local! {
    static STRINGS_FREED: Cell<usize> = const { Cell::new(0) };
    static BYTES_FREED: Cell<usize> = const { Cell::new(0) };
    static I32S_FREED: Cell<usize> = const { Cell::new(0) };
    static HANDLES_RELEASED: Cell<usize> = const { Cell::new(0) };
}

unsafe extern "C" fn free_string(s: CRustString) {
    drop(s.into_vec());
    STRINGS_FREED.with(|c| c.set(c.get() + 1));
}

unsafe extern "C" fn free_vec_i8(v: CRustVeci8) {
    drop(v.into_vec());
    BYTES_FREED.with(|c| c.set(c.get() + 1));
}

unsafe extern "C" fn free_vec_i32(v: CRustVeci32) {
    drop(v.into_vec());
    I32S_FREED.with(|c| c.set(c.get() + 1));
}

/// Releases a `Box<u64>` handle.
pub unsafe extern "C" fn release_boxed(ptr: *mut RawHandle) {
    drop(Box::from_raw(ptr.cast::<u64>()));
    HANDLES_RELEASED.with(|c| c.set(c.get() + 1));
}

/// Allocates a handle the way the native side would.
pub fn boxed_handle(value: u64) -> *mut RawHandle {
    Box::into_raw(Box::new(value)).cast()
}

pub fn runtime() -> NativeRuntime {
    NativeRuntime::new(free_string, free_vec_i8, free_vec_i32)
}

pub fn native_string(s: &str) -> CRustString {
    CRustString::from_vec(s.as_bytes().to_vec())
}

pub fn strings_freed() -> usize {
    STRINGS_FREED.with(Cell::get)
}

pub fn bytes_freed() -> usize {
    BYTES_FREED.with(Cell::get)
}

pub fn i32s_freed() -> usize {
    I32S_FREED.with(Cell::get)
}

pub fn handles_released() -> usize {
    HANDLES_RELEASED.with(Cell::get)
}
