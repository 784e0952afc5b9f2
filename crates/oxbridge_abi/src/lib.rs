//! # oxbridge ABI
//!
//! `#[repr(C)]` wire shapes exchanged with the native cryptography library.
//!
//! This crate provides:
//! - String views and native-owned strings
//! - Byte slices, byte/i32 vectors and foreign vectors
//! - Tagged unions for optional values and results
//! - Opaque handle and release function types
//!
//! Nothing here decides ownership. The types only describe memory; the
//! consume-then-free and release-once rules live in `oxbridge_core`.
//! Constructors such as [`CRustString::from_vec`] describe memory the way
//! the native side produces it, and are what in-process mocks use.

#![warn(missing_docs)]

mod option;
mod result;
mod string;
mod types;
mod vec;

pub use option::{CRustOption, CRustOptionHandle, CRustOptionUnion};
pub use result::{
    CRustResult, CRustResultForeignVec, CRustResultHandle, CRustResultOptionHandle,
    CRustResultUnion, CRustResultVeci32,
};
pub use string::{CRustStrView, CRustString};
pub use types::{RawHandle, ReleaseFn};
pub use vec::{CRustForeignVec, CRustObjectSlice, CRustSlicei8, CRustVeci32, CRustVeci8};
