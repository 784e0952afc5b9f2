//! # oxbridge Core
//!
//! Safe marshaling over the native cryptography library's C ABI.
//!
//! This crate provides:
//! - String and byte-slice bridges (host to native views, native to host copies)
//! - Option and result codecs for the native tagged unions
//! - A foreign vector iterator that drains native record arrays
//! - Handle lifecycle management with exactly-once release
//!
//! ## Ownership conventions
//!
//! | Value | Allocated by | Released by |
//! |---|---|---|
//! | [`NativeStr`], byte slices | host | host, when the borrow ends |
//! | `CRustString`, `CRustVeci8`, `CRustVeci32` | native | native free function, right after copying |
//! | foreign vector buffer | native | native side; never by this crate |
//! | foreign vector record copies | host | host, when the [`OpaqueHandle`] drops |
//! | opaque handles | native | the entity's release function, when the [`OpaqueHandle`] drops |
//!
//! All calls run on the calling thread. Nothing here locks: callers
//! serialise access to a single handle themselves.

#![warn(missing_docs)]

pub mod bytes;
pub mod config;
pub mod convert;
pub mod error;
pub mod foreign_vec;
pub mod handle;
pub mod option;
pub mod result;
pub mod runtime;
pub mod string;

#[cfg(test)]
mod testing;

pub use config::MarshalConfig;
pub use error::{CoreError, CoreResult};
pub use foreign_vec::ForeignRecords;
pub use handle::{HandleSlice, OpaqueHandle};
pub use runtime::NativeRuntime;
pub use string::NativeStr;
