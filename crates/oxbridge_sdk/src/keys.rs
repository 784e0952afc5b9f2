//! Key wrappers.
//!
//! Public key bytes are borrowed from the handle and copied out. Private
//! key bytes arrive as a fresh native vector; the host copy is wiped on drop.

use crate::error::{SdkError, SdkResult};
use crate::sdk::Sdk;
use oxbridge_core::{bytes, result, OpaqueHandle};
use std::fmt;
use zeroize::Zeroizing;

/// A validated public key.
pub struct PublicKey {
    sdk: Sdk,
    handle: OpaqueHandle,
}

impl PublicKey {
    const ENTITY: &'static str = "PublicKey";

    /// Validates raw key bytes natively.
    pub fn new(sdk: &Sdk, key: &[u8]) -> SdkResult<Self> {
        let fns = &sdk.api().public_key;
        // Safety: `key` outlives the call and `fns.delete` matches `fns.validate`.
        let handle = unsafe {
            let r = (fns.validate)(bytes::to_native_slice(key));
            result::decode_handle(sdk.runtime(), r, fns.delete, Self::ENTITY, sdk.error_fallback())
        }
        .map_err(|e| SdkError::invalid(Self::ENTITY, e))?;
        Ok(Self {
            sdk: sdk.clone(),
            handle,
        })
    }

    /// Validates raw key bytes, discarding the failure reason.
    pub fn validate(sdk: &Sdk, key: &[u8]) -> Option<Self> {
        let fns = &sdk.api().public_key;
        // Safety: as in `new`.
        let handle = unsafe {
            let r = (fns.validate)(bytes::to_native_slice(key));
            result::validate_as(sdk.runtime(), r, fns.delete, Self::ENTITY)
        }?;
        Some(Self {
            sdk: sdk.clone(),
            handle,
        })
    }

    /// Returns a copy of the key bytes.
    pub fn bytes(&self) -> Vec<u8> {
        // Safety: the view borrows from `self.handle`, which outlives the copy.
        unsafe {
            let view = (self.sdk.api().public_key.as_bytes)(self.handle.as_ptr().cast_const());
            bytes::copy_slice(view)
        }
    }

    /// Returns the underlying handle.
    pub fn handle(&self) -> &OpaqueHandle {
        &self.handle
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PublicKey")
            .field("len", &self.bytes().len())
            .finish_non_exhaustive()
    }
}

/// A validated private key.
pub struct PrivateKey {
    sdk: Sdk,
    handle: OpaqueHandle,
}

impl PrivateKey {
    const ENTITY: &'static str = "PrivateKey";

    /// Validates raw key bytes natively.
    pub fn new(sdk: &Sdk, key: &[u8]) -> SdkResult<Self> {
        let fns = &sdk.api().private_key;
        // Safety: `key` outlives the call and `fns.delete` matches `fns.validate`.
        let handle = unsafe {
            let r = (fns.validate)(bytes::to_native_slice(key));
            result::decode_handle(sdk.runtime(), r, fns.delete, Self::ENTITY, sdk.error_fallback())
        }
        .map_err(|e| SdkError::invalid(Self::ENTITY, e))?;
        Ok(Self {
            sdk: sdk.clone(),
            handle,
        })
    }

    /// Returns a copy of the key bytes, zeroed when dropped.
    pub fn bytes(&self) -> Zeroizing<Vec<u8>> {
        // Safety: the vector is fresh and freed by the runtime after the copy.
        let copy = unsafe {
            let v = (self.sdk.api().private_key.as_bytes)(self.handle.as_ptr().cast_const());
            bytes::from_native_owned(self.sdk.runtime(), v)
        };
        Zeroizing::new(copy)
    }

    /// Returns the underlying handle.
    pub fn handle(&self) -> &OpaqueHandle {
        &self.handle
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKey([REDACTED])")
    }
}
