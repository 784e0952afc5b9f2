//! Blind index search.
//!
//! Tokens come back as a native `i32` vector and are reinterpreted as
//! `u32`, bit for bit.

use crate::error::{SdkError, SdkResult};
use crate::sdk::Sdk;
use oxbridge_abi::{CRustOption, CRustResultVeci32, CRustStrView, RawHandle};
use oxbridge_core::{bytes, option, result, string, OpaqueHandle};
use std::fmt;

type TokenizeFn =
    unsafe extern "C" fn(*const RawHandle, CRustStrView<'_>, CRustOption<CRustStrView<'_>>) -> CRustResultVeci32;

/// An initialized blind index search.
pub struct BlindIndexSearch {
    sdk: Sdk,
    handle: OpaqueHandle,
}

impl BlindIndexSearch {
    const ENTITY: &'static str = "BlindIndexSearch";

    /// Initializes a search from salt bytes.
    pub fn new(sdk: &Sdk, salt: &[u8]) -> SdkResult<Self> {
        let fns = &sdk.api().blind_index;
        // Safety: `salt` outlives the call and `fns.delete` matches `fns.create`.
        let handle = unsafe {
            let r = (fns.create)(bytes::to_native_slice(salt));
            result::decode_handle(sdk.runtime(), r, fns.delete, Self::ENTITY, sdk.error_fallback())
        }
        .map_err(|e| SdkError::invalid(Self::ENTITY, e))?;
        Ok(Self {
            sdk: sdk.clone(),
            handle,
        })
    }

    /// Tokenizes a search query.
    pub fn tokenize_query(&self, query: &str, partition_id: Option<&str>) -> SdkResult<Vec<u32>> {
        self.tokenize(self.sdk.api().blind_index.tokenize_query, query, partition_id)
    }

    /// Tokenizes data for indexing.
    pub fn tokenize_data(&self, data: &str, partition_id: Option<&str>) -> SdkResult<Vec<u32>> {
        self.tokenize(self.sdk.api().blind_index.tokenize_data, data, partition_id)
    }

    fn tokenize(&self, tokenize: TokenizeFn, input: &str, partition_id: Option<&str>) -> SdkResult<Vec<u32>> {
        let input = string::to_native(input);
        let partition_id = partition_id.map(string::to_native);
        let runtime = self.sdk.runtime();
        // Safety: both strings outlive the call; the token vector is freed after copying.
        let tokens = unsafe {
            let r = tokenize(
                self.handle.as_ptr().cast_const(),
                input.view(),
                option::encode_str(partition_id.as_ref()),
            );
            let v = result::decode(runtime, r, self.sdk.error_fallback())?;
            bytes::take_u32s(runtime, v)
        };
        Ok(tokens)
    }

    /// Returns the underlying handle.
    pub fn handle(&self) -> &OpaqueHandle {
        &self.handle
    }
}

impl fmt::Debug for BlindIndexSearch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlindIndexSearch").field("handle", &self.handle).finish()
    }
}
