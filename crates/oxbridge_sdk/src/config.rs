//! Native SDK configuration.

use crate::error::SdkResult;
use crate::sdk::Sdk;
use oxbridge_core::{convert, option, OpaqueHandle};
use std::fmt;
use std::time::Duration;

/// Host-side settings for a native configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigOptions {
    /// Maximum number of policies cached natively.
    pub policy_cache_max_entries: usize,

    /// Timeout applied to each native operation, if any.
    pub timeout: Option<Duration>,
}

impl Default for ConfigOptions {
    fn default() -> Self {
        Self {
            policy_cache_max_entries: 128,
            timeout: Some(Duration::from_secs(30)),
        }
    }
}

impl ConfigOptions {
    /// Creates options with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the policy cache size.
    #[must_use]
    pub const fn policy_cache_max_entries(mut self, value: usize) -> Self {
        self.policy_cache_max_entries = value;
        self
    }

    /// Sets the operation timeout. `None` waits indefinitely.
    #[must_use]
    pub const fn timeout(mut self, value: Option<Duration>) -> Self {
        self.timeout = value;
        self
    }
}

/// A native SDK configuration.
pub struct SdkConfig {
    sdk: Sdk,
    handle: OpaqueHandle,
}

impl SdkConfig {
    const ENTITY: &'static str = "SdkConfig";

    /// Creates a native configuration.
    pub fn new(sdk: &Sdk, options: &ConfigOptions) -> SdkResult<Self> {
        let fns = &sdk.api().sdk_config;
        let timeout = option::encode(options.timeout.map(convert::duration_to_native));
        // Safety: `create` hands back a fresh configuration released by `delete`.
        let handle = unsafe {
            let ptr = (fns.create)(options.policy_cache_max_entries, timeout);
            OpaqueHandle::wrap(ptr, fns.delete, Self::ENTITY)
        }?;
        Ok(Self {
            sdk: sdk.clone(),
            handle,
        })
    }

    /// Returns the policy cache size.
    pub fn max_entries(&self) -> usize {
        // Safety: the handle is a configuration borrowed for the call.
        unsafe { (self.sdk.api().sdk_config.get_max_entries)(self.handle.as_ptr().cast_const()) }
    }

    /// Returns the operation timeout.
    pub fn timeout(&self) -> Option<Duration> {
        // Safety: as in `max_entries`; the option carries plain millis.
        let millis = unsafe {
            option::decode((self.sdk.api().sdk_config.get_timeout)(self.handle.as_ptr().cast_const()))
        };
        millis.map(convert::native_to_duration)
    }

    /// Returns the underlying handle.
    pub fn handle(&self) -> &OpaqueHandle {
        &self.handle
    }
}

impl fmt::Debug for SdkConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SdkConfig")
            .field("max_entries", &self.max_entries())
            .field("timeout", &self.timeout())
            .finish()
    }
}
