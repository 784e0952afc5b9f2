//! Identifier wrappers.

use crate::api::StringIdFns;
use crate::error::{SdkError, SdkResult};
use crate::sdk::Sdk;
use oxbridge_core::{result, string, OpaqueHandle};
use std::fmt;

fn validate_str(sdk: &Sdk, fns: &StringIdFns, kind: &'static str, value: &str) -> SdkResult<OpaqueHandle> {
    let value = string::to_native(value);
    // Safety: `value` outlives the call and `fns.delete` matches `fns.validate`.
    let handle = unsafe {
        let r = (fns.validate)(value.view());
        result::decode_handle(sdk.runtime(), r, fns.delete, kind, sdk.error_fallback())
    };
    handle.map_err(|e| SdkError::invalid(kind, e))
}

fn read_str(sdk: &Sdk, fns: &StringIdFns, handle: &OpaqueHandle) -> String {
    // Safety: `handle` belongs to `fns` and is borrowed for the call.
    unsafe {
        let s = (fns.get_id)(handle.as_ptr().cast_const());
        string::from_native(sdk.runtime(), s, sdk.string_fallback())
    }
}

/// A validated user id.
pub struct UserId {
    sdk: Sdk,
    handle: OpaqueHandle,
}

impl UserId {
    pub(crate) const ENTITY: &'static str = "UserId";

    /// Validates `id` natively.
    pub fn new(sdk: &Sdk, id: &str) -> SdkResult<Self> {
        let handle = validate_str(sdk, &sdk.api().user_id, Self::ENTITY, id)?;
        Ok(Self::from_handle(sdk.clone(), handle))
    }

    pub(crate) fn from_handle(sdk: Sdk, handle: OpaqueHandle) -> Self {
        Self { sdk, handle }
    }

    /// Returns the id string.
    pub fn id(&self) -> String {
        read_str(&self.sdk, &self.sdk.api().user_id, &self.handle)
    }

    /// Returns the underlying handle.
    pub fn handle(&self) -> &OpaqueHandle {
        &self.handle
    }
}

impl PartialEq for UserId {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for UserId {}

impl fmt::Debug for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("UserId").field(&self.id()).finish()
    }
}

/// A validated group id.
pub struct GroupId {
    sdk: Sdk,
    handle: OpaqueHandle,
}

impl GroupId {
    pub(crate) const ENTITY: &'static str = "GroupId";

    /// Validates `id` natively.
    pub fn new(sdk: &Sdk, id: &str) -> SdkResult<Self> {
        let handle = validate_str(sdk, &sdk.api().group_id, Self::ENTITY, id)?;
        Ok(Self::from_handle(sdk.clone(), handle))
    }

    pub(crate) fn from_handle(sdk: Sdk, handle: OpaqueHandle) -> Self {
        Self { sdk, handle }
    }

    /// Returns the id string.
    pub fn id(&self) -> String {
        read_str(&self.sdk, &self.sdk.api().group_id, &self.handle)
    }

    /// Returns the underlying handle.
    pub fn handle(&self) -> &OpaqueHandle {
        &self.handle
    }
}

impl PartialEq for GroupId {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for GroupId {}

impl fmt::Debug for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("GroupId").field(&self.id()).finish()
    }
}

/// A validated device id.
pub struct DeviceId {
    sdk: Sdk,
    handle: OpaqueHandle,
}

impl DeviceId {
    pub(crate) const ENTITY: &'static str = "DeviceId";

    /// Validates `id` natively. Device ids are positive.
    pub fn new(sdk: &Sdk, id: i64) -> SdkResult<Self> {
        let fns = &sdk.api().device_id;
        // Safety: `fns.delete` matches `fns.validate`.
        let handle = unsafe {
            let r = (fns.validate)(id);
            result::decode_handle(sdk.runtime(), r, fns.delete, Self::ENTITY, sdk.error_fallback())
        }
        .map_err(|e| SdkError::invalid(Self::ENTITY, e))?;
        Ok(Self {
            sdk: sdk.clone(),
            handle,
        })
    }

    /// Returns the numeric id.
    pub fn id(&self) -> i64 {
        // Safety: the handle is a device id borrowed for the call.
        unsafe { (self.sdk.api().device_id.get_id)(self.handle.as_ptr().cast_const()) }
    }

    /// Returns the underlying handle.
    pub fn handle(&self) -> &OpaqueHandle {
        &self.handle
    }
}

impl PartialEq for DeviceId {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for DeviceId {}

impl fmt::Debug for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DeviceId").field(&self.id()).finish()
    }
}
