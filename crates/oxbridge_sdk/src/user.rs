//! Verified user results.

use crate::error::SdkResult;
use crate::ids::UserId;
use crate::sdk::Sdk;
use oxbridge_core::{convert, OpaqueHandle};
use std::fmt;

/// A user known to the service, as returned by [`Sdk::user_verify`].
pub struct UserResult {
    sdk: Sdk,
    handle: OpaqueHandle,
}

impl UserResult {
    pub(crate) const ENTITY: &'static str = "UserResult";

    pub(crate) fn from_handle(sdk: Sdk, handle: OpaqueHandle) -> Self {
        Self { sdk, handle }
    }

    /// Returns the user's account id.
    pub fn account_id(&self) -> SdkResult<UserId> {
        let api = self.sdk.api();
        // Safety: the getter hands back a fresh user id released by its own delete.
        let handle = unsafe {
            let ptr = (api.user_result.get_account_id)(self.handle.as_ptr().cast_const());
            OpaqueHandle::wrap(ptr, api.user_id.delete, UserId::ENTITY)?
        };
        Ok(UserId::from_handle(self.sdk.clone(), handle))
    }

    /// Returns the user's segment id.
    pub fn segment_id(&self) -> usize {
        // Safety: plain scalar getter.
        unsafe { (self.sdk.api().user_result.get_segment_id)(self.handle.as_ptr().cast_const()) }
    }

    /// Returns true if the user's private key needs rotation.
    pub fn needs_rotation(&self) -> bool {
        // Safety: plain scalar getter.
        let flag = unsafe { (self.sdk.api().user_result.get_needs_rotation)(self.handle.as_ptr().cast_const()) };
        convert::native_to_bool(flag)
    }

    /// Returns the underlying handle.
    pub fn handle(&self) -> &OpaqueHandle {
        &self.handle
    }
}

impl fmt::Debug for UserResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserResult")
            .field("segment_id", &self.segment_id())
            .field("needs_rotation", &self.needs_rotation())
            .finish_non_exhaustive()
    }
}
