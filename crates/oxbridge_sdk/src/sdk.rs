//! SDK entry point.

use crate::api::NativeApi;
use crate::error::SdkResult;
use crate::group::{GroupList, GroupMeta};
use crate::ids::GroupId;
use crate::user::UserResult;
use oxbridge_core::{convert, option, result, string, MarshalConfig, NativeRuntime};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

struct SdkInner {
    api: NativeApi,
    config: MarshalConfig,
}

/// Handle to a linked native library.
///
/// Cheap to clone. Every wrapper keeps a clone, so the function tables
/// outlive the values that call through them.
#[derive(Clone)]
pub struct Sdk {
    inner: Arc<SdkInner>,
}

impl Sdk {
    /// Creates an SDK over the given native functions.
    pub fn new(api: NativeApi, config: MarshalConfig) -> Self {
        Self {
            inner: Arc::new(SdkInner { api, config }),
        }
    }

    /// Returns the native function tables.
    pub fn api(&self) -> &NativeApi {
        &self.inner.api
    }

    /// Returns the marshaling configuration.
    pub fn config(&self) -> &MarshalConfig {
        &self.inner.config
    }

    pub(crate) fn runtime(&self) -> &NativeRuntime {
        &self.inner.api.runtime
    }

    pub(crate) fn error_fallback(&self) -> &str {
        &self.inner.config.error_fallback
    }

    pub(crate) fn string_fallback(&self) -> &str {
        &self.inner.config.string_fallback
    }

    /// Lists the groups whose id starts with `filter`.
    pub fn list_groups(&self, filter: &str) -> SdkResult<Vec<GroupMeta>> {
        let filter = string::to_native(filter);
        // Safety: `filter` outlives the call; records are laid out as group metadata.
        let groups = unsafe {
            let r = (self.api().groups.list)(filter.view());
            result::map_list_result(self.runtime(), r, GroupMeta::ENTITY, self.error_fallback(), |record| {
                GroupMeta::from_handle(self.clone(), record)
            })?
        };
        Ok(groups)
    }

    /// Lists the groups whose id starts with `filter`, keeping the native list.
    pub fn group_list(&self, filter: &str) -> SdkResult<GroupList> {
        let filter = string::to_native(filter);
        let release = self.api().group_list.delete;
        // Safety: `filter` outlives the call; the handle is a group list.
        let handle = unsafe {
            let r = (self.api().groups.list_result)(filter.view());
            result::decode_handle(self.runtime(), r, release, GroupList::ENTITY, self.error_fallback())?
        };
        Ok(GroupList::from_handle(self.clone(), handle))
    }

    /// Fetches the metadata of one group.
    pub fn group_metadata(&self, id: &GroupId) -> SdkResult<GroupMeta> {
        let release = self.api().group_meta.delete;
        // Safety: `id` is borrowed for the duration of the call.
        let handle = unsafe {
            let r = (self.api().groups.get_metadata)(id.handle().as_ptr().cast_const());
            result::decode_handle(self.runtime(), r, release, GroupMeta::ENTITY, self.error_fallback())?
        };
        Ok(GroupMeta::from_handle(self.clone(), handle))
    }

    /// Verifies a JWT.
    ///
    /// Returns `Ok(None)` when the token is valid but the user does not
    /// exist yet.
    pub fn user_verify(&self, jwt: &str, timeout: Option<Duration>) -> SdkResult<Option<UserResult>> {
        let jwt = string::to_native(jwt);
        let timeout = option::encode(timeout.map(convert::duration_to_native));
        let release = self.api().user_result.delete;
        // Safety: `jwt` outlives the call; the handle is a user result.
        let handle = unsafe {
            let r = (self.api().users.verify)(jwt.view(), timeout);
            result::decode_optional_handle(self.runtime(), r, release, UserResult::ENTITY, self.error_fallback())?
        };
        Ok(handle.map(|h| UserResult::from_handle(self.clone(), h)))
    }
}

impl fmt::Debug for Sdk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sdk")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}
