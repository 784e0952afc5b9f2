//! Group wrappers.

use crate::error::SdkResult;
use crate::ids::{GroupId, UserId};
use crate::sdk::Sdk;
use oxbridge_abi::RawHandle;
use oxbridge_core::{convert, foreign_vec, option, string, HandleSlice, OpaqueHandle};
use std::fmt;
use std::time::SystemTime;

/// Metadata about a group.
///
/// Either owns a native metadata handle or a host copy of a list record.
/// Getters behave the same for both.
pub struct GroupMeta {
    sdk: Sdk,
    handle: OpaqueHandle,
}

impl GroupMeta {
    pub(crate) const ENTITY: &'static str = "GroupMeta";

    pub(crate) fn from_handle(sdk: Sdk, handle: OpaqueHandle) -> Self {
        Self { sdk, handle }
    }

    fn ptr(&self) -> *const RawHandle {
        self.handle.as_ptr().cast_const()
    }

    /// Returns the group id.
    pub fn id(&self) -> SdkResult<GroupId> {
        let api = self.sdk.api();
        // Safety: the getter hands back a fresh group id released by its own delete.
        let handle = unsafe {
            let ptr = (api.group_meta.get_id)(self.ptr());
            OpaqueHandle::wrap(ptr, api.group_id.delete, GroupId::ENTITY)?
        };
        Ok(GroupId::from_handle(self.sdk.clone(), handle))
    }

    /// Returns the group name, if it has one.
    pub fn name(&self) -> Option<String> {
        // Safety: the name is a fresh native string, freed after decoding.
        unsafe {
            let name = (self.sdk.api().group_meta.get_name)(self.ptr());
            option::decode_string(self.sdk.runtime(), name, self.sdk.string_fallback())
        }
    }

    /// Returns true if the caller administers the group.
    pub fn is_admin(&self) -> bool {
        // Safety: plain scalar getter.
        convert::native_to_bool(unsafe { (self.sdk.api().group_meta.is_admin)(self.ptr()) })
    }

    /// Returns true if the caller is a member of the group.
    pub fn is_member(&self) -> bool {
        // Safety: plain scalar getter.
        convert::native_to_bool(unsafe { (self.sdk.api().group_meta.is_member)(self.ptr()) })
    }

    /// Returns the creation time.
    pub fn created(&self) -> SystemTime {
        // Safety: plain scalar getter.
        convert::timestamp_to_system_time(unsafe { (self.sdk.api().group_meta.get_created)(self.ptr()) })
    }

    /// Returns the time of the last update.
    pub fn last_updated(&self) -> SystemTime {
        // Safety: plain scalar getter.
        convert::timestamp_to_system_time(unsafe { (self.sdk.api().group_meta.get_last_updated)(self.ptr()) })
    }

    /// Returns whether the group key needs rotation.
    ///
    /// `None` if the caller is not an admin and so cannot know.
    pub fn needs_rotation(&self) -> Option<bool> {
        // Safety: the option carries a plain `i8`.
        let flag = unsafe { option::decode((self.sdk.api().group_meta.get_needs_rotation)(self.ptr())) };
        convert::nullable_bool(flag)
    }

    /// Returns the underlying handle.
    pub fn handle(&self) -> &OpaqueHandle {
        &self.handle
    }
}

impl fmt::Debug for GroupMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroupMeta")
            .field("name", &self.name())
            .field("is_admin", &self.is_admin())
            .field("is_member", &self.is_member())
            .finish_non_exhaustive()
    }
}

/// A native group listing.
pub struct GroupList {
    sdk: Sdk,
    handle: OpaqueHandle,
}

impl GroupList {
    pub(crate) const ENTITY: &'static str = "GroupList";

    pub(crate) fn from_handle(sdk: Sdk, handle: OpaqueHandle) -> Self {
        Self { sdk, handle }
    }

    /// Copies out the listed groups.
    ///
    /// The returned metadata does not borrow from the list.
    pub fn groups(&self) -> SdkResult<Vec<GroupMeta>> {
        let sdk = &self.sdk;
        // Safety: the vector is owned by `self.handle`, which outlives the drain.
        let groups = unsafe {
            let v = (sdk.api().group_list.get_result)(self.handle.as_ptr().cast_const());
            foreign_vec::collect(v, GroupMeta::ENTITY, |record| GroupMeta::from_handle(sdk.clone(), record))?
        };
        Ok(groups)
    }

    /// Returns the underlying handle.
    pub fn handle(&self) -> &OpaqueHandle {
        &self.handle
    }
}

impl fmt::Debug for GroupList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroupList").field("handle", &self.handle).finish()
    }
}

/// Host-side settings for group creation.
#[derive(Debug, Clone)]
pub struct GroupCreateOptions<'a> {
    /// Explicit group id. The native library generates one if absent.
    pub id: Option<&'a GroupId>,
    /// Group name.
    pub name: Option<String>,
    /// Whether the creator becomes an admin.
    pub add_as_admin: bool,
    /// Whether the creator becomes a member.
    pub add_as_member: bool,
    /// Additional members.
    pub members: Vec<&'a UserId>,
    /// Whether the group key needs rotation right after creation.
    pub needs_rotation: bool,
}

impl Default for GroupCreateOptions<'_> {
    fn default() -> Self {
        Self {
            id: None,
            name: None,
            add_as_admin: true,
            add_as_member: true,
            members: Vec::new(),
            needs_rotation: false,
        }
    }
}

impl<'a> GroupCreateOptions<'a> {
    /// Creates options with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the group id.
    #[must_use]
    pub fn id(mut self, id: &'a GroupId) -> Self {
        self.id = Some(id);
        self
    }

    /// Sets the group name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets whether the creator becomes an admin.
    #[must_use]
    pub fn add_as_admin(mut self, value: bool) -> Self {
        self.add_as_admin = value;
        self
    }

    /// Sets whether the creator becomes a member.
    #[must_use]
    pub fn add_as_member(mut self, value: bool) -> Self {
        self.add_as_member = value;
        self
    }

    /// Adds a member.
    #[must_use]
    pub fn member(mut self, user: &'a UserId) -> Self {
        self.members.push(user);
        self
    }

    /// Sets whether the group key needs rotation.
    #[must_use]
    pub fn needs_rotation(mut self, value: bool) -> Self {
        self.needs_rotation = value;
        self
    }
}

/// Native group creation options.
pub struct GroupCreateOpts {
    handle: OpaqueHandle,
}

impl GroupCreateOpts {
    const ENTITY: &'static str = "GroupCreateOpts";

    /// Builds native creation options.
    ///
    /// The id and members are only borrowed for the call.
    pub fn new(sdk: &Sdk, options: &GroupCreateOptions<'_>) -> SdkResult<Self> {
        let fns = &sdk.api().group_create_opts;
        let name = options.name.as_deref().map(string::to_native);
        let members = HandleSlice::new(options.members.iter().map(|user| user.handle()));

        // Safety: every borrowed argument outlives the call and `create`
        // hands back a fresh handle released by `delete`.
        let handle = unsafe {
            let ptr = (fns.create)(
                option::encode_handle(options.id.map(GroupId::handle)),
                option::encode_str(name.as_ref()),
                convert::bool_to_native(options.add_as_admin),
                convert::bool_to_native(options.add_as_member),
                members.as_native(),
                convert::bool_to_native(options.needs_rotation),
            );
            OpaqueHandle::wrap(ptr, fns.delete, Self::ENTITY)?
        };
        Ok(Self { handle })
    }

    /// Returns the underlying handle.
    pub fn handle(&self) -> &OpaqueHandle {
        &self.handle
    }
}

impl fmt::Debug for GroupCreateOpts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroupCreateOpts").field("handle", &self.handle).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_options_defaults() {
        let options = GroupCreateOptions::new();
        assert!(options.id.is_none());
        assert!(options.name.is_none());
        assert!(options.add_as_admin);
        assert!(options.add_as_member);
        assert!(options.members.is_empty());
        assert!(!options.needs_rotation);
    }

    #[test]
    fn create_options_builder() {
        let options = GroupCreateOptions::new()
            .name("ops")
            .add_as_admin(false)
            .needs_rotation(true);
        assert_eq!(options.name.as_deref(), Some("ops"));
        assert!(!options.add_as_admin);
        assert!(options.needs_rotation);
    }
}
