//! Native function tables.
//!
//! One table per entity type, each pairing the entity's getters with its
//! own delete function. Whoever links the native library fills these in.
//!
//! Getters take `*const RawHandle` and never mutate the handle. Functions
//! returning `*mut RawHandle` hand out a fresh handle the caller owns.

use oxbridge_abi::{
    CRustForeignVec, CRustObjectSlice, CRustOption, CRustOptionHandle, CRustResultForeignVec,
    CRustResultHandle, CRustResultOptionHandle, CRustResultVeci32, CRustSlicei8, CRustStrView,
    CRustString, CRustVeci8, RawHandle, ReleaseFn,
};
use oxbridge_core::NativeRuntime;

/// Functions for string-backed identifiers (user and group ids).
#[derive(Debug, Clone, Copy)]
pub struct StringIdFns {
    /// Validates a string and returns a new id handle.
    pub validate: unsafe extern "C" fn(CRustStrView<'_>) -> CRustResultHandle,
    /// Returns the id as an owned native string.
    pub get_id: unsafe extern "C" fn(*const RawHandle) -> CRustString,
    /// Deletes an id handle.
    pub delete: ReleaseFn,
}

/// Functions for numeric device ids.
#[derive(Debug, Clone, Copy)]
pub struct DeviceIdFns {
    /// Validates a number and returns a new device id handle.
    pub validate: unsafe extern "C" fn(i64) -> CRustResultHandle,
    /// Returns the numeric id.
    pub get_id: unsafe extern "C" fn(*const RawHandle) -> i64,
    /// Deletes a device id handle.
    pub delete: ReleaseFn,
}

/// Functions for public keys.
#[derive(Debug, Clone, Copy)]
pub struct PublicKeyFns {
    /// Validates key bytes and returns a new key handle.
    pub validate: unsafe extern "C" fn(CRustSlicei8<'_>) -> CRustResultHandle,
    /// Returns a view of the key bytes, borrowed from the handle.
    ///
    /// The `'static` is nominal: the view is only valid while the handle
    /// lives and is copied out immediately.
    pub as_bytes: unsafe extern "C" fn(*const RawHandle) -> CRustSlicei8<'static>,
    /// Deletes a key handle.
    pub delete: ReleaseFn,
}

/// Functions for private keys.
#[derive(Debug, Clone, Copy)]
pub struct PrivateKeyFns {
    /// Validates key bytes and returns a new key handle.
    pub validate: unsafe extern "C" fn(CRustSlicei8<'_>) -> CRustResultHandle,
    /// Returns a fresh native copy of the key bytes.
    pub as_bytes: unsafe extern "C" fn(*const RawHandle) -> CRustVeci8,
    /// Deletes a key handle.
    pub delete: ReleaseFn,
}

/// Functions for SDK configuration.
#[derive(Debug, Clone, Copy)]
pub struct SdkConfigFns {
    /// Creates a configuration from a policy cache size and an optional
    /// operation timeout in milliseconds.
    pub create: unsafe extern "C" fn(usize, CRustOption<u64>) -> *mut RawHandle,
    /// Returns the policy cache size.
    pub get_max_entries: unsafe extern "C" fn(*const RawHandle) -> usize,
    /// Returns the operation timeout in milliseconds, if any.
    pub get_timeout: unsafe extern "C" fn(*const RawHandle) -> CRustOption<u64>,
    /// Deletes a configuration handle.
    pub delete: ReleaseFn,
}

/// Functions for group metadata.
#[derive(Debug, Clone, Copy)]
pub struct GroupMetaFns {
    /// Returns a fresh group id handle.
    pub get_id: unsafe extern "C" fn(*const RawHandle) -> *mut RawHandle,
    /// Returns the group name, if it has one.
    pub get_name: unsafe extern "C" fn(*const RawHandle) -> CRustOption<CRustString>,
    /// Returns non-zero if the caller administers the group.
    pub is_admin: unsafe extern "C" fn(*const RawHandle) -> i8,
    /// Returns non-zero if the caller is a member of the group.
    pub is_member: unsafe extern "C" fn(*const RawHandle) -> i8,
    /// Creation time, milliseconds since the Unix epoch.
    pub get_created: unsafe extern "C" fn(*const RawHandle) -> i64,
    /// Last update time, milliseconds since the Unix epoch.
    pub get_last_updated: unsafe extern "C" fn(*const RawHandle) -> i64,
    /// Whether the group key needs rotation; absent if the caller may not know.
    pub get_needs_rotation: unsafe extern "C" fn(*const RawHandle) -> CRustOption<i8>,
    /// Deletes a group metadata handle.
    pub delete: ReleaseFn,
}

/// Functions for group list results.
#[derive(Debug, Clone, Copy)]
pub struct GroupListFns {
    /// Returns the group metadata records. The buffer belongs to the list.
    pub get_result: unsafe extern "C" fn(*const RawHandle) -> CRustForeignVec,
    /// Deletes a group list handle.
    pub delete: ReleaseFn,
}

/// Group operations.
#[derive(Debug, Clone, Copy)]
pub struct GroupOpsFns {
    /// Lists the groups whose id starts with the filter, as records.
    pub list: unsafe extern "C" fn(CRustStrView<'_>) -> CRustResultForeignVec,
    /// Lists the groups whose id starts with the filter, as a list handle.
    pub list_result: unsafe extern "C" fn(CRustStrView<'_>) -> CRustResultHandle,
    /// Fetches the metadata of one group. Borrows the group id.
    pub get_metadata: unsafe extern "C" fn(*const RawHandle) -> CRustResultHandle,
}

/// Functions for group creation options.
#[derive(Debug, Clone, Copy)]
pub struct GroupCreateOptsFns {
    /// Creates options. Borrows the optional group id and the member ids.
    pub create: unsafe extern "C" fn(
        CRustOptionHandle,
        CRustOption<CRustStrView<'_>>,
        i8,
        i8,
        CRustObjectSlice<'_>,
        i8,
    ) -> *mut RawHandle,
    /// Deletes a creation options handle.
    pub delete: ReleaseFn,
}

/// Functions for verified user results.
#[derive(Debug, Clone, Copy)]
pub struct UserResultFns {
    /// Returns a fresh user id handle.
    pub get_account_id: unsafe extern "C" fn(*const RawHandle) -> *mut RawHandle,
    /// Returns the segment id.
    pub get_segment_id: unsafe extern "C" fn(*const RawHandle) -> usize,
    /// Returns non-zero if the user's private key needs rotation.
    pub get_needs_rotation: unsafe extern "C" fn(*const RawHandle) -> i8,
    /// Deletes a user result handle.
    pub delete: ReleaseFn,
}

/// User operations.
#[derive(Debug, Clone, Copy)]
pub struct UserOpsFns {
    /// Verifies a JWT. Succeeds with no value if the user does not exist.
    pub verify: unsafe extern "C" fn(CRustStrView<'_>, CRustOption<u64>) -> CRustResultOptionHandle,
}

/// Functions for blind index search.
#[derive(Debug, Clone, Copy)]
pub struct BlindIndexFns {
    /// Initializes a search from salt bytes.
    pub create: unsafe extern "C" fn(CRustSlicei8<'_>) -> CRustResultHandle,
    /// Tokenizes a query with an optional partition id.
    pub tokenize_query: unsafe extern "C" fn(
        *const RawHandle,
        CRustStrView<'_>,
        CRustOption<CRustStrView<'_>>,
    ) -> CRustResultVeci32,
    /// Tokenizes data for indexing with an optional partition id.
    pub tokenize_data: unsafe extern "C" fn(
        *const RawHandle,
        CRustStrView<'_>,
        CRustOption<CRustStrView<'_>>,
    ) -> CRustResultVeci32,
    /// Deletes a search handle.
    pub delete: ReleaseFn,
}

/// Every native function the SDK calls.
#[derive(Debug, Clone, Copy)]
pub struct NativeApi {
    /// Allocator-level free functions.
    pub runtime: NativeRuntime,
    /// User ids.
    pub user_id: StringIdFns,
    /// Group ids.
    pub group_id: StringIdFns,
    /// Device ids.
    pub device_id: DeviceIdFns,
    /// Public keys.
    pub public_key: PublicKeyFns,
    /// Private keys.
    pub private_key: PrivateKeyFns,
    /// SDK configuration.
    pub sdk_config: SdkConfigFns,
    /// Group metadata.
    pub group_meta: GroupMetaFns,
    /// Group lists.
    pub group_list: GroupListFns,
    /// Group operations.
    pub groups: GroupOpsFns,
    /// Group creation options.
    pub group_create_opts: GroupCreateOptsFns,
    /// Verified users.
    pub user_result: UserResultFns,
    /// User operations.
    pub users: UserOpsFns,
    /// Blind index search.
    pub blind_index: BlindIndexFns,
}
