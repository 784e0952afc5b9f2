//! In-process mock of the native library.
//!
//! Every function in [`api`]'s tables is implemented here in Rust, with
//! native-side allocations made through `Box` and `Vec` and released only
//! through the matching free or delete function.
//!
//! State is thread-local. Native calls run synchronously on the calling
//! thread, so each test thread sees its own service data and counters.

use oxbridge_abi::{
    CRustForeignVec, CRustObjectSlice, CRustOption, CRustOptionHandle, CRustResult,
    CRustResultForeignVec, CRustResultHandle, CRustResultOptionHandle, CRustResultVeci32,
    CRustSlicei8, CRustStrView, CRustString, CRustVeci32, CRustVeci8, RawHandle,
};
use oxbridge_core::{option, NativeRuntime};
use oxbridge_sdk::api::{
    BlindIndexFns, DeviceIdFns, GroupCreateOptsFns, GroupListFns, GroupMetaFns, GroupOpsFns,
    NativeApi, PrivateKeyFns, PublicKeyFns, SdkConfigFns, StringIdFns, UserOpsFns, UserResultFns,
};
use oxbridge_sdk::GroupCreateOpts;
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};

/// Entity names used as counter keys.
pub mod entity {
    /// User ids.
    pub const USER_ID: &str = "UserId";
    /// Group ids.
    pub const GROUP_ID: &str = "GroupId";
    /// Device ids.
    pub const DEVICE_ID: &str = "DeviceId";
    /// Public keys.
    pub const PUBLIC_KEY: &str = "PublicKey";
    /// Private keys.
    pub const PRIVATE_KEY: &str = "PrivateKey";
    /// SDK configurations.
    pub const SDK_CONFIG: &str = "SdkConfig";
    /// Group metadata.
    pub const GROUP_META: &str = "GroupMeta";
    /// Group lists.
    pub const GROUP_LIST: &str = "GroupList";
    /// Group creation options.
    pub const GROUP_CREATE_OPTS: &str = "GroupCreateOpts";
    /// Verified users.
    pub const USER_RESULT: &str = "UserResult";
    /// Blind index searches.
    pub const BLIND_INDEX: &str = "BlindIndexSearch";
}

/// Longest id or group name a record can hold, in bytes.
pub const MAX_FIELD_LEN: usize = 100;

/// Public key length accepted by the validator.
pub const PUBLIC_KEY_LEN: usize = 64;

/// Private key length accepted by the validator.
pub const PRIVATE_KEY_LEN: usize = 32;

/// Allocation and release counts observed by the mock.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Counters {
    /// Native strings handed out (getters and error messages).
    pub strings_allocated: usize,
    /// Native strings freed.
    pub strings_freed: usize,
    /// Byte vectors handed out.
    pub byte_vecs_allocated: usize,
    /// Byte vectors freed.
    pub byte_vecs_freed: usize,
    /// Token vectors handed out.
    pub token_vecs_allocated: usize,
    /// Token vectors freed.
    pub token_vecs_freed: usize,
    /// Handles created, per entity.
    pub created: BTreeMap<&'static str, usize>,
    /// Handles released, per entity.
    pub released: BTreeMap<&'static str, usize>,
    /// Foreign vector buffers still held by the native side.
    pub foreign_vecs_outstanding: usize,
}

impl Counters {
    /// Handles of `entity` created and not yet released.
    pub fn live(&self, entity: &str) -> usize {
        let created = self.created.get(entity).copied().unwrap_or(0);
        let released = self.released.get(entity).copied().unwrap_or(0);
        created.saturating_sub(released)
    }

    /// Releases of `entity`.
    pub fn released(&self, entity: &str) -> usize {
        self.released.get(entity).copied().unwrap_or(0)
    }

    /// Native strings not yet freed.
    pub fn strings_outstanding(&self) -> usize {
        self.strings_allocated.saturating_sub(self.strings_freed)
    }

    /// True if every string, byte vector, token vector and handle came back.
    pub fn is_balanced(&self) -> bool {
        self.strings_allocated == self.strings_freed
            && self.byte_vecs_allocated == self.byte_vecs_freed
            && self.token_vecs_allocated == self.token_vecs_freed
            && self.created.keys().all(|entity| self.live(entity) == 0)
    }
}

/// A group known to the mock service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupSpec {
    /// Group id.
    pub id: String,
    /// Group name, as raw bytes so malformed names can be served.
    pub name: Option<Vec<u8>>,
    /// Whether the caller administers the group.
    pub is_admin: bool,
    /// Whether the caller is a member.
    pub is_member: bool,
    /// Creation time in milliseconds since the Unix epoch.
    pub created_ms: i64,
    /// Last update time in milliseconds since the Unix epoch.
    pub last_updated_ms: i64,
    /// Rotation status; `None` for callers who cannot know it.
    pub needs_rotation: Option<bool>,
}

impl GroupSpec {
    /// A group the caller is a plain member of.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            is_admin: false,
            is_member: true,
            created_ms: 1_587_745_315_000,
            last_updated_ms: 1_587_745_315_000,
            needs_rotation: None,
        }
    }

    /// Sets the name.
    #[must_use]
    pub fn name(mut self, name: &str) -> Self {
        self.name = Some(name.as_bytes().to_vec());
        self
    }

    /// Sets the name bytes verbatim.
    #[must_use]
    pub fn raw_name(mut self, name: Vec<u8>) -> Self {
        self.name = Some(name);
        self
    }

    /// Makes the caller an admin, which also reveals rotation status.
    #[must_use]
    pub fn admin(mut self, needs_rotation: bool) -> Self {
        self.is_admin = true;
        self.needs_rotation = Some(needs_rotation);
        self
    }

    /// Sets membership.
    #[must_use]
    pub fn member(mut self, value: bool) -> Self {
        self.is_member = value;
        self
    }

    /// Sets both timestamps.
    #[must_use]
    pub fn timestamps(mut self, created_ms: i64, last_updated_ms: i64) -> Self {
        self.created_ms = created_ms;
        self.last_updated_ms = last_updated_ms;
        self
    }
}

/// A user known to the mock service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSpec {
    /// Account id.
    pub id: String,
    /// Segment id.
    pub segment_id: usize,
    /// Whether the private key needs rotation.
    pub needs_rotation: bool,
}

impl UserSpec {
    /// A user in segment 1 with no pending rotation.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            segment_id: 1,
            needs_rotation: false,
        }
    }
}

/// What the native side received when building group creation options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupCreateSnapshot {
    /// Group id, if one was given.
    pub id: Option<String>,
    /// Group name, if one was given.
    pub name: Option<String>,
    /// Admin flag.
    pub add_as_admin: bool,
    /// Member flag.
    pub add_as_member: bool,
    /// Member ids, in order.
    pub members: Vec<String>,
    /// Rotation flag.
    pub needs_rotation: bool,
}

/// Fixed-layout group metadata, the element type of group foreign vectors.
#[repr(C)]
#[derive(Clone, Copy)]
struct GroupRecord {
    id: [u8; MAX_FIELD_LEN],
    name: [u8; MAX_FIELD_LEN],
    id_len: u8,
    name_len: u8,
    has_name: u8,
    is_admin: i8,
    is_member: i8,
    /// -1 unknown, 0 false, 1 true.
    needs_rotation: i8,
    created: i64,
    last_updated: i64,
}

fn fixed_field(bytes: &[u8]) -> ([u8; MAX_FIELD_LEN], u8) {
    let len = bytes.len().min(MAX_FIELD_LEN);
    let mut field = [0u8; MAX_FIELD_LEN];
    field[..len].copy_from_slice(&bytes[..len]);
    (field, len as u8)
}

impl GroupRecord {
    fn from_spec(spec: &GroupSpec) -> Self {
        let (id, id_len) = fixed_field(spec.id.as_bytes());
        let (name, name_len) = fixed_field(spec.name.as_deref().unwrap_or_default());
        Self {
            id,
            name,
            id_len,
            name_len,
            has_name: u8::from(spec.name.is_some()),
            is_admin: i8::from(spec.is_admin),
            is_member: i8::from(spec.is_member),
            needs_rotation: spec.needs_rotation.map_or(-1, i8::from),
            created: spec.created_ms,
            last_updated: spec.last_updated_ms,
        }
    }

    fn id(&self) -> String {
        String::from_utf8_lossy(&self.id[..usize::from(self.id_len)]).into_owned()
    }

    fn name(&self) -> Option<Vec<u8>> {
        (self.has_name != 0).then(|| self.name[..usize::from(self.name_len)].to_vec())
    }
}

struct MockId {
    id: String,
}

struct MockDevice {
    id: i64,
}

struct MockKey {
    bytes: Vec<u8>,
}

struct MockConfig {
    max_entries: usize,
    timeout: Option<u64>,
}

struct MockGroupList {
    records: Vec<GroupRecord>,
}

struct MockUserResult {
    account_id: String,
    segment_id: usize,
    needs_rotation: bool,
}

struct MockSearch {
    salt: Vec<u8>,
}

#[derive(Default)]
struct State {
    counters: Counters,
    groups: Vec<GroupSpec>,
    users: HashMap<String, UserSpec>,
    list_buffers: Vec<Vec<GroupRecord>>,
    next_failure: Option<Vec<u8>>,
    last_verify_timeout: Option<Option<u64>>,
}

thread_local! {
    static STATE: RefCell<State> = RefCell::new(State::default());
}

fn with_state<R>(f: impl FnOnce(&mut State) -> R) -> R {
    STATE.with(|state| f(&mut state.borrow_mut()))
}

// ---------------------------------------------------------------------------
// Test controls
// ---------------------------------------------------------------------------

/// Clears service data, pending failures and counters on this thread.
///
/// Foreign vector buffers still held are dropped as well.
pub fn reset() {
    with_state(|state| *state = State::default());
}

/// Returns a snapshot of this thread's counters.
pub fn counters() -> Counters {
    with_state(|state| {
        let mut counters = state.counters.clone();
        counters.foreign_vecs_outstanding = state.list_buffers.len();
        counters
    })
}

/// Replaces the groups served by list and metadata calls.
pub fn set_groups(groups: Vec<GroupSpec>) {
    with_state(|state| state.groups = groups);
}

/// Registers a user that JWT verification will find.
pub fn add_user(user: UserSpec) {
    with_state(|state| {
        state.users.insert(user.id.clone(), user);
    });
}

/// Makes the next fallible call fail with `message`.
pub fn fail_next(message: &str) {
    fail_next_raw(message.as_bytes().to_vec());
}

/// Makes the next fallible call fail with raw message bytes.
pub fn fail_next_raw(message: Vec<u8>) {
    with_state(|state| state.next_failure = Some(message));
}

/// Timeout passed to the most recent verification, in milliseconds.
///
/// The outer `None` means no verification ran yet.
pub fn last_verify_timeout() -> Option<Option<u64>> {
    with_state(|state| state.last_verify_timeout)
}

/// Frees the foreign vector buffers handed out by group listing.
///
/// Returns how many were held.
pub fn release_list_buffers() -> usize {
    with_state(|state| std::mem::take(&mut state.list_buffers).len())
}

/// Builds a JWT the mock accepts for `user_id`.
pub fn jwt_for(user_id: &str) -> String {
    format!("jwt:{user_id}")
}

/// The token the mock derives for one word.
pub fn token(salt: &[u8], partition_id: Option<&str>, word: &str) -> u32 {
    let partition = partition_id.map(str::as_bytes).unwrap_or_default();
    let mut hash: u32 = 0x811c_9dc5;
    for byte in salt.iter().chain(partition).chain(&[0xff]).chain(word.as_bytes()) {
        hash ^= u32::from(*byte);
        hash = hash.wrapping_mul(0x0100_0193);
    }
    hash
}

/// Reads back what group creation options were built from.
///
/// # Safety
///
/// `opts` must have been created through this mock's tables.
pub unsafe fn group_create_snapshot(opts: &GroupCreateOpts) -> GroupCreateSnapshot {
    let opts = &*opts.handle().as_ptr().cast_const().cast::<GroupCreateSnapshot>();
    opts.clone()
}

// ---------------------------------------------------------------------------
// Allocation helpers
// ---------------------------------------------------------------------------

fn native_string(bytes: Vec<u8>) -> CRustString {
    with_state(|state| state.counters.strings_allocated += 1);
    CRustString::from_vec(bytes)
}

fn failure<T>(message: impl Into<Vec<u8>>) -> CRustResult<T> {
    CRustResult::err(native_string(message.into()))
}

fn take_injected<T>() -> Option<CRustResult<T>> {
    with_state(|state| state.next_failure.take()).map(failure)
}

fn new_handle<T>(entity: &'static str, value: T) -> *mut RawHandle {
    with_state(|state| *state.counters.created.entry(entity).or_default() += 1);
    Box::into_raw(Box::new(value)).cast()
}

unsafe fn delete_handle<T>(entity: &'static str, ptr: *mut RawHandle) {
    if ptr.is_null() {
        return;
    }
    drop(Box::from_raw(ptr.cast::<T>()));
    with_state(|state| *state.counters.released.entry(entity).or_default() += 1);
}

unsafe fn borrow<'a, T>(ptr: *const RawHandle) -> &'a T {
    &*ptr.cast::<T>()
}

unsafe fn view_str(view: &CRustStrView<'_>) -> Result<String, String> {
    String::from_utf8(view.as_bytes().to_vec()).map_err(|_| "input is not valid UTF-8".to_string())
}

fn check_id(kind: &str, id: &str) -> Result<(), String> {
    const ALLOWED: &str = "_.$#|@/:;=+'-";
    if id.is_empty() {
        return Err(format!("{kind} must not be empty"));
    }
    if id.len() > MAX_FIELD_LEN {
        return Err(format!("{kind} '{id}' is longer than {MAX_FIELD_LEN} bytes"));
    }
    if let Some(bad) = id.chars().find(|c| !c.is_ascii_alphanumeric() && !ALLOWED.contains(*c)) {
        return Err(format!("{kind} '{id}' contains invalid character '{bad}'"));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Runtime
// ---------------------------------------------------------------------------

unsafe extern "C" fn free_string(s: CRustString) {
    drop(s.into_vec());
    with_state(|state| state.counters.strings_freed += 1);
}

unsafe extern "C" fn free_vec_i8(v: CRustVeci8) {
    drop(v.into_vec());
    with_state(|state| state.counters.byte_vecs_freed += 1);
}

unsafe extern "C" fn free_vec_i32(v: CRustVeci32) {
    drop(v.into_vec());
    with_state(|state| state.counters.token_vecs_freed += 1);
}

// ---------------------------------------------------------------------------
// Ids
// ---------------------------------------------------------------------------

unsafe fn validate_id(kind: &'static str, label: &str, view: CRustStrView<'_>) -> CRustResultHandle {
    let id = match view_str(&view) {
        Ok(id) => id,
        Err(message) => return failure(message),
    };
    match check_id(label, &id) {
        Ok(()) => CRustResult::ok(new_handle(kind, MockId { id })),
        Err(message) => failure(message),
    }
}

unsafe extern "C" fn user_id_validate(view: CRustStrView<'_>) -> CRustResultHandle {
    validate_id(entity::USER_ID, "user id", view)
}

unsafe extern "C" fn group_id_validate(view: CRustStrView<'_>) -> CRustResultHandle {
    validate_id(entity::GROUP_ID, "group id", view)
}

unsafe extern "C" fn id_get(ptr: *const RawHandle) -> CRustString {
    native_string(borrow::<MockId>(ptr).id.clone().into_bytes())
}

unsafe extern "C" fn user_id_delete(ptr: *mut RawHandle) {
    delete_handle::<MockId>(entity::USER_ID, ptr);
}

unsafe extern "C" fn group_id_delete(ptr: *mut RawHandle) {
    delete_handle::<MockId>(entity::GROUP_ID, ptr);
}

unsafe extern "C" fn device_id_validate(id: i64) -> CRustResultHandle {
    if id <= 0 {
        return failure(format!("device id must be positive, got {id}"));
    }
    CRustResult::ok(new_handle(entity::DEVICE_ID, MockDevice { id }))
}

unsafe extern "C" fn device_id_get(ptr: *const RawHandle) -> i64 {
    borrow::<MockDevice>(ptr).id
}

unsafe extern "C" fn device_id_delete(ptr: *mut RawHandle) {
    delete_handle::<MockDevice>(entity::DEVICE_ID, ptr);
}

// ---------------------------------------------------------------------------
// Keys
// ---------------------------------------------------------------------------

unsafe fn validate_key(kind: &'static str, expected: usize, slice: CRustSlicei8<'_>) -> CRustResultHandle {
    let bytes = slice.as_bytes();
    if bytes.len() != expected {
        return failure(format!("{kind} must be {expected} bytes, got {}", bytes.len()));
    }
    CRustResult::ok(new_handle(kind, MockKey { bytes: bytes.to_vec() }))
}

unsafe extern "C" fn public_key_validate(slice: CRustSlicei8<'_>) -> CRustResultHandle {
    validate_key(entity::PUBLIC_KEY, PUBLIC_KEY_LEN, slice)
}

unsafe extern "C" fn public_key_bytes(ptr: *const RawHandle) -> CRustSlicei8<'static> {
    let key = borrow::<MockKey>(ptr);
    CRustSlicei8::from_raw_parts(key.bytes.as_ptr().cast(), key.bytes.len())
}

unsafe extern "C" fn public_key_delete(ptr: *mut RawHandle) {
    delete_handle::<MockKey>(entity::PUBLIC_KEY, ptr);
}

unsafe extern "C" fn private_key_validate(slice: CRustSlicei8<'_>) -> CRustResultHandle {
    validate_key(entity::PRIVATE_KEY, PRIVATE_KEY_LEN, slice)
}

unsafe extern "C" fn private_key_bytes(ptr: *const RawHandle) -> CRustVeci8 {
    with_state(|state| state.counters.byte_vecs_allocated += 1);
    CRustVeci8::from_vec(borrow::<MockKey>(ptr).bytes.clone())
}

unsafe extern "C" fn private_key_delete(ptr: *mut RawHandle) {
    delete_handle::<MockKey>(entity::PRIVATE_KEY, ptr);
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

unsafe extern "C" fn config_create(max_entries: usize, timeout: CRustOption<u64>) -> *mut RawHandle {
    let timeout = option::decode(timeout);
    new_handle(entity::SDK_CONFIG, MockConfig { max_entries, timeout })
}

unsafe extern "C" fn config_max_entries(ptr: *const RawHandle) -> usize {
    borrow::<MockConfig>(ptr).max_entries
}

unsafe extern "C" fn config_timeout(ptr: *const RawHandle) -> CRustOption<u64> {
    option::encode(borrow::<MockConfig>(ptr).timeout)
}

unsafe extern "C" fn config_delete(ptr: *mut RawHandle) {
    delete_handle::<MockConfig>(entity::SDK_CONFIG, ptr);
}

// ---------------------------------------------------------------------------
// Groups
// ---------------------------------------------------------------------------

unsafe extern "C" fn meta_id(ptr: *const RawHandle) -> *mut RawHandle {
    let id = borrow::<GroupRecord>(ptr).id();
    new_handle(entity::GROUP_ID, MockId { id })
}

unsafe extern "C" fn meta_name(ptr: *const RawHandle) -> CRustOption<CRustString> {
    option::encode(borrow::<GroupRecord>(ptr).name().map(native_string))
}

unsafe extern "C" fn meta_is_admin(ptr: *const RawHandle) -> i8 {
    borrow::<GroupRecord>(ptr).is_admin
}

unsafe extern "C" fn meta_is_member(ptr: *const RawHandle) -> i8 {
    borrow::<GroupRecord>(ptr).is_member
}

unsafe extern "C" fn meta_created(ptr: *const RawHandle) -> i64 {
    borrow::<GroupRecord>(ptr).created
}

unsafe extern "C" fn meta_last_updated(ptr: *const RawHandle) -> i64 {
    borrow::<GroupRecord>(ptr).last_updated
}

unsafe extern "C" fn meta_needs_rotation(ptr: *const RawHandle) -> CRustOption<i8> {
    match borrow::<GroupRecord>(ptr).needs_rotation {
        -1 => option::encode_absent(),
        flag => option::encode_present(flag),
    }
}

unsafe extern "C" fn meta_delete(ptr: *mut RawHandle) {
    delete_handle::<GroupRecord>(entity::GROUP_META, ptr);
}

fn matching_records(filter: &str) -> Vec<GroupRecord> {
    with_state(|state| {
        state
            .groups
            .iter()
            .filter(|group| group.id.starts_with(filter))
            .map(GroupRecord::from_spec)
            .collect()
    })
}

unsafe extern "C" fn groups_list(filter: CRustStrView<'_>) -> CRustResultForeignVec {
    if let Some(injected) = take_injected() {
        return injected;
    }
    let filter = match view_str(&filter) {
        Ok(filter) => filter,
        Err(message) => return failure(message),
    };
    let records = matching_records(&filter);
    with_state(|state| {
        let v = CRustForeignVec::borrowed(&records);
        // Moving the Vec keeps its heap buffer where `v` points.
        state.list_buffers.push(records);
        CRustResult::ok(v)
    })
}

unsafe extern "C" fn groups_list_result(filter: CRustStrView<'_>) -> CRustResultHandle {
    if let Some(injected) = take_injected() {
        return injected;
    }
    let filter = match view_str(&filter) {
        Ok(filter) => filter,
        Err(message) => return failure(message),
    };
    let records = matching_records(&filter);
    CRustResult::ok(new_handle(entity::GROUP_LIST, MockGroupList { records }))
}

unsafe extern "C" fn groups_get_metadata(group_id: *const RawHandle) -> CRustResultHandle {
    if let Some(injected) = take_injected() {
        return injected;
    }
    let id = &borrow::<MockId>(group_id).id;
    let record = with_state(|state| {
        state
            .groups
            .iter()
            .find(|group| &group.id == id)
            .map(GroupRecord::from_spec)
    });
    match record {
        Some(record) => CRustResult::ok(new_handle(entity::GROUP_META, record)),
        None => failure(format!("group '{id}' not found")),
    }
}

unsafe extern "C" fn group_list_result(ptr: *const RawHandle) -> CRustForeignVec {
    CRustForeignVec::borrowed(&borrow::<MockGroupList>(ptr).records)
}

unsafe extern "C" fn group_list_delete(ptr: *mut RawHandle) {
    delete_handle::<MockGroupList>(entity::GROUP_LIST, ptr);
}

unsafe extern "C" fn group_create_opts_create(
    id: CRustOptionHandle,
    name: CRustOption<CRustStrView<'_>>,
    add_as_admin: i8,
    add_as_member: i8,
    members: CRustObjectSlice<'_>,
    needs_rotation: i8,
) -> *mut RawHandle {
    let id = option::decode(id).map(|ptr| borrow::<MockId>(ptr).id.clone());
    let name = option::decode(name).map(|view| String::from_utf8_lossy(view.as_bytes()).into_owned());
    let members = (0..members.len)
        .map(|i| borrow::<MockId>(members.ptr_at(i)).id.clone())
        .collect();
    let snapshot = GroupCreateSnapshot {
        id,
        name,
        add_as_admin: add_as_admin != 0,
        add_as_member: add_as_member != 0,
        members,
        needs_rotation: needs_rotation != 0,
    };
    new_handle(entity::GROUP_CREATE_OPTS, snapshot)
}

unsafe extern "C" fn group_create_opts_delete(ptr: *mut RawHandle) {
    delete_handle::<GroupCreateSnapshot>(entity::GROUP_CREATE_OPTS, ptr);
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

unsafe extern "C" fn user_account_id(ptr: *const RawHandle) -> *mut RawHandle {
    let id = borrow::<MockUserResult>(ptr).account_id.clone();
    new_handle(entity::USER_ID, MockId { id })
}

unsafe extern "C" fn user_segment_id(ptr: *const RawHandle) -> usize {
    borrow::<MockUserResult>(ptr).segment_id
}

unsafe extern "C" fn user_needs_rotation(ptr: *const RawHandle) -> i8 {
    i8::from(borrow::<MockUserResult>(ptr).needs_rotation)
}

unsafe extern "C" fn user_result_delete(ptr: *mut RawHandle) {
    delete_handle::<MockUserResult>(entity::USER_RESULT, ptr);
}

unsafe extern "C" fn users_verify(jwt: CRustStrView<'_>, timeout: CRustOption<u64>) -> CRustResultOptionHandle {
    let timeout = option::decode(timeout);
    with_state(|state| state.last_verify_timeout = Some(timeout));
    if let Some(injected) = take_injected() {
        return injected;
    }

    let jwt = match view_str(&jwt) {
        Ok(jwt) => jwt,
        Err(message) => return failure(message),
    };
    let Some(user_id) = jwt.strip_prefix("jwt:") else {
        return failure("jwt is malformed");
    };
    let user = with_state(|state| state.users.get(user_id).cloned());
    let handle = user.map(|user| {
        new_handle(
            entity::USER_RESULT,
            MockUserResult {
                account_id: user.id,
                segment_id: user.segment_id,
                needs_rotation: user.needs_rotation,
            },
        )
    });
    CRustResult::ok(option::encode(handle))
}

// ---------------------------------------------------------------------------
// Blind index search
// ---------------------------------------------------------------------------

unsafe extern "C" fn blind_index_create(salt: CRustSlicei8<'_>) -> CRustResultHandle {
    let salt = salt.as_bytes();
    if salt.is_empty() {
        return failure("blind index salt must not be empty");
    }
    CRustResult::ok(new_handle(entity::BLIND_INDEX, MockSearch { salt: salt.to_vec() }))
}

fn words(input: &str) -> impl Iterator<Item = String> + '_ {
    input.split_whitespace().map(str::to_lowercase)
}

fn push_unique(tokens: &mut Vec<u32>, token: u32) {
    if !tokens.contains(&token) {
        tokens.push(token);
    }
}

fn token_vec(tokens: Vec<u32>) -> CRustResultVeci32 {
    with_state(|state| state.counters.token_vecs_allocated += 1);
    let tokens = tokens.into_iter().map(|t| i32::from_ne_bytes(t.to_ne_bytes())).collect();
    CRustResult::ok(CRustVeci32::from_vec(tokens))
}

unsafe fn tokenize_args(
    input: &CRustStrView<'_>,
    partition_id: CRustOption<CRustStrView<'_>>,
) -> Result<(String, Option<String>), String> {
    let input = view_str(input)?;
    let partition_id = match option::decode(partition_id) {
        Some(view) => Some(view_str(&view)?),
        None => None,
    };
    Ok((input, partition_id))
}

unsafe extern "C" fn blind_index_tokenize_query(
    ptr: *const RawHandle,
    query: CRustStrView<'_>,
    partition_id: CRustOption<CRustStrView<'_>>,
) -> CRustResultVeci32 {
    if let Some(injected) = take_injected() {
        return injected;
    }
    let (query, partition_id) = match tokenize_args(&query, partition_id) {
        Ok(args) => args,
        Err(message) => return failure(message),
    };
    let salt = &borrow::<MockSearch>(ptr).salt;
    let mut tokens = Vec::new();
    for word in words(&query) {
        push_unique(&mut tokens, token(salt, partition_id.as_deref(), &word));
    }
    token_vec(tokens)
}

unsafe extern "C" fn blind_index_tokenize_data(
    ptr: *const RawHandle,
    data: CRustStrView<'_>,
    partition_id: CRustOption<CRustStrView<'_>>,
) -> CRustResultVeci32 {
    if let Some(injected) = take_injected() {
        return injected;
    }
    let (data, partition_id) = match tokenize_args(&data, partition_id) {
        Ok(args) => args,
        Err(message) => return failure(message),
    };
    let salt = &borrow::<MockSearch>(ptr).salt;
    let mut tokens = Vec::new();
    for word in words(&data) {
        // Every prefix of three or more characters, so queries match by prefix.
        let ends = word.char_indices().map(|(i, c)| i + c.len_utf8()).skip(2);
        for end in ends {
            push_unique(&mut tokens, token(salt, partition_id.as_deref(), &word[..end]));
        }
        push_unique(&mut tokens, token(salt, partition_id.as_deref(), &word));
    }
    token_vec(tokens)
}

unsafe extern "C" fn blind_index_delete(ptr: *mut RawHandle) {
    delete_handle::<MockSearch>(entity::BLIND_INDEX, ptr);
}

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

/// The mock's allocator-level functions.
pub fn runtime() -> NativeRuntime {
    NativeRuntime::new(free_string, free_vec_i8, free_vec_i32)
}

/// Function tables backed by this mock.
pub fn api() -> NativeApi {
    NativeApi {
        runtime: runtime(),
        user_id: StringIdFns {
            validate: user_id_validate,
            get_id: id_get,
            delete: user_id_delete,
        },
        group_id: StringIdFns {
            validate: group_id_validate,
            get_id: id_get,
            delete: group_id_delete,
        },
        device_id: DeviceIdFns {
            validate: device_id_validate,
            get_id: device_id_get,
            delete: device_id_delete,
        },
        public_key: PublicKeyFns {
            validate: public_key_validate,
            as_bytes: public_key_bytes,
            delete: public_key_delete,
        },
        private_key: PrivateKeyFns {
            validate: private_key_validate,
            as_bytes: private_key_bytes,
            delete: private_key_delete,
        },
        sdk_config: SdkConfigFns {
            create: config_create,
            get_max_entries: config_max_entries,
            get_timeout: config_timeout,
            delete: config_delete,
        },
        group_meta: GroupMetaFns {
            get_id: meta_id,
            get_name: meta_name,
            is_admin: meta_is_admin,
            is_member: meta_is_member,
            get_created: meta_created,
            get_last_updated: meta_last_updated,
            get_needs_rotation: meta_needs_rotation,
            delete: meta_delete,
        },
        group_list: GroupListFns {
            get_result: group_list_result,
            delete: group_list_delete,
        },
        groups: GroupOpsFns {
            list: groups_list,
            list_result: groups_list_result,
            get_metadata: groups_get_metadata,
        },
        group_create_opts: GroupCreateOptsFns {
            create: group_create_opts_create,
            delete: group_create_opts_delete,
        },
        user_result: UserResultFns {
            get_account_id: user_account_id,
            get_segment_id: user_segment_id,
            get_needs_rotation: user_needs_rotation,
            delete: user_result_delete,
        },
        users: UserOpsFns { verify: users_verify },
        blind_index: BlindIndexFns {
            create: blind_index_create,
            tokenize_query: blind_index_tokenize_query,
            tokenize_data: blind_index_tokenize_data,
            delete: blind_index_delete,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_round_trips_spec_fields() {
        let spec = GroupSpec::new("eng").name("Engineering").admin(true);
        let record = GroupRecord::from_spec(&spec);
        assert_eq!(record.id(), "eng");
        assert_eq!(record.name().as_deref(), Some(&b"Engineering"[..]));
        assert_eq!(record.needs_rotation, 1);
        assert_eq!(record.is_admin, 1);
    }

    #[test]
    fn unnamed_record() {
        let record = GroupRecord::from_spec(&GroupSpec::new("ops"));
        assert_eq!(record.name(), None);
        assert_eq!(record.needs_rotation, -1);
    }

    #[test]
    fn id_rules() {
        assert!(check_id("user id", "alice_01@example.com").is_ok());
        assert!(check_id("user id", "").is_err());
        assert!(check_id("user id", "has space").is_err());
        assert!(check_id("user id", &"a".repeat(MAX_FIELD_LEN + 1)).is_err());
    }

    #[test]
    fn tokens_depend_on_salt_and_partition() {
        let a = token(b"salt", None, "hello");
        assert_eq!(a, token(b"salt", None, "hello"));
        assert_ne!(a, token(b"pepper", None, "hello"));
        assert_ne!(a, token(b"salt", Some("tenant"), "hello"));
    }

    #[test]
    fn counters_balance() {
        let mut counters = Counters::default();
        assert!(counters.is_balanced());
        counters.created.insert(entity::USER_ID, 2);
        counters.released.insert(entity::USER_ID, 1);
        assert_eq!(counters.live(entity::USER_ID), 1);
        assert!(!counters.is_balanced());
    }
}
