//! Property-based test generators using proptest.
//!
//! Provides strategies for generating host values that cross the
//! boundary, and mock service data.

use crate::mock::{GroupSpec, MAX_FIELD_LEN, PRIVATE_KEY_LEN, PUBLIC_KEY_LEN};
use proptest::prelude::*;
use std::time::Duration;

/// Characters the mock accepts in ids besides ASCII alphanumerics.
const ID_PUNCTUATION: &str = "_.$#|@/:;=+'-";

/// Strategy for arbitrary Unicode strings, including interior NULs.
pub fn unicode_string_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(any::<char>(), 0..256).prop_map(|chars| chars.into_iter().collect())
}

/// Strategy for byte strings biased towards the high half (0x80..=0xFF).
pub fn high_byte_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(prop_oneof![0x80u8..=0xFF, any::<u8>()], 0..512)
}

/// Strategy for arbitrary byte strings.
pub fn bytes_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..1024)
}

/// Strategy for ids the mock validator accepts.
pub fn valid_id_strategy() -> impl Strategy<Value = String> {
    // The trailing '-' in the punctuation keeps it literal inside the class.
    let pattern = format!("[a-zA-Z0-9{ID_PUNCTUATION}]{{1,{MAX_FIELD_LEN}}}");
    prop::string::string_regex(&pattern).expect("Invalid regex")
}

/// Strategy for ids the mock validator rejects.
pub fn invalid_id_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        "[a-z]{0,10} [a-z]{0,10}",
        "[a-z]{1,10}[!%^&*()]{1,3}",
        "[a-z]{101,120}",
    ]
}

/// Strategy for public key bytes of the accepted length.
pub fn public_key_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), PUBLIC_KEY_LEN)
}

/// Strategy for private key bytes of the accepted length.
pub fn private_key_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), PRIVATE_KEY_LEN)
}

/// Strategy for optional operation timeouts, whole milliseconds.
pub fn timeout_strategy() -> impl Strategy<Value = Option<Duration>> {
    prop::option::of((0u64..=86_400_000).prop_map(Duration::from_millis))
}

/// Strategy for millisecond timestamps around the epoch.
pub fn timestamp_strategy() -> impl Strategy<Value = i64> {
    -4_102_444_800_000i64..=4_102_444_800_000
}

/// Strategy for one group record.
pub fn group_spec_strategy() -> impl Strategy<Value = GroupSpec> {
    (
        "[a-z0-9-]{1,40}",
        prop::option::of("[ -~]{0,60}"),
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
        timestamp_strategy(),
        timestamp_strategy(),
    )
        .prop_map(|(id, name, admin, member, rotation, created, updated)| {
            let mut spec = GroupSpec::new(id).member(member).timestamps(created, updated);
            if let Some(name) = name {
                spec = spec.name(&name);
            }
            if admin {
                spec = spec.admin(rotation);
            }
            spec
        })
}

/// Strategy for a list of groups with distinct ids.
pub fn group_list_strategy(max: usize) -> impl Strategy<Value = Vec<GroupSpec>> {
    prop::collection::vec(group_spec_strategy(), 0..=max).prop_map(|groups| {
        let mut seen = std::collections::HashSet::new();
        groups.into_iter().filter(|g| seen.insert(g.id.clone())).collect()
    })
}
