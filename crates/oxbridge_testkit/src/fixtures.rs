//! Test fixtures and SDK helpers.
//!
//! Provides an [`Sdk`] over the mock native library, plus a seeded
//! service state for common test scenarios.

use crate::mock::{self, GroupSpec, UserSpec};
use oxbridge_core::MarshalConfig;
use oxbridge_sdk::Sdk;

/// A salt accepted by the mock blind index.
pub const TEST_SALT: &[u8] = b"oxbridge-test-salt";

/// Creates an SDK over the mock with default configuration.
pub fn mock_sdk() -> Sdk {
    Sdk::new(mock::api(), MarshalConfig::default())
}

/// Creates an SDK over the mock with a custom configuration.
pub fn mock_sdk_with_config(config: MarshalConfig) -> Sdk {
    Sdk::new(mock::api(), config)
}

/// Groups served by [`seed`].
pub fn sample_groups() -> Vec<GroupSpec> {
    vec![
        GroupSpec::new("eng-backend")
            .name("Backend")
            .admin(false)
            .timestamps(1_587_745_315_000, 1_587_745_316_500),
        GroupSpec::new("eng-frontend").name("Frontend"),
        GroupSpec::new("eng-infra").admin(true).member(false),
        GroupSpec::new("sales").name("Sales"),
    ]
}

/// Users served by [`seed`].
pub fn sample_users() -> Vec<UserSpec> {
    vec![
        UserSpec::new("alice"),
        UserSpec {
            id: "bob".to_string(),
            segment_id: 7,
            needs_rotation: true,
        },
    ]
}

/// Resets the mock on this thread and loads the sample groups and users.
pub fn seed() {
    mock::reset();
    mock::set_groups(sample_groups());
    for user in sample_users() {
        mock::add_user(user);
    }
}

/// Runs a test against a freshly seeded mock.
///
/// # Example
///
/// ```rust,ignore
/// use oxbridge_testkit::with_mock_sdk;
///
/// #[test]
/// fn my_test() {
///     with_mock_sdk(|sdk| {
///         let groups = sdk.list_groups("eng-").unwrap();
///         assert_eq!(groups.len(), 3);
///     });
/// }
/// ```
pub fn with_mock_sdk<F, R>(f: F) -> R
where
    F: FnOnce(&Sdk) -> R,
{
    seed();
    let sdk = mock_sdk();
    f(&sdk)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_sdk_lists_groups() {
        with_mock_sdk(|sdk| {
            let groups = sdk.list_groups("eng-").unwrap();
            assert_eq!(groups.len(), 3);
        });
    }

    #[test]
    fn seed_resets_counters() {
        with_mock_sdk(|sdk| {
            let _ = sdk.list_groups("").unwrap();
        });
        seed();
        assert_eq!(mock::counters(), mock::Counters::default());
    }
}
