//! Integration test for the process-wide environment.
//!
//! The environment is global, so the whole lifecycle runs in one test.

use oxbridge_core::MarshalConfig;
use oxbridge_sdk::{env, SdkError, UserId};
use oxbridge_testkit::{init_tracing, mock};

#[test]
fn environment_lifecycle() {
    init_tracing();
    mock::reset();

    // Uninitialized
    assert!(!env::is_ready());
    assert_eq!(env::sdk().unwrap_err(), SdkError::NotInitialized);
    assert_eq!(env::teardown().unwrap_err(), SdkError::NotInitialized);

    // Ready
    let sdk = env::init_with_config(
        mock::api(),
        MarshalConfig::new().error_fallback("native error"),
    )
    .unwrap();
    assert!(env::is_ready());
    assert_eq!(sdk.config().error_fallback, "native error");
    assert_eq!(env::init(mock::api()).unwrap_err(), SdkError::AlreadyInitialized);

    let installed = env::sdk().unwrap();
    let user = UserId::new(&installed, "alice").unwrap();

    // TornDown
    env::teardown().unwrap();
    assert!(!env::is_ready());
    assert_eq!(env::sdk().unwrap_err(), SdkError::TornDown);
    assert_eq!(env::teardown().unwrap_err(), SdkError::TornDown);
    assert_eq!(env::init(mock::api()).unwrap_err(), SdkError::TornDown);

    // Values created before teardown keep working until dropped.
    assert_eq!(user.id(), "alice");
    drop(user);
    assert!(mock::counters().is_balanced());
}
