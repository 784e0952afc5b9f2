//! Process-wide native environment.
//!
//! The native library is initialized at most once per process and torn
//! down at most once. After teardown the environment cannot come back.
//!
//! ```text
//! Uninitialized --init--> Ready --teardown--> TornDown
//! ```
//!
//! Values created from the [`Sdk`] keep their own reference to the
//! function tables and stay usable until dropped.

use crate::api::NativeApi;
use crate::error::{SdkError, SdkResult};
use crate::sdk::Sdk;
use oxbridge_core::MarshalConfig;
use parking_lot::{const_rwlock, RwLock};

enum State {
    Uninitialized,
    Ready(Sdk),
    TornDown,
}

static ENV: RwLock<State> = const_rwlock(State::Uninitialized);

/// Installs the native function tables with the default configuration.
pub fn init(api: NativeApi) -> SdkResult<Sdk> {
    init_with_config(api, MarshalConfig::default())
}

/// Installs the native function tables.
pub fn init_with_config(api: NativeApi, config: MarshalConfig) -> SdkResult<Sdk> {
    let mut state = ENV.write();
    match &*state {
        State::Uninitialized => {}
        State::Ready(_) => return Err(SdkError::AlreadyInitialized),
        State::TornDown => return Err(SdkError::TornDown),
    }

    let sdk = Sdk::new(api, config);
    *state = State::Ready(sdk.clone());
    tracing::debug!("native environment initialized");
    Ok(sdk)
}

/// Returns the installed SDK.
pub fn sdk() -> SdkResult<Sdk> {
    match &*ENV.read() {
        State::Ready(sdk) => Ok(sdk.clone()),
        State::Uninitialized => Err(SdkError::NotInitialized),
        State::TornDown => Err(SdkError::TornDown),
    }
}

/// Returns true between [`init`] and [`teardown`].
pub fn is_ready() -> bool {
    matches!(*ENV.read(), State::Ready(_))
}

/// Ends the environment's lifecycle.
pub fn teardown() -> SdkResult<()> {
    let mut state = ENV.write();
    match &*state {
        State::Ready(_) => {}
        State::Uninitialized => return Err(SdkError::NotInitialized),
        State::TornDown => return Err(SdkError::TornDown),
    }

    *state = State::TornDown;
    tracing::debug!("native environment torn down");
    Ok(())
}
