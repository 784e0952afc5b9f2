//! # oxbridge Testkit
//!
//! Test utilities for oxbridge.
//!
//! This crate provides:
//! - An in-process mock of the native library with allocation counters
//! - Ready-made SDK fixtures over the mock
//! - Property-based test generators using proptest
//! - Lifecycle stress helpers
//! - Tracing setup for tests
//!
//! ## Usage
//!
//! ```rust,ignore
//! use oxbridge_testkit::prelude::*;
//!
//! #[test]
//! fn ids_release_their_handles() {
//!     with_mock_sdk(|sdk| {
//!         let user = UserId::new(sdk, "alice").unwrap();
//!         assert_eq!(user.id(), "alice");
//!     });
//!     assert!(mock::counters().is_balanced());
//! }
//! ```

#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod logging;
#[allow(unsafe_code)]
pub mod mock;
pub mod stress;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::logging::init_tracing;
    pub use crate::mock::{self, GroupSpec, UserSpec};
    pub use crate::stress::*;
    pub use oxbridge_sdk::*;
}

pub use fixtures::*;
pub use generators::*;
pub use logging::init_tracing;
pub use stress::*;
