//! # oxbridge SDK
//!
//! Domain values backed by native handles.
//!
//! Every value here owns exactly one native handle and releases it when
//! dropped. Getters copy their results into host memory, so nothing
//! returned borrows from the native side.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use oxbridge_sdk::{env, UserId};
//!
//! let sdk = env::init(native_api())?;
//! let user = UserId::new(&sdk, "alice")?;
//! assert_eq!(user.id(), "alice");
//!
//! for group in sdk.list_groups("eng-")? {
//!     println!("{:?} admin={}", group.name(), group.is_admin());
//! }
//! ```

#![warn(missing_docs)]

pub mod api;
pub mod config;
pub mod env;
pub mod error;
pub mod group;
pub mod ids;
pub mod keys;
pub mod sdk;
pub mod search;
pub mod user;

pub use api::NativeApi;
pub use config::{ConfigOptions, SdkConfig};
pub use error::{SdkError, SdkResult};
pub use group::{GroupCreateOptions, GroupCreateOpts, GroupList, GroupMeta};
pub use ids::{DeviceId, GroupId, UserId};
pub use keys::{PrivateKey, PublicKey};
pub use sdk::Sdk;
pub use search::BlindIndexSearch;
pub use user::UserResult;
