//! # Hosted backend access
//!
//! Everything the server needs to reach the backend-as-a-service that owns
//! the portal's data.
//!
//! | Item | Feature gate | Purpose |
//! |------|-------------|---------|
//! | [`rest`] | - | URL builders and REST query-string encoding of [`store::Query`] |
//! | [`BackendConfig`] / [`app_config`] | `server` | Connection settings from the environment, `alumni.toml` |
//! | [`BackendError`] | `server` | Transport and status errors, convertible into [`store::StoreError`] |
//! | [`HostedStore`] | `server` | [`store::TableStore`] over REST and object storage |

pub mod rest;

#[cfg(feature = "server")]
mod client;
#[cfg(feature = "server")]
mod config;
#[cfg(feature = "server")]
mod error;

#[cfg(feature = "server")]
pub use client::HostedStore;
#[cfg(feature = "server")]
pub(crate) use client::{check as check_response, http as http_client};
#[cfg(feature = "server")]
pub use config::{app_config, BackendConfig};
#[cfg(feature = "server")]
pub use error::BackendError;
