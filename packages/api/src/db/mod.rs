//! # Database module: session store connection pool
//!
//! Business data lives in the hosted backend and is reached over REST (see
//! [`crate::backend`]). The only database this server talks to directly is
//! the PostgreSQL instance that backs `tower-sessions`. The module is gated
//! behind `#[cfg(feature = "server")]` so client (WASM) builds never pull in
//! SQLx.
//!
//! The pool is a **lazy, process-wide singleton** backed by a
//! [`tokio::sync::OnceCell`]. The first call to [`get_pool`] reads
//! `DATABASE_URL` from the environment (via `dotenvy`), opens up to 5
//! connections, and caches the result for all subsequent callers.

#[cfg(feature = "server")]
mod pool;

#[cfg(feature = "server")]
pub use pool::get_pool;
