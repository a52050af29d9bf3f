//! `rollcall-store` — access to the hosted tables the job reads and appends to.
//!
//! [`RosterStore`] is the seam the job runs against; [`SupabaseStore`] is the
//! PostgREST implementation used in production.

pub mod error;
pub mod rest;
pub mod store;

pub use error::{Result, StoreError};
pub use rest::SupabaseStore;
pub use store::RosterStore;
