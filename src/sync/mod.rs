//! Action creators that synchronize local state with the remote backend.
//!
//! [`BookingClient`] owns the document, blob and credential adapters plus
//! the [`Store`](crate::state::Store). Each operation performs its remote
//! I/O and dispatches a plain [`Action`](crate::state::Action) only after
//! that I/O succeeded.

mod client;
pub mod dispatch;
mod error;

pub use client::{BookingClient, DEFAULT_IMAGE_PREFIX};
pub use dispatch::EntityKind;
pub use error::SyncError;
