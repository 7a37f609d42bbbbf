//! Core of a service-appointment booking client.
//!
//! Screens talk to a [`sync::BookingClient`], which performs remote I/O
//! through the [`store`] and [`blob`] adapters and then dispatches plain
//! [`state::Action`]s to the [`state::Store`]. The [`server`] module is a
//! self-hostable backend those adapters can talk to over HTTP.

pub mod blob;
pub mod config;
pub mod credentials;
pub mod models;
pub mod server;
pub mod state;
pub mod store;
pub mod sync;
