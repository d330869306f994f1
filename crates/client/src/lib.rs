//! Grocer client library.
//!
//! Grocer is a household grocery and meal-planning application backed by a
//! hosted database-and-auth service. This crate is the client side: typed
//! access to the service's rows, authentication, and a synchronized,
//! observable view of the caller's households.
//!
//! # Architecture
//!
//! - [`remote`] - HTTP clients for the hosted service (REST rows, auth,
//!   change-notification stream) plus an in-process backend for tests
//! - [`repos`] - thin per-entity query layers over the remote clients
//! - [`store`] - shared observable state with typed slices
//! - [`sync`] - the household synchronization engine
//! - [`invites`] - invite draft flow with debounced user search
//! - [`auth`] - signup flow and form validation
//!
//! The service is always the source of truth; everything this crate holds
//! is a transient cached copy refreshed on change notifications.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//!
//! use grocer_client::config::GrocerConfig;
//! use grocer_client::remote::{RealtimeClient, RestClient};
//! use grocer_client::repos::HouseholdRepository;
//! use grocer_client::store::Store;
//! use grocer_client::sync::HouseholdSync;
//!
//! let config = GrocerConfig::from_env()?;
//! let repo = HouseholdRepository::new(
//!     RestClient::new(&config)?,
//!     RealtimeClient::new(&config)?,
//! );
//!
//! let sync = HouseholdSync::new(Arc::new(repo), Store::new());
//! sync.activate(Some(user_id));
//!
//! let state = sync.state();
//! println!("{} households", state.households.len());
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod auth;
pub mod config;
pub mod error;
pub mod invites;
pub mod models;
pub mod remote;
pub mod repos;
pub mod store;
pub mod sync;
