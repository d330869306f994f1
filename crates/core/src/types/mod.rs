//! Core types for Grocer.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod name;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use name::{NameError, PersonName};
pub use status::InviteStatus;
