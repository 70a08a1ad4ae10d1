//! Business Services
//!
//! This module contains the core business logic services:
//!
//! - `ProfileService` - owner-scoped chart profile CRUD and the
//!   department bootstrap flow
//! - `RosterSync` - one-way projection of the employee roster into the
//!   canonical node table
//!
//! Services coordinate between the storage layer and application logic;
//! the HTTP API and the dev server both sit on top of them.

pub mod error;
pub mod profiles;
pub mod sync;

pub use error::{ProfileError, SyncError};
pub use profiles::ProfileService;
pub use sync::{RosterSync, SyncReport, DEFAULT_IMAGE_BASE_URL};
