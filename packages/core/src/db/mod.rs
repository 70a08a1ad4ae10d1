//! Storage Layer
//!
//! This module handles persistence for the three record families the
//! editor and reconciliation work against:
//!
//! - Chart profiles (named, user-owned node-list documents)
//! - The synced node directory (canonical roster projection)
//! - The employee roster (master data reconciliation reads from)
//!
//! # Architecture
//!
//! [`OrgStore`] is the abstraction point. Two backends implement it:
//!
//! - [`MemoryStore`]: lock-protected maps, for tests and the dev server
//! - [`RestStore`]: HTTP client against the hosted document-store facade
//!
//! Both are used behind `Arc<dyn OrgStore>`; callers never branch on the
//! backend.

mod error;
mod memory;
mod org_store;
mod rest;

pub use error::{response_detail, StorageError, ERROR_SNIPPET_LEN};
pub use memory::MemoryStore;
pub use org_store::OrgStore;
pub use rest::RestStore;
