//! Editor Error Types
//!
//! Errors surfaced by the chart session's mutation API. These are
//! synchronous signals the interaction translator turns into user-facing
//! rejections; the session itself stays usable after any of them.

use thiserror::Error;

/// Errors from chart session mutations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditorError {
    /// Inserting or renaming would collide with an existing node id.
    /// Rejected before any state changes.
    #[error("node id \"{id}\" already exists")]
    DuplicateId { id: String },

    /// The addressed node is not in the session.
    #[error("node not found: {id}")]
    NodeNotFound { id: String },

    /// An edit form was submitted with a blank id field.
    #[error("node id is required")]
    IdRequired,
}

impl EditorError {
    /// Create a DuplicateId error
    pub fn duplicate_id(id: impl Into<String>) -> Self {
        EditorError::DuplicateId { id: id.into() }
    }

    /// Create a NodeNotFound error
    pub fn node_not_found(id: impl Into<String>) -> Self {
        EditorError::NodeNotFound { id: id.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let duplicate = EditorError::duplicate_id("emp_1");
        assert_eq!(duplicate.to_string(), "node id \"emp_1\" already exists");

        let missing = EditorError::node_not_found("ghost");
        assert_eq!(missing.to_string(), "node not found: ghost");
    }

    #[test]
    fn test_constructor_helpers_match_variants() {
        assert_eq!(
            EditorError::duplicate_id("x"),
            EditorError::DuplicateId { id: "x".into() }
        );
        assert_eq!(
            EditorError::node_not_found("y"),
            EditorError::NodeNotFound { id: "y".into() }
        );
    }
}
