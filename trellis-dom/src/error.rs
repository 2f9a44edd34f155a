use thiserror::Error;

use crate::dom::NodeId;

/// Errors raised by document operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomError {
    /// The node does not exist in the document (never created or already removed).
    #[error("node {0} not found")]
    NodeNotFound(NodeId),

    /// The node is not a child of the given parent.
    #[error("node {child} is not a child of {parent}")]
    NotAChild { parent: NodeId, child: NodeId },

    /// Inserting the node would make it its own ancestor.
    #[error("cannot insert {child} into its own descendant {parent}")]
    HierarchyRequest { parent: NodeId, child: NodeId },

    /// The operation requires an element node but got a text node.
    #[error("node {0} is not an element")]
    NotAnElement(NodeId),

    /// The operation requires a text node but got an element.
    #[error("node {0} is not a text node")]
    NotText(NodeId),
}

pub type Result<T> = std::result::Result<T, DomError>;
