use thiserror::Error;

/// The node's document is not shown in any window, so style and geometry
/// queries have no meaning for it.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("cannot check visibility of non-attached node {node}")]
pub struct AttachmentError {
    /// Debug rendering of the node handle.
    pub node: String,
}

impl AttachmentError {
    pub fn new(node: impl Into<String>) -> Self {
        Self { node: node.into() }
    }
}
