// crates/trellis-core/src/lib.rs
pub mod geometry;
pub mod style;
pub mod node;
pub mod events;
pub mod scene;

pub use geometry::*;
pub use style::*;
pub use node::*;
pub use events::*;
pub use scene::*;

#[derive(Debug, thiserror::Error)]
pub enum TrellisError {
    #[error("Index {index} out of range (len {len})")]
    InvalidIndex { index: usize, len: usize },

    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("Node {0} is not a layout container")]
    NotAContainer(NodeId),

    #[error("Node {node} is not a {expected} container")]
    WrongLayoutKind { node: NodeId, expected: &'static str },

    #[error("Node {node} has no active {dim:?} scrollbar")]
    NotScrollable { node: NodeId, dim: Dim },

    #[error("Invalid scene: {0}")]
    InvalidScene(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TrellisError>;
