// crates/trellis-layout/src/lib.rs

use glam::Vec2;
use std::collections::HashMap;
use trellis_core::{NodeId, NodeTree};

pub mod size;
pub mod linear;
pub mod grid;
pub mod scroll;
pub mod split;
pub mod engine;

pub use size::*;
pub use linear::{allocate_linear, allocate_single, AllocItem, Allocation, FIT_TOLERANCE};
pub use grid::*;
pub use scroll::*;
pub use split::*;
pub use engine::*;

#[derive(Debug, Clone, Default)]
pub struct LayoutResult {
    /// Absolute positions, scroll offsets included.
    pub computed_positions: HashMap<NodeId, Vec2>,
    pub computed_sizes: HashMap<NodeId, Vec2>,
    /// Positions relative to the parent's origin, before scrolling.
    pub relative_positions: HashMap<NodeId, Vec2>,
}

impl LayoutResult {
    pub fn position(&self, id: NodeId) -> Option<Vec2> {
        self.computed_positions.get(&id).copied()
    }

    pub fn size(&self, id: NodeId) -> Option<Vec2> {
        self.computed_sizes.get(&id).copied()
    }
}

pub trait LayoutEngine {
    fn compute_layout(&mut self, tree: &NodeTree, root: NodeId, viewport_size: Vec2) -> LayoutResult;
}
