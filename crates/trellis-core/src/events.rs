// crates/trellis-core/src/events.rs
use crate::{Dim, NodeId};
use glam::Vec2;

/// Emitted when a container's scrollbar changes value.
///
/// The engine returns this from the scroll call instead of invoking a
/// callback; whoever schedules redraws consumes it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollEvent {
    pub node: NodeId,
    pub dim: Dim,
    /// New scrollbar value, in dots from the start of the content.
    pub value: f32,
    /// Offset now applied to the container's descendants.
    pub offset: Vec2,
    /// True when the container was mid-update and the move was queued.
    pub deferred: bool,
}
