// crates/trellis-layout/src/size.rs

use glam::Vec2;
use trellis_core::{Dim, LayoutStyle, Spacing, Vec2Ext};

/// How big a node wants to be along each axis.
///
/// `max` uses 0 for "unconstrained" and a negative value for "stretch
/// without bound".
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SizePrefs {
    /// Minimum size needed; never below the allocated size.
    pub need: Vec2,
    /// Preferred size; layout starts from here.
    pub pref: Vec2,
    pub max: Vec2,
}

impl SizePrefs {
    /// Can stretch infinitely along `d`.
    pub fn has_max_stretch(&self, d: Dim) -> bool {
        self.max.dim(d) < 0.0
    }

    /// Has room to grow from need toward pref along `d`.
    pub fn can_stretch_need(&self, d: Dim) -> bool {
        self.pref.dim(d) > self.need.dim(d)
    }
}

/// Everything the engine computes for one node.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LayoutData {
    pub size: SizePrefs,
    pub margins: Spacing,
    /// (col, row) cell within a grid parent.
    pub grid_pos: (usize, usize),
    /// (cols, rows) covered; at least 1 each.
    pub grid_span: (usize, usize),
    /// Size allocated by the parent layout.
    pub alloc_size: Vec2,
    /// Absolute position, including any scroll offset.
    pub alloc_pos: Vec2,
    /// Position relative to the parent's origin, from the constraint solve.
    pub alloc_pos_rel: Vec2,
    /// `alloc_pos` before any scroll offset; baseline for every move.
    pub alloc_pos_orig: Vec2,
}

impl LayoutData {
    pub fn new() -> Self {
        let mut ld = Self::default();
        ld.defaults();
        ld
    }

    pub fn defaults(&mut self) {
        self.grid_span.0 = self.grid_span.0.max(1);
        self.grid_span.1 = self.grid_span.1.max(1);
    }

    /// Seed size hints from a resolved style. Clears all allocations first.
    pub fn set_from_style(&mut self, style: &LayoutStyle) {
        self.reset();
        self.size.need = style.min_size_dots();
        self.size.pref = style.size_dots();
        self.size.max = style.max_size_dots();
        self.margins = style.margin;
        if let Some(cell) = style.explicit_cell() {
            self.grid_pos = cell;
        }
        self.grid_span = style.spans();
        // initial desired position; the parent layout normally overrides it
        self.alloc_pos = style.pos;
    }

    /// Zero every allocation field.
    pub fn reset(&mut self) {
        self.alloc_size = Vec2::ZERO;
        self.alloc_pos = Vec2::ZERO;
        self.alloc_pos_rel = Vec2::ZERO;
        self.alloc_pos_orig = Vec2::ZERO;
    }

    /// Re-establish need >= alloc, pref >= need, and both <= max.
    pub fn update_sizes(&mut self) {
        self.size.need = self.size.need.max(self.alloc_size);
        self.size.pref = self.size.pref.max(self.size.need);
        self.size.need.set_min_pos(self.size.max);
        self.size.pref.set_min_pos(self.size.max);
    }

    /// Place this node under a parent whose unscrolled absolute position is
    /// `parent_orig`, recording the unscrolled baseline.
    pub fn place_under(&mut self, parent_orig: Vec2) {
        self.alloc_pos = parent_orig + self.alloc_pos_rel;
        self.alloc_pos_orig = self.alloc_pos;
    }

    /// Apply a scroll offset from the unscrolled baseline.
    pub fn move_by(&mut self, delta: Vec2) {
        self.alloc_pos = self.alloc_pos_orig + delta;
    }
}
