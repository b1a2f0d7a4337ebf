// crates/trellis-core/src/style.rs

use crate::{Dim, Vec2Ext};
use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::ops::Add;

/// Alignment of an item within the space its parent gives it.
///
/// Only `Start`, `Middle`, `End` and `Justify` change layout; the rest are
/// accepted so resolved styles can pass them through unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Align {
    #[default]
    Start,
    Middle,
    End,
    Justify,
    Baseline,
    SpaceAround,
    Sub,
    Super,
}

impl Align {
    pub fn is_middle(self) -> bool {
        matches!(self, Align::Middle)
    }

    pub fn is_end(self) -> bool {
        matches!(self, Align::End)
    }
}

/// What a container does with content that does not fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Overflow {
    #[default]
    Auto,
    /// Same as `Auto`.
    Scroll,
    /// Same as `Auto`.
    Visible,
    /// Clip, never add scrollbars.
    Hidden,
}

impl Overflow {
    pub fn allows_scroll(self) -> bool {
        self != Overflow::Hidden
    }
}

/// Four-sided spacing in dots (margins, padding, box spacing).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Spacing {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

impl Spacing {
    pub const ZERO: Spacing = Spacing { left: 0.0, right: 0.0, top: 0.0, bottom: 0.0 };

    pub fn uniform(value: f32) -> Self {
        Self { left: value, right: value, top: value, bottom: value }
    }

    /// Leading side on the given axis (left or top).
    pub fn start(&self, d: Dim) -> f32 {
        match d {
            Dim::X => self.left,
            Dim::Y => self.top,
        }
    }

    /// Trailing side on the given axis (right or bottom).
    pub fn end(&self, d: Dim) -> f32 {
        match d {
            Dim::X => self.right,
            Dim::Y => self.bottom,
        }
    }

    pub fn total(&self, d: Dim) -> f32 {
        self.start(d) + self.end(d)
    }

    pub fn start_vec(&self) -> Vec2 {
        Vec2::new(self.left, self.top)
    }

    pub fn total_vec(&self) -> Vec2 {
        Vec2::new(self.total(Dim::X), self.total(Dim::Y))
    }
}

impl Add for Spacing {
    type Output = Spacing;

    fn add(self, rhs: Spacing) -> Spacing {
        Spacing {
            left: self.left + rhs.left,
            right: self.right + rhs.right,
            top: self.top + rhs.top,
            bottom: self.bottom + rhs.bottom,
        }
    }
}

/// Resolved layout style for one node, all lengths already in dots.
///
/// Size semantics follow the engine's size model: `width/height` seed the
/// preferred size, `min_*` the needed size, and `max_*` the maximum, where
/// 0 means unconstrained and a negative value means "stretch without bound".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutStyle {
    pub align_h: Align,
    pub align_v: Align,
    pub pos: Vec2,
    pub width: f32,
    pub height: f32,
    pub min_width: f32,
    pub min_height: f32,
    pub max_width: f32,
    pub max_height: f32,
    pub margin: Spacing,
    pub padding: Spacing,
    pub border_width: f32,
    pub overflow: Overflow,
    /// Explicit column count for grid layouts, 0 = derive from children.
    pub columns: usize,
    pub grid_col: Option<usize>,
    pub grid_row: Option<usize>,
    pub col_span: usize,
    pub row_span: usize,
    pub scrollbar_width: f32,
    /// Height of one line of text, used as the scroll step.
    pub line_height: f32,
}

impl Default for LayoutStyle {
    fn default() -> Self {
        Self {
            align_h: Align::Start,
            align_v: Align::Start,
            pos: Vec2::ZERO,
            width: 0.0,
            height: 0.0,
            min_width: 2.0,
            min_height: 2.0,
            max_width: 0.0,
            max_height: 0.0,
            margin: Spacing::ZERO,
            padding: Spacing::ZERO,
            border_width: 0.0,
            overflow: Overflow::Auto,
            columns: 0,
            grid_col: None,
            grid_row: None,
            col_span: 1,
            row_span: 1,
            scrollbar_width: 16.0,
            line_height: 16.0,
        }
    }
}

impl LayoutStyle {
    /// Infinitely stretchy spacer.
    pub fn stretch() -> Self {
        Self { max_width: -1.0, max_height: -1.0, ..Self::default() }
    }

    /// Fixed blank square of one line height.
    pub fn space() -> Self {
        let base = Self::default();
        Self { width: base.line_height, height: base.line_height, ..base }
    }

    /// Container drawn with the standard box model.
    pub fn frame() -> Self {
        Self {
            margin: Spacing::uniform(2.0),
            padding: Spacing::uniform(2.0),
            border_width: 2.0,
            ..Self::default()
        }
    }

    pub fn split_view() -> Self {
        Self::stretch()
    }

    pub fn with_size(mut self, width: f32, height: f32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_min_size(mut self, width: f32, height: f32) -> Self {
        self.min_width = width;
        self.min_height = height;
        self
    }

    pub fn with_max_size(mut self, width: f32, height: f32) -> Self {
        self.max_width = width;
        self.max_height = height;
        self
    }

    pub fn with_align(mut self, align_h: Align, align_v: Align) -> Self {
        self.align_h = align_h;
        self.align_v = align_v;
        self
    }

    pub fn with_grid_cell(mut self, col: usize, row: usize) -> Self {
        self.grid_col = Some(col);
        self.grid_row = Some(row);
        self
    }

    /// Alignment along the given axis.
    pub fn align(&self, d: Dim) -> Align {
        match d {
            Dim::X => self.align_h,
            Dim::Y => self.align_v,
        }
    }

    pub fn size_dots(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    pub fn min_size_dots(&self) -> Vec2 {
        Vec2::new(self.min_width, self.min_height)
    }

    pub fn max_size_dots(&self) -> Vec2 {
        Vec2::new(self.max_width, self.max_height)
    }

    /// Margin + padding + border on each side.
    pub fn box_space(&self) -> Spacing {
        self.margin + self.padding + Spacing::uniform(self.border_width)
    }

    /// Grid spans, never less than one.
    pub fn spans(&self) -> (usize, usize) {
        (self.col_span.max(1), self.row_span.max(1))
    }

    /// Explicit grid cell, if the node asks for one. A missing coordinate
    /// means 0.
    pub fn explicit_cell(&self) -> Option<(usize, usize)> {
        if self.grid_col.is_none() && self.grid_row.is_none() {
            return None;
        }
        Some((self.grid_col.unwrap_or(0), self.grid_row.unwrap_or(0)))
    }

    /// Extent of `size` left after trailing box space on axis `d`.
    pub fn content_end(&self, size: Vec2, d: Dim) -> f32 {
        size.dim(d) - self.box_space().end(d)
    }
}
