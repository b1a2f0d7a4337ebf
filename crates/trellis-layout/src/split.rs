// crates/trellis-layout/src/split.rs

//! Proportional split of a fixed space among children.
//!
//! Unlike the other layouts this never looks at size preferences: each
//! child simply gets its share of the extent left after the handles.

use glam::Vec2;
use trellis_core::{vec_on, Dim, Result, TrellisError, Vec2Ext};

/// Default gap between split children, in dots.
pub const DEFAULT_HANDLE_WIDTH: f32 = 10.0;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SplitView {
    /// Share of each child, normalized to sum to 1. Zero collapses a child.
    pub splits: Vec<f32>,
    /// Snapshot for `restore_splits`.
    pub saved_splits: Vec<f32>,
    pub dim: Dim,
}

impl SplitView {
    pub fn new(dim: Dim) -> Self {
        Self { splits: Vec::new(), saved_splits: Vec::new(), dim }
    }

    /// Match the splits to `n` children and normalize them. New entries
    /// start at 0; an all-zero set becomes an even split.
    pub fn update_splits(&mut self, n: usize) {
        if n == 0 {
            return;
        }
        if self.splits.len() != n {
            self.splits.resize(n, 0.0);
        }
        let mut sum: f32 = self.splits.iter().sum();
        if sum == 0.0 {
            let even = 1.0 / n as f32;
            self.splits.iter_mut().for_each(|s| *s = even);
            sum = 1.0;
        }
        let norm = 1.0 / sum;
        self.splits.iter_mut().for_each(|s| *s *= norm);
    }

    /// Set the leading proportions (extra values are ignored) and
    /// renormalize.
    pub fn set_splits(&mut self, n: usize, splits: &[f32]) {
        self.update_splits(n);
        for (dst, src) in self.splits.iter_mut().zip(splits) {
            *dst = *src;
        }
        self.update_splits(n);
    }

    pub fn save_splits(&mut self) {
        self.saved_splits.clone_from(&self.splits);
    }

    /// Bring back the last saved splits, if any.
    pub fn restore_splits(&mut self, n: usize) {
        if self.saved_splits.is_empty() {
            return;
        }
        if self.saved_splits.len() == n {
            self.splits.clone_from(&self.saved_splits);
        } else {
            let saved = self.saved_splits.clone();
            self.set_splits(n, &saved);
        }
    }

    /// Collapse the given children to zero, optionally saving first. Every
    /// index is checked before anything changes.
    pub fn collapse(&mut self, n: usize, save: bool, indices: &[usize]) -> Result<()> {
        if let Some(&index) = indices.iter().find(|&&i| i >= n) {
            return Err(TrellisError::InvalidIndex { index, len: n });
        }
        if self.splits.len() != n {
            self.update_splits(n);
        }
        if save {
            self.save_splits();
        }
        for &i in indices {
            self.splits[i] = 0.0;
        }
        self.update_splits(n);
        Ok(())
    }

    /// Positions and sizes of `n` children within `alloc_size`, relative to
    /// the split view.
    pub fn allocate(&mut self, n: usize, alloc_size: Vec2, handle_width: f32) -> Vec<(Vec2, Vec2)> {
        if n == 0 {
            return Vec::new();
        }
        self.update_splits(n);
        let odim = self.dim.other();
        let avail = (alloc_size.dim(self.dim) - handle_width * (n - 1) as f32).max(0.0);
        let osz = alloc_size.dim(odim);
        let mut pos = 0.0;
        self.splits
            .iter()
            .map(|sp| {
                let size = sp * avail;
                let out = (vec_on(self.dim, pos, 0.0), vec_on(self.dim, size, osz));
                pos += size + handle_width;
                out
            })
            .collect()
    }
}
