// crates/trellis-layout/src/linear.rs

//! One-axis space distribution.
//!
//! The same routine sizes the children of rows and columns and the tracks of
//! a grid: start from preferred sizes, fall back to needed sizes when the
//! preferred ones do not fit, then hand out what is left over either to the
//! stretchable items, as justify gaps, or as a single alignment offset.

use crate::SizePrefs;
use trellis_core::{Align, Dim, Vec2Ext};

/// Slack allowed before preferred sizes are considered not to fit.
pub const FIT_TOLERANCE: f32 = 0.1;

/// Size preferences of one item along the axis being allocated.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AllocItem {
    pub need: f32,
    pub pref: f32,
    pub max: f32,
}

impl AllocItem {
    pub fn new(need: f32, pref: f32, max: f32) -> Self {
        Self { need, pref, max }
    }

    pub fn from_prefs(size: &SizePrefs, d: Dim) -> Self {
        Self {
            need: size.need.dim(d),
            pref: size.pref.dim(d),
            max: size.max.dim(d),
        }
    }

    pub fn has_max_stretch(&self) -> bool {
        self.max < 0.0
    }

    pub fn can_stretch_need(&self) -> bool {
        self.pref > self.need
    }

    fn base(&self, use_pref: bool) -> f32 {
        if use_pref {
            self.pref
        } else {
            self.need
        }
    }

    fn is_candidate(&self, use_pref: bool) -> bool {
        if use_pref {
            self.has_max_stretch()
        } else {
            self.has_max_stretch() || self.can_stretch_need()
        }
    }
}

/// Resolved position and size along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Allocation {
    pub pos: f32,
    pub size: f32,
}

/// Decide whether preferred sizes fit; returns (use_pref, extra).
fn fit(avail: f32, need: f32, pref: f32, tolerance: f32) -> (bool, f32) {
    let extra = avail - pref;
    if extra < -tolerance {
        (false, (avail - need).max(0.0))
    } else {
        (true, extra.max(0.0))
    }
}

/// Lay out `items` one after another along an axis, starting at `offset`.
pub fn allocate_linear(
    avail: f32,
    items: &[AllocItem],
    align: Align,
    offset: f32,
    tolerance: f32,
) -> Vec<Allocation> {
    if items.is_empty() {
        return Vec::new();
    }

    let need: f32 = items.iter().map(|it| it.need).sum();
    let pref: f32 = items.iter().map(|it| it.pref).sum();
    let (use_pref, extra) = fit(avail, need, pref, tolerance);

    let mut n_stretch = 0usize;
    let mut stretch_tot = 0.0;
    if extra > 0.0 {
        for it in items.iter().filter(|it| it.is_candidate(use_pref)) {
            n_stretch += 1;
            stretch_tot += it.pref;
        }
    }
    let stretching = n_stretch > 0;

    let justify_gap = if !stretching && extra > 0.0 && align == Align::Justify && items.len() > 1 {
        extra / (items.len() - 1) as f32
    } else {
        0.0
    };

    let mut pos = offset;
    if !stretching {
        if align.is_middle() {
            pos += 0.5 * extra;
        } else if align.is_end() {
            pos += extra;
        }
    }

    let mut out = Vec::with_capacity(items.len());
    for (i, it) in items.iter().enumerate() {
        let mut size = it.base(use_pref);
        if stretching {
            if it.is_candidate(use_pref) {
                // all-zero prefs would divide by zero; share evenly instead
                let share = if stretch_tot > 0.0 {
                    it.pref / stretch_tot
                } else {
                    1.0 / n_stretch as f32
                };
                size += extra * share;
            }
        } else if i > 0 {
            pos += justify_gap;
        }
        out.push(Allocation { pos, size });
        pos += size;
    }
    out
}

/// Place a single item within `avail`, as for the cross axis of a row or
/// column, or a cell within one grid track.
pub fn allocate_single(avail: f32, item: AllocItem, align: Align, offset: f32, tolerance: f32) -> Allocation {
    let (use_pref, extra) = fit(avail, item.need, item.pref, tolerance);
    let stretch = extra > 0.0 && item.is_candidate(use_pref);

    let mut pos = offset;
    let mut size = item.base(use_pref);
    if stretch {
        size += extra;
    } else if align.is_middle() {
        pos += 0.5 * extra;
    } else if align.is_end() {
        pos += extra;
    } else if align == Align::Justify {
        size += extra;
    }
    Allocation { pos, size }
}
