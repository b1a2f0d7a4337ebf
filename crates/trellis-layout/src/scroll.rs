// crates/trellis-layout/src/scroll.rs

//! Overflow detection and the scrollbars a container owns.

use crate::LayoutData;
use bitflags::bitflags;
use glam::Vec2;
use trellis_core::{Dim, LayoutStyle, Vec2Ext};

bitflags! {
    /// Axes on which a container currently scrolls.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ScrollFlags: u8 {
        const HORIZONTAL = 0x01;
        const VERTICAL = 0x02;
    }
}

impl ScrollFlags {
    pub fn for_dim(d: Dim) -> Self {
        match d {
            Dim::X => ScrollFlags::HORIZONTAL,
            Dim::Y => ScrollFlags::VERTICAL,
        }
    }
}

/// A container-managed scrollbar along one axis.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrollBar {
    /// Axis scrolled: `X` for the horizontal bar.
    pub dim: Dim,
    pub min: f32,
    pub max: f32,
    pub value: f32,
    /// One line of text.
    pub step: f32,
    pub page_step: f32,
    /// Visible extent of the viewport.
    pub thumb: f32,
    pub tracking: bool,
    pub track_threshold: f32,
    /// Geometry of the bar itself within the container.
    pub layout: LayoutData,
}

impl ScrollBar {
    pub fn new(dim: Dim) -> Self {
        Self {
            dim,
            min: 0.0,
            max: 0.0,
            value: 0.0,
            step: 0.0,
            page_step: 0.0,
            thumb: 0.0,
            tracking: false,
            track_threshold: 0.0,
            layout: LayoutData::new(),
        }
    }

    pub fn is_horizontal(&self) -> bool {
        self.dim == Dim::X
    }

    /// Reset range and steps after a layout pass. The current value is kept,
    /// clamped into the new range.
    pub fn configure(&mut self, range: f32, line_height: f32, thumb: f32) {
        self.min = 0.0;
        self.max = range;
        self.step = line_height;
        self.page_step = 10.0 * self.step;
        self.thumb = thumb;
        self.tracking = true;
        self.track_threshold = self.step;
        self.value = self.value.clamp(self.min, self.max_value());
    }

    /// Largest value that still keeps the viewport filled.
    pub fn max_value(&self) -> f32 {
        (self.max - self.thumb).max(self.min)
    }

    /// Set the value, clamped. Returns the new value only if it changed.
    /// Non-finite values are ignored.
    pub fn set_value(&mut self, value: f32) -> Option<f32> {
        if !value.is_finite() {
            return None;
        }
        let value = value.clamp(self.min, self.max_value());
        if value == self.value {
            return None;
        }
        self.value = value;
        Some(value)
    }

    pub fn step_by(&mut self, steps: f32) -> Option<f32> {
        self.set_value(self.value + steps * self.step)
    }

    pub fn page_by(&mut self, pages: f32) -> Option<f32> {
        self.set_value(self.value + pages * self.page_step)
    }

    /// Hide the bar without dropping it; the value survives.
    pub fn deactivate(&mut self) {
        self.layout.alloc_pos = Vec2::ZERO;
        self.layout.alloc_pos_orig = Vec2::ZERO;
        self.layout.alloc_pos_rel = Vec2::ZERO;
        self.layout.alloc_size = Vec2::ZERO;
    }
}

/// Overflow state of one container.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scrolling {
    pub flags: ScrollFlags,
    /// Space taken by scrollbars in each dimension.
    pub extra_size: Vec2,
    pub hscroll: Option<ScrollBar>,
    pub vscroll: Option<ScrollBar>,
}

impl Scrolling {
    pub fn has_hscroll(&self) -> bool {
        self.flags.contains(ScrollFlags::HORIZONTAL)
    }

    pub fn has_vscroll(&self) -> bool {
        self.flags.contains(ScrollFlags::VERTICAL)
    }

    pub fn is_scrolling(&self, d: Dim) -> bool {
        self.flags.contains(ScrollFlags::for_dim(d))
    }

    pub fn bar(&self, d: Dim) -> Option<&ScrollBar> {
        match d {
            Dim::X => self.hscroll.as_ref(),
            Dim::Y => self.vscroll.as_ref(),
        }
    }

    pub fn bar_mut(&mut self, d: Dim) -> Option<&mut ScrollBar> {
        match d {
            Dim::X => self.hscroll.as_mut(),
            Dim::Y => self.vscroll.as_mut(),
        }
    }

    /// Active bar on `d`, if the container scrolls there.
    pub fn active_bar_mut(&mut self, d: Dim) -> Option<&mut ScrollBar> {
        if self.is_scrolling(d) {
            self.bar_mut(d)
        } else {
            None
        }
    }

    /// Drop both scrollbars.
    pub fn destroy(&mut self) {
        self.flags = ScrollFlags::empty();
        self.extra_size = Vec2::ZERO;
        self.hscroll = None;
        self.vscroll = None;
    }

    /// Compare the children's extent against the allocation and attach,
    /// resize or park scrollbars. Both axes are checked against the same
    /// `child_size`; a bar added on one axis does not re-trigger the other.
    pub fn manage(&mut self, child_size: Vec2, alloc_size: Vec2, style: &LayoutStyle) {
        if !style.overflow.allows_scroll() {
            self.destroy();
            return;
        }
        self.flags = ScrollFlags::empty();
        self.extra_size = Vec2::ZERO;

        let sbw = style.scrollbar_width;
        let avail = Vec2::new(style.content_end(alloc_size, Dim::X), style.content_end(alloc_size, Dim::Y));
        for d in Dim::BOTH {
            if child_size.dim(d) > avail.dim(d) {
                self.flags |= ScrollFlags::for_dim(d);
                // the bar takes a strip across the other axis
                self.extra_size.add_dim(d.other(), sbw);
            }
        }

        for d in Dim::BOTH {
            if !self.is_scrolling(d) {
                continue;
            }
            let range = child_size.dim(d) + self.extra_size.dim(d);
            let bar = match d {
                Dim::X => self.hscroll.get_or_insert_with(|| ScrollBar::new(Dim::X)),
                Dim::Y => self.vscroll.get_or_insert_with(|| ScrollBar::new(Dim::Y)),
            };
            bar.configure(range, style.line_height, avail.dim(d));
        }
        self.layout_bars(alloc_size, sbw);
    }

    /// Place active bars along the bottom and right edges, relative to the
    /// container; park inactive ones.
    fn layout_bars(&mut self, alloc_size: Vec2, sbw: f32) {
        let both = self.has_hscroll() && self.has_vscroll();
        for d in Dim::BOTH {
            let active = self.is_scrolling(d);
            let Some(bar) = self.bar_mut(d) else { continue };
            if !active {
                bar.deactivate();
                continue;
            }
            let cross = d.other();
            let mut size = Vec2::ZERO;
            size.set_dim(d, alloc_size.dim(d) - if both { sbw } else { 0.0 });
            size.set_dim(cross, sbw);
            let mut rel = Vec2::ZERO;
            rel.set_dim(cross, alloc_size.dim(cross) - sbw);
            bar.layout.alloc_size = size;
            bar.layout.alloc_pos_rel = rel;
        }
    }

    /// Offset the scroll values impose on the container's descendants.
    pub fn offset(&self) -> Vec2 {
        let mut delta = Vec2::ZERO;
        for d in Dim::BOTH {
            if let (true, Some(bar)) = (self.is_scrolling(d), self.bar(d)) {
                delta.set_dim(d, -bar.value);
            }
        }
        delta
    }

    /// Re-anchor active bars under the container's absolute position.
    pub fn place_bars(&mut self, container_pos: Vec2) {
        for d in Dim::BOTH {
            let active = self.is_scrolling(d);
            if let (true, Some(bar)) = (active, self.bar_mut(d)) {
                bar.layout.place_under(container_pos);
            }
        }
    }
}
