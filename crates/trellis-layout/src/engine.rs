// crates/trellis-layout/src/engine.rs

//! The two-pass driver.
//!
//! `gather` walks the tree bottom-up so every container can aggregate the
//! preferences of its already-sized children. `allocate` then walks it
//! top-down: each container hands out the space it received, works out how
//! much its children really occupy, attaches scrollbars where they overflow,
//! recurses, and finally shifts its descendants by its scroll offset.

use crate::grid::{GridChild, GridTracks};
use crate::linear::{allocate_linear, allocate_single, AllocItem, FIT_TOLERANCE};
use crate::scroll::Scrolling;
use crate::split::{SplitView, DEFAULT_HANDLE_WIDTH};
use crate::{LayoutData, LayoutEngine, LayoutResult, SizePrefs};
use glam::Vec2;
use std::collections::HashMap;
use tracing::{debug, warn};
use trellis_core::{
    Dim, LayoutKind, Node, NodeId, NodeKind, NodeTree, Result, ScrollEvent, TrellisError, Vec2Ext,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    /// Gap between the children of a split view.
    pub split_handle_width: f32,
    /// Slack before preferred sizes are considered not to fit.
    pub fit_tolerance: f32,
    /// Emit per-node gather/allocate details.
    pub trace: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            split_handle_width: DEFAULT_HANDLE_WIDTH,
            fit_tolerance: FIT_TOLERANCE,
            trace: false,
        }
    }
}

/// Where a container is in the current layout pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayoutPhase {
    #[default]
    Unsized,
    Gathered,
    Allocated,
    Finalized,
}

/// Engine-side state of one layout container.
#[derive(Debug, Clone)]
pub struct ContainerState {
    pub kind: LayoutKind,
    pub phase: LayoutPhase,
    /// Extent actually occupied by the children, relative to the container.
    pub child_size: Vec2,
    pub scrolling: Scrolling,
    /// Track state; only populated for grids.
    pub grid: GridTracks,
    /// Index among the layout children of the child shown by a stacked
    /// layout.
    pub stack_top: Option<usize>,
}

impl ContainerState {
    pub fn new(kind: LayoutKind) -> Self {
        Self {
            kind,
            phase: LayoutPhase::Unsized,
            child_size: Vec2::ZERO,
            scrolling: Scrolling::default(),
            grid: GridTracks::new(),
            stack_top: None,
        }
    }

    /// Region left for content once scrollbars are placed: (pos, size).
    pub fn children_bbox(&self, ld: &LayoutData) -> (Vec2, Vec2) {
        (ld.alloc_pos, (ld.alloc_size - self.scrolling.extra_size).max(Vec2::ZERO))
    }
}

#[derive(Debug, Default)]
pub struct TrellisEngine {
    config: EngineConfig,
    nodes: HashMap<NodeId, LayoutData>,
    containers: HashMap<NodeId, ContainerState>,
    splits: HashMap<NodeId, SplitView>,
    update_depth: u32,
    deferred: Vec<NodeId>,
    redraws: Vec<NodeId>,
}

impl TrellisEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self { config, ..Self::default() }
    }

    pub fn with_trace(mut self, trace: bool) -> Self {
        self.config.trace = trace;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn layout_data(&self, id: NodeId) -> Option<&LayoutData> {
        self.nodes.get(&id)
    }

    pub fn container(&self, id: NodeId) -> Option<&ContainerState> {
        self.containers.get(&id)
    }

    pub fn grid(&self, id: NodeId) -> Option<&GridTracks> {
        self.containers
            .get(&id)
            .filter(|c| c.kind == LayoutKind::Grid)
            .map(|c| &c.grid)
    }

    pub fn split_view(&self, id: NodeId) -> Option<&SplitView> {
        self.splits.get(&id)
    }

    pub fn update_depth(&self) -> u32 {
        self.update_depth
    }

    /// Containers that asked to be redrawn since the last call.
    pub fn take_redraws(&mut self) -> Vec<NodeId> {
        std::mem::take(&mut self.redraws)
    }

    fn data(&self, id: NodeId) -> LayoutData {
        self.nodes.get(&id).copied().unwrap_or_else(LayoutData::new)
    }

    fn data_mut(&mut self, id: NodeId) -> &mut LayoutData {
        self.nodes.entry(id).or_insert_with(LayoutData::new)
    }

    fn state_mut(&mut self, id: NodeId, kind: LayoutKind) -> &mut ContainerState {
        let state = self.containers.entry(id).or_insert_with(|| ContainerState::new(kind));
        if state.kind != kind {
            *state = ContainerState::new(kind);
        }
        state
    }

    fn request_redraw(&mut self, id: NodeId) {
        if !self.redraws.contains(&id) {
            self.redraws.push(id);
        }
    }

    // ---- update guard ----

    pub fn begin_update(&mut self) {
        self.update_depth += 1;
    }

    /// Leave an update; at depth 0 the scroll moves queued meanwhile run.
    pub fn end_update(&mut self, tree: &NodeTree) {
        self.update_depth = self.update_depth.saturating_sub(1);
        if self.update_depth > 0 {
            return;
        }
        for id in std::mem::take(&mut self.deferred) {
            if tree.get(id).is_none() {
                warn!("Dropping deferred scroll for missing node {}", id);
                continue;
            }
            self.reposition(tree, id);
        }
    }

    // ---- gather ----

    /// Bottom-up pass: size preferences of `id` and everything below it.
    pub fn gather(&mut self, tree: &NodeTree, id: NodeId) {
        let Some(node) = tree.get(id) else { return };
        let children = tree.layout_child_ids(id);
        for &child in &children {
            self.gather(tree, child);
        }

        self.data_mut(id).set_from_style(&node.style);
        match node.kind {
            NodeKind::Layout(kind) => self.gather_container(tree, node, kind, &children),
            NodeKind::SplitView(dim) => {
                let sv = self.splits.entry(id).or_insert_with(|| SplitView::new(dim));
                sv.dim = dim;
                sv.update_splits(children.len());
                self.data_mut(id).update_sizes();
            }
            _ => self.data_mut(id).update_sizes(),
        }
    }

    fn gather_container(&mut self, tree: &NodeTree, node: &Node, kind: LayoutKind, children: &[NodeId]) {
        let id = node.id;
        let state = self.state_mut(id, kind);
        state.phase = LayoutPhase::Gathered;
        if children.is_empty() {
            state.child_size = Vec2::ZERO;
            let ld = self.data_mut(id);
            ld.size.need = Vec2::ZERO;
            ld.size.pref = Vec2::ZERO;
            return;
        }

        let sizes: Vec<SizePrefs> = children
            .iter()
            .map(|&c| {
                let ld = self.data_mut(c);
                ld.update_sizes();
                ld.size
            })
            .collect();

        let (need, pref) = if kind == LayoutKind::Grid {
            let grid_children: Vec<GridChild> = tree
                .layout_children(id)
                .zip(&sizes)
                .map(|(c, size)| GridChild::new(c.id, &c.style, *size))
                .collect();
            let state = self.state_mut(id, kind);
            let sums = state.grid.gather(node.style.columns, &grid_children);
            let placements = state.grid.placements().to_vec();
            for (child, cell) in placements {
                self.data_mut(child).grid_pos = cell;
            }
            sums
        } else {
            let mut need = Vec2::ZERO;
            let mut pref = Vec2::ZERO;
            for d in Dim::BOTH {
                for size in &sizes {
                    if kind.sums_dim(d) {
                        need.add_dim(d, size.need.dim(d));
                        pref.add_dim(d, size.pref.dim(d));
                    } else {
                        need.max_dim(d, size.need.dim(d));
                        pref.max_dim(d, size.pref.dim(d));
                    }
                }
            }
            (need, pref)
        };

        let space = node.style.box_space().total_vec();
        let trace = self.config.trace;
        let ld = self.data_mut(id);
        ld.size.need = ld.size.need.max(need) + space;
        ld.size.pref = ld.size.pref.max(pref) + space;
        ld.update_sizes();

        if trace {
            debug!(
                "Gathered {} {} '{}': need {:?}, pref {:?}, max {:?}",
                kind.name(),
                id,
                node.name,
                ld.size.need,
                ld.size.pref,
                ld.size.max
            );
        }
    }

    // ---- allocate ----

    /// Top-down pass. Expects `id` itself to have been allocated already,
    /// by its parent or by `compute_layout` for the root.
    pub fn allocate(&mut self, tree: &NodeTree, id: NodeId) {
        let Some(node) = tree.get(id) else { return };
        match node.kind {
            NodeKind::Layout(kind) => self.allocate_container(tree, node, kind),
            NodeKind::SplitView(_) => self.allocate_split(tree, node),
            _ => self.allocate_passthrough(tree, node),
        }
    }

    /// Children of a non-layout node keep their style position and get no
    /// space of their own.
    fn allocate_passthrough(&mut self, tree: &NodeTree, node: &Node) {
        let origin = self.data(node.id).alloc_pos_orig;
        for child in tree.layout_children(node.id) {
            let ld = self.data_mut(child.id);
            ld.alloc_pos_rel = child.style.pos;
            ld.place_under(origin);
            self.allocate(tree, child.id);
        }
    }

    /// A layout under a non-layout parent takes over the space of the nearest
    /// allocated ancestor.
    fn alloc_from_parent(&mut self, tree: &NodeTree, node: &Node) {
        let Some(parent) = node.parent.and_then(|p| tree.get(p)) else { return };
        if parent.kind.is_layout() || matches!(parent.kind, NodeKind::SplitView(_)) {
            return;
        }
        if self.data(node.id).alloc_size != Vec2::ZERO {
            return;
        }
        let inherited = tree
            .ancestors(node.id)
            .map(|a| self.data(a.id).alloc_size)
            .find(|size| *size != Vec2::ZERO);
        if let Some(size) = inherited {
            if self.config.trace {
                debug!("Layout {} '{}' inherits allocation {:?}", node.id, node.name, size);
            }
            self.data_mut(node.id).alloc_size = size;
        }
    }

    fn allocate_container(&mut self, tree: &NodeTree, node: &Node, kind: LayoutKind) {
        let id = node.id;
        self.alloc_from_parent(tree, node);
        let children = tree.layout_child_ids(id);
        if children.is_empty() {
            let state = self.state_mut(id, kind);
            state.child_size = Vec2::ZERO;
            state.scrolling.destroy();
            state.phase = LayoutPhase::Finalized;
            return;
        }

        let ld = self.data(id);
        let space = node.style.box_space();
        let avail = (ld.alloc_size - space.total_vec()).max(Vec2::ZERO);
        let offset = space.start_vec();

        match kind {
            LayoutKind::Row => {
                self.layout_linear(node, &children, Dim::X, avail, offset);
                self.layout_single(tree, &children, Dim::Y, avail, offset);
            }
            LayoutKind::Column => {
                self.layout_linear(node, &children, Dim::Y, avail, offset);
                self.layout_single(tree, &children, Dim::X, avail, offset);
            }
            LayoutKind::Grid => self.layout_grid(tree, node, avail, offset),
            LayoutKind::Stacked => {
                self.layout_single(tree, &children, Dim::X, avail, offset);
                self.layout_single(tree, &children, Dim::Y, avail, offset);
                let state = self.state_mut(id, kind);
                if state.stack_top.map_or(true, |top| top >= children.len()) {
                    state.stack_top = Some(0);
                }
            }
        }
        self.state_mut(id, kind).phase = LayoutPhase::Allocated;

        self.finalize(tree, node, kind, &children);
    }

    /// Main axis of a row or column: sized together, aligned by the
    /// container.
    fn layout_linear(&mut self, node: &Node, children: &[NodeId], d: Dim, avail: Vec2, offset: Vec2) {
        let items: Vec<AllocItem> = children
            .iter()
            .map(|&c| AllocItem::from_prefs(&self.data(c).size, d))
            .collect();
        let allocs = allocate_linear(
            avail.dim(d),
            &items,
            node.style.align(d),
            offset.dim(d),
            self.config.fit_tolerance,
        );
        for (&c, a) in children.iter().zip(allocs) {
            let ld = self.data_mut(c);
            ld.alloc_size.set_dim(d, a.size);
            ld.alloc_pos_rel.set_dim(d, a.pos);
        }
        if self.config.trace {
            let sizes: Vec<f32> = children.iter().map(|&c| self.data(c).alloc_size.dim(d)).collect();
            debug!("Layout {} '{}' {:?}: avail {:.1}, sizes {:?}", node.id, node.name, d, avail.dim(d), sizes);
        }
    }

    /// Cross axis: every child on its own, aligned by its own style.
    fn layout_single(&mut self, tree: &NodeTree, children: &[NodeId], d: Dim, avail: Vec2, offset: Vec2) {
        let tolerance = self.config.fit_tolerance;
        for &c in children {
            let Some(child) = tree.get(c) else { continue };
            let item = AllocItem::from_prefs(&self.data(c).size, d);
            let a = allocate_single(avail.dim(d), item, child.style.align(d), offset.dim(d), tolerance);
            let ld = self.data_mut(c);
            ld.alloc_size.set_dim(d, a.size);
            ld.alloc_pos_rel.set_dim(d, a.pos);
        }
    }

    fn layout_grid(&mut self, tree: &NodeTree, node: &Node, avail: Vec2, offset: Vec2) {
        let tolerance = self.config.fit_tolerance;
        let state = self.state_mut(node.id, LayoutKind::Grid);
        state
            .grid
            .allocate_tracks(avail, offset, node.style.align_h, node.style.align_v, tolerance);
        let grid = state.grid.clone();

        for &(c, cell) in grid.placements() {
            let Some(child) = tree.get(c) else { continue };
            let (pos, size) = grid.cell_allocation(cell, &self.data(c).size, &child.style, tolerance);
            let ld = self.data_mut(c);
            ld.alloc_pos_rel = pos;
            ld.alloc_size = size;
        }
        if self.config.trace {
            debug!("Grid {} '{}': {:?} (cols, rows)", node.id, node.name, grid.grid_size);
        }
    }

    fn finalize(&mut self, tree: &NodeTree, node: &Node, kind: LayoutKind, children: &[NodeId]) {
        let id = node.id;
        let child_size = children.iter().fold(Vec2::ZERO, |acc, &c| {
            let ld = self.data(c);
            acc.max(ld.alloc_pos_rel + ld.alloc_size)
        });

        let ld = self.data(id);
        let trace = self.config.trace;
        let state = self.state_mut(id, kind);
        state.child_size = child_size;
        state.scrolling.manage(child_size, ld.alloc_size, &node.style);
        state.scrolling.place_bars(ld.alloc_pos_orig);
        let delta = state.scrolling.offset();
        if trace && !state.scrolling.flags.is_empty() {
            debug!(
                "Container {} '{}' overflows: child size {:?}, alloc {:?}, scrolling {:?}",
                id, node.name, child_size, ld.alloc_size, state.scrolling.flags
            );
        }

        for &c in children {
            self.data_mut(c).place_under(ld.alloc_pos_orig);
            self.allocate(tree, c);
        }

        if delta != Vec2::ZERO {
            self.move_children(tree, id, delta);
        }
        self.state_mut(id, kind).phase = LayoutPhase::Finalized;
    }

    fn allocate_split(&mut self, tree: &NodeTree, node: &Node) {
        let NodeKind::SplitView(dim) = node.kind else { return };
        let children = tree.layout_child_ids(node.id);
        let ld = self.data(node.id);
        let handle_width = self.config.split_handle_width;
        let sv = self.splits.entry(node.id).or_insert_with(|| SplitView::new(dim));
        sv.dim = dim;
        let allocs = sv.allocate(children.len(), ld.alloc_size, handle_width);
        if self.config.trace {
            debug!("Split view {} '{}': splits {:?}", node.id, node.name, sv.splits);
        }
        for (&c, (pos, size)) in children.iter().zip(allocs) {
            let cld = self.data_mut(c);
            cld.alloc_pos_rel = pos;
            cld.alloc_size = size;
            cld.place_under(ld.alloc_pos_orig);
            self.allocate(tree, c);
        }
    }

    // ---- scrolling ----

    /// Shift every descendant of `id` to its unscrolled position plus
    /// `delta`. Nested scrolling containers add their own offset for their
    /// subtree. Relative positions are never touched.
    pub fn move_children(&mut self, tree: &NodeTree, id: NodeId, delta: Vec2) {
        for child in tree.layout_child_ids(id) {
            self.data_mut(child).move_by(delta);
            let mut child_delta = delta;
            if let Some(state) = self.containers.get_mut(&child) {
                for d in Dim::BOTH {
                    if let Some(bar) = state.scrolling.active_bar_mut(d) {
                        bar.layout.move_by(delta);
                    }
                }
                child_delta += state.scrolling.offset();
            }
            self.move_children(tree, child, child_delta);
        }
    }

    /// Sum of the scroll offsets of `id` and every ancestor container.
    fn accumulated_offset(&self, tree: &NodeTree, id: NodeId) -> Vec2 {
        std::iter::once(id)
            .chain(tree.ancestors(id).map(|a| a.id))
            .filter_map(|n| self.containers.get(&n))
            .fold(Vec2::ZERO, |acc, state| acc + state.scrolling.offset())
    }

    fn reposition(&mut self, tree: &NodeTree, id: NodeId) {
        let delta = self.accumulated_offset(tree, id);
        if self.config.trace {
            debug!("Repositioning children of {} by {:?}", id, delta);
        }
        self.move_children(tree, id, delta);
        self.request_redraw(id);
    }

    /// Set the scrollbar of `id` on `dim`. Returns `None` if the clamped
    /// value did not change.
    pub fn scroll_to(&mut self, tree: &NodeTree, id: NodeId, dim: Dim, value: f32) -> Result<Option<ScrollEvent>> {
        tree.node(id)?;
        let state = self.containers.get_mut(&id).ok_or(TrellisError::NotAContainer(id))?;
        let bar = state
            .scrolling
            .active_bar_mut(dim)
            .ok_or(TrellisError::NotScrollable { node: id, dim })?;
        let Some(value) = bar.set_value(value) else { return Ok(None) };
        let offset = state.scrolling.offset();

        let deferred = self.update_depth > 0;
        if deferred {
            if !self.deferred.contains(&id) {
                self.deferred.push(id);
            }
        } else {
            self.reposition(tree, id);
        }
        Ok(Some(ScrollEvent { node: id, dim, value, offset, deferred }))
    }

    pub fn scroll_by(&mut self, tree: &NodeTree, id: NodeId, dim: Dim, amount: f32) -> Result<Option<ScrollEvent>> {
        let current = self
            .containers
            .get(&id)
            .and_then(|s| s.scrolling.bar(dim))
            .map_or(0.0, |bar| bar.value);
        self.scroll_to(tree, id, dim, current + amount)
    }

    // ---- stacked ----

    fn stacked_children(&self, tree: &NodeTree, id: NodeId) -> Result<Vec<NodeId>> {
        let node = tree.node(id)?;
        match node.kind {
            NodeKind::Layout(LayoutKind::Stacked) => Ok(tree.layout_child_ids(id)),
            NodeKind::Layout(_) => Err(TrellisError::WrongLayoutKind { node: id, expected: "stacked" }),
            _ => Err(TrellisError::NotAContainer(id)),
        }
    }

    /// Make the child at `index` the visible top of a stacked layout.
    pub fn show_child_at_index(&mut self, tree: &NodeTree, id: NodeId, index: usize) -> Result<()> {
        let children = self.stacked_children(tree, id)?;
        if index >= children.len() {
            return Err(TrellisError::InvalidIndex { index, len: children.len() });
        }
        self.state_mut(id, LayoutKind::Stacked).stack_top = Some(index);
        self.request_redraw(id);
        Ok(())
    }

    /// Children in render order. A stacked layout shows only its top.
    pub fn displayed_children(&self, tree: &NodeTree, id: NodeId) -> Vec<NodeId> {
        let children = tree.layout_child_ids(id);
        match tree.get(id).and_then(|n| n.kind.layout_kind()) {
            Some(LayoutKind::Stacked) => {
                let top = self.containers.get(&id).and_then(|s| s.stack_top).unwrap_or(0);
                children.get(top).copied().into_iter().collect()
            }
            _ => children,
        }
    }

    // ---- split views ----

    fn split_mut(&mut self, tree: &NodeTree, id: NodeId) -> Result<(&mut SplitView, usize)> {
        let node = tree.node(id)?;
        let NodeKind::SplitView(dim) = node.kind else {
            return Err(TrellisError::WrongLayoutKind { node: id, expected: "split view" });
        };
        let n = tree.layout_children(id).count();
        let sv = self.splits.entry(id).or_insert_with(|| SplitView::new(dim));
        sv.dim = dim;
        Ok((sv, n))
    }

    pub fn set_splits(&mut self, tree: &NodeTree, id: NodeId, splits: &[f32]) -> Result<()> {
        let (sv, n) = self.split_mut(tree, id)?;
        sv.set_splits(n, splits);
        self.request_redraw(id);
        Ok(())
    }

    pub fn save_splits(&mut self, tree: &NodeTree, id: NodeId) -> Result<()> {
        let (sv, n) = self.split_mut(tree, id)?;
        if sv.splits.len() != n {
            sv.update_splits(n);
        }
        sv.save_splits();
        Ok(())
    }

    pub fn restore_splits(&mut self, tree: &NodeTree, id: NodeId) -> Result<()> {
        let (sv, n) = self.split_mut(tree, id)?;
        sv.restore_splits(n);
        self.request_redraw(id);
        Ok(())
    }

    pub fn collapse_children(&mut self, tree: &NodeTree, id: NodeId, save: bool, indices: &[usize]) -> Result<()> {
        let (sv, n) = self.split_mut(tree, id)?;
        sv.collapse(n, save, indices)?;
        self.request_redraw(id);
        Ok(())
    }

    // ---- results ----

    fn collect_result(&self, tree: &NodeTree, root: NodeId) -> LayoutResult {
        let mut result = LayoutResult::default();
        for id in tree.pre_order(root) {
            let Some(ld) = self.nodes.get(&id) else { continue };
            result.computed_positions.insert(id, ld.alloc_pos);
            result.computed_sizes.insert(id, ld.alloc_size);
            result.relative_positions.insert(id, ld.alloc_pos_rel);
        }
        result
    }
}

impl LayoutEngine for TrellisEngine {
    fn compute_layout(&mut self, tree: &NodeTree, root: NodeId, viewport_size: Vec2) -> LayoutResult {
        // forget nodes that left the tree, along with their scrollbars
        self.nodes.retain(|id, _| tree.get(*id).is_some());
        self.containers.retain(|id, _| tree.get(*id).is_some());
        self.splits.retain(|id, _| tree.get(*id).is_some());

        if self.config.trace {
            debug!("Layout pass: root {}, viewport {:?}, {} nodes", root, viewport_size, tree.len());
        }

        self.begin_update();
        self.gather(tree, root);
        let ld = self.data_mut(root);
        ld.alloc_size = viewport_size;
        ld.alloc_pos_rel = Vec2::ZERO;
        ld.place_under(Vec2::ZERO);
        self.allocate(tree, root);
        self.end_update(tree);

        self.collect_result(tree, root)
    }
}
