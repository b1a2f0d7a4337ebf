// crates/trellis-layout/src/grid.rs

//! Grid track sizing.
//!
//! A grid is treated as two independent one-axis problems: every row track
//! takes the largest vertical preferences of its cells, every column track
//! the largest horizontal ones, and the linear allocator then sizes the
//! tracks. Cells are placed inside their tracks with the single-item rule.

use crate::linear::{allocate_linear, allocate_single, AllocItem};
use crate::{LayoutData, SizePrefs};
use glam::Vec2;
use trellis_core::{Align, Dim, LayoutStyle, NodeId, Vec2Ext};

/// Selects the row or column track sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowCol {
    Row,
    Col,
}

impl RowCol {
    /// Axis a track of this kind is sized along.
    pub fn dim(self) -> Dim {
        match self {
            RowCol::Row => Dim::Y,
            RowCol::Col => Dim::X,
        }
    }
}

/// What the track builder needs to know about one grid child.
#[derive(Debug, Clone, Copy)]
pub struct GridChild {
    pub id: NodeId,
    pub explicit: Option<(usize, usize)>,
    pub span: (usize, usize),
    pub size: SizePrefs,
}

impl GridChild {
    pub fn new(id: NodeId, style: &LayoutStyle, size: SizePrefs) -> Self {
        Self {
            id,
            explicit: style.explicit_cell(),
            span: style.spans(),
            size,
        }
    }
}

/// Per-grid-container track state, kept across frames.
#[derive(Debug, Clone, Default)]
pub struct GridTracks {
    /// (cols, rows)
    pub grid_size: (usize, usize),
    pub rows: Vec<LayoutData>,
    pub cols: Vec<LayoutData>,
    /// (child, (col, row)) in child order.
    placements: Vec<(NodeId, (usize, usize))>,
}

impl GridTracks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tracks(&self, rc: RowCol) -> &[LayoutData] {
        match rc {
            RowCol::Row => &self.rows,
            RowCol::Col => &self.cols,
        }
    }

    /// Cell assigned to `id` by the last gather.
    pub fn cell_of(&self, id: NodeId) -> Option<(usize, usize)> {
        self.placements.iter().find(|(c, _)| *c == id).map(|(_, cell)| *cell)
    }

    pub fn placements(&self) -> &[(NodeId, (usize, usize))] {
        &self.placements
    }

    /// Number of (cols, rows) for `children` given an explicit column count
    /// (0 = unspecified).
    pub fn resolve_size(columns: usize, children: &[GridChild]) -> (usize, usize) {
        let n = children.len();
        // explicit coordinates past the child count are pulled back in
        let bound = n.max(columns).max(1);
        let mut cols = columns;
        let mut rows = 0;
        for child in children {
            if let Some((col, row)) = child.explicit {
                cols = cols.max(col.saturating_add(child.span.0).min(bound));
                rows = rows.max(row.saturating_add(child.span.1).min(bound));
            }
        }
        if cols == 0 {
            cols = ((n as f32).sqrt().round() as usize).max(1);
        }
        if rows == 0 {
            rows = n / cols;
        }
        // one cell per child
        while rows * cols < n {
            rows += 1;
        }
        (cols, rows)
    }

    /// Build the tracks for `children` and return the summed (need, pref)
    /// over all rows (Y) and columns (X).
    pub fn gather(&mut self, columns: usize, children: &[GridChild]) -> (Vec2, Vec2) {
        if children.is_empty() {
            self.placements.clear();
            return (Vec2::ZERO, Vec2::ZERO);
        }
        let (cols, rows) = Self::resolve_size(columns, children);
        self.grid_size = (cols, rows);

        // reallocate only on length change so tracks keep their identity
        if self.rows.len() != rows {
            self.rows = vec![LayoutData::new(); rows];
        }
        if self.cols.len() != cols {
            self.cols = vec![LayoutData::new(); cols];
        }
        for track in self.rows.iter_mut().chain(self.cols.iter_mut()) {
            track.size.need = Vec2::ZERO;
            track.size.pref = Vec2::ZERO;
        }

        self.place(children);

        for (child, &(_, (col, row))) in children.iter().zip(self.placements.iter()) {
            absorb(&mut self.rows[row], Dim::Y, &child.size);
            absorb(&mut self.cols[col], Dim::X, &child.size);
        }

        let mut need = Vec2::ZERO;
        let mut pref = Vec2::ZERO;
        for track in &self.rows {
            need.y += track.size.need.y;
            pref.y += track.size.pref.y;
        }
        for track in &self.cols {
            need.x += track.size.need.x;
            pref.x += track.size.pref.x;
        }
        (need, pref)
    }

    /// Assign every child a cell. Explicitly placed children go first and
    /// claim their cells; the rest fill free cells in row-major order.
    fn place(&mut self, children: &[GridChild]) {
        let (cols, rows) = self.grid_size;
        let total = cols * rows;
        let mut occupied = vec![false; total];
        let mut cells = vec![None; children.len()];

        for (i, child) in children.iter().enumerate() {
            if let Some((col, row)) = child.explicit {
                let cell = (col.min(cols - 1), row.min(rows - 1));
                occupied[cell.1 * cols + cell.0] = true;
                cells[i] = Some(cell);
            }
        }

        // rows * cols >= children, so a free cell always remains
        let mut cursor = 0;
        for cell in cells.iter_mut().filter(|c| c.is_none()) {
            let idx = (cursor..total).find(|&c| !occupied[c]).unwrap_or(0);
            occupied[idx] = true;
            cursor = idx + 1;
            *cell = Some((idx % cols, idx / cols));
        }

        self.placements = children
            .iter()
            .zip(cells)
            .map(|(child, cell)| (child.id, cell.unwrap_or((0, 0))))
            .collect();
    }

    /// Size and position every track within `avail`, starting at `offset`.
    pub fn allocate_tracks(&mut self, avail: Vec2, offset: Vec2, align_h: Align, align_v: Align, tolerance: f32) {
        allocate_track_dim(&mut self.rows, Dim::Y, avail.y, offset.y, align_v, tolerance);
        allocate_track_dim(&mut self.cols, Dim::X, avail.x, offset.x, align_h, tolerance);
    }

    /// Relative position and size of a child within cell (col, row).
    pub fn cell_allocation(
        &self,
        cell: (usize, usize),
        size: &SizePrefs,
        style: &LayoutStyle,
        tolerance: f32,
    ) -> (Vec2, Vec2) {
        let (col, row) = cell;
        let mut pos = Vec2::ZERO;
        let mut out = Vec2::ZERO;
        for (d, track) in [(Dim::X, self.cols.get(col)), (Dim::Y, self.rows.get(row))] {
            let Some(track) = track else { continue };
            let a = allocate_single(
                track.alloc_size.dim(d),
                AllocItem::from_prefs(size, d),
                style.align(d),
                0.0,
                tolerance,
            );
            pos.set_dim(d, a.pos + track.alloc_pos_rel.dim(d));
            out.set_dim(d, a.size);
        }
        (pos, out)
    }
}

/// Fold a member cell's preferences into a track on axis `d`.
fn absorb(track: &mut LayoutData, d: Dim, member: &SizePrefs) {
    track.size.need.max_dim(d, member.need.dim(d));
    track.size.pref.max_dim(d, member.pref.dim(d));
    // any stretching member makes the track stretch for good
    if track.size.max.dim(d) >= 0.0 {
        if member.max.dim(d) < 0.0 {
            track.size.max.set_dim(d, -1.0);
        } else {
            track.size.max.max_dim(d, member.max.dim(d));
        }
    }
}

fn allocate_track_dim(tracks: &mut [LayoutData], d: Dim, avail: f32, offset: f32, align: Align, tolerance: f32) {
    let items: Vec<AllocItem> = tracks.iter().map(|t| AllocItem::from_prefs(&t.size, d)).collect();
    for (track, a) in tracks.iter_mut().zip(allocate_linear(avail, &items, align, offset, tolerance)) {
        track.alloc_size.set_dim(d, a.size);
        track.alloc_pos_rel.set_dim(d, a.pos);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linear::FIT_TOLERANCE;

    fn prefs(w: f32, h: f32) -> SizePrefs {
        SizePrefs {
            need: Vec2::new(2.0, 2.0),
            pref: Vec2::new(w, h),
            max: Vec2::ZERO,
        }
    }

    fn auto_children(sizes: &[(f32, f32)]) -> Vec<GridChild> {
        sizes
            .iter()
            .enumerate()
            .map(|(i, &(w, h))| GridChild {
                id: i as NodeId,
                explicit: None,
                span: (1, 1),
                size: prefs(w, h),
            })
            .collect()
    }

    #[test]
    fn test_explicit_columns_grow_rows() {
        let children = auto_children(&[(10.0, 10.0); 7]);
        assert_eq!(GridTracks::resolve_size(3, &children), (3, 3));
    }

    #[test]
    fn test_sqrt_heuristic() {
        let children = auto_children(&[(10.0, 10.0); 5]);
        // round(sqrt(5)) = 2 columns, 5/2 = 2 rows grown to 3
        assert_eq!(GridTracks::resolve_size(0, &children), (2, 3));
    }

    #[test]
    fn test_tracks_take_max_and_sum() {
        let mut grid = GridTracks::new();
        let children = auto_children(&[(10.0, 5.0), (20.0, 8.0), (15.0, 30.0), (5.0, 1.0)]);
        let (need, pref) = grid.gather(2, &children);
        // cols: max(10,15)=15, max(20,5)=20; rows: max(5,8)=8, max(30,1)=30
        assert_eq!(pref, Vec2::new(35.0, 38.0));
        assert_eq!(need, Vec2::new(4.0, 4.0));
        assert_eq!(grid.cell_of(2), Some((0, 1)));
    }

    #[test]
    fn test_stretch_dominates_and_persists() {
        let mut grid = GridTracks::new();
        let mut children = auto_children(&[(10.0, 10.0), (10.0, 10.0)]);
        children[0].size.max = Vec2::new(-1.0, 0.0);
        grid.gather(2, &children);
        assert_eq!(grid.cols[0].size.max.x, -1.0);
        assert_eq!(grid.cols[1].size.max.x, 0.0);

        children[0].size.max = Vec2::new(50.0, 0.0);
        grid.gather(2, &children);
        assert_eq!(grid.cols[0].size.max.x, -1.0);
    }

    #[test]
    fn test_auto_placement_skips_explicit_cells() {
        let mut grid = GridTracks::new();
        let mut children = auto_children(&[(10.0, 10.0); 4]);
        children[2].explicit = Some((0, 0));
        grid.gather(2, &children);
        assert_eq!(grid.cell_of(2), Some((0, 0)));
        assert_eq!(grid.cell_of(0), Some((1, 0)));
        assert_eq!(grid.cell_of(1), Some((0, 1)));
        assert_eq!(grid.cell_of(3), Some((1, 1)));
    }

    #[test]
    fn test_colliding_explicit_cells_grow_rows() {
        let mut grid = GridTracks::new();
        let mut children = auto_children(&[(10.0, 10.0); 2]);
        children[0].explicit = Some((0, 0));
        children[1].explicit = Some((0, 0));
        let mut third = auto_children(&[(10.0, 10.0)]);
        third[0].id = 2;
        children.extend(third);
        grid.gather(1, &children);
        // 1 column, rows grown to 3 so the auto child still finds a cell
        assert_eq!(grid.grid_size, (1, 3));
        assert_eq!(grid.cell_of(2), Some((0, 1)));
    }

    #[test]
    fn test_far_explicit_cells_are_clamped() {
        let mut children = auto_children(&[(10.0, 10.0); 2]);
        children[0].explicit = Some((usize::MAX, usize::MAX));
        children[0].span = (usize::MAX, 1);
        children[1].explicit = Some((100_000_000, 0));
        assert_eq!(GridTracks::resolve_size(0, &children), (2, 2));

        let mut grid = GridTracks::new();
        grid.gather(0, &children);
        assert_eq!(grid.cols.len(), 2);
        assert_eq!(grid.rows.len(), 2);
        assert_eq!(grid.cell_of(0), Some((1, 1)));
        assert_eq!(grid.cell_of(1), Some((1, 0)));
    }

    #[test]
    fn test_track_allocation_and_cell_placement() {
        let mut grid = GridTracks::new();
        let children = auto_children(&[(10.0, 10.0), (20.0, 10.0)]);
        grid.gather(2, &children);
        grid.allocate_tracks(Vec2::new(100.0, 10.0), Vec2::new(3.0, 3.0), Align::Start, Align::Start, FIT_TOLERANCE);
        assert_eq!(grid.cols[1].alloc_pos_rel.x, 13.0);
        assert_eq!(grid.cols[1].alloc_size.x, 20.0);

        let style = LayoutStyle::default().with_align(Align::End, Align::Start);
        let (pos, size) = grid.cell_allocation((1, 0), &prefs(8.0, 10.0), &style, FIT_TOLERANCE);
        assert_eq!(size, Vec2::new(8.0, 10.0));
        assert_eq!(pos, Vec2::new(25.0, 3.0));
    }
}
