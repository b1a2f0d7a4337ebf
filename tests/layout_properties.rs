use glam::Vec2;
use trellis_core::{Align, Dim, Vec2Ext, LayoutKind, LayoutStyle, NodeId, NodeKind, NodeTree, Spacing, TrellisError};
use trellis_layout::{LayoutEngine, TrellisEngine};

fn container(kind: LayoutKind, style: LayoutStyle) -> (NodeTree, NodeId) {
    let mut tree = NodeTree::new();
    let root = tree.add_node(NodeKind::Layout(kind), style);
    (tree, root)
}

fn add(tree: &mut NodeTree, parent: NodeId, style: LayoutStyle) -> NodeId {
    tree.add_child(parent, NodeKind::Widget, style).unwrap()
}

fn fixed(w: f32, h: f32) -> LayoutStyle {
    LayoutStyle::default().with_size(w, h).with_min_size(w, h)
}

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-3
}

#[test]
fn test_gather_keeps_need_below_pref_below_max() {
    let (mut tree, root) = container(LayoutKind::Row, LayoutStyle::frame());
    add(&mut tree, root, LayoutStyle::default().with_size(10.0, 40.0).with_min_size(30.0, 5.0).with_max_size(20.0, 0.0));
    add(&mut tree, root, LayoutStyle::stretch().with_size(15.0, 15.0));
    let column = tree
        .add_child(root, NodeKind::Layout(LayoutKind::Column), LayoutStyle::default().with_max_size(25.0, 25.0))
        .unwrap();
    add(&mut tree, column, fixed(40.0, 10.0));
    add(&mut tree, column, fixed(10.0, 40.0));
    let grid = tree
        .add_child(root, NodeKind::Layout(LayoutKind::Grid), LayoutStyle::default())
        .unwrap();
    for i in 0..5 {
        add(&mut tree, grid, fixed(5.0 + i as f32, 8.0));
    }

    let mut engine = TrellisEngine::new();
    engine.gather(&tree, root);

    for id in tree.pre_order(root) {
        let size = engine.layout_data(id).unwrap().size;
        for d in Dim::BOTH {
            assert!(size.need.dim(d) <= size.pref.dim(d), "node {} {:?}: {:?}", id, d, size);
            if size.max.dim(d) > 0.0 {
                assert!(size.pref.dim(d) <= size.max.dim(d), "node {} {:?}: {:?}", id, d, size);
            }
        }
    }
}

#[test]
fn test_fixed_children_keep_their_widths() {
    let style = LayoutStyle { padding: Spacing::uniform(4.0), ..LayoutStyle::default() };
    let (mut tree, root) = container(LayoutKind::Row, style);
    let widths = [10.0, 20.0, 30.0];
    let ids: Vec<NodeId> = widths.iter().map(|&w| add(&mut tree, root, LayoutStyle::default().with_size(w, 10.0))).collect();

    let mut engine = TrellisEngine::new();
    let result = engine.compute_layout(&tree, root, Vec2::new(100.0, 30.0));

    let mut expected_x = 4.0;
    for (&id, &w) in ids.iter().zip(&widths) {
        assert_eq!(result.size(id).unwrap().x, w);
        assert_eq!(result.position(id).unwrap().x, expected_x);
        expected_x += w;
    }
}

#[test]
fn test_stretch_extra_split_by_preference() {
    let (mut tree, root) = container(LayoutKind::Row, LayoutStyle::default());
    let a = add(&mut tree, root, LayoutStyle::stretch().with_size(10.0, 10.0));
    let b = add(&mut tree, root, LayoutStyle::stretch().with_size(30.0, 10.0));

    let mut engine = TrellisEngine::new();
    let result = engine.compute_layout(&tree, root, Vec2::new(80.0, 20.0));

    assert!(approx(result.size(a).unwrap().x, 20.0));
    assert!(approx(result.size(b).unwrap().x, 60.0));
    assert!(approx(result.position(b).unwrap().x, 20.0));
}

#[test]
fn test_shrink_falls_back_toward_need() {
    let (mut tree, root) = container(LayoutKind::Row, LayoutStyle::default());
    let ids: Vec<NodeId> = (0..3)
        .map(|_| add(&mut tree, root, LayoutStyle::default().with_size(40.0, 10.0).with_min_size(10.0, 10.0)))
        .collect();

    let mut engine = TrellisEngine::new();
    let result = engine.compute_layout(&tree, root, Vec2::new(60.0, 20.0));
    for &id in &ids {
        let w = result.size(id).unwrap().x;
        assert!(approx(w, 20.0), "width {}", w);
    }

    // not even the needs fit: everybody stays at need
    let result = engine.compute_layout(&tree, root, Vec2::new(20.0, 20.0));
    for &id in &ids {
        assert_eq!(result.size(id).unwrap().x, 10.0);
    }
}

#[test]
fn test_justify_inserts_even_gaps() {
    let style = LayoutStyle::default().with_align(Align::Justify, Align::Start);
    let (mut tree, root) = container(LayoutKind::Row, style);
    let ids: Vec<NodeId> = (0..3).map(|_| add(&mut tree, root, LayoutStyle::default().with_size(10.0, 10.0))).collect();

    let mut engine = TrellisEngine::new();
    let result = engine.compute_layout(&tree, root, Vec2::new(50.0, 10.0));

    let xs: Vec<f32> = ids.iter().map(|&id| result.position(id).unwrap().x).collect();
    assert_eq!(xs, vec![0.0, 20.0, 40.0]);
    assert!(ids.iter().all(|&id| result.size(id).unwrap().x == 10.0));
}

#[test]
fn test_grid_rows_grow_to_fit_children() {
    let style = LayoutStyle { columns: 3, ..LayoutStyle::default() };
    let (mut tree, root) = container(LayoutKind::Grid, style);
    for _ in 0..7 {
        add(&mut tree, root, fixed(10.0, 10.0));
    }

    let mut engine = TrellisEngine::new();
    engine.compute_layout(&tree, root, Vec2::new(100.0, 100.0));
    let grid = engine.grid(root).unwrap();
    assert_eq!(grid.grid_size, (3, 3));
    assert_eq!(grid.rows.len(), 3);
    assert_eq!(grid.cols.len(), 3);
}

#[test]
fn test_grid_auto_children_skip_explicit_cells() {
    let style = LayoutStyle { columns: 2, ..LayoutStyle::default() };
    let (mut tree, root) = container(LayoutKind::Grid, style);
    let first = add(&mut tree, root, fixed(10.0, 10.0));
    let pinned = add(&mut tree, root, fixed(10.0, 10.0).with_grid_cell(0, 0));
    let last = add(&mut tree, root, fixed(10.0, 10.0));

    let mut engine = TrellisEngine::new();
    let result = engine.compute_layout(&tree, root, Vec2::new(20.0, 20.0));

    let grid = engine.grid(root).unwrap();
    assert_eq!(grid.cell_of(pinned), Some((0, 0)));
    assert_eq!(grid.cell_of(first), Some((1, 0)));
    assert_eq!(grid.cell_of(last), Some((0, 1)));
    assert_eq!(result.position(last), Some(Vec2::new(0.0, 10.0)));
}

#[test]
fn test_split_normalization_and_restore() {
    let mut tree = NodeTree::new();
    let root = tree.add_node(NodeKind::SplitView(Dim::X), LayoutStyle::split_view());
    for _ in 0..3 {
        add(&mut tree, root, LayoutStyle::stretch());
    }

    let mut engine = TrellisEngine::new();
    engine.set_splits(&tree, root, &[2.0, 2.0, 2.0]).unwrap();
    let first = engine.split_view(root).unwrap().splits.clone();
    engine.set_splits(&tree, root, &[2.0, 2.0, 2.0]).unwrap();
    let second = engine.split_view(root).unwrap().splits.clone();
    assert_eq!(first, second);
    assert!(first.iter().all(|&s| approx(s, 1.0 / 3.0)));

    engine.collapse_children(&tree, root, true, &[1]).unwrap();
    assert_eq!(engine.split_view(root).unwrap().splits[1], 0.0);
    engine.restore_splits(&tree, root).unwrap();
    assert_eq!(engine.split_view(root).unwrap().splits, first);

    let err = engine.collapse_children(&tree, root, false, &[3]).unwrap_err();
    assert!(matches!(err, TrellisError::InvalidIndex { index: 3, len: 3 }));
    assert_eq!(engine.split_view(root).unwrap().splits, first);
}

#[test]
fn test_move_children_leaves_relative_positions() {
    let (mut tree, root) = container(LayoutKind::Column, LayoutStyle::default());
    let row = tree
        .add_child(root, NodeKind::Layout(LayoutKind::Row), LayoutStyle::default())
        .unwrap();
    add(&mut tree, row, fixed(20.0, 10.0));
    add(&mut tree, row, fixed(20.0, 10.0));
    add(&mut tree, root, fixed(30.0, 30.0));

    let mut engine = TrellisEngine::new();
    engine.compute_layout(&tree, root, Vec2::new(200.0, 200.0));
    let descendants: Vec<NodeId> = tree.pre_order(root).into_iter().skip(1).collect();
    let before: Vec<_> = descendants.iter().map(|&id| *engine.layout_data(id).unwrap()).collect();

    let delta = Vec2::new(0.0, 50.0);
    engine.move_children(&tree, root, delta);
    // moves are taken from the unscrolled baseline, so repeating is harmless
    engine.move_children(&tree, root, delta);

    for (&id, old) in descendants.iter().zip(&before) {
        let ld = engine.layout_data(id).unwrap();
        assert_eq!(ld.alloc_pos, old.alloc_pos + delta, "node {}", id);
        assert_eq!(ld.alloc_pos_rel, old.alloc_pos_rel, "node {}", id);
    }
}

fn scrolling_column(n: usize) -> (NodeTree, NodeId, Vec<NodeId>) {
    let (mut tree, root) = container(LayoutKind::Column, LayoutStyle::default());
    let ids = (0..n).map(|_| add(&mut tree, root, fixed(50.0, 30.0))).collect();
    (tree, root, ids)
}

#[test]
fn test_scroll_deferred_while_updating() {
    let (tree, root, ids) = scrolling_column(10);
    let mut engine = TrellisEngine::new();
    engine.compute_layout(&tree, root, Vec2::new(100.0, 100.0));
    let before = engine.layout_data(ids[1]).unwrap().alloc_pos;

    engine.begin_update();
    let event = engine.scroll_to(&tree, root, Dim::Y, 30.0).unwrap().unwrap();
    assert!(event.deferred);
    assert_eq!(engine.layout_data(ids[1]).unwrap().alloc_pos, before);
    assert!(engine.take_redraws().is_empty());

    engine.end_update(&tree);
    assert_eq!(engine.layout_data(ids[1]).unwrap().alloc_pos, before - Vec2::new(0.0, 30.0));
    assert_eq!(engine.take_redraws(), vec![root]);
}

#[test]
fn test_scroll_value_survives_relayout() {
    let (tree, root, ids) = scrolling_column(10);
    let mut engine = TrellisEngine::new();
    engine.compute_layout(&tree, root, Vec2::new(100.0, 100.0));
    engine.scroll_by(&tree, root, Dim::Y, 45.0).unwrap();

    let result = engine.compute_layout(&tree, root, Vec2::new(100.0, 100.0));
    assert_eq!(result.position(ids[2]), Some(Vec2::new(0.0, 15.0)));
    assert_eq!(result.relative_positions.get(&ids[2]), Some(&Vec2::new(0.0, 60.0)));

    // past the end clamps to range minus viewport
    let event = engine.scroll_to(&tree, root, Dim::Y, 10_000.0).unwrap().unwrap();
    assert_eq!(event.value, 200.0);
}

#[test]
fn test_scrollbar_parked_when_content_fits() {
    let (tree, root, _) = scrolling_column(10);
    let mut engine = TrellisEngine::new();
    engine.compute_layout(&tree, root, Vec2::new(100.0, 100.0));
    engine.scroll_to(&tree, root, Dim::Y, 20.0).unwrap();

    engine.compute_layout(&tree, root, Vec2::new(100.0, 400.0));
    let scrolling = &engine.container(root).unwrap().scrolling;
    assert!(!scrolling.has_vscroll());
    assert_eq!(scrolling.vscroll.as_ref().unwrap().layout.alloc_size, Vec2::ZERO);
    assert_eq!(scrolling.offset(), Vec2::ZERO);
    assert!(matches!(
        engine.scroll_to(&tree, root, Dim::Y, 10.0),
        Err(TrellisError::NotScrollable { .. })
    ));
}

#[test]
fn test_nested_scroll_offsets_accumulate() {
    let (mut tree, root) = container(LayoutKind::Column, LayoutStyle::default());
    let inner = tree
        .add_child(root, NodeKind::Layout(LayoutKind::Column), fixed(80.0, 60.0).with_max_size(80.0, 60.0))
        .unwrap();
    let leaves: Vec<NodeId> = (0..4).map(|_| add(&mut tree, inner, fixed(40.0, 30.0))).collect();
    for _ in 0..5 {
        add(&mut tree, root, fixed(50.0, 30.0));
    }

    let mut engine = TrellisEngine::new();
    engine.compute_layout(&tree, root, Vec2::new(100.0, 100.0));
    assert!(engine.container(inner).unwrap().scrolling.has_vscroll());
    assert!(engine.container(root).unwrap().scrolling.has_vscroll());

    engine.scroll_to(&tree, inner, Dim::Y, 30.0).unwrap();
    engine.scroll_to(&tree, root, Dim::Y, 20.0).unwrap();
    // leaf 1 sits 30 into the inner column, which itself starts at the top
    assert_eq!(engine.layout_data(leaves[1]).unwrap().alloc_pos, Vec2::new(0.0, 30.0 - 30.0 - 20.0));
    assert_eq!(engine.layout_data(inner).unwrap().alloc_pos, Vec2::new(0.0, -20.0));
}

#[test]
fn test_stacked_index_out_of_range() {
    let (mut tree, root) = container(LayoutKind::Stacked, LayoutStyle::default());
    let a = add(&mut tree, root, fixed(10.0, 10.0));
    add(&mut tree, root, fixed(10.0, 10.0));

    let mut engine = TrellisEngine::new();
    engine.compute_layout(&tree, root, Vec2::new(50.0, 50.0));
    let err = engine.show_child_at_index(&tree, root, 5).unwrap_err();
    assert!(matches!(err, TrellisError::InvalidIndex { index: 5, len: 2 }));
    assert_eq!(engine.displayed_children(&tree, root), vec![a]);
}

#[test]
fn test_grid_far_explicit_cell_lays_out() {
    let (mut tree, root) = container(LayoutKind::Grid, LayoutStyle::default());
    let child = add(&mut tree, root, fixed(10.0, 10.0).with_grid_cell(usize::MAX, 0));

    let mut engine = TrellisEngine::new();
    let result = engine.compute_layout(&tree, root, Vec2::new(50.0, 50.0));
    assert_eq!(engine.grid(root).unwrap().grid_size, (1, 1));
    assert_eq!(result.position(child), Some(Vec2::ZERO));
    assert_eq!(result.size(child), Some(Vec2::new(10.0, 10.0)));
}

#[test]
fn test_split_narrower_than_handles() {
    let mut tree = NodeTree::new();
    let root = tree.add_node(NodeKind::SplitView(Dim::X), LayoutStyle::split_view());
    let ids: Vec<NodeId> = (0..3).map(|_| add(&mut tree, root, LayoutStyle::stretch())).collect();

    let mut engine = TrellisEngine::new();
    let result = engine.compute_layout(&tree, root, Vec2::new(15.0, 10.0));
    for &id in &ids {
        let size = result.size(id).unwrap();
        assert!(size.x >= 0.0 && size.y >= 0.0, "node {}: {:?}", id, size);
    }
}

#[test]
fn test_scroll_to_nan_is_ignored() {
    let (tree, root, ids) = scrolling_column(10);
    let mut engine = TrellisEngine::new();
    engine.compute_layout(&tree, root, Vec2::new(100.0, 100.0));
    engine.scroll_to(&tree, root, Dim::Y, 30.0).unwrap();

    assert!(engine.scroll_to(&tree, root, Dim::Y, f32::NAN).unwrap().is_none());
    assert_eq!(engine.layout_data(ids[1]).unwrap().alloc_pos, Vec2::new(0.0, 0.0));
}
