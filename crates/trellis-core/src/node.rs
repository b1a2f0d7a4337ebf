// crates/trellis-core/src/node.rs
use crate::{Dim, LayoutStyle, Result, TrellisError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub type NodeId = u32;

/// Arrangement strategy of a layout container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutKind {
    /// Children side by side along X.
    Row,
    /// Children stacked along Y.
    Column,
    Grid,
    /// All children overlap; only the selected top one is shown.
    Stacked,
}

impl LayoutKind {
    /// Whether children's extents are summed along `d` (otherwise maxed).
    pub fn sums_dim(self, d: Dim) -> bool {
        matches!((self, d), (LayoutKind::Row, Dim::X) | (LayoutKind::Column, Dim::Y))
    }

    pub fn name(self) -> &'static str {
        match self {
            LayoutKind::Row => "row",
            LayoutKind::Column => "column",
            LayoutKind::Grid => "grid",
            LayoutKind::Stacked => "stacked",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "type", content = "value")]
pub enum NodeKind {
    /// Terminal widget; sized from its style alone.
    Widget,
    Layout(LayoutKind),
    /// Proportional split of the space along an axis.
    SplitView(Dim),
    Stretch,
    Space,
}

impl NodeKind {
    pub fn default_style(self) -> LayoutStyle {
        match self {
            NodeKind::Widget | NodeKind::Layout(_) => LayoutStyle::default(),
            NodeKind::SplitView(_) => LayoutStyle::split_view(),
            NodeKind::Stretch => LayoutStyle::stretch(),
            NodeKind::Space => LayoutStyle::space(),
        }
    }

    pub fn layout_kind(self) -> Option<LayoutKind> {
        match self {
            NodeKind::Layout(kind) => Some(kind),
            _ => None,
        }
    }

    pub fn is_layout(self) -> bool {
        matches!(self, NodeKind::Layout(_))
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub style: LayoutStyle,
    /// Invisible nodes take no part in layout.
    pub visible: bool,
}

impl Node {
    pub fn new(id: NodeId, kind: NodeKind) -> Self {
        Self {
            id,
            name: String::new(),
            kind,
            parent: None,
            children: Vec::new(),
            style: kind.default_style(),
            visible: true,
        }
    }
}

/// Owner of the parent/child structure the engine walks.
#[derive(Debug, Clone, Default)]
pub struct NodeTree {
    nodes: HashMap<NodeId, Node>,
    next_id: NodeId,
}

impl NodeTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Insert a parentless node.
    pub fn add_node(&mut self, kind: NodeKind, style: LayoutStyle) -> NodeId {
        let id = self.next_id;
        self.next_id += 1;
        let mut node = Node::new(id, kind);
        node.style = style;
        self.nodes.insert(id, node);
        id
    }

    /// Insert a node and append it to `parent`'s children.
    pub fn add_child(&mut self, parent: NodeId, kind: NodeKind, style: LayoutStyle) -> Result<NodeId> {
        if !self.nodes.contains_key(&parent) {
            return Err(TrellisError::NodeNotFound(parent));
        }
        let id = self.add_node(kind, style);
        if let Some(node) = self.nodes.get_mut(&id) {
            node.parent = Some(parent);
        }
        if let Some(par) = self.nodes.get_mut(&parent) {
            par.children.push(id);
        }
        Ok(id)
    }

    /// Detach `child` from `parent` and drop its whole subtree.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        let par = self.nodes.get_mut(&parent).ok_or(TrellisError::NodeNotFound(parent))?;
        let idx = par
            .children
            .iter()
            .position(|&c| c == child)
            .ok_or(TrellisError::NodeNotFound(child))?;
        par.children.remove(idx);
        let mut stack = vec![child];
        while let Some(id) = stack.pop() {
            if let Some(node) = self.nodes.remove(&id) {
                stack.extend(node.children);
            }
        }
        Ok(())
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    pub fn node(&self, id: NodeId) -> Result<&Node> {
        self.nodes.get(&id).ok_or(TrellisError::NodeNotFound(id))
    }

    pub fn set_name(&mut self, id: NodeId, name: impl Into<String>) -> Result<()> {
        let node = self.nodes.get_mut(&id).ok_or(TrellisError::NodeNotFound(id))?;
        node.name = name.into();
        Ok(())
    }

    pub fn set_style(&mut self, id: NodeId, style: LayoutStyle) -> Result<()> {
        let node = self.nodes.get_mut(&id).ok_or(TrellisError::NodeNotFound(id))?;
        node.style = style;
        Ok(())
    }

    pub fn set_visible(&mut self, id: NodeId, visible: bool) -> Result<()> {
        let node = self.nodes.get_mut(&id).ok_or(TrellisError::NodeNotFound(id))?;
        node.visible = visible;
        Ok(())
    }

    /// Children that take part in layout, in order. Missing and invisible
    /// children are skipped.
    pub fn layout_children(&self, id: NodeId) -> impl Iterator<Item = &Node> + '_ {
        self.nodes
            .get(&id)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
            .iter()
            .filter_map(move |c| self.nodes.get(c))
            .filter(|n| n.visible)
    }

    pub fn layout_child_ids(&self, id: NodeId) -> Vec<NodeId> {
        self.layout_children(id).map(|n| n.id).collect()
    }

    /// Ancestors from the parent upwards.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = &Node> + '_ {
        let mut cur = self.nodes.get(&id).and_then(|n| n.parent);
        std::iter::from_fn(move || {
            let node = self.nodes.get(&cur?)?;
            cur = node.parent;
            Some(node)
        })
    }

    /// Visible nodes below `id` in pre-order (parents before children),
    /// `id` first.
    pub fn pre_order(&self, id: NodeId) -> Vec<NodeId> {
        self.walk(id, false)
    }

    /// Like `pre_order` but includes invisible subtrees.
    pub fn pre_order_all(&self, id: NodeId) -> Vec<NodeId> {
        self.walk(id, true)
    }

    fn walk(&self, id: NodeId, include_hidden: bool) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut stack = vec![id];
        while let Some(cur) = stack.pop() {
            let Some(node) = self.nodes.get(&cur) else { continue };
            if !node.visible && !include_hidden {
                continue;
            }
            order.push(cur);
            stack.extend(node.children.iter().rev().copied());
        }
        order
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tree_building() {
        let mut tree = NodeTree::new();
        let root = tree.add_node(NodeKind::Layout(LayoutKind::Row), LayoutStyle::default());
        let a = tree.add_child(root, NodeKind::Widget, LayoutStyle::default()).unwrap();
        let b = tree.add_child(root, NodeKind::Stretch, NodeKind::Stretch.default_style()).unwrap();
        assert_eq!(tree.get(root).unwrap().children, vec![a, b]);
        assert_eq!(tree.get(b).unwrap().parent, Some(root));
        assert!(matches!(
            tree.add_child(99, NodeKind::Widget, LayoutStyle::default()),
            Err(TrellisError::NodeNotFound(99))
        ));
    }

    #[test]
    fn test_layout_children_skips_invisible() {
        let mut tree = NodeTree::new();
        let root = tree.add_node(NodeKind::Layout(LayoutKind::Column), LayoutStyle::default());
        let a = tree.add_child(root, NodeKind::Widget, LayoutStyle::default()).unwrap();
        let b = tree.add_child(root, NodeKind::Widget, LayoutStyle::default()).unwrap();
        tree.set_visible(a, false).unwrap();
        assert_eq!(tree.layout_child_ids(root), vec![b]);
        assert_eq!(tree.pre_order(root), vec![root, b]);
    }

    #[test]
    fn test_remove_child_drops_subtree() {
        let mut tree = NodeTree::new();
        let root = tree.add_node(NodeKind::Layout(LayoutKind::Column), LayoutStyle::default());
        let inner = tree.add_child(root, NodeKind::Layout(LayoutKind::Row), LayoutStyle::default()).unwrap();
        let leaf = tree.add_child(inner, NodeKind::Widget, LayoutStyle::default()).unwrap();
        tree.remove_child(root, inner).unwrap();
        assert!(tree.get(leaf).is_none());
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_sums_dim() {
        assert!(LayoutKind::Row.sums_dim(Dim::X));
        assert!(!LayoutKind::Row.sums_dim(Dim::Y));
        assert!(LayoutKind::Column.sums_dim(Dim::Y));
        assert!(!LayoutKind::Grid.sums_dim(Dim::X));
    }
}
