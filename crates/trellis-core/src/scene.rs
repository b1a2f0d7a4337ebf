// crates/trellis-core/src/scene.rs

//! Declarative scene descriptions.
//!
//! A scene is a nested JSON document that builds a `NodeTree`. Styles only
//! list the fields that differ from the node kind's defaults.

use crate::{LayoutStyle, NodeId, NodeKind, NodeTree, Result, TrellisError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneNode {
    #[serde(default)]
    pub name: String,
    pub kind: NodeKind,
    /// Style overrides applied on top of `kind.default_style()`.
    #[serde(default)]
    pub style: Map<String, Value>,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default)]
    pub children: Vec<SceneNode>,
}

fn default_visible() -> bool {
    true
}

#[derive(Debug, Clone)]
pub struct Scene {
    pub tree: NodeTree,
    pub root: NodeId,
}

impl Scene {
    pub fn from_json(json: &str) -> Result<Self> {
        let root: SceneNode = serde_json::from_str(json)?;
        Self::from_description(&root)
    }

    pub fn from_description(root: &SceneNode) -> Result<Self> {
        let mut tree = NodeTree::new();
        let root_id = tree.add_node(root.kind, resolve_style(root)?);
        apply_node_props(&mut tree, root_id, root)?;
        let mut pending: Vec<(NodeId, &SceneNode)> = vec![(root_id, root)];
        while let Some((parent, desc)) = pending.pop() {
            for child in &desc.children {
                let id = tree.add_child(parent, child.kind, resolve_style(child)?)?;
                apply_node_props(&mut tree, id, child)?;
                pending.push((id, child));
            }
        }
        debug!("Built scene with {} nodes", tree.len());
        Ok(Self { tree, root: root_id })
    }

    /// Look a node up by its scene name.
    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.tree
            .pre_order_all(self.root)
            .into_iter()
            .find(|&id| self.tree.get(id).is_some_and(|n| n.name == name))
    }
}

fn apply_node_props(tree: &mut NodeTree, id: NodeId, desc: &SceneNode) -> Result<()> {
    tree.set_name(id, desc.name.clone())?;
    tree.set_visible(id, desc.visible)
}

/// Overlay the description's style fields on the kind's default style.
fn resolve_style(desc: &SceneNode) -> Result<LayoutStyle> {
    let base = desc.kind.default_style();
    if desc.style.is_empty() {
        return Ok(base);
    }
    let mut merged = match serde_json::to_value(&base)? {
        Value::Object(map) => map,
        _ => return Err(TrellisError::InvalidScene("style did not serialize to an object".into())),
    };
    for (key, value) in &desc.style {
        if !merged.contains_key(key) {
            return Err(TrellisError::InvalidScene(format!(
                "unknown style field '{}' on node '{}'",
                key, desc.name
            )));
        }
        merged.insert(key.clone(), value.clone());
    }
    Ok(serde_json::from_value(Value::Object(merged))?)
}
