use anyhow::{Context, Result};
use clap::Parser;
use glam::Vec2;
use std::fs;
use std::path::Path;
use tracing::info;
use trellis_core::{Dim, NodeId, NodeKind, Scene};
use trellis_layout::{LayoutEngine, LayoutResult, TrellisEngine};

#[derive(Parser)]
#[command(name = "trellis-inspect")]
#[command(about = "Lay out a JSON scene and print the computed geometry")]
struct Args {
    /// Path to the scene description (.json)
    scene_file: String,

    /// Viewport width in dots
    #[arg(long, default_value_t = 800.0)]
    width: f32,

    /// Viewport height in dots
    #[arg(long, default_value_t = 600.0)]
    height: f32,

    /// Scroll a container after layout: <node-name>:<x|y>:<value>
    #[arg(long = "scroll", value_name = "NODE:AXIS:VALUE")]
    scrolls: Vec<String>,

    /// Output format (tree, json)
    #[arg(long, default_value = "tree")]
    format: String,

    /// Save output to file instead of stdout
    #[arg(long)]
    output: Option<String>,

    /// Log per-node gather and allocate details
    #[arg(long)]
    trace: bool,
}

struct ScrollRequest {
    node: String,
    dim: Dim,
    value: f32,
}

fn parse_scroll(raw: &str) -> Result<ScrollRequest> {
    let mut parts = raw.rsplitn(3, ':');
    let value = parts.next().context("missing scroll value")?;
    let axis = parts.next().context("missing scroll axis")?;
    let node = parts.next().context("missing node name")?;
    let dim = match axis {
        "x" | "X" => Dim::X,
        "y" | "Y" => Dim::Y,
        _ => anyhow::bail!("Unknown axis '{}' in '{}'; use x or y", axis, raw),
    };
    let value = value
        .parse::<f32>()
        .with_context(|| format!("Invalid scroll value in '{}'", raw))?;
    Ok(ScrollRequest { node: node.to_string(), dim, value })
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(
                if args.trace {
                    tracing::Level::DEBUG
                } else {
                    tracing::Level::INFO
                }
                .into(),
            ),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    if !Path::new(&args.scene_file).exists() {
        anyhow::bail!("Scene file not found: {}", args.scene_file);
    }
    let scrolls = args
        .scrolls
        .iter()
        .map(|s| parse_scroll(s.as_str()))
        .collect::<Result<Vec<_>>>()?;

    let json = fs::read_to_string(&args.scene_file)
        .with_context(|| format!("Failed to read scene file: {}", args.scene_file))?;
    let scene = Scene::from_json(&json).context("Failed to parse scene")?;
    info!("Loaded scene with {} nodes", scene.tree.len());

    let mut engine = TrellisEngine::new().with_trace(args.trace);
    let viewport = Vec2::new(args.width, args.height);
    let mut result = engine.compute_layout(&scene.tree, scene.root, viewport);

    for req in &scrolls {
        let id = scene
            .find(&req.node)
            .with_context(|| format!("No node named '{}'", req.node))?;
        match engine.scroll_to(&scene.tree, id, req.dim, req.value)? {
            Some(event) => info!("Scrolled '{}' {:?} to {:.1}", req.node, event.dim, event.value),
            None => info!("Scroll of '{}' left it unchanged", req.node),
        }
    }
    if !scrolls.is_empty() {
        result = refresh_positions(&engine, &scene, result);
    }

    let output_text = match args.format.as_str() {
        "tree" => generate_tree_output(&engine, &scene, &result),
        "json" => generate_json_output(&scene, &result)?,
        _ => anyhow::bail!("Unknown format: {}. Use 'tree' or 'json'", args.format),
    };

    if let Some(output_file) = args.output {
        fs::write(&output_file, output_text)
            .with_context(|| format!("Failed to write to file: {}", output_file))?;
        println!("Output written to: {}", output_file);
    } else {
        print!("{}", output_text);
    }

    Ok(())
}

/// Scrolling moves absolute positions only; pull the new ones back in.
fn refresh_positions(engine: &TrellisEngine, scene: &Scene, mut result: LayoutResult) -> LayoutResult {
    for id in scene.tree.pre_order(scene.root) {
        if let Some(ld) = engine.layout_data(id) {
            result.computed_positions.insert(id, ld.alloc_pos);
        }
    }
    result
}

fn kind_label(kind: NodeKind) -> String {
    match kind {
        NodeKind::Widget => "widget".to_string(),
        NodeKind::Layout(kind) => kind.name().to_string(),
        NodeKind::SplitView(dim) => format!("split-{:?}", dim).to_lowercase(),
        NodeKind::Stretch => "stretch".to_string(),
        NodeKind::Space => "space".to_string(),
    }
}

fn generate_tree_output(engine: &TrellisEngine, scene: &Scene, result: &LayoutResult) -> String {
    let mut output = String::new();
    render_node_tree(&mut output, engine, scene, result, scene.root, 0, true);
    output
}

fn render_node_tree(
    output: &mut String,
    engine: &TrellisEngine,
    scene: &Scene,
    result: &LayoutResult,
    id: NodeId,
    depth: usize,
    is_last: bool,
) {
    let Some(node) = scene.tree.get(id) else { return };
    let tree_char = if depth == 0 {
        ""
    } else if is_last {
        "└── "
    } else {
        "├── "
    };
    let indent = if depth == 0 {
        String::new()
    } else {
        "│   ".repeat(depth - 1) + tree_char
    };

    output.push_str(&format!("{}{}", indent, kind_label(node.kind)));
    if !node.name.is_empty() {
        output.push_str(&format!(" \"{}\"", node.name));
    }
    let pos = result.position(id).unwrap_or(Vec2::ZERO);
    let size = result.size(id).unwrap_or(Vec2::ZERO);
    output.push_str(&format!(" pos:({:.0},{:.0}) size:({:.0},{:.0})", pos.x, pos.y, size.x, size.y));

    if let Some(state) = engine.container(id) {
        let mut inline = Vec::new();
        if let Some(bar) = state.scrolling.hscroll.as_ref().filter(|_| state.scrolling.has_hscroll()) {
            inline.push(format!("hscroll:{:.0}/{:.0}", bar.value, bar.max_value()));
        }
        if let Some(bar) = state.scrolling.vscroll.as_ref().filter(|_| state.scrolling.has_vscroll()) {
            inline.push(format!("vscroll:{:.0}/{:.0}", bar.value, bar.max_value()));
        }
        if let Some(grid) = engine.grid(id) {
            inline.push(format!("grid:{}x{}", grid.grid_size.0, grid.grid_size.1));
        }
        if !inline.is_empty() {
            output.push_str(&format!(" [{}]", inline.join(" ")));
        }
    }
    output.push('\n');

    let children = engine.displayed_children(&scene.tree, id);
    let child_count = children.len();
    for (i, child) in children.into_iter().enumerate() {
        render_node_tree(output, engine, scene, result, child, depth + 1, i == child_count - 1);
    }
}

fn generate_json_output(scene: &Scene, result: &LayoutResult) -> Result<String> {
    let nodes: Vec<serde_json::Value> = scene
        .tree
        .pre_order(scene.root)
        .into_iter()
        .filter_map(|id| {
            let node = scene.tree.get(id)?;
            let pos = result.position(id)?;
            let size = result.size(id)?;
            Some(serde_json::json!({
                "id": id,
                "name": node.name,
                "kind": kind_label(node.kind),
                "parent": node.parent,
                "pos": [pos.x, pos.y],
                "size": [size.x, size.y],
            }))
        })
        .collect();
    serde_json::to_string_pretty(&serde_json::json!({ "root": scene.root, "nodes": nodes }))
        .context("Failed to serialize layout")
}
