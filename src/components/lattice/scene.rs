//! Frame composition: turns placements, the camera angle and the selection
//! into the sprite lists the retained SVG scene draws.
//!
//! Paint order is a plain sort on depth (painter's algorithm). Glyphs are small
//! enough that the lack of per-pixel depth never shows.

use std::collections::{HashMap, HashSet};
use std::f64::consts::TAU;

use super::layout::{Placement, SCATTER_SPREAD, base_radius, layer_height};
use super::projection::{Point3, Projected, Projector};
use super::types::{DENSE_LAYER, GraphDocument, LAYER_COUNT, NodeId, layer_color};

/// Segments per projected ring outline.
pub const RING_SEGMENTS: usize = 64;
/// Glyph radius per layer before perspective, objectives largest.
pub const NODE_RADII: [f64; LAYER_COUNT] = [13.0, 9.5, 6.5, 3.5];
pub const SELECTED_GROWTH: f64 = 2.5;
/// Opacity of nodes outside the lineage while something is selected.
pub const SUPPRESSED_OPACITY: f64 = 0.06;

#[derive(Clone, Debug, PartialEq)]
pub struct RingSprite {
	pub layer: u8,
	pub color: &'static str,
	pub outer: Vec<(f64, f64)>,
	/// Inner edge of the scatter band; `None` for plain rings.
	pub inner: Option<Vec<(f64, f64)>>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LinkSprite {
	/// Index of the link in the document.
	pub key: usize,
	/// Shallow endpoint.
	pub from: (f64, f64),
	/// Deep endpoint.
	pub to: (f64, f64),
	/// Identifier of the deep endpoint, used to phase flow particles.
	pub deep_id: NodeId,
	pub color: &'static str,
	pub width: f64,
	pub opacity: f64,
	pub highlighted: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NodeSprite {
	pub id: NodeId,
	pub layer: u8,
	pub x: f64,
	pub y: f64,
	pub radius: f64,
	pub color: &'static str,
	pub opacity: f64,
	pub label: Option<String>,
	pub tooltip: String,
	pub selected: bool,
	pub depth: f64,
}

/// Everything drawn in one frame. Nodes are in paint order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SceneFrame {
	pub rings: Vec<RingSprite>,
	pub links: Vec<LinkSprite>,
	pub nodes: Vec<NodeSprite>,
}

impl SceneFrame {
	#[cfg(test)]
	pub fn node(&self, id: &str) -> Option<&NodeSprite> {
		self.nodes.iter().find(|n| n.id == id)
	}
}

/// Selection context for a frame. `lineage` is empty when nothing is selected.
pub struct Focus<'a> {
	pub selected: Option<&'a str>,
	pub lineage: &'a HashSet<NodeId>,
}

impl Focus<'_> {
	fn in_lineage(&self, id: &str) -> bool {
		self.selected.is_none() || self.lineage.contains(id)
	}
}

/// Abbreviate to `max` characters with an ellipsis.
pub fn truncate_label(label: &str, max: usize) -> String {
	if label.chars().count() <= max {
		label.to_owned()
	} else {
		let mut short: String = label.chars().take(max).collect();
		short.push('…');
		short
	}
}

fn label_budget(layer: u8) -> usize {
	if layer <= 1 { 6 } else { 4 }
}

pub fn compose(
	doc: &GraphDocument,
	placements: &[Placement],
	focus: &Focus<'_>,
	projector: &Projector,
	rotation: f64,
) -> SceneFrame {
	let rings = (0..LAYER_COUNT as u8)
		.map(|layer| ring(layer, projector, rotation))
		.collect();

	let projected: HashMap<&str, Projected> = placements
		.iter()
		.map(|p| (p.id.as_str(), projector.project(p.position, rotation)))
		.collect();

	let links = doc
		.links_within(|id| projected.contains_key(id))
		.filter(|link| focus.in_lineage(&link.source.id) && focus.in_lineage(&link.target.id))
		.filter_map(|link| {
			let (shallow, deep) = link.oriented();
			let (a, b) = (projected.get(shallow.id.as_str())?, projected.get(deep.id.as_str())?);
			let highlighted = focus.selected.is_some();
			let depth_scale = (a.scale + b.scale) / 2.0;
			Some(LinkSprite {
				key: link.index,
				from: (a.x, a.y),
				to: (b.x, b.y),
				deep_id: deep.id.clone(),
				color: layer_color(shallow.layer),
				width: if highlighted { 2.4 * depth_scale } else { 0.7 },
				opacity: if highlighted { 0.9 } else { 0.18 },
				highlighted,
			})
		})
		.collect();

	let mut nodes: Vec<NodeSprite> = placements
		.iter()
		.filter_map(|p| {
			let node = doc.node(&p.id)?;
			let at = projected.get(p.id.as_str())?;
			let selected = focus.selected == Some(node.id.as_str());
			let member = focus.in_lineage(&node.id);
			let growth = if selected { SELECTED_GROWTH } else { 1.0 };
			let radius = NODE_RADII[(node.layer as usize).min(LAYER_COUNT - 1)] * at.scale * growth;

			let label = if selected {
				Some(node.label.clone())
			} else if node.layer >= DENSE_LAYER
				&& !(focus.selected.is_some() && focus.lineage.contains(&node.id))
			{
				None
			} else {
				Some(truncate_label(&node.label, label_budget(node.layer)))
			};
			let tooltip = match &node.description {
				Some(desc) => format!("{}\n{desc}", node.label),
				None => node.label.clone(),
			};

			Some(NodeSprite {
				id: node.id.clone(),
				layer: node.layer,
				x: at.x,
				y: at.y,
				radius,
				color: layer_color(node.layer),
				opacity: if member { 1.0 } else { SUPPRESSED_OPACITY },
				label,
				tooltip,
				selected,
				depth: at.depth,
			})
		})
		.collect();

	nodes.sort_by(|a, b| {
		a.selected
			.cmp(&b.selected)
			.then(a.depth.total_cmp(&b.depth))
	});

	SceneFrame {
		rings,
		links,
		nodes,
	}
}

fn ring(layer: u8, projector: &Projector, rotation: f64) -> RingSprite {
	let outline = |radius: f64| -> Vec<(f64, f64)> {
		(0..RING_SEGMENTS)
			.map(|i| {
				let angle = i as f64 * TAU / RING_SEGMENTS as f64;
				let at = Point3::on_ring(radius, angle, layer_height(layer));
				let p = projector.project(at, rotation);
				(p.x, p.y)
			})
			.collect()
	};
	let base = base_radius(layer);
	if layer >= DENSE_LAYER {
		RingSprite {
			layer,
			color: layer_color(layer),
			outer: outline(base + SCATTER_SPREAD),
			inner: Some(outline(base)),
		}
	} else {
		RingSprite {
			layer,
			color: layer_color(layer),
			outer: outline(base),
			inner: None,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::lattice::layout::layout;
	use crate::components::lattice::lineage::resolve;
	use crate::components::lattice::types::{GraphLink, GraphNode, node};

	fn doc() -> GraphDocument {
		GraphDocument::new(
			vec![
				node("A", 0),
				node("B", 1),
				node("B2", 1),
				node("C", 2),
				node("K", 3),
			],
			vec![
				GraphLink::new("B", "A"),
				GraphLink::new("B2", "A"),
				GraphLink::new("C", "B"),
				GraphLink::new("K", "C"),
			],
		)
	}

	fn frame(doc: &GraphDocument, selected: Option<&str>) -> SceneFrame {
		let lineage = selected.map(|id| resolve(doc, id)).unwrap_or_default();
		let nodes: Vec<&GraphNode> = doc.nodes.iter().collect();
		let placements = layout(&nodes);
		let focus = Focus {
			selected,
			lineage: &lineage,
		};
		compose(doc, &placements, &focus, &Projector::new(800.0, 600.0), 0.4)
	}

	#[test]
	fn truncates_by_characters() {
		assert_eq!(truncate_label("Calculus", 6), "Calcul…");
		assert_eq!(truncate_label("Trees", 6), "Trees");
		assert_eq!(truncate_label("Überblick", 4), "Über…");
	}

	#[test]
	fn unselected_frame_draws_everything_faintly() {
		let doc = doc();
		let f = frame(&doc, None);
		assert_eq!(f.rings.len(), LAYER_COUNT);
		assert!(f.rings[3].inner.is_some());
		assert_eq!(f.links.len(), 4);
		assert!(f.links.iter().all(|l| !l.highlighted));
		assert!(f.nodes.iter().all(|n| n.opacity == 1.0));
		assert_eq!(f.node("K").unwrap().label, None);
		assert_eq!(f.node("A").unwrap().label.as_deref(), Some("A labe…"));
		assert_eq!(f.node("C").unwrap().label.as_deref(), Some("C la…"));
	}

	#[test]
	fn links_take_the_shallow_endpoint_colour() {
		let doc = doc();
		let f = frame(&doc, None);
		let kc = f.links.iter().find(|l| l.key == 3).unwrap();
		assert_eq!(kc.color, layer_color(2));
		assert_eq!(kc.deep_id, "K");
		let c = f.node("C").unwrap();
		assert_eq!(kc.from, (c.x, c.y));
	}

	#[test]
	fn selection_prunes_links_and_dims_outsiders() {
		let doc = doc();
		let f = frame(&doc, Some("C"));
		let keys: HashSet<usize> = f.links.iter().map(|l| l.key).collect();
		assert_eq!(keys, HashSet::from([0, 2, 3]));
		assert!(f.links.iter().all(|l| l.highlighted));

		assert_eq!(f.node("B2").unwrap().opacity, SUPPRESSED_OPACITY);
		assert_eq!(f.node("B").unwrap().opacity, 1.0);
		assert_eq!(f.node("K").unwrap().label.as_deref(), Some("K la…"));
		assert_eq!(f.node("C").unwrap().label.as_deref(), Some("C label"));
	}

	#[test]
	fn selected_node_paints_last_and_grows() {
		let doc = doc();
		let plain = frame(&doc, None);
		let f = frame(&doc, Some("A"));
		let last = f.nodes.last().unwrap();
		assert_eq!(last.id, "A");
		let before = plain.node("A").unwrap().radius;
		assert!((last.radius - before * SELECTED_GROWTH).abs() < 1e-9);

		let rest = &f.nodes[..f.nodes.len() - 1];
		assert!(rest.windows(2).all(|w| w[0].depth <= w[1].depth));
	}
}
