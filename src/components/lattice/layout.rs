use std::collections::HashSet;
use std::f64::consts::{FRAC_PI_4, PI};

use super::projection::Point3;
use super::types::{DENSE_LAYER, GraphDocument, GraphNode, LAYER_COUNT, NodeId};

pub const LAYER_GAP: f64 = 130.0;
pub const TOP_RADIUS: f64 = 110.0;
pub const RADIUS_INCREMENT: f64 = 80.0;
/// Radial extent of the scatter disk beyond the dense layer's base radius.
pub const SCATTER_SPREAD: f64 = 80.0;

/// π(3 − √5), the golden angle in radians.
pub fn golden_angle() -> f64 {
	PI * (3.0 - 5f64.sqrt())
}

pub fn base_radius(layer: u8) -> f64 {
	TOP_RADIUS + layer as f64 * RADIUS_INCREMENT
}

pub fn layer_height(layer: u8) -> f64 {
	(layer as f64 - 1.5) * LAYER_GAP
}

/// What decides whether a node is drawn at all.
pub struct VisibilityFilter<'a> {
	pub selected: Option<&'a str>,
	pub lineage: &'a HashSet<NodeId>,
	pub show_all: bool,
}

impl VisibilityFilter<'_> {
	pub fn admits(&self, node: &GraphNode, degree: usize) -> bool {
		self.selected == Some(node.id.as_str())
			|| self.lineage.contains(&node.id)
			|| node.layer != DENSE_LAYER
			|| self.show_all
			|| degree > 1
	}

	/// Visible nodes in document order.
	pub fn apply<'d>(&self, doc: &'d GraphDocument) -> Vec<&'d GraphNode> {
		let degrees = doc.degrees();
		doc.nodes
			.iter()
			.filter(|n| self.admits(n, degrees.get(n.id.as_str()).copied().unwrap_or(0)))
			.collect()
	}
}

/// A node's slot in world space.
#[derive(Clone, Debug, PartialEq)]
pub struct Placement {
	pub id: NodeId,
	pub layer: u8,
	pub angle: f64,
	pub radius: f64,
	pub position: Point3,
}

/// Places each node on its layer's ring. Order within a layer follows input order.
pub fn layout(nodes: &[&GraphNode]) -> Vec<Placement> {
	let mut counts = [0usize; LAYER_COUNT];
	for n in nodes {
		counts[layer_slot(n.layer)] += 1;
	}

	let mut seen = [0usize; LAYER_COUNT];
	nodes
		.iter()
		.map(|n| {
			let slot = layer_slot(n.layer);
			let (i, count) = (seen[slot], counts[slot]);
			seen[slot] += 1;

			let (angle, radius) = if n.layer >= DENSE_LAYER {
				(
					i as f64 * golden_angle(),
					base_radius(n.layer) + (i as f64 / count as f64).sqrt() * SCATTER_SPREAD,
				)
			} else {
				(
					i as f64 * 2.0 * PI / count as f64 + n.layer as f64 * FRAC_PI_4,
					base_radius(n.layer),
				)
			};

			Placement {
				id: n.id.clone(),
				layer: n.layer,
				angle,
				radius,
				position: Point3::on_ring(radius, angle, layer_height(n.layer)),
			}
		})
		.collect()
}

fn layer_slot(layer: u8) -> usize {
	(layer as usize).min(LAYER_COUNT - 1)
}
