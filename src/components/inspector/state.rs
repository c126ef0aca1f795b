use std::collections::{HashMap, HashSet};
use std::f64::consts::TAU;

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData, SimulationParameters};

use super::types::InspectorData;
use crate::components::lattice::{ViewTransform, layer_color};

pub const NODE_RADIUS: f64 = 6.0;
pub const FOCUS_RADIUS: f64 = 10.0;
pub const HIT_RADIUS: f64 = 12.0;
/// Spacing between the concentric start rings.
pub const RING_STEP: f64 = 70.0;

#[derive(Clone, Debug, Default)]
pub struct NodeInfo {
	pub id: String,
	pub label: String,
	pub focus: bool,
	pub color: &'static str,
}

#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub active: bool,
	pub moved: bool,
	pub node_idx: Option<DefaultNodeIdx>,
	pub start_x: f64,
	pub start_y: f64,
	pub node_start_x: f32,
	pub node_start_y: f32,
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

/// Seconds the pointer must rest on a node before its chain lights up.
const HOVER_DELAY: f64 = 0.08;
const FADE_IN: f64 = 1.8;
const FADE_OUT: f64 = 1.26;

/// A hovered node plus everything upstream and downstream of it in the
/// subgraph. Siblings are not part of the chain.
#[derive(Clone, Debug)]
pub struct Chain {
	pub node: DefaultNodeIdx,
	pub members: HashSet<DefaultNodeIdx>,
}

impl Chain {
	fn contains(&self, idx: DefaultNodeIdx) -> bool {
		self.node == idx || self.members.contains(&idx)
	}
}

/// The lit chain and its strength. A chain that loses the pointer moves to
/// `fading` and is dropped once `level` reaches zero.
#[derive(Clone, Debug, Default)]
pub struct HoverState {
	pub current: Option<Chain>,
	pub fading: Option<Chain>,
	/// Highlight strength in [0, 1].
	pub level: f64,
	rest: f64,
}

impl HoverState {
	fn lit(&self) -> Option<&Chain> {
		self.current.as_ref().or(self.fading.as_ref())
	}

	fn advance(&mut self, dt: f64) {
		if self.current.is_some() {
			self.rest = (self.rest + dt).min(HOVER_DELAY);
			if self.rest >= HOVER_DELAY {
				self.level += (1.0 - self.level) * FADE_IN * dt;
			}
		} else {
			self.level -= self.level * FADE_OUT * dt;
			if self.level < 0.01 {
				self.level = 0.0;
				self.fading = None;
			}
		}
	}
}

/// Force-directed view of one node's lineage. The focus node is pinned at the
/// origin; everything else starts on a ring per layer of distance from it.
pub struct InspectorState {
	pub graph: ForceGraph<NodeInfo, ()>,
	pub transform: ViewTransform,
	pub drag: DragState,
	pub pan: PanState,
	pub hover: HoverState,
	pub width: f64,
	pub height: f64,
	pub flow_time: f64,
	node_count: usize,
	edges: Vec<(DefaultNodeIdx, DefaultNodeIdx)>,
}

impl InspectorState {
	pub fn new(data: &InspectorData, width: f64, height: f64) -> Self {
		let mut graph = ForceGraph::new(SimulationParameters {
			force_charge: 120.0,
			force_spring: 0.06,
			force_max: 80.0,
			node_speed: 2500.0,
			damping_factor: 0.88,
		});

		let focus_layer = data.focus().map_or(0, |n| n.layer) as i32;
		let mut ring_sizes: HashMap<i32, usize> = HashMap::new();
		for node in data.nodes.iter().filter(|n| !n.focus) {
			*ring_sizes.entry((node.layer as i32 - focus_layer).abs().max(1)).or_default() += 1;
		}

		let mut ring_seen: HashMap<i32, usize> = HashMap::new();
		let mut id_to_idx = HashMap::new();
		for node in &data.nodes {
			let (x, y) = if node.focus {
				(0.0, 0.0)
			} else {
				let ring = (node.layer as i32 - focus_layer).abs().max(1);
				let seen = ring_seen.entry(ring).or_default();
				let angle = *seen as f64 * TAU / ring_sizes[&ring] as f64 + ring as f64 * 0.5;
				*seen += 1;
				let r = ring as f64 * RING_STEP;
				((r * angle.cos()) as f32, (r * angle.sin()) as f32)
			};

			let idx = graph.add_node(NodeData {
				x,
				y,
				mass: if node.focus { 20.0 } else { 10.0 },
				is_anchor: node.focus,
				user_data: NodeInfo {
					id: node.id.clone(),
					label: node.label.clone(),
					focus: node.focus,
					color: layer_color(node.layer),
				},
			});
			id_to_idx.insert(node.id.as_str(), idx);
		}

		let mut edges = Vec::new();
		for link in &data.links {
			if let (Some(&src), Some(&tgt)) = (
				id_to_idx.get(link.source.as_str()),
				id_to_idx.get(link.target.as_str()),
			) {
				graph.add_edge(src, tgt, EdgeData::default());
				edges.push((src, tgt));
			}
		}

		Self {
			graph,
			node_count: id_to_idx.len(),
			edges,
			transform: ViewTransform {
				x: width / 2.0,
				y: height / 2.0,
				k: 1.0,
			},
			drag: DragState::default(),
			pan: PanState::default(),
			hover: HoverState::default(),
			width,
			height,
			flow_time: 0.0,
		}
	}

	/// Rebuild from new data, keeping the camera.
	pub fn reload(&mut self, data: &InspectorData) {
		let transform = self.transform.clone();
		*self = Self::new(data, self.width, self.height);
		self.transform = transform;
	}

	pub fn is_empty(&self) -> bool {
		self.node_count == 0
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<DefaultNodeIdx> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		let mut found = None;
		let mut best = HIT_RADIUS;
		self.graph.visit_nodes(|node| {
			let (dx, dy) = (node.x() as f64 - gx, node.y() as f64 - gy);
			let dist = (dx * dx + dy * dy).sqrt();
			if dist < best {
				best = dist;
				found = Some(node.index());
			}
		});
		found
	}

	pub fn node_id(&self, idx: DefaultNodeIdx) -> Option<String> {
		let mut id = None;
		self.graph.visit_nodes(|node| {
			if node.index() == idx {
				id = Some(node.data.user_data.id.clone());
			}
		});
		id
	}

	/// Walk `edges` from `start` following `step`, which maps an edge to the
	/// next node when the edge leaves the current one.
	fn walk(
		&self,
		start: DefaultNodeIdx,
		step: impl Fn(&(DefaultNodeIdx, DefaultNodeIdx), DefaultNodeIdx) -> Option<DefaultNodeIdx>,
	) -> HashSet<DefaultNodeIdx> {
		let mut seen = HashSet::new();
		let mut queue = vec![start];
		while let Some(at) = queue.pop() {
			for next in self.edges.iter().filter_map(|edge| step(edge, at)) {
				if next != start && seen.insert(next) {
					queue.push(next);
				}
			}
		}
		seen
	}

	fn chain(&self, idx: DefaultNodeIdx) -> Chain {
		let mut members = self.walk(idx, |&(src, tgt), at| (tgt == at).then_some(src));
		members.extend(self.walk(idx, |&(src, tgt), at| (src == at).then_some(tgt)));
		Chain { node: idx, members }
	}

	pub fn set_hover(&mut self, node: Option<DefaultNodeIdx>) {
		if self.hover.current.as_ref().map(|c| c.node) == node {
			return;
		}
		match node {
			Some(idx) => {
				if self.hover.current.is_none() {
					self.hover.rest = 0.0;
				}
				self.hover.fading = None;
				self.hover.current = Some(self.chain(idx));
			}
			None => self.hover.fading = self.hover.current.take(),
		}
	}

	pub fn is_highlighted(&self, idx: DefaultNodeIdx) -> bool {
		self.hover.lit().is_some_and(|c| c.contains(idx))
	}

	pub fn is_hovered(&self, idx: DefaultNodeIdx) -> bool {
		self.hover.lit().is_some_and(|c| c.node == idx)
	}

	pub fn has_active_highlight(&self) -> bool {
		self.hover.lit().is_some()
	}

	pub fn tick(&mut self, dt: f32) {
		self.graph.update(dt);
		self.flow_time += dt as f64;
		self.hover.advance(dt as f64);
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::inspector::types::InspectorData;
	use crate::components::lattice::{GraphDocument, GraphLink, node};

	fn data() -> InspectorData {
		let doc = GraphDocument::new(
			vec![node("A", 0), node("B", 1), node("C", 2), node("K", 3)],
			vec![
				GraphLink::new("B", "A"),
				GraphLink::new("C", "B"),
				GraphLink::new("K", "C"),
			],
		);
		InspectorData::from_lineage(&doc, "B")
	}

	fn position(state: &InspectorState, id: &str) -> (f64, f64) {
		let mut at = (f64::NAN, f64::NAN);
		state.graph.visit_nodes(|n| {
			if n.data.user_data.id == id {
				at = (n.x() as f64, n.y() as f64);
			}
		});
		at
	}

	#[test]
	fn focus_is_pinned_at_the_centre() {
		let state = InspectorState::new(&data(), 300.0, 300.0);
		assert_eq!(position(&state, "B"), (0.0, 0.0));
		let hit = state.node_at_position(150.0, 150.0).unwrap();
		assert_eq!(state.node_id(hit).as_deref(), Some("B"));
	}

	#[test]
	fn rings_follow_layer_distance() {
		let state = InspectorState::new(&data(), 300.0, 300.0);
		let dist = |id| {
			let (x, y) = position(&state, id);
			(x * x + y * y).sqrt()
		};
		assert!((dist("A") - RING_STEP).abs() < 0.01);
		assert!((dist("C") - RING_STEP).abs() < 0.01);
		assert!((dist("K") - 2.0 * RING_STEP).abs() < 0.01);
	}

	fn index_of(state: &InspectorState, id: &str) -> DefaultNodeIdx {
		let mut found = None;
		state.graph.visit_nodes(|n| {
			if n.data.user_data.id == id {
				found = Some(n.index());
			}
		});
		found.unwrap()
	}

	#[test]
	fn hover_lights_the_chain_and_fades() {
		let mut state = InspectorState::new(&data(), 300.0, 300.0);
		let focus = state.node_at_position(150.0, 150.0).unwrap();
		state.set_hover(Some(focus));
		assert_eq!(state.hover.current.as_ref().unwrap().members.len(), 3);
		for _ in 0..200 {
			state.tick(0.016);
		}
		assert!(state.hover.level > 0.9);

		state.set_hover(None);
		assert!(state.has_active_highlight());
		assert!(state.is_highlighted(index_of(&state, "K")));
		for _ in 0..600 {
			state.tick(0.016);
		}
		assert!(!state.has_active_highlight());
	}

	#[test]
	fn hover_chain_follows_direction_and_skips_siblings() {
		let doc = GraphDocument::new(
			vec![
				node("A", 0),
				node("B", 1),
				node("C", 2),
				node("C2", 2),
				node("K", 3),
			],
			vec![
				GraphLink::new("B", "A"),
				GraphLink::new("C", "B"),
				GraphLink::new("C2", "B"),
				GraphLink::new("K", "C"),
			],
		);
		let data = InspectorData::from_lineage(&doc, "B");
		let mut state = InspectorState::new(&data, 300.0, 300.0);
		state.set_hover(Some(index_of(&state, "C")));
		for id in ["A", "B", "C", "K"] {
			assert!(state.is_highlighted(index_of(&state, id)), "{id}");
		}
		assert!(!state.is_highlighted(index_of(&state, "C2")));
		assert!(state.is_hovered(index_of(&state, "C")));
		assert!(!state.is_hovered(index_of(&state, "A")));
	}

	#[test]
	fn reload_keeps_the_camera() {
		let mut state = InspectorState::new(&data(), 300.0, 300.0);
		state.transform.k = 2.0;
		state.reload(&InspectorData::default());
		assert_eq!(state.transform.k, 2.0);
		assert!(state.is_empty());
		assert_eq!(state.node_at_position(150.0, 150.0), None);
	}
}
