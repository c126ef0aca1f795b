use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type NodeId = String;

/// Number of hierarchy tiers, objective through knowledge point.
pub const LAYER_COUNT: usize = 4;

/// The bottom tier; it holds most of the nodes.
pub const DENSE_LAYER: u8 = 3;

/// Fill colour per layer, shallowest first.
pub const LAYER_COLORS: [&str; LAYER_COUNT] = ["#f4a261", "#e76f51", "#2a9d8f", "#8ab4f8"];

static BUNDLED: &str = include_str!("../../../assets/default_graph.json");

#[derive(Debug, Error)]
pub enum DocumentError {
	#[error("malformed graph document: {0}")]
	Decode(#[from] serde_json::Error),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
	Objective,
	Requirement,
	Course,
	#[serde(alias = "knowledge_point", alias = "knowledgepoint")]
	Knowledge,
}

impl NodeKind {
	#[cfg(test)]
	pub fn layer(self) -> u8 {
		match self {
			NodeKind::Objective => 0,
			NodeKind::Requirement => 1,
			NodeKind::Course => 2,
			NodeKind::Knowledge => 3,
		}
	}

	pub fn label(self) -> &'static str {
		match self {
			NodeKind::Objective => "Objective",
			NodeKind::Requirement => "Requirement",
			NodeKind::Course => "Course",
			NodeKind::Knowledge => "Knowledge point",
		}
	}
}

pub fn layer_color(layer: u8) -> &'static str {
	LAYER_COLORS[(layer as usize).min(LAYER_COUNT - 1)]
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
	pub id: NodeId,
	pub label: String,
	pub layer: u8,
	#[serde(rename = "type")]
	pub kind: NodeKind,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
}

/// A link endpoint as it arrives on the wire: either a bare id or a node-like
/// object that has already been dereferenced by the producer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LinkEnd {
	Id(NodeId),
	Node { id: NodeId },
}

impl LinkEnd {
	pub fn id(&self) -> &str {
		match self {
			LinkEnd::Id(id) | LinkEnd::Node { id } => id,
		}
	}
}

impl From<&str> for LinkEnd {
	fn from(id: &str) -> Self {
		LinkEnd::Id(id.to_owned())
	}
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphLink {
	pub source: LinkEnd,
	pub target: LinkEnd,
}

impl GraphLink {
	#[cfg(test)]
	pub fn new(source: &str, target: &str) -> Self {
		Self {
			source: source.into(),
			target: target.into(),
		}
	}
}

#[derive(Deserialize)]
struct DocumentWire {
	#[serde(default)]
	nodes: Vec<GraphNode>,
	#[serde(default)]
	links: Vec<GraphLink>,
}

impl From<DocumentWire> for GraphDocument {
	fn from(wire: DocumentWire) -> Self {
		GraphDocument::new(wire.nodes, wire.links)
	}
}

/// A link whose endpoints both resolve to nodes of the document.
#[derive(Clone, Copy, Debug)]
pub struct ResolvedLink<'a> {
	/// Position in [`GraphDocument::links`]; stable for the document's lifetime.
	pub index: usize,
	pub source: &'a GraphNode,
	pub target: &'a GraphNode,
}

impl<'a> ResolvedLink<'a> {
	/// Endpoints ordered shallow first. Lateral links keep source first.
	pub fn oriented(&self) -> (&'a GraphNode, &'a GraphNode) {
		if self.target.layer < self.source.layer {
			(self.target, self.source)
		} else {
			(self.source, self.target)
		}
	}

	pub fn is_lateral(&self) -> bool {
		self.source.layer == self.target.layer
	}
}

/// Immutable curriculum graph. Replaced wholesale, never edited in place.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(from = "DocumentWire")]
pub struct GraphDocument {
	pub nodes: Vec<GraphNode>,
	pub links: Vec<GraphLink>,
	#[serde(skip)]
	lookup: HashMap<NodeId, usize>,
}

impl PartialEq for GraphDocument {
	fn eq(&self, other: &Self) -> bool {
		self.nodes == other.nodes && self.links == other.links
	}
}

impl GraphDocument {
	pub fn new(nodes: Vec<GraphNode>, links: Vec<GraphLink>) -> Self {
		let lookup = nodes
			.iter()
			.enumerate()
			.map(|(i, node)| (node.id.clone(), i))
			.collect();
		Self {
			nodes,
			links,
			lookup,
		}
	}

	pub fn from_json(text: &str) -> Result<Self, DocumentError> {
		Ok(serde_json::from_str(text)?)
	}

	/// The dataset shipped with the app, or an empty document if it fails to decode.
	pub fn bundled() -> Self {
		Self::from_json(BUNDLED).unwrap_or_else(|err| {
			log::warn!("bundled dataset rejected: {err}");
			Self::default()
		})
	}

	pub fn node(&self, id: &str) -> Option<&GraphNode> {
		self.lookup.get(id).map(|&i| &self.nodes[i])
	}

	/// Links with both endpoints present; dangling links are skipped.
	pub fn resolved_links(&self) -> impl Iterator<Item = ResolvedLink<'_>> + '_ {
		self.links.iter().enumerate().filter_map(|(index, link)| {
			Some(ResolvedLink {
				index,
				source: self.node(link.source.id())?,
				target: self.node(link.target.id())?,
			})
		})
	}

	/// Resolved links whose endpoints both satisfy `keep`.
	pub fn links_within<'a, F>(&'a self, keep: F) -> impl Iterator<Item = ResolvedLink<'a>> + 'a
	where
		F: Fn(&str) -> bool + 'a,
	{
		self.resolved_links()
			.filter(move |link| keep(&link.source.id) && keep(&link.target.id))
	}

	/// Incident resolvable link count per node id.
	pub fn degrees(&self) -> HashMap<&str, usize> {
		let mut degrees = HashMap::new();
		for link in self.resolved_links() {
			*degrees.entry(link.source.id.as_str()).or_default() += 1;
			*degrees.entry(link.target.id.as_str()).or_default() += 1;
		}
		degrees
	}
}

#[cfg(test)]
pub(crate) fn node(id: &str, layer: u8) -> GraphNode {
	let kind = match layer {
		0 => NodeKind::Objective,
		1 => NodeKind::Requirement,
		2 => NodeKind::Course,
		_ => NodeKind::Knowledge,
	};
	GraphNode {
		id: id.into(),
		label: format!("{id} label"),
		layer,
		kind,
		description: None,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn decodes_both_endpoint_shapes() {
		let doc = GraphDocument::from_json(
			r#"{
				"nodes": [
					{"id": "o1", "label": "Ethics", "layer": 0, "type": "objective"},
					{"id": "r1", "label": "Reasoning", "layer": 1, "type": "requirement", "description": "d"}
				],
				"links": [
					{"source": "r1", "target": "o1"},
					{"source": {"id": "r1", "label": "Reasoning", "layer": 1}, "target": {"id": "o1"}}
				]
			}"#,
		)
		.unwrap();

		assert_eq!(doc.links[0].source.id(), "r1");
		assert_eq!(doc.links[1].source.id(), "r1");
		assert_eq!(doc.links[1].target.id(), "o1");
		assert_eq!(doc.node("r1").unwrap().description.as_deref(), Some("d"));
		assert_eq!(doc.resolved_links().count(), 2);
	}

	#[test]
	fn rejects_garbage() {
		assert!(GraphDocument::from_json("{\"nodes\": 3}").is_err());
	}

	#[test]
	fn dangling_links_are_skipped() {
		let doc = GraphDocument::new(
			vec![node("a", 0), node("b", 1)],
			vec![GraphLink::new("b", "a"), GraphLink::new("b", "ghost")],
		);
		let resolved: Vec<_> = doc.resolved_links().map(|l| l.index).collect();
		assert_eq!(resolved, vec![0]);
		assert_eq!(doc.degrees().get("b"), Some(&1));
		assert!(doc.degrees().get("ghost").is_none());
	}

	#[test]
	fn orientation_puts_shallow_endpoint_first() {
		let doc = GraphDocument::new(
			vec![node("a", 0), node("b", 1)],
			vec![GraphLink::new("a", "b"), GraphLink::new("b", "a")],
		);
		for link in doc.resolved_links() {
			let (shallow, deep) = link.oriented();
			assert_eq!((shallow.id.as_str(), deep.id.as_str()), ("a", "b"));
		}
	}

	#[test]
	fn bundled_dataset_is_consistent() {
		let doc = GraphDocument::bundled();
		assert!(!doc.nodes.is_empty());
		for n in &doc.nodes {
			assert_eq!(n.layer, n.kind.layer(), "{} has mismatched layer", n.id);
		}
		assert_eq!(doc.resolved_links().count(), doc.links.len());
	}
}
