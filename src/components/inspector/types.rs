use crate::components::lattice::{GraphDocument, NodeId, lineage};

#[derive(Clone, Debug, PartialEq)]
pub struct InspectorNode {
	pub id: NodeId,
	pub label: String,
	pub layer: u8,
	/// The node the lineage was taken from.
	pub focus: bool,
}

/// Directed shallow → deep.
#[derive(Clone, Debug, PartialEq)]
pub struct InspectorLink {
	pub source: NodeId,
	pub target: NodeId,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct InspectorData {
	pub nodes: Vec<InspectorNode>,
	pub links: Vec<InspectorLink>,
}

impl InspectorData {
	/// The lineage subgraph around `selected`, in document order.
	pub fn from_lineage(doc: &GraphDocument, selected: &str) -> Self {
		if doc.node(selected).is_none() {
			return Self::default();
		}
		let members = lineage::resolve(doc, selected);
		let nodes = doc
			.nodes
			.iter()
			.filter(|n| members.contains(&n.id))
			.map(|n| InspectorNode {
				id: n.id.clone(),
				label: n.label.clone(),
				layer: n.layer,
				focus: n.id == selected,
			})
			.collect();
		let links = doc
			.links_within(|id| members.contains(id))
			.filter(|link| !link.is_lateral())
			.map(|link| {
				let (shallow, deep) = link.oriented();
				InspectorLink {
					source: shallow.id.clone(),
					target: deep.id.clone(),
				}
			})
			.collect();
		Self { nodes, links }
	}

	pub fn focus(&self) -> Option<&InspectorNode> {
		self.nodes.iter().find(|n| n.focus)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::lattice::GraphLink;
	use crate::components::lattice::node;

	#[test]
	fn keeps_only_the_lineage() {
		let doc = GraphDocument::new(
			vec![node("A", 0), node("B", 1), node("B2", 1), node("C", 2)],
			vec![
				GraphLink::new("A", "B"),
				GraphLink::new("B2", "A"),
				GraphLink::new("C", "B"),
			],
		);
		let data = InspectorData::from_lineage(&doc, "B");
		let ids: Vec<_> = data.nodes.iter().map(|n| n.id.as_str()).collect();
		assert_eq!(ids, ["A", "B", "C"]);
		assert_eq!(data.focus().map(|n| n.id.as_str()), Some("B"));
		assert_eq!(
			data.links,
			vec![
				InspectorLink {
					source: "A".into(),
					target: "B".into()
				},
				InspectorLink {
					source: "B".into(),
					target: "C".into()
				},
			]
		);
	}

	#[test]
	fn unknown_selection_is_empty() {
		let doc = GraphDocument::new(vec![node("A", 0)], vec![]);
		assert_eq!(InspectorData::from_lineage(&doc, "Z"), InspectorData::default());
	}
}
