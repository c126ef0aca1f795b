//! Layer-ordered ancestry over a [`GraphDocument`].
//!
//! Links are stored undirected; orientation comes from the endpoints' layers.
//! The shallower endpoint is the parent. Lateral links (both endpoints on the
//! same layer) carry no parent/child meaning and are ignored here.

use std::collections::{HashMap, HashSet, VecDeque};

use super::types::{GraphDocument, LAYER_COUNT, NodeId};

struct Adjacency<'a> {
	parents_of: HashMap<&'a str, Vec<&'a str>>,
	children_of: HashMap<&'a str, Vec<&'a str>>,
}

impl<'a> Adjacency<'a> {
	fn build(doc: &'a GraphDocument) -> Self {
		let mut parents_of: HashMap<&str, Vec<&str>> = HashMap::new();
		let mut children_of: HashMap<&str, Vec<&str>> = HashMap::new();
		for link in doc.resolved_links() {
			if link.is_lateral() {
				continue;
			}
			let (parent, child) = link.oriented();
			parents_of.entry(&child.id).or_default().push(&parent.id);
			children_of.entry(&parent.id).or_default().push(&child.id);
		}
		Self {
			parents_of,
			children_of,
		}
	}
}

/// Breadth-first walk along one direction of the adjacency, excluding `start`.
fn walk<'a>(edges: &HashMap<&'a str, Vec<&'a str>>, start: &'a str) -> Vec<&'a str> {
	let mut visited: HashSet<&str> = HashSet::from([start]);
	let mut queue = VecDeque::from([start]);
	let mut reached = Vec::new();
	while let Some(current) = queue.pop_front() {
		for &next in edges.get(current).into_iter().flatten() {
			if visited.insert(next) {
				reached.push(next);
				queue.push_back(next);
			}
		}
	}
	reached
}

/// Strict ancestors and descendants of one node, kept apart.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Lineage {
	pub ancestors: HashSet<NodeId>,
	pub descendants: HashSet<NodeId>,
}

impl Lineage {
	pub fn split(doc: &GraphDocument, selected: &str) -> Self {
		let Some(node) = doc.node(selected) else {
			return Self::default();
		};
		let adjacency = Adjacency::build(doc);
		let collect = |reached: Vec<&str>| -> HashSet<NodeId> {
			reached.into_iter().map(str::to_owned).collect()
		};
		Self {
			ancestors: collect(walk(&adjacency.parents_of, &node.id)),
			descendants: collect(walk(&adjacency.children_of, &node.id)),
		}
	}
}

/// The selected node together with everything above and below it.
pub fn resolve(doc: &GraphDocument, selected: &str) -> HashSet<NodeId> {
	let Lineage {
		mut ancestors,
		descendants,
	} = Lineage::split(doc, selected);
	ancestors.extend(descendants);
	ancestors.insert(selected.to_owned());
	ancestors
}

/// Descendant counts bucketed by layer, the selected node excluded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Impact {
	pub per_layer: [usize; LAYER_COUNT],
}

impl Impact {
	pub fn total(&self) -> usize {
		self.per_layer.iter().sum()
	}
}

pub fn impact(doc: &GraphDocument, selected: &str) -> Impact {
	let mut report = Impact::default();
	let Some(node) = doc.node(selected) else {
		return report;
	};
	let adjacency = Adjacency::build(doc);
	for id in walk(&adjacency.children_of, &node.id) {
		if let Some(reached) = doc.node(id) {
			report.per_layer[(reached.layer as usize).min(LAYER_COUNT - 1)] += 1;
		}
	}
	report
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::lattice::types::{GraphLink, node};

	fn chain() -> GraphDocument {
		GraphDocument::new(
			vec![node("A", 0), node("B", 1), node("C", 2)],
			vec![GraphLink::new("B", "A"), GraphLink::new("C", "B")],
		)
	}

	fn ids(items: &[&str]) -> HashSet<NodeId> {
		items.iter().map(|s| s.to_string()).collect()
	}

	#[test]
	fn selecting_leaf_walks_up() {
		assert_eq!(resolve(&chain(), "C"), ids(&["A", "B", "C"]));
		let split = Lineage::split(&chain(), "C");
		assert_eq!(split.ancestors, ids(&["A", "B"]));
		assert!(split.descendants.is_empty());
	}

	#[test]
	fn selecting_root_walks_down() {
		assert_eq!(resolve(&chain(), "A"), ids(&["A", "B", "C"]));
		let split = Lineage::split(&chain(), "A");
		assert!(split.ancestors.is_empty());
		assert_eq!(split.descendants, ids(&["B", "C"]));
	}

	#[test]
	fn always_contains_selection() {
		let doc = GraphDocument::new(vec![node("lonely", 2)], vec![]);
		assert_eq!(resolve(&doc, "lonely"), ids(&["lonely"]));
		assert_eq!(resolve(&doc, "missing"), ids(&["missing"]));
	}

	#[test]
	fn siblings_are_not_lineage() {
		let doc = GraphDocument::new(
			vec![node("A", 0), node("B1", 1), node("B2", 1), node("K", 3)],
			vec![
				GraphLink::new("B1", "A"),
				GraphLink::new("B2", "A"),
				GraphLink::new("K", "B2"),
			],
		);
		// B1's ancestor A has other descendants, but those are not B1's lineage.
		assert_eq!(resolve(&doc, "B1"), ids(&["A", "B1"]));
		assert_eq!(resolve(&doc, "K"), ids(&["A", "B2", "K"]));
	}

	#[test]
	fn lateral_and_dangling_links_are_ignored() {
		let doc = GraphDocument::new(
			vec![node("A", 0), node("B", 1), node("B'", 1)],
			vec![
				GraphLink::new("B", "A"),
				GraphLink::new("B", "B'"),
				GraphLink::new("B", "nowhere"),
			],
		);
		assert_eq!(resolve(&doc, "B"), ids(&["A", "B"]));
		assert_eq!(resolve(&doc, "B'"), ids(&["B'"]));
	}

	#[test]
	fn skipping_layers_still_counts() {
		let doc = GraphDocument::new(
			vec![node("A", 0), node("K", 3), node("C", 2)],
			vec![GraphLink::new("A", "K"), GraphLink::new("C", "K")],
		);
		let split = Lineage::split(&doc, "K");
		assert_eq!(split.ancestors, ids(&["A", "C"]));
	}

	#[test]
	fn impact_tallies_descendants_per_layer() {
		let doc = GraphDocument::new(
			vec![
				node("A", 0),
				node("B", 1),
				node("C1", 2),
				node("C2", 2),
				node("K", 3),
			],
			vec![
				GraphLink::new("B", "A"),
				GraphLink::new("C1", "B"),
				GraphLink::new("C2", "B"),
				GraphLink::new("K", "C1"),
				GraphLink::new("K", "C2"),
			],
		);
		let report = impact(&doc, "A");
		assert_eq!(report.per_layer, [0, 1, 2, 1]);
		assert_eq!(report.total(), 4);
		assert_eq!(impact(&doc, "K").total(), 0);
	}
}
