//! A small nondeterministic automaton graph: plain nodes by index, edges labelled either by a
//! digit mask or epsilon. [`crate::converter`] builds one of these from a [`crate::range_tree`]
//! DFA; [`crate::flattener`] turns one back into a nested composite expression.

use crate::range_spec::DigitMask;

/// Index into [`Nfa`]'s node list. Node `0` is always the single source (`INITIAL`), node `1`
/// the single sink (`TERMINAL`) -- [`crate::converter`] guarantees this by visitation order.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct NodeId(pub usize);

pub const INITIAL: NodeId = NodeId(0);
pub const TERMINAL: NodeId = NodeId(1);

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum EdgeLabel {
	Digits(DigitMask),
	Epsilon,
}

#[derive(Debug, Clone, Copy)]
pub struct SimpleEdge {
	pub to: NodeId,
	pub label: EdgeLabel,
}

/// An acyclic graph with a single source and single sink -- the shape
/// [`crate::flattener::NfaFlattener`] requires.
#[derive(Debug, Default)]
pub struct Nfa {
	outgoing: Vec<Vec<SimpleEdge>>,
}

impl Nfa {
	pub fn with_node_count(n: usize) -> Self {
		Self { outgoing: vec![Vec::new(); n] }
	}

	pub fn node_count(&self) -> usize {
		self.outgoing.len()
	}

	pub fn add_node(&mut self) -> NodeId {
		let id: NodeId = NodeId(self.outgoing.len());
		self.outgoing.push(Vec::new());
		id
	}

	pub fn add_edge(&mut self, from: NodeId, to: NodeId, label: EdgeLabel) {
		self.outgoing[from.0].push(SimpleEdge { to, label });
	}

	pub fn edges_from(&self, node: NodeId) -> &[SimpleEdge] {
		&self.outgoing[node.0]
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn nodes_and_edges_round_trip() {
		let mut nfa: Nfa = Nfa::with_node_count(2);
		nfa.add_edge(INITIAL, TERMINAL, EdgeLabel::Digits(0b11));
		assert_eq!(nfa.node_count(), 2);
		assert_eq!(nfa.edges_from(INITIAL).len(), 1);
		assert!(matches!(nfa.edges_from(INITIAL)[0].label, EdgeLabel::Digits(0b11)));
	}
}
