//! Converts a [`RangeTree`] DFA into an [`Nfa`], adding an epsilon edge to the sink for every
//! DFA node that is terminal -- including ones that also have further outgoing edges, which is
//! exactly the "early-terminating state" case a plain DFA can represent but a regex can only
//! express through an explicit alternative ending here.

use std::collections::HashMap;
use std::collections::VecDeque;
use std::sync::Arc;

use crate::nfa::EdgeLabel;
use crate::nfa::INITIAL;
use crate::nfa::Nfa;
use crate::nfa::NodeId;
use crate::nfa::TERMINAL;
use crate::range_spec::DigitMask;
use crate::range_tree::Edge;
use crate::range_tree::Node;
use crate::range_tree::RangeTree;

/// Node ids are assigned in breadth-first visitation order starting from the DFA root, which
/// always becomes `INITIAL` (`0`); `TERMINAL` (`1`) is reserved for the synthetic sink and is
/// never reused for a DFA node.
pub fn convert(tree: &RangeTree) -> Nfa {
	let mut nfa: Nfa = Nfa::with_node_count(2);
	let mut ids: HashMap<Edge, NodeId> = HashMap::new();
	let root: Arc<Node> = Arc::clone(tree.root());
	ids.insert(Edge(Arc::clone(&root)), INITIAL);

	let mut queue: VecDeque<Arc<Node>> = VecDeque::new();
	queue.push_back(root);

	while let Some(node) = queue.pop_front() {
		let from: NodeId = ids[&Edge(Arc::clone(&node))];

		if node.is_terminal() {
			nfa.add_edge(from, TERMINAL, EdgeLabel::Epsilon);
		}

		for (mask, target) in node.grouped_edges() {
			let to: NodeId = *ids.entry(Edge(Arc::clone(&target))).or_insert_with(|| {
				let id: NodeId = nfa.add_node();
				queue.push_back(Arc::clone(&target));
				id
			});
			nfa.add_edge(from, to, EdgeLabel::Digits(mask));
		}
	}

	nfa
}
