//! A single recursive engine implementing all four logical operations over interned DFAs:
//! UNION, INTERSECTION, SUBTRACTION, and FILTER (retain-by-prefix, used by
//! [`crate::prefix_tree::PrefixTree::retain_from`]).
//!
//! Each step recurses at most once per *distinct* `(left child, right child)` pair reachable
//! from the current pair of nodes — digits that resolve to the same pair of children share one
//! recursive call, bounding fan-out to at most 100 per step (ten digits on each side).

use std::collections::HashMap;
use std::sync::Arc;

use crate::range_tree::Edge;
use crate::range_tree::Node;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum Operation {
	Union,
	Intersection,
	Subtraction,
	/// Retains, from the left tree, every sequence whose prefix is accepted by the right tree.
	Filter,
}

type Memo = HashMap<(Edge, Edge, Operation), Arc<Node>>;

pub fn apply(op: Operation, left: &Arc<Node>, right: &Arc<Node>) -> Arc<Node> {
	let mut memo: Memo = HashMap::new();
	apply_rec(op, left, right, &mut memo)
}

#[tracing::instrument(skip(memo))]
fn apply_rec(op: Operation, left: &Arc<Node>, right: &Arc<Node>, memo: &mut Memo) -> Arc<Node> {
	if let Some(shortcut) = identity_shortcut(op, left, right) {
		return shortcut;
	}

	let key: (Edge, Edge, Operation) = (Edge(Arc::clone(left)), Edge(Arc::clone(right)), op);
	if let Some(cached) = memo.get(&key) {
		return Arc::clone(cached);
	}

	let terminal: bool = match op {
		Operation::Union => left.is_terminal() || right.is_terminal(),
		Operation::Intersection => left.is_terminal() && right.is_terminal(),
		Operation::Subtraction => left.is_terminal() && !right.is_terminal(),
		// Reached only when `right` isn't terminal (short-circuited above otherwise).
		Operation::Filter => false,
	};

	let empty: Arc<Node> = Node::empty();
	let mut branches: [Option<Arc<Node>>; 10] = std::array::from_fn(|_| None);
	// (left child ptr, right child ptr) -> already-computed result, so digits sharing a pair
	// of children recurse only once.
	let mut combos: Vec<((Option<*const Node>, Option<*const Node>), Arc<Node>)> = Vec::new();

	for digit in 0..10u8 {
		let left_target: Option<&Arc<Node>> = left.edge(digit);
		let right_target: Option<&Arc<Node>> = right.edge(digit);
		if op == Operation::Filter && right_target.is_none() {
			continue;
		}
		let combo_key: (Option<*const Node>, Option<*const Node>) =
			(left_target.map(Arc::as_ptr), right_target.map(Arc::as_ptr));
		let result: Arc<Node> = match combos.iter().find(|(k, _)| *k == combo_key) {
			Some((_, cached)) => Arc::clone(cached),
			None => {
				let l: &Arc<Node> = left_target.unwrap_or(&empty);
				let r: &Arc<Node> = right_target.unwrap_or(&empty);
				let sub: Arc<Node> = apply_rec(op, l, r, memo);
				combos.push((combo_key, Arc::clone(&sub)));
				sub
			},
		};
		if !result.is_empty() {
			branches[digit as usize] = Some(result);
		}
	}

	let node: Arc<Node> = Node::build(branches, terminal);
	memo.insert(key, Arc::clone(&node));
	node
}

fn identity_shortcut(op: Operation, left: &Arc<Node>, right: &Arc<Node>) -> Option<Arc<Node>> {
	match op {
		Operation::Union => {
			if left.is_empty() {
				Some(Arc::clone(right))
			} else if right.is_empty() || Arc::ptr_eq(left, right) {
				Some(Arc::clone(left))
			} else {
				None
			}
		},
		Operation::Intersection => {
			if left.is_empty() || right.is_empty() {
				Some(Node::empty())
			} else if Arc::ptr_eq(left, right) {
				Some(Arc::clone(left))
			} else {
				None
			}
		},
		Operation::Subtraction => {
			if left.is_empty() {
				Some(Node::empty())
			} else if right.is_empty() {
				Some(Arc::clone(left))
			} else if Arc::ptr_eq(left, right) {
				Some(Node::empty())
			} else {
				None
			}
		},
		Operation::Filter => {
			if right.is_terminal() {
				Some(Arc::clone(left))
			} else if right.is_empty() || left.is_empty() {
				Some(Node::empty())
			} else {
				None
			}
		},
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::range_spec::RangeSpecification;
	use crate::range_tree::RangeTree;

	fn tree(pattern: &str) -> RangeTree {
		RangeTree::from_specification(&RangeSpecification::parse(pattern).unwrap())
	}

	#[test]
	fn union_is_commutative_and_contains_both_inputs() {
		let a: RangeTree = tree("[1-3]x");
		let b: RangeTree = tree("[2-4]x");
		let u: RangeTree = a.union(&b);
		assert_eq!(u.size(), 40);
		assert!(u.contains(&crate::digit_sequence::DigitSequence::from_str("15").unwrap()));
		assert!(u.contains(&crate::digit_sequence::DigitSequence::from_str("45").unwrap()));
	}

	#[test]
	fn intersection_is_the_overlap() {
		let a: RangeTree = tree("[1-3]x");
		let b: RangeTree = tree("[2-4]x");
		let i: RangeTree = a.intersection(&b);
		assert_eq!(i.size(), 20);
		assert!(!i.contains(&crate::digit_sequence::DigitSequence::from_str("15").unwrap()));
		assert!(i.contains(&crate::digit_sequence::DigitSequence::from_str("25").unwrap()));
	}

	#[test]
	fn subtraction_removes_the_overlap() {
		let a: RangeTree = tree("[1-3]x");
		let b: RangeTree = tree("[2-4]x");
		let s: RangeTree = a.subtraction(&b);
		assert_eq!(s.size(), 10);
		assert!(s.contains(&crate::digit_sequence::DigitSequence::from_str("15").unwrap()));
		assert!(!s.contains(&crate::digit_sequence::DigitSequence::from_str("25").unwrap()));
	}

	#[test]
	fn union_with_empty_is_identity() {
		let a: RangeTree = tree("[1-3]x");
		let u: RangeTree = a.union(&RangeTree::empty());
		assert_eq!(u.size(), a.size());
	}
}
