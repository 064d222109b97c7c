//! A tree of accepted *prefixes* rather than accepted full-length sequences: a digit sequence
//! matches a [`PrefixTree`] if it starts with one of the tree's accepted prefixes, regardless
//! of what follows.
//!
//! This makes union and intersection behave differently from [`crate::range_tree::RangeTree`]:
//! once a node is terminal it represents "stop here, anything further matches too", so no
//! terminal node may carry outgoing edges, and there is never a trailing run of `ALL` edges
//! immediately before a terminal (that would just be the terminal itself, one digit earlier).

use std::sync::Arc;

use crate::range_tree::Node;
use crate::range_tree::RangeTree;

#[derive(Clone)]
pub struct PrefixTree {
	root: Arc<Node>,
}

impl PrefixTree {
	pub fn empty() -> Self {
		Self { root: Node::empty() }
	}

	pub fn root(&self) -> &Arc<Node> {
		&self.root
	}

	pub fn contains_prefix_of(&self, digits: &[u8]) -> bool {
		let mut node: &Arc<Node> = &self.root;
		for &digit in digits {
			if node.is_terminal() {
				return true;
			}
			match node.edge(digit) {
				Some(next) => node = next,
				None => return false,
			}
		}
		node.is_terminal()
	}

	/// The prefix tree of the shortest accepted prefix of every sequence in `range`: as soon as
	/// `range` accepts (is terminal), the corresponding prefix is recorded and any longer
	/// continuation `range` might also accept from there is irrelevant.
	pub fn from_range(range: &RangeTree) -> Self {
		Self { root: shorten(range.root()) }
	}

	/// Keeps the *more general* (shorter, less specific) of two overlapping prefixes: a
	/// sequence matches the union as soon as it matches either side.
	pub fn union(&self, other: &Self) -> Self {
		Self { root: prefix_union(&self.root, &other.root) }
	}

	/// Keeps the *more specific* (longer) of two overlapping prefixes: a sequence matches the
	/// intersection only once it has satisfied both sides.
	///
	/// Equivalent, per the algebra, to `intersect(a,b)` union'd with the two asymmetric
	/// subtractions `a - b` / `b - a` restricted to their overlap region; the direct
	/// short-circuiting recursion here computes the same tree without building those
	/// intermediates.
	pub fn intersect(&self, other: &Self) -> Self {
		Self { root: prefix_intersect(&self.root, &other.root) }
	}

	/// Keeps from `range` only the sequences that start with one of this tree's prefixes.
	pub fn retain_from(&self, range: &RangeTree) -> RangeTree {
		RangeTree::from_root(crate::set_ops::apply(crate::set_ops::Operation::Filter, range.root(), &self.root))
	}

	/// The shortest prefixes of at least `min_len` digits that accept everything in `include`
	/// and nothing in `exclude`.
	///
	/// # Panics
	///
	/// Panics (via `debug_assert`) if `include` and `exclude` overlap -- the result is only
	/// well-defined when they don't, per the documented precondition.
	pub fn minimal(include: &RangeTree, exclude: &RangeTree, min_len: usize) -> Self {
		debug_assert!(
			crate::set_ops::apply(crate::set_ops::Operation::Intersection, include.root(), exclude.root()).is_empty(),
			"PrefixTree::minimal requires `include` and `exclude` to be disjoint"
		);
		Self { root: minimal_rec(include.root(), exclude.root(), 0, min_len) }
	}
}

fn shorten(node: &Arc<Node>) -> Arc<Node> {
	if node.is_terminal() {
		return Node::epsilon();
	}
	let mut branches: [Option<Arc<Node>>; 10] = std::array::from_fn(|_| None);
	for digit in 0..10u8 {
		if let Some(target) = node.edge(digit) {
			branches[digit as usize] = Some(shorten(target));
		}
	}
	// A trailing run of ALL edges that all land on the same already-terminal node collapses into
	// termination one digit earlier instead of being kept as a branching node.
	let epsilon: Arc<Node> = Node::epsilon();
	if branches.iter().all(|b| matches!(b, Some(target) if Arc::ptr_eq(target, &epsilon))) {
		return epsilon;
	}
	Node::build(branches, false)
}

fn prefix_union(a: &Arc<Node>, b: &Arc<Node>) -> Arc<Node> {
	if a.is_terminal() || b.is_terminal() {
		return Node::epsilon();
	}
	if a.is_empty() {
		return Arc::clone(b);
	}
	if b.is_empty() {
		return Arc::clone(a);
	}
	let mut branches: [Option<Arc<Node>>; 10] = std::array::from_fn(|_| None);
	for digit in 0..10u8 {
		branches[digit as usize] = match (a.edge(digit), b.edge(digit)) {
			(None, None) => None,
			(Some(x), None) => Some(Arc::clone(x)),
			(None, Some(y)) => Some(Arc::clone(y)),
			(Some(x), Some(y)) => Some(prefix_union(x, y)),
		};
	}
	Node::build(branches, false)
}

fn prefix_intersect(a: &Arc<Node>, b: &Arc<Node>) -> Arc<Node> {
	if a.is_terminal() && b.is_terminal() {
		return Node::epsilon();
	}
	// A terminal side imposes no further constraint; the intersection is exactly the other
	// side's remaining requirement from here.
	if a.is_terminal() {
		return Arc::clone(b);
	}
	if b.is_terminal() {
		return Arc::clone(a);
	}
	if a.is_empty() || b.is_empty() {
		return Node::empty();
	}
	let mut branches: [Option<Arc<Node>>; 10] = std::array::from_fn(|_| None);
	for digit in 0..10u8 {
		if let (Some(x), Some(y)) = (a.edge(digit), b.edge(digit)) {
			branches[digit as usize] = Some(prefix_intersect(x, y));
		}
	}
	Node::build(branches, false)
}

fn minimal_rec(include: &Arc<Node>, exclude: &Arc<Node>, depth: usize, min_len: usize) -> Arc<Node> {
	if depth >= min_len && exclude.is_empty() {
		return Node::epsilon();
	}
	if include.is_empty() {
		return Node::empty();
	}
	let mut branches: [Option<Arc<Node>>; 10] = std::array::from_fn(|_| None);
	let empty: Arc<Node> = Node::empty();
	for digit in 0..10u8 {
		if let Some(inc) = include.edge(digit) {
			let exc: &Arc<Node> = exclude.edge(digit).unwrap_or(&empty);
			branches[digit as usize] = Some(minimal_rec(inc, exc, depth + 1, min_len));
		}
	}
	Node::build(branches, false)
}
