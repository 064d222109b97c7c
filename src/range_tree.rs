//! Minimal, content-addressed, weakly interned deterministic finite automaton (DFA) over the
//! decimal alphabet, and the [`RangeTree`] that wraps it.
//!
//! Every [`Node`] is canonical: two nodes with the same jump table, the same terminal flag and
//! pointer-identical children are always the same `Arc`. This is the classic hash-consing trick
//! for minimal automata — structural equality reduces to child *pointer* equality because
//! children are themselves already canonical.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::OnceLock;
use std::sync::Weak;

use crate::digit_sequence::DigitSequence;
use crate::digit_sequence::MAX_LENGTH;
use crate::range_spec::DigitMask;
use crate::range_spec::RangeSpecification;

/// Jump table nibble value meaning "no outgoing edge for this digit".
pub(crate) const NO_EDGE: u64 = 0xF;

/// A DFA node: a 64-bit jump table (4 bits per digit `0..=9`, value `0..=14` indexes into
/// `edges`, `15` means no edge) plus the at-most-ten distinct children it can jump to.
#[derive(Debug)]
pub struct Node {
	jump_table: u64,
	edges: Vec<Arc<Node>>,
	terminal: bool,
	/// Number of distinct digit sequences accepted from this node onward. Saturates rather
	/// than overflows — callers needing an exact count for enormous ranges should use
	/// `accepted_lengths()` combined with per-length combinatorics instead.
	match_count: u64,
	/// Bitmask over `0..=MAX_LENGTH`: bit `i` set means some accepted sequence rooted here has
	/// exactly `i` digits remaining.
	accepted_lengths: u32,
}

impl Node {
	pub fn is_terminal(&self) -> bool {
		self.terminal
	}

	pub fn match_count(&self) -> u64 {
		self.match_count
	}

	pub fn accepted_lengths(&self) -> u32 {
		self.accepted_lengths
	}

	/// The child reached by consuming `digit`, if any.
	pub fn edge(&self, digit: u8) -> Option<&Arc<Node>> {
		debug_assert!(digit < 10);
		let nibble: u64 = (self.jump_table >> (4 * u64::from(digit))) & 0xF;
		if nibble == NO_EDGE { None } else { Some(&self.edges[nibble as usize]) }
	}

	/// The distinct children, each paired with the mask of digits that reach it.
	pub fn grouped_edges(&self) -> Vec<(DigitMask, Arc<Node>)> {
		let mut groups: Vec<(DigitMask, Arc<Node>)> = Vec::new();
		for digit in 0..10u8 {
			if let Some(target) = self.edge(digit) {
				match groups.iter_mut().find(|(_, t)| Arc::ptr_eq(t, target)) {
					Some(entry) => entry.0 |= 1 << digit,
					None => groups.push((1 << digit, Arc::clone(target))),
				}
			}
		}
		groups
	}

	/// Whether no digit sequence is accepted from this node onward.
	pub fn is_empty(&self) -> bool {
		self.match_count == 0
	}

	/// Builds (and interns) the node whose branch for each digit is `branches[digit]`.
	pub(crate) fn build(branches: [Option<Arc<Node>>; 10], terminal: bool) -> Arc<Node> {
		let mut edges: Vec<Arc<Node>> = Vec::new();
		let mut jump_table: u64 = 0;
		for (digit, branch) in branches.iter().enumerate() {
			let nibble: u64 = match branch {
				None => NO_EDGE,
				Some(target) => match edges.iter().position(|e| Arc::ptr_eq(e, target)) {
					Some(idx) => idx as u64,
					None => {
						edges.push(Arc::clone(target));
						(edges.len() - 1) as u64
					},
				},
			};
			jump_table |= nibble << (4 * digit as u64);
		}
		intern(jump_table, edges, terminal)
	}

	/// The canonical node accepting nothing.
	pub fn empty() -> Arc<Node> {
		Self::build(std::array::from_fn(|_| None), false)
	}

	/// The canonical node accepting only the empty digit sequence.
	pub fn epsilon() -> Arc<Node> {
		Self::build(std::array::from_fn(|_| None), true)
	}
}

/// Wraps an `Arc<Node>` with pointer-based equality and hashing, for maps/sets keyed by
/// automaton-node identity (set operations' input map, factorizer edge comparison, NFA
/// conversion).
#[derive(Clone)]
pub struct Edge(pub Arc<Node>);

impl PartialEq for Edge {
	fn eq(&self, other: &Self) -> bool {
		Arc::ptr_eq(&self.0, &other.0)
	}
}

impl Eq for Edge {}

impl std::hash::Hash for Edge {
	fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
		(Arc::as_ptr(&self.0) as usize).hash(state);
	}
}

impl fmt::Debug for Edge {
	fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(fmt, "Edge({:p})", Arc::as_ptr(&self.0))
	}
}

#[derive(Clone, Eq, PartialEq, Hash)]
struct NodeKey {
	jump_table: u64,
	terminal: bool,
	edge_ptrs: Vec<usize>,
}

fn intern_table() -> &'static Mutex<HashMap<NodeKey, Weak<Node>>> {
	static TABLE: OnceLock<Mutex<HashMap<NodeKey, Weak<Node>>>> = OnceLock::new();
	TABLE.get_or_init(|| Mutex::new(HashMap::new()))
}

/// Content-addressed weak interning: returns the canonical `Arc<Node>` for this content,
/// constructing it only if no live node with the same content already exists.
///
/// Dead entries (nodes whose last strong reference was dropped) are reclaimed here rather
/// than via a background thread — "draining at public API boundaries", since every `Node`
/// construction is itself a public-API boundary (`RangeTree`/`SetOperations`/etc. all bottom
/// out in `Node::build`).
#[tracing::instrument(skip(edges))]
fn intern(jump_table: u64, edges: Vec<Arc<Node>>, terminal: bool) -> Arc<Node> {
	let key: NodeKey =
		NodeKey { jump_table, terminal, edge_ptrs: edges.iter().map(|e| Arc::as_ptr(e) as usize).collect() };

	let mut table = intern_table().lock().expect("interning table poisoned");

	if let Some(weak) = table.get(&key) {
		if let Some(existing) = weak.upgrade() {
			return existing;
		}
	}

	table.retain(|_, weak| weak.strong_count() > 0);

	let (match_count, accepted_lengths) = compute_cached_fields(jump_table, terminal, &edges);
	let node: Arc<Node> = Arc::new(Node { jump_table, edges, terminal, match_count, accepted_lengths });
	table.insert(key, Arc::downgrade(&node));
	debug!("interned node, table size now {}", table.len());
	node
}

/// Folds over the jump table's ten nibbles (not just the deduplicated `edges`, since the same
/// child reached via two digits contributes twice to both fields).
fn compute_cached_fields(jump_table: u64, terminal: bool, edges: &[Arc<Node>]) -> (u64, u32) {
	let mut match_count: u64 = u64::from(terminal);
	let mut accepted_lengths: u32 = if terminal { 1 } else { 0 };
	for digit in 0..10u64 {
		let nibble: u64 = (jump_table >> (4 * digit)) & 0xF;
		if nibble == NO_EDGE {
			continue;
		}
		let target: &Arc<Node> = &edges[nibble as usize];
		match_count = match_count.saturating_add(target.match_count());
		accepted_lengths |= target.accepted_lengths() << 1;
	}
	(match_count, accepted_lengths & ((1u32 << (MAX_LENGTH + 1)) - 1))
}

/// A set of fixed-length digit sequences, represented as a minimal interned DFA.
///
/// A node may be both terminal and branching (a shorter accepted sequence and longer ones
/// sharing its prefix both exist) -- `RangeTree` isn't restricted to a single length; this is
/// exactly what [`crate::converter`] needs an epsilon edge for when turning a tree into an NFA.
#[derive(Clone)]
pub struct RangeTree {
	root: Arc<Node>,
}

impl RangeTree {
	pub fn empty() -> Self {
		Self { root: Node::empty() }
	}

	pub(crate) fn from_root(root: Arc<Node>) -> Self {
		Self { root }
	}

	pub fn root(&self) -> &Arc<Node> {
		&self.root
	}

	pub fn from_specification(spec: &RangeSpecification) -> Self {
		Self { root: build_chain(spec.masks()) }
	}

	pub fn from_specifications(specs: &[RangeSpecification]) -> Self {
		specs.iter().fold(Self::empty(), |acc, spec| acc.union(&Self::from_specification(spec)))
	}

	/// Builds a tree from an arbitrary set of digit sequences of the same length, via
	/// [`crate::range_spec::decompose_range`] over each maximal contiguous run.
	pub fn from_range_set(mut sequences: Vec<DigitSequence>) -> Self {
		sequences.sort_unstable();
		sequences.dedup();
		if sequences.is_empty() {
			return Self::empty();
		}
		let mut specs: Vec<RangeSpecification> = Vec::new();
		let mut run_start: DigitSequence = sequences[0];
		let mut run_end: DigitSequence = sequences[0];
		for &seq in sequences.iter().skip(1) {
			if run_end.next() == Some(seq) {
				run_end = seq;
			} else {
				specs.extend(crate::range_spec::decompose_contiguous_range(run_start, run_end));
				run_start = seq;
				run_end = seq;
			}
		}
		specs.extend(crate::range_spec::decompose_contiguous_range(run_start, run_end));
		Self::from_specifications(&specs)
	}

	/// The inverse of [`Self::from_range_set`]: every accepted sequence, as disjoint contiguous
	/// ranges.
	pub fn as_range_set(&self) -> Vec<(DigitSequence, DigitSequence)> {
		self.as_range_specifications().iter().flat_map(RangeSpecification::as_ranges).collect()
	}

	/// The accepted language as a minimal-ish list of [`RangeSpecification`]s (one per maximal
	/// "prefix + edges + trailing ALL" run discovered by walking the automaton).
	pub fn as_range_specifications(&self) -> Vec<RangeSpecification> {
		let mut out: Vec<RangeSpecification> = Vec::new();
		let mut prefix: Vec<DigitMask> = Vec::new();
		collect_specs(&self.root, &mut prefix, &mut out);
		out
	}

	pub fn contains(&self, seq: &DigitSequence) -> bool {
		let mut node: &Arc<Node> = &self.root;
		for digit in seq.digits() {
			match node.edge(digit) {
				Some(next) => node = next,
				None => return false,
			}
		}
		node.is_terminal()
	}

	pub fn size(&self) -> u64 {
		self.root.match_count()
	}

	pub fn is_empty(&self) -> bool {
		self.root.is_empty()
	}

	/// Bitmask of digit-sequence lengths accepted by this tree.
	pub fn accepted_lengths(&self) -> u32 {
		self.root.accepted_lengths()
	}

	/// The `i`-th accepted sequence in ascending order, `i < size()`.
	pub fn sample(&self, mut i: u64) -> Option<DigitSequence> {
		if i >= self.size() {
			return None;
		}
		let mut node: &Arc<Node> = &self.root;
		let mut digits: Vec<u8> = Vec::new();
		loop {
			if node.is_terminal() {
				if i == 0 {
					return Some(digits_to_sequence(&digits));
				}
				i -= 1;
			}
			let mut advanced: bool = false;
			for digit in 0..10u8 {
				if let Some(next) = node.edge(digit) {
					if i < next.match_count() {
						digits.push(digit);
						node = next;
						advanced = true;
						break;
					}
					i -= next.match_count();
				}
			}
			if !advanced {
				return None;
			}
		}
	}

	pub fn union(&self, other: &Self) -> Self {
		Self { root: crate::set_ops::apply(crate::set_ops::Operation::Union, &self.root, &other.root) }
	}

	pub fn intersection(&self, other: &Self) -> Self {
		Self { root: crate::set_ops::apply(crate::set_ops::Operation::Intersection, &self.root, &other.root) }
	}

	pub fn subtraction(&self, other: &Self) -> Self {
		Self { root: crate::set_ops::apply(crate::set_ops::Operation::Subtraction, &self.root, &other.root) }
	}
}

fn digits_to_sequence(digits: &[u8]) -> DigitSequence {
	let s: String = digits.iter().map(|d| char::from(b'0' + d)).collect();
	DigitSequence::from_str(&s).expect("digit vector is always valid")
}

fn build_chain(masks: &[DigitMask]) -> Arc<Node> {
	if masks.is_empty() {
		return Node::epsilon();
	}
	let rest: Arc<Node> = build_chain(&masks[1..]);
	let mut branches: [Option<Arc<Node>>; 10] = std::array::from_fn(|_| None);
	for digit in 0..10u8 {
		if masks[0] & (1 << digit) != 0 {
			branches[digit as usize] = Some(Arc::clone(&rest));
		}
	}
	Node::build(branches, false)
}

fn collect_specs(node: &Arc<Node>, prefix: &mut Vec<DigitMask>, out: &mut Vec<RangeSpecification>) {
	if node.is_empty() {
		return;
	}
	if node.is_terminal() {
		out.push(RangeSpecification::from_masks(prefix.clone()));
	}
	for (mask, target) in node.grouped_edges() {
		prefix.push(mask);
		collect_specs(&target, prefix, out);
		prefix.pop();
	}
}

#[cfg(test)]
mod test {
	use proptest::prop_assert;
	use proptest::prop_assert_eq;
	use proptest::proptest;

	use super::*;
	use crate::range_spec::RangeSpecification;

	fn tree_from_patterns(patterns: &[&str]) -> RangeTree {
		let specs: Vec<RangeSpecification> = patterns.iter().map(|p| RangeSpecification::parse(p).unwrap()).collect();
		RangeTree::from_specifications(&specs)
	}

	#[test]
	fn empty_and_epsilon_are_distinct_singletons() {
		let empty: Arc<Node> = Node::empty();
		let epsilon: Arc<Node> = Node::epsilon();
		assert!(!Arc::ptr_eq(&empty, &epsilon));
		assert!(!empty.is_terminal());
		assert!(epsilon.is_terminal());
		assert!(empty.is_empty());
		assert!(!epsilon.is_empty());
	}

	#[test]
	fn interning_returns_identical_pointers_for_identical_content() {
		let a: Arc<Node> = Node::empty();
		let b: Arc<Node> = Node::empty();
		assert!(Arc::ptr_eq(&a, &b));
	}

	proptest! {
		// spec.md section 8, invariant 6: union/intersect/subtract identities against self and
		// against the empty tree.
		#[test]
		fn set_algebra_identities_hold(lo in 0u8..9, hi in 0u8..9) {
			let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
			let pattern: String = format!("[{lo}-{hi}]x");
			let a: RangeTree = tree_from_patterns(&[&pattern]);
			let empty: RangeTree = RangeTree::empty();

			prop_assert_eq!(a.union(&a).size(), a.size());
			prop_assert_eq!(a.intersection(&a).size(), a.size());
			prop_assert!(a.subtraction(&a).is_empty());
			prop_assert!(a.intersection(&empty).is_empty());
			prop_assert_eq!(a.union(&empty).size(), a.size());
		}

		// spec.md section 8, invariant 9: `sample(i)` is a bijection onto the accepted sequences,
		// in ascending order.
		#[test]
		fn sample_enumerates_every_accepted_sequence_in_order(lo in 0u8..9, hi in 0u8..9) {
			let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
			let t: RangeTree = tree_from_patterns(&[&format!("[{lo}-{hi}]x")]);

			let mut previous: Option<DigitSequence> = None;
			for i in 0..t.size() {
				let current: DigitSequence = t.sample(i).expect("index within size() must be present");
				prop_assert!(t.contains(&current));
				if let Some(prev) = previous {
					prop_assert!(prev < current);
				}
				previous = Some(current);
			}
			prop_assert!(t.sample(t.size()).is_none());
		}
	}
}
