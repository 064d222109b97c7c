//! Splits a [`RangeTree`] whose paths span multiple lengths into an ordered, longest-first list
//! of simpler sub-trees whose union reconstructs the original -- the pre-processing step that
//! keeps downstream regex alternations small instead of emitting one pattern per length.

use std::sync::Arc;

use crate::digit_sequence::MAX_LENGTH;
use crate::range_spec::ALL;
use crate::range_spec::DigitMask;
use crate::range_spec::RangeSpecification;
use crate::range_tree::Node;
use crate::range_tree::RangeTree;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum MergeStrategy {
	/// Only digits whose continuations are the exact same sub-tree are merged into one factor.
	RequireEqualEdges,
	/// Also merges a candidate edge into an existing one whose mask is a strict subset of it,
	/// adding the uncovered digits as new branches -- useful when a shorter factor's branches
	/// differ from a longer factor's only in how many digits they cover at a node.
	AllowEdgeSplitting,
}

pub struct RangeTreeFactorizer {
	strategy: MergeStrategy,
}

impl RangeTreeFactorizer {
	pub fn new(strategy: MergeStrategy) -> Self {
		Self { strategy }
	}

	/// Starts from the naive per-length factors (longest first) and, for each shorter factor in
	/// turn, tries to merge as much of it as possible into each already-settled longer factor,
	/// keeping only the unmergeable remainder as its own (still non-empty) factor.
	#[tracing::instrument(skip(self, tree))]
	pub fn factorize(&self, tree: &RangeTree) -> Vec<RangeTree> {
		let mut factors: Vec<Arc<Node>> = naive_length_factors(tree);

		let mut i: usize = 1;
		while i < factors.len() {
			let mut candidate: Arc<Node> = Arc::clone(&factors[i]);
			for j in 0..i {
				let (merged, remainder): (Arc<Node>, Arc<Node>) = merge_into(&factors[j], &candidate, self.strategy);
				factors[j] = merged;
				candidate = remainder;
				if candidate.is_empty() {
					break;
				}
			}
			if candidate.is_empty() {
				factors.remove(i);
			} else {
				factors[i] = candidate;
				i += 1;
			}
		}

		factors.retain(|f| !f.is_empty());
		factors.sort_by_key(|f| std::cmp::Reverse(max_accepted_length(f)));
		factors.into_iter().map(RangeTree::from_root).collect()
	}
}

/// The naive per-length split: one sub-tree per length present in `tree`, longest first.
fn naive_length_factors(tree: &RangeTree) -> Vec<Arc<Node>> {
	let mut lengths: Vec<usize> = (0..=MAX_LENGTH).filter(|&length| tree.accepted_lengths() & (1 << length) != 0).collect();
	lengths.sort_unstable_by(|a, b| b.cmp(a));

	lengths
		.into_iter()
		.map(|length| {
			let exact: RangeTree = RangeTree::from_specification(&RangeSpecification::from_masks(vec![ALL; length]));
			Arc::clone(tree.intersection(&exact).root())
		})
		.collect()
}

fn max_accepted_length(node: &Arc<Node>) -> usize {
	31 - node.accepted_lengths().leading_zeros() as usize
}

/// Merges as much of `candidate` into `existing` as the strategy allows, returning the new
/// (possibly larger) existing sub-tree and whatever part of `candidate` didn't merge.
///
/// A node in `candidate` that is terminal folds into `existing`'s terminal flag at the
/// corresponding node for free -- the two trees are walked in lockstep by digit position, so
/// reaching `candidate`'s own end while `existing` still has further edges is exactly the
/// "shorter pattern embedded partway through a longer one" case, and accepting there is the
/// only way to fully absorb a shorter candidate.
fn merge_into(existing: &Arc<Node>, candidate: &Arc<Node>, strategy: MergeStrategy) -> (Arc<Node>, Arc<Node>) {
	if candidate.is_empty() {
		return (Arc::clone(existing), Node::empty());
	}

	let mut new_existing_branches: [Option<Arc<Node>>; 10] = std::array::from_fn(|d| existing.edge(d as u8).cloned());
	let mut remainder_branches: [Option<Arc<Node>>; 10] = std::array::from_fn(|_| None);
	let existing_groups: Vec<(DigitMask, Arc<Node>)> = existing.grouped_edges();

	for (candidate_mask, candidate_target) in candidate.grouped_edges() {
		match strategy {
			MergeStrategy::RequireEqualEdges => {
				match existing_groups.iter().find(|(mask, _)| *mask == candidate_mask) {
					Some((_, existing_target)) => {
						let (merged, remainder): (Arc<Node>, Arc<Node>) =
							merge_into(existing_target, &candidate_target, strategy);
						set_digits(&mut new_existing_branches, candidate_mask, &merged);
						if !remainder.is_empty() {
							set_digits(&mut remainder_branches, candidate_mask, &remainder);
						}
					},
					None => set_digits(&mut remainder_branches, candidate_mask, &candidate_target),
				}
			},
			MergeStrategy::AllowEdgeSplitting => {
				let mut covered: DigitMask = 0;
				for (existing_mask, existing_target) in existing_groups.iter() {
					if *existing_mask != 0 && (*existing_mask & candidate_mask) == *existing_mask {
						let (merged, remainder): (Arc<Node>, Arc<Node>) =
							merge_into(existing_target, &candidate_target, strategy);
						set_digits(&mut new_existing_branches, *existing_mask, &merged);
						if !remainder.is_empty() {
							set_digits(&mut remainder_branches, *existing_mask, &remainder);
						}
						covered |= existing_mask;
					}
				}
				for digit in 0..10u8 {
					if candidate_mask & (1 << digit) == 0 || covered & (1 << digit) != 0 {
						continue;
					}
					if existing.edge(digit).is_none() {
						new_existing_branches[digit as usize] = Some(Arc::clone(&candidate_target));
					} else {
						remainder_branches[digit as usize] = Some(Arc::clone(&candidate_target));
					}
				}
			},
		}
	}

	let new_existing: Arc<Node> =
		Node::build(new_existing_branches, existing.is_terminal() || candidate.is_terminal());
	let remainder: Arc<Node> = Node::build(remainder_branches, false);
	(new_existing, remainder)
}

fn set_digits(branches: &mut [Option<Arc<Node>>; 10], mask: DigitMask, target: &Arc<Node>) {
	for digit in 0..10u8 {
		if mask & (1 << digit) != 0 {
			branches[digit as usize] = Some(Arc::clone(target));
		}
	}
}

#[cfg(test)]
mod test {
	use super::*;

	fn tree(pattern: &str) -> RangeTree {
		RangeTree::from_specification(&RangeSpecification::parse(pattern).unwrap())
	}

	#[test]
	fn single_length_tree_is_a_single_factor() {
		let t: RangeTree = tree("[1-3]x");
		let factors: Vec<RangeTree> = RangeTreeFactorizer::new(MergeStrategy::RequireEqualEdges).factorize(&t);
		assert_eq!(factors.len(), 1);
		assert_eq!(factors[0].size(), t.size());
	}

	#[test]
	fn factors_reconstruct_the_whole_tree_and_are_never_empty() {
		let t: RangeTree = tree("1[2-3]").union(&tree("2[4-5]"));
		let factorizer: RangeTreeFactorizer = RangeTreeFactorizer::new(MergeStrategy::RequireEqualEdges);
		let factors: Vec<RangeTree> = factorizer.factorize(&t);
		assert!(factors.iter().all(|f| !f.is_empty()));

		let total: u64 = factors.iter().map(RangeTree::size).sum();
		assert_eq!(total, t.size());
	}

	// S5 from spec.md: {"12[3-5]xx", "12[3-9]x"} (lengths 5 and 4).
	#[test]
	fn require_equal_edges_keeps_differing_lengths_separate() {
		let t: RangeTree = tree("12[3-5]xx").union(&tree("12[3-9]x"));
		let factors: Vec<RangeTree> = RangeTreeFactorizer::new(MergeStrategy::RequireEqualEdges).factorize(&t);
		assert_eq!(factors.len(), 2);
		assert_eq!(factors.iter().map(RangeTree::size).sum::<u64>(), t.size());
		// longest length first.
		assert_eq!(factors[0].size(), tree("12[3-5]xx").size());
		assert_eq!(factors[1].size(), tree("12[3-9]x").size());
	}

	#[test]
	fn allow_edge_splitting_merges_differing_lengths_into_one_factor() {
		let t: RangeTree = tree("12[3-5]xx").union(&tree("12[3-9]x"));
		let factors: Vec<RangeTree> = RangeTreeFactorizer::new(MergeStrategy::AllowEdgeSplitting).factorize(&t);
		assert_eq!(factors.len(), 1);
		assert_eq!(factors[0].size(), t.size());
	}

	#[test]
	fn factors_are_sorted_by_max_length_not_cardinality() {
		// many short sequences (length 1) vs. few long ones (length 3): cardinality favors the
		// short factor, but length must still put the long one first.
		let short: RangeTree = tree("x");
		let long: RangeTree = tree("123");
		let t: RangeTree = short.union(&long);
		assert!(short.size() > long.size());

		let factors: Vec<RangeTree> = RangeTreeFactorizer::new(MergeStrategy::RequireEqualEdges).factorize(&t);
		assert_eq!(factors.len(), 2);
		assert_eq!(factors[0].size(), long.size());
		assert_eq!(factors[1].size(), short.size());
	}
}
