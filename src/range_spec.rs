//! A single disjoint, equal-length set of digit sequences: one bit-mask per position.

use std::fmt;

use nom::Err as NomErr;
use nom::IResult;
use nom::Parser;
use nom::branch::alt;
use nom::character::complete::char as nom_char;
use nom::character::complete::one_of;
use nom::combinator::cut;
use nom::combinator::map;
use nom::error::ErrorKind as NomErrorKind;
use nom::error::ParseError;
use nom::multi::many1;
use nom::sequence::delimited;

use crate::digit_sequence::DigitSequence;
use crate::digit_sequence::MAX_LENGTH;

/// A 10-bit mask: bit *d* set means digit *d* is accepted at this position.
pub type DigitMask = u16;

pub const ALL: DigitMask = 0b0000_0011_1111_1111;

fn mask_of_digit(d: u8) -> DigitMask {
	1 << d
}

fn popcount(mask: DigitMask) -> u32 {
	mask.count_ones()
}

/// Maximal ascending runs of set bits, e.g. `{1,2,3,5,7,8}` -> `[(1,3), (5,5), (7,8)]`.
fn contiguous_runs(mask: DigitMask) -> Vec<(u8, u8)> {
	let mut runs: Vec<(u8, u8)> = Vec::new();
	let mut start: Option<u8> = None;
	for d in 0..10u8 {
		if mask & mask_of_digit(d) != 0 {
			start.get_or_insert(d);
		} else if let Some(s) = start.take() {
			runs.push((s, d - 1));
		}
	}
	if let Some(s) = start {
		runs.push((s, 9));
	}
	runs
}

/// An ordered sequence of bit-masks, one per digit position.
///
/// Invariants: `length() <= 19`, no mask is `0`.
#[derive(Clone, Eq, PartialEq, Hash)]
pub struct RangeSpecification {
	masks: Vec<DigitMask>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RangeSpecError {
	pub remaining: String,
	pub kind: RangeSpecErrorKind,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum RangeSpecErrorKind {
	Empty,
	MisplacedUnderscore,
	NonDigitCharacter(char),
	UnclosedBracket,
	EmptyBracket,
	InvalidRange { lo: u8, hi: u8 },
	NonAscendingRange,
	TooLong { length: usize },
	TrailingInput,
	Nom(NomErrorKind),
}

impl fmt::Display for RangeSpecError {
	fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self.kind {
			RangeSpecErrorKind::Empty => write!(fmt, "empty range specification"),
			RangeSpecErrorKind::MisplacedUnderscore => write!(fmt, "misplaced '_' grouping separator"),
			RangeSpecErrorKind::NonDigitCharacter(ch) => write!(fmt, "expected a digit, 'x', or '[', found {ch:?}"),
			RangeSpecErrorKind::UnclosedBracket => write!(fmt, "unclosed '[' near {:?}", self.remaining),
			RangeSpecErrorKind::EmptyBracket => write!(fmt, "empty '[]' group"),
			RangeSpecErrorKind::InvalidRange { lo, hi } => write!(fmt, "invalid range {lo}-{hi}: lo > hi"),
			RangeSpecErrorKind::NonAscendingRange => write!(fmt, "digit ranges inside '[...]' must be strictly ascending"),
			RangeSpecErrorKind::TooLong { length } => write!(fmt, "length {length} exceeds maximum {MAX_LENGTH}"),
			RangeSpecErrorKind::TrailingInput => write!(fmt, "unexpected trailing input {:?}", self.remaining),
			RangeSpecErrorKind::Nom(kind) => write!(fmt, "parse error ({kind:?}) near {:?}", self.remaining),
		}
	}
}

impl std::error::Error for RangeSpecError {}

#[derive(Debug)]
struct InnerParseError<'a> {
	input: &'a str,
	kind: RangeSpecErrorKind,
}

impl<'a> ParseError<&'a str> for InnerParseError<'a> {
	fn from_error_kind(input: &'a str, kind: NomErrorKind) -> Self {
		Self { input, kind: RangeSpecErrorKind::Nom(kind) }
	}

	fn append(_input: &'a str, _kind: NomErrorKind, other: Self) -> Self {
		other
	}
}

type ParseResult<'a, T> = IResult<&'a str, T, InnerParseError<'a>>;

fn fail<'a, T>(input: &'a str, kind: RangeSpecErrorKind) -> ParseResult<'a, T> {
	Err(NomErr::Failure(InnerParseError { input, kind }))
}

impl RangeSpecification {
	/// Parses the grammar `[digit | 'x' | '[' <ordered digits or dash ranges> ']' | '_']*`.
	///
	/// `'_'` is accepted only strictly between two other tokens (grouping only).
	pub fn parse(input: &str) -> Result<Self, RangeSpecError> {
		if input.is_empty() {
			return Err(RangeSpecError { remaining: String::new(), kind: RangeSpecErrorKind::Empty });
		}
		if input.starts_with('_') || input.ends_with('_') || input.contains("__") {
			return Err(RangeSpecError { remaining: input.to_owned(), kind: RangeSpecErrorKind::MisplacedUnderscore });
		}
		let joined: String = input.replace('_', "");

		match many1(parse_token).parse(joined.as_str()) {
			Ok((remaining, masks)) => {
				if !remaining.is_empty() {
					return Err(RangeSpecError { remaining: remaining.to_owned(), kind: RangeSpecErrorKind::TrailingInput });
				}
				if masks.len() > MAX_LENGTH {
					return Err(RangeSpecError { remaining: String::new(), kind: RangeSpecErrorKind::TooLong { length: masks.len() } });
				}
				Ok(Self { masks })
			},
			Err(NomErr::Incomplete(_)) => unreachable!("complete parsers never return Incomplete"),
			Err(NomErr::Error(e) | NomErr::Failure(e)) => Err(RangeSpecError { remaining: e.input.to_owned(), kind: e.kind }),
		}
	}

	/// Constructs a specification from an already-built mask list.
	///
	/// Panics if `masks` is empty, too long, or contains a zero mask (invariant violation).
	pub fn from_masks(masks: Vec<DigitMask>) -> Self {
		assert!(masks.len() <= MAX_LENGTH, "range specification length {} exceeds {MAX_LENGTH}", masks.len());
		assert!(masks.iter().all(|&m| m != 0), "range specification masks must be non-zero");
		Self { masks }
	}

	pub fn masks(&self) -> &[DigitMask] {
		&self.masks
	}

	pub fn length(&self) -> usize {
		self.masks.len()
	}

	pub fn min(&self) -> DigitSequence {
		let mut value: u64 = 0;
		for &mask in self.masks.iter() {
			value = value * 10 + u64::from(mask.trailing_zeros());
		}
		digit_sequence_from_raw(self.length(), value)
	}

	pub fn max(&self) -> DigitSequence {
		let mut value: u64 = 0;
		for &mask in self.masks.iter() {
			let highest: u32 = 15 - mask.leading_zeros();
			value = value * 10 + u64::from(highest);
		}
		digit_sequence_from_raw(self.length(), value)
	}

	pub fn sequence_count(&self) -> u64 {
		self.masks.iter().map(|&m| u64::from(popcount(m))).product()
	}

	pub fn matches(&self, seq: &DigitSequence) -> bool {
		if seq.length() != self.length() {
			return false;
		}
		self.masks.iter().enumerate().all(|(i, &mask)| mask & mask_of_digit(seq.get_digit(i)) != 0)
	}

	/// Appends one more position with the given mask.
	pub fn extend_by_mask(&self, mask: DigitMask) -> Self {
		assert_ne!(mask, 0);
		let mut masks: Vec<DigitMask> = self.masks.clone();
		masks.push(mask);
		Self { masks }
	}

	/// Appends `n` more positions, each accepting the full digit set.
	pub fn extend_by_length(&self, n: usize) -> Self {
		let mut masks: Vec<DigitMask> = self.masks.clone();
		masks.extend(std::iter::repeat(ALL).take(n));
		Self { masks }
	}

	pub fn first(&self, n: usize) -> Self {
		assert!(n <= self.length());
		Self { masks: self.masks[..n].to_vec() }
	}

	pub fn last(&self, n: usize) -> Self {
		assert!(n <= self.length());
		Self { masks: self.masks[self.length() - n..].to_vec() }
	}

	/// Strips a trailing run of `ALL` masks, returning the remaining prefix.
	///
	/// Returns `None` if every position is `ALL` (the prefix would be empty, i.e. "match
	/// anything of this length"); callers that want an empty prefix in that case should treat
	/// `None` as the zero-length specification.
	pub fn get_prefix(&self) -> Option<Self> {
		let mut end: usize = self.masks.len();
		while end > 0 && self.masks[end - 1] == ALL {
			end -= 1;
		}
		if end == 0 {
			None
		} else {
			Some(Self { masks: self.masks[..end].to_vec() })
		}
	}

	/// Decomposes the matched set into maximal disjoint contiguous [`DigitSequence`] ranges.
	///
	/// Not claimed to be the *minimal* number of ranges for arbitrary masks (only the
	/// canonical "prefix + [lo-hi] + trailing ALL" shape produced by [`crate::range_spec`]'s
	/// own decomposition is guaranteed to yield exactly one range); it is always correct and
	/// disjoint.
	pub fn as_ranges(&self) -> Vec<(DigitSequence, DigitSequence)> {
		let mut out: Vec<(DigitSequence, DigitSequence)> = Vec::new();
		self.as_ranges_rec(0, 0, &mut out);
		out
	}

	fn as_ranges_rec(&self, index: usize, prefix_value: u64, out: &mut Vec<(DigitSequence, DigitSequence)>) {
		if index == self.masks.len() {
			let seq: DigitSequence = digit_sequence_from_raw(self.length(), prefix_value);
			out.push((seq, seq));
			return;
		}
		let suffix_all: bool = self.masks[index + 1..].iter().all(|&m| m == ALL);
		if suffix_all {
			for (lo, hi) in contiguous_runs(self.masks[index]) {
				let digits_after: usize = self.masks.len() - index - 1;
				let lo_val: u64 = prefix_value * 10 + u64::from(lo);
				let hi_val: u64 = prefix_value * 10 + u64::from(hi);
				let lo_seq: DigitSequence = digit_sequence_from_raw(
					self.length(),
					lo_val * 10u64.pow(digits_after as u32),
				);
				let suffix_max: u64 = 10u64.pow(digits_after as u32) - 1;
				let hi_seq: DigitSequence = digit_sequence_from_raw(
					self.length(),
					hi_val * 10u64.pow(digits_after as u32) + suffix_max,
				);
				out.push((lo_seq, hi_seq));
			}
			return;
		}
		for d in 0..10u8 {
			if self.masks[index] & mask_of_digit(d) != 0 {
				self.as_ranges_rec(index + 1, prefix_value * 10 + u64::from(d), out);
			}
		}
	}
}

fn digit_sequence_from_raw(length: usize, value: u64) -> DigitSequence {
	let s: String = format!("{value:0width$}", width = length);
	DigitSequence::from_str(&s).expect("constructed digit string is always valid")
}

fn parse_token(input: &str) -> ParseResult<'_, DigitMask> {
	alt((parse_all, parse_bracket, parse_single_digit)).parse(input)
}

fn parse_all(input: &str) -> ParseResult<'_, DigitMask> {
	map(nom_char('x'), |_| ALL).parse(input)
}

fn parse_single_digit(input: &str) -> ParseResult<'_, DigitMask> {
	match one_of::<_, _, InnerParseError<'_>>("0123456789").parse(input) {
		Ok((remaining, ch)) => Ok((remaining, mask_of_digit(ch.to_digit(10).unwrap() as u8))),
		Err(_) => {
			let ch: char = input.chars().next().unwrap_or('\0');
			fail(input, RangeSpecErrorKind::NonDigitCharacter(ch))
		},
	}
}

fn parse_bracket(input: &str) -> ParseResult<'_, DigitMask> {
	let Some(rest) = input.strip_prefix('[') else {
		return fail(input, RangeSpecErrorKind::NonDigitCharacter(input.chars().next().unwrap_or('\0')));
	};
	let (rest, items): (&str, Vec<(u8, u8)>) = cut(many1(parse_bracket_item)).parse(rest)?;
	let Some(rest) = rest.strip_prefix(']') else {
		return fail(rest, RangeSpecErrorKind::UnclosedBracket);
	};

	let mut mask: DigitMask = 0;
	let mut previous_end: i16 = -1;
	for (lo, hi) in items {
		if lo > hi {
			return fail(input, RangeSpecErrorKind::InvalidRange { lo, hi });
		}
		if i16::from(lo) <= previous_end {
			return fail(input, RangeSpecErrorKind::NonAscendingRange);
		}
		previous_end = i16::from(hi);
		for d in lo..=hi {
			mask |= mask_of_digit(d);
		}
	}
	if mask == 0 {
		return fail(input, RangeSpecErrorKind::EmptyBracket);
	}
	Ok((rest, mask))
}

fn parse_bracket_item(input: &str) -> ParseResult<'_, (u8, u8)> {
	let (input, lo): (&str, char) = one_of("0123456789").parse(input)?;
	let lo: u8 = lo.to_digit(10).unwrap() as u8;
	if let Some(rest) = input.strip_prefix('-') {
		let (rest, hi): (&str, char) = cut(one_of("0123456789")).parse(rest)?;
		let hi: u8 = hi.to_digit(10).unwrap() as u8;
		Ok((rest, (lo, hi)))
	} else {
		Ok((input, (lo, lo)))
	}
}

impl fmt::Display for RangeSpecification {
	fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
		for &mask in self.masks.iter() {
			if mask == ALL {
				fmt.write_str("x")?;
				continue;
			}
			if popcount(mask) == 1 {
				write!(fmt, "{}", mask.trailing_zeros())?;
				continue;
			}
			fmt.write_str("[")?;
			for (lo, hi) in contiguous_runs(mask) {
				if lo == hi {
					write!(fmt, "{lo}")?;
				} else {
					write!(fmt, "{lo}-{hi}")?;
				}
			}
			fmt.write_str("]")?;
		}
		Ok(())
	}
}

impl fmt::Debug for RangeSpecification {
	fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(fmt, "RangeSpecification({self})")
	}
}

/// Ordering is prefix-lexicographic over masks; at the first differing position the
/// tie-break is the lower of the two masks' lowest set bit.
impl Ord for RangeSpecification {
	fn cmp(&self, other: &Self) -> std::cmp::Ordering {
		self.length().cmp(&other.length()).then_with(|| {
			for (&a, &b) in self.masks.iter().zip(other.masks.iter()) {
				if a != b {
					return a.trailing_zeros().cmp(&b.trailing_zeros());
				}
			}
			std::cmp::Ordering::Equal
		})
	}
}

impl PartialOrd for RangeSpecification {
	fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
		Some(self.cmp(other))
	}
}

/// Canonical block decomposition (see `SPEC_FULL.md` section 4, component A): decomposes a
/// non-empty contiguous range of equal-length [`DigitSequence`]s into a minimal ordered list
/// of [`RangeSpecification`]s whose union is exactly the range.
///
/// Recursive realisation of the three stages in spec.md section 4.1. At the first digit
/// position where `start` and `end` disagree: the part of `start`'s block not yet fully
/// covered (its suffix isn't all-zero) is peeled off first -- stage A, "head". What remains
/// fully covered in the middle becomes one `[lo-hi]` block with an `ALL` trailing run -- stage
/// C. The part of `end`'s block not yet fully covered (its suffix isn't all-nine) is peeled
/// off last -- stage B, "tail" -- which lands after the middle in insertion order, matching
/// spec.md's description. The result is re-sorted by `min()` regardless, per the ordering
/// contract.
pub fn decompose_contiguous_range(start: DigitSequence, end: DigitSequence) -> Vec<RangeSpecification> {
	assert_eq!(start.length(), end.length());
	assert!(start <= end);

	let mut specs: Vec<RangeSpecification> = decompose_same_length(start, end);
	specs.sort_by_key(|s| s.min());
	specs
}

fn decompose_same_length(lo: DigitSequence, hi: DigitSequence) -> Vec<RangeSpecification> {
	let length: usize = lo.length();
	if length == 0 {
		return vec![RangeSpecification::from_masks(vec![])];
	}
	if lo == hi {
		let masks: Vec<DigitMask> = (0..length).map(|i| mask_of_digit(lo.get_digit(i))).collect();
		return vec![RangeSpecification::from_masks(masks)];
	}

	let lo_digit: u8 = lo.get_digit(0);
	let hi_digit: u8 = hi.get_digit(0);

	if lo_digit == hi_digit {
		return decompose_same_length(lo.last(length - 1), hi.last(length - 1))
			.into_iter()
			.map(|s| prepend_digit(lo_digit, s))
			.collect();
	}

	let lo_suffix: DigitSequence = lo.last(length - 1);
	let hi_suffix: DigitSequence = hi.last(length - 1);
	let lo_suffix_is_zero: bool = lo_suffix.value() == 0;
	let hi_suffix_is_max: bool = hi_suffix == hi_suffix.max_of_length();

	let mut out: Vec<RangeSpecification> = Vec::new();
	let mut range_lo: u8 = lo_digit;
	let mut range_hi: u8 = hi_digit;

	if !lo_suffix_is_zero {
		let nines: DigitSequence = lo_suffix.max_of_length();
		out.extend(decompose_same_length(lo_suffix, nines).into_iter().map(|s| prepend_digit(lo_digit, s)));
		range_lo = lo_digit + 1;
	}
	if !hi_suffix_is_max {
		range_hi = hi_digit - 1;
	}
	if range_lo <= range_hi {
		let mut masks: Vec<DigitMask> = vec![digit_range_mask(range_lo, range_hi)];
		masks.extend(std::iter::repeat(ALL).take(length - 1));
		out.push(RangeSpecification::from_masks(masks));
	}
	if !hi_suffix_is_max {
		let zeros: DigitSequence = hi_suffix.min_of_length();
		out.extend(decompose_same_length(zeros, hi_suffix).into_iter().map(|s| prepend_digit(hi_digit, s)));
	}

	out
}

fn prepend_digit(digit: u8, spec: RangeSpecification) -> RangeSpecification {
	let mut masks: Vec<DigitMask> = vec![mask_of_digit(digit)];
	masks.extend_from_slice(spec.masks());
	RangeSpecification::from_masks(masks)
}

fn digit_range_mask(lo: u8, hi: u8) -> DigitMask {
	let mut mask: DigitMask = 0;
	for d in lo..=hi {
		mask |= mask_of_digit(d);
	}
	mask
}

/// Splits a range that may span multiple lengths at each `999...9 -> 100...0` boundary, then
/// decomposes each same-length piece.
pub fn decompose_range(start: DigitSequence, end: DigitSequence) -> Vec<RangeSpecification> {
	assert!(start <= end);

	if start.length() == end.length() {
		return decompose_contiguous_range(start, end);
	}

	let mut out: Vec<RangeSpecification> = decompose_contiguous_range(start, start.max_of_length());
	for length in (start.length() + 1)..end.length() {
		let lo: DigitSequence = DigitSequence::of_length_with_digit(length, 0);
		out.extend(decompose_contiguous_range(lo, lo.max_of_length()));
	}
	out.extend(decompose_contiguous_range(end.min_of_length(), end));
	out
}

#[cfg(test)]
mod test {
	use proptest::prop_assert_eq;
	use proptest::proptest;

	use super::*;

	#[test]
	fn parse_displays_round_trip() {
		for pattern in ["x", "1", "[1-3]", "[1-35]", "12x", "1_2_x"] {
			let spec: RangeSpecification = RangeSpecification::parse(pattern).unwrap();
			let printed: String = spec.to_string();
			let reparsed: RangeSpecification = RangeSpecification::parse(&printed).unwrap();
			assert_eq!(spec, reparsed);
		}
	}

	#[test]
	fn rejects_malformed_input() {
		assert!(RangeSpecification::parse("").is_err());
		assert!(RangeSpecification::parse("_1").is_err());
		assert!(RangeSpecification::parse("1_").is_err());
		assert!(RangeSpecification::parse("1__2").is_err());
		assert!(RangeSpecification::parse("[3-1]").is_err());
		assert!(RangeSpecification::parse("[1-35-3]").is_err());
		assert!(RangeSpecification::parse("[1").is_err());
		assert!(RangeSpecification::parse("a").is_err());
	}

	#[test]
	fn min_max_and_sequence_count() {
		let spec: RangeSpecification = RangeSpecification::parse("[3-5]x").unwrap();
		assert_eq!(spec.min(), DigitSequence::from_str("30").unwrap());
		assert_eq!(spec.max(), DigitSequence::from_str("59").unwrap());
		assert_eq!(spec.sequence_count(), 30);
	}

	#[test]
	fn matches_checks_every_position() {
		let spec: RangeSpecification = RangeSpecification::parse("[1-3]x").unwrap();
		assert!(spec.matches(&DigitSequence::from_str("25").unwrap()));
		assert!(!spec.matches(&DigitSequence::from_str("95").unwrap()));
		assert!(!spec.matches(&DigitSequence::from_str("2").unwrap()));
	}

	#[test]
	fn get_prefix_strips_trailing_all() {
		let spec: RangeSpecification = RangeSpecification::parse("12xx").unwrap();
		assert_eq!(spec.get_prefix().unwrap().to_string(), "12");
		let all_spec: RangeSpecification = RangeSpecification::parse("xx").unwrap();
		assert_eq!(all_spec.get_prefix(), None);
	}

	// S1 from spec.md: decomposition of [7, 12] (digit sequences of differing length handled
	// by the caller splitting at length boundaries; here each call is single-length).
	#[test]
	fn s1_decomposition_across_a_single_length_block() {
		let specs: Vec<RangeSpecification> =
			decompose_contiguous_range(DigitSequence::from_str("7").unwrap(), DigitSequence::from_str("9").unwrap());
		assert_eq!(specs.iter().map(|s| s.to_string()).collect::<Vec<_>>(), vec!["[7-9]"]);

		let specs: Vec<RangeSpecification> =
			decompose_contiguous_range(DigitSequence::from_str("10").unwrap(), DigitSequence::from_str("12").unwrap());
		assert_eq!(specs.iter().map(|s| s.to_string()).collect::<Vec<_>>(), vec!["1[0-2]"]);
	}

	#[test]
	fn decomposition_union_matches_input_range() {
		let start: DigitSequence = DigitSequence::from_str("123").unwrap();
		let end: DigitSequence = DigitSequence::from_str("456").unwrap();
		let specs: Vec<RangeSpecification> = decompose_contiguous_range(start, end);

		let mut covered: Vec<u64> = Vec::new();
		for spec in specs.iter() {
			for (lo, hi) in spec.as_ranges() {
				for v in lo.value()..=hi.value() {
					covered.push(v);
				}
			}
		}
		covered.sort_unstable();
		let expected: Vec<u64> = (start.value()..=end.value()).collect();
		assert_eq!(covered, expected);
	}

	#[test]
	fn decomposition_list_is_sorted_by_min() {
		let start: DigitSequence = DigitSequence::from_str("123").unwrap();
		let end: DigitSequence = DigitSequence::from_str("987").unwrap();
		let specs: Vec<RangeSpecification> = decompose_contiguous_range(start, end);
		let mins: Vec<DigitSequence> = specs.iter().map(|s| s.min()).collect();
		let mut sorted: Vec<DigitSequence> = mins.clone();
		sorted.sort();
		assert_eq!(mins, sorted);
	}

	#[test]
	fn as_ranges_splits_non_contiguous_masks() {
		let spec: RangeSpecification = RangeSpecification::parse("[13]x").unwrap();
		let ranges: Vec<(DigitSequence, DigitSequence)> = spec.as_ranges();
		assert_eq!(ranges.len(), 2);
		assert_eq!(ranges[0], (DigitSequence::from_str("10").unwrap(), DigitSequence::from_str("19").unwrap()));
		assert_eq!(ranges[1], (DigitSequence::from_str("30").unwrap(), DigitSequence::from_str("39").unwrap()));
	}

	proptest! {
		// spec.md section 8, invariant 1 (partial) and the S1 scenario, generalized: any
		// contiguous same-length range decomposes into specs that union back to exactly the
		// input and are sorted by `min()`.
		#[test]
		fn decomposition_covers_exactly_the_input_range_and_stays_sorted(
			length in 1usize..=4,
			a in 0u64..10000,
			b in 0u64..10000,
		) {
			let max_value: u64 = 10u64.pow(length as u32) - 1;
			let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
			let (lo, hi) = (lo % (max_value + 1), hi % (max_value + 1));
			let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };

			let start: DigitSequence = digit_sequence_from_raw(length, lo);
			let end: DigitSequence = digit_sequence_from_raw(length, hi);
			let specs: Vec<RangeSpecification> = decompose_contiguous_range(start, end);

			let mut covered: Vec<u64> = Vec::new();
			for spec in specs.iter() {
				for (range_lo, range_hi) in spec.as_ranges() {
					covered.extend(range_lo.value()..=range_hi.value());
				}
			}
			covered.sort_unstable();
			prop_assert_eq!(covered, (lo..=hi).collect::<Vec<_>>());

			let mins: Vec<DigitSequence> = specs.iter().map(RangeSpecification::min).collect();
			let mut sorted_mins: Vec<DigitSequence> = mins.clone();
			sorted_mins.sort();
			prop_assert_eq!(mins, sorted_mins);
		}
	}
}
