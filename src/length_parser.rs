//! Parses a length set like `"4,7-9,11"` into a strictly ascending, deduplicated list of
//! lengths -- the textual form used wherever a caller needs to constrain output to a subset of
//! [`crate::digit_sequence`] lengths rather than accept every length a tree happens to contain.

use std::fmt;

use nom::Err as NomErr;
use nom::IResult;
use nom::Parser;
use nom::character::complete::char as nom_char;
use nom::character::complete::digit1;
use nom::combinator::cut;
use nom::error::ErrorKind as NomErrorKind;
use nom::error::ParseError;
use nom::multi::separated_list1;

use crate::digit_sequence::MAX_LENGTH;

#[derive(Debug, Clone, PartialEq)]
pub struct LengthSetError {
	pub remaining: String,
	pub kind: LengthSetErrorKind,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum LengthSetErrorKind {
	Empty,
	InvalidRange { lo: usize, hi: usize },
	NonAscending,
	OutOfRange { length: usize },
	TrailingInput,
	Nom(NomErrorKind),
}

impl fmt::Display for LengthSetError {
	fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self.kind {
			LengthSetErrorKind::Empty => write!(fmt, "empty length set"),
			LengthSetErrorKind::InvalidRange { lo, hi } => write!(fmt, "invalid range {lo}-{hi}: lo > hi"),
			LengthSetErrorKind::NonAscending => write!(fmt, "lengths must be strictly ascending and non-overlapping"),
			LengthSetErrorKind::OutOfRange { length } => write!(fmt, "length {length} exceeds maximum {MAX_LENGTH}"),
			LengthSetErrorKind::TrailingInput => write!(fmt, "unexpected trailing input {:?}", self.remaining),
			LengthSetErrorKind::Nom(kind) => write!(fmt, "parse error ({kind:?}) near {:?}", self.remaining),
		}
	}
}

impl std::error::Error for LengthSetError {}

#[derive(Debug)]
struct InnerParseError<'a> {
	input: &'a str,
	kind: LengthSetErrorKind,
}

impl<'a> ParseError<&'a str> for InnerParseError<'a> {
	fn from_error_kind(input: &'a str, kind: NomErrorKind) -> Self {
		Self { input, kind: LengthSetErrorKind::Nom(kind) }
	}

	fn append(_input: &'a str, _kind: NomErrorKind, other: Self) -> Self {
		other
	}
}

type ParseResult<'a, T> = IResult<&'a str, T, InnerParseError<'a>>;

fn fail<'a, T>(input: &'a str, kind: LengthSetErrorKind) -> ParseResult<'a, T> {
	Err(NomErr::Failure(InnerParseError { input, kind }))
}

/// Parses the grammar `<item> (',' <item>)*` where `<item>` is `<number>` or `<number>-<number>`.
pub fn parse(input: &str) -> Result<Vec<usize>, LengthSetError> {
	if input.is_empty() {
		return Err(LengthSetError { remaining: String::new(), kind: LengthSetErrorKind::Empty });
	}

	let result: ParseResult<'_, Vec<(usize, usize, bool)>> = separated_list1(nom_char(','), parse_item).parse(input);
	let (remaining, items): (&str, Vec<(usize, usize, bool)>) = match result {
		Ok(ok) => ok,
		Err(NomErr::Failure(e) | NomErr::Error(e)) => {
			return Err(LengthSetError { remaining: e.input.to_string(), kind: e.kind });
		}
		Err(NomErr::Incomplete(_)) => unreachable!("complete parsers never return Incomplete"),
	};
	if !remaining.is_empty() {
		return Err(LengthSetError { remaining: remaining.to_string(), kind: LengthSetErrorKind::TrailingInput });
	}

	let mut lengths: Vec<usize> = Vec::new();
	let mut previous_end: Option<usize> = None;
	for (lo, hi, is_explicit_range) in items {
		if lo > hi || (lo == hi && is_explicit_range) {
			return Err(LengthSetError { remaining: input.to_string(), kind: LengthSetErrorKind::InvalidRange { lo, hi } });
		}
		if hi > MAX_LENGTH {
			return Err(LengthSetError { remaining: input.to_string(), kind: LengthSetErrorKind::OutOfRange { length: hi } });
		}
		if let Some(end) = previous_end {
			if lo <= end {
				return Err(LengthSetError { remaining: input.to_string(), kind: LengthSetErrorKind::NonAscending });
			}
		}
		previous_end = Some(hi);
		lengths.extend(lo..=hi);
	}
	Ok(lengths)
}

fn parse_item(input: &str) -> ParseResult<'_, (usize, usize, bool)> {
	let (rest, lo): (&str, usize) = parse_number(input)?;
	if let Some(rest) = rest.strip_prefix('-') {
		let (rest, hi): (&str, usize) = cut(parse_number).parse(rest)?;
		Ok((rest, (lo, hi, true)))
	} else {
		Ok((rest, (lo, lo, false)))
	}
}

fn parse_number(input: &str) -> ParseResult<'_, usize> {
	let (rest, digits): (&str, &str) = digit1::<_, InnerParseError<'_>>(input)?;
	match digits.parse::<usize>() {
		Ok(n) => Ok((rest, n)),
		Err(_) => fail(input, LengthSetErrorKind::OutOfRange { length: usize::MAX }),
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn parses_mixed_singles_and_ranges() {
		assert_eq!(parse("4,7-9,11").unwrap(), vec![4, 7, 8, 9, 11]);
	}

	#[test]
	fn rejects_empty_input() {
		assert_eq!(parse("").unwrap_err().kind, LengthSetErrorKind::Empty);
	}

	#[test]
	fn rejects_non_ascending_input() {
		assert_eq!(parse("5,3").unwrap_err().kind, LengthSetErrorKind::NonAscending);
	}

	#[test]
	fn rejects_overlapping_ranges() {
		assert_eq!(parse("1-5,4-6").unwrap_err().kind, LengthSetErrorKind::NonAscending);
	}

	#[test]
	fn rejects_backwards_range() {
		assert_eq!(parse("9-3").unwrap_err().kind, LengthSetErrorKind::InvalidRange { lo: 9, hi: 3 });
	}

	#[test]
	fn rejects_degenerate_explicit_range() {
		assert_eq!(parse("3-3").unwrap_err().kind, LengthSetErrorKind::InvalidRange { lo: 3, hi: 3 });
	}

	#[test]
	fn accepts_a_bare_number_equal_to_itself() {
		assert_eq!(parse("3").unwrap(), vec![3]);
	}

	#[test]
	fn rejects_length_past_maximum() {
		assert_eq!(parse("25").unwrap_err().kind, LengthSetErrorKind::OutOfRange { length: 25 });
	}

	#[test]
	fn rejects_trailing_garbage() {
		assert_eq!(parse("1,2x").unwrap_err().kind, LengthSetErrorKind::TrailingInput);
	}
}
