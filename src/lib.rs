//! A digit-sequence range engine: phone-number-style ranges represented as minimal, weakly
//! interned DFAs, composed with set algebra, filtered by prefix, factored for regex size, and
//! flattened into nested composite edge expressions.

#[macro_use(debug)]
extern crate tracing;

pub mod digit_sequence;
pub mod range_spec;

pub mod range_tree;
pub mod set_ops;

pub mod prefix_tree;

pub mod factorizer;

pub mod nfa;
pub mod converter;
pub mod flattener;

pub mod length_parser;

pub use digit_sequence::DigitSequence;
pub use digit_sequence::DigitSequenceError;
pub use range_spec::RangeSpecification;
pub use range_tree::RangeTree;
