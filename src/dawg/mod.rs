/// Builds a [`Dawg`] from words by way of an uncompressed trie.
pub mod builder;
/// The 32-bit packed cell encoding.
pub(crate) mod cell;
/// The packed automaton and membership queries.
pub mod graph;
/// Pattern validation and compilation for subword search.
pub(crate) mod pattern;
/// Letter-bag and pattern constrained subword search.
pub mod search;
/// The packed on-disk form.
pub mod store;
/// Builder-internal trie arena.
pub(crate) mod trie;

pub use builder::DawgBuilder;
pub use graph::Dawg;
pub use search::{extract_words, Subword};
pub use store::DawgError;
