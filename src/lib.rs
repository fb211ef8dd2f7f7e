//! # wordgraph
//!
//! A compact, read-optimized word dictionary backed by a
//! [DAWG](https://en.wikipedia.org/wiki/Deterministic_acyclic_finite_state_automaton)
//! (Directed Acyclic Word Graph).
//!
//! Words go into a [`DawgBuilder`](dawg::DawgBuilder), which grows an
//! uncompressed trie and then fuses equivalent subtrees bottom-up into a
//! minimal graph packed into a flat array of 32-bit cells. The resulting
//! [`Dawg`](dawg::Dawg) is immutable and answers two queries:
//!
//! - **membership** — is a word in the dictionary?
//! - **subword search** — which dictionary words can be built from a bag of
//!   letters (with `?` wildcards), optionally constrained by a pattern with
//!   `$` anchors?
//!
//! ## Quick start
//!
//! ```
//! use wordgraph::dawg::DawgBuilder;
//!
//! let mut builder = DawgBuilder::new();
//! builder.add("SEARCH").add("SEARCHED").add("SEARCHING");
//!
//! let dawg = builder.build();
//! assert!(dawg.contains("search"));
//! assert!(!dawg.contains("searches"));
//! ```
//!
//! ## Subword search
//!
//! ```
//! use wordgraph::dawg::DawgBuilder;
//!
//! let mut builder = DawgBuilder::new();
//! builder.add_words(["CAT", "CATS", "ACT", "AT"]);
//! let dawg = builder.build();
//!
//! // every word spellable from the rack "TACS"
//! let results = dawg.subwords("TACS", None).unwrap();
//! let words = wordgraph::dawg::extract_words(&results);
//! assert!(words.contains("CATS"));
//! assert!(words.contains("AT"));
//!
//! // anchored pattern: only words that are exactly CAT
//! let results = dawg.subwords("CATS", Some("$CAT$")).unwrap();
//! assert_eq!(results.len(), 1);
//! assert_eq!(results[0].word, "CAT");
//! ```
//!
//! A built dawg can be stored to and loaded from any byte stream; see
//! [`Dawg::store`](dawg::Dawg::store) and [`Dawg::load`](dawg::Dawg::load).

#![warn(missing_docs)]

/// DAWG construction, queries, and the packed on-disk form.
pub mod dawg;
