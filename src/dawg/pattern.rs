//! The pattern grammar for subword search.
//!
//! A pattern is `\$?[A-Z?]*\$?` after uppercase folding: an optional
//! leading `$` start anchor, letters and `?` single-position wildcards,
//! and an optional trailing `$` end anchor. The first ordinary character
//! compiles to an *optional* token — an open prefix, letting any number of
//! letters from the bag precede the first pattern match — while everything
//! after it is required in order.

use mark_last::MarkLastIterator;
use once_cell::sync::Lazy;
use regex::Regex;

static LETTERS_RE: Lazy<Regex> = Lazy::new(|| Regex::new("^[A-Za-z?]+$").unwrap());
static PATTERN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\$?[A-Z?]*\$?$").unwrap());

/// What a single pattern token demands of the walk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum TokenKind {
    /// Must be positioned at the root; produced by a leading `$`.
    Start,
    /// Must terminate here; produced by a trailing `$`.
    End,
    /// Any single letter, which must still come out of the letter bag.
    Wildcard,
    /// A specific letter.
    Letter(u8),
}

/// One compiled pattern element. Only the first token of a pattern can be
/// optional.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct PatternToken {
    pub kind: TokenKind,
    pub required: bool,
}

/// True if `letters` is a usable bag: at least two characters, all of them
/// letters or `?` wildcards.
pub(crate) fn letters_valid(letters: &str) -> bool {
    letters.len() >= 2 && LETTERS_RE.is_match(letters)
}

/// True if `pattern` conforms to the pattern grammar. Expects the pattern
/// to already be folded to uppercase.
pub(crate) fn pattern_valid(pattern: &str) -> bool {
    PATTERN_RE.is_match(pattern)
}

fn token_kind(ch: u8) -> TokenKind {
    if ch == b'?' {
        TokenKind::Wildcard
    } else {
        TokenKind::Letter(ch)
    }
}

/// Compiles a validated pattern into its token sequence.
pub(crate) fn compile(pattern: &str) -> Vec<PatternToken> {
    let mut bytes = pattern.bytes();
    let Some(first) = bytes.next() else {
        return Vec::new();
    };

    let mut tokens = Vec::with_capacity(pattern.len());
    if first == b'$' {
        tokens.push(PatternToken {
            kind: TokenKind::Start,
            required: true,
        });
    } else {
        tokens.push(PatternToken {
            kind: token_kind(first),
            required: false,
        });
    }

    for (last, ch) in bytes.mark_last() {
        let kind = if last && ch == b'$' {
            TokenKind::End
        } else {
            token_kind(ch)
        };
        tokens.push(PatternToken {
            kind,
            required: true,
        });
    }

    tokens
}
