//! Subword search: every dictionary word constructible from a bag of
//! letters, optionally constrained by a pattern.
//!
//! The traversal is an explicit LIFO of frames rather than recursion: real
//! dictionaries run to hundreds of thousands of words, and the native
//! stack is not sized for that.

use std::collections::HashSet as StdHashSet;

use hashbrown::HashSet;
use smallvec::SmallVec;

use super::graph::Dawg;
use super::pattern::{self, PatternToken, TokenKind};

const WILDCARD: u8 = b'?';

/// The letters still available to a search frame.
type LetterBag = SmallVec<[u8; 16]>;
/// The word accumulated along the current path.
type WordBuf = SmallVec<[u8; 16]>;
/// Positions at which a `?` wildcard was spent, if any were.
type WildcardBuf = Option<SmallVec<[usize; 4]>>;

/// One dictionary word found by [`Dawg::subwords`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Subword {
    /// The matched word.
    pub word: String,
    /// 0-based positions in `word` that were covered by a `?` from the
    /// letter bag, in the order they were spent; `None` when the word was
    /// spelled without wildcards.
    pub wildcard_positions: Option<Vec<usize>>,
}

/// Projects a result slice to its set of distinct words.
///
/// # Examples
///
/// ```
/// use wordgraph::dawg::{extract_words, DawgBuilder};
///
/// let mut builder = DawgBuilder::new();
/// builder.add_words(["EH", "HE"]);
/// let dawg = builder.build();
///
/// let results = dawg.subwords("EH", None).unwrap();
/// let words = extract_words(&results);
/// assert!(words.contains("EH") && words.contains("HE"));
/// ```
pub fn extract_words(results: &[Subword]) -> StdHashSet<String> {
    results.iter().map(|r| r.word.clone()).collect()
}

/// A pending path through the graph. Every field is an owned snapshot: a
/// frame must never observe mutations made on behalf of a sibling.
struct Frame {
    node: u32,
    chars: LetterBag,
    subword: WordBuf,
    wildcards: WildcardBuf,
    pattern_index: usize,
}

/// Collects results, deduplicating by word. The first spelling of a word
/// wins; later ones (the same word with different wildcard positions) are
/// dropped.
struct ResultSet {
    items: Vec<Subword>,
    seen: HashSet<String>,
}

impl ResultSet {
    fn new() -> ResultSet {
        ResultSet {
            items: Vec::new(),
            seen: HashSet::new(),
        }
    }

    fn add(&mut self, subword: &[u8], wildcards: &WildcardBuf) {
        let word = String::from_utf8_lossy(subword).into_owned();
        if self.seen.insert(word.clone()) {
            self.items.push(Subword {
                word,
                wildcard_positions: wildcards.as_ref().map(|w| w.to_vec()),
            });
        }
    }
}

/// Removes `letter` from the bag, falling back to a `?` wildcard; a spent
/// wildcard records `at`, the position the letter will occupy in the
/// subword. Returns false when neither is available.
fn consume(chars: &mut LetterBag, letter: u8, at: usize, wildcards: &mut WildcardBuf) -> bool {
    if let Some(pos) = chars.iter().position(|&c| c == letter) {
        chars.remove(pos);
        true
    } else if let Some(pos) = chars.iter().position(|&c| c == WILDCARD) {
        chars.remove(pos);
        wildcards.get_or_insert_with(SmallVec::new).push(at);
        true
    } else {
        false
    }
}

/// The bag's distinct letters, in first-occurrence order. A stable order
/// keeps the traversal — and so which duplicate spelling of a word is seen
/// first — deterministic.
fn unique_letters(chars: &LetterBag) -> SmallVec<[u8; 16]> {
    let mut seen = SmallVec::new();
    for &c in chars {
        if !seen.contains(&c) {
            seen.push(c);
        }
    }
    seen
}

fn has_wildcard(chars: &LetterBag) -> bool {
    chars.contains(&WILDCARD)
}

fn push_frame(
    stack: &mut Vec<Frame>,
    node: u32,
    chars: &LetterBag,
    subword: &WordBuf,
    wildcards: &WildcardBuf,
    pattern_index: usize,
) {
    stack.push(Frame {
        node,
        chars: chars.clone(),
        subword: subword.clone(),
        wildcards: wildcards.clone(),
        pattern_index,
    });
}

impl Dawg {
    /// Finds every dictionary word constructible from `letters`, optionally
    /// constrained by `pattern`.
    ///
    /// `letters` is a bag: repeats matter, and each `?` is a one-shot
    /// single-letter wildcard. `pattern` uses `?` for a single unknown
    /// position, a leading `$` to anchor at the start of the word, and a
    /// trailing `$` to anchor at the end; its first ordinary character is
    /// an open prefix, letting any number of bag letters precede the
    /// match. Letters matched by the pattern itself do not come out of the
    /// bag. Both inputs are folded to uppercase.
    ///
    /// Returns `None` — as opposed to an empty vec, which means "no
    /// matches" — when `letters` is shorter than two characters or either
    /// input fails its grammar.
    ///
    /// Results are deduplicated by word; each carries the positions where
    /// a `?` from the bag was spent.
    ///
    /// # Examples
    ///
    /// ```
    /// use wordgraph::dawg::DawgBuilder;
    ///
    /// let mut builder = DawgBuilder::new();
    /// builder.add_words(["HONE", "PHONE", "ONE"]);
    /// let dawg = builder.build();
    ///
    /// let results = dawg.subwords("PHONE", None).unwrap();
    /// assert_eq!(results.len(), 3);
    ///
    /// // rejected outright: too short, and `!` is not a letter
    /// assert_eq!(dawg.subwords("A", None), None);
    /// assert_eq!(dawg.subwords("AB!", None), None);
    /// ```
    pub fn subwords(&self, letters: &str, pattern: Option<&str>) -> Option<Vec<Subword>> {
        if !pattern::letters_valid(letters) {
            return None;
        }
        let pattern = pattern.map(str::to_ascii_uppercase);
        let pattern = pattern.as_deref().unwrap_or("");
        if !pattern::pattern_valid(pattern) {
            return None;
        }
        let tokens = pattern::compile(pattern);

        let mut results = ResultSet::new();
        let mut stack = vec![Frame {
            node: 0,
            chars: letters.bytes().map(|b| b.to_ascii_uppercase()).collect(),
            subword: WordBuf::new(),
            wildcards: None,
            pattern_index: 0,
        }];

        while let Some(frame) = stack.pop() {
            self.step(frame, &tokens, &mut stack, &mut results);
        }

        Some(results.items)
    }

    /// Processes one search frame: emits any result it completes and
    /// pushes its successor frames.
    fn step(
        &self,
        frame: Frame,
        tokens: &[PatternToken],
        stack: &mut Vec<Frame>,
        results: &mut ResultSet,
    ) {
        let Frame {
            node,
            mut chars,
            mut subword,
            mut wildcards,
            pattern_index,
        } = frame;
        let cell = self.cell(node);
        let letter = cell.letter();

        let Some(&token) = tokens.get(pattern_index) else {
            // past the pattern: only the letter bag constrains the walk
            if node != 0 {
                if !consume(&mut chars, letter, subword.len(), &mut wildcards) {
                    return;
                }
                subword.push(letter);
                if cell.is_terminal() {
                    results.add(&subword, &wildcards);
                }
            }
            self.push_letter_candidates(stack, node, &chars, &subword, &wildcards, pattern_index);
            return;
        };

        if token.required {
            match token.kind {
                TokenKind::Wildcard => {
                    if !consume(&mut chars, letter, subword.len(), &mut wildcards) {
                        return;
                    }
                    subword.push(letter);
                }
                TokenKind::End => {
                    if cell.is_terminal() {
                        results.add(&subword, &wildcards);
                    }
                    return;
                }
                TokenKind::Start => {
                    if letter != 0 {
                        return;
                    }
                }
                TokenKind::Letter(want) => {
                    if letter != want {
                        return;
                    }
                    subword.push(letter);
                }
            }
            let next_index = pattern_index + 1;
            if next_index == tokens.len() && cell.is_terminal() {
                results.add(&subword, &wildcards);
            }
            self.push_candidates(stack, tokens, next_index, node, &chars, &subword, &wildcards);
        } else if node == 0 {
            // an optional first token has nothing to match at the root;
            // leave it pending for the children
            self.push_candidates(
                stack,
                tokens,
                pattern_index,
                node,
                &chars,
                &subword,
                &wildcards,
            );
        } else {
            match token.kind {
                TokenKind::Wildcard => {
                    // whether or not the letter counts toward the pattern,
                    // it must come out of the bag
                    if !consume(&mut chars, letter, subword.len(), &mut wildcards) {
                        return;
                    }
                    subword.push(letter);

                    // branch: the pattern wildcard matches here
                    let next_index = pattern_index + 1;
                    if next_index == tokens.len() && cell.is_terminal() {
                        results.add(&subword, &wildcards);
                    }
                    self.push_candidates(
                        stack, tokens, next_index, node, &chars, &subword, &wildcards,
                    );

                    // branch: it matches somewhere later
                    self.push_candidates(
                        stack,
                        tokens,
                        pattern_index,
                        node,
                        &chars,
                        &subword,
                        &wildcards,
                    );
                }
                TokenKind::Letter(want) => {
                    subword.push(letter);

                    // branch: spend a bag letter, pattern still pending
                    let mut bag = chars.clone();
                    let mut spent_wildcards = wildcards.clone();
                    if consume(&mut bag, letter, subword.len() - 1, &mut spent_wildcards) {
                        self.push_candidates(
                            stack,
                            tokens,
                            pattern_index,
                            node,
                            &bag,
                            &subword,
                            &spent_wildcards,
                        );
                    }

                    // branch: the pattern letter matches for free — the
                    // open prefix need not be backed by the bag
                    if letter == want {
                        let next_index = pattern_index + 1;
                        if next_index == tokens.len() && cell.is_terminal() {
                            results.add(&subword, &wildcards);
                        }
                        self.push_candidates(
                            stack, tokens, next_index, node, &chars, &subword, &wildcards,
                        );
                    }
                }
                // the compiler only emits anchors as required tokens
                TokenKind::Start | TokenKind::End => {}
            }
        }
    }

    /// Lookahead expansion: pushes the frames that could satisfy the next
    /// token — or, with no token left, the letter bag — from `node`.
    fn push_candidates(
        &self,
        stack: &mut Vec<Frame>,
        tokens: &[PatternToken],
        pattern_index: usize,
        node: u32,
        chars: &LetterBag,
        subword: &WordBuf,
        wildcards: &WildcardBuf,
    ) {
        let Some(&token) = tokens.get(pattern_index) else {
            self.push_letter_candidates(stack, node, chars, subword, wildcards, pattern_index);
            return;
        };

        if token.required {
            match token.kind {
                TokenKind::Wildcard => {
                    // a bag wildcard lets any child satisfy the pattern
                    // wildcard; otherwise only children backed by a bag
                    // letter can
                    if has_wildcard(chars) {
                        for (child, _) in self.children(node) {
                            push_frame(stack, child, chars, subword, wildcards, pattern_index);
                        }
                    } else {
                        for letter in unique_letters(chars) {
                            if let Some(child) = self.find_child(node, letter) {
                                push_frame(stack, child, chars, subword, wildcards, pattern_index);
                            }
                        }
                    }
                }
                // the end anchor is checked against the current node, not
                // a child
                TokenKind::End => {
                    push_frame(stack, node, chars, subword, wildcards, pattern_index)
                }
                // a start anchor is only satisfiable at the root, never by
                // descending
                TokenKind::Start => {}
                TokenKind::Letter(want) => {
                    if let Some(child) = self.find_child(node, want) {
                        push_frame(stack, child, chars, subword, wildcards, pattern_index);
                    }
                }
            }
        } else {
            if let TokenKind::Letter(want) = token.kind {
                if let Some(child) = self.find_child(node, want) {
                    push_frame(stack, child, chars, subword, wildcards, pattern_index);
                }
            }
            self.push_letter_candidates(stack, node, chars, subword, wildcards, pattern_index);
        }
    }

    /// Pushes one frame per child reachable with the remaining letters: a
    /// bag wildcard opens every child, otherwise only children whose
    /// letter is still in the bag.
    fn push_letter_candidates(
        &self,
        stack: &mut Vec<Frame>,
        node: u32,
        chars: &LetterBag,
        subword: &WordBuf,
        wildcards: &WildcardBuf,
        pattern_index: usize,
    ) {
        if has_wildcard(chars) {
            for (child, _) in self.children(node) {
                push_frame(stack, child, chars, subword, wildcards, pattern_index);
            }
        } else {
            for letter in unique_letters(chars) {
                if let Some(child) = self.find_child(node, letter) {
                    push_frame(stack, child, chars, subword, wildcards, pattern_index);
                }
            }
        }
    }
}

#[cfg(test)]
mod test {
    use std::collections::HashSet;

    use super::super::builder::DawgBuilder;
    use super::*;

    fn dawg(words: &[&str]) -> Dawg {
        let mut builder = DawgBuilder::new();
        builder.add_words(words);
        builder.build()
    }

    fn words_of(results: &[Subword]) -> HashSet<String> {
        extract_words(results)
    }

    fn expect(words: &[&str]) -> HashSet<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn invalid_letters_are_rejected() {
        let dawg = dawg(&["CAT"]);
        assert_eq!(dawg.subwords("A", None), None);
        assert_eq!(dawg.subwords("", None), None);
        assert_eq!(dawg.subwords("AB1", None), None);
        assert_eq!(dawg.subwords("AB CD", None), None);
    }

    #[test]
    fn invalid_patterns_are_rejected() {
        let dawg = dawg(&["CAT"]);
        assert_eq!(dawg.subwords("AB", Some("bad\\pattern")), None);
        assert_eq!(dawg.subwords("AB", Some("A-")), None);
        assert_eq!(dawg.subwords("AB", Some("A$B")), None);
    }

    #[test]
    fn no_matches_is_empty_not_none() {
        let dawg = dawg(&["CAT"]);
        assert_eq!(dawg.subwords("ZZ", None), Some(vec![]));
    }

    #[test]
    fn letters_only_search() {
        let dawg = dawg(&["CAT", "CATS", "ACT", "AT", "COG"]);
        let results = dawg.subwords("TACS", None).unwrap();
        assert_eq!(words_of(&results), expect(&["AT", "ACT", "CAT", "CATS"]));
        assert!(results.iter().all(|r| r.wildcard_positions.is_none()));
    }

    #[test]
    fn letters_fold_to_uppercase() {
        let dawg = dawg(&["CAT", "AT"]);
        let results = dawg.subwords("tac", None).unwrap();
        assert_eq!(words_of(&results), expect(&["AT", "CAT"]));
    }

    #[test]
    fn rack_search_respects_letter_multiplicity() {
        let dawg = dawg(&[
            "PHONE", "HONE", "PONE", "NOPE", "EON", "HON", "ONE", "EH", "PE", "OP", "PHONY", "ZOO",
        ]);
        let results = dawg.subwords("PHONE", None).unwrap();
        // PHONY needs a Y, ZOO a second O; everything else fits the rack
        assert_eq!(
            words_of(&results),
            expect(&[
                "PHONE", "HONE", "PONE", "NOPE", "EON", "HON", "ONE", "EH", "PE", "OP",
            ])
        );
        assert_eq!(results.len(), 10);
    }

    #[test]
    fn single_wildcard_records_its_position() {
        let dawg = dawg(&["QI"]);
        let results = dawg.subwords("?Q", None).unwrap();
        assert_eq!(
            results,
            vec![Subword {
                word: "QI".to_string(),
                wildcard_positions: Some(vec![1]),
            }]
        );
    }

    #[test]
    fn exact_letters_are_preferred_over_wildcards() {
        let dawg = dawg(&["AB"]);
        let results = dawg.subwords("A?", None).unwrap();
        assert_eq!(
            results,
            vec![Subword {
                word: "AB".to_string(),
                wildcard_positions: Some(vec![1]),
            }]
        );
    }

    #[test]
    fn every_letter_can_come_from_a_wildcard() {
        let dawg = dawg(&["AB"]);
        let results = dawg.subwords("??", None).unwrap();
        assert_eq!(
            results,
            vec![Subword {
                word: "AB".to_string(),
                wildcard_positions: Some(vec![0, 1]),
            }]
        );
    }

    #[test]
    fn fully_anchored_pattern_matches_exactly_one_word() {
        let dawg = dawg(&["CAT", "CATS", "SCAT"]);
        let results = dawg.subwords("CATS", Some("$CAT$")).unwrap();
        assert_eq!(
            results,
            vec![Subword {
                word: "CAT".to_string(),
                wildcard_positions: None,
            }]
        );
    }

    #[test]
    fn start_anchor_leaves_the_suffix_open() {
        let dawg = dawg(&["CAT", "CATS", "SCAT"]);
        let results = dawg.subwords("CATS", Some("$CAT")).unwrap();
        assert_eq!(words_of(&results), expect(&["CAT", "CATS"]));
    }

    #[test]
    fn end_anchor_leaves_the_prefix_open() {
        let dawg = dawg(&["CAT", "CATS", "SCAT"]);
        let results = dawg.subwords("CATS", Some("CAT$")).unwrap();
        assert_eq!(words_of(&results), expect(&["CAT", "SCAT"]));
    }

    #[test]
    fn anchored_pattern_misses_when_the_word_is_absent() {
        let dawg = dawg(&["DOG"]);
        assert_eq!(dawg.subwords("CATS", Some("$CAT$")), Some(vec![]));
    }

    #[test]
    fn pattern_letters_do_not_spend_the_bag() {
        // the pattern supplies C, A, and T for free; the bag only has to
        // cover the S
        let dawg = dawg(&["CATS"]);
        let results = dawg.subwords("SX", Some("$CAT")).unwrap();
        assert_eq!(words_of(&results), expect(&["CATS"]));
    }

    #[test]
    fn pattern_wildcard_must_be_backed_by_the_bag() {
        let dawg = dawg(&["BAT", "CAT"]);
        let results = dawg.subwords("AT?", Some("?AT")).unwrap();
        assert_eq!(words_of(&results), expect(&["BAT", "CAT"]));
        for result in &results {
            assert_eq!(result.wildcard_positions, Some(vec![0]));
        }

        // without a bag wildcard, neither B nor C is available
        let results = dawg.subwords("AT", Some("?AT")).unwrap();
        assert_eq!(results, vec![]);
    }

    #[test]
    fn end_anchored_pattern_with_open_prefix() {
        let dawg = dawg(&["AT", "BAT"]);
        let results = dawg.subwords("ATB", Some("AT$")).unwrap();
        assert_eq!(words_of(&results), expect(&["AT", "BAT"]));
    }

    #[test]
    fn results_are_unique_by_word() {
        let dawg = dawg(&["CAT", "CATS", "ACT", "AT", "TA", "SAT"]);
        let results = dawg.subwords("ATSC?", None).unwrap();
        assert_eq!(results.len(), words_of(&results).len());
    }

    #[test]
    fn wildcard_positions_index_into_the_word() {
        let dawg = dawg(&["CAB", "ABS"]);
        let results = dawg.subwords("AB??", None).unwrap();
        let words = words_of(&results);
        assert!(words.contains("CAB"));
        assert!(words.contains("ABS"));
        for result in &results {
            let positions = result.wildcard_positions.as_ref().unwrap();
            // no more positions than wildcards in the bag
            assert!(positions.len() <= 2);
            for &p in positions {
                assert!(p < result.word.len());
            }
        }
    }
}
