//! Builds a [`Dawg`] by growing a trie and minimizing it.

use std::collections::VecDeque;
use std::io::{self, BufRead};

use smallvec::SmallVec;
use tracing::debug;

use super::cell::Cell;
use super::graph::Dawg;
use super::trie::{NodeId, Trie, ROOT};

/// Builds a [`Dawg`] from a set of words.
///
/// Words go into an uncompressed trie; [`build`](DawgBuilder::build) then
/// fuses equivalent subtrees bottom-up and packs the minimized graph into
/// its cell-array form. Building consumes the builder, so a finished dawg
/// can never be added to.
///
/// # Examples
///
/// ```
/// use wordgraph::dawg::DawgBuilder;
///
/// let mut builder = DawgBuilder::new();
/// builder.add("JIM").add("JIMMY");
/// assert_eq!(builder.word_count(), 2);
/// assert!(builder.contains("jim"));
///
/// let dawg = builder.build();
/// assert!(dawg.contains("JIMMY"));
/// ```
pub struct DawgBuilder {
    trie: Trie,
    word_count: usize,
}

impl DawgBuilder {
    /// Creates an empty builder.
    pub fn new() -> DawgBuilder {
        DawgBuilder {
            trie: Trie::new(),
            word_count: 0,
        }
    }

    /// Adds a word.
    ///
    /// The word is folded to uppercase. Words shorter than two characters
    /// are ignored, and adding a word twice has no further effect.
    pub fn add(&mut self, word: &str) -> &mut DawgBuilder {
        if word.len() < 2 {
            return self;
        }
        let word: SmallVec<[u8; 32]> = word.bytes().map(|b| b.to_ascii_uppercase()).collect();

        let mut ptr = ROOT;
        for &letter in &word {
            ptr = match self.trie.find_child(ptr, letter) {
                Some(child) => child,
                None => self.trie.add_child(ptr, letter),
            };
        }
        if !self.trie.node(ptr).terminal {
            self.trie.node_mut(ptr).terminal = true;
            self.word_count += 1;
        }
        self
    }

    /// Adds every word from an iterator.
    pub fn add_words<I>(&mut self, words: I) -> &mut DawgBuilder
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        for word in words {
            self.add(word.as_ref());
        }
        self
    }

    /// Adds one word per line from a reader.
    ///
    /// Blank lines (and anything else shorter than two characters) are
    /// dropped by [`add`](DawgBuilder::add).
    pub fn add_lines<R: BufRead>(&mut self, mut reader: R) -> io::Result<&mut DawgBuilder> {
        // read_line into a reused buffer instead of lines(), which would
        // allocate a fresh String per word
        let mut buf = String::with_capacity(80);
        loop {
            match reader.read_line(&mut buf) {
                Ok(0) => break,
                Ok(_) => {}
                Err(e) => return Err(e),
            }
            self.add(buf.trim_end());
            buf.clear();
        }
        Ok(self)
    }

    /// The number of distinct words added so far.
    pub fn word_count(&self) -> usize {
        self.word_count
    }

    /// The number of trie nodes, counted by explicit-stack traversal.
    pub fn node_count(&self) -> usize {
        let mut visited = vec![false; self.trie.len()];
        let mut stack = vec![ROOT];
        let mut count = 0;
        while let Some(id) = stack.pop() {
            if visited[id] {
                continue;
            }
            visited[id] = true;
            count += 1;
            let node = self.trie.node(id);
            stack.extend(node.next_children.iter().copied());
            stack.extend(node.first_child);
        }
        count
    }

    /// Whether the word would be contained in the built dawg.
    pub fn contains(&self, word: &str) -> bool {
        if word.len() < 2 {
            return false;
        }
        let mut ptr = ROOT;
        for b in word.bytes() {
            match self.trie.find_child(ptr, b.to_ascii_uppercase()) {
                Some(child) => ptr = child,
                None => return false,
            }
        }
        self.trie.node(ptr).terminal
    }

    /// Minimizes the trie and packs it into a [`Dawg`], consuming the
    /// builder.
    pub fn build(mut self) -> Dawg {
        let trie_nodes = self.node_count();
        self.minimize();
        let cells = self.pack();
        debug!(
            words = self.word_count,
            trie_nodes,
            cells = cells.len(),
            "packed dawg"
        );
        Dawg::from_cells(cells)
    }

    /// Fuses subtree-isomorphic nodes bottom-up.
    ///
    /// Only a node that is its parent's sole child can be merged away:
    /// redirecting one means updating a single first-child pointer,
    /// whereas a node inside a longer sibling run cannot be re-pointed
    /// without renumbering the run. Nodes inside runs are still shared
    /// transitively through their parents.
    fn minimize(&mut self) {
        let order = self.number_nodes();
        self.assign_child_depths(&order);

        // bin by child depth, leaves first; depth −1 nodes (no terminal at
        // or below them) are never candidates
        let max_depth = order
            .iter()
            .map(|&id| self.trie.node(id).child_depth)
            .max()
            .unwrap_or(-1);
        if max_depth < 0 {
            return;
        }
        let mut bins: Vec<Vec<NodeId>> = vec![Vec::new(); max_depth as usize + 1];
        for &id in &order {
            let depth = self.trie.node(id).child_depth;
            if depth >= 0 {
                bins[depth as usize].push(id);
            }
        }

        for bin in &bins {
            for (i, &pick) in bin.iter().enumerate() {
                if !self.merge_candidate(pick) {
                    continue;
                }
                for &other in &bin[i + 1..] {
                    if self.merge_candidate(other) && self.trie.subtrees_equal(pick, other) {
                        let parent = self.trie.node(other).parent;
                        self.trie.node_mut(parent).first_child = Some(pick);
                        self.trie.node_mut(other).replaced_by = Some(pick);
                    }
                }
            }
        }
    }

    fn merge_candidate(&self, id: NodeId) -> bool {
        let node = self.trie.node(id);
        node.replaced_by.is_none() && node.is_first_child && node.sibling_count == 0
    }

    /// Breadth-first walk recording each node's sibling count. Returns the
    /// traversal order (ancestors strictly before descendants).
    fn number_nodes(&mut self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.trie.len());
        let mut queue = VecDeque::new();
        queue.push_back(ROOT);
        while let Some(id) = queue.pop_front() {
            if id != ROOT {
                // a parent with any child always has a first child, so the
                // sibling count is just the overflow-list length
                let parent = self.trie.node(id).parent;
                let siblings = self.trie.node(parent).next_children.len();
                self.trie.node_mut(id).sibling_count = siblings;
            }
            order.push(id);
            let node = self.trie.node(id);
            queue.extend(node.next_children.iter().copied());
            queue.extend(node.first_child);
        }
        order
    }

    /// Walks upward from every terminal, raising each ancestor's child
    /// depth to its distance from that terminal. The climb stops as soon
    /// as it fails to increase an ancestor: the rest of the path is
    /// already dominated by a deeper terminal.
    fn assign_child_depths(&mut self, order: &[NodeId]) {
        for &id in order {
            if !self.trie.node(id).terminal {
                continue;
            }
            self.trie.node_mut(id).child_depth = 0;
            let mut depth = 0;
            let mut ptr = id;
            while ptr != ROOT {
                ptr = self.trie.node(ptr).parent;
                depth += 1;
                if depth > self.trie.node(ptr).child_depth {
                    self.trie.node_mut(ptr).child_depth = depth;
                } else {
                    break;
                }
            }
        }
    }

    /// Re-indexes the minimized graph breadth-first and emits one packed
    /// cell per reachable node. A shared node is indexed on first visit
    /// only, which is what turns redirected first-child pointers into
    /// shared cell ranges.
    fn pack(&mut self) -> Vec<u32> {
        for id in 0..self.trie.len() {
            self.trie.node_mut(id).index = -1;
        }

        let mut order = Vec::new();
        let mut queue = VecDeque::new();
        queue.push_back(ROOT);
        while let Some(id) = queue.pop_front() {
            if self.trie.node(id).index != -1 {
                continue;
            }
            self.trie.node_mut(id).index = order.len() as i32;
            order.push(id);
            let node = self.trie.node(id);
            queue.extend(node.next_children.iter().copied());
            queue.extend(node.first_child);
        }

        order
            .iter()
            .map(|&id| {
                let node = self.trie.node(id);
                let run_head = node.next_children.first().copied().or(node.first_child);
                let first_child = run_head.map(|head| self.trie.node(head).index as u32);
                Cell::pack(node.letter, node.terminal, node.last_sibling, first_child).0
            })
            .collect()
    }
}

impl Default for DawgBuilder {
    fn default() -> Self {
        DawgBuilder::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn add_increments_word_count() {
        let mut builder = DawgBuilder::new();
        builder.add("jimmy");
        assert_eq!(builder.word_count(), 1);
    }

    #[test]
    fn add_empty_is_a_no_op() {
        let mut builder = DawgBuilder::new();
        builder.add("");
        assert_eq!(builder.word_count(), 0);
        assert_eq!(builder.node_count(), 1);
    }

    #[test]
    fn add_short_word_is_a_no_op() {
        let mut builder = DawgBuilder::new();
        builder.add("j");
        assert_eq!(builder.word_count(), 0);
        assert!(!builder.contains("j"));
    }

    #[test]
    fn add_repeat_is_idempotent() {
        let mut builder = DawgBuilder::new();
        builder.add("JIMMY");
        assert_eq!(builder.word_count(), 1);
        // also exercises the uppercase fold
        builder.add("jimmy");
        assert_eq!(builder.word_count(), 1);
    }

    #[test]
    fn add_subword_after_word() {
        let mut builder = DawgBuilder::new();
        builder.add("JIMMY").add("JIM");
        assert_eq!(builder.word_count(), 2);
        assert!(builder.contains("JIM"));
        assert!(builder.contains("JIMMY"));
    }

    #[test]
    fn add_word_after_subword() {
        let mut builder = DawgBuilder::new();
        builder.add("JIM").add("JIMMY");
        assert_eq!(builder.word_count(), 2);
    }

    #[test]
    fn add_words_takes_any_iterator() {
        let mut builder = DawgBuilder::new();
        builder.add_words(["SEARCH", "SEARCHED", "SEARCHING"]);
        assert_eq!(builder.word_count(), 3);
        for word in ["SEARCH", "SEARCHED", "SEARCHING"] {
            assert!(builder.contains(word));
        }
    }

    #[test]
    fn add_lines_drops_blanks() {
        let mut builder = DawgBuilder::new();
        builder
            .add_lines("SEARCH\nSEARCHED\n\nSEARCHING\n".as_bytes())
            .unwrap();
        assert_eq!(builder.word_count(), 3);
        assert!(builder.contains("searching"));
    }

    #[test]
    fn contains_is_case_insensitive() {
        let mut builder = DawgBuilder::new();
        builder.add("JIMMY");
        assert!(builder.contains("jimmy"));
        assert!(builder.contains("JiMmY"));
    }

    #[test]
    fn contains_rejects_absent_and_short() {
        let mut builder = DawgBuilder::new();
        builder.add("JIMMY");
        assert!(!builder.contains("JAMES"));
        assert!(!builder.contains("JIM"));
        assert!(!builder.contains("j"));
        assert!(!builder.contains(""));
    }

    #[test]
    fn node_count_counts_the_trie() {
        let mut builder = DawgBuilder::new();
        builder.add("AB");
        assert_eq!(builder.node_count(), 3);
        builder.add("AC");
        assert_eq!(builder.node_count(), 4);
    }

    #[test]
    fn build_preserves_membership() {
        let mut builder = DawgBuilder::new();
        builder.add_words(["SEARCH", "SEARCHED", "SEARCHING"]);
        let dawg = builder.build();
        assert!(dawg.contains("SEARCH"));
        assert!(dawg.contains("SEARCHED"));
        assert!(dawg.contains("SEARCHING"));
        assert!(!dawg.contains("SEARCHES"));
        assert!(!dawg.contains("SEAR"));
    }

    #[test]
    fn build_shares_equal_subtrees() {
        let mut builder = DawgBuilder::new();
        builder.add("CARS").add("BARS");
        // trie: root + CARS + BARS = 9 nodes; the A→R→S tail is shared
        assert_eq!(builder.node_count(), 9);
        let dawg = builder.build();
        assert_eq!(dawg.node_count(), 6);
    }

    #[test]
    fn equal_sibling_runs_share_through_their_parent() {
        // the B/G leaves sit inside sibling runs and cannot merge
        // themselves, but the A nodes above them are sole children with
        // equal subtrees, so both runs collapse into one
        let mut builder = DawgBuilder::new();
        builder.add_words(["TAB", "TAG", "LAB", "LAG"]);
        let dawg = builder.build();
        // root, T, L, one shared A, and its B/G run
        assert_eq!(dawg.node_count(), 6);
        for word in ["TAB", "TAG", "LAB", "LAG"] {
            assert!(dawg.contains(word), "{word}");
        }
    }

    #[test]
    fn sibling_runs_are_not_merged_away() {
        // SAT and SET give S two children; the lone T leaves below them
        // are equal but sit as sole children and merge, while A and E
        // (inside a sibling run) must both survive.
        let mut builder = DawgBuilder::new();
        builder.add("SAT").add("SET");
        let dawg = builder.build();
        // root, S, A, E, shared T
        assert_eq!(dawg.node_count(), 5);
        assert!(dawg.contains("SAT"));
        assert!(dawg.contains("SET"));
        assert!(!dawg.contains("SAE"));
    }
}
