use crate::candidate::CandidatePath;
use std::collections::BTreeMap;
use tracing::trace;

/// Represents a node in a path trie. Leaves carry a file's line count.
#[derive(Debug, Default)]
pub struct TrieNode {
    pub children: BTreeMap<String, TrieNode>,
    pub line_count: Option<usize>,
}

impl TrieNode {
    pub fn new() -> Self {
        TrieNode::default()
    }

    /// Calculates the total number of lines in the subtree.
    pub fn calculate_total_lines(&self) -> usize {
        self.line_count.unwrap_or(0)
            + self
                .children
                .values()
                .map(|child| child.calculate_total_lines())
                .sum::<usize>()
    }
}

#[derive(Debug, Default)]
pub struct Trie {
    root: TrieNode,
}

impl Trie {
    pub fn new() -> Self {
        Trie::default()
    }

    pub fn insert(&mut self, path: &CandidatePath, line_count: usize) {
        let mut current_node = &mut self.root;
        for component in path.segments() {
            current_node = current_node
                .children
                .entry(component.to_owned())
                .or_insert_with(TrieNode::new);
        }
        if current_node.line_count.is_some() {
            trace!("Overwriting existing line count for path: {}", path);
        }
        current_node.line_count = Some(line_count);
    }

    pub fn get_root(&self) -> &TrieNode {
        &self.root
    }
}
