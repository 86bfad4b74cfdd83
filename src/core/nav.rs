//! # Navigation Tree
//!
//! Ordered trie of navigation keys, serialized once per build into a
//! literate nav document (a Markdown nested list):
//!
//! ```text
//! * [pkg](pkg/index.md)
//!     * [sub](pkg/sub/index.md)
//!         * [name](pkg/sub/name.md)
//!     * \_private
//!         * [util](pkg/_private/util.md)
//! ```
//!
//! Children keep first-insertion order. Since modules are inserted in sorted
//! scan order, the rendered list is deterministic.

use std::fmt;

/// Characters that would change the meaning of a list item if they led it.
const MARKDOWN_ESCAPE_CHARS: &[char] = &[
    '!', '#', '(', ')', '*', '+', '-', '[', '\\', ']', '_', '`', '{', '}',
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavError {
    EmptyKey,
}

impl fmt::Display for NavError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NavError::EmptyKey => write!(f, "navigation key has no segments"),
        }
    }
}

impl std::error::Error for NavError {}

#[derive(Debug, Clone, PartialEq, Eq)]
struct NavNode {
    label: String,
    link: Option<String>,
    children: Vec<NavNode>,
}

impl NavNode {
    fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            link: None,
            children: Vec::new(),
        }
    }
}

/// One rendered row of the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavItem<'a> {
    pub level: usize,
    pub label: &'a str,
    pub link: Option<&'a str>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct NavigationTree {
    roots: Vec<NavNode>,
}

fn child_mut<'a>(nodes: &'a mut Vec<NavNode>, label: &str) -> &'a mut NavNode {
    let index = match nodes.iter().position(|n| n.label == label) {
        Some(index) => index,
        None => {
            nodes.push(NavNode::new(label));
            nodes.len() - 1
        }
    };
    &mut nodes[index]
}

impl NavigationTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `link` under `key`, creating intermediate nodes.
    ///
    /// Returns the link previously stored under the same key, which this
    /// call replaced. The node keeps its original position.
    pub fn insert<S: AsRef<str>>(
        &mut self,
        key: &[S],
        link: impl Into<String>,
    ) -> Result<Option<String>, NavError> {
        let (first, rest) = key.split_first().ok_or(NavError::EmptyKey)?;
        let mut node = child_mut(&mut self.roots, first.as_ref());
        for segment in rest {
            node = child_mut(&mut node.children, segment.as_ref());
        }
        Ok(node.link.replace(link.into()))
    }

    /// Link stored under exactly `key`, if any.
    pub fn get<S: AsRef<str>>(&self, key: &[S]) -> Option<&str> {
        let (first, rest) = key.split_first()?;
        let mut node = self.roots.iter().find(|n| n.label == first.as_ref())?;
        for segment in rest {
            node = node.children.iter().find(|n| n.label == segment.as_ref())?;
        }
        node.link.as_deref()
    }

    /// Number of keys that carry a link.
    pub fn len(&self) -> usize {
        fn count(nodes: &[NavNode]) -> usize {
            nodes
                .iter()
                .map(|n| usize::from(n.link.is_some()) + count(&n.children))
                .sum()
        }
        count(&self.roots)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Depth-first walk in insertion order.
    pub fn items(&self) -> Vec<NavItem<'_>> {
        fn walk<'a>(nodes: &'a [NavNode], level: usize, out: &mut Vec<NavItem<'a>>) {
            for node in nodes {
                out.push(NavItem {
                    level,
                    label: &node.label,
                    link: node.link.as_deref(),
                });
                walk(&node.children, level + 1, out);
            }
        }
        let mut out = Vec::new();
        walk(&self.roots, 0, &mut out);
        out
    }

    /// Renders the tree as a literate nav document.
    ///
    /// `indent` spaces prefix every line, for embedding the list in a larger
    /// document; each nesting level adds four more.
    pub fn build_literate_nav(&self, indent: usize) -> String {
        let prefix = " ".repeat(indent);
        let mut out = String::new();
        for item in self.items() {
            let mut line = String::new();
            if item.label.starts_with(MARKDOWN_ESCAPE_CHARS) {
                line.push('\\');
            }
            line.push_str(item.label);
            if let Some(link) = item.link {
                line = format!("[{line}]({link})");
            }
            out.push_str(&prefix);
            out.push_str(&"    ".repeat(item.level));
            out.push_str("* ");
            out.push_str(&line);
            out.push('\n');
        }
        out
    }
}
