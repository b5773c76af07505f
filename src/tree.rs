use crate::{NonTerminal, ParseTree};
use ptree::TreeItem;
use std::collections::HashSet;
use std::fmt::{Debug, Display, Formatter};
use std::ops::Range;

impl<TKey> ParseTree<TKey> {
    /// Create an inner node.
    pub fn node(key: TKey, children: Vec<ParseTree<TKey>>) -> Self {
        ParseTree::Node { key, children }
    }

    /// Create a leaf covering the given byte range of the input.
    pub fn leaf(range: Range<usize>) -> Self {
        ParseTree::Leaf(range)
    }

    /// The key of the root node; [None] for a leaf.
    pub fn key(&self) -> Option<&TKey> {
        match self {
            ParseTree::Node { key, .. } => Some(key),
            ParseTree::Leaf(_) => None,
        }
    }

    pub fn children(&self) -> &[ParseTree<TKey>] {
        match self {
            ParseTree::Node { children, .. } => children,
            ParseTree::Leaf(_) => &[],
        }
    }

    /// Rewrite every node key with the given function, keeping the tree shape.
    pub fn map<TR, TF: Fn(TKey) -> TR>(self, f: &TF) -> ParseTree<TR> {
        match self {
            ParseTree::Node { key, children } => ParseTree::Node {
                key: f(key),
                children: children.into_iter().map(|child| child.map(f)).collect(),
            },
            ParseTree::Leaf(range) => ParseTree::Leaf(range),
        }
    }

    /// Rewrite every leaf range with the given function, keeping the tree shape.
    pub fn map_leaves<TF: Fn(Range<usize>) -> Range<usize>>(self, f: &TF) -> Self {
        match self {
            ParseTree::Node { key, children } => ParseTree::Node {
                key,
                children: children
                    .into_iter()
                    .map(|child| child.map_leaves(f))
                    .collect(),
            },
            ParseTree::Leaf(range) => ParseTree::Leaf(f(range)),
        }
    }

    /// Keep a subtree only while the predicate holds for its key and for every ancestor.
    /// A node with a failing key is discarded together with all its descendants; leaves
    /// survive whenever their ancestors do.
    pub fn filter<TF: Fn(&TKey) -> bool>(self, predicate: &TF) -> Option<Self> {
        match self {
            ParseTree::Node { key, children } => {
                if !predicate(&key) {
                    return None;
                }
                Some(ParseTree::Node {
                    key,
                    children: children
                        .into_iter()
                        .filter_map(|child| child.filter(predicate))
                        .collect(),
                })
            }
            ParseTree::Leaf(range) => Some(ParseTree::Leaf(range)),
        }
    }

    /// Replace every node whose key satisfies the predicate by its children, in order.
    /// A matching root dissolves into its child list, hence the [Vec] return.
    pub fn explode<TF: Fn(&TKey) -> bool>(self, predicate: &TF) -> Vec<Self> {
        match self {
            ParseTree::Node { key, children } => {
                let exploded: Vec<Self> = children
                    .into_iter()
                    .flat_map(|child| child.explode(predicate))
                    .collect();
                if predicate(&key) {
                    exploded
                } else {
                    vec![ParseTree::Node {
                        key,
                        children: exploded,
                    }]
                }
            }
            ParseTree::Leaf(range) => vec![ParseTree::Leaf(range)],
        }
    }

    /// Collapse chains of single-child nodes to their innermost element. Intended for
    /// human-readable rendering; the result no longer mirrors the grammar's derivation.
    pub fn compress(self) -> Self {
        match self {
            ParseTree::Node { key, children } => {
                if children.len() == 1 {
                    children.into_iter().next().unwrap().compress()
                } else {
                    ParseTree::Node {
                        key,
                        children: children.into_iter().map(ParseTree::compress).collect(),
                    }
                }
            }
            ParseTree::Leaf(range) => ParseTree::Leaf(range),
        }
    }

    /// The leaf ranges of the tree in left-to-right order.
    pub fn leaves(&self) -> Vec<Range<usize>> {
        let mut leaves = Vec::new();
        self.collect_leaves(&mut leaves);
        leaves
    }

    fn collect_leaves(&self, leaves: &mut Vec<Range<usize>>) {
        match self {
            ParseTree::Node { children, .. } => {
                for child in children {
                    child.collect_leaves(leaves);
                }
            }
            ParseTree::Leaf(range) => leaves.push(range.clone()),
        }
    }

    /// The byte range covered by the tree: from its first leaf to its last.
    /// [None] for a tree without leaves.
    pub fn leaf_range(&self) -> Option<Range<usize>> {
        let leaves = self.leaves();
        let first = leaves.first()?;
        let last = leaves.last()?;
        Some(first.start..last.end)
    }
}

impl ParseTree<NonTerminal> {
    /// Explode every utility non-terminal below the root. The root key is the start
    /// symbol of a grammar and is never a utility non-terminal, so it stays in place.
    pub(crate) fn without_utility(self, utility: &HashSet<NonTerminal>) -> Self {
        if utility.is_empty() {
            return self;
        }
        match self {
            ParseTree::Node { key, children } => ParseTree::Node {
                key,
                children: children
                    .into_iter()
                    .flat_map(|child| child.explode(&|key| utility.contains(key)))
                    .collect(),
            },
            leaf => leaf,
        }
    }
}

impl<TKey: Debug> Display for ParseTree<TKey> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseTree::Node { key, children } => {
                write!(f, "({:?}", key)?;
                for child in children {
                    write!(f, " {}", child)?;
                }
                write!(f, ")")
            }
            ParseTree::Leaf(range) => write!(f, "{}-{}", range.start, range.end),
        }
    }
}

impl<TKey: Debug + Clone> TreeItem for ParseTree<TKey> {
    type Child = Self;

    fn write_self<W: std::io::Write>(&self, f: &mut W, _: &ptree::Style) -> std::io::Result<()> {
        match self {
            ParseTree::Node { key, .. } => write!(f, "{:?}", key),
            ParseTree::Leaf(range) => write!(f, "# {}-{}", range.start, range.end),
        }
    }

    fn children(&self) -> std::borrow::Cow<[Self::Child]> {
        std::borrow::Cow::from(ParseTree::children(self))
    }
}

impl<TKey: Debug + Clone> ParseTree<TKey> {
    pub fn print(&self) -> Result<(), std::io::Error> {
        ptree::print_tree(self)
    }
}
