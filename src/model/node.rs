//! Generic schema-indexed data tree

use std::fmt;

use super::QName;

/// Value carried by a leaf
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeafValue {
    String(String),
    Boolean(bool),
    Uint32(u32),
    /// Presence-only leaf (`type empty`)
    Empty,
}

impl fmt::Display for LeafValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => f.write_str(s),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Uint32(n) => write!(f, "{n}"),
            Self::Empty => Ok(()),
        }
    }
}

/// Node in a data tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataNode {
    Container(ContainerNode),
    Leaf(LeafNode),
    List(ListNode),
}

impl DataNode {
    #[must_use]
    pub const fn name(&self) -> &QName {
        match self {
            Self::Container(c) => &c.name,
            Self::Leaf(l) => &l.name,
            Self::List(l) => &l.name,
        }
    }

    /// Short node kind, used in diagnostics
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Container(_) => "container",
            Self::Leaf(_) => "leaf",
            Self::List(_) => "list",
        }
    }
}

/// Container: an ordered set of uniquely named children
///
/// List entries are also represented as containers named after their list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerNode {
    pub name: QName,
    pub children: Vec<DataNode>,
}

impl ContainerNode {
    #[must_use]
    pub const fn new(name: QName) -> Self {
        Self {
            name,
            children: Vec::new(),
        }
    }

    /// Add a child, replacing any existing child of the same name
    #[must_use]
    pub fn with_child(mut self, child: DataNode) -> Self {
        self.children.retain(|c| c.name() != child.name());
        self.children.push(child);
        self
    }

    /// Add a leaf child
    #[must_use]
    pub fn with_leaf(self, name: QName, value: LeafValue) -> Self {
        self.with_child(DataNode::Leaf(LeafNode { name, value }))
    }

    #[must_use]
    pub fn child(&self, name: &QName) -> Option<&DataNode> {
        self.children.iter().find(|c| c.name() == name)
    }

    /// Value of a leaf child, `None` if absent or not a leaf
    #[must_use]
    pub fn leaf(&self, name: &QName) -> Option<&LeafValue> {
        match self.child(name)? {
            DataNode::Leaf(leaf) => Some(&leaf.value),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafNode {
    pub name: QName,
    pub value: LeafValue,
}

/// Keyed list; entries keep document order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListNode {
    pub name: QName,
    pub entries: Vec<ContainerNode>,
}
