use photofs_tree::Node;
use photofs_tree::TreeIndex;
use std::collections::HashMap;

/// Inode number of the root directory.
pub const ROOT_INO: u64 = 1;

/// Two-way mapping between inode numbers and tree nodes.
///
/// Numbers are handed out once, in tree order starting at [`ROOT_INO`],
/// so the same library always gets the same numbers.
#[derive(Debug)]
pub struct Inodes
{
    nodes: Vec<Node>,
    numbers: HashMap<Node, u64>,
}

impl Inodes
{
    pub fn new(index: &TreeIndex) -> Self
    {
        let nodes: Vec<Node> = index.nodes().collect();
        let numbers =
            nodes.iter()
            .enumerate()
            .map(|(i, &node)| (node, ROOT_INO + i as u64))
            .collect();
        Self{nodes, numbers}
    }

    pub fn node(&self, ino: u64) -> Option<Node>
    {
        let i = ino.checked_sub(ROOT_INO)?;
        self.nodes.get(i as usize).copied()
    }

    pub fn ino(&self, node: Node) -> Option<u64>
    {
        self.numbers.get(&node).copied()
    }

    pub fn len(&self) -> usize
    {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool
    {
        self.nodes.is_empty()
    }
}
