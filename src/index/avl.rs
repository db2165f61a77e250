//! Arena-backed AVL tree
//!
//! Nodes live in a `Vec` and refer to each other by index, so rotations are
//! plain index swaps. The tree only grows (no deletion), which means the
//! arena length is also the node count.

use std::cmp::Ordering;

use super::IndexEntry;

/// Position of a node in the arena
pub type NodeId = usize;

#[derive(Debug, Clone)]
struct Node {
    key: i32,
    offset: u64,
    left: Option<NodeId>,
    right: Option<NodeId>,
    /// Leaf = 1; an absent subtree counts as 0
    height: i32,
}

/// Height-balanced BST from truncated score to first byte offset
#[derive(Debug, Default, Clone)]
pub struct AvlTree {
    nodes: Vec<Node>,
    root: Option<NodeId>,
}

impl AvlTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Height of the whole tree (0 when empty)
    pub fn height(&self) -> i32 {
        self.height_of(self.root)
    }

    /// Offset stored for `key`, if present
    pub fn get(&self, key: i32) -> Option<u64> {
        let mut cursor = self.root;
        while let Some(id) = cursor {
            let node = &self.nodes[id];
            cursor = match key.cmp(&node.key) {
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
                Ordering::Equal => return Some(node.offset),
            };
        }
        None
    }

    /// Insert `key → offset`.
    ///
    /// An existing key keeps its original offset (first write wins) and the
    /// call returns `false`.
    pub fn insert(&mut self, key: i32, offset: u64) -> bool {
        let (root, inserted) = self.insert_at(self.root, key, offset);
        self.root = Some(root);
        inserted
    }

    /// Entries in ascending key order
    pub fn in_order(&self) -> Vec<IndexEntry> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<NodeId> = Vec::new();
        let mut cursor = self.root;

        loop {
            while let Some(id) = cursor {
                stack.push(id);
                cursor = self.nodes[id].left;
            }
            let Some(id) = stack.pop() else {
                break;
            };
            let node = &self.nodes[id];
            out.push(IndexEntry {
                key: node.key,
                offset: node.offset,
            });
            cursor = node.right;
        }

        out
    }

    /// Check ordering, stored heights and balance factors at every node
    pub fn validate(&self) -> Result<(), String> {
        self.validate_at(self.root, None, None).map(|_| ())
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn alloc(&mut self, key: i32, offset: u64) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Node {
            key,
            offset,
            left: None,
            right: None,
            height: 1,
        });
        id
    }

    fn insert_at(&mut self, node: Option<NodeId>, key: i32, offset: u64) -> (NodeId, bool) {
        let Some(id) = node else {
            return (self.alloc(key, offset), true);
        };

        match key.cmp(&self.nodes[id].key) {
            Ordering::Less => {
                let (child, inserted) = self.insert_at(self.nodes[id].left, key, offset);
                self.nodes[id].left = Some(child);
                if !inserted {
                    return (id, false);
                }
            }
            Ordering::Greater => {
                let (child, inserted) = self.insert_at(self.nodes[id].right, key, offset);
                self.nodes[id].right = Some(child);
                if !inserted {
                    return (id, false);
                }
            }
            Ordering::Equal => return (id, false),
        }

        self.update_height(id);
        (self.rebalance(id, key), true)
    }

    /// Restore balance at `id` after inserting `key` below it.
    ///
    /// The inserted key compared with the near child's key tells the
    /// straight (LL/RR) shapes from the zig-zag (LR/RL) ones.
    fn rebalance(&mut self, id: NodeId, key: i32) -> NodeId {
        let balance = self.balance(id);

        if balance > 1 {
            if let Some(left) = self.nodes[id].left {
                if key < self.nodes[left].key {
                    // Left-Left
                    return self.rotate_right(id);
                }
                // Left-Right
                let new_left = self.rotate_left(left);
                self.nodes[id].left = Some(new_left);
                return self.rotate_right(id);
            }
        }

        if balance < -1 {
            if let Some(right) = self.nodes[id].right {
                if key > self.nodes[right].key {
                    // Right-Right
                    return self.rotate_left(id);
                }
                // Right-Left
                let new_right = self.rotate_right(right);
                self.nodes[id].right = Some(new_right);
                return self.rotate_left(id);
            }
        }

        id
    }

    fn rotate_right(&mut self, y: NodeId) -> NodeId {
        let Some(x) = self.nodes[y].left else {
            return y;
        };
        let t2 = self.nodes[x].right;

        self.nodes[x].right = Some(y);
        self.nodes[y].left = t2;

        self.update_height(y);
        self.update_height(x);
        x
    }

    fn rotate_left(&mut self, x: NodeId) -> NodeId {
        let Some(y) = self.nodes[x].right else {
            return x;
        };
        let t2 = self.nodes[y].left;

        self.nodes[y].left = Some(x);
        self.nodes[x].right = t2;

        self.update_height(x);
        self.update_height(y);
        y
    }

    fn height_of(&self, node: Option<NodeId>) -> i32 {
        node.map_or(0, |id| self.nodes[id].height)
    }

    fn update_height(&mut self, id: NodeId) {
        let left = self.height_of(self.nodes[id].left);
        let right = self.height_of(self.nodes[id].right);
        self.nodes[id].height = 1 + left.max(right);
    }

    fn balance(&self, id: NodeId) -> i32 {
        self.height_of(self.nodes[id].left) - self.height_of(self.nodes[id].right)
    }

    /// Returns the computed height of the subtree at `node`
    fn validate_at(
        &self,
        node: Option<NodeId>,
        lower: Option<i32>,
        upper: Option<i32>,
    ) -> Result<i32, String> {
        let Some(id) = node else {
            return Ok(0);
        };
        let n = &self.nodes[id];

        if lower.is_some_and(|lo| n.key <= lo) || upper.is_some_and(|hi| n.key >= hi) {
            return Err(format!("key {} violates BST ordering", n.key));
        }

        let left = self.validate_at(n.left, lower, Some(n.key))?;
        let right = self.validate_at(n.right, Some(n.key), upper)?;
        let height = 1 + left.max(right);

        if height != n.height {
            return Err(format!(
                "key {} stores height {} but has height {}",
                n.key, n.height, height
            ));
        }
        if (left - right).abs() > 1 {
            return Err(format!(
                "key {} has balance factor {}",
                n.key,
                left - right
            ));
        }

        Ok(height)
    }
}
