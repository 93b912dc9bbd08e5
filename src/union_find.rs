//! Union-find forest and redundant-edge detection
//!
//! Given a tree over nodes `1..=n` plus exactly one extra edge, finds the edge
//! whose removal restores a tree (undirected) or a rooted tree (directed).
//!
//! # Directed case
//!
//! The extra edge produces one of two shapes:
//!
//! ```text
//! (a) a node with two parents        (b) a cycle, every node has one parent
//!
//!       1                                 1 → 2
//!      / \                                ↑   ↓
//!     2   3                               4 ← 3
//!      \ /
//!       4
//! ```
//!
//! For (a) the two incoming edges of the conflicted node are `candidate1`
//! (earlier) and `candidate2` (later). Running union-find without
//! `candidate2` tells which one to drop: a remaining cycle means `candidate1`
//! is on it, otherwise `candidate2` is redundant. For (b) the first edge that
//! closes the cycle is returned.
//!
//! # Validation
//!
//! The plain functions return `None` for malformed input. The `try_` variants
//! reject inputs that are not "tree plus one edge" with an [`EdgeError`]
//! instead of guessing.

use thiserror::Error;

/// Directed or undirected edge `(u, v)` between nodes numbered from 1
pub type Edge = (usize, usize);

/// Errors from validated redundant-edge detection
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EdgeError {
    #[error("Edge list is empty")]
    Empty,

    #[error("Node {node} in edge ({u}, {v}) is outside 1..={max}")]
    NodeOutOfRange {
        u: usize,
        v: usize,
        node: usize,
        max: usize,
    },

    #[error("Input has more than one cycle-closing edge")]
    MultipleRedundantEdges,

    #[error("Expected at most one extra incoming edge, found {0}")]
    MultipleParentConflicts(usize),

    #[error("No edge closes a cycle")]
    NoRedundantEdge,
}

/// Result type for validated edge detection
pub type Result<T> = std::result::Result<T, EdgeError>;

/// Disjoint-set forest with path compression and union by rank
#[derive(Debug, Clone)]
pub struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<u8>,
    components: usize,
}

impl UnionFind {
    /// Create `n` singleton sets `0..n`
    pub fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            rank: vec![0; n],
            components: n,
        }
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.parent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    /// Number of disjoint sets
    pub fn component_count(&self) -> usize {
        self.components
    }

    /// Root of `x`, compressing the path behind it
    ///
    /// # Panics
    ///
    /// Panics if `x >= self.len()`.
    pub fn find(&mut self, x: usize) -> usize {
        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }

        let mut node = x;
        while self.parent[node] != root {
            let next = self.parent[node];
            self.parent[node] = root;
            node = next;
        }

        root
    }

    /// Merge the sets containing `a` and `b`
    ///
    /// Returns `false` when they were already in the same set.
    pub fn union(&mut self, a: usize, b: usize) -> bool {
        let root_a = self.find(a);
        let root_b = self.find(b);
        if root_a == root_b {
            return false;
        }

        match self.rank[root_a].cmp(&self.rank[root_b]) {
            std::cmp::Ordering::Less => self.parent[root_a] = root_b,
            std::cmp::Ordering::Greater => self.parent[root_b] = root_a,
            std::cmp::Ordering::Equal => {
                self.parent[root_b] = root_a;
                self.rank[root_a] = self.rank[root_a].saturating_add(1);
            }
        }

        self.components -= 1;
        true
    }

    pub fn connected(&mut self, a: usize, b: usize) -> bool {
        self.find(a) == self.find(b)
    }
}

/// Edge that closes a cycle in an undirected "tree plus one edge"
///
/// Nodes are `1..=edges.len()`. Edges are processed in input order and the
/// first one whose endpoints are already connected is returned. Returns
/// `None` if no edge closes a cycle or a node id is out of range.
///
/// # Example
///
/// ```
/// use cairn::union_find::find_redundant_connection;
///
/// let edges = [(1, 2), (1, 3), (2, 3)];
/// assert_eq!(find_redundant_connection(&edges), Some((2, 3)));
/// ```
pub fn find_redundant_connection(edges: &[Edge]) -> Option<Edge> {
    let n = edges.len();
    if first_out_of_range(edges, n).is_some() {
        return None;
    }

    cycle_closers(edges, n, None, 1)
        .first()
        .map(|&idx| edges[idx])
}

/// Validated form of [`find_redundant_connection`]
///
/// Rejects empty input, out-of-range ids, and inputs where more than one
/// edge closes a cycle.
pub fn try_find_redundant_connection(edges: &[Edge]) -> Result<Edge> {
    let n = validate(edges)?;

    let closers = cycle_closers(edges, n, None, 2);
    match closers.as_slice() {
        [] => Err(EdgeError::NoRedundantEdge),
        [idx] => Ok(edges[*idx]),
        _ => Err(EdgeError::MultipleRedundantEdges),
    }
}

/// Edge whose removal turns a directed graph back into a rooted tree
///
/// Handles both the two-parent shape and the pure cycle shape (see module
/// docs). Returns `None` for malformed input.
///
/// # Example
///
/// ```
/// use cairn::union_find::find_redundant_directed_connection;
///
/// // Node 3 has two parents; dropping the later edge leaves a tree
/// let edges = [(1, 2), (1, 3), (2, 3)];
/// assert_eq!(find_redundant_directed_connection(&edges), Some((2, 3)));
///
/// // Cycle 1 → 2 → 3 → 4 → 1 with a dangling 5
/// let edges = [(1, 2), (2, 3), (3, 4), (4, 1), (1, 5)];
/// assert_eq!(find_redundant_directed_connection(&edges), Some((4, 1)));
/// ```
pub fn find_redundant_directed_connection(edges: &[Edge]) -> Option<Edge> {
    let n = edges.len();
    if first_out_of_range(edges, n).is_some() {
        return None;
    }

    let conflicts = parent_conflicts(edges, n);
    directed_answer(edges, n, conflicts.first().copied())
}

/// Validated form of [`find_redundant_directed_connection`]
///
/// Rejects empty input, out-of-range ids, more than one two-parent conflict,
/// more than one cycle, and inputs with no redundant edge.
pub fn try_find_redundant_directed_connection(edges: &[Edge]) -> Result<Edge> {
    let n = validate(edges)?;

    let conflicts = parent_conflicts(edges, n);
    if conflicts.len() > 1 {
        return Err(EdgeError::MultipleParentConflicts(conflicts.len()));
    }
    let conflict = conflicts.first().copied();

    let skip = conflict.map(|(_, second)| second);
    if cycle_closers(edges, n, skip, 2).len() > 1 {
        return Err(EdgeError::MultipleRedundantEdges);
    }

    directed_answer(edges, n, conflict).ok_or(EdgeError::NoRedundantEdge)
}

fn directed_answer(edges: &[Edge], n: usize, conflict: Option<(usize, usize)>) -> Option<Edge> {
    let skip = conflict.map(|(_, second)| second);

    match (cycle_closers(edges, n, skip, 1).first(), conflict) {
        // Cycle survives without candidate2: candidate1 is on it
        (Some(_), Some((first, _))) => Some(edges[first]),
        (Some(&closer), None) => Some(edges[closer]),
        (None, Some((_, second))) => Some(edges[second]),
        (None, None) => None,
    }
}

/// Indices of edges that close a cycle, stopping after `limit` hits
fn cycle_closers(edges: &[Edge], n: usize, skip: Option<usize>, limit: usize) -> Vec<usize> {
    let mut forest = UnionFind::new(n + 1);
    let mut closers = Vec::new();

    for (idx, &(u, v)) in edges.iter().enumerate() {
        if Some(idx) == skip {
            continue;
        }
        if !forest.union(u, v) {
            closers.push(idx);
            if closers.len() >= limit {
                break;
            }
        }
    }

    closers
}

/// Pairs `(earlier, later)` of edge indices pointing at an already-parented node
fn parent_conflicts(edges: &[Edge], n: usize) -> Vec<(usize, usize)> {
    let mut incoming: Vec<Option<usize>> = vec![None; n + 1];
    let mut conflicts = Vec::new();

    for (idx, &(_, v)) in edges.iter().enumerate() {
        match incoming[v] {
            Some(prev) => conflicts.push((prev, idx)),
            None => incoming[v] = Some(idx),
        }
    }

    conflicts
}

fn first_out_of_range(edges: &[Edge], n: usize) -> Option<EdgeError> {
    edges.iter().find_map(|&(u, v)| {
        [u, v]
            .into_iter()
            .find(|&node| node == 0 || node > n)
            .map(|node| EdgeError::NodeOutOfRange { u, v, node, max: n })
    })
}

fn validate(edges: &[Edge]) -> Result<usize> {
    if edges.is_empty() {
        return Err(EdgeError::Empty);
    }
    let n = edges.len();
    match first_out_of_range(edges, n) {
        Some(err) => Err(err),
        None => Ok(n),
    }
}
