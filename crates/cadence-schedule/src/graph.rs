//! Inter-family dependency graph and its topological order.
//!
//! An edge `a → b` means "when placing `a`, visit `b` first": `b` runs no
//! later than `a`.  The order is a depth-first post-order over every family
//! index `0..N`, so families are emitted only after everything they point at.
//!
//! # Cycle detection
//!
//! Three-colour marking.  Reaching a family that is still in progress means
//! the constraints loop back on themselves; the in-progress path from that
//! family onwards is returned as the cycle.

use cadence_core::FamilyId;

#[derive(Copy, Clone, PartialEq, Eq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

/// Adjacency-list graph over family indices.
#[derive(Clone, Debug, Default)]
pub struct DependencyGraph {
    edges: Vec<Vec<FamilyId>>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a vertex for the next family index and return it.
    pub fn add_node(&mut self) -> FamilyId {
        self.edges.push(Vec::new());
        FamilyId::from_index(self.edges.len() - 1)
    }

    /// Add `from → to`.  Returns `false` if the edge already existed or
    /// either endpoint was never added.
    pub fn add_edge(&mut self, from: FamilyId, to: FamilyId) -> bool {
        if to.index() >= self.edges.len() {
            return false;
        }
        let Some(out) = self.edges.get_mut(from.index()) else {
            return false;
        };
        if out.contains(&to) {
            return false;
        }
        out.push(to);
        true
    }

    pub fn node_count(&self) -> usize {
        self.edges.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.iter().map(Vec::len).sum()
    }

    /// Families `from` must be placed after.
    pub fn successors(&self, from: FamilyId) -> &[FamilyId] {
        self.edges.get(from.index()).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Depth-first post-order over all vertices.
    ///
    /// On a cycle, returns the closed path `[f, …, f]`.
    pub fn topological_order(&self) -> Result<Vec<FamilyId>, Vec<FamilyId>> {
        let mut marks = vec![Mark::Unvisited; self.edges.len()];
        let mut path = Vec::new();
        let mut order = Vec::with_capacity(self.edges.len());
        for start in 0..self.edges.len() {
            self.visit(FamilyId::from_index(start), &mut marks, &mut path, &mut order)?;
        }
        Ok(order)
    }

    fn visit(
        &self,
        node:  FamilyId,
        marks: &mut [Mark],
        path:  &mut Vec<FamilyId>,
        order: &mut Vec<FamilyId>,
    ) -> Result<(), Vec<FamilyId>> {
        match marks[node.index()] {
            Mark::Done => return Ok(()),
            Mark::InProgress => {
                let from = path.iter().position(|&f| f == node).unwrap_or(0);
                let mut cycle = path[from..].to_vec();
                cycle.push(node);
                return Err(cycle);
            }
            Mark::Unvisited => {}
        }

        marks[node.index()] = Mark::InProgress;
        path.push(node);
        for &next in &self.edges[node.index()] {
            self.visit(next, marks, path, order)?;
        }
        path.pop();
        marks[node.index()] = Mark::Done;
        order.push(node);
        Ok(())
    }
}
