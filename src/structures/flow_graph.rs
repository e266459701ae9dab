/*
This code is part of the flowshed hydrological analysis library.
Created: 21/03/2025
Last Modified: 02/07/2025
License: MIT
*/

/// Sparse directed graph over the accumulation nodes. Every node in the
/// rewritten flow graph carries at most one outgoing edge (a cell drains to a
/// single downslope neighbour; a trap super-node drains through a single
/// spill), so the forward direction is stored as a successor array and the
/// reverse direction as a CSR predecessor index built in one counting pass.
/// Predecessor queries dominate the wavefront propagation.
#[derive(Clone, Debug)]
pub struct FlowGraph {
    succ: Vec<isize>,
    pred_ptr: Vec<usize>,
    pred_idx: Vec<usize>,
}

impl FlowGraph {
    /// Builds the graph from a successor array; a negative entry means the
    /// node has no outgoing edge. Predecessor lists come out sorted ascending
    /// because sources are scanned in index order.
    pub fn from_successors(succ: Vec<isize>) -> FlowGraph {
        let n = succ.len();
        let mut counts = vec![0usize; n];
        for &t in &succ {
            if t >= 0 {
                counts[t as usize] += 1;
            }
        }
        let mut pred_ptr = vec![0usize; n + 1];
        for i in 0..n {
            pred_ptr[i + 1] = pred_ptr[i] + counts[i];
        }
        let mut cursor = pred_ptr.clone();
        let mut pred_idx = vec![0usize; pred_ptr[n]];
        for (u, &t) in succ.iter().enumerate() {
            if t >= 0 {
                let v = t as usize;
                pred_idx[cursor[v]] = u;
                cursor[v] += 1;
            }
        }
        FlowGraph {
            succ,
            pred_ptr,
            pred_idx,
        }
    }

    pub fn len(&self) -> usize {
        self.succ.len()
    }

    pub fn is_empty(&self) -> bool {
        self.succ.is_empty()
    }

    pub fn num_edges(&self) -> usize {
        self.pred_idx.len()
    }

    pub fn successor(&self, u: usize) -> Option<usize> {
        let t = self.succ[u];
        if t >= 0 {
            Some(t as usize)
        } else {
            None
        }
    }

    pub fn predecessors(&self, v: usize) -> &[usize] {
        &self.pred_idx[self.pred_ptr[v]..self.pred_ptr[v + 1]]
    }

    pub fn in_degree(&self, v: usize) -> usize {
        self.pred_ptr[v + 1] - self.pred_ptr[v]
    }
}

#[cfg(test)]
mod test {
    use super::FlowGraph;

    #[test]
    fn predecessor_lists_mirror_the_successor_array() {
        // 0 -> 2, 1 -> 2, 2 -> 3, 3 has no outflow, 4 -> 3
        let graph = FlowGraph::from_successors(vec![2, 2, 3, -1, 3]);
        assert_eq!(graph.len(), 5);
        assert_eq!(graph.num_edges(), 4);
        assert_eq!(graph.successor(0), Some(2));
        assert_eq!(graph.successor(3), None);
        assert_eq!(graph.predecessors(2), &[0, 1]);
        assert_eq!(graph.predecessors(3), &[2, 4]);
        assert_eq!(graph.predecessors(0), &[] as &[usize]);
        assert_eq!(graph.in_degree(2), 2);
        assert_eq!(graph.in_degree(1), 0);
    }

    #[test]
    fn handles_a_graph_with_no_edges() {
        let graph = FlowGraph::from_successors(vec![-1, -1, -1]);
        assert_eq!(graph.num_edges(), 0);
        for v in 0..3 {
            assert_eq!(graph.in_degree(v), 0);
            assert_eq!(graph.successor(v), None);
        }
    }
}
