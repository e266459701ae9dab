/*
This code is part of the flowshed hydrological analysis library.
Created: 23/05/2025
Last Modified: 25/07/2025
License: MIT
*/
use crate::hydro::flow_field::NO_FLOW;
use crate::hydro::spill::SpillPair;
use crate::structures::{FlowGraph, Grid};

/// Builds the accumulation graph and counts, for every cell, the number of
/// interior cells whose drainage passes through it (itself included). The
/// flow field must come from the depressionless surface.
///
/// Traps are collapsed to super-nodes: node `N + k` replaces trap `k`, carries
/// the trap size as its own contribution, drains through the trap's spill
/// pair, and receives every inflow that targeted one of the trap's cells.
/// Edges whose destination is on the domain boundary are dropped, so flow
/// leaving the domain simply stops being counted. The rewritten graph is
/// acyclic: spill edges are cycle-free after the fixed point and everything
/// else runs strictly downslope.
///
/// The output raster reports the super-node total at every trap cell and 0 on
/// the domain boundary.
pub fn accumulate(
    flow: &[isize],
    traps: &[Vec<usize>],
    trap_sizes: &[usize],
    spill_pairs: &[SpillPair],
    grid: &Grid,
) -> Vec<i64> {
    let n = grid.num_cells();
    let num_traps = traps.len();
    let num_nodes = n + num_traps;

    let mut trap_of = vec![-1isize; n];
    for (k, trap) in traps.iter().enumerate() {
        for &ix in trap {
            trap_of[ix] = k as isize;
        }
    }

    // cell edges follow the flow field; trap cells are sinks in the cell
    // graph, only their super-node carries flow onward
    let mut succ = vec![NO_FLOW; num_nodes];
    for ix in 0..n {
        if flow[ix] >= 0 && trap_of[ix] < 0 {
            succ[ix] = flow[ix];
        }
    }
    for k in 0..num_traps {
        succ[n + k] = spill_pairs[k].to as isize;
    }
    // reroute every edge that lands in a trap onto the trap's super-node;
    // super-node spill edges are rerouted too, which chains trap to trap
    for u in 0..num_nodes {
        let v = succ[u];
        if v >= 0 {
            let k = trap_of[v as usize];
            if k >= 0 {
                succ[u] = (n + k as usize) as isize;
            }
        }
    }
    // flow onto the domain boundary leaves the domain
    for u in 0..num_nodes {
        let v = succ[u];
        if v >= 0 && (v as usize) < n && grid.is_boundary(v as usize) {
            succ[u] = NO_FLOW;
        }
    }

    let graph = FlowGraph::from_successors(succ);

    let mut contribution = vec![1i64; num_nodes];
    for k in 0..num_traps {
        contribution[n + k] = trap_sizes[k] as i64;
    }

    // origins: nothing flows in, and the node actually carries flow itself
    // (boundary cells and the cells inside a trap never do)
    let mut accumulation = vec![0i64; num_nodes];
    let mut assigned = vec![false; num_nodes];
    let mut current: Vec<usize> = vec![];
    let mut num_origins = 0;
    for u in 0..num_nodes {
        if graph.in_degree(u) > 0 {
            continue;
        }
        if u < n && (grid.is_boundary(u) || trap_of[u] >= 0) {
            continue;
        }
        accumulation[u] = contribution[u];
        assigned[u] = true;
        num_origins += 1;
        if let Some(v) = graph.successor(u) {
            current.push(v);
        }
    }
    current.sort_unstable();
    current.dedup();
    log::debug!(
        "accumulation graph: {} nodes, {} edges, {} origins",
        num_nodes,
        graph.num_edges(),
        num_origins
    );

    // wavefront propagation: a node resolves once every upstream neighbour
    // has resolved; unready nodes are carried into the next round
    let mut round = 0;
    while !current.is_empty() {
        round += 1;
        let ready: Vec<bool> = current
            .iter()
            .map(|&c| graph.predecessors(c).iter().all(|&p| assigned[p]))
            .collect();
        if !ready.iter().any(|&r| r) {
            // unreachable on an acyclic graph; stop rather than spin
            log::debug!("accumulation stalled with {} unresolved nodes", current.len());
            break;
        }
        let mut num_resolved = 0;
        let mut next: Vec<usize> = vec![];
        for (i, &c) in current.iter().enumerate() {
            if ready[i] {
                let inflow: i64 = graph.predecessors(c).iter().map(|&p| accumulation[p]).sum();
                accumulation[c] = contribution[c] + inflow;
                assigned[c] = true;
                num_resolved += 1;
                if let Some(v) = graph.successor(c) {
                    next.push(v);
                }
            } else {
                next.push(c);
            }
        }
        next.sort_unstable();
        next.dedup();
        log::trace!(
            "accumulation round {}: {} resolved, {} pending",
            round,
            num_resolved,
            next.len()
        );
        current = next;
    }

    // report the whole lake's accumulation at each lake cell
    for (k, trap) in traps.iter().enumerate() {
        let total = accumulation[n + k];
        for &ix in trap {
            accumulation[ix] = total;
        }
    }
    accumulation.truncate(n);
    accumulation
}
